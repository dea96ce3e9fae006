// Copyright 2024. The Shuriken Project
//
// Redistribution and use in source and binary forms, with or without modification, are permitted provided that the
// following conditions are met:
//
// 1. Redistributions of source code must retain the above copyright notice, this list of conditions and the following
// disclaimer.
//
// 2. Redistributions in binary form must reproduce the above copyright notice, this list of conditions and the
// following disclaimer in the documentation and/or other materials provided with the distribution.
//
// 3. Neither the name of the copyright holder nor the names of its contributors may be used to endorse or promote
// products derived from this software without specific prior written permission.
//
// THIS SOFTWARE IS PROVIDED BY THE COPYRIGHT HOLDERS AND CONTRIBUTORS "AS IS" AND ANY EXPRESS OR IMPLIED WARRANTIES,
// INCLUDING, BUT NOT LIMITED TO, THE IMPLIED WARRANTIES OF MERCHANTABILITY AND FITNESS FOR A PARTICULAR PURPOSE ARE
// DISCLAIMED. IN NO EVENT SHALL THE COPYRIGHT HOLDER OR CONTRIBUTORS BE LIABLE FOR ANY DIRECT, INDIRECT, INCIDENTAL,
// SPECIAL, EXEMPLARY, OR CONSEQUENTIAL DAMAGES (INCLUDING, BUT NOT LIMITED TO, PROCUREMENT OF SUBSTITUTE GOODS OR
// SERVICES; LOSS OF USE, DATA, OR PROFITS; OR BUSINESS INTERRUPTION) HOWEVER CAUSED AND ON ANY THEORY OF LIABILITY,
// WHETHER IN CONTRACT, STRICT LIABILITY, OR TORT (INCLUDING NEGLIGENCE OR OTHERWISE) ARISING IN ANY WAY OUT OF THE
// USE OF THIS SOFTWARE, EVEN IF ADVISED OF THE POSSIBILITY OF SUCH DAMAGE.

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    time::Instant,
};

use log::*;

use crate::tag::CqTag;

const LOG_TARGET: &str = "shuriken::rpc::queue";

/// The outcome of a [`EventQueue::next`] poll.
pub enum CqPoll {
    /// An operation finished. The flag is false when the operation was aborted (typically because the call or the
    /// queue is going down).
    Event(CqTag, bool),
    /// Nothing queued. With a single driving thread, no event can arrive until some handler posts one.
    Empty,
    Shutdown,
}

/// The outcome of a [`EventQueue::next_with_deadline`] poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CqNext {
    GotEvent,
    Timeout,
    Shutdown,
}

/// The completion queue shared by the runloop driver and every invocation posted on it.
///
/// Transport handles post `(tag, success)` pairs as their operations finish; the driver pops them one at a time and
/// dispatches into the tag. This implementation is a deterministic FIFO for single-threaded cooperative use: all
/// posts happen from handlers running on the driving thread, so an empty queue means nothing more can arrive until
/// the driver dispatches further work.
pub struct EventQueue {
    events: RefCell<VecDeque<(CqTag, bool)>>,
    shut_down: Cell<bool>,
}

impl EventQueue {
    pub fn new() -> Self {
        EventQueue {
            events: RefCell::new(VecDeque::new()),
            shut_down: Cell::new(false),
        }
    }

    /// Enqueues a completion. Posts after shutdown are dropped: the tag's release still happens (the tag is consumed
    /// here), but its completion slot is never invoked.
    pub fn post(&self, tag: CqTag, success: bool) {
        if self.shut_down.get() {
            warn!(
                target: LOG_TARGET,
                "Dropping completion for tag {:#x} posted after queue shutdown",
                tag.id()
            );
            return;
        }
        trace!(target: LOG_TARGET, "Queueing completion for tag {:#x} (success = {})", tag.id(), success);
        self.events.borrow_mut().push_back((tag, success));
    }

    pub fn next(&self) -> CqPoll {
        match self.events.borrow_mut().pop_front() {
            Some((tag, success)) => CqPoll::Event(tag, success),
            None if self.shut_down.get() => CqPoll::Shutdown,
            None => CqPoll::Empty,
        }
    }

    /// Like [`next`](EventQueue::next), but reports `Timeout` on an empty queue. The deadline exists for interface
    /// parity with blocking queues; a deterministic FIFO has nothing to wait for, so an empty queue times out
    /// immediately.
    pub fn next_with_deadline(&self, _deadline: Instant) -> (CqNext, Option<(CqTag, bool)>) {
        match self.next() {
            CqPoll::Event(tag, success) => (CqNext::GotEvent, Some((tag, success))),
            CqPoll::Empty => (CqNext::Timeout, None),
            CqPoll::Shutdown => (CqNext::Shutdown, None),
        }
    }

    /// Marks the queue as shutting down. Events already queued are still handed out; new posts are dropped.
    pub fn shutdown(&self) {
        if !self.shut_down.get() {
            debug!(target: LOG_TARGET, "Queue shutting down with {} queued event(s)", self.len());
            self.shut_down.set(true);
        }
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl Default for EventQueue {
    fn default() -> Self {
        EventQueue::new()
    }
}
