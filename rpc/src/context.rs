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

use std::{cell::Cell, rc::Rc};

use log::*;

use crate::queue::EventQueue;

const LOG_TARGET: &str = "shuriken::rpc::context";

/// The context in which a single call runs: which queue its completions arrive on, and whether cancellation has been
/// requested. Cheap to clone; every clone observes the same cancellation flag.
///
/// Cancellation is best-effort. The transport checks the flag when it is about to start or finish an operation;
/// an operation already in flight may still complete, and it is the invocation state machines that suppress those
/// late signals.
#[derive(Clone)]
pub struct CallContext {
    queue: Rc<EventQueue>,
    cancelled: Rc<Cell<bool>>,
}

impl CallContext {
    pub fn new(queue: Rc<EventQueue>) -> Self {
        CallContext {
            queue,
            cancelled: Rc::new(Cell::new(false)),
        }
    }

    pub fn queue(&self) -> &Rc<EventQueue> {
        &self.queue
    }

    /// Asks the transport to cancel the call. Idempotent.
    pub fn try_cancel(&self) {
        if !self.cancelled.get() {
            debug!(target: LOG_TARGET, "Call cancellation requested");
            self.cancelled.set(true);
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}
