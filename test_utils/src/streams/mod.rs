// Copyright 2023. The Shuriken Project
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

//! Recording subscribers for asserting on stream output.

use std::{cell::RefCell, rc::Rc};

use shuriken_streams::{ElementCount, Publisher, StreamError, Subscriber, Subscription};

/// One observed signal. Errors are recorded by display string so that event logs stay comparable with `assert_eq`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent<T> {
    Next(T),
    Error(String),
    Complete,
}

/// Creates a subscriber that records every signal it receives, together with the probe used to inspect the log.
pub fn recording<T>() -> (RecordingSubscriber<T>, RecordingProbe<T>) {
    let events = Rc::new(RefCell::new(Vec::new()));
    (
        RecordingSubscriber { events: events.clone() },
        RecordingProbe { events },
    )
}

pub struct RecordingSubscriber<T> {
    events: Rc<RefCell<Vec<StreamEvent<T>>>>,
}

impl<T> Subscriber for RecordingSubscriber<T> {
    type Item = T;

    fn on_next(&mut self, item: T) {
        self.events.borrow_mut().push(StreamEvent::Next(item));
    }

    fn on_error(&mut self, error: StreamError) {
        self.events.borrow_mut().push(StreamEvent::Error(error.to_string()));
    }

    fn on_complete(&mut self) {
        self.events.borrow_mut().push(StreamEvent::Complete);
    }
}

pub struct RecordingProbe<T> {
    events: Rc<RefCell<Vec<StreamEvent<T>>>>,
}

impl<T: Clone> RecordingProbe<T> {
    /// Everything observed so far, in order.
    pub fn events(&self) -> Vec<StreamEvent<T>> {
        self.events.borrow().clone()
    }

    /// The values observed so far, without terminal signals.
    pub fn next_values(&self) -> Vec<T> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Next(value) => Some(value.clone()),
                _ => None,
            })
            .collect()
    }

    /// The display strings of the errors observed so far.
    pub fn error_messages(&self) -> Vec<String> {
        self.events
            .borrow()
            .iter()
            .filter_map(|event| match event {
                StreamEvent::Error(message) => Some(message.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn is_completed(&self) -> bool {
        self.events
            .borrow()
            .iter()
            .any(|event| matches!(event, StreamEvent::Complete))
    }
}

/// Subscribes to `publisher` with unbounded demand and returns everything it emitted. Only meaningful for streams
/// that deliver synchronously.
pub fn collect_events<P>(publisher: &P) -> Vec<StreamEvent<P::Item>>
where
    P: Publisher,
    P::Item: Clone + 'static,
{
    let (subscriber, probe) = recording();
    let subscription = publisher.subscribe(subscriber);
    subscription.request(ElementCount::unbounded());
    probe.events()
}
