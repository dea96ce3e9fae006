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

use std::{
    cell::{Cell, RefCell},
    collections::VecDeque,
    rc::{Rc, Weak},
};

use crate::{
    element_count::ElementCount,
    error::StreamError,
    publisher::{BoxPublisher, Publisher},
    subscriber::{BoxSubscriber, Subscriber},
    subscription::{AnySubscription, Subscription},
};

/// Combines the given publishers into one stream, interleaving their values while preserving each source's own
/// ordering. All sources are subscribed immediately.
///
/// To honor the demand invariant, values that arrive when the aggregate demand is already spent are buffered; the
/// buffer never grows beyond `(number of sources - 1) * outstanding demand`. Under unbounded demand nothing is ever
/// buffered. The merged stream completes when every source has completed and the buffer is drained; any source error
/// cancels the others and surfaces downstream.
pub fn merge<T: 'static>(publishers: Vec<BoxPublisher<T>>) -> Merge<T> {
    Merge { publishers }
}

pub struct Merge<T> {
    publishers: Vec<BoxPublisher<T>>,
}

impl<T> Clone for Merge<T> {
    fn clone(&self) -> Self {
        Merge {
            publishers: self.publishers.clone(),
        }
    }
}

impl<T: 'static> Publisher for Merge<T> {
    type Item = T;

    fn subscribe<S>(&self, mut subscriber: S) -> AnySubscription
    where S: Subscriber<Item = T> + 'static {
        if self.publishers.is_empty() {
            subscriber.on_complete();
            return AnySubscription::empty();
        }
        let shared = Rc::new(MergeShared {
            outstanding: Cell::new(ElementCount::default()),
            batch: Cell::new(ElementCount::default()),
            remaining: Cell::new(self.publishers.len()),
            finished: Cell::new(false),
            inner: RefCell::new(MergeInner {
                buffer: VecDeque::new(),
                subscriber: Some(Box::new(subscriber) as BoxSubscriber<T>),
                sources: Vec::with_capacity(self.publishers.len()),
            }),
        });
        for (index, publisher) in self.publishers.iter().enumerate() {
            if shared.finished.get() {
                // An earlier source already failed the merge during subscribe.
                break;
            }
            let subscription = publisher.subscribe(MergeSourceSubscriber {
                index,
                shared: Rc::downgrade(&shared),
            });
            shared.inner.borrow_mut().sources.push(MergeSource {
                subscription: Some(subscription),
                outstanding: ElementCount::default(),
            });
        }
        AnySubscription::new(MergeSubscription { shared })
    }
}

struct MergeShared<T> {
    // Aggregate requested-but-undelivered demand.
    outstanding: Cell<ElementCount>,
    // The demand being processed by the currently running request call. Doubles as the re-entrancy guard: a nested
    // request only folds its count in here, and the outer pump picks it up. Reset to zero when the pump finishes
    // (it may be unbounded). This is also the top-up target for each source, which is what bounds the buffer at
    // (sources - 1) * outstanding demand.
    batch: Cell<ElementCount>,
    // Sources that have not yet completed.
    remaining: Cell<usize>,
    finished: Cell<bool>,
    inner: RefCell<MergeInner<T>>,
}

struct MergeInner<T> {
    buffer: VecDeque<T>,
    subscriber: Option<BoxSubscriber<T>>,
    sources: Vec<MergeSource>,
}

struct MergeSource {
    subscription: Option<AnySubscription>,
    // Demand requested from this source that it has not yet delivered. Never exceeds the aggregate demand, which is
    // what bounds the buffer.
    outstanding: ElementCount,
}

impl<T: 'static> MergeShared<T> {
    fn request(&self, count: ElementCount) {
        if count <= 0 || self.finished.get() {
            return;
        }
        let request_in_progress = self.batch.get() != 0;
        self.batch.set(self.batch.get() + count);
        self.outstanding.set(self.outstanding.get() + count);
        if request_in_progress {
            return;
        }

        self.drain_buffer();
        self.top_up();
        // A re-entrant request during the top-up may have raised demand while the buffer was non-empty.
        self.drain_buffer();

        self.batch.set(ElementCount::default());
        self.maybe_send_on_complete();
    }

    /// Emits buffered values while demand allows. Demand satisfied from the buffer is not requested from the sources
    /// again, so it is deducted from the batch as well.
    fn drain_buffer(&self) {
        loop {
            let step = {
                let mut inner = self.inner.borrow_mut();
                if self.finished.get() ||
                    self.outstanding.get() <= 0 ||
                    inner.buffer.is_empty() ||
                    inner.subscriber.is_none()
                {
                    None
                } else {
                    let value = inner.buffer.pop_front();
                    self.outstanding.set(self.outstanding.get() - 1);
                    self.batch.set(self.batch.get() - 1);
                    inner.subscriber.take().zip(value)
                }
            };
            match step {
                Some((mut subscriber, value)) => {
                    subscriber.on_next(value);
                    let mut inner = self.inner.borrow_mut();
                    if inner.subscriber.is_none() {
                        inner.subscriber = Some(subscriber);
                    }
                },
                None => break,
            }
        }
    }

    /// Brings every source's outstanding demand up to the current batch. One pass only: repeating the pass would
    /// re-request what a source already delivered and grow the buffer past its bound.
    fn top_up(&self) {
        let source_count = self.inner.borrow().sources.len();
        for index in 0..source_count {
            if self.finished.get() {
                break;
            }
            let target = self.batch.get();
            if target <= 0 {
                break;
            }
            let checkout = {
                let mut inner = self.inner.borrow_mut();
                let source = &mut inner.sources[index];
                if source.outstanding.is_unbounded() {
                    None
                } else {
                    let to_request = target - source.outstanding;
                    if to_request > 0 {
                        source.outstanding += to_request;
                        source.subscription.take().map(|subscription| (subscription, to_request))
                    } else {
                        None
                    }
                }
            };
            if let Some((subscription, to_request)) = checkout {
                subscription.request(to_request);
                let mut inner = self.inner.borrow_mut();
                if inner.sources[index].subscription.is_none() {
                    inner.sources[index].subscription = Some(subscription);
                }
                drop(inner);
                if self.finished.get() {
                    let stale = self.inner.borrow_mut().sources[index].subscription.take();
                    if let Some(subscription) = stale {
                        subscription.cancel();
                    }
                }
            }
        }
    }

    fn deliver(&self, index: usize, value: T) {
        if self.finished.get() {
            return;
        }
        enum Action<T> {
            Emit(BoxSubscriber<T>, T),
            Buffered,
            Violation(&'static str),
        }
        let action = {
            let mut inner = self.inner.borrow_mut();
            if index >= inner.sources.len() {
                Action::Violation("Got value before requesting anything")
            } else if inner.sources[index].outstanding <= 0 {
                Action::Violation("Got value that was not requested")
            } else {
                inner.sources[index].outstanding -= 1;
                if self.outstanding.get() > 0 {
                    self.outstanding.set(self.outstanding.get() - 1);
                    match inner.subscriber.take() {
                        Some(subscriber) => Action::Emit(subscriber, value),
                        None => {
                            // The subscriber is momentarily checked out by the drain loop; queue behind the buffer
                            // so ordering is preserved.
                            self.outstanding.set(self.outstanding.get() + 1);
                            inner.buffer.push_back(value);
                            Action::Buffered
                        },
                    }
                } else {
                    inner.buffer.push_back(value);
                    Action::Buffered
                }
            }
        };
        match action {
            Action::Emit(mut subscriber, value) => {
                subscriber.on_next(value);
                let mut inner = self.inner.borrow_mut();
                if inner.subscriber.is_none() {
                    inner.subscriber = Some(subscriber);
                }
            },
            Action::Buffered => {},
            Action::Violation(msg) => self.fail(StreamError::logic(msg)),
        }
    }

    fn source_complete(&self) {
        if self.finished.get() {
            return;
        }
        self.remaining.set(self.remaining.get().saturating_sub(1));
        self.maybe_send_on_complete();
    }

    fn maybe_send_on_complete(&self) {
        if self.finished.get() || self.remaining.get() != 0 {
            return;
        }
        let subscriber = {
            let mut inner = self.inner.borrow_mut();
            if inner.buffer.is_empty() {
                self.finished.set(true);
                inner.subscriber.take()
            } else {
                None
            }
        };
        if let Some(mut subscriber) = subscriber {
            subscriber.on_complete();
        }
    }

    fn fail(&self, error: StreamError) {
        if self.finished.get() {
            return;
        }
        self.finished.set(true);
        self.cancel_sources();
        let subscriber = self.inner.borrow_mut().subscriber.take();
        if let Some(mut subscriber) = subscriber {
            subscriber.on_error(error);
        }
    }

    fn cancel_sources(&self) {
        let subscriptions: Vec<_> = {
            let mut inner = self.inner.borrow_mut();
            inner
                .sources
                .iter_mut()
                .filter_map(|source| source.subscription.take())
                .collect()
        };
        for subscription in subscriptions {
            subscription.cancel();
        }
    }
}

struct MergeSubscription<T> {
    shared: Rc<MergeShared<T>>,
}

impl<T: 'static> Subscription for MergeSubscription<T> {
    fn request(&self, count: ElementCount) {
        self.shared.request(count);
    }

    fn cancel(&self) {
        self.shared.finished.set(true);
        self.shared.cancel_sources();
    }
}

struct MergeSourceSubscriber<T> {
    index: usize,
    shared: Weak<MergeShared<T>>,
}

impl<T: 'static> Subscriber for MergeSourceSubscriber<T> {
    type Item = T;

    fn on_next(&mut self, item: T) {
        if let Some(shared) = self.shared.upgrade() {
            shared.deliver(self.index, item);
        }
    }

    fn on_error(&mut self, error: StreamError) {
        if let Some(shared) = self.shared.upgrade() {
            shared.fail(error);
        }
    }

    fn on_complete(&mut self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.source_complete();
        }
    }
}
