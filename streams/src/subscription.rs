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

use std::{cell::RefCell, rc::Rc};

use crate::{element_count::ElementCount, shared::StateCell};

/// The handle by which a subscriber controls demand and cancels delivery.
///
/// Methods take `&self` because `request` is commonly invoked from inside `on_next`, while the same subscription is
/// already being driven further up the stack. Implementations use interior mutability and must flatten such re-entrant
/// requests instead of recursing.
///
/// `request(0)` is a no-op. `cancel` is idempotent and best-effort: a signal already in flight may still be delivered,
/// but implementations suppress everything they can.
pub trait Subscription {
    fn request(&self, count: ElementCount);

    fn cancel(&self);
}

impl<S: Subscription + ?Sized> Subscription for Box<S> {
    fn request(&self, count: ElementCount) {
        (**self).request(count)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

impl<S: Subscription + ?Sized> Subscription for Rc<S> {
    fn request(&self, count: ElementCount) {
        (**self).request(count)
    }

    fn cancel(&self) {
        (**self).cancel()
    }
}

/// Type-erased subscription, as returned by [`Publisher::subscribe`](crate::publisher::Publisher::subscribe).
///
/// Dropping it drops the subscription chain it owns, which implicitly cancels: `cancel` is called first so that state
/// shared with a transport observes the cancellation even if it outlives the chain.
pub struct AnySubscription(Box<dyn Subscription>);

impl AnySubscription {
    pub fn new<S: Subscription + 'static>(subscription: S) -> Self {
        AnySubscription(Box::new(subscription))
    }

    /// A subscription that ignores all demand. Used by sources that have nothing left to deliver.
    pub fn empty() -> Self {
        AnySubscription::new(EmptySubscription)
    }
}

impl Subscription for AnySubscription {
    fn request(&self, count: ElementCount) {
        self.0.request(count)
    }

    fn cancel(&self) {
        self.0.cancel()
    }
}

impl Drop for AnySubscription {
    fn drop(&mut self) {
        self.0.cancel();
    }
}

/// A subscription that does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySubscription;

impl Subscription for EmptySubscription {
    fn request(&self, _count: ElementCount) {}

    fn cancel(&self) {}
}

/// Builds a subscription from a pair of callables.
pub fn subscription_from_fns<R, C>(request: R, cancel: C) -> CallbackSubscription<R, C>
where
    R: Fn(ElementCount),
    C: Fn(),
{
    CallbackSubscription { request, cancel }
}

pub struct CallbackSubscription<R, C> {
    request: R,
    cancel: C,
}

impl<R, C> Subscription for CallbackSubscription<R, C>
where
    R: Fn(ElementCount),
    C: Fn(),
{
    fn request(&self, count: ElementCount) {
        (self.request)(count)
    }

    fn cancel(&self) {
        (self.cancel)()
    }
}

/// Wraps a shared handle to a user-defined subscription.
pub struct SharedSubscription<S>(Rc<RefCell<S>>);

impl<S> SharedSubscription<S> {
    pub fn new(subscription: S) -> Self {
        SharedSubscription(Rc::new(RefCell::new(subscription)))
    }
}

impl<S> Clone for SharedSubscription<S> {
    fn clone(&self) -> Self {
        SharedSubscription(self.0.clone())
    }
}

impl<S: SubscriptionMut> Subscription for SharedSubscription<S> {
    fn request(&self, count: ElementCount) {
        self.0.borrow_mut().request(count)
    }

    fn cancel(&self) {
        self.0.borrow_mut().cancel()
    }
}

/// A subscription expressed with `&mut self` methods, for implementations that keep their state in plain fields.
/// Wrap it in [`SharedSubscription`] to use it where a [`Subscription`] is expected. Such a subscription must not be
/// re-entered from its own callbacks.
pub trait SubscriptionMut {
    fn request(&mut self, count: ElementCount);

    fn cancel(&mut self);
}

/// Forwards to a subscription held in a shared slot.
///
/// Transform combinators hand the slot's weak half to their subscriber (which may need to request replacements or
/// cancel the upstream from inside `on_next`) and return this strong half downstream. Only shared borrows are taken,
/// so the subscriber side may reach into the slot while a request is already being driven through it.
pub(crate) struct CellSubscription(StateCell<Option<AnySubscription>>);

impl CellSubscription {
    pub(crate) fn new(cell: StateCell<Option<AnySubscription>>) -> Self {
        CellSubscription(cell)
    }
}

impl Subscription for CellSubscription {
    fn request(&self, count: ElementCount) {
        self.0.with(|slot| {
            if let Some(upstream) = slot {
                upstream.request(count);
            }
        });
    }

    fn cancel(&self) {
        self.0.with(|slot| {
            if let Some(upstream) = slot {
                upstream.cancel();
            }
        });
    }
}

#[cfg(test)]
mod test {
    use std::cell::Cell;

    use super::*;

    #[test]
    fn empty_subscription_ignores_everything() {
        let sub = EmptySubscription;
        sub.request(ElementCount::new(10));
        sub.request(ElementCount::unbounded());
        sub.cancel();
        sub.cancel();
    }

    #[test]
    fn callback_subscription_forwards() {
        let requested = Rc::new(Cell::new(0i64));
        let cancelled = Rc::new(Cell::new(0u32));
        let sub = {
            let requested = requested.clone();
            let cancelled = cancelled.clone();
            subscription_from_fns(
                move |count: ElementCount| requested.set(requested.get() + count.get()),
                move || cancelled.set(cancelled.get() + 1),
            )
        };

        sub.request(ElementCount::new(2));
        sub.request(ElementCount::new(3));
        assert_eq!(requested.get(), 5);

        sub.cancel();
        sub.cancel();
        assert_eq!(cancelled.get(), 2);
    }

    #[test]
    fn shared_subscription_forwards_to_the_same_instance() {
        struct Counting {
            requested: i64,
            cancelled: bool,
        }

        impl SubscriptionMut for Counting {
            fn request(&mut self, count: ElementCount) {
                self.requested += count.get();
            }

            fn cancel(&mut self) {
                self.cancelled = true;
            }
        }

        let shared = SharedSubscription::new(Counting {
            requested: 0,
            cancelled: false,
        });
        let other = shared.clone();
        shared.request(ElementCount::new(1));
        other.request(ElementCount::new(2));
        other.cancel();

        assert_eq!(shared.0.borrow().requested, 3);
        assert!(shared.0.borrow().cancelled);
    }

    #[test]
    fn any_subscription_cancels_on_drop() {
        let cancelled = Rc::new(Cell::new(false));
        {
            let cancelled = cancelled.clone();
            let _sub = AnySubscription::new(subscription_from_fns(|_| {}, move || cancelled.set(true)));
        }
        assert!(cancelled.get());
    }
}
