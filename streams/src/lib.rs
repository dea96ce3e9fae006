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

//! Backpressure-aware reactive streams.
//!
//! A [`Publisher`] is a cold factory for data flows: subscribing attaches a [`Subscriber`] and returns the
//! [`Subscription`](subscription::Subscription) through which the subscriber signals demand
//! ([`ElementCount`]) and cancels. Values only flow in response to demand, and a subscription delivers at most one
//! terminal signal (`on_error` or `on_complete`), after which it is silent.
//!
//! All callbacks for a subscription are dispatched on the thread that drives it; the types here are deliberately
//! `!Send` and use non-atomic reference counting.
//!
//! ```
//! use shuriken_streams::{sources::range, ElementCount, PublisherExt, Publisher, Subscription};
//! use shuriken_streams::subscriber_from_fns;
//!
//! let evens = range(0, 100).filter(|v| v % 2 == 0).take(3);
//! let subscription = evens.subscribe(subscriber_from_fns(
//!     |value| println!("{}", value),
//!     |error| eprintln!("{}", error),
//!     || println!("done"),
//! ));
//! subscription.request(ElementCount::unbounded());
//! ```

pub mod element_count;
pub mod error;
pub mod ops;
pub mod publisher;
pub mod shared;
pub mod sources;
pub mod subscriber;
pub mod subscription;

pub use element_count::{ElementCount, ElementCountError};
pub use error::StreamError;
pub use publisher::{make_publisher, BoxPublisher, Publisher, PublisherExt};
pub use subscriber::{subscriber_from_fns, BoxSubscriber, SharedSubscriber, Subscriber};
pub use subscription::{subscription_from_fns, AnySubscription, EmptySubscription, SharedSubscription, Subscription};
