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

use shuriken_streams::{sources::throw_error, ElementCount, Publisher, StreamError, Subscription};
use shuriken_test_utils::streams::{recording, StreamEvent};

#[test]
fn errors_on_first_positive_request() {
    let (subscriber, probe) = recording::<i32>();
    let sub = throw_error::<i32>(StreamError::logic("boom")).subscribe(subscriber);
    assert!(probe.events().is_empty());
    sub.request(ElementCount::new(1));
    assert_eq!(probe.error_messages(), vec!["Stream contract violated: boom"]);
}

#[test]
fn errors_exactly_once() {
    let (subscriber, probe) = recording::<i32>();
    let sub = throw_error::<i32>(StreamError::logic("boom")).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events().len(), 1);
    assert!(matches!(probe.events()[0], StreamEvent::Error(_)));
}

#[test]
fn cancel_suppresses_the_error() {
    let (subscriber, probe) = recording::<i32>();
    let sub = throw_error::<i32>(StreamError::logic("boom")).subscribe(subscriber);
    sub.cancel();
    sub.request(ElementCount::new(1));
    assert!(probe.events().is_empty());
}

#[test]
fn each_subscription_gets_the_error() {
    let source = throw_error::<i32>(StreamError::out_of_range("gone"));
    for _ in 0..2 {
        let (subscriber, probe) = recording::<i32>();
        let sub = source.subscribe(subscriber);
        sub.request(ElementCount::new(1));
        assert_eq!(probe.error_messages(), vec!["gone"]);
    }
}
