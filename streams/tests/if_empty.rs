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

use shuriken_test_utils::streams::{recording, StreamEvent};

use shuriken_streams::{
    element_count::ElementCount,
    publisher::{Publisher, PublisherExt},
    sources::{empty, from_vec},
    subscription::Subscription,
};

#[test]
fn passes_values_through_unchanged() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2]).if_empty(from_vec(vec![8, 9])).subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1, 2]);
    assert!(probe.is_completed());
}

#[test]
fn falls_back_when_the_source_is_empty() {
    let (subscriber, probe) = recording();
    let sub = empty::<i32>().if_empty(from_vec(vec![8, 9])).subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![8, 9]);
    assert!(probe.is_completed());
}

#[test]
fn completes_after_values_with_exactly_matching_demand() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![5]).if_empty(from_vec(vec![8])).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(5), StreamEvent::Complete]);
}

#[test]
fn independent_subscriptions_do_not_share_the_marker() {
    let publisher = from_vec(vec![1]).if_empty(from_vec(vec![9]));

    let (subscriber, probe) = recording();
    let sub = publisher.subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1]);

    // The second run must make its own emptiness decision.
    let (subscriber, probe) = recording();
    let sub = publisher.subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1]);
}
