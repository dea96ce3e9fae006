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

use shuriken_test_utils::streams::recording;

use shuriken_streams::{
    element_count::ElementCount,
    publisher::{Publisher, PublisherExt},
    sources::range,
    subscription::Subscription,
};

#[test]
fn pipe_applies_operators_in_order() {
    let publisher = pipe!(
        range(0, 100),
        |p: shuriken_streams::sources::FromVec<i64>| p.filter(|v| v % 2 == 0),
        |p| p.take(3),
    );
    let (subscriber, probe) = recording();
    let sub = publisher.subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![0, 2, 4]);
    assert!(probe.is_completed());
}

#[test]
fn pipe_with_no_operators_is_the_value() {
    assert_eq!(pipe!(7), 7);
}

#[test]
fn build_pipe_composes_operators() {
    let double_then_cap = build_pipe!(
        |p: shuriken_streams::sources::FromVec<i64>| p.map(|v| v * 2),
        |p| p.take(2),
    );
    let (subscriber, probe) = recording();
    let sub = double_then_cap(range(1, 5)).subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![2, 4]);
}
