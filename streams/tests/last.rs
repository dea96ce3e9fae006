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
    sources::{empty, from_vec, just},
    subscription::Subscription,
};

#[test]
fn emits_the_last_value() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2, 3]).last().subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(3), StreamEvent::Complete]);
}

#[test]
fn single_value_streams_work() {
    let (subscriber, probe) = recording();
    let sub = just(5).last().subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(5), StreamEvent::Complete]);
}

#[test]
fn fails_on_an_empty_stream() {
    let (subscriber, probe) = recording::<i32>();
    let sub = empty::<i32>().last().subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.error_messages(), vec!["Last invoked with empty stream"]);
}
