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
    sources::from_vec,
    subscription::Subscription,
};

#[test]
fn prefixes_the_stream() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![3, 4]).start_with(vec![1, 2]).subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1, 2, 3, 4]);
    assert!(probe.is_completed());
}

#[test]
fn start_with_get_evaluates_lazily_per_subscription() {
    use std::{cell::Cell, rc::Rc};

    let calls = Rc::new(Cell::new(0));
    let publisher = {
        let calls = calls.clone();
        from_vec(vec![2]).start_with_get(move || {
            calls.set(calls.get() + 1);
            1
        })
    };
    assert_eq!(calls.get(), 0);
    for _ in 0..2 {
        let (subscriber, probe) = recording();
        let sub = publisher.subscribe(subscriber);
        sub.request(ElementCount::unbounded());
        assert_eq!(probe.next_values(), vec![1, 2]);
    }
    assert_eq!(calls.get(), 2);
}
