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
    error::StreamError,
    publisher::{Publisher, PublisherExt},
    sources::{empty, from_vec, just, range, throw_error},
    subscription::Subscription,
};

#[test]
fn flattens_sequentially() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2, 3])
        .concat_map(|v| Ok(range(v * 10, 2)))
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![10, 11, 20, 21, 30, 31]);
    assert!(probe.is_completed());
}

#[test]
fn respects_downstream_demand() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1i64, 2])
        .concat_map(|v| Ok(range(v * 10, 2)))
        .subscribe(subscriber);
    sub.request(ElementCount::new(3));
    assert_eq!(probe.next_values(), vec![10, 11, 20]);
    assert!(!probe.is_completed());
    sub.request(ElementCount::new(1));
    assert_eq!(probe.next_values(), vec![10, 11, 20, 21]);
    assert!(probe.is_completed());
}

#[test]
fn empty_inner_streams_are_skipped() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2, 3])
        .concat_map(|v| {
            if v == 2 {
                Ok(empty::<i32>().boxed())
            } else {
                Ok(just(v).boxed())
            }
        })
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1, 3]);
    assert!(probe.is_completed());
}

#[test]
fn empty_outer_stream_completes() {
    let (subscriber, probe) = recording();
    let sub = empty::<i32>().concat_map(|v| Ok(just(v))).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Complete]);
}

#[test]
fn mapper_failure_cancels_and_errors() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2])
        .concat_map(|v| {
            if v == 2 {
                Err(StreamError::logic("mapper failed"))
            } else {
                Ok(just(v))
            }
        })
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1]);
    assert_eq!(probe.error_messages().len(), 1);
    assert!(!probe.is_completed());
}

#[test]
fn inner_error_surfaces() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2])
        .concat_map(|v| {
            if v == 2 {
                Ok(throw_error::<i32>(StreamError::logic("inner failed")).boxed())
            } else {
                Ok(just(v).boxed())
            }
        })
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1]);
    assert_eq!(probe.error_messages().len(), 1);
}

#[test]
fn no_work_happens_without_demand() {
    let (subscriber, probe) = recording();
    let _sub = from_vec(vec![1, 2]).concat_map(|v| Ok(just(v))).subscribe(subscriber);
    assert!(probe.events().is_empty());
}

#[test]
fn flat_map_is_the_same_operator() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2])
        .flat_map(|v| Ok(range(v * 10, 2)))
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![10, 11, 20, 21]);
    assert!(probe.is_completed());
}
