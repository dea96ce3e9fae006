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

//! End-to-end pipeline behavior: combinators stacked the way applications stack them, driven with the demand
//! patterns the contract has to survive.

use rand::Rng;
use shuriken_streams::{
    ops::{concat, merge},
    sources::{from_vec, just, range, throw_error},
    ElementCount,
    Publisher,
    PublisherExt,
    StreamError,
    Subscription,
};
use shuriken_test_utils::streams::{collect_events, recording, StreamEvent};

#[test]
fn just_map_doubles_a_single_value() {
    let (subscriber, probe) = recording();
    let sub = just(1).map(|x| x + x).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(2), StreamEvent::Complete]);
}

#[test]
fn from_map_delivers_one_value_per_request() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 5]).map(|x| x + x).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(2)]);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![
        StreamEvent::Next(2),
        StreamEvent::Next(10),
        StreamEvent::Complete
    ]);
}

#[test]
fn range_filter_take_pipeline() {
    let (subscriber, probe) = recording();
    let sub = range(0, 100)
        .filter(|v| v % 2 == 0)
        .take(3)
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.events(), vec![
        StreamEvent::Next(0),
        StreamEvent::Next(2),
        StreamEvent::Next(4),
        StreamEvent::Complete
    ]);
}

#[test]
fn concat_delivers_across_boundaries_on_demand() {
    let (subscriber, probe) = recording();
    let sub = concat(vec![just(1).boxed(), just(2).boxed(), just(3).boxed()]).subscribe(subscriber);
    sub.request(ElementCount::new(2));
    assert_eq!(probe.events(), vec![StreamEvent::Next(1), StreamEvent::Next(2)]);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![
        StreamEvent::Next(1),
        StreamEvent::Next(2),
        StreamEvent::Next(3),
        StreamEvent::Complete
    ]);
}

#[test]
fn merge_interleaves_without_buffering_under_unbounded_demand() {
    let (subscriber, probe) = recording();
    let sub = merge(vec![from_vec(vec![1, 3]).boxed(), from_vec(vec![2, 4]).boxed()]).subscribe(subscriber);
    sub.request(ElementCount::unbounded());

    let values = probe.next_values();
    let mut sorted = values.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, vec![1, 2, 3, 4]);
    let pos = |v: i32| values.iter().position(|x| *x == v).unwrap();
    assert!(pos(1) < pos(3));
    assert!(pos(2) < pos(4));
    assert!(probe.is_completed());
}

#[test]
fn reduce_sums_with_an_initial_value() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2]).reduce(100, |acc, v| acc + v).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    assert_eq!(probe.events(), vec![StreamEvent::Next(103), StreamEvent::Complete]);
}

#[test]
fn no_on_next_after_terminal() {
    // take completes and cancels mid-stream; anything arriving later must be dropped.
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2, 3, 4]).take(2).subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    sub.request(ElementCount::new(10));
    let events = probe.events();
    let terminal = events
        .iter()
        .position(|e| matches!(e, StreamEvent::Complete | StreamEvent::Error(_)))
        .unwrap();
    assert_eq!(terminal, events.len() - 1);
}

#[test]
fn delivered_count_never_exceeds_requested() {
    let mut rng = rand::thread_rng();
    for _ in 0..50 {
        let len = rng.gen_range(0..10);
        let items: Vec<i32> = (0..len).collect();
        let (subscriber, probe) = recording();
        let sub = from_vec(items).subscribe(subscriber);

        let mut requested: i64 = 0;
        for _ in 0..rng.gen_range(1..5) {
            let count = rng.gen_range(0..4);
            requested += count;
            sub.request(ElementCount::new(count));
            assert!(probe.next_values().len() as i64 <= requested);
        }
    }
}

#[test]
fn split_requests_are_equivalent_to_one_request() {
    let mut rng = rand::thread_rng();
    let items: Vec<i32> = (0..20).collect();

    for _ in 0..20 {
        let total = rng.gen_range(1..25);

        let (subscriber, whole) = recording();
        let sub = from_vec(items.clone()).subscribe(subscriber);
        sub.request(ElementCount::new(total));

        let (subscriber, split) = recording();
        let sub = from_vec(items.clone()).subscribe(subscriber);
        let mut remaining = total;
        while remaining > 0 {
            let chunk = rng.gen_range(1..=remaining);
            sub.request(ElementCount::new(chunk));
            remaining -= chunk;
        }

        assert_eq!(whole.events(), split.events());
    }
}

#[test]
fn cancel_quiesces_the_stream() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2, 3]).subscribe(subscriber);
    sub.request(ElementCount::new(1));
    sub.cancel();
    sub.request(ElementCount::new(10));
    assert_eq!(probe.events(), vec![StreamEvent::Next(1)]);
}

#[test]
fn source_to_sink_round_trip() {
    let items = vec![3, 1, 4, 1, 5];
    let events = collect_events(&from_vec(items.clone()));
    let expected: Vec<StreamEvent<i32>> = items
        .into_iter()
        .map(StreamEvent::Next)
        .chain(std::iter::once(StreamEvent::Complete))
        .collect();
    assert_eq!(events, expected);
}

#[test]
fn map_fusion_law() {
    let g = |x: i32| x * 3;
    let f = |x: i32| x + 1;
    let fused = collect_events(&from_vec(vec![1, 2, 3]).map(move |x| f(g(x))));
    let chained = collect_events(&from_vec(vec![1, 2, 3]).map(g).map(f));
    assert_eq!(fused, chained);
}

#[test]
fn filter_idempotence_law() {
    let p = |v: &i32| v % 3 == 0;
    let once = collect_events(&range(0, 30).filter(p));
    let twice = collect_events(&range(0, 30).filter(p).filter(p));
    assert_eq!(once, twice);
}

#[test]
fn take_bound_law() {
    for (n, len) in [(0, 5), (3, 5), (5, 5), (9, 5)] {
        let items: Vec<i64> = (0..len).collect();
        let events = collect_events(&from_vec(items).take(n));
        let values = events
            .iter()
            .filter(|e| matches!(e, StreamEvent::Next(_)))
            .count() as i64;
        assert_eq!(values, n.min(len));
        assert_eq!(events.last(), Some(&StreamEvent::Complete));
    }
}

#[test]
fn concat_associativity_law() {
    let a = || just(1).boxed();
    let b = || just(2).boxed();
    let c = || just(3).boxed();
    let left = collect_events(&concat(vec![concat(vec![a(), b()]).boxed(), c()]));
    let right = collect_events(&concat(vec![a(), concat(vec![b(), c()]).boxed()]));
    assert_eq!(left, right);
}

#[test]
fn catch_preserves_the_prefix_and_appends_the_recovery() {
    let (subscriber, probe) = recording();
    let sub = from_vec(vec![1, 2])
        .append(throw_error::<i32>(StreamError::logic("boom")))
        .catch_error(|_err| from_vec(vec![10, 11]))
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());
    assert_eq!(probe.next_values(), vec![1, 2, 10, 11]);
    assert!(probe.is_completed());
}

#[test]
fn deep_pipelines_compose() {
    let (subscriber, probe) = recording();
    let sub = range(0, 1000)
        .skip(10)
        .filter(|v| v % 7 == 0)
        .map(|v| v * 2)
        .take_while(|v| *v < 200)
        .concat_map(|v| Ok(from_vec(vec![v, v + 1])))
        .subscribe(subscriber);
    sub.request(ElementCount::unbounded());

    let mut expected = Vec::new();
    for v in (10..1000).filter(|v| v % 7 == 0).map(|v| v * 2).take_while(|v| *v < 200) {
        expected.push(v);
        expected.push(v + 1);
    }
    assert_eq!(probe.next_values(), expected);
    assert!(probe.is_completed());
}
