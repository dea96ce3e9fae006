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

use crate::{
    ops::concat::concat,
    publisher::{BoxPublisher, Publisher, PublisherExt},
    sources::{from_vec, start},
};

/// Prefixes the stream with the given values.
pub fn start_with<P>(source: P, values: Vec<P::Item>) -> BoxPublisher<P::Item>
where
    P: Publisher + 'static,
    P::Item: Clone + 'static,
{
    concat(vec![from_vec(values).boxed(), source.boxed()]).boxed()
}

/// Prefixes the stream with one lazily produced value. Useful when the prefix is expensive or not cloneable until
/// subscription time.
pub fn start_with_get<P, M>(source: P, make_value: M) -> BoxPublisher<P::Item>
where
    P: Publisher + 'static,
    P::Item: 'static,
    M: FnMut() -> P::Item + Clone + 'static,
{
    concat(vec![start(make_value).boxed(), source.boxed()]).boxed()
}
