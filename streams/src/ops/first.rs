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
    error::StreamError,
    publisher::{BoxPublisher, Publisher, PublisherExt},
    sources::throw_error,
};

/// The first element of the stream; an out-of-range failure if the stream turns out to be empty.
pub fn first<P>(source: P) -> BoxPublisher<P::Item>
where
    P: Publisher + 'static,
    P::Item: 'static,
{
    // take(1) bounds the upstream; if_empty supplies the failure when no value arrived.
    source.take(1).if_empty(throw_error::<P::Item>(StreamError::out_of_range(
        "Cannot take the first element of empty stream",
    )))
}

/// The first element matching `predicate`; an out-of-range failure if none does.
pub fn first_where<P, F>(source: P, predicate: F) -> BoxPublisher<P::Item>
where
    P: Publisher + 'static,
    P::Item: 'static,
    F: FnMut(&P::Item) -> bool + Clone + 'static,
{
    first(source.filter(predicate))
}
