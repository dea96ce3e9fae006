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

use crate::publisher::{BoxPublisher, Publisher, PublisherExt};

/// A single boolean: true as soon as any element matches `predicate` (the upstream is cancelled at that point),
/// false when the stream completes without a match.
pub fn some<P, F>(source: P, predicate: F) -> BoxPublisher<bool>
where
    P: Publisher + 'static,
    P::Item: 'static,
    F: FnMut(&P::Item) -> bool + Clone + 'static,
{
    source
        .filter(predicate)
        .take(1)
        .reduce(false, |_any, _value| true)
        .boxed()
}

/// A single boolean: whether any element equals `value`.
pub fn contains<P>(source: P, value: P::Item) -> BoxPublisher<bool>
where
    P: Publisher + 'static,
    P::Item: PartialEq + Clone + 'static,
{
    some(source, move |candidate: &P::Item| *candidate == value)
}
