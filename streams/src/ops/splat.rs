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

//! Helpers that unpack tuple-valued stream elements before invoking a callback, so that
//!
//! ```ignore
//! pairs.map(|(num, name)| ...)
//! ```
//!
//! can be written with a named callback that takes the parts as separate arguments:
//!
//! ```ignore
//! pairs.map(splat2(describe))
//! ```
//!
//! Purely synchronous; nothing stream-specific happens here.

/// Adapts a two-argument callback into one that takes a pair.
pub fn splat2<A, B, R, F>(mut callback: F) -> impl FnMut((A, B)) -> R + Clone
where F: FnMut(A, B) -> R + Clone {
    move |(a, b)| callback(a, b)
}

/// Adapts a three-argument callback into one that takes a triple.
pub fn splat3<A, B, C, R, F>(mut callback: F) -> impl FnMut((A, B, C)) -> R + Clone
where F: FnMut(A, B, C) -> R + Clone {
    move |(a, b, c)| callback(a, b, c)
}
