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

//! Operator composition as plain function application. Fluent chaining through
//! [`PublisherExt`](crate::publisher::PublisherExt) is the primary surface; these macros exist for code that treats
//! operators as values and strings them together.

/// Pipes a starting value through a sequence of operators.
///
/// `pipe!(v, a, b, c)` is `c(b(a(v)))`:
///
/// ```
/// use shuriken_streams::{pipe, PublisherExt};
/// use shuriken_streams::sources::range;
///
/// let evens = pipe!(
///     range(0, 100),
///     |p| p.filter(|v| v % 2 == 0),
///     |p| p.take(3),
/// );
/// ```
#[macro_export]
macro_rules! pipe {
    ($value:expr $(,)?) => { $value };
    ($value:expr, $($operator:expr),+ $(,)?) => {{
        let piped = $value;
        $(let piped = ($operator)(piped);)+
        piped
    }};
}

/// Builds the composition of a sequence of operators without applying it.
///
/// `build_pipe!(a, b)` is `|v| b(a(v))`. The result can be applied to any value the first operator accepts, one
/// time per closure instance.
#[macro_export]
macro_rules! build_pipe {
    ($($operator:expr),* $(,)?) => {
        move |piped| $crate::pipe!(piped $(, $operator)*)
    };
}
