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

//! The combinator algebra: transforms that wrap a single upstream, and multiplexers that juggle several.
//!
//! Most operators are reached through [`PublisherExt`](crate::publisher::PublisherExt); `concat` and `merge` take
//! their input list directly and live here as free functions.

pub mod append;
pub mod catch;
pub mod concat;
pub mod concat_map;
pub mod count;
pub mod element_at;
pub mod filter;
pub mod first;
pub mod if_empty;
pub mod last;
pub mod map;
pub mod merge;
pub mod pipe;
pub mod reduce;
pub mod skip;
pub mod some;
pub mod splat;
pub mod start_with;
pub mod take;
pub mod take_while;

pub use catch::Catch;
pub use concat::{concat, Concat};
pub use concat_map::{ConcatMap, FlatMap};
pub use filter::{Filter, TryFilter};
pub use map::{Map, TryMap};
pub use merge::{merge, Merge};
pub use reduce::{Reduce, ReduceMultiple, ReduceWith};
pub use skip::Skip;
pub use splat::{splat2, splat3};
pub use take::Take;
pub use take_while::TakeWhile;
