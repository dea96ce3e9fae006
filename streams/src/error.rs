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

use std::{error::Error as StdError, rc::Rc};

use thiserror::Error;

/// The terminal error carried by `on_error` signals.
///
/// Stream errors are cheap to clone so that sources like `throw_error` can deliver the same error to any number of
/// subscriptions, and so that recovery combinators can hand the error to user callbacks by value.
#[derive(Debug, Clone, Error)]
pub enum StreamError {
    /// The streams contract was violated, e.g. a value was delivered that was never requested, or a second terminal
    /// signal arrived. These are programmer errors surfaced to the subscriber rather than panics.
    #[error("Stream contract violated: {0}")]
    Logic(Rc<str>),
    /// An element was demanded from a stream that did not contain it (`first`/`last`/`element_at` on a stream that
    /// ran out of values).
    #[error("{0}")]
    OutOfRange(Rc<str>),
    /// An error produced outside of the streams core, typically by a transport or a user callback.
    #[error("{0}")]
    Other(Rc<dyn StdError>),
}

impl StreamError {
    pub fn logic<S: Into<String>>(msg: S) -> Self {
        StreamError::Logic(msg.into().into())
    }

    pub fn out_of_range<S: Into<String>>(msg: S) -> Self {
        StreamError::OutOfRange(msg.into().into())
    }

    pub fn other<E: StdError + 'static>(err: E) -> Self {
        StreamError::Other(Rc::new(err))
    }

    pub fn is_logic(&self) -> bool {
        matches!(self, StreamError::Logic(_))
    }

    pub fn is_out_of_range(&self) -> bool {
        matches!(self, StreamError::OutOfRange(_))
    }
}
