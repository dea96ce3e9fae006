// Copyright 2024. The Shuriken Project
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

use std::{
    fmt,
    fmt::{Display, Formatter},
};

use shuriken_streams::StreamError;
use thiserror::Error;

/// The final outcome reported by the transport for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RpcStatusCode {
    Ok,
    Cancelled,
    InvalidArgument,
    DeadlineExceeded,
    NotFound,
    Internal,
    Unavailable,
    Unknown,
}

impl Display for RpcStatusCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let name = match self {
            RpcStatusCode::Ok => "Ok",
            RpcStatusCode::Cancelled => "Cancelled",
            RpcStatusCode::InvalidArgument => "InvalidArgument",
            RpcStatusCode::DeadlineExceeded => "DeadlineExceeded",
            RpcStatusCode::NotFound => "NotFound",
            RpcStatusCode::Internal => "Internal",
            RpcStatusCode::Unavailable => "Unavailable",
            RpcStatusCode::Unknown => "Unknown",
        };
        write!(f, "{}", name)
    }
}

/// A status code plus a human-readable detail message. A non-ok status surfaces to subscribers as the `on_error`
/// signal of the response stream.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Request failed ({code}): {message}")]
pub struct RpcStatus {
    code: RpcStatusCode,
    message: String,
}

impl RpcStatus {
    pub fn new<S: Into<String>>(code: RpcStatusCode, message: S) -> Self {
        RpcStatus {
            code,
            message: message.into(),
        }
    }

    pub fn ok() -> Self {
        RpcStatus::new(RpcStatusCode::Ok, "")
    }

    pub fn cancelled() -> Self {
        RpcStatus::new(RpcStatusCode::Cancelled, "The call was cancelled")
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        RpcStatus::new(RpcStatusCode::NotFound, message)
    }

    pub fn invalid_argument<S: Into<String>>(message: S) -> Self {
        RpcStatus::new(RpcStatusCode::InvalidArgument, message)
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        RpcStatus::new(RpcStatusCode::Internal, message)
    }

    pub fn unavailable<S: Into<String>>(message: S) -> Self {
        RpcStatus::new(RpcStatusCode::Unavailable, message)
    }

    pub fn is_ok(&self) -> bool {
        self.code == RpcStatusCode::Ok
    }

    pub fn code(&self) -> RpcStatusCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<RpcStatus> for StreamError {
    fn from(status: RpcStatus) -> Self {
        StreamError::other(status)
    }
}
