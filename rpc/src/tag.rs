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

use std::{fmt, rc::Rc};

/// The completion slots of an object that can be handed to the event queue as a tag.
///
/// Most handlers only ever use the primary slot. Bidirectional streaming posts reads and writes concurrently on the
/// same object and distinguishes them by handing out a primary tag for the writer and an alternate tag for the
/// reader.
pub trait TagHandler {
    fn operation_done(&self, success: bool);

    fn alternate_operation_done(&self, success: bool) {
        let _ = success;
        panic!("Alternate completion delivered to a tag handler without an alternate slot");
    }
}

/// A pending-operation token: who to call back, and through which slot.
///
/// Posting a tag on the queue clones the handler reference, which keeps the handler alive for as long as the
/// operation is outstanding; dispatching consumes the tag, balancing that retain with exactly one release.
#[derive(Clone)]
pub struct CqTag {
    handler: Rc<dyn TagHandler>,
    alternate: bool,
}

impl CqTag {
    pub fn primary(handler: Rc<dyn TagHandler>) -> Self {
        CqTag {
            handler,
            alternate: false,
        }
    }

    pub fn alternate(handler: Rc<dyn TagHandler>) -> Self {
        CqTag {
            handler,
            alternate: true,
        }
    }

    pub fn is_alternate(&self) -> bool {
        self.alternate
    }

    /// The tag's identity word: the handler address with the alternate flag in the low bit. Handler objects are
    /// pointer-aligned, so the low bit is always free to carry the flag.
    pub fn id(&self) -> usize {
        (Rc::as_ptr(&self.handler) as *const () as usize) | usize::from(self.alternate)
    }

    /// Routes the completion into the handler's matching slot and releases the handler reference.
    pub fn dispatch(self, success: bool) {
        if self.alternate {
            self.handler.alternate_operation_done(success);
        } else {
            self.handler.operation_done(success);
        }
    }
}

impl fmt::Debug for CqTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CqTag")
            .field("id", &format_args!("{:#x}", self.id()))
            .field("alternate", &self.alternate)
            .finish()
    }
}
