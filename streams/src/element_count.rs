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

use std::{
    fmt,
    fmt::Formatter,
    ops::{Add, AddAssign, Sub, SubAssign},
};

use thiserror::Error;

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ElementCountError {
    #[error("Element count arithmetic overflowed negatively")]
    OutOfRange,
}

/// A demand counter that behaves like an `i64`, except that the maximum value is treated as "unbounded": adding to or
/// subtracting from an unbounded count leaves it unbounded, and additions that would overflow saturate to unbounded.
///
/// Subscriptions use this for their request accounting. Without the saturating behavior it is very easy to write
/// integer overflow bugs when a subscriber asks for `i64::MAX` elements and the counters are incremented afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ElementCount(i64);

impl ElementCount {
    pub fn new(count: i64) -> Self {
        ElementCount(count)
    }

    /// The absorbing "any number of elements" marker.
    pub fn unbounded() -> Self {
        ElementCount(i64::MAX)
    }

    pub fn get(self) -> i64 {
        self.0
    }

    pub fn is_unbounded(self) -> bool {
        self.0 == i64::MAX
    }

    /// Adds `other`, saturating at the unbounded marker. Fails if the result would overflow negatively.
    pub fn checked_add(self, other: i64) -> Result<Self, ElementCountError> {
        if other > 0 && self.0 > i64::MAX - other {
            // Overflow
            return Ok(ElementCount::unbounded());
        }
        if other < 0 {
            if self.is_unbounded() {
                // Subtracting from unbounded is still unbounded
                return Ok(ElementCount::unbounded());
            }
            if self.0 < i64::MIN - other {
                return Err(ElementCountError::OutOfRange);
            }
        }
        Ok(ElementCount(self.0 + other))
    }

    /// Subtracts `other`, saturating at the unbounded marker. Fails if the result would overflow negatively.
    pub fn checked_sub(self, other: i64) -> Result<Self, ElementCountError> {
        if other < 0 && self.0 > i64::MAX + other {
            // Overflow
            return Ok(ElementCount::unbounded());
        }
        if other > 0 {
            if self.is_unbounded() {
                // Subtracting from unbounded is still unbounded
                return Ok(ElementCount::unbounded());
            }
            if self.0 < i64::MIN + other {
                return Err(ElementCountError::OutOfRange);
            }
        }
        Ok(ElementCount(self.0 - other))
    }
}

impl From<i64> for ElementCount {
    fn from(count: i64) -> Self {
        ElementCount(count)
    }
}

impl From<ElementCount> for i64 {
    fn from(count: ElementCount) -> Self {
        count.0
    }
}

impl PartialEq<i64> for ElementCount {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<ElementCount> for i64 {
    fn eq(&self, other: &ElementCount) -> bool {
        *self == other.0
    }
}

impl PartialOrd<i64> for ElementCount {
    fn partial_cmp(&self, other: &i64) -> Option<std::cmp::Ordering> {
        self.0.partial_cmp(other)
    }
}

impl PartialOrd<ElementCount> for i64 {
    fn partial_cmp(&self, other: &ElementCount) -> Option<std::cmp::Ordering> {
        self.partial_cmp(&other.0)
    }
}

/// Panics on negative overflow. Demand arithmetic never goes below zero in a correct stream; use
/// [`ElementCount::checked_add`] when the operands are not under the caller's control.
impl Add<i64> for ElementCount {
    type Output = ElementCount;

    fn add(self, rhs: i64) -> Self::Output {
        match self.checked_add(rhs) {
            Ok(count) => count,
            Err(err) => panic!("{}", err),
        }
    }
}

impl Add<ElementCount> for ElementCount {
    type Output = ElementCount;

    fn add(self, rhs: ElementCount) -> Self::Output {
        self + rhs.0
    }
}

/// Panics on negative overflow, as [`Add`] does.
impl Sub<i64> for ElementCount {
    type Output = ElementCount;

    fn sub(self, rhs: i64) -> Self::Output {
        match self.checked_sub(rhs) {
            Ok(count) => count,
            Err(err) => panic!("{}", err),
        }
    }
}

impl Sub<ElementCount> for ElementCount {
    type Output = ElementCount;

    fn sub(self, rhs: ElementCount) -> Self::Output {
        self - rhs.0
    }
}

impl AddAssign<i64> for ElementCount {
    fn add_assign(&mut self, rhs: i64) {
        *self = *self + rhs;
    }
}

impl AddAssign<ElementCount> for ElementCount {
    fn add_assign(&mut self, rhs: ElementCount) {
        *self = *self + rhs;
    }
}

impl SubAssign<i64> for ElementCount {
    fn sub_assign(&mut self, rhs: i64) {
        *self = *self - rhs;
    }
}

impl SubAssign<ElementCount> for ElementCount {
    fn sub_assign(&mut self, rhs: ElementCount) {
        *self = *self - rhs;
    }
}

impl fmt::Display for ElementCount {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_unbounded() {
            write!(f, "unbounded")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn construct() {
        assert_eq!(ElementCount::default().get(), 0);
        assert_eq!(ElementCount::new(1).get(), 1);
        assert_eq!(ElementCount::from(5).get(), 5);
    }

    #[test]
    fn unbounded() {
        assert_eq!(ElementCount::unbounded().get(), i64::MAX);
        assert!(ElementCount::unbounded().is_unbounded());
        assert!(ElementCount::new(i64::MAX).is_unbounded());
        assert!(!ElementCount::new(0).is_unbounded());
        assert!(!ElementCount::new(i64::MAX - 1).is_unbounded());
        assert!(!ElementCount::new(i64::MIN).is_unbounded());
    }

    #[test]
    fn add_basic() {
        assert_eq!(ElementCount::new(1) + 2, 3);
        assert_eq!(ElementCount::new(-5) + ElementCount::new(5), 0);
        let mut count = ElementCount::new(10);
        count += 1;
        assert_eq!(count, 11);
        count += ElementCount::new(2);
        assert_eq!(count, 13);
    }

    #[test]
    fn add_saturates_at_unbounded() {
        assert!((ElementCount::new(i64::MAX - 1) + 2).is_unbounded());
        assert!((ElementCount::unbounded() + 1).is_unbounded());
        assert!((ElementCount::unbounded() + 0).is_unbounded());
        // Unbounded absorbs subtraction expressed as a negative addend
        assert!((ElementCount::unbounded() + (-1)).is_unbounded());
    }

    #[test]
    fn add_negative_overflow() {
        assert_eq!(
            ElementCount::new(i64::MIN).checked_add(-1),
            Err(ElementCountError::OutOfRange)
        );
        assert_eq!(ElementCount::new(i64::MIN + 1).checked_add(-1).unwrap().get(), i64::MIN);
    }

    #[test]
    fn sub_basic() {
        assert_eq!(ElementCount::new(3) - 2, 1);
        assert_eq!(ElementCount::new(3) - ElementCount::new(3), 0);
        let mut count = ElementCount::new(10);
        count -= 1;
        assert_eq!(count, 9);
        count -= ElementCount::new(4);
        assert_eq!(count, 5);
    }

    #[test]
    fn sub_saturates_at_unbounded() {
        assert!((ElementCount::unbounded() - 1).is_unbounded());
        assert!((ElementCount::unbounded() - i64::MAX).is_unbounded());
        // Subtracting a negative value that would overflow positively saturates
        assert!((ElementCount::new(i64::MAX - 1) - (-2)).is_unbounded());
    }

    #[test]
    fn sub_negative_overflow() {
        assert_eq!(
            ElementCount::new(i64::MIN).checked_sub(1),
            Err(ElementCountError::OutOfRange)
        );
        assert_eq!(ElementCount::new(0).checked_sub(1).unwrap().get(), -1);
    }

    #[test]
    #[should_panic]
    fn sub_negative_overflow_panics() {
        let _ = ElementCount::new(i64::MIN) - 1;
    }

    #[test]
    fn comparisons() {
        assert!(ElementCount::new(1) < ElementCount::new(2));
        assert!(ElementCount::new(2) > 1);
        assert!(1 < ElementCount::new(2));
        assert!(ElementCount::new(2) <= 2);
        assert!(ElementCount::new(2) >= 2);
        assert_eq!(ElementCount::new(2), 2);
        assert_ne!(ElementCount::new(2), 3);
        assert!(ElementCount::unbounded() > ElementCount::new(i64::MAX - 1));
    }

    #[test]
    fn display() {
        assert_eq!(ElementCount::new(7).to_string(), "7");
        assert_eq!(ElementCount::unbounded().to_string(), "unbounded");
    }
}
