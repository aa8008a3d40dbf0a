//! Cell types for renc
//!
//! This module defines the boxed value every handle points at. A [`Cell`]
//! pairs a [`Payload`] with a reference count.
//!
//! ## The Six Kinds
//!
//! 1. `Void` - no value at all
//! 2. `Blank` - the "none" placeholder value
//! 3. `Logic` - boolean true or false
//! 4. `Integer` - 64-bit signed integer
//! 5. `Decimal` - 64-bit IEEE-754 floating point
//! 6. `Char` - a single Unicode scalar value
//!
//! ## Tag / Payload Agreement
//!
//! The kind is never stored next to the payload. It is derived from the
//! payload variant, so a cell cannot carry an `Integer` tag over a decimal
//! payload. Typed accessors return [`Error::TypeMismatch`] instead of
//! reinterpreting the payload.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tag identifying the payload variant of a cell
///
/// The discriminants are stable and cross the C boundary as-is.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellKind {
    /// No value
    Void = 0,
    /// The "none" placeholder
    Blank = 1,
    /// Boolean
    Logic = 2,
    /// 64-bit signed integer
    Integer = 3,
    /// 64-bit IEEE-754 float
    Decimal = 4,
    /// Unicode scalar value
    Char = 5,
}

impl CellKind {
    /// All kinds in discriminant order
    pub const ALL: [CellKind; 6] = [
        CellKind::Void,
        CellKind::Blank,
        CellKind::Logic,
        CellKind::Integer,
        CellKind::Decimal,
        CellKind::Char,
    ];

    /// Returns the kind name as a string (for error messages)
    pub fn name(&self) -> &'static str {
        match self {
            CellKind::Void => "void",
            CellKind::Blank => "blank",
            CellKind::Logic => "logic",
            CellKind::Integer => "integer",
            CellKind::Decimal => "decimal",
            CellKind::Char => "char",
        }
    }

    /// Decode a raw discriminant, such as the byte `renc_kind_of` writes
    pub fn from_u8(raw: u8) -> Option<Self> {
        Self::ALL.get(raw as usize).copied()
    }
}

impl fmt::Display for CellKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The value carried by a cell
///
/// Exactly one variant per [`CellKind`]. The widest member is 64 bits.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// No value
    Void,
    /// The "none" placeholder
    Blank,
    /// Boolean true or false
    Logic(bool),
    /// 64-bit signed integer
    Integer(i64),
    /// 64-bit IEEE-754 floating point
    Decimal(f64),
    /// Unicode scalar value
    Char(char),
}

impl Payload {
    /// The kind tag for this payload
    pub fn kind(&self) -> CellKind {
        match self {
            Payload::Void => CellKind::Void,
            Payload::Blank => CellKind::Blank,
            Payload::Logic(_) => CellKind::Logic,
            Payload::Integer(_) => CellKind::Integer,
            Payload::Decimal(_) => CellKind::Decimal,
            Payload::Char(_) => CellKind::Char,
        }
    }

    /// Try to get as i64
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Payload::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as bool
    pub fn as_logic(&self) -> Option<bool> {
        match self {
            Payload::Logic(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as f64
    pub fn as_decimal(&self) -> Option<f64> {
        match self {
            Payload::Decimal(d) => Some(*d),
            _ => None,
        }
    }

    /// Try to get as char
    pub fn as_char(&self) -> Option<char> {
        match self {
            Payload::Char(c) => Some(*c),
            _ => None,
        }
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Integer(v)
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Logic(v)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Decimal(v)
    }
}

impl From<char> for Payload {
    fn from(v: char) -> Self {
        Payload::Char(v)
    }
}

/// A single boxed runtime value
///
/// The payload is fixed at construction. Only the reference-count manager
/// touches `refcount`, through [`Cell::increment`] and [`Cell::decrement`].
///
/// ## Invariants
///
/// - `refcount == 0`: no live handle reaches this cell, the slot may be reused
/// - `refcount > 0`: the slot must not be reused for another value
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    payload: Payload,
    refcount: u32,
}

impl Cell {
    /// Create a cell holding `payload` with a reference count of 1
    pub fn new(payload: Payload) -> Self {
        Self {
            payload,
            refcount: 1,
        }
    }

    /// The kind tag of this cell
    #[inline]
    pub fn kind(&self) -> CellKind {
        self.payload.kind()
    }

    /// The payload of this cell
    #[inline]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Current reference count
    #[inline]
    pub fn refcount(&self) -> u32 {
        self.refcount
    }

    /// Whether any handle still owns this cell
    #[inline]
    pub fn is_live(&self) -> bool {
        self.refcount > 0
    }

    /// Increment the reference count and return the new count
    ///
    /// There is no upper bound check. Overflowing `u32::MAX` panics in
    /// debug builds.
    #[inline]
    pub fn increment(&mut self) -> u32 {
        self.refcount += 1;
        self.refcount
    }

    /// Decrement the reference count and return the new count
    ///
    /// Returns `None` if the count was already zero; the count is left
    /// untouched in that case.
    #[inline]
    pub fn decrement(&mut self) -> Option<u32> {
        self.refcount = self.refcount.checked_sub(1)?;
        Some(self.refcount)
    }

    /// Checked integer accessor
    pub fn integer(&self) -> Result<i64> {
        self.payload
            .as_integer()
            .ok_or_else(|| self.mismatch(CellKind::Integer))
    }

    /// Integer accessor without a kind check
    ///
    /// # Safety
    ///
    /// The caller must have established that `self.kind() == CellKind::Integer`.
    /// Debug builds assert it; release builds treat a violation as
    /// unreachable code, which is undefined behavior.
    #[inline]
    pub unsafe fn integer_unchecked(&self) -> i64 {
        debug_assert_eq!(
            self.kind(),
            CellKind::Integer,
            "unchecked integer access on a {} cell",
            self.kind()
        );
        match self.payload {
            Payload::Integer(i) => i,
            // SAFETY: upheld by the caller, see above.
            _ => unsafe { std::hint::unreachable_unchecked() },
        }
    }

    /// Checked logic accessor
    pub fn logic(&self) -> Result<bool> {
        self.payload
            .as_logic()
            .ok_or_else(|| self.mismatch(CellKind::Logic))
    }

    /// Checked decimal accessor
    pub fn decimal(&self) -> Result<f64> {
        self.payload
            .as_decimal()
            .ok_or_else(|| self.mismatch(CellKind::Decimal))
    }

    /// Checked char accessor
    pub fn char(&self) -> Result<char> {
        self.payload
            .as_char()
            .ok_or_else(|| self.mismatch(CellKind::Char))
    }

    fn mismatch(&self, expected: CellKind) -> Error {
        Error::TypeMismatch {
            expected,
            actual: self.kind(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn any_payload() -> impl Strategy<Value = Payload> {
        prop_oneof![
            Just(Payload::Void),
            Just(Payload::Blank),
            any::<bool>().prop_map(Payload::Logic),
            any::<i64>().prop_map(Payload::Integer),
            any::<f64>().prop_map(Payload::Decimal),
            any::<char>().prop_map(Payload::Char),
        ]
    }

    proptest! {
        #[test]
        fn prop_exactly_one_accessor_succeeds(payload in any_payload()) {
            let cell = Cell::new(payload);
            let hits = [
                cell.integer().is_ok(),
                cell.logic().is_ok(),
                cell.decimal().is_ok(),
                cell.char().is_ok(),
            ]
            .iter()
            .filter(|ok| **ok)
            .count();
            let expected = match cell.kind() {
                CellKind::Void | CellKind::Blank => 0,
                _ => 1,
            };
            prop_assert_eq!(hits, expected);
        }

        #[test]
        fn prop_refcount_balances(n in 0u32..1000) {
            let mut cell = Cell::new(Payload::Integer(0));
            for _ in 0..n {
                cell.increment();
            }
            for _ in 0..n {
                cell.decrement();
            }
            prop_assert_eq!(cell.refcount(), 1);
        }
    }

    #[test]
    fn test_new_cell_has_refcount_one() {
        let cell = Cell::new(Payload::Integer(7));
        assert_eq!(cell.refcount(), 1);
        assert!(cell.is_live());
        assert_eq!(cell.kind(), CellKind::Integer);
    }

    #[test]
    fn test_kind_follows_payload() {
        assert_eq!(Payload::Void.kind(), CellKind::Void);
        assert_eq!(Payload::Blank.kind(), CellKind::Blank);
        assert_eq!(Payload::Logic(true).kind(), CellKind::Logic);
        assert_eq!(Payload::Integer(0).kind(), CellKind::Integer);
        assert_eq!(Payload::Decimal(0.5).kind(), CellKind::Decimal);
        assert_eq!(Payload::Char('x').kind(), CellKind::Char);
    }

    #[test]
    fn test_checked_accessor_rejects_wrong_kind() {
        let cell = Cell::new(Payload::Logic(true));
        let err = cell.integer().unwrap_err();
        assert!(matches!(
            err,
            Error::TypeMismatch {
                expected: CellKind::Integer,
                actual: CellKind::Logic
            }
        ));
        assert!(cell.logic().unwrap());
        assert!(cell.decimal().is_err());
        assert!(cell.char().is_err());
    }

    #[test]
    fn test_unchecked_matches_checked() {
        for v in [i64::MIN, -1, 0, 1, i64::MAX] {
            let cell = Cell::new(Payload::Integer(v));
            let unchecked = unsafe { cell.integer_unchecked() };
            assert_eq!(cell.integer().unwrap(), unchecked);
        }
    }

    #[test]
    fn test_decrement_stops_at_zero() {
        let mut cell = Cell::new(Payload::Blank);
        assert_eq!(cell.increment(), 2);
        assert_eq!(cell.decrement(), Some(1));
        assert_eq!(cell.decrement(), Some(0));
        assert!(!cell.is_live());
        assert_eq!(cell.decrement(), None);
        assert_eq!(cell.refcount(), 0);
    }

    #[test]
    fn test_kind_from_u8() {
        for kind in CellKind::ALL {
            assert_eq!(CellKind::from_u8(kind as u8), Some(kind));
        }
        assert_eq!(CellKind::from_u8(6), None);
        assert_eq!(CellKind::from_u8(u8::MAX), None);
    }

    #[test]
    fn test_payload_from_primitives() {
        assert_eq!(Payload::from(3i64), Payload::Integer(3));
        assert_eq!(Payload::from(false), Payload::Logic(false));
        assert_eq!(Payload::from(2.5f64), Payload::Decimal(2.5));
        assert_eq!(Payload::from('z'), Payload::Char('z'));
    }
}
