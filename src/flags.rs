//! Neutral regex flags and their translation into engine options.
//!
//! Bit values follow Python's `re` module so callers migrating pattern sets
//! can keep their stored flag integers unchanged.

use std::borrow::Cow;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use log::warn;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Always-on in both engines, so it is accepted and dropped.
const UNICODE_BIT: u32 = 32;

/// Engine-independent flag bitmask.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct Flags(u32);

impl Flags {
    pub const NONE: Flags = Flags(0);
    /// Case-insensitive matching (`re.IGNORECASE`)
    pub const IGNORECASE: Flags = Flags(2);
    /// `^` and `$` match at line boundaries (`re.MULTILINE`)
    pub const MULTILINE: Flags = Flags(8);
    /// `.` matches `\n` (`re.DOTALL`)
    pub const DOTALL: Flags = Flags(16);

    const ALL: u32 = Self::IGNORECASE.0 | Self::MULTILINE.0 | Self::DOTALL.0;

    /// Build flags from a raw bitmask.
    ///
    /// The UNICODE bit is dropped; any bit other than IGNORECASE, MULTILINE
    /// and DOTALL (VERBOSE, LOCALE, ...) is rejected rather than ignored.
    pub fn from_bits(bits: u32) -> Result<Flags> {
        let unknown = bits & !(Self::ALL | UNICODE_BIT);
        if unknown != 0 {
            return Err(Error::UnsupportedFlags { bits: unknown });
        }
        Ok(Flags(bits & Self::ALL))
    }

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Convert flag names as stored in pattern definitions
    /// (e.g. `["IGNORECASE", "MULTILINE"]`) into a bitmask.
    ///
    /// UNICODE is a no-op. VERBOSE has no equivalent and only produces a
    /// warning, as do names that are not recognized at all.
    pub fn from_names<I, S>(names: I) -> Flags
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut flags = Flags::NONE;
        for name in names {
            let name = name.as_ref().trim();
            match name.to_ascii_uppercase().as_str() {
                "IGNORECASE" | "I" => flags |= Flags::IGNORECASE,
                "MULTILINE" | "M" => flags |= Flags::MULTILINE,
                "DOTALL" | "S" => flags |= Flags::DOTALL,
                "UNICODE" | "U" => {}
                "VERBOSE" | "X" => warn!(
                    "VERBOSE flag is not supported; pattern comments and whitespace will not be ignored"
                ),
                _ => warn!("unknown regex flag {name:?} ignored"),
            }
        }
        flags
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl BitOrAssign for Flags {
    fn bitor_assign(&mut self, rhs: Flags) {
        self.0 |= rhs.0;
    }
}

impl TryFrom<u32> for Flags {
    type Error = Error;

    fn try_from(bits: u32) -> Result<Flags> {
        Flags::from_bits(bits)
    }
}

impl From<Flags> for u32 {
    fn from(flags: Flags) -> u32 {
        flags.0
    }
}

impl fmt::Display for Flags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Shorthand for [`Flags::from_names`].
pub fn convert_flags<I, S>(names: I) -> Flags
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Flags::from_names(names)
}

/// Compile-time options shared by both engines.
///
/// MULTILINE has no option here; it travels inside the pattern, see
/// [`apply_multiline`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineOptions {
    pub case_insensitive: bool,
    pub dot_matches_new_line: bool,
}

/// Translate neutral flags into engine options.
#[must_use]
pub fn translate(flags: Flags) -> EngineOptions {
    EngineOptions {
        case_insensitive: flags.contains(Flags::IGNORECASE),
        dot_matches_new_line: flags.contains(Flags::DOTALL),
    }
}

/// Prefix the pattern with `(?m)` when MULTILINE is set.
///
/// The directive is scoped to the enclosing group once the pattern is wrapped
/// for fullmatch, so the outer anchors keep matching only at text boundaries.
#[must_use]
pub fn apply_multiline(pattern: &str, flags: Flags) -> Cow<'_, str> {
    if flags.contains(Flags::MULTILINE) {
        Cow::Owned(format!("(?m){pattern}"))
    } else {
        Cow::Borrowed(pattern)
    }
}
