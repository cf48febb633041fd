//! Time-range macros
//!
//! Query templates may embed zero-argument macros of the form `$__name()`.
//! Each recognized macro expands to a value computed from the active
//! [`TimeRange`]. Anything else that happens to start with `$__` is left
//! untouched.

use super::time::TimeRange;

/// A recognized time-range macro
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Macro {
    IsoFrom,
    IsoTo,
    UnixEpochFrom,
    UnixEpochTo,
}

impl Macro {
    pub const ALL: [Macro; 4] = [
        Macro::IsoFrom,
        Macro::IsoTo,
        Macro::UnixEpochFrom,
        Macro::UnixEpochTo,
    ];

    /// Literal token as it appears in a template
    pub fn token(self) -> &'static str {
        match self {
            Macro::IsoFrom => "$__isoFrom()",
            Macro::IsoTo => "$__isoTo()",
            Macro::UnixEpochFrom => "$__unixEpochFrom()",
            Macro::UnixEpochTo => "$__unixEpochTo()",
        }
    }

    /// Value this macro expands to for the given range
    pub fn expand(self, range: &TimeRange) -> String {
        match self {
            Macro::IsoFrom => range.iso_from(),
            Macro::IsoTo => range.iso_to(),
            Macro::UnixEpochFrom => range.unix_from().to_string(),
            Macro::UnixEpochTo => range.unix_to().to_string(),
        }
    }
}

/// Replace every recognized macro in `template` with its expansion
///
/// Expansions never contain `$__`, so the order in which macros are applied
/// does not affect the result.
pub fn resolve(template: &str, range: &TimeRange) -> String {
    if !template.contains("$__") {
        return template.to_string();
    }

    Macro::ALL.iter().fold(template.to_string(), |acc, m| {
        if acc.contains(m.token()) {
            acc.replace(m.token(), &m.expand(range))
        } else {
            acc
        }
    })
}
