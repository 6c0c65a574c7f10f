//! Primitive comparisons shared by the field scorers.
//!
//! [`fuzzy`] wraps string similarity; [`property`] layers the
//! presence/absence policy and numeric proximity on top of it.

pub mod fuzzy;
pub mod property;

pub use fuzzy::{FuzzyMatcher, LevenshteinMatcher};
pub use property::{MatchPolicy, match_any, match_property, parse_leading_int};
