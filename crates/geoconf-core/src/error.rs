/// Errors raised while turning [`crate::config::ScoringSettings`] into a
/// ready-to-use [`crate::config::ScoringConfig`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Address-part weights feed a weighted average and must be positive.
    #[error("address part `{key}` has invalid weight {weight}: weights must be finite and > 0")]
    InvalidWeight { key: String, weight: f64 },

    #[error("address part at position {index} has an empty `{field}`")]
    EmptyAddressPartField { index: usize, field: &'static str },

    #[error(
        "address part `{key}` reads from unknown hit group `{group}`: expected `address_parts` or `parent`"
    )]
    UnknownHitGroup { key: String, group: String },

    #[error("address part `{0}` is configured more than once")]
    DuplicateAddressPart(String),

    #[error("`{name}` must be a finite number, got {value}")]
    NonFiniteThreshold { name: &'static str, value: f64 },
}
