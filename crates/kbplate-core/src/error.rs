use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("unknown {field} \"{value}\" (expected one of: {expected})")]
    UnknownValue {
        field: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("invalid value for \"{field}\": {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("key #{index} is invalid: {reason}")]
    InvalidKey { index: usize, reason: String },

    #[error("no layers requested")]
    NoLayers,

    #[error("layout has no keys")]
    NoKeys,
}

impl ConfigError {
    pub(crate) fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
