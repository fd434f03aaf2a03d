use thiserror::Error;

/// Errors raised by the pure rollup and alert computations.
///
/// Anything that touches the network, the disk or the database reports
/// through `anyhow` instead; these variants are data errors and are never
/// retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Malformed observation for city '{city}': {reason}")]
    MalformedInput { city: String, reason: String },
}

impl CoreError {
    pub fn malformed(city: impl Into<String>, reason: impl Into<String>) -> Self {
        CoreError::MalformedInput {
            city: city.into(),
            reason: reason.into(),
        }
    }
}
