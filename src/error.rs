use thiserror::Error;

/// Failures the pricing pipeline can surface to its caller.
///
/// "No recommended bet" is not represented here: a calculation that finds no
/// value still succeeds and returns a result without a recommendation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("invalid input `{field}`: {detail}")]
    InvalidInput {
        field: &'static str,
        detail: String,
    },

    // Numerical guards should make this unreachable; if it fires anyway we
    // fail fast instead of returning a misleading "no value" result.
    #[error("internal consistency failure: {0}")]
    Internal(&'static str),
}

impl EngineError {
    pub fn invalid(field: &'static str, detail: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            detail: detail.into(),
        }
    }
}
