//! Error types for the core crate.

/// Alias for `Result<T, CoreError>`.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur when constructing core values from raw data.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A die face outside the 1..=6 range.
    #[error("invalid die face: {0} (expected 1..=6)")]
    InvalidFace(u8),

    /// A dice sequence with the wrong number of dice.
    #[error("invalid dice count: {0} (expected {expected})", expected = crate::dice::DICE_PER_ROLL)]
    InvalidDiceCount(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        assert_eq!(
            CoreError::InvalidFace(9).to_string(),
            "invalid die face: 9 (expected 1..=6)"
        );
        assert_eq!(
            CoreError::InvalidDiceCount(3).to_string(),
            "invalid dice count: 3 (expected 5)"
        );
    }
}
