//! Error types for the defense DSL.
//!
//! These are developer errors: with validated schemas and a correct dice
//! count they never occur at runtime. Soft conditions (failed effect
//! conditions, unimplemented effect kinds) are traces, not errors.

/// Alias for `Result<T, DefenseError>`.
pub type DefenseResult<T> = Result<T, DefenseError>;

/// Errors raised by matcher evaluation and schema validation.
#[derive(Debug, thiserror::Error)]
pub enum DefenseError {
    /// A matcher kind that is declared in the type system but has no
    /// runtime evaluation yet (`exactFace`, `combo`).
    #[error("matcher '{0}' not supported in runtime yet")]
    UnsupportedMatcher(&'static str),

    /// A rule referenced a field id missing from the schema.
    #[error("unknown field '{0}' referenced at runtime")]
    UnknownField(String),

    /// The live roll does not match the schema's declared dice count.
    #[error("dice count mismatch: schema declares {expected}, roll has {got}")]
    DiceCountMismatch {
        /// Dice count declared by the schema.
        expected: usize,
        /// Dice count of the live roll.
        got: usize,
    },

    /// Schema validation failed at content-load time.
    #[error("invalid defense schema for '{hero}': {errors}")]
    InvalidSchema {
        /// The hero the schema belongs to ("unknown" if not given).
        hero: String,
        /// All formatted validation errors, joined with "; ".
        errors: String,
    },
}
