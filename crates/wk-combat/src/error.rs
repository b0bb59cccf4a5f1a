//! Error types for combat resolution.

use wk_core::CoreError;
use wk_defense::DefenseError;

/// Alias for `Result<T, CombatError>`.
pub type CombatResult<T> = Result<T, CombatError>;

/// Errors raised while resolving combat.
///
/// All variants are developer errors (malformed content or rolls); live
/// resolution over validated content never produces them.
#[derive(Debug, thiserror::Error)]
pub enum CombatError {
    /// A core primitive rejected its input.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The defense DSL rejected a schema or matcher.
    #[error(transparent)]
    Defense(#[from] DefenseError),
}
