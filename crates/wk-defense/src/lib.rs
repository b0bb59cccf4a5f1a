//! Defense rule DSL for Würfelkampf.
//!
//! A hero's defense schema partitions the six die faces into labeled
//! fields and declares rules pairing a matcher (how dice in a field are
//! counted) with effects (block, damage, status grants). Resolving a
//! schema against a live roll produces block/damage totals, status
//! grants, and a fixed six-stage damage-reduction checkpoint ledger.

pub mod effect;
pub mod error;
pub mod matcher;
pub mod resolver;
pub mod schema;
pub mod validate;

pub use effect::{
    BlockContribution, DamageContribution, EffectConditions, EffectConfig, EffectExecution,
    EffectTarget, EffectTrace, EffectsResult, StatusGrant, StatusRequirement, execute_effects,
};
pub use error::{DefenseError, DefenseResult};
pub use matcher::{MatcherConfig, MatcherEvaluation, RollStats, evaluate_matcher};
pub use resolver::{Checkpoints, ResolveParams, RuleHit, SchemaResolution, resolve_defense_schema};
pub use schema::{DefenseSchema, FieldDef, RuleDef};
pub use validate::{
    ValidateOptions, ValidationIssue, ValidationReport, assert_defense_schema_valid,
    compute_fields_hash, validate_defense_schema,
};

/// Reserved status id granted by the `preventHalf` effect.
pub const PREVENT_HALF_STATUS: &str = "prevent_half";
