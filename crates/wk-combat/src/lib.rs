//! Attack resolution and combat flow for Würfelkampf.
//!
//! Builds on `wk-core` (dice, combos, statuses) and `wk-defense` (the
//! schema DSL) to resolve whole attacks: modifier composition, status
//! spends, the legacy defense pipeline, structured logs, events for the
//! turn controller, and telemetry shapes for the stats collector.

pub mod attack;
pub mod content;
pub mod error;
pub mod event;
pub mod hero;
pub mod legacy;
pub mod log;
pub mod telemetry;

pub use attack::{
    AttackContext, AttackResolution, AttackSummary, DefensePath, Outcome, SpendRequest,
    resolve_attack,
};
pub use error::{CombatError, CombatResult};
pub use event::{CombatEvent, FollowUp, FxEvent, FxKind, PrePhase, Side, TURN_END_DELAY_MS};
pub use hero::{Ability, ApplyTarget, Hero, PlayerState, StatusApply, best_ability};
pub use legacy::{LegacyDefense, auto_select, defense_options, resolve_legacy_defense};
pub use telemetry::{DefenseSchemaLog, TelemetryCounters, TurnDamageRecord};
