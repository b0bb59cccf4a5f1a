//! Core primitives for the Würfelkampf dice-combat engine.
//!
//! Provides the replayable seeded RNG, five-die rolls, poker-style combo
//! detection, and the status-effect protocol (registry, token maps,
//! modifiers, and spends) that the defense DSL and attack resolution
//! build on.

pub mod combo;
pub mod dice;
pub mod error;
pub mod rng;
pub mod status;
pub mod tags;

pub use combo::{Combo, ComboSet, DEFENSE_COMBO_PRIORITY, detect_combos};
pub use dice::{DICE_PER_ROLL, DiceRoll, roll_face};
pub use error::{CoreError, CoreResult};
pub use rng::GameRng;
pub use status::{
    Activation, GrantPhase, ModifierContext, ModifierHook, ModifierKind, Phase, Polarity,
    SpendEffect, SpendRule, StatusDef, StatusRegistry, Tokens, apply_modifiers,
};
pub use status::spend::{
    AggregatedSpends, SpendContext, StatusSpend, StatusSpendSummary, aggregate_spends,
    spend_status, spend_status_many,
};
