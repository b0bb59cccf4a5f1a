//! Hero content types and per-battle player state.
//!
//! Hero boards are static content loaded at startup and never mutated
//! at runtime. `PlayerState` is immutable-update: every change returns a
//! new state, leaving the caller's copy untouched.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use wk_core::combo::{Combo, ComboSet};
use wk_core::status::Tokens;
use wk_defense::DefenseSchema;

/// Who an ability's status grant lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ApplyTarget {
    /// The ability's user.
    User,
    /// The opposing combatant.
    Opponent,
}

/// A status grant attached to an ability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusApply {
    /// Status id granted.
    pub status: String,
    /// Stacks granted.
    pub stacks: u32,
    /// Who receives the stacks.
    pub target: ApplyTarget,
}

/// A single offensive or defensive ability, keyed by combo on a board.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    /// Display name used in log lines.
    pub name: String,
    /// Damage dealt (offensive boards).
    #[serde(default)]
    pub damage: i32,
    /// Block granted (defensive boards).
    #[serde(default)]
    pub block: i32,
    /// Damage reflected back at the attacker.
    #[serde(default)]
    pub reflect: i32,
    /// Hit points restored to the user.
    #[serde(default)]
    pub heal: i32,
    /// Status grants applied alongside the damage/block.
    #[serde(default)]
    pub applies: Vec<StatusApply>,
    /// Status grants applied before damage is calculated.
    #[serde(default)]
    pub pre_damage: Vec<StatusApply>,
    /// Ultimate abilities win every selection tie-break.
    #[serde(default)]
    pub ultimate: bool,
}

/// Static hero content: boards plus an optional defense schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hero {
    /// Stable content id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Hit point maximum.
    pub max_hp: i32,
    /// Offensive abilities keyed by the combo that unlocks them.
    pub offensive: BTreeMap<Combo, Ability>,
    /// Defensive abilities keyed by combo (legacy path).
    pub defensive: BTreeMap<Combo, Ability>,
    /// Schema-driven defense, when the hero has one.
    #[serde(default)]
    pub defense_schema: Option<DefenseSchema>,
    /// Content version of the schema.
    #[serde(default)]
    pub defense_version: Option<String>,
    /// Fingerprint of the schema's field layout.
    #[serde(default)]
    pub defense_schema_hash: Option<u32>,
}

/// Select the strongest legal offensive ability for a roll.
///
/// Tie-break order: ultimate flag first, then damage descending, then
/// attached status-grant count descending. The order is part of the
/// observable contract.
pub fn best_ability<'a>(hero: &'a Hero, combos: &ComboSet) -> Option<(Combo, &'a Ability)> {
    hero.offensive
        .iter()
        .filter(|(combo, _)| combos.contains(**combo))
        .max_by_key(|(_, ability)| (ability.ultimate, ability.damage, ability.applies.len()))
        .map(|(combo, ability)| (*combo, ability))
}

/// One combatant's live state for the current battle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// The hero being played.
    pub hero: Hero,
    /// Current hit points, always in `0..=hero.max_hp`.
    pub hp: i32,
    /// Status inventory.
    pub tokens: Tokens,
}

impl PlayerState {
    /// A fresh state at full hit points with no statuses.
    pub fn new(hero: Hero) -> Self {
        let hp = hero.max_hp;
        Self {
            hero,
            hp,
            tokens: Tokens::new(),
        }
    }

    /// Return a new state with `delta` applied to hit points, clamped to
    /// `0..=max_hp`.
    pub fn with_hp_delta(&self, delta: i32) -> Self {
        Self {
            hp: (self.hp + delta).clamp(0, self.hero.max_hp),
            ..self.clone()
        }
    }

    /// Return a new state with a replaced status inventory.
    pub fn with_tokens(&self, tokens: Tokens) -> Self {
        Self {
            tokens,
            ..self.clone()
        }
    }

    /// True once hit points are exhausted.
    pub fn is_defeated(&self) -> bool {
        self.hp <= 0
    }
}
