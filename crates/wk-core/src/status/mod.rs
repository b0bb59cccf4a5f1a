//! Status-effect definitions, token maps, and the modifier protocol.
//!
//! A [`StatusRegistry`] is an owned value — there is no process-wide
//! table. Sessions each carry their own registry so server-side games
//! never share mutable state. Token maps are immutable-update: every
//! mutation returns a new map, leaving the caller's copy untouched.

pub mod spend;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::tags;

/// A game phase in which statuses can be spent or modifiers applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Phase {
    /// The attacker's side of a resolution.
    Attack,
    /// The defender's side of a resolution.
    Defense,
    /// Just before damage is applied to hit points.
    PreApplyDamage,
    /// Between turns (upkeep ticks, expiry).
    Upkeep,
}

/// When a granted status becomes usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GrantPhase {
    /// Usable within the same resolution that granted it.
    Immediate,
    /// Usable from the next turn boundary.
    NextTurn,
    /// Usable in the pre-apply-damage window of a later resolution.
    PreApplyDamage,
}

/// Whether a status helps or hurts its holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Polarity {
    /// Beneficial to the holder.
    Positive,
    /// Harmful to the holder.
    Negative,
}

/// Whether the holder actively spends the status or it acts on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Activation {
    /// Spendable by the holder during allowed phases.
    Active,
    /// Applies automatically (modifier hooks, upkeep ticks).
    Passive,
}

/// What one successful spend produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum SpendEffect {
    /// Flat bonus damage added to the attack.
    BonusDamage {
        /// Damage added per spend.
        amount: i32,
    },
    /// Flat bonus block added to the defense.
    BonusBlock {
        /// Block added per spend.
        amount: i32,
    },
    /// Negates the incoming attack entirely (evasive dodge).
    Negate,
}

/// How a status may be spent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRule {
    /// Stacks consumed per spend.
    pub cost_stacks: u32,
    /// Phases in which spending is allowed.
    pub allowed_phases: Vec<Phase>,
    /// Optional per-turn spend budget.
    pub turn_limited: Option<u32>,
    /// The effect of one successful spend.
    pub effect: SpendEffect,
}

/// A passive hook that rewrites the damage/block context before spends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifierHook {
    /// The phase this hook participates in.
    pub phase: Phase,
    /// Ascending application order; lower runs first.
    pub priority: i32,
    /// What the hook does to the context.
    pub kind: ModifierKind,
}

/// The closed set of modifier behaviors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ModifierKind {
    /// Adds `amount` damage per held stack.
    DamagePerStack {
        /// Damage per stack.
        amount: i32,
    },
    /// Adds `amount` block per held stack.
    BlockPerStack {
        /// Block per stack.
        amount: i32,
    },
    /// Adds a flat block amount regardless of stacks.
    FlatBlock {
        /// Flat block added.
        amount: i32,
    },
    /// Forces base damage to zero (damage suppression).
    SuppressDamage,
    /// Forces base block to zero.
    SuppressBlock,
}

/// Declarative configuration for one status id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusDef {
    /// Stable identifier used in token maps and content tables.
    pub id: String,
    /// Display name used in log lines.
    pub name: String,
    /// Whether the status helps or hurts its holder.
    pub polarity: Polarity,
    /// Active (spendable) or passive.
    pub activation: Activation,
    /// Stack cap; `None` means unbounded.
    pub max_stacks: Option<u32>,
    /// Spend rule, if the status is spendable.
    pub spend: Option<SpendRule>,
    /// Modifier hook, if the status rewrites damage/block contexts.
    pub modifier: Option<ModifierHook>,
}

/// Registry of status definitions for one game session.
#[derive(Debug, Clone, Default)]
pub struct StatusRegistry {
    defs: BTreeMap<String, StatusDef>,
}

impl StatusRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition, overwriting any previous one with the same id.
    pub fn register(&mut self, def: StatusDef) {
        self.defs.insert(def.id.clone(), def);
    }

    /// Look up a definition by id.
    pub fn lookup(&self, id: &str) -> Option<&StatusDef> {
        self.defs.get(id)
    }

    /// Iterate over all registered ids in sorted order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.defs.keys().map(String::as_str)
    }
}

/// A player's status inventory: status id to stack count.
///
/// Updates return a new map; counts are clamped to `0..=max_stacks`.
/// Unknown ids read as zero stacks and never error.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tokens {
    stacks: BTreeMap<String, u32>,
}

impl Tokens {
    /// Create an empty inventory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stack count for a status (0 if absent or unknown).
    pub fn stacks(&self, id: &str) -> u32 {
        self.stacks.get(id).copied().unwrap_or(0)
    }

    /// Return a new inventory with the stack count set to `value`,
    /// clamped to the status's declared cap. Zero entries are dropped.
    pub fn with_stacks(&self, registry: &StatusRegistry, id: &str, value: u32) -> Self {
        let cap = registry.lookup(id).and_then(|d| d.max_stacks);
        let clamped = cap.map_or(value, |c| value.min(c));
        let mut next = self.stacks.clone();
        if clamped == 0 {
            next.remove(id);
        } else {
            next.insert(id.to_string(), clamped);
        }
        Self { stacks: next }
    }

    /// Return a new inventory with `delta` applied, never going below zero.
    pub fn add(&self, registry: &StatusRegistry, id: &str, delta: i32) -> Self {
        let current = i64::from(self.stacks(id));
        let next = (current + i64::from(delta)).max(0) as u32;
        self.with_stacks(registry, id, next)
    }

    /// Iterate over held statuses with positive stack counts, in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.stacks.iter().map(|(id, &n)| (id.as_str(), n))
    }

    /// Returns true if no stacks are held.
    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

/// The damage/block context threaded through modifier application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModifierContext {
    /// The phase being composed (selects which hooks run).
    pub phase: Phase,
    /// Running base damage.
    pub base_damage: i32,
    /// Running base block.
    pub base_block: i32,
}

/// Apply every matching modifier hook for the held statuses.
///
/// Hooks run in ascending priority (ties broken by status id), each
/// rewriting the context and emitting a log line. Modifiers always run
/// before any status-spend aggregation.
pub fn apply_modifiers(
    registry: &StatusRegistry,
    tokens: &Tokens,
    mut ctx: ModifierContext,
) -> (ModifierContext, Vec<String>) {
    let mut hooks: Vec<(&StatusDef, ModifierHook, u32)> = tokens
        .iter()
        .filter_map(|(id, stacks)| {
            let def = registry.lookup(id)?;
            let hook = def.modifier?;
            (hook.phase == ctx.phase).then_some((def, hook, stacks))
        })
        .collect();
    hooks.sort_by(|a, b| a.1.priority.cmp(&b.1.priority).then(a.0.id.cmp(&b.0.id)));

    let mut logs = Vec::new();
    for (def, hook, stacks) in hooks {
        let tag = tags::status(&def.name);
        match hook.kind {
            ModifierKind::DamagePerStack { amount } => {
                let delta = amount * stacks as i32;
                ctx.base_damage += delta;
                logs.push(format!("{tag} {} dmg", signed(delta)));
            }
            ModifierKind::BlockPerStack { amount } => {
                let delta = amount * stacks as i32;
                ctx.base_block += delta;
                logs.push(format!("{tag} {} block", signed(delta)));
            }
            ModifierKind::FlatBlock { amount } => {
                ctx.base_block += amount;
                logs.push(format!("{tag} {} block", signed(amount)));
            }
            ModifierKind::SuppressDamage => {
                ctx.base_damage = 0;
                logs.push(format!("{tag} suppresses all damage"));
            }
            ModifierKind::SuppressBlock => {
                ctx.base_block = 0;
                logs.push(format!("{tag} suppresses all block"));
            }
        }
    }
    (ctx, logs)
}

/// Format a delta with an explicit sign, e.g. `+3` or `-2`.
fn signed(n: i32) -> String {
    if n >= 0 { format!("+{n}") } else { n.to_string() }
}
