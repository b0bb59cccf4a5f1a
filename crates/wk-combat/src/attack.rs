//! Attack resolution.
//!
//! Orchestrates one attack from composed base values to applied hit
//! points. Precedence is fixed: attacker pre-damage grants, attacker
//! modifiers, defender modifiers (seeing the attacker-modified damage),
//! then status spends. A negating defense spend short-circuits the whole
//! application.

use serde::{Deserialize, Serialize};

use wk_core::combo::Combo;
use wk_core::status::spend::{AggregatedSpends, SpendContext, aggregate_spends, spend_status_many};
use wk_core::status::{
    ModifierContext, Phase, SpendEffect, StatusRegistry, Tokens, apply_modifiers,
};
use wk_defense::SchemaResolution;

use crate::event::{CombatEvent, FollowUp, FxEvent, FxKind, PrePhase, Side, TURN_END_DELAY_MS};
use crate::hero::{Ability, ApplyTarget, PlayerState, StatusApply};
use crate::legacy::LegacyDefense;
use crate::log;

/// A request to spend a status during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendRequest {
    /// Status id to spend.
    pub status: String,
    /// How many spends to attempt.
    pub attempts: u32,
}

/// How the defender resolved their defense this turn.
#[derive(Debug, Clone, Copy)]
pub enum DefensePath<'a> {
    /// No defense rolled (or nothing matched).
    None,
    /// A defensive-board ability, possibly Chi-augmented.
    Legacy(&'a LegacyDefense),
    /// A schema resolution.
    Schema(&'a SchemaResolution),
}

/// Inputs for one attack resolution.
#[derive(Debug, Clone, Copy)]
pub struct AttackContext<'a> {
    /// Status definitions for the session.
    pub registry: &'a StatusRegistry,
    /// The attacking combatant.
    pub attacker: &'a PlayerState,
    /// The defending combatant.
    pub defender: &'a PlayerState,
    /// Which side is attacking.
    pub attacker_side: Side,
    /// The combo that unlocked the ability.
    pub combo: Combo,
    /// The chosen offensive ability.
    pub ability: &'a Ability,
    /// The defender's resolved defense.
    pub defense: DefensePath<'a>,
    /// Attacker status-spend requests.
    pub attack_spends: &'a [SpendRequest],
    /// Defender status-spend requests.
    pub defense_spends: &'a [SpendRequest],
}

/// Numeric summary of one resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackSummary {
    /// Damage actually removed from the defender's hit points.
    pub damage_dealt: i32,
    /// Damage stopped by block.
    pub blocked: i32,
    /// Damage returned to the attacker.
    pub reflected: i32,
    /// True when a defense spend negated the attack outright.
    pub negated: bool,
    /// Ability damage before modifiers.
    pub base_damage: i32,
    /// Damage after modifiers, before spends.
    pub modified_damage: i32,
    /// Defense block before modifiers.
    pub base_block: i32,
    /// Block after modifiers, before spends.
    pub modified_block: i32,
}

/// How the battle proceeds after this resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Both combatants stand; play continues.
    Continue,
    /// The attacker fell (reflect).
    AttackerDefeated,
    /// The defender fell.
    DefenderDefeated,
}

/// Everything one attack resolution produced.
#[derive(Debug, Clone)]
pub struct AttackResolution {
    /// The attacker's state after the resolution.
    pub attacker: PlayerState,
    /// The defender's state after the resolution.
    pub defender: PlayerState,
    /// Ordered log lines.
    pub logs: Vec<String>,
    /// Visual-effect descriptors; only positive amounts.
    pub fx: Vec<FxEvent>,
    /// Events for the turn controller.
    pub events: Vec<CombatEvent>,
    /// How the battle proceeds.
    pub outcome: Outcome,
    /// Numeric summary.
    pub summary: AttackSummary,
}

/// Resolve one attack.
///
/// Never fails on validated content; errors deeper in the defense DSL
/// (unsupported matchers) surface before this point.
pub fn resolve_attack(ctx: AttackContext<'_>) -> AttackResolution {
    let registry = ctx.registry;
    let mut logs = Vec::new();
    let mut grant_logs = Vec::new();

    logs.push(log::attack_line(
        &ctx.attacker.hero.name,
        &ctx.ability.name,
        ctx.combo.tag(),
    ));

    let mut attacker_tokens = ctx.attacker.tokens.clone();
    let mut defender_tokens = match ctx.defense {
        DefensePath::None => ctx.defender.tokens.clone(),
        DefensePath::Legacy(defense) => defense.tokens.clone(),
        DefensePath::Schema(resolution) => resolution.self_statuses.clone(),
    };

    let (base_block, reflect, heal) = match ctx.defense {
        DefensePath::None => (0, 0, 0),
        DefensePath::Legacy(defense) => {
            logs.push(log::defense_line(&ctx.defender.hero.name, &defense.ability));
            (defense.block, defense.reflect, defense.heal)
        }
        DefensePath::Schema(resolution) => (resolution.total_block, 0, 0),
    };

    // Pre-damage grants land before any damage math.
    apply_grants(
        registry,
        &ctx.ability.pre_damage,
        &ctx.attacker.hero.name,
        &ctx.defender.hero.name,
        &mut attacker_tokens,
        &mut defender_tokens,
        &mut grant_logs,
    );

    let base_damage = ctx.ability.damage;
    let (attack_ctx, attack_mod_logs) = apply_modifiers(
        registry,
        &attacker_tokens,
        ModifierContext {
            phase: Phase::Attack,
            base_damage,
            base_block,
        },
    );
    let (defense_ctx, defense_mod_logs) = apply_modifiers(
        registry,
        &defender_tokens,
        ModifierContext {
            phase: Phase::Defense,
            ..attack_ctx
        },
    );
    logs.extend(attack_mod_logs);
    logs.extend(defense_mod_logs);

    let modified_damage = defense_ctx.base_damage.max(0);
    let modified_block = defense_ctx.base_block.max(0);

    let (next_attacker_tokens, attack_agg) = run_spends(
        registry,
        &attacker_tokens,
        ctx.attack_spends,
        Phase::Attack,
        modified_damage,
        modified_block,
        false,
    );
    attacker_tokens = next_attacker_tokens;
    // Pure-block spends are wasted when a modifier already zeroed block;
    // they are dropped before spending so the stacks survive.
    let (next_defender_tokens, defense_agg) = run_spends(
        registry,
        &defender_tokens,
        ctx.defense_spends,
        Phase::Defense,
        modified_damage,
        modified_block,
        modified_block == 0,
    );
    defender_tokens = next_defender_tokens;
    logs.extend(attack_agg.logs.iter().cloned());
    logs.extend(defense_agg.logs.iter().cloned());

    // A suppressed attack cannot be revived by a damage spend, and a
    // zeroed block cannot be revived by a block spend.
    let bonus_damage = if modified_damage > 0 {
        attack_agg.bonus_damage
    } else {
        0
    };
    let bonus_block = if modified_block > 0 {
        defense_agg.bonus_block
    } else {
        0
    };
    let effective_damage = modified_damage + bonus_damage;
    let effective_block = modified_block + bonus_block;

    let mut summary = AttackSummary {
        base_damage,
        modified_damage,
        base_block,
        modified_block,
        ..AttackSummary::default()
    };

    if defense_agg.negate_incoming {
        summary.negated = true;
        logs.push(log::negated_line());
        logs.append(&mut grant_logs);
        let attacker = ctx.attacker.with_tokens(attacker_tokens);
        let defender = ctx.defender.with_tokens(defender_tokens);
        push_hp_lines(&mut logs, &attacker, &defender);
        let (outcome, events) = conclude(&attacker, &defender, ctx.attacker_side);
        return AttackResolution {
            attacker,
            defender,
            logs,
            fx: Vec::new(),
            events,
            outcome,
            summary,
        };
    }

    let nominal = (effective_damage - effective_block).max(0);
    let mut defender = ctx.defender.with_tokens(defender_tokens.clone());
    let hp_before = defender.hp;
    defender = defender.with_hp_delta(-nominal);
    let dealt = hp_before - defender.hp;

    apply_grants(
        registry,
        &ctx.ability.applies,
        &ctx.attacker.hero.name,
        &ctx.defender.hero.name,
        &mut attacker_tokens,
        &mut defender_tokens,
        &mut grant_logs,
    );
    defender = defender.with_tokens(defender_tokens);

    let mut attacker = ctx.attacker.with_tokens(attacker_tokens);
    let attacker_before = attacker.hp;
    if reflect > 0 && dealt > 0 {
        attacker = attacker.with_hp_delta(-reflect);
    }
    let reflected = attacker_before - attacker.hp;

    if heal > 0 {
        defender = defender.with_hp_delta(heal);
    }

    summary.damage_dealt = dealt;
    summary.blocked = effective_block.min(effective_damage).max(0);
    summary.reflected = reflected;

    logs.push(log::hit_line(dealt, summary.blocked));
    logs.push(log::receives_line(&defender.hero.name, dealt));
    if reflected > 0 {
        logs.push(log::reflect_line(&attacker.hero.name, reflected));
    }
    if heal > 0 {
        logs.push(log::heal_line(&defender.hero.name, heal));
    }
    logs.append(&mut grant_logs);
    push_hp_lines(&mut logs, &attacker, &defender);

    let mut fx = Vec::new();
    if dealt > 0 {
        fx.push(FxEvent {
            side: ctx.attacker_side.other(),
            amount: dealt,
            kind: FxKind::Damage,
        });
    }
    if reflected > 0 {
        fx.push(FxEvent {
            side: ctx.attacker_side,
            amount: reflected,
            kind: FxKind::Reflect,
        });
    }

    let (outcome, events) = conclude(&attacker, &defender, ctx.attacker_side);
    AttackResolution {
        attacker,
        defender,
        logs,
        fx,
        events,
        outcome,
        summary,
    }
}

/// Spend each requested status in order, threading cumulative context.
fn run_spends(
    registry: &StatusRegistry,
    tokens: &Tokens,
    requests: &[SpendRequest],
    phase: Phase,
    base_damage: i32,
    base_block: i32,
    drop_pure_block_spends: bool,
) -> (Tokens, AggregatedSpends) {
    let mut current = tokens.clone();
    let mut running = SpendContext {
        phase,
        roll_value: None,
        base_damage,
        base_block,
    };
    let mut summaries = Vec::new();

    for request in requests {
        if drop_pure_block_spends && is_pure_block_spend(registry, &request.status) {
            continue;
        }
        let (next, summary) =
            spend_status_many(registry, &current, &request.status, request.attempts, &running);
        current = next;
        if let Some(summary) = summary {
            running.base_damage += summary.bonus_damage;
            running.base_block += summary.bonus_block;
            summaries.push(summary);
        }
    }
    (current, aggregate_spends(summaries))
}

fn is_pure_block_spend(registry: &StatusRegistry, id: &str) -> bool {
    registry
        .lookup(id)
        .and_then(|def| def.spend.as_ref())
        .is_some_and(|rule| matches!(rule.effect, SpendEffect::BonusBlock { .. }))
}

/// Apply ability status grants to their targets, logging each.
fn apply_grants(
    registry: &StatusRegistry,
    grants: &[StatusApply],
    attacker_name: &str,
    defender_name: &str,
    attacker_tokens: &mut Tokens,
    defender_tokens: &mut Tokens,
    logs: &mut Vec<String>,
) {
    for grant in grants {
        let display = registry
            .lookup(&grant.status)
            .map_or(grant.status.clone(), |def| def.name.clone());
        match grant.target {
            ApplyTarget::User => {
                *attacker_tokens = attacker_tokens.add(registry, &grant.status, grant.stacks as i32);
                logs.push(log::status_gain_line(attacker_name, grant.stacks, &display));
            }
            ApplyTarget::Opponent => {
                *defender_tokens = defender_tokens.add(registry, &grant.status, grant.stacks as i32);
                logs.push(log::status_gain_line(defender_name, grant.stacks, &display));
            }
        }
    }
}

fn push_hp_lines(logs: &mut Vec<String>, attacker: &PlayerState, defender: &PlayerState) {
    logs.push(log::hp_line(
        &defender.hero.name,
        defender.hp,
        defender.hero.max_hp,
    ));
    logs.push(log::hp_line(
        &attacker.hero.name,
        attacker.hp,
        attacker.hero.max_hp,
    ));
}

/// Outcome and, on continue, exactly one turn-end event.
fn conclude(
    attacker: &PlayerState,
    defender: &PlayerState,
    attacker_side: Side,
) -> (Outcome, Vec<CombatEvent>) {
    if defender.is_defeated() {
        return (Outcome::DefenderDefeated, Vec::new());
    }
    if attacker.is_defeated() {
        return (Outcome::AttackerDefeated, Vec::new());
    }
    let next = attacker_side.other();
    let event = CombatEvent::TurnEnd {
        next,
        duration_ms: TURN_END_DELAY_MS,
        pre_phase: PrePhase::Upkeep,
        follow_up: (next == Side::Ai).then_some(FollowUp::TriggerAiTurn),
    };
    (Outcome::Continue, vec![event])
}
