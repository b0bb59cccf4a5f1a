//! Defense resolution for heroes without a schema.
//!
//! Matched combos filter the defensive board in a fixed priority order;
//! the chosen ability's block can then be topped up by spending Chi one
//! stack at a time, re-checked against the running total so the spend
//! stops as soon as block covers the incoming damage.

use serde::{Deserialize, Serialize};

use wk_core::combo::{Combo, ComboSet, DEFENSE_COMBO_PRIORITY};
use wk_core::status::spend::{SpendContext, StatusSpend, StatusSpendSummary, spend_status};
use wk_core::status::{Phase, StatusRegistry, Tokens};

use crate::content::CHI_STATUS;
use crate::hero::{Ability, Hero, StatusApply};

/// Defensive abilities unlocked by a roll, in fixed priority order
/// (5OAK > LARGE_STRAIGHT > 4OAK > FULL_HOUSE > SMALL_STRAIGHT > 3OAK >
/// PAIR_PAIR).
pub fn defense_options<'a>(hero: &'a Hero, combos: &ComboSet) -> Vec<(Combo, &'a Ability)> {
    DEFENSE_COMBO_PRIORITY
        .into_iter()
        .filter(|combo| combos.contains(*combo))
        .filter_map(|combo| hero.defensive.get(&combo).map(|ability| (combo, ability)))
        .collect()
}

/// The AI's pick: the option with the highest block.
pub fn auto_select<'a>(options: &[(Combo, &'a Ability)]) -> Option<(Combo, &'a Ability)> {
    options
        .iter()
        .max_by_key(|(_, ability)| ability.block)
        .copied()
}

/// The result of resolving one legacy defense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDefense {
    /// Display name of the chosen ability.
    pub ability: String,
    /// Total block after Chi augmentation.
    pub block: i32,
    /// Block from the ability alone.
    pub base_block: i32,
    /// Damage reflected at the attacker.
    pub reflect: i32,
    /// Hit points restored to the defender.
    pub heal: i32,
    /// Status grants carried by the ability.
    pub grants: Vec<StatusApply>,
    /// Chi spends performed, if any.
    pub chi: Option<StatusSpendSummary>,
    /// The defender's tokens after Chi spends.
    pub tokens: Tokens,
}

/// Resolve a chosen defensive ability against incoming damage.
///
/// Chi stacks are spent one at a time against the running block total,
/// stopping early once block meets the incoming damage, the stacks run
/// out, or the per-turn spend budget is exhausted.
pub fn resolve_legacy_defense(
    registry: &StatusRegistry,
    tokens: &Tokens,
    ability: &Ability,
    incoming: i32,
) -> LegacyDefense {
    let mut block = ability.block;
    let mut current = tokens.clone();
    let mut spends: Vec<StatusSpend> = Vec::new();

    let budget = registry
        .lookup(CHI_STATUS)
        .and_then(|def| def.spend.as_ref())
        .map_or(0, |rule| rule.turn_limited.unwrap_or(u32::MAX));

    while block < incoming && (spends.len() as u32) < budget {
        let ctx = SpendContext {
            phase: Phase::Defense,
            roll_value: None,
            base_damage: incoming,
            base_block: block,
        };
        match spend_status(registry, &current, CHI_STATUS, &ctx) {
            Some((next, spend)) => {
                block += spend.bonus_block;
                current = next;
                spends.push(spend);
            }
            None => break,
        }
    }

    let chi = if spends.is_empty() {
        None
    } else {
        Some(StatusSpendSummary {
            status: CHI_STATUS.to_string(),
            attempts: spends.len() as u32,
            successes: spends.len() as u32,
            bonus_damage: 0,
            bonus_block: spends.iter().map(|s| s.bonus_block).sum(),
            negate_incoming: false,
            logs: spends.iter().map(|s| s.log.clone()).collect(),
        })
    };

    LegacyDefense {
        ability: ability.name.clone(),
        block,
        base_block: ability.block,
        reflect: ability.reflect,
        heal: ability.heal,
        grants: ability.applies.clone(),
        chi,
        tokens: current,
    }
}
