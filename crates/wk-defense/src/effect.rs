//! Effect execution for matched rules.
//!
//! Effects are independent: a failed condition or an unimplemented kind
//! records a skipped trace and moves on — one effect can never abort its
//! rule. Per-die effects ("for each matching die") scale by the match
//! count; On-style effects (flat block, status grants) apply once.

use serde::{Deserialize, Serialize};

use wk_core::status::{GrantPhase, Tokens};

use crate::PREVENT_HALF_STATUS;
use crate::matcher::MatcherEvaluation;

/// Who an effect applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EffectTarget {
    /// The defending player who owns the schema.
    #[serde(rename = "self")]
    Own,
    /// The opposing player.
    #[serde(rename = "opponent")]
    Opponent,
    /// A teammate (reserved for future multi-ally battles).
    #[serde(rename = "ally")]
    Ally,
}

/// A status-stack requirement on a participant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRequirement {
    /// Status id that must be held.
    pub status: String,
    /// Minimum stacks required (default 1).
    #[serde(default)]
    pub min_stacks: Option<u32>,
}

/// Conditions gating an effect, checked against live participant snapshots.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EffectConditions {
    /// Requires the schema owner to hold a status.
    #[serde(default)]
    pub requires_self_status: Option<StatusRequirement>,
    /// Requires the opponent to hold a status.
    #[serde(default)]
    pub requires_opponent_status: Option<StatusRequirement>,
}

/// A rule effect, executed in declared order after a successful match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EffectConfig {
    /// Deal `amount` damage per matching die (defaults to the opponent).
    #[serde(rename_all = "camelCase")]
    DealPer {
        /// Damage per matching die.
        amount: i32,
        /// Cap on the total damage.
        #[serde(default)]
        cap: Option<i32>,
        /// Effect target override.
        #[serde(default)]
        target: Option<EffectTarget>,
        /// Gating conditions.
        #[serde(default)]
        conditions: Option<EffectConditions>,
    },
    /// Block a fixed amount once, independent of the match count.
    #[serde(rename_all = "camelCase")]
    FlatBlock {
        /// Flat block amount.
        amount: i32,
        /// Cap on the amount.
        #[serde(default)]
        cap: Option<i32>,
        /// Effect target override.
        #[serde(default)]
        target: Option<EffectTarget>,
        /// Gating conditions.
        #[serde(default)]
        conditions: Option<EffectConditions>,
    },
    /// Block `amount` per matching die.
    #[serde(rename_all = "camelCase")]
    BlockPer {
        /// Block per matching die.
        amount: i32,
        /// Cap on the total block.
        #[serde(default)]
        cap: Option<i32>,
        /// Effect target override.
        #[serde(default)]
        target: Option<EffectTarget>,
        /// Gating conditions.
        #[serde(default)]
        conditions: Option<EffectConditions>,
    },
    /// Grant stacks of a status once, independent of the match count.
    #[serde(rename_all = "camelCase")]
    GainStatus {
        /// Status id to grant.
        status: String,
        /// Stacks granted (default 1).
        #[serde(default)]
        stacks: Option<u32>,
        /// Effect target override.
        #[serde(default)]
        target: Option<EffectTarget>,
        /// When the grant becomes usable (default next turn).
        #[serde(default)]
        usable_phase: Option<GrantPhase>,
        /// Turns until the grant expires.
        #[serde(default)]
        expires_in: Option<u32>,
        /// Stack cap override for this grant.
        #[serde(default)]
        max_stacks: Option<u32>,
        /// Gating conditions.
        #[serde(default)]
        conditions: Option<EffectConditions>,
    },
    /// Grant the reserved `prevent_half` status once.
    #[serde(rename_all = "camelCase")]
    PreventHalf {
        /// Stacks granted (default 1).
        #[serde(default)]
        stacks: Option<u32>,
        /// Gating conditions.
        #[serde(default)]
        conditions: Option<EffectConditions>,
    },
    /// Declared but not executed yet: heal the target.
    #[serde(rename_all = "camelCase")]
    Heal {
        /// Heal amount.
        amount: i32,
    },
    /// Declared but not executed yet: reflect damage to the attacker.
    #[serde(rename_all = "camelCase")]
    Reflect {
        /// Reflect amount.
        amount: i32,
    },
}

impl EffectConfig {
    /// The effect's kind tag, for traces and diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::DealPer { .. } => "dealPer",
            Self::FlatBlock { .. } => "flatBlock",
            Self::BlockPer { .. } => "blockPer",
            Self::GainStatus { .. } => "gainStatus",
            Self::PreventHalf { .. } => "preventHalf",
            Self::Heal { .. } => "heal",
            Self::Reflect { .. } => "reflect",
        }
    }

    fn conditions(&self) -> Option<&EffectConditions> {
        match self {
            Self::DealPer { conditions, .. }
            | Self::FlatBlock { conditions, .. }
            | Self::BlockPer { conditions, .. }
            | Self::GainStatus { conditions, .. }
            | Self::PreventHalf { conditions, .. } => conditions.as_ref(),
            Self::Heal { .. } | Self::Reflect { .. } => None,
        }
    }
}

/// A block contribution produced by one effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContribution {
    /// Block amount after caps.
    pub amount: i32,
    /// True for per-die scaling (blockPer), false for flat block.
    pub per_die: bool,
    /// Who the block protects.
    pub target: EffectTarget,
    /// The rule that produced it.
    pub rule_id: String,
}

/// A damage contribution produced by one effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DamageContribution {
    /// Damage amount after caps.
    pub amount: i32,
    /// Who takes the damage.
    pub target: EffectTarget,
    /// The rule that produced it.
    pub rule_id: String,
}

/// A status grant produced by one effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusGrant {
    /// Status id granted.
    pub status: String,
    /// Stacks granted.
    pub stacks: u32,
    /// Who receives the grant.
    pub target: EffectTarget,
    /// When the grant becomes usable.
    pub usable_phase: GrantPhase,
    /// Turns until expiry, if limited.
    pub expires_in: Option<u32>,
    /// Stack cap override.
    pub max_stacks: Option<u32>,
    /// The rule that produced it.
    pub rule_id: String,
}

/// One trace entry per effect, applied or skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectTrace {
    /// The rule the effect belongs to.
    pub rule_id: String,
    /// The effect's kind tag.
    pub effect: String,
    /// Whether the effect applied.
    pub applied: bool,
    /// Reason for skipping, when not applied.
    pub reason: Option<String>,
}

/// Everything produced by executing one rule's effects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EffectsResult {
    /// Block contributions.
    pub blocks: Vec<BlockContribution>,
    /// Damage contributions.
    pub damage: Vec<DamageContribution>,
    /// Status grants.
    pub status: Vec<StatusGrant>,
    /// One trace per effect.
    pub traces: Vec<EffectTrace>,
}

/// Inputs for executing one matched rule's effects.
#[derive(Debug, Clone, Copy)]
pub struct EffectExecution<'a> {
    /// The matched rule's id.
    pub rule_id: &'a str,
    /// Effects in declared order.
    pub effects: &'a [EffectConfig],
    /// The matcher evaluation that triggered the rule.
    pub evaluation: &'a MatcherEvaluation,
    /// The schema owner's live status snapshot.
    pub own: Option<&'a Tokens>,
    /// The opponent's live status snapshot.
    pub opponent: Option<&'a Tokens>,
}

/// Execute a matched rule's effects in declared order.
pub fn execute_effects(exec: EffectExecution<'_>) -> EffectsResult {
    let mut result = EffectsResult::default();
    let count = exec.evaluation.match_count as i32;

    for effect in exec.effects {
        if let Some(reason) = failed_condition(effect, exec.own, exec.opponent) {
            result.traces.push(EffectTrace {
                rule_id: exec.rule_id.to_string(),
                effect: effect.kind().to_string(),
                applied: false,
                reason: Some(reason),
            });
            continue;
        }

        let applied = match effect {
            EffectConfig::DealPer {
                amount,
                cap,
                target,
                ..
            } => {
                let total = clamp_cap(amount * count, *cap);
                result.damage.push(DamageContribution {
                    amount: total,
                    target: target.unwrap_or(EffectTarget::Opponent),
                    rule_id: exec.rule_id.to_string(),
                });
                true
            }
            EffectConfig::FlatBlock {
                amount,
                cap,
                target,
                ..
            } => {
                result.blocks.push(BlockContribution {
                    amount: clamp_cap(*amount, *cap),
                    per_die: false,
                    target: target.unwrap_or(EffectTarget::Own),
                    rule_id: exec.rule_id.to_string(),
                });
                true
            }
            EffectConfig::BlockPer {
                amount,
                cap,
                target,
                ..
            } => {
                result.blocks.push(BlockContribution {
                    amount: clamp_cap(amount * count, *cap),
                    per_die: true,
                    target: target.unwrap_or(EffectTarget::Own),
                    rule_id: exec.rule_id.to_string(),
                });
                true
            }
            EffectConfig::GainStatus {
                status,
                stacks,
                target,
                usable_phase,
                expires_in,
                max_stacks,
                ..
            } => {
                result.status.push(StatusGrant {
                    status: status.clone(),
                    stacks: stacks.unwrap_or(1),
                    target: target.unwrap_or(EffectTarget::Own),
                    usable_phase: usable_phase.unwrap_or(GrantPhase::NextTurn),
                    expires_in: *expires_in,
                    max_stacks: *max_stacks,
                    rule_id: exec.rule_id.to_string(),
                });
                true
            }
            EffectConfig::PreventHalf { stacks, .. } => {
                result.status.push(StatusGrant {
                    status: PREVENT_HALF_STATUS.to_string(),
                    stacks: stacks.unwrap_or(1),
                    target: EffectTarget::Own,
                    usable_phase: GrantPhase::PreApplyDamage,
                    expires_in: None,
                    max_stacks: None,
                    rule_id: exec.rule_id.to_string(),
                });
                true
            }
            EffectConfig::Heal { .. } | EffectConfig::Reflect { .. } => {
                result.traces.push(EffectTrace {
                    rule_id: exec.rule_id.to_string(),
                    effect: effect.kind().to_string(),
                    applied: false,
                    reason: Some("not implemented".to_string()),
                });
                continue;
            }
        };

        result.traces.push(EffectTrace {
            rule_id: exec.rule_id.to_string(),
            effect: effect.kind().to_string(),
            applied,
            reason: None,
        });
    }

    result
}

/// Check an effect's conditions; returns a skip reason on failure.
fn failed_condition(
    effect: &EffectConfig,
    own: Option<&Tokens>,
    opponent: Option<&Tokens>,
) -> Option<String> {
    let conditions = effect.conditions()?;

    if let Some(req) = &conditions.requires_self_status {
        let held = own.map_or(0, |t| t.stacks(&req.status));
        let needed = req.min_stacks.unwrap_or(1);
        if held < needed {
            return Some(format!(
                "requires {needed}+ {} on self (has {held})",
                req.status
            ));
        }
    }
    if let Some(req) = &conditions.requires_opponent_status {
        let held = opponent.map_or(0, |t| t.stacks(&req.status));
        let needed = req.min_stacks.unwrap_or(1);
        if held < needed {
            return Some(format!(
                "requires {needed}+ {} on opponent (has {held})",
                req.status
            ));
        }
    }
    None
}

/// Clamp a contribution to an optional cap.
fn clamp_cap(amount: i32, cap: Option<i32>) -> i32 {
    cap.map_or(amount, |c| amount.min(c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wk_core::status::StatusRegistry;

    fn match_of(count: u32) -> MatcherEvaluation {
        MatcherEvaluation {
            matched: true,
            match_count: count,
            matched_dice: (0..count as usize).collect(),
            field_total: count,
            total_pairs: None,
        }
    }

    fn run(effects: &[EffectConfig], count: u32) -> EffectsResult {
        execute_effects(EffectExecution {
            rule_id: "r1",
            effects,
            evaluation: &match_of(count),
            own: None,
            opponent: None,
        })
    }

    #[test]
    fn block_per_scales_with_match_count() {
        let result = run(
            &[EffectConfig::BlockPer {
                amount: 1,
                cap: None,
                target: None,
                conditions: None,
            }],
            3,
        );
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].amount, 3);
        assert!(result.blocks[0].per_die);
        assert_eq!(result.blocks[0].target, EffectTarget::Own);
    }

    #[test]
    fn flat_block_ignores_match_count() {
        let result = run(
            &[EffectConfig::FlatBlock {
                amount: 4,
                cap: None,
                target: None,
                conditions: None,
            }],
            5,
        );
        assert_eq!(result.blocks[0].amount, 4);
        assert!(!result.blocks[0].per_die);
    }

    #[test]
    fn deal_per_defaults_to_opponent() {
        let result = run(
            &[EffectConfig::DealPer {
                amount: 2,
                cap: None,
                target: None,
                conditions: None,
            }],
            2,
        );
        assert_eq!(result.damage[0].amount, 4);
        assert_eq!(result.damage[0].target, EffectTarget::Opponent);
    }

    #[test]
    fn caps_clamp_totals() {
        let result = run(
            &[EffectConfig::DealPer {
                amount: 3,
                cap: Some(5),
                target: None,
                conditions: None,
            }],
            4,
        );
        assert_eq!(result.damage[0].amount, 5);
    }

    #[test]
    fn gain_status_applies_once_with_defaults() {
        let result = run(
            &[EffectConfig::GainStatus {
                status: "chi".to_string(),
                stacks: Some(2),
                target: None,
                usable_phase: None,
                expires_in: None,
                max_stacks: None,
                conditions: None,
            }],
            3,
        );
        // Granted once regardless of match count.
        assert_eq!(result.status.len(), 1);
        assert_eq!(result.status[0].stacks, 2);
        assert_eq!(result.status[0].usable_phase, GrantPhase::NextTurn);
    }

    #[test]
    fn prevent_half_grants_reserved_status() {
        let result = run(
            &[EffectConfig::PreventHalf {
                stacks: None,
                conditions: None,
            }],
            2,
        );
        assert_eq!(result.status[0].status, PREVENT_HALF_STATUS);
        assert_eq!(result.status[0].stacks, 1);
        assert_eq!(result.status[0].usable_phase, GrantPhase::PreApplyDamage);
    }

    #[test]
    fn unimplemented_kinds_skip_without_error() {
        let result = run(&[EffectConfig::Heal { amount: 3 }], 1);
        assert!(result.blocks.is_empty());
        assert_eq!(result.traces.len(), 1);
        assert!(!result.traces[0].applied);
        assert_eq!(result.traces[0].reason.as_deref(), Some("not implemented"));
    }

    #[test]
    fn failed_condition_skips_and_continues() {
        let registry = StatusRegistry::new();
        let own = Tokens::new().with_stacks(&registry, "chi", 1);
        let effects = vec![
            EffectConfig::FlatBlock {
                amount: 2,
                cap: None,
                target: None,
                conditions: Some(EffectConditions {
                    requires_self_status: Some(StatusRequirement {
                        status: "chi".to_string(),
                        min_stacks: Some(3),
                    }),
                    requires_opponent_status: None,
                }),
            },
            EffectConfig::FlatBlock {
                amount: 1,
                cap: None,
                target: None,
                conditions: None,
            },
        ];
        let result = execute_effects(EffectExecution {
            rule_id: "r1",
            effects: &effects,
            evaluation: &match_of(1),
            own: Some(&own),
            opponent: None,
        });
        assert_eq!(result.blocks.len(), 1);
        assert_eq!(result.blocks[0].amount, 1);
        assert_eq!(result.traces.len(), 2);
        assert!(!result.traces[0].applied);
        assert_eq!(
            result.traces[0].reason.as_deref(),
            Some("requires 3+ chi on self (has 1)")
        );
        assert!(result.traces[1].applied);
    }

    #[test]
    fn every_effect_gets_exactly_one_trace() {
        let effects = vec![
            EffectConfig::FlatBlock {
                amount: 1,
                cap: None,
                target: None,
                conditions: None,
            },
            EffectConfig::Heal { amount: 2 },
            EffectConfig::PreventHalf {
                stacks: None,
                conditions: None,
            },
        ];
        let result = run(&effects, 1);
        assert_eq!(result.traces.len(), effects.len());
    }
}
