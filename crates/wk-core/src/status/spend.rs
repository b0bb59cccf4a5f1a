//! Spending status stacks for immediate bonuses.
//!
//! Spends are soft operations: anything that cannot happen (no spend rule,
//! insufficient stacks, disallowed phase) returns `None` rather than an
//! error — callers check and move on.

use serde::{Deserialize, Serialize};

use crate::tags;

use super::{Phase, SpendEffect, StatusRegistry, Tokens};

/// Context for one spend attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpendContext {
    /// The phase the spend happens in.
    pub phase: Phase,
    /// Face value of the die backing this spend, for roll-based spend
    /// effects. None when no single die is in play.
    pub roll_value: Option<u8>,
    /// Running base damage at the time of the spend.
    pub base_damage: i32,
    /// Running base block at the time of the spend.
    pub base_block: i32,
}

/// The result of one successful spend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSpend {
    /// The status that was spent.
    pub status: String,
    /// Stacks consumed.
    pub cost: u32,
    /// Bonus damage produced.
    pub bonus_damage: i32,
    /// Bonus block produced.
    pub bonus_block: i32,
    /// Whether the incoming attack is negated.
    pub negate_incoming: bool,
    /// Human-readable log line.
    pub log: String,
}

/// Aggregate of spending one status several times.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSpendSummary {
    /// The status that was spent.
    pub status: String,
    /// How many attempts were requested.
    pub attempts: u32,
    /// How many attempts succeeded.
    pub successes: u32,
    /// Total bonus damage across successful spends.
    pub bonus_damage: i32,
    /// Total bonus block across successful spends.
    pub bonus_block: i32,
    /// Whether any spend negates the incoming attack.
    pub negate_incoming: bool,
    /// Log lines from each successful spend, in order.
    pub logs: Vec<String>,
}

/// Aggregate of every status spent in one resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedSpends {
    /// Total bonus damage across all statuses.
    pub bonus_damage: i32,
    /// Total bonus block across all statuses.
    pub bonus_block: i32,
    /// Whether any status negates the incoming attack.
    pub negate_incoming: bool,
    /// Per-status breakdown, in spend order.
    pub per_status: Vec<StatusSpendSummary>,
    /// Combined log lines.
    pub logs: Vec<String>,
}

/// Attempt to spend one status once.
///
/// Returns `None` if the status has no spend rule, the holder lacks
/// stacks, or the phase is not allowed; otherwise the deducted token map
/// and the spend result.
pub fn spend_status(
    registry: &StatusRegistry,
    tokens: &Tokens,
    id: &str,
    ctx: &SpendContext,
) -> Option<(Tokens, StatusSpend)> {
    let def = registry.lookup(id)?;
    let rule = def.spend.as_ref()?;
    if !rule.allowed_phases.contains(&ctx.phase) {
        return None;
    }
    if tokens.stacks(id) < rule.cost_stacks {
        return None;
    }

    let next = tokens.add(registry, id, -(rule.cost_stacks as i32));
    let tag = tags::status(&def.name);
    let spend = match rule.effect {
        SpendEffect::BonusDamage { amount } => StatusSpend {
            status: id.to_string(),
            cost: rule.cost_stacks,
            bonus_damage: amount,
            bonus_block: 0,
            negate_incoming: false,
            log: format!("{tag} spent {}: +{amount} dmg", rule.cost_stacks),
        },
        SpendEffect::BonusBlock { amount } => StatusSpend {
            status: id.to_string(),
            cost: rule.cost_stacks,
            bonus_damage: 0,
            bonus_block: amount,
            negate_incoming: false,
            log: format!("{tag} spent {}: +{amount} block", rule.cost_stacks),
        },
        SpendEffect::Negate => StatusSpend {
            status: id.to_string(),
            cost: rule.cost_stacks,
            bonus_damage: 0,
            bonus_block: 0,
            negate_incoming: true,
            log: format!("{tag} spent {}: attack negated", rule.cost_stacks),
        },
    };
    Some((next, spend))
}

/// Spend a status up to `attempts` times, threading cumulative context.
///
/// Each attempt sees the base values accumulated by prior attempts.
/// Returns the (possibly unchanged) token map and a summary, or `None`
/// as the summary when no attempt succeeded.
pub fn spend_status_many(
    registry: &StatusRegistry,
    tokens: &Tokens,
    id: &str,
    attempts: u32,
    ctx: &SpendContext,
) -> (Tokens, Option<StatusSpendSummary>) {
    let mut current = tokens.clone();
    let mut running = *ctx;
    let mut spends: Vec<StatusSpend> = Vec::new();

    for _ in 0..attempts {
        match spend_status(registry, &current, id, &running) {
            Some((next, spend)) => {
                running.base_damage += spend.bonus_damage;
                running.base_block += spend.bonus_block;
                current = next;
                spends.push(spend);
            }
            None => break,
        }
    }

    if spends.is_empty() {
        return (current, None);
    }
    let summary = create_spend_summary(id, attempts, &spends);
    (current, Some(summary))
}

/// Fold individual spends of one status into a summary.
fn create_spend_summary(id: &str, attempts: u32, spends: &[StatusSpend]) -> StatusSpendSummary {
    StatusSpendSummary {
        status: id.to_string(),
        attempts,
        successes: spends.len() as u32,
        bonus_damage: spends.iter().map(|s| s.bonus_damage).sum(),
        bonus_block: spends.iter().map(|s| s.bonus_block).sum(),
        negate_incoming: spends.iter().any(|s| s.negate_incoming),
        logs: spends.iter().map(|s| s.log.clone()).collect(),
    }
}

/// Aggregate several per-status summaries into one resolution total.
pub fn aggregate_spends(summaries: Vec<StatusSpendSummary>) -> AggregatedSpends {
    let mut out = AggregatedSpends::default();
    for summary in summaries {
        out.bonus_damage += summary.bonus_damage;
        out.bonus_block += summary.bonus_block;
        out.negate_incoming |= summary.negate_incoming;
        out.logs.extend(summary.logs.iter().cloned());
        out.per_status.push(summary);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::status::{Activation, Polarity, SpendRule, StatusDef};

    fn spendable(id: &str, name: &str, cost: u32, phases: Vec<Phase>, effect: SpendEffect) -> StatusDef {
        StatusDef {
            id: id.to_string(),
            name: name.to_string(),
            polarity: Polarity::Positive,
            activation: Activation::Active,
            max_stacks: Some(9),
            spend: Some(SpendRule {
                cost_stacks: cost,
                allowed_phases: phases,
                turn_limited: None,
                effect,
            }),
            modifier: None,
        }
    }

    fn registry() -> StatusRegistry {
        let mut r = StatusRegistry::new();
        r.register(spendable(
            "chi",
            "Chi",
            1,
            vec![Phase::Defense],
            SpendEffect::BonusBlock { amount: 1 },
        ));
        r.register(spendable(
            "focus",
            "Focus",
            1,
            vec![Phase::Attack],
            SpendEffect::BonusDamage { amount: 2 },
        ));
        r.register(spendable(
            "evasive",
            "Evasive",
            1,
            vec![Phase::Defense],
            SpendEffect::Negate,
        ));
        r
    }

    fn defense_ctx() -> SpendContext {
        SpendContext {
            phase: Phase::Defense,
            roll_value: None,
            base_damage: 0,
            base_block: 0,
        }
    }

    #[test]
    fn spend_deducts_and_reports() {
        let registry = registry();
        let tokens = Tokens::new().with_stacks(&registry, "chi", 3);
        let (next, spend) = spend_status(&registry, &tokens, "chi", &defense_ctx()).unwrap();
        assert_eq!(next.stacks("chi"), 2);
        assert_eq!(spend.bonus_block, 1);
        assert_eq!(spend.log, "<<status:Chi>> spent 1: +1 block");
        // Original untouched.
        assert_eq!(tokens.stacks("chi"), 3);
    }

    #[test]
    fn roll_value_rides_along_without_changing_flat_spends() {
        let registry = registry();
        let tokens = Tokens::new().with_stacks(&registry, "chi", 2);
        let ctx = SpendContext {
            roll_value: Some(4),
            ..defense_ctx()
        };
        let (next, spend) = spend_status(&registry, &tokens, "chi", &ctx).unwrap();
        // Flat spend effects ignore the die; the context slot exists for
        // roll-based effects.
        assert_eq!(spend.bonus_block, 1);
        assert_eq!(next.stacks("chi"), 1);
    }

    #[test]
    fn spend_wrong_phase_is_none() {
        let registry = registry();
        let tokens = Tokens::new().with_stacks(&registry, "focus", 2);
        assert!(spend_status(&registry, &tokens, "focus", &defense_ctx()).is_none());
    }

    #[test]
    fn spend_insufficient_stacks_is_none() {
        let registry = registry();
        let tokens = Tokens::new();
        assert!(spend_status(&registry, &tokens, "chi", &defense_ctx()).is_none());
    }

    #[test]
    fn spend_unknown_status_is_none() {
        let registry = registry();
        let tokens = Tokens::new();
        assert!(spend_status(&registry, &tokens, "missing", &defense_ctx()).is_none());
    }

    #[test]
    fn spend_without_rule_is_none() {
        let mut registry = registry();
        registry.register(StatusDef {
            id: "burn".to_string(),
            name: "Burn".to_string(),
            polarity: Polarity::Negative,
            activation: Activation::Passive,
            max_stacks: None,
            spend: None,
            modifier: None,
        });
        let tokens = Tokens::new().with_stacks(&registry, "burn", 4);
        assert!(spend_status(&registry, &tokens, "burn", &defense_ctx()).is_none());
    }

    #[test]
    fn spend_many_threads_context_and_stops_at_stacks() {
        let registry = registry();
        let tokens = Tokens::new().with_stacks(&registry, "chi", 2);
        let (next, summary) = spend_status_many(&registry, &tokens, "chi", 5, &defense_ctx());
        let summary = summary.unwrap();
        assert_eq!(next.stacks("chi"), 0);
        assert_eq!(summary.attempts, 5);
        assert_eq!(summary.successes, 2);
        assert_eq!(summary.bonus_block, 2);
        assert_eq!(summary.logs.len(), 2);
    }

    #[test]
    fn spend_many_zero_successes_is_none() {
        let registry = registry();
        let tokens = Tokens::new();
        let (next, summary) = spend_status_many(&registry, &tokens, "chi", 3, &defense_ctx());
        assert!(summary.is_none());
        assert!(next.is_empty());
    }

    #[test]
    fn aggregate_totals_and_negate() {
        let registry = registry();
        let tokens = Tokens::new()
            .with_stacks(&registry, "chi", 2)
            .with_stacks(&registry, "evasive", 1);
        let (tokens, chi) = spend_status_many(&registry, &tokens, "chi", 2, &defense_ctx());
        let (_, evasive) = spend_status_many(&registry, &tokens, "evasive", 1, &defense_ctx());
        let agg = aggregate_spends(vec![chi.unwrap(), evasive.unwrap()]);
        assert_eq!(agg.bonus_block, 2);
        assert!(agg.negate_incoming);
        assert_eq!(agg.per_status.len(), 2);
        assert_eq!(agg.logs.len(), 3);
    }
}
