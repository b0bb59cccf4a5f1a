//! Per-turn telemetry shapes and integrity counters.
//!
//! The collector is an external consumer; this module only defines the
//! shapes it receives and the counters the session accumulates. A drift
//! between the schema's computed final damage and the damage actually
//! applied is logged and counted, never raised as an error.

use serde::{Deserialize, Serialize};

use wk_core::dice::DiceRoll;
use wk_defense::resolver::{Checkpoints, RuleHit, SchemaResolution};

/// The per-turn defense record handed to the stats collector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefenseSchemaLog {
    /// The defender's roll.
    pub dice: Vec<u8>,
    /// The six-stage damage-reduction ledger.
    pub checkpoints: Checkpoints,
    /// Matched rules with their evaluations and contributions.
    pub rules_hit: Vec<RuleHit>,
    /// Fingerprint of the schema that produced this.
    pub schema_hash: Option<u32>,
}

impl DefenseSchemaLog {
    /// Build the collector shape from a finished resolution.
    pub fn from_resolution(dice: &DiceRoll, resolution: &SchemaResolution) -> Self {
        Self {
            dice: dice.values().to_vec(),
            checkpoints: resolution.checkpoints,
            rules_hit: resolution.hits.clone(),
            schema_hash: resolution.schema_hash,
        }
    }
}

/// One turn's damage bookkeeping, clamped so the recorded reductions
/// never exceed the raw damage they reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TurnDamageRecord {
    /// Damage before any reduction (attack plus collateral).
    pub raw: i32,
    /// Damage stopped by block, at most `raw`.
    pub blocked: i32,
    /// Damage prevented by statuses, at most `raw - blocked`.
    pub prevented: i32,
}

impl TurnDamageRecord {
    /// Store a record, clamping block first and prevention against the
    /// remainder.
    pub fn clamped(raw: i32, blocked: i32, prevented: i32) -> Self {
        let raw = raw.max(0);
        let blocked = blocked.clamp(0, raw);
        let prevented = prevented.clamp(0, raw - blocked);
        Self {
            raw,
            blocked,
            prevented,
        }
    }
}

/// Session-level aggregate counters for the telemetry dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TelemetryCounters {
    /// Block produced by schema rules.
    pub block_from_roll: i64,
    /// Block produced by status spends.
    pub block_from_statuses: i64,
    /// Turns where prevention reduced damage.
    pub prevent_events: u64,
    /// Total reflected damage.
    pub reflect_sum: i64,
    /// Block in excess of the damage it faced.
    pub wasted_block: i64,
    /// Turns where the schema's final damage disagreed with the damage
    /// actually applied.
    pub schema_damage_drift_count: u64,
}

impl TelemetryCounters {
    /// Fold one schema defense into the counters, returning an integrity
    /// log line when the applied damage drifted from the schema's math.
    pub fn record_defense(
        &mut self,
        log: &DefenseSchemaLog,
        bonus_block_from_spends: i32,
        applied_damage: i32,
    ) -> Option<String> {
        let c = &log.checkpoints;
        self.block_from_roll += i64::from(c.raw_damage - c.final_damage);
        self.block_from_statuses += i64::from(bonus_block_from_spends.max(0));
        if c.after_prevent < c.after_flat {
            self.prevent_events += 1;
        }
        let total_block = c.raw_damage - c.final_damage + bonus_block_from_spends.max(0);
        if total_block > c.raw_damage {
            self.wasted_block += i64::from(total_block - c.raw_damage);
        }

        if c.final_damage != applied_damage {
            self.schema_damage_drift_count += 1;
            return Some(format!(
                "integrity: schema finalDamage {} != applied {applied_damage}",
                c.final_damage
            ));
        }
        None
    }

    /// Fold one turn's reflect total into the counters.
    pub fn record_reflect(&mut self, amount: i32) {
        self.reflect_sum += i64::from(amount.max(0));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkpoints(raw: i32, final_damage: i32) -> Checkpoints {
        Checkpoints {
            raw_damage: raw,
            after_flat: final_damage,
            after_prevent: final_damage,
            after_block: final_damage,
            after_reflect: final_damage,
            final_damage,
        }
    }

    fn log(raw: i32, final_damage: i32) -> DefenseSchemaLog {
        DefenseSchemaLog {
            dice: vec![1, 2, 3, 4, 5],
            checkpoints: checkpoints(raw, final_damage),
            rules_hit: Vec::new(),
            schema_hash: None,
        }
    }

    #[test]
    fn turn_clamp_caps_block_then_prevention() {
        // raw=5, blocked=4, prevented=4 submitted: prevention is clamped
        // to the single point block left over.
        let record = TurnDamageRecord::clamped(5, 4, 4);
        assert_eq!(record.blocked, 4);
        assert_eq!(record.prevented, 1);
        assert!(record.blocked + record.prevented <= record.raw);
    }

    #[test]
    fn turn_clamp_never_negative() {
        let record = TurnDamageRecord::clamped(-2, 3, 3);
        assert_eq!(record.raw, 0);
        assert_eq!(record.blocked, 0);
        assert_eq!(record.prevented, 0);
    }

    #[test]
    fn matching_damage_is_not_drift() {
        let mut counters = TelemetryCounters::default();
        let line = counters.record_defense(&log(10, 6), 0, 6);
        assert!(line.is_none());
        assert_eq!(counters.schema_damage_drift_count, 0);
        assert_eq!(counters.block_from_roll, 4);
    }

    #[test]
    fn drift_logs_and_counts_without_erroring() {
        let mut counters = TelemetryCounters::default();
        let line = counters.record_defense(&log(10, 6), 0, 4).unwrap();
        assert_eq!(line, "integrity: schema finalDamage 6 != applied 4");
        assert_eq!(counters.schema_damage_drift_count, 1);
    }

    #[test]
    fn wasted_block_counts_overshoot() {
        let mut counters = TelemetryCounters::default();
        // 10 raw, all blocked, plus 3 spend block on top: 3 wasted.
        counters.record_defense(&log(10, 0), 3, 0);
        assert_eq!(counters.wasted_block, 3);
        assert_eq!(counters.block_from_statuses, 3);
    }

    #[test]
    fn reflect_accumulates() {
        let mut counters = TelemetryCounters::default();
        counters.record_reflect(2);
        counters.record_reflect(3);
        counters.record_reflect(-1);
        assert_eq!(counters.reflect_sum, 5);
    }
}
