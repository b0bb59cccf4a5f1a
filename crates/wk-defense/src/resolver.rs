//! Schema resolution against a live roll.
//!
//! Rules run in declared order over a participant-snapshot fold: each
//! matched rule's immediate status grants are folded back into the
//! snapshots before the next rule is evaluated, so rule N+1's conditions
//! observe rule N's grants. Non-immediate grants are segregated as
//! pending and handed to the turn controller instead.

use serde::{Deserialize, Serialize};

use wk_core::dice::DiceRoll;
use wk_core::status::{GrantPhase, StatusRegistry, Tokens};

use crate::effect::{
    BlockContribution, DamageContribution, EffectExecution, EffectTarget, EffectTrace, StatusGrant,
    execute_effects,
};
use crate::error::DefenseResult;
use crate::matcher::{MatcherEvaluation, RollStats, evaluate_matcher};
use crate::schema::DefenseSchema;

/// Inputs for one schema resolution.
#[derive(Debug, Clone, Copy)]
pub struct ResolveParams<'a> {
    /// The hero's defense schema.
    pub schema: &'a DefenseSchema,
    /// The live roll.
    pub dice: &'a DiceRoll,
    /// Incoming damage before any reduction.
    pub incoming_damage: i32,
    /// Status definitions for the session.
    pub registry: &'a StatusRegistry,
    /// The schema owner's statuses entering the resolution.
    pub self_statuses: Option<&'a Tokens>,
    /// The opponent's statuses entering the resolution.
    pub opponent_statuses: Option<&'a Tokens>,
    /// Content fingerprint carried through for telemetry.
    pub schema_hash: Option<u32>,
}

/// One matched rule and everything it produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleHit {
    /// The matched rule's id.
    pub rule_id: String,
    /// The matcher evaluation that triggered it.
    pub evaluation: MatcherEvaluation,
    /// Block contributions from this rule.
    pub blocks: Vec<BlockContribution>,
    /// Damage contributions from this rule.
    pub damage: Vec<DamageContribution>,
}

/// The fixed damage-reduction ledger, each stage clamped at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoints {
    /// Incoming damage clamped at 0.
    pub raw_damage: i32,
    /// After flat block contributions.
    pub after_flat: i32,
    /// After status prevention. Prevent-half is granted as a pending
    /// status rather than applied same-roll, so this stage currently
    /// never reduces damage.
    pub after_prevent: i32,
    /// After per-die block contributions.
    pub after_block: i32,
    /// Reflect is tracked for telemetry only; equals `after_block`.
    pub after_reflect: i32,
    /// Damage left for the attack engine to apply.
    pub final_damage: i32,
}

impl Checkpoints {
    fn compute(incoming: i32, flat_block: i32, additional_block: i32) -> Self {
        let raw_damage = incoming.max(0);
        let after_flat = (raw_damage - flat_block).max(0);
        let after_prevent = after_flat;
        let after_block = (after_prevent - additional_block).max(0);
        let after_reflect = after_block;
        Self {
            raw_damage,
            after_flat,
            after_prevent,
            after_block,
            after_reflect,
            final_damage: after_reflect,
        }
    }
}

/// Everything one schema resolution produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaResolution {
    /// Matched rules in declared order.
    pub hits: Vec<RuleHit>,
    /// Flat block protecting the schema owner.
    pub flat_block: i32,
    /// Per-die block protecting the schema owner.
    pub additional_block: i32,
    /// Total block protecting the schema owner.
    pub total_block: i32,
    /// Total damage dealt back to the opponent.
    pub total_damage: i32,
    /// Grants already folded into the owner's same-roll snapshots.
    pub immediate_grants: Vec<StatusGrant>,
    /// Grants deferred to a later turn boundary.
    pub pending_grants: Vec<StatusGrant>,
    /// The owner's statuses after immediate grants.
    pub self_statuses: Tokens,
    /// The opponent's statuses after immediate grants.
    pub opponent_statuses: Tokens,
    /// One trace per executed effect, across all matched rules.
    pub traces: Vec<EffectTrace>,
    /// The damage-reduction ledger.
    pub checkpoints: Checkpoints,
    /// Content fingerprint carried through for telemetry.
    pub schema_hash: Option<u32>,
}

/// Resolve a schema against a roll.
///
/// Errors surface only for malformed content (unsupported matcher kinds,
/// unknown field references, dice-count mismatch); a validated schema
/// resolves without error for any roll.
pub fn resolve_defense_schema(params: ResolveParams<'_>) -> DefenseResult<SchemaResolution> {
    let stats = RollStats::new(params.schema, params.dice);

    let mut self_statuses = params.self_statuses.cloned().unwrap_or_default();
    let mut opponent_statuses = params.opponent_statuses.cloned().unwrap_or_default();

    let mut hits = Vec::new();
    let mut traces = Vec::new();
    let mut immediate_grants = Vec::new();
    let mut pending_grants = Vec::new();
    let mut flat_block = 0;
    let mut additional_block = 0;
    let mut total_damage = 0;

    for rule in &params.schema.rules {
        let evaluation =
            evaluate_matcher(params.schema, &rule.matcher, params.dice, Some(&stats))?;
        if !evaluation.matched {
            continue;
        }

        let result = execute_effects(EffectExecution {
            rule_id: &rule.id,
            effects: &rule.effects,
            evaluation: &evaluation,
            own: Some(&self_statuses),
            opponent: Some(&opponent_statuses),
        });

        for block in &result.blocks {
            if block.target == EffectTarget::Own {
                if block.per_die {
                    additional_block += block.amount;
                } else {
                    flat_block += block.amount;
                }
            }
        }
        for damage in &result.damage {
            if damage.target == EffectTarget::Opponent {
                total_damage += damage.amount;
            }
        }

        for grant in result.status {
            if grant.usable_phase == GrantPhase::Immediate {
                let stacks = grant.stacks as i32;
                match grant.target {
                    EffectTarget::Own | EffectTarget::Ally => {
                        self_statuses = self_statuses.add(params.registry, &grant.status, stacks);
                    }
                    EffectTarget::Opponent => {
                        opponent_statuses =
                            opponent_statuses.add(params.registry, &grant.status, stacks);
                    }
                }
                immediate_grants.push(grant);
            } else {
                pending_grants.push(grant);
            }
        }

        traces.extend(result.traces);
        hits.push(RuleHit {
            rule_id: rule.id.clone(),
            evaluation,
            blocks: result.blocks,
            damage: result.damage,
        });
    }

    Ok(SchemaResolution {
        hits,
        flat_block,
        additional_block,
        total_block: flat_block + additional_block,
        total_damage,
        immediate_grants,
        pending_grants,
        self_statuses,
        opponent_statuses,
        traces,
        checkpoints: Checkpoints::compute(params.incoming_damage, flat_block, additional_block),
        schema_hash: params.schema_hash,
    })
}
