//! Matcher evaluation against a live roll.
//!
//! Per-roll statistics (face-to-field lookup, per-field die indexes) are
//! computed once and shared across every rule evaluated against the same
//! roll.

use serde::{Deserialize, Serialize};

use wk_core::combo::Combo;
use wk_core::dice::DiceRoll;

use crate::error::{DefenseError, DefenseResult};
use crate::schema::DefenseSchema;

/// A rule's condition against the roll.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum MatcherConfig {
    /// Matches when the (optionally capped) number of dice in a field
    /// reaches `min` (default 1).
    #[serde(rename_all = "camelCase")]
    CountField {
        /// Field to count dice in.
        field: String,
        /// Minimum capped count required to match.
        #[serde(default)]
        min: Option<u32>,
        /// Cap applied to the raw count before comparison.
        #[serde(default)]
        cap: Option<u32>,
    },
    /// Matches when the field holds at least `pairs` available pairs
    /// (default 1); match count is the (optionally capped) pair count.
    #[serde(rename_all = "camelCase")]
    PairsField {
        /// Field to form pairs from.
        field: String,
        /// Pairs required to match.
        #[serde(default)]
        pairs: Option<u32>,
        /// Cap applied to the pair count.
        #[serde(default)]
        cap: Option<u32>,
    },
    /// Declared but not supported in runtime yet.
    #[serde(rename_all = "camelCase")]
    ExactFace {
        /// The face value to look for.
        face: u8,
        /// How many dice must show it.
        #[serde(default)]
        count: Option<u32>,
    },
    /// Declared but not supported in runtime yet.
    #[serde(rename_all = "camelCase")]
    Combo {
        /// The combo that must be present.
        combo: Combo,
    },
}

impl MatcherConfig {
    /// The matcher's kind tag, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::CountField { .. } => "countField",
            Self::PairsField { .. } => "pairsField",
            Self::ExactFace { .. } => "exactFace",
            Self::Combo { .. } => "combo",
        }
    }
}

/// Precomputed per-roll statistics shared across rule evaluations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollStats {
    /// For each die index, the index into `schema.fields` it belongs to.
    face_field: Vec<Option<usize>>,
    /// For each field (by schema index), die indexes in encounter order.
    field_dice: Vec<Vec<usize>>,
}

impl RollStats {
    /// Compute stats for one roll against one schema.
    pub fn new(schema: &DefenseSchema, dice: &DiceRoll) -> Self {
        let values = dice.values();
        let mut face_field = vec![None; values.len()];
        let mut field_dice = vec![Vec::new(); schema.fields.len()];
        for (die_index, &face) in values.iter().enumerate() {
            for (field_index, field) in schema.fields.iter().enumerate() {
                if field.faces.contains(&face) {
                    face_field[die_index] = Some(field_index);
                    field_dice[field_index].push(die_index);
                    break;
                }
            }
        }
        Self {
            face_field,
            field_dice,
        }
    }

    /// Die indexes in a field, in encounter order.
    pub fn dice_in_field(&self, schema: &DefenseSchema, field_id: &str) -> Option<&[usize]> {
        let index = schema.fields.iter().position(|f| f.id == field_id)?;
        Some(&self.field_dice[index])
    }

    /// The field a die landed in, if any.
    pub fn field_of_die(&self, die_index: usize) -> Option<usize> {
        self.face_field.get(die_index).copied().flatten()
    }
}

/// Result of evaluating one matcher against one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherEvaluation {
    /// Whether the matcher matched.
    pub matched: bool,
    /// Match count after cap/min adjustment; drives per-die effects.
    pub match_count: u32,
    /// Indexes of the matched dice, in encounter order.
    pub matched_dice: Vec<usize>,
    /// Raw number of dice in the referenced field.
    pub field_total: u32,
    /// For pairs matchers, the pair count before any cap.
    pub total_pairs: Option<u32>,
}

/// Evaluate a matcher against a roll.
///
/// `stats` may be precomputed once per roll and reused across rules;
/// when absent it is computed on the fly. `ExactFace` and `Combo` are
/// declared but have no runtime support yet and return an error.
pub fn evaluate_matcher(
    schema: &DefenseSchema,
    matcher: &MatcherConfig,
    dice: &DiceRoll,
    stats: Option<&RollStats>,
) -> DefenseResult<MatcherEvaluation> {
    if schema.dice != dice.values().len() {
        return Err(DefenseError::DiceCountMismatch {
            expected: schema.dice,
            got: dice.values().len(),
        });
    }

    let computed;
    let stats = match stats {
        Some(s) => s,
        None => {
            computed = RollStats::new(schema, dice);
            &computed
        }
    };

    match matcher {
        MatcherConfig::CountField { field, min, cap } => {
            let in_field = stats
                .dice_in_field(schema, field)
                .ok_or_else(|| DefenseError::UnknownField(field.clone()))?;
            let raw = in_field.len() as u32;
            let capped = cap.map_or(raw, |c| raw.min(c));
            let min = min.unwrap_or(1);
            let matched = capped >= min;
            Ok(MatcherEvaluation {
                matched,
                match_count: capped,
                matched_dice: if matched {
                    in_field.iter().take(capped as usize).copied().collect()
                } else {
                    Vec::new()
                },
                field_total: raw,
                total_pairs: None,
            })
        }
        MatcherConfig::PairsField { field, pairs, cap } => {
            let in_field = stats
                .dice_in_field(schema, field)
                .ok_or_else(|| DefenseError::UnknownField(field.clone()))?;
            let raw = in_field.len() as u32;
            let total_pairs = raw / 2;
            let capped_pairs = cap.map_or(total_pairs, |c| total_pairs.min(c));
            let required = pairs.unwrap_or(1);
            let matched = capped_pairs >= required;
            Ok(MatcherEvaluation {
                matched,
                match_count: capped_pairs,
                matched_dice: if matched {
                    in_field
                        .iter()
                        .take((capped_pairs * 2) as usize)
                        .copied()
                        .collect()
                } else {
                    Vec::new()
                },
                field_total: raw,
                total_pairs: Some(total_pairs),
            })
        }
        MatcherConfig::ExactFace { .. } => Err(DefenseError::UnsupportedMatcher("exactFace")),
        MatcherConfig::Combo { .. } => Err(DefenseError::UnsupportedMatcher("combo")),
    }
}
