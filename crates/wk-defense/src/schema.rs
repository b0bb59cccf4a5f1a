//! Defense schema content types.
//!
//! Schemas are static per-hero content, loadable from JSON. Fields
//! partition the six die faces into disjoint labeled buckets; rules pair
//! a matcher with an ordered list of effects.

use serde::{Deserialize, Serialize};

use crate::effect::EffectConfig;
use crate::matcher::MatcherConfig;

/// A labeled partition of die faces.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Field identifier referenced by matchers.
    pub id: String,
    /// The die faces (1..=6) belonging to this field.
    pub faces: Vec<u8>,
}

/// One declarative rule: a matcher plus ordered effects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleDef {
    /// Rule identifier, unique within the schema.
    pub id: String,
    /// The condition evaluated against the roll.
    pub matcher: MatcherConfig,
    /// Effects executed in declared order when the matcher matches.
    pub effects: Vec<EffectConfig>,
}

/// A hero's complete defense schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenseSchema {
    /// Number of dice the schema is written against.
    pub dice: usize,
    /// Face partitions.
    pub fields: Vec<FieldDef>,
    /// Rules, evaluated in declared order.
    pub rules: Vec<RuleDef>,
}

impl DefenseSchema {
    /// Look up a field definition by id.
    pub fn field(&self, id: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }
}
