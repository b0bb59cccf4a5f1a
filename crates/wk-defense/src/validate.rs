//! Content-load-time schema validation.
//!
//! Validation runs before any battle starts so malformed hero content
//! never reaches live resolution. Hard errors make the schema unusable;
//! warnings flag suspicious-but-legal content (rules that can never
//! match, die faces no field claims).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::effect::EffectConfig;
use crate::error::{DefenseError, DefenseResult};
use crate::matcher::MatcherConfig;
use crate::schema::DefenseSchema;

/// Options for one validation run.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Hero id used in error messages.
    pub hero_id: Option<String>,
    /// Suppress the idle-faces warning (some heroes leave faces blank
    /// on purpose).
    pub allow_idle_faces: bool,
}

/// One validation finding, error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// Stable machine-readable code, e.g. `field.overlappingFace`.
    pub code: String,
    /// Human-readable description with the offending location.
    pub message: String,
}

impl ValidationIssue {
    fn new(code: &str, message: String) -> Self {
        Self {
            code: code.to_string(),
            message,
        }
    }
}

/// The outcome of validating one schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// False when any hard error was found.
    pub is_valid: bool,
    /// Hard errors; the schema must not be used while any exist.
    pub errors: Vec<ValidationIssue>,
    /// Non-fatal findings.
    pub warnings: Vec<ValidationIssue>,
    /// Order-independent content fingerprint of the field layout.
    pub fields_hash: u32,
    /// Field ids referenced by at least one rule.
    pub referenced_field_ids: Vec<String>,
    /// Die faces no field claims.
    pub idle_faces: Vec<u8>,
}

/// Stable order-independent fingerprint of a schema's field layout.
///
/// Fields are sorted by id and each field's faces sorted and deduped
/// before hashing, so cosmetic reordering never changes the hash. Used
/// for telemetry and content versioning, not security.
pub fn compute_fields_hash(schema: &DefenseSchema) -> u32 {
    let mut fields: Vec<(&str, Vec<u8>)> = schema
        .fields
        .iter()
        .map(|f| {
            let faces: BTreeSet<u8> = f.faces.iter().copied().collect();
            (f.id.as_str(), faces.into_iter().collect())
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    let mut hash: u32 = 0;
    for (id, faces) in fields {
        for byte in id.bytes() {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(byte));
        }
        for face in faces {
            hash = hash.wrapping_mul(31).wrapping_add(u32::from(face));
        }
    }
    hash
}

/// Validate a schema, collecting every finding instead of stopping at
/// the first.
pub fn validate_defense_schema(
    schema: &DefenseSchema,
    options: &ValidateOptions,
) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    let mut seen_field_ids = BTreeSet::new();
    let mut claimed_faces = BTreeSet::new();
    for (index, field) in schema.fields.iter().enumerate() {
        if field.id.is_empty() {
            errors.push(ValidationIssue::new(
                "field.missingId",
                format!("fields[{index}] has no id"),
            ));
        } else if !seen_field_ids.insert(field.id.clone()) {
            errors.push(ValidationIssue::new(
                "field.duplicateId",
                format!("fields[{index}] duplicates id '{}'", field.id),
            ));
        }
        for &face in &field.faces {
            if !(1..=6).contains(&face) {
                errors.push(ValidationIssue::new(
                    "field.faceOutOfRange",
                    format!("fields[{index}] ('{}') claims face {face}", field.id),
                ));
            } else if !claimed_faces.insert(face) {
                errors.push(ValidationIssue::new(
                    "field.overlappingFace",
                    format!("fields[{index}] ('{}') claims face {face} twice", field.id),
                ));
            }
        }
    }

    let mut seen_rule_ids = BTreeSet::new();
    let mut referenced: BTreeSet<String> = BTreeSet::new();
    for (index, rule) in schema.rules.iter().enumerate() {
        if rule.id.is_empty() {
            errors.push(ValidationIssue::new(
                "rule.missingId",
                format!("rules[{index}] has no id"),
            ));
        } else if !seen_rule_ids.insert(rule.id.clone()) {
            errors.push(ValidationIssue::new(
                "rule.duplicateId",
                format!("rules[{index}] duplicates id '{}'", rule.id),
            ));
        }
        if rule.effects.is_empty() {
            errors.push(ValidationIssue::new(
                "rule.missingEffects",
                format!("rules[{index}] ('{}') declares no effects", rule.id),
            ));
        }
        validate_matcher(schema, index, rule, &mut referenced, &mut errors, &mut warnings);
        for effect in &rule.effects {
            validate_effect(index, &rule.id, effect, &mut errors);
        }
    }

    let idle_faces: Vec<u8> = (1..=6).filter(|f| !claimed_faces.contains(f)).collect();
    if !idle_faces.is_empty() && !options.allow_idle_faces {
        warnings.push(ValidationIssue::new(
            "schema.idleFaces",
            format!("no field claims faces {idle_faces:?}"),
        ));
    }

    ValidationReport {
        is_valid: errors.is_empty(),
        errors,
        warnings,
        fields_hash: compute_fields_hash(schema),
        referenced_field_ids: referenced.into_iter().collect(),
        idle_faces,
    }
}

fn validate_matcher(
    schema: &DefenseSchema,
    index: usize,
    rule: &crate::schema::RuleDef,
    referenced: &mut BTreeSet<String>,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    match &rule.matcher {
        MatcherConfig::CountField { field, min, cap } => {
            check_field_ref(schema, index, &rule.id, field, referenced, errors);
            check_min_cap(index, &rule.id, *min, *cap, errors, warnings);
        }
        MatcherConfig::PairsField { field, pairs, cap } => {
            check_field_ref(schema, index, &rule.id, field, referenced, errors);
            check_min_cap(index, &rule.id, *pairs, *cap, errors, warnings);
        }
        MatcherConfig::ExactFace { face, count } => {
            if count == &Some(0) {
                errors.push(ValidationIssue::new(
                    "matcher.invalidMin",
                    format!("rules[{index}] ('{}') requires a positive count", rule.id),
                ));
            }
            let fielded = schema.fields.iter().any(|f| f.faces.contains(face));
            if !fielded {
                warnings.push(ValidationIssue::new(
                    "matcher.exactFaceUnfielded",
                    format!("rules[{index}] ('{}') targets unfielded face {face}", rule.id),
                ));
            }
        }
        MatcherConfig::Combo { .. } => {}
    }
}

fn check_field_ref(
    schema: &DefenseSchema,
    index: usize,
    rule_id: &str,
    field: &str,
    referenced: &mut BTreeSet<String>,
    errors: &mut Vec<ValidationIssue>,
) {
    referenced.insert(field.to_string());
    if schema.field(field).is_none() {
        errors.push(ValidationIssue::new(
            "rule.unknownField",
            format!("rules[{index}] ('{rule_id}') references unknown field '{field}'"),
        ));
    }
}

fn check_min_cap(
    index: usize,
    rule_id: &str,
    min: Option<u32>,
    cap: Option<u32>,
    errors: &mut Vec<ValidationIssue>,
    warnings: &mut Vec<ValidationIssue>,
) {
    if min == Some(0) {
        errors.push(ValidationIssue::new(
            "matcher.invalidMin",
            format!("rules[{index}] ('{rule_id}') requires a positive minimum"),
        ));
    }
    if cap == Some(0) {
        errors.push(ValidationIssue::new(
            "matcher.invalidCap",
            format!("rules[{index}] ('{rule_id}') caps the match count at zero"),
        ));
    }
    if let (Some(min), Some(cap)) = (min, cap) {
        if cap < min {
            warnings.push(ValidationIssue::new(
                "matcher.capBelowMin",
                format!("rules[{index}] ('{rule_id}') can never match (cap {cap} < min {min})"),
            ));
        }
    }
}

fn validate_effect(
    index: usize,
    rule_id: &str,
    effect: &EffectConfig,
    errors: &mut Vec<ValidationIssue>,
) {
    let kind = effect.kind();
    match effect {
        EffectConfig::DealPer { amount, cap, .. }
        | EffectConfig::FlatBlock { amount, cap, .. }
        | EffectConfig::BlockPer { amount, cap, .. } => {
            if *amount < 0 {
                errors.push(ValidationIssue::new(
                    "effect.invalidAmount",
                    format!("rules[{index}] ('{rule_id}') {kind} amount must be non-negative"),
                ));
            }
            if cap.is_some_and(|c| c < 0) {
                errors.push(ValidationIssue::new(
                    "effect.invalidAmount",
                    format!("rules[{index}] ('{rule_id}') {kind} cap must be non-negative"),
                ));
            }
        }
        EffectConfig::GainStatus {
            stacks, max_stacks, ..
        } => {
            if stacks == &Some(0) {
                errors.push(ValidationIssue::new(
                    "effect.invalidStacks",
                    format!("rules[{index}] ('{rule_id}') grants zero stacks"),
                ));
            }
            if max_stacks == &Some(0) {
                errors.push(ValidationIssue::new(
                    "effect.invalidStacks",
                    format!("rules[{index}] ('{rule_id}') caps stacks at zero"),
                ));
            }
        }
        EffectConfig::PreventHalf { stacks, .. } => {
            if stacks == &Some(0) {
                errors.push(ValidationIssue::new(
                    "effect.invalidStacks",
                    format!("rules[{index}] ('{rule_id}') grants zero stacks"),
                ));
            }
        }
        EffectConfig::Heal { amount } | EffectConfig::Reflect { amount } => {
            if *amount < 0 {
                errors.push(ValidationIssue::new(
                    "effect.invalidAmount",
                    format!("rules[{index}] ('{rule_id}') {kind} amount must be non-negative"),
                ));
            }
        }
    }
}

/// Validate a schema and fail fast with every formatted error joined
/// into one message. Called at hero-content load time.
pub fn assert_defense_schema_valid(
    schema: &DefenseSchema,
    options: &ValidateOptions,
) -> DefenseResult<ValidationReport> {
    let report = validate_defense_schema(schema, options);
    if report.is_valid {
        Ok(report)
    } else {
        Err(DefenseError::InvalidSchema {
            hero: options
                .hero_id
                .clone()
                .unwrap_or_else(|| "unknown".to_string()),
            errors: report
                .errors
                .iter()
                .map(|e| format!("[{}] {}", e.code, e.message))
                .collect::<Vec<_>>()
                .join("; "),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldDef, RuleDef};

    fn field(id: &str, faces: &[u8]) -> FieldDef {
        FieldDef {
            id: id.to_string(),
            faces: faces.to_vec(),
        }
    }

    fn block_rule(id: &str, field: &str) -> RuleDef {
        RuleDef {
            id: id.to_string(),
            matcher: MatcherConfig::CountField {
                field: field.to_string(),
                min: None,
                cap: None,
            },
            effects: vec![EffectConfig::BlockPer {
                amount: 1,
                cap: None,
                target: None,
                conditions: None,
            }],
        }
    }

    fn full_schema() -> DefenseSchema {
        DefenseSchema {
            dice: 5,
            fields: vec![field("LOW", &[1, 2, 3]), field("HIGH", &[4, 5, 6])],
            rules: vec![block_rule("guard", "HIGH")],
        }
    }

    fn codes(issues: &[ValidationIssue]) -> Vec<&str> {
        issues.iter().map(|i| i.code.as_str()).collect()
    }

    #[test]
    fn valid_schema_passes_clean() {
        let report = validate_defense_schema(&full_schema(), &ValidateOptions::default());
        assert!(report.is_valid);
        assert!(report.errors.is_empty());
        assert!(report.warnings.is_empty());
        assert!(report.idle_faces.is_empty());
        assert_eq!(report.referenced_field_ids, vec!["HIGH".to_string()]);
    }

    #[test]
    fn overlapping_faces_are_errors() {
        let mut schema = full_schema();
        schema.fields[1].faces = vec![3, 4, 5, 6];
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        assert!(!report.is_valid);
        assert!(codes(&report.errors).contains(&"field.overlappingFace"));
    }

    #[test]
    fn out_of_range_faces_are_errors() {
        let mut schema = full_schema();
        schema.fields[0].faces.push(7);
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        assert!(codes(&report.errors).contains(&"field.faceOutOfRange"));
    }

    #[test]
    fn duplicate_ids_are_errors() {
        let mut schema = full_schema();
        schema.fields.push(field("LOW", &[]));
        schema.rules.push(block_rule("guard", "LOW"));
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        let found = codes(&report.errors);
        assert!(found.contains(&"field.duplicateId"));
        assert!(found.contains(&"rule.duplicateId"));
    }

    #[test]
    fn unknown_field_and_missing_effects_are_errors() {
        let mut schema = full_schema();
        schema.rules.push(RuleDef {
            id: "ghost".to_string(),
            matcher: MatcherConfig::CountField {
                field: "MID".to_string(),
                min: None,
                cap: None,
            },
            effects: vec![],
        });
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        let found = codes(&report.errors);
        assert!(found.contains(&"rule.unknownField"));
        assert!(found.contains(&"rule.missingEffects"));
    }

    #[test]
    fn zero_min_and_zero_stacks_are_errors() {
        let mut schema = full_schema();
        schema.rules[0].matcher = MatcherConfig::CountField {
            field: "HIGH".to_string(),
            min: Some(0),
            cap: None,
        };
        schema.rules[0].effects = vec![EffectConfig::GainStatus {
            status: "chi".to_string(),
            stacks: Some(0),
            target: None,
            usable_phase: None,
            expires_in: None,
            max_stacks: None,
            conditions: None,
        }];
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        let found = codes(&report.errors);
        assert!(found.contains(&"matcher.invalidMin"));
        assert!(found.contains(&"effect.invalidStacks"));
    }

    #[test]
    fn cap_below_min_is_a_warning() {
        let mut schema = full_schema();
        schema.rules[0].matcher = MatcherConfig::CountField {
            field: "HIGH".to_string(),
            min: Some(3),
            cap: Some(2),
        };
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        assert!(report.is_valid);
        assert!(codes(&report.warnings).contains(&"matcher.capBelowMin"));
    }

    #[test]
    fn idle_faces_warn_unless_allowed() {
        let schema = DefenseSchema {
            dice: 5,
            fields: vec![field("LOW", &[1, 2, 3])],
            rules: vec![block_rule("guard", "LOW")],
        };
        let report = validate_defense_schema(&schema, &ValidateOptions::default());
        assert!(codes(&report.warnings).contains(&"schema.idleFaces"));
        assert_eq!(report.idle_faces, vec![4, 5, 6]);

        let relaxed = validate_defense_schema(
            &schema,
            &ValidateOptions {
                allow_idle_faces: true,
                ..ValidateOptions::default()
            },
        );
        assert!(relaxed.warnings.is_empty());
    }

    #[test]
    fn fields_hash_ignores_declaration_order() {
        let a = DefenseSchema {
            dice: 5,
            fields: vec![field("LOW", &[1, 2, 3]), field("HIGH", &[4, 5, 6])],
            rules: vec![],
        };
        let b = DefenseSchema {
            dice: 5,
            fields: vec![field("HIGH", &[6, 5, 4]), field("LOW", &[3, 2, 1])],
            rules: vec![],
        };
        assert_eq!(compute_fields_hash(&a), compute_fields_hash(&b));
        let mut c = a.clone();
        c.fields[0].faces = vec![1, 2];
        assert_ne!(compute_fields_hash(&a), compute_fields_hash(&c));
    }

    #[test]
    fn assert_joins_all_errors() {
        let mut schema = full_schema();
        schema.fields.push(field("", &[9]));
        let err = assert_defense_schema_valid(
            &schema,
            &ValidateOptions {
                hero_id: Some("jade_monk".to_string()),
                ..ValidateOptions::default()
            },
        )
        .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("jade_monk"));
        assert!(message.contains("field.missingId"));
        assert!(message.contains("field.faceOutOfRange"));
    }
}
