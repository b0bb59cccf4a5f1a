//! Preset statuses and heroes.
//!
//! Content is data, not logic: numbers here are tuning, and schema
//! heroes are validated at construction so malformed content fails at
//! load time rather than mid-battle.

use std::collections::BTreeMap;

use wk_core::combo::Combo;
use wk_core::status::{
    Activation, ModifierHook, ModifierKind, Phase, Polarity, SpendEffect, SpendRule, StatusDef,
    StatusRegistry,
};
use wk_defense::{
    DefenseSchema, EffectConfig, FieldDef, MatcherConfig, PREVENT_HALF_STATUS, RuleDef,
    ValidateOptions, assert_defense_schema_valid,
};

use crate::error::CombatResult;
use crate::hero::{Ability, ApplyTarget, Hero, StatusApply};

/// Damage-over-time stacks applied by fire attacks.
pub const BURN_STATUS: &str = "burn";
/// Heavier burn variant applied by ultimates.
pub const IGNITE_STATUS: &str = "ignite";
/// Spendable block resource.
pub const CHI_STATUS: &str = "chi";
/// Spendable full dodge.
pub const EVASIVE_STATUS: &str = "evasive";
/// Spendable bonus damage.
pub const FOCUS_STATUS: &str = "focus";
/// Zeroes the holder's outgoing damage.
pub const SUPPRESS_STATUS: &str = "suppress";
/// Adds flat block while held.
pub const FORTIFY_STATUS: &str = "fortify";

/// The default status registry for a game session.
pub fn default_statuses() -> StatusRegistry {
    let mut registry = StatusRegistry::new();
    registry.register(StatusDef {
        id: BURN_STATUS.to_string(),
        name: "Burn".to_string(),
        polarity: Polarity::Negative,
        activation: Activation::Passive,
        max_stacks: Some(9),
        spend: None,
        modifier: None,
    });
    registry.register(StatusDef {
        id: IGNITE_STATUS.to_string(),
        name: "Ignite".to_string(),
        polarity: Polarity::Negative,
        activation: Activation::Passive,
        max_stacks: Some(9),
        spend: None,
        modifier: None,
    });
    registry.register(StatusDef {
        id: CHI_STATUS.to_string(),
        name: "Chi".to_string(),
        polarity: Polarity::Positive,
        activation: Activation::Active,
        max_stacks: Some(9),
        spend: Some(SpendRule {
            cost_stacks: 1,
            allowed_phases: vec![Phase::Defense],
            turn_limited: Some(3),
            effect: SpendEffect::BonusBlock { amount: 1 },
        }),
        modifier: None,
    });
    registry.register(StatusDef {
        id: EVASIVE_STATUS.to_string(),
        name: "Evasive".to_string(),
        polarity: Polarity::Positive,
        activation: Activation::Active,
        max_stacks: Some(3),
        spend: Some(SpendRule {
            cost_stacks: 1,
            allowed_phases: vec![Phase::Defense],
            turn_limited: Some(1),
            effect: SpendEffect::Negate,
        }),
        modifier: None,
    });
    registry.register(StatusDef {
        id: FOCUS_STATUS.to_string(),
        name: "Focus".to_string(),
        polarity: Polarity::Positive,
        activation: Activation::Active,
        max_stacks: Some(5),
        spend: Some(SpendRule {
            cost_stacks: 1,
            allowed_phases: vec![Phase::Attack],
            turn_limited: None,
            effect: SpendEffect::BonusDamage { amount: 2 },
        }),
        modifier: None,
    });
    registry.register(StatusDef {
        id: SUPPRESS_STATUS.to_string(),
        name: "Damage Suppression".to_string(),
        polarity: Polarity::Negative,
        activation: Activation::Passive,
        max_stacks: Some(1),
        spend: None,
        modifier: Some(ModifierHook {
            phase: Phase::Attack,
            priority: 0,
            kind: ModifierKind::SuppressDamage,
        }),
    });
    registry.register(StatusDef {
        id: FORTIFY_STATUS.to_string(),
        name: "Block Fortify".to_string(),
        polarity: Polarity::Positive,
        activation: Activation::Passive,
        max_stacks: Some(3),
        spend: None,
        modifier: Some(ModifierHook {
            phase: Phase::Defense,
            priority: 10,
            kind: ModifierKind::FlatBlock { amount: 2 },
        }),
    });
    registry.register(StatusDef {
        id: PREVENT_HALF_STATUS.to_string(),
        name: "Prevent Half".to_string(),
        polarity: Polarity::Positive,
        activation: Activation::Passive,
        max_stacks: Some(1),
        spend: None,
        modifier: None,
    });
    registry
}

fn apply(status: &str, stacks: u32, target: ApplyTarget) -> StatusApply {
    StatusApply {
        status: status.to_string(),
        stacks,
        target,
    }
}

fn offensive(name: &str, damage: i32) -> Ability {
    Ability {
        name: name.to_string(),
        damage,
        ..Ability::default()
    }
}

fn defensive(name: &str, block: i32) -> Ability {
    Ability {
        name: name.to_string(),
        block,
        ..Ability::default()
    }
}

/// Legacy-path fire hero.
pub fn pyromancer() -> Hero {
    let offensive: BTreeMap<Combo, Ability> = [
        (
            Combo::ThreeOfAKind,
            Ability {
                applies: vec![apply(BURN_STATUS, 1, ApplyTarget::Opponent)],
                ..offensive("Ember Jab", 4)
            },
        ),
        (
            Combo::FourOfAKind,
            Ability {
                applies: vec![apply(BURN_STATUS, 1, ApplyTarget::Opponent)],
                ..offensive("Flame Lash", 7)
            },
        ),
        (
            Combo::FiveOfAKind,
            Ability {
                applies: vec![apply(IGNITE_STATUS, 2, ApplyTarget::Opponent)],
                ultimate: true,
                ..offensive("Inferno", 16)
            },
        ),
        (
            Combo::FullHouse,
            Ability {
                applies: vec![apply(IGNITE_STATUS, 1, ApplyTarget::Opponent)],
                ..offensive("Ignition", 6)
            },
        ),
        (Combo::PairPair, offensive("Spark Volley", 3)),
        (Combo::SmallStraight, offensive("Flame Wave", 8)),
        (
            Combo::LargeStraight,
            Ability {
                applies: vec![apply(BURN_STATUS, 2, ApplyTarget::Opponent)],
                ..offensive("Fire Storm", 12)
            },
        ),
    ]
    .into_iter()
    .collect();

    let defensive: BTreeMap<Combo, Ability> = [
        (Combo::PairPair, defensive("Ash Guard", 2)),
        (Combo::ThreeOfAKind, defensive("Cinder Wall", 3)),
        (
            Combo::SmallStraight,
            Ability {
                reflect: 1,
                ..defensive("Heat Mirage", 4)
            },
        ),
        (Combo::FullHouse, defensive("Obsidian Shell", 5)),
        (Combo::FourOfAKind, defensive("Magma Ward", 6)),
        (
            Combo::LargeStraight,
            Ability {
                heal: 2,
                ..defensive("Phoenix Veil", 7)
            },
        ),
        (
            Combo::FiveOfAKind,
            Ability {
                reflect: 2,
                ..defensive("Sun Shield", 9)
            },
        ),
    ]
    .into_iter()
    .collect();

    Hero {
        id: "pyromancer".to_string(),
        name: "Pyromancer".to_string(),
        max_hp: 30,
        offensive,
        defensive,
        defense_schema: None,
        defense_version: None,
        defense_schema_hash: None,
    }
}

/// Schema-path hero. The schema is validated at construction and its
/// fields hash recorded for telemetry.
pub fn jade_monk() -> CombatResult<Hero> {
    let schema = DefenseSchema {
        dice: 5,
        fields: vec![
            FieldDef {
                id: "LOW".to_string(),
                faces: vec![1, 2, 3],
            },
            FieldDef {
                id: "HIGH".to_string(),
                faces: vec![4, 5, 6],
            },
        ],
        rules: vec![
            RuleDef {
                id: "gather_chi".to_string(),
                matcher: MatcherConfig::CountField {
                    field: "LOW".to_string(),
                    min: Some(2),
                    cap: None,
                },
                effects: vec![EffectConfig::GainStatus {
                    status: CHI_STATUS.to_string(),
                    stacks: Some(2),
                    target: None,
                    usable_phase: None,
                    expires_in: None,
                    max_stacks: None,
                    conditions: None,
                }],
            },
            RuleDef {
                id: "guard".to_string(),
                matcher: MatcherConfig::CountField {
                    field: "HIGH".to_string(),
                    min: None,
                    cap: None,
                },
                effects: vec![EffectConfig::BlockPer {
                    amount: 1,
                    cap: None,
                    target: None,
                    conditions: None,
                }],
            },
            RuleDef {
                id: "stone_wall".to_string(),
                matcher: MatcherConfig::PairsField {
                    field: "HIGH".to_string(),
                    pairs: Some(1),
                    cap: None,
                },
                effects: vec![EffectConfig::FlatBlock {
                    amount: 2,
                    cap: None,
                    target: None,
                    conditions: None,
                }],
            },
            RuleDef {
                id: "serenity".to_string(),
                matcher: MatcherConfig::PairsField {
                    field: "LOW".to_string(),
                    pairs: Some(2),
                    cap: None,
                },
                effects: vec![EffectConfig::PreventHalf {
                    stacks: None,
                    conditions: None,
                }],
            },
        ],
    };

    let report = assert_defense_schema_valid(
        &schema,
        &ValidateOptions {
            hero_id: Some("jade_monk".to_string()),
            allow_idle_faces: false,
        },
    )?;

    let offensive: BTreeMap<Combo, Ability> = [
        (Combo::ThreeOfAKind, offensive("Palm Strike", 4)),
        (Combo::SmallStraight, offensive("Flowing Kick", 7)),
        (
            Combo::LargeStraight,
            Ability {
                applies: vec![apply(CHI_STATUS, 1, ApplyTarget::User)],
                ..offensive("Dragon Fist", 11)
            },
        ),
        (
            Combo::FiveOfAKind,
            Ability {
                applies: vec![apply(CHI_STATUS, 2, ApplyTarget::User)],
                ultimate: true,
                ..offensive("Hundred Hands", 15)
            },
        ),
    ]
    .into_iter()
    .collect();

    Ok(Hero {
        id: "jade_monk".to_string(),
        name: "Jade Monk".to_string(),
        max_hp: 30,
        offensive,
        defensive: BTreeMap::new(),
        defense_schema: Some(schema),
        defense_version: Some("1".to_string()),
        defense_schema_hash: Some(report.fields_hash),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wk_defense::compute_fields_hash;

    #[test]
    fn default_registry_covers_preset_content() {
        let registry = default_statuses();
        for id in [
            BURN_STATUS,
            IGNITE_STATUS,
            CHI_STATUS,
            EVASIVE_STATUS,
            FOCUS_STATUS,
            SUPPRESS_STATUS,
            FORTIFY_STATUS,
            PREVENT_HALF_STATUS,
        ] {
            assert!(registry.lookup(id).is_some(), "missing status {id}");
        }
    }

    #[test]
    fn chi_is_turn_limited() {
        let registry = default_statuses();
        let chi = registry.lookup(CHI_STATUS).unwrap();
        let rule = chi.spend.as_ref().unwrap();
        assert_eq!(rule.turn_limited, Some(3));
        assert_eq!(rule.allowed_phases, vec![Phase::Defense]);
    }

    #[test]
    fn pyromancer_large_straight_is_fire_storm() {
        let hero = pyromancer();
        let ability = &hero.offensive[&Combo::LargeStraight];
        assert_eq!(ability.name, "Fire Storm");
        assert_eq!(ability.damage, 12);
        assert_eq!(ability.applies.len(), 1);
        assert_eq!(ability.applies[0].status, BURN_STATUS);
        assert_eq!(ability.applies[0].stacks, 2);
    }

    #[test]
    fn jade_monk_schema_validates_with_hash() {
        let hero = jade_monk().unwrap();
        let schema = hero.defense_schema.as_ref().unwrap();
        assert_eq!(
            hero.defense_schema_hash,
            Some(compute_fields_hash(schema))
        );
        assert_eq!(schema.rules.len(), 4);
    }
}
