//! End-to-end resolutions over preset content.

use std::collections::BTreeMap;

use wk_combat::attack::{AttackContext, DefensePath, SpendRequest, resolve_attack};
use wk_combat::content;
use wk_combat::event::Side;
use wk_combat::hero::{Ability, Hero, PlayerState, best_ability};
use wk_combat::legacy::resolve_legacy_defense;
use wk_core::combo::Combo;
use wk_core::dice::DiceRoll;
use wk_core::rng::GameRng;
use wk_core::{Tokens, detect_combos};
use wk_defense::{
    DefenseSchema, FieldDef, ResolveParams, ValidateOptions, resolve_defense_schema,
    validate_defense_schema,
};

fn sentinel() -> Hero {
    let defensive: BTreeMap<Combo, Ability> = [(
        Combo::PairPair,
        Ability {
            name: "Brace".to_string(),
            block: 2,
            ..Ability::default()
        },
    )]
    .into_iter()
    .collect();
    Hero {
        id: "sentinel".to_string(),
        name: "Sentinel".to_string(),
        max_hp: 30,
        offensive: BTreeMap::new(),
        defensive,
        defense_schema: None,
        defense_version: None,
        defense_schema_hash: None,
    }
}

#[test]
fn fire_storm_against_brace() {
    let registry = content::default_statuses();
    let attacker = PlayerState::new(content::pyromancer());
    let defender = PlayerState::new(sentinel());

    let roll = DiceRoll::from_values([1, 2, 3, 4, 5]).unwrap();
    let combos = detect_combos(&roll);
    let (combo, ability) = best_ability(&attacker.hero, &combos).unwrap();
    assert_eq!(ability.name, "Fire Storm");

    let brace = defender.hero.defensive[&Combo::PairPair].clone();
    let defense = resolve_legacy_defense(&registry, &defender.tokens, &brace, ability.damage);

    let result = resolve_attack(AttackContext {
        registry: &registry,
        attacker: &attacker,
        defender: &defender,
        attacker_side: Side::Player,
        combo,
        ability,
        defense: DefensePath::Legacy(&defense),
        attack_spends: &[],
        defense_spends: &[],
    });

    assert_eq!(result.summary.damage_dealt, 10);
    assert_eq!(result.summary.blocked, 2);
    assert_eq!(result.defender.hp, 20);
    assert_eq!(result.defender.tokens.stacks(content::BURN_STATUS), 2);
    assert!(
        result
            .logs
            .contains(&"Hit for 10 dmg (blocked 2).".to_string())
    );

    insta::assert_snapshot!(result.logs.join("\n"), @r"
    Pyromancer uses <<ability:Fire Storm>> (LARGE_STRAIGHT).
    Sentinel defends with <<ability:Brace>>.
    Hit for 10 dmg (blocked 2).
    Sentinel receives 10 dmg
    Sentinel gains 2 <<status:Burn>>
    Sentinel HP: 20/30
    Pyromancer HP: 30/30
    ");
}

#[test]
fn gather_chi_grants_once_not_per_die() {
    let registry = content::default_statuses();
    let hero = content::jade_monk().unwrap();
    let schema = hero.defense_schema.as_ref().unwrap();

    // Three low dice match gather_chi with count 3; the grant is an
    // On-style effect and lands exactly once.
    let dice = DiceRoll::from_values([1, 2, 3, 5, 6]).unwrap();
    let resolution = resolve_defense_schema(ResolveParams {
        schema,
        dice: &dice,
        incoming_damage: 0,
        registry: &registry,
        self_statuses: None,
        opponent_statuses: None,
        schema_hash: hero.defense_schema_hash,
    })
    .unwrap();

    let grants: Vec<_> = resolution
        .pending_grants
        .iter()
        .filter(|g| g.status == content::CHI_STATUS)
        .collect();
    assert_eq!(grants.len(), 1);
    assert_eq!(grants[0].stacks, 2);
}

#[test]
fn block_per_die_scales_with_matches() {
    let registry = content::default_statuses();
    let hero = content::jade_monk().unwrap();
    let schema = hero.defense_schema.as_ref().unwrap();

    let dice = DiceRoll::from_values([4, 5, 6, 1, 1]).unwrap();
    let resolution = resolve_defense_schema(ResolveParams {
        schema,
        dice: &dice,
        incoming_damage: 10,
        registry: &registry,
        self_statuses: None,
        opponent_statuses: None,
        schema_hash: hero.defense_schema_hash,
    })
    .unwrap();

    let guard = resolution
        .hits
        .iter()
        .find(|hit| hit.rule_id == "guard")
        .unwrap();
    assert_eq!(guard.blocks.len(), 1);
    assert_eq!(guard.blocks[0].amount, 3);
    assert!(guard.blocks[0].per_die);
}

#[test]
fn overlapping_faces_fail_validation() {
    let schema = DefenseSchema {
        dice: 5,
        fields: vec![
            FieldDef {
                id: "EVENS".to_string(),
                faces: vec![2, 4, 6],
            },
            FieldDef {
                id: "LOW".to_string(),
                faces: vec![1, 2, 3],
            },
        ],
        rules: vec![],
    };
    let report = validate_defense_schema(&schema, &ValidateOptions::default());
    assert!(!report.is_valid);
    assert!(
        report
            .errors
            .iter()
            .any(|e| e.code == "field.overlappingFace")
    );
}

#[test]
fn evasive_spend_negates_a_full_turn() {
    let registry = content::default_statuses();
    let attacker = PlayerState::new(content::pyromancer());
    let mut defender = PlayerState::new(content::jade_monk().unwrap());
    defender.tokens = Tokens::new().with_stacks(&registry, content::EVASIVE_STATUS, 1);

    let ability = attacker.hero.offensive[&Combo::FiveOfAKind].clone();
    let result = resolve_attack(AttackContext {
        registry: &registry,
        attacker: &attacker,
        defender: &defender,
        attacker_side: Side::Ai,
        combo: Combo::FiveOfAKind,
        ability: &ability,
        defense: DefensePath::None,
        attack_spends: &[],
        defense_spends: &[SpendRequest {
            status: content::EVASIVE_STATUS.to_string(),
            attempts: 1,
        }],
    });

    assert!(result.summary.negated);
    assert!(result.fx.is_empty());
    assert_eq!(result.attacker.hp, 30);
    assert_eq!(result.defender.hp, 30);
    assert!(
        result
            .logs
            .contains(&"Attack negated. No damage dealt.".to_string())
    );
}

#[test]
fn seeded_turns_are_reproducible() {
    let run = |seed: u32| {
        let registry = content::default_statuses();
        let mut rng = GameRng::new(seed);
        let attacker = PlayerState::new(content::pyromancer());
        let defender = PlayerState::new(sentinel());

        let roll = DiceRoll::roll(&mut rng);
        let combos = detect_combos(&roll);
        let Some((combo, ability)) = best_ability(&attacker.hero, &combos) else {
            return (roll.values(), defender.hp);
        };
        let result = resolve_attack(AttackContext {
            registry: &registry,
            attacker: &attacker,
            defender: &defender,
            attacker_side: Side::Player,
            combo,
            ability,
            defense: DefensePath::None,
            attack_spends: &[],
            defense_spends: &[],
        });
        (roll.values(), result.defender.hp)
    };

    for seed in [0, 1, 7, 123_456, u32::MAX] {
        assert_eq!(run(seed), run(seed));
    }
}
