//! Combat log line formatting.
//!
//! The renderer consumes plain strings with inline `<<kind:value>>`
//! markers for styled display. Every shape here is part of the observable
//! contract and is asserted against literal text in tests.

use wk_core::tags;

/// The attacker's opening line.
pub fn attack_line(attacker: &str, ability: &str, combo: &str) -> String {
    format!("{attacker} uses {} ({combo}).", tags::ability(ability))
}

/// The defender's chosen defensive ability.
pub fn defense_line(defender: &str, ability: &str) -> String {
    format!("{defender} defends with {}.", tags::ability(ability))
}

/// The damage summary after block.
pub fn hit_line(dealt: i32, blocked: i32) -> String {
    format!("Hit for {dealt} dmg (blocked {blocked}).")
}

/// Damage landing on a combatant, including the zero case.
pub fn receives_line(name: &str, dealt: i32) -> String {
    format!("{name} receives {dealt} dmg")
}

/// Reflected damage returning to the attacker.
pub fn reflect_line(name: &str, amount: i32) -> String {
    format!("{name} takes {amount} reflected dmg")
}

/// Healing applied by a defensive ability.
pub fn heal_line(name: &str, amount: i32) -> String {
    format!("{name} recovers {amount} {}", tags::resource("HP"))
}

/// A combatant's hit points after the resolution.
pub fn hp_line(name: &str, hp: i32, max_hp: i32) -> String {
    format!("{name} HP: {hp}/{max_hp}")
}

/// Status stacks gained from an ability or effect.
pub fn status_gain_line(name: &str, stacks: u32, status: &str) -> String {
    format!("{name} gains {stacks} {}", tags::status(status))
}

/// The negation summary when a spend dodged the whole attack.
pub fn negated_line() -> String {
    "Attack negated. No damage dealt.".to_string()
}
