//! Events and fx descriptors handed to the turn controller and renderer.

use serde::{Deserialize, Serialize};

/// Which combatant an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Side {
    /// The human player.
    Player,
    /// The AI opponent.
    Ai,
}

impl Side {
    /// The opposing side.
    pub fn other(self) -> Self {
        match self {
            Self::Player => Self::Ai,
            Self::Ai => Self::Player,
        }
    }
}

/// The phase the controller shows before the next side acts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrePhase {
    /// Upkeep ticks (status expiry, burn damage) run first.
    Upkeep,
    /// Straight to the next roll.
    Roll,
}

/// A follow-up marker attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUp {
    /// The next side is the AI; the controller should invoke its
    /// decision loop.
    TriggerAiTurn,
}

/// Fixed presentation delay before the turn controller switches sides.
pub const TURN_END_DELAY_MS: u64 = 900;

/// An event emitted by attack resolution for the turn controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CombatEvent {
    /// The turn is over; the controller advances to `next`.
    #[serde(rename_all = "camelCase")]
    TurnEnd {
        /// The side that acts next.
        next: Side,
        /// Presentation delay before switching.
        duration_ms: u64,
        /// The phase shown before the next side acts.
        pre_phase: PrePhase,
        /// Optional follow-up marker.
        #[serde(skip_serializing_if = "Option::is_none")]
        follow_up: Option<FollowUp>,
    },
}

/// The kind of a visual effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FxKind {
    /// Damage landing on a combatant.
    Damage,
    /// Reflected damage returning to the attacker.
    Reflect,
}

/// A visual-effect descriptor. Only emitted for positive amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FxEvent {
    /// The side the effect plays on.
    pub side: Side,
    /// The amount shown; always positive.
    pub amount: i32,
    /// What kind of effect to play.
    pub kind: FxKind,
}
