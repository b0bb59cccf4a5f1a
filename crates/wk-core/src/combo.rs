//! Poker-style combo detection over a five-die roll.
//!
//! Combos are derived purely from the multiset structure of the roll;
//! several can be true at once (a large straight is also a small one).

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::dice::DiceRoll;

/// A named dice pattern gating which abilities are usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Combo {
    /// A triple with no pairs elsewhere in the roll.
    ThreeOfAKind,
    /// Four dice showing the same face.
    FourOfAKind,
    /// All five dice showing the same face.
    FiveOfAKind,
    /// Exactly one triple and exactly one pair.
    FullHouse,
    /// Two distinct pairs.
    PairPair,
    /// A contiguous run of four distinct values.
    SmallStraight,
    /// A contiguous run of five distinct values, no duplicates anywhere.
    LargeStraight,
}

impl Combo {
    /// Every combo, in declaration order.
    pub const ALL: [Combo; 7] = [
        Combo::ThreeOfAKind,
        Combo::FourOfAKind,
        Combo::FiveOfAKind,
        Combo::FullHouse,
        Combo::PairPair,
        Combo::SmallStraight,
        Combo::LargeStraight,
    ];

    /// The wire tag used in content tables and logs.
    pub fn tag(self) -> &'static str {
        match self {
            Self::ThreeOfAKind => "3OAK",
            Self::FourOfAKind => "4OAK",
            Self::FiveOfAKind => "5OAK",
            Self::FullHouse => "FULL_HOUSE",
            Self::PairPair => "PAIR_PAIR",
            Self::SmallStraight => "SMALL_STRAIGHT",
            Self::LargeStraight => "LARGE_STRAIGHT",
        }
    }
}

impl std::fmt::Display for Combo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// Fixed priority order for presenting defensive options.
pub const DEFENSE_COMBO_PRIORITY: [Combo; 7] = [
    Combo::FiveOfAKind,
    Combo::LargeStraight,
    Combo::FourOfAKind,
    Combo::FullHouse,
    Combo::SmallStraight,
    Combo::ThreeOfAKind,
    Combo::PairPair,
];

/// The set of combos matched by one roll.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComboSet {
    matched: BTreeSet<Combo>,
}

impl ComboSet {
    /// Returns true if the given combo was matched.
    pub fn contains(&self, combo: Combo) -> bool {
        self.matched.contains(&combo)
    }

    /// Iterate over matched combos.
    pub fn iter(&self) -> impl Iterator<Item = Combo> + '_ {
        self.matched.iter().copied()
    }

    /// Number of matched combos.
    pub fn len(&self) -> usize {
        self.matched.len()
    }

    /// Returns true if no combo matched.
    pub fn is_empty(&self) -> bool {
        self.matched.is_empty()
    }
}

/// Detect every combo present in a roll.
pub fn detect_combos(roll: &DiceRoll) -> ComboSet {
    let mut counts = [0u8; 7];
    for v in roll.values() {
        counts[v as usize] += 1;
    }

    let pairs = counts.iter().filter(|&&c| c == 2).count();
    let has_triple = counts.contains(&3);
    let has_quad = counts.contains(&4);
    let has_quint = counts.contains(&5);

    let distinct: Vec<u8> = (1u8..=6).filter(|&f| counts[f as usize] > 0).collect();
    let mut run = 1usize;
    let mut best_run = 1usize;
    for pair in distinct.windows(2) {
        if pair[1] == pair[0] + 1 {
            run += 1;
            best_run = best_run.max(run);
        } else {
            run = 1;
        }
    }

    let mut matched = BTreeSet::new();
    if has_triple && pairs == 0 {
        matched.insert(Combo::ThreeOfAKind);
    }
    if has_quad {
        matched.insert(Combo::FourOfAKind);
    }
    if has_quint {
        matched.insert(Combo::FiveOfAKind);
    }
    if has_triple && pairs == 1 {
        matched.insert(Combo::FullHouse);
    }
    if pairs >= 2 {
        matched.insert(Combo::PairPair);
    }
    if best_run >= 4 {
        matched.insert(Combo::SmallStraight);
    }
    // Large straights permit no duplicates anywhere in the roll.
    if best_run >= 5 && distinct.len() == 5 {
        matched.insert(Combo::LargeStraight);
    }

    ComboSet { matched }
}
