#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that picks which enemy squad absorbs a strike.

use starhold_core::{RosterView, SquadIndex, SquadSnapshot, UnitType};

/// Target selector implementing the focus-fire doctrine: strikes land on
/// the most dangerous remaining enemy squad, not the weakest one.
#[derive(Clone, Copy, Debug, Default)]
pub struct TargetSelector;

impl TargetSelector {
    /// Creates a new target selector.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Picks the living squad with the highest current attack power.
    ///
    /// Ties are broken by higher initiative, then by unit type name
    /// ascending. Returns `None` when the roster holds no living squads.
    /// The view must be captured from the live fleet state at the moment
    /// of the strike, because attack power shrinks with casualties taken
    /// earlier in the same round.
    #[must_use]
    pub fn select(&self, roster: &RosterView) -> Option<SquadIndex> {
        let mut best: Option<Candidate<'_>> = None;

        for (index, snapshot) in roster.iter() {
            if !snapshot.is_alive() {
                continue;
            }

            let candidate = Candidate::capture(index, snapshot);
            match &mut best {
                Some(existing) => {
                    if candidate.precedes(existing) {
                        *existing = candidate;
                    }
                }
                None => best = Some(candidate),
            }
        }

        best.map(|candidate| candidate.index)
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate<'a> {
    index: SquadIndex,
    attack_power: f64,
    initiative: f64,
    unit_type: &'a UnitType,
}

impl<'a> Candidate<'a> {
    fn capture(index: SquadIndex, snapshot: &'a SquadSnapshot) -> Self {
        Self {
            index,
            attack_power: snapshot.attack_power(),
            initiative: snapshot.initiative,
            unit_type: &snapshot.unit_type,
        }
    }

    fn precedes(&self, other: &Self) -> bool {
        if self.attack_power != other.attack_power {
            return self.attack_power > other.attack_power;
        }

        if self.initiative != other.initiative {
            return self.initiative > other.initiative;
        }

        self.unit_type < other.unit_type
    }
}
