#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that orders living squads into a deterministic strike order.

use std::cmp::Ordering;

use starhold_core::{RosterView, Side, SquadIndex, StrikeEntry, UnitType};

/// Initiative scheduler that reuses a scratch buffer to avoid repeated
/// allocations across rounds.
#[derive(Debug, Default)]
pub struct InitiativeScheduler {
    scratch: Vec<ScheduledStrike>,
}

impl InitiativeScheduler {
    /// Creates a new initiative scheduler with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the strike order for one round from both rosters.
    ///
    /// Every living squad from both views enters the order. Squads strike
    /// in descending initiative; ties are broken by attacker before
    /// defender, then by unit type name ascending. The output buffer is
    /// cleared before it is populated, and the order must be recomputed
    /// each round because head-counts change between rounds.
    pub fn handle(
        &mut self,
        attacker: &RosterView,
        defender: &RosterView,
        out: &mut Vec<StrikeEntry>,
    ) {
        out.clear();
        self.scratch.clear();

        self.collect(Side::Attacker, attacker);
        self.collect(Side::Defender, defender);

        self.scratch.sort_by(strike_order);

        out.reserve(self.scratch.len());
        out.extend(self.scratch.iter().map(|strike| StrikeEntry {
            side: strike.side,
            squad: strike.squad,
        }));
    }

    fn collect(&mut self, side: Side, roster: &RosterView) {
        for (index, snapshot) in roster.iter() {
            if !snapshot.is_alive() {
                continue;
            }

            self.scratch.push(ScheduledStrike {
                side,
                squad: index,
                initiative: snapshot.initiative,
                unit_type: snapshot.unit_type.clone(),
            });
        }
    }
}

#[derive(Clone, Debug)]
struct ScheduledStrike {
    side: Side,
    squad: SquadIndex,
    initiative: f64,
    unit_type: UnitType,
}

fn strike_order(a: &ScheduledStrike, b: &ScheduledStrike) -> Ordering {
    b.initiative
        .total_cmp(&a.initiative)
        .then_with(|| side_precedence(a.side).cmp(&side_precedence(b.side)))
        .then_with(|| a.unit_type.cmp(&b.unit_type))
}

const fn side_precedence(side: Side) -> u8 {
    match side {
        Side::Attacker => 0,
        Side::Defender => 1,
    }
}
