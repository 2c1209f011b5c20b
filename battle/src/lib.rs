#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative battle state and round loop for Starhold.
//!
//! One call to [`simulate`] deep-copies both caller rosters, drives the
//! round loop until a side is eliminated or the round cap fires, and
//! returns an immutable [`BattleReport`]. The loop itself is pure
//! computation: no I/O, no randomness, no shared state between calls.

use std::collections::BTreeMap;

use starhold_core::{
    Action, BattleReport, Fleet, FleetInput, FleetSnapshot, Round, Side, SideReport, StrikeEntry,
    UnitType, Winner, DEFAULT_MAX_ROUNDS,
};
use starhold_system_initiative::InitiativeScheduler;
use starhold_system_targeting::TargetSelector;

/// Caller-adjustable parameters of a battle resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BattleRules {
    max_rounds: u32,
}

impl BattleRules {
    /// Creates rules with the provided round cap.
    ///
    /// A zero cap is treated as unset and falls back to
    /// [`DEFAULT_MAX_ROUNDS`], matching the behaviour callers rely on when
    /// they leave the option out entirely.
    #[must_use]
    pub fn new(max_rounds: u32) -> Self {
        Self {
            max_rounds: if max_rounds == 0 {
                DEFAULT_MAX_ROUNDS
            } else {
                max_rounds
            },
        }
    }

    /// Number of rounds the battle may run before it is declared a draw.
    #[must_use]
    pub const fn max_rounds(&self) -> u32 {
        self.max_rounds
    }
}

impl Default for BattleRules {
    fn default() -> Self {
        Self {
            max_rounds: DEFAULT_MAX_ROUNDS,
        }
    }
}

/// Terminal state of the round loop.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BattleOutcome {
    /// Every attacker squad is dead.
    AttackerEliminated,
    /// Every defender squad is dead.
    DefenderEliminated,
    /// Both fleets were wiped out in the same round.
    BothEliminated,
    /// The round cap fired with both fleets still alive.
    RoundCapReached,
}

impl BattleOutcome {
    /// Maps the terminal state onto the reported verdict.
    #[must_use]
    pub const fn winner(self) -> Winner {
        match self {
            Self::AttackerEliminated => Winner::Defender,
            Self::DefenderEliminated => Winner::Attacker,
            Self::BothEliminated | Self::RoundCapReached => Winner::Draw,
        }
    }
}

/// Mutable state of one battle resolution.
///
/// Owns independently copied fleets for both sides, the growing round log,
/// and the two pure systems it drives each round.
#[derive(Debug)]
pub struct Battle {
    attacker: Fleet,
    defender: Fleet,
    initial_attacker: FleetSnapshot,
    initial_defender: FleetSnapshot,
    rules: BattleRules,
    scheduler: InitiativeScheduler,
    selector: TargetSelector,
    rounds: Vec<Round>,
    order: Vec<StrikeEntry>,
}

impl Battle {
    /// Builds a battle from two caller rosters, taking defensive copies of
    /// both and capturing the initial snapshots before any round runs.
    #[must_use]
    pub fn new(attacker: &FleetInput, defender: &FleetInput, rules: BattleRules) -> Self {
        let attacker = Fleet::from_input(attacker);
        let defender = Fleet::from_input(defender);
        let initial_attacker = attacker.snapshot();
        let initial_defender = defender.snapshot();

        Self {
            attacker,
            defender,
            initial_attacker,
            initial_defender,
            rules,
            scheduler: InitiativeScheduler::new(),
            selector: TargetSelector::new(),
            rounds: Vec::new(),
            order: Vec::new(),
        }
    }

    /// Runs the round loop to completion and assembles the final report.
    #[must_use]
    pub fn resolve(mut self) -> BattleReport {
        let outcome = self.run_rounds();
        self.into_report(outcome)
    }

    fn run_rounds(&mut self) -> BattleOutcome {
        let mut number = 1;
        loop {
            if let Some(outcome) = self.evaluate(number) {
                return outcome;
            }

            self.play_round(number);
            number += 1;
        }
    }

    /// Checks the terminal conditions before the round with the provided
    /// number would run. Eliminations take precedence over the round cap.
    fn evaluate(&self, next_round: u32) -> Option<BattleOutcome> {
        let attacker_defeated = self.attacker.is_defeated();
        let defender_defeated = self.defender.is_defeated();

        if attacker_defeated && defender_defeated {
            return Some(BattleOutcome::BothEliminated);
        }
        if attacker_defeated {
            return Some(BattleOutcome::AttackerEliminated);
        }
        if defender_defeated {
            return Some(BattleOutcome::DefenderEliminated);
        }
        if next_round > self.rules.max_rounds() {
            return Some(BattleOutcome::RoundCapReached);
        }

        None
    }

    fn play_round(&mut self, number: u32) {
        let attacker_view = self.attacker.roster_view();
        let defender_view = self.defender.roster_view();

        let mut order = std::mem::take(&mut self.order);
        self.scheduler
            .handle(&attacker_view, &defender_view, &mut order);

        let selector = self.selector;
        let attacker_fleet = &mut self.attacker;
        let defender_fleet = &mut self.defender;
        let mut actions = Vec::new();

        for entry in &order {
            let (acting_fleet, target_fleet) = match entry.side {
                Side::Attacker => (&*attacker_fleet, &mut *defender_fleet),
                Side::Defender => (&*defender_fleet, &mut *attacker_fleet),
            };

            // Skip squads that died earlier in this round and strikes whose
            // target side was already wiped out.
            if target_fleet.is_defeated() {
                continue;
            }
            let Some(acting_squad) = acting_fleet.squads().get(entry.squad.get()) else {
                continue;
            };
            if !acting_squad.is_alive() {
                continue;
            }

            let attack_power = acting_squad.attack_power();
            let actor = acting_squad.unit_type().clone();

            let Some(target_index) = selector.select(&target_fleet.roster_view()) else {
                continue;
            };
            let Some(target_squad) = target_fleet.squad_mut(target_index) else {
                continue;
            };

            let target = target_squad.unit_type().clone();
            let outcome = target_squad.apply_damage(attack_power);

            actions.push(Action {
                side: entry.side,
                actor,
                target,
                damage: outcome.damage,
                casualties: outcome.casualties,
            });
        }

        self.order = order;
        self.rounds.push(Round { number, actions });
    }

    fn into_report(self, outcome: BattleOutcome) -> BattleReport {
        let final_attacker = self.attacker.snapshot();
        let final_defender = self.defender.snapshot();

        let attacker_losses = compute_losses(&self.initial_attacker, &final_attacker);
        let defender_losses = compute_losses(&self.initial_defender, &final_defender);

        BattleReport {
            attacker: SideReport {
                initial_snapshot: self.initial_attacker,
                final_snapshot: final_attacker,
                losses: attacker_losses,
            },
            defender: SideReport {
                initial_snapshot: self.initial_defender,
                final_snapshot: final_defender,
                losses: defender_losses,
            },
            rounds: self.rounds,
            winner: outcome.winner(),
            max_rounds_reached: matches!(outcome, BattleOutcome::RoundCapReached),
        }
    }
}

/// Resolves one battle between two rosters and returns the immutable
/// report. The caller's inputs are never mutated and may be reused freely;
/// identical inputs always produce an identical report.
#[must_use]
pub fn simulate(attacker: &FleetInput, defender: &FleetInput, rules: BattleRules) -> BattleReport {
    Battle::new(attacker, defender, rules).resolve()
}

/// Per-unit-type difference between the initial and final snapshots, with
/// zero-loss entries omitted.
fn compute_losses(
    initial: &FleetSnapshot,
    current: &FleetSnapshot,
) -> BTreeMap<UnitType, u32> {
    let mut losses = BTreeMap::new();

    for squad in &initial.squads {
        if losses.contains_key(&squad.unit_type) {
            continue;
        }

        let before = initial.count_of(&squad.unit_type);
        let after = current.count_of(&squad.unit_type);
        let lost = before.saturating_sub(after);
        if lost > 0 {
            let _ = losses.insert(squad.unit_type.clone(), lost);
        }
    }

    losses
}
