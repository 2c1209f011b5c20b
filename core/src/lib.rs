#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Starhold battle engine.
//!
//! This crate defines the data surface that connects adapters, the
//! authoritative battle state, and pure systems. Adapters hand the battle
//! crate a pair of [`FleetInput`] descriptions, the battle crate owns the
//! mutable [`Fleet`] state for the duration of one resolution, and the pure
//! systems consume order-preserving [`RosterView`] snapshots to produce
//! strike orders and target choices. The immutable [`BattleReport`] returned
//! to the caller is the serialization contract consumed downstream.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Default number of rounds a battle may run before it is declared a draw.
pub const DEFAULT_MAX_ROUNDS: u32 = 50;

/// Unique identifier of a player account, opaque to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(u64);

impl PlayerId {
    /// Creates a new player identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Unique identifier of a fleet, opaque to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FleetId(u64);

impl FleetId {
    /// Creates a new fleet identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Unique identifier of a world location, opaque to the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LocationId(u64);

impl LocationId {
    /// Creates a new location identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Name of a unit type, the key used by every alphabetical tie-break and by
/// per-type loss accounting.
///
/// Ordering is byte-wise lexicographic over the name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitType(String);

impl UnitType {
    /// Creates a new unit type from the provided name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrows the unit type name.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Side of a battle a squad fights on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The fleet that initiated the battle.
    Attacker,
    /// The fleet defending against the attack.
    Defender,
}

impl Side {
    /// Returns the opposing side.
    #[must_use]
    pub const fn opponent(self) -> Self {
        match self {
            Self::Attacker => Self::Defender,
            Self::Defender => Self::Attacker,
        }
    }
}

/// Verdict of a resolved battle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    /// The attacking fleet eliminated the defender.
    Attacker,
    /// The defending fleet eliminated the attacker.
    Defender,
    /// Both fleets were eliminated, or the round cap was reached.
    Draw,
}

/// Caller-supplied description of a single squad.
///
/// Stat fields degrade instead of failing: absent or non-numeric values
/// deserialize to zero and negative head-counts to an empty squad, so one
/// malformed stat never rejects the whole fleet. Final normalization
/// happens when a [`Squad`] is built.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadInput {
    /// Name of the unit type the squad is composed of.
    pub unit_type: UnitType,
    /// Damage dealt by a single member per strike.
    #[serde(default, deserialize_with = "lenient::stat")]
    pub attack: f64,
    /// Damage required to kill a single member.
    #[serde(default, deserialize_with = "lenient::stat")]
    pub defense: f64,
    /// Priority of the squad within the per-round strike order.
    #[serde(default, deserialize_with = "lenient::stat")]
    pub initiative: f64,
    /// Number of living members.
    #[serde(default, deserialize_with = "lenient::count")]
    pub count: u32,
}

/// Caller-supplied description of one side of a battle.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FleetInput {
    /// Identifier of the fleet.
    pub id: FleetId,
    /// Player that owns the fleet.
    pub owner: PlayerId,
    /// Location the fleet departed from.
    pub origin: LocationId,
    /// Location the fleet is striking at.
    pub target: LocationId,
    /// Squads composing the fleet, in caller order.
    pub squads: Vec<SquadInput>,
}

/// Permissive deserialization for caller-supplied squad stats.
///
/// Accepts any self-describing value in place of a number: numbers pass
/// through, everything else becomes zero. Requires a self-describing
/// format, which is why the input records round-trip through JSON rather
/// than bincode.
mod lenient {
    use std::fmt;

    use serde::de::{Deserializer, Error, IgnoredAny, MapAccess, SeqAccess, Visitor};

    pub(crate) fn stat<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(StatVisitor)
    }

    pub(crate) fn count<'de, D>(deserializer: D) -> Result<u32, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(CountVisitor)
    }

    struct StatVisitor;

    impl<'de> Visitor<'de> for StatVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a numeric squad stat")
        }

        fn visit_f64<E: Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_bool<E: Error>(self, _value: bool) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_str<E: Error>(self, _value: &str) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_unit<E: Error>(self) -> Result<f64, E> {
            Ok(0.0)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<f64, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<f64, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0.0)
        }
    }

    struct CountVisitor;

    impl<'de> Visitor<'de> for CountVisitor {
        type Value = u32;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a squad head-count")
        }

        fn visit_u64<E: Error>(self, value: u64) -> Result<u32, E> {
            Ok(u32::try_from(value).unwrap_or(u32::MAX))
        }

        fn visit_i64<E: Error>(self, value: i64) -> Result<u32, E> {
            if value < 0 {
                Ok(0)
            } else {
                Ok(u32::try_from(value).unwrap_or(u32::MAX))
            }
        }

        fn visit_f64<E: Error>(self, value: f64) -> Result<u32, E> {
            // Float to int casts saturate, so negative and NaN counts
            // land on zero and oversized ones on u32::MAX.
            Ok(value as u32)
        }

        fn visit_bool<E: Error>(self, _value: bool) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_str<E: Error>(self, _value: &str) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_unit<E: Error>(self) -> Result<u32, E> {
            Ok(0)
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<u32, A::Error> {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            Ok(0)
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<u32, A::Error> {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            Ok(0)
        }
    }
}

/// Result of applying damage to a squad.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DamageOutcome {
    /// Members actually removed from the squad.
    pub casualties: u32,
    /// Normalized damage value that was applied, retained for logging.
    pub damage: f64,
}

/// Live combat state of a group of identical-stat units.
///
/// Built once per battle from a [`SquadInput`]; the normalization applied at
/// construction keeps the damage formula total, so no runtime guards exist
/// inside [`Squad::apply_damage`].
#[derive(Clone, Debug, PartialEq)]
pub struct Squad {
    unit_type: UnitType,
    attack: f64,
    defense: f64,
    initiative: f64,
    count: u32,
}

impl Squad {
    /// Builds a squad from caller input, normalizing every stat.
    ///
    /// Attack values that are negative or not finite become zero. Defense
    /// values that are non-positive or not finite become one, which keeps
    /// the casualty division well defined. Initiative keeps negative values
    /// but replaces non-finite ones with zero.
    #[must_use]
    pub fn from_input(input: &SquadInput) -> Self {
        Self {
            unit_type: input.unit_type.clone(),
            attack: normalized_attack(input.attack),
            defense: normalized_defense(input.defense),
            initiative: normalized_initiative(input.initiative),
            count: input.count,
        }
    }

    /// Name of the unit type the squad is composed of.
    #[must_use]
    pub fn unit_type(&self) -> &UnitType {
        &self.unit_type
    }

    /// Damage dealt by a single member per strike.
    #[must_use]
    pub const fn attack(&self) -> f64 {
        self.attack
    }

    /// Damage required to kill a single member.
    #[must_use]
    pub const fn defense(&self) -> f64 {
        self.defense
    }

    /// Priority of the squad within the per-round strike order.
    #[must_use]
    pub const fn initiative(&self) -> f64 {
        self.initiative
    }

    /// Number of living members.
    #[must_use]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Reports whether any members remain alive.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.count > 0
    }

    /// Combined firepower of the squad's living members.
    #[must_use]
    pub fn attack_power(&self) -> f64 {
        f64::from(self.count) * self.attack
    }

    /// Applies raw damage to the squad and removes the resulting casualties.
    ///
    /// Damage below zero is normalized to zero before use. Defense acts as
    /// hit points per member: the number of potential casualties is the
    /// normalized damage divided by defense, rounded down, and damage that
    /// falls short of one full member kills nobody. Casualties are clamped
    /// to the current head-count. Striking a dead squad is a no-op that
    /// still reports the normalized damage.
    pub fn apply_damage(&mut self, raw_damage: f64) -> DamageOutcome {
        let damage = if raw_damage > 0.0 { raw_damage } else { 0.0 };
        if !self.is_alive() {
            return DamageOutcome {
                casualties: 0,
                damage,
            };
        }

        let potential = (damage / self.defense).floor();
        let casualties = if potential >= f64::from(self.count) {
            self.count
        } else {
            potential as u32
        };
        self.count -= casualties;

        DamageOutcome { casualties, damage }
    }

    /// Captures the squad's current state as a plain record.
    #[must_use]
    pub fn snapshot(&self) -> SquadSnapshot {
        SquadSnapshot {
            unit_type: self.unit_type.clone(),
            attack: self.attack,
            defense: self.defense,
            initiative: self.initiative,
            count: self.count,
        }
    }
}

fn normalized_attack(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn normalized_defense(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        1.0
    }
}

fn normalized_initiative(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One side's full roster of squads during a battle.
///
/// Construction always deep-copies the caller's input, so mutating a fleet
/// over the course of the round loop never aliases caller-owned data or a
/// second battle built from the same description.
#[derive(Clone, Debug)]
pub struct Fleet {
    id: FleetId,
    owner: PlayerId,
    origin: LocationId,
    target: LocationId,
    squads: Vec<Squad>,
}

impl Fleet {
    /// Builds an independently owned fleet from caller input.
    #[must_use]
    pub fn from_input(input: &FleetInput) -> Self {
        Self {
            id: input.id,
            owner: input.owner,
            origin: input.origin,
            target: input.target,
            squads: input.squads.iter().map(Squad::from_input).collect(),
        }
    }

    /// Identifier of the fleet.
    #[must_use]
    pub const fn id(&self) -> FleetId {
        self.id
    }

    /// Player that owns the fleet.
    #[must_use]
    pub const fn owner(&self) -> PlayerId {
        self.owner
    }

    /// Location the fleet departed from.
    #[must_use]
    pub const fn origin(&self) -> LocationId {
        self.origin
    }

    /// Location the fleet is striking at.
    #[must_use]
    pub const fn target(&self) -> LocationId {
        self.target
    }

    /// Squads composing the fleet, in construction order.
    #[must_use]
    pub fn squads(&self) -> &[Squad] {
        &self.squads
    }

    /// Mutable access to a squad addressed by its roster position.
    #[must_use]
    pub fn squad_mut(&mut self, index: SquadIndex) -> Option<&mut Squad> {
        self.squads.get_mut(index.get())
    }

    /// Reports whether every squad in the fleet is dead.
    #[must_use]
    pub fn is_defeated(&self) -> bool {
        !self.squads.iter().any(Squad::is_alive)
    }

    /// Captures the fleet's current state as a plain record.
    #[must_use]
    pub fn snapshot(&self) -> FleetSnapshot {
        FleetSnapshot {
            id: self.id,
            owner: self.owner,
            origin: self.origin,
            target: self.target,
            squads: self.squads.iter().map(Squad::snapshot).collect(),
        }
    }

    /// Captures an order-preserving read model of the fleet for the pure
    /// systems, with each squad addressable by its roster position.
    #[must_use]
    pub fn roster_view(&self) -> RosterView {
        RosterView::from_snapshots(self.squads.iter().map(Squad::snapshot).collect())
    }
}

/// Immutable representation of a single squad's state used for queries.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SquadSnapshot {
    /// Name of the unit type the squad is composed of.
    pub unit_type: UnitType,
    /// Damage dealt by a single member per strike.
    pub attack: f64,
    /// Damage required to kill a single member.
    pub defense: f64,
    /// Priority of the squad within the per-round strike order.
    pub initiative: f64,
    /// Number of living members at the moment of the capture.
    pub count: u32,
}

impl SquadSnapshot {
    /// Reports whether any members were alive at the moment of the capture.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.count > 0
    }

    /// Combined firepower of the squad's living members.
    #[must_use]
    pub fn attack_power(&self) -> f64 {
        f64::from(self.count) * self.attack
    }
}

/// Immutable representation of a fleet's state used for queries and reports.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FleetSnapshot {
    /// Identifier of the fleet.
    pub id: FleetId,
    /// Player that owns the fleet.
    pub owner: PlayerId,
    /// Location the fleet departed from.
    pub origin: LocationId,
    /// Location the fleet is striking at.
    pub target: LocationId,
    /// Squads composing the fleet, in construction order.
    pub squads: Vec<SquadSnapshot>,
}

impl FleetSnapshot {
    /// Total member count across every squad of the provided unit type.
    #[must_use]
    pub fn count_of(&self, unit_type: &UnitType) -> u32 {
        self.squads
            .iter()
            .filter(|squad| &squad.unit_type == unit_type)
            .map(|squad| squad.count)
            .sum()
    }
}

/// Position of a squad within its fleet's roster.
///
/// Roster order is fixed for the lifetime of a battle, so an index captured
/// from a [`RosterView`] remains a valid address into the owning [`Fleet`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SquadIndex(usize);

impl SquadIndex {
    /// Creates a new roster position wrapper.
    #[must_use]
    pub const fn new(value: usize) -> Self {
        Self(value)
    }

    /// Retrieves the underlying roster position.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

/// Read-only, order-preserving view of one fleet's roster.
///
/// Unlike identifier-sorted views, roster views keep the fleet's insertion
/// order so that every snapshot's position doubles as its [`SquadIndex`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RosterView {
    snapshots: Vec<SquadSnapshot>,
}

impl RosterView {
    /// Creates a new roster view from snapshots in fleet order.
    #[must_use]
    pub fn from_snapshots(snapshots: Vec<SquadSnapshot>) -> Self {
        Self { snapshots }
    }

    /// Iterator over the captured snapshots paired with their positions.
    pub fn iter(&self) -> impl Iterator<Item = (SquadIndex, &SquadSnapshot)> {
        self.snapshots
            .iter()
            .enumerate()
            .map(|(position, snapshot)| (SquadIndex::new(position), snapshot))
    }

    /// Returns the snapshot stored at the provided roster position.
    #[must_use]
    pub fn get(&self, index: SquadIndex) -> Option<&SquadSnapshot> {
        self.snapshots.get(index.get())
    }

    /// Number of squads captured by the view, dead ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view captured no squads at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// One slot in a round's strike order, produced by the initiative system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrikeEntry {
    /// Side the scheduled squad fights on.
    pub side: Side,
    /// Roster position of the scheduled squad within its fleet.
    pub squad: SquadIndex,
}

/// A single recorded strike within a round.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Action {
    /// Side the acting squad fights on.
    pub side: Side,
    /// Unit type of the acting squad.
    pub actor: UnitType,
    /// Unit type of the squad that absorbed the strike.
    pub target: UnitType,
    /// Normalized damage applied by the strike.
    pub damage: f64,
    /// Members removed from the target squad.
    pub casualties: u32,
}

/// One full pass of the strike order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// One-based position of the round within the battle.
    pub number: u32,
    /// Strikes recorded during the round, in execution order.
    pub actions: Vec<Action>,
}

/// Per-side section of a battle report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SideReport {
    /// Fleet state captured before the first round.
    pub initial_snapshot: FleetSnapshot,
    /// Fleet state captured after the round loop ended.
    pub final_snapshot: FleetSnapshot,
    /// Members lost per unit type; types with zero losses are omitted.
    pub losses: BTreeMap<UnitType, u32>,
}

/// Final immutable outcome record of one battle resolution.
///
/// The serde representation of this type is the plain-record shape handed
/// to the persistence collaborator; serialization is lossless in both the
/// JSON and binary codecs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BattleReport {
    /// Attacker-side snapshots and losses.
    pub attacker: SideReport,
    /// Defender-side snapshots and losses.
    pub defender: SideReport,
    /// Round log, in execution order.
    pub rounds: Vec<Round>,
    /// Verdict of the battle.
    pub winner: Winner,
    /// Whether the round cap ended the battle with both sides alive.
    pub max_rounds_reached: bool,
}
