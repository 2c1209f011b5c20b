use starhold_battle::{simulate, BattleRules};
use starhold_core::{
    BattleReport, FleetId, FleetInput, LocationId, PlayerId, Side, SquadInput, UnitType, Winner,
};

fn squad(unit_type: &str, attack: f64, defense: f64, initiative: f64, count: u32) -> SquadInput {
    SquadInput {
        unit_type: UnitType::new(unit_type),
        attack,
        defense,
        initiative,
        count,
    }
}

fn fleet(id: u64, owner: u64, squads: Vec<SquadInput>) -> FleetInput {
    FleetInput {
        id: FleetId::new(id),
        owner: PlayerId::new(owner),
        origin: LocationId::new(owner * 10),
        target: LocationId::new(owner * 10 + 1),
        squads,
    }
}

fn strike_fleet() -> FleetInput {
    fleet(
        1,
        1,
        vec![
            squad("Interceptor", 12.0, 4.0, 8.0, 10),
            squad("Bomber", 25.0, 6.0, 4.0, 4),
        ],
    )
}

fn garrison_fleet() -> FleetInput {
    fleet(
        2,
        2,
        vec![
            squad("Guardian", 8.0, 10.0, 3.0, 8),
            squad("Sentinel", 6.0, 8.0, 5.0, 6),
        ],
    )
}

fn losses_of(report: &BattleReport, side: Side, unit_type: &str) -> Option<u32> {
    let side_report = match side {
        Side::Attacker => &report.attacker,
        Side::Defender => &report.defender,
    };
    side_report.losses.get(&UnitType::new(unit_type)).copied()
}

#[test]
fn strong_attacker_overruns_weaker_garrison() {
    let report = simulate(&strike_fleet(), &garrison_fleet(), BattleRules::default());

    assert_eq!(report.winner, Winner::Attacker);
    assert!(!report.max_rounds_reached);
    assert_eq!(report.rounds.len(), 1);

    for squad in &report.defender.final_snapshot.squads {
        assert_eq!(squad.count, 0, "{} should be wiped out", squad.unit_type);
    }

    // The sentinels strike the interceptors once before falling; the
    // bombers are never touched.
    assert_eq!(losses_of(&report, Side::Attacker, "Interceptor"), Some(9));
    assert_eq!(losses_of(&report, Side::Attacker, "Bomber"), None);
    assert_eq!(losses_of(&report, Side::Defender, "Guardian"), Some(8));
    assert_eq!(losses_of(&report, Side::Defender, "Sentinel"), Some(6));
}

#[test]
fn round_log_records_strikes_in_initiative_order() {
    let report = simulate(&strike_fleet(), &garrison_fleet(), BattleRules::default());

    let actions = &report.rounds[0].actions;
    assert_eq!(actions.len(), 3);

    assert_eq!(actions[0].side, Side::Attacker);
    assert_eq!(actions[0].actor, UnitType::new("Interceptor"));
    assert_eq!(actions[0].target, UnitType::new("Guardian"));
    assert_eq!(actions[0].damage, 120.0);
    assert_eq!(actions[0].casualties, 8);

    assert_eq!(actions[1].side, Side::Defender);
    assert_eq!(actions[1].actor, UnitType::new("Sentinel"));
    assert_eq!(actions[1].target, UnitType::new("Interceptor"));
    assert_eq!(actions[1].damage, 36.0);
    assert_eq!(actions[1].casualties, 9);

    assert_eq!(actions[2].side, Side::Attacker);
    assert_eq!(actions[2].actor, UnitType::new("Bomber"));
    assert_eq!(actions[2].target, UnitType::new("Sentinel"));
    assert_eq!(actions[2].damage, 100.0);
    assert_eq!(actions[2].casualties, 6);
}

#[test]
fn highest_initiative_opens_the_battle() {
    let mut attacker = strike_fleet();
    for squad in &mut attacker.squads {
        squad.initiative = 1.0;
    }

    let report = simulate(&attacker, &garrison_fleet(), BattleRules::default());

    // The garrison strikes first: the sentinels cut the interceptors down
    // to one and the guardians wipe the bombers before they can act, so
    // only the surviving interceptors answer.
    let actors: Vec<_> = report.rounds[0]
        .actions
        .iter()
        .map(|action| (action.side, action.actor.as_str().to_owned()))
        .collect();
    assert_eq!(
        actors,
        vec![
            (Side::Defender, "Sentinel".to_owned()),
            (Side::Defender, "Guardian".to_owned()),
            (Side::Attacker, "Interceptor".to_owned()),
        ]
    );
}

#[test]
fn tied_initiative_orders_attacker_first_then_by_name() {
    // Everyone shares one initiative value and nobody deals a killing
    // blow, so the full strike order lands in the round log.
    let attacker = fleet(
        1,
        1,
        vec![
            squad("Interceptor", 1.0, 50.0, 2.0, 3),
            squad("Bomber", 1.0, 50.0, 2.0, 3),
        ],
    );
    let defender = fleet(
        2,
        2,
        vec![
            squad("Guardian", 1.0, 50.0, 2.0, 3),
            squad("Aegis", 1.0, 50.0, 2.0, 3),
        ],
    );

    let report = simulate(&attacker, &defender, BattleRules::new(1));

    let actors: Vec<_> = report.rounds[0]
        .actions
        .iter()
        .map(|action| (action.side, action.actor.as_str().to_owned()))
        .collect();
    assert_eq!(
        actors,
        vec![
            (Side::Attacker, "Bomber".to_owned()),
            (Side::Attacker, "Interceptor".to_owned()),
            (Side::Defender, "Aegis".to_owned()),
            (Side::Defender, "Guardian".to_owned()),
        ]
    );
}

#[test]
fn round_cap_forces_a_draw() {
    let attacker = fleet(1, 1, vec![squad("Skirmisher", 2.0, 5.0, 6.0, 3)]);
    let defender = fleet(2, 2, vec![squad("Bulwark", 3.0, 15.0, 2.0, 2)]);

    let report = simulate(&attacker, &defender, BattleRules::new(2));

    assert_eq!(report.winner, Winner::Draw);
    assert!(report.max_rounds_reached);
    assert_eq!(report.rounds.len(), 2);
    assert_eq!(report.rounds[0].number, 1);
    assert_eq!(report.rounds[1].number, 2);
}

#[test]
fn defeated_defender_yields_an_immediate_win() {
    let defender = fleet(2, 2, vec![squad("Guardian", 8.0, 10.0, 3.0, 0)]);

    let report = simulate(&strike_fleet(), &defender, BattleRules::default());

    assert_eq!(report.winner, Winner::Attacker);
    assert!(report.rounds.is_empty());
    assert!(!report.max_rounds_reached);
    assert!(report.attacker.losses.is_empty());
}

#[test]
fn two_defeated_fleets_draw_without_rounds() {
    let attacker = fleet(1, 1, vec![squad("Interceptor", 12.0, 4.0, 8.0, 0)]);
    let defender = fleet(2, 2, vec![squad("Guardian", 8.0, 10.0, 3.0, 0)]);

    let report = simulate(&attacker, &defender, BattleRules::default());

    assert_eq!(report.winner, Winner::Draw);
    assert!(report.rounds.is_empty());
    assert!(!report.max_rounds_reached);
}

#[test]
fn simultaneous_killers_resolve_by_strike_order_not_a_draw() {
    // Either squad could wipe the other in one strike; the strike order
    // decides who actually fires, and the dead loser never answers.
    let attacker = fleet(1, 1, vec![squad("Reaver", 10.0, 1.0, 5.0, 5)]);
    let defender = fleet(2, 2, vec![squad("Reaver", 10.0, 1.0, 5.0, 5)]);

    let report = simulate(&attacker, &defender, BattleRules::default());

    assert_eq!(report.winner, Winner::Attacker);
    assert_eq!(report.rounds.len(), 1);
    assert_eq!(report.rounds[0].actions.len(), 1);
    assert_eq!(report.rounds[0].actions[0].side, Side::Attacker);
}

#[test]
fn empty_rosters_draw_without_rounds() {
    let attacker = fleet(1, 1, Vec::new());
    let defender = fleet(2, 2, Vec::new());

    let report = simulate(&attacker, &defender, BattleRules::default());

    assert_eq!(report.winner, Winner::Draw);
    assert!(report.rounds.is_empty());
}

#[test]
fn identical_inputs_produce_identical_reports() {
    let attacker = strike_fleet();
    let defender = garrison_fleet();

    let first = simulate(&attacker, &defender, BattleRules::default());
    let second = simulate(&attacker, &defender, BattleRules::default());

    assert_eq!(first, second);
}

#[test]
fn caller_inputs_survive_the_simulation_untouched() {
    let attacker = strike_fleet();
    let defender = garrison_fleet();
    let attacker_copy = attacker.clone();
    let defender_copy = defender.clone();

    let _ = simulate(&attacker, &defender, BattleRules::default());

    assert_eq!(attacker, attacker_copy);
    assert_eq!(defender, defender_copy);
}

#[test]
fn losses_never_exceed_initial_counts() {
    let report = simulate(&strike_fleet(), &garrison_fleet(), BattleRules::default());

    for side_report in [&report.attacker, &report.defender] {
        for (unit_type, lost) in &side_report.losses {
            let initial = side_report.initial_snapshot.count_of(unit_type);
            let final_count = side_report.final_snapshot.count_of(unit_type);
            assert!(*lost <= initial, "{unit_type} lost more than it had");
            assert_eq!(*lost, initial - final_count);
            assert!(*lost > 0, "zero-loss entries must be omitted");
        }
    }
}

#[test]
fn rounds_never_exceed_the_cap() {
    let attacker = fleet(1, 1, vec![squad("Skirmisher", 2.0, 5.0, 6.0, 3)]);
    let defender = fleet(2, 2, vec![squad("Bulwark", 3.0, 15.0, 2.0, 2)]);

    for cap in [1, 2, 5, 50] {
        let report = simulate(&attacker, &defender, BattleRules::new(cap));
        assert!(report.rounds.len() as u32 <= cap);
    }
}

#[test]
fn winner_names_the_side_whose_opponent_fell() {
    let report = simulate(&strike_fleet(), &garrison_fleet(), BattleRules::default());
    assert_eq!(report.winner, Winner::Attacker);
    assert!(report.defender.final_snapshot.squads.iter().all(|s| s.count == 0));
    assert!(report.attacker.final_snapshot.squads.iter().any(|s| s.count > 0));

    let report = simulate(&garrison_fleet(), &strike_fleet(), BattleRules::default());
    assert_eq!(report.winner, Winner::Defender);
}

#[test]
fn zero_round_cap_falls_back_to_the_default() {
    assert_eq!(BattleRules::new(0), BattleRules::default());
    assert_eq!(BattleRules::default().max_rounds(), 50);
}

#[test]
fn simulated_report_round_trips_through_json() {
    let report = simulate(&strike_fleet(), &garrison_fleet(), BattleRules::default());

    let json = serde_json::to_string(&report).expect("report serializes");
    let restored: BattleReport = serde_json::from_str(&json).expect("report deserializes");

    assert_eq!(restored, report);
}
