//! End-to-end checks of the solver through the public API.

use tyre_strategy::{Action, Compound, CompoundSet, RaceState, StrategySolver, TyreLaw};

fn reference_laws() -> Vec<TyreLaw> {
    vec![
        TyreLaw::new("SOFT", 0.10, 90.0),
        TyreLaw::new("MEDIUM", 0.05, 91.0),
        TyreLaw::new("HARD", 0.02, 92.0),
    ]
}

fn reference_solver() -> StrategySolver {
    StrategySolver::from_laws(&reference_laws(), 10, 20.0).unwrap()
}

fn every_usage() -> Vec<CompoundSet> {
    (1u8..8)
        .map(|bits| {
            Compound::ALL
                .into_iter()
                .enumerate()
                .filter(|(i, _)| bits & (1 << i) != 0)
                .map(|(_, c)| c)
                .collect()
        })
        .collect()
}

#[test]
fn ten_lap_race_from_soft_pits_exactly_once() {
    let mut solver = reference_solver();
    let start = RaceState::start(Compound::Soft, 10);

    let best = solver.solve(start).unwrap();
    assert!(best.is_feasible());

    let plan = solver.full_strategy(start).unwrap();
    assert_eq!(plan.len(), 10);

    let pits: Vec<_> = plan.iter().filter_map(|d| d.pit_target()).collect();
    assert_eq!(pits, vec![Compound::Medium]);
    // nine laps on softs, then a single lap on mediums
    assert_eq!(plan[9].action, Action::Pit(Compound::Medium));
    assert!((best.total_time - 924.6).abs() < 1e-9);

    let end = plan.iter().fold(start, |state, d| state.apply(d.action));
    assert_eq!(end.laps_remaining, 0);
    assert_eq!(end.usage.len(), 2);
}

#[test]
fn plan_costs_add_up_to_the_solved_time() {
    let mut solver = reference_solver();
    let start = RaceState::start(Compound::Hard, 10);
    let best = solver.solve(start).unwrap();
    let plan = solver.full_strategy(start).unwrap();

    let mut state = start;
    let mut total = 0.0;
    for decision in &plan {
        let lap = match decision.action {
            Action::StayOut => solver.model(state.compound).unwrap().lap_time(state.tyre_age).unwrap(),
            Action::Pit(dest) => solver.pit_loss() + solver.model(dest).unwrap().lap_time(0).unwrap(),
        };
        total += lap;
        state = state.apply(decision.action);
    }
    assert!((total - best.total_time).abs() < 1e-9);
}

#[test]
fn full_strategy_reuses_the_memo() {
    let mut solver = reference_solver();
    let start = RaceState::start(Compound::Medium, 10);
    solver.solve(start).unwrap();
    let explored = solver.memo_len();
    assert!(explored > 0);

    solver.full_strategy(start).unwrap();
    assert_eq!(solver.memo_len(), explored);
}

#[test]
fn repeated_solves_are_bit_identical() {
    let mut solver = reference_solver();
    let start = RaceState::start(Compound::Soft, 10);
    let first = solver.solve(start).unwrap();
    let second = solver.solve(start).unwrap();
    assert_eq!(first.total_time.to_bits(), second.total_time.to_bits());
    assert_eq!(first.action, second.action);

    let mut fresh = reference_solver();
    let third = fresh.solve(start).unwrap();
    assert_eq!(first.total_time.to_bits(), third.total_time.to_bits());
}

#[test]
fn finished_race_costs_nothing_only_with_two_compounds() {
    let mut solver = reference_solver();
    for usage in every_usage() {
        for compound in Compound::ALL {
            let state = RaceState::new(compound, 3, 0, usage);
            let decision = solver.solve(state).unwrap();
            if usage.len() >= 2 {
                assert_eq!(decision.total_time, 0.0);
            } else {
                assert_eq!(decision.total_time, f64::INFINITY);
            }
        }
    }
    assert_eq!(solver.solve(RaceState::start(Compound::Hard, 0)).unwrap().total_time, f64::INFINITY);
}

#[test]
fn solved_cost_is_never_worse_than_any_single_option() {
    let mut solver = reference_solver();
    let pit_loss = solver.pit_loss();

    for usage in every_usage() {
        for compound in usage.iter() {
            for age in 0..10u32 {
                for laps in 1..=10u32 {
                    let state = RaceState::new(compound, age, laps, usage);
                    let best = solver.solve(state).unwrap().total_time;

                    if let Some(lap) = solver.model(compound).unwrap().lap_time(age) {
                        let stay = lap + solver.solve(state.stay_out()).unwrap().total_time;
                        assert!(best <= stay, "{state}: {best} > stay {stay}");
                    }
                    for dest in Compound::ALL {
                        let fresh = solver.model(dest).unwrap().lap_time(0).unwrap();
                        let pit = pit_loss + fresh + solver.solve(state.pit(dest)).unwrap().total_time;
                        assert!(best <= pit, "{state}: {best} > pit {dest} {pit}");
                    }
                    assert!(!best.is_nan());
                }
            }
        }
    }
}

#[test]
fn ties_prefer_staying_out() {
    let laws = vec![TyreLaw::new("SOFT", 0.0, 90.0), TyreLaw::new("MEDIUM", 0.0, 90.0)];
    let mut solver = StrategySolver::from_laws(&laws, 5, 0.0).unwrap();
    let usage = CompoundSet::single(Compound::Soft).with(Compound::Medium);
    let decision = solver.solve(RaceState::new(Compound::Soft, 2, 1, usage)).unwrap();
    assert_eq!(decision.action, Action::StayOut);
    assert_eq!(decision.total_time, 90.0);
}

#[test]
fn ties_between_pit_options_follow_compound_order() {
    let laws = vec![
        TyreLaw::new("HARD", 0.0, 92.0),
        TyreLaw::new("SOFT", 0.1, 90.0),
        TyreLaw::new("MEDIUM", 0.0, 92.0),
    ];
    let mut solver = StrategySolver::from_laws(&laws, 5, 0.0).unwrap();
    let state = RaceState::new(Compound::Soft, 1, 1, CompoundSet::single(Compound::Soft));
    let decision = solver.solve(state).unwrap();
    assert_eq!(decision.pit_target(), Some(Compound::Medium));
    assert_eq!(decision.total_time, 92.0);
}

#[test]
fn optimal_strategy_picks_the_cheapest_start() {
    let mut solver = reference_solver();
    let starts: Vec<f64> = Compound::ALL
        .into_iter()
        .map(|c| solver.solve(RaceState::start(c, 10)).unwrap().total_time)
        .collect();
    let cheapest = starts.iter().copied().fold(f64::INFINITY, f64::min);

    let strategy = solver.optimal_strategy().unwrap();
    assert_eq!(strategy.total_time, cheapest);
    assert_eq!(strategy.decisions.len(), 10);
    assert_eq!(strategy.compounds_used().len(), 2);
    assert_eq!(strategy.stints.iter().map(|s| s.laps).sum::<u32>(), 10);
}

#[test]
fn sixty_six_lap_race_solves() {
    let mut solver = StrategySolver::from_laws(&reference_laws(), 66, 21.0).unwrap();
    let strategy = solver.optimal_strategy().unwrap();
    assert_eq!(strategy.decisions.len(), 66);
    assert!(strategy.total_time.is_finite());
    assert!(strategy.pit_stops() >= 1);
}
