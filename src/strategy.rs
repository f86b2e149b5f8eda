use crate::compound::{Compound, CompoundSet};
use crate::error::{Result, StrategyError};
use crate::model::{TyreLaw, TyreModel};
use crate::state::{Action, Decision, RaceState};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

// A run of laps on one set of tyres.
#[derive(Debug, Clone, PartialEq)]
pub struct Stint {
    pub compound: Compound,
    // 1-based race lap the stint begins on.
    pub start_lap: u32,
    pub start_age: u32,
    pub laps: u32,
    pub lap_times: Vec<f64>,
}

impl Stint {
    pub fn time(&self) -> f64 {
        self.lap_times.iter().sum()
    }
}

// The optimal plan from a start state, one decision per lap.
#[derive(Debug, Clone)]
pub struct Strategy {
    pub start: RaceState,
    pub total_time: f64,
    pub decisions: Vec<Decision>,
    pub stints: Vec<Stint>,
}

impl Strategy {
    pub fn pit_stops(&self) -> usize {
        self.decisions.iter().filter(|d| d.pit_target().is_some()).count()
    }

    // Race laps (1-based) on which the car pits.
    pub fn pit_laps(&self) -> Vec<u32> {
        self.decisions
            .iter()
            .enumerate()
            .filter(|(_, d)| d.pit_target().is_some())
            .map(|(i, _)| i as u32 + 1)
            .collect()
    }

    pub fn compounds_used(&self) -> CompoundSet {
        self.stints.iter().map(|s| s.compound).collect()
    }
}

// race length must be at least a lap, pit loss a finite non-negative time
pub fn check_race(race_laps: u32, pit_loss: f64) -> Result<()> {
    if race_laps == 0 {
        return Err(StrategyError::InvalidRaceLength);
    }
    if !pit_loss.is_finite() || pit_loss < 0.0 {
        return Err(StrategyError::InvalidPitLoss(pit_loss));
    }
    Ok(())
}

// Memoized minimum-time solver over `RaceState`.
//
// At each state it weighs staying out one more lap against pitting for
// every compound in the fleet. Terminal states with fewer than two
// compounds used cost `f64::INFINITY`, which keeps the optimizer away from
// single-compound races.
pub struct StrategySolver {
    models: BTreeMap<Compound, TyreModel>,
    race_laps: u32,
    pit_loss: f64,
    memo: HashMap<RaceState, Decision>,
}

impl StrategySolver {
    pub fn new(models: Vec<TyreModel>, race_laps: u32, pit_loss: f64) -> Result<Self> {
        check_race(race_laps, pit_loss)?;
        if models.is_empty() {
            return Err(StrategyError::EmptyFleet);
        }

        let mut fleet = BTreeMap::new();
        for model in models {
            let compound = model.compound();
            if model.max_laps() < race_laps as usize {
                return Err(StrategyError::InsufficientCoverage {
                    compound,
                    covered: model.max_laps(),
                    required: race_laps as usize,
                });
            }
            model.check()?;
            if fleet.insert(compound, model).is_some() {
                return Err(StrategyError::DuplicateCompound(compound));
            }
        }

        debug!(race_laps, pit_loss, compounds = fleet.len(), "built strategy solver");
        Ok(Self {
            models: fleet,
            race_laps,
            pit_loss,
            memo: HashMap::new(),
        })
    }

    // Builds the fleet straight from the externally supplied laws, with
    // lap tables sized to the race.
    pub fn from_laws(laws: &[TyreLaw], race_laps: u32, pit_loss: f64) -> Result<Self> {
        let models = laws
            .iter()
            .map(|law| {
                let compound: Compound = law
                    .compound
                    .parse()
                    .map_err(|_| StrategyError::UnknownCompound(law.compound.clone()))?;
                Ok(TyreModel::new(compound, law.slope, law.intercept, race_laps as usize))
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(models, race_laps, pit_loss)
    }

    pub fn race_laps(&self) -> u32 {
        self.race_laps
    }

    pub fn pit_loss(&self) -> f64 {
        self.pit_loss
    }

    pub fn model(&self, compound: Compound) -> Option<&TyreModel> {
        self.models.get(&compound)
    }

    // Fleet compounds in enumeration order.
    pub fn compounds(&self) -> impl Iterator<Item = Compound> + '_ {
        self.models.keys().copied()
    }

    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    // Minimum time from `state` to the end of the race and the action that
    // gets there. Ties keep the first candidate: staying out, then pit
    // options in compound order.
    pub fn solve(&mut self, state: RaceState) -> Result<Decision> {
        if state.is_finished() {
            return Ok(if state.usage.len() >= 2 {
                Decision {
                    total_time: 0.0,
                    action: Action::StayOut,
                }
            } else {
                Decision::infeasible()
            });
        }

        if let Some(decision) = self.memo.get(&state) {
            return Ok(*decision);
        }

        let stay_lap = self
            .models
            .get(&state.compound)
            .ok_or_else(|| StrategyError::UnknownCompound(state.compound.to_string()))?
            .lap_time(state.tyre_age);

        let mut best: Option<Decision> = None;

        // a tyre past its table is exhausted, so staying out is not an option
        if let Some(lap) = stay_lap {
            let rest = self.solve(state.stay_out())?;
            best = Some(Decision {
                total_time: lap + rest.total_time,
                action: Action::StayOut,
            });
        }

        for dest in Compound::ALL {
            let Some(fresh_lap) = self.models.get(&dest).and_then(|m| m.lap_time(0)) else {
                continue;
            };
            let rest = self.solve(state.pit(dest))?;
            let total_time = self.pit_loss + fresh_lap + rest.total_time;
            if best.map_or(true, |b| total_time < b.total_time) {
                best = Some(Decision {
                    total_time,
                    action: Action::Pit(dest),
                });
            }
        }

        let decision = best.unwrap_or_else(Decision::infeasible);
        self.memo.insert(state, decision);
        Ok(decision)
    }

    // Walks forward from `start` along the stored optimal decisions,
    // returning one decision per remaining lap.
    pub fn full_strategy(&mut self, start: RaceState) -> Result<Vec<Decision>> {
        let mut plan = Vec::with_capacity(start.laps_remaining as usize);
        let mut state = start;
        while !state.is_finished() {
            let decision = self.solve(state)?;
            plan.push(decision);
            state = state.apply(decision.action);
        }
        Ok(plan)
    }

    // Solves the race from a fresh set of every fleet compound and returns
    // the cheapest start. The result may be infeasible.
    pub fn best_start(&mut self) -> Result<(RaceState, Decision)> {
        let starts: Vec<Compound> = self.compounds().collect();
        let mut best: Option<(RaceState, Decision)> = None;

        for compound in starts {
            let state = RaceState::start(compound, self.race_laps);
            let decision = self.solve(state)?;
            debug!(%compound, total_time = decision.total_time, "solved start");
            if best.map_or(true, |(_, b)| decision.total_time < b.total_time) {
                best = Some((state, decision));
            }
        }

        best.ok_or(StrategyError::EmptyFleet)
    }

    // Full optimal race plan over every starting compound.
    pub fn optimal_strategy(&mut self) -> Result<Strategy> {
        let (start, decision) = self.best_start()?;
        if !decision.is_feasible() {
            return Err(StrategyError::NoFeasibleStrategy);
        }

        let decisions = self.full_strategy(start)?;
        let stints = self.stints(start, &decisions)?;
        debug!(
            total_time = decision.total_time,
            states = self.memo.len(),
            "found optimal strategy"
        );

        Ok(Strategy {
            start,
            total_time: decision.total_time,
            decisions,
            stints,
        })
    }

    fn stints(&self, start: RaceState, decisions: &[Decision]) -> Result<Vec<Stint>> {
        // (compound, start lap, start age, laps)
        let mut spans = Vec::new();
        let mut current = (start.compound, 1u32, start.tyre_age, 0u32);

        for (i, decision) in decisions.iter().enumerate() {
            match decision.action {
                Action::StayOut => current.3 += 1,
                Action::Pit(dest) => {
                    if current.3 > 0 {
                        spans.push(current);
                    }
                    current = (dest, i as u32 + 1, 0, 1);
                }
            }
        }
        if current.3 > 0 {
            spans.push(current);
        }

        spans
            .into_iter()
            .map(|(compound, start_lap, start_age, laps)| {
                let model = self
                    .models
                    .get(&compound)
                    .ok_or_else(|| StrategyError::UnknownCompound(compound.to_string()))?;
                let lap_times = model
                    .stint(start_age as usize, laps as usize)
                    .ok_or(StrategyError::InsufficientCoverage {
                        compound,
                        covered: model.max_laps(),
                        required: (start_age + laps) as usize,
                    })?
                    .to_vec();
                Ok(Stint {
                    compound,
                    start_lap,
                    start_age,
                    laps,
                    lap_times,
                })
            })
            .collect()
    }
}
