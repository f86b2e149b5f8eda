use crate::error::Result;
use crate::model::TyreLaw;
use crate::strategy::{check_race, StrategySolver};

pub const DEFAULT_TOTAL_LAPS: u32 = 56;
pub const DEFAULT_PIT_LOSS: f64 = 21.0;

/// Race length and pit cost for one solve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaceConfig {
    pub total_laps: u32,
    pub pit_loss: f64,
}

impl Default for RaceConfig {
    fn default() -> Self {
        Self {
            total_laps: DEFAULT_TOTAL_LAPS,
            pit_loss: DEFAULT_PIT_LOSS,
        }
    }
}

impl RaceConfig {
    pub fn new(total_laps: u32, pit_loss: f64) -> Self {
        Self {
            total_laps,
            pit_loss,
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_race(self.total_laps, self.pit_loss)
    }

    // the solver runs the same race checks on construction
    pub fn solver(&self, laws: &[TyreLaw]) -> Result<StrategySolver> {
        StrategySolver::from_laws(laws, self.total_laps, self.pit_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StrategyError;

    #[test]
    fn defaults_are_valid() {
        let config = RaceConfig::default();
        assert_eq!(config.total_laps, 56);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_race_and_negative_pit_loss() {
        assert!(matches!(
            RaceConfig::new(0, 20.0).validate(),
            Err(StrategyError::InvalidRaceLength)
        ));
        assert!(matches!(
            RaceConfig::new(10, -0.5).validate(),
            Err(StrategyError::InvalidPitLoss(_))
        ));
        assert!(matches!(
            RaceConfig::new(10, f64::INFINITY).validate(),
            Err(StrategyError::InvalidPitLoss(_))
        ));
    }

    #[test]
    fn builds_a_solver_for_the_race() {
        let laws = vec![TyreLaw::new("SOFT", 0.1, 90.0), TyreLaw::new("HARD", 0.02, 92.0)];
        let solver = RaceConfig::new(30, 19.5).solver(&laws).unwrap();
        assert_eq!(solver.race_laps(), 30);
        assert_eq!(solver.pit_loss(), 19.5);
        assert_eq!(solver.model(crate::Compound::Hard).map(|m| m.max_laps()), Some(30));
    }

    #[test]
    fn solver_rejects_what_validate_rejects() {
        let laws = vec![TyreLaw::new("SOFT", 0.1, 90.0), TyreLaw::new("HARD", 0.02, 92.0)];
        let config = RaceConfig::new(0, 20.0);
        assert!(config.validate().is_err());
        assert!(matches!(config.solver(&laws), Err(StrategyError::InvalidRaceLength)));
    }
}
