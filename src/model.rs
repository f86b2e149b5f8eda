use crate::compound::Compound;
use crate::data::LapSample;
use crate::error::{Result, StrategyError};
use linfa::prelude::*;
use linfa_linear::LinearRegression;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

// Fewer samples than this and a compound's fit is not trusted.
pub const MIN_FIT_SAMPLES: usize = 5;

// Tyres never get faster with age, so fitted slopes are floored here.
pub const MIN_SLOPE: f64 = 0.001;

// residuals further than this many standard deviations out are dropped
pub const OUTLIER_SIGMA: f64 = 3.5;

// One `(compound, slope, intercept)` entry as the tyre-model service
// returns it. The compound is kept as the raw name until a model is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TyreLaw {
    #[serde(rename = "Compound", alias = "compound")]
    pub compound: String,
    #[serde(rename = "Slope", alias = "slope")]
    pub slope: f64,
    #[serde(rename = "Intercept", alias = "intercept")]
    pub intercept: f64,
}

impl TyreLaw {
    pub fn new(compound: impl Into<String>, slope: f64, intercept: f64) -> Self {
        Self {
            compound: compound.into(),
            slope,
            intercept,
        }
    }
}

// Lap-time lookup for one compound, indexed by tyre age.
//
// `lap_times[a] == slope * a + intercept` for every age `a < max_laps`.
#[derive(Debug, Clone)]
pub struct TyreModel {
    compound: Compound,
    slope: f64,
    intercept: f64,
    lap_times: Vec<f64>,
}

impl TyreModel {
    pub fn new(compound: Compound, slope: f64, intercept: f64, max_laps: usize) -> Self {
        let lap_times = (0..max_laps)
            .map(|age| age as f64 * slope + intercept)
            .collect();
        Self {
            compound,
            slope,
            intercept,
            lap_times,
        }
    }

    // Builds a model from a named law, failing with `InvalidCompound` if the
    // name is not one of the known compounds.
    pub fn from_law(law: &TyreLaw, max_laps: usize) -> Result<Self> {
        let compound: Compound = law.compound.parse()?;
        Ok(Self::new(compound, law.slope, law.intercept, max_laps))
    }

    pub fn compound(&self) -> Compound {
        self.compound
    }

    pub fn slope(&self) -> f64 {
        self.slope
    }

    pub fn intercept(&self) -> f64 {
        self.intercept
    }

    // Number of tyre ages the table covers.
    pub fn max_laps(&self) -> usize {
        self.lap_times.len()
    }

    // Lap time at `age`, or `None` once the tyre is past the table.
    pub fn lap_time(&self, age: u32) -> Option<f64> {
        self.lap_times.get(age as usize).copied()
    }

    pub fn lap_times(&self) -> &[f64] {
        &self.lap_times
    }

    // Lap times for a stint of `length` laps starting at tyre age `start_age`.
    pub fn stint(&self, start_age: usize, length: usize) -> Option<&[f64]> {
        let end = start_age.checked_add(length)?;
        self.lap_times.get(start_age..end)
    }

    // every lap time must be a finite, non-negative number of seconds
    pub fn check(&self) -> Result<()> {
        let reason = if !self.slope.is_finite() || !self.intercept.is_finite() {
            format!("slope {} and intercept {} must be finite", self.slope, self.intercept)
        } else if let Some((age, time)) = self
            .lap_times
            .iter()
            .enumerate()
            .find(|(_, t)| !t.is_finite() || **t < 0.0)
        {
            format!("lap time {time} at tyre age {age}")
        } else {
            return Ok(());
        };
        Err(StrategyError::InvalidLaw {
            compound: self.compound,
            reason,
        })
    }

    pub fn law(&self) -> TyreLaw {
        TyreLaw::new(self.compound.name(), self.slope, self.intercept)
    }
}

// straight-line OLS of lap time against tyre life
fn ols(compound: Compound, data: &[&LapSample]) -> Result<(f64, f64)> {
    let feats: Vec<f64> = data.iter().map(|s| s.tyre_life as f64).collect();
    let targets: Vec<f64> = data.iter().map(|s| s.lap_time_seconds).collect();

    let x = Array2::from_shape_vec((data.len(), 1), feats).map_err(|e| StrategyError::Fit {
        compound,
        reason: e.to_string(),
    })?;
    let y = Array1::from_vec(targets);
    let ds = Dataset::new(x, y);

    let fitted = LinearRegression::new()
        .fit(&ds)
        .map_err(|e| StrategyError::Fit {
            compound,
            reason: e.to_string(),
        })?;
    Ok((fitted.params()[0], fitted.intercept()))
}

// Fit once, drop laps whose residual sits more than OUTLIER_SIGMA standard
// deviations from the mean residual, then refit on what is left.
pub fn fit_law(compound: Compound, samples: &[LapSample]) -> Result<TyreLaw> {
    let data: Vec<_> = samples
        .iter()
        .filter(|s| s.compound == compound && s.lap_time_seconds.is_finite())
        .collect();
    if data.len() < MIN_FIT_SAMPLES {
        return Err(StrategyError::InsufficientData {
            compound,
            found: data.len(),
            needed: MIN_FIT_SAMPLES,
        });
    }

    let (slope, intercept) = ols(compound, &data)?;
    let residuals: Vec<f64> = data
        .iter()
        .map(|s| s.lap_time_seconds - (slope * s.tyre_life as f64 + intercept))
        .collect();
    let n = residuals.len() as f64;
    let mean = residuals.iter().sum::<f64>() / n;
    let std = (residuals.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n).sqrt();

    let kept: Vec<&LapSample> = if std > 0.0 {
        data.iter()
            .zip(&residuals)
            .filter(|(_, r)| (**r - mean).abs() < OUTLIER_SIGMA * std)
            .map(|(s, _)| *s)
            .collect()
    } else {
        data.clone()
    };

    let (slope, intercept) = if kept.len() >= MIN_FIT_SAMPLES && kept.len() < data.len() {
        debug!(%compound, dropped = data.len() - kept.len(), "removed outlier laps");
        ols(compound, &kept)?
    } else {
        (slope, intercept)
    };

    Ok(TyreLaw::new(compound.name(), slope.max(MIN_SLOPE), intercept))
}
