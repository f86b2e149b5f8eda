use crate::compound::Compound;
use crate::error::{Result, StrategyError};
use crate::model::{fit_law, TyreLaw};
use csv::ReaderBuilder;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, warn};

// renaming the columns we need from the raw lap export
#[derive(Debug, Deserialize)]
struct RawLapData {
    #[serde(rename = "Compound")]
    compound: String,
    #[serde(rename = "TyreLife")]
    tyre_life: f64,
    #[serde(rename = "LapTimeSeconds")]
    lap_time_seconds: f64,
    #[serde(rename = "PitOutTime", default)]
    pit_out_time: Option<String>,
    #[serde(rename = "PitInTime", default)]
    pit_in_time: Option<String>,
}

/// A clean racing lap: one observation of lap time at a given tyre life.
#[derive(Debug, Clone, PartialEq)]
pub struct LapSample {
    pub compound: Compound,
    pub tyre_life: u32,
    pub lap_time_seconds: f64,
}

/// Reads `Compound,Slope,Intercept` rows.
pub fn read_laws_csv<R: Read>(reader: R) -> Result<Vec<TyreLaw>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut laws = Vec::new();
    for res in reader.deserialize() {
        let law: TyreLaw = res?;
        laws.push(law);
    }
    Ok(laws)
}

pub fn load_laws_csv<P: AsRef<Path>>(path: P) -> Result<Vec<TyreLaw>> {
    read_laws_csv(File::open(path)?)
}

/// Reads the JSON array the tyre-model service answers with.
pub fn read_laws_json<R: Read>(reader: R) -> Result<Vec<TyreLaw>> {
    Ok(serde_json::from_reader(reader)?)
}

pub fn load_laws_json<P: AsRef<Path>>(path: P) -> Result<Vec<TyreLaw>> {
    read_laws_json(File::open(path)?)
}

/// Picks the JSON or CSV reader from the file extension; anything that is
/// not `.json` is read as CSV.
pub fn load_laws<P: AsRef<Path>>(path: P) -> Result<Vec<TyreLaw>> {
    let path = path.as_ref();
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        load_laws_json(path)
    } else {
        load_laws_csv(path)
    }
}

/// Reads a raw lap export, keeping only clean laps on a known dry compound.
pub fn read_lap_samples<R: Read>(reader: R) -> Result<Vec<LapSample>> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut samples = Vec::new();
    let mut skipped = 0usize;

    for res in reader.deserialize() {
        let raw: RawLapData = res?;
        let is_pit_lap = raw.pit_out_time.is_some() || raw.pit_in_time.is_some();
        let compound = raw.compound.parse::<Compound>().ok();

        match compound {
            Some(compound)
                if raw.lap_time_seconds > 0.0
                    && raw.lap_time_seconds < 300.0
                    && raw.tyre_life >= 0.0
                    && !is_pit_lap =>
            {
                samples.push(LapSample {
                    compound,
                    tyre_life: raw.tyre_life.round() as u32,
                    lap_time_seconds: raw.lap_time_seconds,
                });
            }
            _ => skipped += 1,
        }
    }

    debug!(kept = samples.len(), skipped, "read lap samples");
    Ok(samples)
}

pub fn load_lap_samples<P: AsRef<Path>>(path: P) -> Result<Vec<LapSample>> {
    read_lap_samples(File::open(path)?)
}

pub fn group_by_compound(samples: &[LapSample]) -> BTreeMap<Compound, Vec<LapSample>> {
    let mut grouped: BTreeMap<Compound, Vec<LapSample>> = BTreeMap::new();
    for sample in samples {
        grouped.entry(sample.compound).or_default().push(sample.clone());
    }
    grouped
}

/// Fits a law for every compound that has enough clean laps. Compounds
/// without enough data are left out of the fleet.
pub fn fit_laws(samples: &[LapSample]) -> Result<Vec<TyreLaw>> {
    let mut laws = Vec::new();
    for (compound, laps) in group_by_compound(samples) {
        match fit_law(compound, &laps) {
            Ok(law) => {
                debug!(%compound, slope = law.slope, intercept = law.intercept, "fitted tyre law");
                laws.push(law);
            }
            Err(StrategyError::InsufficientData { found, needed, .. }) => {
                warn!(%compound, found, needed, "not enough laps to fit compound, skipping");
            }
            Err(e) => return Err(e),
        }
    }
    Ok(laws)
}
