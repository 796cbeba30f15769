//! What to run: the external program, the graphs to run it on, and the grid of thread counts and
//! OpenMP schedules to sweep.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use itertools::iproduct;

use crate::error::{Error, Result};

/// Name of the environment variable the OpenMP runtime reads `schedule(runtime)` loops from.
pub const SCHEDULE_ENV_VAR: &str = "OMP_SCHEDULE";

pub const DEFAULT_THREADS: [usize; 4] = [1, 2, 4, 8];
pub const DEFAULT_REPETITIONS: usize = 5;
pub const DEFAULT_CLAUSES: [ScheduleKind; 2] = [ScheduleKind::Static, ScheduleKind::Dynamic];
pub const DEFAULT_CHUNK_SIZES: [u32; 5] = [1, 8, 32, 128, 512];

/// The scheduling clause of an `OMP_SCHEDULE` value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScheduleKind {
    Static,
    Dynamic,
    Guided,
    Auto,
}
impl ScheduleKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ScheduleKind::Static => "static",
            ScheduleKind::Dynamic => "dynamic",
            ScheduleKind::Guided => "guided",
            ScheduleKind::Auto => "auto",
        }
    }
}
impl fmt::Display for ScheduleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
impl FromStr for ScheduleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<ScheduleKind> {
        match s.trim().to_ascii_lowercase().as_str() {
            "static" => Ok(ScheduleKind::Static),
            "dynamic" => Ok(ScheduleKind::Dynamic),
            "guided" => Ok(ScheduleKind::Guided),
            "auto" => Ok(ScheduleKind::Auto),
            other => Err(Error::ConfigError(format!(
                "unknown schedule kind '{}' (expected static, dynamic, guided or auto)",
                other
            ))),
        }
    }
}

/// One `OMP_SCHEDULE` setting, e.g. `dynamic,32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub kind: ScheduleKind,
    pub chunk_size: Option<u32>,
}
impl Schedule {
    pub fn new(kind: ScheduleKind, chunk_size: Option<u32>) -> Schedule {
        Schedule { kind, chunk_size }
    }

    /// The cartesian product of `kinds` and `chunk_sizes`, kind-major. `auto` takes no chunk
    /// size and appears once.
    pub fn grid(kinds: &[ScheduleKind], chunk_sizes: &[u32]) -> Vec<Schedule> {
        let mut grid = Vec::with_capacity(kinds.len() * chunk_sizes.len());
        for (&kind, &chunk) in iproduct!(kinds.iter(), chunk_sizes.iter()) {
            let schedule = match kind {
                ScheduleKind::Auto => Schedule::new(kind, None),
                _ => Schedule::new(kind, Some(chunk)),
            };
            if !grid.contains(&schedule) {
                grid.push(schedule);
            }
        }
        grid
    }

    /// The value handed to the external program through `OMP_SCHEDULE`.
    pub fn env_value(&self) -> String {
        self.to_string()
    }

    /// Human readable form used in progress messages, e.g. `static, 8`.
    pub fn label(&self) -> String {
        match self.chunk_size {
            Some(chunk) => format!("{}, {}", self.kind, chunk),
            None => self.kind.to_string(),
        }
    }
}
impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.chunk_size {
            Some(chunk) => write!(f, "{},{}", self.kind, chunk),
            None => write!(f, "{}", self.kind),
        }
    }
}
impl FromStr for Schedule {
    type Err = Error;

    fn from_str(s: &str) -> Result<Schedule> {
        let mut parts = s.splitn(2, ',');
        let kind: ScheduleKind = parts.next().unwrap_or("").parse()?;
        let chunk_size = match parts.next() {
            None => None,
            Some(chunk) => {
                let chunk: u32 = chunk.trim().parse().map_err(|_| {
                    Error::ConfigError(format!("invalid chunk size '{}' in '{}'", chunk, s))
                })?;
                if chunk == 0 {
                    return Err(Error::ConfigError(format!(
                        "chunk size must be positive in '{}'",
                        s
                    )));
                }
                if kind == ScheduleKind::Auto {
                    return Err(Error::ConfigError(format!(
                        "the auto schedule takes no chunk size in '{}'",
                        s
                    )));
                }
                Some(chunk)
            }
        };
        Ok(Schedule { kind, chunk_size })
    }
}

/// A graph input and the vertex the shortest paths start from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    pub title: String,
    pub input: PathBuf,
    pub source: String,
}
impl Dataset {
    /// Creates a dataset, titled after the input file stem when no title is given.
    pub fn new<P: Into<PathBuf>>(input: P, source: &str, title: Option<&str>) -> Dataset {
        let input = input.into();
        let title = match title {
            Some(title) => title.to_owned(),
            None => input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string()),
        };
        Dataset {
            title,
            input,
            source: source.to_owned(),
        }
    }
}

/// The on-disk form of a batch of datasets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub datasets: Vec<Dataset>,
}
impl Suite {
    pub fn load(path: &Path) -> Result<Suite> {
        crate::fs::load(path)
    }
}

/// Which result files are written next to the charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Outputs {
    pub plots: bool,
    pub csv: bool,
    pub json: bool,
}
impl Default for Outputs {
    fn default() -> Outputs {
        Outputs {
            plots: true,
            csv: false,
            json: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    pub program: PathBuf,
    pub datasets: Vec<Dataset>,
    pub threads: Vec<usize>,
    pub repetitions: usize,
    /// An empty list leaves `OMP_SCHEDULE` untouched and runs every thread count once.
    pub schedules: Vec<Schedule>,
    pub output_directory: PathBuf,
    pub outputs: Outputs,
}
impl SweepConfig {
    pub fn new<P: Into<PathBuf>>(program: P) -> SweepConfig {
        SweepConfig {
            program: program.into(),
            datasets: vec![],
            threads: DEFAULT_THREADS.to_vec(),
            repetitions: DEFAULT_REPETITIONS,
            schedules: Schedule::grid(&DEFAULT_CLAUSES, &DEFAULT_CHUNK_SIZES),
            output_directory: PathBuf::from("."),
            outputs: Outputs::default(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.datasets.is_empty() {
            return Err(Error::ConfigError("no datasets to run".to_owned()));
        }
        if self.threads.is_empty() {
            return Err(Error::ConfigError("no thread counts to run".to_owned()));
        }
        if self.threads.contains(&0) {
            return Err(Error::ConfigError(
                "thread counts must be positive".to_owned(),
            ));
        }
        if self.repetitions == 0 {
            return Err(Error::ConfigError(
                "repetitions must be positive".to_owned(),
            ));
        }
        Ok(())
    }

    /// The schedules to sweep, with `None` standing for "leave `OMP_SCHEDULE` alone".
    pub fn schedule_slots(&self) -> Vec<Option<Schedule>> {
        if self.schedules.is_empty() {
            vec![None]
        } else {
            self.schedules.iter().cloned().map(Some).collect()
        }
    }
}
