//! Runtime and speedup sweeps for external OpenMP shortest-path programs.
//!
//! `bfplot` launches a Bellman-Ford binary (any program accepting
//! `-f <graph> -s <source> [-p <threads>]` and printing
//! `elapsed process CPU time = <n> nanoseconds`) once in serial and then
//! with every requested thread count and `OMP_SCHEDULE` setting. Each data
//! point is run several times and averaged; the results are drawn as a
//! runtime chart (with the serial runtime as a reference line) and a speedup
//! chart per schedule.
//!
//! ```no_run
//! use bfplot::{Dataset, ProcessRunner, Sweep, SweepConfig};
//!
//! let mut config = SweepConfig::new("./bellman-ford");
//! config.datasets.push(Dataset::new("/tmp/rmat15.dimacs", "1", None));
//! let results = Sweep::new(config).run(&mut ProcessRunner).unwrap();
//! println!("serial mean: {} ns", results[0].serial.mean);
//! ```

#![allow(clippy::new_without_default)]

#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate log;
#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros_private;

pub mod cli;
mod config;
mod csv_report;
mod error;
mod extract;
mod format;
mod fs;
mod plot;
mod program;
mod report;
mod stats;
mod sweep;

use std::path::PathBuf;

pub use crate::config::{
    Dataset, Outputs, Schedule, ScheduleKind, Suite, SweepConfig, SCHEDULE_ENV_VAR,
};
pub use crate::error::{Error, Result};
pub use crate::extract::{reported_threads, runtime_ns};
pub use crate::plot::{figure_file_name, Figure, PlotContext, PlotData, Plotter, PlottersBackend};
pub use crate::program::{Invocation, ProcessRunner, Runner};
pub use crate::report::{make_filename_safe, CliReport, CliVerbosity, NoReport, Report};
pub use crate::stats::{speedup, Sample};
pub use crate::sweep::{DatasetResult, Measurement, ScheduleResult, ThreadPoint};

use crate::csv_report::FileCsvReport;

/// The sweep driver: measures every dataset of a [`SweepConfig`] and writes its charts and data
/// files.
pub struct Sweep {
    config: SweepConfig,
    report: Box<dyn Report>,
    plotter: Box<dyn Plotter>,
}

impl Sweep {
    /// Creates a sweep that reports nothing and draws with [`PlottersBackend`].
    pub fn new(config: SweepConfig) -> Sweep {
        Sweep {
            config,
            report: Box::new(NoReport),
            plotter: Box::new(PlottersBackend),
        }
    }

    /// Changes where progress is reported to.
    pub fn with_report(mut self, report: Box<dyn Report>) -> Sweep {
        self.report = report;
        self
    }

    /// Changes how charts are drawn.
    pub fn with_plotter(mut self, plotter: Box<dyn Plotter>) -> Sweep {
        self.plotter = plotter;
        self
    }

    /// The configuration this sweep runs.
    pub fn config(&self) -> &SweepConfig {
        &self.config
    }

    /// Runs every dataset in order and returns their results.
    ///
    /// Measurement and chart errors abort the sweep; failing to write the CSV or JSON files is
    /// only logged.
    pub fn run(&mut self, runner: &mut dyn Runner) -> Result<Vec<DatasetResult>> {
        self.config.validate()?;

        let outputs = self.config.outputs;
        if outputs.plots || outputs.csv || outputs.json {
            fs::mkdirp(&self.config.output_directory)?;
        }

        let mut results = Vec::with_capacity(self.config.datasets.len());
        for dataset in &self.config.datasets {
            info!("measuring {} ({})", dataset.title, dataset.input.display());
            let result = sweep::measure_dataset(&self.config, dataset, runner, &*self.report)?;

            if outputs.plots {
                plot::render_dataset(
                    &mut *self.plotter,
                    &*self.report,
                    &self.config.output_directory,
                    &result,
                )?;
            }
            if outputs.csv {
                let path = self.data_path(&result.dataset, "runs.csv");
                log_if_err!(FileCsvReport.write_file(&path, &result));
            }
            if outputs.json {
                let path = self.data_path(&result.dataset, "summary.json");
                log_if_err!(fs::save(&result, &path));
            }

            results.push(result);
        }
        Ok(results)
    }

    fn data_path(&self, dataset: &Dataset, suffix: &str) -> PathBuf {
        self.config
            .output_directory
            .join(format!("{}_{}", make_filename_safe(&dataset.title), suffix))
    }
}
