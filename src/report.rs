use std::cell::RefCell;
use std::cmp;
use std::io::{stdout, Write};
use std::path::Path;

use anes::{Attribute, Color, ResetAttributes, SetAttribute, SetForegroundColor};

use crate::config::{Dataset, Schedule};
use crate::format;
use crate::sweep::{Measurement, ThreadPoint};

const MAX_FILE_NAME_LEN: usize = 128;

fn truncate_to_character_boundary(s: &mut String, max_len: usize) {
    let mut boundary = cmp::min(max_len, s.len());
    while !s.is_char_boundary(boundary) {
        boundary -= 1;
    }
    s.truncate(boundary);
}

/// Replaces characters that are not allowed in file names on common platforms.
pub fn make_filename_safe(string: &str) -> String {
    let mut string = string.replace(
        &['?', '"', '/', '\\', '*', '<', '>', ':', '|', '^'][..],
        "_",
    );

    truncate_to_character_boundary(&mut string, MAX_FILE_NAME_LEN);

    if cfg!(target_os = "windows") {
        string = string.trim_end().to_owned();
    }

    string
}

/// Progress notifications emitted while a sweep runs.
pub trait Report {
    fn dataset_start(&self, _program: &Path, _dataset: &Dataset, _threads: &[usize]) {}
    fn serial_start(&self, _program: &Path, _dataset: &Dataset) {}
    fn serial_complete(&self, _dataset: &Dataset, _serial: &Measurement) {}
    fn point_start(
        &self,
        _program: &Path,
        _dataset: &Dataset,
        _threads: usize,
        _schedule: Option<&Schedule>,
    ) {
    }
    fn point_complete(&self, _dataset: &Dataset, _point: &ThreadPoint) {}
    fn run_failed(&self) {}
    fn saving_start(&self, _path: &Path) {}
    fn saving_complete(&self, _path: &Path) {}
}

/// Reports nothing.
pub struct NoReport;
impl Report for NoReport {}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CliVerbosity {
    Quiet,
    Normal,
    Verbose,
}

pub struct CliReport {
    pub enable_text_coloring: bool,
    pub verbosity: CliVerbosity,
    out: RefCell<Box<dyn Write>>,
}
impl CliReport {
    pub fn new(enable_text_coloring: bool, verbosity: CliVerbosity) -> CliReport {
        CliReport {
            enable_text_coloring,
            verbosity,
            out: RefCell::new(Box::new(stdout())),
        }
    }

    /// Sends progress lines to `out` instead of stdout.
    pub fn with_output(mut self, out: Box<dyn Write>) -> CliReport {
        self.out = RefCell::new(out);
        self
    }

    // Passing a String is the common case here.
    #[allow(clippy::needless_pass_by_value)]
    fn print_unfinished(&self, s: String) {
        if self.verbosity == CliVerbosity::Quiet {
            return;
        }
        let mut out = self.out.borrow_mut();
        write!(out, "{}", s).ok();
        out.flush().ok();
    }

    fn print_line(&self, s: &str) {
        if self.verbosity != CliVerbosity::Quiet {
            writeln!(self.out.borrow_mut(), "{}", s).ok();
        }
    }

    fn with_color(&self, color: Color, s: &str) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetForegroundColor(color), s, ResetAttributes)
        } else {
            String::from(s)
        }
    }

    fn green(&self, s: &str) -> String {
        self.with_color(Color::DarkGreen, s)
    }

    fn red(&self, s: &str) -> String {
        self.with_color(Color::DarkRed, s)
    }

    fn faint(&self, s: String) -> String {
        if self.enable_text_coloring {
            format!("{}{}{}", SetAttribute(Attribute::Faint), s, ResetAttributes)
        } else {
            s
        }
    }

    fn done(&self) {
        self.print_line(&self.green("done"));
    }

    fn details(&self, runtime: &Measurement, speedup: Option<f64>) {
        if self.verbosity != CliVerbosity::Verbose {
            return;
        }
        let mut line = format!(
            "    runtime: {} ± {} over {} runs",
            format::time(runtime.mean),
            format::time(runtime.std_dev).trim_start(),
            runtime.runs.len()
        );
        if let Some(speedup) = speedup {
            line.push_str(&format!(", speedup: {}", format::speedup(speedup)));
        }
        self.print_line(&self.faint(line));
    }
}
impl Report for CliReport {
    fn dataset_start(&self, program: &Path, dataset: &Dataset, threads: &[usize]) {
        let threads = threads
            .iter()
            .map(|n| n.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.print_line(&format!(
            "Plotting runtimes and speedups of {} on {} with {} threads...",
            program.display(),
            dataset.title,
            threads
        ));
    }

    fn serial_start(&self, program: &Path, dataset: &Dataset) {
        self.print_unfinished(format!(
            "Running {} on {} in serial...",
            program.display(),
            dataset.input.display()
        ));
    }

    fn serial_complete(&self, _: &Dataset, serial: &Measurement) {
        self.done();
        self.details(serial, None);
    }

    fn point_start(
        &self,
        program: &Path,
        dataset: &Dataset,
        threads: usize,
        schedule: Option<&Schedule>,
    ) {
        let schedule = match schedule {
            Some(schedule) => format!(" ({})", schedule.label()),
            None => String::new(),
        };
        self.print_unfinished(format!(
            "Running {} on {} with {} thread(s){}...",
            program.display(),
            dataset.input.display(),
            threads,
            schedule
        ));
    }

    fn point_complete(&self, _: &Dataset, point: &ThreadPoint) {
        self.done();
        self.details(&point.runtime, Some(point.speedup));
    }

    fn run_failed(&self) {
        self.print_line(&self.red("failed"));
    }

    fn saving_start(&self, _: &Path) {
        self.print_unfinished("Saving plot figure...".to_owned());
    }

    fn saving_complete(&self, path: &Path) {
        self.done();
        if self.verbosity == CliVerbosity::Verbose {
            self.print_line(&self.faint(format!("    wrote {}", path.display())));
        }
    }
}
