//! Pulls numbers out of the text the external program prints.

use regex::Regex;

use crate::error::{Error, Result};

lazy_static! {
    static ref RUNTIME: Regex =
        Regex::new(r"elapsed process CPU time = (.*) nanoseconds").unwrap();
    static ref THREADS: Regex = Regex::new(r"OpenMP: running .* with ([0-9]+) threads").unwrap();
}

/// Returns the elapsed time in nanoseconds reported by one run.
pub fn runtime_ns(output: &str) -> Result<f64> {
    let caps = RUNTIME.captures(output).ok_or_else(|| Error::MissingRuntime {
        output: output.to_owned(),
    })?;
    let value = caps[1].trim();
    match value.parse::<f64>() {
        Ok(ns) if ns.is_finite() => Ok(ns),
        _ => Err(Error::InvalidRuntime {
            value: value.to_owned(),
        }),
    }
}

/// Returns the number of threads the OpenMP runtime actually started, if the program said so.
pub fn reported_threads(output: &str) -> Option<usize> {
    THREADS
        .captures(output)
        .and_then(|caps| caps[1].parse().ok())
}
