use std::error::Error as StdError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;

use csv::Error as CsvError;
use serde_json::Error as SerdeError;

#[allow(clippy::enum_variant_names)]
#[derive(Debug)]
pub enum Error {
    /// The external program could not be started at all.
    SpawnError { program: PathBuf, inner: io::Error },
    /// The external program ran but reported failure.
    ExitStatus {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
    /// The output of a run did not contain the timing line.
    MissingRuntime { output: String },
    /// The timing line was present but its value was not a number.
    InvalidRuntime { value: String },
    /// A parallel configuration averaged to no measurable time, so no speedup exists.
    ZeroRuntime { command: String },
    AccessError { path: PathBuf, inner: io::Error },
    SerdeError { path: PathBuf, inner: SerdeError },
    CsvError(CsvError),
    PlotError { path: PathBuf, message: String },
    ConfigError(String),
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SpawnError { program, inner } => {
                write!(f, "Failed to run program {:?}: {}", program, inner)
            }
            Error::ExitStatus {
                command,
                status,
                stderr,
            } => {
                write!(f, "`{}` exited with {}", command, status)?;
                if !stderr.trim().is_empty() {
                    write!(f, "\nstderr:\n{}", stderr.trim_end())?;
                }
                Ok(())
            }
            Error::MissingRuntime { output } => write!(
                f,
                "Could not find the elapsed time in the program output:\n{}",
                output.trim_end()
            ),
            Error::InvalidRuntime { value } => {
                write!(f, "Elapsed time {:?} is not a number", value)
            }
            Error::ZeroRuntime { command } => write!(
                f,
                "`{}` reported an elapsed time of 0 nanoseconds; cannot compute a speedup",
                command
            ),
            Error::AccessError { path, inner } => {
                write!(f, "Failed to access file {:?}: {}", path, inner)
            }
            Error::SerdeError { path, inner } => write!(
                f,
                "Failed to read or write file {:?} due to serialization error: {}",
                path, inner
            ),
            Error::CsvError(inner) => write!(f, "CSV error: {}", inner),
            Error::PlotError { path, message } => {
                write!(f, "Failed to draw plot {:?}: {}", path, message)
            }
            Error::ConfigError(message) => write!(f, "Invalid configuration: {}", message),
        }
    }
}
impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::SpawnError { inner, .. } => Some(inner),
            Error::AccessError { inner, .. } => Some(inner),
            Error::SerdeError { inner, .. } => Some(inner),
            Error::CsvError(inner) => Some(inner),
            Error::ExitStatus { .. }
            | Error::MissingRuntime { .. }
            | Error::InvalidRuntime { .. }
            | Error::ZeroRuntime { .. }
            | Error::PlotError { .. }
            | Error::ConfigError(_) => None,
        }
    }
}

impl From<CsvError> for Error {
    fn from(other: CsvError) -> Error {
        Error::CsvError(other)
    }
}

pub type Result<T> = ::std::result::Result<T, Error>;

pub(crate) fn log_error(e: &Error) {
    error!("error: {}", e);
}
