use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Carries the rendered help text.
    DisplayHelp(String),
    /// Carries the rendered version line.
    DisplayVersion(String),
    Clap(clap::Error),
    InvalidValue(&'static str, String),
    ConflictingFlags(&'static [&'static str]),
    MissingRequires(&'static str, &'static str),
    MissingDataset,
}

impl From<clap::Error> for Error {
    fn from(e: clap::Error) -> Self {
        match e.kind {
            clap::ErrorKind::HelpDisplayed => Self::DisplayHelp(e.message),
            clap::ErrorKind::VersionDisplayed => Self::DisplayVersion(e.message),
            _ => Self::Clap(e),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DisplayHelp(_) => f.write_str("Signals to display help"),
            Self::DisplayVersion(_) => f.write_str("Signals to display version"),
            Self::Clap(err) => write!(f, "{}", err.message),
            Self::InvalidValue(flag, value) => {
                write!(f, "Invalid value for '{}': {}", flag, value)
            }
            Self::ConflictingFlags(flags) => {
                write!(f, "Multiple of conflicting flags: {:?}", flags)
            }
            Self::MissingRequires(flag, requires) => {
                write!(f, "Flag '{}' missing requires '{}'", flag, requires)
            }
            Self::MissingDataset => {
                f.write_str("Either '--suite' or '--input' with '--source' is required")
            }
        }
    }
}

impl std::error::Error for Error {}
