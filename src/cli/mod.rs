mod error;
mod types;

pub use error::Error;
pub use types::Color;

use std::{env, ffi::OsString, path::PathBuf, str::FromStr};

use clap::{App, Arg};

use crate::config::{
    Dataset, Outputs, Schedule, ScheduleKind, Suite, SweepConfig, DEFAULT_CHUNK_SIZES,
    DEFAULT_CLAUSES, DEFAULT_REPETITIONS, DEFAULT_THREADS,
};
use crate::report::CliVerbosity;

const DEFAULT_PROGRAM: &str = "./bellman-ford";

#[derive(Debug, PartialEq)]
pub struct Args {
    pub program: PathBuf,
    pub input: Option<PathBuf>,
    pub source: Option<String>,
    pub title: Option<String>,
    pub suite: Option<PathBuf>,
    pub threads: Vec<usize>,
    pub repetitions: usize,
    pub schedules: Vec<Schedule>,
    pub clauses: Vec<ScheduleKind>,
    pub chunk_sizes: Vec<u32>,
    pub no_schedule: bool,
    pub output_directory: PathBuf,
    pub no_plot: bool,
    pub csv: bool,
    pub json: bool,
    pub color: Color,
    pub verbose: bool,
    pub quiet: bool,
}

impl Default for Args {
    fn default() -> Args {
        Args {
            program: PathBuf::from(DEFAULT_PROGRAM),
            input: None,
            source: None,
            title: None,
            suite: None,
            threads: DEFAULT_THREADS.to_vec(),
            repetitions: DEFAULT_REPETITIONS,
            schedules: vec![],
            clauses: DEFAULT_CLAUSES.to_vec(),
            chunk_sizes: DEFAULT_CHUNK_SIZES.to_vec(),
            no_schedule: false,
            output_directory: PathBuf::from("."),
            no_plot: false,
            csv: false,
            json: false,
            color: Color::default(),
            verbose: false,
            quiet: false,
        }
    }
}

impl Args {
    pub fn verbosity(&self) -> CliVerbosity {
        if self.quiet {
            CliVerbosity::Quiet
        } else if self.verbose {
            CliVerbosity::Verbose
        } else {
            CliVerbosity::Normal
        }
    }

    /// The schedules to sweep: the explicit list if one was given, otherwise the grid.
    pub fn resolved_schedules(&self) -> Vec<Schedule> {
        if self.no_schedule {
            vec![]
        } else if !self.schedules.is_empty() {
            self.schedules.clone()
        } else {
            Schedule::grid(&self.clauses, &self.chunk_sizes)
        }
    }

    /// Builds the sweep configuration, reading the suite file if one was given.
    pub fn into_config(self) -> crate::Result<SweepConfig> {
        let datasets = match (&self.suite, &self.input, &self.source) {
            (Some(suite), _, _) => Suite::load(suite)?.datasets,
            (None, Some(input), Some(source)) => {
                vec![Dataset::new(input.clone(), source, self.title.as_deref())]
            }
            _ => vec![],
        };

        let config = SweepConfig {
            schedules: self.resolved_schedules(),
            program: self.program,
            datasets,
            threads: self.threads,
            repetitions: self.repetitions,
            output_directory: self.output_directory,
            outputs: Outputs {
                plots: !self.no_plot,
                csv: self.csv,
                json: self.json,
            },
        };
        config.validate()?;
        Ok(config)
    }
}

fn app() -> App<'static, 'static> {
    App::new("bfplot")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Measures an OpenMP shortest-path binary across thread counts and schedules, then plots runtime and speedup.")
        .arg(Arg::with_name("program")
            .short("P")
            .long("program")
            .takes_value(true)
            .value_name("PATH")
            .help("The program to benchmark. It is run as `<PATH> -f <input> -s <source> [-p <threads>]`. [default: ./bellman-ford]"))
        .arg(Arg::with_name("input")
            .short("f")
            .long("input")
            .takes_value(true)
            .value_name("FILE")
            .help("Graph file passed to the program."))
        .arg(Arg::with_name("source")
            .short("s")
            .long("source")
            .takes_value(true)
            .value_name("ID")
            .help("Source vertex passed to the program."))
        .arg(Arg::with_name("title")
            .long("title")
            .takes_value(true)
            .help("Chart title and file name prefix. Defaults to the input file stem."))
        .arg(Arg::with_name("suite")
            .long("suite")
            .takes_value(true)
            .value_name("JSON")
            .help("Runs every dataset listed in a JSON file of the form {\"datasets\": [{\"title\", \"input\", \"source\"}]}."))
        .arg(Arg::with_name("threads")
            .short("t")
            .long("threads")
            .takes_value(true)
            .use_delimiter(false)
            .value_name("N,...")
            .help("Comma separated thread counts. [default: 1,2,4,8]"))
        .arg(Arg::with_name("repetitions")
            .short("r")
            .long("repetitions")
            .takes_value(true)
            .value_name("N")
            .help("Runs per data point; the mean is plotted. [default: 5]"))
        .arg(Arg::with_name("schedule")
            .long("schedule")
            .takes_value(true)
            .multiple(true)
            .number_of_values(1)
            .use_delimiter(false)
            .value_name("KIND[,CHUNK]")
            .help("An OMP_SCHEDULE value to sweep. Can be given several times; replaces the clause/chunk grid."))
        .arg(Arg::with_name("clauses")
            .long("clauses")
            .takes_value(true)
            .use_delimiter(false)
            .value_name("KIND,...")
            .help("Schedule kinds of the grid. [default: static,dynamic]"))
        .arg(Arg::with_name("chunk-sizes")
            .long("chunk-sizes")
            .takes_value(true)
            .use_delimiter(false)
            .value_name("N,...")
            .help("Chunk sizes of the grid. [default: 1,8,32,128,512]"))
        .arg(Arg::with_name("no-schedule")
            .long("no-schedule")
            .help("Leaves OMP_SCHEDULE untouched and runs each thread count once."))
        .arg(Arg::with_name("output-dir")
            .short("o")
            .long("output-dir")
            .takes_value(true)
            .value_name("DIR")
            .help("Directory the charts and data files are written to. [default: .]"))
        .arg(Arg::with_name("no-plot")
            .short("n")
            .long("no-plot")
            .help("Disables chart generation."))
        .arg(Arg::with_name("csv")
            .long("csv")
            .help("Writes every run to <title>_runs.csv."))
        .arg(Arg::with_name("json")
            .long("json")
            .help("Writes the aggregated results to <title>_summary.json."))
        .arg(Arg::with_name("color")
            .short("c")
            .long("color")
            .alias("colour")
            .takes_value(true)
            .possible_values(&["auto", "always", "never"])
            .help("Configure coloring of output. always = always colorize output, never = never colorize output, auto = colorize output if output is a tty."))
        .arg(Arg::with_name("verbose")
            .short("v")
            .long("verbose")
            .help("Print the mean runtime and speedup of every data point."))
        .arg(Arg::with_name("quiet")
            .short("q")
            .long("quiet")
            .help("Print nothing but errors."))
}

fn parse_list<T: FromStr>(flag: &'static str, value: &str) -> Result<Vec<T>, Error> {
    let list = value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<T>()
                .map_err(|_| Error::InvalidValue(flag, s.to_owned()))
        })
        .collect::<Result<Vec<T>, Error>>()?;
    if list.is_empty() {
        return Err(Error::InvalidValue(flag, format!("{:?} (empty list)", value)));
    }
    Ok(list)
}

fn parse_one<T: FromStr>(flag: &'static str, value: &str) -> Result<T, Error> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::InvalidValue(flag, value.to_owned()))
}

fn parse_schedule(value: &str) -> Result<Schedule, Error> {
    value.parse().map_err(|e| match e {
        crate::Error::ConfigError(message) => Error::InvalidValue("--schedule", message),
        other => Error::InvalidValue("--schedule", other.to_string()),
    })
}

pub fn parse_args() -> Args {
    let args = env::args_os().collect();
    match try_parse_args(args) {
        Ok(args) => args,
        Err(Error::DisplayHelp(help)) => {
            println!("{}", help);
            std::process::exit(0);
        }
        Err(Error::DisplayVersion(version)) => {
            if !version.is_empty() {
                println!("{}", version);
            }
            std::process::exit(0);
        }
        Err(e) => {
            eprintln!("Error parsing CLI args: {}", e);
            std::process::exit(1);
        }
    }
}

fn try_parse_args(args: Vec<OsString>) -> Result<Args, Error> {
    let matches = app().get_matches_from_safe(args)?;
    let defaults = Args::default();

    let program = matches
        .value_of_os("program")
        .map(PathBuf::from)
        .unwrap_or(defaults.program);
    let input = matches.value_of_os("input").map(PathBuf::from);
    let source = matches.value_of("source").map(String::from);
    let title = matches.value_of("title").map(String::from);
    let suite = matches.value_of_os("suite").map(PathBuf::from);
    let threads = match matches.value_of("threads") {
        Some(v) => parse_list("--threads", v)?,
        None => defaults.threads,
    };
    let repetitions = match matches.value_of("repetitions") {
        Some(v) => parse_one("--repetitions", v)?,
        None => defaults.repetitions,
    };
    let schedules = match matches.values_of("schedule") {
        Some(values) => values
            .map(parse_schedule)
            .collect::<Result<Vec<Schedule>, Error>>()?,
        None => defaults.schedules,
    };
    let clauses = match matches.value_of("clauses") {
        Some(v) => parse_list("--clauses", v)?,
        None => defaults.clauses,
    };
    let chunk_sizes = match matches.value_of("chunk-sizes") {
        Some(v) => parse_list("--chunk-sizes", v)?,
        None => defaults.chunk_sizes,
    };
    let output_directory = matches
        .value_of_os("output-dir")
        .map(PathBuf::from)
        .unwrap_or(defaults.output_directory);
    let color = match matches.value_of("color") {
        Some(v) => v
            .parse::<Color>()
            .map_err(|e| Error::InvalidValue("--color", e.to_string()))?,
        None => defaults.color,
    };

    let no_schedule = matches.is_present("no-schedule");
    let no_plot = matches.is_present("no-plot");
    let csv = matches.is_present("csv");
    let json = matches.is_present("json");
    let verbose = matches.is_present("verbose");
    let quiet = matches.is_present("quiet");

    if chunk_sizes.contains(&0) {
        return Err(Error::InvalidValue("--chunk-sizes", "0".to_owned()));
    }

    // Error if flags are missing their requires
    if suite.is_none() && input.is_none() {
        return Err(Error::MissingDataset);
    } else if input.is_some() && source.is_none() {
        return Err(Error::MissingRequires("--input", "--source"));
    } else if source.is_some() && input.is_none() {
        return Err(Error::MissingRequires("--source", "--input"));
    } else if title.is_some() && input.is_none() {
        return Err(Error::MissingRequires("--title", "--input"));
    }

    // Error if there are conflicting args
    if verbose && quiet {
        return Err(Error::ConflictingFlags(&["--verbose", "--quiet"]));
    } else if suite.is_some() && input.is_some() {
        return Err(Error::ConflictingFlags(&["--suite", "--input"]));
    } else if no_schedule
        && (!schedules.is_empty()
            || matches.is_present("clauses")
            || matches.is_present("chunk-sizes"))
    {
        return Err(Error::ConflictingFlags(&[
            "--no-schedule",
            "--schedule",
            "--clauses",
            "--chunk-sizes",
        ]));
    } else if !schedules.is_empty()
        && (matches.is_present("clauses") || matches.is_present("chunk-sizes"))
    {
        return Err(Error::ConflictingFlags(&[
            "--schedule",
            "--clauses",
            "--chunk-sizes",
        ]));
    }

    Ok(Args {
        program,
        input,
        source,
        title,
        suite,
        threads,
        repetitions,
        schedules,
        clauses,
        chunk_sizes,
        no_schedule,
        output_directory,
        no_plot,
        csv,
        json,
        color,
        verbose,
        quiet,
    })
}
