use std::process;

use bfplot::cli::{self, Args};
use bfplot::{CliReport, ProcessRunner, Sweep};

fn init_logging(args: &Args) {
    let default_level = if args.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();
}

fn main() {
    let args = cli::parse_args();
    init_logging(&args);
    log::debug!("{:?}", args);

    let report = CliReport::new(args.color.enabled(), args.verbosity());
    let config = match args.into_config() {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    let mut sweep = Sweep::new(config).with_report(Box::new(report));
    if let Err(err) = sweep.run(&mut ProcessRunner) {
        eprintln!("{}", err);
        process::exit(1);
    }
}
