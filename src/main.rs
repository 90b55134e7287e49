use clap::Parser;
use log::info;
use snafu::ErrorCompat;

mod args;
mod tally;

use crate::args::Args;

fn main() {
    let args = Args::parse();
    let mut logs = env_logger::Builder::from_default_env();
    if args.verbose {
        logs.filter_level(log::LevelFilter::Debug);
    }
    logs.init();
    info!("args: {:?}", args);

    if let Err(e) = tally::run_election(args.config, args.reference, args.out) {
        eprintln!("An error occured {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
