// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use clap::Parser;

use vehicle_proximity::cli::args::{Cli, Commands};
use vehicle_proximity::cli::logging::set_verbose;
use vehicle_proximity::cli::replay::run_replay;
use vehicle_proximity::cli::show_config::run_show_config;

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Replay(args) => {
            set_verbose(args.verbose);
            run_replay(&args);
        }
        Commands::Config(args) => run_show_config(&args),
    }
}
