// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::process;

use crate::cli::args::TuningArgs;
use crate::{error, info};

/// Print the effective configuration as JSON.
pub fn run_show_config(args: &TuningArgs) {
    let json = args.resolve().and_then(|config| config.to_json());
    match json {
        Ok(json) => {
            info!("{json}");
        }
        Err(e) => {
            error!("{e}");
            process::exit(1);
        }
    }
}
