// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::config::ProximityConfig;
use crate::error::Result;

/// CLI arguments parser.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(after_help = r#"Frame file format (one JSON object per line):
    {"timestamp_ms": 0, "image_width": 1280, "image_height": 720,
     "shape": [1, 84, 8400], "data": [...]}
    {"session_restart": true}

Examples:
    vehicle-proximity replay --frames frames.jsonl
    vehicle-proximity replay -f frames.jsonl --conf 0.4 --cooldown-ms 3000
    vehicle-proximity replay -f frames.jsonl --config proximity.json --verbose false
    vehicle-proximity config --danger 0.5"#)]
pub struct Cli {
    #[command(subcommand)]
    /// Subcommand to execute.
    pub command: Commands,
}

/// Commands for the CLI.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay recorded detector outputs through the proximity pipeline
    Replay(ReplayArgs),
    /// Print the effective configuration as JSON
    Config(TuningArgs),
}

/// Arguments for the replay command.
#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// Recorded frames, one JSON object per line
    #[arg(short, long)]
    pub frames: PathBuf,

    #[command(flatten)]
    pub tuning: TuningArgs,

    /// Show verbose output
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub verbose: bool,
}

/// Configuration file and per-field overrides.
#[derive(Args, Debug, Default)]
pub struct TuningArgs {
    /// JSON configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Confidence threshold
    #[arg(long)]
    pub conf: Option<f32>,

    /// `IoU` threshold for NMS
    #[arg(long)]
    pub iou: Option<f32>,

    /// Proximity above which a warning is raised
    #[arg(long)]
    pub warning: Option<f32>,

    /// Proximity above which a danger alert is raised
    #[arg(long)]
    pub danger: Option<f32>,

    /// Minimum milliseconds between two alerts
    #[arg(long)]
    pub cooldown_ms: Option<u64>,

    /// Model input size the tensor coordinates refer to
    #[arg(long)]
    pub imgsz: Option<usize>,

    /// Number of class scores per anchor
    #[arg(long)]
    pub classes: Option<usize>,
}

impl TuningArgs {
    /// Build the effective configuration: defaults, then the config file, then flags.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded or the result is invalid.
    pub fn resolve(&self) -> Result<ProximityConfig> {
        let mut config = match &self.config {
            Some(path) => ProximityConfig::from_json_file(path)?,
            None => ProximityConfig::default(),
        };

        if let Some(conf) = self.conf {
            config = config.with_confidence(conf);
        }
        if let Some(iou) = self.iou {
            config = config.with_iou(iou);
        }
        let warning = self.warning.unwrap_or(config.warning_threshold);
        let danger = self.danger.unwrap_or(config.danger_threshold);
        config = config.with_thresholds(warning, danger);
        if let Some(ms) = self.cooldown_ms {
            config = config.with_cooldown(Duration::from_millis(ms));
        }
        if let Some(size) = self.imgsz {
            config = config.with_input_size(size);
        }
        if let Some(num_classes) = self.classes {
            config = config.with_num_classes(num_classes);
        }

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_replay_args_defaults() {
        let args = Cli::parse_from(["app", "replay", "--frames", "frames.jsonl"]);
        match args.command {
            Commands::Replay(replay_args) => {
                assert_eq!(replay_args.frames, PathBuf::from("frames.jsonl"));
                assert!(replay_args.verbose);
                assert!(replay_args.tuning.config.is_none());
                assert!(replay_args.tuning.conf.is_none());
            }
            Commands::Config(_) => panic!("expected replay"),
        }
    }

    #[test]
    fn test_replay_args_custom() {
        let args = Cli::parse_from([
            "app",
            "replay",
            "-f",
            "frames.jsonl",
            "--conf",
            "0.5",
            "--danger",
            "0.6",
            "--cooldown-ms",
            "3000",
            "--verbose",
            "false",
        ]);
        match args.command {
            Commands::Replay(replay_args) => {
                assert!(!replay_args.verbose);
                let config = replay_args.tuning.resolve().unwrap();
                assert!((config.confidence_threshold - 0.5).abs() < f32::EPSILON);
                assert!((config.danger_threshold - 0.6).abs() < f32::EPSILON);
                assert!((config.warning_threshold - 0.25).abs() < f32::EPSILON);
                assert_eq!(config.cooldown, Duration::from_millis(3000));
            }
            Commands::Config(_) => panic!("expected replay"),
        }
    }

    #[test]
    fn test_resolve_rejects_invalid_overrides() {
        let tuning = TuningArgs {
            warning: Some(0.5),
            danger: Some(0.3),
            ..TuningArgs::default()
        };
        assert!(tuning.resolve().is_err());
    }
}
