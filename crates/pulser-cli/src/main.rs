//! # pulser CLI entry point
//!
//! Parses command-line arguments and dispatches to subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pulser_cli::emit::{run_emit, EmitArgs};
use pulser_cli::schedule::{run_schedule, ScheduleArgs};
use pulser_cli::simulate::{run_simulate, SimulateArgs};

/// Pulse-train generator built from chained countdown/toggle stages.
///
/// Converts a list of durations into clock cycles, simulates the chain
/// tick by tick, and emits it as a single-clock Verilog module.
#[derive(Parser, Debug)]
#[command(name = "pulser", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML or JSON pulse-train configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the resolved cycles, toggle offsets, and final polarity.
    Schedule(ScheduleArgs),

    /// Drive the chain with a trigger waveform and write the output trace.
    Simulate(SimulateArgs),

    /// Write the chain as a Verilog module.
    Emit(EmitArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "pulser starting");

    let config = cli.config.as_deref();
    let result = match &cli.command {
        Commands::Schedule(args) => run_schedule(args, config),
        Commands::Simulate(args) => run_simulate(args, config),
        Commands::Emit(args) => run_emit(args, config),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulser_cli::simulate::TraceFormat;

    #[test]
    fn cli_parse_schedule_durations() {
        let cli = Cli::try_parse_from(["pulser", "schedule", "1", "2", "3", "4"]).unwrap();
        let Commands::Schedule(args) = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(args.train.durations, vec![1.0, 2.0, 3.0, 4.0]);
        assert!(!args.json);
    }

    #[test]
    fn cli_parse_train_flags() {
        let cli = Cli::try_parse_from([
            "pulser", "emit", "-f", "100", "-n", "--direct", "--initial-high", "--allow-odd",
            "50", "100", "50",
        ])
        .unwrap();
        let Commands::Emit(args) = cli.command else {
            panic!("expected emit");
        };
        assert_eq!(args.train.freq, Some(100));
        assert!(args.train.ns);
        assert!(args.train.direct);
        assert!(args.train.initial_high);
        assert!(args.train.allow_odd);
        assert_eq!(args.train.durations.len(), 3);
        assert_eq!(args.name, "pulse_train");
    }

    #[test]
    fn cli_parse_negative_duration_reaches_validation() {
        let cli = Cli::try_parse_from(["pulser", "schedule", "4", "-1"]).unwrap();
        let Commands::Schedule(args) = cli.command else {
            panic!("expected schedule");
        };
        assert_eq!(args.train.durations, vec![4.0, -1.0]);
    }

    #[test]
    fn cli_parse_negated_train_flags() {
        let cli = Cli::try_parse_from([
            "pulser", "schedule", "--initial-low", "--require-even", "2", "2",
        ])
        .unwrap();
        let Commands::Schedule(args) = cli.command else {
            panic!("expected schedule");
        };
        assert!(args.train.initial_low);
        assert!(args.train.require_even);

        assert!(Cli::try_parse_from(["pulser", "schedule", "--initial-low", "--initial-high", "2", "2"]).is_err());
        assert!(Cli::try_parse_from(["pulser", "schedule", "--allow-odd", "--require-even", "2"]).is_err());
    }

    #[test]
    fn cli_parse_freq_and_period_conflict() {
        let result = Cli::try_parse_from(["pulser", "schedule", "-f", "60", "-p", "10", "2", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_direct_and_padding_conflict() {
        let result =
            Cli::try_parse_from(["pulser", "schedule", "--direct", "--padding", "4", "2", "2"]);
        assert!(result.is_err());
    }

    #[test]
    fn cli_parse_simulate_options() {
        let cli = Cli::try_parse_from([
            "pulser", "simulate", "--trigger-at", "3", "--hold", "13", "--repeat", "22",
            "--ticks", "48", "--format", "vcd", "1", "2", "3", "4",
        ])
        .unwrap();
        let Commands::Simulate(args) = cli.command else {
            panic!("expected simulate");
        };
        assert_eq!(args.trigger_at, 3);
        assert_eq!(args.hold, Some(13));
        assert_eq!(args.repeat, Some(22));
        assert_eq!(args.ticks, Some(48));
        assert_eq!(args.format, TraceFormat::Vcd);
    }

    #[test]
    fn cli_parse_verbose_levels() {
        let cli0 = Cli::try_parse_from(["pulser", "schedule", "2", "2"]).unwrap();
        assert_eq!(cli0.verbose, 0);

        let cli2 = Cli::try_parse_from(["pulser", "-vv", "schedule", "2", "2"]).unwrap();
        assert_eq!(cli2.verbose, 2);
    }

    #[test]
    fn cli_parse_config_option() {
        let cli = Cli::try_parse_from(["pulser", "--config", "train.yaml", "emit"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("train.yaml")));
    }

    #[test]
    fn cli_parse_no_subcommand_errors() {
        assert!(Cli::try_parse_from(["pulser"]).is_err());
    }
}
