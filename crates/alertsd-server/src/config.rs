//! Process configuration: CLI flags for the `alertsd` binary.

use clap::Parser;
use std::path::PathBuf;

const DEFAULT_STATE_FILE: &str = "/var/lib/fty/fty-alert-list/state_file";

#[derive(Debug, Parser)]
#[command(name = "alertsd", about = "Active-alert registry daemon")]
pub struct Cli {
    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,

    /// Snapshot file path.
    #[arg(long, default_value = DEFAULT_STATE_FILE)]
    pub state_file: PathBuf,

    /// Interval, in seconds, between TTL sweeps.
    #[arg(long, default_value_t = 60)]
    pub sweep_interval_secs: u64,
}

impl Cli {
    pub fn env_filter_directive(&self) -> &'static str {
        if self.verbose {
            "alertsd_server=debug,alertsd_core=debug,alertsd_bus=debug,info"
        } else {
            "info"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_file_matches_legacy_path() {
        let cli = Cli::parse_from(["alertsd"]);
        assert_eq!(cli.state_file, PathBuf::from(DEFAULT_STATE_FILE));
        assert_eq!(cli.sweep_interval_secs, 60);
        assert!(!cli.verbose);
    }

    #[test]
    fn verbose_flag_sets_debug_directive() {
        let cli = Cli::parse_from(["alertsd", "-v"]);
        assert!(cli.env_filter_directive().contains("debug"));
    }
}
