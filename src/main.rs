//! chatscroll - Entry Point

use chatscroll::config::{
    apply_cli_overrides, apply_env_overrides, load_config_with_precedence, merge_config,
};
use chatscroll::integration::{run_check, CheckOptions};
use chatscroll::logging::{self, LogTarget};
use chatscroll::model::AppError;
use chatscroll::view::{ChatStyles, ColorConfig};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

/// Chat list demo that keeps the reader's place while content arrives
#[derive(Parser, Debug)]
#[command(name = "chatscroll")]
#[command(version)]
#[command(about = "Scroll-anchored incremental insertion for a chat-style list")]
pub struct Args {
    /// Run N seeded insertions headlessly and print the validation report as JSON
    #[arg(long, value_name = "N")]
    pub check: Option<usize>,

    /// Seed for the random insertion generator
    #[arg(long)]
    pub seed: Option<u64>,

    /// Keep at most this many time headers
    #[arg(long)]
    pub max_headers: Option<usize>,

    /// Keep at most this many messages
    #[arg(long)]
    pub max_messages: Option<usize>,

    /// Disable colors
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<ExitCode, AppError> {
    let args = Args::parse();

    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = load_config_with_precedence(args.config.clone())?;
        let merged = merge_config(config_file);
        let with_env = apply_env_overrides(merged);
        apply_cli_overrides(with_env, args.seed, args.max_headers, args.max_messages)
    };

    if let Some(inserts) = args.check {
        logging::init(&LogTarget::Stderr)?;
        info!(config = ?config, inserts, "Running headless check");

        let options = CheckOptions {
            inserts,
            ..CheckOptions::default()
        };
        let report = run_check(config.list_config(), &options);
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(if report.passed() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    logging::init(&LogTarget::File(config.log_file_path.clone()))?;
    info!(config = ?config, "Configuration loaded and resolved");

    let styles = ChatStyles::with_color_config(ColorConfig::from_env_and_args(args.no_color));
    chatscroll::view::run(config.list_config(), styles)?;

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["chatscroll", "--help"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["chatscroll", "--version"]);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_no_args_defaults() {
        let args = Args::parse_from(["chatscroll"]);
        assert_eq!(args.check, None);
        assert_eq!(args.seed, None);
        assert_eq!(args.max_headers, None);
        assert_eq!(args.max_messages, None);
        assert!(!args.no_color);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_check_takes_insert_count() {
        let args = Args::parse_from(["chatscroll", "--check", "200"]);
        assert_eq!(args.check, Some(200));
    }

    #[test]
    fn test_check_rejects_negative() {
        let result = Args::try_parse_from(["chatscroll", "--check", "-1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_seed_flag() {
        let args = Args::parse_from(["chatscroll", "--seed", "42"]);
        assert_eq!(args.seed, Some(42));
    }

    #[test]
    fn test_caps_flags() {
        let args = Args::parse_from(["chatscroll", "--max-headers", "3", "--max-messages", "50"]);
        assert_eq!(args.max_headers, Some(3));
        assert_eq!(args.max_messages, Some(50));
    }

    #[test]
    fn test_config_path() {
        let args = Args::parse_from(["chatscroll", "--config", "/custom/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_seed_flows_through_config_precedence_chain() {
        use chatscroll::config::ConfigFile;

        // Defaults → Config File → Env Vars → CLI Args
        let config_file = ConfigFile {
            seed: Some(5),
            max_headers: Some(4),
            ..ConfigFile::default()
        };

        let merged = merge_config(Some(config_file));
        assert_eq!(merged.list.seed, 5, "Config file should override default seed");

        let with_cli = apply_cli_overrides(merged, Some(9), None, Some(30));
        assert_eq!(with_cli.list.seed, 9, "CLI seed should override all other sources");
        assert_eq!(with_cli.list.caps.max_headers, Some(4));
        assert_eq!(with_cli.list.caps.max_messages, Some(30));
    }
}
