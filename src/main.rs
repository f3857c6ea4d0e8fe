//! d20stats - Entry Point

use clap::Parser;
use d20stats::source::FormatChoice;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// d20stats - per-player d20 statistics from a Roll20 chat archive
#[derive(Parser, Debug)]
#[command(name = "d20stats")]
#[command(version)]
#[command(about = "Summarize every player's d20 rolls in a Roll20 chat archive")]
pub struct Args {
    /// Path to the chat archive (.json/.js is plain JSON, anything else base64)
    #[arg(short, long)]
    pub file: PathBuf,

    /// Force the archive encoding instead of inferring it from the extension
    #[arg(long, value_enum)]
    pub format: Option<FormatChoice>,

    /// Print every accepted d20 outcome to stderr
    #[arg(short, long)]
    pub debug: bool,

    /// Path to configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Load configuration with full precedence chain:
    // Defaults → Config File → Env Vars → CLI Args
    let config = {
        let config_file = d20stats::config::load_config_with_precedence(args.config.clone())?;
        let merged = d20stats::config::merge_config(config_file);
        let with_env = d20stats::config::apply_env_overrides(merged)?;

        // --debug can only switch the trace on
        let debug_override = args.debug.then_some(true);
        d20stats::config::apply_cli_overrides(with_env, debug_override, args.format)
    };

    d20stats::logging::init(&config.log_file_path)?;

    info!(
        config = ?config,
        file = %args.file.display(),
        "Configuration loaded and resolved"
    );

    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    let trace = if config.debug {
        Some(&mut stderr as &mut dyn io::Write)
    } else {
        None
    };

    d20stats::run(&args.file, config.format, &mut stdout, trace)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_help_does_not_error() {
        let result = Args::try_parse_from(["d20stats", "--help"]);
        // Help returns Err with DisplayHelp, which is success
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_version_does_not_error() {
        let result = Args::try_parse_from(["d20stats", "--version"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);
    }

    #[test]
    fn test_file_is_required() {
        let result = Args::try_parse_from(["d20stats"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_file_short_flag() {
        let args = Args::parse_from(["d20stats", "-f", "chat.json"]);
        assert_eq!(args.file, PathBuf::from("chat.json"));
        assert_eq!(args.format, None);
        assert!(!args.debug);
        assert_eq!(args.config, None);
    }

    #[test]
    fn test_file_long_flag() {
        let args = Args::parse_from(["d20stats", "--file", "export.txt"]);
        assert_eq!(args.file, PathBuf::from("export.txt"));
    }

    #[test]
    fn test_debug_flags() {
        assert!(Args::parse_from(["d20stats", "-f", "a.json", "-d"]).debug);
        assert!(Args::parse_from(["d20stats", "-f", "a.json", "--debug"]).debug);
    }

    #[test]
    fn test_format_values() {
        let args = Args::parse_from(["d20stats", "-f", "a.txt", "--format", "json"]);
        assert_eq!(args.format, Some(FormatChoice::Json));

        let args = Args::parse_from(["d20stats", "-f", "a.json", "--format", "base64"]);
        assert_eq!(args.format, Some(FormatChoice::Base64));

        let args = Args::parse_from(["d20stats", "-f", "a.json", "--format", "auto"]);
        assert_eq!(args.format, Some(FormatChoice::Auto));
    }

    #[test]
    fn test_format_invalid_rejects() {
        let result = Args::try_parse_from(["d20stats", "-f", "a.json", "--format", "xml"]);
        let err = result.unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::InvalidValue);
    }

    #[test]
    fn test_config_path() {
        let args = Args::parse_from(["d20stats", "-f", "a.json", "--config", "/custom/config.toml"]);
        assert_eq!(args.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_format_flows_through_config_precedence_chain() {
        use d20stats::config::{apply_cli_overrides, merge_config, ConfigFile};

        let config_file = ConfigFile {
            format: Some(FormatChoice::Json),
            ..ConfigFile::default()
        };

        let merged = merge_config(Some(config_file));
        assert_eq!(merged.format, FormatChoice::Json);

        let with_cli = apply_cli_overrides(merged, None, Some(FormatChoice::Base64));
        assert_eq!(
            with_cli.format,
            FormatChoice::Base64,
            "CLI format should override all other sources"
        );
    }
}
