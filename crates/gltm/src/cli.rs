use std::path::PathBuf;

use clap::{ArgGroup, Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "gltm")]
#[command(about = "Create, rotate, delete and list GitLab access tokens")]
#[command(version)]
#[command(group(ArgGroup::new("action").args(["create", "delete", "rotate"])))]
#[command(group(ArgGroup::new("owner").args(["user", "group", "project"])))]
pub struct Cli {
    /// Create an access token (requires --name and --scopes)
    #[arg(short, long)]
    pub create: bool,

    /// Delete an access token (requires --token)
    #[arg(short, long)]
    pub delete: bool,

    /// Rotate an access token (requires --token)
    #[arg(short, long)]
    pub rotate: bool,

    /// List active access tokens
    #[arg(short, long)]
    pub list: bool,

    /// Access token expiry date, e.g. "2030-12-31"
    #[arg(short, long, alias = "expires_at")]
    pub expires_at: Option<String>,

    /// User id or username. Only useful for administrators
    #[arg(short, long)]
    pub user: Option<String>,

    /// Group id or full path
    #[arg(short, long)]
    pub group: Option<String>,

    /// Project id or path with namespace
    #[arg(short, long)]
    pub project: Option<String>,

    /// Access token id or name
    #[arg(short, long)]
    pub token: Option<String>,

    /// Access token name
    #[arg(short, long)]
    pub name: Option<String>,

    /// Access token scopes, comma or space delimited, e.g. "api,read_user"
    #[arg(short, long)]
    pub scopes: Option<String>,

    /// Where to write a new token value: a file path, or "-"/"stdout"
    #[arg(short, long)]
    pub output: Option<String>,

    /// GitLab base URL (overrides config)
    #[arg(long, env = "GITLAB_URL")]
    pub url: Option<String>,

    /// Private token used to authenticate (overrides config)
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    pub private_token: Option<String>,

    /// Config profile name
    #[arg(long, env = "GLTM_PROFILE", default_value = "default")]
    pub profile: String,

    /// Config file path (defaults to ~/.gltm/config.toml)
    #[arg(long, env = "GLTM_CONFIG")]
    pub config: Option<PathBuf>,

    /// Record output format
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Log level used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[derive(Clone, Copy, Debug, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// `id name created_at expires_at revoked scopes`, one line per token
    #[default]
    Plain,
    Json,
    Table,
}

/// Exit status for a rejected command line. `--help` and `--version` succeed;
/// every other rejection is a configuration error and exits with 1, keeping
/// 2 for actions that failed after the run started.
pub fn parse_exit_code(err: &clap::Error) -> u8 {
    if err.use_stderr() { 1 } else { 0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_flags_match_long_ones() {
        let cli = Cli::try_parse_from([
            "gltm", "-c", "-n", "ci-bot", "-s", "api,read_repository", "-g", "infra", "-e",
            "2030-01-01", "-o", "-",
        ])
        .unwrap();
        assert!(cli.create);
        assert_eq!(cli.name.as_deref(), Some("ci-bot"));
        assert_eq!(cli.group.as_deref(), Some("infra"));
        assert_eq!(cli.expires_at.as_deref(), Some("2030-01-01"));
        assert_eq!(cli.output.as_deref(), Some("-"));
    }

    #[test]
    fn underscore_alias_for_expiry() {
        let cli = Cli::try_parse_from(["gltm", "-r", "-t", "5", "--expires_at", "2030-01-01"])
            .unwrap();
        assert_eq!(cli.expires_at.as_deref(), Some("2030-01-01"));
    }

    #[test]
    fn primary_actions_are_exclusive() {
        assert!(Cli::try_parse_from(["gltm", "--create", "--delete"]).is_err());
        assert!(Cli::try_parse_from(["gltm", "--rotate", "--delete", "-t", "1"]).is_err());
    }

    #[test]
    fn owner_selectors_are_exclusive() {
        assert!(Cli::try_parse_from(["gltm", "-l", "-u", "alice", "-g", "infra"]).is_err());
        assert!(Cli::try_parse_from(["gltm", "-l", "-g", "infra", "-p", "infra/app"]).is_err());
    }

    #[test]
    fn conflicting_flags_exit_as_configuration_errors() {
        let owners = Cli::try_parse_from(["gltm", "-l", "-u", "alice", "-g", "infra"]).unwrap_err();
        assert_eq!(parse_exit_code(&owners), 1);
        let actions = Cli::try_parse_from(["gltm", "-c", "-d", "-t", "1"]).unwrap_err();
        assert_eq!(parse_exit_code(&actions), 1);
        let unknown = Cli::try_parse_from(["gltm", "--bogus"]).unwrap_err();
        assert_eq!(parse_exit_code(&unknown), 1);
    }

    #[test]
    fn help_and_version_exit_cleanly() {
        let help = Cli::try_parse_from(["gltm", "--help"]).unwrap_err();
        assert_eq!(parse_exit_code(&help), 0);
        let version = Cli::try_parse_from(["gltm", "--version"]).unwrap_err();
        assert_eq!(parse_exit_code(&version), 0);
    }

    #[test]
    fn list_combines_with_an_action() {
        let cli = Cli::try_parse_from(["gltm", "-l", "-d", "-t", "12"]).unwrap();
        assert!(cli.list && cli.delete);
    }
}
