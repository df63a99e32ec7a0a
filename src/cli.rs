use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::ApplyStyle;

#[derive(Parser, Debug)]
#[command(name = "listing-sieve")]
#[command(author, version, about = "Dim or hide listings you have already seen", long_about = None)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Classify a page snapshot and print the rendered result
    Apply {
        /// Page snapshot (JSON)
        page: PathBuf,

        /// Report decisions that would be recorded without storing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Change the display style for classified listings
    Style {
        /// `grayout` or `hide`
        style: ApplyStyle,

        /// Page snapshot to restyle after switching
        #[arg(long)]
        page: Option<PathBuf>,
    },

    /// Mark every listing on the page that is not yet classified as ignored
    IgnoreAll {
        /// Page snapshot (JSON)
        page: PathBuf,
    },

    /// Show the stored configuration
    Config,

    /// Delete every stored decision and the configuration
    Clear {
        /// Confirm the irreversible reset
        #[arg(long)]
        yes: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_style_argument() {
        let cli = Cli::try_parse_from(["listing-sieve", "style", "hide", "--page", "page.json"])
            .unwrap();
        match cli.command {
            Command::Style { style, page } => {
                assert_eq!(style, ApplyStyle::Hide);
                assert_eq!(page, Some(PathBuf::from("page.json")));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_style() {
        assert!(Cli::try_parse_from(["listing-sieve", "style", "blur"]).is_err());
    }

    #[test]
    fn format_is_global() {
        let cli = Cli::try_parse_from(["listing-sieve", "apply", "page.json", "--format", "json", "--dry-run"])
            .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        assert!(matches!(cli.command, Command::Apply { dry_run: true, .. }));
    }
}
