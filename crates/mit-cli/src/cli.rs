use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(
    name = "mit",
    about = "Load MIT exports into a class:dn index and query them",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format (defaults to the config file, then text)
    #[arg(long, global = true)]
    pub format: Option<OutputFormat>,

    /// TOML configuration file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Alternate RN template table (JSON object of class -> template)
    #[arg(long, global = true)]
    pub templates: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load an export directory and print a summary
    Load(LoadArgs),
    /// Look up one record by exact class:dn key
    Get(GetArgs),
    /// Find records by glob pattern
    Find(FindArgs),
    /// List the classes present in an export
    Classes(ClassesArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Export directory of <class>.json files
    #[arg(short, long)]
    pub source: Option<PathBuf>,
    /// Treat every file as a line-delimited document export
    #[arg(long)]
    pub documents: bool,
}

#[derive(Args)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct GetArgs {
    pub key: String,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct FindArgs {
    pub pattern: String,
    /// Only print the first match
    #[arg(long)]
    pub one: bool,
    #[command(flatten)]
    pub source: SourceArgs,
}

#[derive(Args)]
pub struct ClassesArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_find_with_globals() {
        let cli = Cli::parse_from([
            "mit", "find", "fvTenant:*", "--one", "--source", "/tmp/export", "--format", "json",
        ]);
        assert_eq!(cli.format, Some(OutputFormat::Json));
        let Command::Find(args) = cli.command else {
            panic!("expected find");
        };
        assert_eq!(args.pattern, "fvTenant:*");
        assert!(args.one);
        assert_eq!(args.source.source, Some(PathBuf::from("/tmp/export")));
        assert!(!args.source.documents);
    }

    #[test]
    fn parses_load_documents() {
        let cli = Cli::parse_from(["mit", "-v", "load", "--documents", "-s", "ndo"]);
        assert!(cli.verbose);
        let Command::Load(args) = cli.command else {
            panic!("expected load");
        };
        assert!(args.source.documents);
        assert!(cli.format.is_none());
    }
}
