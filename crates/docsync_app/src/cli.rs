use std::path::PathBuf;

use clap::Parser;

/// Sync upstream documentation into local markdown resources.
#[derive(Debug, Parser)]
#[command(name = "docsync", version)]
pub struct Cli {
    /// RON file listing the sources to sync.
    #[arg(long, default_value = "docsync.ron")]
    pub config: PathBuf,

    /// Report what would be written without touching the filesystem.
    #[arg(long)]
    pub dry_run: bool,

    /// Only sync the named source; repeat for several. Default: all.
    #[arg(long = "source", value_name = "NAME")]
    pub sources: Vec<String>,

    /// Log at debug level.
    #[arg(long, short)]
    pub verbose: bool,

    /// Also append log output to this file.
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::Cli;
    use clap::Parser;

    #[test]
    fn parses_repeated_sources() {
        let cli = Cli::parse_from([
            "docsync", "--dry-run", "--source", "sdk", "--source", "api", "--config", "x.ron",
        ]);
        assert!(cli.dry_run);
        assert_eq!(cli.sources, vec!["sdk", "api"]);
        assert_eq!(cli.config.to_str(), Some("x.ron"));
    }

    #[test]
    fn defaults() {
        let cli = Cli::parse_from(["docsync"]);
        assert!(!cli.dry_run);
        assert!(cli.sources.is_empty());
        assert_eq!(cli.config.to_str(), Some("docsync.ron"));
        assert!(cli.log_file.is_none());
    }
}
