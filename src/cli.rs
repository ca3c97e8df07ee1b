use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand, ValueEnum};

pub const DEFAULT_CACHE_ROOT: &str = ".cache/legiscrape";

#[derive(Parser, Debug)]
#[command(
    name = "legiscrape",
    version,
    about = "Romanian legislation scraper: act metadata, article hierarchy, CSV/JSON/Markdown artifacts"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch, parse and import acts from the legislation portal.
    Scrape(ScrapeArgs),
    /// Run the same pipeline over local HTML or text files.
    Parse(ParseArgs),
    /// List stored acts flagged for manual review.
    Review(ReviewArgs),
    /// Show store counts and the latest run manifest.
    Status(StatusArgs),
    /// Remove one act (and its articles) from the store.
    DeleteAct(DeleteActArgs),
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum ArtifactFormat {
    Csv,
    Json,
    Markdown,
}

impl ArtifactFormat {
    pub const ALL: [ArtifactFormat; 3] = [Self::Csv, Self::Json, Self::Markdown];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "markdown",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Markdown => "md",
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct StoreLocation {
    #[arg(long, env = "LEGISCRAPE_CACHE_ROOT", default_value = DEFAULT_CACHE_ROOT)]
    pub cache_root: PathBuf,

    #[arg(long, env = "LEGISCRAPE_DB_PATH")]
    pub db_path: Option<PathBuf>,
}

impl StoreLocation {
    pub fn resolved_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.cache_root.join("legiscrape.sqlite"))
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.cache_root.join("manifests")
    }
}

#[derive(Args, Debug, Clone)]
pub struct OutputArgs {
    /// Artifact directory; defaults to `<cache-root>/out`.
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Artifact formats to write; all three when omitted.
    #[arg(long = "format", value_enum)]
    pub formats: Vec<ArtifactFormat>,

    /// Skip the SQLite import and only write artifacts.
    #[arg(long, default_value_t = false)]
    pub no_store: bool,
}

impl OutputArgs {
    pub fn resolved_output_dir(&self, cache_root: &Path) -> PathBuf {
        self.output_dir
            .clone()
            .unwrap_or_else(|| cache_root.join("out"))
    }

    pub fn resolved_formats(&self) -> Vec<ArtifactFormat> {
        if self.formats.is_empty() {
            ArtifactFormat::ALL.to_vec()
        } else {
            self.formats.clone()
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct ScrapeArgs {
    #[command(flatten)]
    pub location: StoreLocation,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(long = "url")]
    pub urls: Vec<String>,

    /// File with one URL per line; blank lines and `#` comments are ignored.
    #[arg(long)]
    pub url_list: Option<PathBuf>,

    #[arg(long, default_value_t = 4)]
    pub workers: usize,

    /// Per-request timeout in seconds; must be at least 1.
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: u64,

    #[arg(long, default_value = crate::fetch::DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Fetch the printable rendering (`DetaliiDocumentAfis`) instead of the detail page.
    #[arg(long, default_value_t = false)]
    pub printable: bool,

    /// Keep the fetched HTML under `<cache-root>/raw`.
    #[arg(long, default_value_t = false)]
    pub keep_raw: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ParseArgs {
    #[command(flatten)]
    pub location: StoreLocation,

    #[command(flatten)]
    pub output: OutputArgs,

    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Source URL recorded for the act; only valid with a single input file.
    #[arg(long)]
    pub source_url: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    #[command(flatten)]
    pub location: StoreLocation,

    #[arg(long, default_value_t = 50)]
    pub limit: usize,

    #[arg(long, default_value_t = false)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[command(flatten)]
    pub location: StoreLocation,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteActArgs {
    #[command(flatten)]
    pub location: StoreLocation,

    #[arg(long, required_unless_present = "source_url")]
    pub act_type: Option<String>,

    #[arg(long = "number", required_unless_present = "source_url")]
    pub act_number: Option<String>,

    #[arg(long)]
    pub year: Option<i32>,

    #[arg(long, conflicts_with_all = ["act_type", "act_number", "year"])]
    pub source_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::{CommandFactory, Parser};

    use super::{Cli, Commands};

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn every_subcommand_has_help_text() {
        let command = Cli::command();
        for sub in command.get_subcommands() {
            assert!(
                sub.get_about().is_some(),
                "subcommand `{}` has no about text",
                sub.get_name()
            );
        }
    }

    #[test]
    fn scrape_rejects_a_zero_timeout() {
        let zero = Cli::try_parse_from([
            "legiscrape",
            "scrape",
            "--url",
            "https://legislatie.just.ro/Public/DetaliiDocument/1",
            "--timeout-secs",
            "0",
        ]);
        assert!(zero.is_err());

        let cli = Cli::try_parse_from([
            "legiscrape",
            "scrape",
            "--url",
            "https://legislatie.just.ro/Public/DetaliiDocument/1",
            "--timeout-secs",
            "5",
        ])
        .expect("five seconds parses");
        match cli.command {
            Commands::Scrape(args) => assert_eq!(args.timeout_secs, 5),
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
