//! attrail - compliance attestation trail explorer
//!
//! Fetches attestation events from a paginated feed, classifies the
//! compliance transitions within each (attestation, branch) series, and
//! renders the result as a table, CSV, or JSON archive.

use std::collections::BTreeMap;
use std::path::PathBuf;

use attestation_client::FeedQuery;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod render;

#[derive(Parser)]
#[command(name = "attrail")]
#[command(version, about = "Compliance attestation trail explorer", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify attestation events and render the transitions
    Parse {
        #[command(subcommand)]
        source: ParseSource,
    },

    /// Fetch raw attestation events and save them as a JSON archive
    Download {
        #[command(flatten)]
        feed: FeedArgs,

        /// Path of the archive to write
        output_file: PathBuf,
    },

    /// Summary statistics over classified events
    Stats {
        #[command(subcommand)]
        source: StatsSource,
    },
}

#[derive(Subcommand)]
enum ParseSource {
    /// Fetch a flow's events from the API
    Flow {
        #[command(flatten)]
        feed: FeedArgs,

        /// Write CSV to this path instead of printing a table
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Read events from a downloaded archive
    File {
        /// Archive produced by `attrail download`
        data_file: PathBuf,

        /// Write CSV to this path instead of printing a table
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum StatsSource {
    /// Read events from a downloaded archive
    File {
        /// Archive produced by `attrail download`
        data_file: PathBuf,
    },
}

#[derive(Args)]
struct FeedArgs {
    /// Organization the flow belongs to
    #[arg(long)]
    org: String,

    /// Flow to fetch attestations for
    #[arg(long)]
    flow: String,

    /// Only fetch attestations created at or after this Unix timestamp
    #[arg(long)]
    from_ts: Option<i64>,

    /// Only fetch attestations created at or before this Unix timestamp
    #[arg(long)]
    to_ts: Option<i64>,

    /// API key, sent as basic-auth username with an empty password
    #[arg(long, env = "ATTRAIL_API_KEY")]
    api_key: Option<String>,

    /// Attestation service host
    #[arg(long, env = "ATTRAIL_HOST", default_value = "https://app.attrail.io")]
    host: String,
}

impl FeedArgs {
    /// Endpoint and filter params for the feed. Absent timestamp bounds
    /// are simply not inserted into the param map.
    fn query(&self) -> FeedQuery {
        let mut params = BTreeMap::new();
        if let Some(ts) = self.from_ts {
            params.insert("from_timestamp".to_string(), ts.to_string());
        }
        if let Some(ts) = self.to_ts {
            params.insert("to_timestamp".to_string(), ts.to_string());
        }

        FeedQuery {
            base_url: format!(
                "{}/api/v2/attestations/{}/{}",
                self.host.trim_end_matches('/'),
                self.org,
                self.flow
            ),
            params,
            api_key: self.api_key.clone(),
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Parse { source } => match source {
            ParseSource::Flow { feed, out } => commands::flow::run(&feed, out.as_deref()),
            ParseSource::File { data_file, out } => {
                commands::file::run(&data_file, out.as_deref())
            }
        },
        Commands::Download { feed, output_file } => commands::download::run(&feed, &output_file),
        Commands::Stats { source } => match source {
            StatsSource::File { data_file } => commands::stats::run(&data_file),
        },
    }
}
