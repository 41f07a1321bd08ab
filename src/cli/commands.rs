use crate::client::FetchPolicy;
use clap::{Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "bocchi")]
#[command(
    author,
    version,
    about = "Run GraphQL queries against an in-process server, no network hop"
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config file (searches upward for .bocchi.toml by default)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write JSON logs to this file (rotated daily)
    #[arg(long, global = true, env = "BOCCHI_LOG_FILE")]
    pub log_file: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a query against the demo package registry
    #[command(visible_alias = "q")]
    Query {
        /// GraphQL query document
        query: String,

        /// Variables as JSON
        #[arg(long)]
        variables: Option<String>,

        /// Operation to run when the document holds several
        #[arg(long)]
        operation_name: Option<String>,

        /// Fetch policy (defaults to cache-and-network)
        #[arg(long, value_enum)]
        fetch_policy: Option<FetchPolicyArg>,

        /// Print only the data instead of the whole result
        #[arg(long)]
        data_only: bool,
    },

    /// Print the demo schema in SDL
    Sdl,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum FetchPolicyArg {
    CacheFirst,
    CacheAndNetwork,
    NetworkOnly,
    CacheOnly,
    NoCache,
}

impl From<FetchPolicyArg> for FetchPolicy {
    fn from(arg: FetchPolicyArg) -> Self {
        match arg {
            FetchPolicyArg::CacheFirst => FetchPolicy::CacheFirst,
            FetchPolicyArg::CacheAndNetwork => FetchPolicy::CacheAndNetwork,
            FetchPolicyArg::NetworkOnly => FetchPolicy::NetworkOnly,
            FetchPolicyArg::CacheOnly => FetchPolicy::CacheOnly,
            FetchPolicyArg::NoCache => FetchPolicy::NoCache,
        }
    }
}
