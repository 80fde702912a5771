use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::backend::w3w::DEFAULT_ENDPOINT;
use crate::query::config::{DEFAULT_FOCUS_RESULTS, DEFAULT_RESULTS, SuggestConfig};

#[derive(Parser)]
#[command(name = "w3wsuggest", about = "Three-word address autosuggest")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Drive an autosuggest field from stdin
    ///
    /// Each line is the field's full text after a keystroke. `:begin`
    /// starts editing, `:pick N` selects suggestion N, `:quit` exits.
    Session {
        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        suggest: SuggestArgs,

        /// Print notifications as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Print suggestions for a single input
    Suggest {
        /// Partial three-word address
        input: String,

        #[command(flatten)]
        backend: BackendArgs,

        #[command(flatten)]
        suggest: SuggestArgs,

        /// Print suggestions as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check whether a three-word address exists
    Resolve {
        /// Complete three-word address
        words: String,

        #[command(flatten)]
        backend: BackendArgs,
    },
}

#[derive(Args)]
pub struct BackendArgs {
    /// what3words API key
    #[arg(long, env = "W3W_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// API root URL
    #[arg(long, default_value = DEFAULT_ENDPOINT)]
    pub endpoint: String,
}

#[derive(Args)]
pub struct SuggestArgs {
    /// Number of suggestions to return
    #[arg(long, default_value_t = DEFAULT_RESULTS)]
    pub n_results: u32,

    /// Number of results the focus point applies to
    #[arg(long, default_value_t = DEFAULT_FOCUS_RESULTS)]
    pub n_focus_results: u32,

    /// Focus point as "lat,lng"
    #[arg(long, allow_hyphen_values = true)]
    pub focus: Option<String>,

    /// Comma-separated country codes to confine results to
    #[arg(long)]
    pub clip_to_country: Option<String>,

    /// Bounding box as "south_lat,west_lng,north_lat,east_lng"
    #[arg(long, allow_hyphen_values = true)]
    pub clip_to_bounding_box: Option<String>,

    /// Circle as "lat,lng,km"
    #[arg(long, allow_hyphen_values = true)]
    pub clip_to_circle: Option<String>,

    /// Polygon as "lat,lng,lat,lng,..." (at most 25 pairs once closed)
    #[arg(long, allow_hyphen_values = true)]
    pub clip_to_polygon: Option<String>,

    /// Language code for returned words
    #[arg(long)]
    pub language: Option<String>,

    /// Quiet period before a query is sent, in milliseconds
    #[arg(long, default_value_t = 200)]
    pub debounce_ms: u64,

    /// Stop on the first backend error
    #[arg(long)]
    pub debug: bool,

    /// Keep the list open after a pick
    #[arg(long)]
    pub keep_list: bool,
}

impl SuggestArgs {
    pub fn into_config(self) -> SuggestConfig {
        SuggestConfig {
            n_results: self.n_results,
            n_focus_results: self.n_focus_results,
            focus: self.focus,
            clip_to_country: self.clip_to_country,
            clip_to_bounding_box: self.clip_to_bounding_box,
            clip_to_circle: self.clip_to_circle,
            clip_to_polygon: self.clip_to_polygon,
            language: self.language,
            debounce: Duration::from_millis(self.debounce_ms),
            debug: self.debug,
            hide_on_select: !self.keep_list,
        }
    }
}
