use std::path::PathBuf;

use clap::Parser;

/// Hardcoded fallbacks, used only when neither a CLI flag nor the
/// config file supplies a value.
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 32000;
pub const DEFAULT_STATIC_DIR: &str = "./www";

/// simpi Broker: owns the simulated GPIO register state and serves it
/// over HTTP so the simpi client library has something to talk to.
///
/// None of `host`/`port`/`static_dir`/`prefs_path` have a clap-level
/// default: leaving them unset is what lets `main` tell "the user
/// didn't pass this flag" apart from "the user passed the default
/// value", so a setting in the config file can take effect when the
/// flag is absent.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Args {
    /// Address to bind the HTTP listener to.
    #[clap(long)]
    pub host: Option<String>,

    /// Port to bind the HTTP listener to.
    #[clap(long)]
    pub port: Option<u16>,

    /// Directory static (non-`/api/`) requests are served from.
    #[clap(long)]
    pub static_dir: Option<PathBuf>,

    /// Path to the opaque preferences JSON blob served at `/api/prefs`.
    #[clap(long)]
    pub prefs_path: Option<PathBuf>,

    /// Path to an optional TOML file overriding the flags above.
    #[clap(long, default_value = "./simpi-broker.toml")]
    pub config: PathBuf,

    /// Raise the tracing filter level; repeatable (`-v`, `-vv`).
    #[clap(short, long, parse(from_occurrences))]
    pub verbose: u8,
}
