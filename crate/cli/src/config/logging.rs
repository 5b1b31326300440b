use clap::Args;
use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Args, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// The log filter used when the `RUST_LOG` environment variable is not set
    /// (for instance, `debug` or `jacarta_tester=trace`)
    #[clap(long, env("JACARTA_RUST_LOG"), verbatim_doc_comment, global = true)]
    pub rust_log: Option<String>,
}
