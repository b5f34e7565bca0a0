// Provider adapter for yt-dlp
//
// Turns `--dump-json` output into a MediaDescriptor and transfers a chosen
// format into the request workspace. Stderr is classified for user hints.

mod cli;
mod config;
mod diagnostics;
mod parser;

pub use cli::YtDlpProvider;
pub use config::ExtractorConfig;
pub use diagnostics::{diagnose_error, error_excerpt, ProviderFailure};
pub use parser::parse_descriptor;
