//! Media extraction through yt-dlp
//!
//! The core abstraction is the [`MediaExtractor`] trait: fetch metadata for a
//! page URL, or download it in a given format while reporting progress.
//! Two implementations are provided:
//!
//! - [`CliExtractor`]: spawns an external `yt-dlp` binary per call
//! - [`NoOpExtractor`]: stub used when no binary is available
//!
//! The tool's stdout is parsed line by line (see [`parser`]); its stderr is
//! captured in full and only surfaced when the process fails.
//!
//! ## Usage
//!
//! ```no_run
//! use ytdl_relay::extractor::{CliExtractor, MediaExtractor};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let extractor = CliExtractor::from_path("downloads")
//!         .expect("yt-dlp not found");
//!
//!     let outcome = extractor
//!         .download(
//!             "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
//!             "best",
//!             &|percent: f64| println!("{percent:.1}%"),
//!         )
//!         .await?;
//!     println!("stored at {}", outcome.stored_path.display());
//!     Ok(())
//! }
//! ```

mod cli;
mod noop;
pub mod parser;
mod traits;

pub use cli::CliExtractor;
pub use noop::NoOpExtractor;
pub use parser::{ExitStatus, OutputTracker};
pub use traits::{ExtractorCapabilities, MediaExtractor, ProgressSink};
