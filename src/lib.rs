//! # ryt - video-info extraction and URL-signing engine
//!
//! Resolves a YouTube identifier (raw id or watch/short/embed URL) into its
//! metadata and format list, deciphers protected signatures, and builds the
//! final playable URL for a chosen format. File I/O, output naming, progress
//! rendering and a CLI front-end are intentionally left to callers.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ryt::Client;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new();
//!     let cancel = CancellationToken::new();
//!     let info = client.get_video_info("dQw4w9WgXcQ", &cancel).await?;
//!     if let Some(format) = info.formats.first() {
//!         let url = client.get_download_url(&info, format, &cancel).await?;
//!         println!("{}: {url}", info.title);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cipher;
pub mod client;
pub mod dash;
pub mod error;
pub mod extract;
pub mod format;
pub mod id;
pub mod itag;
pub mod parse;
pub mod thumbnail;
pub mod url_builder;
pub mod video_info;

pub use client::HttpClient;
pub use error::RytError;
pub use format::{Format, FormatKey, FormatList, FormatValue};
pub use itag::Itag;
pub use thumbnail::{thumbnail_url, ThumbnailQuality};
pub use video_info::{Client, VideoInfo};

/// Result type alias for ryt operations.
pub type Result<T> = std::result::Result<T, RytError>;
