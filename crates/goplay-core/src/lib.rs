//! Client for running Go playground snippets remotely.
//!
//! Two independent operations are exposed:
//!
//! - **Fetch**: download a shared snippet page and pull the program text out
//!   of its code element.
//! - **Compile**: post a program to the playground compile endpoint and fold
//!   the returned output events into separate stdout and stderr buffers.
//!
//! The free functions [`fetch`] and [`compile`] use the public playground with
//! default settings. Build a [`Playground`] from a [`PlaygroundConfig`] to
//! target another endpoint or bound request latency.
//!
//! ```no_run
//! # async fn run() -> goplay_core::Result<()> {
//! let code = goplay_core::fetch("https://play.golang.org/p/HmnNoBf0p1z").await?;
//! let result = goplay_core::compile(&code).await?;
//! if result.is_compile_error() {
//!     eprintln!("{}", result.errors);
//! } else {
//!     print!("{}", result.stdout);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod errors;
pub mod fetcher;
pub mod types;

pub use client::Playground;
pub use config::PlaygroundConfig;
pub use errors::{PlaygroundError, Result};
pub use fetcher::extract_code;
pub use types::{decode_response, CompileEvent, CompileResponse, CompileResult, EventKind};

/// Return the code embedded in the snippet page at `link`.
pub async fn fetch(link: &str) -> Result<String> {
    Playground::new(PlaygroundConfig::default())?.fetch(link).await
}

/// Compile and run `code` on the public playground.
pub async fn compile(code: &str) -> Result<CompileResult> {
    Playground::new(PlaygroundConfig::default())?.compile(code).await
}
