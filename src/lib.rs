//! Incremental mirror of chess.com monthly game archives.
//!
//! A run lists an account's monthly archives, keeps those on or after the
//! configured cutoff, downloads each month's PGN, saves it under `pgn/` and
//! writes every game to its own Markdown file unless that file already exists.

pub mod cli;
pub mod config;
pub mod errors;
pub mod filter;
pub mod materializer;
pub mod models;
pub mod pgn;
pub mod pipeline;
pub mod remote;
pub mod status;
pub mod storage;

pub use errors::SyncError;
pub use pipeline::{run_sync, CancelFlag};
