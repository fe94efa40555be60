//! # cs2-game-parser: CS2 match telemetry flattening
//!
//! Reads one JSON document per played game, validates it and reshapes it into
//! one row per (team, player, opponent player, round). Rows of each game are
//! written to `<game_id>.json`, and a single completion event is published to
//! NATS JetStream once the batch has run.
//!
//! ## Example: flattening a game
//!
//! ```ignore
//! use cs2_game_parser::flatten;
//!
//! let game: serde_json::Value = serde_json::from_str(&raw)?;
//! for row in flatten(&game) {
//!     println!("{} vs {} round {}", row.player_id, row.player_opponent_id, row.round);
//! }
//! ```
//!
//! ## Example: running a batch
//!
//! ```ignore
//! use cs2_game_parser::{process_games, Settings};
//!
//! let settings = Settings::from_env()?;
//! let parsed = process_games(&settings)?;
//! ```

// Core modules
pub mod entity;
pub mod extraction;
pub mod flatten;
pub mod serialization;
pub mod error;
pub mod config;

// Directory extraction and batch runner
pub mod runtime;

// NATS JetStream integration
pub mod nats;

// Re-export key types
pub use entity::{GameRow, Id, PlayerStats, RoundOutcome};
pub use extraction::{Extractor, FieldPath};
pub use flatten::{flatten, Rejection};
pub use serialization::{load_flattened_game, save_flattened_game};
pub use error::PipelineError;
pub use config::{LogLevel, Settings};

pub use runtime::{process_dir, process_games, GameExtractor};

pub use nats::{CompletionEvent, NatsClient, NatsConfig};
