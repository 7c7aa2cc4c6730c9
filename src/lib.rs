//! # Mystery Mansion - A Text Murder Mystery
//!
//! Mystery Mansion is a small single-player detective game played at a text
//! prompt. The player walks between connected rooms, gathers clues, questions
//! suspects and finally confronts the murderer. Progress is kept in an embedded
//! sled database so a case can be resumed later.
//!
//! ## Features
//!
//! - **Room Graph**: Undirected passages with breadth-first shortest paths, used for hints and the `path` command.
//! - **Persistent Progress**: Rooms, passages and saves live in typed sled tables with schema version checks.
//! - **Data-Driven Worlds**: Ship a different mansion as a JSON seed file without recompiling.
//! - **Async Design**: Storage work runs on Tokio's blocking pool behind an async facade.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mystery_mansion::config::Config;
//! use mystery_mansion::game::{GameDatabase, MysteryGame};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.toml").await?;
//!     let db = GameDatabase::open(config.storage.db_path()).await?;
//!
//!     let mut game = MysteryGame::load(&db, config.game.default_player_id).await?;
//!     game.start_game();
//!     game.process_command("go library");
//!     println!("{}", game.feedback());
//!
//!     game.save(&db).await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! - [`game`] - Rooms, room graph, game state, command parsing and storage
//! - [`config`] - Configuration loading and defaults
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │   CLI / prompt  │ ← Reads commands, prints feedback
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │   MysteryGame   │ ← Session rules, owns RoomGraph and GameState
//! └─────────────────┘
//!          │
//! ┌─────────────────┐
//! │  GameDatabase   │ ← Async facade over the sled store
//! └─────────────────┘
//! ```

pub mod config;
pub mod game;
