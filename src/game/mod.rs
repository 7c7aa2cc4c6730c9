//! Mystery game data model, room graph, persistence and session logic.
//! The room graph is the only piece with real algorithmic content; the rest
//! is plumbing between the text interface and the sled-backed store.

pub mod commands;
pub mod errors;
pub mod graph;
pub mod seed_loader;
pub mod session;
pub mod state;
pub mod storage;
pub mod types;
pub mod world;

pub use commands::{help_text, GameCommand};
pub use errors::GameError;
pub use graph::RoomGraph;
pub use seed_loader::load_world_from_json;
pub use session::MysteryGame;
pub use state::{GameState, Verdict};
pub use storage::{GameDatabase, GameStore, GameStoreBuilder, Table};
pub use types::*;
pub use world::{canonical_world, World, MANSION_ROOM_IDS};
