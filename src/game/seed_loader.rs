//! Seed data loader for data-driven mansions
//!
//! Loads a complete world from a JSON file so a sysadmin can ship a different
//! mystery without recompiling. The file format:
//!
//! ```json
//! {
//!   "start_room": 1,
//!   "required_clues": ["Key"],
//!   "rooms": [
//!     { "id": 1, "name": "Hall", "description": "...", "clues": ["Key"],
//!       "suspect": "The Murderer", "interrogation_clue": null }
//!   ],
//!   "connections": [[1, 2]]
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::game::errors::GameError;
use crate::game::types::{Connection, Room, RoomId};
use crate::game::world::World;

/// Load and validate a world from a JSON seed file.
pub fn load_world_from_json<P: AsRef<Path>>(path: P) -> Result<World, GameError> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| {
        GameError::Io(std::io::Error::new(
            e.kind(),
            format!("Failed to read {}: {}", path.display(), e),
        ))
    })?;

    let seed: WorldSeed = serde_json::from_str(&contents).map_err(|e| {
        GameError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("Failed to parse {}: {}", path.display(), e),
        ))
    })?;

    let world = seed.into_world();
    world.validate()?;
    Ok(world)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorldSeed {
    start_room: RoomId,
    #[serde(default)]
    required_clues: Vec<String>,
    rooms: Vec<RoomSeed>,
    #[serde(default)]
    connections: Vec<(RoomId, RoomId)>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RoomSeed {
    id: RoomId,
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    clues: Vec<String>,
    #[serde(default)]
    suspect: Option<String>,
    #[serde(default)]
    interrogation_clue: Option<String>,
}

impl WorldSeed {
    fn into_world(self) -> World {
        let rooms = self
            .rooms
            .into_iter()
            .map(|seed| {
                let mut room = Room::new(seed.id, &seed.name, &seed.description);
                for clue in &seed.clues {
                    room = room.with_clue(clue);
                }
                room.suspect = seed.suspect;
                room.interrogation_clue = seed.interrogation_clue;
                room
            })
            .collect();

        World {
            rooms,
            connections: self
                .connections
                .into_iter()
                .map(|(a, b)| Connection::new(a, b))
                .collect(),
            required_clues: self.required_clues,
            start_room: self.start_room,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_seed(body: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(body.as_bytes()).expect("write seed");
        file
    }

    #[test]
    fn loads_minimal_world() {
        let file = write_seed(
            r#"{
                "start_room": 1,
                "required_clues": ["Key"],
                "rooms": [
                    { "id": 1, "name": "Hall", "clues": ["Key"] },
                    { "id": 2, "name": "Cellar", "suspect": "The Murderer" }
                ],
                "connections": [[2, 1]]
            }"#,
        );
        let world = load_world_from_json(file.path()).expect("load");
        assert_eq!(world.rooms.len(), 2);
        assert_eq!(world.connections, vec![Connection::new(1, 2)]);
        assert!(world.room(2).expect("cellar").has_murderer());
        assert_eq!(world.room(1).expect("hall").description, "");
    }

    #[test]
    fn malformed_json_names_the_file() {
        let file = write_seed("{ not json");
        match load_world_from_json(file.path()) {
            Err(GameError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::InvalidData);
                assert!(e.to_string().contains(&file.path().display().to_string()));
            }
            other => panic!("expected io error, got {:?}", other),
        }
    }

    #[test]
    fn invalid_world_is_rejected() {
        let file = write_seed(
            r#"{ "start_room": 9, "rooms": [ { "id": 1, "name": "Hall" } ] }"#,
        );
        assert!(matches!(
            load_world_from_json(file.path()),
            Err(GameError::InvalidWorld(_))
        ));
    }

    #[test]
    fn missing_file_names_the_file() {
        match load_world_from_json("/nonexistent/mansion.json") {
            Err(GameError::Io(e)) => {
                assert_eq!(e.kind(), std::io::ErrorKind::NotFound);
                assert!(e.to_string().contains("/nonexistent/mansion.json"));
            }
            other => panic!("expected io error, got {:?}", other),
        }
    }
}
