use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

pub const ROOM_SCHEMA_VERSION: u8 = 1;
pub const CONNECTION_SCHEMA_VERSION: u8 = 1;
pub const SAVE_SCHEMA_VERSION: u8 = 1;
pub const WORLD_META_SCHEMA_VERSION: u8 = 1;

/// Suspect name that marks the culprit. Meeting this suspect ends the game.
pub const MURDERER: &str = "The Murderer";

/// Stable numeric identifier of a room for the lifetime of the process.
pub type RoomId = u32;

/// Identifier used to key saved progress.
pub type PlayerId = u32;

/// A location in the mansion.
///
/// Clues are held in an ordered set so that "take the next clue" and
/// descriptions stay deterministic.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub description: String,
    pub clues: BTreeSet<String>,
    pub suspect: Option<String>,
    /// Clue the suspect gives up when interrogated; consumed on first reveal.
    pub interrogation_clue: Option<String>,
    pub schema_version: u8,
}

impl Room {
    pub fn new(id: RoomId, name: &str, description: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            description: description.to_string(),
            clues: BTreeSet::new(),
            suspect: None,
            interrogation_clue: None,
            schema_version: ROOM_SCHEMA_VERSION,
        }
    }

    pub fn with_clue(mut self, clue: &str) -> Self {
        self.clues.insert(clue.to_string());
        self
    }

    pub fn with_suspect(mut self, suspect: &str) -> Self {
        self.suspect = Some(suspect.to_string());
        self
    }

    pub fn with_interrogation_clue(mut self, clue: &str) -> Self {
        self.interrogation_clue = Some(clue.to_string());
        self
    }

    /// Remove and return the first clue in sorted order.
    pub fn take_clue(&mut self) -> Option<String> {
        self.clues.pop_first()
    }

    pub fn has_murderer(&self) -> bool {
        self.suspect.as_deref() == Some(MURDERER)
    }

    /// The clue an interrogation here would reveal. Needs an innocent suspect:
    /// questioning the murderer is a confrontation.
    pub fn interrogation_reward(&self) -> Option<&String> {
        match &self.suspect {
            Some(_) if !self.has_murderer() => self.interrogation_clue.as_ref(),
            _ => None,
        }
    }

    /// True while the room still has something for the player to pick up.
    /// Entering the murderer's room ends the game, so it never has.
    pub fn has_pending_clue(&self) -> bool {
        !self.has_murderer() && (!self.clues.is_empty() || self.interrogation_reward().is_some())
    }

    /// Every clue the player can still obtain here, including the suspect's.
    pub fn all_clues(&self) -> impl Iterator<Item = &String> {
        let reachable = !self.has_murderer();
        self.clues
            .iter()
            .chain(self.interrogation_reward())
            .filter(move |_| reachable)
    }
}

/// Persisted undirected passage between two rooms.
///
/// The pair is stored with the lower id first so that `(a, b)` and `(b, a)`
/// collapse onto the same row.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Connection {
    pub from: RoomId,
    pub to: RoomId,
}

impl Connection {
    pub fn new(a: RoomId, b: RoomId) -> Self {
        Self {
            from: a.min(b),
            to: a.max(b),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub connection: Connection,
    pub schema_version: u8,
}

impl From<Connection> for ConnectionRecord {
    fn from(connection: Connection) -> Self {
        Self {
            connection,
            schema_version: CONNECTION_SCHEMA_VERSION,
        }
    }
}

/// World-level settings stored next to the rooms: where the player starts and
/// which clues win the game.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldMeta {
    pub start_room: RoomId,
    pub required_clues: Vec<String>,
    pub schema_version: u8,
}

/// On-disk form of a player's progress.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SaveRecord {
    pub player_id: PlayerId,
    pub inventory: Vec<String>,
    pub required_clues: Vec<String>,
    pub current_room: Option<RoomId>,
    pub suspect_confronted: bool,
    pub won: bool,
    pub lost: bool,
    pub game_over: bool,
    pub saved_at: DateTime<Utc>,
    pub schema_version: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn room_initialization() {
        let room = Room::new(1, "Library", "A room full of books.")
            .with_clue("Key")
            .with_suspect("The Butler");

        assert_eq!(room.name, "Library");
        assert_eq!(room.description, "A room full of books.");
        assert_eq!(room.clues.iter().collect::<Vec<_>>(), vec!["Key"]);
        assert_eq!(room.suspect.as_deref(), Some("The Butler"));
        assert!(!room.has_murderer());
    }

    #[test]
    fn take_clue_drains_in_sorted_order() {
        let mut room = Room::new(2, "Study", "")
            .with_clue("Torn Letter")
            .with_clue("Ashes");
        assert_eq!(room.take_clue().as_deref(), Some("Ashes"));
        assert_eq!(room.take_clue().as_deref(), Some("Torn Letter"));
        assert_eq!(room.take_clue(), None);
        assert!(!room.has_pending_clue());
    }

    #[test]
    fn interrogation_clue_counts_as_pending_only_with_suspect() {
        let mut room = Room::new(3, "Kitchen", "").with_interrogation_clue("Alibi");
        assert!(!room.has_pending_clue());
        room.suspect = Some("The Cook".into());
        assert!(room.has_pending_clue());
    }

    #[test]
    fn murderer_room_yields_nothing() {
        let room = Room::new(8, "Cellar", "")
            .with_clue("Cork")
            .with_suspect(MURDERER)
            .with_interrogation_clue("Confession");
        assert!(!room.has_pending_clue());
        assert_eq!(room.interrogation_reward(), None);
        assert_eq!(room.all_clues().count(), 0);
    }

    #[test]
    fn connection_normalizes_pair() {
        assert_eq!(Connection::new(5, 2), Connection::new(2, 5));
        assert_eq!(Connection::new(5, 2).from, 2);
    }
}
