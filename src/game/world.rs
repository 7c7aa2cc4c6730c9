//! Canonical mansion layout and world validation.
//!
//! The canonical world is what `init` seeds into an empty store and what the
//! game falls back to when no seed file is configured.

use std::collections::{BTreeSet, HashSet};

use crate::game::errors::GameError;
use crate::game::types::{Connection, Room, RoomId, MURDERER};

pub const ENTRANCE_HALL_ID: RoomId = 1;
pub const LIBRARY_ID: RoomId = 2;
pub const BALLROOM_ID: RoomId = 3;
pub const DINING_ROOM_ID: RoomId = 4;
pub const KITCHEN_ID: RoomId = 5;
pub const CONSERVATORY_ID: RoomId = 6;
pub const STUDY_ID: RoomId = 7;
pub const WINE_CELLAR_ID: RoomId = 8;

/// Room ids seeded by [`canonical_world`], in id order.
pub const MANSION_ROOM_IDS: [RoomId; 8] = [
    ENTRANCE_HALL_ID,
    LIBRARY_ID,
    BALLROOM_ID,
    DINING_ROOM_ID,
    KITCHEN_ID,
    CONSERVATORY_ID,
    STUDY_ID,
    WINE_CELLAR_ID,
];

/// Everything needed to start a game: rooms, passages and the win requirement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct World {
    pub rooms: Vec<Room>,
    pub connections: Vec<Connection>,
    pub required_clues: Vec<String>,
    pub start_room: RoomId,
}

impl World {
    /// Reject layouts that could never be played to a win.
    pub fn validate(&self) -> Result<(), GameError> {
        let mut ids = HashSet::new();
        for room in &self.rooms {
            if !ids.insert(room.id) {
                return Err(GameError::InvalidWorld(format!(
                    "duplicate room id {}",
                    room.id
                )));
            }
        }
        if !ids.contains(&self.start_room) {
            return Err(GameError::InvalidWorld(format!(
                "start room {} does not exist",
                self.start_room
            )));
        }
        for connection in &self.connections {
            for end in [connection.from, connection.to] {
                if !ids.contains(&end) {
                    return Err(GameError::InvalidWorld(format!(
                        "connection {}-{} references unknown room {}",
                        connection.from, connection.to, end
                    )));
                }
            }
        }
        let available: BTreeSet<&String> = self.rooms.iter().flat_map(Room::all_clues).collect();
        if let Some(missing) = self
            .required_clues
            .iter()
            .find(|clue| !available.contains(clue))
        {
            return Err(GameError::InvalidWorld(format!(
                "required clue '{}' is not found in any room",
                missing
            )));
        }
        Ok(())
    }

    pub fn room(&self, id: RoomId) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }
}

/// The default eight-room mansion with six clues and one murderer.
pub fn canonical_world() -> World {
    let rooms = vec![
        Room::new(
            ENTRANCE_HALL_ID,
            "Entrance Hall",
            "A draughty hall with a cracked chandelier. Rain drums on the tall front doors.",
        ),
        Room::new(
            LIBRARY_ID,
            "Library",
            "Shelves of mouldering books climb to the ceiling. One shelf sits slightly ajar.",
        )
        .with_clue("Bloody Knife")
        .with_suspect("The Butler")
        .with_interrogation_clue("Secret Door Location"),
        Room::new(
            BALLROOM_ID,
            "Ballroom",
            "Dust sheets cover the piano. Confetti from last night's party still litters the floor.",
        )
        .with_clue("Torn Invitation"),
        Room::new(
            DINING_ROOM_ID,
            "Dining Room",
            "The long table is still set for twelve. One chair lies on its back.",
        )
        .with_clue("Poisoned Glass"),
        Room::new(
            KITCHEN_ID,
            "Kitchen",
            "Copper pans hang over a cold stove. A trapdoor in the floor leads downward.",
        )
        .with_suspect("The Cook"),
        Room::new(
            CONSERVATORY_ID,
            "Conservatory",
            "Glass panes fogged with damp. Someone has trampled the orchids.",
        )
        .with_clue("Muddy Footprint"),
        Room::new(
            STUDY_ID,
            "Study",
            "A desk buried in unpaid bills. The fire has burned down to embers.",
        )
        .with_suspect("The Maid")
        .with_interrogation_clue("Fingerprint"),
        Room::new(
            WINE_CELLAR_ID,
            "Wine Cellar",
            "Cold stone and the smell of spilled claret. A figure waits among the racks.",
        )
        .with_suspect(MURDERER),
    ];

    // Kept in (lower, higher) id order, the order the store returns them in.
    let connections = [
        (ENTRANCE_HALL_ID, LIBRARY_ID),
        (ENTRANCE_HALL_ID, BALLROOM_ID),
        (LIBRARY_ID, STUDY_ID),
        (BALLROOM_ID, DINING_ROOM_ID),
        (BALLROOM_ID, CONSERVATORY_ID),
        (DINING_ROOM_ID, KITCHEN_ID),
        (KITCHEN_ID, WINE_CELLAR_ID),
        (CONSERVATORY_ID, STUDY_ID),
        (STUDY_ID, WINE_CELLAR_ID),
    ]
    .into_iter()
    .map(|(a, b)| Connection::new(a, b))
    .collect();

    let required_clues = [
        "Bloody Knife",
        "Secret Door Location",
        "Torn Invitation",
        "Poisoned Glass",
        "Muddy Footprint",
        "Fingerprint",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    World {
        rooms,
        connections,
        required_clues,
        start_room: ENTRANCE_HALL_ID,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::graph::RoomGraph;

    #[test]
    fn canonical_world_is_valid() {
        let world = canonical_world();
        world.validate().expect("canonical world validates");
        let ids: Vec<RoomId> = world.rooms.iter().map(|r| r.id).collect();
        assert_eq!(ids, MANSION_ROOM_IDS);
        assert_eq!(world.required_clues.len(), 6);
    }

    #[test]
    fn every_room_is_reachable_from_the_entrance() {
        let world = canonical_world();
        let graph = RoomGraph::from_connections(world.connections.iter().copied());
        for id in MANSION_ROOM_IDS.iter().skip(1) {
            assert!(
                !graph.find_shortest_path(world.start_room, *id).is_empty(),
                "room {} unreachable",
                id
            );
        }
        assert_eq!(
            graph.find_shortest_path(ENTRANCE_HALL_ID, WINE_CELLAR_ID),
            vec![ENTRANCE_HALL_ID, LIBRARY_ID, STUDY_ID, WINE_CELLAR_ID]
        );
    }

    #[test]
    fn exactly_one_murderer() {
        let world = canonical_world();
        assert_eq!(world.rooms.iter().filter(|r| r.has_murderer()).count(), 1);
    }

    #[test]
    fn dangling_connection_is_rejected() {
        let mut world = canonical_world();
        world.connections.push(Connection::new(WINE_CELLAR_ID, 99));
        assert!(matches!(world.validate(), Err(GameError::InvalidWorld(_))));
    }

    #[test]
    fn unobtainable_clue_is_rejected() {
        let mut world = canonical_world();
        world.required_clues.push("Revolver".into());
        let err = world.validate().unwrap_err();
        assert!(err.to_string().contains("Revolver"));
    }
    #[test]
    fn interrogation_clue_without_suspect_is_rejected() {
        let world = World {
            rooms: vec![
                Room::new(1, "Hall", "").with_interrogation_clue("Key"),
                Room::new(2, "Cellar", "").with_suspect(MURDERER),
            ],
            connections: vec![Connection::new(1, 2)],
            required_clues: vec!["Key".into()],
            start_room: 1,
        };
        match world.validate() {
            Err(GameError::InvalidWorld(msg)) => assert!(msg.contains("Key")),
            other => panic!("expected invalid world, got {:?}", other),
        }
    }

    #[test]
    fn clue_held_by_the_murderer_is_rejected() {
        let world = World {
            rooms: vec![
                Room::new(1, "Hall", ""),
                Room::new(2, "Cellar", "")
                    .with_suspect(MURDERER)
                    .with_interrogation_clue("Confession"),
            ],
            connections: vec![Connection::new(1, 2)],
            required_clues: vec!["Confession".into()],
            start_room: 1,
        };
        assert!(matches!(world.validate(), Err(GameError::InvalidWorld(_))));
    }
}
