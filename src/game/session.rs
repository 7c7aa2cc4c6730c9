//! Game controller: one player's session over a world.
//!
//! `MysteryGame` owns the rooms, the room graph and the player's state. Every
//! action updates `feedback_message` with the text to show the player.

use std::collections::HashMap;

use log::{debug, info};

use crate::game::commands::{help_text, GameCommand};
use crate::game::errors::GameError;
use crate::game::graph::RoomGraph;
use crate::game::state::{GameState, Verdict};
use crate::game::storage::GameDatabase;
use crate::game::types::{PlayerId, Room, RoomId};
use crate::game::world::World;

pub const WELCOME_MESSAGE: &str = "Welcome to the game!\n\
Collect all the clues and find the murderer!\n\
Use commands like 'move library', 'get clue', or 'interrogate'.";
pub const WIN_MESSAGE: &str = "Congratulations! You found the murderer and solved the case!";
pub const LOSS_MESSAGE: &str =
    "You confronted the murderer before collecting all the clues. Game Over!";
pub const QUIT_MESSAGE: &str = "Thank you for playing! Please restart the app to play again.";
pub const RESTART_MESSAGE: &str = "The game has been reset.";
pub const GAME_OVER_MESSAGE: &str = "The game is over. Type RESTART to play again.";
pub const NO_CLUE_MESSAGE: &str = "There is no clue in this room!";
pub const NO_SUSPECT_MESSAGE: &str = "There is no one to interrogate in this room!";
pub const NOWHERE_MESSAGE: &str = "You are not in any room yet. Type MOVE <room> to enter.";

pub struct MysteryGame {
    pub rooms: HashMap<RoomId, Room>,
    pub graph: RoomGraph,
    pub state: GameState,
    pub game_started: bool,
    pub feedback_message: String,
    /// Set by QUIT. Lives only in the session and is never saved, so a quit
    /// game resumes where it left off.
    pub has_quit: bool,
    initial_rooms: HashMap<RoomId, Room>,
    start_room: RoomId,
}

impl MysteryGame {
    /// Build a fresh session from a world definition.
    pub fn new(world: World, player_id: PlayerId) -> Self {
        let graph = RoomGraph::from_connections(world.connections.iter().copied());
        let state = GameState::new(player_id, world.required_clues.iter().cloned());
        Self::from_parts(world.rooms, graph, state, world.start_room)
    }

    /// Assemble a session from already-built pieces.
    pub fn from_parts(
        rooms: Vec<Room>,
        graph: RoomGraph,
        state: GameState,
        start_room: RoomId,
    ) -> Self {
        let rooms: HashMap<RoomId, Room> = rooms.into_iter().map(|r| (r.id, r)).collect();
        Self {
            initial_rooms: rooms.clone(),
            rooms,
            graph,
            state,
            game_started: false,
            feedback_message: String::new(),
            has_quit: false,
            start_room,
        }
    }

    /// Load the stored world and, if present, the player's saved progress.
    ///
    /// The graph is filled through [`RoomGraph::preload_connections`] so the
    /// storage layer stays the single source of passages.
    pub async fn load(db: &GameDatabase, player_id: PlayerId) -> Result<Self, GameError> {
        let world = db.load_world().await?;
        let state = GameState::new(player_id, world.required_clues.iter().cloned());
        let mut graph = RoomGraph::new();
        graph.preload_connections(db.list_connections()).await?;
        let mut game = Self::from_parts(world.rooms, graph, state, world.start_room);

        if let Some(saved) = db.load_progress(player_id).await? {
            info!(
                "Restored progress for player {} ({} clues)",
                player_id,
                saved.inventory.len()
            );
            game.restore(saved);
        }
        Ok(game)
    }

    /// Persist the player's progress.
    pub async fn save(&self, db: &GameDatabase) -> Result<(), GameError> {
        db.save_progress(&self.state).await?;
        debug!("Saved progress for player {}", self.state.player_id);
        Ok(())
    }

    /// Adopt a saved state, removing already-collected clues from the rooms.
    pub fn restore(&mut self, saved: GameState) {
        for room in self.rooms.values_mut() {
            room.clues.retain(|clue| !saved.inventory.contains(clue));
            if room
                .interrogation_clue
                .as_ref()
                .is_some_and(|clue| saved.inventory.contains(clue))
            {
                room.interrogation_clue = None;
            }
        }
        self.game_started = saved.current_room.is_some();
        self.state = saved;
    }

    pub fn feedback(&self) -> &str {
        &self.feedback_message
    }

    fn say(&mut self, message: impl Into<String>) {
        self.feedback_message = message.into();
    }

    /// Whether game actions are refused: the case is closed or the player quit.
    pub fn is_over(&self) -> bool {
        self.state.game_over || self.has_quit
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.state.current_room.and_then(|id| self.rooms.get(&id))
    }

    /// Put the player in a room without adjacency checks (start, tests, loads).
    pub fn place_player(&mut self, room_id: RoomId) {
        self.state.current_room = Some(room_id);
    }

    pub fn room_by_name(&self, name: &str) -> Option<&Room> {
        let name = name.trim();
        self.rooms
            .values()
            .find(|room| room.name.eq_ignore_ascii_case(name))
    }

    fn room_name(&self, id: RoomId) -> String {
        self.rooms
            .get(&id)
            .map(|room| room.name.clone())
            .unwrap_or_else(|| format!("room {}", id))
    }

    pub fn start_game(&mut self) {
        self.game_started = true;
        self.place_player(self.start_room);
        self.say(WELCOME_MESSAGE);
    }

    pub fn move_to(&mut self, name: &str) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(target) = self.room_by_name(name) else {
            return self.say(format!("There is no room called {}.", name.trim()));
        };
        let (target_id, target_name) = (target.id, target.name.clone());

        if let Some(current) = self.state.current_room {
            if current == target_id {
                return self.say(format!("You are already in the {}.", target_name));
            }
            if !self.graph.is_connected(current, target_id) {
                return self.say(format!("You can't get to {} from here.", target_name));
            }
        }

        self.place_player(target_id);
        debug!(
            "Player {} moved to room {}",
            self.state.player_id, target_id
        );
        let arrived = format!("You moved to {}.", target_name);

        let murderer_here = self
            .rooms
            .get(&target_id)
            .is_some_and(Room::has_murderer);
        if murderer_here {
            self.confront();
            let outcome = std::mem::take(&mut self.feedback_message);
            self.say(format!("{}\n{}", arrived, outcome));
        } else {
            self.say(arrived);
        }
    }

    pub fn get_clue(&mut self) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(room_id) = self.state.current_room else {
            return self.say(NOWHERE_MESSAGE);
        };
        let taken = self.rooms.get_mut(&room_id).and_then(Room::take_clue);
        match taken {
            Some(clue) => {
                self.state.collect_clue(&clue);
                self.say(format!("You collected the clue: {}.", clue));
            }
            None => self.say(NO_CLUE_MESSAGE),
        }
    }

    pub fn interrogate(&mut self) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(room) = self.current_room() else {
            return self.say(NOWHERE_MESSAGE);
        };
        let Some(suspect) = room.suspect.clone() else {
            return self.say(NO_SUSPECT_MESSAGE);
        };
        if room.has_murderer() {
            return self.confront();
        }

        let room_id = room.id;
        let revealed = self
            .rooms
            .get_mut(&room_id)
            .and_then(|room| room.interrogation_clue.take());
        match revealed {
            Some(clue) => {
                self.state.collect_clue(&clue);
                self.say(format!(
                    "You are interrogating {}.\nYou obtained a clue from the interrogation: {}.",
                    suspect, clue
                ));
            }
            None => self.say(format!(
                "You are interrogating {}.\n{} didn't reveal any clues.",
                suspect, suspect
            )),
        }
    }

    /// Accuse whoever is in the room. Only the murderer ends the game.
    pub fn confront(&mut self) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(room) = self.current_room() else {
            return self.say(NOWHERE_MESSAGE);
        };
        let Some(suspect) = room.suspect.clone() else {
            return self.say("There is no one to confront here.");
        };
        if !room.has_murderer() {
            return self.say(format!("{} is innocent. Keep investigating.", suspect));
        }

        self.state.check_win_loss(true);
        info!(
            "Player {} confronted the murderer: {:?}",
            self.state.player_id,
            self.state.verdict()
        );
        match self.state.verdict() {
            Some(Verdict::Won) => self.say(WIN_MESSAGE),
            _ => self.say(LOSS_MESSAGE),
        }
    }

    /// Point the player at the nearest room that still has a lead, or at the
    /// murderer once nothing is left to find.
    pub fn hint(&mut self) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(current) = self.state.current_room else {
            return self.say(NOWHERE_MESSAGE);
        };

        let mut targets: Vec<RoomId> = self
            .rooms
            .values()
            .filter(|room| room.has_pending_clue())
            .map(|room| room.id)
            .collect();
        if targets.is_empty() {
            targets = self
                .rooms
                .values()
                .filter(|room| room.has_murderer())
                .map(|room| room.id)
                .collect();
        }
        if targets.contains(&current) {
            return self.say("There is something worth investigating right here.");
        }

        let best = targets
            .into_iter()
            .filter_map(|target| {
                let path = self.graph.find_shortest_path(current, target);
                (!path.is_empty()).then_some((path.len(), target, path))
            })
            .min_by_key(|(len, target, _)| (*len, *target));

        match best {
            Some((_, target, path)) => {
                let steps = path.len() - 1;
                self.say(format!(
                    "Head to the {}. The {} is {} room{} away.",
                    self.room_name(path[1]),
                    self.room_name(target),
                    steps,
                    if steps == 1 { "" } else { "s" }
                ))
            }
            None => self.say("No route leads anywhere useful from here."),
        }
    }

    pub fn look(&mut self) {
        if self.is_over() {
            return self.say(GAME_OVER_MESSAGE);
        }
        let Some(room) = self.current_room() else {
            return self.say(NOWHERE_MESSAGE);
        };
        let mut out = format!("{}\n{}", room.name, room.description);
        let exits: Vec<String> = self
            .graph
            .neighbors(room.id)
            .into_iter()
            .map(|id| self.room_name(id))
            .collect();
        if exits.is_empty() {
            out.push_str("\nThere are no exits.");
        } else {
            out.push_str(&format!("\nExits: {}", exits.join(", ")));
        }
        if !room.clues.is_empty() {
            out.push_str("\nSomething here looks like a clue.");
        }
        if let Some(suspect) = &room.suspect {
            out.push_str(&format!("\n{} is here.", suspect));
        }
        self.say(out);
    }

    pub fn inventory(&mut self) {
        if self.state.inventory.is_empty() {
            return self.say("You have not collected any clues yet.");
        }
        let held: Vec<&str> = self.state.inventory.iter().map(String::as_str).collect();
        let found = self
            .state
            .required_clues
            .intersection(&self.state.inventory)
            .count();
        self.say(format!(
            "Clues: {} ({}/{} needed)",
            held.join(", "),
            found,
            self.state.required_clues.len()
        ));
    }

    pub fn map(&mut self) {
        let mut ids: Vec<RoomId> = self.rooms.keys().copied().collect();
        ids.sort_unstable();
        let lines: Vec<String> = ids
            .into_iter()
            .map(|id| {
                let exits: Vec<String> = self
                    .graph
                    .neighbors(id)
                    .into_iter()
                    .map(|n| self.room_name(n))
                    .collect();
                let marker = if self.state.current_room == Some(id) { "*" } else { " " };
                format!("{}{}: {}", marker, self.room_name(id), exits.join(", "))
            })
            .collect();
        self.say(lines.join("\n"));
    }

    /// Put every clue back and forget the player's progress.
    pub fn restart_game(&mut self) {
        self.rooms = self.initial_rooms.clone();
        self.state.reset();
        self.game_started = false;
        self.has_quit = false;
        self.say(RESTART_MESSAGE);
    }

    pub fn quit_game(&mut self) {
        self.has_quit = true;
        self.say(QUIT_MESSAGE);
    }

    /// Parse and apply one line of player input. Returns the parsed command so
    /// the caller can act on `Save` and `Quit`, which need storage or exit.
    pub fn process_command(&mut self, input: &str) -> GameCommand {
        let command = GameCommand::parse(input);
        debug!(
            "Command parsed: player={} command={:?}",
            self.state.player_id, command
        );

        match &command {
            GameCommand::Move(name) => self.move_to(name),
            GameCommand::GetClue => self.get_clue(),
            GameCommand::Interrogate => self.interrogate(),
            GameCommand::Confront => self.confront(),
            GameCommand::Hint => self.hint(),
            GameCommand::Look => self.look(),
            GameCommand::Inventory => self.inventory(),
            GameCommand::Map => self.map(),
            GameCommand::Save => self.say("Saving your progress..."),
            GameCommand::Help => self.say(help_text()),
            GameCommand::Restart => self.restart_game(),
            GameCommand::Quit => self.quit_game(),
            GameCommand::Unknown(text) if text.is_empty() => {
                self.say("Type HELP for available commands.")
            }
            GameCommand::Unknown(text) => {
                let text = text.clone();
                self.say(format!(
                    "Unknown command: '{}'\nType HELP for available commands.",
                    text
                ))
            }
        }
        command
    }
}
