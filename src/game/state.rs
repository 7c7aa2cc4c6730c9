//! Player progress: inventory, required clues, location and terminal flags.

use std::collections::BTreeSet;

use chrono::Utc;

use crate::game::types::{PlayerId, RoomId, SaveRecord, SAVE_SCHEMA_VERSION};

/// Outcome of a confrontation with the murderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Won,
    Lost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameState {
    pub player_id: PlayerId,
    pub inventory: BTreeSet<String>,
    pub required_clues: BTreeSet<String>,
    pub current_room: Option<RoomId>,
    pub suspect_confronted: bool,
    pub won: bool,
    pub lost: bool,
    pub game_over: bool,
}

impl GameState {
    pub fn new<I, S>(player_id: PlayerId, required_clues: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            player_id,
            inventory: BTreeSet::new(),
            required_clues: required_clues.into_iter().map(Into::into).collect(),
            current_room: None,
            suspect_confronted: false,
            won: false,
            lost: false,
            game_over: false,
        }
    }

    /// Add a clue to the inventory; returns false if it was already held.
    pub fn collect_clue(&mut self, clue: &str) -> bool {
        self.inventory.insert(clue.to_string())
    }

    pub fn has_all_clues(&self) -> bool {
        self.inventory.is_superset(&self.required_clues)
    }

    pub fn missing_clues(&self) -> Vec<String> {
        self.required_clues
            .difference(&self.inventory)
            .cloned()
            .collect()
    }

    /// Resolve the end of the game once the murderer has been found.
    ///
    /// Returns whether the game ended. Meeting the murderer always ends it;
    /// holding every required clue at that moment decides win or loss.
    pub fn check_win_loss(&mut self, is_murderer_found: bool) -> bool {
        if !is_murderer_found {
            return false;
        }
        self.suspect_confronted = true;
        if self.has_all_clues() {
            self.won = true;
        } else {
            self.lost = true;
        }
        self.game_over = true;
        true
    }

    pub fn verdict(&self) -> Option<Verdict> {
        if self.won {
            Some(Verdict::Won)
        } else if self.lost {
            Some(Verdict::Lost)
        } else {
            None
        }
    }

    /// Clear progress, keeping the player id and the win requirements.
    pub fn reset(&mut self) {
        self.inventory.clear();
        self.current_room = None;
        self.suspect_confronted = false;
        self.won = false;
        self.lost = false;
        self.game_over = false;
    }

    pub fn to_save_record(&self) -> SaveRecord {
        SaveRecord {
            player_id: self.player_id,
            inventory: self.inventory.iter().cloned().collect(),
            required_clues: self.required_clues.iter().cloned().collect(),
            current_room: self.current_room,
            suspect_confronted: self.suspect_confronted,
            won: self.won,
            lost: self.lost,
            game_over: self.game_over,
            saved_at: Utc::now(),
            schema_version: SAVE_SCHEMA_VERSION,
        }
    }

    pub fn from_save_record(record: SaveRecord) -> Self {
        Self {
            player_id: record.player_id,
            inventory: record.inventory.into_iter().collect(),
            required_clues: record.required_clues.into_iter().collect(),
            current_room: record.current_room,
            suspect_confronted: record.suspect_confronted,
            won: record.won,
            lost: record.lost,
            game_over: record.game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REQUIRED: [&str; 3] = ["Key", "Knife", "Fingerprint"];

    #[test]
    fn murderer_with_all_clues_wins() {
        let mut state = GameState::new(1, REQUIRED);
        for clue in REQUIRED {
            state.collect_clue(clue);
        }
        assert!(state.check_win_loss(true));
        assert!(state.game_over);
        assert_eq!(state.verdict(), Some(Verdict::Won));
    }

    #[test]
    fn murderer_without_clues_still_ends_game() {
        let mut state = GameState::new(1, REQUIRED);
        assert!(state.check_win_loss(true));
        assert!(state.game_over);
        assert!(state.lost);
        assert_eq!(state.verdict(), Some(Verdict::Lost));
    }

    #[test]
    fn no_murderer_changes_nothing() {
        let mut state = GameState::new(1, REQUIRED);
        assert!(!state.check_win_loss(false));
        assert!(!state.game_over);
        assert_eq!(state.verdict(), None);
    }

    #[test]
    fn missing_clues_are_sorted() {
        let mut state = GameState::new(7, REQUIRED);
        assert!(state.collect_clue("Knife"));
        assert!(!state.collect_clue("Knife"));
        assert_eq!(state.missing_clues(), vec!["Fingerprint", "Key"]);
        assert!(!state.has_all_clues());
    }

    #[test]
    fn reset_keeps_requirements() {
        let mut state = GameState::new(3, REQUIRED);
        state.collect_clue("Key");
        state.current_room = Some(4);
        state.check_win_loss(true);
        state.reset();
        assert!(state.inventory.is_empty());
        assert_eq!(state.current_room, None);
        assert!(!state.game_over);
        assert_eq!(state.player_id, 3);
        assert_eq!(state.required_clues.len(), 3);
    }

    #[test]
    fn save_record_preserves_progress() {
        let mut state = GameState::new(1, REQUIRED);
        state.collect_clue("Key");
        state.current_room = Some(2);
        let record = state.to_save_record();
        assert_eq!(record.inventory, vec!["Key"]);
        assert_eq!(record.schema_version, SAVE_SCHEMA_VERSION);
        assert_eq!(GameState::from_save_record(record), state);
    }
}
