//! Text command parsing for the mystery game.

/// Player command categories for parsing and routing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameCommand {
    // Navigation
    Move(String),   // MOVE library, GO library, M library
    Look,           // L, LOOK
    Map,            // MAP - list every room and its exits
    Hint,           // HINT - shortest route to the next lead

    // Investigation
    GetClue,        // GET CLUE, GET, TAKE, G
    Interrogate,    // INTERROGATE, QUESTION, Q
    Confront,       // ACCUSE, CONFRONT
    Inventory,      // I, INV, INVENTORY

    // System
    Save,
    Help,
    Restart,
    Quit,

    // Unrecognized command (raw input)
    Unknown(String),
}

impl GameCommand {
    /// Parse raw input. Matching is case-insensitive; room names keep the
    /// player's spelling so feedback can echo it back.
    pub fn parse(input: &str) -> Self {
        let trimmed = input.trim();
        let parts: Vec<&str> = trimmed.split_whitespace().collect();

        let Some(first) = parts.first() else {
            return GameCommand::Unknown(String::new());
        };

        match first.to_ascii_uppercase().as_str() {
            "MOVE" | "GO" | "M" => {
                if parts.len() > 1 {
                    GameCommand::Move(parts[1..].join(" "))
                } else {
                    GameCommand::Unknown(trimmed.to_string())
                }
            }
            "GET" | "TAKE" | "G" => match parts.get(1) {
                None => GameCommand::GetClue,
                Some(word) if word.eq_ignore_ascii_case("clue") && parts.len() == 2 => {
                    GameCommand::GetClue
                }
                Some(_) => GameCommand::Unknown(trimmed.to_string()),
            },
            "INTERROGATE" | "QUESTION" | "Q" => GameCommand::Interrogate,
            "ACCUSE" | "CONFRONT" => GameCommand::Confront,
            "L" | "LOOK" => GameCommand::Look,
            "I" | "INV" | "INVENTORY" => GameCommand::Inventory,
            "MAP" => GameCommand::Map,
            "HINT" | "PATH" => GameCommand::Hint,
            "SAVE" => GameCommand::Save,
            "HELP" | "H" | "?" => GameCommand::Help,
            "RESTART" => GameCommand::Restart,
            "QUIT" | "EXIT" => GameCommand::Quit,
            _ => GameCommand::Unknown(trimmed.to_string()),
        }
    }
}

pub fn help_text() -> &'static str {
    "Commands:\n\
MOVE <room> - walk to an adjacent room\n\
GET CLUE - pick up a clue here\n\
INTERROGATE - question the suspect here\n\
ACCUSE - confront the suspect here\n\
LOOK, INV, MAP, HINT\n\
SAVE, RESTART, QUIT"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_keeps_room_spelling() {
        assert_eq!(
            GameCommand::parse("move Dining Room"),
            GameCommand::Move("Dining Room".into())
        );
        assert_eq!(
            GameCommand::parse("  GO   library "),
            GameCommand::Move("library".into())
        );
        assert_eq!(GameCommand::parse("m study"), GameCommand::Move("study".into()));
    }

    #[test]
    fn bare_move_is_unknown() {
        assert_eq!(GameCommand::parse("move"), GameCommand::Unknown("move".into()));
    }

    #[test]
    fn clue_aliases() {
        for input in ["get clue", "GET CLUE", "get", "take", "g"] {
            assert_eq!(GameCommand::parse(input), GameCommand::GetClue, "{}", input);
        }
        assert_eq!(
            GameCommand::parse("get lamp"),
            GameCommand::Unknown("get lamp".into())
        );
    }

    #[test]
    fn single_word_commands() {
        let cases = [
            ("interrogate", GameCommand::Interrogate),
            ("Q", GameCommand::Interrogate),
            ("accuse", GameCommand::Confront),
            ("look", GameCommand::Look),
            ("i", GameCommand::Inventory),
            ("map", GameCommand::Map),
            ("hint", GameCommand::Hint),
            ("save", GameCommand::Save),
            ("?", GameCommand::Help),
            ("restart", GameCommand::Restart),
            ("exit", GameCommand::Quit),
        ];
        for (input, expected) in cases {
            assert_eq!(GameCommand::parse(input), expected, "{}", input);
        }
    }

    #[test]
    fn empty_and_garbage() {
        assert_eq!(GameCommand::parse("   "), GameCommand::Unknown(String::new()));
        assert_eq!(
            GameCommand::parse("dance wildly"),
            GameCommand::Unknown("dance wildly".into())
        );
    }
}
