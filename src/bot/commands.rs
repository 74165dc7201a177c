//! Chat command parsing.

/// A parsed slash command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    AddFruit {
        name: String,
        price: String,
        description: String,
    },
    UpdateFruit {
        name: String,
        price: String,
        description: String,
    },
    DeleteFruit {
        name: String,
    },
    ListFruits,
    /// A known command with missing or malformed arguments.
    Invalid {
        usage: &'static str,
    },
    /// Not a command this bot knows.
    Unknown,
}

pub const ADD_USAGE: &str = "/addfruit <tên> <giá> <mô tả>";
pub const UPDATE_USAGE: &str = "/updatefruit <tên> <giá> <mô tả>";
pub const DELETE_USAGE: &str = "/deletefruit <tên>";

impl Command {
    /// True for commands that touch the catalog and therefore pass the
    /// admin gate.
    pub fn requires_admin(&self) -> bool {
        matches!(
            self,
            Command::AddFruit { .. }
                | Command::UpdateFruit { .. }
                | Command::DeleteFruit { .. }
                | Command::ListFruits
        )
    }

    /// Parse a message text. Returns `None` when the text is not a slash
    /// command at all (plain chatter is not an error).
    pub fn parse(text: &str) -> Option<Command> {
        let text = text.trim();
        if !text.starts_with('/') {
            return None;
        }

        let mut words = text.split_whitespace();
        let head = words.next()?;
        // "/addfruit@MyBot" addresses this bot in a group chat.
        let name = head[1..].split('@').next().unwrap_or_default();

        let command = match name {
            "start" => Command::Start,
            "help" => Command::Help,
            "addfruit" => parse_upsert(words, true),
            "updatefruit" => parse_upsert(words, false),
            "deletefruit" => {
                let name = words.collect::<Vec<_>>().join(" ");
                if name.is_empty() {
                    Command::Invalid {
                        usage: DELETE_USAGE,
                    }
                } else {
                    Command::DeleteFruit { name }
                }
            }
            "listfruits" => Command::ListFruits,
            _ => Command::Unknown,
        };

        Some(command)
    }
}

fn parse_upsert<'a>(mut words: impl Iterator<Item = &'a str>, is_add: bool) -> Command {
    let usage = if is_add { ADD_USAGE } else { UPDATE_USAGE };

    let (Some(name), Some(price)) = (words.next(), words.next()) else {
        return Command::Invalid { usage };
    };
    let description = words.collect::<Vec<_>>().join(" ");
    if description.is_empty() {
        return Command::Invalid { usage };
    }

    let name = name.to_string();
    let price = price.to_string();
    if is_add {
        Command::AddFruit {
            name,
            price,
            description,
        }
    } else {
        Command::UpdateFruit {
            name,
            price,
            description,
        }
    }
}
