//! Typed command lines and their translation into messages.

use std::time::Duration;

use compare_core::{AppState, ListId, Msg, RemoveGesture};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  type <1|2> <text>        set the input of a list
  add <1|2> [text]         add the input (or text) to a list
  remove <1|2> <pos>       remove the entry at a position
  hold <1|2> <pos> <ms>    press and hold an entry
  search | stop | save     session controls
  show | help | quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Type { list: ListId, text: String },
    Add { list: ListId, text: Option<String> },
    Remove { list: ListId, position: usize },
    Hold { list: ListId, position: usize, held: Duration },
    Search,
    Stop,
    Save,
    Show,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("empty command")]
    Empty,
    #[error("unknown command `{0}`, type `help`")]
    Unknown(String),
    #[error("expected list 1 or 2, got `{0}`")]
    BadList(String),
    #[error("expected a position starting at 1, got `{0}`")]
    BadPosition(String),
    #[error("expected a duration in milliseconds, got `{0}`")]
    BadDuration(String),
    #[error("missing argument: {0}")]
    Missing(&'static str),
    #[error("list {list} has no entry at position {position}")]
    NoEntry { list: u8, position: usize },
}

pub fn parse(line: &str) -> Result<Command, CommandError> {
    let line = line.trim();
    let (word, rest) = split_word(line);
    match word.to_ascii_lowercase().as_str() {
        "" => Err(CommandError::Empty),
        "type" => {
            let (list, text) = split_word(rest);
            Ok(Command::Type {
                list: parse_list(list)?,
                text: text.to_string(),
            })
        }
        "add" => {
            let (list, text) = split_word(rest);
            Ok(Command::Add {
                list: parse_list(list)?,
                text: (!text.is_empty()).then(|| text.to_string()),
            })
        }
        "remove" => {
            let mut args = rest.split_whitespace();
            Ok(Command::Remove {
                list: parse_list(args.next().unwrap_or_default())?,
                position: parse_position(args.next())?,
            })
        }
        "hold" => {
            let mut args = rest.split_whitespace();
            let list = parse_list(args.next().unwrap_or_default())?;
            let position = parse_position(args.next())?;
            let millis = args.next().ok_or(CommandError::Missing("hold duration"))?;
            let millis: u64 = millis
                .parse()
                .map_err(|_| CommandError::BadDuration(millis.to_string()))?;
            Ok(Command::Hold {
                list,
                position,
                held: Duration::from_millis(millis),
            })
        }
        "search" => Ok(Command::Search),
        "stop" => Ok(Command::Stop),
        "save" => Ok(Command::Save),
        "show" => Ok(Command::Show),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        other => Err(CommandError::Unknown(other.to_string())),
    }
}

impl Command {
    /// Messages this command stands for. Positions are resolved against the
    /// list as it is now.
    pub fn into_msgs(self, state: &AppState) -> Result<Vec<Msg>, CommandError> {
        let msgs = match self {
            Command::Type { list, text } => vec![Msg::InputChanged { list, text }],
            Command::Add { list, text: None } => vec![Msg::AddClicked { list }],
            Command::Add {
                list,
                text: Some(text),
            } => vec![Msg::InputChanged { list, text }, Msg::AddClicked { list }],
            Command::Remove { list, position } => vec![Msg::EntryGesture {
                list,
                entry: resolve_entry(state, list, position)?,
                gesture: RemoveGesture::DoubleActivation,
            }],
            Command::Hold {
                list,
                position,
                held,
            } => vec![Msg::EntryGesture {
                list,
                entry: resolve_entry(state, list, position)?,
                gesture: RemoveGesture::Press { held },
            }],
            Command::Search => vec![Msg::SearchClicked],
            Command::Stop => vec![Msg::StopClicked],
            Command::Save => vec![Msg::SaveClicked],
            Command::Show | Command::Help | Command::Quit => Vec::new(),
        };
        Ok(msgs)
    }
}

fn split_word(text: &str) -> (&str, &str) {
    let text = text.trim_start();
    match text.find(char::is_whitespace) {
        Some(idx) => (&text[..idx], text[idx..].trim_start()),
        None => (text, ""),
    }
}

fn parse_list(word: &str) -> Result<ListId, CommandError> {
    if word.is_empty() {
        return Err(CommandError::Missing("list number"));
    }
    word.parse::<u8>()
        .ok()
        .and_then(ListId::from_number)
        .ok_or_else(|| CommandError::BadList(word.to_string()))
}

fn parse_position(word: Option<&str>) -> Result<usize, CommandError> {
    let word = word.ok_or(CommandError::Missing("position"))?;
    match word.parse::<usize>() {
        Ok(position) if position >= 1 => Ok(position),
        _ => Err(CommandError::BadPosition(word.to_string())),
    }
}

fn resolve_entry(
    state: &AppState,
    list: ListId,
    position: usize,
) -> Result<compare_core::EntryId, CommandError> {
    state
        .list(list)
        .entry_at(position - 1)
        .ok_or(CommandError::NoEntry {
            list: list_number(list),
            position,
        })
}

fn list_number(list: ListId) -> u8 {
    match list {
        ListId::First => 1,
        ListId::Second => 2,
    }
}
