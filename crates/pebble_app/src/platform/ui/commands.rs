use pebble_core::{Msg, SortField};

pub const HELP: &str = "\
commands:
  r | refresh        fetch quotes now
  /TEXT | filter TEXT  filter by symbol (remote search first)
  clear              remove the filter
  select SYM         show details for SYM
  sort FIELD         symbol, price, change, pct, volume (again to reverse)
  h | help           this text
  q | quit           exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Dispatch(Msg),
    Help,
    Quit,
    Unknown(String),
}

/// Parses one line of user input. Blank lines yield `None`.
pub fn parse(line: &str) -> Option<Command> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(text) = trimmed.strip_prefix('/') {
        return Some(Command::Dispatch(Msg::FilterChanged(text.to_string())));
    }

    let (word, rest) = match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (trimmed, ""),
    };
    let command = match word.to_ascii_lowercase().as_str() {
        "q" | "quit" | "exit" => Command::Quit,
        "h" | "help" | "?" => Command::Help,
        "r" | "refresh" => Command::Dispatch(Msg::RefreshRequested),
        "clear" => Command::Dispatch(Msg::FilterChanged(String::new())),
        "filter" | "f" => Command::Dispatch(Msg::FilterChanged(rest.to_string())),
        "select" | "s" if !rest.is_empty() => {
            Command::Dispatch(Msg::QuoteSelected(rest.to_string()))
        }
        "sort" => match SortField::from_name(rest) {
            Some(field) => Command::Dispatch(Msg::SortClicked(field)),
            None => Command::Unknown(trimmed.to_string()),
        },
        _ => Command::Unknown(trimmed.to_string()),
    };
    Some(command)
}
