//! Commands typed at the terminal host.

use anyhow::{anyhow, bail, Result};
use shared::{ActionMode, WindowId};

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Help,
    /// Lists open windows.
    List,
    /// Renders the focused window.
    Show,
    Focus(WindowId),
    Set { control: String, text: String },
    Pick { control: String, index: usize },
    Click { control: String },
    Close(ActionMode),
    Quit,
}

impl Command {
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        let (verb, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(verb, rest)| (verb, rest.trim()));

        let command = match verb.to_ascii_lowercase().as_str() {
            "help" | "?" => Command::Help,
            "list" | "ls" => Command::List,
            "show" => Command::Show,
            "focus" => {
                let id = rest
                    .trim_start_matches('#')
                    .parse::<i64>()
                    .map_err(|_| anyhow!("usage: focus <window id>"))?;
                Command::Focus(WindowId(id))
            }
            "set" => {
                let (control, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                if control.is_empty() {
                    bail!("usage: set <control> <text>");
                }
                Command::Set {
                    control: control.to_string(),
                    text: text.trim().to_string(),
                }
            }
            "pick" | "row" => {
                let mut parts = rest.split_whitespace();
                let (Some(control), Some(index)) = (parts.next(), parts.next()) else {
                    bail!("usage: {verb} <control> <index>");
                };
                let index = index
                    .parse::<usize>()
                    .map_err(|_| anyhow!("'{index}' is not a row index"))?;
                Command::Pick {
                    control: control.to_string(),
                    index,
                }
            }
            "click" => {
                if rest.is_empty() {
                    bail!("usage: click <control>");
                }
                Command::Click {
                    control: rest.to_string(),
                }
            }
            "close" => {
                if rest.is_empty() {
                    Command::Close(ActionMode::Cancel)
                } else {
                    let code = ActionMode::parse(rest).ok_or_else(|| anyhow!("unknown dialog result '{rest}'"))?;
                    Command::Close(code)
                }
            }
            "quit" | "exit" => Command::Quit,
            other => bail!("unknown command '{other}'; type 'help'"),
        };
        Ok(Some(command))
    }
}

pub const HELP: &str = "\
commands:
  list                     open windows
  show                     render the focused window
  focus <id>               focus a window
  set <control> <text>     type into a text box, combo or date picker
  pick <control> <index>   select a grid row or list item (alias: row)
  click <control>          press a button or menu item
  close [ok|cancel|...]    close the focused window with a dialog result
  quit                     close everything and exit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_the_rest_of_the_line() {
        let command = Command::parse("set edit.name  Mary Ann ").expect("parse");
        assert_eq!(
            command,
            Some(Command::Set {
                control: "edit.name".into(),
                text: "Mary Ann".into(),
            })
        );
    }

    #[test]
    fn close_defaults_to_cancel_and_parses_codes() {
        assert_eq!(Command::parse("close").expect("parse"), Some(Command::Close(ActionMode::Cancel)));
        assert_eq!(Command::parse("CLOSE ok").expect("parse"), Some(Command::Close(ActionMode::Ok)));
        assert!(Command::parse("close later").is_err());
    }

    #[test]
    fn focus_accepts_window_labels() {
        assert_eq!(Command::parse("focus #3").expect("parse"), Some(Command::Focus(WindowId(3))));
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        assert_eq!(Command::parse("   ").expect("parse"), None);
        assert_eq!(Command::parse("# replay").expect("parse"), None);
        assert!(Command::parse("row grid x").is_err());
        assert!(Command::parse("dance").is_err());
    }
}
