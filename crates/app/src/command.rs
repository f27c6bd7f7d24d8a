use std::path::PathBuf;

/// One line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Text typed into the composer. `submit` is false when the line ended in `\`
    /// (Shift+Enter), which keeps the newline and waits for more input.
    Compose { text: String, submit: bool },
    Attach(Vec<PathBuf>),
    Remove(String),
    View,
    Help,
    Quit,
    Unknown(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);

        if let Some(rest) = line.strip_prefix('/') {
            let mut parts = rest.split_whitespace();
            let name = parts.next().unwrap_or_default();
            return match name {
                "attach" => Self::Attach(parts.map(PathBuf::from).collect()),
                "remove" => Self::Remove(parts.collect::<Vec<_>>().join(" ")),
                "view" => Self::View,
                "help" => Self::Help,
                "quit" | "exit" => Self::Quit,
                _ => Self::Unknown(name.to_string()),
            };
        }

        match line.strip_suffix('\\') {
            Some(text) => Self::Compose {
                text: text.to_string(),
                submit: false,
            },
            None => Self::Compose {
                text: line.to_string(),
                submit: true,
            },
        }
    }
}

pub const HELP: &str = "\
Type a message and press Enter to send. End a line with \\ to continue on the next line.
  /attach <path>...   add files to the next message
  /remove <id>        drop a pending attachment
  /view               redraw the conversation
  /quit               leave";
