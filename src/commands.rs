//! Slash commands typed into the input box. They are handled locally; only
//! `/file` results in a message to the endpoint.

use ferret_core::FileMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Clear,
    /// `/copy <n>`; `None` when the argument is missing or not a number
    Copy(Option<usize>),
    /// `/file [--summary|--explain|--refactor] <path>`; `mode` is `None` for
    /// an unknown flag, `path` is `None` when it is missing
    File {
        mode: Option<FileMode>,
        path: Option<String>,
    },
    Theme,
    Exit,
}

pub const HELP: &str = "Enter send · Shift+Enter newline · Tab focus chat · \
    n/p pick code block · c copy · Ctrl+T theme · /clear /copy <n> \
    /file [--summary|--explain|--refactor] <path> /theme /exit";

pub const FILE_USAGE: &str = "Usage: /file [--summary|--explain|--refactor] <path>";

impl Command {
    /// Parse `input` as a command. Text that merely starts with a slash but
    /// names no known command is an ordinary message.
    pub fn parse(input: &str) -> Option<Command> {
        let input = input.trim();
        let rest = input.strip_prefix('/')?;
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "help" | "h" => Command::Help,
            "clear" => Command::Clear,
            "copy" => Command::Copy(arg.split_whitespace().next().and_then(|a| a.parse().ok())),
            "file" | "f" => parse_file(arg),
            "theme" => Command::Theme,
            "exit" | "quit" | "q" => Command::Exit,
            _ => return None,
        };
        Some(command)
    }
}

fn parse_file(arg: &str) -> Command {
    let (mode, path) = if arg.starts_with("--") {
        let (flag, path) = arg.split_once(char::is_whitespace).unwrap_or((arg, ""));
        (FileMode::from_flag(flag), path.trim())
    } else {
        (Some(FileMode::Normal), arg)
    };

    // the path is the rest of the line, so it may contain spaces
    let path = path.trim_matches('"');
    Command::File {
        mode,
        path: (!path.is_empty()).then(|| path.to_string()),
    }
}
