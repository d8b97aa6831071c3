use once_cell::sync::Lazy;
use regex::Regex;

/// `/name` or `/name@botname`, optionally followed by arguments
static COMMAND: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^/([A-Za-z0-9_]+)(?:@[A-Za-z0-9_]+)?(?:\s|$)").expect("Hardcode regex pattern")
});

/// An inbound text message, classified.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Start,
    Help,
    Reload,
    Report,
    Unknown(String),
    /// Anything that is not a command is a lookup query
    Query(String),
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(captures) = COMMAND.captures(text) else {
            return if text.starts_with('/') {
                Command::Unknown(text.to_owned())
            } else {
                Command::Query(text.to_owned())
            };
        };
        match captures[1].to_ascii_lowercase().as_str() {
            "start" => Command::Start,
            "help" => Command::Help,
            "reload" => Command::Reload,
            "report" => Command::Report,
            other => Command::Unknown(other.to_owned()),
        }
    }
}
