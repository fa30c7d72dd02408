use std::str::FromStr;

pub const HELP: &str = "\
Commands:
  scan             toggle scanning
  start            start a new scan (clears the list)
  stop             stop scanning, keep the list
  list             show the device list
  connect <N|ID>   connect to list entry N or device ID
  help             show this help
  quit             leave";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScreenCommand {
    Toggle,
    Start,
    Stop,
    List,
    Connect(String),
    Help,
    Quit,
}

impl FromStr for ScreenCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default().to_lowercase();

        let parsed = match command.as_str() {
            "scan" | "s" => ScreenCommand::Toggle,
            "start" => ScreenCommand::Start,
            "stop" => ScreenCommand::Stop,
            "list" | "ls" | "" => ScreenCommand::List,
            "connect" | "c" => match words.next() {
                Some(selector) => ScreenCommand::Connect(selector.to_string()),
                None => return Err("Usage: connect <N|ID>".to_string()),
            },
            "help" | "h" | "?" => ScreenCommand::Help,
            "quit" | "q" | "exit" => ScreenCommand::Quit,
            other => return Err(format!("Unknown command: {other}")),
        };

        Ok(parsed)
    }
}
