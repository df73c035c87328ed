//! Slash command parsing and help for the chat loop.
//!
//! Commands start with `/` and inspect or control the running assistant.

use std::io::Write;

use console::style;

/// Available slash commands in the chat loop.
#[derive(Debug, PartialEq)]
pub enum ChatCommand {
    /// Show available commands.
    Help,
    /// Clear the terminal screen.
    Clear,
    /// Exit the chat session.
    Exit,
    /// Show the interaction log.
    History,
    /// List running timers.
    Timers,
    /// Show background skill jobs and their latest outputs.
    Auto,
    /// List registered skills.
    Skills,
    /// Enable a skill by id.
    Enable(String),
    /// Disable a skill by id.
    Disable(String),
    /// Drop a pending follow-up question.
    Reset,
    /// Unknown command or missing argument.
    Unknown(String),
}

/// Parse user input as a slash command.
///
/// Returns `None` if the input doesn't start with `/`.
pub fn parse(input: &str) -> Option<ChatCommand> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let parts: Vec<&str> = trimmed.splitn(2, ' ').collect();
    let cmd = parts[0].to_lowercase();
    let arg = parts
        .get(1)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let command = match cmd.as_str() {
        "/help" | "/h" | "/?" => ChatCommand::Help,
        "/clear" | "/cls" => ChatCommand::Clear,
        "/exit" | "/quit" | "/q" => ChatCommand::Exit,
        "/history" => ChatCommand::History,
        "/timers" => ChatCommand::Timers,
        "/auto" => ChatCommand::Auto,
        "/skills" => ChatCommand::Skills,
        "/reset" => ChatCommand::Reset,
        "/enable" => match arg {
            Some(id) => ChatCommand::Enable(id),
            None => ChatCommand::Unknown("/enable requires a skill id".to_string()),
        },
        "/disable" => match arg {
            Some(id) => ChatCommand::Disable(id),
            None => ChatCommand::Unknown("/disable requires a skill id".to_string()),
        },
        other => ChatCommand::Unknown(other.to_string()),
    };
    Some(command)
}

/// Print the help text listing all available commands.
pub fn print_help(out: &mut impl Write) -> std::io::Result<()> {
    let rows = [
        ("/help", "Show this help message"),
        ("/clear", "Clear the screen"),
        ("/exit", "End the session"),
        ("/history", "Show the interaction log"),
        ("/timers", "List running timers"),
        ("/auto", "Show background skills and their latest output"),
        ("/skills", "List skills"),
        ("/enable <id>", "Enable a skill"),
        ("/disable <id>", "Disable a skill"),
        ("/reset", "Forget a pending follow-up question"),
    ];

    writeln!(out)?;
    writeln!(out, "  {}", style("Available commands:").bold())?;
    writeln!(out)?;
    for (command, description) in rows {
        writeln!(out, "  {:<16}{}", style(command).cyan(), description)?;
    }
    writeln!(out)?;
    writeln!(out, "  {}", style("Ctrl+D to exit").dim())?;
    writeln!(out)
}
