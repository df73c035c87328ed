//! Welcome banner display for chat sessions.

use console::style;

use voxa_types::locale::Locale;

/// Print the welcome banner at the start of a chat session.
pub fn print_welcome_banner(locale: Locale, enabled_skills: usize, data_dir: &str) {
    println!();
    println!("  {} {}", style("~").cyan(), style("Voxa").cyan().bold());
    println!("  {}", style("Type what you would say out loud.").dim());
    println!();
    println!("  {}  {}", style("Locale:").bold(), style(locale).dim());
    println!("  {}  {}", style("Skills:").bold(), style(enabled_skills).dim());
    println!("  {}    {}", style("Data:").bold(), style(data_dir).dim());
    println!();
    println!("  {}", style("Type /help for commands, Ctrl+D to exit").dim());
    println!("  {}", style("---").dim());
    println!();
}
