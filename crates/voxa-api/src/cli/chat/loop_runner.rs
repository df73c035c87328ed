//! Main chat loop orchestration.
//!
//! Sets up readline input, wires the assistant's speech output to the
//! readline writer (so countdowns spoken by background timers don't
//! clobber the prompt), then feeds each submitted line to the engine.

use std::io::Write;
use std::sync::Arc;

use console::style;
use rustyline_async::SharedWriter;

use voxa_infra::speech::ConsoleSpeech;

use crate::cli::render::{format_remaining, print_response};
use crate::cli::skills::skills_table;
use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

fn user_prompt(awaiting_answer: bool) -> String {
    if awaiting_answer {
        format!("  {} ", style("You (answer) >").yellow().bold())
    } else {
        format!("  {} ", style("You >").green().bold())
    }
}

/// Run the interactive chat loop.
pub async fn run_chat_loop() -> anyhow::Result<()> {
    let (mut chat_input, writer) = ChatInput::new(user_prompt(false))
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    let speech = ConsoleSpeech::new(
        Box::new(writer.clone()),
        format!("  {} ", style("Voxa >").cyan().bold()),
    );
    let state = AppState::init(Arc::new(speech)).await?;

    print_welcome_banner(
        state.config.locale,
        state.registry.enabled().len(),
        &state.data_dir.display().to_string(),
    );

    let result = chat(&state, &mut chat_input, writer).await;

    state.shutdown().await;
    chat_input.flush();
    result
}

async fn chat(
    state: &AppState,
    chat_input: &mut ChatInput,
    mut out: SharedWriter,
) -> anyhow::Result<()> {
    loop {
        let text = match chat_input.read_line().await {
            InputEvent::Eof => {
                writeln!(out, "\n  {}", style("Session ended.").dim())?;
                return Ok(());
            }
            InputEvent::Interrupted => {
                writeln!(out, "\n  {}", style("Press Ctrl+D to exit, or keep talking.").dim())?;
                continue;
            }
            InputEvent::Message(text) => text,
        };
        if text.is_empty() {
            continue;
        }

        if let Some(cmd) = commands::parse(&text) {
            if cmd == ChatCommand::Exit {
                writeln!(out, "\n  {}", style("Session ended.").dim())?;
                return Ok(());
            }
            if cmd == ChatCommand::Clear {
                chat_input.clear();
                continue;
            }
            run_command(state, cmd, &mut out).await?;
            if state.engine.pending_skill_ids().await.is_none() {
                chat_input.update_prompt(&user_prompt(false));
            }
            continue;
        }

        let response = state.engine.process(&text).await;
        print_response(&mut out, &response)?;
        chat_input.update_prompt(&user_prompt(response.reopen_microphone));
    }
}

async fn run_command(
    state: &AppState,
    cmd: ChatCommand,
    out: &mut impl Write,
) -> anyhow::Result<()> {
    match cmd {
        ChatCommand::Help => commands::print_help(out)?,
        ChatCommand::History => {
            let log = state.engine.log().await;
            writeln!(out)?;
            if log.is_empty() {
                writeln!(out, "  {}", style("Nothing said yet.").dim())?;
            }
            for (i, interaction) in log.interactions().iter().enumerate() {
                writeln!(out, "  {}", style(format!("#{}", i + 1)).bold())?;
                for exchange in &interaction.exchanges {
                    writeln!(
                        out,
                        "    {} {}",
                        style("You").green(),
                        exchange.question
                    )?;
                    writeln!(
                        out,
                        "    {} {} {}",
                        style("Voxa").cyan(),
                        exchange.answer,
                        style(format!("[{}]", exchange.skill_id.as_deref().unwrap_or("-"))).dim()
                    )?;
                }
            }
            writeln!(out)?;
        }
        ChatCommand::Timers => {
            let timers = state.timers.snapshot();
            writeln!(out)?;
            if timers.is_empty() {
                writeln!(out, "  {}", style("No running timers.").dim())?;
            }
            for timer in timers {
                let remaining = if timer.is_expired() {
                    style("ringing".to_string()).red().bold()
                } else {
                    style(format_remaining(timer.remaining_ms)).white()
                };
                writeln!(
                    out,
                    "  {} {}  {}",
                    style("*").cyan(),
                    timer.name.as_deref().unwrap_or("timer"),
                    remaining
                )?;
            }
            writeln!(out)?;
        }
        ChatCommand::Auto => {
            let outputs = state.scheduler.snapshot();
            writeln!(out)?;
            let jobs = state.scheduler.active_jobs();
            if jobs.is_empty() {
                writeln!(out, "  {}", style("No background skills running.").dim())?;
            }
            for (skill, interval) in jobs {
                let latest = outputs
                    .get(&skill)
                    .map(|output| output.speech.clone())
                    .unwrap_or_else(|| "(pending)".to_string());
                writeln!(
                    out,
                    "  {} {} {}  {}",
                    style("*").cyan(),
                    skill,
                    style(format!("every {}s", interval.as_secs())).dim(),
                    latest
                )?;
            }
            writeln!(out)?;
        }
        ChatCommand::Skills => {
            writeln!(out, "\n{}\n", skills_table(&state.registry))?;
        }
        ChatCommand::Enable(id) | ChatCommand::Disable(id) if state.registry.info(&id).is_none() => {
            writeln!(out, "\n  {} Unknown skill: {}\n", style("?").yellow().bold(), style(id).dim())?;
        }
        ChatCommand::Enable(id) => {
            state.registry.set_skill_enabled(&id, true)?;
            writeln!(out, "\n  {} Enabled {}\n", style("+").green().bold(), style(id).cyan())?;
        }
        ChatCommand::Disable(id) => {
            state.registry.set_skill_enabled(&id, false)?;
            writeln!(out, "\n  {} Disabled {}\n", style("-").red().bold(), style(id).cyan())?;
        }
        ChatCommand::Reset => {
            state.engine.reset().await;
            writeln!(out, "\n  {}\n", style("Follow-up dropped.").dim())?;
        }
        ChatCommand::Unknown(cmd_name) => {
            writeln!(
                out,
                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                style("?").yellow().bold(),
                style(cmd_name).dim()
            )?;
        }
        ChatCommand::Clear | ChatCommand::Exit => {}
    }
    Ok(())
}
