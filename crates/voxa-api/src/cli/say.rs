//! One-shot utterance handling: `voxa say <utterance>`.

use console::style;

use crate::state::AppState;

use super::render::{ResponseView, print_response};

pub async fn say(state: &AppState, utterance: &str, json: bool) -> anyhow::Result<()> {
    let response = state.engine.process(utterance).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&ResponseView::from(&response))?);
        return Ok(());
    }

    print_response(&mut std::io::stdout(), &response)?;
    if let Some(skill) = &response.skill_id {
        println!("  {}", style(format!("[{skill}]")).dim());
    }
    Ok(())
}
