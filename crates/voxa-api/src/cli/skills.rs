//! `voxa skills` and the `/skills` chat command: registered skill listing.

use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use serde::Serialize;

use voxa_core::skill::SkillRegistry;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct SkillListing {
    pub id: String,
    pub name: String,
    pub example: String,
    pub enabled: bool,
    pub available: bool,
}

/// Every registered skill, in registration order.
pub fn listings(registry: &SkillRegistry) -> Vec<SkillListing> {
    let ctx = registry.context();
    registry
        .infos()
        .iter()
        .map(|info| SkillListing {
            id: info.id().to_string(),
            name: info.name(ctx.locale).to_string(),
            example: info.sentence_example(ctx.locale).to_string(),
            enabled: registry.is_enabled(info.id()),
            available: info.is_available(ctx),
        })
        .collect()
}

pub fn skills_table(registry: &SkillRegistry) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Try saying").fg(Color::White),
        Cell::new("State").fg(Color::White),
    ]);

    for listing in listings(registry) {
        let state_cell = match (listing.enabled, listing.available) {
            (true, true) => Cell::new("enabled").fg(Color::Green),
            (true, false) => Cell::new("unavailable").fg(Color::Yellow),
            (false, _) => Cell::new("disabled").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&listing.id).fg(Color::Cyan),
            Cell::new(&listing.name).fg(Color::White),
            Cell::new(format!("\"{}\"", listing.example)).fg(Color::DarkGrey),
            state_cell,
        ]);
    }

    table
}

pub fn list_skills(state: &AppState, json: bool) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(&listings(&state.registry))?);
        return Ok(());
    }

    println!();
    println!("  {}", style("Skills").bold());
    println!();
    println!("{}", skills_table(&state.registry));
    Ok(())
}
