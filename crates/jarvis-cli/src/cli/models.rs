//! `jarvis models`: show the model catalog.

use anyhow::Result;
use comfy_table::{presets, Cell, Color, ContentArrangement, Table};
use console::style;

use jarvis_core::preferences::ModelCatalog;

/// Print the catalog as a table, or as JSON.
pub fn list_models(catalog: &ModelCatalog, json: bool) -> Result<()> {
    if json {
        let models: Vec<_> = catalog
            .models()
            .iter()
            .map(|m| {
                serde_json::json!({
                    "id": m.id,
                    "name": m.name,
                    "description": m.description,
                    "version": m.version,
                    "size": m.size,
                    "is_premium": m.is_premium,
                    "selected": catalog.is_selected(&m.id),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!();
    println!("{}", render_table(catalog));
    println!();
    println!(
        "  {} Pick one with {}",
        style("i").blue().bold(),
        style("jarvis chat --model <id>").yellow()
    );
    println!();
    Ok(())
}

pub fn render_table(catalog: &ModelCatalog) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec![
        Cell::new("").fg(Color::White),
        Cell::new("Id").fg(Color::White),
        Cell::new("Name").fg(Color::White),
        Cell::new("Description").fg(Color::White),
        Cell::new("Size").fg(Color::White),
        Cell::new("Tier").fg(Color::White),
    ]);

    for model in catalog.models() {
        let marker = if catalog.is_selected(&model.id) {
            Cell::new("●").fg(Color::Green)
        } else {
            Cell::new("")
        };
        let tier = if model.is_premium {
            Cell::new("premium").fg(Color::Yellow)
        } else {
            Cell::new("standard").fg(Color::DarkGrey)
        };
        table.add_row(vec![
            marker,
            Cell::new(&model.id).fg(Color::Cyan),
            Cell::new(&model.name),
            Cell::new(&model.description),
            Cell::new(model.size.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
            tier,
        ]);
    }
    table
}
