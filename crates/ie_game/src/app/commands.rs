use std::path::Path;

use anyhow::{bail, Context, Result};
use ie_engine::save::{SaveGame, DATE_ERROR};
use ie_engine::sim::NoStrings;
use ie_engine::{GameText, Table};
use serde::Serialize;
use tracing::info;

use super::bootstrap::AppWiring;

#[derive(Debug, Serialize)]
pub(crate) struct SlotSummary {
    pub(crate) save_id: u32,
    pub(crate) name: String,
    pub(crate) slot: String,
    pub(crate) path: String,
    pub(crate) date: String,
    pub(crate) game_date: String,
    pub(crate) portraits: usize,
}

impl SlotSummary {
    fn new(save: &SaveGame, text: &GameText<'_>) -> Self {
        Self {
            save_id: save.save_id(),
            name: save.name().to_string(),
            slot: save.slot_name(),
            path: save.path().display().to_string(),
            date: save.date().to_string(),
            game_date: save.game_date(text).to_string(),
            portraits: save.portrait_count(),
        }
    }
}

pub(crate) fn slot_summaries(wiring: &mut AppWiring) -> Result<Vec<SlotSummary>> {
    let text = GameText::new(&wiring.refs, &NoStrings);
    Ok(wiring
        .manager
        .save_games()
        .context("scanning save directory")?
        .iter()
        .map(|save| SlotSummary::new(save, &text))
        .collect())
}

pub(crate) fn list(wiring: &mut AppWiring, json: bool) -> Result<()> {
    let summaries = slot_summaries(wiring)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }
    if summaries.is_empty() {
        println!("no save slots in {}", wiring.config.save_config().save_dir_path().display());
        return Ok(());
    }
    for slot in &summaries {
        println!(
            "{:>9}  {:<28} {:<26} {}",
            slot.save_id, slot.name, slot.date, slot.game_date
        );
    }
    Ok(())
}

pub(crate) fn show(wiring: &mut AppWiring, name: &str, json: bool) -> Result<()> {
    let save = find(wiring, name)?;
    let text = GameText::new(&wiring.refs, &NoStrings);
    let summary = SlotSummary::new(&save, &text);

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }
    println!("slot       {}", summary.slot);
    println!("path       {}", summary.path);
    println!("saved      {}", summary.date);
    println!("game time  {}", summary.game_date);
    println!("portraits  {}", summary.portraits);
    if summary.game_date == DATE_ERROR {
        println!("warning    game state header is unreadable");
    }
    match save.preview() {
        Ok(Some(preview)) => println!("preview    {}x{}", preview.width(), preview.height()),
        Ok(None) => println!("preview    missing"),
        Err(error) => println!("preview    unreadable ({error})"),
    }
    Ok(())
}

pub(crate) fn delete(wiring: &mut AppWiring, name: &str) -> Result<()> {
    let save = find(wiring, name)?;
    wiring
        .manager
        .delete_save_game(Some(&*save))
        .with_context(|| format!("deleting save slot {}", save.slot_name()))?;
    info!(slot = %save.slot_name(), "slot_deleted_from_cli");
    println!("deleted {}", save.slot_name());
    Ok(())
}

pub(crate) fn prune_quick(
    wiring: &mut AppWiring,
    label: &str,
    base: u32,
    json: bool,
) -> Result<()> {
    wiring
        .manager
        .rescan_save_games()
        .context("scanning save directory")?;
    let plan = wiring
        .manager
        .prune_quick_save(label, base)
        .with_context(|| format!("rotating quick saves named {label}"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    if let Some(age) = plan.evict {
        println!("evicted age {age}");
    }
    for (from, to) in &plan.renames {
        println!("age {from} -> {to}");
    }
    if plan.evict.is_none() && plan.renames.is_empty() {
        println!("nothing to rotate for {label}");
    }
    Ok(())
}

pub(crate) fn table(path: &Path, cell: Option<(usize, usize)>) -> Result<()> {
    let table =
        Table::from_path(path).with_context(|| format!("reading table {}", path.display()))?;
    for line in table_lines(&table, cell) {
        println!("{line}");
    }
    Ok(())
}

/// One cell, or a header plus one line per row.
pub(crate) fn table_lines(table: &Table, cell: Option<(usize, usize)>) -> Vec<String> {
    if let Some((row, column)) = cell {
        return vec![table.query_field(row, column).to_string()];
    }

    let columns: Vec<&str> = (0..table.column_names_count())
        .map(|index| table.column_name(index))
        .collect();
    let mut lines = vec![
        format!(
            "{}: {} rows, {} columns, default \"{}\"",
            table.name(),
            table.row_count(),
            table.column_names_count(),
            table.query_default()
        ),
        format!("columns: {}", columns.join(" ")),
    ];
    for row in 0..table.row_count() {
        let cells: Vec<&str> = (0..table.column_count(row))
            .map(|column| table.query_field(row, column))
            .collect();
        lines.push(format!("{:<16} {}", table.row_name(row), cells.join(" ")));
    }
    lines
}

fn find(wiring: &mut AppWiring, name: &str) -> Result<std::rc::Rc<SaveGame>> {
    match wiring
        .manager
        .save_game(name)
        .context("scanning save directory")?
    {
        Some(save) => Ok(save),
        None => bail!(
            "no save slot named \"{name}\" in {}",
            wiring.config.save_config().save_dir_path().display()
        ),
    }
}
