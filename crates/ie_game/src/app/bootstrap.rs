use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ie_engine::{EngineConfig, SaveSlotManager, SlotNameTable, StringRefs};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// Name of the table mapping message keys to string references.
const STRING_REFS_TABLE: &str = "strings";

pub(crate) struct AppWiring {
    pub(crate) config: EngineConfig,
    pub(crate) config_path: PathBuf,
    pub(crate) manager: SaveSlotManager,
    pub(crate) refs: StringRefs,
}

pub(crate) fn build_app(config_path: Option<&Path>) -> Result<AppWiring> {
    let (config, config_path) = EngineConfig::load(config_path).context("loading engine config")?;
    info!(
        config = %config_path.display(),
        game_type = %config.game_type,
        save_dir = %config.save_config().save_dir_path().display(),
        "engine_config_ready"
    );

    let store = config.table_store();
    let mut manager = SaveSlotManager::new(config.save_config());
    if let Some(names) = SlotNameTable::load(&store).context("loading savegame table")? {
        manager = manager.with_slot_names(names);
    }
    let refs = store
        .load_optional(STRING_REFS_TABLE)
        .context("loading string reference table")?
        .map(|table| StringRefs::from_table(&table))
        .unwrap_or_default();
    debug!(search_dirs = ?store.search_dirs(), "tables_ready");

    Ok(AppWiring {
        config,
        config_path,
        manager,
        refs,
    })
}

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
