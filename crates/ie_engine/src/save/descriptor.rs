use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Local};
use image::{ImageReader, RgbaImage};
use once_cell::unsync::OnceCell;
use tracing::{error, warn};

use super::game_date::{format_game_date, DATE_ERROR};
use super::slots::SlotName;
use super::types::SaveError;
use crate::fs_util::resolve_case_insensitive;
use crate::sim::GameText;

/// Shown when the preview timestamp cannot be read.
pub const DUMMY_DATE: &str = "Sun 31 Feb 00:00:01 2099";

pub const PORTRAIT_PREFIX: &str = "PORTRT";

/// Where a game keeps its per-slot resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotLayout {
    /// Resource name shared by the preview, `.gam` and `.sav` files.
    pub prefix: String,
    /// One or two world-map resources; every one must be present.
    pub world_maps: Vec<String>,
    pub hour_seconds: u32,
}

impl SlotLayout {
    pub fn preview_file(&self) -> String {
        format!("{}.bmp", self.prefix)
    }

    pub fn world_map_files(&self) -> impl Iterator<Item = String> + '_ {
        self.world_maps.iter().map(|name| format!("{name}.wmp"))
    }

    /// A slot directory is usable only when its preview and every world map
    /// can be found.
    pub fn missing_resource(&self, slot_dir: &Path) -> Option<String> {
        std::iter::once(self.preview_file())
            .chain(self.world_map_files())
            .find(|file| resolve_case_insensitive(slot_dir, file).is_none())
    }
}

/// One save slot as found on disk by the last scan.
#[derive(Debug)]
pub struct SaveGame {
    path: PathBuf,
    slot: SlotName,
    layout: SlotLayout,
    portrait_count: usize,
    date: String,
    game_date: OnceCell<String>,
}

impl SaveGame {
    /// Builds the descriptor for an already validated slot directory.
    pub fn open(path: PathBuf, slot: SlotName, layout: SlotLayout) -> Self {
        let portrait_count = count_portraits(&path);
        let date = modification_date(&path.join(layout.preview_file()));
        Self {
            path,
            slot,
            layout,
            portrait_count,
            date,
            game_date: OnceCell::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Display name: the label part of the slot directory.
    pub fn name(&self) -> &str {
        &self.slot.label
    }

    pub fn prefix(&self) -> &str {
        &self.layout.prefix
    }

    pub fn slot_name(&self) -> String {
        self.slot.dir_name()
    }

    pub fn save_id(&self) -> u32 {
        self.slot.index
    }

    pub fn portrait_count(&self) -> usize {
        self.portrait_count
    }

    /// Preview modification time in the local `%c` format.
    pub fn date(&self) -> &str {
        &self.date
    }

    pub fn portrait(&self, index: usize) -> Result<Option<RgbaImage>, SaveError> {
        if index >= self.portrait_count {
            return Ok(None);
        }
        self.image(&format!("{PORTRAIT_PREFIX}{index}.bmp"))
    }

    pub fn preview(&self) -> Result<Option<RgbaImage>, SaveError> {
        self.image(&self.layout.preview_file())
    }

    pub fn game_stream(&self) -> Result<Vec<u8>, SaveError> {
        self.resource(&format!("{}.gam", self.layout.prefix))
    }

    pub fn save_stream(&self) -> Result<Vec<u8>, SaveError> {
        self.resource(&format!("{}.sav", self.layout.prefix))
    }

    pub fn world_map_stream(&self, index: usize) -> Result<Vec<u8>, SaveError> {
        let Some(name) = self.layout.world_maps.get(index) else {
            return Err(SaveError::MissingResource {
                slot: self.path.clone(),
                resource: format!("world map #{index}"),
            });
        };
        self.resource(&format!("{name}.wmp"))
    }

    /// In-game elapsed time, computed from the `.gam` header on first use.
    pub fn game_date(&self, text: &GameText<'_>) -> &str {
        self.game_date.get_or_init(|| match self.game_stream() {
            Ok(bytes) => format_game_date(&bytes, self.layout.hour_seconds, text),
            Err(error) => {
                warn!(slot = %self.path.display(), error = %error, "game_date_unavailable");
                DATE_ERROR.to_string()
            }
        })
    }

    fn resource(&self, file: &str) -> Result<Vec<u8>, SaveError> {
        let path = resolve_case_insensitive(&self.path, file).ok_or_else(|| {
            SaveError::MissingResource {
                slot: self.path.clone(),
                resource: file.to_string(),
            }
        })?;
        fs::read(&path).map_err(|source| SaveError::Io { path, source })
    }

    fn image(&self, file: &str) -> Result<Option<RgbaImage>, SaveError> {
        let Some(path) = resolve_case_insensitive(&self.path, file) else {
            return Ok(None);
        };
        let reader = ImageReader::open(&path).map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;
        let decoded = reader
            .decode()
            .map_err(|source| SaveError::DecodeImage { path, source })?;
        Ok(Some(decoded.to_rgba8()))
    }
}

impl PartialEq for SaveGame {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path && self.slot == other.slot
    }
}

fn count_portraits(dir: &Path) -> usize {
    let Ok(entries) = fs::read_dir(dir) else {
        return 0;
    };
    entries
        .flatten()
        .filter(|entry| {
            entry.file_name().to_str().is_some_and(|name| {
                name.get(..PORTRAIT_PREFIX.len())
                    .is_some_and(|head| head.eq_ignore_ascii_case(PORTRAIT_PREFIX))
            })
        })
        .count()
}

fn modification_date(preview: &Path) -> String {
    match fs::metadata(preview).and_then(|meta| meta.modified()) {
        Ok(modified) => format_local(modified),
        Err(source) => {
            error!(path = %preview.display(), error = %source, "save_date_stat_failed");
            DUMMY_DATE.to_string()
        }
    }
}

fn format_local(time: SystemTime) -> String {
    DateTime::<Local>::from(time).format("%c").to_string()
}
