use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{ImageFormat, RgbaImage};
use tracing::{debug, info};

use super::descriptor::{SaveGame, PORTRAIT_PREFIX};
use super::types::SaveError;

/// Factor applied to each side of the screenshot before it becomes the
/// slot preview.
pub const PREVIEW_SCALE_DOWN: u32 = 5;

/// The game-side serializers a save needs. Each step writes into the cache
/// or the slot directory and reports failure as an error.
pub trait SaveWriter {
    /// Flushes every loaded, modified area back to the cache.
    fn swap_out_areas(&mut self) -> Result<(), SaveError>;
    fn save_stores(&mut self) -> Result<(), SaveError>;
    /// Packs cached area and store files into the slot. `override_running`
    /// is set when the extractor was working on the slot being replaced.
    fn compress_save(&mut self, slot_dir: &Path, override_running: bool) -> Result<(), SaveError>;
    fn write_game(&mut self, slot_dir: &Path) -> Result<(), SaveError>;
    fn write_world_map(&mut self, slot_dir: &Path) -> Result<(), SaveError>;
    /// Party portraits in party order; `None` for members without one.
    fn portraits(&self) -> Vec<Option<RgbaImage>>;
    fn screenshot(&self) -> Option<RgbaImage>;
}

/// Background extraction of area data from the active save.
pub trait AreaExtractor {
    fn is_running_save_game(&self, save: &SaveGame) -> bool;
    /// Synchronously flushes the extractor's cache.
    fn create_cache_blob(&mut self) -> Result<(), SaveError>;
}

/// Extractor for sessions without background extraction.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoExtractor;

impl AreaExtractor for NoExtractor {
    fn is_running_save_game(&self, _save: &SaveGame) -> bool {
        false
    }

    fn create_cache_blob(&mut self) -> Result<(), SaveError> {
        Ok(())
    }
}

/// Writes a complete save into `slot_dir`, stopping at the first failed
/// step.
pub fn do_save_game(
    writer: &mut dyn SaveWriter,
    slot_dir: &Path,
    prefix: &str,
    override_running: bool,
) -> Result<(), SaveError> {
    writer.swap_out_areas()?;
    writer.save_stores()?;
    writer.compress_save(slot_dir, override_running)?;
    writer.write_game(slot_dir)?;
    writer.write_world_map(slot_dir)?;

    let mut portraits = 0usize;
    for (index, portrait) in writer.portraits().iter().enumerate() {
        let Some(portrait) = portrait else {
            continue;
        };
        write_bmp(slot_dir, &format!("{PORTRAIT_PREFIX}{index}.bmp"), portrait)?;
        portraits += 1;
    }

    let screenshot = writer
        .screenshot()
        .ok_or_else(|| SaveError::writer("screenshot", "no game window to capture"))?;
    let preview = scale_down(&screenshot, PREVIEW_SCALE_DOWN);
    write_bmp(slot_dir, &format!("{prefix}.bmp"), &preview)?;

    info!(
        slot = %slot_dir.display(),
        portraits,
        preview_width = preview.width(),
        preview_height = preview.height(),
        "save_written"
    );
    Ok(())
}

pub fn scale_down(image: &RgbaImage, factor: u32) -> RgbaImage {
    let factor = factor.max(1);
    let width = (image.width() / factor).max(1);
    let height = (image.height() / factor).max(1);
    imageops::resize(image, width, height, FilterType::Triangle)
}

fn write_bmp(slot_dir: &Path, file_name: &str, image: &RgbaImage) -> Result<(), SaveError> {
    let mut encoded = Cursor::new(Vec::new());
    image
        .write_to(&mut encoded, ImageFormat::Bmp)
        .map_err(|source| SaveError::EncodeImage {
            path: slot_dir.join(file_name),
            source,
        })?;
    let path = write_slot_file(slot_dir, file_name, encoded.get_ref())?;
    debug!(path = %path.display(), "save_image_written");
    Ok(())
}

/// Writes one file into an existing slot directory. The bytes go to a
/// `.part` sibling first and are renamed over `file_name`, so a slot never
/// holds a truncated image.
pub(crate) fn write_slot_file(
    slot_dir: &Path,
    file_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, SaveError> {
    let target = slot_dir.join(file_name);
    let partial = slot_dir.join(format!("{file_name}.part"));
    fs::write(&partial, bytes).map_err(|source| SaveError::Io {
        path: partial.clone(),
        source,
    })?;
    if let Err(source) = fs::rename(&partial, &target) {
        let _ = fs::remove_file(&partial);
        return Err(SaveError::Io {
            path: target,
            source,
        });
    }
    Ok(target)
}
