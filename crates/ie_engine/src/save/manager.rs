use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::rc::Rc;

use tracing::{debug, error, info, warn};

use super::descriptor::{SaveGame, SlotLayout};
use super::gate::{can_save, SaveGateView};
use super::quicksave::{prune_quick_saves, RotationPlan};
use super::slots::{is_valid_label, slot_dir_name, SlotName, MAX_SLOT_PATH_LEN, RESERVED_SLOTS};
use super::types::{SaveError, SaveStatus, SlotScanError};
use super::writer::{do_save_game, AreaExtractor, SaveWriter};
use crate::fs_util::remove_tree;
use crate::sim::{Feedback, GuiColor, MessageKey, OVERLAY_TICKS};
use crate::tables::{Table, TableError, TableStore};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveConfig {
    /// Parent of the save directory (`SavePath`).
    pub save_path: PathBuf,
    /// Save directory name, `save` unless a mission pack overrides it.
    pub save_dir: String,
    pub layout: SlotLayout,
    pub quick_save_depth: u32,
}

impl SaveConfig {
    pub fn save_dir_path(&self) -> PathBuf {
        self.save_path.join(&self.save_dir)
    }
}

/// Names and quick-save flags of the reserved slots, one row per slot
/// index (`savegame.2da`).
#[derive(Debug, Clone)]
pub struct SlotNameTable {
    table: Rc<Table>,
}

impl SlotNameTable {
    pub const TABLE: &'static str = "savegame";

    pub fn new(table: Rc<Table>) -> Self {
        Self { table }
    }

    pub fn load(store: &TableStore) -> Result<Option<Self>, TableError> {
        Ok(store.load_optional(Self::TABLE)?.map(Self::new))
    }

    /// Empty for indices past the last row.
    pub fn label(&self, index: u32) -> &str {
        let row = index as usize;
        if row >= self.table.row_count() {
            return "";
        }
        self.table.query_field(row, 0)
    }

    pub fn is_quick_save(&self, index: u32) -> bool {
        self.table.query_field_signed(index as usize, 1) != 0
    }
}

/// Collaborators a save request reaches through.
pub struct SaveContext<'a> {
    pub gate: &'a dyn SaveGateView,
    pub feedback: &'a mut dyn Feedback,
    pub writer: &'a mut dyn SaveWriter,
    pub extractor: &'a mut dyn AreaExtractor,
}

/// Registry of save slots. Every query rescans the save directory, so the
/// registry never drifts from what is on disk.
#[derive(Debug)]
pub struct SaveSlotManager {
    config: SaveConfig,
    slots: Vec<Rc<SaveGame>>,
    slot_names: Option<SlotNameTable>,
}

impl SaveSlotManager {
    pub fn new(config: SaveConfig) -> Self {
        Self {
            config,
            slots: Vec::new(),
            slot_names: None,
        }
    }

    pub fn with_slot_names(mut self, slot_names: SlotNameTable) -> Self {
        self.slot_names = Some(slot_names);
        self
    }

    pub fn config(&self) -> &SaveConfig {
        &self.config
    }

    /// Rebuilds the registry from the save directory, creating the
    /// directory on first access.
    pub fn rescan_save_games(&mut self) -> Result<(), SlotScanError> {
        self.slots.clear();
        let save_dir = self.config.save_dir_path();
        let entries = match fs::read_dir(&save_dir) {
            Ok(entries) => entries,
            Err(source) if source.kind() == io::ErrorKind::NotFound => {
                fs::create_dir_all(&save_dir).map_err(|source| SlotScanError::CreateDir {
                    path: save_dir.clone(),
                    source,
                })?;
                info!(path = %save_dir.display(), "save_dir_created");
                fs::read_dir(&save_dir).map_err(|source| SlotScanError::ReadDir {
                    path: save_dir.clone(),
                    source,
                })?
            }
            Err(source) => {
                return Err(SlotScanError::ReadDir {
                    path: save_dir,
                    source,
                })
            }
        };

        let mut names = BTreeSet::new();
        for entry in entries.flatten() {
            if !entry.file_type().is_ok_and(|kind| kind.is_dir()) {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.insert(name);
            }
        }

        for name in names {
            if name.starts_with('.') {
                continue;
            }
            let Some(slot) = SlotName::parse(&name) else {
                warn!(slot = %name, path = %save_dir.display(), "save_slot_invalid_name");
                continue;
            };
            let path = save_dir.join(&name);
            if path.as_os_str().len() > MAX_SLOT_PATH_LEN {
                warn!(path = %path.display(), "save_slot_path_too_long");
                continue;
            }
            if let Some(missing) = self.config.layout.missing_resource(&path) {
                warn!(path = %path.display(), missing = %missing, "save_slot_ignored");
                continue;
            }
            self.slots
                .push(Rc::new(SaveGame::open(path, slot, self.config.layout.clone())));
        }
        debug!(path = %save_dir.display(), slots = self.slots.len(), "save_games_scanned");
        Ok(())
    }

    pub fn save_games(&mut self) -> Result<&[Rc<SaveGame>], SlotScanError> {
        self.rescan_save_games()?;
        Ok(&self.slots)
    }

    /// Slot whose display name is exactly `name`.
    pub fn save_game(&mut self, name: &str) -> Result<Option<Rc<SaveGame>>, SlotScanError> {
        self.rescan_save_games()?;
        Ok(self.slots.iter().find(|save| save.name() == name).cloned())
    }

    /// Saves into reserved slot `index`, named by the slot-name table.
    /// A quick save first rotates the older quick saves of that name.
    pub fn create_save_game_slot(
        &mut self,
        index: u32,
        quick_save: bool,
        ctx: &mut SaveContext<'_>,
    ) -> SaveStatus {
        let (label, flagged_quick) = match &self.slot_names {
            Some(names) => (names.label(index).to_string(), names.is_quick_save(index)),
            None => (String::new(), false),
        };
        if label.is_empty() {
            warn!(index, "save_slot_unnamed");
            return SaveStatus::Failed;
        }
        if let Some(blocker) = can_save(ctx.gate, ctx.feedback) {
            return SaveStatus::Blocked(blocker);
        }

        let result = self.write_reserved_slot(index, &label, quick_save, flagged_quick, ctx);
        let success = if flagged_quick {
            MessageKey::QuickSaveSucceed
        } else {
            MessageKey::SaveSucceed
        };
        report(result, success, ctx.feedback)
    }

    /// Saves under `slot_name`, replacing `existing` or allocating the next
    /// free index past the reserved slots. `force` skips the gate.
    pub fn create_save_game(
        &mut self,
        existing: Option<Rc<SaveGame>>,
        slot_name: &str,
        force: bool,
        ctx: &mut SaveContext<'_>,
    ) -> SaveStatus {
        if slot_name.is_empty() {
            warn!(error = %SaveError::EmptySlotName, "save_rejected");
            return SaveStatus::Failed;
        }
        if let Some(blocker) = can_save(ctx.gate, ctx.feedback) {
            if !force {
                return SaveStatus::Blocked(blocker);
            }
            warn!(blocker = ?blocker, "save_gate_forced");
        }

        let result = self.write_named_slot(existing, slot_name, ctx);
        report(result, MessageKey::SaveSucceed, ctx.feedback)
    }

    /// Rotates the quick saves named `label` whose ages count from `base`,
    /// keeping at most the configured depth.
    pub fn prune_quick_save(&self, label: &str, base: u32) -> Result<RotationPlan, SaveError> {
        let names: Vec<SlotName> = self
            .slots
            .iter()
            .filter_map(|save| SlotName::parse(&save.slot_name()))
            .collect();
        prune_quick_saves(
            &self.config.save_dir_path(),
            &names,
            label,
            base,
            self.config.quick_save_depth,
        )
    }

    /// Removes the slot directory. Deleting nothing, or a slot already
    /// gone, succeeds.
    pub fn delete_save_game(&self, save: Option<&SaveGame>) -> Result<(), SaveError> {
        let Some(save) = save else {
            return Ok(());
        };
        remove_tree(save.path()).map_err(|source| SaveError::RemoveSlot {
            path: save.path().to_path_buf(),
            source,
        })?;
        info!(slot = %save.slot_name(), "save_slot_deleted");
        Ok(())
    }

    fn write_reserved_slot(
        &mut self,
        index: u32,
        label: &str,
        quick_save: bool,
        flagged_quick: bool,
        ctx: &mut SaveContext<'_>,
    ) -> Result<(), SaveError> {
        self.rescan_save_games()?;
        if quick_save {
            if flagged_quick {
                self.prune_quick_save(label, index)?;
                self.rescan_save_games()?;
            } else {
                warn!(index, label, "quick_save_slot_not_flagged");
            }
        }
        let existing = self
            .slots
            .iter()
            .find(|save| save.save_id() == index)
            .cloned();
        self.write_slot(index, label, existing, ctx)
    }

    fn write_named_slot(
        &mut self,
        existing: Option<Rc<SaveGame>>,
        label: &str,
        ctx: &mut SaveContext<'_>,
    ) -> Result<(), SaveError> {
        let index = match &existing {
            Some(save) => save.save_id(),
            None => {
                self.rescan_save_games()?;
                self.next_free_index()
            }
        };
        self.write_slot(index, label, existing, ctx)
    }

    fn next_free_index(&self) -> u32 {
        self.slots
            .iter()
            .map(|save| save.save_id().saturating_add(1))
            .fold(RESERVED_SLOTS, u32::max)
    }

    fn write_slot(
        &mut self,
        index: u32,
        label: &str,
        replacing: Option<Rc<SaveGame>>,
        ctx: &mut SaveContext<'_>,
    ) -> Result<(), SaveError> {
        if !is_valid_label(label) {
            return Err(SaveError::InvalidSlotName(label.to_string()));
        }

        let mut override_running = false;
        if let Some(save) = replacing {
            if ctx.extractor.is_running_save_game(&save) {
                override_running = true;
                ctx.extractor.create_cache_blob()?;
                debug!(slot = %save.slot_name(), "extractor_cache_flushed");
            }
            self.delete_save_game(Some(&*save))?;
        }

        let slot_dir = self.create_save_path(index, label)?;
        do_save_game(
            ctx.writer,
            &slot_dir,
            &self.config.layout.prefix,
            override_running,
        )
    }

    /// Fresh, empty slot directory; a stale directory with the same name is
    /// removed first.
    fn create_save_path(&self, index: u32, label: &str) -> Result<PathBuf, SaveError> {
        let save_dir = self.config.save_dir_path();
        fs::create_dir_all(&save_dir).map_err(|source| SaveError::CreateSlotDir {
            path: save_dir.clone(),
            source,
        })?;

        let path = save_dir.join(slot_dir_name(index, label));
        if path.as_os_str().len() > MAX_SLOT_PATH_LEN {
            return Err(SaveError::SlotPathTooLong(path));
        }
        remove_tree(&path).map_err(|source| SaveError::RemoveSlot {
            path: path.clone(),
            source,
        })?;
        fs::create_dir(&path).map_err(|source| SaveError::CreateSlotDir {
            path: path.clone(),
            source,
        })?;
        Ok(path)
    }
}

fn report(result: Result<(), SaveError>, success: MessageKey, feedback: &mut dyn Feedback) -> SaveStatus {
    let (status, message) = match result {
        Ok(()) => {
            info!(message = success.row_name(), "save_succeeded");
            (SaveStatus::Saved, success)
        }
        Err(failure) => {
            error!(error = %failure, "save_failed");
            (SaveStatus::Failed, MessageKey::CantSave)
        }
    };
    feedback.display_constant_string(message, GuiColor::XpChange);
    feedback.set_overlay_text(message, OVERLAY_TICKS);
    status
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use image::RgbaImage;
    use tempfile::TempDir;

    use super::*;
    use crate::save::game_date::DEFAULT_HOUR_SECONDS;
    use crate::save::gate::SaveBlocker;
    use crate::save::quicksave::DEFAULT_QUICK_SAVE_DEPTH;
    use crate::test_support::{GateState, MockExtractor, MockWriter, RecordingFeedback};

    const SLOT_TABLE: &str = "2DA V1.0\n*\n       NAME       QUICK\nAUTO   Auto-Save  0\nQUICK  QuickSave  1\n";

    fn config(root: &Path) -> SaveConfig {
        SaveConfig {
            save_path: root.to_path_buf(),
            save_dir: "save".to_string(),
            layout: SlotLayout {
                prefix: "BALDUR".to_string(),
                world_maps: vec!["worldmap".to_string()],
                hour_seconds: DEFAULT_HOUR_SECONDS,
            },
            quick_save_depth: DEFAULT_QUICK_SAVE_DEPTH,
        }
    }

    fn manager(root: &Path) -> SaveSlotManager {
        SaveSlotManager::new(config(root))
            .with_slot_names(SlotNameTable::new(Rc::new(Table::parse("savegame", SLOT_TABLE))))
    }

    fn seed_slot(root: &Path, dir_name: &str) {
        let dir = root.join("save").join(dir_name);
        fs::create_dir_all(&dir).expect("mkdir");
        RgbaImage::new(2, 2)
            .save_with_format(dir.join("BALDUR.bmp"), image::ImageFormat::Bmp)
            .expect("preview");
        fs::write(dir.join("worldmap.wmp"), b"WMAPV1.0").expect("wmp");
    }

    fn tuples(manager: &mut SaveSlotManager) -> Vec<(PathBuf, u32, String)> {
        manager
            .save_games()
            .expect("scan")
            .iter()
            .map(|save| (save.path().to_path_buf(), save.save_id(), save.slot_name()))
            .collect()
    }

    struct Harness {
        gate: GateState,
        feedback: RecordingFeedback,
        writer: MockWriter,
        extractor: MockExtractor,
    }

    impl Harness {
        fn new() -> Self {
            Self {
                gate: GateState::ready(),
                feedback: RecordingFeedback::default(),
                writer: MockWriter::default(),
                extractor: MockExtractor::default(),
            }
        }

        fn ctx(&mut self) -> SaveContext<'_> {
            SaveContext {
                gate: &self.gate,
                feedback: &mut self.feedback,
                writer: &mut self.writer,
                extractor: &mut self.extractor,
            }
        }
    }

    #[test]
    fn rescan_creates_missing_save_directory() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        assert!(manager.save_games().expect("scan").is_empty());
        assert!(temp.path().join("save").is_dir());
    }

    #[test]
    fn rescan_keeps_only_complete_well_named_slots() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000008-Second");
        seed_slot(temp.path(), "000000007-First");
        seed_slot(temp.path(), "not-a-slot");
        fs::create_dir_all(temp.path().join("save/000000009-NoPreview")).expect("mkdir");
        seed_slot(temp.path(), "000000010-NoMap");
        fs::remove_file(temp.path().join("save/000000010-NoMap/worldmap.wmp")).expect("rm");

        let mut manager = manager(temp.path());
        let names: Vec<String> = manager
            .save_games()
            .expect("scan")
            .iter()
            .map(|save| save.name().to_string())
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn second_world_map_is_required_when_configured() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000007-Mine");
        let mut config = config(temp.path());
        config.layout.world_maps.push("worldm25".to_string());
        let mut manager = SaveSlotManager::new(config);
        assert!(manager.save_games().expect("scan").is_empty());

        fs::write(temp.path().join("save/000000007-Mine/WORLDM25.WMP"), b"WMAP").expect("wmp");
        assert_eq!(manager.save_games().expect("scan").len(), 1);
    }

    #[test]
    fn rescans_agree_but_build_new_descriptors() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000007-First");
        let mut manager = manager(temp.path());

        let first = manager.save_game("First").expect("scan").expect("slot");
        let tuples_a = tuples(&mut manager);
        let second = manager.save_game("First").expect("scan").expect("slot");
        let tuples_b = tuples(&mut manager);

        assert_eq!(tuples_a, tuples_b);
        assert!(!Rc::ptr_eq(&first, &second));
        assert_eq!(*first, *second);
        assert!(manager.save_game("first").expect("scan").is_none());
    }

    #[test]
    fn new_save_gets_next_index_and_survives_rescan() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();

        let status = manager.create_save_game(None, "Before Boss", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(status.code(), 0);
        let status = manager.create_save_game(None, "After Boss", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);

        let before = manager.save_game("Before Boss").expect("scan").expect("slot");
        let after = manager.save_game("After Boss").expect("scan").expect("slot");
        assert_eq!(before.save_id(), RESERVED_SLOTS);
        assert_eq!(after.save_id(), RESERVED_SLOTS + 1);
        assert_eq!(
            harness.feedback.messages,
            vec![MessageKey::SaveSucceed, MessageKey::SaveSucceed]
        );
        assert_eq!(
            harness.feedback.overlays.last(),
            Some(&(MessageKey::SaveSucceed, OVERLAY_TICKS))
        );
    }

    #[test]
    fn blocked_gate_touches_nothing_on_disk() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();
        harness.gate.dialog = true;

        let status = manager.create_save_game(None, "Mine", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Blocked(SaveBlocker::Dialog));
        assert_eq!(status.code(), 2);
        assert!(!temp.path().join("save").exists());
        assert!(harness.writer.steps.is_empty());

        let status = manager.create_save_game_slot(1, true, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Blocked(SaveBlocker::Dialog));
        assert!(!temp.path().join("save").exists());
    }

    #[test]
    fn force_bypasses_the_gate() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();
        harness.gate.combat = true;

        let status = manager.create_save_game(None, "Forced", true, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(
            harness.feedback.messages,
            vec![MessageKey::CantSaveCombat, MessageKey::SaveSucceed]
        );
    }

    #[test]
    fn replacing_a_slot_flushes_running_extractor() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000011-Old Name");
        let mut manager = manager(temp.path());
        let existing = manager.save_game("Old Name").expect("scan");
        let mut harness = Harness::new();
        harness.extractor.running = true;

        let status = manager.create_save_game(existing, "New Name", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(harness.extractor.flushes, 1);
        assert!(harness
            .writer
            .steps
            .contains(&"compress_save:override".to_string()));
        assert!(!temp.path().join("save/000000011-Old Name").exists());
        let replaced = manager.save_game("New Name").expect("scan").expect("slot");
        assert_eq!(replaced.save_id(), 11);
    }

    #[test]
    fn extractor_flush_failure_keeps_old_slot() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000011-Old Name");
        let mut manager = manager(temp.path());
        let existing = manager.save_game("Old Name").expect("scan");
        let mut harness = Harness::new();
        harness.extractor.running = true;
        harness.extractor.fail = true;

        let status = manager.create_save_game(existing, "New Name", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Failed);
        assert_eq!(status.code(), -1);
        assert!(temp.path().join("save/000000011-Old Name").exists());
        assert_eq!(harness.feedback.messages, vec![MessageKey::CantSave]);
    }

    #[test]
    fn writer_failure_reports_cant_save() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();
        harness.writer.fail_at = Some("compress_save");

        let status = manager.create_save_game(None, "Mine", false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Failed);
        assert_eq!(harness.feedback.messages, vec![MessageKey::CantSave]);
        assert_eq!(
            harness.feedback.overlays,
            vec![(MessageKey::CantSave, OVERLAY_TICKS)]
        );
    }

    #[test]
    fn empty_or_invalid_names_fail() {
        let temp = TempDir::new().expect("temp");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();

        assert_eq!(
            manager.create_save_game(None, "", false, &mut harness.ctx()),
            SaveStatus::Failed
        );
        assert!(harness.feedback.is_empty());

        assert_eq!(
            manager.create_save_game(None, "bad/name", false, &mut harness.ctx()),
            SaveStatus::Failed
        );
        assert_eq!(harness.feedback.messages, vec![MessageKey::CantSave]);

        assert_eq!(
            manager.create_save_game_slot(5, false, &mut harness.ctx()),
            SaveStatus::Failed
        );
    }

    #[test]
    fn quick_save_rotates_previous_quick_saves() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000001-QuickSave");
        seed_slot(temp.path(), "000000003-QuickSave");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();

        let status = manager.create_save_game_slot(1, true, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(harness.feedback.messages, vec![MessageKey::QuickSaveSucceed]);

        let ids: Vec<u32> = manager
            .save_games()
            .expect("scan")
            .iter()
            .map(|save| save.save_id())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn reserved_slot_save_replaces_same_index() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000000-Auto-Save");
        let mut manager = manager(temp.path());
        let mut harness = Harness::new();

        let status = manager.create_save_game_slot(0, false, &mut harness.ctx());
        assert_eq!(status, SaveStatus::Saved);
        assert_eq!(harness.feedback.messages, vec![MessageKey::SaveSucceed]);
        let saves = manager.save_games().expect("scan");
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].slot_name(), "000000000-Auto-Save");
    }

    #[test]
    fn delete_is_idempotent() {
        let temp = TempDir::new().expect("temp");
        seed_slot(temp.path(), "000000007-Gone");
        let mut manager = manager(temp.path());
        let save = manager.save_game("Gone").expect("scan").expect("slot");

        manager.delete_save_game(None).expect("nothing to delete");
        manager.delete_save_game(Some(&*save)).expect("delete");
        manager.delete_save_game(Some(&*save)).expect("already gone");
        assert!(!save.path().exists());
        assert!(manager.save_games().expect("scan").is_empty());
    }
}
