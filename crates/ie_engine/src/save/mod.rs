//! Save-game slots on disk: scanning, the save gate, writing and quick-save
//! rotation.

mod descriptor;
mod game_date;
mod gate;
mod manager;
mod quicksave;
mod slots;
mod types;
mod writer;

pub use descriptor::{SaveGame, SlotLayout, DUMMY_DATE, PORTRAIT_PREFIX};
pub use game_date::{format_game_date, read_game_time, DATE_ERROR, DEFAULT_HOUR_SECONDS};
pub use gate::{can_save, save_blocker, PartyMemberState, SaveBlocker, SaveGateView, NO_INTERRUPT_RADIUS};
pub use manager::{SaveConfig, SaveContext, SaveSlotManager, SlotNameTable};
pub use quicksave::{first_missing_age, plan_rotation, RotationPlan, DEFAULT_QUICK_SAVE_DEPTH};
pub use slots::{is_valid_label, slot_dir_name, SlotName, MAX_SLOT_PATH_LEN, RESERVED_SLOTS};
pub use types::{SaveError, SaveStatus, SlotScanError, GEM_ERROR, GEM_OK};
pub use writer::{do_save_game, scale_down, AreaExtractor, NoExtractor, SaveWriter, PREVIEW_SCALE_DOWN};
