use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use serde::Serialize;
use tracing::{error, info};

use super::slots::{slot_dir_name, SlotName};
use super::types::SaveError;
use crate::fs_util::remove_tree;

pub const DEFAULT_QUICK_SAVE_DEPTH: u32 = 5;

/// Smallest non-negative integer not in `ages`.
pub fn first_missing_age(ages: &BTreeSet<u32>) -> u32 {
    let mut expected = 0;
    for &age in ages {
        if age != expected {
            break;
        }
        expected += 1;
    }
    expected
}

/// Filesystem steps that make room for a new quick save at age zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RotationPlan {
    /// Oldest kept age, removed when the history is full.
    pub evict: Option<u32>,
    /// `(from, to)` age renames, highest first so no rename lands on an
    /// occupied slot.
    pub renames: Vec<(u32, u32)>,
}

/// Plans the rotation for quick saves whose ages are counted from `base`.
/// Ages below the first gap shift up by one, so an existing gap is filled
/// before the history grows. A full history of `depth` entries drops its
/// oldest one.
pub fn plan_rotation(ages: &BTreeSet<u32>, base: u32, depth: u32) -> RotationPlan {
    let relative: BTreeSet<u32> = ages
        .iter()
        .filter_map(|&age| age.checked_sub(base))
        .collect();
    let depth = depth.max(1);

    let mut gap = first_missing_age(&relative);
    let mut plan = RotationPlan::default();
    if gap >= depth {
        plan.evict = Some(base + depth - 1);
        gap = depth - 1;
    }
    plan.renames = (0..gap)
        .rev()
        .map(|age| (base + age, base + age + 1))
        .collect();
    plan
}

/// Applies the rotation for `label` inside `save_dir`. Slot names are the
/// directory names found by the last scan. A failed rename is logged and
/// stops the rotation; the next quick save retries.
pub fn prune_quick_saves(
    save_dir: &Path,
    slot_names: &[SlotName],
    label: &str,
    base: u32,
    depth: u32,
) -> Result<RotationPlan, SaveError> {
    let ages: BTreeSet<u32> = slot_names
        .iter()
        .filter_map(|slot| slot.quick_save_age(label))
        .collect();
    if ages.is_empty() {
        return Ok(RotationPlan::default());
    }

    let plan = plan_rotation(&ages, base, depth);
    // On-disk spelling of the label, which may differ in case from `label`.
    let label_for = |age: u32| {
        slot_names
            .iter()
            .find(|slot| slot.index == age && slot.label.eq_ignore_ascii_case(label))
            .map_or(label, |slot| slot.label.as_str())
    };
    let dir_for = |age: u32| save_dir.join(slot_dir_name(age, label_for(age)));

    if let Some(age) = plan.evict {
        let path = dir_for(age);
        remove_tree(&path).map_err(|source| SaveError::RemoveSlot {
            path: path.clone(),
            source,
        })?;
        info!(label, age, path = %path.display(), "quick_save_evicted");
    }

    for &(from_age, to_age) in &plan.renames {
        let from = dir_for(from_age);
        let to = save_dir.join(slot_dir_name(to_age, label_for(from_age)));
        if let Err(source) = fs::rename(&from, &to) {
            let failure = SaveError::RenameQuickSave { from, to, source };
            error!(label, error = %failure, "quick_save_rename_failed");
            break;
        }
    }
    info!(
        label,
        existing = ages.len(),
        renamed = plan.renames.len(),
        evicted = plan.evict.is_some(),
        "quick_save_pruned"
    );
    Ok(plan)
}
