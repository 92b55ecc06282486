use once_cell::sync::Lazy;
use regex::Regex;

use crate::sim::compile_pattern;

/// Slot numbers below this are reserved for the named slots of the
/// `savegame` table (auto save, quick save and friends).
pub const RESERVED_SLOTS: u32 = 7;

/// Longest slot directory path accepted, leaving room for 8.3 file names.
pub const MAX_SLOT_PATH_LEN: usize = 240;

static SLOT_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"^([0-9]{9})-([A-Za-z0-9\- _+*#%&|()=!?':]+)$"));

static LABEL_RE: Lazy<Option<Regex>> =
    Lazy::new(|| compile_pattern(r"^[A-Za-z0-9\- _+*#%&|()=!?':]+$"));

/// A parsed `<9-digit index>-<label>` directory name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotName {
    pub index: u32,
    pub label: String,
}

impl SlotName {
    pub fn parse(name: &str) -> Option<Self> {
        let captures = SLOT_RE.as_ref()?.captures(name)?;
        let index = captures.get(1)?.as_str().parse().ok()?;
        let label = captures.get(2)?.as_str().to_string();
        Some(Self { index, label })
    }

    pub fn dir_name(&self) -> String {
        slot_dir_name(self.index, &self.label)
    }

    /// Quick-save age of this slot when its label matches, ignoring case.
    pub fn quick_save_age(&self, label: &str) -> Option<u32> {
        self.label
            .eq_ignore_ascii_case(label)
            .then_some(self.index)
    }
}

pub fn slot_dir_name(index: u32, label: &str) -> String {
    format!("{index:09}-{label}")
}

pub fn is_valid_label(label: &str) -> bool {
    LABEL_RE
        .as_ref()
        .is_some_and(|re| re.is_match(label))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_patterns_compile() {
        assert!(SLOT_RE.is_some());
        assert!(LABEL_RE.is_some());
    }

    #[test]
    fn parses_index_and_label() {
        let slot = SlotName::parse("000000012-Before the Dragon!").expect("valid slot");
        assert_eq!(slot.index, 12);
        assert_eq!(slot.label, "Before the Dragon!");
        assert_eq!(slot.dir_name(), "000000012-Before the Dragon!");
    }

    #[test]
    fn rejects_malformed_names() {
        for name in [
            ".hidden",
            "12-Short",
            "000000012",
            "000000012-",
            "0000000012-TooWide",
            "000000012-Slash/Label",
            "000000012-Tab\tLabel",
            "abcdefghi-Letters",
        ] {
            assert!(SlotName::parse(name).is_none(), "{name} should be rejected");
        }
    }

    #[test]
    fn quick_save_age_matches_label_case_insensitively() {
        let slot = SlotName::parse("000000003-QuickSave").expect("valid slot");
        assert_eq!(slot.quick_save_age("quicksave"), Some(3));
        assert_eq!(slot.quick_save_age("Auto-Save"), None);
    }

    #[test]
    fn label_validation_follows_grammar() {
        assert!(is_valid_label("Auto-Save"));
        assert!(is_valid_label("Chapter (2) = done?"));
        assert!(!is_valid_label(""));
        assert!(!is_valid_label("a/b"));
        assert_eq!(slot_dir_name(7, "Mine"), "000000007-Mine");
    }
}
