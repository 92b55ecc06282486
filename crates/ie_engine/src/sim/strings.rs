use std::collections::{BTreeMap, HashMap};
use std::fmt;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{error, warn};

use super::feedback::MessageKey;
use crate::tables::Table;

/// Index into the game's localized string table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrRef(pub u32);

impl StrRef {
    /// "and", used between the day and hour phrases of a game date.
    pub const DATE1: StrRef = StrRef(10699);
    /// Combined day and hour phrase for languages without plural forms.
    pub const DATE2: StrRef = StrRef(41277);
}

impl fmt::Display for StrRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolves a string reference to its raw template.
pub trait StringTable {
    fn template(&self, strref: StrRef) -> Option<String>;
}

/// A string table with no entries. Every lookup falls back to built-in text.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStrings;

impl StringTable for NoStrings {
    fn template(&self, _strref: StrRef) -> Option<String> {
        None
    }
}

pub type Tokens = BTreeMap<String, String>;

static TOKEN_RE: Lazy<Option<Regex>> = Lazy::new(|| compile_pattern(r"<([A-Za-z0-9_]+)>"));

/// Builds one of the crate's fixed patterns. A pattern that fails to
/// compile is logged once, and every match against it then fails.
pub(crate) fn compile_pattern(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            error!(pattern, error = %err, "static_pattern_invalid");
            None
        }
    }
}

/// Replaces `<NAME>` tokens. Unknown tokens become empty, as the game does.
pub fn substitute_tokens(template: &str, tokens: &Tokens) -> String {
    let Some(re) = TOKEN_RE.as_ref() else {
        return template.to_string();
    };
    re.replace_all(template, |caps: &Captures<'_>| {
        tokens.get(&caps[1]).cloned().unwrap_or_default()
    })
    .into_owned()
}

/// Message key to string reference mapping, read from the `strings` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StringRefs {
    refs: HashMap<MessageKey, StrRef>,
}

impl StringRefs {
    pub fn from_table(table: &Table) -> Self {
        let mut refs = HashMap::new();
        for key in MessageKey::ALL {
            let Some(row) = table.row_index(key.row_name()) else {
                warn!(
                    table = table.name(),
                    row = key.row_name(),
                    "string_ref_row_missing"
                );
                continue;
            };
            let value = table.query_field_signed(row, 0);
            if let Ok(value) = u32::try_from(value) {
                refs.insert(key, StrRef(value));
            }
        }
        Self { refs }
    }

    pub fn with(mut self, key: MessageKey, strref: StrRef) -> Self {
        self.refs.insert(key, strref);
        self
    }

    pub fn get(&self, key: MessageKey) -> Option<StrRef> {
        self.refs.get(&key).copied()
    }
}

/// String references plus the table that resolves them.
#[derive(Clone, Copy)]
pub struct GameText<'a> {
    pub refs: &'a StringRefs,
    pub table: &'a dyn StringTable,
}

impl<'a> GameText<'a> {
    pub fn new(refs: &'a StringRefs, table: &'a dyn StringTable) -> Self {
        Self { refs, table }
    }

    pub fn message(&self, key: MessageKey, tokens: &Tokens) -> String {
        let template = self
            .refs
            .get(key)
            .and_then(|strref| self.table.template(strref))
            .unwrap_or_else(|| key.fallback_text().to_string());
        substitute_tokens(&template, tokens)
    }

    pub fn strref(&self, strref: StrRef, fallback: &str, tokens: &Tokens) -> String {
        let template = self
            .table
            .template(strref)
            .unwrap_or_else(|| fallback.to_string());
        substitute_tokens(&template, tokens)
    }
}
