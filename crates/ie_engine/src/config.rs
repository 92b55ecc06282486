use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::door::{RuleSystem, Ruleset};
use crate::save::{SaveConfig, SlotLayout, DEFAULT_HOUR_SECONDS, DEFAULT_QUICK_SAVE_DEPTH};
use crate::tables::{TableError, TableStore};

pub const CONFIG_ENV_VAR: &str = "IE_ENGINE_CFG";
pub const CONFIG_FILE_NAME: &str = "engine.cfg";
const HOME_CONFIG_DIR: &str = ".ieengine";
const OVERRIDE_DIR: &str = "override";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("{var} points to a missing config file: {path}")]
    InvalidEnvPath { var: &'static str, path: PathBuf },
    #[error("no {file} found; searched {searched:?}. Set {var} to the config path")]
    NotFound {
        file: &'static str,
        var: &'static str,
        searched: Vec<PathBuf>,
    },
    #[error("config key {key} expects a number, got \"{value}\"")]
    InvalidNumber { key: &'static str, value: String },
    #[error("config key RuleSystem: {0}")]
    InvalidRuleSystem(String),
    #[error("unknown GameType \"{0}\"")]
    UnknownGameType(String),
}

/// `key = value` lines with `#` comments. Keys are case-insensitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CfgFile {
    entries: BTreeMap<String, String>,
}

impl CfgFile {
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Malformed lines are skipped with a warning. Later keys win.
    pub fn parse(text: &str) -> Self {
        let mut entries = BTreeMap::new();
        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                warn!(line = line_no + 1, text = line, "config_line_invalid");
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                warn!(line = line_no + 1, text = line, "config_line_invalid");
                continue;
            }
            entries.insert(key.to_ascii_lowercase(), value.trim().to_string());
        }
        Self { entries }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .get(&key.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Per-game defaults selected by `GameType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameProfile {
    pub game_type: &'static str,
    pub prefix: &'static str,
    pub world_maps: &'static [&'static str],
    pub rule_system: RuleSystem,
    pub reverse_doors: bool,
}

const PROFILES: &[GameProfile] = &[
    GameProfile {
        game_type: "bg1",
        prefix: "BALDUR",
        world_maps: &["worldmap"],
        rule_system: RuleSystem::Classic,
        reverse_doors: false,
    },
    GameProfile {
        game_type: "bg2",
        prefix: "BALDUR",
        world_maps: &["worldmap", "worldm25"],
        rule_system: RuleSystem::Classic,
        reverse_doors: false,
    },
    GameProfile {
        game_type: "pst",
        prefix: "TORMENT",
        world_maps: &["worldmap"],
        rule_system: RuleSystem::Classic,
        reverse_doors: true,
    },
    GameProfile {
        game_type: "iwd",
        prefix: "ICEWIND",
        world_maps: &["worldmap"],
        rule_system: RuleSystem::Classic,
        reverse_doors: false,
    },
    GameProfile {
        game_type: "iwd2",
        prefix: "ICEWIND2",
        world_maps: &["worldmap"],
        rule_system: RuleSystem::ThirdEdition,
        reverse_doors: false,
    },
];

impl GameProfile {
    pub const DEFAULT_GAME_TYPE: &'static str = "bg2";

    pub fn lookup(game_type: &str) -> Option<&'static GameProfile> {
        PROFILES
            .iter()
            .find(|profile| profile.game_type.eq_ignore_ascii_case(game_type.trim()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    pub game_path: PathBuf,
    pub save_path: PathBuf,
    pub save_dir: String,
    pub game_type: String,
    pub game_name: String,
    pub world_maps: Vec<String>,
    pub hour_seconds: u32,
    pub quick_save_depth: u32,
    pub rule_system: RuleSystem,
    pub reverse_doors: bool,
}

impl EngineConfig {
    /// Reads the config at `path`, or the first one found by
    /// [`locate_config`].
    pub fn load(path: Option<&Path>) -> Result<(Self, PathBuf), ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => locate_config()?,
        };
        let cfg = CfgFile::from_path(&path)?;
        let config = Self::from_cfg(&cfg)?;
        debug!(
            path = %path.display(),
            keys = cfg.len(),
            game_type = %config.game_type,
            "config_loaded"
        );
        Ok((config, path))
    }

    pub fn from_cfg(cfg: &CfgFile) -> Result<Self, ConfigError> {
        let game_type = cfg
            .get("GameType")
            .filter(|value| !value.is_empty())
            .unwrap_or(GameProfile::DEFAULT_GAME_TYPE);
        let profile = GameProfile::lookup(game_type)
            .ok_or_else(|| ConfigError::UnknownGameType(game_type.to_string()))?;

        let game_path = PathBuf::from(cfg.get("GamePath").unwrap_or("."));
        let save_path = cfg
            .get("SavePath")
            .filter(|value| !value.is_empty())
            .map_or_else(|| game_path.clone(), PathBuf::from);

        let mut world_maps: Vec<String> = profile.world_maps.iter().map(|s| s.to_string()).collect();
        for (slot, key) in ["WorldMap", "WorldMap2"].into_iter().enumerate() {
            let Some(value) = cfg.get(key) else {
                continue;
            };
            if value.is_empty() {
                world_maps.truncate(slot);
            } else if slot < world_maps.len() {
                world_maps[slot] = value.to_string();
            } else {
                world_maps.push(value.to_string());
            }
        }

        let rule_system = match cfg.get("RuleSystem") {
            Some(value) => value.parse().map_err(ConfigError::InvalidRuleSystem)?,
            None => profile.rule_system,
        };

        Ok(Self {
            game_path,
            save_path,
            save_dir: cfg
                .get("SaveDir")
                .filter(|value| !value.is_empty())
                .unwrap_or("save")
                .to_string(),
            game_type: profile.game_type.to_string(),
            game_name: cfg
                .get("GameName")
                .filter(|value| !value.is_empty())
                .unwrap_or(profile.prefix)
                .to_string(),
            world_maps,
            hour_seconds: number(cfg, "HourSeconds", DEFAULT_HOUR_SECONDS)?.max(1),
            quick_save_depth: number(cfg, "QuickSaveDepth", DEFAULT_QUICK_SAVE_DEPTH)?.max(1),
            rule_system,
            reverse_doors: profile.reverse_doors,
        })
    }

    pub fn save_config(&self) -> SaveConfig {
        SaveConfig {
            save_path: self.save_path.clone(),
            save_dir: self.save_dir.clone(),
            layout: SlotLayout {
                prefix: self.game_name.clone(),
                world_maps: self.world_maps.clone(),
                hour_seconds: self.hour_seconds,
            },
            quick_save_depth: self.quick_save_depth,
        }
    }

    /// Table search order: the override directory shadows the game data.
    pub fn table_dirs(&self) -> Vec<PathBuf> {
        vec![self.game_path.join(OVERRIDE_DIR), self.game_path.clone()]
    }

    pub fn table_store(&self) -> TableStore {
        TableStore::new(self.table_dirs())
    }

    pub fn ruleset(&self, store: &TableStore) -> Result<Ruleset, TableError> {
        Ruleset::load(store, self.rule_system, self.reverse_doors)
    }
}

fn number(cfg: &CfgFile, key: &'static str, default: u32) -> Result<u32, ConfigError> {
    match cfg.get(key) {
        None => Ok(default),
        Some(value) => value.parse().map_err(|_| ConfigError::InvalidNumber {
            key,
            value: value.to_string(),
        }),
    }
}

/// Finds the config file: `IE_ENGINE_CFG`, then the executable's directory
/// and its ancestors, then `~/.ieengine`, then the working directory.
pub fn locate_config() -> Result<PathBuf, ConfigError> {
    match env::var(CONFIG_ENV_VAR) {
        Ok(value) => {
            let path = PathBuf::from(value);
            return if path.is_file() {
                Ok(path)
            } else {
                Err(ConfigError::InvalidEnvPath {
                    var: CONFIG_ENV_VAR,
                    path,
                })
            };
        }
        Err(env::VarError::NotPresent) => {}
        Err(source) => {
            return Err(ConfigError::EnvVar {
                var: CONFIG_ENV_VAR,
                source,
            })
        }
    }

    let mut searched = Vec::new();
    let exe_dir = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf));
    if let Some(exe_dir) = exe_dir {
        if let Some(found) = find_in_ancestors(&exe_dir, &mut searched) {
            return Ok(found);
        }
    }

    let home = env::var_os("HOME").map(PathBuf::from);
    let fallbacks = home
        .map(|home| home.join(HOME_CONFIG_DIR).join(CONFIG_FILE_NAME))
        .into_iter()
        .chain(std::iter::once(PathBuf::from(CONFIG_FILE_NAME)));
    for candidate in fallbacks {
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    Err(ConfigError::NotFound {
        file: CONFIG_FILE_NAME,
        var: CONFIG_ENV_VAR,
        searched,
    })
}

fn find_in_ancestors(start: &Path, searched: &mut Vec<PathBuf>) -> Option<PathBuf> {
    for dir in start.ancestors() {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            return Some(candidate);
        }
        searched.push(candidate);
    }
    None
}
