//! ROM override tables
//!
//! `roms/roms.json` carries one override map per family folder and a
//! per-folder `roms/<folder>.json` replaces that family's map when
//! present. Entries key on the file stem and override the display
//! name, publish flag and save flag; the folder-level `_cover_width` /
//! `_cover_height` keys size that family's cover art.

use crate::pack::defaults::{DEFAULT_COVER_HEIGHT, DEFAULT_COVER_WIDTH};
use log::warn;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

/// Per-image overrides from the tables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RomDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "flag")]
    pub publish: Option<bool>,
    #[serde(default, deserialize_with = "flag")]
    pub enable_save: Option<bool>,
}

/// One family folder's override table.
#[derive(Debug, Clone)]
pub struct RomDefs {
    entries: HashMap<String, RomDef>,
    pub cover_width: u32,
    pub cover_height: u32,
}

impl Default for RomDefs {
    fn default() -> Self {
        RomDefs {
            entries: HashMap::new(),
            cover_width: DEFAULT_COVER_WIDTH,
            cover_height: DEFAULT_COVER_HEIGHT,
        }
    }
}

/// The tables use "0"/"1" strings; accept JSON booleans as well, and
/// degrade anything else to "not set".
fn flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Text(String),
        Bool(bool),
        Other(serde::de::IgnoredAny),
    }

    Ok(match Option::<Flag>::deserialize(deserializer)? {
        Some(Flag::Text(s)) => Some(s == "1"),
        Some(Flag::Bool(b)) => Some(b),
        _ => None,
    })
}

impl RomDefs {
    /// Build a table from one folder's JSON object. Unknown keys are
    /// ignored, matching the historical loader.
    pub fn from_value(value: &Value) -> Self {
        let mut defs = RomDefs::default();
        let Some(map) = value.as_object() else {
            return defs;
        };

        for (key, entry) in map {
            match key.as_str() {
                "_cover_width" => {
                    if let Some(w) = entry.as_u64() {
                        defs.cover_width = w as u32;
                    }
                }
                "_cover_height" => {
                    if let Some(h) = entry.as_u64() {
                        defs.cover_height = h as u32;
                    }
                }
                _ => match RomDef::deserialize(entry) {
                    Ok(def) => {
                        defs.entries.insert(key.clone(), def);
                    }
                    Err(e) => warn!("ignoring malformed entry for {key}: {e}"),
                },
            }
        }
        defs
    }

    /// Look up overrides for a file stem.
    pub fn get(&self, stem: &str) -> Option<&RomDef> {
        self.entries.get(stem)
    }
}

/// Load the global `roms.json` table, folder name -> override map.
/// Missing or malformed files degrade to an empty table; overrides are
/// a convenience, not firmware metadata.
pub fn load_global(roms_dir: &Path) -> HashMap<String, RomDefs> {
    let path = roms_dir.join("roms.json");
    let mut tables = HashMap::new();

    let Ok(text) = std::fs::read_to_string(&path) else {
        return tables;
    };
    let value: Value = match serde_json::from_str(&text) {
        Ok(v) => v,
        Err(e) => {
            warn!("ignoring malformed {}: {}", path.display(), e);
            return tables;
        }
    };

    if let Some(map) = value.as_object() {
        for (folder, entry) in map {
            tables.insert(folder.clone(), RomDefs::from_value(entry));
        }
    }
    tables
}

/// Resolve the override table for one family folder: the per-folder
/// JSON file wins over the global table.
pub fn load_for_folder(
    roms_dir: &Path,
    folder: &str,
    global: &HashMap<String, RomDefs>,
) -> RomDefs {
    let path = roms_dir.join(format!("{folder}.json"));
    if let Ok(text) = std::fs::read_to_string(&path) {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => return RomDefs::from_value(&value),
            Err(e) => warn!("ignoring malformed {}: {}", path.display(), e),
        }
    }
    global.get(folder).cloned().unwrap_or_default()
}
