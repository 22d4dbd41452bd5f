use failure::{format_err, Error};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::locate::RoomNames;
use crate::rommap::RomLayout;

pub const DEFAULT_DISCOVERY_DEPTH: usize = 20;
pub const DEFAULT_COMPANION_TOOL: &str = "scripts/z3ed";

/// Settings for the tools built on this crate.  Every field is optional in
/// the JSON file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Searched in order when no rom is given explicitly.
    pub rom_paths: Vec<PathBuf>,
    pub companion_tool: PathBuf,
    pub discovery_depth: usize,
    pub layout: RomLayout,
    // Keys may be written as hex ("0x1B"), octal, binary or decimal.
    #[serde(deserialize_with = "deserialize_room_names")]
    pub room_names: BTreeMap<u16, String>,
}

impl Default for Config {
    fn default() -> Config {
        Config {
            rom_paths: vec![
                PathBuf::from("roms/alttp_vanilla.sfc"),
                PathBuf::from("../roms/alttp_vanilla.sfc"),
                PathBuf::from("roms/vanilla.sfc"),
                PathBuf::from("../roms/vanilla.sfc"),
            ],
            companion_tool: PathBuf::from(DEFAULT_COMPANION_TOOL),
            discovery_depth: DEFAULT_DISCOVERY_DEPTH,
            layout: RomLayout::default(),
            room_names: BTreeMap::new(),
        }
    }
}

fn deserialize_room_names<'de, D>(deserializer: D) -> Result<BTreeMap<u16, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let string_map: BTreeMap<String, String> = BTreeMap::deserialize(deserializer)?;
    let mut names = BTreeMap::new();
    for (key, name) in string_map {
        let room_id = parse_int::parse::<u16>(&key).map_err(|e| {
            serde::de::Error::custom(format!("invalid room id {}: {}", key, e))
        })?;
        names.insert(room_id, name);
    }
    Ok(names)
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Config, Error> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .map_err(|e| format_err!("unable to read config {}: {}", path.display(), e))?;
        Ok(serde_json::from_str(&text)?)
    }

    /// The explicit path if there is one, otherwise the first configured
    /// candidate that exists.
    pub fn find_rom(&self, explicit: Option<&Path>) -> Result<PathBuf, Error> {
        if let Some(path) = explicit {
            return Ok(path.to_path_buf());
        }
        self.rom_paths
            .iter()
            .find(|p| p.is_file())
            .cloned()
            .ok_or_else(|| {
                let tried: Vec<String> = self
                    .rom_paths
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect();
                format_err!("no rom found (tried {})", tried.join(", "))
            })
    }

    pub fn names(&self) -> RoomNames {
        RoomNames::new(self.room_names.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.discovery_depth, 20);
        assert_eq!(config.layout.room_object_pointer, 0x874c);
        assert_eq!(config.companion_tool, PathBuf::from("scripts/z3ed"));
    }

    #[test]
    fn load_from_file() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        write!(
            f,
            r#"{{
                "discovery_depth": 5,
                "layout": {{ "entrance_count": 4 }},
                "room_names": {{ "0x1B": "Hall", "201": "Entrance" }}
            }}"#
        )
        .unwrap();

        let config = Config::load(f.path()).unwrap();
        assert_eq!(config.discovery_depth, 5);
        assert_eq!(config.layout.entrance_count, 4);
        assert_eq!(config.layout.room_header_pointer, 0xb5dd);
        assert_eq!(config.names().name(0x1b), "Hall");
        assert_eq!(config.names().name(0xc9), "Entrance");
        assert_eq!(config.rom_paths.len(), 4);
    }

    #[test]
    fn room_id_prefixes() {
        let config: Config = serde_json::from_str(
            r#"{ "room_names": { "0x01_1B": "Hall", "0o33": "Cell", "0b11": "Pit" } }"#,
        )
        .unwrap();
        assert_eq!(config.names().name(0x11b), "Hall");
        assert_eq!(config.names().name(27), "Cell");
        assert_eq!(config.names().name(3), "Pit");
    }

    #[test]
    fn bad_room_id() {
        let err = serde_json::from_str::<Config>(r#"{ "room_names": { "hall": "x" } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn find_rom() {
        let dir = tempfile::tempdir().unwrap();
        let rom = dir.path().join("vanilla.sfc");
        fs::write(&rom, &[0u8; 16]).unwrap();

        let config = Config {
            rom_paths: vec![dir.path().join("missing.sfc"), rom.clone()],
            ..Config::default()
        };
        assert_eq!(config.find_rom(None).unwrap(), rom);

        let explicit = Path::new("other.sfc");
        assert_eq!(config.find_rom(Some(explicit)).unwrap(), explicit);

        let config = Config {
            rom_paths: vec![dir.path().join("missing.sfc")],
            ..Config::default()
        };
        assert!(config.find_rom(None).is_err());
    }
}
