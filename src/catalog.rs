use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

pub const UNKNOWN_BOSS: &str = "UnknownBoss";
pub const UNKNOWN_DUNGEON: &str = "UnknownDungeon";

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to read reference data '{path}': {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse reference data '{path}': {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonsterRecord {
    pub id: u32,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ZoneRecord {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub monsters: Vec<MonsterRecord>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReferenceData {
    zones: Vec<ZoneRecord>,
}

#[derive(Debug, Clone)]
pub struct MonsterEntry {
    pub name: String,
    pub zone_id: u32,
}

/// Static monster/dungeon lookup, immutable after load. Misses resolve to
/// sentinel names rather than errors.
#[derive(Debug, Default)]
pub struct ReferenceCatalog {
    monsters: HashMap<u32, MonsterEntry>,
    dungeons: HashMap<u32, String>,
}

impl ReferenceCatalog {
    pub fn from_zones(zones: Vec<ZoneRecord>) -> Self {
        let mut monsters = HashMap::new();
        let mut dungeons = HashMap::new();

        for zone in zones {
            dungeons.insert(zone.id, zone.name.clone());
            for monster in zone.monsters {
                monsters.insert(
                    monster.id,
                    MonsterEntry {
                        name: monster.name,
                        zone_id: zone.id,
                    },
                );
            }
        }

        Self { monsters, dungeons }
    }

    pub fn boss_name(&self, template_id: u32) -> &str {
        self.monsters
            .get(&template_id)
            .map(|entry| entry.name.as_str())
            .unwrap_or(UNKNOWN_BOSS)
    }

    pub fn monster_entry(&self, template_id: u32) -> Option<&MonsterEntry> {
        self.monsters.get(&template_id)
    }

    pub fn dungeon_name(&self, zone_id: u32) -> &str {
        self.dungeons
            .get(&zone_id)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_DUNGEON)
    }

    pub fn monster_count(&self) -> usize {
        self.monsters.len()
    }
}

pub fn load_reference_catalog(path: &Path) -> Result<ReferenceCatalog, CatalogError> {
    let raw_json = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.display().to_string(),
        source,
    })?;

    let data =
        serde_json::from_str::<ReferenceData>(&raw_json).map_err(|source| CatalogError::Parse {
            path: path.display().to_string(),
            source,
        })?;

    let catalog = ReferenceCatalog::from_zones(data.zones);
    tracing::info!(
        monsters = catalog.monster_count(),
        dungeons = catalog.dungeons.len(),
        "Monster and dungeon reference data loaded"
    );

    Ok(catalog)
}
