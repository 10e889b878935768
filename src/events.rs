use serde::{Deserialize, Serialize};

pub type EntityId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CombatStatus {
    Entered,
    Left,
}

/// Typed events delivered serially by the game-client integration layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GameEvent {
    #[serde(rename_all = "camelCase")]
    CombatStatusChanged { status: CombatStatus },
    #[serde(rename_all = "camelCase")]
    BossHealthChanged {
        template_id: u32,
        hunting_zone_id: u32,
        current_hp: i64,
        entity_id: EntityId,
    },
    #[serde(rename_all = "camelCase")]
    EntityDespawned { entity_id: EntityId },
    ZoneOrInstanceChanged,
    #[serde(rename_all = "camelCase")]
    BossTargetAcquired { target_entity_id: EntityId },
}
