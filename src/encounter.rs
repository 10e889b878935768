use std::sync::Arc;

use crate::catalog::{ReferenceCatalog, UNKNOWN_BOSS, UNKNOWN_DUNGEON};
use crate::events::{CombatStatus, EntityId, GameEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureContext {
    pub boss_name: String,
    pub dungeon_name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    BossKilled,
    CombatEnded,
    BossDespawned,
    EncounterReset,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    BeginCapture(CaptureContext),
    EndCapture(EndReason),
    ResetEncounter,
}

/// Combat/boss/zone state for the current encounter. Owned by one tracker
/// instance per connected game client; never shared process-wide.
#[derive(Debug)]
pub struct EncounterState {
    pub in_combat: bool,
    pub boss_dead: bool,
    pub boss_name: String,
    pub dungeon_name: String,
    pub tracked_boss_id: Option<EntityId>,
    // True between an emitted BeginCapture and the matching EndCapture.
    // Every EndCapture emission is gated on this flag, so duplicate or
    // late combat-exit events never produce a second stop intent.
    capture_active: bool,
}

impl EncounterState {
    fn new() -> Self {
        Self {
            in_combat: false,
            boss_dead: false,
            boss_name: UNKNOWN_BOSS.to_string(),
            dungeon_name: UNKNOWN_DUNGEON.to_string(),
            tracked_boss_id: None,
            capture_active: false,
        }
    }
}

/// The combat state machine. Consumes typed game events and emits capture
/// intents; it never touches the recorder or the filesystem itself.
pub struct EncounterTracker {
    state: EncounterState,
    catalog: Arc<ReferenceCatalog>,
}

impl EncounterTracker {
    pub fn new(catalog: Arc<ReferenceCatalog>) -> Self {
        Self {
            state: EncounterState::new(),
            catalog,
        }
    }

    pub fn state(&self) -> &EncounterState {
        &self.state
    }

    pub fn handle_event(&mut self, event: &GameEvent) -> Vec<Intent> {
        let mut intents = Vec::new();

        match event {
            GameEvent::CombatStatusChanged { status } => {
                self.on_combat_status_changed(*status, &mut intents);
            }
            GameEvent::BossHealthChanged {
                template_id,
                hunting_zone_id,
                current_hp,
                entity_id,
            } => {
                self.on_boss_health_changed(
                    *template_id,
                    *hunting_zone_id,
                    *current_hp,
                    *entity_id,
                    &mut intents,
                );
            }
            GameEvent::EntityDespawned { entity_id } => {
                self.on_entity_despawned(*entity_id, &mut intents);
            }
            GameEvent::ZoneOrInstanceChanged => {
                self.on_zone_or_instance_changed(&mut intents);
            }
            GameEvent::BossTargetAcquired { target_entity_id } => {
                self.on_boss_target_acquired(*target_entity_id, &mut intents);
            }
        }

        intents
    }

    fn on_combat_status_changed(&mut self, status: CombatStatus, intents: &mut Vec<Intent>) {
        if status == CombatStatus::Entered {
            if !self.state.in_combat {
                self.state.in_combat = true;
                self.push_begin_capture(intents);
            }
            return;
        }

        // Leaving combat only ends the encounter once the boss is confirmed
        // dead; otherwise the fight is still in progress.
        if self.state.in_combat && self.state.boss_dead {
            self.state.in_combat = false;
            self.push_end_capture(EndReason::CombatEnded, intents);
        }
    }

    fn on_boss_health_changed(
        &mut self,
        template_id: u32,
        hunting_zone_id: u32,
        current_hp: i64,
        entity_id: EntityId,
        intents: &mut Vec<Intent>,
    ) {
        if current_hp <= 0 {
            if !self.state.boss_dead {
                self.state.boss_dead = true;
                tracing::info!(boss_name = %self.state.boss_name, "Boss died");
                self.push_end_capture(EndReason::BossKilled, intents);
            }
            return;
        }

        self.state.boss_name = self.catalog.boss_name(template_id).to_string();
        self.state.dungeon_name = self.catalog.dungeon_name(hunting_zone_id).to_string();
        self.state.tracked_boss_id = Some(entity_id);
    }

    fn on_entity_despawned(&mut self, entity_id: EntityId, intents: &mut Vec<Intent>) {
        if self.state.tracked_boss_id != Some(entity_id) {
            return;
        }

        tracing::info!(boss_name = %self.state.boss_name, "Tracked boss despawned");
        self.state.tracked_boss_id = None;
        self.push_end_capture(EndReason::BossDespawned, intents);
    }

    fn on_zone_or_instance_changed(&mut self, intents: &mut Vec<Intent>) {
        if self.state.capture_active {
            tracing::info!("Instance change detected while capturing. Resetting encounter");
        }

        // Canonical order: clear the state first, then emit the stop intent.
        self.state.boss_dead = false;
        self.state.in_combat = false;
        self.state.tracked_boss_id = None;
        self.push_end_capture(EndReason::EncounterReset, intents);
        intents.push(Intent::ResetEncounter);
    }

    fn on_boss_target_acquired(&mut self, target_entity_id: EntityId, intents: &mut Vec<Intent>) {
        // Fallback combat entry for fights where the combat-status event is
        // unreliable: targeting the tracked boss counts as entering combat.
        if self.state.tracked_boss_id != Some(target_entity_id) {
            return;
        }

        if !self.state.in_combat {
            self.state.in_combat = true;
            self.push_begin_capture(intents);
        }
    }

    fn push_begin_capture(&mut self, intents: &mut Vec<Intent>) {
        if self.state.capture_active {
            return;
        }

        self.state.capture_active = true;
        intents.push(Intent::BeginCapture(CaptureContext {
            boss_name: self.state.boss_name.clone(),
            dungeon_name: self.state.dungeon_name.clone(),
        }));
    }

    fn push_end_capture(&mut self, reason: EndReason, intents: &mut Vec<Intent>) {
        if !self.state.capture_active {
            return;
        }

        self.state.capture_active = false;
        intents.push(Intent::EndCapture(reason));
    }
}
