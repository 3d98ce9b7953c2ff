//! bevy_ecs bridge
//!
//! Mirrors [`PointLight`] components into the [`TiledLighting`] registry.
//! Add [`light_sync_systems`] to the schedule that runs before the frame's
//! [`TiledLighting::prepare_frame`] call.

use std::collections::HashMap;

use bevy_ecs::prelude::*;
use bevy_ecs::schedule::SystemConfigs;

use crate::error::LightingError;
use crate::forward_plus::{LightHandle, TiledLighting, TiledLightingConfig};
use crate::scene::PointLight;

/// Registry handle of a mirrored light entity.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightSlot(pub LightHandle);

/// Marks a light whose component failed validation. It is tried again once
/// the component changes.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct RejectedLight;

/// Handles by entity, kept so despawned lights can still be released.
#[derive(Resource, Debug, Default)]
pub struct LightEntityMap(HashMap<Entity, LightHandle>);

impl LightEntityMap {
    pub fn get(&self, entity: Entity) -> Option<LightHandle> {
        self.0.get(&entity).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Insert the resources [`light_sync_systems`] needs.
pub fn insert_tiled_lighting(world: &mut World, config: &TiledLightingConfig) {
    world.insert_resource(TiledLighting::new(config));
    world.init_resource::<LightEntityMap>();
}

/// Free the slots of lights whose component was removed or whose entity was
/// despawned.
pub fn release_removed_lights(
    mut commands: Commands,
    mut removed: RemovedComponents<PointLight>,
    mut lighting: ResMut<TiledLighting>,
    mut map: ResMut<LightEntityMap>,
) {
    for entity in removed.read() {
        let Some(handle) = map.0.remove(&entity) else {
            continue;
        };
        if let Err(e) = lighting.lights_mut().release(handle) {
            log::warn!("Releasing light of {:?}: {}", entity, e);
        }
        if let Some(mut entity_commands) = commands.get_entity(entity) {
            entity_commands.remove::<LightSlot>();
        }
    }
}

/// Give a slot to every light entity that has none.
///
/// Lights over the budget stay unlit and are tried again next frame.
/// Invalid lights get [`RejectedLight`] and wait for an edit.
pub fn register_new_lights(
    mut commands: Commands,
    query: Query<(Entity, Ref<PointLight>, Has<RejectedLight>), Without<LightSlot>>,
    mut lighting: ResMut<TiledLighting>,
    mut map: ResMut<LightEntityMap>,
) {
    let mut deferred = 0usize;
    for (entity, light, rejected) in &query {
        if rejected && !light.is_changed() {
            continue;
        }
        match lighting.lights_mut().register(*light) {
            Ok(handle) => {
                let mut entity_commands = commands.entity(entity);
                entity_commands.insert(LightSlot(handle));
                if rejected {
                    entity_commands.remove::<RejectedLight>();
                }
                map.0.insert(entity, handle);
            }
            Err(LightingError::Capacity(_)) => deferred += 1,
            Err(e) if rejected => log::debug!("Light {:?} still invalid: {}", entity, e),
            Err(e) => {
                log::warn!("Skipping light {:?}: {}", entity, e);
                commands.entity(entity).insert(RejectedLight);
            }
        }
    }

    if deferred > 0 {
        log::warn!(
            "{} light(s) over the {} light budget left unlit",
            deferred,
            lighting.lights().capacity()
        );
    }
}

/// Push edited light components into their slots.
pub fn sync_changed_lights(
    query: Query<(Entity, &LightSlot, &PointLight), Changed<PointLight>>,
    mut lighting: ResMut<TiledLighting>,
) {
    for (entity, slot, light) in &query {
        if let Err(e) = lighting.lights_mut().update(slot.0, *light) {
            log::warn!("Updating light {:?}: {}", entity, e);
        }
    }
}

/// Release, register and sync, in that order.
pub fn light_sync_systems() -> SystemConfigs {
    (release_removed_lights, register_new_lights, sync_changed_lights).chain()
}
