//! Light registry with stable slot assignment
//!
//! Slots are handed out from a free list over [`MAX_LIGHTS`] fixed entries.
//! A light keeps its slot until it is released, so its bit in every tile
//! mask and its column in the light data texture do not move while it
//! animates. Handles carry a generation so a released handle can never
//! address the light that later reuses the same slot.

use crate::error::{CapacityError, LightingError};
use crate::scene::PointLight;

/// Number of light slots; one per bit of a tile mask.
pub const MAX_LIGHTS: usize = 32;

/// Index of a light slot, always below [`MAX_LIGHTS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Slot(u8);

impl Slot {
    pub fn new(index: u8) -> Option<Self> {
        ((index as usize) < MAX_LIGHTS).then_some(Self(index))
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Handle to a registered light
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LightHandle {
    slot: Slot,
    generation: u32,
}

impl LightHandle {
    pub fn slot(&self) -> Slot {
        self.slot
    }
}

#[derive(Debug, Clone, Copy)]
struct SlotEntry {
    generation: u32,
    light: Option<PointLight>,
}

impl SlotEntry {
    const VACANT: Self = Self {
        generation: 0,
        light: None,
    };
}

/// Active point lights, at most [`MAX_LIGHTS`] at a time
#[derive(Debug, Clone)]
pub struct LightRegistry {
    entries: [SlotEntry; MAX_LIGHTS],
    /// Vacant slots; the next registration pops from the back.
    free: Vec<Slot>,
}

impl Default for LightRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl LightRegistry {
    pub fn new() -> Self {
        Self {
            entries: [SlotEntry::VACANT; MAX_LIGHTS],
            free: (0..MAX_LIGHTS as u8).rev().filter_map(Slot::new).collect(),
        }
    }

    /// Register a light and assign it a slot.
    ///
    /// Fails with [`LightingError::Capacity`] when all slots are taken; the
    /// existing lights are left untouched.
    pub fn register(&mut self, light: PointLight) -> Result<LightHandle, LightingError> {
        light.validate()?;

        let slot = self.free.pop().ok_or(CapacityError {
            capacity: MAX_LIGHTS,
        })?;
        let entry = &mut self.entries[slot.index()];
        entry.light = Some(light);

        Ok(LightHandle {
            slot,
            generation: entry.generation,
        })
    }

    /// Release a light, returning its slot to the free list.
    pub fn release(&mut self, handle: LightHandle) -> Result<PointLight, LightingError> {
        let entry = self.entry_mut(handle)?;
        let light = entry
            .light
            .take()
            .ok_or(LightingError::UnknownLight(handle))?;
        entry.generation = entry.generation.wrapping_add(1);
        self.free.push(handle.slot);
        Ok(light)
    }

    /// Replace all parameters of a registered light.
    pub fn update(&mut self, handle: LightHandle, light: PointLight) -> Result<(), LightingError> {
        light.validate()?;
        let entry = self.entry_mut(handle)?;
        match entry.light.as_mut() {
            Some(current) => {
                *current = light;
                Ok(())
            }
            None => Err(LightingError::UnknownLight(handle)),
        }
    }

    /// Move a registered light.
    pub fn set_position(
        &mut self,
        handle: LightHandle,
        position: glam::Vec3,
    ) -> Result<(), LightingError> {
        let mut light = *self.get(handle).ok_or(LightingError::UnknownLight(handle))?;
        light.position = position;
        self.update(handle, light)
    }

    pub fn get(&self, handle: LightHandle) -> Option<&PointLight> {
        let entry = &self.entries[handle.slot.index()];
        if entry.generation != handle.generation {
            return None;
        }
        entry.light.as_ref()
    }

    pub fn contains(&self, handle: LightHandle) -> bool {
        self.get(handle).is_some()
    }

    /// Light currently occupying `slot`, if any.
    pub fn light_in_slot(&self, slot: Slot) -> Option<&PointLight> {
        self.entries[slot.index()].light.as_ref()
    }

    /// Occupied slots in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Slot, &PointLight)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| {
                let light = entry.light.as_ref()?;
                Some((Slot(index as u8), light))
            })
    }

    pub fn len(&self) -> usize {
        MAX_LIGHTS - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.free.is_empty()
    }

    pub fn capacity(&self) -> usize {
        MAX_LIGHTS
    }

    fn entry_mut(&mut self, handle: LightHandle) -> Result<&mut SlotEntry, LightingError> {
        let entry = &mut self.entries[handle.slot.index()];
        if entry.generation != handle.generation {
            return Err(LightingError::UnknownLight(handle));
        }
        Ok(entry)
    }
}
