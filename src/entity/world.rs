//! Character and location registry
//!
//! Every stored link between characters is a `CharacterId`; the world resolves
//! it back to a live character or reports that it no longer exists.

use ahash::AHashMap;

use crate::core::error::{EngineError, Result};
use crate::core::types::{CharacterId, LocationId};
use crate::entity::character::Character;
use crate::entity::weapon::Weapon;

#[derive(Debug, Clone)]
pub struct Location {
    pub id: LocationId,
    pub name: String,
    /// Multiplier on infection progression for anyone here
    pub infection_risk: f32,
}

impl Location {
    pub fn new(id: LocationId, name: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            infection_risk: 1.0,
        }
    }

    pub fn with_infection_risk(mut self, risk: f32) -> Self {
        self.infection_risk = risk;
        self
    }
}

#[derive(Debug, Default)]
pub struct World {
    characters: AHashMap<CharacterId, Character>,
    locations: AHashMap<LocationId, Location>,
    ground: AHashMap<LocationId, Vec<Weapon>>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    // === LOCATIONS ===

    pub fn add_location(&mut self, location: Location) {
        self.locations.insert(location.id, location);
    }

    pub fn location(&self, id: LocationId) -> Option<&Location> {
        self.locations.get(&id)
    }

    /// Infection multiplier at a location; unknown locations are ordinary
    pub fn infection_risk(&self, id: LocationId) -> f32 {
        self.locations.get(&id).map_or(1.0, |l| l.infection_risk)
    }

    /// Items lying on the ground
    pub fn ground_items(&self, location: LocationId) -> &[Weapon] {
        self.ground.get(&location).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn drop_item(&mut self, location: LocationId, item: Weapon) {
        self.ground.entry(location).or_default().push(item);
    }

    // === CHARACTERS ===

    pub fn spawn(&mut self, character: Character) -> CharacterId {
        let id = character.id;
        self.characters.insert(id, character);
        id
    }

    pub fn despawn(&mut self, id: CharacterId) -> Option<Character> {
        self.characters.remove(&id)
    }

    pub fn get(&self, id: CharacterId) -> Option<&Character> {
        self.characters.get(&id)
    }

    pub fn get_mut(&mut self, id: CharacterId) -> Option<&mut Character> {
        self.characters.get_mut(&id)
    }

    pub fn try_get(&self, id: CharacterId) -> Result<&Character> {
        self.get(id).ok_or(EngineError::CharacterNotFound(id))
    }

    pub fn try_get_mut(&mut self, id: CharacterId) -> Result<&mut Character> {
        self.get_mut(id).ok_or(EngineError::CharacterNotFound(id))
    }

    pub fn contains(&self, id: CharacterId) -> bool {
        self.characters.contains_key(&id)
    }

    /// Display name, or "someone" for a stale reference
    pub fn name_of(&self, id: CharacterId) -> String {
        self.get(id).map_or_else(|| "someone".to_string(), |c| c.name.clone())
    }

    pub fn location_of(&self, id: CharacterId) -> Option<LocationId> {
        self.get(id).map(|c| c.location)
    }

    pub fn same_location(&self, a: CharacterId, b: CharacterId) -> bool {
        match (self.location_of(a), self.location_of(b)) {
            (Some(la), Some(lb)) => la == lb,
            _ => false,
        }
    }

    /// Everyone in a location, in a stable order
    pub fn characters_in(&self, location: LocationId) -> Vec<CharacterId> {
        let mut ids: Vec<CharacterId> = self
            .characters
            .values()
            .filter(|c| c.location == location)
            .map(|c| c.id)
            .collect();
        ids.sort();
        ids
    }

    /// Every character, in a stable order
    pub fn character_ids(&self) -> Vec<CharacterId> {
        let mut ids: Vec<CharacterId> = self.characters.keys().copied().collect();
        ids.sort();
        ids
    }

    /// Characters in a location whose name starts with (or equals) the query,
    /// ignoring case. Exact matches come first.
    pub fn search(&self, location: LocationId, query: &str) -> Vec<CharacterId> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();
        for id in self.characters_in(location) {
            let Some(character) = self.get(id) else { continue };
            let name = character.name.to_lowercase();
            if name == query {
                exact.push(id);
            } else if name.starts_with(&query) || name.split_whitespace().any(|word| word.starts_with(&query)) {
                partial.push(id);
            }
        }
        exact.extend(partial);
        exact
    }

    /// Move a character without any combat checks
    pub fn relocate(&mut self, id: CharacterId, to: LocationId) -> Result<()> {
        let character = self.try_get_mut(id)?;
        character.location = to;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.characters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.characters.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_prefers_exact_match() {
        let mut world = World::new();
        let here = LocationId(1);
        let bob = world.spawn(Character::new("Bob", here));
        let bobby = world.spawn(Character::new("Bobby Tables", here));
        world.spawn(Character::new("Bob", LocationId(2)));

        let found = world.search(here, "bob");
        assert_eq!(found, vec![bob, bobby]);

        let found = world.search(here, "tab");
        assert_eq!(found, vec![bobby]);

        assert!(world.search(here, "  ").is_empty());
    }

    #[test]
    fn test_stale_reference_name() {
        let world = World::new();
        assert_eq!(world.name_of(CharacterId::new()), "someone");
    }

    #[test]
    fn test_ground_items() {
        let mut world = World::new();
        let here = LocationId(3);
        assert!(world.ground_items(here).is_empty());
        world.drop_item(here, Weapon::knife());
        assert_eq!(world.ground_items(here)[0].name, "knife");
    }

    #[test]
    fn test_relocate_unknown_character_errors() {
        let mut world = World::new();
        assert!(matches!(
            world.relocate(CharacterId::new(), LocationId(1)),
            Err(EngineError::CharacterNotFound(_))
        ));
    }
}
