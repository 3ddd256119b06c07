//! Symmetric "within melee range" relation

use ahash::{AHashMap, AHashSet};

use crate::core::types::CharacterId;

/// Undirected proximity graph. Every edge is stored in both directions.
#[derive(Debug, Default, Clone)]
pub struct ProximityGraph {
    edges: AHashMap<CharacterId, AHashSet<CharacterId>>,
}

impl ProximityGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Put two characters in melee range of each other. Self-edges are ignored.
    pub fn establish(&mut self, a: CharacterId, b: CharacterId) -> bool {
        if a == b {
            return false;
        }
        let added = self.edges.entry(a).or_default().insert(b);
        self.edges.entry(b).or_default().insert(a);
        added
    }

    /// Remove the edge between two characters
    pub fn separate(&mut self, a: CharacterId, b: CharacterId) {
        self.remove_half(a, b);
        self.remove_half(b, a);
    }

    fn remove_half(&mut self, from: CharacterId, to: CharacterId) {
        if let Some(set) = self.edges.get_mut(&from) {
            set.remove(&to);
            if set.is_empty() {
                self.edges.remove(&from);
            }
        }
    }

    /// Drop every edge touching a character
    pub fn clear(&mut self, character: CharacterId) {
        if let Some(neighbours) = self.edges.remove(&character) {
            for other in neighbours {
                self.remove_half(other, character);
            }
        }
    }

    pub fn is_in_proximity(&self, a: CharacterId, b: CharacterId) -> bool {
        self.edges.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Everyone in melee range of a character, in a stable order
    pub fn neighbours(&self, character: CharacterId) -> Vec<CharacterId> {
        let mut out: Vec<CharacterId> = self
            .edges
            .get(&character)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default();
        out.sort();
        out
    }

    pub fn has_any(&self, character: CharacterId) -> bool {
        self.edges.contains_key(&character)
    }

    /// Every stored edge has its mirror
    pub fn is_symmetric(&self) -> bool {
        self.edges
            .iter()
            .all(|(a, set)| set.iter().all(|b| self.is_in_proximity(*b, *a)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_establish_is_symmetric() {
        let mut graph = ProximityGraph::new();
        let a = CharacterId::new();
        let b = CharacterId::new();

        assert!(graph.establish(a, b));
        assert!(!graph.establish(b, a));
        assert!(graph.is_in_proximity(a, b));
        assert!(graph.is_in_proximity(b, a));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_self_edge_rejected() {
        let mut graph = ProximityGraph::new();
        let a = CharacterId::new();
        assert!(!graph.establish(a, a));
        assert!(!graph.has_any(a));
    }

    #[test]
    fn test_clear_removes_both_sides() {
        let mut graph = ProximityGraph::new();
        let a = CharacterId::new();
        let b = CharacterId::new();
        let c = CharacterId::new();
        graph.establish(a, b);
        graph.establish(a, c);
        graph.establish(b, c);

        graph.clear(a);

        assert!(!graph.is_in_proximity(b, a));
        assert!(!graph.is_in_proximity(c, a));
        assert!(graph.is_in_proximity(b, c));
        assert!(!graph.has_any(a));
        assert!(graph.is_symmetric());
    }

    #[test]
    fn test_separate_single_pair() {
        let mut graph = ProximityGraph::new();
        let a = CharacterId::new();
        let b = CharacterId::new();
        graph.establish(a, b);
        graph.separate(b, a);
        assert!(!graph.has_any(a));
        assert!(!graph.has_any(b));
    }
}
