//! Chain: the ordered slots linking a start anchor to a target anchor

use super::entity::{Entity, EntityId};
use serde::{Deserialize, Serialize};

/// The puzzle chain
///
/// Once seeded, slot 0 holds the start anchor and the last slot holds the
/// target anchor; everything in between is filled by the player. A chain of
/// `n` handshakes has `n + 1` slots. An engine with no puzzle yet holds an
/// empty chain.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Chain {
    slots: Vec<Option<Entity>>,
}

impl Chain {
    /// Seed a chain for `handshakes` connections (at least one)
    pub fn new(start: Entity, target: Entity, handshakes: usize) -> Self {
        let len = handshakes.max(1) + 1;
        let mut slots = vec![None; len];
        slots[0] = Some(start);
        slots[len - 1] = Some(target);
        Self { slots }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Number of connections the chain asks for
    pub fn handshakes(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    pub fn slots(&self) -> &[Option<Entity>] {
        &self.slots
    }

    /// The entity in slot `index`, if the slot exists and is filled
    pub fn get(&self, index: usize) -> Option<&Entity> {
        self.slots.get(index).and_then(Option::as_ref)
    }

    pub fn start(&self) -> Option<&Entity> {
        self.get(0)
    }

    pub fn target(&self) -> Option<&Entity> {
        self.slots.len().checked_sub(1).and_then(|last| self.get(last))
    }

    /// Whether `index` is the first or last slot
    pub fn is_anchor(&self, index: usize) -> bool {
        !self.slots.is_empty() && (index == 0 || index == self.slots.len() - 1)
    }

    /// Whether the person already occupies some slot
    pub fn contains(&self, id: EntityId) -> bool {
        self.occupied_ids().any(|occupied| occupied == id)
    }

    /// Ids of every filled slot, in chain order
    pub fn occupied_ids(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.slots.iter().flatten().map(|e| e.id)
    }

    /// Whether the person occupies a slot other than `index`
    pub fn contains_elsewhere(&self, id: EntityId, index: usize) -> bool {
        self.slots
            .iter()
            .enumerate()
            .any(|(i, slot)| i != index && slot.as_ref().is_some_and(|e| e.id == id))
    }

    /// Count of slots still waiting for a person
    pub fn empty_slots(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_none()).count()
    }

    /// A seeded chain with every slot filled
    pub fn is_complete(&self) -> bool {
        !self.slots.is_empty() && self.empty_slots() == 0
    }

    /// Filled neighbors of `index`: (left, right)
    pub fn neighbors(&self, index: usize) -> (Option<&Entity>, Option<&Entity>) {
        let left = index.checked_sub(1).and_then(|i| self.get(i));
        let right = self.get(index + 1);
        (left, right)
    }

    /// Rebuild the chain with a new anchor at `index`
    ///
    /// The opposite anchor is kept; every intermediate slot is emptied. Returns
    /// `None` if `index` is not an anchor.
    pub fn with_anchor(&self, index: usize, entity: Entity) -> Option<Chain> {
        if !self.is_anchor(index) {
            return None;
        }
        let last = self.slots.len() - 1;
        let mut slots = vec![None; self.slots.len()];
        if index == 0 {
            slots[last] = self.slots[last].clone();
        } else {
            slots[0] = self.slots[0].clone();
        }
        slots[index] = Some(entity);
        Some(Chain { slots })
    }

    /// Write `entity` into an intermediate slot
    ///
    /// Returns false (and changes nothing) for anchors and out-of-range indexes.
    pub(crate) fn place(&mut self, index: usize, entity: Entity) -> bool {
        if index == 0 || index + 1 >= self.slots.len() {
            return false;
        }
        self.slots[index] = Some(entity);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(id: u64, name: &str) -> Entity {
        Entity::new(id, name)
    }

    #[test]
    fn new_chain_has_anchors_and_empty_middle() {
        let chain = Chain::new(person(1, "Start"), person(2, "Target"), 3);

        assert_eq!(chain.len(), 4);
        assert_eq!(chain.handshakes(), 3);
        assert_eq!(chain.start().map(|e| e.id), Some(EntityId::new(1)));
        assert_eq!(chain.target().map(|e| e.id), Some(EntityId::new(2)));
        assert_eq!(chain.empty_slots(), 2);
        assert!(!chain.is_complete());
    }

    #[test]
    fn zero_handshakes_still_yields_two_slots() {
        let chain = Chain::new(person(1, "Start"), person(2, "Target"), 0);
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn empty_chain_has_no_anchors() {
        let chain = Chain::default();
        assert!(chain.is_empty());
        assert!(!chain.is_anchor(0));
        assert!(!chain.is_complete());
        assert!(chain.target().is_none());
    }

    #[test]
    fn place_refuses_anchors() {
        let mut chain = Chain::new(person(1, "Start"), person(2, "Target"), 2);
        assert!(!chain.place(0, person(3, "X")));
        assert!(!chain.place(2, person(3, "X")));
        assert!(!chain.place(7, person(3, "X")));
        assert!(chain.place(1, person(3, "X")));
        assert!(chain.is_complete());
    }

    #[test]
    fn with_anchor_keeps_opposite_and_clears_middle() {
        let mut chain = Chain::new(person(1, "Start"), person(2, "Target"), 3);
        chain.place(1, person(3, "X"));
        chain.place(2, person(4, "Y"));

        let replaced = chain.with_anchor(3, person(9, "New Target")).unwrap();
        assert_eq!(replaced.len(), 4);
        assert_eq!(replaced.start().map(|e| e.id), Some(EntityId::new(1)));
        assert_eq!(replaced.target().map(|e| e.id), Some(EntityId::new(9)));
        assert_eq!(replaced.empty_slots(), 2);

        let replaced = chain.with_anchor(0, person(8, "New Start")).unwrap();
        assert_eq!(replaced.start().map(|e| e.id), Some(EntityId::new(8)));
        assert_eq!(replaced.target().map(|e| e.id), Some(EntityId::new(2)));
        assert_eq!(replaced.empty_slots(), 2);

        assert!(chain.with_anchor(1, person(7, "Z")).is_none());
    }

    #[test]
    fn neighbors_only_report_filled_slots() {
        let mut chain = Chain::new(person(1, "Start"), person(2, "Target"), 3);
        let (left, right) = chain.neighbors(1);
        assert_eq!(left.map(|e| e.id.get()), Some(1));
        assert!(right.is_none());

        chain.place(2, person(3, "X"));
        let (left, right) = chain.neighbors(1);
        assert_eq!(left.map(|e| e.id.get()), Some(1));
        assert_eq!(right.map(|e| e.id.get()), Some(3));
    }

    #[test]
    fn contains_elsewhere_ignores_own_slot() {
        let mut chain = Chain::new(person(1, "Start"), person(2, "Target"), 3);
        chain.place(1, person(3, "X"));

        assert!(chain.contains(EntityId::new(3)));
        assert!(!chain.contains_elsewhere(EntityId::new(3), 1));
        assert!(chain.contains_elsewhere(EntityId::new(3), 2));
        assert!(chain.contains_elsewhere(EntityId::new(1), 2));
    }
}
