//! Tracks which parts of a conversion event have been handled.
//!
//! The driver registers one aspect per thing that needs converting (an
//! inserted node, each of its attributes). Converters consume what they
//! handle; later converters test first and skip consumed aspects. Aspects
//! still available after dispatch are conversion misses.

use std::collections::BTreeMap;

/// Aspect name of one attribute
pub fn attribute_aspect(key: &str) -> String {
    format!("attribute:{}", key)
}

#[derive(Debug, Clone)]
pub struct Consumable<K> {
    items: BTreeMap<K, bool>,
}

impl<K: Ord> Default for Consumable<K> {
    fn default() -> Self {
        Self { items: BTreeMap::new() }
    }
}

impl<K: Ord + Clone> Consumable<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: K) {
        self.items.insert(key, true);
    }

    /// `Some(true)` if the aspect can still be consumed, `None` if it was never added
    pub fn test(&self, key: &K) -> Option<bool> {
        self.items.get(key).copied()
    }

    pub fn is_available(&self, key: &K) -> bool {
        self.test(key).unwrap_or(false)
    }

    /// Consume an aspect. Returns false if it is unknown or already consumed.
    pub fn consume(&mut self, key: &K) -> bool {
        match self.items.get_mut(key) {
            Some(available) if *available => {
                *available = false;
                true
            }
            _ => false,
        }
    }

    /// Make a consumed aspect available again
    pub fn revert(&mut self, key: &K) -> bool {
        match self.items.get_mut(key) {
            Some(available) if !*available => {
                *available = true;
                true
            }
            _ => false,
        }
    }

    pub fn unconsumed(&self) -> impl Iterator<Item = &K> {
        self.items
            .iter()
            .filter(|(_, available)| **available)
            .map(|(key, _)| key)
    }
}
