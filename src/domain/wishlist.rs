//! Per-user wishlists
//!
//! A toggle-set of product ids per user id. Anonymous sessions always see an
//! empty wishlist; the session layer turns anonymous toggles into a login
//! redirect.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Wishlists(HashMap<u64, Vec<u32>>);

impl Wishlists {
    /// Removes the id if present, adds it otherwise.
    pub fn toggle(&mut self, user_id: u64, product_id: u32) {
        let list = self.0.entry(user_id).or_default();
        if let Some(pos) = list.iter().position(|&id| id == product_id) {
            list.remove(pos);
        } else {
            list.push(product_id);
        }
    }

    pub fn contains(&self, user_id: u64, product_id: u32) -> bool {
        self.0
            .get(&user_id)
            .is_some_and(|list| list.contains(&product_id))
    }

    pub fn ids_for(&self, user_id: u64) -> &[u32] {
        self.0.get(&user_id).map_or(&[], Vec::as_slice)
    }

    pub fn count(&self, user_id: u64) -> usize {
        self.ids_for(user_id).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toggle_twice_restores_state() {
        let mut lists = Wishlists::default();
        lists.toggle(1, 7);
        assert!(lists.contains(1, 7));
        lists.toggle(1, 7);
        assert!(!lists.contains(1, 7));
        assert_eq!(lists.count(1), 0);
    }

    #[test]
    fn test_lists_are_scoped_per_user() {
        let mut lists = Wishlists::default();
        lists.toggle(1, 7);
        lists.toggle(2, 9);
        assert!(lists.contains(1, 7));
        assert!(!lists.contains(2, 7));
        assert_eq!(lists.ids_for(2), &[9]);
    }
}
