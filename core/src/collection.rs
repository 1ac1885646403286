//! Entity collections and their merge rules.
//!
//! A slice keeps its domain records in an [`EntityCollection`], ordered as the
//! server returned them. Fulfilled requests merge into it according to the
//! shape of the operation:
//!
//! | Operation | Merge |
//! |-----------|-------|
//! | list fetch | [`replace`](EntityCollection::replace) wholesale |
//! | create | [`append`](EntityCollection::append) |
//! | update | [`upsert`](EntityCollection::upsert) by id, append when absent |
//! | delete | [`remove`](EntityCollection::remove) by id, no-op when absent |

use serde::{Deserialize, Serialize};

/// A record addressable by an identifier
pub trait Entity {
    /// Identifier type (numeric or string newtype)
    type Id: PartialEq + Clone + std::fmt::Debug + std::fmt::Display + Send + Sync + 'static;

    /// The record's identifier
    fn id(&self) -> &Self::Id;
}

/// Ordered list of entities held by a slice
///
/// # Example
///
/// ```
/// use travel_desk_core::collection::{Entity, EntityCollection};
///
/// #[derive(Clone, Debug, PartialEq)]
/// struct Room { id: u32 }
///
/// impl Entity for Room {
///     type Id = u32;
///     fn id(&self) -> &u32 { &self.id }
/// }
///
/// let mut rooms = EntityCollection::from(vec![Room { id: 3 }, Room { id: 7 }, Room { id: 9 }]);
/// rooms.remove(&7);
/// assert_eq!(rooms.ids(), vec![3, 9]);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityCollection<T> {
    items: Vec<T>,
}

impl<T> EntityCollection<T> {
    /// Create an empty collection
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Number of entities
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the collection is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Entities in order
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    /// Iterate entities in order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate entities in order, mutably
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Replace the whole collection (list fetch)
    pub fn replace(&mut self, items: Vec<T>) {
        self.items = items;
    }

    /// Append a new entity at the end (create)
    pub fn append(&mut self, item: T) {
        self.items.push(item);
    }

    /// Drop every entity
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Entity> EntityCollection<T> {
    /// Find an entity by id
    #[must_use]
    pub fn get(&self, id: &T::Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Find an entity by id for in-place modification
    pub fn get_mut(&mut self, id: &T::Id) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    /// Whether an entity with `id` is present
    #[must_use]
    pub fn contains(&self, id: &T::Id) -> bool {
        self.get(id).is_some()
    }

    /// Replace the entity with the same id in place, or append it (update)
    ///
    /// Returns `true` when an existing entity was replaced.
    pub fn upsert(&mut self, item: T) -> bool {
        if let Some(slot) = self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            *slot = item;
            true
        } else {
            self.items.push(item);
            false
        }
    }

    /// Remove the entity with `id` (delete)
    ///
    /// Removing an id that is not present leaves the collection unchanged.
    pub fn remove(&mut self, id: &T::Id) -> Option<T> {
        let position = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(position))
    }

    /// Identifiers in order
    #[must_use]
    pub fn ids(&self) -> Vec<T::Id> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }
}

impl<T> Default for EntityCollection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> From<Vec<T>> for EntityCollection<T> {
    fn from(items: Vec<T>) -> Self {
        Self { items }
    }
}

impl<'a, T> IntoIterator for &'a EntityCollection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl<T> IntoIterator for EntityCollection<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Item {
        id: u32,
        label: &'static str,
    }

    impl Entity for Item {
        type Id = u32;

        fn id(&self) -> &u32 {
            &self.id
        }
    }

    fn item(id: u32) -> Item {
        Item { id, label: "original" }
    }

    #[test]
    fn test_remove_existing_id() {
        let mut items = EntityCollection::from(vec![item(3), item(7), item(9)]);

        let removed = items.remove(&7);

        assert_eq!(removed, Some(item(7)));
        assert_eq!(items.ids(), vec![3, 9]);
    }

    #[test]
    fn test_remove_missing_id_is_noop() {
        let mut items = EntityCollection::from(vec![item(3), item(7), item(9)]);

        assert_eq!(items.remove(&42), None);
        assert_eq!(items.ids(), vec![3, 7, 9]);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut items = EntityCollection::from(vec![item(1), item(2), item(3)]);

        let replaced = items.upsert(Item { id: 2, label: "edited" });

        assert!(replaced);
        assert_eq!(items.ids(), vec![1, 2, 3]);
        assert_eq!(items.get(&2).map(|i| i.label), Some("edited"));
    }

    #[test]
    fn test_upsert_appends_when_absent() {
        let mut items = EntityCollection::from(vec![item(1)]);

        let replaced = items.upsert(item(5));

        assert!(!replaced);
        assert_eq!(items.ids(), vec![1, 5]);
    }

    #[test]
    fn test_replace_discards_previous_items() {
        let mut items = EntityCollection::from(vec![item(1), item(2)]);

        items.replace(vec![item(8)]);

        assert_eq!(items.as_slice(), &[item(8)]);
    }

    #[test]
    fn test_append_keeps_order() {
        let mut items = EntityCollection::new();
        items.append(item(4));
        items.append(item(2));

        assert_eq!(items.ids(), vec![4, 2]);
    }

    proptest! {
        #[test]
        fn prop_replace_equals_payload(ids in proptest::collection::vec(0u32..100, 0..20)) {
            let mut items = EntityCollection::from(vec![item(999)]);
            let payload: Vec<Item> = ids.iter().copied().map(item).collect();

            items.replace(payload.clone());

            prop_assert_eq!(items.as_slice(), payload.as_slice());
        }

        #[test]
        fn prop_remove_drops_only_target(
            ids in proptest::collection::hash_set(0u32..1000, 1..20),
            pick in any::<prop::sample::Index>(),
        ) {
            let ids: Vec<u32> = ids.into_iter().collect();
            let target = ids[pick.index(ids.len())];
            let mut items = EntityCollection::from(ids.iter().copied().map(item).collect::<Vec<_>>());

            items.remove(&target);

            let expected: Vec<u32> = ids.iter().copied().filter(|id| *id != target).collect();
            prop_assert_eq!(items.ids(), expected);
        }

        #[test]
        fn prop_upsert_never_duplicates(
            ids in proptest::collection::hash_set(0u32..50, 0..10),
            new_id in 0u32..50,
        ) {
            let mut items = EntityCollection::from(ids.iter().copied().map(item).collect::<Vec<_>>());

            items.upsert(item(new_id));

            prop_assert_eq!(items.iter().filter(|i| i.id == new_id).count(), 1);
        }
    }
}
