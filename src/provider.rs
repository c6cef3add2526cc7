//! Item providers
//!
//! A provider owns an ordered set of items. Positions inside one provider are
//! always a permutation of `0..len`; every mutation here preserves that.

use std::collections::HashMap;
use std::fmt;
use std::time::Instant;

use crate::items::{DockItem, DropPayload, ItemId, ProviderId};

/// Provider-level policy
pub trait ProviderBehavior {
    fn can_accept_drop(&self, _payload: &DropPayload) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn accept_drop(&mut self, _payload: &DropPayload) -> anyhow::Result<bool> {
        Ok(false)
    }

    fn can_remove(&self, _item: &DockItem) -> bool {
        false
    }
}

/// Flag-driven behavior used by the preview and scenario runner
#[derive(Debug, Clone, Default)]
pub struct BasicBehavior {
    pub accepts_drops: bool,
    pub removable: bool,
    /// Payloads accepted so far
    pub dropped: Vec<DropPayload>,
}

impl BasicBehavior {
    pub fn new(accepts_drops: bool, removable: bool) -> Self {
        Self {
            accepts_drops,
            removable,
            dropped: Vec::new(),
        }
    }
}

impl ProviderBehavior for BasicBehavior {
    fn can_accept_drop(&self, payload: &DropPayload) -> anyhow::Result<bool> {
        Ok(self.accepts_drops && !payload.uris.is_empty())
    }

    fn accept_drop(&mut self, payload: &DropPayload) -> anyhow::Result<bool> {
        if !self.accepts_drops {
            return Ok(false);
        }
        self.dropped.push(payload.clone());
        Ok(true)
    }

    fn can_remove(&self, item: &DockItem) -> bool {
        self.removable && !item.is_separator()
    }
}

/// Added/removed sets from one provider mutation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemsChanged {
    pub provider: Option<ProviderId>,
    pub added: Vec<ItemId>,
    pub removed: Vec<ItemId>,
}

impl ItemsChanged {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// An ordered collection of dock items
pub struct ItemProvider {
    pub id: ProviderId,
    pub name: String,
    items: Vec<DockItem>,
    behavior: Box<dyn ProviderBehavior>,
}

impl fmt::Debug for ItemProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemProvider")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("items", &self.items)
            .finish_non_exhaustive()
    }
}

impl ItemProvider {
    pub fn new(id: ProviderId, name: impl Into<String>, behavior: impl ProviderBehavior + 'static) -> Self {
        Self {
            id,
            name: name.into(),
            items: Vec::new(),
            behavior: Box::new(behavior),
        }
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Items in storage order (not position order)
    pub fn items(&self) -> &[DockItem] {
        &self.items
    }

    /// Items sorted by position
    pub fn ordered(&self) -> Vec<&DockItem> {
        let mut items: Vec<&DockItem> = self.items.iter().collect();
        items.sort_by_key(|item| item.position);
        items
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.items.iter().any(|item| item.id == id)
    }

    pub fn item(&self, id: ItemId) -> Option<&DockItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut DockItem> {
        self.items.iter_mut().find(|item| item.id == id)
    }

    /// Append `item` at the end
    pub fn add_item(&mut self, mut item: DockItem, now: Instant) -> ItemsChanged {
        item.provider = self.id;
        item.position = self.items.len();
        item.added_at = Some(now);
        let id = item.id;
        self.items.push(item);

        tracing::debug!(provider = %self.name, item = id.0, "item added");
        ItemsChanged {
            provider: Some(self.id),
            added: vec![id],
            removed: Vec::new(),
        }
    }

    /// Remove an item, closing the gap in positions
    pub fn remove_item(&mut self, id: ItemId) -> Option<(DockItem, ItemsChanged)> {
        let index = self.items.iter().position(|item| item.id == id)?;
        let item = self.items.remove(index);
        for other in &mut self.items {
            if other.position > item.position {
                other.position -= 1;
            }
        }

        tracing::debug!(provider = %self.name, item = id.0, "item removed");
        Some((
            item,
            ItemsChanged {
                provider: Some(self.id),
                added: Vec::new(),
                removed: vec![id],
            },
        ))
    }

    /// Move `id` to slot `target`, shifting the items in between by one
    ///
    /// Returns false if nothing moved.
    pub fn move_item(&mut self, id: ItemId, target: usize, now: Instant) -> bool {
        let Some(from) = self.item(id).map(|item| item.position) else {
            return false;
        };
        let target = target.min(self.items.len().saturating_sub(1));
        if from == target {
            return false;
        }

        for item in &mut self.items {
            if item.id == id {
                item.position = target;
            } else if from < target && item.position > from && item.position <= target {
                let slot = item.position - 1;
                item.move_to(slot, now);
            } else if target < from && item.position >= target && item.position < from {
                let slot = item.position + 1;
                item.move_to(slot, now);
            }
        }
        true
    }

    /// Current position of every item
    pub fn positions(&self) -> HashMap<ItemId, usize> {
        self.items.iter().map(|item| (item.id, item.position)).collect()
    }

    /// Put items back to previously captured positions
    ///
    /// Items missing from `positions` keep theirs.
    pub fn restore_positions(&mut self, positions: &HashMap<ItemId, usize>, now: Instant) {
        for item in &mut self.items {
            if let Some(&slot) = positions.get(&item.id) {
                item.move_to(slot, now);
            }
        }
    }

    /// True if positions are exactly `0..len` with no duplicates
    pub fn positions_are_permutation(&self) -> bool {
        let mut seen = vec![false; self.items.len()];
        for item in &self.items {
            match seen.get_mut(item.position) {
                Some(slot) if !*slot => *slot = true,
                _ => return false,
            }
        }
        true
    }

    /// # Panics
    /// If positions are not a permutation of `0..len`.
    pub fn assert_positions_valid(&self) {
        assert!(
            self.positions_are_permutation(),
            "provider {} positions are not a permutation: {:?}",
            self.name,
            self.ordered()
                .iter()
                .map(|item| (item.id.0, item.position))
                .collect::<Vec<_>>()
        );
    }

    pub fn can_remove(&self, id: ItemId) -> bool {
        self.item(id).is_some_and(|item| self.behavior.can_remove(item))
    }

    pub fn can_accept_drop(&self, payload: &DropPayload) -> anyhow::Result<bool> {
        self.behavior.can_accept_drop(payload)
    }

    pub fn accept_drop(&mut self, payload: &DropPayload) -> anyhow::Result<bool> {
        self.behavior.accept_drop(payload)
    }
}

/// All providers in dock order
#[derive(Debug, Default)]
pub struct ProviderList {
    providers: Vec<ItemProvider>,
}

impl ProviderList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, provider: ItemProvider) {
        self.providers.push(provider);
    }

    pub fn iter(&self) -> impl Iterator<Item = &ItemProvider> {
        self.providers.iter()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn get(&self, id: ProviderId) -> Option<&ItemProvider> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn get_mut(&mut self, id: ProviderId) -> Option<&mut ItemProvider> {
        self.providers.iter_mut().find(|p| p.id == id)
    }

    /// Provider owning `item`
    pub fn owner_of(&self, item: ItemId) -> Option<&ItemProvider> {
        self.providers.iter().find(|p| p.contains(item))
    }

    pub fn owner_of_mut(&mut self, item: ItemId) -> Option<&mut ItemProvider> {
        self.providers.iter_mut().find(|p| p.contains(item))
    }

    pub fn item(&self, id: ItemId) -> Option<&DockItem> {
        self.providers.iter().find_map(|p| p.item(id))
    }

    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut DockItem> {
        self.providers.iter_mut().find_map(|p| p.item_mut(id))
    }

    /// Every item: providers in order, items by position
    pub fn ordered_items(&self) -> Vec<&DockItem> {
        self.providers.iter().flat_map(|p| p.ordered()).collect()
    }

    pub fn all_items(&self) -> impl Iterator<Item = &DockItem> {
        self.providers.iter().flat_map(|p| p.items().iter())
    }

    pub fn item_count(&self) -> usize {
        self.providers.iter().map(ItemProvider::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(n: u64) -> ItemProvider {
        let now = Instant::now();
        let mut p = ItemProvider::new(ProviderId(1), "launchers", BasicBehavior::new(true, true));
        for i in 0..n {
            p.add_item(DockItem::launcher(i, format!("item{i}")), now);
        }
        p
    }

    fn order(p: &ItemProvider) -> Vec<u64> {
        p.ordered().iter().map(|item| item.id.0).collect()
    }

    #[test]
    fn test_add_assigns_sequential_positions() {
        let p = provider(3);
        assert_eq!(order(&p), vec![0, 1, 2]);
        assert!(p.positions_are_permutation());
        assert!(p.items().iter().all(|item| item.provider == ProviderId(1)));
    }

    #[test]
    fn test_move_forward_shifts_in_between() {
        let mut p = provider(4);
        assert!(p.move_item(ItemId(0), 2, Instant::now()));
        assert_eq!(order(&p), vec![1, 2, 0, 3]);
        assert!(p.positions_are_permutation());
    }

    #[test]
    fn test_move_backward_shifts_in_between() {
        let mut p = provider(4);
        assert!(p.move_item(ItemId(3), 1, Instant::now()));
        assert_eq!(order(&p), vec![0, 3, 1, 2]);
        assert!(p.positions_are_permutation());
    }

    #[test]
    fn test_move_to_same_slot_is_noop() {
        let mut p = provider(3);
        assert!(!p.move_item(ItemId(1), 1, Instant::now()));
        assert!(!p.move_item(ItemId(99), 0, Instant::now()));
    }

    #[test]
    fn test_move_clamps_target() {
        let mut p = provider(3);
        assert!(p.move_item(ItemId(0), 10, Instant::now()));
        assert_eq!(order(&p), vec![1, 2, 0]);
    }

    #[test]
    fn test_shifted_items_record_slide() {
        let now = Instant::now();
        let mut p = provider(3);
        p.move_item(ItemId(0), 2, now);
        let moved = p.item(ItemId(1)).unwrap().last_move.unwrap();
        assert_eq!(moved.from, 1);
        assert!(p.item(ItemId(0)).unwrap().last_move.is_none());
    }

    #[test]
    fn test_remove_closes_gap() {
        let mut p = provider(4);
        let (item, changed) = p.remove_item(ItemId(1)).unwrap();
        assert_eq!(item.id, ItemId(1));
        assert_eq!(changed.removed, vec![ItemId(1)]);
        assert_eq!(order(&p), vec![0, 2, 3]);
        assert!(p.positions_are_permutation());
    }

    #[test]
    fn test_restore_positions() {
        let now = Instant::now();
        let mut p = provider(3);
        let snapshot = p.positions();
        p.move_item(ItemId(0), 2, now);
        p.restore_positions(&snapshot, now);
        assert_eq!(order(&p), vec![0, 1, 2]);
    }

    #[test]
    fn test_detects_broken_permutation() {
        let mut p = provider(3);
        p.item_mut(ItemId(2)).unwrap().position = 0;
        assert!(!p.positions_are_permutation());
    }

    #[test]
    fn test_separator_is_never_removable() {
        let now = Instant::now();
        let mut p = provider(1);
        p.add_item(DockItem::separator(9), now);
        assert!(p.can_remove(ItemId(0)));
        assert!(!p.can_remove(ItemId(9)));
    }

    #[test]
    fn test_list_orders_across_providers() {
        let now = Instant::now();
        let mut list = ProviderList::new();
        let mut a = ItemProvider::new(ProviderId(1), "a", BasicBehavior::default());
        a.add_item(DockItem::launcher(1, "a1"), now);
        a.add_item(DockItem::launcher(2, "a2"), now);
        let mut b = ItemProvider::new(ProviderId(2), "b", BasicBehavior::default());
        b.add_item(DockItem::launcher(3, "b1"), now);
        list.push(a);
        list.push(b);

        list.get_mut(ProviderId(1)).unwrap().move_item(ItemId(2), 0, now);
        let ids: Vec<u64> = list.ordered_items().iter().map(|i| i.id.0).collect();
        assert_eq!(ids, vec![2, 1, 3]);
        assert_eq!(list.owner_of(ItemId(3)).unwrap().id, ProviderId(2));
        assert_eq!(list.item_count(), 3);
    }
}
