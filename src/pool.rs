use alloc::collections::VecDeque;
use alloc::vec::Vec;

use crate::key::{KeyCacheKey, KeyMap};
use crate::{ItemType, PoolError, Position, SlotId};

/// A pooled view. The slot outlives any item bound to it.
#[derive(Clone, Debug)]
pub struct Slot<K> {
    id: SlotId,
    key: Option<K>,
    index: Option<usize>,
    item_type: Option<ItemType>,
    position: Option<Position>,
    size: f64,
    used: bool,
}

impl<K> Slot<K> {
    fn new(id: SlotId) -> Self {
        Self {
            id,
            key: None,
            index: None,
            item_type: None,
            position: None,
            size: 0.0,
            used: false,
        }
    }

    pub fn id(&self) -> SlotId {
        self.id
    }

    /// Key of the bound item, `None` while idle.
    pub fn key(&self) -> Option<&K> {
        self.key.as_ref()
    }

    /// List index of the bound item as of the last pass.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Type of the bound item, or of the last item bound before going idle.
    pub fn item_type(&self) -> Option<ItemType> {
        self.item_type
    }

    /// Position applied in the last pass.
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn is_bound(&self) -> bool {
        self.key.is_some()
    }

    pub fn is_used(&self) -> bool {
        self.used
    }
}

/// A grow-only collection of reusable slots with `O(1)` lookup by item key.
///
/// Slots are created lazily and never destroyed (except by [`ViewPool::clear`]); released slots
/// wait in an idle queue to be rebound.
#[derive(Clone, Debug)]
pub struct ViewPool<K> {
    slots: Vec<Slot<K>>,
    by_key: KeyMap<K, SlotId>,
    idle: VecDeque<SlotId>,
    capacity: Option<usize>,
}

impl<K> ViewPool<K> {
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn set_capacity(&mut self, capacity: Option<usize>) {
        self.capacity = capacity;
    }

    /// Number of live slots (the high-water mark).
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn bound_len(&self) -> usize {
        self.by_key.len()
    }

    pub fn idle_len(&self) -> usize {
        self.idle.len()
    }

    pub fn slot(&self, id: SlotId) -> Option<&Slot<K>> {
        self.slots.get(id.index())
    }

    pub fn slots(&self) -> &[Slot<K>] {
        &self.slots
    }
}

impl<K: KeyCacheKey> ViewPool<K> {
    /// `capacity` is an optional hard ceiling on the number of slots.
    pub fn new(capacity: Option<usize>) -> Self {
        Self {
            slots: Vec::new(),
            by_key: KeyMap::new(),
            idle: VecDeque::new(),
            capacity,
        }
    }

    pub fn find_by_key(&self, key: &K) -> Option<SlotId> {
        self.by_key.get(key).copied()
    }

    /// Returns the slot bound to `key`, rebinding an idle slot or allocating a new one if needed.
    ///
    /// Idle slots whose last item had the same `item_type` are preferred. Fails only when a hard
    /// capacity is configured, reached, and no slot is idle.
    pub fn acquire(&mut self, key: K, item_type: Option<ItemType>) -> Result<SlotId, PoolError> {
        if let Some(id) = self.find_by_key(&key) {
            return Ok(id);
        }

        let id = if let Some(id) = self.take_idle(item_type) {
            id
        } else {
            if let Some(capacity) = self.capacity {
                if self.slots.len() >= capacity {
                    return Err(PoolError::CapacityExceeded { capacity });
                }
            }
            let id = SlotId(self.slots.len() as u32);
            self.slots.push(Slot::new(id));
            strace!(slot = id.0, "ViewPool: allocated slot");
            id
        };

        let slot = &mut self.slots[id.index()];
        slot.key = Some(key.clone());
        slot.item_type = item_type;
        slot.index = None;
        slot.position = None;
        slot.used = true;
        self.by_key.insert(key, id);
        Ok(id)
    }

    fn take_idle(&mut self, item_type: Option<ItemType>) -> Option<SlotId> {
        let pos = self
            .idle
            .iter()
            .position(|id| self.slots[id.index()].item_type == item_type)
            .or(if self.idle.is_empty() { None } else { Some(0) })?;
        self.idle.remove(pos)
    }

    /// Marks a slot idle and drops its key from the lookup index. The slot itself stays alive.
    ///
    /// Returns the key that was bound, if any.
    pub fn release(&mut self, id: SlotId) -> Option<K> {
        let key = self.unbind(id)?;
        self.idle.push_back(id);
        Some(key)
    }

    fn unbind(&mut self, id: SlotId) -> Option<K> {
        let slot = self.slots.get_mut(id.index())?;
        let key = slot.key.take()?;
        slot.index = None;
        slot.position = None;
        slot.used = false;
        self.by_key.remove(&key);
        Some(key)
    }

    /// Clears every slot's used flag; call at the start of a reconciliation pass.
    pub fn begin_pass(&mut self) {
        for slot in &mut self.slots {
            slot.used = false;
        }
    }

    pub fn mark_used(&mut self, id: SlotId) {
        if let Some(slot) = self.slots.get_mut(id.index()) {
            slot.used = true;
        }
    }

    /// Releases every bound slot that was not marked used this pass.
    ///
    /// Released slots go to the front of the idle queue in slot order, so the next acquisitions
    /// reuse them before older idle slots. Returns `(slot, key)` for each release.
    pub fn sweep_unused(&mut self) -> Vec<(SlotId, K)> {
        let stale: Vec<SlotId> = self
            .slots
            .iter()
            .filter(|s| s.key.is_some() && !s.used)
            .map(|s| s.id)
            .collect();
        let mut released = Vec::with_capacity(stale.len());
        for &id in &stale {
            if let Some(key) = self.unbind(id) {
                released.push((id, key));
            }
        }
        for &(id, _) in released.iter().rev() {
            self.idle.push_front(id);
        }
        released
    }

    /// Records where a bound slot is drawn. Returns the previous `(index, position, size)`.
    pub(crate) fn set_layout(
        &mut self,
        id: SlotId,
        index: usize,
        position: Position,
        size: f64,
    ) -> (Option<usize>, Option<Position>, f64) {
        let slot = &mut self.slots[id.index()];
        let prev = (slot.index, slot.position, slot.size);
        slot.index = Some(index);
        slot.position = Some(position);
        slot.size = size;
        prev
    }

    /// Drops every slot. Used on teardown and when the configuration changes.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.by_key.clear();
        self.idle.clear();
    }
}
