use alloc::vec::Vec;

use crate::key::{KeyCacheKey, KeyMap};
use crate::{IdentityConflict, ItemType, Mutation, SizeModel, SlotId, ViewPool, Window};

/// Result of one reconciliation pass.
#[derive(Clone, Debug)]
pub struct Reconciliation<K> {
    /// `Assign`/`Reposition` in increasing index order, followed by `Release`s.
    pub mutations: Vec<Mutation<K>>,
    /// Duplicate keys found in the window. The later index kept the key.
    pub conflicts: Vec<IdentityConflict>,
    /// Indexes that could not get a slot because the pool hit its hard capacity.
    pub overflow: Vec<usize>,
}

impl<K> Default for Reconciliation<K> {
    fn default() -> Self {
        Self {
            mutations: Vec::new(),
            conflicts: Vec::new(),
            overflow: Vec::new(),
        }
    }
}

impl<K> Reconciliation<K> {
    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

#[derive(Clone, Debug)]
struct Entry<K> {
    index: usize,
    key: K,
    item_type: Option<ItemType>,
    slot: Option<SlotId>,
    assigned: bool,
    shadowed: bool,
}

/// Maps a window onto pool slots with the smallest set of mutations.
///
/// A key that stays in the window keeps its slot. New keys take slots released in the same pass
/// first, then older idle slots, then freshly allocated ones.
#[derive(Clone, Debug)]
pub struct Reconciler<K> {
    entries: Vec<Entry<K>>,
    seen: KeyMap<K, usize>,
}

impl<K: KeyCacheKey> Default for Reconciler<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: KeyCacheKey> Reconciler<K> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            seen: KeyMap::new(),
        }
    }

    /// Runs one pass. `item_at(i)` returns the key and optional type of the item at index `i`.
    pub fn reconcile(
        &mut self,
        pool: &mut ViewPool<K>,
        window: Option<Window>,
        sizes: &SizeModel<K>,
        mut item_at: impl FnMut(usize) -> (K, Option<ItemType>),
    ) -> Reconciliation<K> {
        let mut out = Reconciliation::default();
        self.entries.clear();
        self.seen.clear();
        pool.begin_pass();

        if let Some(window) = window {
            self.entries.reserve(window.len());
            for index in window.indexes() {
                let (key, item_type) = item_at(index);
                let pos = self.entries.len();
                if let Some(prev) = self.seen.insert(key.clone(), pos) {
                    let first = &mut self.entries[prev];
                    first.shadowed = true;
                    swarn!(
                        first_index = first.index,
                        index,
                        "duplicate item key in window; later item wins"
                    );
                    out.conflicts.push(IdentityConflict {
                        first_index: first.index,
                        index,
                    });
                }
                self.entries.push(Entry {
                    index,
                    key,
                    item_type,
                    slot: None,
                    assigned: false,
                    shadowed: false,
                });
            }
        }

        // Keys already bound keep their slot.
        for entry in self.entries.iter_mut().filter(|e| !e.shadowed) {
            if let Some(id) = pool.find_by_key(&entry.key) {
                pool.mark_used(id);
                entry.slot = Some(id);
            }
        }

        let released = pool.sweep_unused();

        for entry in self
            .entries
            .iter_mut()
            .filter(|e| !e.shadowed && e.slot.is_none())
        {
            match pool.acquire(entry.key.clone(), entry.item_type) {
                Ok(id) => {
                    entry.slot = Some(id);
                    entry.assigned = true;
                }
                Err(_err) => {
                    swarn!(index = entry.index, error = %_err, "no slot for visible item");
                    out.overflow.push(entry.index);
                }
            }
        }

        for entry in &self.entries {
            let Some(slot) = entry.slot else {
                continue;
            };
            let position = sizes.position_of(entry.index);
            let size = sizes.size_of(entry.index);
            let (prev_index, prev_position, prev_size) =
                pool.set_layout(slot, entry.index, position, size);
            if entry.assigned {
                out.mutations.push(Mutation::Assign {
                    slot,
                    index: entry.index,
                    key: entry.key.clone(),
                    item_type: entry.item_type,
                    position,
                    size,
                });
            } else if prev_index != Some(entry.index)
                || prev_position != Some(position)
                || prev_size != size
            {
                out.mutations.push(Mutation::Reposition {
                    slot,
                    index: entry.index,
                    position,
                    size,
                });
            }
        }

        // Slots released this pass and not rebound stay hidden.
        for (slot, key) in released {
            let rebound = pool.slot(slot).is_some_and(|s| s.is_bound());
            if !rebound {
                out.mutations.push(Mutation::Release { slot, key });
            }
        }

        strace!(
            mutations = out.mutations.len(),
            slots = pool.len(),
            "Reconciler::reconcile"
        );
        out
    }
}
