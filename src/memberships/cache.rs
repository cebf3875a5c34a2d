//! Single-flight, evictable cache of [`ColumnIndex`] entries.
//!
//! Each column owns a slot holding a weak pointer to its entry. A request
//! locks the slot, tries to upgrade, and only on failure runs the loader,
//! still holding the slot lock: concurrent requests for the same column wait
//! for that one computation, requests for other columns proceed in parallel.
//!
//! Strong retention is a bounded most-recently-used list. Dropping an entry
//! from that list only makes it collectable; it stays reachable as long as
//! some node view or cursor still holds it, and is recomputed on demand once
//! the last holder is gone. Recomputation is deterministic, so eviction only
//! ever costs CPU.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use dashmap::DashMap;
use parking_lot::Mutex;

use crate::membership_error::MembershipError;
use crate::memberships::column_index::ColumnIndex;

/// Anything that holds recomputable column entries should implement this.
pub trait EvictCache {
    /// Drop every strongly retained entry so memory can be reclaimed once no
    /// node view references it anymore.
    fn evict_all(&self);
}

// Blanket impl for Arc<T>
impl<T: EvictCache + ?Sized> EvictCache for Arc<T> {
    #[inline]
    fn evict_all(&self) {
        (**self).evict_all();
    }
}

type Slot = Arc<Mutex<Weak<ColumnIndex>>>;

/// Column-keyed cache with single-flight loading.
#[derive(Debug)]
pub struct ColumnIndexCache {
    slots: DashMap<usize, Slot>,
    /// Most recently used first.
    retained: Mutex<VecDeque<Arc<ColumnIndex>>>,
    capacity: usize,
    computations: AtomicUsize,
}

impl ColumnIndexCache {
    /// Cache keeping at most `capacity` entries strongly reachable.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            log::warn!("column index cache has no retention; entries live only while in use");
        }
        Self {
            slots: DashMap::new(),
            retained: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
            computations: AtomicUsize::new(0),
        }
    }

    /// Return the entry for `column`, running `load` if it is not resident.
    ///
    /// At most one `load` per column is in flight at any time. A failed load
    /// leaves the slot empty; the next request tries again.
    pub fn get_or_load<F>(&self, column: usize, load: F) -> Result<Arc<ColumnIndex>, MembershipError>
    where
        F: FnOnce() -> Result<ColumnIndex, MembershipError>,
    {
        // Clone the slot out so the shard lock is released before loading.
        let slot: Slot = self.slots.entry(column).or_default().value().clone();
        let mut guard = slot.lock();
        if let Some(entry) = guard.upgrade() {
            drop(guard);
            self.retain(&entry);
            return Ok(entry);
        }
        let entry = Arc::new(load()?);
        self.computations.fetch_add(1, Ordering::Relaxed);
        *guard = Arc::downgrade(&entry);
        drop(guard);
        self.retain(&entry);
        Ok(entry)
    }

    fn retain(&self, entry: &Arc<ColumnIndex>) {
        if self.capacity == 0 {
            return;
        }
        let mut retained = self.retained.lock();
        if let Some(i) = retained.iter().position(|e| Arc::ptr_eq(e, entry)) {
            if i == 0 {
                return;
            }
            retained.remove(i);
        }
        retained.push_front(Arc::clone(entry));
        while retained.len() > self.capacity {
            if let Some(old) = retained.pop_back() {
                log::trace!("column index {} dropped from retention", old.column());
            }
        }
    }

    /// Drop the strong handle on `column`'s entry, if retained.
    pub fn evict(&self, column: usize) {
        let mut retained = self.retained.lock();
        let before = retained.len();
        retained.retain(|e| e.column() != column);
        if retained.len() != before {
            log::trace!("column index {column} evicted");
        }
    }

    /// Whether `column`'s entry is currently reachable (retained or in use).
    pub fn is_resident(&self, column: usize) -> bool {
        self.slots
            .get(&column)
            .is_some_and(|slot| slot.lock().strong_count() > 0)
    }

    /// Number of strongly retained entries.
    pub fn retained_len(&self) -> usize {
        self.retained.lock().len()
    }

    /// Total loader runs since construction.
    pub fn computations(&self) -> usize {
        self.computations.load(Ordering::Relaxed)
    }
}

impl EvictCache for ColumnIndexCache {
    fn evict_all(&self) {
        let mut retained = self.retained.lock();
        log::trace!("evicting {} retained column indices", retained.len());
        retained.clear();
    }
}
