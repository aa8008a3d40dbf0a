//! Slab arena owning all cell storage
//!
//! # Design
//!
//! - Slots live in a `Vec` and are addressed by index; a slot never moves
//!   while its cell is in use, so a [`Handle`] stays valid for the cell's
//!   whole lifetime
//! - Free slots sit on a LIFO free list; `allocate` pops, `free` pushes
//! - When the free list is empty the slot vector doubles, bounded by the
//!   configured hard capacity
//! - Each slot carries a generation that is bumped on every allocation and
//!   kept on free, so handles to a released cell never reach the cell that
//!   replaced it
//! - A slot whose generation reaches `u32::MAX` is retired when freed
//!   instead of wrapping, so a generation is never handed out twice
//! - Storage is reserved with `try_reserve`; an allocator refusal surfaces
//!   as [`Error::OutOfMemory`]
//!
//! # Invariants
//!
//! - Every slot is occupied, on the free list, or retired; exactly one
//! - `free_list.len() + live + retired == slots.len()`

use renc_core::{Cell, Error, Handle, Payload, Result, RuntimeConfig};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, trace};

#[derive(Debug)]
struct Slot {
    generation: u32,
    cell: Option<Cell>,
}

impl Slot {
    fn vacant() -> Self {
        Self {
            generation: 0,
            cell: None,
        }
    }
}

/// Arena counters for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArenaStats {
    /// Slots currently allocated in the backing storage
    pub capacity: usize,
    /// Hard slot bound
    pub max_capacity: usize,
    /// Cells currently in use
    pub live: usize,
    /// Slots on the free list
    pub free: usize,
    /// Slots taken out of service after exhausting their generations
    pub retired: usize,
    /// Highest number of simultaneously live cells
    pub high_water: usize,
    /// Cells allocated since the arena was created
    pub total_allocations: u64,
}

/// Fixed-slot allocator handing out cells
///
/// # Example
///
/// ```
/// use renc_core::Payload;
/// use renc_heap::Arena;
///
/// let mut arena = Arena::with_capacity(4)?;
/// let h = arena.allocate(Payload::Integer(1))?;
/// assert_eq!(arena.get(h)?.integer()?, 1);
/// arena.free(h)?;
/// assert_eq!(arena.live(), 0);
/// # Ok::<(), renc_core::Error>(())
/// ```
#[derive(Debug)]
pub struct Arena {
    slots: Vec<Slot>,
    free_list: Vec<u32>,
    max_capacity: usize,
    live: usize,
    retired: usize,
    high_water: usize,
    total_allocations: u64,
}

impl Arena {
    /// Create an unbounded arena with `initial` slots reserved
    pub fn with_capacity(initial: usize) -> Result<Self> {
        Self::from_config(&RuntimeConfig::new().initial_capacity(initial))
    }

    /// Create an arena that never holds more than `max` slots
    pub fn with_max_capacity(initial: usize, max: usize) -> Result<Self> {
        Self::from_config(
            &RuntimeConfig::new()
                .initial_capacity(initial.min(max))
                .max_capacity(Some(max)),
        )
    }

    /// Create an arena sized by `config`
    ///
    /// The configuration is expected to have passed
    /// [`RuntimeConfig::validate`]; the initial size is clamped to the bound.
    /// Fails with [`Error::OutOfMemory`] if the initial slots cannot be
    /// reserved.
    pub fn from_config(config: &RuntimeConfig) -> Result<Self> {
        let max_capacity = config.effective_max_capacity();
        let mut arena = Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            max_capacity,
            live: 0,
            retired: 0,
            high_water: 0,
            total_allocations: 0,
        };
        arena.grow_to(config.initial_capacity.min(max_capacity))?;
        Ok(arena)
    }

    /// Allocate a cell holding `payload` with a reference count of 1
    ///
    /// Pops the free list, growing the backing storage first if it is empty.
    /// Fails with [`Error::OutOfMemory`] once the hard bound is reached.
    pub fn allocate(&mut self, payload: Payload) -> Result<Handle> {
        if self.free_list.is_empty() {
            self.grow()?;
        }
        let index = self.free_list.pop().ok_or(Error::OutOfMemory {
            capacity: self.max_capacity,
        })?;

        let slot = &mut self.slots[index as usize];
        debug_assert!(slot.cell.is_none(), "free list held occupied slot {}", index);
        // Generation 0 is reserved for slots that never held a cell. Retired
        // slots never come back, so this cannot overflow.
        slot.generation += 1;
        slot.cell = Some(Cell::new(payload));
        let handle = Handle::new(index, slot.generation);

        self.live += 1;
        self.high_water = self.high_water.max(self.live);
        self.total_allocations += 1;
        trace!(%handle, kind = %payload.kind(), "allocated cell");
        Ok(handle)
    }

    /// Return a slot to the free list
    ///
    /// Fails with [`Error::DoubleFree`] if the slot is already free. That is
    /// a programming error and the free list is left untouched. A slot that
    /// has used up its last generation is retired instead of freed.
    pub fn free(&mut self, handle: Handle) -> Result<()> {
        let slot = self.slot_mut(handle)?;
        if slot.generation != handle.generation() {
            return Err(Error::StaleHandle { handle });
        }
        if slot.cell.take().is_none() {
            error!(%handle, "double free");
            return Err(Error::DoubleFree {
                index: handle.index(),
            });
        }
        self.live -= 1;
        if slot_exhausted(handle.generation()) {
            self.retired += 1;
            debug!(%handle, "retiring slot with exhausted generations");
        } else {
            self.free_list.push(handle.index());
            trace!(%handle, "freed slot");
        }
        Ok(())
    }

    /// Resolve a handle to its live cell
    pub fn get(&self, handle: Handle) -> Result<&Cell> {
        let slot = self.slot(handle)?;
        match &slot.cell {
            Some(cell) if slot.generation == handle.generation() => Ok(cell),
            _ => Err(Error::StaleHandle { handle }),
        }
    }

    /// Resolve a handle to its slot's cell, if the slot still belongs to it
    ///
    /// `Ok(None)` means the handle's generation matches but the cell has
    /// already been freed and the slot not yet reused. The reference-count
    /// manager reports that case as an over-release.
    pub(crate) fn resolve_mut(&mut self, handle: Handle) -> Result<Option<&mut Cell>> {
        let slot = self.slot_mut(handle)?;
        if slot.generation != handle.generation() {
            return Err(Error::StaleHandle { handle });
        }
        Ok(slot.cell.as_mut())
    }

    /// Cells still in use, in slot order
    pub fn leaks(&self) -> impl Iterator<Item = (Handle, &Cell)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.cell
                .as_ref()
                .map(|cell| (Handle::new(index as u32, slot.generation), cell))
        })
    }

    /// Number of live cells
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of slots in the backing storage
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Hard slot bound
    #[inline]
    pub fn max_capacity(&self) -> usize {
        self.max_capacity
    }

    /// Highest number of simultaneously live cells
    #[inline]
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// Snapshot of the arena counters
    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            capacity: self.slots.len(),
            max_capacity: self.max_capacity,
            live: self.live,
            free: self.free_list.len(),
            retired: self.retired,
            high_water: self.high_water,
            total_allocations: self.total_allocations,
        }
    }

    fn slot(&self, handle: Handle) -> Result<&Slot> {
        if handle.generation() == 0 {
            return Err(Error::InvalidHandle { handle });
        }
        self.slots
            .get(handle.index() as usize)
            .ok_or(Error::InvalidHandle { handle })
    }

    fn slot_mut(&mut self, handle: Handle) -> Result<&mut Slot> {
        if handle.generation() == 0 {
            return Err(Error::InvalidHandle { handle });
        }
        self.slots
            .get_mut(handle.index() as usize)
            .ok_or(Error::InvalidHandle { handle })
    }

    fn grow(&mut self) -> Result<()> {
        let current = self.slots.len();
        if current >= self.max_capacity {
            debug!(capacity = self.max_capacity, "arena exhausted");
            return Err(Error::OutOfMemory {
                capacity: self.max_capacity,
            });
        }
        let target = current.saturating_mul(2).max(1).min(self.max_capacity);
        debug!(from = current, to = target, "growing arena");
        self.grow_to(target)
    }

    fn grow_to(&mut self, target: usize) -> Result<()> {
        let current = self.slots.len();
        if target <= current {
            return Ok(());
        }
        let additional = target - current;
        let reserved = self
            .slots
            .try_reserve_exact(additional)
            .and_then(|()| self.free_list.try_reserve_exact(additional));
        if let Err(e) = reserved {
            error!(from = current, to = target, error = %e, "arena reservation refused");
            return Err(Error::OutOfMemory { capacity: target });
        }
        self.slots.extend((current..target).map(|_| Slot::vacant()));
        // Lowest index ends up on top of the stack.
        self.free_list.extend((current..target).rev().map(|i| i as u32));
        Ok(())
    }

    #[cfg(test)]
    fn set_generation(&mut self, index: u32, generation: u32) {
        self.slots[index as usize].generation = generation;
    }
}

fn slot_exhausted(generation: u32) -> bool {
    generation == u32::MAX
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocate_and_get() {
        let mut arena = Arena::with_capacity(2).unwrap();
        let h = arena.allocate(Payload::Integer(42)).unwrap();
        let cell = arena.get(h).unwrap();
        assert_eq!(cell.integer().unwrap(), 42);
        assert_eq!(cell.refcount(), 1);
        assert_eq!(arena.live(), 1);
    }

    #[test]
    fn test_lowest_slot_first() {
        let mut arena = Arena::with_capacity(4).unwrap();
        let a = arena.allocate(Payload::Void).unwrap();
        let b = arena.allocate(Payload::Void).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
    }

    #[test]
    fn test_free_then_double_free() {
        let mut arena = Arena::with_capacity(1).unwrap();
        let h = arena.allocate(Payload::Blank).unwrap();
        arena.free(h).unwrap();
        assert_eq!(arena.free(h), Err(Error::DoubleFree { index: h.index() }));
        assert_eq!(arena.live(), 0);
        assert_eq!(arena.stats().free, 1);
    }

    #[test]
    fn test_grows_when_unbounded() {
        let mut arena = Arena::with_capacity(1).unwrap();
        for i in 0..10 {
            arena.allocate(Payload::Integer(i)).unwrap();
        }
        assert_eq!(arena.live(), 10);
        assert!(arena.capacity() >= 10);
    }

    #[test]
    fn test_out_of_memory_at_bound() {
        let mut arena = Arena::with_max_capacity(1, 3).unwrap();
        for i in 0..3 {
            arena.allocate(Payload::Integer(i)).unwrap();
        }
        assert_eq!(
            arena.allocate(Payload::Integer(3)),
            Err(Error::OutOfMemory { capacity: 3 })
        );
        assert_eq!(arena.capacity(), 3);
    }

    #[test]
    fn test_reuse_bumps_generation() {
        let mut arena = Arena::with_max_capacity(1, 1).unwrap();
        let first = arena.allocate(Payload::Integer(1)).unwrap();
        arena.free(first).unwrap();
        let second = arena.allocate(Payload::Integer(2)).unwrap();
        assert_eq!(first.index(), second.index());
        assert_ne!(first.generation(), second.generation());
        assert_eq!(arena.get(first), Err(Error::StaleHandle { handle: first }));
        assert_eq!(arena.get(second).unwrap().integer().unwrap(), 2);
    }

    #[test]
    fn test_get_freed_is_stale() {
        let mut arena = Arena::with_capacity(1).unwrap();
        let h = arena.allocate(Payload::Char('a')).unwrap();
        arena.free(h).unwrap();
        assert_eq!(arena.get(h), Err(Error::StaleHandle { handle: h }));
    }

    #[test]
    fn test_invalid_index() {
        let arena = Arena::with_capacity(1).unwrap();
        let bogus = Handle::new(99, 0);
        assert_eq!(arena.get(bogus), Err(Error::InvalidHandle { handle: bogus }));
        assert_eq!(
            arena.get(Handle::NULL),
            Err(Error::InvalidHandle { handle: Handle::NULL })
        );
        // slot 0 exists but was never handed out
        let unissued = Handle::new(0, 0);
        assert_eq!(
            arena.get(unissued),
            Err(Error::InvalidHandle { handle: unissued })
        );
    }

    #[test]
    fn test_leaks_lists_live_cells() {
        let mut arena = Arena::with_capacity(4).unwrap();
        let a = arena.allocate(Payload::Integer(1)).unwrap();
        let b = arena.allocate(Payload::Integer(2)).unwrap();
        let c = arena.allocate(Payload::Integer(3)).unwrap();
        arena.free(b).unwrap();
        let leaked: Vec<Handle> = arena.leaks().map(|(h, _)| h).collect();
        assert_eq!(leaked, vec![a, c]);
    }

    #[test]
    fn test_stats_track_high_water() {
        let mut arena = Arena::with_capacity(4).unwrap();
        let handles: Vec<_> = (0..3)
            .map(|i| arena.allocate(Payload::Integer(i)).unwrap())
            .collect();
        for h in handles {
            arena.free(h).unwrap();
        }
        arena.allocate(Payload::Void).unwrap();
        let stats = arena.stats();
        assert_eq!(stats.high_water, 3);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.total_allocations, 4);
        assert_eq!(stats.free + stats.live, stats.capacity);
    }

    #[test]
    fn test_unreservable_capacity_is_out_of_memory() {
        let mut arena = Arena::with_capacity(0).unwrap();
        assert_eq!(
            arena.grow_to(usize::MAX),
            Err(Error::OutOfMemory {
                capacity: usize::MAX
            })
        );
        // a refused reservation leaves the arena usable
        assert_eq!(arena.capacity(), 0);
        let h = arena.allocate(Payload::Integer(1)).unwrap();
        assert_eq!(arena.get(h).unwrap().integer().unwrap(), 1);
    }

    #[test]
    fn test_exhausted_generation_retires_slot() {
        let mut arena = Arena::with_max_capacity(1, 1).unwrap();
        let first = arena.allocate(Payload::Integer(1)).unwrap();
        arena.free(first).unwrap();
        arena.set_generation(first.index(), u32::MAX - 1);

        let last = arena.allocate(Payload::Integer(2)).unwrap();
        assert_eq!(last.generation(), u32::MAX);
        arena.free(last).unwrap();

        // the slot is never handed out again, so no generation repeats
        assert_eq!(
            arena.allocate(Payload::Integer(3)),
            Err(Error::OutOfMemory { capacity: 1 })
        );
        assert_eq!(arena.get(last), Err(Error::StaleHandle { handle: last }));
        assert_eq!(arena.get(first), Err(Error::StaleHandle { handle: first }));
        let stats = arena.stats();
        assert_eq!(stats.retired, 1);
        assert_eq!(stats.free + stats.live + stats.retired, stats.capacity);
    }

    #[test]
    fn test_retired_slot_does_not_block_growth() {
        let mut arena = Arena::with_capacity(1).unwrap();
        let h = arena.allocate(Payload::Void).unwrap();
        arena.free(h).unwrap();
        arena.set_generation(h.index(), u32::MAX - 1);
        let last = arena.allocate(Payload::Void).unwrap();
        arena.free(last).unwrap();

        let fresh = arena.allocate(Payload::Blank).unwrap();
        assert_ne!(fresh.index(), h.index());
        assert_eq!(fresh.generation(), 1);
        assert_eq!(arena.stats().retired, 1);
    }
}
