use crate::config::{Geometry, LruFrames, Policy};

/// A single page number to frame number association. Empty slots in the page table and the TLB
/// are `None` rather than a mapping with a sentinel page number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mapping {
    pub page_number: u32,
    pub frame_number: usize,
}

/// Outcome of servicing a page fault: the frame the page now lives in, and the page whose mapping
/// was pushed out of the table to make room, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub frame_number: usize,
    pub evicted: Option<u32>,
}

/// The page table seam. Each implementation owns a fixed array of slots and decides where a
/// faulting page goes.
pub trait PageTable {
    /// Find the frame holding `page_number`, updating any recency bookkeeping on a hit.
    fn resolve(&mut self, page_number: u32) -> Option<usize>;

    /// Assign a frame to `page_number`, which the caller has established is not in the table.
    fn fault(&mut self, page_number: u32) -> Placement;

    fn entries(&self) -> &[Option<Mapping>];
}

/// Build the page table selected by `policy` for the given layout. The layout is assumed to have
/// passed `Geometry::validate`.
pub fn build(geometry: &Geometry, policy: Policy, lru_frames: LruFrames) -> Box<dyn PageTable> {
    match policy {
        Policy::Fifo => Box::new(FifoPageTable::build(geometry.num_pages, geometry.num_frames)),
        Policy::Lru => Box::new(LruPageTable::build(
            geometry.num_pages,
            geometry.num_frames,
            lru_frames,
        )),
    }
}

/// Direct-mapped FIFO table: the slot index of an entry is its frame number. Frames are handed out
/// by a counter that wraps at `num_frames`, so the oldest resident page is always the next one
/// overwritten.
pub struct FifoPageTable {
    slots: Vec<Option<Mapping>>,
    num_frames: usize,
    frame_counter: usize,
}

impl FifoPageTable {
    /// Create a table of `table_size` empty slots handing out `num_frames` frames.
    ///
    /// # Panics
    ///
    /// `insert` panics if `table_size < num_frames`, since slots are indexed by frame number.
    pub fn build(table_size: usize, num_frames: usize) -> Self {
        Self {
            slots: vec![None; table_size],
            num_frames,
            frame_counter: 0,
        }
    }

    pub fn lookup(&self, page_number: u32) -> Option<usize> {
        self.slots
            .iter()
            .flatten()
            .find(|mapping| mapping.page_number == page_number)
            .map(|mapping| mapping.frame_number)
    }

    /// Take the next frame from the counter and write the page into the slot of the same index,
    /// overwriting whatever page held that frame before.
    pub fn insert(&mut self, page_number: u32) -> Placement {
        let frame_number = self.frame_counter;
        self.frame_counter = (self.frame_counter + 1) % self.num_frames;
        let previous = self.slots[frame_number].replace(Mapping {
            page_number,
            frame_number,
        });
        Placement {
            frame_number,
            evicted: previous.map(|mapping| mapping.page_number),
        }
    }
}

impl PageTable for FifoPageTable {
    fn resolve(&mut self, page_number: u32) -> Option<usize> {
        self.lookup(page_number)
    }

    fn fault(&mut self, page_number: u32) -> Placement {
        self.insert(page_number)
    }

    fn entries(&self) -> &[Option<Mapping>] {
        &self.slots
    }
}

/// Recency-ordered table: position 0 holds the most recently used page and the last occupied
/// position the least recently used one. Entries are shifted in place on every hit and insertion.
pub struct LruPageTable {
    slots: Vec<Option<Mapping>>,
    num_frames: usize,
    frame_counter: usize,
    allocated: usize,
    frames: LruFrames,
}

impl LruPageTable {
    /// Create an empty ordering of `table_size` slots, which must be non-zero.
    pub fn build(table_size: usize, num_frames: usize, frames: LruFrames) -> Self {
        Self {
            slots: vec![None; table_size],
            num_frames,
            frame_counter: 0,
            allocated: 0,
            frames,
        }
    }

    /// Return the position of `page_number` in the ordering. The caller is expected to
    /// `promote` it on a hit.
    pub fn lookup(&self, page_number: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| matches!(slot, Some(mapping) if mapping.page_number == page_number))
    }

    pub fn frame_at(&self, slot: usize) -> Option<usize> {
        self.slots[slot].map(|mapping| mapping.frame_number)
    }

    /// Move the entry at `slot` to the front, shifting every entry ahead of it back by one.
    pub fn promote(&mut self, slot: usize) {
        self.slots[..=slot].rotate_right(1);
    }

    /// Place `page_number` at the front of the ordering and return the frame it was given.
    pub fn insert(&mut self, page_number: u32) -> Placement {
        let (frame_number, evicted) = match self.frames {
            LruFrames::Counter => {
                let frame_number = self.frame_counter;
                self.frame_counter = (self.frame_counter + 1) % self.num_frames;
                (frame_number, self.shift_in())
            }
            LruFrames::LeastRecent if self.allocated < self.num_frames => {
                let frame_number = self.allocated;
                self.allocated += 1;
                (frame_number, self.shift_in())
            }
            LruFrames::LeastRecent => {
                // every frame is resident, so some slot is occupied
                let victim = self
                    .slots
                    .iter()
                    .rposition(Option::is_some)
                    .unwrap_or(self.slots.len() - 1);
                let evicted = self.slots[victim];
                self.promote(victim);
                match evicted {
                    Some(mapping) => (mapping.frame_number, Some(mapping.page_number)),
                    None => (0, None),
                }
            }
        };
        self.slots[0] = Some(Mapping {
            page_number,
            frame_number,
        });
        Placement {
            frame_number,
            evicted,
        }
    }

    /// Shift the whole table back by one, dropping the last slot, and return the page it held.
    fn shift_in(&mut self) -> Option<u32> {
        let dropped = self.slots.last().copied().flatten();
        self.slots.rotate_right(1);
        dropped.map(|mapping| mapping.page_number)
    }
}

impl PageTable for LruPageTable {
    fn resolve(&mut self, page_number: u32) -> Option<usize> {
        let slot = self.lookup(page_number)?;
        let frame_number = self.frame_at(slot);
        self.promote(slot);
        frame_number
    }

    fn fault(&mut self, page_number: u32) -> Placement {
        self.insert(page_number)
    }

    fn entries(&self) -> &[Option<Mapping>] {
        &self.slots
    }
}
