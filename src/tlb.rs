use crate::table::Mapping;

/// The `TranslationCache` struct is a simple virtualization of the translation look aside buffer
/// commonly found in CPUs. It is a fixed array of slots filled round-robin: a cursor names the
/// next slot to overwrite and wraps at the end of the array.
///
/// Entries are never invalidated on their own. When the page table evicts a page, its slot keeps
/// mapping it to a frame that now belongs to another page, so two pages can resolve to the same
/// frame until the stale slot is overwritten or the caller invalidates it explicitly.
pub struct TranslationCache {
    slots: Vec<Option<Mapping>>,
    cursor: usize,
}

impl TranslationCache {
    /// Create and return a new `TranslationCache` with every slot empty.
    ///
    /// # Arguments
    ///
    /// * `size` - the number of slots in the cache. Must be non-zero.
    pub fn build(size: usize) -> Self {
        Self {
            slots: vec![None; size],
            cursor: 0,
        }
    }

    /// Scan every slot for `page_number` and return the frame of the first match. A `None` value
    /// implies a TLB miss.
    pub fn lookup(&self, page_number: u32) -> Option<usize> {
        self.slots
            .iter()
            .flatten()
            .find(|mapping| mapping.page_number == page_number)
            .map(|mapping| mapping.frame_number)
    }

    /// Overwrite the slot under the cursor and advance it. No check is made for an existing entry
    /// of the same page.
    pub fn insert(&mut self, page_number: u32, frame_number: usize) {
        self.slots[self.cursor] = Some(Mapping {
            page_number,
            frame_number,
        });
        self.cursor = (self.cursor + 1) % self.slots.len();
    }

    /// Clear every slot holding `page_number` and report how many were cleared. The cursor does not
    /// move, so cleared slots are refilled in their normal turn.
    pub fn invalidate(&mut self, page_number: u32) -> usize {
        let mut cleared = 0;
        for slot in self.slots.iter_mut() {
            if matches!(slot, Some(mapping) if mapping.page_number == page_number) {
                *slot = None;
                cleared += 1;
            }
        }
        cleared
    }

    pub fn slots(&self) -> &[Option<Mapping>] {
        &self.slots
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[cfg(test)]
    mod translation_cache_tests {

        use super::*;
        const SIZE_TEST: usize = 3;

        #[test]
        fn build() {
            let tlb = TranslationCache::build(SIZE_TEST);
            assert_eq!(tlb.slots().len(), SIZE_TEST);
            assert!(tlb.slots().iter().all(Option::is_none));
            assert_eq!(tlb.lookup(0), None);
        }

        #[test]
        fn find_and_replace() {
            let mut tlb = TranslationCache::build(SIZE_TEST);
            let max = 5;

            (0..max).for_each(|x| {
                assert!(tlb.lookup(x).is_none());
                tlb.insert(x, x as usize + 10);
                assert_eq!(tlb.lookup(x), Some(x as usize + 10));
            });

            // only the last SIZE_TEST insertions survive
            assert!(tlb.lookup(0).is_none());
            assert!(tlb.lookup(1).is_none());
            (2..max).for_each(|x| assert!(tlb.lookup(x).is_some()));
        }

        #[test]
        fn round_robin_displacement() {
            let mut tlb = TranslationCache::build(2);
            tlb.insert(0xA, 0);
            tlb.insert(0xB, 1);
            tlb.insert(0xC, 2);
            assert_eq!(tlb.lookup(0xA), None);
            assert_eq!(tlb.lookup(0xB), Some(1));
            assert_eq!(tlb.lookup(0xC), Some(2));
        }

        #[test]
        fn duplicates_first_match_wins() {
            let mut tlb = TranslationCache::build(SIZE_TEST);
            tlb.insert(7, 1);
            tlb.insert(7, 2);
            assert_eq!(tlb.lookup(7), Some(1));
            assert_eq!(tlb.slots().iter().flatten().count(), 2);
        }

        #[test]
        fn invalidate() {
            let mut tlb = TranslationCache::build(SIZE_TEST);
            tlb.insert(7, 1);
            tlb.insert(8, 2);
            tlb.insert(7, 3);
            assert_eq!(tlb.invalidate(7), 2);
            assert_eq!(tlb.lookup(7), None);
            assert_eq!(tlb.lookup(8), Some(2));
            assert_eq!(tlb.invalidate(9), 0);
        }
    }
}
