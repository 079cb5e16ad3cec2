use crate::address::LogicalAddress;
use crate::backing_store::BackingStore;
use crate::config::{EngineConfig, Geometry};
use crate::error::Result;
use crate::memory::PhysicalMemory;
use crate::table::{self, PageTable};
use crate::tlb::TranslationCache;
use crate::tracker::{AccessTimeModel, Tracker};
use std::time::Instant;

/// Where a translation was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    TlbHit,
    PageHit,
    Fault,
}

/// The `AccessResult` encodes the result of a translated memory access: the logical address
/// provided to the operation, the corresponding physical address, the value read from that address
/// and which level of the hierarchy resolved it.
#[derive(Debug, Clone, Copy)]
pub struct AccessResult {
    pub logical_address: LogicalAddress,
    pub frame_number: usize,
    pub physical_address: u32,
    pub value: i8,
    pub outcome: Outcome,
}

impl std::fmt::Display for AccessResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Virtual address: {} Physical address: {} Value: {}",
            self.logical_address.signed(),
            self.physical_address,
            self.value
        )
    }
}

/// The `TranslationEngine` struct is the culmination of all other structures in the crate. Each
/// instance owns a TLB, a page table, physical memory and optionally a backing store, and walks
/// every address through them in order: TLB, then page table, then a fault that loads the page.
pub struct TranslationEngine {
    geometry: Geometry,
    tlb: Option<TranslationCache>,
    pages: Box<dyn PageTable>,
    memory: PhysicalMemory,
    storage: Option<BackingStore>,
    invalidate_tlb: bool,
    timed: bool,
    pub tracker: Tracker,
}

impl TranslationEngine {
    /// Create a new `TranslationEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `config` - geometry and policy choices for the run.
    /// * `storage` - source of page contents. Without one, frames stay zero-filled.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` if the geometry fails `Geometry::validate`.
    pub fn build(config: &EngineConfig, storage: Option<BackingStore>) -> Result<Self> {
        let geometry = config.geometry;
        geometry.validate()?;
        Ok(Self {
            geometry,
            tlb: geometry
                .tlb_enabled()
                .then(|| TranslationCache::build(geometry.tlb_size)),
            pages: table::build(&geometry, config.policy, config.lru_frames),
            memory: PhysicalMemory::build(geometry.num_frames, geometry.frame_size),
            storage,
            invalidate_tlb: config.invalidate_tlb,
            timed: config.timed,
            tracker: Tracker::new(),
        })
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn tlb(&self) -> Option<&TranslationCache> {
        self.tlb.as_ref()
    }

    pub fn page_table(&self) -> &dyn PageTable {
        self.pages.as_ref()
    }

    /// Translate `logical_address` and read the byte it refers to. Statistics are recorded along
    /// the way.
    ///
    /// # Errors
    ///
    /// An error will occur if a fault needs a page the backing store cannot supply. The run is not
    /// expected to continue after one.
    pub fn access(&mut self, logical_address: LogicalAddress) -> Result<AccessResult> {
        let page_number = logical_address.page_number;
        let (frame_number, outcome) = match self.lookup_tlb(page_number) {
            Some(frame_number) => {
                self.tracker.tlb_hits += 1;
                (frame_number, Outcome::TlbHit)
            }
            None => {
                let resolved = match self.pages.resolve(page_number) {
                    Some(frame_number) => {
                        self.tracker.page_hits += 1;
                        (frame_number, Outcome::PageHit)
                    }
                    None => (self.page_in(page_number)?, Outcome::Fault),
                };
                if let Some(tlb) = self.tlb.as_mut() {
                    tlb.insert(page_number, resolved.0);
                }
                resolved
            }
        };

        let offset = logical_address.offset;
        let physical_address = ((frame_number as u32) << self.geometry.page_shift) | offset;
        let value = self.memory.read(frame_number, offset as usize) as i8;
        self.tracker.operations += 1;
        Ok(AccessResult {
            logical_address,
            frame_number,
            physical_address,
            value,
            outcome,
        })
    }

    fn lookup_tlb(&mut self, page_number: u32) -> Option<usize> {
        let tlb = self.tlb.as_ref()?;
        if !self.timed {
            return tlb.lookup(page_number);
        }
        let start = Instant::now();
        let found = tlb.lookup(page_number);
        self.tracker.record_tlb_lookup(start.elapsed());
        found
    }

    /// Service a page fault: take a frame from the page table's replacement policy and fill it
    /// from the backing store when one is configured.
    fn page_in(&mut self, page_number: u32) -> Result<usize> {
        let placement = self.pages.fault(page_number);
        self.tracker.faults += 1;
        log::debug!(
            "page fault: page {} -> frame {} (evicted {:?})",
            page_number,
            placement.frame_number,
            placement.evicted
        );

        if self.invalidate_tlb {
            if let (Some(evicted), Some(tlb)) = (placement.evicted, self.tlb.as_mut()) {
                self.tracker.tlb_invalidations += tlb.invalidate(evicted);
            }
        }

        if let Some(storage) = self.storage.as_mut() {
            storage.read_page(page_number, self.memory.frame_mut(placement.frame_number))?;
        }
        Ok(placement.frame_number)
    }

    /// Effective access time is only meaningful when lookups were timed or there is no TLB term.
    pub fn access_time_reported(&self) -> bool {
        self.timed || self.tlb.is_none()
    }

    /// Latency model for this run. The TLB term is the measured mean lookup time when lookups are
    /// timed, and zero otherwise.
    pub fn access_time_model(&self) -> AccessTimeModel {
        let tlb_ns = match self.timed {
            true => self.tracker.mean_tlb_lookup_ns(),
            false => 0.0,
        };
        AccessTimeModel::new(tlb_ns)
    }
}
