use std::time::Duration;

/// Latency of a main memory access in nanoseconds.
pub const MEMORY_ACCESS_NS: f64 = 200.0;

/// Cost of servicing a page fault in nanoseconds, standing in for a disk read.
pub const PAGE_FAULT_NS: f64 = 8_000_000.0;

/// The `Tracker` struct is a simple collection of named performance data counters used for
/// collecting data points on the simulation. The data collected is used to conduct light
/// statistical analysis about the performance of an algorithm.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Default)]
pub struct Tracker {
    pub operations: usize,
    pub faults: usize,
    pub tlb_hits: usize,
    pub page_hits: usize,
    pub tlb_invalidations: usize,
    pub correct_accesses: usize,
    pub tlb_lookup_nanos: u128,
}

impl Tracker {
    /// Create a new instance of the `Tracker` struct with all counters initialized to zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fault_rate(&self) -> f64 {
        ratio(self.faults, self.operations)
    }

    pub fn tlb_hit_rate(&self) -> f64 {
        ratio(self.tlb_hits, self.operations)
    }

    /// References that found their page resident, whether through the TLB or the page table.
    pub fn page_reference_hits(&self) -> usize {
        self.operations.saturating_sub(self.faults)
    }

    pub fn record_tlb_lookup(&mut self, elapsed: Duration) {
        self.tlb_lookup_nanos += elapsed.as_nanos();
    }

    /// Mean measured TLB lookup time in nanoseconds.
    pub fn mean_tlb_lookup_ns(&self) -> f64 {
        if self.operations == 0 {
            return 0.0;
        }
        self.tlb_lookup_nanos as f64 / self.operations as f64
    }

    pub fn effective_access_time(&self, model: &AccessTimeModel) -> f64 {
        model.effective_access_time(self.tlb_hit_rate(), self.fault_rate())
    }
}

fn ratio(count: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    count as f64 / total as f64
}

impl std::fmt::Display for Tracker {
    /// Display format specification for the `Tracker` struct implemented to simplify the process
    /// of outputting the end of run summary to the terminal.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of Translated Addresses = {}", self.operations)?;
        writeln!(f, "Page Faults = {}", self.faults)?;
        writeln!(f, "Page Fault Rate = {:.6}", self.fault_rate())?;
        writeln!(f, "TLB Hits = {}", self.tlb_hits)?;
        writeln!(f, "TLB Hit Rate = {:.6}", self.tlb_hit_rate())?;
        writeln!(f, "Page Hits = {}", self.page_reference_hits())?;
        writeln!(f, "Page Table Hits = {}", self.page_hits)?;
        write!(f, "I/O Operations = {}", self.faults)
    }
}

/// Fixed per-tier latency model for estimating the effective access time of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccessTimeModel {
    pub tlb_ns: f64,
    pub memory_ns: f64,
    pub fault_ns: f64,
}

impl AccessTimeModel {
    pub fn new(tlb_ns: f64) -> Self {
        Self {
            tlb_ns,
            memory_ns: MEMORY_ACCESS_NS,
            fault_ns: PAGE_FAULT_NS,
        }
    }

    /// Weighted mean of the TLB path and the page table path. The page table path is itself a
    /// mix of plain memory reads and faults. With a TLB hit rate of zero this is
    /// `(1 - p) * fault_ns + p * memory_ns` for a page hit probability `p`.
    pub fn effective_access_time(&self, tlb_hit_rate: f64, fault_rate: f64) -> f64 {
        let tlb_path = self.tlb_ns + self.memory_ns;
        let memory_path = (1.0 - fault_rate) * self.memory_ns + fault_rate * self.fault_ns;
        tlb_hit_rate * tlb_path + (1.0 - tlb_hit_rate) * memory_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[cfg(test)]
    mod tracker_tests {

        use super::*;

        #[test]
        fn new() {
            let tracker = Tracker::new();
            assert_eq!(tracker.operations, 0);
            assert_eq!(tracker.faults, 0);
            assert_eq!(tracker.tlb_hits, 0);
            assert_eq!(tracker.page_hits, 0);
            assert_eq!(tracker.correct_accesses, 0);
        }

        #[test]
        fn equals() {
            assert_eq!(Tracker::new(), Tracker::new());
        }

        #[test]
        fn empty_rates() {
            let tracker = Tracker::new();
            assert_eq!(tracker.fault_rate(), 0.0);
            assert_eq!(tracker.tlb_hit_rate(), 0.0);
            assert_eq!(tracker.mean_tlb_lookup_ns(), 0.0);
        }

        #[test]
        fn to_string() {
            let tracker = Tracker {
                operations: 10,
                faults: 3,
                tlb_hits: 5,
                page_hits: 2,
                ..Tracker::new()
            };
            let text = tracker.to_string();
            assert!(text.contains("Number of Translated Addresses = 10"));
            assert!(text.contains("Page Faults = 3"));
            assert!(text.contains("Page Fault Rate = 0.300000"));
            assert!(text.contains("TLB Hits = 5"));
            assert!(text.contains("TLB Hit Rate = 0.500000"));
            assert!(text.contains("Page Hits = 7"));
            assert!(text.contains("Page Table Hits = 2"));
            assert!(text.contains("I/O Operations = 3"));
        }

        #[test]
        fn mean_lookup() {
            let mut tracker = Tracker::new();
            tracker.operations = 4;
            tracker.record_tlb_lookup(Duration::from_nanos(100));
            tracker.record_tlb_lookup(Duration::from_nanos(60));
            assert_eq!(tracker.mean_tlb_lookup_ns(), 40.0);
        }
    }

    #[cfg(test)]
    mod access_time_model_tests {

        use super::*;

        #[test]
        fn without_tlb() {
            let model = AccessTimeModel::new(0.0);
            let p = 0.75;
            let eat = model.effective_access_time(0.0, 1.0 - p);
            assert!((eat - ((1.0 - p) * 8_000_000.0 + p * 200.0)).abs() < 1e-6);
        }

        #[test]
        fn all_tlb_hits() {
            let model = AccessTimeModel::new(15.0);
            assert!((model.effective_access_time(1.0, 0.0) - 215.0).abs() < 1e-9);
        }

        #[test]
        fn from_tracker() {
            let tracker = Tracker {
                operations: 10,
                faults: 1,
                tlb_hits: 5,
                ..Tracker::new()
            };
            let model = AccessTimeModel::new(10.0);
            let expected = 0.5 * 210.0 + 0.5 * (0.9 * 200.0 + 0.1 * 8_000_000.0);
            assert!((tracker.effective_access_time(&model) - expected).abs() < 1e-6);
        }
    }
}
