//! Gapless sequence counters.

use dashmap::DashMap;

use khata_core::numbering::{DocumentKind, SequenceSource};

/// In-memory per-(kind, year) document counters.
///
/// Each stream lives under its own map entry; the entry guard makes
/// read-increment-write a single step, so concurrent callers always get
/// distinct consecutive values.
#[derive(Debug, Default)]
pub struct MemorySequences {
    counters: DashMap<(DocumentKind, i32), u64>,
}

impl MemorySequences {
    /// Creates an empty counter set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Last value handed out for a stream; zero before the first call.
    #[must_use]
    pub fn current(&self, kind: DocumentKind, year: i32) -> u64 {
        self.counters.get(&(kind, year)).map_or(0, |kv| *kv.value())
    }

    /// Forces a stream's counter, used when restoring a snapshot.
    ///
    /// Counters are not per-id records, so they bypass the restore
    /// registry; a restore sets each stream to the highest sequence its
    /// documents reached.
    pub fn restore(&self, kind: DocumentKind, year: i32, value: u64) {
        self.counters.insert((kind, year), value);
    }
}

impl SequenceSource for MemorySequences {
    fn next_sequence(&self, kind: DocumentKind, year: i32) -> u64 {
        let mut counter = self.counters.entry((kind, year)).or_insert(0);
        *counter += 1;
        *counter
    }
}
