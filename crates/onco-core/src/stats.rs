use serde::Serialize;

/// Counts of one pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct RunStats {
    pub records: usize,
    /// Records with at least one kept candidate (substances) or a looked-up
    /// code (protocols).
    pub matched: usize,
    pub unmatched: usize,
    /// Records whose matching failed and whose results were emptied.
    pub failed: usize,
    /// Kept candidates across all records.
    pub candidates: usize,
}

impl RunStats {
    /// Adds one record to the counts.
    pub fn record(&mut self, failed: bool, matched: bool, candidates: usize) {
        self.records += 1;
        self.candidates += candidates;
        if failed {
            self.failed += 1;
        } else if matched {
            self.matched += 1;
        } else {
            self.unmatched += 1;
        }
    }
}
