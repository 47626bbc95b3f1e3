//! Record-level fan-out.

use std::sync::Arc;

use onco_model::FreeTextRecord;
use rayon::prelude::*;

/// Called with the number of records finished since the last call.
pub type ProgressHook = Arc<dyn Fn(u64) + Send + Sync>;

/// Applies `work` to every record, in parallel when asked.
///
/// Results come back in record-id order regardless of scheduling.
pub(crate) fn map_records<T, F>(
    records: &[FreeTextRecord],
    parallel: bool,
    progress: Option<&ProgressHook>,
    work: F,
) -> Vec<T>
where
    T: Send,
    F: Fn(&FreeTextRecord) -> T + Send + Sync,
{
    let run = |record: &FreeTextRecord| {
        let output = work(record);
        if let Some(progress) = progress {
            progress(1);
        }
        (record.id, output)
    };

    let mut results: Vec<_> = if parallel {
        records.par_iter().map(run).collect()
    } else {
        records.iter().map(run).collect()
    };
    results.sort_by_key(|(id, _)| *id);
    results.into_iter().map(|(_, output)| output).collect()
}
