// src/progress.rs
/// Progress reporting for batch analysis. Frontends implement this to show
/// per-archive status; every method has a no-op default.
pub trait Progress {
    /// Called at the start with the number of archives.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One archive was ingested.
    fn item_done(&mut self, _archive: &str, _records: usize) {}

    /// One archive could not be read; the batch goes on.
    fn item_failed(&mut self, _archive: &str, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
