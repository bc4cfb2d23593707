//! Report sink trait.

use crate::error::SinkError;
use crate::types::ReportRow;

/// Destination for report rows.
///
/// The audit runner is the only writer and holds the sink mutably, so
/// rows are never interleaved.
pub trait ReportSink: Send {
    /// Persists one complete row.
    fn write_row(&mut self, row: &ReportRow) -> Result<(), SinkError>;

    /// Flushes buffered rows. Called once after the last row.
    fn finish(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}

impl<S: ReportSink + ?Sized> ReportSink for Box<S> {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), SinkError> {
        (**self).write_row(row)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}
