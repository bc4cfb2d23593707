#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! CSV report sink for drive-audit.
//!
//! Writes one record per report row under a fixed header:
//!
//! ```text
//! File Name,File ID,User/Group,Type,Role,Inherited
//! Reports/Q1.pdf,1AbC,alice@example.com,user,reader,False
//! ```
//!
//! [`StagedCsvReport`] writes beside the destination and replaces it only
//! on [`StagedCsvReport::commit`], so a failed or cancelled run never
//! leaves a partial report where a finished one is expected.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use drive_audit_core::{ReportRow, ReportSink, SinkError};

/// Column header, in output order.
pub const HEADER: [&str; 6] = ["File Name", "File ID", "User/Group", "Type", "Role", "Inherited"];

/// Renders the inherited flag the way the report has always spelled it.
fn inherited_label(inherited: bool) -> &'static str {
    if inherited { "True" } else { "False" }
}

fn encode_error(err: csv::Error) -> SinkError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => SinkError::Io(io),
        other => SinkError::Encode(format!("{other:?}")),
    }
}

/// [`ReportSink`] writing CSV to any [`Write`] destination.
pub struct CsvReportSink<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
    path: Option<PathBuf>,
}

impl CsvReportSink<File> {
    /// Creates (or truncates) `path` and writes the header.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)?;
        let mut sink = Self::from_writer(file)?;
        sink.path = Some(path.to_path_buf());
        tracing::debug!(path = %path.display(), "Opened CSV report");
        Ok(sink)
    }
}

impl<W: Write> CsvReportSink<W> {
    /// Wraps `writer` and writes the header.
    pub fn from_writer(writer: W) -> Result<Self, SinkError> {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::CRLF)
            .from_writer(writer);
        writer.write_record(HEADER).map_err(encode_error)?;
        Ok(Self {
            writer,
            rows: 0,
            path: None,
        })
    }

    /// Rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.rows
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Io(e.into_error()))
    }
}

impl<W: Write + Send> ReportSink for CsvReportSink<W> {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), SinkError> {
        self.writer
            .write_record([
                row.full_path.as_str(),
                row.object_id.as_str(),
                row.principal_identifier.as_str(),
                row.principal_type.as_str(),
                row.role.as_str(),
                inherited_label(row.inherited),
            ])
            .map_err(encode_error)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.writer.flush()?;
        if let Some(path) = &self.path {
            tracing::debug!(path = %path.display(), rows = self.rows, "Flushed CSV report");
        }
        Ok(())
    }
}

/// CSV report staged in a temporary file next to its destination.
///
/// Dropping it without [`commit`](Self::commit) deletes the temporary
/// file; any report already at the destination is left as it was.
pub struct StagedCsvReport {
    sink: CsvReportSink<NamedTempFile>,
    target: PathBuf,
}

impl StagedCsvReport {
    /// Opens a temporary file in `target`'s directory and writes the header.
    pub fn create(target: &Path) -> Result<Self, SinkError> {
        let dir = match target.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let file = tempfile::Builder::new()
            .prefix(".drive-audit-")
            .suffix(".csv.tmp")
            .tempfile_in(dir)?;
        tracing::debug!(
            staging = %file.path().display(),
            target = %target.display(),
            "Staging CSV report"
        );
        Ok(Self {
            sink: CsvReportSink::from_writer(file)?,
            target: target.to_path_buf(),
        })
    }

    /// Final location of the report.
    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Rows written so far (header excluded).
    pub fn rows_written(&self) -> usize {
        self.sink.rows_written()
    }

    /// Flushes the staged file and moves it over the destination.
    pub fn commit(self) -> Result<PathBuf, SinkError> {
        let rows = self.sink.rows_written();
        let file = self.sink.into_inner()?;
        file.as_file().sync_all()?;
        file.persist(&self.target).map_err(|e| SinkError::Io(e.error))?;
        tracing::debug!(path = %self.target.display(), rows, "Committed CSV report");
        Ok(self.target)
    }
}

impl ReportSink for StagedCsvReport {
    fn write_row(&mut self, row: &ReportRow) -> Result<(), SinkError> {
        self.sink.write_row(row)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.sink.finish()
    }
}
