//! xlsxjson - Spreadsheet-to-JSON record export pipeline
//!
//! This crate decodes spreadsheet workbooks (local bytes, files, or remote shared
//! documents), normalizes each sheet into ordered row records, and exports a selected
//! range of rows as JSON: clipboard text, a downloadable file, or a zip archive of
//! many converted files.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use xlsxjson::{ExportSink, PipelineBuilder, RowRange};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a pipeline with default settings (column-letter headers)
//!     let pipeline = PipelineBuilder::new().build()?;
//!
//!     // Decode and normalize every sheet
//!     let sheets = pipeline.load_file("example.xlsx")?;
//!
//!     // Export rows 1..=20 of the first sheet as a JSON file
//!     let output = pipeline.export(sheets[0].records(), RowRange::new(1, 20), &ExportSink::download())?;
//!     println!("{}", output.text());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Named Fields
//!
//! ```rust,no_run
//! use xlsxjson::{HeaderMode, PipelineBuilder, SheetSelector};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = PipelineBuilder::new()
//!         .with_header_mode(HeaderMode::FirstRow)  // First row becomes field names
//!         .with_sheet_selector(SheetSelector::Name("Orders".to_string()))
//!         .with_row_keys(true)  // Append "__rowKey": "row-N"
//!         .build()?;
//!
//!     let sheets = pipeline.load_file("orders.xlsx")?;
//!     println!("{} records", sheets[0].len());
//!
//!     Ok(())
//! }
//! ```
//!
//! # Batch Export
//!
//! ```rust,no_run
//! use xlsxjson::{HeaderMode, PipelineBuilder};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pipeline = PipelineBuilder::new()
//!         .with_header_mode(HeaderMode::FirstRow)
//!         .build()?;
//!
//!     // Non-.xlsx files are skipped; failing files are reported, not fatal
//!     let report = pipeline.export_batch_paths(["a.xlsx", "b.xlsx", "notes.txt"])?;
//!     for entry in &report.entries {
//!         println!("{} ({} rows)", entry.file_name, entry.rows);
//!     }
//!     report.archive.save_to(".")?;
//!
//!     Ok(())
//! }
//! ```
//!
//! # Interactive Session
//!
//! ```rust,no_run
//! use xlsxjson::{PipelineBuilder, Session};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = Session::new(PipelineBuilder::new().build()?);
//!     session.load_file("example.xlsx")?;
//!     session.select_sheet("Sheet1")?;
//!     session.set_range(2, 5);
//!
//!     print!("{}", session.preview_table());
//!     let text = session.copy_json()?;
//!     println!("{}", text.as_str());
//!
//!     Ok(())
//! }
//! ```

mod api;
mod builder;
mod error;
mod formatter;
mod normalizer;
mod output;
mod parser;
mod remote;
mod security;
mod session;
mod types;
mod window;

// 公開API
pub use api::{DateFormat, ExportSink, HeaderMode, SheetSelector};
pub use builder::{BatchReport, Pipeline, PipelineBuilder, SourceFile, DEFAULT_EXTENSION_FILTER};
pub use error::{Result, XlsxToJsonError};
pub use normalizer::{Record, RowKey, SheetNormalizer, SheetRecords, DEFAULT_ROW_KEY_FIELD};
pub use output::{
    ArchiveBuilder, ArchiveEntrySummary, ClipboardText, Download, ExportOutput, ExportPayload,
    JsonExporter, PreviewTable, DEFAULT_ARCHIVE_NAME, DEFAULT_JSON_FILE_NAME,
};
pub use parser::{CalamineDecoder, Sheet, Workbook, WorkbookDecoder};
#[cfg(feature = "remote")]
pub use remote::HttpByteSource;
pub use remote::{export_url, extract_document_id, ByteSource, RemoteSheetFetcher};
pub use session::{Notification, NotificationLevel, Session};
pub use types::{column_letter, CellCoord, CellSpan, CellValue};
pub use window::{RowRange, RowWindow, PREVIEW_ROW_LIMIT};
