//! Programme export: drives a rendered programme day by day into a PDF.

pub mod capture;
pub mod document;
pub mod orchestrator;

pub use capture::{CaptureRow, DayCapture, ExportSurface};
pub use document::{PdfProgramme, ProgrammeDocument};
pub use orchestrator::{
    export_filename, export_programme, ExportError, ExportOptions, ExportState, ExportedProgramme,
    ProgrammeExporter,
};
