//! Read-only reporting surfaces over the transactional core.
//!
//! No schema-validated full SAF-T exporter — see [`saft`].

pub mod saft;

pub use saft::SaftReportService;
