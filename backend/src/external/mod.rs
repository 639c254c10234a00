//! External API integrations

pub mod ai_report;

pub use ai_report::{AiReportClient, QualityReport, ReportContext};
