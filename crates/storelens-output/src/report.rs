//! JSON report envelope.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Builder is missing a required part.
    #[error("Missing report field: {0}")]
    Missing(&'static str),
}

/// Analysis results with what they are about and when they were produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// What was analysed, e.g. `store 1` or `competition impact`.
    pub subject: String,

    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Report contents (JSON format).
    pub contents: serde_json::Value,
}

impl Report {
    /// Create a new report stamped with the current time.
    pub fn new(subject: String, contents: serde_json::Value) -> Self {
        Self {
            subject,
            timestamp: Utc::now(),
            contents,
        }
    }

    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the report as pretty JSON.
    pub fn write_to_file(&self, path: &Path) -> Result<(), ReportError> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating reports.
#[derive(Debug, Default)]
pub struct ReportBuilder {
    subject: Option<String>,
    contents: Option<serde_json::Value>,
}

impl ReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Set the report contents.
    pub fn contents(mut self, contents: serde_json::Value) -> Self {
        self.contents = Some(contents);
        self
    }

    /// Serialize `value` as the report contents.
    pub fn contents_from<T: Serialize>(self, value: &T) -> Result<Self, ReportError> {
        let contents = serde_json::to_value(value)?;
        Ok(self.contents(contents))
    }

    /// Build the report.
    pub fn build(self) -> Result<Report, ReportError> {
        let subject = self.subject.ok_or(ReportError::Missing("subject"))?;
        Ok(Report::new(
            subject,
            self.contents.unwrap_or(serde_json::Value::Null),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_creation() {
        let report = Report::new("store 1".to_string(), serde_json::json!({"spc": 8.4}));

        assert_eq!(report.subject, "store 1");
        assert!(report.to_json().unwrap().contains("\"timestamp\""));
    }

    #[test]
    fn test_report_builder() {
        let report = ReportBuilder::new()
            .subject("competition impact")
            .contents_from(&vec![1, 2, 3])
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(report.subject, "competition impact");
        assert_eq!(report.contents, serde_json::json!([1, 2, 3]));
    }

    #[test]
    fn test_builder_requires_subject() {
        assert!(matches!(
            ReportBuilder::new().build(),
            Err(ReportError::Missing("subject"))
        ));
    }
}
