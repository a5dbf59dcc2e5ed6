//! Timeline entries.

use derive_getters::Getters;
use serde::Serialize;
use uuid::Uuid;

/// Kind of event recorded on the timeline.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum LogCategory {
    /// Admission and order notices.
    System,
    /// A revealed history section.
    History,
    /// Observations.
    Vitals,
    /// Laboratory or bedside result.
    Lab,
    /// Radiology report.
    Imaging,
    /// Treatment given.
    Intervention,
    /// Case outcome.
    Diagnosis,
}

/// One immutable timeline entry.
#[derive(Debug, Clone, PartialEq, Eq, Getters, Serialize)]
pub struct LogEntry {
    /// Unique entry id.
    id: Uuid,
    /// Wall-clock time of creation, formatted for display.
    timestamp: String,
    /// Entry category.
    category: LogCategory,
    /// Headline.
    title: String,
    /// Narrative content.
    content: String,
    /// Cost charged by this entry, in pounds.
    cost: u32,
}

impl LogEntry {
    /// Creates an entry stamped with the current local time.
    pub fn new(
        category: LogCategory,
        title: impl Into<String>,
        content: impl Into<String>,
        cost: u32,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: chrono::Local::now().format("%H:%M").to_string(),
            category,
            title: title.into(),
            content: content.into(),
            cost,
        }
    }
}
