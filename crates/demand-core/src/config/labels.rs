//! Priority to board-label lookup table.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::models::Priority;
use crate::util::is_blank;
use crate::{Error, Result};

/// Board label ids, one per priority.
///
/// Loaded once at startup and never changed afterwards. Deployments targeting
/// another board ship their own `priority-labels.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PriorityLabels {
    pub low: String,
    pub normal: String,
    pub high: String,
    pub urgent: String,
}

impl Default for PriorityLabels {
    fn default() -> Self {
        Self {
            low: "6793c847690212048aee64c2".to_string(),
            normal: "6793c847690212048aee64c6".to_string(),
            high: "6793c847690212048aee64ca".to_string(),
            urgent: "6793c847690212048aee64cc".to_string(),
        }
    }
}

impl PriorityLabels {
    /// Label id for a priority.
    #[must_use]
    pub fn label_for(&self, priority: Priority) -> &str {
        match priority {
            Priority::Low => &self.low,
            Priority::Normal => &self.normal,
            Priority::High => &self.high,
            Priority::Urgent => &self.urgent,
        }
    }

    /// Parse a label table from JSON and reject empty ids.
    pub fn from_json(raw: &str) -> Result<Self> {
        let labels: Self = serde_json::from_str(raw)?;
        for priority in Priority::ALL {
            if is_blank(labels.label_for(priority)) {
                return Err(Error::InvalidInput(format!(
                    "label id for priority '{priority}' must not be empty"
                )));
            }
        }
        Ok(Self {
            low: labels.low.trim().to_string(),
            normal: labels.normal.trim().to_string(),
            high: labels.high.trim().to_string(),
            urgent: labels.urgent.trim().to_string(),
        })
    }

    /// Load the table from `path`, or fall back to the defaults when the file
    /// does not exist. A file that exists but cannot be parsed is an error.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(
                "No priority label file at {}, using defaults",
                path.display()
            );
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }
}
