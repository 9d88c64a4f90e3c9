//! Demand form model

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::util::is_blank;

/// Demand priority. Each level maps to one label on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    #[serde(alias = "baixa")]
    Low,
    Normal,
    #[serde(alias = "alta")]
    High,
    #[serde(alias = "urgente")]
    Urgent,
}

impl Priority {
    pub const ALL: [Self; 4] = [Self::Low, Self::Normal, Self::High, Self::Urgent];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Urgent => "urgent",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" | "baixa" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" | "alta" => Ok(Self::High),
            "urgent" | "urgente" => Ok(Self::Urgent),
            other => Err(format!(
                "unknown priority '{other}' (expected low, normal, high or urgent)"
            )),
        }
    }
}

/// Demand category, appended to the card name as `[Category]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Design,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Design => "Design",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("design") {
            Ok(Self::Design)
        } else {
            Err(format!("unknown category '{}' (expected design)", s.trim()))
        }
    }
}

/// Field values of one demand form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormState {
    /// Project title (required)
    pub title: String,
    /// Detailed description (required)
    pub description: String,
    pub priority: Option<Priority>,
    pub deadline: Option<NaiveDate>,
    pub category: Option<Category>,
    /// Destination list on the board (required)
    pub target_list_id: String,
}

impl FormState {
    /// Check the required fields. Whitespace-only counts as empty.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if is_blank(&self.title) {
            return Err(ValidationError::MissingField("title"));
        }
        if is_blank(&self.description) {
            return Err(ValidationError::MissingField("description"));
        }
        if is_blank(&self.target_list_id) {
            return Err(ValidationError::MissingField("target_list_id"));
        }
        Ok(())
    }

    /// Card name: the title, suffixed with ` [Category]` when a category is set.
    #[must_use]
    pub fn card_name(&self) -> String {
        match self.category {
            Some(category) => format!("{} [{category}]", self.title),
            None => self.title.clone(),
        }
    }

    /// Due instant for the deadline, if one was chosen.
    pub fn due(&self) -> Result<Option<String>, ValidationError> {
        self.deadline.map(local_midnight_utc).transpose()
    }

    /// Clear every field back to the empty form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Interpret a date at local midnight and render it as a UTC instant
/// (`YYYY-MM-DDTHH:MM:SS.sssZ`).
pub fn local_midnight_utc(date: NaiveDate) -> Result<String, ValidationError> {
    let midnight = date.and_time(NaiveTime::MIN);
    let local = Local
        .from_local_datetime(&midnight)
        .earliest()
        .ok_or_else(|| ValidationError::InvalidDate(format!("{date} has no local midnight")))?;
    Ok(local
        .with_timezone(&Utc)
        .to_rfc3339_opts(SecondsFormat::Millis, true))
}

/// Parse a `YYYY-MM-DD` deadline.
pub fn parse_deadline(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|error| ValidationError::InvalidDate(format!("{}: {error}", raw.trim())))
}
