//! Profile domain types
//!
//! Editable in-memory shape of a user or company profile. Every optional text
//! field is an explicit empty string when absent so editors never see a hole.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-issued profile identity
pub type ProfileId = i64;

/// Identity of a nested collection item (server id or local placeholder)
pub type ItemId = i64;

/// Profile aggregate (confirmed or draft)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ProfileAggregate {
    pub id: ProfileId,
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub industry: String,
    pub website: String,
    pub company_size: String,
    pub founded_year: Option<i32>,
    pub description: String,
    pub avatar: Option<String>,
    pub skills: Vec<String>,
    pub job_types: Vec<String>,
    pub experiences: Vec<Experience>,
    pub educations: Vec<Education>,
    pub schedules: Vec<ScheduleEntry>,
}

/// Work experience entry. Dates use the "Jan 2020" display format.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Experience {
    pub id: ItemId,
    pub company: String,
    pub position: String,
    pub start_date: String,
    /// `None` means the position is ongoing
    pub end_date: Option<String>,
    pub description: String,
}

/// Education entry. Years are free-form text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Education {
    pub id: ItemId,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_year: String,
    pub end_year: String,
    pub description: String,
}

/// Schedule entry, owned by the scheduling service and only displayed here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: ItemId,
    pub title: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Single-field edit of the profile's scalar fields
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileField {
    FullName(String),
    Email(String),
    Phone(String),
    Location(String),
    Industry(String),
    Website(String),
    CompanySize(String),
    FoundedYear(Option<i32>),
    Description(String),
    /// URL handed back by the avatar upload service
    Avatar(Option<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceField {
    Company(String),
    Position(String),
    StartDate(String),
    EndDate(Option<String>),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationField {
    School(String),
    Degree(String),
    FieldOfStudy(String),
    StartYear(String),
    EndYear(String),
    Description(String),
}

impl ProfileAggregate {
    pub fn apply(&mut self, field: ProfileField) {
        match field {
            ProfileField::FullName(v) => self.full_name = v,
            ProfileField::Email(v) => self.email = v,
            ProfileField::Phone(v) => self.phone = optional_text(v),
            ProfileField::Location(v) => self.location = v,
            ProfileField::Industry(v) => self.industry = optional_text(v),
            ProfileField::Website(v) => self.website = optional_text(v),
            ProfileField::CompanySize(v) => self.company_size = optional_text(v),
            ProfileField::FoundedYear(v) => self.founded_year = v,
            ProfileField::Description(v) => self.description = v,
            ProfileField::Avatar(v) => self.avatar = present_text(v),
        }
    }
}

impl Experience {
    /// Blank entry as created by the "add experience" button.
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn is_ongoing(&self) -> bool {
        self.end_date.as_deref().map_or(true, |d| d.trim().is_empty())
    }
}

impl Education {
    pub fn blank() -> Self {
        Self::default()
    }
}

/// Optional text fields hold either real content or nothing; whitespace-only
/// input is stored as empty since it is omitted on save anyway.
pub fn optional_text(value: String) -> String {
    if value.trim().is_empty() {
        String::new()
    } else {
        value
    }
}

/// Same rule for fields modelled as `Option`: blank becomes `None`.
pub fn present_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_optional_fields_are_stored_empty() {
        let mut profile = ProfileAggregate::default();
        profile.apply(ProfileField::Phone("   ".into()));
        profile.apply(ProfileField::Website("\t".into()));
        profile.apply(ProfileField::Avatar(Some(" ".into())));
        profile.apply(ProfileField::Industry("Logistics".into()));

        assert_eq!(profile.phone, "");
        assert_eq!(profile.website, "");
        assert_eq!(profile.avatar, None);
        assert_eq!(profile.industry, "Logistics");
    }

    #[test]
    fn required_fields_keep_what_was_typed() {
        let mut profile = ProfileAggregate::default();
        profile.apply(ProfileField::FullName("  ".into()));
        assert_eq!(profile.full_name, "  ");
    }
}
