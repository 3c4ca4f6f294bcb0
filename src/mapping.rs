//! Conversion between wire records and the editable profile aggregate.
//!
//! Inbound mapping never fails except for a missing profile id: every other
//! absent field becomes an explicit default. Outbound mapping normalizes item
//! ids (placeholders become the creation sentinel) and turns display dates
//! back into ISO instants according to a [`DatePolicy`].

use chrono::{DateTime, NaiveDate, SecondsFormat, TimeZone, Utc};
use tracing::warn;

use crate::domain::profiles::{
    Education, Experience, ItemId, ProfileAggregate, ProfileId, ScheduleEntry,
};
use crate::domain::wire::{WireEducation, WireExperience, WireProfile, WireSchedule};
use crate::error::MappingError;

/// Id sent for items the server has to create
pub const CREATION_SENTINEL: ItemId = 0;

/// Largest id the server hands out (it uses 32-bit serial keys)
pub const MAX_SERVER_ID: ItemId = i32::MAX as ItemId;

/// Display format for experience dates, e.g. "Jan 2020"
const DISPLAY_DATE_FORMAT: &str = "%b %Y";

/// What to do with a draft date that cannot be parsed on save
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DatePolicy {
    /// Substitute the current instant and log a warning
    #[default]
    FallbackToNow,
    /// Fail the save with `MappingError::InvalidDate`
    Reject,
}

impl DatePolicy {
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "reject" | "strict" => Self::Reject,
            _ => Self::FallbackToNow,
        }
    }
}

pub fn is_server_id(id: ItemId) -> bool {
    (1..=MAX_SERVER_ID).contains(&id)
}

/// Genuine server ids pass through, anything else asks for creation.
pub fn normalize_item_id(id: ItemId) -> ItemId {
    if is_server_id(id) {
        id
    } else {
        CREATION_SENTINEL
    }
}

// ============================================================================
// Wire -> domain
// ============================================================================

pub fn from_wire(record: WireProfile) -> Result<ProfileAggregate, MappingError> {
    let id = record.id.ok_or(MappingError::MissingProfileId)?;

    Ok(ProfileAggregate {
        id,
        full_name: record.full_name.unwrap_or_default(),
        email: record.email.unwrap_or_default(),
        phone: record.phone.unwrap_or_default(),
        location: record.location.unwrap_or_default(),
        industry: record.industry.unwrap_or_default(),
        website: record.website.unwrap_or_default(),
        company_size: record.company_size.unwrap_or_default(),
        founded_year: record.founded_year,
        description: record.description.unwrap_or_default(),
        avatar: record.avatar.filter(|a| !a.trim().is_empty()),
        skills: dedup_tags(record.skills.unwrap_or_default()),
        job_types: dedup_tags(record.job_types.unwrap_or_default()),
        experiences: record
            .experiences
            .unwrap_or_default()
            .into_iter()
            .map(experience_from_wire)
            .collect(),
        educations: record
            .educations
            .unwrap_or_default()
            .into_iter()
            .map(education_from_wire)
            .collect(),
        schedules: record
            .schedules
            .unwrap_or_default()
            .into_iter()
            .filter_map(schedule_from_wire)
            .collect(),
    })
}

fn experience_from_wire(w: WireExperience) -> Experience {
    Experience {
        id: w.id,
        company: w.company.unwrap_or_default(),
        position: w.position.unwrap_or_default(),
        start_date: w.start_date.as_deref().map(display_date).unwrap_or_default(),
        end_date: w
            .end_date
            .as_deref()
            .filter(|d| !d.trim().is_empty())
            .map(display_date),
        description: w.description.unwrap_or_default(),
    }
}

fn education_from_wire(w: WireEducation) -> Education {
    Education {
        id: w.id,
        school: w.school.unwrap_or_default(),
        degree: w.degree.unwrap_or_default(),
        field_of_study: w.field_of_study.unwrap_or_default(),
        start_year: w.start_year.unwrap_or_default(),
        end_year: w.end_year.unwrap_or_default(),
        description: w.description.unwrap_or_default(),
    }
}

fn schedule_from_wire(w: WireSchedule) -> Option<ScheduleEntry> {
    let start = w.start_time.as_deref().and_then(parse_instant);
    let end = w.end_time.as_deref().and_then(parse_instant);

    match (start, end) {
        (Some(start), Some(end)) => Some(ScheduleEntry {
            id: w.id,
            title: w.title.unwrap_or_default(),
            start,
            end,
        }),
        _ => {
            warn!(schedule_id = w.id, "Dropping schedule entry with unreadable times");
            None
        }
    }
}

/// ISO instant -> "Jan 2020". Unreadable values are kept verbatim so the user can fix them.
fn display_date(raw: &str) -> String {
    match parse_wire_date(raw) {
        Some(date) => date.format(DISPLAY_DATE_FORMAT).to_string(),
        None => raw.to_string(),
    }
}

fn parse_wire_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    parse_instant(raw)
        .map(|dt| dt.date_naive())
        .or_else(|| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn dedup_tags(tags: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(tags.len());
    for tag in tags {
        if !out.contains(&tag) {
            out.push(tag);
        }
    }
    out
}

// ============================================================================
// Domain -> wire
// ============================================================================

pub fn to_wire(draft: &ProfileAggregate, policy: DatePolicy) -> Result<WireProfile, MappingError> {
    to_wire_at(draft, policy, Utc::now())
}

/// Same as [`to_wire`] with an explicit "now" for the date fallback.
pub fn to_wire_at(
    draft: &ProfileAggregate,
    policy: DatePolicy,
    now: DateTime<Utc>,
) -> Result<WireProfile, MappingError> {
    let dates = DateEncoder { policy, now };

    let experiences = draft
        .experiences
        .iter()
        .map(|e| experience_to_wire(e, draft.id, &dates))
        .collect::<Result<Vec<_>, _>>()?;

    let educations = draft
        .educations
        .iter()
        .map(|e| education_to_wire(e, draft.id))
        .collect();

    Ok(WireProfile {
        id: Some(draft.id),
        full_name: Some(draft.full_name.clone()),
        email: Some(draft.email.clone()),
        phone: non_empty(&draft.phone),
        location: Some(draft.location.clone()),
        industry: non_empty(&draft.industry),
        website: non_empty(&draft.website),
        company_size: non_empty(&draft.company_size),
        founded_year: draft.founded_year,
        description: Some(draft.description.clone()),
        avatar: draft.avatar.as_deref().and_then(non_empty),
        skills: Some(draft.skills.clone()),
        job_types: Some(draft.job_types.clone()),
        experiences: Some(experiences),
        educations: Some(educations),
        schedules: Some(draft.schedules.iter().map(schedule_to_wire).collect()),
    })
}

fn experience_to_wire(
    e: &Experience,
    profile_id: ProfileId,
    dates: &DateEncoder,
) -> Result<WireExperience, MappingError> {
    let end_date = match e.end_date.as_deref() {
        Some(d) if !d.trim().is_empty() => Some(dates.encode("endDate", d)?),
        _ => None,
    };

    Ok(WireExperience {
        id: normalize_item_id(e.id),
        profile_id: Some(profile_id),
        company: Some(e.company.clone()),
        position: Some(e.position.clone()),
        start_date: Some(dates.encode("startDate", &e.start_date)?),
        end_date,
        description: Some(e.description.clone()),
    })
}

fn education_to_wire(e: &Education, profile_id: ProfileId) -> WireEducation {
    WireEducation {
        id: normalize_item_id(e.id),
        profile_id: Some(profile_id),
        school: Some(e.school.clone()),
        degree: Some(e.degree.clone()),
        field_of_study: Some(e.field_of_study.clone()),
        start_year: Some(e.start_year.clone()),
        end_year: non_empty(&e.end_year),
        description: Some(e.description.clone()),
    }
}

fn schedule_to_wire(s: &ScheduleEntry) -> WireSchedule {
    WireSchedule {
        id: s.id,
        title: Some(s.title.clone()),
        start_time: Some(s.start.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        end_time: Some(s.end.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
    }
}

fn non_empty(s: &str) -> Option<String> {
    let trimmed = s.trim();
    (!trimmed.is_empty()).then(|| s.to_string())
}

struct DateEncoder {
    policy: DatePolicy,
    now: DateTime<Utc>,
}

impl DateEncoder {
    fn encode(&self, field: &'static str, display: &str) -> Result<String, MappingError> {
        let midnight = parse_display_date(display)
            .and_then(|date| date.and_hms_opt(0, 0, 0))
            .map(|dt| Utc.from_utc_datetime(&dt));

        let instant = match midnight {
            Some(instant) => instant,
            None => match self.policy {
                DatePolicy::FallbackToNow => {
                    let value = display;
                    warn!(field, value, "Unparseable date replaced with current instant");
                    self.now
                }
                DatePolicy::Reject => {
                    return Err(MappingError::InvalidDate {
                        field,
                        value: display.to_string(),
                    })
                }
            },
        };

        Ok(instant.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Accepts "Jan 2020" plus the ISO forms the API itself produces.
pub fn parse_display_date(display: &str) -> Option<NaiveDate> {
    let s = display.trim();
    if s.is_empty() {
        return None;
    }

    NaiveDate::parse_from_str(&format!("1 {}", s), "%d %b %Y")
        .ok()
        .or_else(|| parse_wire_date(s))
        .or_else(|| NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 17, 9, 30, 0).unwrap()
    }

    fn sample_wire() -> WireProfile {
        serde_json::from_value(serde_json::json!({
            "id": 7,
            "fullName": "Ann",
            "email": "ann@example.com",
            "location": "Lisbon",
            "skills": ["rust", "sql", "rust"],
            "experiences": [{
                "id": 12,
                "profileId": 7,
                "company": "Acme",
                "position": "Engineer",
                "startDate": "2020-01-01T00:00:00.000Z",
                "endDate": null
            }],
            "educations": [{ "id": 4, "school": "IST", "degree": "MSc", "startYear": "2014" }],
            "schedules": [{
                "id": 2,
                "title": "Interview",
                "startTime": "2024-06-01T10:00:00Z",
                "endTime": "2024-06-01T11:00:00Z"
            }]
        }))
        .unwrap()
    }

    #[test]
    fn from_wire_fills_defaults() {
        let profile = from_wire(sample_wire()).unwrap();

        assert_eq!(profile.id, 7);
        assert_eq!(profile.phone, "");
        assert_eq!(profile.website, "");
        assert_eq!(profile.avatar, None);
        assert_eq!(profile.skills, vec!["rust", "sql"]);
        assert_eq!(profile.experiences[0].start_date, "Jan 2020");
        assert!(profile.experiences[0].is_ongoing());
        assert_eq!(profile.educations[0].end_year, "");
        assert_eq!(profile.schedules.len(), 1);
    }

    #[test]
    fn from_wire_requires_profile_id() {
        let wire = WireProfile {
            full_name: Some("Nobody".into()),
            ..Default::default()
        };
        assert_eq!(from_wire(wire), Err(MappingError::MissingProfileId));
    }

    #[test]
    fn round_trip_is_stable_for_valid_data() {
        let profile = from_wire(sample_wire()).unwrap();
        let wire = to_wire_at(&profile, DatePolicy::Reject, fixed_now()).unwrap();
        let again = from_wire(wire).unwrap();
        assert_eq!(again, profile);
    }

    fn fully_populated() -> ProfileAggregate {
        ProfileAggregate {
            id: 31,
            full_name: "Northwind Freight".into(),
            email: "jobs@northwind.example".into(),
            phone: "+351 21 000 0000".into(),
            location: "Porto".into(),
            industry: "Logistics".into(),
            website: "https://northwind.example".into(),
            company_size: "51-200".into(),
            founded_year: Some(1998),
            description: "Regional carrier".into(),
            avatar: Some("https://cdn.example/avatars/31.png".into()),
            skills: vec!["routing".into(), "fleet".into()],
            job_types: vec!["full_time".into(), "contract".into()],
            experiences: vec![
                Experience {
                    id: 40,
                    company: "Acme".into(),
                    position: "Dispatcher".into(),
                    start_date: "Jan 2019".into(),
                    end_date: Some("Mar 2022".into()),
                    description: "Night shifts".into(),
                },
                Experience {
                    id: 41,
                    company: "Globex".into(),
                    position: "Planner".into(),
                    start_date: "Apr 2022".into(),
                    end_date: None,
                    description: String::new(),
                },
            ],
            educations: vec![Education {
                id: 9,
                school: "FEUP".into(),
                degree: "BSc".into(),
                field_of_study: "Operations".into(),
                start_year: "2012".into(),
                end_year: "2015".into(),
                description: "Thesis on routing".into(),
            }],
            schedules: vec![ScheduleEntry {
                id: 3,
                title: "Interview".into(),
                start: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
                end: Utc.with_ymd_and_hms(2024, 6, 1, 11, 0, 0).unwrap(),
            }],
        }
    }

    #[test]
    fn round_trip_is_stable_across_shapes() {
        let full = fully_populated();

        let minimal = ProfileAggregate {
            id: 2,
            ..Default::default()
        };

        let mut unfinished = fully_populated();
        unfinished.experiences[0].end_date = None;
        unfinished.educations[0].end_year = String::new();
        unfinished.avatar = None;
        unfinished.founded_year = None;
        unfinished.job_types.clear();

        let mut person = fully_populated();
        person.industry = String::new();
        person.company_size = String::new();
        person.website = String::new();
        person.phone = String::new();
        person.experiences.clear();
        person.schedules.clear();

        for profile in [full, minimal, unfinished, person] {
            let wire = to_wire_at(&profile, DatePolicy::Reject, fixed_now()).unwrap();
            let again = from_wire(wire).unwrap();
            assert_eq!(again, profile, "round trip changed profile {}", profile.id);
        }
    }

    #[test]
    fn finished_positions_keep_both_dates_on_the_wire() {
        let wire = to_wire_at(&fully_populated(), DatePolicy::Reject, fixed_now()).unwrap();

        let exp = &wire.experiences.as_ref().unwrap()[0];
        assert_eq!(exp.start_date.as_deref(), Some("2019-01-01T00:00:00.000Z"));
        assert_eq!(exp.end_date.as_deref(), Some("2022-03-01T00:00:00.000Z"));
        assert_eq!(wire.educations.as_ref().unwrap()[0].end_year.as_deref(), Some("2015"));
        assert_eq!(wire.phone.as_deref(), Some("+351 21 000 0000"));
        assert_eq!(wire.founded_year, Some(1998));
    }

    #[test]
    fn placeholder_ids_become_creation_sentinel() {
        let mut profile = from_wire(sample_wire()).unwrap();
        profile.experiences.push(Experience {
            id: 1_700_000_000_000,
            company: "New Co".into(),
            start_date: "Mar 2023".into(),
            ..Default::default()
        });
        profile.educations.push(Education {
            id: -5,
            ..Default::default()
        });

        let wire = to_wire_at(&profile, DatePolicy::Reject, fixed_now()).unwrap();
        let exps = wire.experiences.unwrap();
        assert_eq!(exps[0].id, 12);
        assert_eq!(exps[1].id, CREATION_SENTINEL);
        assert_eq!(exps[1].profile_id, Some(7));
        assert_eq!(exps[1].start_date.as_deref(), Some("2023-03-01T00:00:00.000Z"));
        assert_eq!(wire.educations.unwrap()[1].id, CREATION_SENTINEL);
    }

    #[test]
    fn unparseable_date_falls_back_to_now() {
        let mut profile = from_wire(sample_wire()).unwrap();
        profile.experiences[0].end_date = Some("sometime soon".into());

        let wire = to_wire_at(&profile, DatePolicy::FallbackToNow, fixed_now()).unwrap();
        let exp = &wire.experiences.unwrap()[0];
        assert_eq!(exp.end_date.as_deref(), Some("2024-05-17T09:30:00.000Z"));
    }

    #[test]
    fn unparseable_date_is_rejected_under_strict_policy() {
        let mut profile = from_wire(sample_wire()).unwrap();
        profile.experiences[0].start_date = "last summer".into();

        let err = to_wire_at(&profile, DatePolicy::Reject, fixed_now()).unwrap_err();
        assert_eq!(
            err,
            MappingError::InvalidDate {
                field: "startDate",
                value: "last summer".into()
            }
        );
    }

    #[test]
    fn blank_optional_strings_are_omitted() {
        let mut profile = from_wire(sample_wire()).unwrap();
        profile.website = "   ".into();
        profile.avatar = Some(String::new());

        let wire = to_wire_at(&profile, DatePolicy::FallbackToNow, fixed_now()).unwrap();
        assert_eq!(wire.website, None);
        assert_eq!(wire.avatar, None);
        assert_eq!(wire.full_name.as_deref(), Some("Ann"));
    }

    #[test]
    fn display_dates_accept_iso_forms() {
        let expected = NaiveDate::from_ymd_opt(2021, 9, 1);
        assert_eq!(parse_display_date("Sep 2021"), expected);
        assert_eq!(parse_display_date("2021-09"), expected);
        assert_eq!(parse_display_date("2021-09-01"), expected);
        assert_eq!(parse_display_date(""), None);
    }

    #[test]
    fn id_range() {
        assert!(is_server_id(1));
        assert!(is_server_id(MAX_SERVER_ID));
        assert!(!is_server_id(0));
        assert!(!is_server_id(MAX_SERVER_ID + 1));
        assert_eq!(normalize_item_id(12), 12);
    }
}
