//! Collection editors for the draft profile.
//!
//! Pure operations over ordered collections: experience and education entries
//! (addressed by index) and tag lists such as skills or job types (addressed by
//! value). Nothing here touches the network.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::Utc;
use tracing::error;

use crate::domain::profiles::{
    optional_text, present_text, Education, EducationField, Experience, ExperienceField, ItemId,
};
use crate::error::EditorError;
use crate::mapping::MAX_SERVER_ID;

/// Item of an index-addressed collection
pub trait CollectionItem {
    type Field;

    fn id(&self) -> ItemId;
    fn set_id(&mut self, id: ItemId);
    fn apply(&mut self, field: Self::Field);
}

impl CollectionItem for Experience {
    type Field = ExperienceField;

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn apply(&mut self, field: ExperienceField) {
        match field {
            ExperienceField::Company(v) => self.company = v,
            ExperienceField::Position(v) => self.position = v,
            ExperienceField::StartDate(v) => self.start_date = v,
            ExperienceField::EndDate(v) => self.end_date = present_text(v),
            ExperienceField::Description(v) => self.description = v,
        }
    }
}

impl CollectionItem for Education {
    type Field = EducationField;

    fn id(&self) -> ItemId {
        self.id
    }

    fn set_id(&mut self, id: ItemId) {
        self.id = id;
    }

    fn apply(&mut self, field: EducationField) {
        match field {
            EducationField::School(v) => self.school = v,
            EducationField::Degree(v) => self.degree = v,
            EducationField::FieldOfStudy(v) => self.field_of_study = v,
            EducationField::StartYear(v) => self.start_year = v,
            EducationField::EndYear(v) => self.end_year = optional_text(v),
            EducationField::Description(v) => self.description = v,
        }
    }
}

/// Mints placeholder ids for items created locally.
///
/// Ids are millisecond timestamps, strictly increasing per minter and always
/// above the server's id range.
#[derive(Debug, Default)]
pub struct IdMinter {
    last: AtomicI64,
}

impl IdMinter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mint(&self) -> ItemId {
        let floor = Utc::now().timestamp_millis().max(MAX_SERVER_ID + 1);
        let previous = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
                Some(floor.max(last + 1))
            })
            .unwrap_or_else(|last| last);
        floor.max(previous + 1)
    }
}

/// Appends `item` under a fresh placeholder id and returns that id.
pub fn add<T: CollectionItem>(items: &mut Vec<T>, mut item: T, ids: &IdMinter) -> ItemId {
    let id = ids.mint();
    item.set_id(id);
    items.push(item);
    id
}

pub fn update<T: CollectionItem>(
    items: &mut [T],
    index: usize,
    field: T::Field,
) -> Result<(), EditorError> {
    let len = items.len();
    let item = items.get_mut(index).ok_or_else(|| out_of_range(index, len))?;
    item.apply(field);
    Ok(())
}

/// Removes the item at `index`; later items shift down by one.
pub fn remove<T>(items: &mut Vec<T>, index: usize) -> Result<T, EditorError> {
    if index >= items.len() {
        return Err(out_of_range(index, items.len()));
    }
    Ok(items.remove(index))
}

/// Adds `value` if absent, removes it if present. Returns whether it is now a member.
pub fn toggle<T: PartialEq>(items: &mut Vec<T>, value: T) -> bool {
    match items.iter().position(|v| *v == value) {
        Some(pos) => {
            items.remove(pos);
            false
        }
        None => {
            items.push(value);
            true
        }
    }
}

pub fn set_membership<T: PartialEq>(items: &mut Vec<T>, value: T, member: bool) {
    let pos = items.iter().position(|v| *v == value);
    match (pos, member) {
        (None, true) => items.push(value),
        (Some(pos), false) => {
            items.remove(pos);
        }
        _ => {}
    }
}

fn out_of_range(index: usize, len: usize) -> EditorError {
    error!(index, len, "Collection edit addressed a missing item");
    EditorError::IndexOutOfRange { index, len }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::is_server_id;

    #[test]
    fn add_then_remove_restores_empty_list() {
        let ids = IdMinter::new();
        let mut items: Vec<Experience> = Vec::new();

        add(&mut items, Experience::blank(), &ids);
        assert_eq!(items.len(), 1);

        remove(&mut items, 0).unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn minted_ids_are_unique_placeholders() {
        let ids = IdMinter::new();
        let minted: Vec<ItemId> = (0..100).map(|_| ids.mint()).collect();

        for pair in minted.windows(2) {
            assert!(pair[1] > pair[0]);
        }
        assert!(minted.iter().all(|id| !is_server_id(*id)));
    }

    #[test]
    fn update_changes_one_field_of_one_item() {
        let ids = IdMinter::new();
        let mut items = Vec::new();
        add(&mut items, Education::blank(), &ids);
        add(&mut items, Education::blank(), &ids);

        update(&mut items, 1, EducationField::School("ETH".into())).unwrap();

        assert_eq!(items[0].school, "");
        assert_eq!(items[1].school, "ETH");
    }

    #[test]
    fn clearing_an_end_date_marks_the_entry_ongoing() {
        let mut items = vec![Experience {
            end_date: Some("Mar 2022".into()),
            ..Experience::blank()
        }];

        update(&mut items, 0, ExperienceField::EndDate(Some("  ".into()))).unwrap();
        assert_eq!(items[0].end_date, None);
        assert!(items[0].is_ongoing());
    }

    #[test]
    fn out_of_range_is_reported() {
        let mut items: Vec<Experience> = Vec::new();

        assert_eq!(
            update(&mut items, 0, ExperienceField::Company("X".into())),
            Err(EditorError::IndexOutOfRange { index: 0, len: 0 })
        );
        assert_eq!(
            remove(&mut items, 2).unwrap_err(),
            EditorError::IndexOutOfRange { index: 2, len: 0 }
        );
    }

    #[test]
    fn remove_shifts_later_items_down() {
        let ids = IdMinter::new();
        let mut items = Vec::new();
        for name in ["a", "b", "c"] {
            let mut e = Experience::blank();
            e.company = name.into();
            add(&mut items, e, &ids);
        }

        let removed = remove(&mut items, 0).unwrap();
        assert_eq!(removed.company, "a");
        assert_eq!(items[0].company, "b");
        assert_eq!(items[1].company, "c");
    }

    #[test]
    fn toggle_is_keyed_by_value() {
        let mut skills = vec!["rust".to_string(), "sql".to_string()];

        assert!(!toggle(&mut skills, "rust".to_string()));
        assert_eq!(skills, vec!["sql"]);

        assert!(toggle(&mut skills, "go".to_string()));
        assert_eq!(skills, vec!["sql", "go"]);
    }

    #[test]
    fn set_membership_is_idempotent() {
        let mut job_types = vec!["full_time".to_string()];

        set_membership(&mut job_types, "full_time".to_string(), true);
        assert_eq!(job_types.len(), 1);

        set_membership(&mut job_types, "contract".to_string(), true);
        set_membership(&mut job_types, "full_time".to_string(), false);
        set_membership(&mut job_types, "full_time".to_string(), false);
        assert_eq!(job_types, vec!["contract"]);
    }
}
