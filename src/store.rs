//! Profile aggregate store.
//!
//! Holds the confirmed (saved) profile and, while editing, a separate draft.
//! The draft is a deep copy taken by `begin_edit`; every edit touches only the
//! draft. `discard` drops it without a network call. `commit` maps the draft to
//! wire format and saves it: on success the draft becomes the confirmed profile,
//! on failure the draft stays exactly as it was so the user can retry.
//!
//! A save that created items is followed by a reload, so the confirmed profile
//! carries the ids the server assigned instead of local placeholders. Until
//! that reload succeeds the profile is stale and `begin_edit` refuses to start.
//!
//! All state sits behind one lock that is never held across an await, so a
//! reader sees either the old or the new confirmed profile, never a mix.
//! Transitions that would overlap an in-flight load or save are rejected.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::api::Ack;
use crate::domain::profiles::{
    Education, EducationField, Experience, ExperienceField, ItemId, ProfileAggregate,
    ProfileField,
};
use crate::editors::{self, IdMinter};
use crate::error::{StoreError, StoreResult};
use crate::mapping::{self, is_server_id, DatePolicy};
use crate::notice::Notice;
use crate::services::{ProfileApi, Scope};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditMode {
    Viewing,
    Editing,
    /// Editing, with a commit waiting on the server
    Saving,
}

#[derive(Debug, Default)]
struct StoreState {
    scope: Option<Scope>,
    confirmed: Option<ProfileAggregate>,
    draft: Option<ProfileAggregate>,
    loading: bool,
    saving: bool,
    /// Confirmed profile still holds placeholder ids from a save
    stale: bool,
    notice: Option<Notice>,
}

impl StoreState {
    fn draft_mut(&mut self) -> StoreResult<&mut ProfileAggregate> {
        if self.saving {
            return Err(StoreError::SaveInFlight);
        }
        self.draft.as_mut().ok_or(StoreError::NotEditing)
    }
}

pub struct ProfileStore {
    api: Arc<dyn ProfileApi>,
    ids: IdMinter,
    date_policy: DatePolicy,
    state: Mutex<StoreState>,
}

impl ProfileStore {
    pub fn new(api: Arc<dyn ProfileApi>) -> Self {
        Self {
            api,
            ids: IdMinter::new(),
            date_policy: DatePolicy::default(),
            state: Mutex::new(StoreState::default()),
        }
    }

    pub fn with_date_policy(mut self, policy: DatePolicy) -> Self {
        self.date_policy = policy;
        self
    }

    // =========================================================================
    // Reads
    // =========================================================================

    pub fn mode(&self) -> EditMode {
        let st = self.state.lock();
        match (&st.draft, st.saving) {
            (Some(_), true) => EditMode::Saving,
            (Some(_), false) => EditMode::Editing,
            (None, _) => EditMode::Viewing,
        }
    }

    pub fn scope(&self) -> Option<Scope> {
        self.state.lock().scope
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Snapshot of the saved profile
    pub fn confirmed(&self) -> Option<ProfileAggregate> {
        self.state.lock().confirmed.clone()
    }

    /// Snapshot of the draft, present only while editing
    pub fn draft(&self) -> Option<ProfileAggregate> {
        self.state.lock().draft.clone()
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.lock().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }

    // =========================================================================
    // Load
    // =========================================================================

    /// Fetch the profile for `scope` and make it the confirmed aggregate.
    ///
    /// Allowed only while viewing; may be repeated to refresh.
    #[instrument(skip(self))]
    pub async fn load(&self, scope: Scope) -> StoreResult<()> {
        {
            let mut st = self.state.lock();
            if st.loading {
                return Err(StoreError::LoadInFlight);
            }
            if st.saving {
                return Err(StoreError::SaveInFlight);
            }
            if st.draft.is_some() {
                return Err(StoreError::AlreadyEditing);
            }
            st.loading = true;
        }

        let result = self
            .api
            .load_profile(scope)
            .await
            .map_err(StoreError::from)
            .and_then(|wire| mapping::from_wire(wire).map_err(StoreError::from));

        let mut st = self.state.lock();
        st.loading = false;

        match result {
            Ok(profile) => {
                debug!(profile_id = profile.id, "Profile loaded");
                st.confirmed = Some(profile);
                st.scope = Some(scope);
                st.stale = false;
                st.notice = None;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Profile load failed");
                st.notice = Some(Notice::from(&e));
                Err(e)
            }
        }
    }

    // =========================================================================
    // Edit session
    // =========================================================================

    pub fn begin_edit(&self) -> StoreResult<()> {
        let mut st = self.state.lock();
        if st.saving {
            return Err(StoreError::SaveInFlight);
        }
        if st.loading {
            return Err(StoreError::LoadInFlight);
        }
        if st.draft.is_some() {
            return Err(StoreError::AlreadyEditing);
        }
        if st.stale {
            return Err(StoreError::StaleProfile);
        }
        if !st.scope.map_or(false, |s| s.is_owner()) {
            return Err(if st.confirmed.is_none() {
                StoreError::NotLoaded
            } else {
                StoreError::ReadOnlyScope
            });
        }

        let snapshot = st.confirmed.clone().ok_or(StoreError::NotLoaded)?;
        st.draft = Some(snapshot);
        Ok(())
    }

    /// Drop the draft. The confirmed profile is untouched and nothing is sent.
    pub fn discard(&self) -> StoreResult<()> {
        let mut st = self.state.lock();
        if st.saving {
            return Err(StoreError::SaveInFlight);
        }
        st.draft.take().ok_or(StoreError::NotEditing)?;
        Ok(())
    }

    /// Save the draft. On failure the store stays in editing mode with the draft intact.
    #[instrument(skip(self))]
    pub async fn commit(&self) -> StoreResult<Ack> {
        let wire = {
            let mut st = self.state.lock();
            if st.saving {
                return Err(StoreError::SaveInFlight);
            }
            let draft = st.draft.as_ref().ok_or(StoreError::NotEditing)?;

            match mapping::to_wire(draft, self.date_policy) {
                Ok(wire) => {
                    st.saving = true;
                    wire
                }
                Err(e) => {
                    let err = StoreError::from(e);
                    st.notice = Some(Notice::from(&err));
                    return Err(err);
                }
            }
        };

        let result = self.api.save_profile(&wire).await;

        let (ack, reload) = {
            let mut st = self.state.lock();
            st.saving = false;

            match result {
                Ok(ack) => {
                    // Draft could not change while saving, so it is what was sent
                    let saved = st.draft.take().ok_or(StoreError::NotEditing)?;
                    let reload = if has_placeholder_items(&saved) {
                        st.stale = true;
                        st.scope
                    } else {
                        None
                    };
                    if reload.is_some() {
                        st.loading = true;
                    }
                    st.confirmed = Some(saved);
                    st.notice = ack.message.clone().map(Notice::info);
                    (ack, reload)
                }
                Err(e) => {
                    let err = StoreError::from(e);
                    warn!(error = %err, "Profile save failed, draft kept");
                    st.notice = Some(Notice::from(&err));
                    return Err(err);
                }
            }
        };

        if let Some(scope) = reload {
            self.reload_after_save(scope).await;
        }
        Ok(ack)
    }

    /// Replace the confirmed profile with the server's copy so new items get their ids.
    ///
    /// The save itself already succeeded; a failed reload only leaves the store stale.
    async fn reload_after_save(&self, scope: Scope) {
        let result = self
            .api
            .load_profile(scope)
            .await
            .map_err(StoreError::from)
            .and_then(|wire| mapping::from_wire(wire).map_err(StoreError::from));

        let mut st = self.state.lock();
        st.loading = false;

        match result {
            Ok(profile) => {
                info!(profile_id = profile.id, "Reloaded profile with server ids of new items");
                st.confirmed = Some(profile);
                st.stale = false;
            }
            Err(e) => {
                warn!(error = %e, "Reload after save failed; editing blocked until next load");
                st.notice = Some(Notice::from(&e));
            }
        }
    }

    // =========================================================================
    // Draft edits
    // =========================================================================

    fn with_draft<R>(
        &self,
        f: impl FnOnce(&mut ProfileAggregate, &IdMinter) -> StoreResult<R>,
    ) -> StoreResult<R> {
        let mut st = self.state.lock();
        let draft = st.draft_mut()?;
        f(draft, &self.ids)
    }

    pub fn update_field(&self, field: ProfileField) -> StoreResult<()> {
        self.with_draft(|d, _| {
            d.apply(field);
            Ok(())
        })
    }

    /// Appends an experience entry under a new placeholder id.
    pub fn add_experience(&self, entry: Experience) -> StoreResult<ItemId> {
        self.with_draft(|d, ids| Ok(editors::add(&mut d.experiences, entry, ids)))
    }

    pub fn update_experience(&self, index: usize, field: ExperienceField) -> StoreResult<()> {
        self.with_draft(|d, _| Ok(editors::update(&mut d.experiences, index, field)?))
    }

    pub fn remove_experience(&self, index: usize) -> StoreResult<Experience> {
        self.with_draft(|d, _| Ok(editors::remove(&mut d.experiences, index)?))
    }

    pub fn add_education(&self, entry: Education) -> StoreResult<ItemId> {
        self.with_draft(|d, ids| Ok(editors::add(&mut d.educations, entry, ids)))
    }

    pub fn update_education(&self, index: usize, field: EducationField) -> StoreResult<()> {
        self.with_draft(|d, _| Ok(editors::update(&mut d.educations, index, field)?))
    }

    pub fn remove_education(&self, index: usize) -> StoreResult<Education> {
        self.with_draft(|d, _| Ok(editors::remove(&mut d.educations, index)?))
    }

    /// Returns whether the skill is present after the toggle.
    pub fn toggle_skill(&self, skill: impl Into<String>) -> StoreResult<bool> {
        let skill = skill.into();
        self.with_draft(|d, _| Ok(editors::toggle(&mut d.skills, skill)))
    }

    pub fn set_skill(&self, skill: impl Into<String>, member: bool) -> StoreResult<()> {
        let skill = skill.into();
        self.with_draft(|d, _| {
            editors::set_membership(&mut d.skills, skill, member);
            Ok(())
        })
    }

    pub fn toggle_job_type(&self, job_type: impl Into<String>) -> StoreResult<bool> {
        let job_type = job_type.into();
        self.with_draft(|d, _| Ok(editors::toggle(&mut d.job_types, job_type)))
    }

    pub fn set_job_type(&self, job_type: impl Into<String>, member: bool) -> StoreResult<()> {
        let job_type = job_type.into();
        self.with_draft(|d, _| {
            editors::set_membership(&mut d.job_types, job_type, member);
            Ok(())
        })
    }
}

fn has_placeholder_items(profile: &ProfileAggregate) -> bool {
    profile.experiences.iter().any(|e| !is_server_id(e.id))
        || profile.educations.iter().any(|e| !is_server_id(e.id))
}
