//! Gallery feed loader.
//!
//! Fetches a profile's posts or jobs when their tab is selected. Each kind is
//! fetched at most once per session unless `refresh` is called. A response is
//! applied only if it belongs to the latest request for the tab that is still
//! selected; anything else is stale and dropped.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::domain::gallery::{GalleryFeed, GalleryKind, JobPosting, Post};
use crate::notice::Notice;
use crate::services::{ProfileApi, Scope};

#[derive(Debug, Default)]
struct GalleryState {
    active: Option<GalleryKind>,
    loading: bool,
    /// Bumped for every request so older responses can be recognized
    generation: u64,
    posts: Option<Vec<Post>>,
    jobs: Option<Vec<JobPosting>>,
    notice: Option<Notice>,
}

impl GalleryState {
    fn cached(&self, kind: GalleryKind) -> Option<GalleryFeed> {
        match kind {
            GalleryKind::Posts => self.posts.clone().map(GalleryFeed::Posts),
            GalleryKind::Jobs => self.jobs.clone().map(GalleryFeed::Jobs),
        }
    }

    fn store(&mut self, feed: GalleryFeed) {
        match feed {
            GalleryFeed::Posts(items) => self.posts = Some(items),
            GalleryFeed::Jobs(items) => self.jobs = Some(items),
        }
    }

    fn clear(&mut self, kind: GalleryKind) {
        match kind {
            GalleryKind::Posts => self.posts = None,
            GalleryKind::Jobs => self.jobs = None,
        }
    }
}

pub struct GalleryLoader {
    api: Arc<dyn ProfileApi>,
    scope: Scope,
    state: Mutex<GalleryState>,
}

impl GalleryLoader {
    pub fn new(api: Arc<dyn ProfileApi>, scope: Scope) -> Self {
        Self {
            api,
            scope,
            state: Mutex::new(GalleryState::default()),
        }
    }

    pub fn active(&self) -> Option<GalleryKind> {
        self.state.lock().active
    }

    pub fn is_loading(&self) -> bool {
        self.state.lock().loading
    }

    /// Items of the selected tab; empty while loading, after a failure, or with no tab.
    pub fn current(&self) -> Option<GalleryFeed> {
        let st = self.state.lock();
        let kind = st.active?;
        Some(st.cached(kind).unwrap_or_else(|| GalleryFeed::empty(kind)))
    }

    /// Last fetched items for `kind`, regardless of the selected tab
    pub fn items(&self, kind: GalleryKind) -> GalleryFeed {
        self.state
            .lock()
            .cached(kind)
            .unwrap_or_else(|| GalleryFeed::empty(kind))
    }

    pub fn notice(&self) -> Option<Notice> {
        self.state.lock().notice.clone()
    }

    pub fn dismiss_notice(&self) {
        self.state.lock().notice = None;
    }

    /// Switch to `kind`, fetching it unless already cached or in flight.
    #[instrument(skip(self))]
    pub async fn select(&self, kind: GalleryKind) {
        let generation = {
            let mut st = self.state.lock();
            let reselect = st.active == Some(kind);
            st.active = Some(kind);

            if st.cached(kind).is_some() {
                st.loading = false;
                return;
            }
            if reselect && st.loading {
                return;
            }
            Self::start_request(&mut st)
        };

        self.fetch(kind, generation).await;
    }

    /// Re-fetch the selected tab, ignoring the cache. No-op without a tab.
    #[instrument(skip(self))]
    pub async fn refresh(&self) {
        let (kind, generation) = {
            let mut st = self.state.lock();
            let Some(kind) = st.active else {
                return;
            };
            (kind, Self::start_request(&mut st))
        };

        self.fetch(kind, generation).await;
    }

    fn start_request(st: &mut GalleryState) -> u64 {
        st.generation += 1;
        st.loading = true;
        st.generation
    }

    async fn fetch(&self, kind: GalleryKind, generation: u64) {
        let result = self.api.load_gallery(kind, self.scope).await;

        let mut st = self.state.lock();
        if st.active != Some(kind) || st.generation != generation {
            debug!(%kind, generation, "Dropping stale gallery response");
            return;
        }
        st.loading = false;

        match result {
            Ok(feed) if feed.kind() == kind => {
                debug!(%kind, items = feed.len(), "Gallery loaded");
                st.store(feed);
                st.notice = None;
            }
            Ok(feed) => {
                warn!(%kind, got = %feed.kind(), "Gallery response for the wrong feed");
                st.clear(kind);
            }
            Err(e) => {
                warn!(%kind, error = %e, "Gallery fetch failed");
                st.clear(kind);
                st.notice = Some(Notice::error(format!("Could not load {}: {}", kind, e)));
            }
        }
    }
}
