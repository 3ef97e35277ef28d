/// The grouping engine: settings, the domain → group cache, and every grouping decision
use std::cell::RefCell;
use std::rc::Rc;

use futures::future::LocalBoxFuture;
use log::{debug, error, info, warn};

use crate::cache::DomainGroupCache;
use crate::domain::{extract_domain, partition_by_domain};
use crate::error::Result;
use crate::group_style::GroupStyle;
use crate::host::{SettingsStore, TabService};
use crate::settings::{PartialSettings, SETTINGS_KEY, Settings};
use crate::tab_data::{GroupId, TabChange, TabId, TabInfo};

/// Runs background work to completion without the caller awaiting it
pub type Spawner = Box<dyn Fn(LocalBoxFuture<'static, ()>)>;

/// What a single-tab grouping attempt did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupOutcome {
    /// No domain key, or automatic grouping is off
    Skipped,
    /// A new group was created for the tab's domain
    Created(GroupId),
    /// The tab was moved into the domain's cached group
    Joined(GroupId),
    /// The tab was already in the domain's cached group
    AlreadyGrouped(GroupId),
    /// A host call failed; the error has been logged
    Failed,
}

struct EngineState {
    settings: Settings,
    cache: DomainGroupCache,
}

/// Owns settings and the domain → group cache.
///
/// All state lives in one `RefCell` and is only borrowed for short
/// synchronous sections, never across an `.await`, so concurrent handlers
/// interleave at host calls only. Cache writes are tagged with the cache
/// generation they started under and dropped if a clear happened meanwhile.
pub struct GroupingEngine<T, S> {
    tabs: T,
    store: S,
    state: RefCell<EngineState>,
    spawn: Spawner,
}

impl<T, S> GroupingEngine<T, S>
where
    T: TabService + 'static,
    S: SettingsStore + 'static,
{
    pub fn new(tabs: T, store: S, spawn: Spawner) -> Rc<Self> {
        Rc::new(GroupingEngine {
            tabs,
            store,
            state: RefCell::new(EngineState {
                settings: Settings::default(),
                cache: DomainGroupCache::new(),
            }),
            spawn,
        })
    }

    pub fn settings(&self) -> Settings {
        self.state.borrow().settings.clone()
    }

    #[cfg(test)]
    pub(crate) fn tab_service(&self) -> &T {
        &self.tabs
    }

    #[cfg(test)]
    pub(crate) fn settings_store(&self) -> &S {
        &self.store
    }

    #[cfg(test)]
    pub(crate) fn cached_group(&self, domain: &str) -> Option<GroupId> {
        self.state.borrow().cache.get(domain)
    }

    #[cfg(test)]
    pub(crate) fn cached_group_count(&self) -> usize {
        self.state.borrow().cache.len()
    }

    /// Load settings from storage, falling back to defaults on any failure
    pub async fn load_settings(&self) {
        let settings = match self.store.get(SETTINGS_KEY).await {
            Ok(stored) => Settings::from_stored(stored),
            Err(e) => {
                error!("Error loading settings: {}", e);
                Settings::default()
            }
        };
        info!("Settings loaded: {:?}", settings);
        self.state.borrow_mut().settings = settings;
    }

    async fn persist_settings(&self, settings: Settings) {
        let result = match serde_json::to_value(&settings) {
            Ok(value) => self.store.set(SETTINGS_KEY, value).await,
            Err(e) => Err(e.into()),
        };
        match result {
            Ok(()) => debug!("Settings saved"),
            Err(e) => error!("Error saving settings: {}", e),
        }
    }

    fn auto_grouping(&self) -> bool {
        self.state.borrow().settings.auto_group_new_tabs
    }

    fn group_subdomains(&self) -> bool {
        self.state.borrow().settings.group_subdomains
    }

    fn style_for(&self, domain: &str) -> GroupStyle {
        let state = self.state.borrow();
        GroupStyle::for_domain(
            domain,
            &state.settings.domain_colors,
            &state.settings.custom_domain_names,
        )
    }

    /// `tabs.onCreated`
    pub async fn handle_tab_created(&self, tab: &TabInfo) -> GroupOutcome {
        if !self.auto_grouping() || tab.url.is_none() {
            return GroupOutcome::Skipped;
        }
        self.group_tab(tab).await
    }

    /// `tabs.onUpdated`; only navigations to a new URL are considered
    pub async fn handle_tab_updated(&self, change: &TabChange, tab: &TabInfo) -> GroupOutcome {
        if change.url.is_none() || !self.auto_grouping() {
            return GroupOutcome::Skipped;
        }
        self.group_tab(tab).await
    }

    /// Put one tab into its domain's group, creating the group on first sight.
    /// Host failures are logged and reported as `GroupOutcome::Failed`.
    pub async fn group_tab(&self, tab: &TabInfo) -> GroupOutcome {
        match self.try_group_tab(tab).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Error grouping tab {} ({:?}): {}", tab.id, tab.url, e);
                GroupOutcome::Failed
            }
        }
    }

    async fn try_group_tab(&self, tab: &TabInfo) -> Result<GroupOutcome> {
        let Some(domain) = tab
            .url
            .as_deref()
            .and_then(|url| extract_domain(url, self.group_subdomains()))
        else {
            return Ok(GroupOutcome::Skipped);
        };

        let (cached, generation) = {
            let state = self.state.borrow();
            (state.cache.get(&domain), state.cache.generation())
        };

        match cached {
            None => {
                let group_id = self.create_domain_group(generation, domain, &[tab.id]).await?;
                Ok(GroupOutcome::Created(group_id))
            }
            Some(group_id) if tab.group() != Some(group_id) => {
                debug!("Adding tab {} to group {} ({})", tab.id, group_id, domain);
                if let Err(e) = self.tabs.add_to_group(&[tab.id], group_id).await {
                    // The browser removes a group once its last tab leaves
                    if self.state.borrow_mut().cache.forget(generation, &domain, group_id) {
                        warn!("Dropped cached group {} for {}", group_id, domain);
                    }
                    return Err(e);
                }
                Ok(GroupOutcome::Joined(group_id))
            }
            Some(group_id) => Ok(GroupOutcome::AlreadyGrouped(group_id)),
        }
    }

    /// Create a group holding `tab_ids`, style it, then cache it unless the
    /// cache was cleared since `generation`.
    async fn create_domain_group(
        &self,
        generation: u64,
        domain: String,
        tab_ids: &[TabId],
    ) -> Result<GroupId> {
        let group_id = self.tabs.create_group(tab_ids).await?;
        let style = self.style_for(&domain);
        self.tabs.update_group(group_id, &style).await?;

        debug!(
            "Created group {} {:?} for {} with {} tab(s)",
            group_id,
            style.title,
            domain,
            tab_ids.len()
        );
        if !self.state.borrow_mut().cache.record(generation, domain, group_id) {
            warn!("Cache was cleared while group {} was being created; not caching it", group_id);
        }
        Ok(group_id)
    }

    /// The full reconciliation pass: one freshly created group per domain,
    /// each holding every tab of that domain. Existing memberships are not
    /// consulted and groups from earlier passes are left as they are.
    ///
    /// Returns the number of groups created.
    pub async fn group_existing_tabs(&self) -> usize {
        let tabs = match self.tabs.query_tabs().await {
            Ok(tabs) => tabs,
            Err(e) => {
                error!("Error grouping existing tabs: {}", e);
                return 0;
            }
        };

        let generation = self.state.borrow().cache.generation();
        let batches = partition_by_domain(&tabs, self.group_subdomains());
        info!("Grouping {} tab(s) into {} domain(s)", tabs.len(), batches.len());

        let mut created = 0;
        for (domain, tab_ids) in batches {
            if tab_ids.is_empty() {
                continue;
            }
            let label = domain.clone();
            match self.create_domain_group(generation, domain, &tab_ids).await {
                Ok(_) => created += 1,
                Err(e) => error!("Error grouping tabs for {}: {}", label, e),
            }
        }
        created
    }

    /// Drop every cached domain → group association
    pub fn invalidate_cache(&self) {
        self.state.borrow_mut().cache.clear();
        debug!("Domain group cache cleared");
    }

    fn spawn_full_pass(self: &Rc<Self>) {
        let engine = Rc::clone(self);
        (self.spawn)(Box::pin(async move {
            engine.group_existing_tabs().await;
        }));
    }

    /// Shallow-merge `update`, persist it, clear the cache and start a full
    /// pass. Returns once the merge is applied; persisting and regrouping
    /// run in the background.
    pub fn update_settings(self: &Rc<Self>, update: PartialSettings) -> Settings {
        let merged = {
            let mut state = self.state.borrow_mut();
            state.settings.merge(update);
            state.settings.clone()
        };

        let engine = Rc::clone(self);
        let to_save = merged.clone();
        (self.spawn)(Box::pin(async move {
            engine.persist_settings(to_save).await;
        }));

        self.invalidate_cache();
        self.spawn_full_pass();
        merged
    }

    /// Clear the cache and start a full pass in the background
    pub fn regroup(self: &Rc<Self>) {
        self.invalidate_cache();
        self.spawn_full_pass();
    }
}
