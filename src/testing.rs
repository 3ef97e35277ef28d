/// In-memory host doubles for engine and message tests
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::task::Poll;

use async_trait::async_trait;
use futures::executor::LocalPool;
use futures::future::poll_fn;
use futures::task::LocalSpawnExt;

use crate::engine::GroupingEngine;
use crate::error::{GrouperError, Result};
use crate::group_style::GroupStyle;
use crate::host::{SettingsStore, TabService};
use crate::settings::SETTINGS_KEY;
use crate::tab_data::{GroupId, TAB_GROUP_ID_NONE, TabId, TabInfo};

#[derive(Debug, Clone, PartialEq)]
pub enum HostCall {
    Query,
    Create(Vec<TabId>),
    Add(Vec<TabId>, GroupId),
    Update(GroupId, GroupStyle),
}

pub fn web_tab(id: TabId, url: &str) -> TabInfo {
    TabInfo::new(id, Some(url.to_string()), TAB_GROUP_ID_NONE)
}

/// Engine wired to the given doubles, spawning onto the returned pool
pub fn test_engine(
    tabs: MockTabs,
    store: MockStore,
) -> (Rc<GroupingEngine<MockTabs, MockStore>>, LocalPool) {
    let pool = LocalPool::new();
    let spawner = pool.spawner();
    let engine = GroupingEngine::new(
        tabs,
        store,
        Box::new(move |task| {
            spawner.spawn_local(task).expect("local pool accepts tasks");
        }),
    );
    (engine, pool)
}

/// Records every call and tracks group membership like the browser would
pub struct MockTabs {
    tabs: RefCell<Vec<TabInfo>>,
    calls: RefCell<Vec<HostCall>>,
    next_group: Cell<GroupId>,
    failing_tabs: RefCell<Vec<TabId>>,
    removed_groups: RefCell<Vec<GroupId>>,
    fail_queries: Cell<bool>,
    creates_paused: Cell<bool>,
}

impl MockTabs {
    pub fn new() -> Self {
        Self::with_tabs(Vec::new())
    }

    pub fn with_tabs(tabs: Vec<TabInfo>) -> Self {
        MockTabs {
            tabs: RefCell::new(tabs),
            calls: RefCell::new(Vec::new()),
            next_group: Cell::new(100),
            failing_tabs: RefCell::new(Vec::new()),
            removed_groups: RefCell::new(Vec::new()),
            fail_queries: Cell::new(false),
            creates_paused: Cell::new(false),
        }
    }

    /// Group creation fails for any batch containing `tab_id`
    pub fn fail_create_for(&self, tab_id: TabId) {
        self.failing_tabs.borrow_mut().push(tab_id);
    }

    /// The group's tabs leave it and the browser deletes it
    pub fn remove_group(&self, group_id: GroupId) {
        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab.group_id == group_id {
                tab.group_id = TAB_GROUP_ID_NONE;
            }
        }
        self.removed_groups.borrow_mut().push(group_id);
    }

    pub fn fail_queries(&self) {
        self.fail_queries.set(true);
    }

    /// Hold `create_group` calls pending until `resume_creates`
    pub fn pause_creates(&self) {
        self.creates_paused.set(true);
    }

    pub fn resume_creates(&self) {
        self.creates_paused.set(false);
    }

    pub fn tab(&self, id: TabId) -> TabInfo {
        self.tabs
            .borrow()
            .iter()
            .find(|tab| tab.id == id)
            .cloned()
            .expect("unknown tab id")
    }

    pub fn calls(&self) -> Vec<HostCall> {
        self.calls.borrow().clone()
    }

    pub fn creates(&self) -> Vec<Vec<TabId>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Create(ids) => Some(ids),
                _ => None,
            })
            .collect()
    }

    pub fn adds(&self) -> Vec<(Vec<TabId>, GroupId)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Add(ids, group_id) => Some((ids, group_id)),
                _ => None,
            })
            .collect()
    }

    pub fn updates(&self) -> Vec<(GroupId, GroupStyle)> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                HostCall::Update(group_id, style) => Some((group_id, style)),
                _ => None,
            })
            .collect()
    }

    fn move_tabs(&self, tab_ids: &[TabId], group_id: GroupId) {
        for tab in self.tabs.borrow_mut().iter_mut() {
            if tab_ids.contains(&tab.id) {
                tab.group_id = group_id;
            }
        }
    }
}

#[async_trait(?Send)]
impl TabService for MockTabs {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        self.calls.borrow_mut().push(HostCall::Query);
        if self.fail_queries.get() {
            return Err(GrouperError::Host("tabs.query rejected".to_string()));
        }
        Ok(self.tabs.borrow().clone())
    }

    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId> {
        self.calls.borrow_mut().push(HostCall::Create(tab_ids.to_vec()));
        poll_fn(|_| {
            if self.creates_paused.get() {
                Poll::Pending
            } else {
                Poll::Ready(())
            }
        })
        .await;

        if tab_ids.iter().any(|id| self.failing_tabs.borrow().contains(id)) {
            return Err(GrouperError::Host(format!("No tab with id: {:?}", tab_ids)));
        }
        let group_id = self.next_group.get();
        self.next_group.set(group_id + 1);
        self.move_tabs(tab_ids, group_id);
        Ok(group_id)
    }

    async fn add_to_group(&self, tab_ids: &[TabId], group_id: GroupId) -> Result<()> {
        self.calls.borrow_mut().push(HostCall::Add(tab_ids.to_vec(), group_id));
        if self.removed_groups.borrow().contains(&group_id) {
            return Err(GrouperError::Host(format!("No group with id: {}", group_id)));
        }
        self.move_tabs(tab_ids, group_id);
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, style: &GroupStyle) -> Result<()> {
        self.calls
            .borrow_mut()
            .push(HostCall::Update(group_id, style.clone()));
        Ok(())
    }
}

/// Key-value storage backed by a map
#[derive(Default)]
pub struct MockStore {
    values: RefCell<HashMap<String, serde_json::Value>>,
    fail_reads: Cell<bool>,
    fail_writes: Cell<bool>,
}

impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: serde_json::Value) -> Self {
        let store = Self::default();
        store
            .values
            .borrow_mut()
            .insert(SETTINGS_KEY.to_string(), settings);
        store
    }

    pub fn fail_reads(&self) {
        self.fail_reads.set(true);
    }

    pub fn fail_writes(&self) {
        self.fail_writes.set(true);
    }

    pub fn stored(&self, key: &str) -> Option<serde_json::Value> {
        self.values.borrow().get(key).cloned()
    }
}

#[async_trait(?Send)]
impl SettingsStore for MockStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        if self.fail_reads.get() {
            return Err(GrouperError::Storage("storage.sync.get rejected".to_string()));
        }
        Ok(self.stored(key))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        if self.fail_writes.get() {
            return Err(GrouperError::Storage("QUOTA_BYTES_PER_ITEM quota exceeded".to_string()));
        }
        self.values.borrow_mut().insert(key.to_string(), value);
        Ok(())
    }
}
