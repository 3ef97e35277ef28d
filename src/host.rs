/// The browser capabilities the grouper depends on
use async_trait::async_trait;

use crate::error::Result;
use crate::group_style::GroupStyle;
use crate::tab_data::{GroupId, TabId, TabInfo};

/// Tab and tab-group operations (`chrome.tabs` / `chrome.tabGroups`)
#[async_trait(?Send)]
pub trait TabService {
    /// All tabs in all windows
    async fn query_tabs(&self) -> Result<Vec<TabInfo>>;

    /// Put `tab_ids` into a brand new group and return its id
    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId>;

    /// Move `tab_ids` into an existing group
    async fn add_to_group(&self, tab_ids: &[TabId], group_id: GroupId) -> Result<()>;

    async fn update_group(&self, group_id: GroupId, style: &GroupStyle) -> Result<()>;
}

/// Named values in persistent key-value storage
#[async_trait(?Send)]
pub trait SettingsStore {
    /// `Ok(None)` when nothing is stored under `key`
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()>;
}
