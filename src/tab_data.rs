/// Data structures for tabs and tab events observed from the browser
use serde::{Deserialize, Serialize};

/// Tab identifier issued by the browser
pub type TabId = i32;

/// Tab group identifier issued by the browser
pub type GroupId = i32;

/// `chrome.tabGroups.TAB_GROUP_ID_NONE`: the tab is not in any group
pub const TAB_GROUP_ID_NONE: GroupId = -1;

/// The attributes of a browser tab the grouper reads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    /// Absent while a freshly created tab has not committed a navigation
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default = "no_group")]
    pub group_id: GroupId,
}

fn no_group() -> GroupId {
    TAB_GROUP_ID_NONE
}

impl TabInfo {
    pub fn new(id: TabId, url: Option<String>, group_id: GroupId) -> TabInfo {
        TabInfo { id, url, group_id }
    }

    /// The group this tab currently belongs to, if any
    pub fn group(&self) -> Option<GroupId> {
        (self.group_id != TAB_GROUP_ID_NONE).then_some(self.group_id)
    }
}

/// The `changeInfo` of a `tabs.onUpdated` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabChange {
    /// Set only when the tab navigated to a new URL
    #[serde(default)]
    pub url: Option<String>,
}
