/// Bindings to the extension APIs through the `background.js` shim
use std::rc::Rc;

use async_trait::async_trait;
use log::warn;
use serde::Serialize;
use serde::de::DeserializeOwned;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;

use crate::engine::GroupingEngine;
use crate::error::{GrouperError, Result};
use crate::group_style::GroupStyle;
use crate::host::{SettingsStore, TabService};
use crate::messages::Request;
use crate::tab_data::{GroupId, TabChange, TabId, TabInfo};

// Import JS bridge functions
#[wasm_bindgen(module = "/background.js")]
extern "C" {
    #[wasm_bindgen(catch)]
    async fn queryTabs() -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn groupTabs(
        tab_ids: JsValue,
        group_id: Option<i32>,
    ) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn updateGroup(group_id: i32, properties: JsValue) -> std::result::Result<(), JsValue>;

    #[wasm_bindgen(catch)]
    async fn getStorage(key: &str) -> std::result::Result<JsValue, JsValue>;

    #[wasm_bindgen(catch)]
    async fn setStorage(key: &str, value: JsValue) -> std::result::Result<(), JsValue>;

    fn onTabCreated(callback: &js_sys::Function);

    fn onTabUpdated(callback: &js_sys::Function);

    fn onMessage(callback: &js_sys::Function);
}

pub type BackgroundEngine = GroupingEngine<ChromeTabs, ChromeStorage>;

/// Serialize with plain JS objects for maps, as the extension APIs expect
pub fn to_js<V: Serialize + ?Sized>(value: &V) -> Result<JsValue> {
    Ok(value.serialize(&serde_wasm_bindgen::Serializer::json_compatible())?)
}

pub fn from_js<V: DeserializeOwned>(value: JsValue) -> Result<V> {
    Ok(serde_wasm_bindgen::from_value(value)?)
}

/// `chrome.tabs` + `chrome.tabGroups`
pub struct ChromeTabs;

#[async_trait(?Send)]
impl TabService for ChromeTabs {
    async fn query_tabs(&self) -> Result<Vec<TabInfo>> {
        let tabs_js = queryTabs()
            .await
            .map_err(|e| GrouperError::Host(format!("Failed to query tabs: {:?}", e)))?;
        from_js(tabs_js)
    }

    async fn create_group(&self, tab_ids: &[TabId]) -> Result<GroupId> {
        let group_js = groupTabs(to_js(tab_ids)?, None)
            .await
            .map_err(|e| {
                GrouperError::Host(format!("Failed to group tabs {:?}: {:?}", tab_ids, e))
            })?;
        from_js(group_js)
    }

    async fn add_to_group(&self, tab_ids: &[TabId], group_id: GroupId) -> Result<()> {
        groupTabs(to_js(tab_ids)?, Some(group_id))
            .await
            .map_err(|e| {
                GrouperError::Host(format!(
                    "Failed to add tabs {:?} to group {}: {:?}",
                    tab_ids, group_id, e
                ))
            })?;
        Ok(())
    }

    async fn update_group(&self, group_id: GroupId, style: &GroupStyle) -> Result<()> {
        updateGroup(group_id, to_js(style)?)
            .await
            .map_err(|e| {
                GrouperError::Host(format!("Failed to update group {}: {:?}", group_id, e))
            })
    }
}

/// `chrome.storage.sync`
pub struct ChromeStorage;

#[async_trait(?Send)]
impl SettingsStore for ChromeStorage {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let value_js = getStorage(key)
            .await
            .map_err(|e| GrouperError::Storage(format!("Failed to get storage: {:?}", e)))?;

        if value_js.is_null() || value_js.is_undefined() {
            Ok(None)
        } else {
            from_js(value_js).map(Some)
        }
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<()> {
        setStorage(key, to_js(&value)?)
            .await
            .map_err(|e| GrouperError::Storage(format!("Failed to save storage: {:?}", e)))
    }
}

/// Wire tab events and runtime messages to the engine. The listeners live
/// for the whole lifetime of the service worker.
pub fn register_listeners(engine: &Rc<BackgroundEngine>) {
    let created_engine = Rc::clone(engine);
    let on_created = Closure::<dyn Fn(JsValue)>::new(move |tab_js: JsValue| {
        let engine = Rc::clone(&created_engine);
        spawn_local(async move {
            match from_js::<TabInfo>(tab_js) {
                Ok(tab) => {
                    engine.handle_tab_created(&tab).await;
                }
                Err(e) => warn!("Ignoring tabs.onCreated event: {}", e),
            }
        });
    });

    let updated_engine = Rc::clone(engine);
    let on_updated = Closure::<dyn Fn(JsValue, JsValue)>::new(
        move |change_js: JsValue, tab_js: JsValue| {
            let engine = Rc::clone(&updated_engine);
            spawn_local(async move {
                match (from_js::<TabChange>(change_js), from_js::<TabInfo>(tab_js)) {
                    (Ok(change), Ok(tab)) => {
                        engine.handle_tab_updated(&change, &tab).await;
                    }
                    (Err(e), _) | (_, Err(e)) => warn!("Ignoring tabs.onUpdated event: {}", e),
                }
            });
        },
    );

    let message_engine = Rc::clone(engine);
    let on_message = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |message_js: JsValue| {
        let response = from_js::<serde_json::Value>(message_js)
            .and_then(Request::decode)
            .map(|request| message_engine.handle_message(request))
            .and_then(|response| to_js(&response));

        response.unwrap_or_else(|e| {
            warn!("Not answering message: {}", e);
            JsValue::UNDEFINED
        })
    });

    onTabCreated(on_created.as_ref().unchecked_ref());
    onTabUpdated(on_updated.as_ref().unchecked_ref());
    onMessage(on_message.as_ref().unchecked_ref());

    on_created.forget();
    on_updated.forget();
    on_message.forget();
}
