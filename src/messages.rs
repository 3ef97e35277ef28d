/// Requests from the settings page and their responses
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::engine::GroupingEngine;
use crate::error::{GrouperError, Result};
use crate::host::{SettingsStore, TabService};
use crate::settings::{PartialSettings, Settings};

/// `chrome.runtime.sendMessage` payloads, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Request {
    GetSettings,
    UpdateSettings {
        #[serde(default)]
        settings: PartialSettings,
    },
    RegroupTabs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Response {
    Settings { settings: Settings },
    /// The request was accepted; background regrouping may still be running
    Ack { success: bool },
}

impl Request {
    pub fn decode(message: serde_json::Value) -> Result<Request> {
        serde_json::from_value(message).map_err(|e| GrouperError::Message(e.to_string()))
    }
}

impl<T, S> GroupingEngine<T, S>
where
    T: TabService + 'static,
    S: SettingsStore + 'static,
{
    /// Answer a request immediately. Updates and regroups only schedule their
    /// full pass, so an `Ack` means "accepted", not "done".
    pub fn handle_message(self: &Rc<Self>, request: Request) -> Response {
        match request {
            Request::GetSettings => Response::Settings {
                settings: self.settings(),
            },
            Request::UpdateSettings { settings } => {
                let merged = self.update_settings(settings);
                log::info!("Settings updated: {:?}", merged);
                Response::Ack { success: true }
            }
            Request::RegroupTabs => {
                log::info!("Regrouping all tabs");
                self.regroup();
                Response::Ack { success: true }
            }
        }
    }
}
