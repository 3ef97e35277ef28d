/// User settings and their storage representation
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Storage key holding the whole `Settings` record
pub const SETTINGS_KEY: &str = "settings";

/// The grouper's configuration record, stored and replaced as a whole
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Collapse `a.b.example.com` into `example.com`
    pub group_subdomains: bool,
    /// Group tabs as they are created or navigated
    pub auto_group_new_tabs: bool,
    /// Domain key → color name overrides
    pub domain_colors: HashMap<String, String>,
    /// Domain key → group title overrides
    pub custom_domain_names: HashMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            group_subdomains: true,
            auto_group_new_tabs: true,
            domain_colors: HashMap::new(),
            custom_domain_names: HashMap::new(),
        }
    }
}

/// A settings update; fields left out keep their current value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_subdomains: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auto_group_new_tabs: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_colors: Option<HashMap<String, String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_domain_names: Option<HashMap<String, String>>,
}

impl Settings {
    /// Shallow merge: each field present in `update` replaces ours wholesale.
    /// Override maps are replaced, not merged key by key.
    pub fn merge(&mut self, update: PartialSettings) {
        if let Some(group_subdomains) = update.group_subdomains {
            self.group_subdomains = group_subdomains;
        }
        if let Some(auto_group_new_tabs) = update.auto_group_new_tabs {
            self.auto_group_new_tabs = auto_group_new_tabs;
        }
        if let Some(domain_colors) = update.domain_colors {
            self.domain_colors = domain_colors;
        }
        if let Some(custom_domain_names) = update.custom_domain_names {
            self.custom_domain_names = custom_domain_names;
        }
    }

    /// Decode a stored record. Anything missing or malformed falls back to
    /// the defaults as a whole; fields are never filled in piecemeal.
    pub fn from_stored(stored: Option<serde_json::Value>) -> Settings {
        match stored {
            None | Some(serde_json::Value::Null) => {
                log::info!("No stored settings, using defaults");
                Settings::default()
            }
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                log::warn!("Stored settings are malformed ({}), using defaults", e);
                Settings::default()
            }),
        }
    }
}
