/// Domain key extraction and tab partitioning for Domain Tab Grouper
use std::collections::HashMap;

use url::Url;

use crate::tab_data::{TabId, TabInfo};

/// URL prefixes that are never grouped: browser internals and our own pages
const IGNORED_PREFIXES: [&str; 2] = ["chrome://", "chrome-extension://"];

/// Extract the domain key used to cluster a tab
///
/// Algorithm:
/// 1. Reject empty URLs and browser-internal / extension URLs
/// 2. Parse the URL and take its hostname (lowercased by the parser for web schemes)
/// 3. If `group_subdomains` is false → the full hostname
/// 4. Else if the hostname has more than two labels → the last two labels
/// 5. Else → the full hostname
///
/// The "last two labels" rule is not public-suffix aware:
/// `news.bbc.co.uk` collapses to `co.uk`.
///
/// Examples:
/// - https://a.b.example.com, true → example.com
/// - https://a.b.example.com, false → a.b.example.com
/// - chrome://extensions → None
pub fn extract_domain(url: &str, group_subdomains: bool) -> Option<String> {
    if url.is_empty() || IGNORED_PREFIXES.iter().any(|prefix| url.starts_with(prefix)) {
        return None;
    }

    let hostname = match Url::parse(url) {
        Ok(parsed) => parsed.host_str()?.to_string(),
        Err(e) => {
            log::debug!("Cannot extract domain from {:?}: {}", url, e);
            return None;
        }
    };

    // about:blank, file:///... and friends have no host to group by
    if hostname.is_empty() {
        return None;
    }

    if !group_subdomains {
        return Some(hostname);
    }

    let parts: Vec<&str> = hostname.split('.').collect();
    if parts.len() > 2 {
        Some(parts[parts.len() - 2..].join("."))
    } else {
        Some(hostname)
    }
}

/// Partition tab ids by domain key, keeping domains in first-seen order.
/// Tabs without a URL or without a domain key are dropped.
pub fn partition_by_domain(tabs: &[TabInfo], group_subdomains: bool) -> Vec<(String, Vec<TabId>)> {
    let mut positions: HashMap<String, usize> = HashMap::new();
    let mut batches: Vec<(String, Vec<TabId>)> = Vec::new();

    for tab in tabs {
        let Some(domain) = tab
            .url
            .as_deref()
            .and_then(|url| extract_domain(url, group_subdomains))
        else {
            continue;
        };

        match positions.get(&domain) {
            Some(&index) => batches[index].1.push(tab.id),
            None => {
                positions.insert(domain.clone(), batches.len());
                batches.push((domain, vec![tab.id]));
            }
        }
    }

    batches
}
