/// Domain key → tab group cache
use std::collections::HashMap;

use crate::tab_data::GroupId;

/// At most one live group id per domain key.
///
/// `clear` starts a new generation. Work that began under an older
/// generation must not write back into the cache.
#[derive(Debug, Default)]
pub struct DomainGroupCache {
    groups: HashMap<String, GroupId>,
    generation: u64,
}

impl DomainGroupCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, domain: &str) -> Option<GroupId> {
        self.groups.get(domain).copied()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Record `domain → group_id` if no clear happened since `generation`.
    /// Returns whether the mapping was stored.
    pub fn record(&mut self, generation: u64, domain: String, group_id: GroupId) -> bool {
        if generation != self.generation {
            return false;
        }
        if let Some(previous) = self.groups.insert(domain, group_id) {
            if previous != group_id {
                log::debug!("Replaced cached group {} with {}", previous, group_id);
            }
        }
        true
    }

    /// Drop `domain` if it still maps to `group_id` and no clear happened
    /// since `generation`. Returns whether an entry was removed.
    pub fn forget(&mut self, generation: u64, domain: &str, group_id: GroupId) -> bool {
        if generation != self.generation || self.get(domain) != Some(group_id) {
            return false;
        }
        self.groups.remove(domain).is_some()
    }

    pub fn clear(&mut self) {
        self.groups.clear();
        self.generation += 1;
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
