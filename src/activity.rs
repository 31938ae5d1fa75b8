// Activity Table
//
// Maps a user to their last-announced listening activity. "Never announced"
// and "explicitly idle" are indistinguishable to readers: both come back as
// the default idle record. That default-on-missing behavior is load-bearing
// for the announce and disconnect fan-out paths.

use std::collections::HashMap;

/// What a user is currently playing. Both fields `None` means idle.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Activity {
    pub song_title: Option<String>,

    pub song_id: Option<String>,
}

impl Activity {
    pub fn new(song_title: Option<String>, song_id: Option<String>) -> Self {
        Self {
            song_title,
            song_id,
        }
    }

    pub fn idle() -> Self {
        Self::default()
    }

    pub fn is_idle(&self) -> bool {
        self.song_title.is_none() && self.song_id.is_none()
    }
}

/// Per-user activity records, keyed by user id
#[derive(Debug, Default)]
pub struct ActivityTable {
    records: HashMap<String, Activity>,
}

impl ActivityTable {
    pub fn new() -> Self {
        Self {
            records: HashMap::new(),
        }
    }

    /// Upsert the record. An explicit idle announcement stores `{None, None}`,
    /// which readers cannot tell apart from no record at all.
    pub fn set(&mut self, user_id: &str, activity: Activity) {
        self.records.insert(user_id.to_string(), activity);
    }

    /// Delete the record entirely (used on full disconnect)
    pub fn clear(&mut self, user_id: &str) {
        self.records.remove(user_id);
    }

    /// Stored record, or the default idle record if none exists
    pub fn get(&self, user_id: &str) -> Activity {
        self.records.get(user_id).cloned().unwrap_or_default()
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.records.contains_key(user_id)
    }

    /// All stored records, one entry per user that has announced or reported
    /// activity and not since disconnected
    pub fn entries(&self) -> Vec<(String, Activity)> {
        self.records
            .iter()
            .map(|(user_id, activity)| (user_id.clone(), activity.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
