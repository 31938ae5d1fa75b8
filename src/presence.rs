// Presence Set
//
// The set of users currently considered online. Set semantics only: no
// per-user connection counting, so a user with two live connections goes
// fully offline when either one drops (see dispatcher tests).

use std::collections::HashSet;

/// Online-user set
#[derive(Debug, Default)]
pub struct PresenceSet {
    online: HashSet<String>,
}

impl PresenceSet {
    pub fn new() -> Self {
        Self {
            online: HashSet::new(),
        }
    }

    /// Add a user. No-op if already online.
    pub fn mark_online(&mut self, user_id: &str) {
        self.online.insert(user_id.to_string());
    }

    /// Remove a user. No-op if absent.
    pub fn mark_offline(&mut self, user_id: &str) {
        self.online.remove(user_id);
    }

    pub fn contains(&self, user_id: &str) -> bool {
        self.online.contains(user_id)
    }

    /// Current online users. Iteration order is not meaningful; consumers
    /// must treat the snapshot as an unordered set.
    pub fn snapshot(&self) -> Vec<String> {
        self.online.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.online.len()
    }

    pub fn is_empty(&self) -> bool {
        self.online.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_online_and_offline() {
        let mut presence = PresenceSet::new();
        presence.mark_online("u1");

        assert!(presence.contains("u1"));
        assert_eq!(presence.snapshot(), vec!["u1".to_string()]);

        presence.mark_offline("u1");
        assert!(presence.is_empty());
    }

    #[test]
    fn test_mark_online_is_idempotent() {
        let mut presence = PresenceSet::new();
        presence.mark_online("u1");
        presence.mark_online("u1");

        assert_eq!(presence.len(), 1);
    }

    #[test]
    fn test_mark_offline_absent_user_is_noop() {
        let mut presence = PresenceSet::new();
        presence.mark_offline("u1");

        assert!(presence.is_empty());
    }

    #[test]
    fn test_snapshot_holds_all_online_users() {
        let mut presence = PresenceSet::new();
        presence.mark_online("u1");
        presence.mark_online("u2");

        let mut snapshot = presence.snapshot();
        snapshot.sort();
        assert_eq!(snapshot, vec!["u1".to_string(), "u2".to_string()]);
    }
}
