// Connection Registry
//
// Maps transport-level socket ids to the logical user that announced on them.
// A socket id is freshly generated per accepted connection and never reused,
// so `register` overwriting an existing entry is not expected in practice.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// A connection that has announced its owning user
#[derive(Debug, Clone)]
pub struct RegisteredConnection {
    /// Logical user identifier, opaque to the gateway
    pub user_id: String,

    /// When the connection announced itself
    pub announced_at: DateTime<Utc>,
}

/// Registry of announced connections, keyed by socket id
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    connections: HashMap<String, RegisteredConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            connections: HashMap::new(),
        }
    }

    /// Associate a socket with a user. Overwrites any prior association for
    /// the same socket id.
    pub fn register(&mut self, socket_id: &str, user_id: &str) {
        self.connections.insert(
            socket_id.to_string(),
            RegisteredConnection {
                user_id: user_id.to_string(),
                announced_at: Utc::now(),
            },
        );
    }

    /// Remove and return the association, or `None` if the socket never
    /// announced a user.
    pub fn unregister(&mut self, socket_id: &str) -> Option<RegisteredConnection> {
        self.connections.remove(socket_id)
    }

    /// User that owns the socket, if it has announced
    pub fn owner_of(&self, socket_id: &str) -> Option<&str> {
        self.connections
            .get(socket_id)
            .map(|conn| conn.user_id.as_str())
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_unregister() {
        let mut registry = ConnectionRegistry::new();
        registry.register("sock-1", "u1");

        assert_eq!(registry.owner_of("sock-1"), Some("u1"));
        assert_eq!(registry.len(), 1);

        let removed = registry.unregister("sock-1").unwrap();
        assert_eq!(removed.user_id, "u1");
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_unknown_socket_returns_none() {
        let mut registry = ConnectionRegistry::new();
        assert!(registry.unregister("sock-1").is_none());
    }

    #[test]
    fn test_register_overwrites_prior_association() {
        let mut registry = ConnectionRegistry::new();
        registry.register("sock-1", "u1");
        registry.register("sock-1", "u2");

        assert_eq!(registry.owner_of("sock-1"), Some("u2"));
        assert_eq!(registry.len(), 1);
    }
}
