//! Live connection registry
//!
//! Maps connection ids to sessions. The relay actor is the only writer, so
//! no lock guards the map; everything here is plain synchronous state.
//! Every id registered here has exactly one running connection behind it,
//! and removal from the map is what tears that connection down: dropping
//! the session closes its outbound channel, which ends the write pump and
//! closes the socket.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::session::Session;
use crate::types::ConnId;

/// Registry of live sessions keyed by connection id
#[derive(Debug, Default)]
pub struct Registry {
    sessions: HashMap<ConnId, Session>,
}

impl Registry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Insert a freshly accepted session
    pub fn insert(&mut self, session: Session) {
        self.sessions.insert(session.id, session);
    }

    /// Remove a session, returning it so the caller can announce the departure
    pub fn remove(&mut self, id: ConnId) -> Option<Session> {
        self.sessions.remove(&id)
    }

    /// Look up a session by id
    pub fn get(&self, id: ConnId) -> Option<&Session> {
        self.sessions.get(&id)
    }

    /// Look up a session by id for mutation
    pub fn get_mut(&mut self, id: ConnId) -> Option<&mut Session> {
        self.sessions.get_mut(&id)
    }

    /// Refresh a session's activity timestamp
    pub fn touch(&mut self, id: ConnId) {
        if let Some(session) = self.sessions.get_mut(&id) {
            session.touch();
        }
    }

    /// Exact-string lookup of a peer address for directed delivery
    ///
    /// Returns None for a departed or mistyped address.
    pub fn resolve(&self, addr: &str) -> Option<ConnId> {
        self.sessions
            .values()
            .find(|session| session.addr == addr)
            .map(|session| session.id)
    }

    /// Every live address, sorted so roster notices are deterministic
    pub fn roster(&self) -> Vec<String> {
        let mut addrs: Vec<String> = self
            .sessions
            .values()
            .map(|session| session.addr.clone())
            .collect();
        addrs.sort();
        addrs
    }

    /// Sessions whose inbound silence exceeds `threshold` as of `now`
    pub fn idle(&self, now: Instant, threshold: Duration) -> Vec<ConnId> {
        self.sessions
            .values()
            .filter(|session| session.idle_for(now) > threshold)
            .map(|session| session.id)
            .collect()
    }

    /// Deliverable sessions: everyone not already mid-eviction
    pub fn live(&self) -> impl Iterator<Item = &Session> {
        self.sessions
            .values()
            .filter(|session| !session.eviction_pending)
    }

    /// Number of registered sessions
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the registry is empty
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    fn session(addr: &str) -> Session {
        let (tx, _rx) = mpsc::channel(32);
        Session::new(ConnId::new(), addr.to_string(), tx)
    }

    #[test]
    fn test_insert_and_remove() {
        let mut registry = Registry::new();
        assert!(registry.is_empty());

        let s = session("10.0.0.1:5000");
        let id = s.id;
        registry.insert(s);
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(id).unwrap().addr, "10.0.0.1:5000");

        let removed = registry.remove(id).unwrap();
        assert_eq!(removed.addr, "10.0.0.1:5000");
        assert!(registry.is_empty());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn test_register_all_then_unregister_all_leaves_empty() {
        let mut registry = Registry::new();
        let ids: Vec<ConnId> = (0..5)
            .map(|i| {
                let s = session(&format!("10.0.0.{i}:5000"));
                let id = s.id;
                registry.insert(s);
                id
            })
            .collect();
        assert_eq!(registry.len(), 5);

        for id in ids {
            assert!(registry.remove(id).is_some());
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_exact_match_only() {
        let mut registry = Registry::new();
        let s = session("10.0.0.1:5000");
        let id = s.id;
        registry.insert(s);

        assert_eq!(registry.resolve("10.0.0.1:5000"), Some(id));
        assert!(registry.resolve("10.0.0.1:500").is_none());
        assert!(registry.resolve("10.0.0.1:50000").is_none());
        assert!(registry.resolve("").is_none());
    }

    #[test]
    fn test_roster_sorted() {
        let mut registry = Registry::new();
        registry.insert(session("10.0.0.9:9000"));
        registry.insert(session("10.0.0.1:5000"));
        registry.insert(session("10.0.0.5:7000"));

        assert_eq!(
            registry.roster(),
            vec!["10.0.0.1:5000", "10.0.0.5:7000", "10.0.0.9:9000"]
        );
    }

    #[test]
    fn test_idle_scan() {
        let mut registry = Registry::new();
        let stale = session("10.0.0.1:5000");
        let stale_id = stale.id;
        registry.insert(stale);
        registry.insert(session("10.0.0.2:6000"));

        let now = Instant::now();
        registry.get_mut(stale_id).unwrap().last_activity = now - Duration::from_secs(120);

        let idle = registry.idle(now, Duration::from_secs(60));
        assert_eq!(idle, vec![stale_id]);
    }

    #[test]
    fn test_touch_clears_idleness() {
        let mut registry = Registry::new();
        let s = session("10.0.0.1:5000");
        let id = s.id;
        registry.insert(s);

        registry.get_mut(id).unwrap().last_activity = Instant::now() - Duration::from_secs(120);
        registry.touch(id);

        assert!(registry.idle(Instant::now(), Duration::from_secs(60)).is_empty());
    }

    #[test]
    fn test_live_skips_eviction_pending() {
        let mut registry = Registry::new();
        let doomed = session("10.0.0.1:5000");
        let doomed_id = doomed.id;
        registry.insert(doomed);
        registry.insert(session("10.0.0.2:6000"));

        registry.get_mut(doomed_id).unwrap().eviction_pending = true;

        let live: Vec<&str> = registry.live().map(|s| s.addr.as_str()).collect();
        assert_eq!(live, vec!["10.0.0.2:6000"]);
    }
}
