// Broadcast Dispatcher
//
// Routes inbound client frames to the three presence stores and fans the
// resulting state changes out through the `Broadcaster`. The dispatcher is
// the only owner of the stores; connection tasks never read or mutate them
// directly.
//
// The stores sit behind a single mutex. Handlers compute their broadcast
// payloads under the lock, release it, then fan out, so the lock is never
// held across transport I/O.

use crate::activity::{Activity, ActivityTable};
use crate::broadcast::Broadcaster;
use crate::presence::PresenceSet;
use crate::protocol::{ActivityPayload, ClientFrame, PeerRef, ServerFrame};
use crate::registry::ConnectionRegistry;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Stores {
    registry: ConnectionRegistry,
    presence: PresenceSet,
    activity: ActivityTable,
}

/// Event router over the connection registry, presence set and activity table
pub struct Dispatcher {
    stores: Mutex<Stores>,
    broadcaster: Arc<dyn Broadcaster>,
}

impl Dispatcher {
    pub fn new(broadcaster: Arc<dyn Broadcaster>) -> Self {
        Self {
            stores: Mutex::new(Stores::default()),
            broadcaster,
        }
    }

    /// Route one inbound frame from the connection identified by `socket_id`
    pub async fn handle_frame(&self, socket_id: &str, frame: ClientFrame) {
        match frame {
            ClientFrame::Announce(payload) => self.handle_announce(socket_id, &payload.user_id).await,
            ClientFrame::Activity(payload) => self.handle_activity(payload).await,
            ClientFrame::GetOnlineUsers => self.handle_presence_query(socket_id).await,
        }
    }

    /// A connection announced the user that owns it.
    ///
    /// Fans out the announcement, the refreshed presence snapshot, and the
    /// user's current activity. Re-broadcasting activity even when unchanged
    /// is intentional: it lets observers that connected earlier learn this
    /// user's state without a separate bulk query.
    pub async fn handle_announce(&self, socket_id: &str, user_id: &str) {
        let (snapshot, activity) = {
            let mut stores = self.stores.lock().await;
            stores.registry.register(socket_id, user_id);
            stores.presence.mark_online(user_id);
            // Seed the table with the existing record (idle when none), so a
            // later pull query carries an entry for every announced user
            let activity = stores.activity.get(user_id);
            stores.activity.set(user_id, activity.clone());
            (stores.presence.snapshot(), activity)
        };

        tracing::info!("user {} announced on connection {}", user_id, socket_id);

        self.broadcaster
            .send_to_all(ServerFrame::UserConnected(PeerRef::new(user_id, socket_id)));
        self.broadcaster
            .send_to_all(ServerFrame::OnlineUsers(snapshot));
        self.broadcaster
            .send_to_all(ServerFrame::ActivityUpdate(ActivityPayload::new(
                user_id,
                activity.song_title,
                activity.song_id,
            )));
    }

    /// A user reported playback. Dropped silently when the user id is
    /// missing or empty; otherwise broadcast unconditionally, with no
    /// de-duplication against the previous value.
    pub async fn handle_activity(&self, report: ActivityPayload) {
        if report.user_id.is_empty() {
            tracing::debug!("dropping activity report without user id");
            return;
        }

        {
            let mut stores = self.stores.lock().await;
            stores.activity.set(
                &report.user_id,
                Activity::new(report.song_title.clone(), report.song_id.clone()),
            );
        }

        self.broadcaster
            .send_to_all(ServerFrame::ActivityUpdate(report));
    }

    /// A transport link closed. If the connection had announced a user, take
    /// that user offline, drop their activity record, and fan out the
    /// departure; otherwise nothing is broadcast.
    pub async fn handle_disconnect(&self, socket_id: &str) {
        let departed = {
            let mut stores = self.stores.lock().await;
            match stores.registry.unregister(socket_id) {
                Some(conn) => {
                    stores.presence.mark_offline(&conn.user_id);
                    stores.activity.clear(&conn.user_id);
                    Some((conn, stores.presence.snapshot()))
                }
                None => None,
            }
        };

        let Some((conn, snapshot)) = departed else {
            tracing::debug!("connection {} closed before announcing", socket_id);
            return;
        };

        let session_secs = (chrono::Utc::now() - conn.announced_at).num_seconds();
        tracing::info!(
            "user {} went offline (connection {}, session {}s)",
            conn.user_id,
            socket_id,
            session_secs
        );

        self.broadcaster
            .send_to_all(ServerFrame::UserDisconnected(PeerRef::new(
                &conn.user_id,
                socket_id,
            )));
        self.broadcaster
            .send_to_all(ServerFrame::OnlineUsers(snapshot));
        self.broadcaster
            .send_to_all(ServerFrame::ActivityUpdate(ActivityPayload::idle(
                &conn.user_id,
            )));
    }

    /// Pull query: answer the requester only with the presence snapshot,
    /// then one activity update per stored record.
    pub async fn handle_presence_query(&self, socket_id: &str) {
        let (snapshot, entries) = {
            let stores = self.stores.lock().await;
            (stores.presence.snapshot(), stores.activity.entries())
        };

        self.broadcaster
            .send_to_one(socket_id, ServerFrame::OnlineUsers(snapshot));
        for (user_id, activity) in entries {
            self.broadcaster.send_to_one(
                socket_id,
                ServerFrame::ActivityUpdate(ActivityPayload::new(
                    user_id,
                    activity.song_title,
                    activity.song_id,
                )),
            );
        }
    }

    /// Current online users, for status reporting and tests
    pub async fn online_users(&self) -> Vec<String> {
        self.stores.lock().await.presence.snapshot()
    }

    /// Current activity for a user, defaulting to idle
    pub async fn activity_of(&self, user_id: &str) -> Activity {
        self.stores.lock().await.activity.get(user_id)
    }

    /// Number of announced connections
    pub async fn connection_count(&self) -> usize {
        self.stores.lock().await.registry.len()
    }
}
