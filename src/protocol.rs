// Tunewire Realtime Protocol
//
// This module defines the wire contract for the presence/activity socket layer.
//
// Protocol flow:
// 1. Client connects over WebSocket (no payload, no store action)
// 2. Client sends "user-connected" to announce its identity
// 3. Client pushes "user-activity" whenever playback changes
// 4. Server fans out presence and activity changes to every connection
// 5. "get-online-users" pulls a snapshot, answered to the requester only

use serde::{Deserialize, Serialize};

/// Inbound frame from a client connection.
///
/// One JSON text message per frame, shaped `{"event": ..., "payload": ...}`.
/// Anything that fails to deserialize is dropped by the transport layer,
/// never answered with a protocol error.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ClientFrame {
    /// Announce the logical user that owns this connection
    #[serde(rename = "user-connected")]
    Announce(AnnouncePayload),

    /// Report what this user is currently playing (or explicit idle)
    #[serde(rename = "user-activity")]
    Activity(ActivityPayload),

    /// Pull request for the current presence/activity snapshot
    #[serde(rename = "get-online-users")]
    GetOnlineUsers,
}

/// Outbound frame from the gateway to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "payload")]
pub enum ServerFrame {
    /// A connection announced its identity
    #[serde(rename = "user-connected")]
    UserConnected(PeerRef),

    /// Presence snapshot (broadcast, or unicast in response to a pull)
    #[serde(rename = "online-users")]
    OnlineUsers(Vec<String>),

    /// A user's activity changed, or was reset to idle on disconnect
    #[serde(rename = "user-activity-update")]
    ActivityUpdate(ActivityPayload),

    /// A user went offline
    #[serde(rename = "user-disconnected")]
    UserDisconnected(PeerRef),
}

/// Identity announcement payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnouncePayload {
    /// Logical user identifier, opaque to the gateway
    pub user_id: String,
}

/// Activity payload, shared by the inbound report and the outbound update.
///
/// Both song fields `null` means idle. A missing `userId` deserializes to the
/// empty string so the dispatcher can apply its drop guard instead of the
/// whole frame failing to parse.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityPayload {
    #[serde(default)]
    pub user_id: String,

    pub song_title: Option<String>,

    pub song_id: Option<String>,
}

impl ActivityPayload {
    pub fn new(
        user_id: impl Into<String>,
        song_title: Option<String>,
        song_id: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            song_title,
            song_id,
        }
    }

    /// Idle update for a user, sent on disconnect and on announce when the
    /// user has never reported activity
    pub fn idle(user_id: impl Into<String>) -> Self {
        Self::new(user_id, None, None)
    }
}

/// `{userId, socketId}` pair carried by connect/disconnect fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeerRef {
    pub user_id: String,

    pub socket_id: String,
}

impl PeerRef {
    pub fn new(user_id: impl Into<String>, socket_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            socket_id: socket_id.into(),
        }
    }
}
