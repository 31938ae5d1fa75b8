// Tunewire Presence Gateway
//
// Real-time presence and listening-activity layer for the Tunewire music
// service: tracks which users are online and what each one is playing, and
// fans state changes out to every connected WebSocket client. User and song
// identifiers are opaque strings owned by external services.

pub mod activity;
pub mod broadcast;
pub mod dispatcher;
pub mod presence;
pub mod protocol;
pub mod registry;
pub mod server;

pub use activity::{Activity, ActivityTable};
pub use broadcast::{Broadcaster, ChannelBroadcaster, Delivery, Target};
pub use dispatcher::Dispatcher;
pub use presence::PresenceSet;
pub use protocol::{ActivityPayload, AnnouncePayload, ClientFrame, PeerRef, ServerFrame};
pub use registry::ConnectionRegistry;
pub use server::{Gateway, GatewayConfig};
