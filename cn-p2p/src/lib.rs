//! Gossip overlay payloads and framing.
//!
//! Transport, connection management and dispatch live with the node's event
//! loop; this crate defines what transits the wire — peer lists, handshake
//! and sync payloads, the top-level command-tagged message — and the framing
//! codec that turns buffered socket bytes into decoded messages.

pub mod codec;
pub mod message;
pub mod peer;

pub use codec::{MessageCodec, MAX_FRAME_SIZE};
pub use message::{
    BasicNodeData, CoreSyncData, HandshakeRequest, HandshakeResponse, Message, TimedSyncRequest,
    TimedSyncResponse, COMMAND_HANDSHAKE, COMMAND_HANDSHAKE_RESPONSE, COMMAND_TIMED_SYNC,
    COMMAND_TIMED_SYNC_RESPONSE,
};
pub use peer::{seria_peerlist, NetworkAddress, PeerlistEntry, MAX_PEERLIST_LEN};
