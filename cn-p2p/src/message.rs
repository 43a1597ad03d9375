//! Overlay messages.
//!
//! Command ids and field orders are wire constants. A message is a tagged
//! variant: varint command id, then the payload traversal for that command.

use cn_seria::{seria_field, Seria, SeriaError, SeriaResult, Seriable};

use cn_core::Hash;

use crate::peer::{seria_peerlist, PeerlistEntry};

pub const COMMAND_HANDSHAKE: u64 = 1001;
pub const COMMAND_HANDSHAKE_RESPONSE: u64 = 1002;
pub const COMMAND_TIMED_SYNC: u64 = 1003;
pub const COMMAND_TIMED_SYNC_RESPONSE: u64 = 1004;

/// Static identity a node presents when connecting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BasicNodeData {
    /// Distinguishes the network (mainnet, testnet, stagenet); connections
    /// across networks are dropped at handshake.
    pub network_id: [u8; 16],
    pub version: u8,
    pub local_time: u64,
    pub my_port: u32,
    pub peer_id: u64,
}

impl Default for BasicNodeData {
    fn default() -> Self {
        Self {
            network_id: [0u8; 16],
            version: 1,
            local_time: 0,
            my_port: 0,
            peer_id: 0,
        }
    }
}

impl Seriable for BasicNodeData {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "network_id", &mut self.network_id)?;
        seria_field(seria, "version", &mut self.version)?;
        seria_field(seria, "local_time", &mut self.local_time)?;
        seria_field(seria, "my_port", &mut self.my_port)?;
        seria_field(seria, "peer_id", &mut self.peer_id)?;
        seria.end_object()
    }
}

/// Where a peer's chain currently stands; exchanged on every handshake and
/// timed sync so both sides can decide who pulls blocks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoreSyncData {
    pub current_height: u32,
    pub top_block_hash: Hash,
}

impl Seriable for CoreSyncData {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "current_height", &mut self.current_height)?;
        seria_field(seria, "top_block_hash", &mut self.top_block_hash)?;
        seria.end_object()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HandshakeRequest {
    pub node_data: BasicNodeData,
    pub payload_data: CoreSyncData,
}

impl Seriable for HandshakeRequest {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "node_data", &mut self.node_data)?;
        seria_field(seria, "payload_data", &mut self.payload_data)?;
        seria.end_object()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HandshakeResponse {
    pub node_data: BasicNodeData,
    pub payload_data: CoreSyncData,
    pub local_peerlist: Vec<PeerlistEntry>,
}

impl Seriable for HandshakeResponse {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "node_data", &mut self.node_data)?;
        seria_field(seria, "payload_data", &mut self.payload_data)?;
        seria.object_key("local_peerlist")?;
        seria_peerlist(seria, &mut self.local_peerlist)?;
        seria.end_object()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimedSyncRequest {
    pub payload_data: CoreSyncData,
}

impl Seriable for TimedSyncRequest {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "payload_data", &mut self.payload_data)?;
        seria.end_object()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TimedSyncResponse {
    pub local_time: u64,
    pub payload_data: CoreSyncData,
    pub local_peerlist: Vec<PeerlistEntry>,
}

impl Seriable for TimedSyncResponse {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "local_time", &mut self.local_time)?;
        seria_field(seria, "payload_data", &mut self.payload_data)?;
        seria.object_key("local_peerlist")?;
        seria_peerlist(seria, &mut self.local_peerlist)?;
        seria.end_object()
    }
}

/// Top-level overlay message: varint command id, then the payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    Handshake(HandshakeRequest),
    HandshakeResponse(HandshakeResponse),
    TimedSync(TimedSyncRequest),
    TimedSyncResponse(TimedSyncResponse),
}

impl Default for Message {
    fn default() -> Self {
        Self::TimedSync(TimedSyncRequest::default())
    }
}

impl Message {
    /// The wire command id of this message.
    pub fn command(&self) -> u64 {
        match self {
            Self::Handshake(_) => COMMAND_HANDSHAKE,
            Self::HandshakeResponse(_) => COMMAND_HANDSHAKE_RESPONSE,
            Self::TimedSync(_) => COMMAND_TIMED_SYNC,
            Self::TimedSyncResponse(_) => COMMAND_TIMED_SYNC_RESPONSE,
        }
    }
}

impl Seriable for Message {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        if seria.is_input() {
            let mut command = 0u64;
            seria.seria_varint(&mut command)?;
            *self = match command {
                COMMAND_HANDSHAKE => Self::Handshake(HandshakeRequest::default()),
                COMMAND_HANDSHAKE_RESPONSE => {
                    Self::HandshakeResponse(HandshakeResponse::default())
                }
                COMMAND_TIMED_SYNC => Self::TimedSync(TimedSyncRequest::default()),
                COMMAND_TIMED_SYNC_RESPONSE => {
                    Self::TimedSyncResponse(TimedSyncResponse::default())
                }
                tag => return Err(SeriaError::UnknownTag { tag, name: "Message" }),
            };
        } else {
            let mut command = self.command();
            seria.seria_varint(&mut command)?;
        }
        match self {
            Self::Handshake(payload) => payload.seria(seria),
            Self::HandshakeResponse(payload) => payload.seria(seria),
            Self::TimedSync(payload) => payload.seria(seria),
            Self::TimedSyncResponse(payload) => payload.seria(seria),
        }
    }
}
