//! Peer addressing and the gossiped peer list.

use std::fmt;
use std::net::Ipv4Addr;

use cn_seria::{seria_field, seria_vec, Seria, SeriaError, SeriaResult, Seriable};

/// Most peers a single message may carry. Decoded lists beyond this are
/// rejected even when the transport frame would allow them.
pub const MAX_PEERLIST_LEN: usize = 250;

/// An IPv4 endpoint as gossiped between nodes.
///
/// The address is a big-endian `u32`; the port travels widened to `u32`,
/// a dialect constant kept for wire compatibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NetworkAddress {
    pub ip: u32,
    pub port: u32,
}

impl NetworkAddress {
    #[inline]
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self {
            ip: u32::from(ip),
            port: u32::from(port),
        }
    }

    #[inline]
    pub fn ipv4(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.ip)
    }
}

impl fmt::Display for NetworkAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ipv4(), self.port)
    }
}

impl Seriable for NetworkAddress {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "ip", &mut self.ip)?;
        seria_field(seria, "port", &mut self.port)?;
        seria.end_object()
    }
}

/// One entry of the gossiped peer list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeerlistEntry {
    pub address: NetworkAddress,
    pub peer_id: u64,
    /// Unix timestamp of the last successful contact.
    pub last_seen: u64,
}

impl Seriable for PeerlistEntry {
    fn seria<S: Seria>(&mut self, seria: &mut S) -> SeriaResult<()> {
        seria.begin_object()?;
        seria_field(seria, "address", &mut self.address)?;
        seria_field(seria, "peer_id", &mut self.peer_id)?;
        seria_field(seria, "last_seen", &mut self.last_seen)?;
        seria.end_object()
    }
}

/// Sequence adapter for peer lists with the protocol-level length cap
/// applied on decode.
pub fn seria_peerlist<S: Seria>(
    seria: &mut S,
    peers: &mut Vec<PeerlistEntry>,
) -> SeriaResult<()> {
    seria_vec(seria, peers)?;
    if seria.is_input() && peers.len() > MAX_PEERLIST_LEN {
        return Err(SeriaError::CountOverLimit {
            count: peers.len() as u64,
            max: MAX_PEERLIST_LEN as u64,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cn_seria::{from_bytes, from_bytes_counted, to_bytes, DecodeLimits};

    #[test]
    fn entry_roundtrip() {
        let mut entry = PeerlistEntry {
            address: NetworkAddress::new(Ipv4Addr::new(10, 0, 0, 7), 8080),
            peer_id: 0x0123_4567_89ab_cdef,
            last_seen: 1_530_000_000,
        };
        let bytes = to_bytes(&mut entry).unwrap();
        let (decoded, consumed) =
            from_bytes_counted::<PeerlistEntry>(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, entry);
        assert_eq!(consumed, bytes.len());
    }

    #[test]
    fn address_displays_dotted_quad() {
        let address = NetworkAddress::new(Ipv4Addr::new(192, 168, 1, 44), 32347);
        assert_eq!(address.to_string(), "192.168.1.44:32347");
    }

    #[test]
    fn oversized_peerlist_rejected() {
        let mut peers = vec![PeerlistEntry::default(); MAX_PEERLIST_LEN + 1];
        let mut buf = Vec::new();
        let mut enc = cn_seria::BinaryEncoder::new(&mut buf);
        seria_peerlist(&mut enc, &mut peers).unwrap();

        let mut stream = cn_seria::SliceStream::new(&buf);
        let mut dec = cn_seria::BinaryDecoder::new(&mut stream, DecodeLimits::default());
        let mut decoded = Vec::new();
        let err = seria_peerlist(&mut dec, &mut decoded).unwrap_err();
        assert_eq!(
            err,
            SeriaError::CountOverLimit {
                count: 251,
                max: 250
            }
        );
    }

    #[test]
    fn peerlist_within_cap_accepted() {
        let mut peers = vec![PeerlistEntry::default(); 3];
        let mut buf = Vec::new();
        let mut enc = cn_seria::BinaryEncoder::new(&mut buf);
        seria_peerlist(&mut enc, &mut peers).unwrap();
        let mut stream = cn_seria::SliceStream::new(&buf);
        let mut dec = cn_seria::BinaryDecoder::new(&mut stream, DecodeLimits::default());
        let mut decoded = Vec::new();
        seria_peerlist(&mut dec, &mut decoded).unwrap();
        assert_eq!(decoded, peers);
    }

    #[test]
    fn unknown_bytes_after_entry_left_untouched() {
        let mut entry = PeerlistEntry::default();
        let mut bytes = to_bytes(&mut entry).unwrap();
        bytes.push(0x99);
        let decoded: PeerlistEntry = from_bytes(&bytes, &DecodeLimits::default()).unwrap();
        assert_eq!(decoded, entry);
    }
}
