//! An arena of audio packets with an explicit emission order.
//!
//! Packets are stored once and referenced by [`PacketId`]. The order in
//! which ids are emitted decides the packet order of the resulting file, so
//! a packet may be emitted more than once or left out entirely.

use bytes::Bytes;

use super::error::{Error, Result};
use super::file::OpusFile;
use super::head::{OpusHead, OpusTags};
use super::packet::{OpusPacket, valid_packet_duration};

/// Handle to a packet stored in a [`PacketPool`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PacketId(usize);

impl PacketId {
    /// Returns the arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Default, Clone)]
pub struct PacketPool {
    packets: Vec<OpusPacket>,
    order: Vec<PacketId>,
}

impl PacketPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a packet and returns its id. Packets whose duration is not one
    /// an encoder produces are rejected.
    pub fn add(&mut self, packet: OpusPacket) -> Result<PacketId> {
        let samples = packet.samples();
        if !valid_packet_duration(samples) {
            return Err(Error::InvalidDuration(samples));
        }
        let id = PacketId(self.packets.len());
        self.packets.push(packet);
        Ok(id)
    }

    /// Decodes and stores a raw packet.
    pub fn add_bytes(&mut self, data: impl Into<Bytes>) -> Result<PacketId> {
        self.add(OpusPacket::decode(data)?)
    }

    /// Appends `id` to the emission order.
    pub fn emit(&mut self, id: PacketId) -> Result<()> {
        if id.0 >= self.packets.len() {
            return Err(Error::UnknownPacket(id.0));
        }
        self.order.push(id);
        Ok(())
    }

    pub fn get(&self, id: PacketId) -> Option<&OpusPacket> {
        self.packets.get(id.0)
    }

    pub fn order(&self) -> &[PacketId] {
        &self.order
    }

    /// Number of stored packets.
    pub fn len(&self) -> usize {
        self.packets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packets.is_empty()
    }

    /// Iterates over the emitted packets in order.
    pub fn packets(&self) -> impl Iterator<Item = &OpusPacket> {
        self.order.iter().map(|id| &self.packets[id.0])
    }

    /// Total duration of the emitted packets in samples at 48 kHz.
    pub fn total_samples(&self) -> u64 {
        self.packets().map(|p| p.samples() as u64).sum()
    }

    /// Builds a file from the emitted packets.
    pub fn into_file(self, head: OpusHead, tags: OpusTags) -> OpusFile {
        let packets = self.packets().cloned().collect();
        OpusFile::new(head, tags, packets)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::opus::file::PagingPolicy;

    #[test]
    fn test_add_and_emit() {
        let mut pool = PacketPool::new();
        let a = pool.add_bytes(vec![0xf8, 1]).unwrap();
        let b = pool.add_bytes(vec![0xf8, 2]).unwrap();
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);

        pool.emit(b).unwrap();
        pool.emit(a).unwrap();
        pool.emit(b).unwrap();
        assert_eq!(pool.order(), &[b, a, b]);
        assert_eq!(pool.len(), 2);
        assert_eq!(pool.total_samples(), 3 * 960);

        let payloads: Vec<u8> = pool.packets().map(|p| p.frames()[0][0]).collect();
        assert_eq!(payloads, vec![2, 1, 2]);
    }

    #[test]
    fn test_emit_unknown_id() {
        let mut pool = PacketPool::new();
        assert!(matches!(pool.emit(PacketId(3)), Err(Error::UnknownPacket(3))));
        assert!(pool.order().is_empty());
    }

    #[test]
    fn test_add_rejects_invalid_duration() {
        let mut pool = PacketPool::new();
        // Two 60 ms SILK frames make 120 ms.
        assert!(matches!(
            pool.add_bytes(vec![0x19, 1, 2]),
            Err(Error::InvalidDuration(5760))
        ));
        assert!(pool.is_empty());
    }

    #[test]
    fn test_add_rejects_undecodable() {
        let mut pool = PacketPool::new();
        assert!(matches!(pool.add_bytes(Vec::new()), Err(Error::EmptyPacket)));
    }

    #[test]
    fn test_into_file() {
        let mut pool = PacketPool::new();
        let id = pool.add_bytes(vec![0xf8, 7]).unwrap();
        pool.emit(id).unwrap();
        pool.emit(id).unwrap();

        let file = pool.into_file(OpusHead::default(), OpusTags::default());
        assert_eq!(file.packets.len(), 2);
        let stream = file.to_stream(&PagingPolicy::default());
        assert_eq!(stream.pages.len(), 3);
        assert_eq!(stream.pages[2].granule_position, 1920);
    }
}
