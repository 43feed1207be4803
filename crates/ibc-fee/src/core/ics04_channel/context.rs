//! The channel/packet transport as seen by an application or middleware.

use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::{Packet, PacketId, Sequence};
use crate::core::ics04_channel::Version;
use crate::core::ics24_host::identifier::{ChannelId, PortId};

/// Read access to channel state owned by the IBC core handlers.
pub trait ChannelReader {
    /// Returns the version negotiated for the channel, or `None` if the channel does not
    /// exist.
    fn channel_version(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Version>;

    fn get_next_sequence_send(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Sequence>;

    /// True if a commitment for the packet is stored, i.e. the packet was sent and has been
    /// neither acknowledged nor timed out.
    fn has_packet_commitment(&self, packet_id: &PacketId) -> bool;
}

/// The packet-writing half of the transport, wrapped by middlewares on the way down to
/// IBC core.
pub trait Ics4Wrapper {
    fn send_packet(&mut self, packet: Packet) -> Result<Sequence, Error>;

    fn write_acknowledgement(
        &mut self,
        packet: &Packet,
        acknowledgement: Acknowledgement,
    ) -> Result<(), Error>;
}
