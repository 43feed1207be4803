use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::channel::{Counterparty, Order};
use crate::core::ics04_channel::packet::Packet;
use crate::core::ics04_channel::Version;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::handler::ModuleOutputBuilder;
use crate::signer::Signer;

/// The outcome of an application's `on_recv_packet` callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OnRecvPacketAck {
    Successful(Acknowledgement),
    Failed(Acknowledgement),
    /// The application will write the acknowledgement later on, outside of the callback.
    Async,
}

impl OnRecvPacketAck {
    pub fn is_successful(&self) -> bool {
        matches!(self, OnRecvPacketAck::Successful(_))
    }

    pub fn acknowledgement(&self) -> Option<&Acknowledgement> {
        match self {
            OnRecvPacketAck::Successful(ack) | OnRecvPacketAck::Failed(ack) => Some(ack),
            OnRecvPacketAck::Async => None,
        }
    }
}

/// The uniform callback interface implemented by applications and by the middlewares
/// wrapping them.
///
/// A middleware is a `Module` holding its inner `Module`; stacking is resolved at compile
/// time, and each layer calls the next one in a fixed outer-to-inner order. `Ctx` is the host
/// context the callbacks read and write through.
pub trait Module<Ctx> {
    type Error;

    #[allow(clippy::too_many_arguments)]
    fn on_chan_open_init(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, Self::Error>;

    #[allow(clippy::too_many_arguments)]
    fn on_chan_open_try(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        order: Order,
        connection_hops: &[ConnectionId],
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, Self::Error>;

    fn on_chan_open_ack(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty_channel_id: &ChannelId,
        counterparty_version: &Version,
    ) -> Result<(), Self::Error>;

    fn on_chan_open_confirm(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Self::Error>;

    fn on_chan_close_init(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Self::Error>;

    fn on_chan_close_confirm(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Self::Error>;

    fn on_recv_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        relayer: &Signer,
    ) -> OnRecvPacketAck;

    fn on_acknowledgement_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        relayer: &Signer,
    ) -> Result<(), Self::Error>;

    fn on_timeout_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<(), Self::Error>;

    /// Proposes the version to use for a new channel, given the version proposed by the
    /// counterparty (or an empty one).
    fn negotiate_app_version(
        &self,
        ctx: &Ctx,
        order: Order,
        connection_id: &ConnectionId,
        port_id: &PortId,
        counterparty: &Counterparty,
        proposed_version: &Version,
    ) -> Result<Version, Self::Error>;
}
