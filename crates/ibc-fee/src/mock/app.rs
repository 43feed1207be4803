//! An application module recording the callbacks it receives.

use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::channel::{Counterparty, Order};
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::Packet;
use crate::core::ics04_channel::Version;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::core::ics26_routing::context::{Module, OnRecvPacketAck};
use crate::handler::ModuleOutputBuilder;
use crate::prelude::*;
use crate::signer::Signer;

pub const MOCK_VERSION: &str = "mock-version";

pub const MOCK_SUCCESS_ACK: &[u8] = br#"{"result":"AQ=="}"#;
pub const MOCK_ERROR_ACK: &[u8] = br#"{"error":"mock application error"}"#;

/// What the mock application answers to a received packet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecvBehaviour {
    Succeed,
    Fail,
    Async,
}

#[derive(Clone, Debug)]
pub struct MockApp {
    pub recv_behaviour: RecvBehaviour,
    /// Makes the close callbacks fail.
    pub fail_close: bool,
    /// Versions handed to the handshake callbacks, in call order.
    pub versions: Vec<Version>,
    pub received: Vec<Packet>,
    pub acknowledged: Vec<(Packet, Acknowledgement)>,
    pub timed_out: Vec<Packet>,
    pub closed: Vec<(PortId, ChannelId)>,
}

impl Default for MockApp {
    fn default() -> Self {
        Self::new()
    }
}

impl MockApp {
    pub fn new() -> Self {
        Self {
            recv_behaviour: RecvBehaviour::Succeed,
            fail_close: false,
            versions: Vec::new(),
            received: Vec::new(),
            acknowledged: Vec::new(),
            timed_out: Vec::new(),
            closed: Vec::new(),
        }
    }

    pub fn with_recv_behaviour(mut self, recv_behaviour: RecvBehaviour) -> Self {
        self.recv_behaviour = recv_behaviour;
        self
    }

    pub fn failing_close(mut self) -> Self {
        self.fail_close = true;
        self
    }

    fn close(&mut self, port_id: &PortId, channel_id: &ChannelId) -> Result<(), Error> {
        if self.fail_close {
            return Err(Error::app_module("mock application refuses to close".to_string()));
        }
        self.closed.push((port_id.clone(), channel_id.clone()));
        Ok(())
    }
}

fn or_mock_version(version: &Version) -> Version {
    if version.is_empty() {
        Version::from(MOCK_VERSION)
    } else {
        version.clone()
    }
}

impl<Ctx> Module<Ctx> for MockApp {
    type Error = Error;

    fn on_chan_open_init(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        version: &Version,
    ) -> Result<Version, Error> {
        self.versions.push(version.clone());
        Ok(or_mock_version(version))
    }

    fn on_chan_open_try(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        _order: Order,
        _connection_hops: &[ConnectionId],
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty: &Counterparty,
        counterparty_version: &Version,
    ) -> Result<Version, Error> {
        self.versions.push(counterparty_version.clone());
        Ok(or_mock_version(counterparty_version))
    }

    fn on_chan_open_ack(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
        _counterparty_channel_id: &ChannelId,
        counterparty_version: &Version,
    ) -> Result<(), Error> {
        self.versions.push(counterparty_version.clone());
        Ok(())
    }

    fn on_chan_open_confirm(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        _port_id: &PortId,
        _channel_id: &ChannelId,
    ) -> Result<(), Error> {
        Ok(())
    }

    fn on_chan_close_init(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.close(port_id, channel_id)
    }

    fn on_chan_close_confirm(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.close(port_id, channel_id)
    }

    fn on_recv_packet(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        packet: &Packet,
        _relayer: &Signer,
    ) -> OnRecvPacketAck {
        self.received.push(packet.clone());
        match self.recv_behaviour {
            RecvBehaviour::Succeed => {
                OnRecvPacketAck::Successful(Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()))
            }
            RecvBehaviour::Fail => {
                OnRecvPacketAck::Failed(Acknowledgement::from(MOCK_ERROR_ACK.to_vec()))
            }
            RecvBehaviour::Async => OnRecvPacketAck::Async,
        }
    }

    fn on_acknowledgement_packet(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        _relayer: &Signer,
    ) -> Result<(), Error> {
        self.acknowledged
            .push((packet.clone(), acknowledgement.clone()));
        Ok(())
    }

    fn on_timeout_packet(
        &mut self,
        _ctx: &mut Ctx,
        _output: &mut ModuleOutputBuilder,
        packet: &Packet,
        _relayer: &Signer,
    ) -> Result<(), Error> {
        self.timed_out.push(packet.clone());
        Ok(())
    }

    fn negotiate_app_version(
        &self,
        _ctx: &Ctx,
        _order: Order,
        _connection_id: &ConnectionId,
        _port_id: &PortId,
        _counterparty: &Counterparty,
        proposed_version: &Version,
    ) -> Result<Version, Error> {
        Ok(or_mock_version(proposed_version))
    }
}
