//! The fee middleware wrapping an application module.

use tracing::{debug, error};

use super::acknowledgement::IncentivizedAcknowledgement;
use super::context::FeeContext;
use super::error::Error;
use super::keeper::{
    distribute_packet_fees_on_acknowledgement, distribute_packet_fees_on_timeout,
    refund_fees_on_channel_closure, EscrowStore, FeeEnabledStore, LockController,
    PayeeRegistry,
};
use super::metadata::Metadata;
use super::VERSION;
use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::channel::{Counterparty, Order};
use crate::core::ics04_channel::error::Error as ChannelError;
use crate::core::ics04_channel::packet::{Packet, Sequence};
use crate::core::ics04_channel::Version;
use crate::core::ics24_host::identifier::{ChannelId, ConnectionId, PortId};
use crate::core::ics26_routing::context::{Module, OnRecvPacketAck};
use crate::handler::ModuleOutputBuilder;
use crate::prelude::*;
use crate::signer::Signer;

/// Wraps an application module with fee escrow and distribution.
///
/// Channels opened with a fee version are marked fee-enabled; on those, the middleware pays
/// relayers out of escrow when packets are acknowledged or time out, and refunds all fees
/// when the channel closes. On every other channel, and while the fee module is locked, calls
/// go straight through to the application.
#[derive(Clone, Debug, Default)]
pub struct FeeMiddleware<App> {
    app: App,
}

impl<App> FeeMiddleware<App> {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn app(&self) -> &App {
        &self.app
    }

    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }

    pub fn into_inner(self) -> App {
        self.app
    }

    /// Writes an acknowledgement the application produced asynchronously. On fee-enabled
    /// channels the acknowledgement is wrapped with the forward relayer recorded when the
    /// packet was received.
    pub fn write_acknowledgement<Ctx>(
        &self,
        ctx: &mut Ctx,
        packet: &Packet,
        acknowledgement: Acknowledgement,
        success: bool,
    ) -> Result<(), Error>
    where
        Ctx: FeeContext,
    {
        if !ctx.is_fee_enabled(&packet.destination_port, &packet.destination_channel) {
            return Ok(ctx.write_acknowledgement(packet, acknowledgement)?);
        }

        let packet_id = packet.destination_id();
        let forward_relayer = match ctx.get_relayer_address_for_async_ack(&packet_id)? {
            Some(address) => {
                ctx.delete_forward_relayer_address(&packet_id);
                address
            }
            // Packets received while locked were not recorded and are acknowledged unwrapped
            None if ctx.is_locked() => {
                return Ok(ctx.write_acknowledgement(packet, acknowledgement)?);
            }
            None => return Err(Error::relayer_not_found_for_async_ack(packet_id)),
        };

        let ack = IncentivizedAcknowledgement::new(acknowledgement, forward_relayer, success);
        Ok(ctx.write_acknowledgement(packet, ack.into())?)
    }

    pub fn send_packet<Ctx>(&self, ctx: &mut Ctx, packet: Packet) -> Result<Sequence, Error>
    where
        Ctx: FeeContext,
    {
        Ok(ctx.send_packet(packet)?)
    }

    /// The version of the wrapped application on a channel.
    pub fn get_app_version<Ctx>(
        &self,
        ctx: &Ctx,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Version, Error>
    where
        Ctx: FeeContext,
    {
        let version = ctx
            .channel_version(port_id, channel_id)
            .ok_or_else(|| ChannelError::channel_not_found(port_id.clone(), channel_id.clone()))?;

        if !ctx.is_fee_enabled(port_id, channel_id) {
            return Ok(version);
        }

        Metadata::from_version(&version)
            .map(|metadata| metadata.app_version())
            .ok_or_else(|| Error::invalid_version_metadata(version.to_string()))
    }
}

fn check_fee_version(metadata: &Metadata) -> Result<(), Error> {
    if !metadata.has_fee_version() {
        return Err(Error::invalid_version(
            VERSION.to_string(),
            metadata.fee_version.clone(),
        ));
    }
    Ok(())
}

impl<Ctx, App> Module<Ctx> for FeeMiddleware<App>
where
    Ctx: FeeContext,
    App: Module<Ctx>,
    Error: From<App::Error>,
{
    type Error = Error;

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
    ) -> Result<Version, Error> {
        let metadata = if version.is_empty() {
            Metadata::default()
        } else {
            match Metadata::from_version(version) {
                Some(metadata) => metadata,
                None => {
                    debug!(%port_id, %channel_id, %version, "opening channel without fees");
                    return Ok(self.app.on_chan_open_init(
                        ctx,
                        output,
                        order,
                        connection_hops,
                        port_id,
                        channel_id,
                        counterparty,
                        version,
                    )?);
                }
            }
        };

        check_fee_version(&metadata)?;

        let app_version = self.app.on_chan_open_init(
            ctx,
            output,
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            &metadata.app_version(),
        )?;

        ctx.set_fee_enabled(port_id, channel_id);

        Ok(Metadata::new(app_version.as_str()).to_version())
    }

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
    ) -> Result<Version, Error> {
        let metadata = match Metadata::from_version(counterparty_version) {
            Some(metadata) => metadata,
            None => {
                debug!(%port_id, %channel_id, %counterparty_version, "opening channel without fees");
                return Ok(self.app.on_chan_open_try(
                    ctx,
                    output,
                    order,
                    connection_hops,
                    port_id,
                    channel_id,
                    counterparty,
                    counterparty_version,
                )?);
            }
        };

        check_fee_version(&metadata)?;

        let app_version = self.app.on_chan_open_try(
            ctx,
            output,
            order,
            connection_hops,
            port_id,
            channel_id,
            counterparty,
            &metadata.app_version(),
        )?;

        ctx.set_fee_enabled(port_id, channel_id);

        Ok(Metadata::new(app_version.as_str()).to_version())
    }

    fn on_chan_open_ack(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
        counterparty_channel_id: &ChannelId,
        counterparty_version: &Version,
    ) -> Result<(), Error> {
        // Only channels that proposed the fee version on init check the counterparty's answer
        if !ctx.is_fee_enabled(port_id, channel_id) {
            return Ok(self.app.on_chan_open_ack(
                ctx,
                output,
                port_id,
                channel_id,
                counterparty_channel_id,
                counterparty_version,
            )?);
        }

        let metadata = Metadata::from_version(counterparty_version)
            .ok_or_else(|| Error::invalid_version_metadata(counterparty_version.to_string()))?;
        check_fee_version(&metadata)?;

        Ok(self.app.on_chan_open_ack(
            ctx,
            output,
            port_id,
            channel_id,
            counterparty_channel_id,
            &metadata.app_version(),
        )?)
    }

    fn on_chan_open_confirm(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        Ok(self
            .app
            .on_chan_open_confirm(ctx, output, port_id, channel_id)?)
    }

    fn on_chan_close_init(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.app
            .on_chan_close_init(ctx, output, port_id, channel_id)?;
        refund_on_close(ctx, port_id, channel_id)
    }

    fn on_chan_close_confirm(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<(), Error> {
        self.app
            .on_chan_close_confirm(ctx, output, port_id, channel_id)?;
        refund_on_close(ctx, port_id, channel_id)
    }

    fn on_recv_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        relayer: &Signer,
    ) -> OnRecvPacketAck {
        // A locked module answers unwrapped even on a fee channel. An unlocked sender
        // rejects that acknowledgement as malformed.
        if !ctx.is_fee_enabled(&packet.destination_port, &packet.destination_channel)
            || ctx.is_locked()
        {
            return self.app.on_recv_packet(ctx, output, packet, relayer);
        }

        let ack = self.app.on_recv_packet(ctx, output, packet, relayer);

        let forward_relayer = ctx
            .get_counterparty_payee_address(relayer.as_str(), &packet.destination_channel)
            .unwrap_or_else(|e| {
                error!(relayer = %relayer, error = %e, "failed to read counterparty payee");
                None
            })
            .unwrap_or_default();

        match ack {
            OnRecvPacketAck::Successful(ack) => OnRecvPacketAck::Successful(
                IncentivizedAcknowledgement::new(ack, forward_relayer, true).into(),
            ),
            OnRecvPacketAck::Failed(ack) => OnRecvPacketAck::Failed(
                IncentivizedAcknowledgement::new(ack, forward_relayer, false).into(),
            ),
            OnRecvPacketAck::Async => {
                let packet_id = packet.destination_id();
                if let Err(e) = ctx.set_relayer_address_for_async_ack(&packet_id, &forward_relayer)
                {
                    error!(packet_id = %packet_id, error = %e, "failed to record forward relayer");
                }
                OnRecvPacketAck::Async
            }
        }
    }

    fn on_acknowledgement_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        acknowledgement: &Acknowledgement,
        relayer: &Signer,
    ) -> Result<(), Error> {
        if !ctx.is_fee_enabled(&packet.source_port, &packet.source_channel) {
            return Ok(self
                .app
                .on_acknowledgement_packet(ctx, output, packet, acknowledgement, relayer)?);
        }

        let ack = IncentivizedAcknowledgement::try_from(acknowledgement)?;
        let app_ack = ack.app_acknowledgement();

        if ctx.is_locked() {
            debug!(packet = %packet, "fee module locked, skipping fee distribution");
            return Ok(self
                .app
                .on_acknowledgement_packet(ctx, output, packet, &app_ack, relayer)?);
        }

        let packet_id = packet.source_id();
        if let Some(packet_fees) = ctx.get_fees_in_escrow(&packet_id)? {
            let reverse_relayer = ctx
                .get_payee_address(relayer.as_str(), &packet.source_channel)?
                .unwrap_or_else(|| relayer.to_string());

            distribute_packet_fees_on_acknowledgement(
                ctx,
                output,
                &ack.forward_relayer_address,
                &reverse_relayer,
                &packet_fees,
                &packet_id,
            )?;
        }

        Ok(self
            .app
            .on_acknowledgement_packet(ctx, output, packet, &app_ack, relayer)?)
    }

    fn on_timeout_packet(
        &mut self,
        ctx: &mut Ctx,
        output: &mut ModuleOutputBuilder,
        packet: &Packet,
        relayer: &Signer,
    ) -> Result<(), Error> {
        if ctx.is_fee_enabled(&packet.source_port, &packet.source_channel) && !ctx.is_locked() {
            let packet_id = packet.source_id();
            if let Some(packet_fees) = ctx.get_fees_in_escrow(&packet_id)? {
                let timeout_relayer = ctx
                    .get_payee_address(relayer.as_str(), &packet.source_channel)?
                    .unwrap_or_else(|| relayer.to_string());

                distribute_packet_fees_on_timeout(
                    ctx,
                    output,
                    &timeout_relayer,
                    &packet_fees,
                    &packet_id,
                )?;
            }
        }

        Ok(self
            .app
            .on_timeout_packet(ctx, output, packet, relayer)?)
    }

    fn negotiate_app_version(
        &self,
        ctx: &Ctx,
        order: Order,
        connection_id: &ConnectionId,
        port_id: &PortId,
        counterparty: &Counterparty,
        proposed_version: &Version,
    ) -> Result<Version, Error> {
        let metadata = match Metadata::from_version(proposed_version) {
            Some(metadata) => metadata,
            None => {
                return Ok(self.app.negotiate_app_version(
                    ctx,
                    order,
                    connection_id,
                    port_id,
                    counterparty,
                    proposed_version,
                )?)
            }
        };

        check_fee_version(&metadata)?;

        let app_version = self.app.negotiate_app_version(
            ctx,
            order,
            connection_id,
            port_id,
            counterparty,
            &metadata.app_version(),
        )?;

        Ok(Metadata::new(app_version.as_str()).to_version())
    }
}

fn refund_on_close<Ctx: FeeContext>(
    ctx: &mut Ctx,
    port_id: &PortId,
    channel_id: &ChannelId,
) -> Result<(), Error> {
    if !ctx.is_fee_enabled(port_id, channel_id) {
        return Ok(());
    }
    if ctx.is_locked() {
        debug!(%port_id, %channel_id, "fee module locked, fees stay in escrow on channel closure");
        return Ok(());
    }
    refund_fees_on_channel_closure(ctx, port_id, channel_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::ics29_fee::error::ErrorDetail;
    use crate::applications::ics29_fee::keeper::escrow_packet_fee;
    use crate::applications::ics29_fee::packet_fee::PacketFee;
    use crate::coin::{Amount, Coins};
    use crate::mock::app::{MockApp, RecvBehaviour, MOCK_ERROR_ACK, MOCK_SUCCESS_ACK, MOCK_VERSION};
    use crate::mock::context::MockContext;
    use crate::test_utils::{
        coins, default_fee, get_dummy_account_id, get_dummy_counterparty_relayer,
        get_dummy_packet, get_dummy_packet_id, get_dummy_refund_account, get_dummy_relayer,
        DEFAULT_DENOM,
    };

    const FEE_VERSION: &str = r#"{"fee_version":"ics29-1","app_version":"mock-version"}"#;

    fn middleware() -> FeeMiddleware<MockApp> {
        FeeMiddleware::new(MockApp::new())
    }

    fn counterparty() -> Counterparty {
        Counterparty::new(PortId::transfer(), None)
    }

    fn open_init(
        mw: &mut FeeMiddleware<MockApp>,
        ctx: &mut MockContext,
        version: &str,
    ) -> Result<Version, Error> {
        mw.on_chan_open_init(
            ctx,
            &mut ModuleOutputBuilder::new(),
            Order::Unordered,
            &[ConnectionId::new(0)],
            &PortId::transfer(),
            &ChannelId::new(0),
            &counterparty(),
            &Version::from(version),
        )
    }

    fn open_try(
        mw: &mut FeeMiddleware<MockApp>,
        ctx: &mut MockContext,
        version: &str,
    ) -> Result<Version, Error> {
        mw.on_chan_open_try(
            ctx,
            &mut ModuleOutputBuilder::new(),
            Order::Unordered,
            &[ConnectionId::new(0)],
            &PortId::transfer(),
            &ChannelId::new(0),
            &counterparty(),
            &Version::from(version),
        )
    }

    fn open_ack(
        mw: &mut FeeMiddleware<MockApp>,
        ctx: &mut MockContext,
        version: &str,
    ) -> Result<(), Error> {
        mw.on_chan_open_ack(
            ctx,
            &mut ModuleOutputBuilder::new(),
            &PortId::transfer(),
            &ChannelId::new(0),
            &ChannelId::new(1),
            &Version::from(version),
        )
    }

    /// A sending chain with the fee of packet 1 in escrow on `transfer/channel-0`.
    fn sending_context() -> MockContext {
        let mut ctx = MockContext::new()
            .with_fee_enabled_channel(PortId::transfer(), ChannelId::new(0))
            .with_packet_commitment(get_dummy_packet_id(1))
            .with_account(get_dummy_refund_account(), coins(DEFAULT_DENOM, 1000))
            .with_account(get_dummy_relayer(), Coins::new())
            .with_account(get_dummy_counterparty_relayer(), Coins::new())
            .with_account(get_dummy_account_id(), Coins::new());

        escrow_packet_fee(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            get_dummy_packet_id(1),
            PacketFee::new(default_fee(), get_dummy_refund_account(), vec![]),
        )
        .unwrap();
        ctx.delete_packet_commitment(&get_dummy_packet_id(1));
        ctx
    }

    /// A receiving chain with `transfer/channel-1` fee-enabled.
    fn receiving_context() -> MockContext {
        MockContext::new().with_fee_enabled_channel(PortId::transfer(), ChannelId::new(1))
    }

    fn incentivized_ack(forward_relayer: &Signer) -> Acknowledgement {
        IncentivizedAcknowledgement::new(
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()),
            forward_relayer.as_str(),
            true,
        )
        .into()
    }

    fn stake(ctx: &MockContext, account: &Signer) -> Amount {
        ctx.balance(account, DEFAULT_DENOM)
    }

    #[test_log::test]
    fn open_init_with_empty_version_proposes_fees() {
        let mut ctx = MockContext::new();
        let mut mw = middleware();

        let version = open_init(&mut mw, &mut ctx, "").unwrap();

        assert_eq!(version.as_str(), FEE_VERSION);
        assert_eq!(mw.app().versions, vec![Version::empty()]);
        assert!(ctx.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
    }

    #[test_log::test]
    fn open_init_with_plain_version_opens_channel_without_fees() {
        let mut ctx = MockContext::new();
        let mut mw = middleware();

        let version = open_init(&mut mw, &mut ctx, "ics20-1").unwrap();

        assert_eq!(version.as_str(), "ics20-1");
        assert!(!ctx.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
    }

    #[test_log::test]
    fn open_handshake_rejects_unknown_fee_version() {
        let mut ctx = MockContext::new();
        let mut mw = middleware();
        let proposed = r#"{"fee_version":"ics29-2","app_version":"ics20-1"}"#;

        let err = open_init(&mut mw, &mut ctx, proposed).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidVersion(_)));

        let err = open_try(&mut mw, &mut ctx, proposed).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidVersion(_)));

        assert!(mw.app().versions.is_empty());
        assert!(!ctx.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
    }

    #[test_log::test]
    fn open_try_accepts_fee_metadata() {
        let mut ctx = MockContext::new();
        let mut mw = middleware();

        let version = open_try(&mut mw, &mut ctx, &Metadata::new("ics20-1").to_version().to_string())
            .unwrap();

        assert_eq!(version, Metadata::new("ics20-1").to_version());
        assert_eq!(mw.app().versions, vec![Version::from("ics20-1")]);
        assert!(ctx.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
    }

    #[test_log::test]
    fn open_try_with_empty_version_opens_channel_without_fees() {
        let mut ctx = MockContext::new();
        let mut mw = middleware();

        let version = open_try(&mut mw, &mut ctx, "").unwrap();

        assert_eq!(version.as_str(), MOCK_VERSION);
        assert!(!ctx.is_fee_enabled(&PortId::transfer(), &ChannelId::new(0)));
    }

    #[test_log::test]
    fn open_ack_checks_counterparty_version_on_fee_channels_only() {
        let mut mw = middleware();

        let mut fee_ctx =
            MockContext::new().with_fee_enabled_channel(PortId::transfer(), ChannelId::new(0));
        let err = open_ack(&mut mw, &mut fee_ctx, "ics20-1").unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidVersionMetadata(_)));

        open_ack(&mut mw, &mut fee_ctx, FEE_VERSION).unwrap();
        assert_eq!(mw.app().versions, vec![Version::from(MOCK_VERSION)]);

        // A channel that did not propose fees hands any answer to the application unchanged
        let mut plain_ctx = MockContext::new();
        open_ack(&mut mw, &mut plain_ctx, FEE_VERSION).unwrap();
        assert_eq!(mw.app().versions[1].as_str(), FEE_VERSION);
    }

    #[test_log::test]
    fn recv_wraps_ack_with_counterparty_payee() {
        let mut ctx = receiving_context();
        let mut mw = middleware();
        ctx.set_counterparty_payee_address(
            get_dummy_relayer().as_str(),
            get_dummy_counterparty_relayer().as_str(),
            &ChannelId::new(1),
        )
        .unwrap();

        let ack = mw.on_recv_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &get_dummy_relayer(),
        );

        assert!(ack.is_successful());
        let wrapped = IncentivizedAcknowledgement::try_from(ack.acknowledgement().unwrap()).unwrap();
        assert_eq!(
            wrapped.forward_relayer_address,
            get_dummy_counterparty_relayer().to_string()
        );
        assert!(wrapped.success());
        assert_eq!(
            wrapped.app_acknowledgement(),
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec())
        );
    }

    #[test_log::test]
    fn recv_wraps_failed_ack_without_payee() {
        let mut ctx = receiving_context();
        let mut mw = FeeMiddleware::new(MockApp::new().with_recv_behaviour(RecvBehaviour::Fail));

        let ack = mw.on_recv_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &get_dummy_relayer(),
        );

        assert!(!ack.is_successful());
        let wrapped = IncentivizedAcknowledgement::try_from(ack.acknowledgement().unwrap()).unwrap();
        assert_eq!(wrapped.forward_relayer_address, "");
        assert!(!wrapped.success());
        assert_eq!(
            wrapped.app_acknowledgement(),
            Acknowledgement::from(MOCK_ERROR_ACK.to_vec())
        );
    }

    #[test_log::test]
    fn locked_module_passes_recv_through() {
        let mut ctx = receiving_context();
        ctx.lock_fee_module();
        let mut mw = FeeMiddleware::new(MockApp::new().with_recv_behaviour(RecvBehaviour::Async));
        let packet = get_dummy_packet(1);

        let ack = mw.on_recv_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &packet,
            &get_dummy_relayer(),
        );
        assert_eq!(ack, OnRecvPacketAck::Async);
        assert!(ctx
            .get_relayer_address_for_async_ack(&packet.destination_id())
            .unwrap()
            .is_none());

        mw.write_acknowledgement(
            &mut ctx,
            &packet,
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()),
            true,
        )
        .unwrap();
        assert_eq!(
            ctx.written_acknowledgements()[0].1,
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec())
        );
    }

    #[test_log::test]
    fn recv_on_plain_channel_returns_app_ack() {
        let mut ctx = MockContext::new().with_channel(
            PortId::transfer(),
            ChannelId::new(1),
            Version::from(MOCK_VERSION),
        );
        let mut mw = middleware();

        let ack = mw.on_recv_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &get_dummy_relayer(),
        );

        assert_eq!(
            ack,
            OnRecvPacketAck::Successful(Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()))
        );
    }

    #[test_log::test]
    fn async_ack_is_wrapped_with_recorded_relayer() {
        let mut ctx = receiving_context();
        let mut mw = FeeMiddleware::new(MockApp::new().with_recv_behaviour(RecvBehaviour::Async));
        let packet = get_dummy_packet(1);
        ctx.set_counterparty_payee_address(
            get_dummy_relayer().as_str(),
            get_dummy_counterparty_relayer().as_str(),
            &ChannelId::new(1),
        )
        .unwrap();

        let ack = mw.on_recv_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &packet,
            &get_dummy_relayer(),
        );
        assert_eq!(ack, OnRecvPacketAck::Async);

        mw.write_acknowledgement(
            &mut ctx,
            &packet,
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()),
            true,
        )
        .unwrap();

        let (written_packet, written_ack) = &ctx.written_acknowledgements()[0];
        assert_eq!(written_packet, &packet);
        let wrapped = IncentivizedAcknowledgement::try_from(written_ack).unwrap();
        assert_eq!(
            wrapped.forward_relayer_address,
            get_dummy_counterparty_relayer().to_string()
        );
        assert!(ctx
            .get_relayer_address_for_async_ack(&packet.destination_id())
            .unwrap()
            .is_none());

        let err = mw
            .write_acknowledgement(
                &mut ctx,
                &packet,
                Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()),
                true,
            )
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::RelayerNotFoundForAsyncAck(_)));
    }

    #[test_log::test]
    fn ack_distributes_fees_once() {
        let mut ctx = sending_context();
        let mut mw = middleware();
        let packet = get_dummy_packet(1);
        ctx.set_payee_address(
            get_dummy_relayer().as_str(),
            get_dummy_account_id().as_str(),
            &ChannelId::new(0),
        )
        .unwrap();
        let ack = incentivized_ack(&get_dummy_counterparty_relayer());

        mw.on_acknowledgement_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &packet,
            &ack,
            &get_dummy_relayer(),
        )
        .unwrap();

        assert_eq!(stake(&ctx, &get_dummy_counterparty_relayer()), Amount::from(100));
        assert_eq!(stake(&ctx, &get_dummy_account_id()), Amount::from(200));
        assert_eq!(stake(&ctx, &get_dummy_relayer()), Amount::zero());
        assert_eq!(stake(&ctx, &get_dummy_refund_account()), Amount::from(700));
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::zero());
        assert_eq!(
            mw.app().acknowledged,
            vec![(packet.clone(), Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()))]
        );

        // The record is gone, a second acknowledgement moves nothing
        mw.on_acknowledgement_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &packet,
            &ack,
            &get_dummy_relayer(),
        )
        .unwrap();
        assert_eq!(stake(&ctx, &get_dummy_refund_account()), Amount::from(700));
        assert_eq!(mw.app().acknowledged.len(), 2);
    }

    #[test_log::test]
    fn ack_on_plain_channel_is_handed_over_verbatim() {
        let mut ctx = MockContext::new().with_channel(
            PortId::transfer(),
            ChannelId::new(0),
            Version::from(MOCK_VERSION),
        );
        let mut mw = middleware();
        let ack = Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec());

        mw.on_acknowledgement_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &ack,
            &get_dummy_relayer(),
        )
        .unwrap();

        assert_eq!(mw.app().acknowledged[0].1, ack);
    }

    #[test_log::test]
    fn malformed_ack_on_fee_channel_is_rejected() {
        let mut ctx = sending_context();
        let mut mw = middleware();

        let err = mw
            .on_acknowledgement_packet(
                &mut ctx,
                &mut ModuleOutputBuilder::new(),
                &get_dummy_packet(1),
                &Acknowledgement::from(b"not json".to_vec()),
                &get_dummy_relayer(),
            )
            .unwrap_err();

        assert!(matches!(err.detail(), ErrorDetail::AckUnmarshal(_)));
        assert!(mw.app().acknowledged.is_empty());
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::from(600));
    }

    #[test_log::test]
    fn locked_module_skips_distribution() {
        let mut ctx = sending_context();
        let mut mw = middleware();
        ctx.lock_fee_module();

        mw.on_acknowledgement_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &incentivized_ack(&get_dummy_counterparty_relayer()),
            &get_dummy_relayer(),
        )
        .unwrap();

        assert_eq!(
            mw.app().acknowledged[0].1,
            Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec())
        );
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::from(600));
        assert!(ctx.has_fees_in_escrow(&get_dummy_packet_id(1)));
    }

    /// Only the receiving chain is locked. Its unwrapped acknowledgement does not decode on the
    /// sending chain, so the packet cannot be acknowledged there until the receiver unlocks.
    #[test_log::test]
    fn unwrapped_ack_from_locked_receiver_is_rejected_by_sender() {
        let mut receiver = receiving_context();
        receiver.lock_fee_module();
        let ack = middleware().on_recv_packet(
            &mut receiver,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &get_dummy_relayer(),
        );
        let ack = ack.acknowledgement().unwrap().clone();
        assert_eq!(ack, Acknowledgement::from(MOCK_SUCCESS_ACK.to_vec()));

        let mut sender = sending_context();
        let mut mw = middleware();
        let err = mw
            .on_acknowledgement_packet(
                &mut sender,
                &mut ModuleOutputBuilder::new(),
                &get_dummy_packet(1),
                &ack,
                &get_dummy_relayer(),
            )
            .unwrap_err();

        assert!(matches!(err.detail(), ErrorDetail::AckUnmarshal(_)));
        assert!(mw.app().acknowledged.is_empty());
        assert!(sender.has_fees_in_escrow(&get_dummy_packet_id(1)));
        assert!(!sender.is_locked());
    }

    #[test_log::test]
    fn timeout_pays_timeout_fee_to_relayer() {
        let mut ctx = sending_context();
        let mut mw = middleware();

        mw.on_timeout_packet(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &get_dummy_packet(1),
            &get_dummy_relayer(),
        )
        .unwrap();

        assert_eq!(stake(&ctx, &get_dummy_relayer()), Amount::from(300));
        assert_eq!(stake(&ctx, &get_dummy_refund_account()), Amount::from(700));
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::zero());
        assert_eq!(mw.app().timed_out, vec![get_dummy_packet(1)]);
    }

    #[test_log::test]
    fn closing_channel_refunds_escrowed_fees() {
        let mut ctx = sending_context();
        let mut mw = middleware();

        mw.on_chan_close_init(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            &PortId::transfer(),
            &ChannelId::new(0),
        )
        .unwrap();

        assert_eq!(stake(&ctx, &get_dummy_refund_account()), Amount::from(1000));
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::zero());
        assert!(!ctx.has_fees_in_escrow(&get_dummy_packet_id(1)));
        assert_eq!(
            mw.app().closed,
            vec![(PortId::transfer(), ChannelId::new(0))]
        );
    }

    #[test_log::test]
    fn closing_channel_keeps_fees_when_locked_or_refused() {
        let mut ctx = sending_context();
        ctx.lock_fee_module();
        middleware()
            .on_chan_close_confirm(
                &mut ctx,
                &mut ModuleOutputBuilder::new(),
                &PortId::transfer(),
                &ChannelId::new(0),
            )
            .unwrap();
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::from(600));

        let mut ctx = sending_context();
        let mut mw = FeeMiddleware::new(MockApp::new().failing_close());
        assert!(mw
            .on_chan_close_init(
                &mut ctx,
                &mut ModuleOutputBuilder::new(),
                &PortId::transfer(),
                &ChannelId::new(0),
            )
            .is_err());
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::from(600));
        assert!(ctx.has_fees_in_escrow(&get_dummy_packet_id(1)));
    }

    #[test_log::test]
    fn app_version_is_unwrapped_on_fee_channels() {
        let ctx = MockContext::new()
            .with_fee_enabled_channel(PortId::transfer(), ChannelId::new(0))
            .with_channel(PortId::transfer(), ChannelId::new(1), Version::from("ics20-1"));
        let mw = middleware();

        assert_eq!(
            mw.get_app_version(&ctx, &PortId::transfer(), &ChannelId::new(0))
                .unwrap()
                .as_str(),
            MOCK_VERSION
        );
        assert_eq!(
            mw.get_app_version(&ctx, &PortId::transfer(), &ChannelId::new(1))
                .unwrap()
                .as_str(),
            "ics20-1"
        );

        let err = mw
            .get_app_version(&ctx, &PortId::transfer(), &ChannelId::new(7))
            .unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::Channel(_)));
    }

    #[test_log::test]
    fn negotiated_version_keeps_fee_wrapping() {
        let ctx = MockContext::new();
        let mw = middleware();
        let negotiate = |proposed: &str| {
            mw.negotiate_app_version(
                &ctx,
                Order::Unordered,
                &ConnectionId::new(0),
                &PortId::transfer(),
                &counterparty(),
                &Version::from(proposed),
            )
        };

        let proposed = Metadata::new("").to_version();
        assert_eq!(negotiate(proposed.as_str()).unwrap().as_str(), FEE_VERSION);
        assert_eq!(negotiate("ics20-1").unwrap().as_str(), "ics20-1");

        let err = negotiate(r#"{"fee_version":"ics29-9","app_version":""}"#).unwrap_err();
        assert!(matches!(err.detail(), ErrorDetail::InvalidVersion(_)));
    }
}
