use tracing::info;

use super::{keys_with_prefix, staged};
use crate::applications::ics29_fee::context::{resolve_account, FeeContext};
use crate::applications::ics29_fee::error::Error;
use crate::applications::ics29_fee::events::IncentivizedPacketEvent;
use crate::applications::ics29_fee::keys::{
    fees_in_escrow_channel_prefix, fees_in_escrow_key, parse_packet_key,
    FEES_IN_ESCROW_KEY_PREFIX,
};
use crate::applications::ics29_fee::packet_fee::{IdentifiedPacketFees, PacketFee, PacketFees};
use crate::core::ics04_channel::packet::PacketId;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::handler::ModuleOutputBuilder;
use crate::prelude::*;
use crate::store::{get_json, set_json, KvStore, StoreError};

/// The fee records of in-flight packets.
pub trait EscrowStore: KvStore {
    fn get_fees_in_escrow(&self, packet_id: &PacketId) -> Result<Option<PacketFees>, Error> {
        get_json(self, &fees_in_escrow_key(packet_id)).map_err(Error::store)
    }

    fn has_fees_in_escrow(&self, packet_id: &PacketId) -> bool {
        self.has(fees_in_escrow_key(packet_id).as_bytes())
    }

    fn set_fees_in_escrow(
        &mut self,
        packet_id: &PacketId,
        packet_fees: &PacketFees,
    ) -> Result<(), Error> {
        set_json(self, &fees_in_escrow_key(packet_id), packet_fees).map_err(Error::store)
    }

    fn delete_fees_in_escrow(&mut self, packet_id: &PacketId) {
        self.delete(fees_in_escrow_key(packet_id).as_bytes());
    }

    /// All fee records of packets sent on the given channel, ordered by sequence.
    fn fees_in_escrow_for_channel(
        &self,
        port_id: &PortId,
        channel_id: &ChannelId,
    ) -> Result<Vec<IdentifiedPacketFees>, Error> {
        collect_identified(self, &fees_in_escrow_channel_prefix(port_id, channel_id))
    }

    /// All fee records, ordered by packet id.
    fn all_fees_in_escrow(&self) -> Result<Vec<IdentifiedPacketFees>, Error> {
        collect_identified(self, &format!("{}/", FEES_IN_ESCROW_KEY_PREFIX))
    }
}

impl<S: KvStore + ?Sized> EscrowStore for S {}

fn collect_identified<S: KvStore + ?Sized>(
    store: &S,
    prefix: &str,
) -> Result<Vec<IdentifiedPacketFees>, Error> {
    let mut identified = keys_with_prefix(store, prefix)
        .into_iter()
        .map(|(key, value)| {
            let packet_id = parse_packet_key(&key, FEES_IN_ESCROW_KEY_PREFIX)?;
            let fees: PacketFees = serde_json::from_slice(&value)
                .map_err(|e| Error::store(StoreError::decode(key.clone(), e)))?;
            Ok(IdentifiedPacketFees {
                packet_id,
                packet_fees: fees.packet_fees,
            })
        })
        .collect::<Result<Vec<_>, Error>>()?;

    // Keys order sequences lexicographically
    identified.sort_by(|a, b| a.packet_id.cmp(&b.packet_id));
    Ok(identified)
}

/// Moves the total of `packet_fee` from its refund address into the escrow account and
/// records it against the packet, in front of any fee escrowed for it before.
///
/// Nothing is recorded if the transfer fails.
pub fn escrow_packet_fee<Ctx>(
    ctx: &mut Ctx,
    output: &mut ModuleOutputBuilder,
    packet_id: PacketId,
    packet_fee: PacketFee,
) -> Result<(), Error>
where
    Ctx: FeeContext + ?Sized,
{
    let refund_address = packet_fee.refund_address.as_str();
    let refund_account = resolve_account::<Ctx>(refund_address)?;
    if !ctx.account_exists(&refund_account) {
        return Err(Error::refund_account_not_found(refund_address.to_string()));
    }

    let total = packet_fee.fee.total()?;

    let packet_fees = staged(ctx, |ctx| {
        ctx.send_coins_from_account_to_module(&refund_account, &total)?;

        let mut packet_fees = ctx.get_fees_in_escrow(&packet_id)?.unwrap_or_default();
        packet_fees.packet_fees.insert(0, packet_fee.clone());
        ctx.set_fees_in_escrow(&packet_id, &packet_fees)?;

        Ok(packet_fees)
    })?;

    info!(
        packet_id = %packet_id,
        refund_address = %packet_fee.refund_address,
        total = %total,
        "escrowed packet fee"
    );

    // Restricted fees are never accepted, so the totals cover every recorded fee
    output.emit(
        IncentivizedPacketEvent {
            packet_id,
            total_recv_fee: packet_fees.total_recv_fees()?,
            total_ack_fee: packet_fees.total_ack_fees()?,
            total_timeout_fee: packet_fees.total_timeout_fees()?,
        }
        .into(),
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::applications::ics29_fee::error::ErrorDetail;
    use crate::applications::ics29_fee::events::EVENT_TYPE_INCENTIVIZED_PACKET;
    use crate::coin::Amount;
    use crate::mock::context::MockContext;
    use crate::signer::Signer;
    use crate::store::TransactionalStore;
    use crate::test_utils::{
        coins, default_fee, get_dummy_packet_id, get_dummy_refund_account, DEFAULT_DENOM,
    };

    fn funded_context() -> MockContext {
        MockContext::new()
            .with_fee_enabled_channel(PortId::transfer(), ChannelId::new(0))
            .with_account(get_dummy_refund_account(), coins(DEFAULT_DENOM, 1000))
    }

    #[test_log::test]
    fn escrow_moves_total_into_escrow_account() {
        let mut ctx = funded_context();
        let mut output = ModuleOutputBuilder::new();
        let refunder = get_dummy_refund_account();

        escrow_packet_fee(
            &mut ctx,
            &mut output,
            get_dummy_packet_id(1),
            PacketFee::new(default_fee(), refunder.clone(), vec![]),
        )
        .unwrap();

        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::from(600));
        assert_eq!(ctx.balance(&refunder, DEFAULT_DENOM), Amount::from(400));
        assert_eq!(ctx.depth(), 0);

        let fees = ctx
            .get_fees_in_escrow(&get_dummy_packet_id(1))
            .unwrap()
            .unwrap();
        assert_eq!(fees.packet_fees.len(), 1);
    }

    #[test_log::test]
    fn newer_fees_go_first_and_events_sum_all_fees() {
        let mut ctx = funded_context();
        let mut output = ModuleOutputBuilder::new();
        let refunder = get_dummy_refund_account();
        let packet_id = get_dummy_packet_id(1);

        let small = crate::applications::ics29_fee::fee::Fee::new(
            coins(DEFAULT_DENOM, 1),
            coins(DEFAULT_DENOM, 2),
            coins(DEFAULT_DENOM, 3),
        );

        escrow_packet_fee(
            &mut ctx,
            &mut output,
            packet_id.clone(),
            PacketFee::new(default_fee(), refunder.clone(), vec![]),
        )
        .unwrap();
        escrow_packet_fee(
            &mut ctx,
            &mut output,
            packet_id.clone(),
            PacketFee::new(small.clone(), refunder, vec![]),
        )
        .unwrap();

        let fees = ctx.get_fees_in_escrow(&packet_id).unwrap().unwrap();
        assert_eq!(fees.packet_fees[0].fee, small);
        assert_eq!(fees.packet_fees[1].fee, default_fee());

        let events = output.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].kind, EVENT_TYPE_INCENTIVIZED_PACKET);
        assert_eq!(events[1].attribute("packet_sequence"), Some("1"));
        assert_eq!(events[1].attribute("recv_fee"), Some("101stake"));
        assert_eq!(events[1].attribute("ack_fee"), Some("202stake"));
        assert_eq!(events[1].attribute("timeout_fee"), Some("303stake"));
    }

    #[test_log::test]
    fn unknown_refund_account_is_rejected() {
        let mut ctx = funded_context();
        let stranger: Signer = "cosmos1stranger".parse().unwrap();

        let err = escrow_packet_fee(
            &mut ctx,
            &mut ModuleOutputBuilder::new(),
            get_dummy_packet_id(1),
            PacketFee::new(default_fee(), stranger, vec![]),
        )
        .unwrap_err();

        assert!(matches!(err.detail(), ErrorDetail::RefundAccountNotFound(_)));
    }

    #[test_log::test]
    fn failed_transfer_records_nothing() {
        let mut ctx = MockContext::new()
            .with_account(get_dummy_refund_account(), coins(DEFAULT_DENOM, 599));
        let mut output = ModuleOutputBuilder::new();

        let res = escrow_packet_fee(
            &mut ctx,
            &mut output,
            get_dummy_packet_id(1),
            PacketFee::new(default_fee(), get_dummy_refund_account(), vec![]),
        );

        assert!(res.is_err());
        assert!(!ctx.has_fees_in_escrow(&get_dummy_packet_id(1)));
        assert_eq!(ctx.escrow_balance(DEFAULT_DENOM), Amount::zero());
        assert_eq!(
            ctx.balance(&get_dummy_refund_account(), DEFAULT_DENOM),
            Amount::from(599)
        );
        assert!(output.events().is_empty());
        assert_eq!(ctx.depth(), 0);
    }
}
