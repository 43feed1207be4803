use crate::applications::ics29_fee::fee::Fee;
use crate::coin::{Coin, Coins};
use crate::core::ics04_channel::packet::{Packet, PacketId, Sequence};
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::prelude::*;
use crate::signer::Signer;

pub const DEFAULT_DENOM: &str = "stake";

pub fn get_dummy_account_id() -> Signer {
    "cosmos1wxeyh7zgn4tctjzs0vtqpc6p5cxq5t2muzl7ng"
        .parse()
        .expect("valid signer")
}

pub fn get_dummy_refund_account() -> Signer {
    "cosmos1qg6s3gr5ezxqsr6q8dxmx7d4jyz3v6yx2j0rk4"
        .parse()
        .expect("valid signer")
}

pub fn get_dummy_relayer() -> Signer {
    "cosmos1a9dk8ry2z3z6wy5dt5a2wm7f2cw9anrxlt0pxq"
        .parse()
        .expect("valid signer")
}

pub fn get_dummy_counterparty_relayer() -> Signer {
    "cosmos1m3h30wlvsf8llruxtpukdvsy0km2kum8g38c8q"
        .parse()
        .expect("valid signer")
}

/// A single-denomination coin set.
pub fn coins(denom: &str, amount: u64) -> Coins {
    Coins::from(Coin::new(denom, amount))
}

/// recv 100, ack 200, timeout 300, all in the default denomination.
pub fn default_fee() -> Fee {
    Fee::new(
        coins(DEFAULT_DENOM, 100),
        coins(DEFAULT_DENOM, 200),
        coins(DEFAULT_DENOM, 300),
    )
}

/// A packet sent from `transfer/channel-0` to `transfer/channel-1`.
pub fn get_dummy_packet(sequence: u64) -> Packet {
    Packet {
        sequence: Sequence::from(sequence),
        source_port: PortId::transfer(),
        source_channel: ChannelId::new(0),
        destination_port: PortId::transfer(),
        destination_channel: ChannelId::new(1),
        data: b"mock packet data".to_vec(),
    }
}

pub fn get_dummy_packet_id(sequence: u64) -> PacketId {
    get_dummy_packet(sequence).source_id()
}
