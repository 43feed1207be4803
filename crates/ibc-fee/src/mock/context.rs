//! A host context for testing the fee middleware.

use alloc::collections::{BTreeMap, BTreeSet};
use core::str::FromStr;

use subtle_encoding::bech32;

use crate::applications::ics29_fee::context::{cosmos_module_address, BankKeeper, FeeContext};
use crate::applications::ics29_fee::error::Error as FeeError;
use crate::applications::ics29_fee::keeper::FeeEnabledStore;
use crate::applications::ics29_fee::metadata::Metadata;
use crate::applications::ics29_fee::MODULE_NAME;
use crate::coin::{Amount, Coins};
use crate::core::ics04_channel::acknowledgement::Acknowledgement;
use crate::core::ics04_channel::context::{ChannelReader, Ics4Wrapper};
use crate::core::ics04_channel::error::Error;
use crate::core::ics04_channel::packet::{Packet, PacketId, Sequence};
use crate::core::ics04_channel::Version;
use crate::core::ics24_host::identifier::{ChannelId, PortId};
use crate::mock::app::MOCK_VERSION;
use crate::prelude::*;
use crate::signer::Signer;
use crate::store::{KvStore, OverlayStore, StoreError, TransactionalStore};

const BALANCES_KEY_PREFIX: &str = "bank/balances";

/// A context implementing everything the fee middleware depends on.
///
/// Ledger balances are kept in the same [`OverlayStore`] as the fee state, so discarding an
/// overlay also undoes the transfers made in it. Channels, sequences and commitments are
/// plain maps: the middleware only reads them.
#[derive(Clone, Debug)]
pub struct MockContext {
    /// Fee state and ledger balances.
    store: OverlayStore,

    /// The version negotiated for each open channel.
    channels: BTreeMap<(PortId, ChannelId), Version>,

    /// Tracks the sequence number for the next packet to be sent.
    next_sequence_send: BTreeMap<(PortId, ChannelId), Sequence>,

    /// Packets sent and neither acknowledged nor timed out.
    packet_commitments: BTreeSet<PacketId>,

    /// Accounts known to the ledger.
    accounts: BTreeSet<Signer>,

    /// Accounts that may not receive funds. Always contains the escrow account.
    blocked_accounts: BTreeSet<Signer>,

    /// The fee module account.
    escrow_account: Signer,

    sent_packets: Vec<Packet>,

    written_acknowledgements: Vec<(Packet, Acknowledgement)>,
}

impl Default for MockContext {
    fn default() -> Self {
        Self::new()
    }
}

impl MockContext {
    pub fn new() -> Self {
        let escrow_account = escrow_account_address();

        let mut blocked_accounts = BTreeSet::new();
        blocked_accounts.insert(escrow_account.clone());

        Self {
            store: OverlayStore::new(),
            channels: BTreeMap::new(),
            next_sequence_send: BTreeMap::new(),
            packet_commitments: BTreeSet::new(),
            accounts: BTreeSet::new(),
            blocked_accounts,
            escrow_account,
            sent_packets: Vec::new(),
            written_acknowledgements: Vec::new(),
        }
    }

    /// Adds a ledger account holding `balance`.
    pub fn with_account(mut self, account: Signer, balance: Coins) -> Self {
        for coin in balance.iter() {
            self.set_balance(&account, &coin.denom, coin.amount);
        }
        self.accounts.insert(account);
        self
    }

    pub fn with_blocked_account(mut self, account: Signer) -> Self {
        self.accounts.insert(account.clone());
        self.blocked_accounts.insert(account);
        self
    }

    /// Adds an open channel with the given version. Packets on it start at sequence 1.
    pub fn with_channel(mut self, port_id: PortId, channel_id: ChannelId, version: Version) -> Self {
        self.next_sequence_send
            .insert((port_id.clone(), channel_id.clone()), Sequence::from(1));
        self.channels.insert((port_id, channel_id), version);
        self
    }

    /// Adds an open channel that negotiated the fee version over the mock application.
    pub fn with_fee_enabled_channel(mut self, port_id: PortId, channel_id: ChannelId) -> Self {
        self.store.set_fee_enabled(&port_id, &channel_id);
        self.with_channel(port_id, channel_id, Metadata::new(MOCK_VERSION).to_version())
    }

    /// Records a sent packet, as the transport does when sending it.
    pub fn with_packet_commitment(mut self, packet_id: PacketId) -> Self {
        let key = (packet_id.port_id.clone(), packet_id.channel_id.clone());
        let next = packet_id.sequence.increment();
        if self.next_sequence_send.get(&key).map_or(true, |seq| *seq < next) {
            self.next_sequence_send.insert(key, next);
        }
        self.packet_commitments.insert(packet_id);
        self
    }

    /// Clears a commitment, as the transport does before acknowledgement or timeout callbacks.
    pub fn delete_packet_commitment(&mut self, packet_id: &PacketId) {
        self.packet_commitments.remove(packet_id);
    }

    pub fn escrow_account(&self) -> &Signer {
        &self.escrow_account
    }

    pub fn balance(&self, account: &Signer, denom: &str) -> Amount {
        self.store
            .get(balance_key(account, denom).as_bytes())
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .and_then(|amount| Amount::from_str(&amount).ok())
            .unwrap_or_default()
    }

    pub fn escrow_balance(&self, denom: &str) -> Amount {
        self.balance(&self.escrow_account, denom)
    }

    /// Removes funds from the escrow account behind the middleware's back.
    pub fn drain_escrow(&mut self, amt: &Coins) {
        let escrow_account = self.escrow_account.clone();
        for coin in amt.iter() {
            let balance = self.balance(&escrow_account, &coin.denom);
            let drained = balance.checked_sub(coin.amount).unwrap_or_default();
            self.set_balance(&escrow_account, &coin.denom, drained);
        }
    }

    pub fn sent_packets(&self) -> &[Packet] {
        &self.sent_packets
    }

    pub fn written_acknowledgements(&self) -> &[(Packet, Acknowledgement)] {
        &self.written_acknowledgements
    }

    fn set_balance(&mut self, account: &Signer, denom: &str, amount: Amount) {
        let key = balance_key(account, denom).into_bytes();
        if amount.is_zero() {
            self.store.delete(&key);
        } else {
            self.store.set(key, amount.to_string().into_bytes());
        }
    }

    fn transfer(&mut self, from: &Signer, to: &Signer, amt: &Coins) -> Result<(), FeeError> {
        let mut debited = Vec::new();
        for coin in amt.iter() {
            let balance = self.balance(from, &coin.denom);
            let remaining = balance
                .checked_sub(coin.amount)
                .ok_or_else(|| FeeError::insufficient_funds(from.to_string(), amt.to_string()))?;
            debited.push((coin, remaining));
        }

        for (coin, remaining) in debited {
            self.set_balance(from, &coin.denom, remaining);
            let credited = self
                .balance(to, &coin.denom)
                .checked_add(coin.amount)
                .ok_or_else(|| FeeError::coin(crate::coin::CoinError::overflow()))?;
            self.set_balance(to, &coin.denom, credited);
        }

        Ok(())
    }
}

fn balance_key(account: &Signer, denom: &str) -> String {
    format!("{}/{}/{}", BALANCES_KEY_PREFIX, account, denom)
}

/// The bech32 address of the fee module account on a cosmos chain.
pub fn escrow_account_address() -> Signer {
    let address = bech32::encode("cosmos", cosmos_module_address(MODULE_NAME));
    Signer::from_str(&address).unwrap_or_else(|_| unreachable!("bech32 addresses are never empty"))
}

impl KvStore for MockContext {
    fn get(&self, key: &[u8]) -> Option<Vec<u8>> {
        self.store.get(key)
    }

    fn set(&mut self, key: Vec<u8>, value: Vec<u8>) {
        self.store.set(key, value)
    }

    fn delete(&mut self, key: &[u8]) {
        self.store.delete(key)
    }

    fn prefix_iter(&self, prefix: &[u8]) -> Vec<(Vec<u8>, Vec<u8>)> {
        self.store.prefix_iter(prefix)
    }
}

impl TransactionalStore for MockContext {
    fn begin(&mut self) {
        self.store.begin()
    }

    fn commit(&mut self) -> Result<(), StoreError> {
        self.store.commit()
    }

    fn discard(&mut self) -> Result<(), StoreError> {
        self.store.discard()
    }

    fn depth(&self) -> usize {
        self.store.depth()
    }
}

impl ChannelReader for MockContext {
    fn channel_version(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Version> {
        self.channels
            .get(&(port_id.clone(), channel_id.clone()))
            .cloned()
    }

    fn get_next_sequence_send(&self, port_id: &PortId, channel_id: &ChannelId) -> Option<Sequence> {
        self.next_sequence_send
            .get(&(port_id.clone(), channel_id.clone()))
            .copied()
    }

    fn has_packet_commitment(&self, packet_id: &PacketId) -> bool {
        self.packet_commitments.contains(packet_id)
    }
}

impl Ics4Wrapper for MockContext {
    fn send_packet(&mut self, mut packet: Packet) -> Result<Sequence, Error> {
        let key = (packet.source_port.clone(), packet.source_channel.clone());
        let sequence = self
            .next_sequence_send
            .get(&key)
            .copied()
            .ok_or_else(|| Error::missing_next_send_seq(key.0.clone(), key.1.clone()))?;

        packet.sequence = sequence;
        self.packet_commitments.insert(packet.source_id());
        self.next_sequence_send.insert(key, sequence.increment());
        self.sent_packets.push(packet);

        Ok(sequence)
    }

    fn write_acknowledgement(
        &mut self,
        packet: &Packet,
        acknowledgement: Acknowledgement,
    ) -> Result<(), Error> {
        self.written_acknowledgements
            .push((packet.clone(), acknowledgement));
        Ok(())
    }
}

impl BankKeeper for MockContext {
    type AccountId = Signer;

    fn account_exists(&self, account: &Signer) -> bool {
        self.accounts.contains(account) || account == &self.escrow_account
    }

    fn is_blocked_account(&self, account: &Signer) -> bool {
        self.blocked_accounts.contains(account)
    }

    fn get_module_balance(&self, denom: &str) -> Amount {
        self.escrow_balance(denom)
    }

    fn send_coins_from_account_to_module(
        &mut self,
        from: &Signer,
        amt: &Coins,
    ) -> Result<(), FeeError> {
        let escrow_account = self.escrow_account.clone();
        self.transfer(from, &escrow_account, amt)
    }

    fn send_coins_from_module_to_account(
        &mut self,
        to: &Signer,
        amt: &Coins,
    ) -> Result<(), FeeError> {
        let escrow_account = self.escrow_account.clone();
        self.transfer(&escrow_account, to, amt)
    }
}

impl FeeContext for MockContext {
    type AccountId = Signer;
}
