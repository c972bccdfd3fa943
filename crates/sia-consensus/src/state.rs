//! The per-block consensus state and its derived quantities.
//!
//! A [`State`] is a snapshot of everything needed to validate the *next*
//! block: the chain index, the rolling timestamp window, difficulty fields,
//! the siafund pool, Foundation addresses, and the element accumulator.
//! States are immutable; the block-application engine derives a fresh state
//! from the previous one and never mutates in place, so every method here is
//! a pure function and safe to call concurrently.

use crate::merkle::{ElementAccumulator, LEAF_HASH_PREFIX};
use crate::network::Network;
use crate::params;
use num_bigint::BigUint;
use serde::Serialize;
use sia_types::transactions::{FileContract, SiacoinOutput, Transaction};
use sia_types::v2::{V2FileContract, V2Resolution, V2Transaction};
use sia_types::{
    encoded_len, hash_bytes, BlockID, ChainIndex, Currency, Decodable, Decoder, Encodable,
    Encoder, FileContractID, Hash256, WriteCounter,
};
use std::io::{Read, Write};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// The state of the chain as of a particular block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct State {
    /// The network the state is interpreted against; associated by
    /// reference, never encoded.
    #[serde(skip)]
    pub network: Arc<Network>,

    pub index: ChainIndex,
    /// The timestamps of the eleven most recent ancestors, zero-padded
    /// before height 11.
    pub prev_timestamps: [i64; 11],
    /// Cumulative-work target representation.
    pub depth: BlockID,
    /// Proof-of-work target for the next block.
    pub child_target: BlockID,
    pub siafund_pool: Currency,

    // hardfork-related state
    /// Oak accumulated block time, in nanoseconds.
    pub oak_time: u64,
    pub oak_target: BlockID,
    pub foundation_primary_address: sia_types::Address,
    pub foundation_failsafe_address: sia_types::Address,

    pub elements: ElementAccumulator,
    pub attestations: u64,
}

impl State {
    /// Returns the state to which the genesis block should be applied.
    ///
    /// The index height is the sentinel `u64::MAX`, one less than zero in
    /// wrapping arithmetic, so that [`State::child_height`] is 0.
    pub fn genesis(network: Arc<Network>) -> State {
        debug!(name = %network.name, "initializing genesis state");
        State {
            index: ChainIndex {
                height: u64::MAX,
                id: BlockID::default(),
            },
            prev_timestamps: [0; 11],
            depth: network.initial_target,
            child_target: network.initial_target,
            siafund_pool: Currency::ZERO,
            oak_time: 0,
            oak_target: BlockID([0xff; 32]),
            foundation_primary_address: network.hardfork_foundation.primary_address,
            foundation_failsafe_address: network.hardfork_foundation.failsafe_address,
            elements: ElementAccumulator::default(),
            attestations: 0,
            network,
        }
    }

    /// Decodes a state from `d`, associating it with `network`.
    ///
    /// The network is not part of the encoding; states are only meaningful
    /// against a known network.
    pub fn decode_from<R: Read>(d: &mut Decoder<R>, network: Arc<Network>) -> State {
        let index = ChainIndex::decode_from(d);
        let mut prev_timestamps = [0; 11];
        for ts in &mut prev_timestamps {
            *ts = d.read_time();
        }
        State {
            network,
            index,
            prev_timestamps,
            depth: BlockID::decode_from(d),
            child_target: BlockID::decode_from(d),
            siafund_pool: Currency::decode_from(d),
            oak_time: d.read_u64(),
            oak_target: BlockID::decode_from(d),
            foundation_primary_address: sia_types::Address::decode_from(d),
            foundation_failsafe_address: sia_types::Address::decode_from(d),
            elements: ElementAccumulator::decode_from(d),
            attestations: d.read_u64(),
        }
    }

    /// The height of the next block; wraps to 0 at the genesis sentinel.
    pub fn child_height(&self) -> u64 {
        self.index.height.wrapping_add(1)
    }

    fn num_timestamps(&self) -> usize {
        self.child_height().min(self.prev_timestamps.len() as u64) as usize
    }

    /// The median of the populated ancestor timestamps; zero before any
    /// block has been applied.
    pub fn median_timestamp(&self) -> i64 {
        let mut prev = self.prev_timestamps;
        let ts = &mut prev[..self.num_timestamps()];
        if ts.is_empty() {
            return 0;
        }
        ts.sort_unstable();
        if ts.len() % 2 != 0 {
            return ts[ts.len() / 2];
        }
        let (l, r) = (ts[ts.len() / 2 - 1], ts[ts.len() / 2]);
        l + (r - l) / 2
    }

    /// The latest acceptable timestamp for an incoming block, given the
    /// current wall-clock time in Unix nanoseconds.
    pub fn max_future_timestamp(&self, now: i64) -> i64 {
        now + params::FUTURE_THRESHOLD_NANOS
    }

    /// The expected wall-clock time between consecutive blocks.
    pub fn block_interval(&self) -> Duration {
        Duration::from_secs(params::BLOCK_INTERVAL_SECS)
    }

    /// The reward for mining a child block, floored at the network's
    /// minimum coinbase.
    pub fn block_reward(&self) -> Currency {
        let decay = Currency::siacoins(self.child_height() as u32);
        match self.network.initial_coinbase.checked_sub(decay) {
            Some(r) if r >= self.network.minimum_coinbase => r,
            _ => self.network.minimum_coinbase,
        }
    }

    /// The height at which outputs created in the child block mature.
    pub fn maturity_height(&self) -> u64 {
        self.child_height() + params::MATURITY_DELAY
    }

    /// The number of siafunds in existence.
    pub fn siafund_count(&self) -> u64 {
        params::SIAFUND_COUNT
    }

    /// The depth used to determine the target timestamp in the pre-Oak
    /// difficulty adjustment algorithm.
    pub fn ancestor_depth(&self) -> u64 {
        params::ANCESTOR_DEPTH
    }

    /// The maximum weight of a valid child block.
    pub fn max_block_weight(&self) -> u64 {
        params::MAX_BLOCK_WEIGHT
    }

    /// The factor by which the child block's nonce must be divisible.
    pub fn nonce_factor(&self) -> u64 {
        if self.child_height() < self.network.hardfork_asic.height {
            return 1;
        }
        params::ASIC_NONCE_FACTOR
    }

    /// The Foundation subsidy output for the child block; zero-valued if no
    /// subsidy is due.
    pub fn foundation_subsidy(&self) -> SiacoinOutput {
        let mut sco = SiacoinOutput {
            value: Currency::ZERO,
            address: self.foundation_primary_address,
        };
        let subsidy_per_block = Currency::siacoins(30_000);
        let hardfork_height = self.network.hardfork_foundation.height;
        let child = self.child_height();
        if child < hardfork_height || (child - hardfork_height) % params::BLOCKS_PER_MONTH != 0 {
            return sco;
        }
        sco.value = if child == hardfork_height {
            // the activation block pays out a full year up front
            subsidy_per_block.saturating_mul_u64(params::BLOCKS_PER_YEAR)
        } else {
            subsidy_per_block.saturating_mul_u64(params::BLOCKS_PER_MONTH)
        };
        sco
    }

    /// The weight of a v1 transaction: the length of its canonical
    /// encoding, measured without materializing it.
    pub fn transaction_weight(&self, txn: &Transaction) -> u64 {
        encoded_len(txn)
    }

    /// The weight of a v2 transaction: the encoded size of its components
    /// with all Merkle proofs elided, plus a per-signature surcharge.
    pub fn v2_transaction_weight(&self, txn: &V2Transaction) -> u64 {
        let mut e = Encoder::new(WriteCounter::default());
        for sci in &txn.siacoin_inputs {
            let mut sci = sci.clone();
            sci.parent.state_element.merkle_proof.clear();
            sci.encode_to(&mut e);
        }
        for sco in &txn.siacoin_outputs {
            sco.encode_to(&mut e);
        }
        for sfi in &txn.siafund_inputs {
            let mut sfi = sfi.clone();
            sfi.parent.state_element.merkle_proof.clear();
            sfi.encode_to(&mut e);
        }
        for sfo in &txn.siafund_outputs {
            sfo.encode_to(&mut e);
        }
        for fc in &txn.file_contracts {
            fc.encode_to(&mut e);
        }
        for fcr in &txn.file_contract_revisions {
            let mut fcr = fcr.clone();
            fcr.parent.state_element.merkle_proof.clear();
            fcr.encode_to(&mut e);
        }
        for fcr in &txn.file_contract_resolutions {
            let mut fcr = fcr.clone();
            fcr.parent.state_element.merkle_proof.clear();
            if let V2Resolution::StorageProof(sp) = &mut fcr.resolution {
                sp.proof_index.state_element.merkle_proof.clear();
            }
            fcr.encode_to(&mut e);
        }
        for a in &txn.attestations {
            a.encode_to(&mut e);
        }
        e.write_bytes(&txn.arbitrary_data);
        let _ = e.flush();
        let storage = e.get_ref().count();

        let mut signatures: u64 = 0;
        for sci in &txn.siacoin_inputs {
            signatures += sci.signatures.len() as u64;
        }
        for sfi in &txn.siafund_inputs {
            signatures += sfi.signatures.len() as u64;
        }
        signatures += 2 * txn.file_contracts.len() as u64;
        signatures += 2 * txn.file_contract_revisions.len() as u64;
        for fcr in &txn.file_contract_resolutions {
            if matches!(
                fcr.resolution,
                V2Resolution::Renewal(_) | V2Resolution::Finalization(_)
            ) {
                signatures += 2;
            }
        }
        signatures += txn.attestations.len() as u64;

        storage + 100 * signatures
    }

    /// The tax levied on a v1 file contract: 3.9% of the payout, rounded
    /// down to a multiple of the siafund count.
    ///
    /// The arithmetic runs at arbitrary precision and is truncated to 128
    /// bits only at the end. Before the tax hardfork the rate is applied as
    /// an explicit rational with the division performed last; afterwards the
    /// integer route is used. Both round identically.
    pub fn file_contract_tax(&self, fc: &FileContract) -> Currency {
        let mut tax = BigUint::from(fc.payout.raw());
        if self.child_height() < self.network.hardfork_tax.height {
            tax = (tax * 39u32) / 1000u32;
        } else {
            tax *= 39u32;
            tax /= 1000u32;
        }

        // round down to a multiple of the siafund count
        tax = &tax - (&tax % params::SIAFUND_COUNT);

        let digits = tax.to_u64_digits();
        Currency::new(
            digits.first().copied().unwrap_or(0),
            digits.get(1).copied().unwrap_or(0),
        )
    }

    /// The tax levied on a v2 file contract: 4% of the renter and host
    /// payouts, rounded down to a multiple of the siafund count.
    pub fn v2_file_contract_tax(&self, fc: &V2FileContract) -> Currency {
        let sum = fc
            .renter_output
            .value
            .saturating_add(fc.host_output.value);
        let tax = sum.div_u64(25).raw();
        Currency::from_raw(tax - tax % params::SIAFUND_COUNT as u128)
    }

    /// The pseudo-random leaf index that a storage proof for the given
    /// contract must open, derived from the proof-window block ID.
    pub fn storage_proof_leaf_index(
        &self,
        filesize: u64,
        window_id: BlockID,
        fcid: FileContractID,
    ) -> u64 {
        let mut num_leaves = filesize / params::LEAF_SIZE;
        if filesize % params::LEAF_SIZE != 0 {
            num_leaves += 1;
        }
        if num_leaves == 0 {
            return 0;
        }
        let mut buf = [0; 64];
        buf[..32].copy_from_slice(&window_id.0);
        buf[32..].copy_from_slice(&fcid.0);
        let seed = hash_bytes(&buf);

        // fold the seed as four big-endian u64 chunks via 128-over-64
        // modular reduction
        let mut r: u64 = 0;
        for i in (0..32).step_by(8) {
            let mut chunk = [0; 8];
            chunk.copy_from_slice(&seed.0[i..i + 8]);
            let v = u64::from_be_bytes(chunk);
            r = ((((r as u128) << 64) | v as u128) % num_leaves as u128) as u64;
        }
        r
    }

    /// The leaf hash of up to 64 bytes of file contract data; shorter
    /// leaves are zero-extended.
    pub fn storage_proof_leaf_hash(&self, leaf: &[u8]) -> Hash256 {
        let mut buf = [0; 65];
        buf[0] = LEAF_HASH_PREFIX;
        let n = leaf.len().min(64);
        buf[1..1 + n].copy_from_slice(&leaf[..n]);
        hash_bytes(&buf)
    }
}

impl Encodable for State {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.index.encode_to(e);
        for ts in &self.prev_timestamps {
            e.write_time(*ts);
        }
        self.depth.encode_to(e);
        self.child_target.encode_to(e);
        self.siafund_pool.encode_to(e);

        e.write_u64(self.oak_time);
        self.oak_target.encode_to(e);
        self.foundation_primary_address.encode_to(e);
        self.foundation_failsafe_address.encode_to(e);
        self.elements.encode_to(e);
        e.write_u64(self.attestations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::{
        HardforkASIC, HardforkDevAddr, HardforkFoundation, HardforkOak, HardforkStorageProof,
        HardforkTax, HardforkV2,
    };
    use sia_types::Address;

    fn test_network() -> Arc<Network> {
        Arc::new(Network {
            name: "testnet".into(),
            initial_coinbase: Currency::siacoins(300_000),
            minimum_coinbase: Currency::siacoins(30_000),
            initial_target: BlockID([0xff; 32]),
            hardfork_dev_addr: HardforkDevAddr {
                height: 10,
                old_address: Address::default(),
                new_address: Address::default(),
            },
            hardfork_tax: HardforkTax { height: 20 },
            hardfork_storage_proof: HardforkStorageProof { height: 30 },
            hardfork_oak: HardforkOak {
                height: 40,
                fix_height: 50,
                genesis_timestamp: 0,
            },
            hardfork_asic: HardforkASIC {
                height: 60,
                oak_time: 10_000,
                oak_target: BlockID([0xff; 32]),
            },
            hardfork_foundation: HardforkFoundation {
                height: 70,
                primary_address: Address([1; 32]),
                failsafe_address: Address([2; 32]),
            },
            hardfork_v2: HardforkV2 {
                allow_height: 80,
                require_height: 90,
            },
        })
    }

    fn state_at(height: u64) -> State {
        State {
            index: ChainIndex {
                height,
                id: BlockID::default(),
            },
            ..State::genesis(test_network())
        }
    }

    #[test]
    fn test_child_height_wraps_at_genesis() {
        let genesis = State::genesis(test_network());
        assert_eq!(genesis.index.height, u64::MAX);
        assert_eq!(genesis.child_height(), 0);
        assert_eq!(state_at(0).child_height(), 1);
    }

    #[test]
    fn test_median_timestamp_window() {
        let mut s = state_at(2); // three populated slots
        s.prev_timestamps = [30, 10, 20, 99, 99, 99, 99, 99, 99, 99, 99];
        assert_eq!(s.median_timestamp(), 20);

        s.index.height = 3; // four slots, even count takes the midpoint
        s.prev_timestamps[3] = 40;
        assert_eq!(s.median_timestamp(), 25);
    }

    #[test]
    fn test_median_timestamp_full_window() {
        let mut s = state_at(1000);
        s.prev_timestamps = [11, 3, 7, 1, 9, 5, 13, 2, 8, 4, 6];
        assert_eq!(s.median_timestamp(), 6);
    }

    #[test]
    fn test_block_reward_decays_to_floor() {
        assert_eq!(state_at(u64::MAX).block_reward(), Currency::siacoins(300_000));
        assert_eq!(state_at(0).block_reward(), Currency::siacoins(299_999));
        // decay bottoms out at the minimum coinbase
        assert_eq!(state_at(270_000).block_reward(), Currency::siacoins(30_000));
        assert_eq!(state_at(1_000_000).block_reward(), Currency::siacoins(30_000));
    }

    #[test]
    fn test_nonce_factor_switches_at_asic_fork() {
        assert_eq!(state_at(58).nonce_factor(), 1);
        assert_eq!(state_at(59).nonce_factor(), 1009);
        assert_eq!(state_at(1_000).nonce_factor(), 1009);
    }

    #[test]
    fn test_foundation_subsidy_schedule() {
        let fork = 70u64;
        let monthly = params::BLOCKS_PER_MONTH;

        let before = state_at(fork - 2).foundation_subsidy();
        assert!(before.value.is_zero());

        let at = state_at(fork - 1).foundation_subsidy();
        assert_eq!(
            at.value,
            Currency::siacoins(30_000).saturating_mul_u64(params::BLOCKS_PER_YEAR)
        );
        assert_eq!(at.address, Address([1; 32]));

        let after = state_at(fork).foundation_subsidy();
        assert!(after.value.is_zero());

        let month = state_at(fork - 1 + monthly).foundation_subsidy();
        assert_eq!(
            month.value,
            Currency::siacoins(30_000).saturating_mul_u64(monthly)
        );
    }

    #[test]
    fn test_file_contract_tax_paths_agree() {
        let mut fc = FileContract::default();
        for payout in [0u128, 1, 10_000, 1_000_000, 10u128.pow(27) + 12_345] {
            fc.payout = Currency::from_raw(payout);
            let pre = state_at(1).file_contract_tax(&fc);
            let post = state_at(1_000_000).file_contract_tax(&fc);
            assert_eq!(pre, post, "payout {payout}");
            assert_eq!(pre.raw() % 10_000, 0);
            assert_eq!(pre.raw(), payout * 39 / 1000 / 10_000 * 10_000);
        }
    }

    #[test]
    fn test_v2_file_contract_tax_rounds_down() {
        let mut fc = V2FileContract::default();
        fc.renter_output.value = Currency::from_raw(100);
        fc.host_output.value = Currency::from_raw(100);
        // sum 200, 4% = 8, floored to a multiple of 10000 -> 0
        assert_eq!(state_at(0).v2_file_contract_tax(&fc), Currency::ZERO);

        fc.renter_output.value = Currency::siacoins(100);
        fc.host_output.value = Currency::siacoins(100);
        let tax = state_at(0).v2_file_contract_tax(&fc);
        assert_eq!(tax.raw() % 10_000, 0);
        assert_eq!(tax.raw(), Currency::siacoins(8).raw());
    }

    #[test]
    fn test_storage_proof_leaf_index_bounds() {
        let s = state_at(0);
        assert_eq!(
            s.storage_proof_leaf_index(0, BlockID::default(), FileContractID::default()),
            0
        );
        // a single leaf always selects index 0
        assert_eq!(
            s.storage_proof_leaf_index(64, BlockID::default(), FileContractID::default()),
            0
        );
        for filesize in [65u64, 1000, 1 << 20] {
            let num_leaves = filesize.div_ceil(64);
            let idx = s.storage_proof_leaf_index(
                filesize,
                BlockID([3; 32]),
                FileContractID([4; 32]),
            );
            assert!(idx < num_leaves);
        }
    }

    #[test]
    fn test_storage_proof_leaf_hash_pads() {
        let s = state_at(0);
        let short = s.storage_proof_leaf_hash(b"abc");
        let mut padded = [0u8; 64];
        padded[..3].copy_from_slice(b"abc");
        assert_eq!(short, s.storage_proof_leaf_hash(&padded));
        assert_ne!(short, s.storage_proof_leaf_hash(b"abd"));
    }

    #[test]
    fn test_transaction_weight_is_encoded_len() {
        let s = state_at(0);
        let txn = Transaction::default();
        assert_eq!(s.transaction_weight(&txn), 80);
    }

    #[test]
    fn test_v2_weight_counts_signatures() {
        let s = state_at(0);
        let empty = s.v2_transaction_weight(&V2Transaction::default());

        let mut txn = V2Transaction::default();
        txn.attestations.push(sia_types::v2::Attestation::default());
        let with_attestation = s.v2_transaction_weight(&txn);
        let attestation_len = encoded_len(&txn.attestations[0]);
        assert_eq!(with_attestation, empty + attestation_len + 100);
    }

    #[test]
    fn test_v2_weight_ignores_merkle_proofs() {
        let s = state_at(0);
        let mut txn = V2Transaction::default();
        txn.siacoin_inputs.push(sia_types::v2::V2SiacoinInput::default());
        let bare = s.v2_transaction_weight(&txn);
        txn.siacoin_inputs[0]
            .parent
            .state_element
            .merkle_proof = vec![Hash256::default(); 10];
        assert_eq!(s.v2_transaction_weight(&txn), bare);
    }

    #[test]
    fn test_state_codec_roundtrip() {
        let network = test_network();
        let mut s = State::genesis(network.clone());
        s.index = ChainIndex {
            height: 12_345,
            id: BlockID([7; 32]),
        };
        s.prev_timestamps = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11];
        s.siafund_pool = Currency::siacoins(99);
        s.oak_time = 123_456;
        s.attestations = 17;
        s.elements.num_leaves = 3;
        s.elements.trees[0] = hash_bytes(b"t0");
        s.elements.trees[1] = hash_bytes(b"t1");

        let buf = sia_types::to_bytes(&s);
        let mut d = Decoder::new(buf.as_slice(), buf.len() as u64);
        let back = State::decode_from(&mut d, network);
        d.finish().unwrap();
        assert_eq!(back, s);
        assert_eq!(sia_types::to_bytes(&back), buf);
    }
}
