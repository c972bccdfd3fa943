//! End-to-end scenarios with literal expected values.

mod common;

use common::{state_at, test_network};
use sia_consensus::{params, Network, State, V1BlockSupplement, V1TransactionSupplement};
use sia_types::transactions::{FileContract, Transaction};
use sia_types::v2::V2FileContract;
use sia_types::{
    to_bytes, Address, BlockID, ChainIndex, Currency, Decoder, FileContractID, Hash256, Specifier,
};
use std::sync::Arc;

#[test]
fn genesis_state_over_mainnet() {
    let network = Arc::new(Network::mainnet());
    let genesis = State::genesis(network.clone());

    assert_eq!(genesis.index.height, u64::MAX);
    assert_eq!(genesis.child_height(), 0);
    assert_eq!(genesis.block_reward(), network.initial_coinbase);
    assert_eq!(genesis.maturity_height(), 144);
    assert_eq!(genesis.median_timestamp(), 0);
    assert_eq!(genesis.child_target, network.initial_target);
    assert_eq!(genesis.depth, network.initial_target);
    assert_eq!(
        genesis.foundation_primary_address,
        network.hardfork_foundation.primary_address
    );
    assert!(genesis.siafund_pool.is_zero());
}

#[test]
fn specifier_literal_layout() {
    let s = Specifier::new("hello");
    let mut want = [0u8; 16];
    want[..5].copy_from_slice(&[0x68, 0x65, 0x6c, 0x6c, 0x6f]);
    assert_eq!(to_bytes(&s), want);
    assert_eq!(s.to_string(), "hello");
}

#[test]
fn foundation_subsidy_literal_schedule() {
    let network = Arc::new(Network::mainnet());
    let fork = network.hardfork_foundation.height;

    // at exactly the hardfork height: one year's subsidy, paid to the
    // primary address
    let at_fork = state_at(network.clone(), fork - 1).foundation_subsidy();
    assert_eq!(
        at_fork.value,
        Currency::siacoins(30_000).saturating_mul_u64(144 * 365)
    );
    assert_eq!(at_fork.address, network.hardfork_foundation.primary_address);

    // one block later: nothing
    let next = state_at(network.clone(), fork).foundation_subsidy();
    assert!(next.value.is_zero());

    // one month later: a monthly payout
    let monthly = state_at(network, fork - 1 + params::BLOCKS_PER_MONTH).foundation_subsidy();
    assert_eq!(
        monthly.value,
        Currency::siacoins(30_000).saturating_mul_u64(144 * 365 / 12)
    );
}

#[test]
fn v2_tax_small_contract_rounds_to_zero() {
    let s = state_at(test_network(), 0);
    let mut fc = V2FileContract::default();
    fc.renter_output.value = Currency::from_raw(100);
    fc.host_output.value = Currency::from_raw(100);
    // sum = 200, /25 = 8, rounded down to a multiple of 10000 -> 0
    assert_eq!(s.v2_file_contract_tax(&fc), Currency::ZERO);
}

#[test]
fn v1_tax_applies_39_per_mille() {
    let s = state_at(test_network(), 1_000_000);
    let payout = Currency::siacoins(1_000_000);
    let fc = FileContract {
        payout,
        ..FileContract::default()
    };
    let tax = s.file_contract_tax(&fc);
    assert_eq!(tax.raw(), payout.raw() * 39 / 1000);
    assert_eq!(tax.raw() % params::SIAFUND_COUNT as u128, 0);
}

#[test]
fn storage_proof_leaf_index_literals() {
    let s = state_at(test_network(), 0);
    assert_eq!(
        s.storage_proof_leaf_index(0, BlockID::default(), FileContractID::default()),
        0
    );
    // one leaf: the seed folds to r mod 1 == 0 regardless of its bytes
    assert_eq!(
        s.storage_proof_leaf_index(64, BlockID::default(), FileContractID::default()),
        0
    );
}

#[test]
fn state_roundtrip_through_rpc_sized_budget() {
    let network = test_network();
    let mut s = state_at(network.clone(), 5000);
    s.prev_timestamps = [100; 11];
    s.siafund_pool = Currency::siacoins(123);
    s.attestations = 9;

    let buf = to_bytes(&s);
    // a budget exactly the encoding length decodes cleanly
    let mut d = Decoder::new(buf.as_slice(), buf.len() as u64);
    let back = State::decode_from(&mut d, network.clone());
    d.finish().unwrap();
    assert_eq!(back, s);

    // any shorter budget must fail and the partial state is discarded
    let mut d = Decoder::new(buf.as_slice(), buf.len() as u64 - 1);
    let _ = State::decode_from(&mut d, network);
    assert!(d.finish().is_err());
}

#[test]
fn block_supplement_roundtrip() {
    let bs = V1BlockSupplement {
        transactions: vec![V1TransactionSupplement::default(); 3],
        expiring_file_contracts: Vec::new(),
    };
    let back: V1BlockSupplement = sia_types::from_bytes(&to_bytes(&bs)).unwrap();
    assert_eq!(back, bs);
}

#[test]
fn commitment_changes_with_transaction_order() {
    let s = state_at(test_network(), 10);
    let a = Transaction {
        miner_fees: vec![Currency::siacoins(1)],
        ..Transaction::default()
    };
    let b = Transaction {
        miner_fees: vec![Currency::siacoins(2)],
        ..Transaction::default()
    };
    let miner = Address([0x11; 32]);
    let fwd = s.commitment(miner, &[a.clone(), b.clone()], &[]);
    assert_eq!(fwd, s.commitment(miner, &[a.clone(), b.clone()], &[]));
    assert_ne!(fwd, s.commitment(miner, &[b, a], &[]));
}

#[test]
fn max_future_timestamp_is_three_hours() {
    let s = state_at(test_network(), 0);
    let now = 1_700_000_000 * 1_000_000_000i64;
    assert_eq!(s.max_future_timestamp(now), now + 3 * 3600 * 1_000_000_000);
}

#[test]
fn constants_match_protocol() {
    let s = state_at(test_network(), 0);
    assert_eq!(s.siafund_count(), 10_000);
    assert_eq!(s.ancestor_depth(), 1_000);
    assert_eq!(s.max_block_weight(), 2_000_000);
    assert_eq!(s.block_interval().as_secs(), 600);
    assert_eq!(ChainIndex::default().height, 0);
    assert_eq!(Hash256::default(), Hash256([0; 32]));
}
