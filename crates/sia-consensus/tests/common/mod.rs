//! Shared fixtures for integration tests.

use sia_consensus::{
    HardforkASIC, HardforkDevAddr, HardforkFoundation, HardforkOak, HardforkStorageProof,
    HardforkTax, HardforkV2, Network, State,
};
use sia_types::{Address, BlockID, ChainIndex, Currency};
use std::sync::Arc;

/// A network with small, round hardfork heights so tests can straddle every
/// fork cheaply.
pub fn test_network() -> Arc<Network> {
    Arc::new(Network {
        name: "testnet".into(),
        initial_coinbase: Currency::siacoins(300_000),
        minimum_coinbase: Currency::siacoins(30_000),
        initial_target: BlockID([0xff; 32]),
        hardfork_dev_addr: HardforkDevAddr {
            height: 100,
            old_address: Address([0xaa; 32]),
            new_address: Address([0xab; 32]),
        },
        hardfork_tax: HardforkTax { height: 200 },
        hardfork_storage_proof: HardforkStorageProof { height: 300 },
        hardfork_oak: HardforkOak {
            height: 400,
            fix_height: 500,
            genesis_timestamp: 1_433_600_000 * 1_000_000_000,
        },
        hardfork_asic: HardforkASIC {
            height: 600,
            oak_time: 10_000 * 1_000_000_000,
            oak_target: BlockID([0xff; 32]),
        },
        hardfork_foundation: HardforkFoundation {
            height: 700,
            primary_address: Address([0xf0; 32]),
            failsafe_address: Address([0xf1; 32]),
        },
        hardfork_v2: HardforkV2 {
            allow_height: 800,
            require_height: 900,
        },
    })
}

/// A state whose child block is at `height + 1`, carrying the test
/// network's genesis fields otherwise.
pub fn state_at(network: Arc<Network>, height: u64) -> State {
    State {
        index: ChainIndex {
            height,
            id: BlockID::default(),
        },
        ..State::genesis(network)
    }
}
