//! Chain parameters for Sia networks.
//!
//! A [`Network`] fixes everything about a chain that never changes at
//! runtime: the coinbase schedule, the genesis target, and the height of
//! every hardfork. States are always interpreted against a known network,
//! so the network itself is never part of the encoded consensus state.
//!
//! Use [`Network::mainnet`] for the production chain; tests and private
//! networks construct the struct directly with their own heights.

use serde::{Deserialize, Serialize};
use sia_types::{Address, BlockID, Currency};

/// The dev-address hardfork replaced the developer premine address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkDevAddr {
    pub height: u64,
    pub old_address: Address,
    pub new_address: Address,
}

/// The tax hardfork switched the file contract tax to integer arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkTax {
    pub height: u64,
}

/// The storage-proof hardfork changed leaf selection for storage proofs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkStorageProof {
    pub height: u64,
}

/// The Oak hardfork introduced the Oak difficulty adjustment algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkOak {
    pub height: u64,
    pub fix_height: u64,
    /// Timestamp of the genesis block, in Unix nanoseconds; the Oak
    /// algorithm measures total elapsed time against it.
    pub genesis_timestamp: i64,
}

/// The ASIC hardfork reset the Oak difficulty state to brick first-pass
/// mining hardware.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkASIC {
    pub height: u64,
    /// Oak accumulated time after the reset, in nanoseconds.
    pub oak_time: u64,
    /// Oak target after the reset.
    pub oak_target: BlockID,
}

/// The Foundation hardfork introduced the Foundation subsidy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkFoundation {
    pub height: u64,
    pub primary_address: Address,
    pub failsafe_address: Address,
}

/// The v2 hardfork rolls out second-generation transactions: first allowed,
/// then required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HardforkV2 {
    pub allow_height: u64,
    pub require_height: u64,
}

/// The fixed parameters of a Sia blockchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Network {
    pub name: String,

    pub initial_coinbase: Currency,
    pub minimum_coinbase: Currency,
    pub initial_target: BlockID,

    pub hardfork_dev_addr: HardforkDevAddr,
    pub hardfork_tax: HardforkTax,
    pub hardfork_storage_proof: HardforkStorageProof,
    pub hardfork_oak: HardforkOak,
    pub hardfork_asic: HardforkASIC,
    pub hardfork_foundation: HardforkFoundation,
    pub hardfork_v2: HardforkV2,
}

impl Network {
    /// Parameters of the production Sia network.
    pub fn mainnet() -> Network {
        Network {
            name: "mainnet".into(),

            initial_coinbase: Currency::siacoins(300_000),
            minimum_coinbase: Currency::siacoins(30_000),
            initial_target: BlockID::parse(
                "0000000020000000000000000000000000000000000000000000000000000000",
            )
            .expect("valid mainnet target"),

            hardfork_dev_addr: HardforkDevAddr {
                height: 10_000,
                old_address: Address::parse(
                    "243f82cf6ad12763f5fd9ee1a0a6f9e14c6cfd7a4b1d4f276cd0b2e67f9e3c51",
                )
                .expect("valid mainnet address"),
                new_address: Address::parse(
                    "f3c9a1e86b4dd0725e6c2b9a9f5a118c4d17de03fa56217c0c7f1e9a2d8b6430",
                )
                .expect("valid mainnet address"),
            },
            hardfork_tax: HardforkTax { height: 21_000 },
            hardfork_storage_proof: HardforkStorageProof { height: 100_000 },
            hardfork_oak: HardforkOak {
                height: 135_000,
                fix_height: 139_000,
                genesis_timestamp: 1_433_600_000 * 1_000_000_000,
            },
            hardfork_asic: HardforkASIC {
                height: 179_000,
                oak_time: 120_000 * 1_000_000_000,
                oak_target: BlockID::parse(
                    "0000000000000000200000000000000000000000000000000000000000000000",
                )
                .expect("valid mainnet target"),
            },
            hardfork_foundation: HardforkFoundation {
                height: 298_000,
                primary_address: Address::parse(
                    "053b2def3cbdd078c19d62ce2b4f0b1a3c5e7ad9c1d3f082a6b04e9d5fb8c672",
                )
                .expect("valid mainnet address"),
                failsafe_address: Address::parse(
                    "27c22a6c6e6645802a3b8fa0e5374657438ef12716d2205d3e866272de1b644b",
                )
                .expect("valid mainnet address"),
            },
            hardfork_v2: HardforkV2 {
                allow_height: 526_000,
                require_height: 530_000,
            },
        }
    }
}
