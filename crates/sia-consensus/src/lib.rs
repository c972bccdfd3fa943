//! # sia-consensus
//!
//! Consensus state and derivation rules for the Sia blockchain.
//!
//! This crate provides:
//! - [`Network`]: the immutable parameters of a chain, including every
//!   hardfork height
//! - [`State`]: the per-block consensus snapshot and its derived
//!   quantities (block reward, difficulty-adjacent fields, transaction
//!   weights, taxes, storage-proof leaf selection)
//! - The signature-hash suite and the block commitment
//! - [`V1TransactionSupplement`] / [`V1BlockSupplement`]: the side-channel
//!   data that lets legacy transactions validate statelessly
//!
//! Everything here is a pure function of its inputs. `State` and `Network`
//! are immutable after construction, so all operations are safe to call
//! from any number of threads without synchronization. Block application
//! and reorg handling live in the chain engine built on top of this crate.

mod merkle;
mod network;
mod sighash;
mod state;
mod supplement;

pub use merkle::ElementAccumulator;
pub use network::{
    HardforkASIC, HardforkDevAddr, HardforkFoundation, HardforkOak, HardforkStorageProof,
    HardforkTax, HardforkV2, Network,
};
pub use state::State;
pub use supplement::{V1BlockSupplement, V1TransactionSupplement};

/// Sia network constants.
pub mod params {
    /// The number of siafunds in existence.
    pub const SIAFUND_COUNT: u64 = 10_000;

    /// The depth used to determine the target timestamp in the pre-Oak
    /// difficulty adjustment algorithm.
    pub const ANCESTOR_DEPTH: u64 = 1_000;

    /// The maximum weight of a valid child block.
    pub const MAX_BLOCK_WEIGHT: u64 = 2_000_000;

    /// The number of blocks before outputs created by a block become
    /// spendable.
    pub const MATURITY_DELAY: u64 = 144;

    /// The expected wall-clock seconds between consecutive blocks.
    pub const BLOCK_INTERVAL_SECS: u64 = 600;

    /// The factor by which block nonces must be divisible after the ASIC
    /// hardfork.
    pub const ASIC_NONCE_FACTOR: u64 = 1009;

    /// How far ahead of wall-clock time a block timestamp may be, in
    /// nanoseconds.
    pub const FUTURE_THRESHOLD_NANOS: i64 = 3 * 60 * 60 * 1_000_000_000;

    /// The size of one storage-proof leaf, in bytes.
    pub const LEAF_SIZE: u64 = 64;

    /// Blocks mined per year at the target interval.
    pub const BLOCKS_PER_YEAR: u64 = 144 * 365;

    /// Blocks mined per month at the target interval.
    pub const BLOCKS_PER_MONTH: u64 = BLOCKS_PER_YEAR / 12;
}
