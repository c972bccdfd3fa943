//! Signature-hash preimages and the block commitment.
//!
//! These functions define the exact bytes that transaction participants
//! sign and that miners commit to. v1 preimages interleave a replay-
//! protection prefix ahead of each spent input; v2 preimages start with a
//! raw domain-separation tag followed by a fixed `0x02` byte. Domain tags
//! are written without length prefixes: they are part of the preimage, not
//! data.

use crate::merkle::MerkleAccumulator;
use crate::state::State;
use sia_types::transactions::{CoveredFields, Transaction};
use sia_types::v2::{Attestation, V2FileContract, V2FileContractRenewal, V2Resolution, V2Transaction};
use sia_types::{Address, Encodable, Hash256, Hasher};

impl State {
    /// The replay-protection prefix for v1 signature hashes at the current
    /// height. A new prefix is introduced at each hardfork so that
    /// signatures cannot be replayed across forks. Note that the ASIC-era
    /// prefix is a single zero byte, not an empty slice.
    fn replay_prefix(&self) -> &'static [u8] {
        if self.index.height >= self.network.hardfork_v2.allow_height {
            &[2]
        } else if self.index.height >= self.network.hardfork_foundation.height {
            &[1]
        } else if self.index.height >= self.network.hardfork_asic.height {
            &[0]
        } else {
            &[]
        }
    }

    /// The replay-protection prefix written into every v2 hash.
    fn v2_replay_prefix(&self) -> u8 {
        2
    }

    /// The hash of the transaction data covered by a whole-transaction
    /// signature: every field, the signature's parent/key/timelock triple,
    /// and the signatures selected by `covered_sigs`.
    ///
    /// # Panics
    ///
    /// Panics if `covered_sigs` references a signature index not present in
    /// `txn`; covering missing fields is a programmer error.
    pub fn whole_sig_hash(
        &self,
        txn: &Transaction,
        parent_id: Hash256,
        pubkey_index: u64,
        timelock: u64,
        covered_sigs: &[u64],
    ) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();

        e.write_prefix(txn.siacoin_inputs.len());
        for sci in &txn.siacoin_inputs {
            e.write(self.replay_prefix());
            sci.encode_to(e);
        }
        e.write_prefix(txn.siacoin_outputs.len());
        for sco in &txn.siacoin_outputs {
            sco.encode_to(e);
        }
        e.write_prefix(txn.file_contracts.len());
        for fc in &txn.file_contracts {
            fc.encode_to(e);
        }
        e.write_prefix(txn.file_contract_revisions.len());
        for fcr in &txn.file_contract_revisions {
            fcr.encode_to(e);
        }
        e.write_prefix(txn.storage_proofs.len());
        for sp in &txn.storage_proofs {
            sp.encode_to(e);
        }
        e.write_prefix(txn.siafund_inputs.len());
        for sfi in &txn.siafund_inputs {
            e.write(self.replay_prefix());
            sfi.encode_to(e);
        }
        e.write_prefix(txn.siafund_outputs.len());
        for sfo in &txn.siafund_outputs {
            sfo.encode_to(e);
        }
        e.write_prefix(txn.miner_fees.len());
        for fee in &txn.miner_fees {
            fee.encode_to(e);
        }
        e.write_prefix(txn.arbitrary_data.len());
        for data in &txn.arbitrary_data {
            e.write_bytes(data);
        }

        parent_id.encode_to(e);
        e.write_u64(pubkey_index);
        e.write_u64(timelock);

        for &i in covered_sigs {
            txn.signatures[i as usize].encode_to(e);
        }

        h.sum()
    }

    /// The hash of the transaction fields selected by `cf`, in the
    /// selector's order and without collection length prefixes.
    ///
    /// # Panics
    ///
    /// Panics if `cf` references fields not present in `txn`; covering
    /// missing fields is a programmer error, not a validation failure.
    pub fn partial_sig_hash(&self, txn: &Transaction, cf: &CoveredFields) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();

        for &i in &cf.siacoin_inputs {
            e.write(self.replay_prefix());
            txn.siacoin_inputs[i as usize].encode_to(e);
        }
        for &i in &cf.siacoin_outputs {
            txn.siacoin_outputs[i as usize].encode_to(e);
        }
        for &i in &cf.file_contracts {
            txn.file_contracts[i as usize].encode_to(e);
        }
        for &i in &cf.file_contract_revisions {
            txn.file_contract_revisions[i as usize].encode_to(e);
        }
        for &i in &cf.storage_proofs {
            txn.storage_proofs[i as usize].encode_to(e);
        }
        for &i in &cf.siafund_inputs {
            e.write(self.replay_prefix());
            txn.siafund_inputs[i as usize].encode_to(e);
        }
        for &i in &cf.siafund_outputs {
            txn.siafund_outputs[i as usize].encode_to(e);
        }
        for &i in &cf.miner_fees {
            txn.miner_fees[i as usize].encode_to(e);
        }
        for &i in &cf.arbitrary_data {
            e.write_bytes(&txn.arbitrary_data[i as usize]);
        }
        for &i in &cf.signatures {
            txn.signatures[i as usize].encode_to(e);
        }

        h.sum()
    }

    /// The hash that must be signed by each v2 transaction input. Inputs
    /// contribute only their parent IDs, so the hash is stable while proofs
    /// are updated.
    pub fn input_sig_hash(&self, txn: &V2Transaction) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();
        e.write(b"sia/id/transaction|");
        e.write_u8(self.v2_replay_prefix());
        e.write_prefix(txn.siacoin_inputs.len());
        for sci in &txn.siacoin_inputs {
            sci.parent.id.encode_to(e);
        }
        e.write_prefix(txn.siacoin_outputs.len());
        for sco in &txn.siacoin_outputs {
            sco.encode_to(e);
        }
        e.write_prefix(txn.siafund_inputs.len());
        for sfi in &txn.siafund_inputs {
            sfi.parent.id.encode_to(e);
        }
        e.write_prefix(txn.siafund_outputs.len());
        for sfo in &txn.siafund_outputs {
            sfo.encode_to(e);
        }
        e.write_prefix(txn.file_contracts.len());
        for fc in &txn.file_contracts {
            fc.encode_to(e);
        }
        e.write_prefix(txn.file_contract_revisions.len());
        for fcr in &txn.file_contract_revisions {
            fcr.parent.id.encode_to(e);
            fcr.revision.encode_to(e);
        }
        e.write_prefix(txn.file_contract_resolutions.len());
        for fcr in &txn.file_contract_resolutions {
            fcr.parent.id.encode_to(e);
            // normalize the proof before hashing
            if let V2Resolution::StorageProof(sp) = &fcr.resolution {
                let mut sp = sp.clone();
                sp.proof_index.state_element.merkle_proof.clear();
                V2Resolution::StorageProof(sp).encode_payload(e);
            } else {
                fcr.resolution.encode_payload(e);
            }
        }
        for a in &txn.attestations {
            a.encode_to(e);
        }
        e.write_bytes(&txn.arbitrary_data);
        e.write_bool(txn.new_foundation_address.is_some());
        if let Some(addr) = &txn.new_foundation_address {
            addr.encode_to(e);
        }
        txn.miner_fee.encode_to(e);
        h.sum()
    }

    /// The hash that the renter and host must sign for a v2 file contract
    /// or contract revision. Covers the contract body, not its signatures.
    pub fn contract_sig_hash(&self, fc: &V2FileContract) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();
        e.write(b"sia/sig/filecontract|");
        e.write_u8(self.v2_replay_prefix());
        e.write_u64(fc.filesize);
        fc.file_merkle_root.encode_to(e);
        e.write_u64(fc.proof_height);
        e.write_u64(fc.expiration_height);
        fc.renter_output.encode_to(e);
        fc.host_output.encode_to(e);
        fc.missed_host_value.encode_to(e);
        fc.renter_public_key.encode_to(e);
        fc.host_public_key.encode_to(e);
        e.write_u64(fc.revision_number);
        h.sum()
    }

    /// The hash that the renter and host must sign for a v2 file contract
    /// renewal.
    pub fn renewal_sig_hash(&self, fcr: &V2FileContractRenewal) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();
        e.write(b"sia/sig/filecontractrenewal|");
        e.write_u8(self.v2_replay_prefix());
        fcr.final_revision.encode_to(e);
        fcr.initial_revision.encode_to(e);
        fcr.renter_rollover.encode_to(e);
        fcr.host_rollover.encode_to(e);
        h.sum()
    }

    /// The hash that must be signed for an attestation.
    pub fn attestation_sig_hash(&self, a: &Attestation) -> Hash256 {
        let mut h = Hasher::new();
        let e = h.encoder();
        e.write(b"sia/sig/attestation|");
        e.write_u8(self.v2_replay_prefix());
        a.public_key.encode_to(e);
        e.write_string(&a.key);
        e.write_bytes(&a.value);
        h.sum()
    }

    /// The commitment hash for a child block, binding it to this state, the
    /// miner address, and the exact transaction sequence (v1 transactions
    /// followed by v2, each in list order).
    pub fn commitment(
        &self,
        miner_addr: Address,
        txns: &[Transaction],
        v2txns: &[V2Transaction],
    ) -> Hash256 {
        let mut h = Hasher::new();

        // hash the state
        self.encode_to(h.encoder());
        let state_hash = h.sum();

        // hash the transactions
        let mut acc = MerkleAccumulator::new();
        for txn in txns {
            h.reset();
            txn.encode_to(h.encoder());
            acc.add_leaf(h.sum());
        }
        for txn in v2txns {
            h.reset();
            txn.encode_to(h.encoder());
            acc.add_leaf(h.sum());
        }
        let txns_hash = acc.root();

        // concatenate the hashes and the miner address
        h.reset();
        let e = h.encoder();
        e.write(b"sia/commitment|");
        e.write_u8(self.v2_replay_prefix());
        state_hash.encode_to(e);
        miner_addr.encode_to(e);
        txns_hash.encode_to(e);
        h.sum()
    }
}
