//! Legacy ("v1") transaction types and accumulator elements.
//!
//! Field order within each struct is canonical: the binary codec walks the
//! fields in declaration order, and the signature-hash preimages are built
//! from the same encodings.

use crate::currency::Currency;
use crate::encoding::{Decodable, Decoder, Encodable, Encoder};
use crate::hash::{Address, FileContractID, Hash256, SiacoinOutputID, SiafundOutputID};
use crate::specifier::Specifier;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A public key with its signature algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockKey {
    /// The signature algorithm, e.g. `Specifier::new("ed25519")`.
    pub algorithm: Specifier,
    /// The raw key material.
    pub key: Vec<u8>,
}

/// The conditions under which an output may be spent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnlockConditions {
    pub timelock: u64,
    pub public_keys: Vec<UnlockKey>,
    pub signatures_required: u64,
}

/// A siacoin input spends a previously-created siacoin output.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinInput {
    pub parent_id: SiacoinOutputID,
    pub unlock_conditions: UnlockConditions,
}

/// A volume of siacoins sent to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinOutput {
    pub value: Currency,
    pub address: Address,
}

/// A siafund input spends a previously-created siafund output. The claim
/// address receives the siacoins that have accrued to the siafunds.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundInput {
    pub parent_id: SiafundOutputID,
    pub unlock_conditions: UnlockConditions,
    pub claim_address: Address,
}

/// A number of siafunds sent to an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundOutput {
    pub value: u64,
    pub address: Address,
}

/// A storage agreement between a renter and a host. The host must prove
/// possession of the file within the proof window or forfeit the missed
/// outputs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContract {
    pub filesize: u64,
    pub file_merkle_root: Hash256,
    pub window_start: u64,
    pub window_end: u64,
    pub payout: Currency,
    pub valid_proof_outputs: Vec<SiacoinOutput>,
    pub missed_proof_outputs: Vec<SiacoinOutput>,
    pub unlock_hash: Address,
    pub revision_number: u64,
}

/// An updated version of an unresolved file contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContractRevision {
    pub parent_id: FileContractID,
    pub unlock_conditions: UnlockConditions,
    pub filesize: u64,
    pub file_merkle_root: Hash256,
    pub window_start: u64,
    pub window_end: u64,
    pub valid_proof_outputs: Vec<SiacoinOutput>,
    pub missed_proof_outputs: Vec<SiacoinOutput>,
    pub unlock_hash: Address,
    pub revision_number: u64,
}

/// A Merkle opening of one 64-byte leaf of a contracted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageProof {
    pub parent_id: FileContractID,
    #[serde(with = "crate::serde_leaf")]
    pub leaf: [u8; 64],
    pub proof: Vec<Hash256>,
}

impl Default for StorageProof {
    fn default() -> Self {
        StorageProof {
            parent_id: FileContractID::default(),
            leaf: [0; 64],
            proof: Vec::new(),
        }
    }
}

/// Indices into the fields of a transaction that a signature covers. If
/// `whole_transaction` is set, all fields except signatures are covered and
/// the index lists (other than `signatures`) must be empty.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoveredFields {
    pub whole_transaction: bool,
    pub siacoin_inputs: Vec<u64>,
    pub siacoin_outputs: Vec<u64>,
    pub file_contracts: Vec<u64>,
    pub file_contract_revisions: Vec<u64>,
    pub storage_proofs: Vec<u64>,
    pub siafund_inputs: Vec<u64>,
    pub siafund_outputs: Vec<u64>,
    pub miner_fees: Vec<u64>,
    pub arbitrary_data: Vec<u64>,
    pub signatures: Vec<u64>,
}

/// A signature over a subset of a transaction's fields.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionSignature {
    pub parent_id: Hash256,
    pub public_key_index: u64,
    pub timelock: u64,
    pub covered_fields: CoveredFields,
    pub signature: Vec<u8>,
}

/// A legacy transaction: a set of inputs, outputs, contract operations, and
/// the signatures authorizing them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub siacoin_inputs: Vec<SiacoinInput>,
    pub siacoin_outputs: Vec<SiacoinOutput>,
    pub file_contracts: Vec<FileContract>,
    pub file_contract_revisions: Vec<FileContractRevision>,
    pub storage_proofs: Vec<StorageProof>,
    pub siafund_inputs: Vec<SiafundInput>,
    pub siafund_outputs: Vec<SiafundOutput>,
    pub miner_fees: Vec<Currency>,
    pub arbitrary_data: Vec<Vec<u8>>,
    pub signatures: Vec<TransactionSignature>,
}

// element types: objects tracked by the state accumulator, carried alongside
// v1 transactions by supplements

/// The accumulator bookkeeping shared by all element types.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateElement {
    pub leaf_index: u64,
    pub merkle_proof: Vec<Hash256>,
}

/// A siacoin output along with its accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiacoinElement {
    pub id: SiacoinOutputID,
    pub state_element: StateElement,
    pub siacoin_output: SiacoinOutput,
    pub maturity_height: u64,
}

/// A siafund output along with its accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiafundElement {
    pub id: SiafundOutputID,
    pub state_element: StateElement,
    pub siafund_output: SiafundOutput,
    pub claim_start: Currency,
}

/// A v1 file contract along with its accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileContractElement {
    pub id: FileContractID,
    pub state_element: StateElement,
    pub file_contract: FileContract,
}

impl Encodable for UnlockKey {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.algorithm.encode_to(e);
        e.write_bytes(&self.key);
    }
}

impl Decodable for UnlockKey {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        UnlockKey {
            algorithm: Specifier::decode_from(d),
            key: d.read_bytes(),
        }
    }
}

impl Encodable for UnlockConditions {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.timelock);
        self.public_keys.encode_to(e);
        e.write_u64(self.signatures_required);
    }
}

impl Decodable for UnlockConditions {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        UnlockConditions {
            timelock: d.read_u64(),
            public_keys: Vec::decode_from(d),
            signatures_required: d.read_u64(),
        }
    }
}

impl Encodable for SiacoinInput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent_id.encode_to(e);
        self.unlock_conditions.encode_to(e);
    }
}

impl Decodable for SiacoinInput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiacoinInput {
            parent_id: SiacoinOutputID::decode_from(d),
            unlock_conditions: UnlockConditions::decode_from(d),
        }
    }
}

impl Encodable for SiacoinOutput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.value.encode_to(e);
        self.address.encode_to(e);
    }
}

impl Decodable for SiacoinOutput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiacoinOutput {
            value: Currency::decode_from(d),
            address: Address::decode_from(d),
        }
    }
}

impl Encodable for SiafundInput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent_id.encode_to(e);
        self.unlock_conditions.encode_to(e);
        self.claim_address.encode_to(e);
    }
}

impl Decodable for SiafundInput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiafundInput {
            parent_id: SiafundOutputID::decode_from(d),
            unlock_conditions: UnlockConditions::decode_from(d),
            claim_address: Address::decode_from(d),
        }
    }
}

impl Encodable for SiafundOutput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.value);
        self.address.encode_to(e);
    }
}

impl Decodable for SiafundOutput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiafundOutput {
            value: d.read_u64(),
            address: Address::decode_from(d),
        }
    }
}

impl Encodable for FileContract {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.filesize);
        self.file_merkle_root.encode_to(e);
        e.write_u64(self.window_start);
        e.write_u64(self.window_end);
        self.payout.encode_to(e);
        self.valid_proof_outputs.encode_to(e);
        self.missed_proof_outputs.encode_to(e);
        self.unlock_hash.encode_to(e);
        e.write_u64(self.revision_number);
    }
}

impl Decodable for FileContract {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        FileContract {
            filesize: d.read_u64(),
            file_merkle_root: Hash256::decode_from(d),
            window_start: d.read_u64(),
            window_end: d.read_u64(),
            payout: Currency::decode_from(d),
            valid_proof_outputs: Vec::decode_from(d),
            missed_proof_outputs: Vec::decode_from(d),
            unlock_hash: Address::decode_from(d),
            revision_number: d.read_u64(),
        }
    }
}

impl Encodable for FileContractRevision {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent_id.encode_to(e);
        self.unlock_conditions.encode_to(e);
        e.write_u64(self.filesize);
        self.file_merkle_root.encode_to(e);
        e.write_u64(self.window_start);
        e.write_u64(self.window_end);
        self.valid_proof_outputs.encode_to(e);
        self.missed_proof_outputs.encode_to(e);
        self.unlock_hash.encode_to(e);
        e.write_u64(self.revision_number);
    }
}

impl Decodable for FileContractRevision {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        FileContractRevision {
            parent_id: FileContractID::decode_from(d),
            unlock_conditions: UnlockConditions::decode_from(d),
            filesize: d.read_u64(),
            file_merkle_root: Hash256::decode_from(d),
            window_start: d.read_u64(),
            window_end: d.read_u64(),
            valid_proof_outputs: Vec::decode_from(d),
            missed_proof_outputs: Vec::decode_from(d),
            unlock_hash: Address::decode_from(d),
            revision_number: d.read_u64(),
        }
    }
}

impl Encodable for StorageProof {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent_id.encode_to(e);
        e.write(&self.leaf);
        self.proof.encode_to(e);
    }
}

impl Decodable for StorageProof {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let parent_id = FileContractID::decode_from(d);
        let mut leaf = [0; 64];
        d.read(&mut leaf);
        StorageProof {
            parent_id,
            leaf,
            proof: Vec::decode_from(d),
        }
    }
}

fn write_index_list<W: Write>(e: &mut Encoder<W>, list: &[u64]) {
    e.write_prefix(list.len());
    for &i in list {
        e.write_u64(i);
    }
}

fn read_index_list<R: Read>(d: &mut Decoder<R>) -> Vec<u64> {
    let n = d.read_prefix();
    let mut list = Vec::with_capacity(n);
    for _ in 0..n {
        if d.is_err() {
            break;
        }
        list.push(d.read_u64());
    }
    list
}

impl Encodable for CoveredFields {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_bool(self.whole_transaction);
        write_index_list(e, &self.siacoin_inputs);
        write_index_list(e, &self.siacoin_outputs);
        write_index_list(e, &self.file_contracts);
        write_index_list(e, &self.file_contract_revisions);
        write_index_list(e, &self.storage_proofs);
        write_index_list(e, &self.siafund_inputs);
        write_index_list(e, &self.siafund_outputs);
        write_index_list(e, &self.miner_fees);
        write_index_list(e, &self.arbitrary_data);
        write_index_list(e, &self.signatures);
    }
}

impl Decodable for CoveredFields {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        CoveredFields {
            whole_transaction: d.read_bool(),
            siacoin_inputs: read_index_list(d),
            siacoin_outputs: read_index_list(d),
            file_contracts: read_index_list(d),
            file_contract_revisions: read_index_list(d),
            storage_proofs: read_index_list(d),
            siafund_inputs: read_index_list(d),
            siafund_outputs: read_index_list(d),
            miner_fees: read_index_list(d),
            arbitrary_data: read_index_list(d),
            signatures: read_index_list(d),
        }
    }
}

impl Encodable for TransactionSignature {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent_id.encode_to(e);
        e.write_u64(self.public_key_index);
        e.write_u64(self.timelock);
        self.covered_fields.encode_to(e);
        e.write_bytes(&self.signature);
    }
}

impl Decodable for TransactionSignature {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        TransactionSignature {
            parent_id: Hash256::decode_from(d),
            public_key_index: d.read_u64(),
            timelock: d.read_u64(),
            covered_fields: CoveredFields::decode_from(d),
            signature: d.read_bytes(),
        }
    }
}

impl Encodable for Transaction {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.siacoin_inputs.encode_to(e);
        self.siacoin_outputs.encode_to(e);
        self.file_contracts.encode_to(e);
        self.file_contract_revisions.encode_to(e);
        self.storage_proofs.encode_to(e);
        self.siafund_inputs.encode_to(e);
        self.siafund_outputs.encode_to(e);
        self.miner_fees.encode_to(e);
        e.write_prefix(self.arbitrary_data.len());
        for data in &self.arbitrary_data {
            e.write_bytes(data);
        }
        self.signatures.encode_to(e);
    }
}

impl Decodable for Transaction {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let siacoin_inputs = Vec::decode_from(d);
        let siacoin_outputs = Vec::decode_from(d);
        let file_contracts = Vec::decode_from(d);
        let file_contract_revisions = Vec::decode_from(d);
        let storage_proofs = Vec::decode_from(d);
        let siafund_inputs = Vec::decode_from(d);
        let siafund_outputs = Vec::decode_from(d);
        let miner_fees = Vec::decode_from(d);
        let n = d.read_prefix();
        let mut arbitrary_data = Vec::with_capacity(n);
        for _ in 0..n {
            if d.is_err() {
                break;
            }
            arbitrary_data.push(d.read_bytes());
        }
        Transaction {
            siacoin_inputs,
            siacoin_outputs,
            file_contracts,
            file_contract_revisions,
            storage_proofs,
            siafund_inputs,
            siafund_outputs,
            miner_fees,
            arbitrary_data,
            signatures: Vec::decode_from(d),
        }
    }
}

impl Encodable for StateElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.leaf_index);
        self.merkle_proof.encode_to(e);
    }
}

impl Decodable for StateElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        StateElement {
            leaf_index: d.read_u64(),
            merkle_proof: Vec::decode_from(d),
        }
    }
}

impl Encodable for SiacoinElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.id.encode_to(e);
        self.state_element.encode_to(e);
        self.siacoin_output.encode_to(e);
        e.write_u64(self.maturity_height);
    }
}

impl Decodable for SiacoinElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiacoinElement {
            id: SiacoinOutputID::decode_from(d),
            state_element: StateElement::decode_from(d),
            siacoin_output: SiacoinOutput::decode_from(d),
            maturity_height: d.read_u64(),
        }
    }
}

impl Encodable for SiafundElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.id.encode_to(e);
        self.state_element.encode_to(e);
        self.siafund_output.encode_to(e);
        self.claim_start.encode_to(e);
    }
}

impl Decodable for SiafundElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        SiafundElement {
            id: SiafundOutputID::decode_from(d),
            state_element: StateElement::decode_from(d),
            siafund_output: SiafundOutput::decode_from(d),
            claim_start: Currency::decode_from(d),
        }
    }
}

impl Encodable for FileContractElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.id.encode_to(e);
        self.state_element.encode_to(e);
        self.file_contract.encode_to(e);
    }
}

impl Decodable for FileContractElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        FileContractElement {
            id: FileContractID::decode_from(d),
            state_element: StateElement::decode_from(d),
            file_contract: FileContract::decode_from(d),
        }
    }
}
