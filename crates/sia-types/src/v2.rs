//! Second-generation ("v2") transaction types.
//!
//! v2 transactions reference their spent outputs by element, carrying the
//! accumulator proofs inline, so they validate without a supplement. Their
//! signature preimages are domain-tagged and cover parent IDs rather than
//! full parents.

use crate::currency::Currency;
use crate::encoding::{Decodable, DecodeError, Decoder, Encodable, Encoder};
use crate::hash::{Address, FileContractID, Hash256, PublicKey, Signature};
use crate::transactions::{SiacoinElement, SiacoinOutput, SiafundElement, StateElement};
use crate::ChainIndex;
use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

/// A storage agreement between a renter and a host, revisable by mutual
/// signature until its proof height.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2FileContract {
    pub filesize: u64,
    pub file_merkle_root: Hash256,
    pub proof_height: u64,
    pub expiration_height: u64,
    pub renter_output: SiacoinOutput,
    pub host_output: SiacoinOutput,
    pub missed_host_value: Currency,
    pub renter_public_key: PublicKey,
    pub host_public_key: PublicKey,
    pub revision_number: u64,
    pub renter_signature: Signature,
    pub host_signature: Signature,
}

/// A v2 file contract along with its accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2FileContractElement {
    pub id: FileContractID,
    pub state_element: StateElement,
    pub v2_file_contract: V2FileContract,
}

/// A chain index along with its accumulator state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainIndexElement {
    pub id: crate::BlockID,
    pub state_element: StateElement,
    pub chain_index: ChainIndex,
}

/// A v2 siacoin input, spending the referenced element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2SiacoinInput {
    pub parent: SiacoinElement,
    pub signatures: Vec<Signature>,
}

/// A v2 siafund input, spending the referenced element.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2SiafundInput {
    pub parent: SiafundElement,
    pub claim_address: Address,
    pub signatures: Vec<Signature>,
}

/// An updated version of an unresolved v2 file contract.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2FileContractRevision {
    pub parent: V2FileContractElement,
    pub revision: V2FileContract,
}

/// A Merkle opening of one 64-byte leaf of a contracted file, anchored to
/// the chain index at the contract's proof height.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2StorageProof {
    pub proof_index: ChainIndexElement,
    #[serde(with = "crate::serde_leaf")]
    pub leaf: [u8; 64],
    pub proof: Vec<Hash256>,
}

impl Default for V2StorageProof {
    fn default() -> Self {
        V2StorageProof {
            proof_index: ChainIndexElement::default(),
            leaf: [0; 64],
            proof: Vec::new(),
        }
    }
}

/// The renewal of a v2 file contract: the final revision of the old
/// contract, the initial revision of the new one, and the collateral rolled
/// over between them.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2FileContractRenewal {
    pub final_revision: V2FileContract,
    pub initial_revision: V2FileContract,
    pub renter_rollover: Currency,
    pub host_rollover: Currency,
    pub renter_signature: Signature,
    pub host_signature: Signature,
}

/// The ways a v2 file contract can leave the accumulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum V2Resolution {
    /// The contract was renewed into a successor.
    Renewal(V2FileContractRenewal),
    /// The host proved possession of the file.
    StorageProof(V2StorageProof),
    /// Both parties signed off on a final revision.
    Finalization(V2FileContract),
    /// The contract expired without a proof.
    Expiration,
}

impl V2Resolution {
    /// Encodes the resolution payload without its variant tag; signature
    /// preimages cover the payload only.
    pub fn encode_payload<W: Write>(&self, e: &mut Encoder<W>) {
        match self {
            V2Resolution::Renewal(r) => r.encode_to(e),
            V2Resolution::StorageProof(sp) => sp.encode_to(e),
            V2Resolution::Finalization(fc) => fc.encode_to(e),
            V2Resolution::Expiration => {}
        }
    }
}

/// A v2 file contract resolution, binding the resolved element to its
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2FileContractResolution {
    pub parent: V2FileContractElement,
    pub resolution: V2Resolution,
}

/// A signed key-value statement published on-chain.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub public_key: PublicKey,
    pub key: String,
    pub value: Vec<u8>,
    pub signature: Signature,
}

/// A second-generation transaction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct V2Transaction {
    pub siacoin_inputs: Vec<V2SiacoinInput>,
    pub siacoin_outputs: Vec<SiacoinOutput>,
    pub siafund_inputs: Vec<V2SiafundInput>,
    pub siafund_outputs: Vec<crate::transactions::SiafundOutput>,
    pub file_contracts: Vec<V2FileContract>,
    pub file_contract_revisions: Vec<V2FileContractRevision>,
    pub file_contract_resolutions: Vec<V2FileContractResolution>,
    pub attestations: Vec<Attestation>,
    pub arbitrary_data: Vec<u8>,
    pub new_foundation_address: Option<Address>,
    pub miner_fee: Currency,
}

impl Encodable for V2FileContract {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        e.write_u64(self.filesize);
        self.file_merkle_root.encode_to(e);
        e.write_u64(self.proof_height);
        e.write_u64(self.expiration_height);
        self.renter_output.encode_to(e);
        self.host_output.encode_to(e);
        self.missed_host_value.encode_to(e);
        self.renter_public_key.encode_to(e);
        self.host_public_key.encode_to(e);
        e.write_u64(self.revision_number);
        self.renter_signature.encode_to(e);
        self.host_signature.encode_to(e);
    }
}

impl Decodable for V2FileContract {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2FileContract {
            filesize: d.read_u64(),
            file_merkle_root: Hash256::decode_from(d),
            proof_height: d.read_u64(),
            expiration_height: d.read_u64(),
            renter_output: SiacoinOutput::decode_from(d),
            host_output: SiacoinOutput::decode_from(d),
            missed_host_value: Currency::decode_from(d),
            renter_public_key: PublicKey::decode_from(d),
            host_public_key: PublicKey::decode_from(d),
            revision_number: d.read_u64(),
            renter_signature: Signature::decode_from(d),
            host_signature: Signature::decode_from(d),
        }
    }
}

impl Encodable for V2FileContractElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.id.encode_to(e);
        self.state_element.encode_to(e);
        self.v2_file_contract.encode_to(e);
    }
}

impl Decodable for V2FileContractElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2FileContractElement {
            id: FileContractID::decode_from(d),
            state_element: StateElement::decode_from(d),
            v2_file_contract: V2FileContract::decode_from(d),
        }
    }
}

impl Encodable for ChainIndexElement {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.id.encode_to(e);
        self.state_element.encode_to(e);
        self.chain_index.encode_to(e);
    }
}

impl Decodable for ChainIndexElement {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        ChainIndexElement {
            id: crate::BlockID::decode_from(d),
            state_element: StateElement::decode_from(d),
            chain_index: ChainIndex::decode_from(d),
        }
    }
}

impl Encodable for V2SiacoinInput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent.encode_to(e);
        self.signatures.encode_to(e);
    }
}

impl Decodable for V2SiacoinInput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2SiacoinInput {
            parent: SiacoinElement::decode_from(d),
            signatures: Vec::decode_from(d),
        }
    }
}

impl Encodable for V2SiafundInput {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent.encode_to(e);
        self.claim_address.encode_to(e);
        self.signatures.encode_to(e);
    }
}

impl Decodable for V2SiafundInput {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2SiafundInput {
            parent: SiafundElement::decode_from(d),
            claim_address: Address::decode_from(d),
            signatures: Vec::decode_from(d),
        }
    }
}

impl Encodable for V2FileContractRevision {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent.encode_to(e);
        self.revision.encode_to(e);
    }
}

impl Decodable for V2FileContractRevision {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2FileContractRevision {
            parent: V2FileContractElement::decode_from(d),
            revision: V2FileContract::decode_from(d),
        }
    }
}

impl Encodable for V2StorageProof {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.proof_index.encode_to(e);
        e.write(&self.leaf);
        self.proof.encode_to(e);
    }
}

impl Decodable for V2StorageProof {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        let proof_index = ChainIndexElement::decode_from(d);
        let mut leaf = [0; 64];
        d.read(&mut leaf);
        V2StorageProof {
            proof_index,
            leaf,
            proof: Vec::decode_from(d),
        }
    }
}

impl Encodable for V2FileContractRenewal {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.final_revision.encode_to(e);
        self.initial_revision.encode_to(e);
        self.renter_rollover.encode_to(e);
        self.host_rollover.encode_to(e);
        self.renter_signature.encode_to(e);
        self.host_signature.encode_to(e);
    }
}

impl Decodable for V2FileContractRenewal {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2FileContractRenewal {
            final_revision: V2FileContract::decode_from(d),
            initial_revision: V2FileContract::decode_from(d),
            renter_rollover: Currency::decode_from(d),
            host_rollover: Currency::decode_from(d),
            renter_signature: Signature::decode_from(d),
            host_signature: Signature::decode_from(d),
        }
    }
}

impl Encodable for V2Resolution {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        let tag = match self {
            V2Resolution::Renewal(_) => 0,
            V2Resolution::StorageProof(_) => 1,
            V2Resolution::Finalization(_) => 2,
            V2Resolution::Expiration => 3,
        };
        e.write_u8(tag);
        self.encode_payload(e);
    }
}

impl Decodable for V2Resolution {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        match d.read_u8() {
            0 => V2Resolution::Renewal(V2FileContractRenewal::decode_from(d)),
            1 => V2Resolution::StorageProof(V2StorageProof::decode_from(d)),
            2 => V2Resolution::Finalization(V2FileContract::decode_from(d)),
            3 => V2Resolution::Expiration,
            tag => {
                d.fail(DecodeError::InvalidTag(tag));
                V2Resolution::Expiration
            }
        }
    }
}

impl Encodable for V2FileContractResolution {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.parent.encode_to(e);
        self.resolution.encode_to(e);
    }
}

impl Decodable for V2FileContractResolution {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2FileContractResolution {
            parent: V2FileContractElement::decode_from(d),
            resolution: V2Resolution::decode_from(d),
        }
    }
}

impl Encodable for Attestation {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.public_key.encode_to(e);
        e.write_string(&self.key);
        e.write_bytes(&self.value);
        self.signature.encode_to(e);
    }
}

impl Decodable for Attestation {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        Attestation {
            public_key: PublicKey::decode_from(d),
            key: d.read_string(),
            value: d.read_bytes(),
            signature: Signature::decode_from(d),
        }
    }
}

impl Encodable for V2Transaction {
    fn encode_to<W: Write>(&self, e: &mut Encoder<W>) {
        self.siacoin_inputs.encode_to(e);
        self.siacoin_outputs.encode_to(e);
        self.siafund_inputs.encode_to(e);
        self.siafund_outputs.encode_to(e);
        self.file_contracts.encode_to(e);
        self.file_contract_revisions.encode_to(e);
        self.file_contract_resolutions.encode_to(e);
        self.attestations.encode_to(e);
        e.write_bytes(&self.arbitrary_data);
        e.write_bool(self.new_foundation_address.is_some());
        if let Some(addr) = &self.new_foundation_address {
            addr.encode_to(e);
        }
        self.miner_fee.encode_to(e);
    }
}

impl Decodable for V2Transaction {
    fn decode_from<R: Read>(d: &mut Decoder<R>) -> Self {
        V2Transaction {
            siacoin_inputs: Vec::decode_from(d),
            siacoin_outputs: Vec::decode_from(d),
            siafund_inputs: Vec::decode_from(d),
            siafund_outputs: Vec::decode_from(d),
            file_contracts: Vec::decode_from(d),
            file_contract_revisions: Vec::decode_from(d),
            file_contract_resolutions: Vec::decode_from(d),
            attestations: Vec::decode_from(d),
            arbitrary_data: d.read_bytes(),
            new_foundation_address: if d.read_bool() {
                Some(Address::decode_from(d))
            } else {
                None
            },
            miner_fee: Currency::decode_from(d),
        }
    }
}
