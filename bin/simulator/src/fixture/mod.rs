//! Describes the state a simulation runs against in a human readable format.
//!
//! Field elements are given as plain integers and words as arrays of four integers.

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use miden_objects::{Felt, Word};
use serde::Deserialize;
use shroud_oracle::ViewDataOracle;
use shroud_oracle::domain::address::{CompleteAddress, ContractAddress, PublicKey, SecretKey};
use shroud_oracle::domain::auth_witness::AuthWitness;
use shroud_oracle::domain::block_data::HistoricBlockData;
use shroud_oracle::domain::field::FIELD_MODULUS;
use shroud_oracle::domain::message::{L1ToL2Message, L1ToL2MessageWitness};
use shroud_oracle::domain::note::NoteRecord;
use shroud_oracle::domain::nullifier::SiloedNullifier;
use shroud_oracle::store::{MemoryPublicState, MemoryStore};

#[cfg(test)]
mod tests;

type WordConfig = [FeltConfig; 4];
type PointConfig = [FeltConfig; 2];

fn word(raw: WordConfig) -> Word {
    raw.map(Felt::from).into()
}

fn point([x, y]: PointConfig) -> PublicKey {
    PublicKey::new(x.into(), y.into())
}

fn contract_address(raw: FeltConfig) -> ContractAddress {
    ContractAddress::new(raw.into())
}

fn felts(raw: Vec<FeltConfig>) -> Vec<Felt> {
    raw.into_iter().map(Felt::from).collect()
}

/// Wrapper type used for the configuration representation of field elements.
///
/// Values are plain integers and must be canonical. A value at or above the field modulus is
/// rejected while loading instead of being reduced into a different element.
#[derive(Debug, Clone, Copy)]
struct FeltConfig(Felt);

impl From<FeltConfig> for Felt {
    fn from(value: FeltConfig) -> Self {
        value.0
    }
}

impl<'de> Deserialize<'de> for FeltConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = u64::deserialize(deserializer)?;
        if raw >= FIELD_MODULUS {
            return Err(serde::de::Error::custom(format!(
                "{raw} is not a canonical field element, the field modulus is {FIELD_MODULUS}"
            )));
        }
        Ok(Self(Felt::new(raw)))
    }
}

// SIMULATION FIXTURE
// ================================================================================================

/// Everything a [`ViewDataOracle`] needs to answer queries of one simulation.
///
/// Omitting `public_storage` entirely yields an oracle without public state access, while an
/// empty list yields one whose every slot is missing.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationFixture {
    /// Contract whose private call is simulated.
    contract: FeltConfig,
    block_data: BlockDataConfig,
    /// Witnesses supplied with the simulation itself.
    #[serde(default)]
    auth_witness: Vec<AuthWitnessConfig>,
    #[serde(default)]
    store: StoreConfig,
    public_storage: Option<Vec<PublicSlotConfig>>,
}

/// The pinned snapshot of tree roots.
#[derive(Debug, Clone, Deserialize)]
struct BlockDataConfig {
    note_hash_tree_root: WordConfig,
    nullifier_tree_root: WordConfig,
    contract_tree_root: WordConfig,
    l1_to_l2_messages_tree_root: WordConfig,
    public_data_tree_root: WordConfig,
    global_variables_hash: WordConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct AuthWitnessConfig {
    request_hash: FeltConfig,
    witness: Vec<FeltConfig>,
}

/// Contents of the local store.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct StoreConfig {
    secret_key: Vec<SecretKeyConfig>,
    complete_address: Vec<CompleteAddressConfig>,
    auth_witness: Vec<AuthWitnessConfig>,
    note: Vec<NoteConfig>,
    nullifier_tree: Vec<NullifierTreeConfig>,
    l1_to_l2_message: Vec<MessageConfig>,
    portal: Vec<PortalConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct SecretKeyConfig {
    contract: FeltConfig,
    owner: PointConfig,
    key: WordConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct CompleteAddressConfig {
    address: FeltConfig,
    public_key: PointConfig,
    partial_address: FeltConfig,
}

/// A decrypted note. Notes without a `tree_index` are pending.
#[derive(Debug, Clone, Deserialize)]
struct NoteConfig {
    contract: FeltConfig,
    storage_slot: FeltConfig,
    preimage: Vec<FeltConfig>,
    nullifier: FeltConfig,
    tree_index: Option<u64>,
    owner: PointConfig,
}

/// A nullifier tree snapshot. Leaves are given by their emitting contract and inner nullifier and
/// siloed while loading.
#[derive(Debug, Clone, Deserialize)]
struct NullifierTreeConfig {
    root: WordConfig,
    #[serde(default)]
    leaf: Vec<NullifierLeafConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct NullifierLeafConfig {
    contract: FeltConfig,
    inner_nullifier: FeltConfig,
    index: u64,
}

#[derive(Debug, Clone, Deserialize)]
struct MessageConfig {
    key: FeltConfig,
    sender: FeltConfig,
    recipient: FeltConfig,
    content: FeltConfig,
    secret_hash: FeltConfig,
    deadline: u32,
    fee: u64,
    index: u64,
    #[serde(default)]
    sibling_path: Vec<WordConfig>,
}

#[derive(Debug, Clone, Deserialize)]
struct PortalConfig {
    address: FeltConfig,
    portal: FeltConfig,
}

#[derive(Debug, Clone, Deserialize)]
struct PublicSlotConfig {
    contract: FeltConfig,
    slot: FeltConfig,
    value: FeltConfig,
}

impl SimulationFixture {
    /// Loads a fixture from a TOML file, applying `SHROUD_` environment overrides.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        shroud_utils::config::load_config(path)
            .with_context(|| format!("failed to load simulation fixture {}", path.display()))
    }

    /// Builds the oracle and, if configured, the public state it reads from.
    pub fn into_parts(self) -> (ViewDataOracle<MemoryStore>, Option<MemoryPublicState>) {
        let SimulationFixture {
            contract,
            block_data,
            auth_witness,
            store,
            public_storage,
        } = self;

        let contract = contract_address(contract);
        let oracle = ViewDataOracle::new(
            contract,
            block_data.into_block_data(),
            auth_witness.into_iter().map(AuthWitnessConfig::into_witness).collect(),
            Arc::new(store.into_store()),
        );
        let public_state = public_storage.map(|slots| {
            let mut state = MemoryPublicState::new();
            for PublicSlotConfig { contract, slot, value } in slots {
                state.insert(contract_address(contract), slot.into(), value.into());
            }
            state
        });

        (oracle, public_state)
    }
}

impl BlockDataConfig {
    fn into_block_data(self) -> HistoricBlockData {
        HistoricBlockData::new(
            word(self.note_hash_tree_root),
            word(self.nullifier_tree_root),
            word(self.contract_tree_root),
            word(self.l1_to_l2_messages_tree_root),
            word(self.public_data_tree_root),
            word(self.global_variables_hash),
        )
    }
}

impl AuthWitnessConfig {
    fn into_witness(self) -> AuthWitness {
        AuthWitness::new(self.request_hash.into(), felts(self.witness))
    }
}

impl StoreConfig {
    fn into_store(self) -> MemoryStore {
        let mut store = MemoryStore::new();

        for SecretKeyConfig { contract, owner, key } in self.secret_key {
            let key = SecretKey::new(word(key));
            store.insert_secret_key(contract_address(contract), point(owner), key);
        }
        for CompleteAddressConfig { address, public_key, partial_address } in self.complete_address
        {
            store.insert_complete_address(CompleteAddress::new(
                contract_address(address),
                point(public_key),
                partial_address.into(),
            ));
        }
        for witness in self.auth_witness {
            store.insert_auth_witness(witness.into_witness());
        }
        for note in self.note {
            store.insert_note(note.into_record());
        }
        for NullifierTreeConfig { root, leaf } in self.nullifier_tree {
            let leaves = leaf.into_iter().map(|leaf| {
                let contract = contract_address(leaf.contract);
                (SiloedNullifier::new(contract, leaf.inner_nullifier.into()), leaf.index)
            });
            store.insert_nullifier_tree(word(root), leaves);
        }
        for message in self.l1_to_l2_message {
            let key = message.key.into();
            store.insert_l1_to_l2_message(key, message.into_witness());
        }
        for PortalConfig { address, portal } in self.portal {
            store.insert_portal_contract_address(contract_address(address), portal.into());
        }

        store
    }
}

impl NoteConfig {
    fn into_record(self) -> NoteRecord {
        let record = NoteRecord::pending(
            contract_address(self.contract),
            self.storage_slot.into(),
            felts(self.preimage).into(),
            self.nullifier.into(),
            point(self.owner),
        );
        match self.tree_index {
            Some(index) => record.confirmed(index),
            None => record,
        }
    }
}

impl MessageConfig {
    fn into_witness(self) -> L1ToL2MessageWitness {
        L1ToL2MessageWitness {
            message: L1ToL2Message {
                sender: self.sender.into(),
                recipient: contract_address(self.recipient),
                content: self.content.into(),
                secret_hash: self.secret_hash.into(),
                deadline: self.deadline,
                fee: self.fee,
            },
            index: self.index,
            sibling_path: self.sibling_path.into_iter().map(word).collect(),
        }
    }
}
