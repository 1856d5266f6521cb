use std::collections::BTreeMap;
use std::future::Future;

use miden_objects::{Felt, Word};

use super::{LocalStore, PublicStateProvider};
use crate::domain::address::{CompleteAddress, ContractAddress, PublicKey, SecretKey};
use crate::domain::auth_witness::AuthWitness;
use crate::domain::field::felt_to_be_bytes;
use crate::domain::message::L1ToL2MessageWitness;
use crate::domain::note::NoteRecord;
use crate::domain::nullifier::SiloedNullifier;
use crate::errors::StoreError;

// MEMORY STORE
// ================================================================================================

/// A [`LocalStore`] held entirely in memory.
///
/// Populated up front and shared immutably afterwards, which matches how the oracle uses a store
/// for the duration of one simulation.
#[derive(Clone, Debug, Default)]
pub struct MemoryStore {
    secret_keys: BTreeMap<(ContractAddress, PublicKey), SecretKey>,
    complete_addresses: BTreeMap<ContractAddress, CompleteAddress>,
    auth_witnesses: BTreeMap<u64, AuthWitness>,
    notes: BTreeMap<(ContractAddress, u64), Vec<NoteRecord>>,
    nullifier_trees: BTreeMap<Word, BTreeMap<SiloedNullifier, u64>>,
    l1_to_l2_messages: BTreeMap<u64, L1ToL2MessageWitness>,
    portal_addresses: BTreeMap<ContractAddress, Felt>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_secret_key(&mut self, contract: ContractAddress, owner: PublicKey, key: SecretKey) {
        self.secret_keys.insert((contract, owner), key);
    }

    pub fn insert_complete_address(&mut self, complete_address: CompleteAddress) {
        self.complete_addresses.insert(complete_address.address(), complete_address);
    }

    /// Persists `witness`, replacing any earlier witness for the same request hash.
    pub fn insert_auth_witness(&mut self, witness: AuthWitness) {
        self.auth_witnesses.insert(witness.request_hash().as_int(), witness);
    }

    /// Appends `note` to the notes of its contract and storage slot.
    ///
    /// Notes of a slot are returned in insertion order.
    pub fn insert_note(&mut self, note: NoteRecord) {
        self.notes
            .entry((note.contract_address(), note.storage_slot().as_int()))
            .or_default()
            .push(note);
    }

    /// Registers a nullifier tree snapshot identified by `root`.
    ///
    /// Snapshots are never merged. Registering the same root twice replaces the earlier snapshot.
    pub fn insert_nullifier_tree(
        &mut self,
        root: Word,
        leaves: impl IntoIterator<Item = (SiloedNullifier, u64)>,
    ) {
        self.nullifier_trees.insert(root, leaves.into_iter().collect());
    }

    pub fn insert_l1_to_l2_message(&mut self, message_key: Felt, witness: L1ToL2MessageWitness) {
        self.l1_to_l2_messages.insert(message_key.as_int(), witness);
    }

    pub fn insert_portal_contract_address(&mut self, address: ContractAddress, portal: Felt) {
        self.portal_addresses.insert(address, portal);
    }
}

impl LocalStore for MemoryStore {
    fn get_secret_key(
        &self,
        contract: ContractAddress,
        owner: PublicKey,
    ) -> impl Future<Output = Result<Option<SecretKey>, StoreError>> + Send {
        async move { Ok(self.secret_keys.get(&(contract, owner)).copied()) }
    }

    fn get_complete_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<Option<CompleteAddress>, StoreError>> + Send {
        async move { Ok(self.complete_addresses.get(&address).copied()) }
    }

    fn get_auth_witness(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<AuthWitness>, StoreError>> + Send {
        async move { Ok(self.auth_witnesses.get(&request_hash.as_int()).cloned()) }
    }

    fn get_notes_for_slot(
        &self,
        contract: ContractAddress,
        storage_slot: Felt,
    ) -> impl Future<Output = Result<Vec<NoteRecord>, StoreError>> + Send {
        async move {
            Ok(self
                .notes
                .get(&(contract, storage_slot.as_int()))
                .cloned()
                .unwrap_or_default())
        }
    }

    fn get_nullifier_index(
        &self,
        nullifier_tree_root: Word,
        nullifier: &SiloedNullifier,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send {
        let nullifier = *nullifier;
        async move {
            let tree = self.nullifier_trees.get(&nullifier_tree_root).ok_or(
                StoreError::UnknownTreeRoot {
                    tree: "nullifier",
                    root: nullifier_tree_root,
                },
            )?;
            Ok(tree.get(&nullifier).copied())
        }
    }

    fn get_l1_to_l2_message(
        &self,
        message_key: Felt,
    ) -> impl Future<Output = Result<Option<L1ToL2MessageWitness>, StoreError>> + Send {
        async move { Ok(self.l1_to_l2_messages.get(&message_key.as_int()).cloned()) }
    }

    fn get_portal_contract_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<Option<Felt>, StoreError>> + Send {
        async move { Ok(self.portal_addresses.get(&address).copied()) }
    }
}

// MEMORY PUBLIC STATE
// ================================================================================================

/// A [`PublicStateProvider`] backed by a map of raw storage values.
#[derive(Clone, Debug, Default)]
pub struct MemoryPublicState {
    slots: BTreeMap<(ContractAddress, u64), Vec<u8>>,
}

impl MemoryPublicState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a raw big-endian value. The bytes are returned as given, even if they do not encode
    /// a valid field element.
    pub fn insert_raw(&mut self, contract: ContractAddress, slot: Felt, value: Vec<u8>) {
        self.slots.insert((contract, slot.as_int()), value);
    }

    /// Stores `value` using the 32-byte big-endian encoding public storage uses.
    pub fn insert(&mut self, contract: ContractAddress, slot: Felt, value: Felt) {
        self.insert_raw(contract, slot, felt_to_be_bytes(value).to_vec());
    }
}

impl PublicStateProvider for MemoryPublicState {
    fn get_public_storage_at(
        &self,
        contract: ContractAddress,
        slot: Felt,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send {
        async move { Ok(self.slots.get(&(contract, slot.as_int())).cloned()) }
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;

    fn root(n: u64) -> Word {
        [Felt::new(n), Felt::new(0), Felt::new(0), Felt::new(0)].into()
    }

    #[tokio::test]
    async fn nullifier_lookups_are_scoped_to_their_tree() {
        let contract = ContractAddress::new(Felt::new(1));
        let spent = SiloedNullifier::new(contract, Felt::new(10));

        let mut store = MemoryStore::new();
        store.insert_nullifier_tree(root(1), std::iter::empty());
        store.insert_nullifier_tree(root(2), [(spent, 4)]);

        assert_eq!(store.get_nullifier_index(root(1), &spent).await.unwrap(), None);
        assert_eq!(store.get_nullifier_index(root(2), &spent).await.unwrap(), Some(4));
        assert_matches!(
            store.get_nullifier_index(root(3), &spent).await,
            Err(StoreError::UnknownTreeRoot { tree: "nullifier", .. })
        );
    }

    #[tokio::test]
    async fn notes_keep_insertion_order_per_slot() {
        let contract = ContractAddress::new(Felt::new(1));
        let owner = PublicKey::new(Felt::new(2), Felt::new(3));
        let note = |slot: u64, nullifier: u64| {
            NoteRecord::pending(
                contract,
                Felt::new(slot),
                vec![Felt::new(nullifier)].into(),
                Felt::new(nullifier),
                owner,
            )
        };

        let mut store = MemoryStore::new();
        for (slot, nullifier) in [(5, 3), (6, 1), (5, 2), (5, 1)] {
            store.insert_note(note(slot, nullifier));
        }

        let notes = store.get_notes_for_slot(contract, Felt::new(5)).await.unwrap();
        let nullifiers = notes.iter().map(|note| note.nullifier().as_int()).collect::<Vec<_>>();
        assert_eq!(nullifiers, vec![3, 2, 1]);
        assert!(store.get_notes_for_slot(contract, Felt::new(7)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn public_values_are_stored_big_endian() {
        let contract = ContractAddress::new(Felt::new(1));
        let mut state = MemoryPublicState::new();
        state.insert(contract, Felt::new(0x10), Felt::new(0x0102));

        let bytes = state.get_public_storage_at(contract, Felt::new(0x10)).await.unwrap().unwrap();

        assert_eq!(bytes.len(), 32);
        assert_eq!(&bytes[30..], &[0x01, 0x02]);
        assert!(bytes[..30].iter().all(|byte| *byte == 0));
    }
}
