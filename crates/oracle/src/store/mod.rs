//! Collaborators the oracle delegates lookups to.
//!
//! Both traits are read-only. Implementations answer single lookups and report absence as
//! `Ok(None)`; whether absence is an error is decided by the oracle.

use std::future::Future;

use miden_objects::{Felt, Word};

use crate::domain::address::{CompleteAddress, ContractAddress, PublicKey, SecretKey};
use crate::domain::auth_witness::AuthWitness;
use crate::domain::message::L1ToL2MessageWitness;
use crate::domain::note::NoteRecord;
use crate::domain::nullifier::SiloedNullifier;
use crate::errors::StoreError;

mod memory;

pub use memory::{MemoryPublicState, MemoryStore};

// LOCAL STORE
// ================================================================================================

/// The user's local database of keys, decrypted notes and synced trees.
pub trait LocalStore: Send + Sync {
    /// Returns the secret key `owner` uses for notes of `contract`.
    fn get_secret_key(
        &self,
        contract: ContractAddress,
        owner: PublicKey,
    ) -> impl Future<Output = Result<Option<SecretKey>, StoreError>> + Send;

    fn get_complete_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<Option<CompleteAddress>, StoreError>> + Send;

    /// Returns the persisted authorization witness for `request_hash`.
    fn get_auth_witness(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<AuthWitness>, StoreError>> + Send;

    /// Returns every decrypted note stored under `(contract, storage_slot)`.
    ///
    /// The order of the returned notes must be stable across calls, since it is the order pending
    /// notes keep after an unsorted query.
    fn get_notes_for_slot(
        &self,
        contract: ContractAddress,
        storage_slot: Felt,
    ) -> impl Future<Output = Result<Vec<NoteRecord>, StoreError>> + Send;

    /// Returns the leaf index of `nullifier` in the nullifier tree with root
    /// `nullifier_tree_root`.
    ///
    /// Implementations must answer for that exact tree. A store which no longer (or not yet)
    /// knows the tree fails with [`StoreError::UnknownTreeRoot`].
    fn get_nullifier_index(
        &self,
        nullifier_tree_root: Word,
        nullifier: &SiloedNullifier,
    ) -> impl Future<Output = Result<Option<u64>, StoreError>> + Send;

    fn get_l1_to_l2_message(
        &self,
        message_key: Felt,
    ) -> impl Future<Output = Result<Option<L1ToL2MessageWitness>, StoreError>> + Send;

    /// Returns the L1 portal paired with the rollup contract at `address`.
    fn get_portal_contract_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<Option<Felt>, StoreError>> + Send;
}

// PUBLIC STATE
// ================================================================================================

/// Source of public contract storage, usually a remote node.
pub trait PublicStateProvider: Send + Sync {
    /// Returns the raw big-endian value of public storage `slot` of `contract`.
    fn get_public_storage_at(
        &self,
        contract: ContractAddress,
        slot: Felt,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send;
}
