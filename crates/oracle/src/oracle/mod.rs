//! The view oracle consulted while simulating a private call.
//!
//! Every answer is given relative to the [`HistoricBlockData`] the oracle was created with. The
//! oracle holds no mutable state, so two reads during one simulation are always consistent with
//! each other.

use std::future::Future;
use std::sync::Arc;

use miden_objects::Felt;
use shroud_utils::limiter::{QueryParamLimiter, QueryParamStorageSlotLimit};
use shroud_utils::tracing::OpenTelemetrySpanExt;
use tracing::{Span, debug, instrument, warn};

use crate::COMPONENT;
use crate::auth_witness::{AuthWitnessResolver, PersistedWitnesses, TransientWitnesses};
use crate::domain::address::{CompleteAddress, ContractAddress, PublicKey, SecretKey};
use crate::domain::auth_witness::AuthWitness;
use crate::domain::block_data::HistoricBlockData;
use crate::domain::field::{checked_add, felt_from_be_bytes};
use crate::domain::message::PinnedL1ToL2Message;
use crate::domain::note::NoteRecord;
use crate::domain::nullifier::SiloedNullifier;
use crate::errors::{IntegrityFault, OracleError, RecordKind, StoreError};
use crate::note_query::{GetNotesRequest, pick_notes};
use crate::store::{LocalStore, PublicStateProvider};


// VIEW ORACLE
// ================================================================================================

/// Read-only queries a private circuit may issue during simulation.
///
/// The trait carries no operation that creates notes, inserts leaves or otherwise changes state.
/// An execution context that needs to write must do so through a separate interface.
pub trait ViewOracle {
    /// Returns the secret key `owner` uses for notes of the current contract.
    fn get_secret_key(
        &self,
        owner: PublicKey,
    ) -> impl Future<Output = Result<SecretKey, OracleError>> + Send;

    /// Resolves an address to its public key and partial address.
    fn get_complete_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<CompleteAddress, OracleError>> + Send;

    /// Returns the witness authorizing the request with hash `request_hash`, or `None` if no
    /// witness is known.
    fn get_auth_witness(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<Vec<Felt>>, OracleError>> + Send;

    /// Returns the notes of `storage_slot` of the current contract which satisfy `request`.
    ///
    /// The request is validated before the local store is queried.
    fn get_notes(
        &self,
        storage_slot: Felt,
        request: GetNotesRequest,
    ) -> impl Future<Output = Result<Vec<NoteRecord>, OracleError>> + Send;

    /// Returns whether `inner_nullifier`, emitted by the current contract, is in the nullifier
    /// tree of the pinned snapshot.
    fn check_nullifier_exists(
        &self,
        inner_nullifier: Felt,
    ) -> impl Future<Output = Result<bool, OracleError>> + Send;

    /// Returns the message stored under `message_key` bound to the pinned L1 to L2 message root.
    fn get_l1_to_l2_message(
        &self,
        message_key: Felt,
    ) -> impl Future<Output = Result<PinnedL1ToL2Message, OracleError>> + Send;

    /// Returns the L1 portal paired with the rollup contract at `address`.
    fn get_portal_contract_address(
        &self,
        address: ContractAddress,
    ) -> impl Future<Output = Result<Felt, OracleError>> + Send;

    /// Reads `count` consecutive public storage slots of the current contract, starting at
    /// `start_slot`.
    ///
    /// Either all values are returned, in slot order, or an error is. A missing or malformed slot
    /// value fails the whole read.
    fn storage_read(
        &self,
        start_slot: Felt,
        count: usize,
    ) -> impl Future<Output = Result<Vec<Felt>, OracleError>> + Send;
}

// VIEW DATA ORACLE
// ================================================================================================

/// [`ViewOracle`] backed by a [`LocalStore`] and, optionally, a [`PublicStateProvider`].
///
/// One instance serves exactly one simulation: the contract address, the pinned snapshot and the
/// transient witnesses are fixed at construction.
#[derive(Debug)]
pub struct ViewDataOracle<S, P = NoPublicState> {
    contract_address: ContractAddress,
    block_data: HistoricBlockData,
    auth_witnesses: Vec<AuthWitness>,
    store: Arc<S>,
    public_state: Option<Arc<P>>,
}

impl<S: LocalStore> ViewDataOracle<S, NoPublicState> {
    /// Creates an oracle without access to public state. Public storage reads fail with
    /// [`OracleError::Unconfigured`].
    pub fn new(
        contract_address: ContractAddress,
        block_data: HistoricBlockData,
        auth_witnesses: Vec<AuthWitness>,
        store: Arc<S>,
    ) -> Self {
        Self {
            contract_address,
            block_data,
            auth_witnesses,
            store,
            public_state: None,
        }
    }

    /// Attaches a provider for public storage reads.
    pub fn with_public_state<P: PublicStateProvider>(
        self,
        public_state: Arc<P>,
    ) -> ViewDataOracle<S, P> {
        ViewDataOracle {
            contract_address: self.contract_address,
            block_data: self.block_data,
            auth_witnesses: self.auth_witnesses,
            store: self.store,
            public_state: Some(public_state),
        }
    }
}

impl<S, P> ViewDataOracle<S, P> {
    pub fn contract_address(&self) -> ContractAddress {
        self.contract_address
    }

    /// The snapshot every read of this oracle is pinned to.
    pub fn block_data(&self) -> &HistoricBlockData {
        &self.block_data
    }

    pub fn auth_witnesses(&self) -> &[AuthWitness] {
        &self.auth_witnesses
    }
}

impl<S: LocalStore, P: PublicStateProvider> ViewOracle for ViewDataOracle<S, P> {
    #[instrument(target = COMPONENT, name = "oracle.get_secret_key", skip_all, err(level = "debug"))]
    async fn get_secret_key(&self, owner: PublicKey) -> Result<SecretKey, OracleError> {
        self.store
            .get_secret_key(self.contract_address, owner)
            .await
            .map_err(local_store_error)?
            .ok_or_else(|| {
                OracleError::not_found(
                    RecordKind::SecretKey,
                    format!("of owner ({}, {})", owner.x().as_int(), owner.y().as_int()),
                )
            })
    }

    #[instrument(target = COMPONENT, name = "oracle.get_complete_address", skip_all, err(level = "debug"))]
    async fn get_complete_address(
        &self,
        address: ContractAddress,
    ) -> Result<CompleteAddress, OracleError> {
        Span::current().set_attribute("address", address.as_felt());

        self.store
            .get_complete_address(address)
            .await
            .map_err(local_store_error)?
            .ok_or_else(|| OracleError::not_found(RecordKind::CompleteAddress, address))
    }

    #[instrument(target = COMPONENT, name = "oracle.get_auth_witness", skip_all, err)]
    async fn get_auth_witness(&self, request_hash: Felt) -> Result<Option<Vec<Felt>>, OracleError> {
        Span::current().set_attribute("auth_witness.request_hash", request_hash);

        let resolver = AuthWitnessResolver::new(
            TransientWitnesses::new(&self.auth_witnesses),
            PersistedWitnesses::new(self.store.as_ref()),
        );
        let witness = resolver.resolve(request_hash).await.map_err(local_store_error)?;

        Span::current().set_attribute("auth_witness.found", witness.is_some());
        Ok(witness)
    }

    #[instrument(target = COMPONENT, name = "oracle.get_notes", skip_all, err)]
    async fn get_notes(
        &self,
        storage_slot: Felt,
        request: GetNotesRequest,
    ) -> Result<Vec<NoteRecord>, OracleError> {
        let span = Span::current();
        span.set_attribute("notes.storage_slot", storage_slot);

        let query = request.into_query()?;
        span.set_attribute("notes.num_selects", query.selects.len());
        span.set_attribute("notes.num_sorts", query.sorts.len());

        let notes = self
            .store
            .get_notes_for_slot(self.contract_address, storage_slot)
            .await
            .map_err(local_store_error)?;
        span.set_attribute("notes.fetched", notes.len());

        let picked = pick_notes(notes, &query);
        span.set_attribute("notes.returned", picked.len());
        Ok(picked)
    }

    #[instrument(target = COMPONENT, name = "oracle.check_nullifier_exists", skip_all, err)]
    async fn check_nullifier_exists(&self, inner_nullifier: Felt) -> Result<bool, OracleError> {
        let nullifier_tree_root = self.block_data.nullifier_tree_root();
        Span::current().set_attribute("nullifier.tree_root", nullifier_tree_root);

        let siloed = SiloedNullifier::new(self.contract_address, inner_nullifier);

        // The leaf index is never returned.
        let exists = self
            .store
            .get_nullifier_index(nullifier_tree_root, &siloed)
            .await
            .map_err(local_store_error)?
            .is_some();

        Span::current().set_attribute("nullifier.exists", exists);
        Ok(exists)
    }

    #[instrument(target = COMPONENT, name = "oracle.get_l1_to_l2_message", skip_all, err(level = "debug"))]
    async fn get_l1_to_l2_message(
        &self,
        message_key: Felt,
    ) -> Result<PinnedL1ToL2Message, OracleError> {
        Span::current().set_attribute("message.key", message_key);

        let witness = self
            .store
            .get_l1_to_l2_message(message_key)
            .await
            .map_err(local_store_error)?
            .ok_or_else(|| {
                OracleError::not_found(RecordKind::L1ToL2Message, message_key.as_int())
            })?;
        Span::current().set_attribute("message.index", witness.index);

        Ok(PinnedL1ToL2Message {
            witness,
            root: self.block_data.l1_to_l2_messages_tree_root(),
        })
    }

    #[instrument(target = COMPONENT, name = "oracle.get_portal_contract_address", skip_all, err(level = "debug"))]
    async fn get_portal_contract_address(
        &self,
        address: ContractAddress,
    ) -> Result<Felt, OracleError> {
        Span::current().set_attribute("address", address.as_felt());

        self.store
            .get_portal_contract_address(address)
            .await
            .map_err(local_store_error)?
            .ok_or_else(|| OracleError::not_found(RecordKind::PortalContract, address))
    }

    #[instrument(target = COMPONENT, name = "oracle.storage_read", skip_all, err(level = "warn"))]
    async fn storage_read(&self, start_slot: Felt, count: usize) -> Result<Vec<Felt>, OracleError> {
        let span = Span::current();
        span.set_attribute("storage.start_slot", start_slot);
        span.set_attribute("storage.count", count);

        let public_state =
            self.public_state.as_deref().ok_or(OracleError::Unconfigured("storage_read"))?;
        QueryParamStorageSlotLimit::check(count)?;
        let slots = storage_slots(start_slot, count)?;

        let mut values = Vec::with_capacity(count);
        for slot in slots {
            let bytes = public_state
                .get_public_storage_at(self.contract_address, slot)
                .await
                .map_err(|err| {
                    Span::current().set_error(&err);
                    OracleError::PublicState(err)
                })?;
            let value = decode_storage_value(self.contract_address, slot, bytes.as_deref())?;

            debug!(target: COMPONENT, slot = slot.as_int(), value = value.as_int(), "Read public storage slot");
            values.push(value);
        }

        Ok(values)
    }
}

// HELPERS
// ================================================================================================

/// Computes the slots of a consecutive read, rejecting ranges that leave the field.
fn storage_slots(start_slot: Felt, count: usize) -> Result<Vec<Felt>, OracleError> {
    (0..count as u64)
        .map(|offset| {
            checked_add(start_slot, offset).ok_or_else(|| {
                OracleError::invalid_argument(format!(
                    "reading {count} slots from {:#x} exceeds the field modulus",
                    start_slot.as_int()
                ))
            })
        })
        .collect()
}

fn decode_storage_value(
    contract: ContractAddress,
    slot: Felt,
    bytes: Option<&[u8]>,
) -> Result<Felt, OracleError> {
    let fault = match bytes.map(felt_from_be_bytes) {
        Some(Ok(value)) => return Ok(value),
        Some(Err(err)) => IntegrityFault::Malformed(err),
        None => IntegrityFault::Missing,
    };

    warn!(target: COMPONENT, %contract, slot = slot.as_int(), %fault, "Public storage slot failed integrity check");
    Err(OracleError::DataIntegrity { contract, slot: slot.as_int(), fault })
}

fn local_store_error(err: StoreError) -> OracleError {
    Span::current().set_error(&err);
    OracleError::Store(err)
}

// NO PUBLIC STATE
// ================================================================================================

/// Placeholder provider of an oracle created without access to public state.
///
/// It has no values, so it can never be called.
#[derive(Debug)]
pub enum NoPublicState {}

impl PublicStateProvider for NoPublicState {
    fn get_public_storage_at(
        &self,
        _contract: ContractAddress,
        _slot: Felt,
    ) -> impl Future<Output = Result<Option<Vec<u8>>, StoreError>> + Send {
        async move { match *self {} }
    }
}
