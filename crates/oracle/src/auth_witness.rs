//! Two-tier lookup of authorization witnesses.
//!
//! Witnesses handed to the current simulation (the transient tier) take precedence over witnesses
//! persisted in the local store. A witness missing from both tiers is a normal outcome; the caller
//! decides whether the circuit can proceed without it.

use std::future::Future;

use miden_objects::Felt;

use crate::domain::auth_witness::AuthWitness;
use crate::errors::StoreError;
use crate::store::LocalStore;

/// A single source of authorization witnesses.
pub trait WitnessLookup: Send + Sync {
    fn lookup(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<Vec<Felt>>, StoreError>> + Send;
}

impl<L: WitnessLookup> WitnessLookup for &L {
    fn lookup(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<Vec<Felt>>, StoreError>> + Send {
        (**self).lookup(request_hash)
    }
}

// TIERS
// ================================================================================================

/// Witnesses supplied with the current simulation.
///
/// Lookups scan the list in order and the first entry with a matching request hash wins.
#[derive(Clone, Copy, Debug)]
pub struct TransientWitnesses<'a>(&'a [AuthWitness]);

impl<'a> TransientWitnesses<'a> {
    pub fn new(witnesses: &'a [AuthWitness]) -> Self {
        Self(witnesses)
    }

    fn find(&self, request_hash: Felt) -> Option<&'a AuthWitness> {
        self.0.iter().find(|witness| witness.request_hash() == request_hash)
    }
}

impl WitnessLookup for TransientWitnesses<'_> {
    fn lookup(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<Vec<Felt>>, StoreError>> + Send {
        let found = self.find(request_hash).map(|witness| witness.witness().to_vec());
        async move { Ok(found) }
    }
}

/// Witnesses persisted in the local store.
#[derive(Debug)]
pub struct PersistedWitnesses<'a, S>(&'a S);

impl<'a, S: LocalStore> PersistedWitnesses<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self(store)
    }
}

impl<S: LocalStore> WitnessLookup for PersistedWitnesses<'_, S> {
    fn lookup(
        &self,
        request_hash: Felt,
    ) -> impl Future<Output = Result<Option<Vec<Felt>>, StoreError>> + Send {
        async move {
            let witness = self.0.get_auth_witness(request_hash).await?;
            Ok(witness.map(AuthWitness::into_witness))
        }
    }
}

// RESOLVER
// ================================================================================================

/// Resolves a request hash against the transient tier first, then the persisted tier.
///
/// The persisted tier is only consulted when the transient tier has no match, so a store failure
/// cannot mask a witness supplied with the simulation.
#[derive(Debug)]
pub struct AuthWitnessResolver<T, P> {
    transient: T,
    persisted: P,
}

impl<T: WitnessLookup, P: WitnessLookup> AuthWitnessResolver<T, P> {
    pub fn new(transient: T, persisted: P) -> Self {
        Self { transient, persisted }
    }

    pub async fn resolve(&self, request_hash: Felt) -> Result<Option<Vec<Felt>>, StoreError> {
        if let Some(witness) = self.transient.lookup(request_hash).await? {
            return Ok(Some(witness));
        }
        self.persisted.lookup(request_hash).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use assert_matches::assert_matches;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::store::MemoryStore;

    fn witness(hash: u64, values: &[u64]) -> AuthWitness {
        AuthWitness::new(Felt::new(hash), values.iter().copied().map(Felt::new).collect())
    }

    fn felts(values: &[u64]) -> Vec<Felt> {
        values.iter().copied().map(Felt::new).collect()
    }

    /// Persisted tier which fails every lookup and counts how often it was asked.
    #[derive(Default)]
    struct FailingTier {
        calls: AtomicUsize,
    }

    impl WitnessLookup for FailingTier {
        fn lookup(
            &self,
            _request_hash: Felt,
        ) -> impl Future<Output = Result<Option<Vec<Felt>>, StoreError>> + Send {
            self.calls.fetch_add(1, Ordering::SeqCst);
            async move { Err(StoreError::other("store unavailable")) }
        }
    }

    #[tokio::test]
    async fn transient_witness_takes_precedence() {
        let transient = [witness(1, &[10, 11])];
        let mut store = MemoryStore::new();
        store.insert_auth_witness(witness(1, &[20]));
        store.insert_auth_witness(witness(2, &[30]));

        let resolver = AuthWitnessResolver::new(
            TransientWitnesses::new(&transient),
            PersistedWitnesses::new(&store),
        );

        assert_eq!(resolver.resolve(Felt::new(1)).await.unwrap(), Some(felts(&[10, 11])));
        assert_eq!(resolver.resolve(Felt::new(2)).await.unwrap(), Some(felts(&[30])));
        assert_eq!(resolver.resolve(Felt::new(3)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn first_matching_transient_witness_wins() {
        let transient = [witness(4, &[1]), witness(5, &[2]), witness(4, &[3])];
        let store = MemoryStore::new();

        let resolver = AuthWitnessResolver::new(
            TransientWitnesses::new(&transient),
            PersistedWitnesses::new(&store),
        );

        assert_eq!(resolver.resolve(Felt::new(4)).await.unwrap(), Some(felts(&[1])));
    }

    #[tokio::test]
    async fn persisted_tier_is_skipped_on_transient_hit() {
        let transient = [witness(1, &[10])];
        let persisted = FailingTier::default();

        let resolver = AuthWitnessResolver::new(TransientWitnesses::new(&transient), &persisted);

        assert_eq!(resolver.resolve(Felt::new(1)).await.unwrap(), Some(felts(&[10])));
        assert_eq!(persisted.calls.load(Ordering::SeqCst), 0);

        assert_matches!(resolver.resolve(Felt::new(2)).await, Err(StoreError::Other { .. }));
        assert_eq!(persisted.calls.load(Ordering::SeqCst), 1);
    }
}
