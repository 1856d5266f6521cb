use miden_objects::Felt;

use super::address::{ContractAddress, PublicKey};

// NOTE PREIMAGE
// ================================================================================================

/// The plaintext fields of a decrypted note, in the order the note type declares them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NotePreimage(Vec<Felt>);

impl NotePreimage {
    pub fn new(items: Vec<Felt>) -> Self {
        Self(items)
    }

    /// Returns the field at `index`, or `None` if the note has fewer fields.
    pub fn get(&self, index: usize) -> Option<Felt> {
        self.0.get(index).copied()
    }

    pub fn items(&self) -> &[Felt] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Felt>> for NotePreimage {
    fn from(items: Vec<Felt>) -> Self {
        Self(items)
    }
}

// NOTE RECORD
// ================================================================================================

/// A note decrypted by the local store, together with where it lives.
///
/// Records are immutable. Confirmation of a pending note on chain produces a new record through
/// [`NoteRecord::confirmed`] rather than editing the existing one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NoteRecord {
    contract_address: ContractAddress,
    storage_slot: Felt,
    preimage: NotePreimage,
    nullifier: Felt,
    tree_index: Option<u64>,
    owning_key: PublicKey,
}

impl NoteRecord {
    /// Creates a pending note, i.e. one whose commitment is not yet known to be in the note hash
    /// tree.
    pub fn pending(
        contract_address: ContractAddress,
        storage_slot: Felt,
        preimage: NotePreimage,
        nullifier: Felt,
        owning_key: PublicKey,
    ) -> Self {
        Self {
            contract_address,
            storage_slot,
            preimage,
            nullifier,
            tree_index: None,
            owning_key,
        }
    }

    /// Returns a copy of this note located at `tree_index` in the note hash tree.
    #[must_use]
    pub fn confirmed(self, tree_index: u64) -> Self {
        Self { tree_index: Some(tree_index), ..self }
    }

    pub fn contract_address(&self) -> ContractAddress {
        self.contract_address
    }

    pub fn storage_slot(&self) -> Felt {
        self.storage_slot
    }

    pub fn preimage(&self) -> &NotePreimage {
        &self.preimage
    }

    pub fn nullifier(&self) -> Felt {
        self.nullifier
    }

    pub fn tree_index(&self) -> Option<u64> {
        self.tree_index
    }

    pub fn owning_key(&self) -> PublicKey {
        self.owning_key
    }

    /// Whether the note only exists locally so far.
    pub fn is_pending(&self) -> bool {
        self.tree_index.is_none()
    }

    /// Two records with the same nullifier describe the same spendable value, regardless of
    /// whether one of them has been confirmed since.
    pub fn same_value_as(&self, other: &Self) -> bool {
        self.nullifier == other.nullifier
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirmation_yields_a_new_record_for_the_same_value() {
        let owner = PublicKey::new(Felt::new(7), Felt::new(8));
        let pending = NoteRecord::pending(
            ContractAddress::new(Felt::new(1)),
            Felt::new(2),
            vec![Felt::new(10), Felt::new(11)].into(),
            Felt::new(99),
            owner,
        );

        let confirmed = pending.clone().confirmed(5);

        assert!(pending.is_pending());
        assert!(!confirmed.is_pending());
        assert_eq!(confirmed.tree_index(), Some(5));
        assert!(pending.same_value_as(&confirmed));
        assert_eq!(pending.preimage(), confirmed.preimage());
    }
}
