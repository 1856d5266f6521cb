use miden_objects::{Felt, Hasher, Word};

/// Number of field elements in the flattened encoding of [`HistoricBlockData`].
pub const HISTORIC_BLOCK_DATA_LENGTH: usize = 6 * 4;

/// Snapshot of the state tree roots a simulation is pinned to.
///
/// Every oracle read of a single simulation is answered relative to one instance of this
/// snapshot. There are no setters; a different snapshot means a different simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HistoricBlockData {
    note_hash_tree_root: Word,
    nullifier_tree_root: Word,
    contract_tree_root: Word,
    l1_to_l2_messages_tree_root: Word,
    public_data_tree_root: Word,
    global_variables_hash: Word,
}

impl HistoricBlockData {
    pub const fn new(
        note_hash_tree_root: Word,
        nullifier_tree_root: Word,
        contract_tree_root: Word,
        l1_to_l2_messages_tree_root: Word,
        public_data_tree_root: Word,
        global_variables_hash: Word,
    ) -> Self {
        Self {
            note_hash_tree_root,
            nullifier_tree_root,
            contract_tree_root,
            l1_to_l2_messages_tree_root,
            public_data_tree_root,
            global_variables_hash,
        }
    }

    pub fn note_hash_tree_root(&self) -> Word {
        self.note_hash_tree_root
    }

    pub fn nullifier_tree_root(&self) -> Word {
        self.nullifier_tree_root
    }

    pub fn contract_tree_root(&self) -> Word {
        self.contract_tree_root
    }

    pub fn l1_to_l2_messages_tree_root(&self) -> Word {
        self.l1_to_l2_messages_tree_root
    }

    pub fn public_data_tree_root(&self) -> Word {
        self.public_data_tree_root
    }

    pub fn global_variables_hash(&self) -> Word {
        self.global_variables_hash
    }

    /// Flattens the snapshot into field elements in declaration order, as circuits consume it.
    pub fn to_elements(&self) -> Vec<Felt> {
        let mut elements = Vec::with_capacity(HISTORIC_BLOCK_DATA_LENGTH);
        for word in [
            self.note_hash_tree_root,
            self.nullifier_tree_root,
            self.contract_tree_root,
            self.l1_to_l2_messages_tree_root,
            self.public_data_tree_root,
            self.global_variables_hash,
        ] {
            elements.extend_from_slice(word.as_elements());
        }
        elements
    }

    /// Commitment to the whole snapshot.
    pub fn block_hash(&self) -> Word {
        Hasher::hash_elements(&self.to_elements())
    }
}
