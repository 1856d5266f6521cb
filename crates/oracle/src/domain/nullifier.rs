use std::fmt;

use miden_objects::{Felt, Hasher, Word};

use super::address::ContractAddress;

/// Domain separator mixed into every siloed nullifier.
///
/// Keeps siloed nullifiers from colliding with other hashes over two field elements.
pub const OUTER_NULLIFIER_DOMAIN: Felt = Felt::new(7);

/// A nullifier bound to the contract which emitted it.
///
/// The nullifier tree is shared by all contracts, so contracts only ever emit inner nullifiers and
/// the protocol silos them before insertion. Lookups against the tree must use the siloed form.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SiloedNullifier(Word);

impl SiloedNullifier {
    /// Silos `inner_nullifier` emitted by `contract`.
    pub fn new(contract: ContractAddress, inner_nullifier: Felt) -> Self {
        Self(Hasher::hash_elements(&[
            OUTER_NULLIFIER_DOMAIN,
            contract.as_felt(),
            inner_nullifier,
        ]))
    }

    pub fn as_word(&self) -> Word {
        self.0
    }
}

impl fmt::Display for SiloedNullifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn siloing_is_deterministic() {
        let contract = ContractAddress::new(Felt::new(0xabc));
        assert_eq!(
            SiloedNullifier::new(contract, Felt::new(5)),
            SiloedNullifier::new(contract, Felt::new(5))
        );
    }

    #[test]
    fn equal_inner_nullifiers_do_not_collide_across_contracts() {
        let inner = Felt::new(5);
        let a = SiloedNullifier::new(ContractAddress::new(Felt::new(1)), inner);
        let b = SiloedNullifier::new(ContractAddress::new(Felt::new(2)), inner);

        assert_ne!(a, b);
    }
}
