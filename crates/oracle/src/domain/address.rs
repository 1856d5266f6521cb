use std::cmp::Ordering;
use std::fmt;

use miden_objects::{Felt, Word};

use super::field::cmp_felts;

// CONTRACT ADDRESS
// ================================================================================================

/// Address of a contract (or account) on the rollup, encoded as a single field element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContractAddress(Felt);

impl ContractAddress {
    pub const fn new(felt: Felt) -> Self {
        Self(felt)
    }

    pub fn as_felt(&self) -> Felt {
        self.0
    }
}

impl From<Felt> for ContractAddress {
    fn from(felt: Felt) -> Self {
        Self(felt)
    }
}

impl From<ContractAddress> for Felt {
    fn from(address: ContractAddress) -> Self {
        address.0
    }
}

impl Ord for ContractAddress {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_felts(&self.0, &other.0)
    }
}

impl PartialOrd for ContractAddress {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for ContractAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.0.as_int())
    }
}

// KEYS
// ================================================================================================

/// A public key, i.e. a point on the curve the note encryption scheme uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PublicKey {
    x: Felt,
    y: Felt,
}

impl PublicKey {
    pub const fn new(x: Felt, y: Felt) -> Self {
        Self { x, y }
    }

    pub fn x(&self) -> Felt {
        self.x
    }

    pub fn y(&self) -> Felt {
        self.y
    }

    /// Returns the coordinates as `[x, y]`.
    pub fn to_elements(&self) -> [Felt; 2] {
        [self.x, self.y]
    }
}

impl Ord for PublicKey {
    fn cmp(&self, other: &Self) -> Ordering {
        cmp_felts(&self.x, &other.x).then_with(|| cmp_felts(&self.y, &other.y))
    }
}

impl PartialOrd for PublicKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Secret key material of an owner, scoped to a single contract.
///
/// The `Debug` implementation never prints the key.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct SecretKey(Word);

impl SecretKey {
    pub const fn new(key: Word) -> Self {
        Self(key)
    }

    pub fn as_word(&self) -> Word {
        self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretKey(<redacted>)")
    }
}

// COMPLETE ADDRESS
// ================================================================================================

/// An address together with the public key it was derived from.
///
/// The partial address is the remaining preimage needed to recompute the address from the public
/// key.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CompleteAddress {
    address: ContractAddress,
    public_key: PublicKey,
    partial_address: Felt,
}

impl CompleteAddress {
    pub const fn new(address: ContractAddress, public_key: PublicKey, partial_address: Felt) -> Self {
        Self { address, public_key, partial_address }
    }

    pub fn address(&self) -> ContractAddress {
        self.address
    }

    pub fn public_key(&self) -> PublicKey {
        self.public_key
    }

    pub fn partial_address(&self) -> Felt {
        self.partial_address
    }
}
