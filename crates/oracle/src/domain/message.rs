use miden_objects::{Felt, Word};

use super::address::ContractAddress;

/// Number of field elements of an encoded [`L1ToL2Message`].
pub const L1_TO_L2_MESSAGE_LENGTH: usize = 6;

// L1 TO L2 MESSAGE
// ================================================================================================

/// A message sent from a contract on L1 to a contract on the rollup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct L1ToL2Message {
    /// Portal contract on L1 which sent the message.
    pub sender: Felt,
    /// Rollup contract the message is addressed to.
    pub recipient: ContractAddress,
    pub content: Felt,
    /// Hash of the secret needed to consume the message.
    pub secret_hash: Felt,
    /// Timestamp after which the message can be cancelled on L1.
    pub deadline: u32,
    pub fee: u64,
}

impl L1ToL2Message {
    /// Encodes the message as the field elements circuits consume.
    pub fn to_elements(&self) -> [Felt; L1_TO_L2_MESSAGE_LENGTH] {
        [
            self.sender,
            self.recipient.as_felt(),
            self.content,
            self.secret_hash,
            Felt::new(u64::from(self.deadline)),
            Felt::new(self.fee),
        ]
    }
}

/// A message together with its position in the L1 to L2 message tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct L1ToL2MessageWitness {
    pub message: L1ToL2Message,
    pub index: u64,
    pub sibling_path: Vec<Word>,
}

/// A message witness bound to the L1 to L2 message tree root of the pinned snapshot.
///
/// Any inclusion proof built from `witness` has to be checked against `root`, never against the
/// live tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PinnedL1ToL2Message {
    pub witness: L1ToL2MessageWitness,
    pub root: Word,
}
