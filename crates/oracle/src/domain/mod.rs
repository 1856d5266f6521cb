//! Plain data the oracle hands out. None of these types expose mutators.

pub mod address;
pub mod auth_witness;
pub mod block_data;
pub mod field;
pub mod message;
pub mod note;
pub mod nullifier;
