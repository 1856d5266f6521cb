pub mod auth_witness;
pub mod domain;
pub mod errors;
pub mod note_query;
pub mod oracle;
pub mod store;

pub use errors::{OracleError, StoreError};
pub use oracle::{NoPublicState, ViewDataOracle, ViewOracle};

// CONSTANTS
// ================================================================================================

pub const COMPONENT: &str = "shroud-oracle";
