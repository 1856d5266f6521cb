use miden_objects::Felt;

/// Authorization data for the action identified by `request_hash`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthWitness {
    request_hash: Felt,
    witness: Vec<Felt>,
}

impl AuthWitness {
    pub fn new(request_hash: Felt, witness: Vec<Felt>) -> Self {
        Self { request_hash, witness }
    }

    pub fn request_hash(&self) -> Felt {
        self.request_hash
    }

    pub fn witness(&self) -> &[Felt] {
        &self.witness
    }

    pub fn into_witness(self) -> Vec<Felt> {
        self.witness
    }
}
