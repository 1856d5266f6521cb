use anyhow::Context;
use miden_objects::Felt;
use shroud_oracle::domain::address::{ContractAddress, PublicKey};
use shroud_oracle::domain::field::FIELD_MODULUS;
use shroud_oracle::note_query::{GetNotesRequest, Select, Sort, SortOrder};
use shroud_oracle::store::{LocalStore, PublicStateProvider};
use shroud_oracle::{ViewDataOracle, ViewOracle};
use shroud_utils::limiter::MAX_NOTE_QUERY_KEYS;

// QUERY COMMAND
// ================================================================================================

/// A single oracle query. Field elements accept decimal or `0x` prefixed hexadecimal values.
#[derive(clap::Subcommand)]
pub enum QueryCommand {
    /// Prints the pinned historic block data and its hash.
    BlockData,

    /// Looks up the secret key of an owner for the simulated contract.
    SecretKey {
        /// X coordinate of the owner's public key.
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        owner_x: Felt,
        /// Y coordinate of the owner's public key.
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        owner_y: Felt,
    },

    /// Resolves an address to its public key and partial address.
    CompleteAddress {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        address: Felt,
    },

    /// Looks up the witness authorizing a request, preferring witnesses of the fixture itself.
    AuthWitness {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        request_hash: Felt,
    },

    /// Selects, orders and paginates the notes of a storage slot.
    Notes {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        storage_slot: Felt,

        /// Keeps notes whose field `INDEX` equals `VALUE`. May be repeated.
        #[arg(long = "select", value_parser = parse_select, value_name = "INDEX=VALUE")]
        selects: Vec<Select>,

        /// Orders notes by field `INDEX`. Earlier keys take priority. May be repeated.
        #[arg(long = "sort", value_parser = parse_sort, value_name = "INDEX:asc|desc|none")]
        sorts: Vec<Sort>,

        #[arg(long, default_value_t = 10, value_name = "NUM")]
        limit: u32,

        #[arg(long, default_value_t = 0, value_name = "NUM")]
        offset: u32,
    },

    /// Checks whether an inner nullifier of the simulated contract was spent.
    Nullifier {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        inner_nullifier: Felt,
    },

    /// Fetches an L1 to L2 message bound to the pinned message tree root.
    Message {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        key: Felt,
    },

    /// Looks up the L1 portal of a contract.
    Portal {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        address: Felt,
    },

    /// Reads consecutive public storage slots of the simulated contract.
    StorageRead {
        #[arg(long, value_parser = parse_felt, value_name = "FELT")]
        start_slot: Felt,

        #[arg(long, default_value_t = 1, value_name = "NUM")]
        count: usize,
    },
}

impl QueryCommand {
    /// Runs the query and prints its result to stdout.
    pub async fn run<S, P>(self, oracle: &ViewDataOracle<S, P>) -> anyhow::Result<()>
    where
        S: LocalStore,
        P: PublicStateProvider,
    {
        match self {
            QueryCommand::BlockData => {
                let block_data = oracle.block_data();
                println!("block_hash: {}", block_data.block_hash().to_hex());
                println!("note_hash_tree_root: {}", block_data.note_hash_tree_root().to_hex());
                println!("nullifier_tree_root: {}", block_data.nullifier_tree_root().to_hex());
                println!("contract_tree_root: {}", block_data.contract_tree_root().to_hex());
                println!(
                    "l1_to_l2_messages_tree_root: {}",
                    block_data.l1_to_l2_messages_tree_root().to_hex()
                );
                println!("public_data_tree_root: {}", block_data.public_data_tree_root().to_hex());
                println!("global_variables_hash: {}", block_data.global_variables_hash().to_hex());
            },
            QueryCommand::SecretKey { owner_x, owner_y } => {
                let key = oracle
                    .get_secret_key(PublicKey::new(owner_x, owner_y))
                    .await
                    .context("failed to get secret key")?;
                println!("{}", key.as_word().to_hex());
            },
            QueryCommand::CompleteAddress { address } => {
                let complete = oracle
                    .get_complete_address(ContractAddress::new(address))
                    .await
                    .context("failed to get complete address")?;
                println!("address: {}", complete.address());
                println!(
                    "public_key: [{}, {}]",
                    complete.public_key().x().as_int(),
                    complete.public_key().y().as_int()
                );
                println!("partial_address: {}", complete.partial_address().as_int());
            },
            QueryCommand::AuthWitness { request_hash } => {
                let witness = oracle
                    .get_auth_witness(request_hash)
                    .await
                    .context("failed to get auth witness")?;
                match witness {
                    Some(witness) => println!("{}", format_felts(&witness)),
                    None => println!("no witness"),
                }
            },
            QueryCommand::Notes { storage_slot, selects, sorts, limit, offset } => {
                let notes = oracle
                    .get_notes(storage_slot, notes_request(&selects, &sorts, limit, offset))
                    .await
                    .context("failed to get notes")?;
                for note in notes {
                    let tree_index =
                        note.tree_index().map_or_else(|| "pending".to_string(), |i| i.to_string());
                    println!(
                        "nullifier={} index={tree_index} preimage={}",
                        note.nullifier().as_int(),
                        format_felts(note.preimage().items())
                    );
                }
            },
            QueryCommand::Nullifier { inner_nullifier } => {
                let exists = oracle
                    .check_nullifier_exists(inner_nullifier)
                    .await
                    .context("failed to check nullifier")?;
                println!("{exists}");
            },
            QueryCommand::Message { key } => {
                let pinned =
                    oracle.get_l1_to_l2_message(key).await.context("failed to get message")?;
                println!("message: {}", format_felts(&pinned.witness.message.to_elements()));
                println!("index: {}", pinned.witness.index);
                println!("root: {}", pinned.root.to_hex());
            },
            QueryCommand::Portal { address } => {
                let portal = oracle
                    .get_portal_contract_address(ContractAddress::new(address))
                    .await
                    .context("failed to get portal contract address")?;
                println!("{}", portal.as_int());
            },
            QueryCommand::StorageRead { start_slot, count } => {
                let values = oracle
                    .storage_read(start_slot, count)
                    .await
                    .context("failed to read public storage")?;
                println!("{}", format_felts(&values));
            },
        }

        Ok(())
    }
}

// HELPERS
// ================================================================================================

/// Encodes the parsed notes arguments the way a circuit would, with over-allocated select
/// arrays.
fn notes_request(selects: &[Select], sorts: &[Sort], limit: u32, offset: u32) -> GetNotesRequest {
    let padding = MAX_NOTE_QUERY_KEYS.saturating_sub(selects.len());
    let select_by = selects
        .iter()
        .map(|select| select.index as u32)
        .chain(std::iter::repeat_n(0, padding))
        .collect();
    let select_values = selects
        .iter()
        .map(|select| select.value)
        .chain(std::iter::repeat_n(Felt::new(0), padding))
        .collect();

    GetNotesRequest {
        num_selects: selects.len(),
        select_by,
        select_values,
        sort_by: sorts.iter().map(|sort| sort.index as u32).collect(),
        sort_order: sorts.iter().map(|sort| sort.order as u32).collect(),
        limit,
        offset,
    }
}

fn format_felts(felts: &[Felt]) -> String {
    let values = felts.iter().map(|felt| felt.as_int().to_string()).collect::<Vec<_>>();
    format!("[{}]", values.join(", "))
}

fn parse_felt(value: &str) -> Result<Felt, String> {
    let parsed = match value.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse::<u64>(),
    }
    .map_err(|err| format!("invalid field element {value}: {err}"))?;

    if parsed >= FIELD_MODULUS {
        return Err(format!("{value} is not smaller than the field modulus"));
    }
    Ok(Felt::new(parsed))
}

fn parse_index(value: &str) -> Result<usize, String> {
    value.parse().map_err(|err| format!("invalid field index {value}: {err}"))
}

fn parse_select(value: &str) -> Result<Select, String> {
    let (index, felt) =
        value.split_once('=').ok_or_else(|| format!("expected INDEX=VALUE, got {value}"))?;
    Ok(Select { index: parse_index(index)?, value: parse_felt(felt)? })
}

fn parse_sort(value: &str) -> Result<Sort, String> {
    let (index, order) =
        value.split_once(':').ok_or_else(|| format!("expected INDEX:ORDER, got {value}"))?;
    let order = match order {
        "asc" => SortOrder::Asc,
        "desc" => SortOrder::Desc,
        "none" => SortOrder::None,
        other => return Err(format!("unknown sort order {other}")),
    };
    Ok(Sort { index: parse_index(index)?, order })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn felts_parse_from_decimal_and_hex() {
        assert_eq!(parse_felt("16").unwrap(), Felt::new(16));
        assert_eq!(parse_felt("0x10").unwrap(), Felt::new(16));
        assert!(parse_felt("0xffffffff00000001").is_err());
        assert!(parse_felt("sixteen").is_err());
    }

    #[test]
    fn notes_arguments_encode_like_a_circuit() {
        let selects = [parse_select("1=7").unwrap()];
        let sorts = [parse_sort("0:desc").unwrap(), parse_sort("2:asc").unwrap()];

        let request = notes_request(&selects, &sorts, 5, 1);

        assert_eq!(request.num_selects, 1);
        assert_eq!(request.select_by.len(), MAX_NOTE_QUERY_KEYS);
        assert_eq!(request.select_values.len(), MAX_NOTE_QUERY_KEYS);
        assert_eq!(request.sort_by, vec![0, 2]);
        assert_eq!(request.sort_order, vec![1, 2]);

        let query = request.into_query().unwrap();
        assert_eq!(query.selects, selects.to_vec());
        assert_eq!(query.sorts, sorts.to_vec());
        assert_eq!((query.limit, query.offset), (5, 1));
    }

    #[test]
    fn malformed_select_and_sort_arguments_are_rejected() {
        assert!(parse_select("1").is_err());
        assert!(parse_select("x=1").is_err());
        assert!(parse_sort("0:up").is_err());
    }
}
