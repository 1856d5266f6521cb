use figment::Jail;
use pretty_assertions::assert_eq;
use shroud_oracle::note_query::{GetNotesRequest, SortOrder};
use shroud_oracle::{OracleError, ViewOracle};

use super::*;

const SAMPLE: &str = include_str!("./samples/01-simple.toml");

/// Builds a word from four plain integers.
fn word(raw: [u64; 4]) -> Word {
    raw.map(Felt::new).into()
}

/// Loads the sample fixture inside a jail with the given environment overrides.
fn load_sample(env: &[(&str, &str)]) -> SimulationFixture {
    let mut loaded = None;
    Jail::expect_with(|jail| {
        jail.create_file("fixture.toml", SAMPLE)?;
        for (name, value) in env {
            jail.set_env(name, value);
        }
        loaded = Some(SimulationFixture::load("fixture.toml").map_err(|err| err.to_string())?);
        Ok(())
    });
    loaded.unwrap()
}

#[tokio::test]
#[shroud_test_macro::enable_logging]
async fn sample_fixture_answers_queries() {
    let (oracle, public_state) = load_sample(&[]).into_parts();
    let oracle = oracle.with_public_state(Arc::new(public_state.unwrap()));

    let owner = PublicKey::new(Felt::new(7), Felt::new(8));
    assert_eq!(oracle.get_secret_key(owner).await.unwrap().as_word(), word([11, 12, 13, 14]));
    assert_eq!(
        oracle.get_auth_witness(Felt::new(42)).await.unwrap(),
        Some(vec![Felt::new(1), Felt::new(1)])
    );
    assert!(oracle.check_nullifier_exists(Felt::new(101)).await.unwrap());
    assert!(!oracle.check_nullifier_exists(Felt::new(102)).await.unwrap());
    assert_eq!(
        oracle.storage_read(Felt::new(16), 3).await.unwrap(),
        vec![Felt::new(1), Felt::new(2), Felt::new(3)]
    );
    assert_eq!(
        oracle.get_portal_contract_address(ContractAddress::new(Felt::new(49374))).await.unwrap(),
        Felt::new(4660)
    );
}

#[tokio::test]
async fn sample_notes_keep_their_confirmation_state() {
    let (oracle, _) = load_sample(&[]).into_parts();
    let request = GetNotesRequest {
        num_selects: 1,
        select_by: vec![1],
        select_values: vec![Felt::new(1)],
        sort_by: vec![0],
        sort_order: vec![SortOrder::Asc as u32],
        limit: 10,
        offset: 0,
    };

    let notes = oracle.get_notes(Felt::new(1), request).await.unwrap();

    let summary = notes
        .iter()
        .map(|note| (note.nullifier().as_int(), note.tree_index()))
        .collect::<Vec<_>>();
    assert_eq!(summary, vec![(102, None), (101, Some(0))]);
}

#[tokio::test]
async fn pinned_message_root_comes_from_the_block_data() {
    let (oracle, _) = load_sample(&[]).into_parts();

    let pinned = oracle.get_l1_to_l2_message(Felt::new(9)).await.unwrap();

    assert_eq!(pinned.root, word([4, 0, 0, 0]));
    assert_eq!(pinned.witness.index, 12);
    assert_eq!(pinned.witness.sibling_path, vec![word([500, 0, 0, 0]), word([600, 0, 0, 0])]);
}

#[tokio::test]
async fn environment_overrides_the_simulated_contract() {
    let (oracle, _) = load_sample(&[("SHROUD_CONTRACT", "48879")]).into_parts();

    assert_eq!(oracle.contract_address(), ContractAddress::new(Felt::new(48879)));
    // The spent nullifier was emitted by the sample contract, not the overriding one.
    assert!(!oracle.check_nullifier_exists(Felt::new(101)).await.unwrap());
}

#[test]
fn fixture_without_public_storage_has_no_public_state() {
    let fixture = r#"
        contract = 1

        [block_data]
        note_hash_tree_root         = [0, 0, 0, 0]
        nullifier_tree_root         = [0, 0, 0, 0]
        contract_tree_root          = [0, 0, 0, 0]
        l1_to_l2_messages_tree_root = [0, 0, 0, 0]
        public_data_tree_root       = [0, 0, 0, 0]
        global_variables_hash       = [0, 0, 0, 0]
    "#;

    let mut loaded = None;
    Jail::expect_with(|jail| {
        jail.create_file("fixture.toml", fixture)?;
        loaded = Some(SimulationFixture::load("fixture.toml").map_err(|err| err.to_string())?);
        Ok(())
    });
    let (oracle, public_state) = loaded.unwrap().into_parts();

    assert!(public_state.is_none());
    assert!(oracle.auth_witnesses().is_empty());
}

#[tokio::test]
async fn oracle_without_attached_public_state_cannot_read_storage() {
    let (oracle, _) = load_sample(&[]).into_parts();

    let err = oracle.storage_read(Felt::new(16), 1).await.unwrap_err();

    assert!(matches!(err, OracleError::Unconfigured(_)));
}

#[test]
fn missing_fixture_is_reported_with_its_path() {
    Jail::expect_with(|_jail| {
        let err = SimulationFixture::load("missing.toml").unwrap_err();
        assert!(err.to_string().contains("missing.toml"));
        Ok(())
    });
}

#[test]
fn values_outside_the_field_are_rejected() {
    Jail::expect_with(|jail| {
        jail.create_file("fixture.toml", SAMPLE)?;
        // Reduced modulo the field this would be the sample contract itself.
        jail.set_env("SHROUD_CONTRACT", FIELD_MODULUS + 0xc0de);

        let err = SimulationFixture::load("fixture.toml").unwrap_err();

        let report = format!("{err:#}");
        assert!(report.contains("fixture.toml"), "{report}");
        assert!(report.contains("not a canonical field element"), "{report}");
        Ok(())
    });
}

#[test]
fn word_elements_outside_the_field_are_rejected() {
    let fixture = SAMPLE.replacen(
        "nullifier_tree_root         = [2, 0, 0, 0]",
        "nullifier_tree_root         = [18446744069414584321, 0, 0, 0]",
        1,
    );
    assert_ne!(fixture, SAMPLE);

    Jail::expect_with(|jail| {
        jail.create_file("fixture.toml", &fixture)?;

        let err = SimulationFixture::load("fixture.toml").unwrap_err();

        assert!(format!("{err:#}").contains("not a canonical field element"));
        Ok(())
    });
}
