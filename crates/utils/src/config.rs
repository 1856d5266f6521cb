//! Loading of TOML configuration files with environment overrides.

use std::path::Path;

use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;

/// Prefix of the environment variables which override values of a loaded configuration file.
///
/// Nested keys are separated by a double underscore, e.g. `SHROUD_ORACLE__CONTRACT_ADDRESS`
/// overrides `oracle.contract_address`.
pub const ENV_PREFIX: &str = "SHROUD_";

/// Loads the configuration file at `config_file` into `T`.
///
/// Values from the file are overridden by [`ENV_PREFIX`]ed environment variables.
pub fn load_config<T: for<'a> Deserialize<'a>>(
    config_file: impl AsRef<Path>,
) -> figment::Result<T> {
    figment(config_file).extract()
}

fn figment(config_file: impl AsRef<Path>) -> Figment {
    Figment::from(Toml::file(config_file.as_ref())).merge(Env::prefixed(ENV_PREFIX).split("__"))
}

#[cfg(test)]
mod tests {
    use figment::Jail;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    use super::load_config;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        limits: Limits,
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Limits {
        max_slots: u64,
    }

    #[test]
    fn environment_overrides_file_values() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "sample.toml",
                r#"
                    name = "from-file"

                    [limits]
                    max_slots = 8
                "#,
            )?;
            jail.set_env("SHROUD_LIMITS__MAX_SLOTS", "32");

            let sample: Sample = load_config("sample.toml")?;
            assert_eq!(
                sample,
                Sample {
                    name: "from-file".to_string(),
                    limits: Limits { max_slots: 32 },
                }
            );
            Ok(())
        });
    }
}
