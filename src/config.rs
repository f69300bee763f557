//! Environment configuration.
//!
//! | variable     | values                      |
//! |--------------|-----------------------------|
//! | `ZEST_COLOR` | `auto`, `always`, `never`   |
//! | `ZEST_SKIP`  | comma separated group names |
//! | `ZEST_ONLY`  | comma separated group names |

use std::env;

use crate::{Error, formatter::common::color::ColorSetting, registry::Registry};

pub const COLOR_VAR: &str = "ZEST_COLOR";
pub const SKIP_VAR: &str = "ZEST_SKIP";
pub const ONLY_VAR: &str = "ZEST_ONLY";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub color: ColorSetting,
    pub skip: Vec<String>,
    pub only: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_vars(
            env::vars_os()
                .filter_map(|(key, value)| Some((key.into_string().ok()?, value.into_string().ok()?))),
        )
    }

    /// Build a config from `(name, value)` pairs, unknown names are ignored.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut config = Config::default();
        for (key, value) in vars {
            let value = value.as_ref();
            match key.as_ref() {
                COLOR_VAR => {
                    config.color = value.parse().map_err(|_| Error::InvalidConfig {
                        var: COLOR_VAR,
                        value: value.to_owned(),
                    })?
                }
                SKIP_VAR => config.skip.extend(group_list(value)),
                ONLY_VAR => config.only.extend(group_list(value)),
                _ => {}
            }
        }
        Ok(config)
    }

    /// Apply the skip and only lists, skips first.
    pub fn apply(&self, registry: &mut Registry) {
        for group in &self.skip {
            registry.skip(group.clone());
        }
        for group in &self.only {
            registry.only(group.clone());
        }
    }
}

fn group_list(value: &str) -> impl Iterator<Item = String> + '_ {
    value
        .split(',')
        .map(str::trim)
        .filter(|group| !group.is_empty())
        .map(str::to_owned)
}
