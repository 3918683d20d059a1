//! Environment variable source.

use super::{RawEntry, SourceLoader, flatten::DELIMITER};
use crate::ConfigError;
use log::{debug, warn};
use serde_json::Value;

/// Reads `PREFIX_SOME_KEY=value` variables as `some.key` entries.
///
/// The prefix is the upper-cased base name followed by `_`. Matching is
/// case-insensitive; keys are lower-cased and `_` becomes the key delimiter.
/// All values are strings.
#[derive(Debug, Clone)]
pub struct EnvSource {
    prefix: String,
    priority: u16,
    vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
    /// Source reading the process environment at load time.
    pub fn new(base_name: &str, priority: u16) -> Self {
        Self {
            prefix: format!("{}_", base_name.to_ascii_uppercase()),
            priority,
            vars: None,
        }
    }

    /// Source reading a fixed set of variables instead of the process environment.
    pub fn with_vars<I, K, V>(mut self, vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.vars = Some(
            vars.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        );
        self
    }

    fn key_for(&self, var: &str) -> Option<String> {
        if var.len() <= self.prefix.len() || !var.is_char_boundary(self.prefix.len()) {
            return None;
        }
        let (head, tail) = var.split_at(self.prefix.len());
        if !head.eq_ignore_ascii_case(&self.prefix) {
            return None;
        }
        Some(tail.to_ascii_lowercase().replace('_', &DELIMITER.to_string()))
    }

    /// Matching process variables. Names or values that are not UTF-8 are skipped.
    fn scan_process_env(&self) -> Vec<RawEntry> {
        std::env::vars_os()
            .filter_map(|(var, value)| {
                let var = var.into_string().ok()?;
                let key = self.key_for(&var)?;
                match value.into_string() {
                    Ok(value) => Some((key, Value::String(value))),
                    Err(_) => {
                        warn!("ignoring non UTF-8 environment value (var={})", var);
                        None
                    }
                }
            })
            .collect()
    }
}

impl SourceLoader for EnvSource {
    fn name(&self) -> String {
        format!("env({}*)", self.prefix)
    }

    fn priority(&self) -> u16 {
        self.priority
    }

    fn load(&self) -> Result<Vec<RawEntry>, ConfigError> {
        let entries = match &self.vars {
            Some(vars) => vars
                .iter()
                .filter_map(|(var, value)| {
                    self.key_for(var)
                        .map(|key| (key, Value::String(value.clone())))
                })
                .collect::<Vec<_>>(),
            None => self.scan_process_env(),
        };
        debug!(
            "environment scanned (prefix={}, matched={})",
            self.prefix,
            entries.len()
        );
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn strips_prefix_and_folds_keys() {
        let source = EnvSource::new("test", 100).with_vars([
            ("TEST_HOST", "override.example"),
            ("TEST_DB_POOL_SIZE", "8"),
            ("test_appid", "t9"),
            ("OTHER_HOST", "ignored"),
            ("TEST_", "empty"),
            ("TESTING", "no delimiter"),
        ]);
        let mut entries = source.load().expect("load");
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        assert_eq!(
            entries,
            vec![
                ("appid".to_string(), json!("t9")),
                ("db.pool.size".to_string(), json!("8")),
                ("host".to_string(), json!("override.example")),
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn process_env_skips_non_utf8_variables() {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;

        let vars = [
            (OsString::from("RETCON_ENV_NOISE"), OsString::from_vec(b"f\xffo".to_vec())),
            (OsString::from_vec(b"RETCONENV_\xff".to_vec()), OsString::from("bad name")),
            (OsString::from("RETCONENV_TOKEN"), OsString::from_vec(b"b\xffd".to_vec())),
            (OsString::from("RETCONENV_HOST"), OsString::from("env.example")),
        ];
        // SAFETY: these variable names are only touched by this test.
        unsafe {
            for (name, value) in &vars {
                std::env::set_var(name, value);
            }
        }

        let entries = EnvSource::new("retconenv", 100).load();

        unsafe {
            for (name, _) in &vars {
                std::env::remove_var(name);
            }
        }
        assert_eq!(
            entries.expect("load"),
            vec![("host".to_string(), json!("env.example"))]
        );
    }
}
