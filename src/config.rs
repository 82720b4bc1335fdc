//! Settings from a JSON file, all optional. Example:
//!
//! ```json
//! { "stylesheet": "my.css", "missing_value": "", "color_tooltips": false }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use chj_util::{env::opt_get_env, warn};
use serde::{Deserialize, Serialize};
use tagrules::{read_rules, AttributeRules};

use crate::{io_util::my_read_to_string,
            template::{BUILTIN_STYLESHEET, BUILTIN_TEMPLATE}};

/// Env var with the path to the config file, used if none is given
/// on the command line.
pub const CONFIG_ENV_VAR: &str = "TABLEHTML_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Page template with `%{{ stylesheet }}` and `%{{ table-content }}`
    /// placeholders; built-in if not given.
    pub template: Option<PathBuf>,
    pub stylesheet: Option<PathBuf>,
    /// Attribute rules file; if not given, `TAGRULES_PATH` or the
    /// built-in rules.
    pub rules: Option<PathBuf>,
    /// Value for padding short rows; short rows are an error if not
    /// given.
    pub missing_value: Option<String>,
    pub with_headers: bool,
    pub color_tooltips: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            template: None,
            stylesheet: None,
            rules: None,
            missing_value: None,
            with_headers: true,
            color_tooltips: true,
        }
    }
}

fn read_or_builtin(path: &Option<PathBuf>, builtin: &'static str) -> Result<String> {
    match path {
        Some(path) => my_read_to_string(path),
        None => Ok(builtin.into())
    }
}

impl Config {
    /// The settings must be given as a JSON object.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(s)?;
        if !value.is_object() {
            bail!("expecting a JSON object with the settings, got: {value}")
        }
        Ok(serde_json::from_value(value)?)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = my_read_to_string(path)?;
        Self::from_json_str(&s).with_context(
            || anyhow!("reading config from {path:?}"))
    }

    /// Load from `path` if given, else from the path in
    /// `TABLEHTML_CONFIG` if set, else the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        if let Some(path) = path {
            Self::load(path)
        } else if let Some(path) = opt_get_env::<PathBuf>(CONFIG_ENV_VAR)? {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    pub fn template_text(&self) -> Result<String> {
        read_or_builtin(&self.template, BUILTIN_TEMPLATE)
    }

    pub fn stylesheet_text(&self) -> Result<String> {
        read_or_builtin(&self.stylesheet, BUILTIN_STYLESHEET)
    }

    pub fn attribute_rules(&self) -> Result<AttributeRules> {
        match &self.rules {
            Some(path) => {
                if opt_get_env::<String>("TAGRULES_PATH")?.is_some() {
                    warn!("TAGRULES_PATH is ignored as the config file gives the rules path");
                }
                read_rules(path)
            }
            None => AttributeRules::load_default()
        }
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn t_defaults() {
        let c = Config::from_json_str("{}").unwrap();
        assert_eq!(c, Config::default());
        assert!(c.with_headers);
        assert!(c.color_tooltips);
        assert_eq!(c.stylesheet_text().unwrap(), BUILTIN_STYLESHEET);
        assert_eq!(c.template_text().unwrap(), BUILTIN_TEMPLATE);
    }

    #[test]
    fn t_from_json() {
        let c = Config::from_json_str(
            r#"{ "stylesheet": "my.css", "missing_value": "", "color_tooltips": false }"#)
            .unwrap();
        assert_eq!(c.stylesheet.as_deref(), Some(Path::new("my.css")));
        assert_eq!(c.missing_value.as_deref(), Some(""));
        assert!(!c.color_tooltips);
        assert!(c.with_headers);
        assert!(c.stylesheet_text().is_err());
        assert!(Config::from_json_str(r#"{ "colour_tooltips": false }"#).is_err());
        // serde would take a sequence for the struct, too
        assert!(Config::from_json_str("[]").is_err());
        assert!(Config::from_json_str("[true]").is_err());
        assert!(Config::from_json_str("null").is_err());
    }

    #[test]
    fn t_rules_file() {
        let path = std::env::temp_dir().join(format!("tablehtml-t_rules_file-{}.spl",
                                                     std::process::id()));
        std::fs::write(&path, "id = *\n").unwrap();
        let c = Config { rules: Some(path.clone()), ..Config::default() };
        let rules = c.attribute_rules().unwrap();
        std::fs::remove_file(&path).unwrap();
        assert_eq!(rules.len(), 1);
        assert!(Config { rules: Some("/nonexistent.spl".into()), ..Config::default() }
                .attribute_rules().is_err());
    }
}
