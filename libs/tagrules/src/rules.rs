//! Parsing and querying of attribute rules.
//!
//! The text format is line based: `attribute = *` allows the
//! attribute on every element, `attribute = tag, tag, ...` only on
//! the listed ones. A `#` starts a comment that runs to the end of
//! the line; blank lines are ignored. Everything else is an error.

use std::{collections::{HashMap, HashSet},
          fmt::Display,
          path::Path};

use anyhow::{anyhow, Context, Result};
use chj_util::{debug_if, env::{get_env_bool, opt_get_env}};
use itertools::Itertools;
use kstring::KString;
use lazy_static::lazy_static;

/// The rules shipped with the crate.
pub const BUILTIN_RULES_TEXT: &str = include_str!("../resources/valid-tags.spl");

lazy_static!{
    pub static ref BUILTIN_RULES: AttributeRules =
        AttributeRules::parse(BUILTIN_RULES_TEXT)
        .expect("built-in rules are well-formed (see t_builtin_rules_parse)");
}


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AllowedTags {
    /// Written as `*`.
    Any,
    /// Lower-cased tag names.
    Tags(HashSet<KString>),
}

impl AllowedTags {
    /// `tag` must already be lower-case.
    pub fn allows(&self, tag: &str) -> bool {
        match self {
            AllowedTags::Any => true,
            AllowedTags::Tags(tags) => tags.contains(tag),
        }
    }
}


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleViolation {
    UnknownAttribute,
    NotAllowedOnTag,
}

impl Display for RuleViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            RuleViolation::UnknownAttribute => "no such HTML attribute",
            RuleViolation::NotAllowedOnTag => "attribute is not valid for this tag",
        })
    }
}


#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RulesError {
    #[error("malformed attribute rule on line {line}: {text:?}")]
    MalformedRule { line: usize, text: String },
}


fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(i) => &line[..i],
        None => line
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && s.chars().all(|c| c.is_ascii_alphanumeric()
                         || c == '-' || c == '_' || c == ':')
}


/// Attribute name (lower-cased) to the tags it may appear on.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeRules {
    rules: HashMap<KString, AllowedTags>,
}

impl AttributeRules {
    /// An empty table, which only allows `data-*` attributes.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parse(s: &str) -> Result<Self, RulesError> {
        let mut rules = HashMap::new();
        for (i, line) in s.lines().enumerate() {
            let malformed = || RulesError::MalformedRule {
                line: i + 1,
                text: line.to_string()
            };
            let content = strip_comment(line).trim();
            if content.is_empty() {
                continue;
            }
            let (name, value) = content.split_once('=').ok_or_else(|| malformed())?;
            let (name, value) = (name.trim(), value.trim());
            if !is_name(name) {
                return Err(malformed());
            }
            let allowed =
                if value == "*" {
                    AllowedTags::Any
                } else {
                    let mut tags = HashSet::new();
                    for tag in value.split(',') {
                        let tag = tag.trim();
                        if !is_name(tag) {
                            return Err(malformed());
                        }
                        tags.insert(KString::from_string(tag.to_ascii_lowercase()));
                    }
                    AllowedTags::Tags(tags)
                };
            rules.insert(KString::from_string(name.to_ascii_lowercase()), allowed);
        }
        Ok(AttributeRules { rules })
    }

    /// Add or replace the rule for `attribute`.
    pub fn insert(&mut self, attribute: &str, allowed: AllowedTags) {
        let allowed = match allowed {
            AllowedTags::Any => AllowedTags::Any,
            AllowedTags::Tags(tags) => AllowedTags::Tags(
                tags.iter().map(|t| KString::from_string(t.to_ascii_lowercase()))
                    .collect()),
        };
        self.rules.insert(KString::from_string(attribute.to_ascii_lowercase()),
                          allowed);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn allowed_tags(&self, attribute: &str) -> Option<&AllowedTags> {
        self.rules.get(attribute.to_ascii_lowercase().as_str())
    }

    /// Whether `attribute` may appear on `tag`, both compared
    /// case-insensitively. `data-*` attributes are always valid.
    pub fn check(&self, attribute: &str, tag: &str) -> Result<(), RuleViolation> {
        let attribute = attribute.to_ascii_lowercase();
        if attribute.starts_with("data-") {
            return Ok(())
        }
        match self.rules.get(attribute.as_str()) {
            None => Err(RuleViolation::UnknownAttribute),
            Some(allowed) =>
                if allowed.allows(&tag.to_ascii_lowercase()) {
                    Ok(())
                } else {
                    Err(RuleViolation::NotAllowedOnTag)
                }
        }
    }

    /// The table in the format that `parse` reads, sorted by
    /// attribute name.
    pub fn to_rules_string(&self) -> String {
        let mut out = String::new();
        for (name, allowed) in self.rules.iter().sorted_by(|a, b| a.0.cmp(b.0)) {
            out.push_str(name);
            match allowed {
                AllowedTags::Any => out.push_str("=*"),
                AllowedTags::Tags(tags) => {
                    out.push('=');
                    out.push_str(&tags.iter().sorted().join(", "));
                }
            }
            out.push('\n');
        }
        out
    }

    /// The rules from the file given in the `TAGRULES_PATH` env var
    /// if set, the built-in ones otherwise. Set `TAGRULES_DEBUG` to
    /// see which.
    pub fn load_default() -> Result<Self> {
        let debug = get_env_bool("TAGRULES_DEBUG")?;
        if let Some(path) = opt_get_env::<String>("TAGRULES_PATH")? {
            debug_if!(debug, "reading attribute rules from {path:?}");
            read_rules(&path)
        } else {
            debug_if!(debug, "using the built-in attribute rules");
            Ok(BUILTIN_RULES.clone())
        }
    }
}


pub fn read_rules<P: AsRef<Path>>(path: P) -> Result<AttributeRules> {
    let path = path.as_ref();
    let s = std::fs::read_to_string(path).with_context(
        || anyhow!("opening attribute rules for reading: {path:?}"))?;
    AttributeRules::parse(&s).with_context(
        || anyhow!("reading attribute rules from {path:?}"))
}
