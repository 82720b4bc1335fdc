//! The attribute rule table: which attributes are valid on which
//! HTML elements.

pub mod rules;

pub use rules::{AttributeRules, AllowedTags, RuleViolation, RulesError,
                BUILTIN_RULES, BUILTIN_RULES_TEXT, read_rules};
