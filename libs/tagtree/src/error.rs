use chj_util::def_boxed_thiserror;
use kstring::KString;
use tagrules::RuleViolation;

def_boxed_thiserror!(MarkupError, pub enum MarkupErrorKind {
    #[error("invalid attribute {attribute:?} for tag <{tag}>: {reason}")]
    InvalidAttribute {
        attribute: KString,
        tag: KString,
        reason: RuleViolation,
    },
    #[error("invalid selector {0:?} (expecting #id, .class or a tag name)")]
    InvalidSelector(String),
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    #[error("appending <{child}> to <{parent}> would make it its own descendant")]
    WouldCycle {
        parent: KString,
        child: KString,
    },
});

impl MarkupErrorKind {
    pub(crate) fn type_mismatch(msg: impl Into<String>) -> MarkupError {
        MarkupErrorKind::TypeMismatch(msg.into()).into()
    }
}
