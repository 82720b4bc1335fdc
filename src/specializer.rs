//! Cell content dispatch: a cell text starting with a specializer's
//! prefix (e.g. `@img:`) is handed to that specializer, which turns
//! the rest of the text into markup. Unmatched text is escaped.

use anyhow::{anyhow, Result};
use kstring::KString;
use tagtree::{Document, NodeId};

use crate::specializers::{ColorSpecializer, HtmlSpecializer, ImgSpecializer,
                          JsDateSpecializer, PyDateSpecializer,
                          RandomNumberSpecializer, SelectSpecializer};


/// The parts making up the prefix that marks a cell for a
/// specializer: `indicator + keyword + delimiter`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prefix {
    pub keyword: KString,
    pub indicator: KString,
    pub delimiter: KString,
}

impl Prefix {
    /// With the default indicator `@` and delimiter `:`.
    pub fn new(keyword: &'static str) -> Self {
        Self::with_delimiter(keyword, ":")
    }

    pub fn with_delimiter(keyword: &'static str, delimiter: &'static str) -> Self {
        Prefix {
            keyword: KString::from_static(keyword),
            indicator: KString::from_static("@"),
            delimiter: KString::from_static(delimiter),
        }
    }

    pub fn prefix_string(&self) -> String {
        format!("{}{}{}", self.indicator, self.keyword, self.delimiter)
    }
}


pub trait Specializer {
    fn prefix(&self) -> &Prefix;

    fn prefix_string(&self) -> String {
        self.prefix().prefix_string()
    }

    fn matches(&self, text: &str) -> bool {
        text.starts_with(&self.prefix_string())
    }

    /// Convert `data`, the cell text without the prefix.
    fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId>;

    /// Strip the prefix from `text`, then `raw_parse` the rest.
    fn parse(&mut self, doc: &Document, text: &str) -> Result<NodeId> {
        let prefix = self.prefix_string();
        let data = text.strip_prefix(prefix.as_str()).ok_or_else(
            || anyhow!("text does not start with {prefix:?}: {text:?}"))?;
        self.raw_parse(doc, data)
    }

    /// Forget state accumulated during a render pass.
    fn reset(&mut self) {}
}


/// Specializers in the order in which they are tried.
pub struct SpecializerRegistry {
    specializers: Vec<Box<dyn Specializer>>,
}

impl Default for SpecializerRegistry {
    fn default() -> Self {
        Self::builtin(true)
    }
}

impl SpecializerRegistry {
    /// The built-in specializers.
    pub fn builtin(color_tooltips: bool) -> Self {
        let mut r = Self::empty();
        r.add(ImgSpecializer::new());
        r.add(if color_tooltips {
            ColorSpecializer::new()
        } else {
            ColorSpecializer::without_tooltips()
        });
        r.add(PyDateSpecializer::new());
        r.add(JsDateSpecializer::new());
        r.add(RandomNumberSpecializer::new());
        r.add(HtmlSpecializer::new());
        r.add(SelectSpecializer::new());
        r
    }

    pub fn empty() -> Self {
        SpecializerRegistry { specializers: Vec::new() }
    }

    /// Append `specializer`, i.e. it is tried after all the ones
    /// added before.
    pub fn add(&mut self, specializer: impl Specializer + 'static) {
        self.specializers.push(Box::new(specializer));
    }

    pub fn len(&self) -> usize {
        self.specializers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specializers.is_empty()
    }

    /// The prefix strings, in dispatch order.
    pub fn prefix_strings(&self) -> Vec<String> {
        self.specializers.iter().map(|s| s.prefix_string()).collect()
    }

    /// Markup for the cell `text`: the result of the first matching
    /// specializer, or `text` escaped if none matches.
    pub fn dispatch(&mut self, doc: &Document, text: &str) -> Result<NodeId> {
        match self.specializers.iter_mut().find(|s| s.matches(text)) {
            Some(specializer) => specializer.parse(doc, text),
            None => Ok(doc.escaped_text(text))
        }
    }

    /// Call before reusing the registry for another render pass.
    pub fn reset(&mut self) {
        for s in &mut self.specializers {
            s.reset();
        }
    }
}


#[cfg(test)]
mod tests {
    use tagrules::BUILTIN_RULES;

    use super::*;

    struct Fixed {
        prefix: Prefix,
        out: &'static str,
    }

    impl Fixed {
        fn new(keyword: &'static str, out: &'static str) -> Self {
            Fixed { prefix: Prefix::new(keyword), out }
        }
    }

    impl Specializer for Fixed {
        fn prefix(&self) -> &Prefix {
            &self.prefix
        }

        fn raw_parse(&mut self, doc: &Document, data: &str) -> Result<NodeId> {
            Ok(doc.text(format!("{}[{data}]", self.out)))
        }
    }

    #[test]
    fn t_prefix() {
        assert_eq!(Prefix::new("img").prefix_string(), "@img:");
        assert_eq!(Prefix::with_delimiter("rand", "").prefix_string(), "@rand");
        let f = Fixed::new("x", "");
        assert!(f.matches("@x:1"));
        assert!(f.matches("@x:"));
        assert!(!f.matches("@x"));
        assert!(!f.matches(" @x:1"));
    }

    #[test]
    fn t_parse_strips_prefix() {
        let h = Document::new(&*BUILTIN_RULES);
        let mut f = Fixed::new("x", "X");
        let t = f.parse(&h, "@x:abc").unwrap();
        assert_eq!(h.to_html_string(t), "X[abc]");
        assert!(f.parse(&h, "@y:abc").is_err());
    }

    #[test]
    fn t_dispatch_first_match_wins() {
        let h = Document::new(&*BUILTIN_RULES);
        let mut r = SpecializerRegistry::empty();
        r.add(Fixed::new("a", "first"));
        r.add(Fixed::new("a", "second"));
        r.add(Fixed::new("b", "third"));
        assert_eq!(r.len(), 3);
        let n = r.dispatch(&h, "@a:1").unwrap();
        assert_eq!(h.to_html_string(n), "first[1]");
        let n = r.dispatch(&h, "@b:2").unwrap();
        assert_eq!(h.to_html_string(n), "third[2]");
    }

    #[test]
    fn t_dispatch_unmatched_is_escaped() {
        let h = Document::new(&*BUILTIN_RULES);
        let mut r = SpecializerRegistry::default();
        let n = r.dispatch(&h, "<script>").unwrap();
        assert_eq!(h.to_html_string(n), "&lt;script&gt;");
        let n = r.dispatch(&h, "@unknown:x & y").unwrap();
        assert_eq!(h.to_html_string(n), "@unknown:x &amp; y");
    }

    #[test]
    fn t_default_order() {
        let r = SpecializerRegistry::default();
        assert_eq!(r.prefix_strings(),
                   ["@img:", "@color:", "@pydate", "@jsdate", "@rand", "@html:", "@select:"]);
        assert!(SpecializerRegistry::empty().is_empty());
    }
}
