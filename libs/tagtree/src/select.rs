//! A minimal selector language: `#id`, `.class` (the whole class
//! attribute has to match) and `tagname` (case-insensitive).

use crate::{document::{Document, NodeId, Slot},
            error::{MarkupError, MarkupErrorKind}};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selector<'s> {
    Id(&'s str),
    Class(&'s str),
    Tag(&'s str),
}

impl<'s> Selector<'s> {
    pub fn parse(s: &'s str) -> Result<Self, MarkupError> {
        let mut chars = s.chars();
        match chars.next() {
            Some('#') => Ok(Selector::Id(chars.as_str())),
            Some('.') => Ok(Selector::Class(chars.as_str())),
            Some(c) if c.is_alphabetic() => Ok(Selector::Tag(s)),
            _ => Err(MarkupErrorKind::InvalidSelector(s.to_string()).into())
        }
    }

    fn matches(&self, slot: &Slot) -> bool {
        match self {
            Selector::Id(id) => slot.get_attribute("id").map_or(false, |v| v.as_str() == *id),
            Selector::Class(class) => slot.get_attribute("class").map_or(false, |v| v.as_str() == *class),
            Selector::Tag(tag) => slot.name().eq_ignore_ascii_case(tag),
        }
    }
}

impl<'r> Document<'r> {
    /// Walk the subtree at `root` in pre-order (`root` first), stopping
    /// when `f` returns false.
    fn walk(&self, root: NodeId, mut f: impl FnMut(NodeId, &Slot) -> bool) {
        let slots = self.slots.borrow();
        let mut todo = vec![root];
        while let Some(id) = todo.pop() {
            let slot = &slots[self.index(id)];
            if !f(id, slot) {
                return;
            }
            todo.extend(slot.children.iter().rev().copied());
        }
    }

    /// All nodes of the subtree at `root`, in pre-order.
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut v = Vec::new();
        self.walk(root, |id, _| { v.push(id); true });
        v
    }

    /// The first node in the subtree at `root` (in pre-order, `root`
    /// included) that matches `selector`.
    pub fn select(&self, root: NodeId, selector: &str) -> Result<Option<NodeId>, MarkupError> {
        let selector = Selector::parse(selector)?;
        let mut found = None;
        self.walk(root, |id, slot| {
            if selector.matches(slot) {
                found = Some(id);
                false
            } else {
                true
            }
        });
        Ok(found)
    }

    /// All nodes in the subtree at `root` that match `selector`, in
    /// pre-order.
    pub fn select_all(&self, root: NodeId, selector: &str) -> Result<Vec<NodeId>, MarkupError> {
        let selector = Selector::parse(selector)?;
        let mut found = Vec::new();
        self.walk(root, |id, slot| {
            if selector.matches(slot) {
                found.push(id);
            }
            true
        });
        Ok(found)
    }
}


#[cfg(test)]
mod tests {
    use tagrules::BUILTIN_RULES;

    use crate::document::{att, NodeKind};
    use super::*;

    struct Page<'r> {
        h: Document<'r>,
        html: NodeId,
        title: NodeId,
        h1: NodeId,
        p: NodeId,
    }

    fn page() -> Page<'static> {
        let h = Document::new(&*BUILTIN_RULES);
        let title = h.element("title", [att("id", "t")], [h.text("T")]).unwrap();
        let head = h.element("head", [], [title]).unwrap();
        let h1 = h.element("h1", [att("class", "big"), att("id", "dup")], []).unwrap();
        let p = h.element("P", [att("class", "big extra"), att("id", "dup")], []).unwrap();
        let body = h.element("body", [att("class", "big")], [h1, p]).unwrap();
        let html = h.element("html", [], [head, body]).unwrap();
        Page { h, html, title, h1, p }
    }

    #[test]
    fn t_select_by_id() {
        let pg = page();
        assert_eq!(pg.h.select(pg.html, "#t").unwrap(), Some(pg.title));
        assert_eq!(pg.h.select(pg.html, "#nope").unwrap(), None);
        assert_eq!(pg.h.select(pg.html, "#dup").unwrap(), Some(pg.h1));
        assert_eq!(pg.h.select_all(pg.html, "#dup").unwrap(), vec![pg.h1, pg.p]);
    }

    #[test]
    fn t_select_by_class() {
        let pg = page();
        let body = pg.h.parent(pg.h1).unwrap();
        assert_eq!(pg.h.select(pg.html, ".big").unwrap(), Some(body));
        // "big extra" is not "big"
        assert_eq!(pg.h.select_all(pg.html, ".big").unwrap(), vec![body, pg.h1]);
        assert_eq!(pg.h.select_all(pg.html, ".big extra").unwrap(), vec![pg.p]);
        assert!(pg.h.select_all(pg.html, ".none").unwrap().is_empty());
        assert!(pg.h.select_all(pg.html, ".").unwrap().is_empty());
    }

    #[test]
    fn t_select_by_tag() {
        let pg = page();
        assert_eq!(pg.h.select(pg.html, "Title").unwrap(), Some(pg.title));
        assert_eq!(pg.h.select(pg.html, "p").unwrap(), Some(pg.p));
        assert_eq!(pg.h.select(pg.html, "div").unwrap(), None);
        assert_eq!(pg.h.select(pg.html, "html").unwrap(), Some(pg.html));
        let p2 = pg.h.element("p", [], []).unwrap();
        pg.h.append_child(pg.h.parent(pg.p).unwrap(), p2).unwrap();
        assert_eq!(pg.h.select_all(pg.html, "p").unwrap(), vec![pg.p, p2]);
        // searching only below the given root
        assert!(pg.h.select_all(pg.title, "p").unwrap().is_empty());
    }

    #[test]
    fn t_invalid_selectors() {
        let pg = page();
        for s in ["", "*", "[id=x]", "1p", " p"] {
            let e = pg.h.select(pg.html, s).unwrap_err();
            assert!(matches!(e.kind(), MarkupErrorKind::InvalidSelector(_)), "{s:?}");
            assert!(pg.h.select_all(pg.html, s).is_err());
        }
    }

    #[test]
    fn t_select_through_groups() {
        let h = Document::new(&*BUILTIN_RULES);
        let inner = h.element("span", [att("id", "in")], []).unwrap();
        let g = h.group([h.text("x"), inner]).unwrap();
        let td = h.element("td", [], [g]).unwrap();
        assert_eq!(h.select(td, "#in").unwrap(), Some(inner));
        assert_eq!(h.kind(g), NodeKind::Group);
        assert_eq!(h.descendants(td).len(), 4);
    }
}
