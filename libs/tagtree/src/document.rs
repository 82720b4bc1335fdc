//! The node arena. Nodes are only ever created inside a `Document`
//! and referred to via `NodeId`s, which are cheap to copy. Parent
//! links are plain ids, too, thus never keep anything alive.

use std::{cell::RefCell,
          sync::atomic::{AtomicU32, Ordering}};

use kstring::KString;
use tagrules::AttributeRules;

use crate::{error::{MarkupError, MarkupErrorKind},
            into_kstring::IntoKString};

/// Attribute names that are merged into `class`.
const CLASS_SYNONYMS: &[&str] = &["class", "clazz", "klass", "classname"];

static NEXT_DOCUMENT_ID: AtomicU32 = AtomicU32::new(0);


/// Handle to a node in a `Document`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    docid: u32,
    index: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Transparent: serializes as its children only.
    Group,
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) name: KString,
    pub(crate) attr: Vec<(KString, KString)>,
    pub(crate) self_closing: bool,
}

#[derive(Debug, Clone)]
pub(crate) enum NodeData {
    Element(Element),
    Text(KString),
    Group,
}

#[derive(Debug)]
pub(crate) struct Slot {
    pub(crate) data: NodeData,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Slot {
    pub(crate) fn name(&self) -> &str {
        match &self.data {
            NodeData::Element(e) => &e.name,
            NodeData::Text(_) | NodeData::Group => "",
        }
    }

    pub(crate) fn get_attribute(&self, name: &str) -> Option<&KString> {
        match &self.data {
            NodeData::Element(e) =>
                e.attr.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v),
            NodeData::Text(_) | NodeData::Group => None,
        }
    }
}


pub fn att(key: impl IntoKString, val: impl IntoKString) -> Option<(KString, KString)> {
    Some((key.into_kstring(), val.into_kstring()))
}

/// `None` if `val` is `None`, i.e. the attribute is left out.
pub fn opt_att<U: IntoKString>(key: impl IntoKString, val: Option<U>) -> Option<(KString, KString)> {
    val.map(|val| (key.into_kstring(), val.into_kstring()))
}

/// Attribute lists as accepted by the element constructors: arrays
/// of `att`/`opt_att` results, or vectors of pairs.
pub trait ToAttrs {
    fn to_attrs(self) -> Vec<(KString, KString)>;
}

impl<const N: usize> ToAttrs for [Option<(KString, KString)>; N] {
    fn to_attrs(self) -> Vec<(KString, KString)> {
        self.into_iter().flatten().collect()
    }
}

impl ToAttrs for Vec<(KString, KString)> {
    fn to_attrs(self) -> Vec<(KString, KString)> {
        self
    }
}

/// Child lists as accepted by the element constructors.
pub trait ToBody {
    fn to_body(self) -> Vec<NodeId>;
}

impl<const N: usize> ToBody for [NodeId; N] {
    fn to_body(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

impl ToBody for Vec<NodeId> {
    fn to_body(self) -> Vec<NodeId> {
        self
    }
}

impl ToBody for &[NodeId] {
    fn to_body(self) -> Vec<NodeId> {
        self.to_vec()
    }
}

impl ToBody for NodeId {
    fn to_body(self) -> Vec<NodeId> {
        vec![self]
    }
}


fn normalize_attribute_name(name: &str) -> KString {
    let lower = name.to_ascii_lowercase();
    if CLASS_SYNONYMS.contains(&lower.as_str()) {
        KString::from_static("class")
    } else {
        KString::from_string(lower)
    }
}

/// Lower-case the names and merge synonyms; a later value for the
/// same name replaces the earlier one, keeping its position.
fn normalize_attributes(attr: Vec<(KString, KString)>) -> Vec<(KString, KString)> {
    let mut out: Vec<(KString, KString)> = Vec::with_capacity(attr.len());
    for (key, val) in attr {
        let key = normalize_attribute_name(&key);
        if let Some(existing) = out.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = val;
        } else {
            out.push((key, val));
        }
    }
    out
}


/// Storage for the nodes of one or more trees. With rules present,
/// every attribute is verified when it is added to an element.
pub struct Document<'r> {
    docid: u32,
    rules: Option<&'r AttributeRules>,
    pub(crate) slots: RefCell<Vec<Slot>>,
}

impl<'r> Document<'r> {
    pub fn new(rules: &'r AttributeRules) -> Self {
        Self::new_with_rules(Some(rules))
    }

    /// Without rules, attributes are not verified at all.
    pub fn new_with_rules(rules: Option<&'r AttributeRules>) -> Self {
        Document {
            docid: NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed),
            rules,
            slots: RefCell::new(Vec::new()),
        }
    }

    /// Number of nodes allocated so far.
    pub fn len(&self) -> usize {
        self.slots.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.borrow().is_empty()
    }

    /// Ids from other documents are a programming error and lead to a
    /// panic; use `check_id` where ids come from outside.
    pub(crate) fn index(&self, id: NodeId) -> usize {
        if id.docid == self.docid {
            id.index as usize
        } else {
            panic!("NodeId from another Document used: expected docid {}, got {:?}",
                   self.docid, id);
        }
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.docid == self.docid && (id.index as usize) < self.slots.borrow().len()
    }

    fn check_id(&self, id: NodeId, what: &str) -> Result<usize, MarkupError> {
        if self.contains(id) {
            Ok(id.index as usize)
        } else {
            Err(MarkupErrorKind::type_mismatch(
                format!("{what} {id:?} is not a node of this document")))
        }
    }

    fn push(&self, data: NodeData) -> NodeId {
        let mut slots = self.slots.borrow_mut();
        let index = slots.len();
        slots.push(Slot { data, parent: None, children: Vec::new() });
        NodeId { docid: self.docid, index: index as u32 }
    }

    fn verify_attribute(&self, tag: &KString, key: &KString) -> Result<(), MarkupError> {
        if let Some(rules) = self.rules {
            rules.check(key, tag).map_err(
                |reason| MarkupErrorKind::InvalidAttribute {
                    attribute: key.clone(),
                    tag: tag.clone(),
                    reason,
                })?;
        }
        Ok(())
    }

    /// The general element constructor. Tag and attribute names are
    /// lower-cased, `class` synonyms merged, then all attributes are
    /// verified.
    pub fn new_element(
        &self,
        name: &str,
        attr: Vec<(KString, KString)>,
        body: Vec<NodeId>,
        self_closing: bool,
    ) -> Result<NodeId, MarkupError> {
        let name = KString::from_string(name.to_ascii_lowercase());
        let attr = normalize_attributes(attr);
        for (key, _) in &attr {
            self.verify_attribute(&name, key)?;
        }
        if self_closing && !body.is_empty() {
            return Err(MarkupErrorKind::type_mismatch(
                format!("self-closing element <{name}> can't have children")));
        }
        for child in &body {
            self.check_id(*child, "child")?;
        }
        let id = self.push(NodeData::Element(Element { name, attr, self_closing }));
        for child in body {
            self.append_child(id, child)?;
        }
        Ok(id)
    }

    /// Create an element from arrays or vectors, for nice to use
    /// syntax.
    pub fn element(
        &self,
        name: &str,
        attr: impl ToAttrs,
        body: impl ToBody,
    ) -> Result<NodeId, MarkupError> {
        self.new_element(name, attr.to_attrs(), body.to_body(), false)
    }

    /// A self-closing element (`<name ... />`).
    pub fn void_element(
        &self,
        name: &str,
        attr: impl ToAttrs,
    ) -> Result<NodeId, MarkupError> {
        self.new_element(name, attr.to_attrs(), Vec::new(), true)
    }

    /// A text node. The string is printed verbatim, thus has to be
    /// escaped by the caller unless it is meant to be markup, see
    /// `escaped_text`.
    pub fn text(&self, s: impl IntoKString) -> NodeId {
        self.push(NodeData::Text(s.into_kstring()))
    }

    pub fn staticstr(&self, s: &'static str) -> NodeId {
        self.push(NodeData::Text(KString::from_static(s)))
    }

    /// A text node holding `s` HTML-escaped.
    pub fn escaped_text(&self, s: &str) -> NodeId {
        self.push(NodeData::Text(KString::from_string(html_escape(s))))
    }

    /// A tag-less node whose children are printed one per line.
    pub fn group(&self, body: impl ToBody) -> Result<NodeId, MarkupError> {
        let body = body.to_body();
        for child in &body {
            self.check_id(*child, "child")?;
        }
        let id = self.push(NodeData::Group);
        for child in body {
            self.append_child(id, child)?;
        }
        Ok(id)
    }

    /// Whether `needle` can be reached from `start` via child lists
    /// (including `start` itself).
    fn reaches(&self, start: NodeId, needle: NodeId) -> bool {
        let slots = self.slots.borrow();
        let mut todo = vec![start];
        while let Some(id) = todo.pop() {
            if id == needle {
                return true;
            }
            todo.extend(slots[self.index(id)].children.iter().copied());
        }
        false
    }

    /// Append `child` to the children of `parent` and point its
    /// parent link at `parent`. If `child` already had a parent, it
    /// stays in that parent's child list.
    pub fn append_child(&self, parent: NodeId, child: NodeId) -> Result<(), MarkupError> {
        let pi = self.check_id(parent, "parent")?;
        let ci = self.check_id(child, "child")?;
        {
            let slots = self.slots.borrow();
            match &slots[pi].data {
                NodeData::Text(_) =>
                    return Err(MarkupErrorKind::type_mismatch(
                        "text nodes can't have children")),
                NodeData::Element(e) if e.self_closing =>
                    return Err(MarkupErrorKind::type_mismatch(
                        format!("self-closing element <{}> can't have children",
                                e.name))),
                _ => ()
            }
        }
        if self.reaches(child, parent) {
            let slots = self.slots.borrow();
            return Err(MarkupErrorKind::WouldCycle {
                parent: KString::from_ref(slots[pi].name()),
                child: KString::from_ref(slots[ci].name()),
            }.into());
        }
        let mut slots = self.slots.borrow_mut();
        slots[pi].children.push(child);
        slots[ci].parent = Some(parent);
        Ok(())
    }

    /// Remove the first child of `parent` that is structurally equal
    /// to `child`. The removed node keeps its parent link.
    pub fn remove_child(&self, parent: NodeId, child: NodeId) -> bool {
        let children = self.children(parent);
        if let Some(pos) = children.iter().position(|c| self.structurally_eq(*c, child)) {
            let i = self.index(parent);
            self.slots.borrow_mut()[i].children.remove(pos);
            true
        } else {
            false
        }
    }

    /// Same kind, name, attributes (in any order), text and
    /// self-closing flag, and pairwise structurally equal children.
    pub fn structurally_eq(&self, a: NodeId, b: NodeId) -> bool {
        if a == b {
            return true;
        }
        let (same_here, achildren, bchildren) = {
            let slots = self.slots.borrow();
            let sa = &slots[self.index(a)];
            let sb = &slots[self.index(b)];
            let same_here = match (&sa.data, &sb.data) {
                (NodeData::Element(ea), NodeData::Element(eb)) =>
                    ea.name == eb.name
                    && ea.self_closing == eb.self_closing
                    && ea.attr.len() == eb.attr.len()
                    && ea.attr.iter().all(|(k, v)| sb.get_attribute(k) == Some(v)),
                (NodeData::Text(ta), NodeData::Text(tb)) => ta == tb,
                (NodeData::Group, NodeData::Group) => true,
                _ => false
            };
            (same_here, sa.children.clone(), sb.children.clone())
        };
        same_here
            && achildren.len() == bchildren.len()
            && achildren.iter().zip(bchildren.iter()).all(
                |(ca, cb)| self.structurally_eq(*ca, *cb))
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.slots.borrow()[self.index(id)].parent
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.slots.borrow()[self.index(id)].children.clone()
    }

    fn sibling(&self, id: NodeId, offset: isize) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let siblings = self.children(parent);
        let pos = siblings.iter().position(|s| *s == id)?;
        let target = pos.checked_add_signed(offset)?;
        siblings.get(target).copied()
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, 1)
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.sibling(id, -1)
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        match self.slots.borrow()[self.index(id)].data {
            NodeData::Element(_) => NodeKind::Element,
            NodeData::Text(_) => NodeKind::Text,
            NodeData::Group => NodeKind::Group,
        }
    }

    /// The tag name, empty for text and group nodes.
    pub fn name(&self, id: NodeId) -> KString {
        KString::from_ref(self.slots.borrow()[self.index(id)].name())
    }

    pub fn is_self_closing(&self, id: NodeId) -> bool {
        match &self.slots.borrow()[self.index(id)].data {
            NodeData::Element(e) => e.self_closing,
            NodeData::Text(_) | NodeData::Group => false,
        }
    }

    /// The string held by a text node.
    pub fn text_data(&self, id: NodeId) -> Option<KString> {
        match &self.slots.borrow()[self.index(id)].data {
            NodeData::Text(s) => Some(s.clone()),
            NodeData::Element(_) | NodeData::Group => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> Vec<(KString, KString)> {
        match &self.slots.borrow()[self.index(id)].data {
            NodeData::Element(e) => e.attr.clone(),
            NodeData::Text(_) | NodeData::Group => Vec::new(),
        }
    }

    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<KString> {
        let name = normalize_attribute_name(name);
        self.slots.borrow()[self.index(id)].get_attribute(&name).cloned()
    }

    fn set_attribute_(
        &self,
        id: NodeId,
        key: &str,
        val: KString,
        verify: bool,
    ) -> Result<(), MarkupError> {
        let i = self.check_id(id, "node")?;
        let key = normalize_attribute_name(key);
        let tag = {
            let slots = self.slots.borrow();
            match &slots[i].data {
                NodeData::Element(e) => e.name.clone(),
                NodeData::Text(_) | NodeData::Group =>
                    return Err(MarkupErrorKind::type_mismatch(
                        "only elements can have attributes")),
            }
        };
        if verify {
            self.verify_attribute(&tag, &key)?;
        }
        let mut slots = self.slots.borrow_mut();
        if let NodeData::Element(e) = &mut slots[i].data {
            if let Some(existing) = e.attr.iter_mut().find(|(k, _)| *k == key) {
                existing.1 = val;
            } else {
                e.attr.push((key, val));
            }
        }
        Ok(())
    }

    /// Set (or replace) an attribute, verifying it against the rules.
    pub fn set_attribute(
        &self,
        id: NodeId,
        key: &str,
        val: impl IntoKString
    ) -> Result<(), MarkupError> {
        self.set_attribute_(id, key, val.into_kstring(), true)
    }

    /// Like `set_attribute` but skips the verification.
    pub fn set_attribute_unchecked(
        &self,
        id: NodeId,
        key: &str,
        val: impl IntoKString
    ) -> Result<(), MarkupError> {
        self.set_attribute_(id, key, val.into_kstring(), false)
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&self, id: NodeId, key: &str) -> bool {
        let key = normalize_attribute_name(key);
        let i = self.index(id);
        let mut slots = self.slots.borrow_mut();
        if let NodeData::Element(e) = &mut slots[i].data {
            if let Some(pos) = e.attr.iter().position(|(k, _)| *k == key) {
                e.attr.remove(pos);
                return true;
            }
        }
        false
    }
}


/// Escape text for inclusion in HTML element bodies or attribute
/// values.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c)
        }
    }
    out
}
