//! Serialization of node trees to HTML text.

use std::io::Write;

use crate::document::{html_escape, Document, NodeData, NodeId, Slot};

pub const DOCTYPE: &str = "<!DOCTYPE html>\n";

fn print_slot(
    doc: &Document,
    slots: &[Slot],
    id: NodeId,
    out: &mut impl Write
) -> std::io::Result<()> {
    let slot = &slots[doc.index(id)];
    match &slot.data {
        NodeData::Element(e) => {
            out.write_all(b"<")?;
            out.write_all(e.name.as_bytes())?;
            for (key, val) in &e.attr {
                out.write_all(b" ")?;
                out.write_all(key.as_bytes())?;
                out.write_all(b"=\"")?;
                out.write_all(html_escape(val).as_bytes())?;
                out.write_all(b"\"")?;
            }
            if e.self_closing {
                out.write_all(b" />")?;
            } else {
                out.write_all(b">")?;
                for child in &slot.children {
                    print_slot(doc, slots, *child, out)?;
                }
                out.write_all(b"</")?;
                out.write_all(e.name.as_bytes())?;
                out.write_all(b">")?;
            }
        }
        // Verbatim: escaping is the creator's job (see
        // `Document::escaped_text`).
        NodeData::Text(s) => out.write_all(s.as_bytes())?,
        NodeData::Group => {
            for (i, child) in slot.children.iter().enumerate() {
                if i > 0 {
                    out.write_all(b"\n")?;
                }
                print_slot(doc, slots, *child, out)?;
            }
        }
    }
    Ok(())
}

impl<'r> Document<'r> {
    /// Print the serialized subtree at `id`.
    pub fn print_fragment(&self, id: NodeId, out: &mut impl Write) -> std::io::Result<()> {
        let slots = self.slots.borrow();
        print_slot(self, &slots, id, out)
    }

    pub fn print_document(&self, id: NodeId, out: &mut impl Write) -> std::io::Result<()> {
        out.write_all(DOCTYPE.as_bytes())?;
        self.print_fragment(id, out)
    }

    /// The serialized subtree at `id`.
    pub fn to_html_string(&self, id: NodeId) -> String {
        let mut v = Vec::new();
        self.print_fragment(id, &mut v).expect("no I/O errors can happen");
        String::from_utf8(v).expect("only concatenated str values")
    }

    /// `to_html_string` with a doctype in front.
    pub fn to_html_document(&self, id: NodeId) -> String {
        let mut v = Vec::new();
        self.print_document(id, &mut v).expect("no I/O errors can happen");
        String::from_utf8(v).expect("only concatenated str values")
    }
}
