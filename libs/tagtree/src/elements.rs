//! Per-tag constructor methods, e.g. `doc.div([att("id", "x")], [child])?`.

use crate::{document::{Document, NodeId, ToAttrs, ToBody},
            error::MarkupError};

macro_rules! def_elements {
    ($($name:ident),*) => {
        impl<'r> Document<'r> {
            $(
                pub fn $name(
                    &self,
                    attr: impl ToAttrs,
                    body: impl ToBody
                ) -> Result<NodeId, MarkupError> {
                    self.element(stringify!($name), attr, body)
                }
            )*
        }
    }
}

macro_rules! def_void_elements {
    ($($name:ident),*) => {
        impl<'r> Document<'r> {
            $(
                pub fn $name(
                    &self,
                    attr: impl ToAttrs
                ) -> Result<NodeId, MarkupError> {
                    self.void_element(stringify!($name), attr)
                }
            )*
        }
    }
}

// `select` is missing here as that name is taken by the query
// method; use `element("select", ..)`.
def_elements!(a, b, blockquote, body, button, caption, code, div, em, form,
              h1, h2, h3, head, html, i, label, li, ol, optgroup, option, p,
              pre, script, small, span, strong, table, tbody, td, tfoot, th,
              thead, title, tr, u, ul);

def_void_elements!(br, col, hr, img, input, link, meta, source, wbr);


#[cfg(test)]
mod tests {
    use tagrules::BUILTIN_RULES;

    use crate::document::att;
    use super::*;

    #[test]
    fn t_builders() {
        let h = Document::new(&*BUILTIN_RULES);
        let t = h.table([att("cellspacing", "0")], [
            h.tr([], [
                h.td([], [h.img([att("src", "a.png")]).unwrap(), h.br([]).unwrap()]).unwrap()
            ]).unwrap()
        ]).unwrap();
        assert_eq!(h.to_html_string(t),
                   r#"<table cellspacing="0"><tr><td><img src="a.png" /><br /></td></tr></table>"#);
        assert!(h.div([att("cellspacing", "0")], []).is_err());
        assert!(h.is_self_closing(h.hr([]).unwrap()));
    }
}
