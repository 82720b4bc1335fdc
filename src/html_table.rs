//! Rendering of a `Table` as an HTML `table` element, with each cell
//! converted by a `SpecializerRegistry`.

use anyhow::Result;
use tagrules::AttributeRules;
use tagtree::{att, Document, NodeId};

use crate::{specializer::{Specializer, SpecializerRegistry},
            table::Table};

/// Class put on all generated table elements, see `support/style.css`.
pub const TABLE_CLASS: &str = "tbldis-gen";

pub struct TableHtmlMaker<'t> {
    table: &'t Table,
    registry: SpecializerRegistry,
}

impl<'t> TableHtmlMaker<'t> {
    /// Using the built-in specializers.
    pub fn new(table: &'t Table) -> Self {
        Self::with_registry(table, SpecializerRegistry::default())
    }

    pub fn with_registry(table: &'t Table, registry: SpecializerRegistry) -> Self {
        TableHtmlMaker { table, registry }
    }

    /// Add a specializer that is tried after the ones already
    /// present.
    pub fn add_specialization(&mut self, specializer: impl Specializer + 'static) {
        self.registry.add(specializer);
    }

    pub fn registry(&self) -> &SpecializerRegistry {
        &self.registry
    }

    /// Build the `table` element in `doc`. Each call is a separate
    /// render pass.
    pub fn render(&mut self, doc: &Document) -> Result<NodeId> {
        self.registry.reset();
        let mut ths = Vec::with_capacity(self.table.headers().len());
        for name in self.table.header_names() {
            ths.push(doc.th([att("class", TABLE_CLASS)], [doc.escaped_text(name)])?);
        }
        let thead = doc.thead([], [doc.tr([], ths)?])?;

        let mut trs = Vec::with_capacity(self.table.len());
        for row in self.table.rows() {
            let mut tds = Vec::with_capacity(row.len());
            for cell in row.cells() {
                let content = self.registry.dispatch(doc, cell)?;
                tds.push(doc.td([att("class", TABLE_CLASS)], [content])?);
            }
            trs.push(doc.tr([att("class", TABLE_CLASS)], tds)?);
        }
        let tbody = doc.tbody([], trs)?;

        Ok(doc.table([att("cellspacing", "0"),
                      att("cellpadding", "0"),
                      att("class", TABLE_CLASS)],
                     [thead, tbody])?)
    }

    /// Render and serialize, validating attributes against `rules`.
    pub fn html(&mut self, rules: &AttributeRules) -> Result<String> {
        let doc = Document::new(rules);
        let table = self.render(&doc)?;
        Ok(doc.to_html_string(table))
    }
}
