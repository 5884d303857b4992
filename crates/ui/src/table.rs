use std::sync::Arc;

use indexmap::IndexMap;
use rigview_core::{Document, Light, LightView, NodeId, Output};

// Identity and overlay columns present for every fixture.
const FIXED_COLUMNS: [&str; 4] = ["name", "type", "effects", "state_effects"];

/// Shared summary table over the whole fixture set: one row per fixture,
/// one column per distinct function name across the snapshot.
///
/// The column set is fixed when the table is built; fixtures appearing in a
/// later snapshot get a fresh table, never retrofitted columns.
pub struct TableOutput {
    table: NodeId,
}

impl TableOutput {
    /// Build the header from the fixed columns plus every function name in
    /// first-seen order, then attach one row output to each light.
    pub fn new(lights: &mut IndexMap<String, Light>, dest: NodeId, dom: &mut Document) -> Self {
        let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| c.to_string()).collect();
        for light in lights.values() {
            for function in light.functions().keys() {
                if !columns.iter().any(|c| c == function) {
                    columns.push(function.clone());
                }
            }
        }
        let columns: Arc<[String]> = columns.into();

        let table = dom.create_element("table");
        dom.add_class(table, "props");
        dom.add_class(table, "table");
        dom.add_class(table, "table-striped");

        let thead = dom.create_element("thead");
        for column in columns.iter() {
            let th = dom.create_element("th");
            dom.set_text(th, column);
            dom.append_child(thead, th);
        }

        let tbody = dom.create_element("tbody");
        for light in lights.values_mut() {
            let row = TableRowOutput::new(light.name(), &columns, tbody, dom);
            light.add_output(Box::new(row));
        }

        dom.append_child(table, thead);
        dom.append_child(table, tbody);
        dom.append_child(dest, table);

        TableOutput { table }
    }

    pub fn destroy(&mut self, dom: &mut Document) {
        dom.remove(self.table);
    }
}

/// One fixture's row. Each cell shows the fixture's identity attribute when
/// the column names one, otherwise the state value, otherwise nothing.
pub struct TableRowOutput {
    light_name: String,
    columns: Arc<[String]>,
    tr: NodeId,
    cells: Vec<NodeId>,
    selected: bool,
}

impl TableRowOutput {
    fn new(light_name: &str, columns: &Arc<[String]>, tbody: NodeId, dom: &mut Document) -> Self {
        let tr = dom.create_element("tr");
        let cells = columns
            .iter()
            .map(|_| {
                let td = dom.create_element("td");
                dom.append_child(tr, td);
                td
            })
            .collect();
        dom.append_child(tbody, tr);

        TableRowOutput {
            light_name: light_name.to_string(),
            columns: Arc::clone(columns),
            tr,
            cells,
            selected: false,
        }
    }
}

impl Output for TableRowOutput {
    fn select_light(&mut self, name: &str) {
        if name == self.light_name {
            self.selected = true;
        }
    }

    fn deselect_light(&mut self, name: &str) {
        if name == self.light_name {
            self.selected = false;
        }
    }

    fn render(&mut self, light: &LightView<'_>, dom: &mut Document) {
        for (column, &td) in self.columns.iter().zip(&self.cells) {
            let text = match column.as_str() {
                "name" => light.name.to_string(),
                "type" => light.type_name.to_string(),
                _ => light
                    .state
                    .get(column)
                    .map(|value| value.to_string())
                    .unwrap_or_default(),
            };
            dom.set_text(td, &text);
        }

        // Compare before mutating so an unchanged selection costs no writes.
        if self.selected && !dom.has_class(self.tr, "selected") {
            dom.add_class(self.tr, "selected");
        } else if !self.selected && dom.has_class(self.tr, "selected") {
            dom.remove_class(self.tr, "selected");
        }
    }

    fn destroy(&mut self, dom: &mut Document) {
        dom.remove(self.tr);
    }
}
