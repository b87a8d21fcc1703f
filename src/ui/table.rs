use crate::graph::DependencyGraph;
use crate::object::ObjectDescriptor;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn add_row(&mut self, label: &str, value: &str) {
        self.rows.push(TableRow {
            metric: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        let table = Table::new(&self.rows).with(Style::rounded()).to_string();

        table
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Tabled)]
struct ObjectRow {
    #[tabled(rename = "Object")]
    object: String,
    #[tabled(rename = "Kind")]
    kind: String,
}

pub fn objects_table(objects: &[ObjectDescriptor]) -> String {
    if objects.is_empty() {
        return String::new();
    }

    let rows: Vec<ObjectRow> = objects
        .iter()
        .map(|obj| ObjectRow {
            object: obj.id(),
            kind: obj.kind.to_string(),
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct EdgeRow {
    #[tabled(rename = "Source")]
    source: String,
    #[tabled(rename = "Relationship")]
    relation: String,
    #[tabled(rename = "Target")]
    target: String,
    #[tabled(rename = "Depth")]
    depth: u32,
}

/// Table of every edge in a graph, direction already resolved: the
/// source column depends on the target column.
pub fn edges_table(graph: &DependencyGraph) -> String {
    if graph.edge_count() == 0 {
        return String::new();
    }

    let rows: Vec<EdgeRow> = graph
        .edges()
        .iter()
        .map(|edge| EdgeRow {
            source: edge.from.id(),
            relation: edge.kind.to_string(),
            target: edge.to.id(),
            depth: edge.depth,
        })
        .collect();

    Table::new(&rows).with(Style::rounded()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectKind;
    use crate::relation::Relationship;

    #[test]
    fn test_objects_table_lists_ids() {
        let objects = vec![
            ObjectDescriptor::new("sales", "orders", ObjectKind::Table),
            ObjectDescriptor::new("sales", "order_totals", ObjectKind::View),
        ];

        let table = objects_table(&objects);
        assert!(table.contains("sales.orders"));
        assert!(table.contains("sales.order_totals"));
        assert!(table.contains("view"));
    }

    #[test]
    fn test_edges_table_reads_source_to_target() {
        let view = ObjectDescriptor::new("sales", "order_totals", ObjectKind::View);
        let table = ObjectDescriptor::new("sales", "orders", ObjectKind::Table);

        let mut graph = DependencyGraph::new();
        graph.add_edge(&Relationship::depends_on(view, table));

        let rendered = edges_table(&graph);
        assert!(rendered.contains("sales.order_totals"));
        assert!(rendered.contains("sales.orders"));
        assert!(rendered.contains("depends_on"));
    }

    #[test]
    fn test_empty_tables_render_nothing() {
        assert!(objects_table(&[]).is_empty());
        assert!(edges_table(&DependencyGraph::new()).is_empty());
        assert!(TableBuilder::new().build().is_empty());
    }

    #[test]
    fn test_builder_rows() {
        let mut builder = TableBuilder::new();
        builder.add_row("Objects", "12");
        builder.add_row("Relationships", "30");
        let table = builder.build();
        assert!(table.contains("Objects"));
        assert!(table.contains("30"));
    }
}
