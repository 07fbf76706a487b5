use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Table")]
    pub label: String,
    #[tabled(rename = "Rows")]
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
            label: label.to_string(),
            value: value.to_string(),
        });
    }

    pub fn build(&self) -> String {
        if self.rows.is_empty() {
            return String::new();
        }

        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self::new()
    }
}

pub fn stats_table(stats: &crate::storage::DbStats) -> String {
    let mut builder = TableBuilder::new();
    for (label, count) in stats.rows() {
        builder.add_row(label, &count.to_string());
    }
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DbStats;

    #[test]
    fn test_stats_table_lists_every_table() {
        let stats = DbStats { groups: 3, lecturers: 5, subjects: 6, students: 40, grades: 612 };
        let rendered = stats_table(&stats);
        for label in ["Groups", "Lecturers", "Subjects", "Students", "Grades", "612"] {
            assert!(rendered.contains(label), "missing {}", label);
        }
    }

    #[test]
    fn test_empty_builder_renders_nothing() {
        assert!(TableBuilder::new().build().is_empty());
    }
}
