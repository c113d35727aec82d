use crate::entity::EntityReference;
use crate::relationship::Relationship;
use tabled::{Table, Tabled, settings::Style};

#[derive(Tabled)]
pub struct TableRow {
    #[tabled(rename = "Metric")]
    pub metric: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

#[derive(Default)]
pub struct TableBuilder {
    rows: Vec<TableRow>,
}

impl TableBuilder {
    pub fn new() -> Self {
        Self::default()
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
        Table::new(&self.rows).with(Style::rounded()).to_string()
    }
}

pub fn stats_table(stats: &[(&str, String)]) -> String {
    let mut builder = TableBuilder::new();
    for (label, value) in stats {
        builder.add_row(label, value);
    }
    builder.build()
}

#[derive(Tabled)]
struct RelationshipRow {
    #[tabled(rename = "Dir")]
    direction: &'static str,
    #[tabled(rename = "Entity")]
    key: String,
    #[tabled(rename = "Label")]
    label: String,
    #[tabled(rename = "Strength")]
    strength: String,
}

/// One row per relationship, showing the counterpart of the subject
pub fn relationship_table(relationships: &[Relationship]) -> String {
    let rows: Vec<RelationshipRow> = relationships
        .iter()
        .map(|rel| {
            let other = rel.counterpart();
            RelationshipRow {
                direction: if rel.is_reverse { "<-" } else { "->" },
                key: other.key().to_string(),
                label: other.display_label.clone(),
                strength: format!("{:.1}", rel.strength),
            }
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}

#[derive(Tabled)]
struct EntityRow {
    #[tabled(rename = "Type")]
    entity_type: &'static str,
    #[tabled(rename = "ID")]
    id: i64,
    #[tabled(rename = "Label")]
    label: String,
}

pub fn entity_table(entities: &[EntityReference]) -> String {
    let rows: Vec<EntityRow> = entities
        .iter()
        .map(|entity| EntityRow {
            entity_type: entity.entity_type.as_str(),
            id: entity.id,
            label: entity.display_label.clone(),
        })
        .collect();
    Table::new(rows).with(Style::rounded()).to_string()
}
