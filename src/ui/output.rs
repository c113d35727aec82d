use crate::entity::EntityReference;
use crate::relationship::RelationshipGroup;
use crate::ui::{Icons, theme};
use owo_colors::OwoColorize;

pub fn header(text: &str) {
    println!("{} {}", Icons::ROCKET, text.style(theme().header.clone()));
}

pub fn status(icon: &str, label: &str, value: &str) {
    println!("{} {}: {}", icon, label.style(theme().dim.clone()), value);
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn section(title: &str) {
    println!();
    println!("━{}━", title.style(theme().header.clone()));
}

pub fn empty(message: &str) {
    println!("{} {}", Icons::EMPTY, message.style(theme().muted.clone()));
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().dim.clone()), value);
}

/// `client:5  Acme Corp`
pub fn entity_line(entity: &EntityReference) {
    println!(
        "{} {}  {}",
        Icons::ENTITY,
        entity.key().to_string().style(theme().key.clone()),
        entity.display_label
    );
}

/// Entity header followed by its non-empty summary fields
pub fn entity_detail(entity: &EntityReference) {
    entity_line(entity);
    for (field, value) in &entity.summary_fields {
        let value = match value {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        summary_row(&format!("{}:", field), &value);
    }
}

pub fn group_heading(group: &RelationshipGroup) {
    let kind = group.kind();
    println!();
    println!(
        "{} {} {}",
        Icons::LINK,
        kind.as_str().to_uppercase().style(theme().kind(kind)),
        muted(&format!("({})", group.count()))
    );
}
