pub mod icons;
pub mod output;
pub mod table;
pub mod theme;

pub use icons::Icons;
pub use output::{
    empty, entity_detail, entity_line, error, group_heading, header, muted, section, status, success,
    summary_row,
};
pub use table::{TableBuilder, entity_table, relationship_table, stats_table};
pub use theme::{Theme, theme};
