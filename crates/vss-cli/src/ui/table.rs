//! Table rendering for CLI output using comfy-table.

use comfy_table::presets::NOTHING;
use comfy_table::{Cell, CellAlignment, Table};

use vss_core::{IndexInfo, Neighbor, Record};

/// Render query results as a table: id, distance, and a few attributes.
///
/// `records` supplies catalog attributes per neighbor; neighbors without a
/// catalog record render attribute columns empty.
pub fn render_results_table(results: &[Neighbor], records: &[Option<Record>]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["ID", "DISTANCE", "NAME", "CATEGORY"]);

    for (neighbor, record) in results.iter().zip(records.iter()) {
        let name = record
            .as_ref()
            .and_then(|r| r.attr("Name"))
            .map(|v| v.to_string())
            .unwrap_or_default();
        let category = record
            .as_ref()
            .and_then(|r| r.attr("Category"))
            .map(|v| v.to_string())
            .unwrap_or_default();

        table.add_row(vec![
            Cell::new(neighbor.id.as_str()),
            Cell::new(format!("{:.6}", neighbor.distance)).set_alignment(CellAlignment::Right),
            Cell::new(name),
            Cell::new(category),
        ]);
    }

    table.to_string()
}

/// Render published index summaries as a table.
pub fn render_indexes_table(indexes: &[IndexInfo]) -> String {
    let mut table = Table::new();
    table.load_preset(NOTHING);
    table.set_header(vec!["NAME", "DIM", "METRIC", "ALGORITHM", "VECTORS"]);

    for info in indexes {
        table.add_row(vec![
            Cell::new(&info.name),
            Cell::new(info.dim).set_alignment(CellAlignment::Right),
            Cell::new(info.metric.to_string()),
            Cell::new(info.algorithm.to_string()),
            Cell::new(info.count).set_alignment(CellAlignment::Right),
        ]);
    }

    table.to_string()
}
