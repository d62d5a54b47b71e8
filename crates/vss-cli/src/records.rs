//! Record and index-spec persistence for the CLI.
//!
//! The engine core keeps serialization out of scope, so the CLI owns it:
//! records live as JSONL rows (one [`RecordUpsert`] per line) and index
//! specifications as a JSON array, both under the data directory. Each CLI
//! invocation reloads the rows, rebuilds the configured indexes, and runs
//! its command.

use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tracing::debug;

use vss_core::{IndexAlgorithm, IndexParams, Metric, Record, RecordUpsert};

/// Filename for the JSONL record rows.
pub const RECORDS_FILENAME: &str = "records.jsonl";

/// Filename for the index specifications.
pub const INDEXES_FILENAME: &str = "indexes.json";

// ============================================================================
// IndexSpec
// ============================================================================

/// A persisted index specification: rebuilt and published on every run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexSpec {
    /// Published index name.
    pub name: String,

    /// Distance metric.
    pub metric: Metric,

    /// Search algorithm.
    pub algorithm: IndexAlgorithm,

    /// Build parameters.
    #[serde(default)]
    pub params: IndexParams,
}

// ============================================================================
// Records
// ============================================================================

/// Load all record rows from the data directory. Missing file means empty.
pub fn load_records(data_dir: &Path) -> anyhow::Result<Vec<RecordUpsert>> {
    let path = data_dir.join(RECORDS_FILENAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    read_rows(&path)
}

/// Read record rows from a JSONL file (one [`RecordUpsert`] per line).
pub fn read_rows(path: &Path) -> anyhow::Result<Vec<RecordUpsert>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);

    let mut rows = Vec::new();
    for (line_num, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read {}", path.display()))?;
        if line.trim().is_empty() {
            continue;
        }
        let row: RecordUpsert = serde_json::from_str(&line).with_context(|| {
            format!("Invalid record on line {} of {}", line_num + 1, path.display())
        })?;
        rows.push(row);
    }

    debug!("Loaded {} records from {:?}", rows.len(), path);
    Ok(rows)
}

/// Merge new rows into the stored records (last-write-wins by id) and save.
pub fn upsert_records(data_dir: &Path, new_rows: Vec<RecordUpsert>) -> anyhow::Result<usize> {
    let mut by_id: BTreeMap<String, RecordUpsert> = load_records(data_dir)?
        .into_iter()
        .map(|row| (row.record.id.to_string(), row))
        .collect();
    for row in new_rows {
        by_id.insert(row.record.id.to_string(), row);
    }

    let rows: Vec<RecordUpsert> = by_id.into_values().collect();
    save_records(data_dir, &rows)?;
    Ok(rows.len())
}

/// Remove rows by id; returns how many were actually removed.
pub fn remove_records(data_dir: &Path, ids: &[String]) -> anyhow::Result<usize> {
    let rows = load_records(data_dir)?;
    let before = rows.len();
    let rows: Vec<RecordUpsert> = rows
        .into_iter()
        .filter(|row| !ids.contains(&row.record.id.to_string()))
        .collect();
    let removed = before - rows.len();
    if removed > 0 {
        save_records(data_dir, &rows)?;
    }
    Ok(removed)
}

fn save_records(data_dir: &Path, rows: &[RecordUpsert]) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    let path = data_dir.join(RECORDS_FILENAME);

    let mut file =
        File::create(&path).with_context(|| format!("Failed to write {}", path.display()))?;
    for row in rows {
        let line = serde_json::to_string(row)?;
        writeln!(file, "{}", line)?;
    }

    debug!("Saved {} records to {:?}", rows.len(), path);
    Ok(())
}

// ============================================================================
// Index specs
// ============================================================================

/// Load index specifications. Missing file means none.
pub fn load_index_specs(data_dir: &Path) -> anyhow::Result<Vec<IndexSpec>> {
    let path = data_dir.join(INDEXES_FILENAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content =
        fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid {}", path.display()))
}

/// Save index specifications, sorted by name.
pub fn save_index_specs(data_dir: &Path, mut specs: Vec<IndexSpec>) -> anyhow::Result<()> {
    fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create {}", data_dir.display()))?;
    specs.sort_by(|a, b| a.name.cmp(&b.name));
    let path = data_dir.join(INDEXES_FILENAME);
    let content = serde_json::to_string_pretty(&specs)?;
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

// ============================================================================
// Demo catalog
// ============================================================================

/// The demo product catalog: seven records with name, price, brand,
/// category, and a description to embed.
pub fn seed_records() -> Vec<Record> {
    let products: [(&str, &str, f64, &str, &str, &str); 7] = [
        ("id:1", "Top-handle", 77.0, "CathyDesign", "Purse",
         "A purse with top handle. Multiple colors available. Suitable for occasions such as going to the office, weekends hang-outs, going out for dinners, and parties."),
        ("id:2", "Boots", 160.0, "LapinArt", "Shoes",
         "Vegan-leather boots. Multiple colors available. Suitable to wear in spring and autumn. Suitable to both formal and casual occasions."),
        ("id:3", "speedy", 245.0, "LapinArt", "Purse",
         "A purse with top handle and cross-body straps. Only one color available. Suitable for occasions such as going to the office, weekends hang-outs, shopping, and parties."),
        ("id:4", "Dressing", 120.0, "CathyDesign", "Shoes",
         "Vegan-leather dressing shoes. Only one color available. Suitable to wear all seasons. Suitable to formal occasions."),
        ("id:5", "Messenger", 229.0, "LapinArt", "Purse",
         "A purse with cross-body straps. Multiple colors available. Suitable for casual occasions."),
        ("id:6", "Handle", 249.0, "LapinArt", "Purse",
         "A purse with handle. Only one color available. Suitable for traveling in all seasons."),
        ("id:7", "Long boots", 235.0, "CathyDesign", "Shoes",
         "Vegan-leather long boots. Multiple colors available. Suitable to wear in autumn and winter. Suitable for formal occasions."),
    ];

    products
        .into_iter()
        .map(|(id, name, price, brand, category, description)| {
            Record::new(id)
                .with_text("Name", name)
                .with_number("Price", price)
                .with_tag("Brand", brand)
                .with_tag("Category", category)
                .with_text("description", description)
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
