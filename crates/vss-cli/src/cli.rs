//! CLI definition and command dispatch for VSS.
//!
//! This module defines the command-line interface using `clap` and provides
//! the `run()` function that dispatches commands to the engine.
//!
//! ## Configuration Precedence
//!
//! Configuration is resolved with the following precedence (highest to lowest):
//! 1. CLI flags (e.g., `--config`, `--provider`, `--data`)
//! 2. Environment variables (`VSS_CONFIG`, `VSS_PROVIDER`, `VSS_DATA`)
//! 3. Config file (`~/.vss/config.yaml` or path from `--config`/`VSS_CONFIG`)
//! 4. Built-in defaults
//!
//! ## Process Model
//!
//! The engine is in-memory: every invocation reloads the persisted record
//! rows, rebuilds and publishes the configured indexes, then runs its
//! command. Records and index specifications persist in the data directory;
//! indexes themselves are always rebuilt from the rows.

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

use clap::{Parser, Subcommand};

use crate::records::{self, IndexSpec};
use crate::ui::{render_indexes_table, render_results_table, ColorMode, MessageType, Style};

use vss_core::{
    AttrValue, CreateIndexRequest, IndexAlgorithm, Metric, ProviderKind, QueryRequest,
    QueryResponse, RecordId, RecordUpsert, SearchFilter, VssConfig, VssEngine, DEFAULT_TOP_K,
    VSS_HOME_DIR,
};

// ============================================================================
// CLI Definition
// ============================================================================

/// Vector Similarity Service – vector index and KNN query engine
#[derive(Parser, Debug)]
#[command(name = "vss")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, global = true, env = "VSS_VERBOSE")]
    pub verbose: bool,

    /// Path to configuration file (default: ~/.vss/config.yaml)
    #[arg(long, global = true, env = "VSS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Data directory for records and index specs (default: ~/.vss)
    #[arg(long, global = true, env = "VSS_DATA")]
    pub data: Option<PathBuf>,

    /// Embedding provider override (remote/mock)
    #[arg(long, global = true, env = "VSS_PROVIDER")]
    pub provider: Option<String>,

    /// Color output mode: always, never, or auto (default: auto)
    #[arg(long, global = true, env = "VSS_COLOR", default_value = "auto")]
    pub color: String,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the demo product catalog (seven records) into the data directory
    #[command(after_help = r#"EXAMPLES:
    # Seed offline with the deterministic mock provider
    vss --provider mock seed

    # Typical first-time workflow
    vss --provider mock seed && vss create vss_products && vss query vss_products --like id:7 -k 2
"#)]
    Seed,

    /// Ingest records from a JSONL file (one record per line)
    #[command(after_help = r#"EXAMPLES:
    # Rows carry {"record":{"id":...,"attrs":{...}},"vector":[...]};
    # rows without a vector are embedded from their description attribute
    vss add products.jsonl
"#)]
    Add {
        /// JSONL file of records to ingest.
        file: PathBuf,
    },

    /// Remove records by id
    Rm {
        /// Record ids to remove.
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Build and publish an index over the current records
    #[command(after_help = r#"EXAMPLES:
    # Flat exact index under the engine's default metric
    vss create vss_products

    # Partitioned approximate index under cosine
    vss create vss_products --metric cosine --algorithm ivf --partitions 4
"#)]
    Create {
        /// Index name.
        index: String,

        /// Distance metric: l2, cosine, or ip (default from config)
        #[arg(long)]
        metric: Option<String>,

        /// Search algorithm: flat or ivf (default from config)
        #[arg(long)]
        algorithm: Option<String>,

        /// Number of partitions for ivf indexes
        #[arg(long)]
        partitions: Option<usize>,

        /// Lloyd iterations for centroid training
        #[arg(long)]
        kmeans_iterations: Option<usize>,
    },

    /// Drop an index (no-op if it does not exist)
    Drop {
        /// Index name.
        index: String,
    },

    /// Run a KNN query against an index
    #[command(after_help = r#"EXAMPLES:
    # Find the two records most similar to a stored record
    vss query vss_products --like id:7 -k 2

    # Query by text (embedded via the configured provider)
    vss query vss_products --text "vegan leather boots" -k 3

    # Query by raw vector with a tag filter
    vss query vss_products --vector "0.1,0.2,0.3" --filter Category=Purse

    # Machine-readable output
    vss query vss_products --like id:7 --json
"#)]
    Query {
        /// Index name.
        index: String,

        /// Text to embed into the query vector.
        #[arg(long, conflicts_with_all = ["vector", "like"])]
        text: Option<String>,

        /// Comma-separated query vector components.
        #[arg(long, conflicts_with = "like")]
        vector: Option<String>,

        /// Use a stored record's vector as the query.
        #[arg(long, value_name = "ID")]
        like: Option<String>,

        /// Number of neighbors to return.
        #[arg(short, long, default_value_t = DEFAULT_TOP_K)]
        k: usize,

        /// Partitions to probe on ivf indexes (default from config).
        #[arg(long)]
        nprobe: Option<usize>,

        /// Attribute filter, e.g. Category=Purse (repeatable, ANDed).
        #[arg(long, value_name = "KEY=VALUE")]
        filter: Vec<String>,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show records, vectors, and published indexes
    Status {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, set up logging, and dispatch the command.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Always show warnings; show debug info only when --verbose is set.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!(
        "vss_core={},vss_cli={},vss_embed={}",
        log_level, log_level, log_level
    );
    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .init();

    let color_mode = ColorMode::from_str(&cli.color).unwrap_or(ColorMode::Auto);
    let style = Style::new(color_mode);

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            let hint = match &cli.config {
                Some(path) => format!("Check your config at {}", path.display()),
                None => "Check your global config at ~/.vss/config.yaml".to_string(),
            };
            eprintln!(
                "{}",
                style.error_with_context(
                    "Failed to load configuration",
                    Some(&e.to_string()),
                    Some(&hint),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let data_dir = match resolve_data_dir(&cli) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &e.to_string()));
            return ExitCode::FAILURE;
        }
    };

    let result = match &cli.command {
        Command::Seed => cmd_seed(&config, &data_dir, &style),
        Command::Add { file } => cmd_add(&config, &data_dir, file, &style),
        Command::Rm { ids } => cmd_rm(&data_dir, ids, &style),
        Command::Create {
            index,
            metric,
            algorithm,
            partitions,
            kmeans_iterations,
        } => cmd_create(
            &config,
            &data_dir,
            index,
            metric.as_deref(),
            algorithm.as_deref(),
            *partitions,
            *kmeans_iterations,
            &style,
        ),
        Command::Drop { index } => cmd_drop(&data_dir, index, &style),
        Command::Query {
            index,
            text,
            vector,
            like,
            k,
            nprobe,
            filter,
            json,
        } => cmd_query(
            &config,
            &data_dir,
            index,
            text.as_deref(),
            vector.as_deref(),
            like.as_deref(),
            *k,
            *nprobe,
            filter,
            *json,
            &style,
        ),
        Command::Status { json } => cmd_status(&config, &data_dir, *json, &style),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", style.message(MessageType::Err, &format!("{:#}", e)));
            ExitCode::FAILURE
        }
    }
}

// ============================================================================
// Configuration and engine assembly
// ============================================================================

fn load_config(cli: &Cli) -> anyhow::Result<VssConfig> {
    let mut config = match &cli.config {
        Some(path) => VssConfig::load(path)?,
        None => VssConfig::load_default()?,
    };

    if let Some(provider) = &cli.provider {
        config.embedding.provider = ProviderKind::from_str(provider).unwrap_or_default();
    }
    Ok(config)
}

fn resolve_data_dir(cli: &Cli) -> anyhow::Result<PathBuf> {
    if let Some(dir) = &cli.data {
        return Ok(dir.clone());
    }
    dirs::home_dir()
        .map(|home| home.join(VSS_HOME_DIR))
        .ok_or_else(|| anyhow::anyhow!("Cannot resolve home directory; pass --data"))
}

/// Build an engine and ingest all persisted records.
///
/// An embedding provider is attached only when needed: for text queries, or
/// when a persisted row carries no vector.
fn load_engine(
    config: &VssConfig,
    data_dir: &Path,
    needs_embedder: bool,
) -> anyhow::Result<VssEngine> {
    let rows = records::load_records(data_dir)?;
    let needs_embedder = needs_embedder || rows.iter().any(|r| r.vector.is_none());

    let engine = if needs_embedder {
        VssEngine::from_config(config.clone())?
    } else {
        VssEngine::new(config.clone())
    };

    for row in rows {
        engine.upsert_record(row)?;
    }
    Ok(engine)
}

/// Rebuild and publish every persisted index spec.
fn publish_indexes(engine: &VssEngine, data_dir: &Path) -> anyhow::Result<()> {
    for spec in records::load_index_specs(data_dir)? {
        engine.create_index(
            &CreateIndexRequest::new(&spec.name)
                .with_metric(spec.metric)
                .with_algorithm(spec.algorithm)
                .with_params(spec.params),
        )?;
    }
    Ok(())
}

// ============================================================================
// Commands
// ============================================================================

fn cmd_seed(config: &VssConfig, data_dir: &Path, style: &Style) -> anyhow::Result<()> {
    let engine = VssEngine::from_config(config.clone())?;

    let seeds = records::seed_records();
    let mut rows = Vec::with_capacity(seeds.len());
    for record in seeds {
        let id = record.id.clone();
        engine.upsert_record(RecordUpsert::from_record(record.clone()))?;
        // Persist the embedded vector so later runs never re-embed.
        let vector = engine.store().get(&id)?;
        rows.push(RecordUpsert::with_vector(record, vector.to_vec()));
    }

    let count = rows.len();
    let total = records::upsert_records(data_dir, rows)?;
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Seeded {} demo products into {} ({} records total)",
                count,
                data_dir.display(),
                total
            ),
        )
    );
    println!(
        "{}",
        style.message(
            MessageType::Hint,
            "Next: vss create vss_products && vss query vss_products --like id:7 -k 2",
        )
    );
    Ok(())
}

fn cmd_add(
    config: &VssConfig,
    data_dir: &Path,
    file: &Path,
    style: &Style,
) -> anyhow::Result<()> {
    let new_rows = records::read_rows(file)?;
    if new_rows.is_empty() {
        println!("{}", style.message(MessageType::Info, "No records in input"));
        return Ok(());
    }

    let needs_embedder = new_rows.iter().any(|r| r.vector.is_none());
    let engine = load_engine(config, data_dir, needs_embedder)?;

    // Ingest first so dimension mismatches fail before anything persists.
    let mut rows = Vec::with_capacity(new_rows.len());
    for row in new_rows {
        let record = row.record.clone();
        engine.upsert_record(row)?;
        let vector = engine.store().get(&record.id)?;
        rows.push(RecordUpsert::with_vector(record, vector.to_vec()));
    }

    let count = rows.len();
    let total = records::upsert_records(data_dir, rows)?;
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!("Added {} records ({} total)", count, total),
        )
    );
    Ok(())
}

fn cmd_rm(data_dir: &Path, ids: &[String], style: &Style) -> anyhow::Result<()> {
    let removed = records::remove_records(data_dir, ids)?;
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!("Removed {} of {} records", removed, ids.len()),
        )
    );
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_create(
    config: &VssConfig,
    data_dir: &Path,
    index: &str,
    metric: Option<&str>,
    algorithm: Option<&str>,
    partitions: Option<usize>,
    kmeans_iterations: Option<usize>,
    style: &Style,
) -> anyhow::Result<()> {
    let metric = match metric {
        Some(s) => Metric::from_str(s).map_err(|e| anyhow::anyhow!(e))?,
        None => config.index.metric,
    };
    let algorithm = match algorithm {
        Some(s) => IndexAlgorithm::from_str(s).map_err(|e| anyhow::anyhow!(e))?,
        None => config.index.algorithm,
    };
    let mut params = config.index.params;
    if let Some(partitions) = partitions {
        params = params.with_partitions(partitions);
    }
    if let Some(iterations) = kmeans_iterations {
        params = params.with_kmeans_iterations(iterations);
    }

    // Build once now: this validates the records and reports the real count.
    let engine = load_engine(config, data_dir, false)?;
    let info = engine.create_index(
        &CreateIndexRequest::new(index)
            .with_metric(metric)
            .with_algorithm(algorithm)
            .with_params(params),
    )?;

    let mut specs: Vec<IndexSpec> = records::load_index_specs(data_dir)?
        .into_iter()
        .filter(|s| s.name != index)
        .collect();
    specs.push(IndexSpec {
        name: index.to_string(),
        metric,
        algorithm,
        params,
    });
    records::save_index_specs(data_dir, specs)?;

    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "Published index `{}` ({} vectors, dim {}, {}, {})",
                info.name, info.count, info.dim, info.metric, info.algorithm
            ),
        )
    );
    Ok(())
}

fn cmd_drop(data_dir: &Path, index: &str, style: &Style) -> anyhow::Result<()> {
    let specs = records::load_index_specs(data_dir)?;
    let before = specs.len();
    let specs: Vec<IndexSpec> = specs.into_iter().filter(|s| s.name != index).collect();
    let dropped = specs.len() < before;
    if dropped {
        records::save_index_specs(data_dir, specs)?;
        println!(
            "{}",
            style.message(MessageType::Ok, &format!("Dropped index `{}`", index))
        );
    } else {
        // Tolerant drop: absent index is success, not an error.
        println!(
            "{}",
            style.message(
                MessageType::Info,
                &format!("Index `{}` does not exist; nothing to do", index),
            )
        );
    }
    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn cmd_query(
    config: &VssConfig,
    data_dir: &Path,
    index: &str,
    text: Option<&str>,
    vector: Option<&str>,
    like: Option<&str>,
    k: usize,
    nprobe: Option<usize>,
    filters: &[String],
    json: bool,
    style: &Style,
) -> anyhow::Result<()> {
    let engine = load_engine(config, data_dir, text.is_some())?;
    publish_indexes(&engine, data_dir)?;

    let filter = parse_filters(filters)?;
    let response: QueryResponse = match (text, vector, like) {
        (Some(text), None, None) => {
            let mut request = QueryRequest::by_text(index, text, k);
            request.filter = filter;
            request.nprobe = nprobe;
            engine.query(&request)?
        }
        (None, Some(vector), None) => {
            let mut request = QueryRequest::by_vector(index, parse_vector(vector)?, k);
            request.filter = filter;
            request.nprobe = nprobe;
            engine.query(&request)?
        }
        (None, None, Some(like)) => {
            engine.query_like(index, &RecordId::new(like), k, filter, nprobe)?
        }
        _ => anyhow::bail!("Pass exactly one of --text, --vector, or --like"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
        return Ok(());
    }

    let attrs: Vec<_> = response
        .results
        .iter()
        .map(|n| engine.catalog().get(&n.id))
        .collect::<Result<_, _>>()?;
    println!("{}", render_results_table(&response.results, &attrs));
    println!(
        "{}",
        style.message(
            MessageType::Ok,
            &format!(
                "{} matches in `{}` ({}, dim {})",
                response.results.len(),
                response.index_name,
                response.metric,
                response.dim
            ),
        )
    );
    Ok(())
}

fn cmd_status(
    config: &VssConfig,
    data_dir: &Path,
    json: bool,
    style: &Style,
) -> anyhow::Result<()> {
    let engine = load_engine(config, data_dir, false)?;
    publish_indexes(&engine, data_dir)?;
    let stats = engine.stats()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    let dim = stats
        .dimension
        .map(|d| format!(", dim {}", d))
        .unwrap_or_default();
    println!(
        "{}",
        style.message(
            MessageType::Info,
            &format!("{} records, {} vectors{}", stats.records, stats.vectors, dim),
        )
    );
    if stats.indexes.is_empty() {
        println!(
            "{}",
            style.message(MessageType::Hint, "No indexes; run `vss create <name>`")
        );
    } else {
        println!("{}", render_indexes_table(&stats.indexes));
    }
    Ok(())
}

// ============================================================================
// Argument parsing helpers
// ============================================================================

/// Parse `KEY=VALUE` filter arguments into a search filter.
///
/// Values that parse as numbers match numeric attributes; everything else
/// matches tag attributes.
fn parse_filters(filters: &[String]) -> anyhow::Result<Option<SearchFilter>> {
    if filters.is_empty() {
        return Ok(None);
    }

    let mut filter = SearchFilter::new();
    for raw in filters {
        let (key, value) = raw
            .split_once('=')
            .ok_or_else(|| anyhow::anyhow!("Invalid filter `{}` (expected KEY=VALUE)", raw))?;
        let value = match value.parse::<f64>() {
            Ok(number) => AttrValue::Number(number),
            Err(_) => AttrValue::Tag(value.to_string()),
        };
        filter = filter.with_equals(key, value);
    }
    Ok(Some(filter))
}

/// Parse a comma-separated vector argument.
fn parse_vector(raw: &str) -> anyhow::Result<Vec<f32>> {
    raw.split(',')
        .map(|part| {
            part.trim()
                .parse::<f32>()
                .map_err(|_| anyhow::anyhow!("Invalid vector component `{}`", part.trim()))
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
