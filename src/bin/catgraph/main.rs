//! Binary entry point for the catgraph inspection CLI.
#![forbid(unsafe_code)]

mod config;

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;

use catgraph::{
    CategoryGraph, CategoryId, CsvHierarchy, GraphOptions, GraphStats, Language, Relation,
    SnapshotFormat,
};
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use config::CliConfig;

const DEFAULT_LANGUAGE: &str = "en";

#[derive(Parser, Debug)]
#[command(
    name = "catgraph",
    version,
    about = "Inspect compact category graphs",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(flatten)]
    input: InputArgs,

    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = OutputFormat::Text,
        help = "Output format for structured responses"
    )]
    format: OutputFormat,

    #[arg(
        long,
        global = true,
        env = "CATGRAPH_CONFIG",
        value_name = "FILE",
        help = "Config file (defaults to <config dir>/catgraph/config.toml)"
    )]
    config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        env = "CATGRAPH_LOG",
        default_value = "warn",
        help = "Log filter directive written to stderr"
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(long, global = true, value_name = "FILE", help = "CSV file with id,label[,cost]")]
    categories: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "CSV file with parent,child")]
    edges: Option<PathBuf>,

    #[arg(long, global = true, value_name = "FILE", help = "CSV file with category,page")]
    pages: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        value_name = "FILE",
        conflicts_with = "categories",
        help = "Load a snapshot written by `export` instead of CSV files"
    )]
    snapshot: Option<PathBuf>,

    #[arg(long, global = true, value_name = "CODE", help = "Language tag of the hierarchy")]
    language: Option<String>,

    #[arg(
        long,
        global = true,
        value_enum,
        help = "Cost for categories without an explicit cost"
    )]
    cost_policy: Option<CostPolicyArg>,

    #[arg(long, global = true, help = "Cost used by the uniform policy")]
    uniform_cost: Option<f64>,

    #[arg(long, global = true, help = "Fail when a category is its own parent")]
    reject_self_loops: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    #[command(about = "Print category, edge and cost statistics")]
    Stats,

    #[command(about = "List the children of a category")]
    Children {
        #[arg(value_name = "ID")]
        id: u64,
    },

    #[command(about = "List the parents of a category")]
    Parents {
        #[arg(value_name = "ID")]
        id: u64,
    },

    #[command(about = "List the member pages of a category")]
    Pages {
        #[arg(value_name = "ID")]
        id: u64,
    },

    #[command(about = "Show the dense index, label and cost of a category")]
    Lookup {
        #[arg(value_name = "ID")]
        id: u64,
    },

    #[command(about = "Write a snapshot of the loaded graph")]
    Export {
        #[arg(long, value_name = "FILE")]
        out: PathBuf,

        #[arg(long, help = "Use snappy framing regardless of the file extension")]
        compress: bool,
    },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub(crate) enum CostPolicyArg {
    Uniform,
    #[value(name = "log-membership")]
    LogMembership,
}

#[derive(Serialize)]
struct RelationReport {
    id: CategoryId,
    relation: &'static str,
    known: bool,
    items: Vec<u64>,
}

#[derive(Serialize)]
struct LookupReport {
    id: CategoryId,
    found: bool,
    index: Option<u32>,
    label: Option<String>,
    cost: Option<f64>,
}

#[derive(Serialize)]
struct ExportReport {
    path: PathBuf,
    categories: usize,
    compressed: bool,
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;
    let config = CliConfig::load(cli.config.clone())?;
    debug!(config = ?config.path(), "catgraph.cli.config");
    let graph = load_graph(&cli.input, &config)?;

    match cli.command {
        Command::Stats => {
            let stats = graph.stats();
            emit(cli.format, &stats, || print_stats_text(&stats))?;
        }
        Command::Children { id } => {
            let id = CategoryId(id);
            let items = graph.children(id).into_iter().map(u64::from).collect();
            let report = relation_report(&graph, id, Relation::Children, items);
            emit(cli.format, &report, || print_relation_text(&graph, &report))?;
        }
        Command::Parents { id } => {
            let id = CategoryId(id);
            let items = graph.parents(id).into_iter().map(u64::from).collect();
            let report = relation_report(&graph, id, Relation::Parents, items);
            emit(cli.format, &report, || print_relation_text(&graph, &report))?;
        }
        Command::Pages { id } => {
            let id = CategoryId(id);
            let items = graph.pages(id).into_iter().map(u64::from).collect();
            let report = relation_report(&graph, id, Relation::Pages, items);
            emit(cli.format, &report, || print_relation_text(&graph, &report))?;
        }
        Command::Lookup { id } => {
            let id = CategoryId(id);
            let index = graph.category_index(id);
            let report = LookupReport {
                id,
                found: index.is_some(),
                index: index.map(u32::from),
                label: index.map(|i| graph.label_of(i).to_string()),
                cost: index.map(|i| graph.cost_of(i)),
            };
            emit(cli.format, &report, || match (report.index, &report.label, report.cost) {
                (Some(index), Some(label), Some(cost)) => {
                    println!("id={} index={index} label={label} cost={cost}", report.id)
                }
                _ => println!("category {} not found", report.id),
            })?;
        }
        Command::Export { out, compress } => {
            let format = if compress {
                SnapshotFormat::JsonSnappy
            } else {
                SnapshotFormat::from_path(&out)
            };
            let file = File::create(&out)?;
            graph.write_snapshot(file, format)?;
            let report = ExportReport {
                path: out,
                categories: graph.len(),
                compressed: format == SnapshotFormat::JsonSnappy,
            };
            emit(cli.format, &report, || {
                println!(
                    "wrote {} categories to {}",
                    report.categories,
                    report.path.display()
                )
            })?;
        }
    }
    Ok(())
}

fn init_tracing(level: &str) -> Result<(), Box<dyn Error>> {
    let filter = EnvFilter::try_new(level)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .try_init()
        .map_err(|err| format!("failed to install logger: {err}"))?;
    Ok(())
}

fn load_graph(input: &InputArgs, config: &CliConfig) -> Result<CategoryGraph, Box<dyn Error>> {
    let options: GraphOptions = config.graph_options(
        input.cost_policy,
        input.uniform_cost,
        input.reject_self_loops,
    )?;
    let source = config.source();

    let snapshot = match &input.categories {
        Some(_) => None,
        None => input.snapshot.clone().or_else(|| source.snapshot.clone()),
    };
    if let Some(path) = snapshot {
        let file = File::open(&path)?;
        return Ok(CategoryGraph::read_snapshot(
            file,
            SnapshotFormat::from_path(&path),
            options,
        )?);
    }

    let categories = input
        .categories
        .clone()
        .or_else(|| source.categories.clone())
        .ok_or("--categories or --snapshot is required")?;
    let language = Language::new(
        input
            .language
            .as_deref()
            .or(config.language())
            .unwrap_or(DEFAULT_LANGUAGE),
    )?;
    let mut hierarchy = CsvHierarchy::new(language, categories);
    if let Some(edges) = input.edges.clone().or_else(|| source.edges.clone()) {
        hierarchy = hierarchy.with_edges(edges);
    }
    if let Some(pages) = input.pages.clone().or_else(|| source.pages.clone()) {
        hierarchy = hierarchy.with_pages(pages);
    }
    Ok(CategoryGraph::load(&mut hierarchy, options)?)
}

fn relation_report(
    graph: &CategoryGraph,
    id: CategoryId,
    relation: Relation,
    items: Vec<u64>,
) -> RelationReport {
    RelationReport {
        id,
        relation: relation.as_str(),
        known: graph.contains(id),
        items,
    }
}

fn emit<T, F>(format: OutputFormat, value: &T, printer: F) -> Result<(), Box<dyn Error>>
where
    T: Serialize,
    F: FnOnce(),
{
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(value)?;
            println!("{json}");
        }
        OutputFormat::Text => printer(),
    }
    Ok(())
}

fn print_stats_text(stats: &GraphStats) {
    let cost = |value: Option<f64>| value.map_or_else(|| "-".to_string(), |v| format!("{v:.4}"));
    println!("Graph ({}):", stats.language);
    println!(
        "  categories={} edges={} page_memberships={} distinct_pages={}",
        stats.categories, stats.edges, stats.page_memberships, stats.distinct_pages
    );
    println!(
        "  roots={} leaves={} max_children={} max_parents={}",
        stats.roots, stats.leaves, stats.max_children, stats.max_parents
    );
    println!(
        "Costs:\n  min={} max={} mean={}",
        cost(stats.minimum_cost),
        cost(stats.maximum_cost),
        cost(stats.mean_cost)
    );
}

fn print_relation_text(graph: &CategoryGraph, report: &RelationReport) {
    if !report.known {
        println!("category {} not found", report.id);
        return;
    }
    if report.items.is_empty() {
        println!("category {} has no {}", report.id, report.relation);
        return;
    }
    for item in &report.items {
        if report.relation == Relation::Pages.as_str() {
            println!("{item}");
        } else {
            let label = graph.label(CategoryId(*item)).unwrap_or_default();
            println!("{item}\t{label}");
        }
    }
}
