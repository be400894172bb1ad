use clap::{Parser, Subcommand};
use futures::executor::block_on;
use rulegraph::prelude::*;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Inspect, round-trip and restructure persisted rule chains
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the component catalog JSON file (array of component descriptors)
    #[arg(short, long)]
    components: String,

    /// Optional editor configuration JSON file
    #[arg(long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a rule chain and print its nodes, links and validity
    Inspect {
        /// Path to the rule chain metadata JSON file
        metadata: String,
    },
    /// Decode and re-encode a rule chain, printing the canonical metadata
    Roundtrip {
        metadata: String,
    },
    /// Move a set of nodes (by metadata index) into a new nested rule chain
    Extract {
        metadata: String,
        /// Indices of the rule nodes to extract, e.g. `0,1,3`
        #[arg(short, long, value_delimiter = ',')]
        nodes: Vec<usize>,
        /// Name of the nested rule chain
        #[arg(long, default_value = "Nested chain")]
        name: String,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let catalog = ComponentCatalog::from_file(&cli.components)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load components: {}", e)));
    let config = match &cli.config {
        Some(path) => EditorConfig::from_file(path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to load config: {}", e))),
        None => EditorConfig::default(),
    };

    match cli.command {
        Command::Inspect { metadata } => run_inspect(&load_metadata(&metadata), &catalog, &config),
        Command::Roundtrip { metadata } => {
            run_roundtrip(&load_metadata(&metadata), &catalog, &config)
        }
        Command::Extract {
            metadata,
            nodes,
            name,
        } => run_extract(load_metadata(&metadata), catalog, config, &nodes, &name),
    }
}

fn load_metadata(path: &str) -> RuleChainMetaData {
    let json = fs::read_to_string(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to read metadata file '{}': {}", path, e))
    });
    RuleChainMetaData::from_json(&json)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to parse metadata JSON: {}", e)))
}

fn run_inspect(metadata: &RuleChainMetaData, catalog: &ComponentCatalog, config: &EditorConfig) {
    let decode_start = Instant::now();
    let graph = decode(metadata, catalog, config);
    let decode_duration = decode_start.elapsed();

    println!("\n--- Nodes ---");
    for node in graph.rule_nodes() {
        let error = node
            .error
            .as_deref()
            .map(|e| format!("  [error: {}]", e))
            .unwrap_or_default();
        println!(
            "  {} '{}' ({}) at ({}, {}){}",
            node.id, node.name, node.component.clazz, node.position.x, node.position.y, error
        );
    }

    println!("\n--- Links ---");
    for edge in graph.edges() {
        let describe = |connector| {
            graph
                .node_by_connector(connector)
                .map(|n| {
                    if graph.is_input_node(n.id) {
                        "Input".to_string()
                    } else {
                        format!("'{}'", n.name)
                    }
                })
                .unwrap_or_else(|| "?".to_string())
        };
        println!(
            "  {} -> {}  [{}]",
            describe(edge.source),
            describe(edge.destination),
            edge.label()
        );
    }

    println!("\n--- Summary ---");
    println!("Rule nodes:   {}", graph.rule_nodes().count());
    println!("Links:        {}", graph.edges().len());
    println!("Valid:        {}", !graph.is_invalid());
    println!("Decoded in:   {:?}", decode_duration);
}

fn run_roundtrip(metadata: &RuleChainMetaData, catalog: &ComponentCatalog, config: &EditorConfig) {
    let graph = decode(metadata, catalog, config);
    let encoded = encode(&graph);
    let json = encoded
        .to_json_pretty()
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize metadata: {}", e)));
    println!("{}", json);
}

fn run_extract(
    metadata: RuleChainMetaData,
    catalog: ComponentCatalog,
    config: EditorConfig,
    indices: &[usize],
    name: &str,
) {
    let store = InMemoryRuleChainStore::new(catalog);
    let id = store.insert(RuleChain::named("Parent chain"), metadata);

    let mut editor = block_on(RuleChainEditor::open(
        store,
        MemoryClipboard::new(&config),
        config,
        &id,
    ))
    .unwrap_or_else(|e| exit_with_error(&format!("Failed to open rule chain: {}", e)));

    let ids: Vec<NodeId> = editor
        .graph()
        .rule_nodes()
        .enumerate()
        .filter(|(index, _)| indices.contains(index))
        .map(|(_, node)| node.id)
        .collect();
    for node in ids {
        editor.graph_mut().select(Selectable::Node(node));
    }
    if !editor.can_extract() {
        exit_with_error(
            "Selection cannot be extracted: it needs two or more nodes and a single entry point",
        );
    }

    let nested = block_on(editor.extract_selection(name))
        .unwrap_or_else(|e| exit_with_error(&format!("Extraction failed: {}", e)));
    let outcome = block_on(editor.save())
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to save parent chain: {}", e)));
    println!("Parent chain save: {:?}", outcome);

    let print = |title: &str, metadata: &RuleChainMetaData| {
        let json = metadata
            .to_json_pretty()
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to serialize metadata: {}", e)));
        println!("\n--- {} ---\n{}", title, json);
    };
    print("Nested chain", &nested.metadata);
    print("Parent chain", editor.last_saved());
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
