use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use nodechain_compute::{ComputeConfig, HttpComputeService};
use nodechain_config::{GraphDef, NodeOutput};
use nodechain_runtime::{
  BlobRegistry, ExecutionMode, ExecutorRegistry, FailurePolicy, Runtime, RuntimeConfig,
};
use nodechain_store::{GraphStore, InMemoryGraphStore};
use nodechain_workflow::Workflow;

/// Nodechain - runs canvas graphs of language model prompts
#[derive(Parser)]
#[command(name = "nodechain")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Path to the data directory (default: ~/.nodechain)
  #[arg(long, global = true)]
  data_dir: Option<PathBuf>,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Run every node of a graph
  Run {
    /// Path to the graph file (JSON)
    graph_file: PathBuf,

    #[command(flatten)]
    compute: ComputeArgs,

    /// Run independent nodes concurrently, at most this many at once
    #[arg(long)]
    concurrency: Option<usize>,

    /// Stop the run at the first failed node
    #[arg(long)]
    halt_on_failure: bool,

    /// Directory generated images are written to
    #[arg(long)]
    image_dir: Option<PathBuf>,
  },

  /// Print the execution order of a graph
  Order {
    /// Path to the graph file (JSON)
    graph_file: PathBuf,

    /// Group the order into wavefronts of independent nodes
    #[arg(long)]
    wavefronts: bool,
  },

  /// Run a single node of a graph
  Node {
    /// Path to the graph file (JSON)
    graph_file: PathBuf,

    /// The node ID to execute
    #[arg(long)]
    node: String,

    #[command(flatten)]
    compute: ComputeArgs,

    /// Directory generated images are written to
    #[arg(long)]
    image_dir: Option<PathBuf>,
  },
}

#[derive(Args)]
struct ComputeArgs {
  /// Base URL of the compute service
  #[arg(long)]
  api_url: String,

  /// User id sent with every request (default: read from <data-dir>/user-id)
  #[arg(long)]
  user_id: Option<String>,

  /// Per-request timeout in milliseconds
  #[arg(long)]
  timeout_ms: Option<u64>,
}

fn main() -> Result<()> {
  let cli = Cli::parse();

  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_writer(io::stderr)
    .init();

  let data_dir = match cli.data_dir {
    Some(dir) => dir,
    None => dirs::home_dir()
      .context("could not determine home directory")?
      .join(".nodechain"),
  };

  let rt = tokio::runtime::Runtime::new()?;
  match cli.command {
    Some(Commands::Run {
      graph_file,
      compute,
      concurrency,
      halt_on_failure,
      image_dir,
    }) => {
      let mode = match concurrency {
        Some(max_concurrency) => ExecutionMode::Wavefront { max_concurrency },
        None => ExecutionMode::Sequential,
      };
      let failure_policy = if halt_on_failure {
        FailurePolicy::Halt
      } else {
        FailurePolicy::Continue
      };
      let config = RuntimeConfig {
        mode,
        failure_policy,
      };
      rt.block_on(run_graph(graph_file, compute, config, image_dir, data_dir))?;
    }
    Some(Commands::Order {
      graph_file,
      wavefronts,
    }) => {
      rt.block_on(print_order(graph_file, wavefronts))?;
    }
    Some(Commands::Node {
      graph_file,
      node,
      compute,
      image_dir,
    }) => {
      rt.block_on(run_node(graph_file, node, compute, image_dir, data_dir))?;
    }
    None => {
      println!("nodechain - use --help to see available commands");
    }
  }

  Ok(())
}

async fn run_graph(
  graph_file: PathBuf,
  compute: ComputeArgs,
  config: RuntimeConfig,
  image_dir: Option<PathBuf>,
  data_dir: PathBuf,
) -> Result<()> {
  let graph = load_graph(&graph_file).await?;
  eprintln!(
    "Loaded graph with {} nodes and {} edges",
    graph.nodes.len(),
    graph.edges.len()
  );

  let store = Arc::new(InMemoryGraphStore::new(graph));
  let blobs = BlobRegistry::new();
  let runtime = build_runtime(store.clone(), &compute, &data_dir, blobs.clone(), config).await?;

  let cancel = CancellationToken::new();
  let on_interrupt = cancel.clone();
  tokio::spawn(async move {
    if tokio::signal::ctrl_c().await.is_ok() {
      on_interrupt.cancel();
    }
  });

  let result = runtime.run(cancel).await.context("graph run failed")?;

  eprintln!("Run completed: {}", result.run_id);
  eprintln!("Nodes executed: {}", result.node_reports.len());
  for report in result.failed() {
    eprintln!("Node '{}' failed", report.node_id);
  }

  // Print outputs as JSON
  let mut outputs = BTreeMap::new();
  for node in store.nodes().await {
    if let Some(output) = node.data.output {
      save_image(&blobs, &output, &node.id, image_dir.as_deref()).await?;
      outputs.insert(node.id, output);
    }
  }

  println!("{}", serde_json::to_string_pretty(&outputs)?);

  Ok(())
}

async fn run_node(
  graph_file: PathBuf,
  node_id: String,
  compute: ComputeArgs,
  image_dir: Option<PathBuf>,
  data_dir: PathBuf,
) -> Result<()> {
  let graph = load_graph(&graph_file).await?;
  let node = graph
    .get_node(&node_id)
    .with_context(|| format!("node '{}' not found in graph", node_id))?;

  eprintln!("Running node: {} (type: {})", node_id, node.node_type);

  let store = Arc::new(InMemoryGraphStore::new(graph));
  let blobs = BlobRegistry::new();
  let runtime = build_runtime(
    store,
    &compute,
    &data_dir,
    blobs.clone(),
    RuntimeConfig::default(),
  )
  .await?;

  let output = runtime
    .run_node(&node_id)
    .await
    .context("node execution failed")?;

  eprintln!("Node execution completed");
  save_image(&blobs, &output, &node_id, image_dir.as_deref()).await?;

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

async fn print_order(graph_file: PathBuf, wavefronts: bool) -> Result<()> {
  let workflow = Workflow::from(load_graph(&graph_file).await?);

  let output = if wavefronts {
    serde_json::to_value(workflow.wavefronts().context("failed to schedule graph")?)?
  } else {
    serde_json::to_value(
      workflow
        .try_topological_order()
        .context("failed to schedule graph")?,
    )?
  };

  println!("{}", serde_json::to_string_pretty(&output)?);

  Ok(())
}

async fn load_graph(graph_file: &Path) -> Result<GraphDef> {
  let content = tokio::fs::read_to_string(graph_file)
    .await
    .with_context(|| format!("failed to read graph file: {}", graph_file.display()))?;

  serde_json::from_str(&content)
    .with_context(|| format!("failed to parse graph file: {}", graph_file.display()))
}

async fn build_runtime(
  store: Arc<InMemoryGraphStore>,
  compute: &ComputeArgs,
  data_dir: &Path,
  blobs: BlobRegistry,
  config: RuntimeConfig,
) -> Result<Runtime> {
  let user_id = match &compute.user_id {
    Some(user_id) => user_id.clone(),
    None => read_user_id(data_dir).await?,
  };

  let mut compute_config = ComputeConfig::new(&compute.api_url, user_id);
  if let Some(timeout_ms) = compute.timeout_ms {
    compute_config = compute_config.with_timeout_ms(timeout_ms);
  }
  let service =
    Arc::new(HttpComputeService::new(compute_config).context("failed to create compute client")?);

  let registry = ExecutorRegistry::with_defaults(service.clone(), blobs);
  Ok(Runtime::new(store, service, registry, config))
}

/// The locally stored user id, or empty when none has been stored yet.
async fn read_user_id(data_dir: &Path) -> Result<String> {
  let path = data_dir.join("user-id");
  match tokio::fs::read_to_string(&path).await {
    Ok(content) => Ok(content.trim().to_string()),
    Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
    Err(e) => Err(e).with_context(|| format!("failed to read user id: {}", path.display())),
  }
}

async fn save_image(
  blobs: &BlobRegistry,
  output: &NodeOutput,
  node_id: &str,
  image_dir: Option<&Path>,
) -> Result<()> {
  let (Some(dir), Some(handle)) = (image_dir, output.as_image()) else {
    return Ok(());
  };
  let Some(payload) = blobs.get(handle) else {
    return Ok(());
  };

  tokio::fs::create_dir_all(dir)
    .await
    .with_context(|| format!("failed to create image directory: {}", dir.display()))?;

  let path = dir.join(image_file_name(node_id, &payload.content_type));
  tokio::fs::write(&path, &payload.bytes)
    .await
    .with_context(|| format!("failed to write image: {}", path.display()))?;

  eprintln!("Saved image for '{}' to {}", node_id, path.display());
  Ok(())
}

/// File name for a node's image. Node ids come from the graph document, so
/// anything but ASCII alphanumerics, `-` and `_` is replaced to keep the file
/// inside the image directory.
fn image_file_name(node_id: &str, content_type: &str) -> String {
  let stem: String = node_id
    .chars()
    .map(|c| {
      if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
        c
      } else {
        '_'
      }
    })
    .collect();
  let stem = if stem.is_empty() { "node".to_string() } else { stem };
  format!("{}.{}", stem, extension(content_type))
}

fn extension(content_type: &str) -> &'static str {
  match content_type {
    "image/jpeg" => "jpg",
    "image/gif" => "gif",
    "image/webp" => "webp",
    _ => "png",
  }
}
