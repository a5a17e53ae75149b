use std::path::PathBuf;

use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use realtime_routing::cluster::{InstanceConfig, InstancePruner};
use realtime_routing::{ExternalViewSnapshot, LowLevelConsumerRoutingTableBuilder, PoolStats, RoutingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "realtime-routing")]
#[command(about = "Compute routing table pools from an external view snapshot", long_about = None)]
struct Args {
    /// External view JSON: { segment: { server: state } }
    #[arg(long)]
    snapshot: PathBuf,

    /// Instance config JSON array; instances not listed are treated as active
    #[arg(long)]
    instances: Option<PathBuf>,

    /// Routing config TOML file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Table name used in logs and output
    #[arg(long, default_value = "table")]
    table_name: String,

    /// Number of routing tables to generate (overrides config)
    #[arg(long)]
    table_count: Option<usize>,

    /// Seed for reproducible output (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Generate tables in parallel
    #[arg(long)]
    parallel: bool,

    /// Also print every generated table
    #[arg(long)]
    dump_tables: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "realtime_routing=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = match &args.config {
        Some(path) => RoutingConfig::load(path)?,
        None => {
            let mut config = RoutingConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };
    if let Some(count) = args.table_count {
        config.routing_table_count = count;
    }
    if let Some(seed) = args.seed {
        config.seed = Some(seed);
    }
    config.parallel |= args.parallel;

    let snapshot = ExternalViewSnapshot::from_json_str(&std::fs::read_to_string(&args.snapshot)?)?;
    tracing::info!("Loaded external view with {} segments", snapshot.len());

    let instances = match &args.instances {
        Some(path) => InstanceConfig::list_from_json_str(&std::fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    let pruner = InstancePruner::new(&instances);
    tracing::debug!("Instance pruner: {:?}", pruner);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let builder = LowLevelConsumerRoutingTableBuilder::new(config);
    let (prepared, pool) = builder.compute_with_rng(&args.table_name, &snapshot, &pruner, &mut rng)?;

    let stats = PoolStats::compute(&args.table_name, &prepared, &pool);
    if args.dump_tables {
        let output = serde_json::json!({ "stats": stats, "tables": pool });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    }

    Ok(())
}
