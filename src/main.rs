//! solid-ldes - publish an RDF file as a Linked Data Event Stream
//!
//! Usage:
//!   solid-ldes --input data/observations.ttl --base-url http://localhost:3000/stream/
//!   solid-ldes --input data/observations.nt --config publisher.json --capacity 50
//!   solid-ldes --input data/observations.ttl --base-url http://pod/stream/ --dry-run
//!
//! Set `SOLID_LDES_LOG_FORMAT=json` for JSON logs and `RUST_LOG` to change the filter.

use clap::Parser;
use solid_ldes::bucketing::{parse_date_time, read_timestamp, Millis};
use solid_ldes::core::Triple;
use solid_ldes::extraction::extract;
use solid_ldes::parsing::{parse_document, RdfSyntax};
use solid_ldes::{
    ActivePublisher, Error, HttpStorage, MemoryStorage, Publisher, PublisherConfig, Result,
    Storage,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "solid-ldes")]
#[command(about = "Publish timestamped RDF resources as a time-bucketed event stream")]
struct Args {
    /// Input file path (Turtle or N-Triples)
    #[arg(short, long)]
    input: String,

    /// Stream root container URL, ending with '/'
    #[arg(short, long)]
    base_url: Option<String>,

    /// JSON configuration file
    #[arg(short, long)]
    config: Option<String>,

    /// Maximum members per bucket
    #[arg(long)]
    capacity: Option<usize>,

    /// Boundary of the first bucket (xsd:dateTime); defaults to the oldest input timestamp
    #[arg(long)]
    initial_timestamp: Option<String>,

    /// Publish into memory and print the documents instead of writing to the server
    #[arg(long)]
    dry_run: bool,

    /// Bearer token for the document server
    #[arg(long)]
    token: Option<String>,
}

fn init_tracing() {
    let log_format = std::env::var("SOLID_LDES_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "solid_ldes=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

fn load_config(args: &Args) -> Result<PublisherConfig> {
    let mut config = match &args.config {
        Some(path) => PublisherConfig::from_file(path)?,
        None => PublisherConfig::default(),
    };
    if let Some(base_url) = &args.base_url {
        config.base_url.clone_from(base_url);
    }
    if args.capacity.is_some() {
        config.capacity = args.capacity;
    }
    if args.token.is_some() {
        config.auth_token.clone_from(&args.token);
    }
    config.validate()?;
    Ok(config)
}

/// First bucket boundary: the flag if given, otherwise the oldest member timestamp.
fn initial_boundary(args: &Args, config: &PublisherConfig, triples: &[Triple]) -> Result<Millis> {
    if let Some(value) = &args.initial_timestamp {
        return parse_date_time(value)
            .map(|ts| ts.timestamp_millis())
            .ok_or_else(|| Error::Config(format!("invalid --initial-timestamp '{}'", value)));
    }
    let oldest = extract(triples, &config.member_predicate, "")
        .iter()
        .filter_map(|r| read_timestamp(r, &config.timestamp_path).ok())
        .map(|ts| ts.timestamp_millis())
        .min();
    oldest.ok_or_else(|| {
        Error::Config("no member with a timestamp found; pass --initial-timestamp".to_string())
    })
}

async fn publish<S: Storage>(
    storage: S,
    config: PublisherConfig,
    boundary: Millis,
    triples: &[Triple],
) -> Result<ActivePublisher<S>> {
    let mut stream = Publisher::new(storage, config)?.initialize(boundary).await?;
    let report = stream.append(triples).await?;

    println!("Admitted: {}", report.admitted.len());
    println!("Rejected: {}", report.rejected.len());
    for rejection in &report.rejected {
        println!("  {}: {}", rejection.subject, rejection.error);
    }

    println!("\nBuckets:");
    for bucket in stream.index().buckets() {
        println!("  {} ({} members)", stream.bucket_url(bucket.boundary()), bucket.len());
    }
    Ok(stream)
}

#[tokio::main]
async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    println!("Solid LDES Publisher");
    println!("====================\n");

    let config = load_config(&args)?;
    let syntax = RdfSyntax::from_extension(&args.input).unwrap_or(RdfSyntax::Turtle);
    let text = std::fs::read_to_string(&args.input)?;
    let triples = parse_document(&text, syntax)?;
    let boundary = initial_boundary(&args, &config, &triples)?;

    println!("Configuration:");
    println!("  Input file: {} ({} triples)", args.input, triples.len());
    println!("  Stream: {}", config.base_url);
    println!(
        "  Capacity: {}",
        config.capacity.map_or_else(|| "unbounded".to_string(), |c| c.to_string())
    );
    println!("  Dry run: {}", args.dry_run);
    println!();

    if args.dry_run {
        let stream = publish(MemoryStorage::new(), config, boundary, &triples).await?;
        println!("\nDocuments:");
        for url in stream.storage().urls().await {
            println!("  {}", url);
        }
    } else {
        let storage = HttpStorage::new(config.timeout_secs, config.auth_token.clone())?;
        publish(storage, config, boundary, &triples).await?;
    }

    Ok(())
}
