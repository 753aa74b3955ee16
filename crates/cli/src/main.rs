use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use orchestrator::{summarize, KeywordPlanner, PlaceSearchOrchestrator, PlaceSummary, Planner};
use pipeline::PipelineConfig;
use places::{BudgetBand, Provider, ResultMetadata, ResultSet, UserQuery};
use rand::Rng;
use serde::Serialize;
use sources::{FetcherRegistry, JsonFileFetcher, SimulatedFetcher};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// place-scout - Multi-provider place search
#[derive(Parser)]
#[command(name = "place-scout")]
#[command(about = "Aggregate, deduplicate and rank nearby places from several listing providers", long_about = None)]
struct Cli {
    /// Directory with `<provider>.json` fixture files; simulated providers when omitted
    #[arg(short, long, global = true)]
    fixtures: Option<PathBuf>,

    /// TOML file with dedupe and expansion settings
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Results below which the radius is widened (overrides the config file)
    #[arg(long, global = true)]
    min_results: Option<usize>,

    /// Maximum number of radius expansions (overrides the config file)
    #[arg(long, global = true)]
    max_expansions: Option<u32>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places around a point
    Search {
        #[command(flatten)]
        location: Location,

        /// Lowest acceptable price tier (0-4)
        #[arg(long)]
        budget_min: Option<u8>,

        /// Highest acceptable price tier (0-4)
        #[arg(long)]
        budget_max: Option<u8>,

        /// Cuisine to look for (repeatable)
        #[arg(long = "cuisine")]
        cuisines: Vec<String>,

        /// Dietary restriction to honour (repeatable)
        #[arg(long = "diet")]
        diets: Vec<String>,

        /// Providers in preference order, comma separated
        #[arg(long, value_delimiter = ',', default_value = "google,yelp")]
        sources: Vec<Provider>,

        /// Maximum records requested from each provider
        #[arg(long, default_value = "8")]
        limit: usize,

        /// Never widen the radius
        #[arg(long)]
        no_expand: bool,

        /// Print the result set as JSON
        #[arg(long)]
        json: bool,
    },

    /// Turn a free-text request into a search plan
    Plan {
        /// What you are looking for, e.g. "cheap vegetarian indian"
        request: String,

        #[command(flatten)]
        location: Location,

        /// Also run the planned search
        #[arg(long)]
        run: bool,
    },

    /// Run benchmark to test performance
    Benchmark {
        /// Number of searches to make
        #[arg(long, default_value = "100")]
        requests: usize,

        /// Maximum distance of random centers from the default center, in degrees
        #[arg(long, default_value = "0.05")]
        spread: f64,
    },
}

#[derive(Args, Clone, Copy)]
struct Location {
    /// Latitude of the search center
    #[arg(long, default_value = "40.7128", allow_hyphen_values = true)]
    lat: f64,

    /// Longitude of the search center
    #[arg(long, default_value = "-74.0060", allow_hyphen_values = true)]
    lon: f64,

    /// Search radius in meters
    #[arg(long, default_value = "800")]
    radius: u32,
}

/// JSON shape of `search --json`
#[derive(Serialize)]
struct JsonOutput<'a> {
    meta: &'a ResultMetadata,
    results: Vec<PlaceSummary>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `--json` output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = load_config(&cli)?;
    let orchestrator = PlaceSearchOrchestrator::new(build_registry(cli.fixtures.as_ref()), config);

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Search {
            location,
            budget_min,
            budget_max,
            cuisines,
            diets,
            sources,
            limit,
            no_expand,
            json,
        } => {
            let query = UserQuery::new(location.lat, location.lon, location.radius)
                .with_budget(BudgetBand {
                    min: budget_min,
                    max: budget_max,
                })
                .with_cuisines(cuisines)
                .with_dietary_restrictions(diets)
                .with_sources(sources)
                .with_limit_per_source(limit)
                .with_expansion(!no_expand);
            handle_search(&orchestrator, query, json).await?
        }
        Commands::Plan {
            request,
            location,
            run,
        } => handle_plan(&orchestrator, &request, location, run).await?,
        Commands::Benchmark { requests, spread } => {
            handle_benchmark(&orchestrator, requests, spread).await?
        }
    }

    Ok(())
}

/// Config file (or defaults) with command-line overrides applied
fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(min_results) = cli.min_results {
        config.expansion.min_results = min_results;
    }
    if let Some(max_expansions) = cli.max_expansions {
        config.expansion.max_expansions = max_expansions;
    }
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Fixture-backed fetchers when a directory is given, simulated ones otherwise
fn build_registry(fixtures: Option<&PathBuf>) -> FetcherRegistry {
    Provider::ALL
        .into_iter()
        .fold(FetcherRegistry::new(), |registry, provider| match fixtures {
            Some(dir) => registry.register(JsonFileFetcher::new(provider, dir)),
            None => registry.register(SimulatedFetcher::new(provider)),
        })
}

/// Handle the 'search' command
async fn handle_search(
    orchestrator: &PlaceSearchOrchestrator,
    query: UserQuery,
    json: bool,
) -> Result<()> {
    let result = orchestrator.run(query).await?;
    if json {
        print_json(&result)
    } else {
        print_results(&result);
        Ok(())
    }
}

/// Handle the 'plan' command
async fn handle_plan(
    orchestrator: &PlaceSearchOrchestrator,
    request: &str,
    location: Location,
    run: bool,
) -> Result<()> {
    let plan = KeywordPlanner.plan(request).await?;
    println!("{}", "Search plan:".bold().blue());
    println!("{}", serde_json::to_string_pretty(&plan)?);

    let query = plan.into_query(location.lat, location.lon, location.radius);
    println!("{}", "Query:".bold().blue());
    println!("{}", serde_json::to_string_pretty(&query)?);

    if run {
        let result = orchestrator.run(query).await?;
        print_results(&result);
    }
    Ok(())
}

/// Handle the 'benchmark' command
async fn handle_benchmark(
    orchestrator: &PlaceSearchOrchestrator,
    requests: usize,
    spread: f64,
) -> Result<()> {
    if requests == 0 {
        bail!("--requests must be at least 1");
    }
    if !spread.is_finite() || spread < 0.0 {
        bail!("--spread must be a non-negative number of degrees");
    }

    // Random centers around the default center
    let mut rng = rand::rng();
    let queries: Vec<UserQuery> = (0..requests)
        .map(|_| {
            let lat = 40.7128 + rng.random_range(-spread..=spread);
            let lon = -74.0060 + rng.random_range(-spread..=spread);
            UserQuery::new(lat, lon, 800)
        })
        .collect();

    // Use tokio::spawn to make concurrent requests
    let wall_clock = Instant::now();
    let mut handles = Vec::with_capacity(requests);
    for query in queries {
        let orchestrator = orchestrator.clone();
        handles.push(tokio::spawn(async move {
            let start = Instant::now();
            let result = orchestrator.run(query).await?;
            Ok::<_, anyhow::Error>((start.elapsed(), result.meta.expansions))
        }));
    }

    let mut timings: Vec<Duration> = Vec::with_capacity(requests);
    let mut expansions = 0u64;
    for handle in handles {
        let (elapsed, rounds) = handle.await??;
        timings.push(elapsed);
        expansions += u64::from(rounds);
    }
    let wall_time = wall_clock.elapsed();

    timings.sort();
    let total: Duration = timings.iter().sum();
    let avg_latency = total / timings.len() as u32;
    let percentile = |p: f64| timings[((timings.len() as f64 * p) as usize).min(timings.len() - 1)];
    let throughput = requests as f64 / wall_time.as_secs_f64();

    println!("{}", "Benchmark results:".bold().blue());
    println!("Searches: {}", requests);
    println!("Wall time: {:?}", wall_time);
    println!("Average latency: {:?}", avg_latency);
    println!("P50 latency: {:?}", percentile(0.50));
    println!("P95 latency: {:?}", percentile(0.95));
    println!("P99 latency: {:?}", percentile(0.99));
    println!("Expansion rounds: {}", expansions);
    println!("Throughput: {:.2} searches/second", throughput);

    Ok(())
}

fn print_json(result: &ResultSet) -> Result<()> {
    let output = JsonOutput {
        meta: &result.meta,
        results: summarize(&result.places),
    };
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Helper function to format and print a ranked result set
fn print_results(result: &ResultSet) {
    let meta = &result.meta;
    println!(
        "{}",
        format!(
            "{} places within {} m ({} expansion{})",
            meta.num_results,
            meta.query.radius_m,
            meta.expansions,
            if meta.expansions == 1 { "" } else { "s" }
        )
        .bold()
        .blue()
    );

    if result.is_empty() {
        println!("{}", "No places matched. Try a wider radius or fewer filters.".yellow());
        return;
    }

    for summary in summarize(&result.places) {
        let rating = summary
            .rating
            .map(|r| format!("{r:.1}"))
            .unwrap_or_else(|| "-".to_string());
        let distance = summary
            .distance_m
            .map(|d| format!("{d} m"))
            .unwrap_or_else(|| "?".to_string());
        println!(
            "{}. {} [{}] - Confidence: {:.3}",
            summary.rank.to_string().green(),
            summary.name.bold(),
            summary.price_label(),
            summary.confidence.unwrap_or(0.0)
        );
        println!("   {} | {} | rating {}", summary.address, distance, rating);
        if !summary.cuisines.is_empty() {
            println!("   {}", summary.cuisines.join(", ").cyan());
        }
        let merged = if summary.sources_merged > 1 {
            format!(" (+{} merged)", summary.sources_merged - 1)
        } else {
            String::new()
        };
        println!("   {}:{}{}", summary.source, summary.source_id, merged.dimmed());
    }
}
