//! json-datasource CLI
//!
//! Command-line interface for the JSON data source:
//! - Run a saved query against the configured API
//! - Resolve time-range macros in a template
//! - Check API availability
//! - Generate a config file

use anyhow::{anyhow, bail, Context};
use chrono::Utc;
use clap::{Parser, Subcommand};
use json_datasource::config::{generate_default_config, Config, LoadedConfig, LoggingConfig};
use json_datasource::datasource::{HttpFetcher, JsonDataSource};
use json_datasource::query::{
    display_value, macros, parse_time_bound, Frame, JsonQuery, QueryRequest, ScopedVars, TimeRange,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "json-datasource")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Query JSON APIs as tables")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: standard locations, then environment)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub url: Option<String>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a saved query
    Query {
        /// Path to a JSON file holding the query
        file: PathBuf,
        /// Range start. Supports: "now", "now-6h", ISO 8601, Unix timestamp
        #[arg(long, default_value = "now-6h")]
        from: String,
        /// Range end
        #[arg(long, default_value = "now")]
        to: String,
        /// Dashboard variables in name=value format
        #[arg(short = 'V', long = "var")]
        vars: Vec<String>,
        /// Print values for a dashboard variable instead of frames
        #[arg(long)]
        variable: bool,
    },

    /// Resolve macros in a template
    Resolve {
        template: String,
        #[arg(long, default_value = "now-6h")]
        from: String,
        #[arg(long, default_value = "now")]
        to: String,
    },

    /// Check that the API answers
    Health,

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut loaded = match &cli.config {
        Some(path) => LoadedConfig::from_file(path.clone(), Config::load_with_env(path)?),
        None => Config::load_default(),
    };
    if let Some(url) = cli.url.clone() {
        loaded.config.datasource.url = url;
    }

    init_logging(&loaded.config.logging);
    loaded.report();
    let config = loaded.config;

    match cli.command {
        Commands::Query {
            file,
            from,
            to,
            vars,
            variable,
        } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read query file {:?}", file))?;
            let query: JsonQuery = serde_json::from_str(&content)
                .with_context(|| format!("Invalid query in {:?}", file))?;

            let range = parse_range(&from, &to)?;
            let vars = parse_vars(&vars)?;

            let datasource = JsonDataSource::new(HttpFetcher::new(config.datasource)?);

            if variable {
                for value in datasource.metric_find_query(&query, &range, &vars).await? {
                    println!("{}", value.text);
                }
                return Ok(());
            }

            let mut request = QueryRequest::new(range, vec![query]);
            request.scoped_vars = vars;
            let response = datasource.query(&request).await?;

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&response)?),
                _ => {
                    for frame in &response.data {
                        print_table(frame);
                    }
                }
            }
        }

        Commands::Resolve { template, from, to } => {
            let range = parse_range(&from, &to)?;
            println!("{}", macros::resolve(&template, &range));
        }

        Commands::Health => {
            let fetcher = HttpFetcher::new(config.datasource)?;
            match fetcher.check_health().await {
                Ok(()) => println!("OK: {}", fetcher.config().url),
                Err(e) => bail!("{} is not available: {}", fetcher.config().url, e),
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => {
                    print!("{}", content);
                }
            }
        }
    }

    Ok(())
}

fn init_logging(logging: &LoggingConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("json_datasource={}", logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn parse_range(from: &str, to: &str) -> anyhow::Result<TimeRange> {
    let now = Utc::now();
    let from = parse_time_bound(from, now).ok_or_else(|| anyhow!("Invalid time: {}", from))?;
    let to = parse_time_bound(to, now).ok_or_else(|| anyhow!("Invalid time: {}", to))?;
    Ok(TimeRange::new(from, to))
}

fn parse_vars(vars: &[String]) -> anyhow::Result<ScopedVars> {
    vars.iter()
        .map(|kv| {
            kv.split_once('=')
                .map(|(k, v)| (k.trim().to_string(), v.to_string()))
                .ok_or_else(|| anyhow!("Invalid variable '{}', expected name=value", kv))
        })
        .collect()
}

fn print_table(frame: &Frame) {
    if let Some(name) = &frame.name {
        println!("# {}", name);
    }

    if frame.fields.is_empty() {
        println!("No fields");
        return;
    }

    let cells: Vec<Vec<String>> = frame
        .fields
        .iter()
        .map(|f| {
            f.values
                .iter()
                .map(|v| v.as_ref().map(display_value).unwrap_or_else(|| "-".to_string()))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = frame
        .fields
        .iter()
        .zip(&cells)
        .map(|(f, col)| col.iter().map(String::len).chain([f.name.len()]).max().unwrap_or(0))
        .collect();

    let header: Vec<String> = frame
        .fields
        .iter()
        .zip(&widths)
        .map(|(f, w)| format!("{:<w$}", f.name, w = w))
        .collect();
    println!("{}", header.join(" | "));
    println!("{}", "-".repeat(widths.iter().sum::<usize>() + 3 * (widths.len() - 1)));

    for row in 0..frame.len() {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(col, w)| format!("{:<w$}", col.get(row).map(String::as_str).unwrap_or(""), w = w))
            .collect();
        println!("{}", line.join(" | "));
    }
}
