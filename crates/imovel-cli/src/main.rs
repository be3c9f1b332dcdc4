use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use imovel_acquire::{site_by_name, CollectConfig, Collector, OutputFormat};
use imovel_model::{PropertyType, SearchQuery, TransactionType};
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "imovel")]
#[command(about = "Real-estate listing collection and analysis tool")]
#[command(version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("BUILD_HASH"), ")"))]
struct Cli {
    /// Log level: error, warn, info, debug, trace
    #[arg(long, global = true, default_value = "info", value_enum)]
    log_level: LogLevel,

    /// Use UTC timestamps instead of local time
    #[arg(long, global = true)]
    utc: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Subcommand)]
enum Commands {
    /// Collect listings from classifieds sites into a raw dataset
    Collect {
        /// Sites to collect from: "vivareal,olx" or "all"
        #[arg(short, long, default_value = "all")]
        sites: String,

        /// Property types: "apartamento,casa,terreno" or "all"
        #[arg(short = 't', long, default_value = "all")]
        types: String,

        /// Transactions: "venda", "aluguel", or "venda,aluguel"
        #[arg(short = 'T', long, default_value = "venda")]
        transactions: String,

        /// City to search in
        #[arg(short, long, default_value = "Araraquara")]
        city: String,

        /// Two-letter state code
        #[arg(long, default_value = "SP")]
        state: String,

        /// Result pages to walk per search
        #[arg(short = 'p', long, default_value_t = 10)]
        max_pages: u32,

        /// Seconds to wait between requests
        #[arg(short, long, default_value_t = 2)]
        delay: u64,

        /// Output format: csv, json, or both
        #[arg(short, long, default_value = "csv")]
        format: String,

        /// Directory for raw dataset files
        #[arg(short = 'O', long, default_value = "data/raw")]
        output_dir: String,
    },

    /// Clean a collected dataset and produce aggregates and charts
    Analyze {
        /// Dataset CSV to analyze; defaults to the most recent file in the data directory
        #[arg(short, long)]
        input: Option<String>,

        /// Directory holding raw dataset files
        #[arg(short, long, default_value = "data/raw")]
        data_dir: String,

        /// Directory for cleaned data, aggregates, and charts
        #[arg(short = 'O', long, default_value = "data/analysis")]
        output_dir: String,

        /// Skip chart rendering
        #[arg(long)]
        no_charts: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Map log level, suppressing noisy HTML-parsing crates at debug/trace
    let level = match cli.log_level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug,selectors=warn,html5ever=warn",
        LogLevel::Trace => "trace,selectors=warn,html5ever=warn",
    };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    // Timestamp format: 2026-08-30 19:44:09.123 -03:00
    let time_format = "%Y-%m-%d %H:%M:%S%.3f %:z";

    if cli.utc {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(time_format.to_string()))
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_timer(tracing_subscriber::fmt::time::ChronoLocal::new(time_format.to_string()))
            .init();
    }

    match cli.command {
        Commands::Collect {
            sites,
            types,
            transactions,
            city,
            state,
            max_pages,
            delay,
            format,
            output_dir,
        } => {
            let format: OutputFormat = format.parse()?;
            let site_names = parse_sites(&sites)?;
            let property_types = parse_types(&types)?;
            let transaction_types = parse_transactions(&transactions)?;

            let config = CollectConfig {
                city: city.clone(),
                state: state.clone(),
                max_pages,
                fetch: imovel_acquire::FetchConfig {
                    request_delay: Duration::from_secs(delay),
                    ..Default::default()
                },
            };

            for name in &site_names {
                let site = site_by_name(name)
                    .with_context(|| format!("unknown site '{name}'"))?;
                let collector = Collector::new(site, config.clone())?;

                let mut listings = Vec::new();
                for property_type in &property_types {
                    for transaction in &transaction_types {
                        let query = SearchQuery::new(*property_type, *transaction)
                            .with_city(&city, &state);
                        listings.extend(collector.collect(&query).await);
                    }
                }

                let written = imovel_acquire::output::write_dataset(
                    &listings,
                    format,
                    Path::new(&output_dir),
                    collector.source_name(),
                    &city,
                )?;
                for path in &written {
                    tracing::info!(path = %path.display(), "Dataset saved");
                }
            }
        }
        Commands::Analyze {
            input,
            data_dir,
            output_dir,
            no_charts,
        } => {
            let input = match input {
                Some(path) => PathBuf::from(path),
                None => imovel_analyze::most_recent_csv(Path::new(&data_dir))?,
            };
            tracing::info!(input = %input.display(), "Analyzing dataset");

            let listings = imovel_analyze::read_csv(&input)?;
            let (cleaned, report) = imovel_analyze::clean(listings);

            let out = Path::new(&output_dir);
            std::fs::create_dir_all(out)
                .with_context(|| format!("Failed to create {}", output_dir))?;

            imovel_acquire::output::write_csv(&cleaned, &out.join("cleaned.csv"))?;

            let rows = imovel_analyze::neighborhood_stats(&cleaned);
            imovel_analyze::report::write_neighborhood_csv(
                &rows,
                &out.join("neighborhood_stats.csv"),
            )?;

            let summary = imovel_analyze::summarize(&cleaned);
            let json = serde_json::to_string_pretty(&serde_json::json!({
                "cleaning": report,
                "summary": summary,
            }))?;
            std::fs::write(out.join("summary.json"), &json)?;

            if !no_charts {
                imovel_analyze::charts::render_all(&cleaned, &out.join("charts"))?;
            }
            tracing::info!(output = %out.display(), "Analysis finished");
        }
    }

    Ok(())
}

/// Split a comma-separated site list; "all" selects every known site.
fn parse_sites(arg: &str) -> Result<Vec<String>> {
    if arg.trim() == "all" {
        return Ok(imovel_acquire::known_sites()
            .iter()
            .map(|s| s.to_string())
            .collect());
    }
    let names: Vec<String> = arg
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    if names.is_empty() {
        anyhow::bail!("no sites given");
    }
    Ok(names)
}

/// Split a comma-separated property type list of canonical slugs;
/// "all" selects every concrete category.
fn parse_types(arg: &str) -> Result<Vec<PropertyType>> {
    if arg.trim() == "all" {
        return Ok(PropertyType::all()
            .iter()
            .copied()
            .filter(|ty| *ty != PropertyType::Other)
            .collect());
    }
    arg.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|slug| {
            PropertyType::from_slug(slug)
                .with_context(|| format!("unknown property type '{slug}'"))
        })
        .collect()
}

fn parse_transactions(arg: &str) -> Result<Vec<TransactionType>> {
    arg.split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|slug| {
            TransactionType::from_slug(slug)
                .with_context(|| format!("unknown transaction '{slug}'"))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sites() {
        assert_eq!(parse_sites("olx, VivaReal").unwrap(), vec!["olx", "vivareal"]);
        assert_eq!(parse_sites("all").unwrap(), vec!["vivareal", "olx"]);
        assert!(parse_sites(" , ").is_err());
    }

    #[test]
    fn test_parse_types() {
        assert_eq!(
            parse_types("apartamento,casa").unwrap(),
            vec![PropertyType::Apartment, PropertyType::House]
        );
        assert!(!parse_types("all").unwrap().contains(&PropertyType::Other));
        assert!(parse_types("cobertura").is_err());
    }

    #[test]
    fn test_parse_transactions() {
        assert_eq!(
            parse_transactions("venda,aluguel").unwrap(),
            vec![TransactionType::Sale, TransactionType::Rent]
        );
        assert!(parse_transactions("temporada").is_err());
    }
}
