//! CLI for the resolution engine: inspect schemas and run resolutions
//! against a live resolver backend.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use resolve_engine::resolver::{
    ResolveOutcome, Resolver, ResolverConfig, SearchMode, TracingWarningSink,
};
use resolve_engine::schema::{FieldKind, ResourceType};
use resolve_engine::HttpResolverApi;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::error;
use url::Url;

#[derive(Parser)]
#[command(name = "resolve")]
#[command(about = "Resolution engine client for the operations console backend")]
#[command(version)]
struct Args {
    /// Resolver backend base URL (or set RESOLVER_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the field schemas registered for a resource type
    Schemas {
        /// Resource type, e.g. pkg.compute.v1.Instance
        resource_type: String,
    },
    /// Resolve via free-text query
    Search {
        /// Resource type, e.g. pkg.compute.v1.Instance
        resource_type: String,

        /// The free-text query
        query: String,

        /// Maximum result count
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
    /// Resolve via structured field values (name=value pairs)
    Resolve {
        /// Resource type, e.g. pkg.compute.v1.Instance
        resource_type: String,

        /// Field values as name=value
        #[arg(value_parser = parse_field)]
        fields: Vec<(String, String)>,

        /// Maximum result count
        #[arg(short, long, default_value_t = 20)]
        limit: u32,
    },
}

fn parse_field(raw: &str) -> std::result::Result<(String, String), String> {
    raw.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("expected name=value, got '{}'", raw))
}

fn print_outcome(outcome: ResolveOutcome) {
    for result in &outcome.results {
        println!(
            "{}",
            serde_json::to_string_pretty(result).unwrap_or_else(|_| result.to_string())
        );
    }
    println!("{} result(s)", outcome.results.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resolve_engine=info".into()),
        )
        .init();

    let args = Args::parse();
    let base_url = args
        .base_url
        .or_else(|| std::env::var("RESOLVER_BASE_URL").ok())
        .context("backend base URL required: pass --base-url or set RESOLVER_BASE_URL")?;
    let api = Arc::new(HttpResolverApi::new(base_url));

    match args.command {
        Commands::Schemas { resource_type } => {
            let resource_type = ResourceType::new(resource_type);
            let schemas =
                resolve_engine::schema::fetch_schemas(api.as_ref(), &resource_type).await?;
            if schemas.is_empty() {
                println!("no schemas found for type '{}'", resource_type);
                return Ok(());
            }
            for schema in schemas {
                println!(
                    "{} (searchable: {}, autocomplete: {})",
                    schema.display_name,
                    schema.is_searchable(),
                    schema.search.autocomplete_enabled
                );
                for field in schema.fields {
                    let kind = match field.kind {
                        FieldKind::Text { .. } => "text",
                        FieldKind::Choice { .. } => "choice",
                    };
                    println!(
                        "  {} [{}]{}",
                        field.name,
                        kind,
                        if field.required { " required" } else { "" }
                    );
                }
            }
        }
        Commands::Search {
            resource_type,
            query,
            limit,
        } => {
            let mut resolver = make_resolver(api, resource_type, limit, SearchMode::QueryOnly)?;
            resolver.mount().await;
            if let Some(err) = &resolver.state().schema_fetch_error {
                error!(code = err.code, message = %err.message, "schema fetch failed");
                anyhow::bail!("schema fetch failed: {}", err.message);
            }
            resolver.submit_query(&query).await?;
        }
        Commands::Resolve {
            resource_type,
            fields,
            limit,
        } => {
            let mut resolver = make_resolver(api, resource_type, limit, SearchMode::SchemaOnly)?;
            resolver.mount().await;
            if let Some(err) = &resolver.state().schema_fetch_error {
                error!(code = err.code, message = %err.message, "schema fetch failed");
                anyhow::bail!("schema fetch failed: {}", err.message);
            }
            let fields: HashMap<String, String> = fields.into_iter().collect();
            resolver.submit_fields(fields).await?;
        }
    }

    Ok(())
}

fn make_resolver(
    api: Arc<HttpResolverApi>,
    resource_type: String,
    limit: u32,
    mode: SearchMode,
) -> Result<Resolver> {
    let config = ResolverConfig {
        resource_type: ResourceType::new(resource_type),
        search_limit: limit,
        mode,
        enable_autocomplete: None,
        url: Url::parse("https://console.local/resolve")?,
    };
    Ok(Resolver::new(
        config,
        api,
        Box::new(print_outcome),
        Arc::new(TracingWarningSink),
    ))
}
