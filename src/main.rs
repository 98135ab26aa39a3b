//! verktyg CLI
//!
//! Inspect a routing configuration from the command line: list routes, match
//! paths, build URLs and see which binding a request would be dispatched to.
//!
//! ```text
//!   verktyg.toml
//!       │
//!       ▼
//!   load_config ──▶ build_map ──────▶ UrlMap ──▶ MapAdapter ──▶ match / build
//!       │
//!       └─────────▶ build_dispatcher ─▶ Dispatcher ──▶ lookup (method + Accept-*)
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use http::Method;
use serde_json::json;

use verktyg::accept::{HasRepresentation, Representation, RequestAccept};
use verktyg::config::{load_config, AppConfig};
use verktyg::observability::logging;
use verktyg::routing::{MapAdapter, MatchError, Params, RouteError, UrlMap, Value};

#[derive(Parser)]
#[command(name = "verktyg")]
#[command(about = "Inspect routing and dispatch configuration", long_about = None)]
struct Cli {
    /// Configuration file.
    #[arg(short, long, default_value = "verktyg.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate the configuration and summarize it
    Check,
    /// List routes in match order
    Routes {
        /// Only routes for this endpoint
        #[arg(short, long)]
        endpoint: Option<String>,
    },
    /// Match a path against the routes
    Match {
        path: String,
        #[command(flatten)]
        server: ServerArgs,
        /// Query string carried onto redirects
        #[arg(short, long)]
        query: Option<String>,
    },
    /// Build a URL for an endpoint
    Build {
        endpoint: String,
        /// Values as name=value; numbers and booleans are typed
        #[arg(short, long = "value", value_parser = parse_value)]
        values: Vec<(String, Value)>,
        /// Always produce an absolute URL
        #[arg(long)]
        external: bool,
        #[command(flatten)]
        server: ServerArgs,
    },
    /// Pick the binding for an endpoint, method and Accept headers
    Dispatch {
        endpoint: String,
        #[arg(short, long, default_value = "GET")]
        method: String,
        #[arg(long)]
        accept: Option<String>,
        #[arg(long)]
        accept_language: Option<String>,
        #[arg(long)]
        accept_charset: Option<String>,
    },
}

#[derive(clap::Args)]
struct ServerArgs {
    /// Server name the map is bound to
    #[arg(long, default_value = "localhost")]
    server_name: String,
    /// Subdomain of the request
    #[arg(long)]
    subdomain: Option<String>,
    /// Mount point of the application
    #[arg(long, default_value = "/")]
    script_name: String,
    #[arg(long, default_value = "http")]
    scheme: String,
}

fn parse_value(raw: &str) -> Result<(String, Value), String> {
    let (name, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got {raw:?}"))?;
    let value = serde_json::from_str::<Value>(value).unwrap_or_else(|_| Value::from(value));
    Ok((name.to_string(), value))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match load_config(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return ExitCode::FAILURE;
        }
    };
    logging::init(&config.observability);

    match run(cli.command, &config) {
        Ok(output) => {
            match serde_json::to_string_pretty(&output) {
                Ok(text) => println!("{}", text),
                Err(e) => {
                    eprintln!("Error: {}", e);
                    return ExitCode::FAILURE;
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(
    command: Commands,
    config: &AppConfig,
) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    let map = config.build_map()?;

    let output = match command {
        Commands::Check => json!({
            "routes": config.routes.len(),
            "endpoints": endpoints(&map),
            "bindings": config.bindings.len(),
        }),
        Commands::Routes { endpoint } => {
            let routes: Vec<_> = map
                .iter_routes(endpoint.as_deref())
                .map(|route| {
                    json!({
                        "rule": route.rule(),
                        "endpoint": route.endpoint(),
                        "arguments": route.arguments(),
                        "subdomain": route.subdomain(),
                        "build_only": route.build_only(),
                    })
                })
                .collect();
            json!(routes)
        }
        Commands::Match {
            path,
            server,
            query,
        } => {
            let adapter = server.bind(&map)?;
            match adapter.match_with_query(&path, query.as_deref()) {
                Ok(found) => json!({
                    "endpoint": found.endpoint,
                    "params": found.params,
                }),
                Err(MatchError::RequestRedirect { new_url }) => json!({
                    "status": 301,
                    "location": new_url,
                }),
                Err(e) => json!({
                    "status": e.status_code().as_u16(),
                    "error": e.to_string(),
                }),
            }
        }
        Commands::Build {
            endpoint,
            values,
            external,
            server,
        } => {
            let adapter = server.bind(&map)?;
            let values: Params = values.into_iter().collect();
            let url = adapter.build_with(&endpoint, &values, external, true)?;
            json!({ "url": url })
        }
        Commands::Dispatch {
            endpoint,
            method,
            accept,
            accept_language,
            accept_charset,
        } => {
            let dispatcher = config.build_dispatcher()?;
            let method = Method::from_bytes(method.as_bytes())?;
            let request = RequestAccept::from_headers(
                accept.as_deref(),
                accept_language.as_deref(),
                accept_charset.as_deref(),
            )?;
            match dispatcher.lookup(&endpoint, &method, &request) {
                Ok(binding) => json!({
                    "action": binding.action(),
                    "method": binding.method().as_str(),
                    "representation": binding_representation(binding.representation()),
                }),
                Err(e) => json!({
                    "status": e.status_code().as_u16(),
                    "error": e.to_string(),
                    "allow": e.allow_header(),
                }),
            }
        }
    };

    Ok(output)
}

impl ServerArgs {
    fn bind<'m>(&self, map: &'m UrlMap) -> Result<MapAdapter<'m>, RouteError> {
        Ok(map
            .bind(&self.server_name, self.subdomain.as_deref())?
            .with_script_name(&self.script_name)
            .with_url_scheme(&self.scheme))
    }
}

fn endpoints(map: &UrlMap) -> Vec<String> {
    let mut endpoints: Vec<String> = map
        .iter_routes(None)
        .map(|route| route.endpoint().to_string())
        .collect();
    endpoints.sort();
    endpoints.dedup();
    endpoints
}

fn binding_representation(representation: &Representation) -> serde_json::Value {
    json!({
        "content_type": representation.content_type().map(|c| c.to_header()),
        "language": representation.language().map(|l| l.to_header()),
        "charset": representation.charset().map(|c| c.to_header()),
        "qs": representation.qs(),
    })
}
