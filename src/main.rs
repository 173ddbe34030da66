use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::collections::HashMap;
use std::path::PathBuf;
use subway_router::config::RouterConfig;
use subway_router::{logging, Request};

#[derive(Parser)]
#[command(name = "subway-router", about = "Score-based request router")]
struct Cli {
    /// Path to route config file (.toml or .json)
    #[arg(short, long, default_value = "routes.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List compiled routes in registration order
    Routes,

    /// Dispatch a request and print the response
    Match {
        method: String,
        url: String,

        /// Request header as `name:value`, repeatable
        #[arg(short = 'H', long = "header")]
        headers: Vec<String>,

        /// Form parameter as `name=value`, repeatable
        #[arg(short = 'F', long = "form")]
        form: Vec<String>,
    },

    /// Generate the URL of a named route
    Url {
        name: String,

        /// Parameters as `key=value`
        params: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = RouterConfig::read(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    let _guard = logging::init(&config.logging);
    config
        .validate_loaded(&cli.config)
        .with_context(|| format!("validating {}", cli.config.display()))?;
    subway_router::metrics::describe();

    let dispatcher = config.build_dispatcher()?;

    match cli.command {
        Command::Routes => {
            for route in dispatcher.routes() {
                println!(
                    "{:<8} {:<40} {:<20} {}",
                    route.method(),
                    route.matcher().to_string(),
                    route.name(),
                    route.groups().join(","),
                );
            }
        }
        Command::Match { method, url, headers, form } => {
            let request = Request::new(&method, &url)
                .with_headers(parse_headers(&headers)?)
                .with_params(parse_params(&form)?);
            let (response, matched) = dispatcher.resolve(&request);
            match matched {
                Some((route, rate)) => println!("route: {} (score {})", route.name(), rate),
                None => println!("route: <fallback>"),
            }
            println!("status: {}", response.status_code());
            for (name, value) in response.headers() {
                println!("{}: {}", name, value.to_str().unwrap_or("<binary>"));
            }
            println!();
            println!("{}", response.body_string());
        }
        Command::Url { name, params } => {
            let params: HashMap<String, String> = parse_params(&params)?.into_iter().collect();
            let route = dispatcher
                .route(&name)
                .with_context(|| format!("no route named '{}'", name))?;
            let url = route
                .url(&params)
                .with_context(|| format!("parameters do not satisfy route '{}' ({})", name, route.matcher()))?;
            println!("{}", url);
        }
    }
    Ok(())
}

fn parse_headers(raw: &[String]) -> Result<HeaderMap> {
    let mut headers = HeaderMap::new();
    for entry in raw {
        let (name, value) = entry
            .split_once(':')
            .with_context(|| format!("header '{}' is not in name:value form", entry))?;
        headers.append(
            HeaderName::from_bytes(name.trim().as_bytes())?,
            HeaderValue::from_str(value.trim())?,
        );
    }
    Ok(headers)
}

fn parse_params(raw: &[String]) -> Result<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .with_context(|| format!("parameter '{}' is not in key=value form", entry))
        })
        .collect()
}
