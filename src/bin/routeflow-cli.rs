use clap::{Parser, Subcommand};
use serde_json::json;
use std::path::PathBuf;

use routeflow::config::{load_config, ConfigError};
use routeflow::routing::{match_routes, Location, Params, RouteTree};
use routeflow::Router;

#[derive(Parser)]
#[command(name = "routeflow-cli")]
#[command(about = "Inspect a routeflow route table", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "routeflow.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the chain a location matches
    Match { href: String },
    /// List flattened chains in rank order
    Ranks,
    /// Build a route's href from key=value params
    Href { route_id: String, params: Vec<String> },
    /// Validate the config file
    Check,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::Check = cli.command {
        return check(&cli.config);
    }

    let config = load_config(&cli.config)?;
    let tree = RouteTree::build(config.route_nodes(), config.router.match_options(), config.router.pattern_cache_capacity)?;

    match cli.command {
        Commands::Match { href } => match match_routes(&tree, &Location::parse(&href)) {
            Some(found) => {
                let matches: Vec<_> = found
                    .matches
                    .iter()
                    .map(|m| {
                        json!({
                            "route": m.route_id,
                            "params": m.params,
                            "pathname": m.pathname,
                            "pathname_base": m.pathname_base,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&json!({ "matches": matches, "query": found.query }))?);
            }
            None => println!("no match for {}", href),
        },
        Commands::Ranks => {
            for (rank, chain) in tree.chains().iter().enumerate() {
                println!("{:>3}  {:>4}  {:<32} {}", rank, chain.score, chain.pattern, chain.route_ids().join(" > "));
            }
        }
        Commands::Href { route_id, params } => {
            let params = parse_params(&params)?;
            let router = Router::new(config.route_nodes(), config.router.clone())?;
            println!("{}", router.href(&route_id, &params)?);
        }
        Commands::Check => {}
    }

    Ok(())
}

fn check(path: &std::path::Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = match load_config(path) {
        Ok(config) => config,
        Err(ConfigError::Validation(errors)) => {
            eprintln!("{} problem(s) in {}:", errors.len(), path.display());
            for error in errors {
                eprintln!("  - {}", error);
            }
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };

    let tree = RouteTree::build(config.route_nodes(), config.router.match_options(), config.router.pattern_cache_capacity)?;
    println!("OK: {} routes, {} chains", tree.index().len(), tree.chains().len());
    Ok(())
}

fn parse_params(raw: &[String]) -> Result<Params, String> {
    raw.iter()
        .map(|pair| {
            pair.split_once('=')
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .ok_or_else(|| format!("expected key=value, got `{}`", pair))
        })
        .collect()
}
