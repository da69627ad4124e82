use std::env;
use std::fs;
use std::io::{self, Read};

use batch_planner::config::{BatchPolicy, DEFAULT_DEPOT};
use batch_planner::haversine::HaversineRouter;
use batch_planner::logging::init_tracing;
use batch_planner::model::{Coordinate, Order};
use batch_planner::osrm::{OsrmClient, OsrmConfig};
use batch_planner::{assign_batches, PlannerError};

fn print_help() {
    eprintln!(
        "\
Usage: batch-planner [OPTIONS]

Reads a JSON array of orders and prints the batching result as JSON.

Options:
  --orders=PATH         Orders file (default: read stdin)
  --depot=LAT,LNG       Depot coordinate (default: BloomThis HQ)
  --offline             Use straight-line routing instead of OSRM
  --pretty              Pretty-print the JSON output
  --help                Show this help message

Policy is read from BATCH_* environment variables, OSRM from OSRM_*."
    );
}

fn parse_depot(raw: &str) -> Result<Coordinate, PlannerError> {
    let invalid = || PlannerError::Config(format!("Invalid --depot: {:?}", raw));
    let (lat, lng) = raw.split_once(',').ok_or_else(invalid)?;
    let lat = lat.trim().parse().map_err(|_| invalid())?;
    let lng = lng.trim().parse().map_err(|_| invalid())?;
    Ok(Coordinate::new(lat, lng))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing("batch_planner=info");

    let args: Vec<String> = env::args().collect();
    if args.iter().any(|a| a == "--help") {
        print_help();
        return Ok(());
    }

    let orders_path = args.iter().find_map(|a| a.strip_prefix("--orders="));
    let depot = match args.iter().find_map(|a| a.strip_prefix("--depot=")) {
        Some(raw) => parse_depot(raw)?,
        None => DEFAULT_DEPOT,
    };
    let offline = args.iter().any(|a| a == "--offline");
    let pretty = args.iter().any(|a| a == "--pretty");

    let raw = match orders_path {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let orders: Vec<Order> = serde_json::from_str(&raw)?;
    let policy = BatchPolicy::from_env()?;

    tracing::info!(orders = orders.len(), offline, "Planning delivery batches");

    let result = if offline {
        let router = HaversineRouter::new(policy.assumed_average_speed_kmh);
        assign_batches(&orders, depot, &policy, &router)?
    } else {
        let client = OsrmClient::new(OsrmConfig::from_env()?)?;
        assign_batches(&orders, depot, &policy, &client)?
    };

    let output = if pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", output);

    Ok(())
}
