use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use geopath_cli::commands::geocode::{handle_geocode, handle_locate, handle_reverse_geocode};
use geopath_cli::commands::route::{handle_algorithms, handle_route, RouteCommandArgs};
use geopath_cli::output::OutputFormat;
use geopath_lib::RouteAlgorithm;

#[derive(Parser, Debug)]
#[command(name = "geopath", author, version, about = "Geographic shortest path utilities")]
struct Cli {
    /// Enable debug logging on stderr.
    #[arg(long, global = true)]
    verbose: bool,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute the shortest route between two locations.
    Route {
        /// Start location: "lat,lng" or an address.
        #[arg(long = "from", allow_hyphen_values = true)]
        from: String,
        /// Destination: "lat,lng" or an address.
        #[arg(long = "to", allow_hyphen_values = true)]
        to: String,
        /// Search algorithm: dijkstra or astar.
        #[arg(long, default_value_t = RouteAlgorithm::AStar)]
        algorithm: RouteAlgorithm,
    },
    /// List the supported search algorithms.
    Algorithms,
    /// Look up the coordinates of an address.
    Geocode {
        address: String,
    },
    /// Look up the address nearest to a coordinate.
    ReverseGeocode {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        lng: f64,
    },
    /// Estimate the current location from the public IP address.
    Locate,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Route {
            from,
            to,
            algorithm,
        } => handle_route(
            &RouteCommandArgs {
                from,
                to,
                algorithm,
            },
            cli.format,
        ),
        Command::Algorithms => handle_algorithms(cli.format),
        Command::Geocode { address } => handle_geocode(&address, cli.format),
        Command::ReverseGeocode { lat, lng } => handle_reverse_geocode(lat, lng, cli.format),
        Command::Locate => handle_locate(cli.format),
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
