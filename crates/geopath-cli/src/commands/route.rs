//! Route command handler for planning paths between two locations.

use anyhow::{Context, Result};
use tracing::debug;

use geopath_lib::{
    available_algorithms, plan_route, resolve_location, Coordinate, Geocoder, LocationInput,
    NominatimClient, RouteAlgorithm, RouteRequest,
};

use crate::output::OutputFormat;

/// Arguments for the route command.
#[derive(Debug, Clone)]
pub struct RouteCommandArgs {
    /// Start as `"lat,lng"` or an address.
    pub from: String,
    /// Destination as `"lat,lng"` or an address.
    pub to: String,
    pub algorithm: RouteAlgorithm,
}

/// Handle the route subcommand.
///
/// Addresses are geocoded with the configured provider; coordinate pairs
/// never touch the network.
pub fn handle_route(args: &RouteCommandArgs, format: OutputFormat) -> Result<()> {
    let geocoder = NominatimClient::from_env();
    let start = resolve(&args.from, &geocoder)
        .with_context(|| format!("failed to resolve start location '{}'", args.from))?;
    let destination = resolve(&args.to, &geocoder)
        .with_context(|| format!("failed to resolve destination '{}'", args.to))?;

    debug!(%start, %destination, algorithm = %args.algorithm, "planning route");
    let plan = plan_route(&RouteRequest::new(start, destination, args.algorithm))
        .with_context(|| format!("no route from '{}' to '{}'", args.from, args.to))?;

    format.render_route(&plan)?;
    Ok(())
}

fn resolve(text: &str, geocoder: &dyn Geocoder) -> geopath_lib::Result<Coordinate> {
    resolve_location(&LocationInput::from_text(text), geocoder)
}

/// Handle the algorithms subcommand.
pub fn handle_algorithms(format: OutputFormat) -> Result<()> {
    format.render_algorithms(&available_algorithms())?;
    Ok(())
}
