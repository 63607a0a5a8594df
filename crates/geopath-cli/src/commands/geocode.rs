//! Geocoding helper commands.

use anyhow::{Context, Result};

use geopath_lib::{Coordinate, Geocoder, IpApiClient, IpLocator, NominatimClient};

use crate::output::OutputFormat;

/// Handle the geocode subcommand.
pub fn handle_geocode(address: &str, format: OutputFormat) -> Result<()> {
    let address = address.trim();
    anyhow::ensure!(!address.is_empty(), "address must not be empty");

    let place = NominatimClient::from_env()
        .geocode(address)
        .with_context(|| format!("failed to geocode '{address}'"))?;
    format.render_place(&place)?;
    Ok(())
}

/// Handle the reverse-geocode subcommand.
pub fn handle_reverse_geocode(lat: f64, lng: f64, format: OutputFormat) -> Result<()> {
    let coordinate = Coordinate::new(lat, lng);
    coordinate.validate()?;

    let place = NominatimClient::from_env()
        .reverse_geocode(coordinate)
        .with_context(|| format!("failed to reverse geocode {coordinate}"))?;
    format.render_place(&place)?;
    Ok(())
}

/// Handle the locate subcommand.
pub fn handle_locate(format: OutputFormat) -> Result<()> {
    let location = IpApiClient::from_env()
        .current_location()
        .context("failed to determine current location")?;
    format.render_location(&location)?;
    Ok(())
}
