//! Output formatting for CLI results.
//!
//! Every command renders through [`OutputFormat`], either as plain text for
//! humans or as pretty-printed JSON for scripts.

use std::io::{self, Write};

use clap::ValueEnum;
use serde::Serialize;

use geopath_lib::{city_name, AlgorithmInfo, IpLocation, Place, RoutePlan, Waypoint};

/// Output format selected with `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl OutputFormat {
    pub fn render_route(self, plan: &RoutePlan) -> io::Result<()> {
        self.emit(plan, |out| write_route_text(out, plan))
    }

    pub fn render_algorithms(self, algorithms: &[AlgorithmInfo]) -> io::Result<()> {
        self.emit(&algorithms, |out| write_algorithms_text(out, algorithms))
    }

    pub fn render_place(self, place: &Place) -> io::Result<()> {
        self.emit(place, |out| write_place_text(out, place))
    }

    pub fn render_location(self, location: &IpLocation) -> io::Result<()> {
        self.emit(location, |out| write_location_text(out, location))
    }

    fn emit<T, F>(self, value: &T, text: F) -> io::Result<()>
    where
        T: Serialize + ?Sized,
        F: FnOnce(&mut dyn Write) -> io::Result<()>,
    {
        let stdout = io::stdout();
        let mut out = stdout.lock();
        match self {
            OutputFormat::Json => write_json(&mut out, value),
            OutputFormat::Text => text(&mut out),
        }
    }
}

fn write_json<T: Serialize + ?Sized>(out: &mut dyn Write, value: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
    writeln!(out, "{json}")
}

/// Label a waypoint with its city name when it is a network node.
fn waypoint_label(waypoint: &Waypoint) -> String {
    match city_name(waypoint.id) {
        Some(name) => format!("{} {}", waypoint.id, name),
        None => waypoint.id.to_string(),
    }
}

pub fn write_route_text(out: &mut dyn Write, plan: &RoutePlan) -> io::Result<()> {
    writeln!(out, "Route from {} to {}", plan.start, plan.destination)?;
    writeln!(
        out,
        "algorithm: {} ({})",
        plan.algorithm,
        plan.algorithm.label()
    )?;
    writeln!(out, "distance: {:.1} {}", plan.distance, plan.units)?;
    writeln!(out, "hops: {}", plan.hop_count())?;
    writeln!(out, "nodes settled: {}", plan.nodes_settled)?;

    let last = plan.path.len().saturating_sub(1);
    for (index, waypoint) in plan.path.iter().enumerate() {
        let marker = match index {
            0 => '+',
            i if i == last => '-',
            _ => '|',
        };
        writeln!(
            out,
            "{marker} {:<18} {}",
            waypoint_label(waypoint),
            waypoint.coordinate()
        )?;
    }
    Ok(())
}

pub fn write_algorithms_text(out: &mut dyn Write, algorithms: &[AlgorithmInfo]) -> io::Result<()> {
    for info in algorithms {
        writeln!(out, "{:<10} {}", info.id, info.name)?;
        writeln!(out, "           {}", info.description)?;
    }
    Ok(())
}

pub fn write_place_text(out: &mut dyn Write, place: &Place) -> io::Result<()> {
    writeln!(out, "{}", place.coordinate())?;
    if let Some(name) = &place.display_name {
        writeln!(out, "{name}")?;
    }
    Ok(())
}

pub fn write_location_text(out: &mut dyn Write, location: &IpLocation) -> io::Result<()> {
    writeln!(out, "{:.4},{:.4}", location.lat, location.lng)?;
    let place = [location.city.as_deref(), location.country.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
    if !place.is_empty() {
        writeln!(out, "{place}")?;
    }
    Ok(())
}
