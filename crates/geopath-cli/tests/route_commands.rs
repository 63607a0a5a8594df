use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;

const NEW_YORK: &str = "40.7128,-74.006";
const PHILADELPHIA: &str = "39.9526,-75.1652";

fn cli() -> Command {
    let mut cmd = cargo_bin_cmd!("geopath");
    // Addresses must never reach a real provider from tests.
    cmd.env("GEOPATH_GEOCODER_URL", "http://127.0.0.1:9")
        .env("GEOPATH_HTTP_TIMEOUT_SECS", "1")
        .env("RUST_LOG", "error");
    cmd
}

#[test]
fn route_between_coordinates_prints_distance() {
    cli()
        .arg("route")
        .arg("--from")
        .arg(NEW_YORK)
        .arg("--to")
        .arg(PHILADELPHIA)
        .assert()
        .success()
        .stdout(predicate::str::contains("algorithm: astar (A*)"))
        .stdout(predicate::str::contains("distance: 97.0 kilometers"))
        .stdout(predicate::str::contains("6 Philadelphia"));
}

#[test]
fn dijkstra_algorithm_is_supported() {
    cli()
        .args(["route", "--from", NEW_YORK, "--to", PHILADELPHIA])
        .args(["--algorithm", "Dijkstra"])
        .assert()
        .success()
        .stdout(predicate::str::contains("algorithm: dijkstra"));
}

#[test]
fn json_format_outputs_route_plan() {
    let output = cli()
        .args(["--format", "json", "route", "--from", NEW_YORK, "--to", PHILADELPHIA])
        .output()
        .expect("run geopath");
    assert!(output.status.success());

    let plan: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid JSON");
    assert_eq!(plan["algorithm"], "astar");
    assert_eq!(plan["distance"], 97.0);
    assert_eq!(plan["units"], "kilometers");
    assert_eq!(plan["path"][0]["id"], "start");
    assert_eq!(plan["path"][1]["id"], 1);
}

#[test]
fn unknown_algorithm_is_rejected() {
    cli()
        .args(["route", "--from", NEW_YORK, "--to", PHILADELPHIA])
        .args(["--algorithm", "bfs"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown algorithm"));
}

#[test]
fn out_of_range_coordinates_fail() {
    cli()
        .args(["route", "--from", "95.0,10.0", "--to", PHILADELPHIA])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to resolve start location"));
}

#[test]
fn algorithms_lists_both_algorithms() {
    cli()
        .arg("algorithms")
        .assert()
        .success()
        .stdout(predicate::str::contains("dijkstra"))
        .stdout(predicate::str::contains("astar"));
}

#[test]
fn reverse_geocode_validates_before_lookup() {
    cli()
        .args(["reverse-geocode", "--lat", "10.0", "--lng", "-200.0"])
        .assert()
        .failure();
}
