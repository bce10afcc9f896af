//! # CLI Integration Tests
//!
//! Drive the command functions end to end against temp files.

use graphtour::cli::{PlanOptions, cmd_check, cmd_export, cmd_plan, cmd_status};
use graphtour_core::{Entity, Relationship, Triplet};
use std::path::PathBuf;

fn sample_triplets() -> Vec<Triplet> {
    let pairs = [("a", "b"), ("b", "c"), ("c", "a"), ("c", "d")];
    pairs
        .iter()
        .map(|(s, o)| {
            Triplet::new(
                Entity::new(*s, "concept", format!("{s} described")),
                Relationship::new(format!("{s}-{o}"), 5),
                Entity::new(*o, "concept", format!("{o} described")),
            )
        })
        .collect()
}

fn write_triplets(dir: &std::path::Path) -> PathBuf {
    let path = dir.join("triplets.json");
    let json = serde_json::to_string_pretty(&sample_triplets()).expect("serialize triplets");
    std::fs::write(&path, json).expect("write triplets");
    path
}

#[test]
fn plan_writes_output_and_state() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let input = write_triplets(dir.path());
    let output = dir.path().join("plan.json");
    let state = dir.path().join("tour.state");

    let options = PlanOptions::resolve(
        Some(input),
        Some(output.clone()),
        Some(state.clone()),
        Some(7),
        None,
    )
    .expect("resolve");
    cmd_plan(&options, false).expect("plan");

    let rendered = std::fs::read_to_string(&output).expect("read output");
    let document: serde_json::Value = serde_json::from_str(&rendered).expect("parse output");
    let order = document["order"].as_array().expect("order array");
    assert_eq!(order.len(), 4);
    assert!(document["parents"][0].is_null());

    let steps = document["steps"].as_array().expect("steps array");
    assert_eq!(steps.len(), 4);
    assert!(steps[0]["name"].is_string());

    assert!(state.exists());
}

#[test]
fn check_confirms_stored_plan() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let input = write_triplets(dir.path());
    let state = dir.path().join("tour.state");

    let options =
        PlanOptions::resolve(Some(input), None, Some(state.clone()), None, None).expect("resolve");
    cmd_plan(&options, false).expect("plan");

    cmd_check(&state, false).expect("stored plan must re-verify");
}

#[test]
fn status_reads_state_file() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let input = write_triplets(dir.path());
    let state = dir.path().join("tour.state");

    let options =
        PlanOptions::resolve(Some(input), None, Some(state.clone()), None, None).expect("resolve");
    cmd_plan(&options, false).expect("plan");

    cmd_status(&state, true).expect("status");
}

#[test]
fn export_writes_plan_json() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let input = write_triplets(dir.path());
    let state = dir.path().join("tour.state");
    let exported = dir.path().join("exported.json");

    let options =
        PlanOptions::resolve(Some(input), None, Some(state.clone()), None, None).expect("resolve");
    cmd_plan(&options, false).expect("plan");
    cmd_export(&state, &exported).expect("export");

    let rendered = std::fs::read_to_string(&exported).expect("read export");
    let plan: serde_json::Value = serde_json::from_str(&rendered).expect("parse export");
    assert_eq!(plan["order"].as_array().expect("order").len(), 4);
}

#[test]
fn config_file_supplies_defaults_and_flags_win() {
    let dir = tempfile::tempdir().expect("tmpdir");
    let input = write_triplets(dir.path());
    let config_path = dir.path().join("run.toml");
    std::fs::write(
        &config_path,
        format!("input = '{}'\nseed = 3\n", input.display()),
    )
    .expect("write config");

    let options =
        PlanOptions::resolve(None, None, None, Some(9), Some(&config_path)).expect("resolve");
    assert_eq!(options.input, input);
    // The explicit flag overrides the config's seed.
    assert_eq!(options.seed, 9);

    let missing = PlanOptions::resolve(None, None, None, None, None);
    assert!(missing.is_err());
}
