//! # CLI Command Implementations
//!
//! File I/O and output formatting around the pure planner core.

use crate::config::RunConfig;
use graphtour_core::{
    PlanError, PlannerConfig, SavedState, SerializableGraph, TraversalPlanner, Triplet,
    primitives::DEFAULT_SEED, state_from_bytes, state_to_bytes,
};
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum triplets file size (100 MB).
const MAX_INPUT_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Maximum state file size (500 MB); matches the format's payload cap.
const MAX_STATE_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Validate file size before reading.
fn validate_file_size(path: &Path, max_size: u64) -> Result<(), PlanError> {
    let metadata = std::fs::metadata(path)
        .map_err(|e| PlanError::Io(format!("cannot read metadata of '{}': {e}", path.display())))?;
    if metadata.len() > max_size {
        return Err(PlanError::Io(format!(
            "file '{}' is {} bytes, exceeding the {} byte limit",
            path.display(),
            metadata.len(),
            max_size
        )));
    }
    Ok(())
}

fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>, PlanError> {
    validate_file_size(path, max_size)?;
    std::fs::read(path).map_err(|e| PlanError::Io(format!("cannot read '{}': {e}", path.display())))
}

fn write_file(path: &Path, bytes: &[u8]) -> Result<(), PlanError> {
    std::fs::write(path, bytes)
        .map_err(|e| PlanError::Io(format!("cannot write '{}': {e}", path.display())))
}

// =============================================================================
// PLAN OPTIONS
// =============================================================================

/// Fully resolved inputs of the `plan` command: CLI flags layered over the
/// optional TOML run configuration.
#[derive(Debug, Clone)]
pub struct PlanOptions {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub state: Option<PathBuf>,
    pub seed: u64,
}

impl PlanOptions {
    /// Merge CLI flags with an optional config file; flags win.
    pub fn resolve(
        input: Option<PathBuf>,
        output: Option<PathBuf>,
        state: Option<PathBuf>,
        seed: Option<u64>,
        config_path: Option<&Path>,
    ) -> Result<Self, PlanError> {
        let config = match config_path {
            Some(path) => RunConfig::load(path)?,
            None => RunConfig::default(),
        };
        let input = input.or(config.input).ok_or_else(|| {
            PlanError::Io("no input file: pass --input or set `input` in the config".to_string())
        })?;
        Ok(Self {
            input,
            output: output.or(config.output),
            state: state.or(config.state),
            seed: seed.or(config.seed).unwrap_or(DEFAULT_SEED),
        })
    }
}

// =============================================================================
// PLAN COMMAND
// =============================================================================

/// Plan a traversal over a triplets JSON file.
pub fn cmd_plan(options: &PlanOptions, json_mode: bool) -> Result<(), PlanError> {
    let raw = read_file(&options.input, MAX_INPUT_FILE_SIZE)?;
    let triplets: Vec<Triplet> = serde_json::from_slice(&raw)
        .map_err(|e| PlanError::Serialization(format!("invalid triplets file: {e}")))?;
    tracing::info!(
        triplets = triplets.len(),
        seed = options.seed,
        "planning traversal"
    );

    let config = PlannerConfig { seed: options.seed };
    let planner = TraversalPlanner::plan(&triplets, &config)?;

    for skipped in &planner.report().skipped {
        tracing::warn!(
            index = skipped.index,
            reason = %skipped.reason,
            "skipped triplet"
        );
    }

    if let Some(path) = &options.output {
        let rendered = render_plan(&planner)?;
        write_file(path, rendered.as_bytes())?;
        tracing::info!(path = %path.display(), "wrote plan");
    }

    if let Some(path) = &options.state {
        let state = SavedState {
            seed: options.seed,
            triplets,
            graph: SerializableGraph::from(planner.graph()),
            plan: planner.traversal().clone(),
        };
        write_file(path, &state_to_bytes(&state)?)?;
        tracing::info!(path = %path.display(), "wrote state");
    }

    let summary = serde_json::json!({
        "nodes": planner.graph().node_count(),
        "edges": planner.graph().edge_count(),
        "communities": planner.partition().community_count(),
        "groups": planner.groups().len(),
        "plan_length": planner.traversal().len(),
        "skipped_triplets": planner.report().skipped.len(),
    });
    if json_mode {
        println!("{summary}");
    } else {
        println!(
            "planned {} nodes across {} communities in {} groups ({} steps, {} triplets skipped)",
            planner.graph().node_count(),
            planner.partition().community_count(),
            planner.groups().len(),
            planner.traversal().len(),
            planner.report().skipped.len(),
        );
    }
    Ok(())
}

/// Render the plan with enough context for a downstream generator: the
/// walk, the parents, and the visited entities in walk order.
fn render_plan(planner: &TraversalPlanner) -> Result<String, PlanError> {
    let plan = planner.traversal();
    let steps: Vec<serde_json::Value> = plan
        .order
        .iter()
        .zip(plan.parents.iter())
        .map(|(&node, &parent)| {
            let (name, entity_type) = planner
                .graph()
                .node(node)
                .map(|n| (n.name.clone(), n.entity_type.clone()))
                .unwrap_or_default();
            serde_json::json!({
                "node": node,
                "parent": parent,
                "name": name,
                "type": entity_type,
            })
        })
        .collect();

    let document = serde_json::json!({
        "order": plan.order,
        "parents": plan.parents,
        "steps": steps,
    });
    serde_json::to_string_pretty(&document)
        .map_err(|e| PlanError::Serialization(e.to_string()))
}

// =============================================================================
// STATUS COMMAND
// =============================================================================

/// Show what a state file contains.
pub fn cmd_status(state_path: &Path, json_mode: bool) -> Result<(), PlanError> {
    let state = load_state(state_path)?;

    if json_mode {
        let output = serde_json::json!({
            "state": state_path.to_string_lossy(),
            "seed": state.seed,
            "triplets": state.triplets.len(),
            "nodes": state.graph.nodes.len(),
            "edges": state.graph.edges.len(),
            "plan_length": state.plan.len(),
        });
        println!("{output}");
    } else {
        println!("State:    {}", state_path.display());
        println!("Seed:     {}", state.seed);
        println!("Triplets: {}", state.triplets.len());
        println!("Nodes:    {}", state.graph.nodes.len());
        println!("Edges:    {}", state.graph.edges.len());
        println!("Plan:     {} steps", state.plan.len());
    }
    Ok(())
}

// =============================================================================
// EXPORT COMMAND
// =============================================================================

/// Write the plan stored in a state file as JSON.
pub fn cmd_export(state_path: &Path, output: &Path) -> Result<(), PlanError> {
    let state = load_state(state_path)?;
    let rendered = serde_json::to_string_pretty(&state.plan)
        .map_err(|e| PlanError::Serialization(e.to_string()))?;
    write_file(output, rendered.as_bytes())?;
    tracing::info!(path = %output.display(), "exported plan");
    Ok(())
}

// =============================================================================
// CHECK COMMAND
// =============================================================================

/// Re-plan from the stored triplets and seed, and verify the stored plan
/// matches: the planner's determinism, checked end to end.
pub fn cmd_check(state_path: &Path, json_mode: bool) -> Result<(), PlanError> {
    let state = load_state(state_path)?;
    let config = PlannerConfig { seed: state.seed };
    let planner = TraversalPlanner::plan(&state.triplets, &config)?;

    let matches = planner.traversal() == &state.plan;
    if json_mode {
        println!(
            "{}",
            serde_json::json!({ "state": state_path.to_string_lossy(), "matches": matches })
        );
    } else if matches {
        println!("ok: re-planned traversal matches the stored plan");
    }

    if !matches {
        return Err(PlanError::InvariantViolation(format!(
            "re-planned traversal diverges from the stored plan ({} vs {} steps)",
            planner.traversal().len(),
            state.plan.len()
        )));
    }
    Ok(())
}

fn load_state(path: &Path) -> Result<SavedState, PlanError> {
    let bytes = read_file(path, MAX_STATE_FILE_SIZE)?;
    state_from_bytes(&bytes)
}
