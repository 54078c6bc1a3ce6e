//! `hintikka path`: accessibility paths and distances between worlds.

use std::path::Path;

use anyhow::{Context, Result};
use hintikka_core::{ExplicitEpistemicModel, PathStep};
use hintikka_session::SessionConfig;
use serde::Serialize;

use super::{load_description, print_json};

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum PathReport {
    Path {
        from: String,
        to: String,
        steps: Option<Vec<PathStep>>,
    },
    Distances {
        from: String,
        distances: Vec<(String, usize)>,
    },
}

pub fn run(
    model: &Path,
    config: &SessionConfig,
    from: &str,
    to: Option<&str>,
    max_distance: usize,
    json: bool,
) -> Result<()> {
    let explicit = load_description(model)?
        .build_explicit(&config.default_agent)
        .with_context(|| format!("building model from {}", model.display()))?;
    let report = match to {
        Some(to) => path(&explicit, from, to)?,
        None => distances(&explicit, from, max_distance)?,
    };
    if json {
        return print_json(&report);
    }
    match &report {
        PathReport::Path { from, to, steps: None } => println!("{to} is not reachable from {from}"),
        PathReport::Path {
            from,
            steps: Some(steps),
            ..
        } => {
            let mut line = from.clone();
            for step in steps {
                line.push_str(&format!(" -{}-> {}", step.agent, step.world));
            }
            println!("{line}");
            println!("  {} step(s)", steps.len());
        }
        PathReport::Distances { from, distances } => {
            println!("Distances from {from}:");
            for (world, d) in distances {
                println!("  {d:>3}  {world}");
            }
        }
    }
    Ok(())
}

pub fn path(model: &ExplicitEpistemicModel, from: &str, to: &str) -> Result<PathReport> {
    Ok(PathReport::Path {
        from: from.to_string(),
        to: to.to_string(),
        steps: model.shortest_path(from, to)?,
    })
}

/// Worlds within `max_distance` hops of `from`, nearest first.
pub fn distances(model: &ExplicitEpistemicModel, from: &str, max_distance: usize) -> Result<PathReport> {
    let mut distances: Vec<(String, usize)> = model
        .graph()
        .distances_from(from, max_distance)
        .with_context(|| format!("no world named {from}"))?
        .into_iter()
        .collect();
    distances.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.cmp(&b.0)));
    Ok(PathReport::Distances {
        from: from.to_string(),
        distances,
    })
}
