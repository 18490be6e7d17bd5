//! Routing policy engine
//!
//! Turns the set of enabled adapters plus a strategy into an ordered
//! candidate list for the orchestrator's fallback chain. All orderings
//! are deterministic: stable sorts only, ties broken by registration
//! order, providers lacking a sort key placed last.

use crate::provider::ChatProvider;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::sync::Arc;

/// Candidate-ordering strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteStrategy {
    /// Cheapest first (ascending combined per-1K price)
    Cost,
    /// Best first (descending quality tier)
    Quality,
    /// Top half by quality, re-sorted cheapest first
    Balanced,
    /// Single explicitly named provider
    Specific,
}

/// Order enabled providers for a fallback chain
///
/// - An explicit provider name wins over any strategy: the result is
///   the singleton containing that provider, or empty when it is not
///   in the enabled set. `Specific` without a name also yields empty.
/// - `None` strategy returns the enabled set in registration order
///   (configuration order is the implicit priority).
///
/// The result is always a subset of `enabled`; disabled adapters never
/// reach this function.
#[must_use]
pub fn order(
    enabled: &[Arc<dyn ChatProvider>],
    strategy: Option<RouteStrategy>,
    explicit: Option<&str>,
) -> Vec<Arc<dyn ChatProvider>> {
    if let Some(name) = explicit {
        return enabled
            .iter()
            .find(|p| p.meta().name == name)
            .cloned()
            .into_iter()
            .collect();
    }

    let mut candidates: Vec<Arc<dyn ChatProvider>> = enabled.to_vec();

    match strategy {
        Some(RouteStrategy::Cost) => {
            candidates.sort_by(|a, b| compare_cost(a, b));
        }
        Some(RouteStrategy::Quality) => {
            candidates.sort_by(|a, b| compare_quality(a, b));
        }
        Some(RouteStrategy::Balanced) => {
            // Best-quality-among-affordable: shortlist the top half by
            // quality (at least one), then try the cheapest of those
            // first. Not a blended score.
            let half = candidates.len().div_ceil(2).max(1);
            candidates.sort_by(|a, b| compare_quality(a, b));
            candidates.truncate(half);
            candidates.sort_by(|a, b| compare_cost(a, b));
        }
        Some(RouteStrategy::Specific) => {
            // Specific with no provider named matches nothing
            candidates.clear();
        }
        None => {}
    }

    candidates
}

/// Ascending combined cost; providers with unknown cost sort last
fn compare_cost(a: &Arc<dyn ChatProvider>, b: &Arc<dyn ChatProvider>) -> Ordering {
    let a = a.meta().cost.map(|c| c.total_per_1k());
    let b = b.meta().cost.map(|c| c.total_per_1k());
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Descending quality tier; providers with unknown tier sort last
fn compare_quality(a: &Arc<dyn ChatProvider>, b: &Arc<dyn ChatProvider>) -> Ordering {
    let a = a.meta().quality_tier;
    let b = b.meta().quality_tier;
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
