//! Target selection and weighted ricochet picks.

use rand::Rng;
use rand::rngs::StdRng;
use sb_core::Agent;

/// Floor for a rescaled capped weight.
const MIN_CAPPED_WEIGHT: f64 = 0.01;

/// Pick a target for `thrower`.
///
/// A resolved `interception` name short-circuits the draw when that agent is
/// present. Otherwise the target is drawn uniformly from everyone except the
/// thrower. Returns `None` when nobody else is on the field.
pub fn pick_target<'a>(
    rng: &mut StdRng,
    thrower: &Agent,
    agents: &'a [Agent],
    interception: Option<&str>,
) -> Option<&'a Agent> {
    let intercepted = interception.and_then(|name| agents.iter().find(|a| a.name == name));
    if intercepted.is_some() {
        return intercepted;
    }

    let options: Vec<&Agent> = agents.iter().filter(|a| a.name != thrower.name).collect();
    if options.is_empty() {
        return None;
    }
    Some(options[rng.random_range(0..options.len())])
}

/// The agent whose share of ricochet picks is limited.
#[derive(Debug, Clone, PartialEq)]
pub struct RicochetCap {
    /// Name of the capped agent.
    pub name: String,
    /// Largest selection probability the capped agent may have.
    pub probability: f64,
}

impl RicochetCap {
    /// Create a cap.
    pub fn new(name: impl Into<String>, probability: f64) -> Self {
        Self {
            name: name.into(),
            probability,
        }
    }
}

/// Selection weights for a ricochet pool.
///
/// Every candidate weighs 1.0; the capped agent also adds its
/// `stray_magnet`. If that lifts its share above the cap, its weight is
/// rescaled to `cap * other / (1 - cap)` (never below 0.01) so its share is
/// exactly the cap.
pub fn capped_weights(pool: &[&Agent], cap: &RicochetCap) -> Vec<f64> {
    let mut weights: Vec<f64> = pool
        .iter()
        .map(|a| {
            if a.name == cap.name {
                1.0 + a.stray_magnet
            } else {
                1.0
            }
        })
        .collect();

    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return weights;
    }

    if let Some(idx) = pool.iter().position(|a| a.name == cap.name) {
        let capped = weights[idx];
        if capped / total > cap.probability && cap.probability < 1.0 {
            let other = total - capped;
            let rescaled = cap.probability * other / (1.0 - cap.probability);
            weights[idx] = rescaled.max(MIN_CAPPED_WEIGHT);
        }
    }
    weights
}

/// Pick up to `count` distinct ricochet victims.
///
/// Candidates are everyone not named in `exclude`. If that leaves nobody,
/// the pool falls back to everyone except the first excluded name. Each pick
/// draws one uniform value and walks the cumulative weights; picked agents
/// leave the pool for the next pick.
pub fn pick_ricochet_targets<'a>(
    rng: &mut StdRng,
    agents: &'a [Agent],
    exclude: &[&str],
    count: usize,
    cap: &RicochetCap,
) -> Vec<&'a Agent> {
    let mut candidates: Vec<&Agent> = agents
        .iter()
        .filter(|a| !exclude.contains(&a.name.as_str()))
        .collect();
    if candidates.is_empty() {
        let first = exclude.first().copied().unwrap_or_default();
        candidates = agents.iter().filter(|a| a.name != first).collect();
    }

    let mut picked: Vec<&Agent> = Vec::with_capacity(count);
    for _ in 0..count {
        let pool: Vec<&Agent> = candidates
            .iter()
            .copied()
            .filter(|a| !picked.iter().any(|p| p.name == a.name))
            .collect();
        let Some(&last) = pool.last() else {
            break;
        };

        let weights = capped_weights(&pool, cap);
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            picked.push(pool[rng.random_range(0..pool.len())]);
            continue;
        }

        let r = rng.random::<f64>() * total;
        let mut acc = 0.0;
        let mut chosen = last;
        for (agent, weight) in pool.iter().zip(&weights) {
            acc += weight;
            if r <= acc {
                chosen = *agent;
                break;
            }
        }
        picked.push(chosen);
    }
    picked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn roster(names: &[&str]) -> Vec<Agent> {
        names.iter().map(|n| Agent::new(*n)).collect()
    }

    fn quinn_cap() -> RicochetCap {
        RicochetCap::new("Quinn", 0.45)
    }

    #[test]
    fn target_is_never_the_thrower() {
        let agents = roster(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let t = pick_target(&mut rng, &agents[0], &agents, None).unwrap();
            assert_ne!(t.name, "A");
        }
    }

    #[test]
    fn interception_short_circuits() {
        let agents = roster(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(7);
        let t = pick_target(&mut rng, &agents[0], &agents, Some("C")).unwrap();
        assert_eq!(t.name, "C");
    }

    #[test]
    fn unknown_interception_falls_back_to_random() {
        let agents = roster(&["A", "B"]);
        let mut rng = StdRng::seed_from_u64(7);
        let t = pick_target(&mut rng, &agents[0], &agents, Some("Ghost")).unwrap();
        assert_eq!(t.name, "B");
    }

    #[test]
    fn lone_thrower_has_no_target() {
        let agents = roster(&["A"]);
        let mut rng = StdRng::seed_from_u64(7);
        assert!(pick_target(&mut rng, &agents[0], &agents, None).is_none());
    }

    #[test]
    fn cap_rescales_heavy_magnet() {
        let mut agents = roster(&["A", "B", "Quinn"]);
        agents[2].stray_magnet = 8.0;
        let pool: Vec<&Agent> = agents.iter().collect();
        let weights = capped_weights(&pool, &quinn_cap());
        let total: f64 = weights.iter().sum();
        assert!((weights[2] / total - 0.45).abs() < 1e-9);
        assert!((weights[0] - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cap_leaves_light_magnet_alone() {
        let mut agents = roster(&["A", "B", "C", "Quinn"]);
        agents[3].stray_magnet = 0.5;
        let pool: Vec<&Agent> = agents.iter().collect();
        let weights = capped_weights(&pool, &quinn_cap());
        assert!((weights[3] - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn capped_agent_alone_keeps_floor_weight() {
        let mut agents = roster(&["Quinn"]);
        agents[0].stray_magnet = 3.0;
        let pool: Vec<&Agent> = agents.iter().collect();
        let weights = capped_weights(&pool, &quinn_cap());
        assert!((weights[0] - MIN_CAPPED_WEIGHT).abs() < f64::EPSILON);
    }

    #[test]
    fn picks_are_distinct_and_exclude() {
        let agents = roster(&["A", "B", "C", "D", "Quinn"]);
        let mut rng = StdRng::seed_from_u64(11);
        let picked = pick_ricochet_targets(&mut rng, &agents, &["A"], 4, &quinn_cap());
        assert_eq!(picked.len(), 4);
        let mut names: Vec<&str> = picked.iter().map(|a| a.name.as_str()).collect();
        assert!(!names.contains(&"A"));
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), 4);
    }

    #[test]
    fn count_larger_than_pool_stops_early() {
        let agents = roster(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick_ricochet_targets(&mut rng, &agents, &["A"], 4, &quinn_cap());
        assert_eq!(picked.len(), 2);
    }

    #[test]
    fn empty_candidates_fall_back_to_complement() {
        let agents = roster(&["A", "B"]);
        let mut rng = StdRng::seed_from_u64(3);
        let picked = pick_ricochet_targets(&mut rng, &agents, &["A", "B"], 1, &quinn_cap());
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].name, "B");
    }
}
