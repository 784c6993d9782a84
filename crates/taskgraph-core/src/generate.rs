//! Seeded synthetic dataset generation.
//!
//! A generated graph starts from a random spanning chain (a shuffled vertex
//! sequence linked head to tail), so it is always weakly connected. Random
//! edges are then added until the target edge count is met, never creating a
//! self-loop or duplicating an existing ordered pair. Once the graph holds
//! more than `n` edges, each new edge also inserts its reverse with
//! probability `cycle_probability`, which is how cycles are seeded.
//!
//! The same seed always yields the same datasets.

use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;
use tracing::debug;

use crate::graph::TaskGraph;

/// Shape parameters of one generated dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    pub name: String,
    pub vertices: usize,
    pub target_edges: usize,
    pub cycle_probability: f64,
    pub min_weight: u32,
    pub max_weight: u32,
    pub weight_model: String,
}

impl GeneratorConfig {
    fn preset(
        name: &str,
        vertices: usize,
        target_edges: usize,
        cycle_probability: f64,
        min_weight: u32,
        max_weight: u32,
    ) -> Self {
        Self {
            name: name.to_string(),
            vertices,
            target_edges,
            cycle_probability,
            min_weight,
            max_weight,
            weight_model: "edge".to_string(),
        }
    }
}

/// The nine reference datasets: small, medium and large graphs, each as a
/// pure DAG, a cyclic graph and a mixed one.
#[must_use]
pub fn standard_presets() -> Vec<GeneratorConfig> {
    vec![
        GeneratorConfig::preset("small_dag", 8, 10, 0.0, 1, 5),
        GeneratorConfig::preset("small_cycle", 7, 12, 0.2, 0, 4),
        GeneratorConfig::preset("small_mixed", 9, 15, 0.3, 2, 6),
        GeneratorConfig::preset("medium_sparse_dag", 15, 18, 0.0, 5, 8),
        GeneratorConfig::preset("medium_dense_scc", 18, 35, 0.4, 8, 12),
        GeneratorConfig::preset("medium_balanced", 20, 30, 0.25, 10, 15),
        GeneratorConfig::preset("large_sparse_dag", 35, 45, 0.0, 15, 20),
        GeneratorConfig::preset("large_complex_scc", 45, 80, 0.3, 20, 25),
        GeneratorConfig::preset("large_dense_mixed", 50, 120, 0.2, 25, 30),
    ]
}

/// Generate one graph according to `config`.
///
/// The edge target is capped at `n·(n−1)`, the number of distinct ordered
/// pairs without self-loops. A single-vertex config yields a graph with no
/// edges.
///
/// # Panics
///
/// Panics if `config.vertices` is zero or `min_weight > max_weight`.
#[must_use]
pub fn generate_graph<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> TaskGraph {
    assert!(config.vertices > 0, "generator needs at least one vertex");
    assert!(
        config.min_weight <= config.max_weight,
        "min_weight must not exceed max_weight"
    );

    let n = config.vertices;
    let target = config.target_edges.min(n * (n - 1));
    let mut edges: Vec<(usize, usize, f64)> = Vec::with_capacity(target + target / 2);
    let mut existing: HashSet<(usize, usize)> = HashSet::new();

    let mut chain: Vec<usize> = (0..n).collect();
    chain.shuffle(rng);
    for pair in chain.windows(2) {
        let (u, v) = (pair[0], pair[1]);
        edges.push((u, v, random_weight(config, rng)));
        existing.insert((u, v));
    }

    while edges.len() < target {
        let u = rng.gen_range(0..n);
        let v = rng.gen_range(0..n);
        if u == v || existing.contains(&(u, v)) {
            continue;
        }

        if edges.len() > n
            && rng.gen_bool(config.cycle_probability.clamp(0.0, 1.0))
            && existing.insert((v, u))
        {
            edges.push((v, u, random_weight(config, rng)));
        }

        edges.push((u, v, random_weight(config, rng)));
        existing.insert((u, v));
    }

    debug!(name = %config.name, vertices = n, edges = edges.len(), "dataset generated");

    // Endpoints are drawn from 0..n and n > 0 was asserted above.
    TaskGraph::from_edges(n, &edges)
        .unwrap_or_else(|err| unreachable!("generated edge out of range: {err}"))
}

fn random_weight<R: Rng + ?Sized>(config: &GeneratorConfig, rng: &mut R) -> f64 {
    f64::from(rng.gen_range(config.min_weight..=config.max_weight))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NoopMetrics;
    use crate::scc::strongly_connected_components;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn presets_cover_nine_datasets() {
        let presets = standard_presets();
        assert_eq!(presets.len(), 9);
        let names: HashSet<&str> = presets.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names.len(), 9, "names are unique");
    }

    #[test]
    fn same_seed_same_graph() {
        let config = &standard_presets()[2];
        let a = generate_graph(config, &mut StdRng::seed_from_u64(42));
        let b = generate_graph(config, &mut StdRng::seed_from_u64(42));
        let c = generate_graph(config, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
        assert_ne!(a.content_hash(), c.content_hash());
    }

    #[test]
    fn meets_edge_target_without_self_loops_or_duplicates() {
        for config in standard_presets() {
            let g = generate_graph(&config, &mut StdRng::seed_from_u64(42));
            assert_eq!(g.vertex_count(), config.vertices);
            assert!(g.edge_count() >= config.target_edges, "{}", config.name);

            let mut pairs = HashSet::new();
            for e in g.edges() {
                assert_ne!(e.from, e.to, "{}: self-loop", config.name);
                assert!(pairs.insert((e.from, e.to)), "{}: duplicate edge", config.name);
                assert!(e.weight >= f64::from(config.min_weight));
                assert!(e.weight <= f64::from(config.max_weight));
            }
        }
    }

    #[test]
    fn edge_target_equal_to_chain_yields_a_simple_path() {
        let config = GeneratorConfig::preset("chain_only", 6, 5, 0.0, 1, 1);
        let g = generate_graph(&config, &mut StdRng::seed_from_u64(1));
        // Exactly the spanning chain: a DAG whose condensation is itself.
        assert_eq!(g.edge_count(), 5);
        let scc = strongly_connected_components(&g, &mut NoopMetrics);
        assert_eq!(scc.component_count(), 6);
    }

    #[test]
    fn edge_target_capped_for_tiny_graphs() {
        let config = GeneratorConfig::preset("tiny", 2, 50, 0.5, 1, 2);
        let g = generate_graph(&config, &mut StdRng::seed_from_u64(3));
        assert_eq!(g.edge_count(), 2);

        let single = GeneratorConfig::preset("single", 1, 10, 0.0, 1, 1);
        assert_eq!(generate_graph(&single, &mut StdRng::seed_from_u64(3)).edge_count(), 0);
    }
}
