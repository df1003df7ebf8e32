//! Iterative PageRank over the merged domain graph.
//!
//! The node set is the union of graph sources and every destination domain,
//! so destination-only nodes participate fully. The iteration count is the
//! sole stopping criterion. Each iteration redistributes rank along edges
//! (duplicate destinations receive one contribution per occurrence), spreads
//! the dangling mass uniformly, and re-normalizes the distribution so the
//! scores always sum to exactly 1.

use std::collections::HashMap;

/// Compute PageRank scores for every node reachable as a source or a
/// destination. Returns an empty map for an empty graph.
pub fn compute(
    link_graph: &HashMap<String, Vec<String>>,
    iterations: usize,
    damping: f64,
) -> HashMap<String, f64> {
    // Dense indexing: node list plus per-node adjacency as indices.
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut nodes: Vec<&str> = Vec::new();

    for (source, targets) in link_graph {
        for name in std::iter::once(source.as_str()).chain(targets.iter().map(String::as_str)) {
            index.entry(name).or_insert_with(|| {
                nodes.push(name);
                nodes.len() - 1
            });
        }
    }

    let node_count = nodes.len();
    if node_count == 0 {
        return HashMap::new();
    }

    let mut adjacency: Vec<Vec<usize>> = vec![Vec::new(); node_count];
    for (source, targets) in link_graph {
        let s = index[source.as_str()];
        for target in targets {
            adjacency[s].push(index[target.as_str()]);
        }
    }

    let n = node_count as f64;
    let teleport = (1.0 - damping) / n;
    let mut scores = vec![1.0 / n; node_count];

    for _ in 0..iterations {
        let mut new_scores = vec![teleport; node_count];

        let dangling_mass: f64 = (0..node_count)
            .filter(|&i| adjacency[i].is_empty())
            .map(|i| scores[i])
            .sum();

        for (source, targets) in adjacency.iter().enumerate() {
            if targets.is_empty() {
                continue;
            }
            let contribution = damping * scores[source] / targets.len() as f64;
            for &target in targets {
                new_scores[target] += contribution;
            }
        }

        let dangling_share = damping * dangling_mass / n;
        for score in &mut new_scores {
            *score += dangling_share;
        }

        // Re-normalize to mask floating-point drift.
        let total: f64 = new_scores.iter().sum();
        if total > 0.0 {
            let inv = 1.0 / total;
            for score in &mut new_scores {
                *score *= inv;
            }
        }

        scores = new_scores;
    }

    nodes
        .into_iter()
        .zip(scores)
        .map(|(node, score)| (node.to_string(), score))
        .collect()
}
