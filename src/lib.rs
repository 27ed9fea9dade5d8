#![warn(rust_2018_idioms)]

//! Canonical labelling of sparse graphs.
//!
//! Isomorphic graphs get the same canonical adjacency and the same
//! `sparse6` string, no matter how their vertices are numbered. The
//! search also yields generators of the automorphism group, its
//! orbits and its order.

use rayon::prelude::*;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

pub mod automorphism;
pub mod canonical;
pub mod codec;
pub mod debug;
pub mod graph;
pub mod invariant;
mod misc;
pub mod parser;
pub mod partition;
pub mod permutation;
pub mod refine;
pub mod search;
pub mod statistics;

pub use debug::Error;
pub use invariant::InvariantConfig;
pub use misc::{do_if_some, CancellationToken, InputFormat, OutputFormat, Settings};

use crate::{
    codec::{Codec, Sparse6},
    graph::{SparseGraph, VertexIndex},
    partition::OrderedPartition,
    permutation::Permutation,
    search::SearchTree,
    statistics::SearchStatistics,
};

/// Result of a canonicalization.
#[derive(Debug, Clone)]
pub struct Canonical {
    /// The input relabelled so that `labelling[i]` becomes vertex `i`.
    pub canonical_adjacency: SparseGraph,
    /// Position to original vertex.
    pub labelling: Vec<VertexIndex>,
    /// `orbits[v]` is the smallest vertex in the orbit of `v` under
    /// the automorphism group.
    pub orbits: Vec<VertexIndex>,
    pub number_of_orbits: usize,
    /// `canonical_adjacency` as `sparse6`.
    pub encoded: String,
    pub generators: Vec<Permutation>,
    /// Order of the automorphism group, as floating point since it
    /// easily exceeds every integer type.
    pub group_size: f64,
    pub statistics: SearchStatistics,
}

impl Canonical {
    /// Hex SHA-256 digest of the canonical `sparse6` string. Equal for
    /// exactly the graphs that share a canonical form.
    pub fn unique_id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.encoded.as_bytes());
        format!("{:x}", hasher.finalize())
    }
}

fn initial_partition(graph: &SparseGraph, settings: &Settings) -> Result<OrderedPartition, Error> {
    match &settings.colours {
        None => Ok(OrderedPartition::unit(graph.order())),
        Some(colours) if colours.len() == graph.order() => {
            Ok(OrderedPartition::from_colours(colours))
        }
        Some(colours) => Err(Error::MalformedGraph {
            field: "colours",
            reason: format!(
                "expected {} colours, got {}",
                graph.order(),
                colours.len()
            ),
        }),
    }
}

/// Computes the canonical form of `graph`.
pub fn canonicalize(graph: &SparseGraph, settings: &Settings) -> Result<Canonical, Error> {
    settings.invariants.validate()?;
    let root = initial_partition(graph, settings)?;

    let outcome = SearchTree::new(graph, settings).run(root)?;

    let canonical_adjacency = graph.relabel(&outcome.best.relabelling())?;
    time!(
        encoding_time,
        encoded,
        Sparse6::encode(&canonical_adjacency)
    );
    let encoded = encoded?;
    log::trace!("Encoding took {:?}", encoding_time);

    log::debug!(
        "Canonical form of a graph with {} vertices and {} edges: {}",
        graph.order(),
        graph.number_of_edges(),
        encoded
    );

    Ok(Canonical {
        canonical_adjacency,
        labelling: outcome.best.lab,
        orbits: outcome.orbits,
        number_of_orbits: outcome.number_of_orbits,
        encoded,
        generators: outcome.generators,
        group_size: outcome.group_size,
        statistics: outcome.statistics,
    })
}

/// Entry point for hosts that hand over flat signed arrays together
/// with the invariant parameters.
#[allow(clippy::too_many_arguments)]
pub fn canonicalize_raw(
    order: i32,
    offsets: &[i32],
    degree: &[i32],
    neighbours: &[i32],
    min_level: i32,
    max_level: i32,
    arg: i32,
) -> Result<Canonical, Error> {
    let graph = SparseGraph::from_raw(order, offsets, degree, neighbours)?;
    let invariants = InvariantConfig::from_raw(min_level, max_level, arg)?;

    canonicalize(&graph, &Settings::with_invariants(invariants))
}

/// Canonicalizes independent graphs on the rayon thread pool.
/// Results keep the order of `graphs`. Colours in `settings`, if any,
/// apply to every graph.
pub fn canonicalize_batch(
    graphs: &[SparseGraph],
    settings: &Settings,
) -> Vec<Result<Canonical, Error>> {
    graphs
        .par_iter()
        .map(|graph| canonicalize(graph, settings))
        .collect()
}

/// Remembers the canonical forms seen so far to drop isomorphic
/// duplicates from a stream of graphs. Colours are not part of the id.
#[derive(Debug, Default)]
pub struct IsomorphismFilter {
    seen: HashSet<String>,
}

impl IsomorphismFilter {
    /// Whether no earlier graph had this canonical form.
    pub fn is_new(&mut self, canonical: &Canonical) -> bool {
        self.seen.insert(canonical.unique_id())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Whether both graphs have the same canonical form.
pub fn are_isomorphic(
    left: &SparseGraph,
    right: &SparseGraph,
    settings: &Settings,
) -> Result<bool, Error> {
    if left.order() != right.order() || left.number_of_arcs() != right.number_of_arcs() {
        return Ok(false);
    }
    Ok(canonicalize(left, settings)?.encoded == canonicalize(right, settings)?.encoded)
}
