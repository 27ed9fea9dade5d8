//! Individualization-refinement search for the canonical leaf.
//!
//! The tree is walked depth first with an explicit stack of frames, one
//! per inner node on the current path. Frame `i` belongs to the node
//! reached by individualizing `path[..i]`. Its children are the members
//! of the first non-singleton cell, tried in increasing vertex order.

use std::{cmp::Ordering, time::Instant};

use crate::{
    automorphism::{AutomorphismAccumulator, StabiliserOrbits},
    canonical::{compare_prefix, CanonicalSelector, Leaf, LeafVerdict, Row},
    graph::{SparseGraph, VertexIndex},
    invariant::InvariantEvaluator,
    misc::CancellationToken,
    partition::OrderedPartition,
    permutation::Permutation,
    refine::PartitionRefiner,
    statistics::SearchStatistics,
    Error, Settings,
};

#[derive(Debug)]
struct Frame {
    partition: OrderedPartition,
    candidates: Vec<VertexIndex>,
    cursor: usize,
    explored: Vec<VertexIndex>,
    stabiliser: StabiliserOrbits,
    /// Whether the node lies on the leftmost root-to-leaf path.
    first_path: bool,
}

impl Frame {
    fn new(partition: OrderedPartition, first_path: bool) -> Self {
        let mut candidates = partition
            .first_non_singleton()
            .map(|(start, _)| partition.cell_members(start).to_vec())
            .unwrap_or_default();
        candidates.sort_unstable();
        let stabiliser = StabiliserOrbits::new(partition.len());

        Frame {
            partition,
            candidates,
            cursor: 0,
            explored: Vec::new(),
            stabiliser,
            first_path,
        }
    }

    fn next_candidate(&mut self) -> Option<VertexIndex> {
        let candidate = self.candidates.get(self.cursor).copied();
        self.cursor += 1;
        candidate
    }

    fn is_equivalent_to_explored(&mut self, vertex: VertexIndex) -> bool {
        let orbits = &mut self.stabiliser.orbits;
        self.explored
            .iter()
            .any(|explored| orbits.same(*explored, vertex))
    }
}

/// What the search leaves behind.
#[derive(Debug)]
pub struct SearchOutcome {
    pub best: Leaf,
    pub generators: Vec<Permutation>,
    /// `orbits[v]` is the smallest vertex in the orbit of `v`.
    pub orbits: Vec<VertexIndex>,
    pub number_of_orbits: usize,
    pub group_size: f64,
    pub statistics: SearchStatistics,
}

#[derive(Debug)]
pub struct SearchTree<'g> {
    graph: &'g SparseGraph,
    refiner: PartitionRefiner<'g>,
    evaluator: InvariantEvaluator,
    accumulator: AutomorphismAccumulator,
    selector: CanonicalSelector,
    cancellation: CancellationToken,
    /// Certificates met on the first path, by level.
    first_certificates: Vec<Option<Vec<Row>>>,
    group_size: f64,
    statistics: SearchStatistics,
}

impl<'g> SearchTree<'g> {
    pub fn new(graph: &'g SparseGraph, settings: &Settings) -> Self {
        let order = graph.order();
        SearchTree {
            graph,
            refiner: PartitionRefiner::new(graph),
            evaluator: InvariantEvaluator::new(settings.invariants, order),
            accumulator: AutomorphismAccumulator::new(order),
            selector: CanonicalSelector::default(),
            cancellation: settings.cancellation.clone(),
            first_certificates: Vec::new(),
            group_size: 1.0,
            statistics: SearchStatistics::default(),
        }
    }

    /// Searches the tree below `root`, which must be a partition of the
    /// graph's vertices. It is refined before anything else happens.
    pub fn run(mut self, mut root: OrderedPartition) -> Result<SearchOutcome, Error> {
        let start_time = Instant::now();

        self.statistics.splits += self.refiner.refine_all(&mut root);
        self.statistics.nodes += 1;

        let mut frames: Vec<Frame> = Vec::new();
        let mut path: Vec<VertexIndex> = Vec::new();

        if root.is_discrete() {
            self.poll_cancellation()?;
            self.reach_leaf(&root, &path);
        } else {
            frames.push(Frame::new(root, true));
        }

        while let Some(frame) = frames.last_mut() {
            let vertex = match frame.next_candidate() {
                Some(vertex) => vertex,
                None => {
                    if frame.first_path {
                        self.accumulator
                            .sync_stabiliser(&mut frame.stabiliser, &path);
                        if let Some(first) = frame.explored.first() {
                            self.group_size *=
                                frame.stabiliser.orbits.orbit_size(*first) as f64;
                        }
                    }
                    frames.pop();
                    path.pop();
                    continue;
                }
            };

            self.accumulator
                .sync_stabiliser(&mut frame.stabiliser, &path);
            if frame.is_equivalent_to_explored(vertex) {
                self.statistics.orbit_pruned += 1;
                continue;
            }
            frame.explored.push(vertex);
            let first_path = frame.first_path && frame.explored.len() == 1;

            self.poll_cancellation()?;
            let mut child = frame.partition.clone();
            let cell = child.individualize(vertex);
            self.statistics.splits += self.refiner.refine(&mut child, &[cell]);
            self.statistics.nodes += 1;

            path.push(vertex);
            self.statistics.max_depth = self.statistics.max_depth.max(path.len());

            if self.is_pruned_by_certificate(&child, path.len() + 1, first_path) {
                self.statistics.invariant_pruned += 1;
                path.pop();
                continue;
            }

            if !child.is_discrete() {
                frames.push(Frame::new(child, first_path));
                continue;
            }

            self.poll_cancellation()?;
            match self.reach_leaf(&child, &path) {
                Some(depth) if depth + 1 < frames.len() => {
                    self.statistics.abandoned += 1;
                    frames.truncate(depth + 1);
                    path.truncate(depth);
                }
                _ => {
                    path.pop();
                }
            }
        }

        let best = self
            .selector
            .into_best()
            .ok_or_else(|| Error::MalformedGraph {
                field: "order",
                reason: "the search tree has no leaf".to_string(),
            })?;
        let orbits = self.accumulator.orbits();
        let number_of_orbits = self.accumulator.number_of_orbits();
        let generators = self.accumulator.into_generators();

        self.statistics.generators = generators.len();
        self.statistics.moved = self.refiner.moved();
        self.statistics.search_time = start_time.elapsed();
        log::debug!(
            "Search done: {} nodes, {} leaves, {} generators, group size {}",
            self.statistics.nodes,
            self.statistics.leaves,
            generators.len(),
            self.group_size
        );

        Ok(SearchOutcome {
            best,
            generators,
            orbits,
            number_of_orbits,
            group_size: self.group_size,
            statistics: self.statistics,
        })
    }

    fn poll_cancellation(&self) -> Result<(), Error> {
        if self.cancellation.is_cancelled() {
            Err(Error::Cancelled)
        } else {
            Ok(())
        }
    }

    /// Certificate check for a fresh node at `level`. Nodes of the first
    /// path only record their certificate while no leaf exists.
    fn is_pruned_by_certificate(
        &mut self,
        partition: &OrderedPartition,
        level: usize,
        first_path: bool,
    ) -> bool {
        let certificate = match self.evaluator.evaluate(self.graph, partition, level) {
            Some(certificate) => certificate,
            None => return false,
        };

        let best = match self.selector.best() {
            Some(best) => best,
            None => {
                if first_path {
                    if self.first_certificates.len() <= level {
                        self.first_certificates.resize(level + 1, None);
                    }
                    self.first_certificates[level] = Some(certificate);
                }
                return false;
            }
        };

        // A node that looks like the first path may still lead to an
        // automorphism with the first leaf.
        let matches_first_path = self
            .first_certificates
            .get(level)
            .and_then(Option::as_ref)
            .map_or(false, |first| *first == certificate);

        !matches_first_path && compare_prefix(&certificate, &best.rows) == Ordering::Greater
    }

    /// Hands a discrete partition to the selector. On an automorphism,
    /// returns the depth of the deepest node that is kept: the subtree
    /// below it on the current path may be abandoned.
    fn reach_leaf(&mut self, partition: &OrderedPartition, path: &[VertexIndex]) -> Option<usize> {
        self.statistics.leaves += 1;
        let leaf = Leaf::new(self.graph, partition.lab().to_vec(), path.to_vec());

        match self.selector.offer(leaf) {
            LeafVerdict::First => {
                log::trace!("First leaf at depth {}", path.len());
                None
            }
            LeafVerdict::Improved => {
                log::trace!("Better leaf via {:?}", path);
                None
            }
            LeafVerdict::Worse => None,
            LeafVerdict::Automorphism {
                automorphism,
                common_depth,
            } => {
                log::trace!("Automorphism {}", automorphism.cycle_notation());
                self.accumulator.add_generator(automorphism);

                // Frames of the first path are never left early, their
                // exhaustion yields the group size.
                let first_depth = self.selector.first().map_or(0, |first| {
                    first
                        .path
                        .iter()
                        .zip(path.iter())
                        .take_while(|(a, b)| a == b)
                        .count()
                });
                Some(common_depth.max(first_depth))
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::invariant::InvariantConfig;

    fn search(graph: &SparseGraph, settings: &Settings) -> Result<SearchOutcome, Error> {
        SearchTree::new(graph, settings).run(OrderedPartition::unit(graph.order()))
    }

    fn cycle(n: usize) -> Result<SparseGraph, Error> {
        let edges = (0..n).map(|v| (v, (v + 1) % n)).collect::<Vec<_>>();
        Ok(SparseGraph::from_edges(n, &edges)?)
    }

    #[test]
    fn test_search_square() -> Result<(), Error> {
        let graph = cycle(4)?;
        let outcome = search(&graph, &Settings::default())?;

        assert_eq!(8.0, outcome.group_size);
        assert_eq!(vec![0, 0, 0, 0], outcome.orbits);
        assert!(outcome
            .generators
            .iter()
            .all(|generator| graph.is_automorphism(generator)));
        Ok(())
    }

    #[test]
    fn test_search_asymmetric() -> Result<(), Error> {
        // Legs of length 1, 2 and 3 hanging off vertex 1.
        let graph = SparseGraph::from_edges(
            7,
            &[(0, 1), (1, 2), (2, 3), (1, 4), (4, 5), (5, 6)],
        )?;
        let outcome = search(&graph, &Settings::default())?;

        assert_eq!(1.0, outcome.group_size);
        assert!(outcome.generators.is_empty());
        assert_eq!((0..7).collect::<Vec<_>>(), outcome.orbits);
        assert_eq!(7, outcome.number_of_orbits);
        Ok(())
    }

    #[test]
    fn test_search_empty_and_single() -> Result<(), Error> {
        let empty = SparseGraph::from_edges(0, &[])?;
        let outcome = search(&empty, &Settings::default())?;
        assert!(outcome.best.lab.is_empty());
        assert_eq!(1.0, outcome.group_size);

        let single = SparseGraph::from_edges(1, &[])?;
        let outcome = search(&single, &Settings::default())?;
        assert_eq!(vec![0], outcome.best.lab);
        assert_eq!(1, outcome.statistics.leaves);
        Ok(())
    }

    #[test]
    fn test_search_complete_graph() -> Result<(), Error> {
        let edges = (0..5)
            .flat_map(|u| (u + 1..5).map(move |v| (u, v)))
            .collect::<Vec<_>>();
        let graph = SparseGraph::from_edges(5, &edges)?;
        let outcome = search(&graph, &Settings::default())?;

        assert_eq!(120.0, outcome.group_size);
        assert_eq!(vec![0; 5], outcome.orbits);
        Ok(())
    }

    #[test]
    fn test_search_configurations_agree() -> Result<(), Error> {
        // Two triangles joined by a path of length two.
        let graph = SparseGraph::from_edges(
            7,
            &[(0, 1), (1, 2), (2, 0), (2, 3), (3, 4), (4, 5), (5, 6), (6, 4)],
        )?;

        let configs = vec![
            InvariantConfig::disabled(),
            InvariantConfig::default(),
            InvariantConfig::new(1, 1, 0)?,
            InvariantConfig::new(2, 5, 3)?,
            InvariantConfig::new(0, 100, 100)?,
        ];

        let mut outcomes = configs
            .into_iter()
            .map(|config| search(&graph, &Settings::with_invariants(config)))
            .collect::<Result<Vec<_>, Error>>()?;
        let reference = outcomes.remove(0);

        for outcome in outcomes {
            assert_eq!(reference.best.rows, outcome.best.rows);
            assert_eq!(reference.orbits, outcome.orbits);
            assert_eq!(reference.group_size, outcome.group_size);
        }
        assert_eq!(8.0, reference.group_size);
        Ok(())
    }

    #[test]
    fn test_search_cancelled() -> Result<(), Error> {
        let graph = cycle(6)?;
        let settings = Settings::default();
        settings.cancellation.cancel();

        assert!(matches!(search(&graph, &settings), Err(Error::Cancelled)));
        Ok(())
    }

    /// Cayley graph on Z4 x Z4 with connection set {±(1,0), ±(0,1), ±(1,1)},
    /// vertex (a, b) is 4a + b.
    fn shrikhande() -> Result<SparseGraph, Error> {
        let steps = [(1, 0), (0, 1), (1, 1)];
        let edges = (0..16)
            .flat_map(|vertex: usize| {
                let (a, b) = (vertex / 4, vertex % 4);
                steps
                    .iter()
                    .map(move |(da, db)| (vertex, 4 * ((a + da) % 4) + (b + db) % 4))
            })
            .collect::<Vec<_>>();
        Ok(SparseGraph::from_edges(16, &edges)?)
    }

    #[test]
    fn test_search_orbit_pruning_and_abandoning() -> Result<(), Error> {
        // Root children 0 and 1 are explored. The leaf below 1 is an
        // automorphism of the first leaf that ends the subtree of 1. Then
        // 2 and 3 share the orbit of 0.
        let graph = cycle(4)?;
        let outcome = search(&graph, &Settings::with_invariants(InvariantConfig::disabled()))?;

        assert_eq!(2, outcome.statistics.orbit_pruned);
        assert_eq!(1, outcome.statistics.abandoned);
        assert_eq!(0, outcome.statistics.invariant_pruned);
        assert_eq!(3, outcome.statistics.leaves);
        Ok(())
    }

    #[test]
    fn test_search_certificates_prune_nodes() -> Result<(), Error> {
        // Strongly regular, so refinement alone separates little.
        let graph = shrikhande()?;
        assert!((0..16).all(|vertex| graph.degree_of(vertex) == 6));

        let pruned = search(&graph, &Settings::default())?;
        let unpruned = search(&graph, &Settings::with_invariants(InvariantConfig::disabled()))?;

        assert!(pruned.statistics.invariant_pruned > 0);
        assert_eq!(0, unpruned.statistics.invariant_pruned);
        assert!(
            pruned.statistics.nodes < unpruned.statistics.nodes,
            "{} nodes with certificates, {} without",
            pruned.statistics.nodes,
            unpruned.statistics.nodes
        );
        assert!(pruned.statistics.leaves < unpruned.statistics.leaves);
        assert!(pruned.statistics.orbit_pruned > 0);
        assert!(pruned.statistics.abandoned > 0);

        assert_eq!(192.0, pruned.group_size);
        assert_eq!(pruned.group_size, unpruned.group_size);
        assert_eq!(pruned.best.rows, unpruned.best.rows);
        assert_eq!(vec![0; 16], pruned.orbits);
        assert_eq!(1, pruned.number_of_orbits);
        Ok(())
    }

    #[test]
    fn test_search_statistics() -> Result<(), Error> {
        let graph = cycle(6)?;
        let outcome = search(&graph, &Settings::default())?;

        assert_eq!(12.0, outcome.group_size);
        assert!(outcome.statistics.leaves >= 2);
        assert!(outcome.statistics.nodes > outcome.statistics.leaves);
        assert_eq!(outcome.generators.len(), outcome.statistics.generators);
        assert!(outcome.statistics.max_depth >= 2);
        Ok(())
    }
}
