use custom_debug_derive::Debug;
use itertools::Itertools;
use std::convert::TryFrom;

use super::{GraphError, VertexIndex};
use crate::permutation::Permutation;

/// Immutable undirected graph in adjacency-list form.
/// Vertex `v`'s neighbours are `neighbours[offsets[v]..offsets[v] + degree[v]]`.
#[derive(Debug, Clone)]
pub struct SparseGraph {
    order: usize,
    #[debug(skip)]
    offsets: Vec<usize>,
    #[debug(skip)]
    degree: Vec<usize>,
    neighbours: Vec<VertexIndex>,
}

impl SparseGraph {
    /// Checks all structural invariants before accepting the arrays:
    /// consistent offsets, neighbours in range, no repeated neighbour
    /// within one block and symmetric adjacency.
    pub fn new(
        order: usize,
        offsets: Vec<usize>,
        degree: Vec<usize>,
        neighbours: Vec<VertexIndex>,
    ) -> Result<Self, GraphError> {
        if offsets.len() != order {
            return Err(GraphError::new(
                "offsets",
                format!("expected {} entries, got {}", order, offsets.len()),
            ));
        }
        if degree.len() != order {
            return Err(GraphError::new(
                "degree",
                format!("expected {} entries, got {}", order, degree.len()),
            ));
        }

        let mut expected_offset = 0usize;
        for (vertex, (offset, vertex_degree)) in offsets.iter().zip(degree.iter()).enumerate() {
            if *offset != expected_offset {
                return Err(GraphError::new(
                    "offsets",
                    format!(
                        "offset of vertex {} is {}, expected {}",
                        vertex, offset, expected_offset
                    ),
                ));
            }
            expected_offset = expected_offset.checked_add(*vertex_degree).ok_or_else(|| {
                GraphError::new("degree", format!("degree of vertex {} overflows", vertex))
            })?;
        }
        if expected_offset != neighbours.len() {
            return Err(GraphError::new(
                "degree",
                format!(
                    "degrees sum up to {} but there are {} neighbour entries",
                    expected_offset,
                    neighbours.len()
                ),
            ));
        }

        if let Some(position) = neighbours.iter().position(|end| *end >= order) {
            return Err(GraphError::new(
                "neighbours",
                format!(
                    "entry {} refers to vertex {} in a graph of order {}",
                    position, neighbours[position], order
                ),
            ));
        }

        let graph = SparseGraph {
            order,
            offsets,
            degree,
            neighbours,
        };
        graph.check_simple_and_symmetric()?;

        Ok(graph)
    }

    /// Same as [`SparseGraph::new`] but for signed arrays as they come
    /// from foreign hosts. Negative entries are rejected.
    pub fn from_raw(
        order: i32,
        offsets: &[i32],
        degree: &[i32],
        neighbours: &[i32],
    ) -> Result<Self, GraphError> {
        fn convert(field: &'static str, values: &[i32]) -> Result<Vec<usize>, GraphError> {
            values
                .iter()
                .enumerate()
                .map(|(position, value)| {
                    usize::try_from(*value).map_err(|_| {
                        GraphError::new(
                            field,
                            format!("entry {} is negative ({})", position, value),
                        )
                    })
                })
                .collect()
        }

        let order = usize::try_from(order)
            .map_err(|_| GraphError::new("order", format!("order {} is negative", order)))?;

        SparseGraph::new(
            order,
            convert("offsets", offsets)?,
            convert("degree", degree)?,
            convert("neighbours", neighbours)?,
        )
    }

    /// Builds a graph from undirected edges. Self-loops are allowed,
    /// parallel edges are collapsed.
    pub fn from_edges(
        order: usize,
        edges: &[(VertexIndex, VertexIndex)],
    ) -> Result<Self, GraphError> {
        let mut adjacency = vec![Vec::new(); order];
        for (start, end) in edges.iter().copied() {
            if start >= order || end >= order {
                return Err(GraphError::new(
                    "neighbours",
                    format!(
                        "edge {}--{} leaves a graph of order {}",
                        start, end, order
                    ),
                ));
            }
            adjacency[start].push(end);
            if start != end {
                adjacency[end].push(start);
            }
        }

        Self::from_adjacency(adjacency)
    }

    /// Builds a graph from one neighbour list per vertex.
    /// Lists are sorted and deduplicated first.
    pub fn from_adjacency(mut adjacency: Vec<Vec<VertexIndex>>) -> Result<Self, GraphError> {
        let order = adjacency.len();
        let mut offsets = Vec::with_capacity(order);
        let mut degree = Vec::with_capacity(order);
        let mut neighbours = Vec::new();

        for row in adjacency.iter_mut() {
            row.sort_unstable();
            row.dedup();
            offsets.push(neighbours.len());
            degree.push(row.len());
            neighbours.extend_from_slice(row);
        }

        Self::new(order, offsets, degree, neighbours)
    }

    fn check_simple_and_symmetric(&self) -> Result<(), GraphError> {
        let sorted = (0..self.order)
            .map(|vertex| self.neighbours_of(vertex).iter().copied().sorted().collect_vec())
            .collect_vec();

        for (vertex, row) in sorted.iter().enumerate() {
            if let Some((repeated, _)) = row.iter().tuple_windows().find(|(a, b)| a == b) {
                return Err(GraphError::new(
                    "neighbours",
                    format!("vertex {} lists neighbour {} more than once", vertex, repeated),
                ));
            }

            for end in row.iter() {
                if sorted[*end].binary_search(&vertex).is_err() {
                    return Err(GraphError::new(
                        "neighbours",
                        format!(
                            "edge {}--{} is missing its reverse {}--{}",
                            vertex, end, end, vertex
                        ),
                    ));
                }
            }
        }

        Ok(())
    }

    pub fn order(&self) -> usize {
        self.order
    }

    pub fn neighbours_of(&self, vertex: VertexIndex) -> &[VertexIndex] {
        let start = self.offsets[vertex];
        &self.neighbours[start..start + self.degree[vertex]]
    }

    pub fn degree_of(&self, vertex: VertexIndex) -> usize {
        self.degree[vertex]
    }

    pub fn number_of_arcs(&self) -> usize {
        self.neighbours.len()
    }

    /// Number of undirected edges, self-loops included.
    pub fn number_of_edges(&self) -> usize {
        let loops = (0..self.order).filter(|v| self.has_loop(*v)).count();
        (self.neighbours.len() - loops) / 2 + loops
    }

    pub fn has_loop(&self, vertex: VertexIndex) -> bool {
        self.neighbours_of(vertex).contains(&vertex)
    }

    pub fn has_edge(&self, start: VertexIndex, end: VertexIndex) -> bool {
        self.neighbours_of(start).contains(&end)
    }

    /// All edges as `(u, v)` with `u <= v`, sorted by `v` and then `u`.
    pub fn edges(&self) -> Vec<(VertexIndex, VertexIndex)> {
        (0..self.order)
            .flat_map(|end| {
                self.neighbours_of(end)
                    .iter()
                    .copied()
                    .filter(move |start| *start <= end)
                    .sorted()
                    .map(move |start| (start, end))
            })
            .collect()
    }

    /// Renames every vertex `v` to `relabelling(v)`. Neighbour lists
    /// of the result are sorted.
    pub fn relabel(&self, relabelling: &Permutation) -> Result<Self, GraphError> {
        if relabelling.len() != self.order {
            return Err(GraphError::new(
                "permutation",
                format!(
                    "a permutation of {} vertices cannot relabel a graph of order {}",
                    relabelling.len(),
                    self.order
                ),
            ));
        }

        let mut adjacency = vec![Vec::new(); self.order];
        for vertex in 0..self.order {
            adjacency[relabelling[vertex]] = self
                .neighbours_of(vertex)
                .iter()
                .map(|end| relabelling[*end])
                .sorted()
                .collect();
        }

        Ok(Self::from_sorted_adjacency(adjacency))
    }

    /// Constructor for adjacency lists that are known to be sorted,
    /// duplicate free and symmetric.
    pub(crate) fn from_sorted_adjacency(adjacency: Vec<Vec<VertexIndex>>) -> Self {
        let mut offsets = Vec::with_capacity(adjacency.len());
        let mut degree = Vec::with_capacity(adjacency.len());
        let mut neighbours = Vec::new();
        for row in adjacency.iter() {
            offsets.push(neighbours.len());
            degree.push(row.len());
            neighbours.extend_from_slice(row);
        }

        SparseGraph {
            order: adjacency.len(),
            offsets,
            degree,
            neighbours,
        }
    }

    /// Whether `permutation` maps the edge set onto itself.
    pub fn is_automorphism(&self, permutation: &Permutation) -> bool {
        permutation.len() == self.order
            && (0..self.order).all(|vertex| {
                let image = permutation[vertex];
                self.degree_of(vertex) == self.degree_of(image)
                    && self
                        .neighbours_of(vertex)
                        .iter()
                        .all(|end| self.has_edge(image, permutation[*end]))
            })
    }

    /// The flat `(offsets, degree, neighbours)` arrays.
    pub fn to_arrays(&self) -> (Vec<usize>, Vec<usize>, Vec<VertexIndex>) {
        (
            self.offsets.clone(),
            self.degree.clone(),
            self.neighbours.clone(),
        )
    }
}

impl PartialEq for SparseGraph {
    fn eq(&self, other: &Self) -> bool {
        self.order == other.order
            && (0..self.order).all(|vertex| {
                self.degree_of(vertex) == other.degree_of(vertex)
                    && self
                        .neighbours_of(vertex)
                        .iter()
                        .sorted()
                        .eq(other.neighbours_of(vertex).iter().sorted())
            })
    }
}

impl Eq for SparseGraph {}

#[cfg(test)]
mod test {
    use super::*;

    fn path_arrays() -> (Vec<usize>, Vec<usize>, Vec<usize>) {
        // 0 - 1 - 2 - 3
        (vec![0, 1, 3, 5], vec![1, 2, 2, 1], vec![1, 0, 2, 1, 3, 2])
    }

    #[test]
    fn test_new_valid() -> Result<(), GraphError> {
        let (offsets, degree, neighbours) = path_arrays();
        let graph = SparseGraph::new(4, offsets, degree, neighbours)?;

        assert_eq!(4, graph.order());
        assert_eq!(&[0, 2], graph.neighbours_of(1));
        assert_eq!(1, graph.degree_of(3));
        assert_eq!(6, graph.number_of_arcs());
        assert_eq!(3, graph.number_of_edges());
        assert_eq!(vec![(0, 1), (1, 2), (2, 3)], graph.edges());
        Ok(())
    }

    #[test]
    fn test_new_empty() -> Result<(), GraphError> {
        let graph = SparseGraph::new(0, vec![], vec![], vec![])?;
        assert_eq!(0, graph.order());
        assert!(graph.edges().is_empty());
        Ok(())
    }

    #[test]
    fn test_out_of_range_neighbour() {
        let (offsets, degree, mut neighbours) = path_arrays();
        neighbours[5] = 4;
        let error = SparseGraph::new(4, offsets, degree, neighbours).unwrap_err();
        assert_eq!("neighbours", error.field);
    }

    #[test]
    fn test_inconsistent_offsets() {
        let (mut offsets, degree, neighbours) = path_arrays();
        offsets[2] = 2;
        let error = SparseGraph::new(4, offsets, degree, neighbours).unwrap_err();
        assert_eq!("offsets", error.field);

        let (offsets, mut degree, neighbours) = path_arrays();
        degree[3] = 2;
        let error = SparseGraph::new(4, offsets, degree, neighbours).unwrap_err();
        assert_eq!("degree", error.field);

        let (offsets, degree, neighbours) = path_arrays();
        let error = SparseGraph::new(5, offsets, degree, neighbours).unwrap_err();
        assert_eq!("offsets", error.field);
    }

    #[test]
    fn test_asymmetric() {
        // 0 -> 1 without 1 -> 0
        let error = SparseGraph::new(2, vec![0, 1], vec![1, 0], vec![1]).unwrap_err();
        assert_eq!("neighbours", error.field);
    }

    #[test]
    fn test_repeated_neighbour() {
        let error = SparseGraph::new(2, vec![0, 2], vec![2, 2], vec![1, 1, 0, 0]).unwrap_err();
        assert_eq!("neighbours", error.field);
    }

    #[test]
    fn test_self_loop() -> Result<(), GraphError> {
        let graph = SparseGraph::from_edges(2, &[(0, 0), (0, 1)])?;
        assert!(graph.has_loop(0));
        assert!(!graph.has_loop(1));
        assert_eq!(3, graph.number_of_arcs());
        assert_eq!(2, graph.number_of_edges());
        assert_eq!(vec![(0, 0), (0, 1)], graph.edges());
        Ok(())
    }

    #[test]
    fn test_from_raw() {
        assert!(SparseGraph::from_raw(2, &[0, 1], &[1, 1], &[1, 0]).is_ok());

        let error = SparseGraph::from_raw(-1, &[], &[], &[]).unwrap_err();
        assert_eq!("order", error.field);
        let error = SparseGraph::from_raw(2, &[0, 1], &[1, 1], &[1, -3]).unwrap_err();
        assert_eq!("neighbours", error.field);
    }

    #[test]
    fn test_relabel_and_automorphism() -> Result<(), GraphError> {
        let graph = SparseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
        let reverse = Permutation::new(vec![3, 2, 1, 0])?;
        let shift = Permutation::new(vec![1, 2, 3, 0])?;

        assert!(graph.is_automorphism(&reverse));
        assert!(!graph.is_automorphism(&shift));
        assert_eq!(graph, graph.relabel(&reverse)?);

        let shifted = graph.relabel(&shift)?;
        assert_eq!(vec![(1, 2), (0, 3), (2, 3)], shifted.edges());
        Ok(())
    }

    #[test]
    fn test_relabel_with_wrong_order() -> Result<(), GraphError> {
        let graph = SparseGraph::from_edges(4, &[(0, 1), (1, 2), (2, 3)])?;
        let short = Permutation::new(vec![2, 1, 0])?;
        let long = Permutation::new(vec![4, 3, 2, 1, 0])?;

        assert_eq!("permutation", graph.relabel(&short).unwrap_err().field);
        assert!(graph.relabel(&long).is_err());
        assert!(!graph.is_automorphism(&short));
        assert!(!graph.is_automorphism(&long));
        Ok(())
    }

    #[test]
    fn test_semantic_equality() -> Result<(), GraphError> {
        let unsorted = SparseGraph::new(3, vec![0, 2, 3], vec![2, 1, 1], vec![2, 1, 0, 0])?;
        let sorted = SparseGraph::from_edges(3, &[(0, 1), (0, 2)])?;
        assert_eq!(sorted, unsorted);
        Ok(())
    }
}
