//! Total order on search-tree leaves and selection of the canonical one.
//!
//! A leaf is a discrete partition, i.e. a vertex ordering `lab`. It is
//! encoded by the adjacency matrix of the relabelled graph, read row by
//! row as a bit sequence where 0 < 1. The smallest encoding wins.
//!
//! Rows are kept as sorted lists of columns holding a 1. Because the
//! matrix is symmetric, comparing whole rows in row-major order finds
//! the same first difference as comparing only the upper triangles.

use std::cmp::Ordering;

use crate::{
    graph::{SparseGraph, VertexIndex},
    permutation::Permutation,
};

pub type Row = Vec<usize>;

/// Compare two matrix rows as bit strings.
/// The row that has a 1 at the first differing column is the bigger one.
pub fn compare_rows(left: &[usize], right: &[usize]) -> Ordering {
    for (l, r) in left.iter().zip(right.iter()) {
        match l.cmp(r) {
            Ordering::Equal => continue,
            // `left` has a 1 at column `l` where `right` has a 0.
            Ordering::Less => return Ordering::Greater,
            Ordering::Greater => return Ordering::Less,
        }
    }
    left.len().cmp(&right.len())
}

/// Lexicographic comparison of two sequences of rows. Only the rows
/// both sequences have are compared.
pub fn compare_prefix(left: &[Row], right: &[Row]) -> Ordering {
    left.iter()
        .zip(right.iter())
        .map(|(l, r)| compare_rows(l, r))
        .find(|ordering| *ordering != Ordering::Equal)
        .unwrap_or(Ordering::Equal)
}

/// The rows of the adjacency matrix of `graph` relabelled so that
/// `lab[i]` becomes vertex `i`.
pub fn leaf_rows(graph: &SparseGraph, lab: &[VertexIndex]) -> Vec<Row> {
    let mut position = vec![0; lab.len()];
    for (index, vertex) in lab.iter().enumerate() {
        position[*vertex] = index;
    }

    lab.iter()
        .map(|vertex| {
            let mut row = graph
                .neighbours_of(*vertex)
                .iter()
                .map(|end| position[*end])
                .collect::<Row>();
            row.sort_unstable();
            row
        })
        .collect()
}

#[derive(Debug, Clone)]
pub struct Leaf {
    pub lab: Vec<VertexIndex>,
    /// The individualized vertices leading to this leaf.
    pub path: Vec<VertexIndex>,
    pub rows: Vec<Row>,
}

impl Leaf {
    pub fn new(graph: &SparseGraph, lab: Vec<VertexIndex>, path: Vec<VertexIndex>) -> Self {
        let rows = leaf_rows(graph, &lab);
        Leaf { lab, path, rows }
    }

    /// The automorphism mapping `other` onto `self`, valid if both
    /// leaves have the same encoding: `v -> self.lab[pos_other(v)]`.
    pub fn automorphism_from(&self, other: &Leaf) -> Permutation {
        let mut raw = vec![0; self.lab.len()];
        for (index, vertex) in other.lab.iter().enumerate() {
            raw[*vertex] = self.lab[index];
        }
        Permutation::from_ordering(raw)
    }

    /// Length of the common prefix of both search paths.
    pub fn common_depth(&self, other: &Leaf) -> usize {
        self.path
            .iter()
            .zip(other.path.iter())
            .take_while(|(a, b)| a == b)
            .count()
    }

    /// The labelling as permutation `v -> new label of v`.
    pub fn relabelling(&self) -> Permutation {
        let mut raw = vec![0; self.lab.len()];
        for (index, vertex) in self.lab.iter().enumerate() {
            raw[*vertex] = index;
        }
        Permutation::from_ordering(raw)
    }
}

/// What a newly reached leaf means for the search.
#[derive(Debug, PartialEq, Eq)]
pub enum LeafVerdict {
    /// The very first leaf, it is also the incumbent now.
    First,
    /// Strictly smaller than the incumbent and replaced it.
    Improved,
    /// Same encoding as an earlier leaf. `common_depth` is the length of
    /// the common path prefix with that leaf.
    Automorphism {
        automorphism: Permutation,
        common_depth: usize,
    },
    Worse,
}

/// Keeps the first leaf and the smallest leaf seen so far.
#[derive(Debug, Default)]
pub struct CanonicalSelector {
    first: Option<Leaf>,
    best: Option<Leaf>,
}

impl CanonicalSelector {
    pub fn first(&self) -> Option<&Leaf> {
        self.first.as_ref()
    }

    /// The incumbent. Falls back to the first leaf, which is the
    /// incumbent until something smaller comes along.
    pub fn best(&self) -> Option<&Leaf> {
        self.best.as_ref().or_else(|| self.first.as_ref())
    }

    pub fn offer(&mut self, leaf: Leaf) -> LeafVerdict {
        let first = match &self.first {
            None => {
                self.first = Some(leaf);
                return LeafVerdict::First;
            }
            Some(first) => first,
        };

        if first.rows == leaf.rows {
            return LeafVerdict::Automorphism {
                automorphism: first.automorphism_from(&leaf),
                common_depth: first.common_depth(&leaf),
            };
        }

        let best = self.best.as_ref().unwrap_or(first);
        match compare_prefix(&leaf.rows, &best.rows) {
            Ordering::Less => {
                self.best = Some(leaf);
                LeafVerdict::Improved
            }
            Ordering::Equal => LeafVerdict::Automorphism {
                automorphism: best.automorphism_from(&leaf),
                common_depth: best.common_depth(&leaf),
            },
            Ordering::Greater => LeafVerdict::Worse,
        }
    }

    /// The selected leaf.
    pub fn into_best(self) -> Option<Leaf> {
        self.best.or(self.first)
    }
}
