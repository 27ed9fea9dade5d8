//! Permutations of the vertex set, stored as image vectors.

use itertools::Itertools;
use std::{convert::TryFrom, ops::Index};

use crate::graph::{GraphError, VertexIndex};

/// `raw[v]` is the image of vertex `v`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Permutation {
    raw: Vec<VertexIndex>,
}

impl Permutation {
    /// Fails unless `raw` holds every vertex of `0..raw.len()` exactly once.
    pub fn new(raw: Vec<VertexIndex>) -> Result<Self, GraphError> {
        if !Self::is_valid(&raw) {
            return Err(GraphError::new(
                "permutation",
                format!("{:?} is not a permutation of 0..{}", raw, raw.len()),
            ));
        }
        Ok(Permutation { raw })
    }

    /// For image vectors the search derives from vertex orderings.
    pub(crate) fn from_ordering(raw: Vec<VertexIndex>) -> Self {
        debug_assert!(Self::is_valid(&raw));
        Permutation { raw }
    }

    pub fn identity(n: usize) -> Self {
        Permutation {
            raw: (0..n).collect(),
        }
    }

    /// Whether `raw` contains every element of `0..raw.len()` exactly once.
    pub fn is_valid(raw: &[VertexIndex]) -> bool {
        let mut seen = vec![false; raw.len()];
        raw.iter().all(|image| {
            if *image >= seen.len() || seen[*image] {
                false
            } else {
                seen[*image] = true;
                true
            }
        })
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn images(&self) -> &[VertexIndex] {
        &self.raw
    }

    pub fn is_identity(&self) -> bool {
        self.raw
            .iter()
            .enumerate()
            .all(|(vertex, image)| vertex == *image)
    }

    /// Whether every vertex in `vertices` is mapped onto itself.
    pub fn fixes(&self, vertices: &[VertexIndex]) -> bool {
        vertices.iter().all(|vertex| self.raw[*vertex] == *vertex)
    }

    pub fn inverse(&self) -> Self {
        let mut raw = vec![0; self.raw.len()];
        for (vertex, image) in self.raw.iter().enumerate() {
            raw[*image] = vertex;
        }
        Permutation { raw }
    }

    /// `self` after `first`, i.e. `v -> self(first(v))`.
    pub fn after(&self, first: &Permutation) -> Self {
        debug_assert_eq!(self.len(), first.len());
        Permutation {
            raw: first.raw.iter().map(|image| self.raw[*image]).collect(),
        }
    }

    /// The cycles of length at least two, each starting at its smallest vertex.
    pub fn get_cycles(&self) -> Vec<Vec<VertexIndex>> {
        let mut visited = vec![false; self.raw.len()];
        let mut cycles = Vec::new();

        for start in 0..self.raw.len() {
            if visited[start] || self.raw[start] == start {
                continue;
            }

            let mut cycle = vec![start];
            visited[start] = true;
            let mut current = self.raw[start];
            while current != start {
                visited[current] = true;
                cycle.push(current);
                current = self.raw[current];
            }
            cycles.push(cycle);
        }

        cycles
    }

    /// Cycle notation as printed by nauty, e.g. `(0 3)(1 2)`.
    pub fn cycle_notation(&self) -> String {
        let cycles = self.get_cycles();
        if cycles.is_empty() {
            return "()".to_string();
        }

        cycles
            .iter()
            .map(|cycle| format!("({})", cycle.iter().join(" ")))
            .collect()
    }
}

impl TryFrom<Vec<VertexIndex>> for Permutation {
    type Error = GraphError;

    fn try_from(raw: Vec<VertexIndex>) -> Result<Self, Self::Error> {
        Self::new(raw)
    }
}

impl Index<VertexIndex> for Permutation {
    type Output = VertexIndex;

    fn index(&self, vertex: VertexIndex) -> &Self::Output {
        &self.raw[vertex]
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_is_valid() {
        assert!(Permutation::is_valid(&[2, 0, 1]));
        assert!(Permutation::is_valid(&[]));
        assert!(!Permutation::is_valid(&[0, 0, 1]));
        assert!(!Permutation::is_valid(&[0, 3, 1]));
    }

    #[test]
    fn test_new_rejects_non_permutations() {
        let error = Permutation::new(vec![0, 0, 1]).unwrap_err();
        assert_eq!("permutation", error.field);
        assert!(Permutation::new(vec![0, 3, 1]).is_err());
        assert!(Permutation::try_from(vec![1, 2]).is_err());
        assert!(Permutation::try_from(vec![1, 0]).is_ok());
    }

    #[test]
    fn test_inverse_and_after() -> Result<(), GraphError> {
        let permutation = Permutation::new(vec![1, 2, 0, 3])?;
        let inverse = permutation.inverse();
        assert_eq!(&[2, 0, 1, 3], inverse.images());
        assert!(permutation.after(&inverse).is_identity());
        assert!(inverse.after(&permutation).is_identity());

        let swap = Permutation::new(vec![1, 0, 2, 3])?;
        // first swap, then rotate
        assert_eq!(&[2, 1, 0, 3], permutation.after(&swap).images());
        Ok(())
    }

    #[test]
    fn test_get_cycles() -> Result<(), GraphError> {
        let permutation = Permutation::new(vec![3, 2, 1, 0, 4, 6, 7, 5])?;
        assert_eq!(
            vec![vec![0, 3], vec![1, 2], vec![5, 6, 7]],
            permutation.get_cycles()
        );
        assert_eq!("(0 3)(1 2)(5 6 7)", permutation.cycle_notation());
        assert_eq!("()", Permutation::identity(3).cycle_notation());
        Ok(())
    }

    #[test]
    fn test_fixes() -> Result<(), GraphError> {
        let permutation = Permutation::new(vec![0, 2, 1, 3])?;
        assert!(permutation.fixes(&[0, 3]));
        assert!(!permutation.fixes(&[0, 1]));
        assert_eq!(2, permutation[1]);
        Ok(())
    }
}
