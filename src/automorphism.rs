//! Collects the automorphisms found during the search and keeps
//! the orbits they generate.

use std::collections::{HashSet, VecDeque};

use crate::{graph::VertexIndex, permutation::Permutation};

/// Union-find over the vertex set, linked by size. Each root also
/// remembers the smallest member of its set, which serves as the
/// nauty-style orbit label.
#[derive(Debug, Clone)]
pub struct Orbits {
    parent: Vec<VertexIndex>,
    size: Vec<usize>,
    /// Only valid at roots.
    smallest: Vec<VertexIndex>,
}

impl Orbits {
    /// Every vertex in its own orbit.
    pub fn new(n: usize) -> Self {
        Orbits {
            parent: (0..n).collect(),
            size: vec![1; n],
            smallest: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of the set containing `vertex`.
    fn find(&mut self, vertex: VertexIndex) -> VertexIndex {
        let mut current = vertex;
        while self.parent[current] != current {
            // Path halving.
            self.parent[current] = self.parent[self.parent[current]];
            current = self.parent[current];
        }
        current
    }

    /// Smallest vertex in the orbit of `vertex`.
    pub fn label(&mut self, vertex: VertexIndex) -> VertexIndex {
        let root = self.find(vertex);
        self.smallest[root]
    }

    /// Merges the orbits of both vertices. Returns whether they were apart.
    pub fn union(&mut self, left: VertexIndex, right: VertexIndex) -> bool {
        let left = self.find(left);
        let right = self.find(right);
        if left == right {
            return false;
        }

        let (root, child) = if self.size[left] < self.size[right] {
            (right, left)
        } else {
            (left, right)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        self.smallest[root] = self.smallest[root].min(self.smallest[child]);
        true
    }

    pub fn same(&mut self, left: VertexIndex, right: VertexIndex) -> bool {
        self.find(left) == self.find(right)
    }

    pub fn orbit_size(&mut self, vertex: VertexIndex) -> usize {
        let root = self.find(vertex);
        self.size[root]
    }

    /// Joins the orbits along every cycle of `generator`.
    pub fn apply_generator(&mut self, generator: &Permutation) {
        debug_assert_eq!(generator.len(), self.len());
        for (vertex, image) in generator.images().iter().enumerate() {
            self.union(vertex, *image);
        }
    }

    /// `orbits[v]` is the smallest vertex in the orbit of `v`.
    pub fn representatives(&mut self) -> Vec<VertexIndex> {
        (0..self.len()).map(|vertex| self.label(vertex)).collect()
    }

    pub fn number_of_orbits(&self) -> usize {
        self.parent
            .iter()
            .enumerate()
            .filter(|(vertex, parent)| vertex == *parent)
            .count()
    }
}

/// Orbits of the subgroup generated by those generators that fix a
/// given sequence of vertices pointwise. `absorbed` counts how many
/// generators of the accumulator were already looked at.
#[derive(Debug, Clone)]
pub struct StabiliserOrbits {
    pub orbits: Orbits,
    absorbed: usize,
}

impl StabiliserOrbits {
    pub fn new(n: usize) -> Self {
        StabiliserOrbits {
            orbits: Orbits::new(n),
            absorbed: 0,
        }
    }
}

#[derive(Debug)]
pub struct AutomorphismAccumulator {
    order: usize,
    generators: Vec<Permutation>,
    orbits: Orbits,
}

impl AutomorphismAccumulator {
    pub fn new(order: usize) -> Self {
        AutomorphismAccumulator {
            order,
            generators: Vec::new(),
            orbits: Orbits::new(order),
        }
    }

    /// Records a new generator. The identity, known generators and
    /// inverses of known generators add nothing and are dropped.
    /// Returns whether the generator was kept.
    pub fn add_generator(&mut self, generator: Permutation) -> bool {
        debug_assert_eq!(self.order, generator.len());
        if generator.is_identity() {
            return false;
        }

        let inverse = generator.inverse();
        if self
            .generators
            .iter()
            .any(|known| *known == generator || *known == inverse)
        {
            return false;
        }

        self.orbits.apply_generator(&generator);
        self.generators.push(generator);
        true
    }

    pub fn into_generators(self) -> Vec<Permutation> {
        self.generators
    }

    pub fn orbit_of(&mut self, vertex: VertexIndex) -> VertexIndex {
        self.orbits.label(vertex)
    }

    pub fn orbits(&mut self) -> Vec<VertexIndex> {
        self.orbits.representatives()
    }

    pub fn number_of_orbits(&self) -> usize {
        self.orbits.number_of_orbits()
    }

    /// Brings `stabiliser` up to date with the generators found since
    /// its last sync, using only those that fix every vertex in `fixed`.
    pub fn sync_stabiliser(&self, stabiliser: &mut StabiliserOrbits, fixed: &[VertexIndex]) {
        for generator in self.generators[stabiliser.absorbed..].iter() {
            if generator.fixes(fixed) {
                stabiliser.orbits.apply_generator(generator);
            }
        }
        stabiliser.absorbed = self.generators.len();
    }

    /// Elements of the group generated by the generators, breadth first
    /// from the identity. Stops after `limit` elements.
    pub fn group_elements(&self, limit: usize) -> Vec<Permutation> {
        let identity = Permutation::identity(self.order);
        let mut seen = HashSet::new();
        let mut elements = Vec::new();
        let mut queue = VecDeque::new();

        seen.insert(identity.clone());
        queue.push_back(identity);

        while let Some(element) = queue.pop_front() {
            if elements.len() >= limit {
                break;
            }

            for generator in self.generators.iter() {
                let product = generator.after(&element);
                if seen.insert(product.clone()) {
                    queue.push_back(product);
                }
            }
            elements.push(element);
        }

        elements
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::GraphError;

    #[test]
    fn test_orbits() -> Result<(), GraphError> {
        let mut orbits = Orbits::new(7);
        orbits.apply_generator(&Permutation::new(vec![0, 1, 4, 3, 2, 6, 5])?);
        assert_eq!(vec![0, 1, 2, 3, 2, 5, 5], orbits.representatives());
        assert_eq!(5, orbits.number_of_orbits());

        assert!(orbits.union(6, 1));
        assert!(!orbits.union(5, 1));
        assert_eq!(3, orbits.orbit_size(6));
        assert!(orbits.same(1, 5));
        assert!(!orbits.same(0, 5));
        assert_eq!(1, orbits.label(6));
        Ok(())
    }

    #[test]
    fn test_orbit_labels_under_union_by_size() {
        let n = 64;
        let mut orbits = Orbits::new(n);
        // Every union attaches the next smaller vertex to the set above it.
        for vertex in (0..n - 1).rev() {
            assert!(orbits.union(vertex, vertex + 1));
        }

        assert_eq!(1, orbits.number_of_orbits());
        assert_eq!(vec![0; n], orbits.representatives());
        assert_eq!(n, orbits.orbit_size(n - 1));

        let mut orbits = Orbits::new(n);
        for vertex in (0..n - 1).rev() {
            orbits.union(vertex, vertex + 1);
        }
        // Every vertex hangs directly below the root.
        let depth = (0..n)
            .map(|vertex| {
                let mut current = vertex;
                let mut depth = 0;
                while orbits.parent[current] != current {
                    current = orbits.parent[current];
                    depth += 1;
                }
                depth
            })
            .max();
        assert!(depth <= Some(1), "depth {:?}", depth);
    }

    #[test]
    fn test_generated_orbits() -> Result<(), GraphError> {
        let mut accumulator = AutomorphismAccumulator::new(8);
        accumulator.add_generator(Permutation::new(vec![5, 1, 2, 6, 4, 0, 3, 7])?);
        accumulator.add_generator(Permutation::new(vec![0, 3, 2, 1, 4, 7, 6, 5])?);
        assert_eq!(vec![0, 1, 2, 1, 4, 0, 1, 0], accumulator.orbits());
        assert_eq!(1, accumulator.orbit_of(6));
        assert_eq!(4, accumulator.number_of_orbits());
        Ok(())
    }

    #[test]
    fn test_redundant_generators() -> Result<(), GraphError> {
        let mut accumulator = AutomorphismAccumulator::new(4);
        assert!(!accumulator.add_generator(Permutation::identity(4)));
        assert!(accumulator.add_generator(Permutation::new(vec![1, 2, 3, 0])?));
        assert!(!accumulator.add_generator(Permutation::new(vec![1, 2, 3, 0])?));
        // The inverse rotation.
        assert!(!accumulator.add_generator(Permutation::new(vec![3, 0, 1, 2])?));
        assert!(accumulator.add_generator(Permutation::new(vec![0, 3, 2, 1])?));
        assert_eq!(2, accumulator.into_generators().len());
        Ok(())
    }

    #[test]
    fn test_sync_stabiliser() -> Result<(), GraphError> {
        let mut accumulator = AutomorphismAccumulator::new(4);
        let mut stabiliser = StabiliserOrbits::new(4);

        accumulator.add_generator(Permutation::new(vec![1, 0, 2, 3])?);
        accumulator.sync_stabiliser(&mut stabiliser, &[0]);
        assert!(!stabiliser.orbits.same(0, 1));

        accumulator.add_generator(Permutation::new(vec![0, 1, 3, 2])?);
        accumulator.sync_stabiliser(&mut stabiliser, &[0]);
        assert!(stabiliser.orbits.same(2, 3));
        assert!(!stabiliser.orbits.same(0, 1));

        // Generators already absorbed are not looked at again.
        accumulator.sync_stabiliser(&mut stabiliser, &[]);
        assert!(!stabiliser.orbits.same(0, 1));
        Ok(())
    }

    #[test]
    fn test_group_of_square() -> Result<(), GraphError> {
        // Symmetries of the 4-cycle 0-1-2-3: rotation and a reflection.
        let mut accumulator = AutomorphismAccumulator::new(4);
        accumulator.add_generator(Permutation::new(vec![1, 2, 3, 0])?);
        accumulator.add_generator(Permutation::new(vec![0, 3, 2, 1])?);

        let elements = accumulator.group_elements(usize::MAX);
        assert_eq!(8, elements.len());
        assert!(elements[0].is_identity());
        assert_eq!(elements.len(), elements.iter().collect::<HashSet<_>>().len());

        assert_eq!(3, accumulator.group_elements(3).len());
        Ok(())
    }

    #[test]
    fn test_trivial_group() {
        let accumulator = AutomorphismAccumulator::new(3);
        let elements = accumulator.group_elements(10);
        assert_eq!(1, elements.len());
        assert!(elements[0].is_identity());
    }
}
