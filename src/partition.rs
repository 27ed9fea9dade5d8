//! Ordered partitions of the vertex set in the `lab`/`ptn`
//! form nauty uses: `lab` lists the vertices cell by cell and
//! `ptn[i]` marks the last position of a cell.

use itertools::Itertools;

use crate::graph::{Colour, GraphError, VertexIndex};

/// Cells are addressed by the position of their first element in `lab`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedPartition {
    lab: Vec<VertexIndex>,
    /// Inverse of `lab`.
    position: Vec<usize>,
    ptn: Vec<bool>,
    /// Start of the cell each vertex is in.
    cell_of: Vec<usize>,
    /// End of the cell starting at a position, only valid at cell starts.
    cell_end: Vec<usize>,
    cells: usize,
}

impl OrderedPartition {
    /// The partition with a single cell.
    pub fn unit(n: usize) -> Self {
        let mut ptn = vec![false; n];
        if let Some(last) = ptn.last_mut() {
            *last = true;
        }

        OrderedPartition {
            lab: (0..n).collect(),
            position: (0..n).collect(),
            ptn,
            cell_of: vec![0; n],
            cell_end: vec![n.saturating_sub(1); n],
            cells: if n == 0 { 0 } else { 1 },
        }
    }

    /// One cell per colour, ordered by increasing colour value.
    /// Within a cell vertices keep increasing index order.
    pub fn from_colours(colours: &[Colour]) -> Self {
        let n = colours.len();
        let lab = (0..n)
            .sorted_by_key(|vertex| (colours[*vertex], *vertex))
            .collect_vec();
        let ptn = (0..n)
            .map(|position| position + 1 == n || colours[lab[position]] != colours[lab[position + 1]])
            .collect_vec();

        let mut position = vec![0; n];
        for (index, vertex) in lab.iter().enumerate() {
            position[*vertex] = index;
        }

        Self::assemble(lab, position, ptn)
    }

    /// Builds a partition from its `lab`/`ptn` arrays.
    pub fn from_lab_ptn(lab: Vec<VertexIndex>, ptn: Vec<bool>) -> Result<Self, GraphError> {
        let n = lab.len();
        if ptn.len() != n {
            return Err(GraphError::new(
                "ptn",
                format!("expected {} cell markers, got {}", n, ptn.len()),
            ));
        }
        if n > 0 && !ptn[n - 1] {
            return Err(GraphError::new("ptn", "the last position must end a cell"));
        }

        let mut position = vec![usize::MAX; n];
        for (index, vertex) in lab.iter().enumerate() {
            if *vertex >= n || position[*vertex] != usize::MAX {
                return Err(GraphError::new(
                    "lab",
                    format!("lab is not a permutation of 0..{}", n),
                ));
            }
            position[*vertex] = index;
        }

        Ok(Self::assemble(lab, position, ptn))
    }

    fn assemble(lab: Vec<VertexIndex>, position: Vec<usize>, ptn: Vec<bool>) -> Self {
        let n = lab.len();
        let mut partition = OrderedPartition {
            lab,
            position,
            ptn,
            cell_of: vec![0; n],
            cell_end: vec![0; n],
            cells: 0,
        };
        partition.rebuild_cells();
        partition
    }

    fn rebuild_cells(&mut self) {
        let mut start = 0;
        self.cells = 0;
        for index in 0..self.lab.len() {
            self.cell_of[self.lab[index]] = start;
            if self.ptn[index] {
                self.cell_end[start] = index;
                self.cells += 1;
                start = index + 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.lab.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lab.is_empty()
    }

    pub fn lab(&self) -> &[VertexIndex] {
        &self.lab
    }

    pub fn ptn(&self) -> &[bool] {
        &self.ptn
    }

    pub fn number_of_cells(&self) -> usize {
        self.cells
    }

    pub fn is_discrete(&self) -> bool {
        self.cells == self.lab.len()
    }

    pub fn position_of(&self, vertex: VertexIndex) -> usize {
        self.position[vertex]
    }

    pub fn cell_of(&self, vertex: VertexIndex) -> usize {
        self.cell_of[vertex]
    }

    pub fn cell_end(&self, start: usize) -> usize {
        self.cell_end[start]
    }

    pub fn cell_members(&self, start: usize) -> &[VertexIndex] {
        &self.lab[start..=self.cell_end[start]]
    }

    pub fn is_singleton(&self, start: usize) -> bool {
        self.cell_end[start] == start
    }

    /// `(start, end)` of every cell in position order.
    pub fn cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let mut start = 0;
        std::iter::from_fn(move || {
            if start >= self.lab.len() {
                return None;
            }
            let cell = (start, self.cell_end[start]);
            start = cell.1 + 1;
            Some(cell)
        })
    }

    /// The cells as vertex lists, mostly for printing and tests.
    pub fn cell_lists(&self) -> Vec<Vec<VertexIndex>> {
        self.cells()
            .map(|(start, _)| self.cell_members(start).to_vec())
            .collect()
    }

    /// The target cell for individualization: the first non-singleton cell.
    pub fn first_non_singleton(&self) -> Option<(usize, usize)> {
        self.cells().find(|(start, end)| start != end)
    }

    /// Moves `vertex` to the front of its cell and makes it a
    /// singleton cell. Returns the position of that new cell.
    pub fn individualize(&mut self, vertex: VertexIndex) -> usize {
        let start = self.cell_of[vertex];
        let end = self.cell_end[start];
        debug_assert!(start < end, "only non-singleton cells can be split");

        self.swap_positions(start, self.position[vertex]);
        self.ptn[start] = true;
        self.cell_end[start] = start;
        self.cell_end[start + 1] = end;
        for index in start + 1..=end {
            self.cell_of[self.lab[index]] = start + 1;
        }
        self.cells += 1;

        start
    }

    fn swap_positions(&mut self, first: usize, second: usize) {
        self.lab.swap(first, second);
        self.position[self.lab[first]] = first;
        self.position[self.lab[second]] = second;
    }

    /// Moves `vertices`, all members of the cell at `start`, to the back
    /// of that cell in the given order. Only the moved vertices and the
    /// ones they swap with change position.
    pub(crate) fn move_to_back(&mut self, start: usize, vertices: &[VertexIndex]) {
        let first = self.cell_end[start] + 1 - vertices.len();
        for (offset, vertex) in vertices.iter().enumerate() {
            self.swap_positions(first + offset, self.position[*vertex]);
        }
    }

    /// Splits the cell at `start` after every position in `boundaries`,
    /// which are increasing and lie before the cell's end. The first piece
    /// keeps its start, only members of later pieces get a new cell.
    /// Returns the starts of all pieces.
    pub(crate) fn split_cell(&mut self, start: usize, boundaries: &[usize]) -> Vec<usize> {
        let end = self.cell_end[start];

        let mut starts = Vec::with_capacity(boundaries.len() + 1);
        let mut cell_start = start;
        for boundary in boundaries.iter().copied().chain(Some(end)) {
            debug_assert!(cell_start <= boundary && boundary <= end);
            self.ptn[boundary] = true;
            self.cell_end[cell_start] = boundary;
            if cell_start != start {
                for index in cell_start..=boundary {
                    self.cell_of[self.lab[index]] = cell_start;
                }
            }
            starts.push(cell_start);
            cell_start = boundary + 1;
        }
        self.cells += boundaries.len();

        starts
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_unit() {
        let partition = OrderedPartition::unit(4);
        assert_eq!(1, partition.number_of_cells());
        assert!(!partition.is_discrete());
        assert_eq!(vec![vec![0, 1, 2, 3]], partition.cell_lists());
        assert_eq!(Some((0, 3)), partition.first_non_singleton());

        let empty = OrderedPartition::unit(0);
        assert!(empty.is_discrete());
        assert_eq!(None, empty.first_non_singleton());

        let single = OrderedPartition::unit(1);
        assert!(single.is_discrete());
    }

    #[test]
    fn test_from_colours() {
        let partition = OrderedPartition::from_colours(&[5, 1, 5, 0, 1]);
        assert_eq!(vec![vec![3], vec![1, 4], vec![0, 2]], partition.cell_lists());
        assert_eq!(&[true, false, true, false, true], partition.ptn());
        assert_eq!(1, partition.cell_of(4));
        assert_eq!(2, partition.cell_end(1));
    }

    #[test]
    fn test_from_lab_ptn() {
        assert!(OrderedPartition::from_lab_ptn(vec![1, 0], vec![false, true]).is_ok());
        assert!(OrderedPartition::from_lab_ptn(vec![1, 1], vec![false, true]).is_err());
        assert!(OrderedPartition::from_lab_ptn(vec![1, 0], vec![true, false]).is_err());
        assert!(OrderedPartition::from_lab_ptn(vec![1, 0], vec![true]).is_err());
    }

    #[test]
    fn test_individualize() {
        let mut partition = OrderedPartition::unit(4);
        let cell = partition.individualize(2);
        assert_eq!(0, cell);
        assert_eq!(vec![vec![2], vec![1, 0, 3]], partition.cell_lists());
        assert_eq!(0, partition.position_of(2));
        assert_eq!(1, partition.cell_of(0));
        assert_eq!(Some((1, 3)), partition.first_non_singleton());

        let cell = partition.individualize(3);
        assert_eq!(1, cell);
        assert_eq!(vec![vec![2], vec![3], vec![0, 1]], partition.cell_lists());
        assert_eq!(3, partition.number_of_cells());
    }

    #[test]
    fn test_split_cell() {
        let mut partition = OrderedPartition::unit(5);
        partition.move_to_back(0, &[1, 3]);
        assert_eq!(&[0, 4, 2, 1, 3], partition.lab());

        let starts = partition.split_cell(0, &[0, 2]);
        assert_eq!(vec![0, 1, 3], starts);
        assert_eq!(
            vec![vec![0], vec![4, 2], vec![1, 3]],
            partition.cell_lists()
        );
        assert_eq!(3, partition.cell_of(1));
        assert_eq!(1, partition.cell_of(2));
        assert_eq!(0, partition.cell_of(0));
        assert_eq!(4, partition.cell_end(3));
        assert_eq!(2, partition.position_of(2));
    }

    #[test]
    fn test_move_to_back_keeps_untouched_in_front() {
        let mut partition = OrderedPartition::unit(6);
        partition.move_to_back(0, &[5, 0, 4]);
        assert_eq!(&[5, 0, 4], &partition.lab()[3..]);

        let mut front = partition.lab()[..3].to_vec();
        front.sort_unstable();
        assert_eq!(vec![1, 2, 3], front);
        for vertex in 0..6 {
            assert_eq!(vertex, partition.lab()[partition.position_of(vertex)]);
        }
    }
}
