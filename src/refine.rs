//! Equitable refinement of ordered partitions
//! (one-dimensional colour refinement).

use std::collections::VecDeque;

use crate::{
    graph::{SparseGraph, VertexIndex},
    partition::OrderedPartition,
};

/// Refines ordered partitions against a fixed graph. Keeps its scratch
/// buffers between calls, so one refiner serves a whole search.
///
/// A splitter costs time in its degree sum plus the touched vertices,
/// and the largest piece of every split cell stays out of the queue. This
/// keeps a full refinement within O((n + m) log n).
#[derive(Debug)]
pub struct PartitionRefiner<'g> {
    graph: &'g SparseGraph,
    /// Number of neighbours in the current splitter, per vertex.
    count: Vec<usize>,
    touched: Vec<VertexIndex>,
    queue: VecDeque<usize>,
    in_queue: Vec<bool>,
    /// Vertices moved to a new position by splits, over all calls.
    moved: usize,
}

impl<'g> PartitionRefiner<'g> {
    pub fn new(graph: &'g SparseGraph) -> Self {
        let n = graph.order();
        PartitionRefiner {
            graph,
            count: vec![0; n],
            touched: Vec::new(),
            queue: VecDeque::new(),
            in_queue: vec![false; n],
            moved: 0,
        }
    }

    pub fn moved(&self) -> usize {
        self.moved
    }

    /// Refine against every cell. Returns the number of splits.
    pub fn refine_all(&mut self, partition: &mut OrderedPartition) -> usize {
        let starts = partition.cells().map(|(start, _)| start).collect::<Vec<_>>();
        self.refine(partition, &starts)
    }

    /// Refine `partition` to the coarsest equitable partition finer than
    /// it, assuming it is already equitable with respect to every cell
    /// not listed in `splitters`. Returns the number of splits.
    ///
    /// A split cell keeps the members without neighbours in the splitter
    /// as its first piece, the others follow grouped by increasing count.
    /// The order inside a piece is arbitrary. Every decision only depends
    /// on cell positions and counts, so refining a relabelled input gives
    /// the relabelled result.
    pub fn refine(&mut self, partition: &mut OrderedPartition, splitters: &[usize]) -> usize {
        let mut splits = 0;

        for start in splitters.iter().copied() {
            self.enqueue(start);
        }

        while let Some(splitter_start) = self.queue.pop_front() {
            self.in_queue[splitter_start] = false;
            if partition.is_discrete() {
                continue;
            }

            let splitter = partition.cell_members(splitter_start).to_vec();
            self.count_neighbours(&splitter);

            let mut touched = std::mem::take(&mut self.touched);
            {
                let count = &self.count;
                let partition = &*partition;
                touched.sort_unstable_by_key(|vertex| {
                    (
                        partition.cell_of(*vertex),
                        count[*vertex],
                        partition.position_of(*vertex),
                    )
                });
            }

            let mut begin = 0;
            while begin < touched.len() {
                let cell_start = partition.cell_of(touched[begin]);
                let mut finish = begin + 1;
                while finish < touched.len() && partition.cell_of(touched[finish]) == cell_start {
                    finish += 1;
                }
                splits += self.split(partition, cell_start, &touched[begin..finish]);
                begin = finish;
            }

            for vertex in touched.drain(..) {
                self.count[vertex] = 0;
            }
            self.touched = touched;
        }

        splits
    }

    fn enqueue(&mut self, start: usize) {
        if !self.in_queue[start] {
            self.in_queue[start] = true;
            self.queue.push_back(start);
        }
    }

    fn count_neighbours(&mut self, splitter: &[VertexIndex]) {
        for vertex in splitter.iter() {
            for end in self.graph.neighbours_of(*vertex).iter().copied() {
                if self.count[end] == 0 {
                    self.touched.push(end);
                }
                self.count[end] += 1;
            }
        }
    }

    /// Splits the cell at `start` by the counts of its `touched` members,
    /// which come sorted by count.
    fn split(
        &mut self,
        partition: &mut OrderedPartition,
        start: usize,
        touched: &[VertexIndex],
    ) -> usize {
        let end = partition.cell_end(start);
        let size = end - start + 1;

        let count = &self.count;
        let lowest = count[touched[0]];
        let highest = count[touched[touched.len() - 1]];
        if touched.len() == size && lowest == highest {
            return 0;
        }

        partition.move_to_back(start, touched);
        self.moved += touched.len();

        let first_touched = end + 1 - touched.len();
        let mut boundaries = Vec::new();
        if first_touched > start {
            boundaries.push(first_touched - 1);
        }
        for offset in 1..touched.len() {
            if count[touched[offset - 1]] != count[touched[offset]] {
                boundaries.push(first_touched + offset - 1);
            }
        }

        let starts = partition.split_cell(start, &boundaries);

        if self.in_queue[start] {
            for new_start in starts.iter().skip(1).copied() {
                self.enqueue(new_start);
            }
        } else {
            // The partition is already stable with respect to the old cell,
            // so one of the pieces can be left out. Skip the first largest.
            let largest = starts
                .iter()
                .copied()
                .max_by(|a, b| {
                    let size_a = partition.cell_end(*a) - a;
                    let size_b = partition.cell_end(*b) - b;
                    size_a.cmp(&size_b).then(b.cmp(a))
                })
                .unwrap_or(start);
            for new_start in starts.iter().copied().filter(|s| *s != largest) {
                self.enqueue(new_start);
            }
        }

        starts.len() - 1
    }
}
