//! Node certificates that bound the encodings of all leaves below
//! a search-tree node from below.
//!
//! For a node with equitable partition `P`, every leaf below it keeps
//! the cell ranges of `P` and only orders vertices inside the cells.
//! The neighbours of a vertex in a non-singleton cell `D` land on some
//! `c` columns of `D`'s range, and the smallest possible row puts them
//! on the last `c` columns. Rows of singleton cells are therefore
//! bounded per column range, and rows of a non-singleton cell `X` are
//! bounded by the same row `|X|` times since the partition is equitable.

use std::convert::TryFrom;

use crate::{
    canonical::Row,
    graph::{SparseGraph, VertexIndex},
    partition::OrderedPartition,
    Error,
};

/// Where and how hard the certificate is computed.
///
/// Levels count search-tree depth with the root at level 1. The
/// certificate is evaluated at every node whose level lies in
/// `min_level..=max_level`. `max_level == 0` disables it.
///
/// `arg` is the strength: how many non-singleton cells get bounded rows
/// after the singleton cells. With 0 only the rows of singleton cells
/// in front of the first non-singleton cell are produced.
///
/// The default evaluates the certificate at every level with strength 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvariantConfig {
    pub min_level: usize,
    pub max_level: usize,
    pub arg: usize,
}

impl Default for InvariantConfig {
    fn default() -> Self {
        InvariantConfig {
            min_level: 1,
            max_level: usize::MAX,
            arg: 1,
        }
    }
}

impl InvariantConfig {
    /// No certificates at all.
    pub fn disabled() -> Self {
        InvariantConfig {
            min_level: 0,
            max_level: 0,
            arg: 0,
        }
    }

    pub fn new(min_level: usize, max_level: usize, arg: usize) -> Result<Self, Error> {
        let config = InvariantConfig {
            min_level,
            max_level,
            arg,
        };
        config.validate()?;
        Ok(config)
    }

    /// Signed parameters as foreign hosts pass them.
    pub fn from_raw(min_level: i32, max_level: i32, arg: i32) -> Result<Self, Error> {
        fn convert(field: &'static str, value: i32) -> Result<usize, Error> {
            usize::try_from(value).map_err(|_| Error::InvalidConfiguration {
                field,
                reason: format!("must not be negative, got {}", value),
            })
        }

        Self::new(
            convert("min_level", min_level)?,
            convert("max_level", max_level)?,
            convert("arg", arg)?,
        )
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.min_level > self.max_level {
            return Err(Error::InvalidConfiguration {
                field: "min_level",
                reason: format!(
                    "minimum level {} exceeds maximum level {}",
                    self.min_level, self.max_level
                ),
            });
        }
        Ok(())
    }

    pub fn is_active_at(&self, level: usize) -> bool {
        self.max_level != 0 && self.min_level <= level && level <= self.max_level
    }
}

#[derive(Debug)]
pub struct InvariantEvaluator {
    config: InvariantConfig,
    /// Neighbour count per non-singleton cell, indexed by cell start.
    counts: Vec<usize>,
    touched: Vec<usize>,
}

impl InvariantEvaluator {
    pub fn new(config: InvariantConfig, order: usize) -> Self {
        InvariantEvaluator {
            config,
            counts: vec![0; order],
            touched: Vec::new(),
        }
    }

    /// The certificate of a node at `level`, if one is computed there.
    pub fn evaluate(
        &mut self,
        graph: &SparseGraph,
        partition: &OrderedPartition,
        level: usize,
    ) -> Option<Vec<Row>> {
        if self.config.is_active_at(level) {
            Some(self.certificate(graph, partition))
        } else {
            None
        }
    }

    /// Lower bounds for the leading rows of every leaf below the node
    /// with the equitable partition `partition`.
    pub fn certificate(&mut self, graph: &SparseGraph, partition: &OrderedPartition) -> Vec<Row> {
        let mut rows = Vec::new();
        let mut budget = self.config.arg;

        for (start, end) in partition.cells() {
            if start != end {
                if budget == 0 {
                    break;
                }
                budget -= 1;
            }

            let row = self.bounded_row(graph, partition, partition.lab()[start]);
            for _ in start..end {
                rows.push(row.clone());
            }
            rows.push(row);
        }

        rows
    }

    fn bounded_row(
        &mut self,
        graph: &SparseGraph,
        partition: &OrderedPartition,
        vertex: VertexIndex,
    ) -> Row {
        let mut row = Row::with_capacity(graph.degree_of(vertex));

        for end in graph.neighbours_of(vertex).iter().copied() {
            let cell = partition.cell_of(end);
            if partition.is_singleton(cell) {
                row.push(cell);
            } else {
                if self.counts[cell] == 0 {
                    self.touched.push(cell);
                }
                self.counts[cell] += 1;
            }
        }

        for cell in self.touched.drain(..) {
            let last = partition.cell_end(cell);
            row.extend(last + 1 - self.counts[cell]..=last);
            self.counts[cell] = 0;
        }

        row.sort_unstable();
        row
    }
}
