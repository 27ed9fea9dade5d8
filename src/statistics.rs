//! Statistics about the search and the whole program run.

use custom_debug_derive::Debug;
use std::{
    fs::File,
    io::Write,
    path::PathBuf,
    time::{Duration, Instant},
};

use crate::debug::{group_size_fmt, opt_fmt};
use crate::Error;

/// Counters of one canonicalization.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStatistics {
    /// Search-tree nodes created, the root included.
    pub nodes: usize,
    pub leaves: usize,
    /// Cell splits done by refinement.
    pub splits: usize,
    /// Vertices repositioned by those splits.
    pub moved: usize,
    pub orbit_pruned: usize,
    pub invariant_pruned: usize,
    /// Subtrees left early after an automorphism was found.
    pub abandoned: usize,
    pub generators: usize,
    pub max_depth: usize,
    pub search_time: Duration,
}

#[derive(Debug)]
pub struct GraphStatistics {
    pub order: usize,
    pub edges: usize,
    #[debug(with = "group_size_fmt")]
    pub group_size: f64,
    pub number_of_orbits: usize,
    #[debug(with = "opt_fmt")]
    pub group_elements: Option<usize>,
    pub search: SearchStatistics,
}

#[derive(Debug)]
pub struct Statistics {
    // Meta information
    #[debug(skip)]
    out_file: PathBuf,
    // Timings
    #[debug(skip)]
    start_time: Instant,
    #[debug(with = "opt_fmt")]
    read_time: Option<Duration>,
    #[debug(with = "opt_fmt")]
    end_time: Option<Duration>,
    // Search statistics
    number_of_graphs: usize,
    max_order: usize,
    max_nodes: usize,
    #[debug(with = "opt_fmt")]
    max_search_time: Option<Duration>,
    graph_statistics: Vec<GraphStatistics>,
}

impl Statistics {
    #[cfg(not(tarpaulin_include))]
    pub fn new(out_file: PathBuf) -> Self {
        Statistics {
            out_file,
            start_time: Instant::now(),
            read_time: None,
            end_time: None,
            number_of_graphs: 0,
            max_order: 0,
            max_nodes: 0,
            max_search_time: None,
            graph_statistics: Vec::new(),
        }
    }

    #[cfg(not(tarpaulin_include))]
    pub fn log_read_done(&mut self) {
        self.read_time = Some(self.start_time.elapsed());
    }

    #[cfg(not(tarpaulin_include))]
    pub fn log_end(&mut self) {
        self.end_time = Some(self.start_time.elapsed());
    }

    pub fn log_graph_statistic(&mut self, graph_statistic: GraphStatistics) {
        self.number_of_graphs += 1;
        self.max_order = self.max_order.max(graph_statistic.order);
        self.max_nodes = self.max_nodes.max(graph_statistic.search.nodes);
        self.max_search_time = Some(
            self.max_search_time
                .map_or(graph_statistic.search.search_time, |time| {
                    time.max(graph_statistic.search.search_time)
                }),
        );
        self.graph_statistics.push(graph_statistic);
    }

    #[cfg(not(tarpaulin_include))]
    pub fn save_statistics(&self) -> Result<(), Error> {
        let mut statistics_file = File::create(&self.out_file)?;
        write!(statistics_file, "Raw Statistics: {:#?}", self).map_err(Error::from)
    }
}
