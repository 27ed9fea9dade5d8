use std::{
    str::FromStr,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use crate::{graph::Colour, invariant::InvariantConfig, Error};

#[cfg(not(tarpaulin_include))]
pub fn do_if_some<F, T>(optional: &mut Option<T>, f: F)
where
    F: FnOnce(&mut T),
{
    if let Some(val) = optional {
        f(val);
    }
}

/// Shared flag to stop a running canonicalization from another thread.
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// `n=.. g` followed by edge lines, optionally a colouring.
    Dreadnaut,
    /// Edge list with `#` comment header.
    Edges,
    Sparse6,
    Graph6,
}

impl FromStr for InputFormat {
    type Err = Error;

    #[cfg(not(tarpaulin_include))]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "dreadnaut" | "dre" => Ok(Self::Dreadnaut),
            "edges" | "txt" => Ok(Self::Edges),
            "sparse6" | "s6" => Ok(Self::Sparse6),
            "graph6" | "g6" => Ok(Self::Graph6),
            _ => Err(Error::InvalidConfiguration {
                field: "format",
                reason: format!("unknown input format {}", s),
            }),
        }
    }
}

impl Default for InputFormat {
    #[cfg(not(tarpaulin_include))]
    fn default() -> Self {
        Self::Dreadnaut
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Sparse6,
    Graph6,
}

impl FromStr for OutputFormat {
    type Err = Error;

    #[cfg(not(tarpaulin_include))]
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sparse6" | "s6" => Ok(Self::Sparse6),
            "graph6" | "g6" => Ok(Self::Graph6),
            _ => Err(Error::InvalidConfiguration {
                field: "output",
                reason: format!("unknown output format {}", s),
            }),
        }
    }
}

impl Default for OutputFormat {
    #[cfg(not(tarpaulin_include))]
    fn default() -> Self {
        Self::Sparse6
    }
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Where the search evaluates node certificates and how many
    /// cells they cover. Only changes the shape of the search.
    pub invariants: InvariantConfig,
    /// Colour of every vertex. The initial partition has one cell per
    /// colour, ordered by colour value. `None` starts from the unit partition.
    pub colours: Option<Vec<Colour>>,
    /// Checked during the search, a set token aborts with `Cancelled`.
    pub cancellation: CancellationToken,
}

impl Settings {
    pub fn with_invariants(invariants: InvariantConfig) -> Self {
        Settings {
            invariants,
            ..Default::default()
        }
    }
}
