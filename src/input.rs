//! Command line arguments and reading the input graphs.

use clap::Parser;
use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::PathBuf,
};

use sgcanon::{
    codec::{Codec, Graph6, Sparse6},
    graph::{Colour, SparseGraph},
    parser::{parse_dreadnaut_input, parse_txt_input},
    statistics::Statistics,
    Error, InputFormat, InvariantConfig, OutputFormat, Settings,
};

/// Canonical labelling of sparse graphs.
#[derive(Parser, Debug)]
#[command(name = "sgcanon", version, about = "Canonical forms and automorphism groups of sparse graphs")]
pub struct Args {
    /// Graph file, stdin is read if left out
    pub input: Option<PathBuf>,

    /// Input format: dreadnaut, edges, sparse6 or graph6
    #[arg(short, long, default_value = "dreadnaut")]
    pub format: InputFormat,

    /// Encoding of the printed canonical forms: sparse6 or graph6
    #[arg(short, long, default_value = "sparse6")]
    pub output: OutputFormat,

    /// First search-tree level with node certificates, the root is level 1
    #[arg(long, default_value_t = 1)]
    pub min_level: usize,

    /// Last search-tree level with node certificates, 0 turns them off
    #[arg(long, default_value_t = usize::MAX)]
    pub max_level: usize,

    /// Number of non-singleton cells a node certificate covers
    #[arg(long, default_value_t = 1)]
    pub invar_arg: usize,

    /// Append the SHA-256 id of the canonical form to every printed encoding
    #[arg(long)]
    pub unique_id: bool,

    /// Skip graphs isomorphic to one printed before
    #[arg(long)]
    pub dedup: bool,

    /// Print the orbits in dreadnaut style
    #[arg(long)]
    pub orbits: bool,

    /// Print the automorphism group generators
    #[arg(long)]
    pub generators: bool,

    /// Enumerate the automorphism group from its generators
    #[arg(long)]
    pub search_group: bool,

    /// Stop the group enumeration after this many elements
    #[arg(long, default_value_t = 1_000_000)]
    pub group_limit: usize,

    /// Write statistics about the run into this file
    #[arg(short, long)]
    pub statistics: Option<PathBuf>,
}

/// One graph to canonicalize together with its optional colouring.
#[derive(Debug)]
pub struct InputGraph {
    pub graph: SparseGraph,
    pub colours: Option<Vec<Colour>>,
}

impl Args {
    pub fn settings(&self) -> Result<Settings, Error> {
        let invariants = InvariantConfig::new(self.min_level, self.max_level, self.invar_arg)
            .or_else(|error| {
                // A disabled certificate makes the level range irrelevant.
                if self.max_level == 0 {
                    Ok(InvariantConfig::disabled())
                } else {
                    Err(error)
                }
            })?;
        Ok(Settings::with_invariants(invariants))
    }

    pub fn statistics(&self) -> Option<Statistics> {
        self.statistics.clone().map(Statistics::new)
    }

    fn open(&self) -> Result<Box<dyn BufRead>, Error> {
        match &self.input {
            Some(path) => Ok(Box::new(BufReader::new(File::open(path)?))),
            None => Ok(Box::new(BufReader::new(io::stdin()))),
        }
    }
}

#[cfg(not(tarpaulin_include))]
pub fn read_graphs(args: &Args) -> Result<Vec<InputGraph>, Error> {
    let reader = args.open()?;
    read_graphs_from(reader, args.format)
}

pub fn read_graphs_from<B: BufRead>(
    reader: B,
    format: InputFormat,
) -> Result<Vec<InputGraph>, Error> {
    match format {
        InputFormat::Dreadnaut => {
            let (mut graph, colours) = parse_dreadnaut_input(reader)?;
            Ok(vec![InputGraph {
                graph: graph.to_sparse()?,
                colours,
            }])
        }
        InputFormat::Edges => {
            let mut graph = parse_txt_input(reader)?;
            Ok(vec![InputGraph {
                graph: graph.to_sparse()?,
                colours: None,
            }])
        }
        InputFormat::Sparse6 => decode_lines::<Sparse6, _>(reader),
        InputFormat::Graph6 => decode_lines::<Graph6, _>(reader),
    }
}

/// One encoded graph per non-empty line.
fn decode_lines<C: Codec, B: BufRead>(reader: B) -> Result<Vec<InputGraph>, Error> {
    let mut graphs = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        graphs.push(InputGraph {
            graph: C::decode(line)?,
            colours: None,
        });
    }
    Ok(graphs)
}
