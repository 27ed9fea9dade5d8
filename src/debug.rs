//! Debug facilities.
use nom::error::{VerboseError, VerboseErrorKind};
use std::{
    fmt::{self, Debug},
    io::{self, Write},
    time::Duration,
};

use crate::{
    graph::{GraphError, VertexIndex},
    parser::ParseError,
    permutation::Permutation,
};

// Error types and From<...> implementations

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Malformed graph, {field}: {reason}")]
    MalformedGraph { field: &'static str, reason: String },
    #[error("Malformed encoding: {0}")]
    MalformedEncoding(String),
    #[error("Canonicalization was cancelled")]
    Cancelled,
    #[error("Invalid configuration, {field}: {reason}")]
    InvalidConfiguration { field: &'static str, reason: String },
    #[error("Error while parsing input file with graph description")]
    ParseError(Vec<VerboseErrorKind>),
    #[error("Error while reading or writing a file")]
    IoError(io::Error),
    #[error("Graph can't be written as {format}: {reason}")]
    Unrepresentable { format: &'static str, reason: String },
}

impl From<GraphError> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ge: GraphError) -> Self {
        Self::MalformedGraph {
            field: ge.field,
            reason: ge.reason,
        }
    }
}

#[cfg(not(tarpaulin_include))]
fn handle_nom_verbose_error<E: Debug>(
    should_print: bool,
    verbose: VerboseError<E>,
) -> Vec<VerboseErrorKind> {
    verbose
        .errors
        .into_iter()
        .map(|(msg, kind)| {
            if should_print {
                log::error!("{:?}", msg);
            }
            kind
        })
        .collect()
}

impl<'a> From<nom::Err<ParseError<'a>>> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(pe: nom::Err<ParseError<'a>>) -> Self {
        match pe {
            nom::Err::Error(verbose) | nom::Err::Failure(verbose) => {
                Self::ParseError(handle_nom_verbose_error(true, verbose))
            }
            nom::Err::Incomplete(_) => Self::ParseError(Vec::new()),
        }
    }
}

impl From<io::Error> for Error {
    #[cfg(not(tarpaulin_include))]
    fn from(ie: io::Error) -> Self {
        Self::IoError(ie)
    }
}

// Output in the style of dreadnaut

#[cfg(not(tarpaulin_include))]
pub fn print_orbits_nauty_style(orbits: &[VertexIndex], runtime: Option<Duration>) {
    let runtime = runtime.unwrap_or(Duration::ZERO);
    println!("cpu time = {:.6} seconds", runtime.as_secs_f64());

    let mut members = vec![Vec::new(); orbits.len()];
    for (vertex, orbit) in orbits.iter().enumerate() {
        members[*orbit].push(vertex);
    }

    members
        .iter()
        .enumerate()
        .filter(|(_, members)| !members.is_empty())
        .for_each(|(orbit, members)| {
            if members.len() > 1 {
                members.iter().for_each(|member| print!("{} ", member));
                print!("({}); ", members.len());
            } else {
                print!("{}; ", orbit);
            }
        });

    // Force new line and flush everything out.
    println!();
    if let Err(error) = io::stdout().flush() {
        log::warn!("Could not flush stdout: {}", error);
    }
}

#[cfg(not(tarpaulin_include))]
pub fn print_generator(generator: &Permutation) {
    if generator.is_identity() {
        println!("Identity permutation.");
        return;
    }

    println!("{}", generator.cycle_notation());
}

// Custom formatter for debug printing

#[cfg(not(tarpaulin_include))]
pub fn opt_fmt<T: fmt::Debug>(option: &Option<T>, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match option {
        Some(val) => val.fmt(f),
        None => write!(f, "None"),
    }
}

#[cfg(not(tarpaulin_include))]
pub fn group_size_fmt(size: &f64, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if *size < 1e15 {
        write!(f, "{:.0}", size)
    } else {
        write!(f, "{:.6e}", size)
    }
}

// Debug macros that allow to time single expressions

#[macro_export]
macro_rules! time {
    ($i:ident, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        let $i = before.elapsed();
    };
}

#[macro_export]
macro_rules! log_time {
    ($name:expr, $ret:ident, $exp:expr) => {
        let before = std::time::Instant::now();
        let $ret = $exp;
        log::info!("{} took {:?}", $name, before.elapsed());
    };
}

#[macro_export]
macro_rules! parse_single_line {
    ($ret:ident, $exp:expr) => {
        let (res, $ret) = $exp?;
        eof::<crate::parser::Input<'_>, crate::parser::ParseError<'_>>(res)?;
    };
}

#[macro_export]
macro_rules! get_line {
    ($ret:ident, $lines:ident) => {
        let $ret = $lines.next().unwrap_or_else(|| {
            Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "Unexpected EOF!",
            ))
        })?;
    };
}

#[macro_export]
macro_rules! get_line_parse {
    ($lines:ident, $ret:ident, $exp:expr) => {
        crate::get_line!(line, $lines);
        let (res, $ret) = $exp(&line)?;
        eof::<crate::parser::Input<'_>, crate::parser::ParseError<'_>>(res)?;
    };
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_graph_error_conversion() {
        let error = Error::from(GraphError::new("degree", "too short"));
        match error {
            Error::MalformedGraph { field, reason } => {
                assert_eq!("degree", field);
                assert_eq!("too short", reason);
            }
            other => panic!("Unexpected error {:?}", other),
        }
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            "Malformed graph, neighbours: vertex 7 is out of range",
            Error::MalformedGraph {
                field: "neighbours",
                reason: "vertex 7 is out of range".to_string()
            }
            .to_string()
        );
        assert_eq!(
            "Canonicalization was cancelled",
            Error::Cancelled.to_string()
        );
    }

    #[test]
    fn test_group_size_fmt() {
        struct Size(f64);
        impl fmt::Display for Size {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                group_size_fmt(&self.0, f)
            }
        }

        assert_eq!("120", Size(120.0).to_string());
        assert_eq!("1.307674e15", Size(1_307_674_368_000.0 * 1000.0).to_string());
    }
}
