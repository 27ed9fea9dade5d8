//! Parser for edge lists as distributed on <https://snap.stanford.edu/data/>.
//! Lines starting with `#` are comments, one of them may announce
//! the size (`# Nodes: 6 Edges: 4`). Without it, the largest vertex
//! index determines the size.

use std::io::BufRead;

use crate::{
    graph::{check_declared_order, Graph, VertexIndex},
    parse_single_line, Error,
};

use super::{Input, ParseResult};

fn parse_size_comment(input: Input<'_>) -> ParseResult<'_, usize> {
    use nom::{
        bytes::complete::tag,
        character::complete::{char, space0, u64},
        combinator::map,
        sequence::{preceded, terminated, tuple},
    };

    let size_parser = preceded(tuple((space0, tag("Nodes:"), space0)), u64);
    let edges_parser = tuple((space0, tag("Edges:"), space0, u64, space0));
    let comment_parser = preceded(char('#'), terminated(size_parser, edges_parser));

    map(comment_parser, |size| size as usize)(input)
}

fn parse_meaningless_comment(input: Input<'_>) -> ParseResult<'_, ()> {
    use nom::{
        character::complete::{char, not_line_ending},
        combinator::value,
        sequence::tuple,
    };

    let comment_line_parser = tuple((char('#'), not_line_ending));
    value((), comment_line_parser)(input)
}

fn parse_edge(input: Input<'_>) -> ParseResult<'_, (VertexIndex, VertexIndex)> {
    use nom::{
        character::complete::{space0, space1, u64},
        combinator::map,
        sequence::{delimited, separated_pair},
    };

    map(
        delimited(space0, separated_pair(u64, space1, u64), space0),
        |(start, end)| (start as VertexIndex, end as VertexIndex),
    )(input)
}

pub fn parse_txt_input<B: BufRead>(input: B) -> Result<Graph, Error> {
    use nom::combinator::eof;

    let mut graph_size = None;
    let mut edges = Vec::new();

    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        if line.starts_with('#') {
            if let Ok((_, size)) = parse_size_comment(&line) {
                graph_size = Some(size);
            } else {
                parse_single_line!(_comment, parse_meaningless_comment(&line));
            }
            continue;
        }

        parse_single_line!(start_end, parse_edge(&line));
        edges.push(start_end);
    }

    let graph_size = graph_size.unwrap_or_else(|| {
        edges
            .iter()
            .map(|(start, end)| start.max(end).saturating_add(1))
            .max()
            .unwrap_or(0)
    });
    check_declared_order(graph_size)?;

    let mut graph = Graph::new_ordered(graph_size);
    for (start, end) in edges {
        graph.add_edge(start, end)?;
    }

    Ok(graph)
}
