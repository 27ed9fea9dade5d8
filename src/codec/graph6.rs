use super::{decode_size, encode_size, unbias, BitReader, BitWriter, Codec};
use crate::{graph::SparseGraph, Error};

const HEADER: &str = ">>graph6<<";

/// nauty's `graph6` format: the size header followed by the upper
/// triangle of the adjacency matrix, column by column, zero padded.
/// Self-loops have no place in it.
#[derive(Debug)]
pub struct Graph6;

/// Bytes holding the upper triangle, `None` if that overflows.
fn triangle_groups(n: usize) -> Option<usize> {
    let bits = n.checked_mul(n.saturating_sub(1))? / 2;
    Some(bits / 6 + usize::from(bits % 6 != 0))
}

impl Codec for Graph6 {
    fn encode(graph: &SparseGraph) -> Result<String, Error> {
        let n = graph.order();
        if let Some(vertex) = (0..n).find(|vertex| graph.has_loop(*vertex)) {
            return Err(Error::Unrepresentable {
                format: "graph6",
                reason: format!("vertex {} has a self-loop", vertex),
            });
        }

        let groups = triangle_groups(n).ok_or_else(|| Error::Unrepresentable {
            format: "graph6",
            reason: format!("the adjacency matrix of order {} is too large", n),
        })?;
        let mut out = String::with_capacity(8 + groups);
        encode_size(n, &mut out)?;
        let mut writer = BitWriter::new(out);

        let mut column = vec![false; n];
        for end in 1..n {
            for start in graph.neighbours_of(end).iter() {
                column[*start] = true;
            }
            for start in 0..end {
                writer.push(column[start]);
            }
            for start in graph.neighbours_of(end).iter() {
                column[*start] = false;
            }
        }

        Ok(writer.finish(false))
    }

    fn decode(input: &str) -> Result<SparseGraph, Error> {
        let input = input.trim_end();
        let input = input.strip_prefix(HEADER).unwrap_or(input);

        let groups = unbias(input.as_bytes())?;
        let (n, triangle) = decode_size(&groups)?;
        match triangle_groups(n) {
            Some(groups) if groups == triangle.len() => {}
            Some(groups) => {
                return Err(Error::MalformedEncoding(format!(
                    "a graph of order {} needs {} bytes after the size, found {}",
                    n,
                    groups,
                    triangle.len()
                )))
            }
            None => {
                return Err(Error::MalformedEncoding(format!(
                    "the adjacency matrix of order {} is too large",
                    n
                )))
            }
        }

        let mut reader = BitReader::new(triangle);
        let mut edges = Vec::new();
        for end in 1..n {
            for start in 0..end {
                if reader.read() == Some(true) {
                    edges.push((start, end));
                }
            }
        }

        SparseGraph::from_edges(n, &edges)
            .map_err(|error| Error::MalformedEncoding(error.to_string()))
    }
}
