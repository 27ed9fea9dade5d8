use itertools::Itertools;

use super::{bits_for, decode_size, encode_size, unbias, BitReader, BitWriter, Codec};
use crate::{
    graph::{SparseGraph, VertexIndex},
    Error,
};

const HEADER: &str = ">>sparse6<<";

/// nauty's `sparse6` format. After `:` and the size header, edges
/// `(u, v)` with `u <= v` follow as records of one bit `b` and one
/// number `x` of `k` bits, `k` being the bit length of `n - 1`. The
/// decoder keeps a current vertex `v`: `b = 1` increments it, a record
/// with `x > v` moves `v` to `x`, any other record is the edge `(x, v)`.
#[derive(Debug)]
pub struct Sparse6;

impl Codec for Sparse6 {
    fn encode(graph: &SparseGraph) -> Result<String, Error> {
        let n = graph.order();
        let width = bits_for(n);

        let mut out = String::from(":");
        encode_size(n, &mut out)?;
        let mut writer = BitWriter::new(out);

        let mut current = 0;
        for (start, end) in graph.edges() {
            if end == current {
                writer.push(false);
            } else {
                writer.push(true);
                if end > current + 1 {
                    writer.push_number(end, width);
                    writer.push(false);
                }
                current = end;
            }
            writer.push_number(start, width);
        }

        if writer.is_aligned() {
            return Ok(writer.finish(true));
        }

        // Padding with ones would read as the loop (n-1, n-1) here.
        let free = u32::from(writer.free_bits());
        if free > width && n >= 2 && current == n - 2 && n == 1 << width {
            writer.push(false);
        }
        Ok(writer.finish(true))
    }

    fn decode(input: &str) -> Result<SparseGraph, Error> {
        let input = input.trim_end();
        let input = input.strip_prefix(HEADER).unwrap_or(input);
        let body = input.strip_prefix(':').ok_or_else(|| {
            Error::MalformedEncoding("sparse6 graphs start with ':'".to_string())
        })?;

        let groups = unbias(body.as_bytes())?;
        let (n, records) = decode_size(&groups)?;
        let width = bits_for(n);
        let mut reader = BitReader::new(records);

        let mut current: VertexIndex = 0;
        let mut edges = Vec::new();
        loop {
            if current >= n && reader.untouched_groups() > 0 {
                return Err(Error::MalformedEncoding(format!(
                    "edge records continue past vertex {} of {}",
                    current, n
                )));
            }

            let increment = match reader.read() {
                Some(bit) => bit,
                None => break,
            };
            if increment {
                current += 1;
            }
            let x = match reader.read_number(width) {
                Some(x) => x,
                None => break,
            };

            if x > current {
                current = x;
            } else if current < n {
                edges.push((x, current));
            }
        }

        if let Some((start, end)) = edges.iter().sorted().tuple_windows().find_map(
            |(left, right)| if left == right { Some(*left) } else { None },
        ) {
            return Err(Error::MalformedEncoding(format!(
                "edge {}--{} appears more than once",
                start, end
            )));
        }

        SparseGraph::from_edges(n, &edges)
            .map_err(|error| Error::MalformedEncoding(error.to_string()))
    }
}
