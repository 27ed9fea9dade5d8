//! ASCII graph formats of nauty's gtools: `sparse6` and `graph6`.
//! Both share the size header `N(n)` and pack bits into printable
//! characters, six bits per character biased by 63.

use std::convert::TryFrom;

use crate::{
    graph::{check_declared_order, SparseGraph},
    misc::OutputFormat,
    Error,
};

mod graph6;
mod sparse6;

pub use graph6::Graph6;
pub use sparse6::Sparse6;

const BIAS: u8 = 63;
const LONG_SIZE: u8 = 126;
const SMALL_ORDER: usize = 62;
const MEDIUM_ORDER: usize = 258_047;
const LARGE_ORDER: usize = (1 << 36) - 1;

pub trait Codec {
    fn encode(graph: &SparseGraph) -> Result<String, Error>;
    fn decode(input: &str) -> Result<SparseGraph, Error>;
}

/// Encodes in the requested output format.
pub fn encode(graph: &SparseGraph, format: OutputFormat) -> Result<String, Error> {
    match format {
        OutputFormat::Sparse6 => Sparse6::encode(graph),
        OutputFormat::Graph6 => Graph6::encode(graph),
    }
}

/// Writes `N(n)`.
fn encode_size(n: usize, out: &mut String) -> Result<(), Error> {
    let push_bits = |out: &mut String, value: usize, groups: u32| {
        for group in (0..groups).rev() {
            out.push(char::from(BIAS + ((value >> (6 * group)) & 0x3f) as u8));
        }
    };

    if n <= SMALL_ORDER {
        push_bits(out, n, 1);
    } else if n <= MEDIUM_ORDER {
        out.push(char::from(LONG_SIZE));
        push_bits(out, n, 3);
    } else if n <= LARGE_ORDER {
        out.push(char::from(LONG_SIZE));
        out.push(char::from(LONG_SIZE));
        push_bits(out, n, 6);
    } else {
        return Err(Error::Unrepresentable {
            format: "graph6/sparse6",
            reason: format!("order {} exceeds {}", n, LARGE_ORDER),
        });
    }

    Ok(())
}

/// Checks that every byte is a printable six-bit group and removes the
/// bias.
fn unbias(input: &[u8]) -> Result<Vec<u8>, Error> {
    input
        .iter()
        .enumerate()
        .map(|(position, byte)| {
            if (BIAS..=LONG_SIZE).contains(byte) {
                Ok(byte - BIAS)
            } else {
                Err(Error::MalformedEncoding(format!(
                    "byte {} at position {} is not in 63..=126",
                    byte, position
                )))
            }
        })
        .collect()
}

/// Reads `N(n)` from unbiased groups. Returns `n` and the rest.
/// Orders above [`MAX_DECLARED_ORDER`](crate::graph::MAX_DECLARED_ORDER)
/// are rejected.
fn decode_size(groups: &[u8]) -> Result<(usize, &[u8]), Error> {
    let long = LONG_SIZE - BIAS;
    let read = |groups: &[u8], count: usize| -> Result<u64, Error> {
        if groups.len() < count {
            return Err(Error::MalformedEncoding(format!(
                "size header needs {} more bytes, found {}",
                count,
                groups.len()
            )));
        }
        Ok(groups[..count]
            .iter()
            .fold(0u64, |n, group| (n << 6) | u64::from(*group)))
    };

    let (n, rest) = match groups {
        [] => return Err(Error::MalformedEncoding("missing size header".to_string())),
        [first, second, rest @ ..] if *first == long && *second == long => {
            (read(rest, 6)?, &rest[6..])
        }
        [first, rest @ ..] if *first == long => (read(rest, 3)?, &rest[3..]),
        [first, rest @ ..] => (u64::from(*first), rest),
    };

    let n = usize::try_from(n)
        .map_err(|_| Error::MalformedEncoding(format!("order {} does not fit in memory", n)))?;
    check_declared_order(n).map_err(|error| Error::MalformedEncoding(error.to_string()))?;
    Ok((n, rest))
}

/// Packs bits into six-bit groups, most significant bit first.
#[derive(Debug)]
struct BitWriter {
    out: String,
    current: u8,
    /// Free bits left in `current`.
    free: u8,
}

impl BitWriter {
    fn new(out: String) -> Self {
        BitWriter {
            out,
            current: 0,
            free: 6,
        }
    }

    fn push(&mut self, bit: bool) {
        self.current = (self.current << 1) | u8::from(bit);
        self.free -= 1;
        if self.free == 0 {
            self.out.push(char::from(self.current + BIAS));
            self.current = 0;
            self.free = 6;
        }
    }

    /// The lowest `width` bits of `value`.
    fn push_number(&mut self, value: usize, width: u32) {
        for bit in (0..width).rev() {
            self.push((value >> bit) & 1 == 1);
        }
    }

    fn is_aligned(&self) -> bool {
        self.free == 6
    }

    fn free_bits(&self) -> u8 {
        self.free
    }

    /// Fills the last group with `bit` and returns the text.
    fn finish(mut self, bit: bool) -> String {
        while !self.is_aligned() {
            self.push(bit);
        }
        self.out
    }
}

/// Reads bits from unbiased six-bit groups, most significant bit first.
#[derive(Debug)]
struct BitReader<'a> {
    groups: &'a [u8],
    /// Index of the next bit.
    position: usize,
}

impl<'a> BitReader<'a> {
    fn new(groups: &'a [u8]) -> Self {
        BitReader {
            groups,
            position: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.groups.len() * 6 - self.position
    }

    /// Groups no bit has been read from yet.
    fn untouched_groups(&self) -> usize {
        self.groups.len() - (self.position + 5) / 6
    }

    /// Whether the next bit starts a fresh group.
    fn is_aligned(&self) -> bool {
        self.position % 6 == 0
    }

    fn read(&mut self) -> Option<bool> {
        let group = self.groups.get(self.position / 6)?;
        let bit = (group >> (5 - self.position % 6)) & 1 == 1;
        self.position += 1;
        Some(bit)
    }

    fn read_number(&mut self, width: u32) -> Option<usize> {
        if self.remaining() < width as usize {
            return None;
        }
        let mut value = 0;
        for _ in 0..width {
            value = (value << 1) | usize::from(self.read()?);
        }
        Some(value)
    }
}

/// Number of bits needed to write `n - 1`.
fn bits_for(n: usize) -> u32 {
    if n <= 1 {
        0
    } else {
        usize::BITS - (n - 1).leading_zeros()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::graph::MAX_DECLARED_ORDER;

    #[test]
    fn test_encode_size() -> Result<(), Error> {
        let mut out = String::new();
        encode_size(0, &mut out)?;
        encode_size(62, &mut out)?;
        assert_eq!("?}", out);

        let mut out = String::new();
        encode_size(63, &mut out)?;
        assert_eq!("~??~", out);

        let mut out = String::new();
        encode_size(258_048, &mut out)?;
        assert_eq!("~~???~??", out);
        Ok(())
    }

    #[test]
    fn test_decode_size() -> Result<(), Error> {
        for n in [0, 1, 62, 63, 4095, 258_047, 258_048, MAX_DECLARED_ORDER].iter().copied() {
            let mut out = String::new();
            encode_size(n, &mut out)?;
            out.push('?');
            let groups = unbias(out.as_bytes())?;
            let (decoded, rest) = decode_size(&groups)?;
            assert_eq!(n, decoded);
            assert_eq!(&[0], rest);
        }

        assert!(matches!(
            decode_size(&unbias(b"~??")?),
            Err(Error::MalformedEncoding(_))
        ));
        assert!(matches!(unbias(b"A!"), Err(Error::MalformedEncoding(_))));

        let mut out = String::new();
        encode_size(MAX_DECLARED_ORDER + 1, &mut out)?;
        assert!(matches!(
            decode_size(&unbias(out.as_bytes())?),
            Err(Error::MalformedEncoding(_))
        ));
        Ok(())
    }

    #[test]
    fn test_bits() {
        let mut writer = BitWriter::new(String::new());
        writer.push_number(0b101, 3);
        writer.push(true);
        assert_eq!(2, writer.free_bits());
        let out = writer.finish(false);
        // 101100
        assert_eq!("k", out);

        let groups = unbias(out.as_bytes()).unwrap_or_default();
        let mut reader = BitReader::new(&groups);
        assert_eq!(Some(5), reader.read_number(3));
        assert!(!reader.is_aligned());
        assert_eq!(Some(true), reader.read());
        assert_eq!(None, reader.read_number(3));
        assert_eq!(Some(0), reader.read_number(2));
        assert_eq!(None, reader.read());
    }

    #[test]
    fn test_bits_for() {
        assert_eq!(0, bits_for(0));
        assert_eq!(0, bits_for(1));
        assert_eq!(1, bits_for(2));
        assert_eq!(2, bits_for(4));
        assert_eq!(3, bits_for(5));
        assert_eq!(6, bits_for(64));
    }
}
