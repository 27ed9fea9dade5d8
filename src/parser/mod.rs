//! nom parsers for the plain text graph formats.

mod dre_parser;
mod txt_parser;

pub use dre_parser::parse_dreadnaut_input;
pub use txt_parser::parse_txt_input;

pub type Input<'a> = &'a str;
pub type ParseError<'a> = nom::error::VerboseError<Input<'a>>;
pub type ParseResult<'a, O> = nom::IResult<Input<'a>, O, ParseError<'a>>;
