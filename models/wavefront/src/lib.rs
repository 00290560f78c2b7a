pub mod mtl;
pub mod obj;

#[cfg(feature = "import")]
use nom::{
	bytes::complete::take_while1,
	character::complete::not_line_ending,
	combinator::map,
	error::ParseError,
	IResult
};

/// Parses a single whitespace-delimited token
#[cfg(feature = "import")]
pub(crate) fn identifier<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
	E: ParseError<&'a str>
{
	take_while1(move |c: char| !c.is_ascii_whitespace())(input)
}

/// Parses the rest of the line, trimmed. Group names and filenames may
/// contain spaces, so single-token parsing is not enough here.
#[cfg(feature = "import")]
pub(crate) fn line_rest<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
	E: ParseError<&'a str>
{
	map(not_line_ending, str::trim)(input)
}
