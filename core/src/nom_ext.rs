use nom::{
	branch::alt,
	character::complete::{
		char,
		multispace0,
		multispace1,
		not_line_ending
	},
	combinator::value,
	error::ParseError,
	IResult,
	multi::{
		count,
		many0
	},
	number::complete::float,
	Parser,
	sequence::{
		delimited,
		pair
	},
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

/// Parses a hash-prefixed ('#') line comment
pub fn hash_comment<'a, E>(input: &'a str) -> IResult<&'a str, (), E>
where
	E: ParseError<&'a str>
{
	value((), pair(char('#'), not_line_ending))(input)
}

/// Discards any run of comments and whitespace, line feeds included
pub fn etc<'a, E>(input: &'a str) -> IResult<&'a str, (), E>
where
	E: ParseError<&'a str>
{
	value((), many0(alt((
		hash_comment,
		value((), multispace1)
	))))(input)
}

/// Parses a [`Vec2`] of whitespace-delimited floats
pub fn vec2ws<'a, E>(input: &'a str) -> IResult<&'a str, Vec2, E>
where
	E: ParseError<&'a str>
{
	let (input, f2vec) = count(ws(float), 2)(input)?;

	Ok((input, Vec2::new(f2vec[0], f2vec[1])))
}

/// Parses a [`Vec3`] of whitespace-delimited floats
pub fn vec3ws<'a, E>(input: &'a str) -> IResult<&'a str, Vec3, E>
where
	E: ParseError<&'a str>
{
	let (input, f3vec) = count(ws(float), 3)(input)?;

	Ok((input, Vec3::new(f3vec[0], f3vec[1], f3vec[2])))
}

/// A combinator that takes a parser `inner` and produces a parser that also consumes both leading and
/// trailing whitespace, returning the output of `inner`.
///
/// From https://github.com/Geal/nom/blob/master/doc/nom_recipes.md with minor edits
pub fn ws<'a, F, O, E>(inner: F) -> impl FnMut(&'a str) -> IResult<&'a str, O, E>
where
	E: ParseError<&'a str>,
	F: Parser<&'a str, O, E>,
{
	delimited(multispace0, inner, multispace0)
}
