pub mod mtl;
pub mod obj;

#[cfg(feature = "import")]
use nom::{
	branch::alt,
	bytes::complete::take_while1,
	character::complete::multispace0,
	combinator::{
		map,
		opt,
		rest,
		value,
		verify
	},
	error::ParseError,
	IResult,
	number::complete::float,
	sequence::{
		pair,
		preceded
	}
};

#[cfg(feature = "import")]
use ultraviolet::vec::Vec3;

#[cfg(feature = "import")]
use vbmkit_core::nom_ext::{
	hash_comment,
	vec3ws,
	ws
};

/// Parses an identifier (keyword, object/group/material name, filename)
#[cfg(feature = "import")]
pub(crate) fn identifier<'a, E>(input: &'a str) -> IResult<&'a str, &'a str, E>
where
	E: ParseError<&'a str>
{
	take_while1(|c: char| !c.is_whitespace())(input)
}

/// Splits a line into its keyword and the remaining arguments.
/// Blank and comment lines yield `None`.
#[cfg(feature = "import")]
pub(crate) fn statement<'a, E>(input: &'a str) -> IResult<&'a str, Option<(&'a str, &'a str)>, E>
where
	E: ParseError<&'a str>
{
	alt((
		map(
			pair(ws(verify(identifier, |s: &str| !s.starts_with('#'))), rest),
			Some
		),
		value(None, preceded(multispace0, opt(hash_comment)))
	))(input)
}

/// Parses a color given either as three components or as one value for all of them
#[cfg(feature = "import")]
pub(crate) fn color<'a, E>(input: &'a str) -> IResult<&'a str, Vec3, E>
where
	E: ParseError<&'a str>
{
	alt((
		vec3ws,
		map(ws(float), |r| Vec3::new(r, r, r))
	))(input)
}

#[cfg(all(test, feature = "import"))]
mod tests {
	use nom::error::Error;
	use ultraviolet::vec::Vec3;

	#[test]
	fn test_statement() {
		assert_eq!(super::statement::<Error<&str>>("  v 1 2 3"), Ok(("", Some(("v", "1 2 3")))));
		assert_eq!(super::statement::<Error<&str>>("usemtl"), Ok(("", Some(("usemtl", "")))));
		assert_eq!(super::statement::<Error<&str>>("# comment"), Ok(("", None)));
		assert_eq!(super::statement::<Error<&str>>("   "), Ok(("", None)));
	}

	#[test]
	fn test_color() {
		assert_eq!(super::color::<Error<&str>>("0.5"), Ok(("", Vec3::new(0.5, 0.5, 0.5))));
		assert_eq!(super::color::<Error<&str>>("0.1 0.2 0.3"), Ok(("", Vec3::new(0.1, 0.2, 0.3))));
	}
}
