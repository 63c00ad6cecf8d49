//! Wavefront material libraries (`.mtl`)

/// Replaces DOS path separators so texture paths resolve on every platform
pub fn normalize_path(path: &str) -> String {
	path.replace('\\', "/")
}

#[cfg(feature = "import")]
pub mod import {
	use log::debug;

	use nom::{
		branch::alt,
		bytes::complete::tag,
		combinator::{
			map,
			opt
		},
		error::Error as NomError,
		Finish,
		IResult,
		number::complete::float,
		sequence::preceded
	};

	use std::{
		fs,
		io,
		path::Path
	};

	use thiserror::Error;
	use ultraviolet::vec::Vec3;

	use vbmkit_core::{
		nom_ext::ws,
		scene::Material
	};

	use crate::{
		color,
		identifier,
		statement
	};

	use super::normalize_path;

	#[derive(Error, Debug)]
	pub enum MtlImportError {
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Syntax error on line {line}: {text}")]
		Syntax {
			line: usize,
			text: String,
		},
	}

	fn scalar(input: &str) -> IResult<&str, f32, NomError<&str>> {
		ws(float)(input)
	}

	/// Value of a color statement
	#[derive(Debug, PartialEq)]
	enum ColorValue {
		Rgb(Vec3),
		/// CIE XYZ components
		Xyz(Vec3),
		/// Spectral curve file
		Spectral(String),
	}

	fn color_value(input: &str) -> IResult<&str, ColorValue, NomError<&str>> {
		alt((
			map(preceded(ws(tag("spectral")), identifier), |s: &str| ColorValue::Spectral(s.to_string())),
			map(preceded(ws(tag("xyz")), color), ColorValue::Xyz),
			map(color, ColorValue::Rgb)
		))(input)
	}

	/// Parses a `d` value, which may carry the `-halo` option
	fn dissolve(input: &str) -> IResult<&str, f32, NomError<&str>> {
		preceded(opt(ws(tag("-halo"))), ws(float))(input)
	}

	fn name(input: &str) -> IResult<&str, &str, NomError<&str>> {
		ws(identifier)(input)
	}

	/// Parses a material library. Statements before the first `newmtl` are ignored, as are
	/// unsupported keywords.
	pub fn parse(text: &str) -> Result<Vec<Material>, MtlImportError> {
		let mut materials: Vec<Material> = vec![];
		let mut current: Option<usize> = None;

		for (i, line) in text.lines().enumerate() {
			let syntax = || MtlImportError::Syntax {
				line: i + 1,
				text: line.to_string(),
			};

			let (keyword, args) = match statement::<NomError<&str>>(line).finish() {
				Ok((_, Some(stmt))) => stmt,
				Ok((_, None)) => continue,
				Err(_) => return Err(syntax()),
			};

			if keyword == "newmtl" {
				let (_, n) = name(args).finish().map_err(|_| syntax())?;
				current = match materials.iter().position(|m| m.name == n) {
					Some(idx) => Some(idx),
					None => {
						materials.push(Material::new(n));
						Some(materials.len() - 1)
					},
				};
				continue;
			}

			let mat = match current.and_then(|idx| materials.get_mut(idx)) {
				Some(mat) => mat,
				None => {
					debug!("Ignoring '{}' outside of a material on line {}", keyword, i + 1);
					continue;
				},
			};

			match keyword {
				"Ns" => mat.shininess = scalar(args).finish().map_err(|_| syntax())?.1,
				"Ni" => mat.ior = scalar(args).finish().map_err(|_| syntax())?.1,
				"d" | "Tr" => mat.alpha = dissolve(args).finish().map_err(|_| syntax())?.1,
				"Tf" | "Ka" | "Kd" | "Ks" | "Ke" => {
					let value = match color_value(args).finish().map_err(|_| syntax())?.1 {
						ColorValue::Rgb(v) | ColorValue::Xyz(v) => v,
						ColorValue::Spectral(file) => {
							debug!("Ignoring spectral curve '{}' for '{}' on line {}", file, keyword, i + 1);
							continue;
						},
					};
					match keyword {
						"Tf" => mat.transmission = value,
						"Ka" => mat.ambient = value,
						"Kd" => mat.diffuse = value,
						"Ks" => mat.specular = value,
						_ => mat.specular_exp = value,
					}
				},
				"map_Ka" | "map_Kd" | "map_Ks" | "map_bump" | "bump" => {
					let (_, path) = name(args).finish().map_err(|_| syntax())?;
					let path = normalize_path(path);
					match keyword {
						"map_Ka" => mat.ambient_map = path,
						"map_Kd" => mat.diffuse_map = path,
						"map_Ks" => mat.specular_map = path,
						_ => mat.normal_map = path,
					}
				},
				_ => debug!("Ignoring unsupported MTL keyword '{}' on line {}", keyword, i + 1),
			}
		}

		debug!("Parsed {} materials", materials.len());

		Ok(materials)
	}

	/// Reads and parses a material library from disk
	pub fn open<P>(path: P) -> Result<Vec<Material>, MtlImportError>
	where
		P: AsRef<Path>,
	{
		let data = fs::read(path)?;
		parse(&String::from_utf8_lossy(&data))
	}

	#[cfg(test)]
	mod tests {
		use ultraviolet::vec::Vec3;

		use super::*;

		const BRICK: &str = "\
# two materials
newmtl brick
Ns 96.0
Ni 1.5
Ka 0.1
Kd 0.6 0.2 0.1
Ks 0.5 0.5 0.5
Ke 0 0.25 1
Tf 1 1 1
d 0.75
map_Kd textures\\brick.dds
map_Ks textures\\brick_s.dds
bump textures\\brick_n.dds
illum 2

newmtl glass
Tr 0.25
map_bump glass_n.dds
";

		#[test]
		fn test_parse() {
			let mats = parse(BRICK).unwrap();
			assert_eq!(2, mats.len());

			let brick = &mats[0];
			assert_eq!("brick", brick.name);
			assert_eq!(96.0, brick.shininess);
			assert_eq!(1.5, brick.ior);
			assert_eq!(Vec3::new(0.1, 0.1, 0.1), brick.ambient);
			assert_eq!(Vec3::new(0.6, 0.2, 0.1), brick.diffuse);
			assert_eq!(Vec3::new(0.0, 0.25, 1.0), brick.specular_exp);
			assert_eq!(Vec3::new(1.0, 1.0, 1.0), brick.transmission);
			assert_eq!(0.75, brick.alpha);
			assert_eq!("textures/brick.dds", brick.diffuse_map);
			assert_eq!("textures/brick_s.dds", brick.specular_map);
			assert_eq!("textures/brick_n.dds", brick.normal_map);
			assert_eq!("", brick.ambient_map);

			let glass = &mats[1];
			assert_eq!(0.25, glass.alpha);
			assert_eq!(Vec3::new(1.0, 1.0, 1.0), glass.diffuse);
			assert_eq!("glass_n.dds", glass.normal_map);
		}

		#[test]
		fn test_reopen() {
			let mats = parse("newmtl a\nKd 1 0 0\nnewmtl b\nnewmtl a\nNs 4\n").unwrap();

			assert_eq!(2, mats.len());
			assert_eq!(4.0, mats[0].shininess);
			assert_eq!(Vec3::new(1.0, 0.0, 0.0), mats[0].diffuse);
			assert_eq!(0.0, mats[1].shininess);
		}

		#[test]
		fn test_before_newmtl() {
			let mats = parse("Kd 1 0 0\nnewmtl a\n").unwrap();

			assert_eq!(1, mats.len());
			assert_eq!(Vec3::new(1.0, 1.0, 1.0), mats[0].diffuse);
		}

		#[test]
		fn test_color_formats() {
			let mats = parse("newmtl a\nTf xyz 1 0.5 1\nKa spectral ident.rfl 2\nKd spectral ident.rfl\nKs xyz 0.25\nd -halo 0.5\n").unwrap();

			assert_eq!(Vec3::new(1.0, 0.5, 1.0), mats[0].transmission);
			assert_eq!(Material::new("a").ambient, mats[0].ambient);
			assert_eq!(Material::new("a").diffuse, mats[0].diffuse);
			assert_eq!(Vec3::new(0.25, 0.25, 0.25), mats[0].specular);
			assert_eq!(0.5, mats[0].alpha);
		}

		#[test]
		fn test_color_value() {
			assert_eq!(Ok(("", ColorValue::Spectral("ident.rfl".to_string()))), color_value("spectral ident.rfl"));
			assert_eq!(Ok(("", ColorValue::Xyz(Vec3::new(0.1, 0.2, 0.3)))), color_value("xyz 0.1 0.2 0.3"));
			assert_eq!(Ok(("", ColorValue::Rgb(Vec3::new(0.5, 0.5, 0.5)))), color_value("0.5"));
		}

		#[test]
		fn test_syntax_error() {
			match parse("newmtl a\nNs\tshiny\n") {
				Err(MtlImportError::Syntax { line, .. }) => assert_eq!(2, line),
				other => panic!("expected syntax error, got {:?}", other),
			}
		}
	}
}
