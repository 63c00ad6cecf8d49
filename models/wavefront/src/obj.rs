//! Wavefront geometry (`.obj`)

use log::debug;

use vbmkit_core::scene::{
	Material,
	Mesh
};

/// A parsed OBJ file, before its materials are known
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjFile {
	/// Geometry; triangle material indices point into [`ObjFile::material_refs`]
	pub mesh: Mesh,
	/// Material names in order of first `usemtl`
	pub material_refs: Vec<String>,
	/// Material libraries named by `mtllib`
	pub mtllibs: Vec<String>,
}

impl ObjFile {
	/// Attaches `materials`, resolving each `usemtl` name against them.
	/// Triangles using a name that isn't among the materials get no material.
	pub fn into_mesh(self, materials: Vec<Material>) -> Mesh {
		let mut mesh = self.mesh;
		mesh.materials = materials;

		let remap: Vec<Option<usize>> = self.material_refs.iter()
			.map(|name| {
				let idx = mesh.find_material(name);
				if idx.is_none() {
					debug!("Material '{}' is not defined", name);
				}
				idx
			})
			.collect();

		for tri in mesh.triangles.iter_mut() {
			tri.material = tri.material.and_then(|i| remap.get(i).copied().flatten());
		}

		mesh
	}
}

#[cfg(feature = "import")]
pub mod import {
	use log::debug;

	use nom::{
		character::complete::{
			char,
			i64
		},
		combinator::opt,
		error::Error as NomError,
		Finish,
		IResult,
		multi::many1,
		number::complete::float,
		sequence::{
			preceded,
			tuple
		}
	};

	use std::{
		fs,
		io,
		path::Path
	};

	use thiserror::Error;

	use ultraviolet::vec::{
		Vec2,
		Vec3,
		Vec4
	};

	use vbmkit_core::{
		nom_ext::ws,
		scene::{
			Corner,
			Triangle
		}
	};

	use crate::{
		identifier,
		statement
	};

	use super::ObjFile;

	#[derive(Error, Debug)]
	pub enum ObjImportError {
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
		#[error("Invalid index on line {line}")]
		Index {
			line: usize,
		},
	}

	/// A face corner as written: position, optional texcoord, optional normal
	type RawCorner = (i64, Option<i64>, Option<i64>);

	fn vertex(input: &str) -> IResult<&str, Vec4, NomError<&str>> {
		let (input, (x, y, z, w)) = tuple((ws(float), ws(float), ws(float), opt(ws(float))))(input)?;
		Ok((input, Vec4::new(x, y, z, w.unwrap_or(1.0))))
	}

	fn normal(input: &str) -> IResult<&str, Vec3, NomError<&str>> {
		let (input, (x, y, z)) = tuple((ws(float), ws(float), ws(float)))(input)?;
		Ok((input, Vec3::new(x, y, z)))
	}

	fn texcoord(input: &str) -> IResult<&str, Vec2, NomError<&str>> {
		let (input, (u, v)) = tuple((ws(float), opt(ws(float))))(input)?;
		Ok((input, Vec2::new(u, v.unwrap_or(0.0))))
	}

	/// Parses `v`, `v/t`, `v//n` or `v/t/n`
	fn corner(input: &str) -> IResult<&str, RawCorner, NomError<&str>> {
		let (input, v) = i64(input)?;
		let (input, t) = opt(preceded(char('/'), opt(i64)))(input)?;
		let (input, n) = match t {
			Some(_) => opt(preceded(char('/'), i64))(input)?,
			None => (input, None),
		};

		Ok((input, (v, t.flatten(), n)))
	}

	fn face(input: &str) -> IResult<&str, Vec<RawCorner>, NomError<&str>> {
		many1(ws(corner))(input)
	}

	/// Resolves a 1-based (or negative, relative) index against a list of `len` elements
	fn resolve(index: i64, len: usize, line: usize) -> Result<u32, ObjImportError> {
		let resolved = match index {
			0 => None,
			i if i > 0 => Some(i - 1),
			i => (len as i64).checked_add(i).filter(|r| *r >= 0),
		};

		resolved
			.and_then(|r| u32::try_from(r).ok())
			.ok_or(ObjImportError::Index { line: line })
	}

	/// Parses an OBJ file. Faces with more than three corners are split into a triangle fan.
	pub fn parse(text: &str) -> Result<ObjFile, ObjImportError> {
		let mut obj = ObjFile::default();
		let mut material = None;

		for (i, line) in text.lines().enumerate() {
			let line_no = i + 1;
			let syntax = || ObjImportError::Syntax {
				line: line_no,
				text: line.to_string(),
			};

			let (keyword, args) = match statement::<NomError<&str>>(line).finish() {
				Ok((_, Some(stmt))) => stmt,
				Ok((_, None)) => continue,
				Err(_) => return Err(syntax()),
			};

			let mesh = &mut obj.mesh;
			match keyword {
				"v" => mesh.positions.push(vertex(args).finish().map_err(|_| syntax())?.1),
				"vn" => mesh.normals.push(normal(args).finish().map_err(|_| syntax())?.1),
				"vt" => mesh.texcoords.push(texcoord(args).finish().map_err(|_| syntax())?.1),
				"f" => {
					let (_, raw) = face(args).finish().map_err(|_| syntax())?;
					if raw.len() < 3 {
						return Err(syntax());
					}

					let full = raw.iter().all(|c| c.1.is_some() && c.2.is_some());
					let paired = raw.iter().all(|c| c.1.is_some() && c.2.is_none());

					let mut corners = Vec::with_capacity(raw.len());
					for &(v, t, n) in raw.iter() {
						let position = resolve(v, mesh.positions.len(), line_no)?;
						let corner = match (t, n) {
							(Some(t), Some(n)) if full => Corner::new(position,
								resolve(t, mesh.texcoords.len(), line_no)?,
								resolve(n, mesh.normals.len(), line_no)?),
							(Some(t), None) if paired => Corner::new(position,
								resolve(t, mesh.texcoords.len(), line_no)?, 0),
							_ => Corner::new(position, 0, 0),
						};
						corners.push(corner);
					}

					for k in 1..corners.len() - 1 {
						mesh.triangles.push(Triangle {
							corners: [corners[0], corners[k], corners[k + 1]],
							material: material,
						});
					}
				},
				"g" | "o" => {
					if let Ok((_, name)) = ws(identifier::<NomError<&str>>)(args).finish() {
						mesh.name = name.to_string();
					}
				},
				"usemtl" => {
					let (_, name) = ws(identifier::<NomError<&str>>)(args).finish().map_err(|_| syntax())?;
					material = Some(match obj.material_refs.iter().position(|m| m == name) {
						Some(idx) => idx,
						None => {
							obj.material_refs.push(name.to_string());
							obj.material_refs.len() - 1
						},
					});
				},
				"mtllib" => obj.mtllibs.extend(args.split_whitespace().map(|s| s.to_string())),
				_ => debug!("Ignoring unsupported OBJ keyword '{}' on line {}", keyword, line_no),
			}
		}

		debug!("Parsed OBJ '{}': {} positions, {} normals, {} texcoords, {} triangles",
			obj.mesh.name, obj.mesh.positions.len(), obj.mesh.normals.len(), obj.mesh.texcoords.len(),
			obj.mesh.triangles.len());

		Ok(obj)
	}

	/// Reads and parses an OBJ file from disk
	pub fn open<P>(path: P) -> Result<ObjFile, ObjImportError>
	where
		P: AsRef<Path>,
	{
		let data = fs::read(path)?;
		parse(&String::from_utf8_lossy(&data))
	}

}
