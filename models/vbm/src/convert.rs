//! Conversion from an interchange [`Mesh`] to a [`VbmModel`].

use bitflags::bitflags;
use log::debug;
use std::io;
use thiserror::Error;

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use vbmkit_core::{
	fit_str,
	io_ext::WriteBinExt,
	scene::{
		Material,
		Mesh,
		Triangle
	}
};

use crate::vbm::*;

bitflags! {
	pub struct ExportFlag: u32 {
		/// Move the bounding box center of all positions to the origin
		const RECENTER = 1;
		/// Append render chunk records after the materials
		const EMIT_CHUNKS = 2;
	}
}

impl Default for ExportFlag {
	fn default() -> Self {
		ExportFlag::RECENTER | ExportFlag::EMIT_CHUNKS
	}
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ExportCfg {
	pub flags: ExportFlag,
	pub header: HeaderShape,
}

#[derive(Error, Debug)]
pub enum VbmExportError {
	#[error("I/O error")]
	IO {
		#[from]
		source: io::Error,
	},
	#[error("Position index {index} out of range, mesh has {count} positions")]
	PositionIndex {
		index: u32,
		count: usize,
	},
	#[error("Too many {what} for a VBM file: {count}")]
	Overflow {
		what: &'static str,
		count: usize,
	},
}

fn count_u32(what: &'static str, count: usize) -> Result<u32, VbmExportError> {
	u32::try_from(count).map_err(|_| VbmExportError::Overflow { what: what, count: count })
}

/// Truncates names and map paths to the fixed-size fields they are stored in
fn fit_material(mat: &Material) -> Material {
	Material {
		name: fit_str(&mat.name, MATERIAL_NAME_LEN),
		ambient_map: fit_str(&mat.ambient_map, MAP_NAME_LEN),
		diffuse_map: fit_str(&mat.diffuse_map, MAP_NAME_LEN),
		specular_map: fit_str(&mat.specular_map, MAP_NAME_LEN),
		normal_map: fit_str(&mat.normal_map, MAP_NAME_LEN),
		..mat.clone()
	}
}

/// Stable-sorts triangles so that triangles sharing a material are adjacent.
/// Triangles without a material come first, in their original order.
pub fn group_by_material(mesh: &Mesh, triangles: &mut [Triangle]) {
	triangles.sort_by(|a, b| mesh.material_name(a).cmp(&mesh.material_name(b)));
}

/// Merges runs of triangles with the same material into render chunks.
/// Chunk ranges are counted in vertices, three per triangle.
pub fn build_chunks(triangles: &[Triangle]) -> Vec<RenderChunk> {
	let mut chunks: Vec<RenderChunk> = vec![];

	for tri in triangles.iter() {
		let material_index = tri.material.map_or(NO_MATERIAL, |i| i as u32);

		match chunks.last_mut() {
			Some(chunk) if chunk.material_index == material_index => chunk.count += 3,
			Some(chunk) => {
				let first = chunk.first + chunk.count;
				chunks.push(RenderChunk {
					material_index: material_index,
					first: first,
					count: 3,
				});
			},
			None => chunks.push(RenderChunk {
				material_index: material_index,
				first: 0,
				count: 3,
			}),
		}
	}

	chunks
}

/// Returns whether one index stream can address every present attribute, i.e. the normal and
/// texcoord indices of each corner equal its position index and the lists have matching lengths.
/// Streams of attributes the mesh doesn't have are ignored.
pub fn can_share_indices(mesh: &Mesh, triangles: &[Triangle]) -> bool {
	let has_normals = !mesh.normals.is_empty();
	let has_texcoords = !mesh.texcoords.is_empty();

	if triangles.is_empty() || mesh.positions.is_empty() {
		return false;
	}

	if (has_normals && mesh.normals.len() != mesh.positions.len()) ||
		(has_texcoords && mesh.texcoords.len() != mesh.positions.len())
	{
		return false;
	}

	triangles.iter()
		.flat_map(|t| t.corners.iter())
		.all(|c| (!has_normals || c.normal == c.position) && (!has_texcoords || c.texcoord == c.position))
}

/// Converts a mesh into the VBM layout.
///
/// Triangles are grouped by material first. If a single index stream serves all attributes the
/// output is indexed, otherwise every attribute is expanded to one entry per triangle corner.
/// Normals and texcoords with out-of-range indices become zero vectors in the expanded form.
pub fn convert(mesh: &Mesh, cfg: &ExportCfg) -> Result<VbmModel, VbmExportError> {
	let mut mesh = mesh.clone();
	if cfg.flags.contains(ExportFlag::RECENTER) {
		let center = mesh.recenter();
		debug!("Recentered '{}' by {:?}", mesh.name, center);
	}

	let mut triangles = mesh.triangles.clone();
	group_by_material(&mesh, &mut triangles);

	for c in triangles.iter().flat_map(|t| t.corners.iter()) {
		if c.position as usize >= mesh.positions.len() {
			return Err(VbmExportError::PositionIndex {
				index: c.position,
				count: mesh.positions.len(),
			});
		}
	}

	let mut attributes = vec![];
	if !mesh.positions.is_empty() {
		attributes.push(AttribHeader::new("position", 3));
	}
	if !mesh.normals.is_empty() {
		attributes.push(AttribHeader::new("normal", 3));
	}
	if !mesh.texcoords.is_empty() {
		attributes.push(AttribHeader::new("texcoord", 2));
	}

	let indexed = can_share_indices(&mesh, &triangles);
	let mut vertex_data = vec![];
	let num_vertices;
	let indices;

	if indexed {
		for p in mesh.positions.iter() {
			vertex_data.write_vec3_le(Vec3::new(p.x, p.y, p.z))?;
		}
		for n in mesh.normals.iter() {
			vertex_data.write_vec3_le(*n)?;
		}
		for t in mesh.texcoords.iter() {
			vertex_data.write_vec2_le(*t)?;
		}

		let stream: Vec<u32> = triangles.iter()
			.flat_map(|t| t.corners.iter().map(|c| c.position))
			.collect();
		let max_index = stream.iter().copied().max().unwrap_or(0);

		num_vertices = mesh.positions.len();
		indices = if max_index > 0xFFFF {
			Indices::U32(stream)
		} else {
			Indices::U16(stream.into_iter().map(|i| i as u16).collect())
		};
	} else {
		let corners: Vec<_> = triangles.iter().flat_map(|t| t.corners.iter()).collect();

		if !mesh.positions.is_empty() {
			for c in corners.iter() {
				let p = mesh.positions[c.position as usize];
				vertex_data.write_vec3_le(Vec3::new(p.x, p.y, p.z))?;
			}
		}
		if !mesh.normals.is_empty() {
			for c in corners.iter() {
				let n = mesh.normals.get(c.normal as usize).copied().unwrap_or_else(Vec3::zero);
				vertex_data.write_vec3_le(n)?;
			}
		}
		if !mesh.texcoords.is_empty() {
			for c in corners.iter() {
				let t = mesh.texcoords.get(c.texcoord as usize).copied().unwrap_or_else(Vec2::zero);
				vertex_data.write_vec2_le(t)?;
			}
		}

		num_vertices = corners.len();
		indices = Indices::None;
	}

	let chunks = if cfg.flags.contains(ExportFlag::EMIT_CHUNKS) {
		build_chunks(&triangles)
	} else {
		vec![]
	};

	let count = triangles.len().checked_mul(3)
		.ok_or(VbmExportError::Overflow { what: "triangles", count: triangles.len() })?;

	let mut header = Header::new(cfg.header);
	header.name = fit_str(&mesh.name, NAME_LEN);
	header.num_attribs = attributes.len() as u32;
	header.num_frames = 1;
	if cfg.header == HeaderShape::Legacy {
		header.num_chunks = count_u32("render chunks", chunks.len())?;
	}
	header.num_vertices = count_u32("vertices", num_vertices)?;
	header.num_indices = count_u32("indices", indices.len())?;
	header.index_type = indices.index_type();
	header.num_materials = count_u32("materials", mesh.materials.len())?;
	header.flags = VbmFlags::HAS_FRAMES;
	if num_vertices != 0 {
		header.flags |= VbmFlags::HAS_VERTICES;
	}
	if !indices.is_empty() {
		header.flags |= VbmFlags::HAS_INDICES;
	}
	if !mesh.materials.is_empty() {
		header.flags |= VbmFlags::HAS_MATERIALS;
	}

	debug!("Converted '{}': {} triangles, {} vertices, {} indices, {} chunks",
		mesh.name, triangles.len(), num_vertices, indices.len(), chunks.len());

	Ok(VbmModel {
		header: header,
		attributes: attributes,
		frames: vec![FrameHeader {
			first: 0,
			count: count_u32("triangles", count)?,
			flags: 0,
		}],
		vertex_data: vertex_data,
		indices: indices,
		materials: mesh.materials.iter().map(fit_material).collect(),
		chunks: chunks,
	})
}

#[cfg(all(test, feature = "import"))]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec3,
		Vec4
	};

	use vbmkit_core::scene::{
		Corner,
		Material,
		Mesh,
		Triangle
	};

	use super::*;

	fn tri(p: [u32; 3], t: [u32; 3], n: [u32; 3], material: Option<usize>) -> Triangle {
		Triangle {
			corners: [
				Corner::new(p[0], t[0], n[0]),
				Corner::new(p[1], t[1], n[1]),
				Corner::new(p[2], t[2], n[2]),
			],
			material: material,
		}
	}

	fn quad_positions() -> Vec<Vec4> {
		vec![
			Vec4::new(0.0, 0.0, 0.0, 1.0),
			Vec4::new(1.0, 0.0, 0.0, 1.0),
			Vec4::new(1.0, 1.0, 0.0, 1.0),
			Vec4::new(0.0, 1.0, 0.0, 1.0),
		]
	}

	fn no_recenter() -> ExportCfg {
		ExportCfg {
			flags: ExportFlag::EMIT_CHUNKS,
			header: HeaderShape::Current,
		}
	}

	#[test]
	fn test_indexed() {
		let mut mesh = Mesh::default();
		mesh.name = "quad".to_string();
		mesh.positions = quad_positions();
		mesh.normals = vec![Vec3::unit_z(); 4];
		mesh.texcoords = vec![Vec2::new(0.0, 0.0), Vec2::new(1.0, 0.0), Vec2::new(1.0, 1.0), Vec2::new(0.0, 1.0)];
		mesh.triangles = vec![
			tri([0, 1, 2], [0, 1, 2], [0, 1, 2], None),
			tri([0, 2, 3], [0, 2, 3], [0, 2, 3], None),
		];

		let model = convert(&mesh, &no_recenter()).unwrap();

		assert_eq!(4, model.header.num_vertices);
		assert_eq!(6, model.header.num_indices);
		assert_eq!(IndexType::U16, model.header.index_type);
		assert_eq!(Indices::U16(vec![0, 1, 2, 0, 2, 3]), model.indices);
		assert_eq!(vec![FrameHeader { first: 0, count: 6, flags: 0 }], model.frames);
		assert_eq!(vec!["position", "normal", "texcoord"],
			model.attributes.iter().map(|a| a.name.as_str()).collect::<Vec<_>>());
		assert_eq!(4 * (12 + 12 + 8), model.vertex_data.len());
		assert_eq!(VbmFlags::HAS_VERTICES | VbmFlags::HAS_INDICES | VbmFlags::HAS_FRAMES, model.header.flags);
		assert_eq!(Some(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0]), model.attribute_f32(2));
	}

	#[test]
	fn test_uv_seams_deindex() {
		// Four triangles fanned around the quad center, with texcoords split along the diagonals
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.positions.push(Vec4::new(0.5, 0.5, 0.0, 1.0));
		mesh.texcoords = vec![Vec2::zero(); 12];
		mesh.triangles = vec![
			tri([0, 1, 4], [0, 1, 2], [0, 0, 0], None),
			tri([1, 2, 4], [3, 4, 5], [0, 0, 0], None),
			tri([2, 3, 4], [6, 7, 8], [0, 0, 0], None),
			tri([3, 0, 4], [9, 10, 11], [0, 0, 0], None),
		];

		let model = convert(&mesh, &no_recenter()).unwrap();

		assert_eq!(12, model.header.num_vertices);
		assert_eq!(0, model.header.num_indices);
		assert_eq!(IndexType::None, model.header.index_type);
		assert_eq!(Indices::None, model.indices);
		assert_eq!(12 * (12 + 8), model.vertex_data.len());
		assert_eq!(12, model.frames[0].count);
		assert!(!model.header.flags.contains(VbmFlags::HAS_INDICES));
	}

	#[test]
	fn test_deindex_missing_normals() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.normals = vec![Vec3::unit_y()];
		mesh.triangles = vec![tri([0, 1, 2], [0, 0, 0], [0, 5, 0], None)];

		let model = convert(&mesh, &no_recenter()).unwrap();

		assert_eq!(3, model.header.num_vertices);
		assert_eq!(Some(vec![0.0, 1.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 0.0]), model.attribute_f32(1));
	}

	#[test]
	fn test_bad_position_index() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.triangles = vec![tri([0, 1, 7], [0; 3], [0; 3], None)];

		assert!(matches!(convert(&mesh, &ExportCfg::default()),
			Err(VbmExportError::PositionIndex { index: 7, count: 4 })));
	}

	#[test]
	fn test_empty_mesh() {
		let model = convert(&Mesh::default(), &ExportCfg::default()).unwrap();

		assert_eq!(0, model.header.num_attribs);
		assert_eq!(0, model.header.num_vertices);
		assert_eq!(0, model.header.num_indices);
		assert_eq!(0, model.header.num_materials);
		assert_eq!(1, model.header.num_frames);
		assert_eq!(0, model.frames[0].count);
		assert!(model.chunks.is_empty());

		let read = VbmModel::read(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(model, read);
	}

	#[test]
	fn test_recenter() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.triangles = vec![tri([0, 1, 2], [0; 3], [0; 3], None)];

		let model = convert(&mesh, &ExportCfg::default()).unwrap();
		let positions = model.attribute_f32(0).unwrap();

		// positions only, so every position is kept and indexed
		assert_eq!(&[-0.5, -0.5, 0.0, 0.5, -0.5, 0.0, 0.5, 0.5, 0.0, -0.5, 0.5, 0.0][..], &positions[..]);
	}

	#[test]
	fn test_material_chunks() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.materials = vec![Material::new("wood"), Material::new("metal")];
		mesh.triangles = vec![
			tri([0, 1, 2], [0; 3], [0; 3], Some(0)),
			tri([0, 2, 3], [0; 3], [0; 3], Some(1)),
			tri([1, 2, 3], [0; 3], [0; 3], None),
			tri([0, 1, 3], [0; 3], [0; 3], Some(0)),
		];

		let model = convert(&mesh, &no_recenter()).unwrap();

		assert_eq!(vec![
			RenderChunk { material_index: NO_MATERIAL, first: 0, count: 3 },
			RenderChunk { material_index: 1, first: 3, count: 3 },
			RenderChunk { material_index: 0, first: 6, count: 6 },
		], model.chunks);
		assert_eq!(vec!["wood", "metal"], model.materials.iter().map(|m| m.name.as_str()).collect::<Vec<_>>());
		assert_eq!(2, model.header.num_materials);
		assert!(model.header.flags.contains(VbmFlags::HAS_MATERIALS));
		// positions only, so the index stream is shared
		assert_eq!(Indices::U16(vec![1, 2, 3, 0, 2, 3, 0, 1, 2, 0, 1, 3]), model.indices);
	}

	#[test]
	fn test_grouping_idempotent() {
		let mut mesh = Mesh::default();
		mesh.materials = vec![Material::new("b"), Material::new("a")];
		let mut triangles = vec![
			tri([0, 0, 0], [0; 3], [0; 3], Some(0)),
			tri([1, 1, 1], [0; 3], [0; 3], Some(1)),
			tri([2, 2, 2], [0; 3], [0; 3], Some(0)),
			tri([3, 3, 3], [0; 3], [0; 3], Some(1)),
		];

		group_by_material(&mesh, &mut triangles);
		let once = triangles.clone();
		let chunks = build_chunks(&triangles);
		group_by_material(&mesh, &mut triangles);

		assert_eq!(once, triangles);
		assert_eq!(chunks, build_chunks(&triangles));
		// stable within each material
		assert_eq!(vec![1, 3, 0, 2], triangles.iter().map(|t| t.corners[0].position).collect::<Vec<_>>());
	}

	#[test]
	fn test_no_chunks() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.triangles = vec![tri([0, 1, 2], [0; 3], [0; 3], None)];
		let cfg = ExportCfg {
			flags: ExportFlag::empty(),
			header: HeaderShape::Current,
		};

		assert!(convert(&mesh, &cfg).unwrap().chunks.is_empty());
	}

	#[test]
	fn test_large_indices() {
		let mut mesh = Mesh::default();
		mesh.positions = vec![Vec4::new(0.0, 0.0, 0.0, 1.0); 0x10001];
		mesh.triangles = vec![tri([0, 1, 0x10000], [0; 3], [0; 3], None)];

		let model = convert(&mesh, &no_recenter()).unwrap();

		assert_eq!(IndexType::U32, model.header.index_type);
		assert_eq!(Indices::U32(vec![0, 1, 0x10000]), model.indices);
	}

	#[test]
	fn test_long_names() {
		let mut mat = Material::new(&"m".repeat(40));
		mat.diffuse_map = "d".repeat(80);
		let mut mesh = Mesh::default();
		mesh.name = "n".repeat(70);
		mesh.materials = vec![mat];

		let model = convert(&mesh, &ExportCfg::default()).unwrap();
		assert_eq!(63, model.header.name.len());
		assert_eq!(31, model.materials[0].name.len());
		assert_eq!(63, model.materials[0].diffuse_map.len());

		let read = VbmModel::read(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(model, read);
	}

	#[test]
	fn test_legacy_shape() {
		let mut mesh = Mesh::default();
		mesh.positions = quad_positions();
		mesh.triangles = vec![tri([0, 1, 2], [0; 3], [0; 3], None)];
		let cfg = ExportCfg {
			flags: ExportFlag::default(),
			header: HeaderShape::Legacy,
		};

		let model = convert(&mesh, &cfg).unwrap();
		assert_eq!(1, model.header.num_chunks);

		let read = VbmModel::read(&model.to_bytes().unwrap()).unwrap();
		assert_eq!(HeaderShape::Legacy, read.header.shape());
		assert_eq!(model, read);
	}
}
