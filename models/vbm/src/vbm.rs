use bitflags::bitflags;

use byteorder::{
	ByteOrder,
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io;

use vbmkit_core::{
	io_ext::{
		ReadBinExt,
		WriteBinExt
	},
	rtag4,
	scene::Material
};

pub const MAGIC: u32 = rtag4!(b"SBM1");
/// Written for the old header shape. Any magic other than [`MAGIC`] is read as the old shape.
pub const MAGIC_LEGACY: u32 = rtag4!(b"SBM0");

pub const HEADER_SIZE: u32 = 100;
pub const HEADER_SIZE_LEGACY: u32 = 104;
pub const ATTRIB_HEADER_SIZE: usize = 76;
pub const FRAME_HEADER_SIZE: usize = 12;
pub const MATERIAL_SIZE: usize = 364;
pub const RENDER_CHUNK_SIZE: usize = 12;

pub const NAME_LEN: usize = 64;
pub const MATERIAL_NAME_LEN: usize = 32;
pub const MAP_NAME_LEN: usize = 64;

/// Chunk material index used for triangles without a material
pub const NO_MATERIAL: u32 = 0xFFFFFFFF;

pub const GL_NONE: u32 = 0;
pub const GL_UNSIGNED_SHORT: u32 = 0x1403;
pub const GL_UNSIGNED_INT: u32 = 0x1405;
pub const GL_FLOAT: u32 = 0x1406;

bitflags! {
	#[derive(Default)]
	pub struct VbmFlags: u32 {
		const HAS_VERTICES = 1;
		const HAS_INDICES = 2;
		const HAS_FRAMES = 4;
		const HAS_MATERIALS = 8;
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u32)]
pub enum IndexType {
	None = GL_NONE,
	U16 = GL_UNSIGNED_SHORT,
	U32 = GL_UNSIGNED_INT,
}

impl Default for IndexType {
	fn default() -> Self {
		IndexType::None
	}
}

impl IndexType {
	/// Unknown values are treated as 32-bit indices
	pub fn from_raw(raw: u32) -> IndexType {
		match raw {
			GL_NONE => IndexType::None,
			GL_UNSIGNED_SHORT => IndexType::U16,
			GL_UNSIGNED_INT => IndexType::U32,
			_ => {
				log::warn!("Unknown index type {:#x}, assuming 32-bit indices", raw);
				IndexType::U32
			},
		}
	}

	/// Index element width in bytes. Anything but 16-bit is 4 bytes wide.
	pub fn element_size(self) -> usize {
		match self {
			IndexType::U16 => 2,
			_ => 4,
		}
	}
}

/// Byte offsets of the header fields that move between the two header shapes
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOffsets {
	pub num_chunks: Option<usize>,
	pub num_vertices: usize,
	pub num_indices: usize,
	pub index_type: usize,
	pub num_materials: usize,
	pub flags: usize,
}

const CURRENT_FIELDS: FieldOffsets = FieldOffsets {
	num_chunks: None,
	num_vertices: 80,
	num_indices: 84,
	index_type: 88,
	num_materials: 92,
	flags: 96,
};

const LEGACY_FIELDS: FieldOffsets = FieldOffsets {
	num_chunks: Some(80),
	num_vertices: 84,
	num_indices: 88,
	index_type: 92,
	num_materials: 96,
	flags: 100,
};

// Leading fields shared by both shapes
const OFFS_NAME: usize = 8;
const OFFS_NUM_ATTRIBS: usize = 72;
const OFFS_NUM_FRAMES: usize = 76;

/// Header layout, discriminated by the magic number
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HeaderShape {
	/// No chunk count
	Current,
	/// `num_chunks` follows `num_frames`, shifting the trailing fields by 4 bytes
	Legacy,
}

impl Default for HeaderShape {
	fn default() -> Self {
		HeaderShape::Current
	}
}

impl HeaderShape {
	pub fn detect(magic: u32) -> HeaderShape {
		if magic == MAGIC {
			HeaderShape::Current
		} else {
			HeaderShape::Legacy
		}
	}

	pub fn magic(self) -> u32 {
		match self {
			HeaderShape::Current => MAGIC,
			HeaderShape::Legacy => MAGIC_LEGACY,
		}
	}

	pub fn size(self) -> u32 {
		match self {
			HeaderShape::Current => HEADER_SIZE,
			HeaderShape::Legacy => HEADER_SIZE_LEGACY,
		}
	}

	pub fn fields(self) -> &'static FieldOffsets {
		match self {
			HeaderShape::Current => &CURRENT_FIELDS,
			HeaderShape::Legacy => &LEGACY_FIELDS,
		}
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
	pub magic: u32,
	/// Declared header size, the offset of the first attribute header
	pub size: u32,
	pub name: String,
	pub num_attribs: u32,
	pub num_frames: u32,
	/// Only stored by the legacy header shape
	pub num_chunks: u32,
	pub num_vertices: u32,
	pub num_indices: u32,
	pub index_type: IndexType,
	pub num_materials: u32,
	pub flags: VbmFlags,
}

impl Default for Header {
	fn default() -> Self {
		Header::new(HeaderShape::Current)
	}
}

impl Header {
	pub fn new(shape: HeaderShape) -> Header {
		Header {
			magic: shape.magic(),
			size: shape.size(),
			name: String::new(),
			num_attribs: 0,
			num_frames: 0,
			num_chunks: 0,
			num_vertices: 0,
			num_indices: 0,
			index_type: IndexType::None,
			num_materials: 0,
			flags: VbmFlags::empty(),
		}
	}

	pub fn shape(&self) -> HeaderShape {
		HeaderShape::detect(self.magic)
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		let shape = self.shape();

		buf.write_u32::<LE>(self.magic)?;
		buf.write_u32::<LE>(self.size)?;
		buf.write_fixed_str(&self.name, NAME_LEN)?;
		buf.write_u32::<LE>(self.num_attribs)?;
		buf.write_u32::<LE>(self.num_frames)?;
		if shape == HeaderShape::Legacy {
			buf.write_u32::<LE>(self.num_chunks)?;
		}
		buf.write_u32::<LE>(self.num_vertices)?;
		buf.write_u32::<LE>(self.num_indices)?;
		buf.write_u32::<LE>(self.index_type as u32)?;
		buf.write_u32::<LE>(self.num_materials)?;
		buf.write_u32::<LE>(self.flags.bits())?;

		// Pad out a declared size larger than the shape itself
		for _ in shape.size()..self.size {
			buf.write_u8(0)?;
		}

		Ok(())
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct AttribHeader {
	pub name: String,
	/// GL element type, e.g. [`GL_FLOAT`]
	pub element_type: u32,
	pub components: u32,
	pub flags: u32,
}

impl AttribHeader {
	pub fn new(name: &str, components: u32) -> AttribHeader {
		AttribHeader {
			name: name.to_string(),
			element_type: GL_FLOAT,
			components: components,
			flags: 0,
		}
	}

	/// Size in bytes of this attribute's array for `num_vertices` vertices
	pub fn span(&self, num_vertices: u32) -> Option<usize> {
		(self.components as usize)
			.checked_mul(4)?
			.checked_mul(num_vertices as usize)
	}

	#[cfg(feature = "import")]
	fn read<R>(buf: &mut R) -> io::Result<AttribHeader>
	where
		R: ReadBytesExt + ReadBinExt,
	{
		Ok(AttribHeader {
			name: buf.read_fixed_str(NAME_LEN)?,
			element_type: buf.read_u32::<LE>()?,
			components: buf.read_u32::<LE>()?,
			flags: buf.read_u32::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_fixed_str(&self.name, NAME_LEN)?;
		buf.write_u32::<LE>(self.element_type)?;
		buf.write_u32::<LE>(self.components)?;
		buf.write_u32::<LE>(self.flags)
	}
}

/// A draw range into the shared vertex/index streams
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameHeader {
	pub first: u32,
	pub count: u32,
	pub flags: u32,
}

impl FrameHeader {
	#[cfg(feature = "import")]
	fn read<R>(buf: &mut R) -> io::Result<FrameHeader>
	where
		R: ReadBytesExt,
	{
		Ok(FrameHeader {
			first: buf.read_u32::<LE>()?,
			count: buf.read_u32::<LE>()?,
			flags: buf.read_u32::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.first)?;
		buf.write_u32::<LE>(self.count)?;
		buf.write_u32::<LE>(self.flags)
	}
}

/// A contiguous range of the vertex/index stream drawn with one material.
/// `first` and `count` are in vertices (indexed files: indices), 3 per triangle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderChunk {
	pub material_index: u32,
	pub first: u32,
	pub count: u32,
}

impl RenderChunk {
	#[cfg(feature = "import")]
	fn read<R>(buf: &mut R) -> io::Result<RenderChunk>
	where
		R: ReadBytesExt,
	{
		Ok(RenderChunk {
			material_index: buf.read_u32::<LE>()?,
			first: buf.read_u32::<LE>()?,
			count: buf.read_u32::<LE>()?,
		})
	}

	#[cfg(feature = "export")]
	fn write<W>(&self, buf: &mut W) -> io::Result<()>
	where
		W: WriteBytesExt,
	{
		buf.write_u32::<LE>(self.material_index)?;
		buf.write_u32::<LE>(self.first)?;
		buf.write_u32::<LE>(self.count)
	}
}

#[cfg(feature = "import")]
fn read_material<R>(buf: &mut R) -> io::Result<Material>
where
	R: ReadBytesExt + ReadBinExt,
{
	Ok(Material {
		name: buf.read_fixed_str(MATERIAL_NAME_LEN)?,
		ambient: buf.read_vec3_le()?,
		diffuse: buf.read_vec3_le()?,
		specular: buf.read_vec3_le()?,
		specular_exp: buf.read_vec3_le()?,
		shininess: buf.read_f32::<LE>()?,
		alpha: buf.read_f32::<LE>()?,
		transmission: buf.read_vec3_le()?,
		ior: buf.read_f32::<LE>()?,
		ambient_map: buf.read_fixed_str(MAP_NAME_LEN)?,
		diffuse_map: buf.read_fixed_str(MAP_NAME_LEN)?,
		specular_map: buf.read_fixed_str(MAP_NAME_LEN)?,
		normal_map: buf.read_fixed_str(MAP_NAME_LEN)?,
	})
}

#[cfg(feature = "export")]
fn write_material<W>(mat: &Material, buf: &mut W) -> io::Result<()>
where
	W: WriteBytesExt + WriteBinExt,
{
	buf.write_fixed_str(&mat.name, MATERIAL_NAME_LEN)?;
	buf.write_vec3_le(mat.ambient)?;
	buf.write_vec3_le(mat.diffuse)?;
	buf.write_vec3_le(mat.specular)?;
	buf.write_vec3_le(mat.specular_exp)?;
	buf.write_f32::<LE>(mat.shininess)?;
	buf.write_f32::<LE>(mat.alpha)?;
	buf.write_vec3_le(mat.transmission)?;
	buf.write_f32::<LE>(mat.ior)?;
	buf.write_fixed_str(&mat.ambient_map, MAP_NAME_LEN)?;
	buf.write_fixed_str(&mat.diffuse_map, MAP_NAME_LEN)?;
	buf.write_fixed_str(&mat.specular_map, MAP_NAME_LEN)?;
	buf.write_fixed_str(&mat.normal_map, MAP_NAME_LEN)
}

/// Index buffer contents at their stored width
#[derive(Clone, Debug, PartialEq)]
pub enum Indices {
	None,
	U16(Vec<u16>),
	U32(Vec<u32>),
}

impl Default for Indices {
	fn default() -> Self {
		Indices::None
	}
}

impl Indices {
	pub fn len(&self) -> usize {
		match self {
			Indices::None => 0,
			Indices::U16(v) => v.len(),
			Indices::U32(v) => v.len(),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	pub fn index_type(&self) -> IndexType {
		match self {
			Indices::None => IndexType::None,
			Indices::U16(_) => IndexType::U16,
			Indices::U32(_) => IndexType::U32,
		}
	}

	pub fn get(&self, i: usize) -> Option<u32> {
		match self {
			Indices::None => None,
			Indices::U16(v) => v.get(i).map(|&i| i as u32),
			Indices::U32(v) => v.get(i).copied(),
		}
	}

	/// Little endian bytes, as uploaded to an index buffer
	pub fn to_bytes(&self) -> Vec<u8> {
		let mut out = vec![0u8; self.len() * self.index_type().element_size()];

		match self {
			Indices::None => (),
			Indices::U16(v) => LE::write_u16_into(v, &mut out),
			Indices::U32(v) => LE::write_u32_into(v, &mut out),
		}

		out
	}
}

/// Host-side contents of a VBM file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VbmModel {
	pub header: Header,
	pub attributes: Vec<AttribHeader>,
	pub frames: Vec<FrameHeader>,
	/// Per-attribute arrays, concatenated in attribute order
	pub vertex_data: Vec<u8>,
	pub indices: Indices,
	pub materials: Vec<Material>,
	pub chunks: Vec<RenderChunk>,
}

impl VbmModel {
	/// Byte offset of an attribute's array within [`VbmModel::vertex_data`]
	pub fn attribute_offset(&self, index: usize) -> usize {
		self.attributes.iter()
			.take(index)
			.map(|a| a.span(self.header.num_vertices).unwrap_or(0))
			.sum()
	}

	/// Raw bytes of an attribute's array
	pub fn attribute_data(&self, index: usize) -> Option<&[u8]> {
		let attr = self.attributes.get(index)?;
		let start = self.attribute_offset(index);
		let end = start.checked_add(attr.span(self.header.num_vertices)?)?;

		self.vertex_data.get(start..end)
	}

	/// An attribute's array decoded as little endian floats
	pub fn attribute_f32(&self, index: usize) -> Option<Vec<f32>> {
		let mut data = self.attribute_data(index)?;
		let mut out = Vec::with_capacity(data.len() / 4);

		while !data.is_empty() {
			out.push(data.read_f32::<LE>().ok()?);
		}

		Some(out)
	}
}

#[cfg(feature = "import")]
pub mod import {
	use log::debug;
	use std::{
		fs,
		io,
		path::Path
	};
	use thiserror::Error;

	use super::*;

	#[derive(Error, Debug)]
	pub enum VbmImportError {
		#[error("I/O error")]
		IO {
			#[from]
			source: io::Error,
		},
		#[error("Malformed VBM file: {section} needs {len} bytes at offset {offset}, {available} available")]
		Malformed {
			section: &'static str,
			offset: usize,
			len: usize,
			available: usize,
		},
		#[error("Unsupported attribute component count: {0}")]
		AttributeComponents(u32),
	}

	/// Bounds-checked view over a whole file
	struct Blob<'a> {
		data: &'a [u8],
	}

	impl<'a> Blob<'a> {
		/// Returns `len` bytes at `offset`, or [`VbmImportError::Malformed`] if they run past the end.
		/// A `len` of `None` stands for a size that overflowed while being computed.
		fn section(&self, section: &'static str, offset: usize, len: Option<usize>)
			-> Result<&'a [u8], VbmImportError>
		{
			let available = self.data.len();
			let err = |len| VbmImportError::Malformed {
				section: section,
				offset: offset,
				len: len,
				available: available,
			};

			let len = len.ok_or_else(|| err(usize::MAX))?;
			let end = offset.checked_add(len).ok_or_else(|| err(len))?;

			self.data.get(offset..end).ok_or_else(|| err(len))
		}
	}

	fn span(count: u32, size: usize) -> Option<usize> {
		(count as usize).checked_mul(size)
	}

	impl Header {
		/// Parses the header, choosing the field layout from the magic number
		pub fn read(data: &[u8]) -> Result<Header, VbmImportError> {
			let blob = Blob { data: data };
			let lead = blob.section("header", 0, Some(8))?;
			let magic = LE::read_u32(&lead[0..4]);
			let size = LE::read_u32(&lead[4..8]);
			let shape = HeaderShape::detect(magic);

			// Fields past the declared size of a current header read as zero
			let mut raw = [0u8; HEADER_SIZE_LEGACY as usize];
			let copy_len = match shape {
				HeaderShape::Current => (size as usize).min(HEADER_SIZE as usize),
				HeaderShape::Legacy => HEADER_SIZE_LEGACY as usize,
			};
			raw[..copy_len].copy_from_slice(blob.section("header", 0, Some(copy_len))?);

			let field = |offset: usize| LE::read_u32(&raw[offset..offset + 4]);
			let fields = shape.fields();
			debug!("VBM header shape {:?}, magic {:#x}, size {}", shape, magic, size);

			Ok(Header {
				magic: magic,
				size: size,
				name: (&raw[OFFS_NAME..OFFS_NAME + NAME_LEN]).read_fixed_str(NAME_LEN)?,
				num_attribs: field(OFFS_NUM_ATTRIBS),
				num_frames: field(OFFS_NUM_FRAMES),
				num_chunks: fields.num_chunks.map_or(0, |o| field(o)),
				num_vertices: field(fields.num_vertices),
				num_indices: field(fields.num_indices),
				index_type: IndexType::from_raw(field(fields.index_type)),
				num_materials: field(fields.num_materials),
				flags: VbmFlags::from_bits_truncate(field(fields.flags)),
			})
		}
	}

	impl VbmModel {
		/// Parses a whole VBM file. Every section is bounds-checked against `data`.
		pub fn read(data: &[u8]) -> Result<VbmModel, VbmImportError> {
			let blob = Blob { data: data };
			let mut header = Header::read(data)?;

			// Attribute headers start at the declared header size
			let mut offset = header.size as usize;
			let mut buf = blob.section("attribute headers", offset,
				span(header.num_attribs, ATTRIB_HEADER_SIZE))?;
			offset += buf.len();
			let mut attributes = Vec::with_capacity(header.num_attribs as usize);
			for _ in 0..header.num_attribs {
				let attr = AttribHeader::read(&mut buf)?;
				if attr.components < 1 || attr.components > 4 {
					return Err(VbmImportError::AttributeComponents(attr.components));
				}
				attributes.push(attr);
			}

			let mut buf = blob.section("frame headers", offset,
				span(header.num_frames, FRAME_HEADER_SIZE))?;
			offset += buf.len();
			let mut frames = Vec::with_capacity(header.num_frames as usize);
			for _ in 0..header.num_frames {
				frames.push(FrameHeader::read(&mut buf)?);
			}

			let vertex_len = attributes.iter().try_fold(0usize, |acc, a| {
				acc.checked_add(a.span(header.num_vertices)?)
			});
			let vertex_data = blob.section("vertex data", offset, vertex_len)?.to_vec();
			offset += vertex_data.len();

			let mut indices = Indices::None;
			if header.num_indices != 0 {
				if header.index_type == IndexType::None {
					log::warn!("Index type missing for {} indices, assuming 32-bit indices",
						header.num_indices);
					header.index_type = IndexType::U32;
				}

				let mut buf = blob.section("index data", offset,
					span(header.num_indices, header.index_type.element_size()))?;
				offset += buf.len();
				indices = match header.index_type {
					IndexType::U16 => {
						let mut v = vec![0; header.num_indices as usize];
						buf.read_u16_into::<LE>(&mut v)?;
						Indices::U16(v)
					},
					_ => {
						let mut v = vec![0; header.num_indices as usize];
						buf.read_u32_into::<LE>(&mut v)?;
						Indices::U32(v)
					},
				};
			}

			let mut materials = vec![];
			if header.num_materials != 0 {
				let mut buf = blob.section("materials", offset,
					span(header.num_materials, MATERIAL_SIZE))?;
				offset += buf.len();
				materials.reserve_exact(header.num_materials as usize);
				for _ in 0..header.num_materials {
					materials.push(read_material(&mut buf)?);
				}
			}

			let num_chunks = match header.shape() {
				HeaderShape::Legacy => header.num_chunks as usize,
				HeaderShape::Current => {
					let trailing = data.len().saturating_sub(offset);
					if trailing % RENDER_CHUNK_SIZE != 0 {
						debug!("Ignoring {} trailing bytes", trailing % RENDER_CHUNK_SIZE);
					}
					trailing / RENDER_CHUNK_SIZE
				},
			};
			let chunk_len = num_chunks.checked_mul(RENDER_CHUNK_SIZE);
			let mut buf = blob.section("render chunks", offset, chunk_len)?;
			let mut chunks = Vec::with_capacity(num_chunks);
			for _ in 0..num_chunks {
				chunks.push(RenderChunk::read(&mut buf)?);
			}

			debug!("Read VBM model '{}': {} attributes, {} frames, {} vertices, {} indices, {} materials, {} chunks",
				header.name, attributes.len(), frames.len(), header.num_vertices, indices.len(),
				materials.len(), chunks.len());

			Ok(VbmModel {
				header: header,
				attributes: attributes,
				frames: frames,
				vertex_data: vertex_data,
				indices: indices,
				materials: materials,
				chunks: chunks,
			})
		}

		/// Reads and parses a VBM file from disk
		pub fn open<P>(path: P) -> Result<VbmModel, VbmImportError>
		where
			P: AsRef<Path>,
		{
			let data = fs::read(path)?;
			VbmModel::read(&data)
		}
	}

}

#[cfg(feature = "export")]
pub mod export {
	use std::io::Write;

	use super::*;

	impl VbmModel {
		/// Writes the model in file order: header, attribute headers, frame headers, vertex data,
		/// index data, materials, render chunks
		pub fn write<W>(&self, buf: &mut W) -> io::Result<()>
		where
			W: Write,
		{
			self.header.write(buf)?;

			for attr in self.attributes.iter() {
				attr.write(buf)?;
			}

			for frame in self.frames.iter() {
				frame.write(buf)?;
			}

			buf.write_all(&self.vertex_data)?;
			buf.write_all(&self.indices.to_bytes())?;

			for mat in self.materials.iter() {
				write_material(mat, buf)?;
			}

			for chunk in self.chunks.iter() {
				chunk.write(buf)?;
			}

			Ok(())
		}

		pub fn to_bytes(&self) -> io::Result<Vec<u8>> {
			let mut out = vec![];
			self.write(&mut out)?;
			Ok(out)
		}
	}

	#[cfg(all(test, feature = "import"))]
	mod tests {
		use ultraviolet::vec::Vec3;
		use vbmkit_core::scene::Material;

		use super::*;

		fn model(shape: HeaderShape) -> VbmModel {
			let mut mat = Material::new("steel");
			mat.specular = Vec3::new(0.5, 0.25, 1.0);
			mat.shininess = 32.0;
			mat.diffuse_map = "textures/steel.dds".to_string();
			mat.normal_map = "textures/steel_n.dds".to_string();

			let mut header = Header::new(shape);
			header.name = "cube".to_string();
			header.num_attribs = 1;
			header.num_frames = 1;
			if shape == HeaderShape::Legacy {
				header.num_chunks = 1;
			}
			header.num_vertices = 3;
			header.num_materials = 1;
			header.flags = VbmFlags::HAS_VERTICES | VbmFlags::HAS_FRAMES | VbmFlags::HAS_MATERIALS;

			VbmModel {
				header: header,
				attributes: vec![AttribHeader::new("position", 2)],
				frames: vec![FrameHeader { first: 0, count: 3, flags: 0 }],
				vertex_data: (0..6).flat_map(|i| (i as f32).to_le_bytes()).collect(),
				indices: Indices::None,
				materials: vec![mat],
				chunks: vec![RenderChunk { material_index: 0, first: 0, count: 3 }],
			}
		}

		#[test]
		fn test_layout_sizes() {
			let m = model(HeaderShape::Current);
			let data = m.to_bytes().unwrap();

			assert_eq!(100 + 76 + 12 + 24 + 364 + 12, data.len());
			assert_eq!(&b"SBM1"[..], &data[0..4]);
		}

		#[test]
		fn test_write_read() {
			for shape in [HeaderShape::Current, HeaderShape::Legacy] {
				let m = model(shape);
				let read = VbmModel::read(&m.to_bytes().unwrap()).unwrap();

				assert_eq!(m, read);
			}
		}

		#[test]
		fn test_legacy_layout() {
			let data = model(HeaderShape::Legacy).to_bytes().unwrap();

			assert_eq!(&b"SBM0"[..], &data[0..4]);
			assert_eq!(104 + 76 + 12 + 24 + 364 + 12, data.len());
		}

		#[test]
		fn test_index_bytes() {
			assert_eq!(vec![1, 0, 0x34, 0x12], Indices::U16(vec![1, 0x1234]).to_bytes());
			assert_eq!(vec![2, 0, 0, 0, 0x78, 0x56, 0x34, 0x12], Indices::U32(vec![2, 0x12345678]).to_bytes());
			assert!(Indices::None.to_bytes().is_empty());
		}
	}
}
