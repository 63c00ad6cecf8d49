use log::{
	debug,
	warn
};

use ultraviolet::vec::Vec3;
use vbmkit_core::scene::Material;

use crate::{
	context::{
		AttribBinding,
		BufferId,
		BufferTarget,
		DrawCall,
		GraphicsContext,
		TextureId,
		VertexArrayId
	},
	vbm::*
};

/// Shader attribute slots for the first three attributes of a file
/// (position, normal, texcoord). Later attributes use their own index as slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadCfg {
	pub vertex_slot: u32,
	pub normal_slot: u32,
	pub texcoord_slot: u32,
}

impl Default for LoadCfg {
	fn default() -> Self {
		Self {
			vertex_slot: 0,
			normal_slot: 1,
			texcoord_slot: 2,
		}
	}
}

impl LoadCfg {
	pub fn new(vertex_slot: u32, normal_slot: u32, texcoord_slot: u32) -> LoadCfg {
		LoadCfg {
			vertex_slot: vertex_slot,
			normal_slot: normal_slot,
			texcoord_slot: texcoord_slot,
		}
	}

	/// Returns the shader slot for the attribute at `index` in the file
	pub fn slot(&self, index: usize) -> u32 {
		match index {
			0 => self.vertex_slot,
			1 => self.normal_slot,
			2 => self.texcoord_slot,
			_ => index as u32,
		}
	}
}

/// Textures attached to a material after loading
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MaterialTextures {
	pub diffuse: Option<TextureId>,
	pub specular: Option<TextureId>,
	pub normal: Option<TextureId>,
}

/// A VBM model uploaded to the GPU.
///
/// Owns its vertex array and buffers; they are released by [`VbObject::free`], which must be
/// called with the context the object was uploaded with.
#[derive(Debug, Default)]
pub struct VbObject {
	vao: Option<VertexArrayId>,
	attribute_buffer: Option<BufferId>,
	index_buffer: Option<BufferId>,
	header: Header,
	attributes: Vec<AttribHeader>,
	bindings: Vec<AttribBinding>,
	frames: Vec<FrameHeader>,
	materials: Vec<Material>,
	material_textures: Vec<MaterialTextures>,
	chunks: Vec<RenderChunk>,
}

impl VbObject {
	/// Reads, parses and uploads a VBM file. Nothing is allocated on the GPU if parsing fails.
	#[cfg(feature = "import")]
	pub fn load<C, P>(ctx: &mut C, path: P, cfg: &LoadCfg) -> Result<VbObject, import::VbmImportError>
	where
		C: GraphicsContext + ?Sized,
		P: AsRef<std::path::Path>,
	{
		let path = path.as_ref();
		debug!("Loading VBM model {}", path.display());

		let model = VbmModel::open(path)?;

		Ok(VbObject::upload(ctx, &model, cfg))
	}

	/// Uploads a parsed model: the whole vertex data block as one buffer, and the index data as
	/// another if the model is indexed. Attribute 0, 1 and 2 are bound to the slots in `cfg`.
	pub fn upload<C>(ctx: &mut C, model: &VbmModel, cfg: &LoadCfg) -> VbObject
	where
		C: GraphicsContext + ?Sized,
	{
		let vao = ctx.create_vertex_array();
		ctx.bind_vertex_array(Some(vao));
		let attribute_buffer = ctx.create_buffer(BufferTarget::Vertex, &model.vertex_data);

		let mut bindings = Vec::with_capacity(model.attributes.len());
		let mut offset = 0;
		for (i, attr) in model.attributes.iter().enumerate() {
			let binding = AttribBinding {
				slot: cfg.slot(i),
				components: attr.components,
				element_type: attr.element_type,
				offset: offset,
			};
			ctx.vertex_attrib_pointer(&binding);
			bindings.push(binding);
			offset += attr.span(model.header.num_vertices).unwrap_or(0);
		}

		let mut index_buffer = None;
		if model.header.num_indices != 0 {
			index_buffer = Some(ctx.create_buffer(BufferTarget::Index, &model.indices.to_bytes()));
		}

		ctx.bind_vertex_array(None);

		debug!("Uploaded '{}': {} vertex bytes, {} indices", model.header.name, model.vertex_data.len(),
			model.indices.len());

		VbObject {
			vao: Some(vao),
			attribute_buffer: Some(attribute_buffer),
			index_buffer: index_buffer,
			header: model.header.clone(),
			attributes: model.attributes.clone(),
			bindings: bindings,
			frames: model.frames.clone(),
			materials: model.materials.clone(),
			material_textures: vec![MaterialTextures::default(); model.materials.len()],
			chunks: model.chunks.clone(),
		}
	}

	/// Draws a frame's range, instanced if `instances` is non-zero.
	/// Does nothing if the frame doesn't exist. Frame ranges are not checked against buffer sizes.
	pub fn render<C>(&self, ctx: &mut C, frame_index: u32, instances: u32)
	where
		C: GraphicsContext + ?Sized,
	{
		let frame = match self.frames.get(frame_index as usize) {
			Some(frame) => *frame,
			None => return,
		};

		ctx.bind_vertex_array(self.vao);
		ctx.draw(self.draw_call(frame.first, frame.count, instances));
		ctx.bind_vertex_array(None);
	}

	/// Draws every render chunk with its material's textures bound:
	/// diffuse to unit 0, specular to unit 1, normal to unit 2
	pub fn render_chunks<C>(&self, ctx: &mut C, instances: u32)
	where
		C: GraphicsContext + ?Sized,
	{
		if self.chunks.is_empty() {
			return;
		}

		ctx.bind_vertex_array(self.vao);
		for chunk in self.chunks.iter() {
			let textures = self.material_textures.get(chunk.material_index as usize)
				.copied()
				.unwrap_or_default();

			ctx.bind_texture(2, textures.normal);
			ctx.bind_texture(1, textures.specular);
			ctx.bind_texture(0, textures.diffuse);
			ctx.draw(self.draw_call(chunk.first, chunk.count, instances));
		}
		ctx.bind_vertex_array(None);
	}

	fn draw_call(&self, first: u32, count: u32, instances: u32) -> DrawCall {
		if self.header.num_indices != 0 {
			DrawCall::Elements {
				count: count,
				index_type: self.header.index_type,
				byte_offset: first as usize * self.header.index_type.element_size(),
				instances: instances,
			}
		} else {
			DrawCall::Arrays {
				first: first,
				count: count,
				instances: instances,
			}
		}
	}

	/// Releases the GPU objects and host-side descriptors.
	/// Returns whether anything was released; calling it again is a no-op.
	pub fn free<C>(&mut self, ctx: &mut C) -> bool
	where
		C: GraphicsContext + ?Sized,
	{
		let mut released = false;

		if let Some(buffer) = self.index_buffer.take() {
			ctx.delete_buffer(buffer);
			released = true;
		}
		if let Some(buffer) = self.attribute_buffer.take() {
			ctx.delete_buffer(buffer);
			released = true;
		}
		if let Some(vao) = self.vao.take() {
			ctx.delete_vertex_array(vao);
			released = true;
		}

		self.header = Header::default();
		self.attributes.clear();
		self.bindings.clear();
		self.frames.clear();
		self.materials.clear();
		self.material_textures.clear();
		self.chunks.clear();

		released
	}

	/// Binds the vertex array, e.g. to attach more (instanced) attributes to it
	pub fn bind_vertex_array<C>(&self, ctx: &mut C)
	where
		C: GraphicsContext + ?Sized,
	{
		ctx.bind_vertex_array(self.vao);
	}

	pub fn vertex_array(&self) -> Option<VertexArrayId> {
		self.vao
	}

	pub fn header(&self) -> &Header {
		&self.header
	}

	pub fn is_indexed(&self) -> bool {
		self.header.num_indices != 0
	}

	/// Number of vertices (or indices) drawn by a frame, 0 if the frame doesn't exist
	pub fn vertex_count(&self, frame: u32) -> u32 {
		self.frames.get(frame as usize).map_or(0, |f| f.count)
	}

	pub fn attribute_count(&self) -> u32 {
		self.attributes.len() as u32
	}

	pub fn attribute_name(&self, index: u32) -> Option<&str> {
		self.attributes.get(index as usize).map(|a| a.name.as_str())
	}

	/// The slot bindings made during upload, in file attribute order
	pub fn bindings(&self) -> &[AttribBinding] {
		&self.bindings
	}

	pub fn frame_count(&self) -> u32 {
		self.frames.len() as u32
	}

	pub fn chunks(&self) -> &[RenderChunk] {
		&self.chunks
	}

	pub fn material_count(&self) -> u32 {
		self.materials.len() as u32
	}

	pub fn material(&self, index: u32) -> Option<&Material> {
		self.materials.get(index as usize)
	}

	pub fn material_name(&self, index: u32) -> Option<&str> {
		self.material(index).map(|m| m.name.as_str())
	}

	pub fn material_ambient(&self, index: u32) -> Option<Vec3> {
		self.material(index).map(|m| m.ambient)
	}

	pub fn material_diffuse(&self, index: u32) -> Option<Vec3> {
		self.material(index).map(|m| m.diffuse)
	}

	pub fn material_diffuse_map_name(&self, index: u32) -> Option<&str> {
		self.material(index).map(|m| m.diffuse_map.as_str())
	}

	pub fn material_specular_map_name(&self, index: u32) -> Option<&str> {
		self.material(index).map(|m| m.specular_map.as_str())
	}

	pub fn material_normal_map_name(&self, index: u32) -> Option<&str> {
		self.material(index).map(|m| m.normal_map.as_str())
	}

	pub fn material_textures(&self, index: u32) -> Option<&MaterialTextures> {
		self.material_textures.get(index as usize)
	}

	/// Returns false if the material doesn't exist
	pub fn set_material_diffuse_texture(&mut self, index: u32, texture: Option<TextureId>) -> bool {
		self.material_textures.get_mut(index as usize)
			.map(|t| t.diffuse = texture)
			.is_some()
	}

	/// Returns false if the material doesn't exist
	pub fn set_material_specular_texture(&mut self, index: u32, texture: Option<TextureId>) -> bool {
		self.material_textures.get_mut(index as usize)
			.map(|t| t.specular = texture)
			.is_some()
	}

	/// Returns false if the material doesn't exist
	pub fn set_material_normal_texture(&mut self, index: u32, texture: Option<TextureId>) -> bool {
		self.material_textures.get_mut(index as usize)
			.map(|t| t.normal = texture)
			.is_some()
	}
}

impl Drop for VbObject {
	fn drop(&mut self) {
		if self.vao.is_some() {
			warn!("VbObject '{}' dropped without being freed, GPU objects leaked", self.header.name);
		}
	}
}
