//! The graphics API surface a [`VbObject`](crate::object::VbObject) needs.
//!
//! Every GPU operation goes through an explicit [`GraphicsContext`], so objects can be loaded
//! against a real OpenGL context, or against the `RecordingContext` of the `testing` feature when
//! no GPU is available.
//! Implementations are confined to the thread that owns the underlying context.

#[cfg(any(test, feature = "testing"))]
use std::collections::HashMap;

use crate::vbm::IndexType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VertexArrayId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BufferTarget {
	Vertex,
	Index,
}

/// Where a shader attribute slot finds its data in the bound vertex buffer
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AttribBinding {
	pub slot: u32,
	pub components: u32,
	/// GL element type
	pub element_type: u32,
	/// Byte offset into the vertex buffer
	pub offset: usize,
}

/// A triangle draw. `instances == 0` is a plain, non-instanced draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DrawCall {
	Arrays {
		first: u32,
		count: u32,
		instances: u32,
	},
	Elements {
		count: u32,
		index_type: IndexType,
		byte_offset: usize,
		instances: u32,
	},
}

pub trait GraphicsContext {
	fn create_vertex_array(&mut self) -> VertexArrayId;

	fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>);

	/// Creates a buffer, binds it to `target` and uploads `data` in one transfer.
	/// Index buffers are captured by the currently bound vertex array.
	fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId;

	/// Points an attribute slot into the bound vertex buffer and enables it
	fn vertex_attrib_pointer(&mut self, binding: &AttribBinding);

	fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>);

	fn draw(&mut self, call: DrawCall);

	fn delete_buffer(&mut self, buffer: BufferId);

	fn delete_vertex_array(&mut self, vao: VertexArrayId);
}

#[cfg(any(test, feature = "testing"))]
/// A GPU call captured by [`RecordingContext`]
#[derive(Clone, Debug, PartialEq)]
pub enum Call {
	CreateVertexArray(VertexArrayId),
	BindVertexArray(Option<VertexArrayId>),
	CreateBuffer {
		buffer: BufferId,
		target: BufferTarget,
		len: usize,
	},
	VertexAttribPointer(AttribBinding),
	BindTexture {
		unit: u32,
		texture: Option<TextureId>,
	},
	Draw(DrawCall),
	DeleteBuffer(BufferId),
	DeleteVertexArray(VertexArrayId),
}

#[cfg(any(test, feature = "testing"))]
/// Headless context that records calls and keeps uploaded buffer contents
#[derive(Clone, Debug, Default)]
pub struct RecordingContext {
	pub calls: Vec<Call>,
	/// Live buffers and their contents
	pub buffers: HashMap<BufferId, (BufferTarget, Vec<u8>)>,
	/// Live vertex arrays
	pub vertex_arrays: Vec<VertexArrayId>,
	next_id: u32,
}

#[cfg(any(test, feature = "testing"))]
impl RecordingContext {
	pub fn new() -> RecordingContext {
		RecordingContext::default()
	}

	fn gen_id(&mut self) -> u32 {
		self.next_id += 1;
		self.next_id
	}

	/// Returns the draw calls issued so far
	pub fn draws(&self) -> Vec<DrawCall> {
		self.calls.iter()
			.filter_map(|c| match c {
				Call::Draw(d) => Some(*d),
				_ => None,
			})
			.collect()
	}

	/// Returns every attribute binding issued so far
	pub fn bindings(&self) -> Vec<AttribBinding> {
		self.calls.iter()
			.filter_map(|c| match c {
				Call::VertexAttribPointer(b) => Some(*b),
				_ => None,
			})
			.collect()
	}

	/// Whether any GPU object is still alive
	pub fn has_live_objects(&self) -> bool {
		!self.buffers.is_empty() || !self.vertex_arrays.is_empty()
	}
}

#[cfg(any(test, feature = "testing"))]
impl GraphicsContext for RecordingContext {
	fn create_vertex_array(&mut self) -> VertexArrayId {
		let vao = VertexArrayId(self.gen_id());
		self.vertex_arrays.push(vao);
		self.calls.push(Call::CreateVertexArray(vao));
		vao
	}

	fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
		self.calls.push(Call::BindVertexArray(vao));
	}

	fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId {
		let buffer = BufferId(self.gen_id());
		self.buffers.insert(buffer, (target, data.to_vec()));
		self.calls.push(Call::CreateBuffer {
			buffer: buffer,
			target: target,
			len: data.len(),
		});
		buffer
	}

	fn vertex_attrib_pointer(&mut self, binding: &AttribBinding) {
		self.calls.push(Call::VertexAttribPointer(*binding));
	}

	fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
		self.calls.push(Call::BindTexture {
			unit: unit,
			texture: texture,
		});
	}

	fn draw(&mut self, call: DrawCall) {
		self.calls.push(Call::Draw(call));
	}

	fn delete_buffer(&mut self, buffer: BufferId) {
		self.buffers.remove(&buffer);
		self.calls.push(Call::DeleteBuffer(buffer));
	}

	fn delete_vertex_array(&mut self, vao: VertexArrayId) {
		self.vertex_arrays.retain(|v| *v != vao);
		self.calls.push(Call::DeleteVertexArray(vao));
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_recording() {
		let mut ctx = RecordingContext::new();
		let vao = ctx.create_vertex_array();
		let buf = ctx.create_buffer(BufferTarget::Vertex, &[1, 2, 3, 4]);

		assert_ne!(vao.0, buf.0);
		assert!(ctx.has_live_objects());
		assert_eq!(Some(&(BufferTarget::Vertex, vec![1, 2, 3, 4])), ctx.buffers.get(&buf));

		ctx.delete_buffer(buf);
		ctx.delete_vertex_array(vao);
		assert!(!ctx.has_live_objects());
		assert_eq!(4, ctx.calls.len());
	}
}
