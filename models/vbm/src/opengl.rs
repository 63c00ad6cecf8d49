//! [`GraphicsContext`] backed by the current OpenGL context, through the `gl` crate.

use std::ffi::c_void;

use gl::types::*;

use crate::context::{
	AttribBinding,
	BufferId,
	BufferTarget,
	DrawCall,
	GraphicsContext,
	TextureId,
	VertexArrayId
};

// OpenGL keeps its context in thread-locals,
// so only the version is stored here.
pub struct GlContext {
	pub major: i32,
	pub minor: i32,
}

impl GlContext {
	/// Loads the GL function pointers and queries the context version.
	///
	/// # Safety
	/// A context must be current on this thread, and `loader` must return valid function
	/// pointers for it. The returned value must only be used on this thread.
	pub unsafe fn load_with<F>(loader: F) -> GlContext
	where
		F: FnMut(&'static str) -> *const c_void,
	{
		gl::load_with(loader);

		let mut major = 0;
		let mut minor = 0;
		gl::GetIntegerv(gl::MAJOR_VERSION, &mut major);
		gl::GetIntegerv(gl::MINOR_VERSION, &mut minor);
		log::debug!("OpenGL {}.{}", major, minor);

		GlContext {
			major: major,
			minor: minor,
		}
	}
}

fn gl_target(target: BufferTarget) -> GLenum {
	match target {
		BufferTarget::Vertex => gl::ARRAY_BUFFER,
		BufferTarget::Index => gl::ELEMENT_ARRAY_BUFFER,
	}
}

impl GraphicsContext for GlContext {
	fn create_vertex_array(&mut self) -> VertexArrayId {
		let mut vao = 0;
		unsafe { gl::GenVertexArrays(1, &mut vao) };
		VertexArrayId(vao)
	}

	fn bind_vertex_array(&mut self, vao: Option<VertexArrayId>) {
		unsafe { gl::BindVertexArray(vao.map_or(0, |v| v.0)) };
	}

	fn create_buffer(&mut self, target: BufferTarget, data: &[u8]) -> BufferId {
		let mut buffer = 0;
		unsafe {
			gl::GenBuffers(1, &mut buffer);
			gl::BindBuffer(gl_target(target), buffer);
			gl::BufferData(gl_target(target), data.len() as GLsizeiptr, data.as_ptr() as *const c_void,
				gl::STATIC_DRAW);
		}
		BufferId(buffer)
	}

	fn vertex_attrib_pointer(&mut self, binding: &AttribBinding) {
		unsafe {
			gl::VertexAttribPointer(binding.slot, binding.components as GLint, binding.element_type,
				gl::FALSE, 0, binding.offset as *const c_void);
			gl::EnableVertexAttribArray(binding.slot);
		}
	}

	fn bind_texture(&mut self, unit: u32, texture: Option<TextureId>) {
		unsafe {
			gl::ActiveTexture(gl::TEXTURE0 + unit);
			gl::BindTexture(gl::TEXTURE_2D, texture.map_or(0, |t| t.0));
		}
	}

	fn draw(&mut self, call: DrawCall) {
		unsafe {
			match call {
				DrawCall::Arrays { first, count, instances: 0 } =>
					gl::DrawArrays(gl::TRIANGLES, first as GLint, count as GLsizei),
				DrawCall::Arrays { first, count, instances } =>
					gl::DrawArraysInstanced(gl::TRIANGLES, first as GLint, count as GLsizei,
						instances as GLsizei),
				DrawCall::Elements { count, index_type, byte_offset, instances: 0 } =>
					gl::DrawElements(gl::TRIANGLES, count as GLsizei, index_type as GLenum,
						byte_offset as *const c_void),
				DrawCall::Elements { count, index_type, byte_offset, instances } =>
					gl::DrawElementsInstanced(gl::TRIANGLES, count as GLsizei, index_type as GLenum,
						byte_offset as *const c_void, instances as GLsizei),
			}
		}
	}

	fn delete_buffer(&mut self, buffer: BufferId) {
		unsafe { gl::DeleteBuffers(1, &buffer.0) };
	}

	fn delete_vertex_array(&mut self, vao: VertexArrayId) {
		unsafe { gl::DeleteVertexArrays(1, &vao.0) };
	}
}
