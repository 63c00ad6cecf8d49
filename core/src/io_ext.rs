use std::io::{
	Read,
	Result,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3
};

use crate::fit_str;

pub trait ReadBinExt: Read {
	/// Reads a NUL-padded string stored in a fixed-size field of `len` bytes
	#[inline]
	fn read_fixed_str(&mut self, len: usize) -> Result<String> {
		let mut buf = vec![0; len];
		self.read_exact(&mut buf)?;

		let end = buf.iter().position(|&b| b == 0).unwrap_or(len);

		Ok(String::from_utf8_lossy(&buf[..end]).into_owned())
	}

	/// Reads a little endian 3D vector
	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		let mut x = [0; 4];
		let mut y = x;
		let mut z = y;

		self.read_exact(&mut x)?;
		self.read_exact(&mut y)?;
		self.read_exact(&mut z)?;

		Ok(Vec3::new(f32::from_le_bytes(x), f32::from_le_bytes(y), f32::from_le_bytes(z)))
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes `s` into a fixed-size field of `len` bytes, NUL-padded.
	/// Strings that don't fit are truncated so that at least one NUL remains.
	#[inline]
	fn write_fixed_str(&mut self, s: &str, len: usize) -> Result<()> {
		let s = fit_str(s, len);
		let mut buf = vec![0; len];
		buf[..s.len()].copy_from_slice(s.as_bytes());

		self.write_all(&buf)
	}

	/// Writes a little endian 2D vector
	#[inline]
	fn write_vec2_le(&mut self, v: Vec2) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_all(&v.x.to_le_bytes())?;
		self.write_all(&v.y.to_le_bytes())?;
		self.write_all(&v.z.to_le_bytes())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}
