use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

/// Surface description carried from a material library into a model file
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub ambient: Vec3,
	pub diffuse: Vec3,
	pub specular: Vec3,
	pub specular_exp: Vec3,
	pub shininess: f32,
	pub alpha: f32,
	pub transmission: Vec3,
	pub ior: f32,
	pub ambient_map: String,
	pub diffuse_map: String,
	pub specular_map: String,
	pub normal_map: String,
}

impl Material {
	/// Creates an opaque white material
	pub fn new(name: &str) -> Material {
		Material {
			name: name.to_string(),
			ambient: Vec3::zero(),
			diffuse: Vec3::one(),
			specular: Vec3::zero(),
			specular_exp: Vec3::zero(),
			shininess: 0.0,
			alpha: 1.0,
			transmission: Vec3::zero(),
			ior: 0.0,
			ambient_map: String::new(),
			diffuse_map: String::new(),
			specular_map: String::new(),
			normal_map: String::new(),
		}
	}
}

/// Indices of one triangle corner into the position, texcoord and normal lists
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Corner {
	pub position: u32,
	pub texcoord: u32,
	pub normal: u32,
}

impl Corner {
	pub fn new(position: u32, texcoord: u32, normal: u32) -> Corner {
		Corner {
			position: position,
			texcoord: texcoord,
			normal: normal,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
	pub corners: [Corner; 3],
	/// Index into [`Mesh::materials`]
	pub material: Option<usize>,
}

/// Triangle soup with separately indexed attribute lists
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
	pub name: String,
	pub positions: Vec<Vec4>,
	pub normals: Vec<Vec3>,
	pub texcoords: Vec<Vec2>,
	pub triangles: Vec<Triangle>,
	pub materials: Vec<Material>,
}

impl Mesh {
	/// Returns the index of the material with the specified name
	pub fn find_material(&self, name: &str) -> Option<usize> {
		self.materials.iter().position(|m| m.name == name)
	}

	/// Returns the name of the material assigned to a triangle, if any
	pub fn material_name(&self, tri: &Triangle) -> Option<&str> {
		tri.material
			.and_then(|i| self.materials.get(i))
			.map(|m| m.name.as_str())
	}

	/// Returns the axis-aligned bounding box (min, max) of all positions
	pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
		let first = self.positions.first()?;
		let first = Vec3::new(first.x, first.y, first.z);
		let mut min = first;
		let mut max = first;

		for p in self.positions.iter() {
			min.x = min.x.min(p.x);
			min.y = min.y.min(p.y);
			min.z = min.z.min(p.z);
			max.x = max.x.max(p.x);
			max.y = max.y.max(p.y);
			max.z = max.z.max(p.z);
		}

		Some((min, max))
	}

	/// Moves all positions so that the bounding box is centered on the origin.
	/// Returns the offset that was subtracted.
	pub fn recenter(&mut self) -> Vec3 {
		let center = match self.bounds() {
			Some((min, max)) => (min + max) * 0.5,
			None => return Vec3::zero(),
		};

		for p in self.positions.iter_mut() {
			p.x -= center.x;
			p.y -= center.y;
			p.z -= center.z;
		}

		center
	}
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::{
		Vec3,
		Vec4
	};

	use super::*;

	#[test]
	fn test_recenter() {
		let mut mesh = Mesh::default();
		mesh.positions = vec![Vec4::new(1.0, 2.0, 3.0, 1.0), Vec4::new(3.0, 6.0, -1.0, 1.0)];

		assert_eq!(Vec3::new(2.0, 4.0, 1.0), mesh.recenter());
		assert_eq!(Vec4::new(-1.0, -2.0, 2.0, 1.0), mesh.positions[0]);
		assert_eq!(Vec4::new(1.0, 2.0, -2.0, 1.0), mesh.positions[1]);
	}

	#[test]
	fn test_recenter_empty() {
		let mut mesh = Mesh::default();
		assert_eq!(None, mesh.bounds());
		assert_eq!(Vec3::zero(), mesh.recenter());
	}

	#[test]
	fn test_material_name() {
		let mut mesh = Mesh::default();
		mesh.materials.push(Material::new("brick"));
		let tri = Triangle { corners: [Corner::default(); 3], material: Some(0) };

		assert_eq!(Some("brick"), mesh.material_name(&tri));
		assert_eq!(Some(0), mesh.find_material("brick"));
		assert_eq!(None, mesh.find_material("stone"));
	}
}
