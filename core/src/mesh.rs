use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

/// Hard cap on vertices per mesh group, set by the 16-bit index buffers
pub const MAX_GROUP_VERTICES: usize = 65535;

pub const DEFAULT_SHADER: &str = "buildings_lmap";
pub const DEFAULT_NEAR_RANGE: f32 = 0.0;
pub const DEFAULT_FAR_RANGE: f32 = 100.0;

/// Shader names observed across the retail asset set
pub static KNOWN_SHADERS: &[&str] = &[
	"buildings_lmap",
	"equipment_base",
	"vegetation_base",
	"vegetation_lmap",
	"character_base",
	"terrain_base",
	"decal_base",
	"water_base",
	"particle_base",
	"character_dx",
	"buildings_base",
];

/// One vertex of a mesh group. The `normal_w`/`tangent_w` bytes are the opaque
/// fourth components of the packed normal/tangent and are round-tripped verbatim.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshVertex {
	pub position: Vec3,
	pub normal: Vec3,
	pub tangent: Vec3,
	pub normal_w: u8,
	pub tangent_w: u8,
	pub uv0: Vec2,
	pub uv1: Vec2,
}

impl MeshVertex {
	pub fn new(position: Vec3) -> MeshVertex {
		MeshVertex {
			position: position,
			normal: Vec3::unit_z(),
			tangent: Vec3::unit_x(),
			normal_w: 255,
			tangent_w: 255,
			uv0: Vec2::zero(),
			uv1: Vec2::zero(),
		}
	}
}

/// Engine-facing material parameters carried by a shader node
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
	pub name: String,
	pub shader: String,
	pub tex_diffuse: String,
	pub tex_bump: String,
	pub tex_lightmap: String,
	pub dest_color: Vec4,
	pub spec_color: Vec4,
	pub alpha: f32,
	pub near_range: f32,
	pub far_range: f32,
}

impl Default for Material {
	fn default() -> Material {
		Material {
			name: "default".to_string(),
			shader: DEFAULT_SHADER.to_string(),
			tex_diffuse: String::new(),
			tex_bump: String::new(),
			tex_lightmap: String::new(),
			dest_color: Vec4::new(0.5, 0.5, 0.5, 1.0),
			spec_color: Vec4::new(0.5, 0.5, 0.5, 16.0),
			alpha: 1.0,
			near_range: DEFAULT_NEAR_RANGE,
			far_range: DEFAULT_FAR_RANGE,
		}
	}
}

/// One material-contiguous sub-mesh
#[derive(Clone, Debug, PartialEq)]
pub struct MeshGroup {
	pub name: String,
	pub vertex_format: i32,
	pub vertices: Vec<MeshVertex>,
	pub triangles: Vec<[u16; 3]>,
	pub material: Material,
}

impl Default for MeshGroup {
	fn default() -> MeshGroup {
		MeshGroup {
			name: String::new(),
			vertex_format: 1,
			vertices: vec![],
			triangles: vec![],
			material: Material::default(),
		}
	}
}

impl MeshGroup {
	/// Number of indices in the triangle list (three per triangle)
	pub fn index_count(&self) -> u32 {
		(self.triangles.len() * 3) as u32
	}

	/// Axis-aligned bounds over all vertex positions
	pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
		let first = self.vertices.first()?.position;
		let mut lo = first;
		let mut hi = first;

		for v in self.vertices.iter() {
			let p = v.position;
			lo = Vec3::new(lo.x.min(p.x), lo.y.min(p.y), lo.z.min(p.z));
			hi = Vec3::new(hi.x.max(p.x), hi.y.max(p.y), hi.z.max(p.z));
		}

		Some((lo, hi))
	}
}

/// Collects each distinct material once, in first-appearance order
pub fn unique_materials(groups: &[MeshGroup]) -> Vec<&Material> {
	let mut seen: Vec<&str> = vec![];
	let mut materials = vec![];

	for group in groups.iter() {
		if !seen.contains(&group.material.name.as_str()) {
			seen.push(group.material.name.as_str());
			materials.push(&group.material);
		}
	}

	materials
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::Vec3;

	use super::*;

	#[test]
	fn test_bounds() {
		let mut group = MeshGroup::default();
		assert_eq!(group.bounds(), None);

		group.vertices.push(MeshVertex::new(Vec3::new(1.0, -2.0, 3.0)));
		group.vertices.push(MeshVertex::new(Vec3::new(-1.0, 5.0, 0.0)));
		group.vertices.push(MeshVertex::new(Vec3::new(0.0, 0.0, -7.0)));

		let (lo, hi) = group.bounds().unwrap();
		assert_eq!(lo, Vec3::new(-1.0, -2.0, -7.0));
		assert_eq!(hi, Vec3::new(1.0, 5.0, 3.0));
	}

	#[test]
	fn test_unique_materials() {
		let mut a = MeshGroup::default();
		a.material.name = "stone".to_string();
		let mut b = MeshGroup::default();
		b.material.name = "wood".to_string();
		let mut c = MeshGroup::default();
		c.material.name = "stone".to_string();

		let groups = [a, b, c];
		let materials = unique_materials(&groups);
		assert_eq!(materials.len(), 2);
		assert_eq!(materials[0].name, "stone");
		assert_eq!(materials[1].name, "wood");
	}

	#[test]
	fn test_index_count() {
		let mut group = MeshGroup::default();
		group.triangles = vec![[0, 1, 2]; 100];
		assert_eq!(group.index_count(), 300);
	}
}
