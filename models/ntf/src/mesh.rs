use ultraviolet::vec::{
	Vec3,
	Vec4
};

use ntfkit_core::mesh::{
	Material,
	MeshGroup,
	MAX_GROUP_VERTICES
};

use crate::{
	NtfError,
	vertex
};

use crate::tree::*;

/// Locator data from a child of type 5
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Locator {
	pub is_locator: i32,
	pub l_pos: [i32; 4],
	pub l_dir: Vec4,
}

/// One texture slot reference found on a shader node
#[derive(Clone, Debug, PartialEq)]
pub struct TextureRef {
	pub shader: String,
	pub slot: String,
	pub texture: String,
}

/// Decodes every mesh group in the tree, in document order
pub fn extract_mesh_groups(tree: &Tree) -> Result<Vec<MeshGroup>, NtfError> {
	tree.find_children(CHILD_MESH).into_iter().map(read_mesh_group).collect()
}

fn read_mesh_group(node: &Node) -> Result<MeshGroup, NtfError> {
	let format = node.int32("VertexFormat").ok_or(NtfError::MissingRequiredChunk("VertexFormat"))?;
	if format != vertex::VERTEX_FORMAT {
		return Err(NtfError::UnsupportedVertexFormat(format));
	}

	let num_vertices = node.uint32("NumVertexes").ok_or(NtfError::MissingRequiredChunk("NumVertexes"))?;
	let num_faces = node.uint32("NumFaces").ok_or(NtfError::MissingRequiredChunk("NumFaces"))?;
	let raw_vertices = node.raw("Vertexes").ok_or(NtfError::MissingRequiredChunk("Vertexes"))?;
	let raw_faces = node.raw("Faces").ok_or(NtfError::MissingRequiredChunk("Faces"))?;

	let shader = node.children().find(|c| c.node_type == CHILD_SHADER)
		.ok_or(NtfError::MissingRequiredChunk("Shader"))?;
	let material = read_material(shader);

	let name = match node.text("Name") {
		Some(name) if !name.is_empty() => name.to_string(),
		_ => material.name.clone(),
	};

	Ok(MeshGroup {
		name: name,
		vertex_format: format,
		vertices: vertex::decode_vertices(raw_vertices, num_vertices)?,
		triangles: vertex::decode_triangles(raw_faces, num_faces)?,
		material: material,
	})
}

/// Reads the standard shader fields; anything else on the node is left alone
pub fn read_material(node: &Node) -> Material {
	let mut material = Material::default();

	if let Some(v) = node.text("Name") {
		material.name = v.to_string();
	}
	if let Some(v) = node.text("ShaderName") {
		material.shader = v.to_string();
	}
	if let Some(v) = node.text("TexS0") {
		material.tex_diffuse = v.to_string();
	}
	if let Some(v) = node.text("TexS1") {
		material.tex_bump = v.to_string();
	}
	if let Some(v) = node.text("TexS2") {
		material.tex_lightmap = v.to_string();
	}
	if let Some(v) = node.vec4("DestColor") {
		material.dest_color = v;
	}
	if let Some(v) = node.vec4("SpecColor") {
		material.spec_color = v;
	}
	if let Some(v) = node.float("Alpha") {
		material.alpha = v;
	}
	if let Some(v) = node.float("NearRange") {
		material.near_range = v;
	}
	if let Some(v) = node.float("FarRange") {
		material.far_range = v;
	}

	material
}

/// Writes the standard shader fields back, touching only chunks that exist
pub fn write_material(node: &mut Node, material: &Material) {
	node.set_value("Name", ChunkValue::Text(material.name.clone()));
	node.set_value("ShaderName", ChunkValue::Text(material.shader.clone()));
	node.set_value("TexS0", ChunkValue::Text(material.tex_diffuse.clone()));
	node.set_value("TexS1", ChunkValue::Text(material.tex_bump.clone()));
	node.set_value("TexS2", ChunkValue::Text(material.tex_lightmap.clone()));
	node.set_value("DestColor", ChunkValue::Vec4(material.dest_color));
	node.set_value("SpecColor", ChunkValue::Vec4(material.spec_color));
	node.set_value("Alpha", ChunkValue::Float(material.alpha));
	node.set_value("NearRange", ChunkValue::Float(material.near_range));
	node.set_value("FarRange", ChunkValue::Float(material.far_range));
}

/// Overwrites the geometry of the tree's mesh groups, matched by position.
///
/// Validation runs before any mutation, so the tree is untouched on error.
/// Bounding boxes are refreshed where BBox/TMin/TMax chunks already exist;
/// chunks are never inserted, which keeps a restored skeleton's layout intact.
pub fn inject_mesh_groups(tree: &mut Tree, groups: &[MeshGroup]) -> Result<(), NtfError> {
	{
		let nodes = tree.find_children(CHILD_MESH);
		if nodes.len() != groups.len() {
			return Err(NtfError::SkeletonMismatch {
				skeleton: nodes.len(),
				supplied: groups.len(),
			});
		}

		for (node, group) in nodes.iter().zip(groups.iter()) {
			if group.vertices.len() > MAX_GROUP_VERTICES {
				return Err(NtfError::TooManyVertices(group.vertices.len()));
			}
			for name in ["NumVertexes", "NumFaces", "Vertexes", "Faces"] {
				if node.get_chunk(name).is_none() {
					return Err(NtfError::MissingRequiredChunk(name));
				}
			}
			if !node.children().any(|c| c.node_type == CHILD_SHADER) {
				return Err(NtfError::MissingRequiredChunk("Shader"));
			}
		}
	}

	for (node, group) in tree.find_children_mut(CHILD_MESH).into_iter().zip(groups.iter()) {
		let mut raw_vertices = vec![];
		vertex::encode_vertices(&group.vertices, &mut raw_vertices)?;
		let mut raw_faces = vec![];
		vertex::encode_triangles(&group.triangles, &mut raw_faces)?;

		set_count(node, "NumVertexes", group.vertices.len() as u32);
		set_count(node, "NumFaces", group.index_count());
		node.set_value("Vertexes", ChunkValue::Raw(raw_vertices));
		node.set_value("Faces", ChunkValue::Raw(raw_faces));

		if let Some((lo, hi)) = group.bounds() {
			set_bounds(node, lo, hi);
		}

		if let Some(shader) = node.children_mut().find(|c| c.node_type == CHILD_SHADER) {
			write_material(shader, &group.material);
		}
	}

	Ok(())
}

// Counts are uint32 per the schema, but the variant of an off-schema file is kept
fn set_count(node: &mut Node, name: &str, value: u32) {
	if let Some(chunk) = node.get_chunk_mut(name) {
		chunk.value = match chunk.value {
			ChunkValue::Int32(_) => ChunkValue::Int32(value as i32),
			_ => ChunkValue::UInt32(value),
		};
	}
}

fn set_bounds(node: &mut Node, lo: Vec3, hi: Vec3) {
	let lo = Vec4::new(lo.x, lo.y, lo.z, 1.0);
	let hi = Vec4::new(hi.x, hi.y, hi.z, 1.0);

	for name in ["BBoxMin", "TMin"] {
		node.set_value(name, ChunkValue::Vec4(lo));
	}
	for name in ["BBoxMax", "TMax"] {
		node.set_value(name, ChunkValue::Vec4(hi));
	}
}

/// First locator child in the tree, if any
pub fn find_locator(tree: &Tree) -> Option<Locator> {
	let node = tree.find_children(CHILD_LOCATOR).into_iter().next()?;

	Some(Locator {
		is_locator: node.int32("IsLocator").unwrap_or(1),
		l_pos: node.vec4i("LPos").unwrap_or([0; 4]),
		l_dir: node.vec4("LDir").unwrap_or_else(Vec4::zero),
	})
}

/// All shader nodes in the tree, in document order
pub fn find_shaders(tree: &Tree) -> Vec<&Node> {
	tree.find_children(CHILD_SHADER)
}

/// Every populated texture slot across all shader nodes
pub fn texture_refs(tree: &Tree) -> Vec<TextureRef> {
	let mut refs = vec![];

	for shader in find_shaders(tree) {
		let name = shader.text("Name").unwrap_or_default();
		for slot in ["TexS0", "TexS1", "TexS2"] {
			if let Some(texture) = shader.text(slot) {
				if !texture.is_empty() {
					refs.push(TextureRef {
						shader: name.to_string(),
						slot: slot.to_string(),
						texture: texture.to_string(),
					});
				}
			}
		}
	}

	refs
}
