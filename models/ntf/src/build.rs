use ultraviolet::vec::Vec4;

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

/// Builds a complete model tree from mesh groups alone, with no skeleton
/// template: an empty animation reference, a default locator, then one mesh
/// child per group, each carrying its own shader child.
pub fn build_model(groups: &[MeshGroup]) -> Result<Tree, NtfError> {
	let mut tree = Tree::default();
	tree.push_chunk(Chunk::new("AniFileName", ChunkValue::Text(String::new())));
	tree.push_child(locator_node());

	for group in groups.iter() {
		tree.push_child(mesh_node(group)?);
	}

	Ok(tree)
}

/// Builds the standalone material tree written next to a model as `.mtr`
pub fn build_materials(groups: &[MeshGroup]) -> Tree {
	let mut tree = Tree::default();
	for material in ntfkit_core::mesh::unique_materials(groups) {
		tree.push_child(shader_node(material));
	}

	tree
}

fn locator_node() -> Node {
	let mut locator = Node::new(CHILD_LOCATOR);
	locator.push_chunk(Chunk::new("IsLocator", ChunkValue::Int32(1)));
	locator.push_chunk(Chunk::new("LPos", ChunkValue::Vec4Int([0; 4])));
	locator.push_chunk(Chunk::new("LDir", ChunkValue::Vec4(Vec4::zero())));
	locator
}

fn mesh_node(group: &MeshGroup) -> Result<Node, NtfError> {
	if group.vertices.len() > MAX_GROUP_VERTICES {
		return Err(NtfError::TooManyVertices(group.vertices.len()));
	}

	let mut raw_vertices = vec![];
	vertex::encode_vertices(&group.vertices, &mut raw_vertices)?;
	let mut raw_faces = vec![];
	vertex::encode_triangles(&group.triangles, &mut raw_faces)?;

	let mut node = Node::new(CHILD_MESH);
	node.push_chunk(Chunk::new("Type", ChunkValue::Int32(1)));
	node.push_chunk(Chunk::new("Name", ChunkValue::Text(group.name.clone())));
	node.push_chunk(Chunk::new("VertexFormat", ChunkValue::Int32(vertex::VERTEX_FORMAT)));
	node.push_chunk(Chunk::new("NumVertexes", ChunkValue::UInt32(group.vertices.len() as u32)));
	node.push_chunk(Chunk::new("NumFaces", ChunkValue::UInt32(group.index_count())));
	node.push_chunk(Chunk::new("Vertexes", ChunkValue::Raw(raw_vertices)));
	node.push_chunk(Chunk::new("Faces", ChunkValue::Raw(raw_faces)));
	node.push_child(shader_node(&group.material));

	Ok(node)
}

/// A shader node holding the standard material fields
pub fn shader_node(material: &Material) -> Node {
	let mut node = Node::new(CHILD_SHADER);
	node.push_chunk(Chunk::new("Name", ChunkValue::Text(material.name.clone())));
	node.push_chunk(Chunk::new("ShaderName", ChunkValue::Text(material.shader.clone())));
	node.push_chunk(Chunk::new("TexS0", ChunkValue::Text(material.tex_diffuse.clone())));
	node.push_chunk(Chunk::new("TexS1", ChunkValue::Text(material.tex_bump.clone())));
	node.push_chunk(Chunk::new("TexS2", ChunkValue::Text(material.tex_lightmap.clone())));
	node.push_chunk(Chunk::new("SpecColor", ChunkValue::Vec4(material.spec_color)));
	node.push_chunk(Chunk::new("DestColor", ChunkValue::Vec4(material.dest_color)));
	node.push_chunk(Chunk::new("Alpha", ChunkValue::Float(material.alpha)));
	node.push_chunk(Chunk::new("NearRange", ChunkValue::Float(material.near_range)));
	node.push_chunk(Chunk::new("FarRange", ChunkValue::Float(material.far_range)));
	node
}
