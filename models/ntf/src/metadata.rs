use base64::{
	prelude::BASE64_STANDARD,
	Engine
};

use serde::{
	Deserialize,
	Serialize
};

use crate::{
	mesh,
	NtfError,
	skeleton
};

use crate::tree::{
	CHILD_MESH,
	CHILD_SHADER,
	Node,
	Tree
};

/// Sidecar record written next to an exported model. Everything except
/// `raw_ntf_skeleton` is redundant, kept for human inspection; only the
/// skeleton blob is read back on injection.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Metadata {
	pub toolkit_version: String,
	pub source_file: String,
	pub mesh_count: usize,
	pub total_vertices: u64,
	pub total_triangles: u64,
	pub meshes: Vec<MeshSummary>,
	pub locator: Option<LocatorSummary>,
	pub ani_file_name: String,
	pub raw_ntf_skeleton: String,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MeshSummary {
	pub name: String,
	pub vertex_count: u32,
	pub face_count: u32,
	pub triangle_count: u32,
	pub vertex_format: i32,
	pub shader: ShaderSummary,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ShaderSummary {
	pub shader_name: String,
	pub tex_s0: String,
	pub tex_s1: String,
	pub tex_s2: String,
	pub dest_color: Option<[f32; 4]>,
	pub spec_color: Option<[f32; 4]>,
	pub alpha: Option<f32>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct LocatorSummary {
	pub is_locator: i32,
	pub l_pos: [i32; 4],
}

impl Metadata {
	/// Builds the record for a parsed tree, embedding its skeleton
	pub fn build(tree: &Tree, source_file: &str) -> Result<Metadata, NtfError> {
		let meshes: Vec<MeshSummary> =
			tree.find_children(CHILD_MESH).into_iter().map(mesh_summary).collect();

		let locator = mesh::find_locator(tree).map(|l| LocatorSummary {
			is_locator: l.is_locator,
			l_pos: l.l_pos,
		});

		let ani = match tree.find_chunk("AniFileName") {
			Some(chunk) => match &chunk.value {
				crate::tree::ChunkValue::Text(s) => s.clone(),
				_ => String::new(),
			},
			None => String::new(),
		};

		Ok(Metadata {
			toolkit_version: env!("CARGO_PKG_VERSION").to_string(),
			source_file: source_file.to_string(),
			mesh_count: meshes.len(),
			total_vertices: meshes.iter().map(|m| m.vertex_count as u64).sum(),
			total_triangles: meshes.iter().map(|m| m.triangle_count as u64).sum(),
			meshes: meshes,
			locator: locator,
			ani_file_name: ani,
			raw_ntf_skeleton: BASE64_STANDARD.encode(skeleton::emit(tree)?),
		})
	}

	/// Decodes the embedded skeleton back into a tree for re-injection
	pub fn restore_tree(&self) -> Result<Tree, NtfError> {
		let raw = BASE64_STANDARD.decode(&self.raw_ntf_skeleton)
			.map_err(|_| NtfError::CorruptNode("skeleton blob is not valid base64"))?;
		skeleton::restore(&raw)
	}

	pub fn to_json(&self) -> serde_json::Result<String> {
		serde_json::to_string_pretty(self)
	}

	pub fn from_json(json: &str) -> serde_json::Result<Metadata> {
		serde_json::from_str(json)
	}
}

fn mesh_summary(node: &Node) -> MeshSummary {
	let face_count = node.uint32("NumFaces").unwrap_or(0);

	let shader = node.children().find(|c| c.node_type == CHILD_SHADER);
	let name = shader.and_then(|s| s.text("Name"))
		.or_else(|| node.text("Name"))
		.unwrap_or_default();

	MeshSummary {
		name: name.to_string(),
		vertex_count: node.uint32("NumVertexes").unwrap_or(0),
		face_count: face_count,
		triangle_count: face_count / 3,
		vertex_format: node.int32("VertexFormat").unwrap_or(1),
		shader: shader.map(shader_summary).unwrap_or_default(),
	}
}

fn shader_summary(node: &Node) -> ShaderSummary {
	ShaderSummary {
		shader_name: node.text("ShaderName").unwrap_or_default().to_string(),
		tex_s0: node.text("TexS0").unwrap_or_default().to_string(),
		tex_s1: node.text("TexS1").unwrap_or_default().to_string(),
		tex_s2: node.text("TexS2").unwrap_or_default().to_string(),
		dest_color: node.vec4("DestColor").map(|v| [v.x, v.y, v.z, v.w]),
		spec_color: node.vec4("SpecColor").map(|v| [v.x, v.y, v.z, v.w]),
		alpha: node.float("Alpha"),
	}
}
