use ultraviolet::vec::Vec4;

pub const TAG_INT32: u8 = 17;
pub const TAG_UINT32: u8 = 18;
pub const TAG_FLOAT: u8 = 19;
pub const TAG_VEC4: u8 = 20;
pub const TAG_MAT4X4: u8 = 21;
pub const TAG_STRING: u8 = 22;
pub const TAG_RAW: u8 = 23;

pub const CHILD_SHADER: i32 = -253;
pub const CHILD_MESH: i32 = -254;
pub const CHILD_LOCATOR: i32 = 5;

/// The one chunk name whose vec4 payload holds signed integers instead of floats
pub const LPOS: &str = "LPos";

/// Typed payload of a chunk. [`ChunkValue::Vec4Int`] exists solely for the
/// "LPos" chunk; every other tag-20 payload decodes as [`ChunkValue::Vec4`].
#[derive(Clone, Debug, PartialEq)]
pub enum ChunkValue {
	Int32(i32),
	UInt32(u32),
	Float(f32),
	Vec4(Vec4),
	Vec4Int([i32; 4]),
	Mat4([f32; 16]),
	Text(String),
	Raw(Vec<u8>),
}

impl ChunkValue {
	/// The on-disk type tag this value serializes under
	pub fn tag(&self) -> u8 {
		match self {
			ChunkValue::Int32(_) => TAG_INT32,
			ChunkValue::UInt32(_) => TAG_UINT32,
			ChunkValue::Float(_) => TAG_FLOAT,
			ChunkValue::Vec4(_) => TAG_VEC4,
			ChunkValue::Vec4Int(_) => TAG_VEC4,
			ChunkValue::Mat4(_) => TAG_MAT4X4,
			ChunkValue::Text(_) => TAG_STRING,
			ChunkValue::Raw(_) => TAG_RAW,
		}
	}
}

/// A named leaf entry
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
	pub name: String,
	pub value: ChunkValue,
}

impl Chunk {
	pub fn new(name: &str, value: ChunkValue) -> Chunk {
		Chunk {
			name: name.to_string(),
			value: value,
		}
	}
}

/// One entry of a node list, in file order
#[derive(Clone, Debug, PartialEq)]
pub enum Entry {
	Chunk(Chunk),
	Child(Node),
}

/// A non-leaf entry: a typed node with its own ordered entry list
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	pub node_type: i32,
	pub entries: Vec<Entry>,
}

impl Node {
	pub fn new(node_type: i32) -> Node {
		Node {
			node_type: node_type,
			entries: vec![],
		}
	}

	pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
		chunks_in(&self.entries)
	}

	pub fn children(&self) -> impl Iterator<Item = &Node> {
		children_in(&self.entries)
	}

	pub fn children_mut(&mut self) -> impl Iterator<Item = &mut Node> {
		self.entries.iter_mut().filter_map(|e| match e {
			Entry::Child(node) => Some(node),
			_ => None,
		})
	}

	pub fn get_chunk(&self, name: &str) -> Option<&Chunk> {
		chunks_in(&self.entries).find(|c| c.name == name)
	}

	pub fn get_chunk_mut(&mut self, name: &str) -> Option<&mut Chunk> {
		self.entries.iter_mut().find_map(|e| match e {
			Entry::Chunk(chunk) if chunk.name == name => Some(chunk),
			_ => None,
		})
	}

	/// Replaces the value of an existing chunk. Never inserts, so the node's
	/// entry layout is left exactly as parsed.
	pub fn set_value(&mut self, name: &str, value: ChunkValue) -> bool {
		match self.get_chunk_mut(name) {
			Some(chunk) => {
				chunk.value = value;
				true
			},
			None => false,
		}
	}

	pub fn push_chunk(&mut self, chunk: Chunk) {
		self.entries.push(Entry::Chunk(chunk));
	}

	pub fn push_child(&mut self, node: Node) {
		self.entries.push(Entry::Child(node));
	}

	pub fn int32(&self, name: &str) -> Option<i32> {
		match self.get_chunk(name)?.value {
			ChunkValue::Int32(v) => Some(v),
			_ => None,
		}
	}

	pub fn uint32(&self, name: &str) -> Option<u32> {
		match self.get_chunk(name)?.value {
			ChunkValue::UInt32(v) => Some(v),
			_ => None,
		}
	}

	pub fn float(&self, name: &str) -> Option<f32> {
		match self.get_chunk(name)?.value {
			ChunkValue::Float(v) => Some(v),
			_ => None,
		}
	}

	pub fn vec4(&self, name: &str) -> Option<Vec4> {
		match self.get_chunk(name)?.value {
			ChunkValue::Vec4(v) => Some(v),
			_ => None,
		}
	}

	pub fn vec4i(&self, name: &str) -> Option<[i32; 4]> {
		match self.get_chunk(name)?.value {
			ChunkValue::Vec4Int(v) => Some(v),
			_ => None,
		}
	}

	pub fn text(&self, name: &str) -> Option<&str> {
		match &self.get_chunk(name)?.value {
			ChunkValue::Text(v) => Some(v.as_str()),
			_ => None,
		}
	}

	pub fn raw(&self, name: &str) -> Option<&[u8]> {
		match &self.get_chunk(name)?.value {
			ChunkValue::Raw(v) => Some(v.as_slice()),
			_ => None,
		}
	}
}

/// The root of a parsed file: a flat ordered entry list with no type of its own
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tree {
	pub entries: Vec<Entry>,
}

impl Tree {
	pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
		chunks_in(&self.entries)
	}

	pub fn children(&self) -> impl Iterator<Item = &Node> {
		children_in(&self.entries)
	}

	pub fn get_chunk(&self, name: &str) -> Option<&Chunk> {
		chunks_in(&self.entries).find(|c| c.name == name)
	}

	pub fn push_chunk(&mut self, chunk: Chunk) {
		self.entries.push(Entry::Chunk(chunk));
	}

	pub fn push_child(&mut self, node: Node) {
		self.entries.push(Entry::Child(node));
	}

	/// All nodes of the given type, in document order. Matching nodes are not
	/// descended into; mesh and shader nodes do not nest in practice.
	pub fn find_children(&self, node_type: i32) -> Vec<&Node> {
		let mut found = vec![];
		collect_children(&self.entries, node_type, &mut found);
		found
	}

	pub fn find_children_mut(&mut self, node_type: i32) -> Vec<&mut Node> {
		let mut found = vec![];
		collect_children_mut(&mut self.entries, node_type, &mut found);
		found
	}

	/// First chunk with the given name anywhere in the tree, in document order
	pub fn find_chunk(&self, name: &str) -> Option<&Chunk> {
		find_chunk_in(&self.entries, name)
	}
}

fn chunks_in(entries: &[Entry]) -> impl Iterator<Item = &Chunk> {
	entries.iter().filter_map(|e| match e {
		Entry::Chunk(chunk) => Some(chunk),
		_ => None,
	})
}

fn children_in(entries: &[Entry]) -> impl Iterator<Item = &Node> {
	entries.iter().filter_map(|e| match e {
		Entry::Child(node) => Some(node),
		_ => None,
	})
}

fn collect_children<'a>(entries: &'a [Entry], node_type: i32, out: &mut Vec<&'a Node>) {
	for entry in entries.iter() {
		if let Entry::Child(node) = entry {
			if node.node_type == node_type {
				out.push(node);
			} else {
				collect_children(&node.entries, node_type, out);
			}
		}
	}
}

fn collect_children_mut<'a>(entries: &'a mut [Entry], node_type: i32, out: &mut Vec<&'a mut Node>) {
	for entry in entries.iter_mut() {
		if let Entry::Child(node) = entry {
			if node.node_type == node_type {
				out.push(node);
			} else {
				collect_children_mut(&mut node.entries, node_type, out);
			}
		}
	}
}

fn find_chunk_in<'a>(entries: &'a [Entry], name: &str) -> Option<&'a Chunk> {
	for entry in entries.iter() {
		match entry {
			Entry::Chunk(chunk) if chunk.name == name => return Some(chunk),
			Entry::Child(node) => {
				if let Some(chunk) = find_chunk_in(&node.entries, name) {
					return Some(chunk);
				}
			},
			_ => {},
		}
	}

	None
}

/// The de-facto schema binding well-known chunk names to their tags. Used to
/// sanity-check parses and to pick tags when building trees from scratch;
/// unknown names pass through freely.
pub fn expected_tag(name: &str) -> Option<u8> {
	match name {
		"Name" | "ShaderName" | "TexS0" | "TexS1" | "TexS2" | "AniFileName" => Some(TAG_STRING),
		"NumVertexes" | "NumFaces" => Some(TAG_UINT32),
		"Vertexes" | "Faces" => Some(TAG_RAW),
		"VertexFormat" | "Type" | "IsLocator" => Some(TAG_INT32),
		"Alpha" | "NearRange" | "FarRange" => Some(TAG_FLOAT),
		"DestColor" | "SpecColor" | "LDir" | "LPos" | "BBoxMin" | "BBoxMax" | "TMin" | "TMax" => {
			Some(TAG_VEC4)
		},
		_ => None,
	}
}

/// True when a chunk's stored tag disagrees with the name schema. Informational
/// only; many chunk names are engine-private and parse regardless.
pub fn schema_mismatch(chunk: &Chunk) -> bool {
	match expected_tag(&chunk.name) {
		Some(tag) => tag != chunk.value.tag(),
		None => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn sample() -> Tree {
		let mut shader = Node::new(CHILD_SHADER);
		shader.push_chunk(Chunk::new("Name", ChunkValue::Text("stone".to_string())));

		let mut mesh = Node::new(CHILD_MESH);
		mesh.push_chunk(Chunk::new("NumVertexes", ChunkValue::UInt32(3)));
		mesh.push_child(shader);

		let mut wrapper = Node::new(-1);
		wrapper.push_child(mesh);

		let mut tree = Tree::default();
		tree.push_chunk(Chunk::new("AniFileName", ChunkValue::Text(String::new())));
		tree.push_child(wrapper);
		tree
	}

	#[test]
	fn test_find_children_recurses() {
		let tree = sample();
		let meshes = tree.find_children(CHILD_MESH);
		assert_eq!(meshes.len(), 1);
		assert_eq!(meshes[0].uint32("NumVertexes"), Some(3));

		let shaders = tree.find_children(CHILD_SHADER);
		assert_eq!(shaders.len(), 1);
		assert_eq!(shaders[0].text("Name"), Some("stone"));
	}

	#[test]
	fn test_set_value_never_inserts() {
		let mut node = Node::new(CHILD_MESH);
		node.push_chunk(Chunk::new("NumFaces", ChunkValue::UInt32(3)));

		assert!(node.set_value("NumFaces", ChunkValue::UInt32(6)));
		assert!(!node.set_value("NumVertexes", ChunkValue::UInt32(4)));
		assert_eq!(node.entries.len(), 1);
		assert_eq!(node.uint32("NumFaces"), Some(6));
	}

	#[test]
	fn test_find_chunk_document_order() {
		let tree = sample();
		assert_eq!(tree.find_chunk("Name").map(|c| &c.value),
			Some(&ChunkValue::Text("stone".to_string())));
		assert!(tree.find_chunk("Faces").is_none());
	}

	#[test]
	fn test_schema() {
		assert_eq!(expected_tag("LPos"), Some(TAG_VEC4));
		assert_eq!(expected_tag("EngineSecret"), None);

		let good = Chunk::new("NumFaces", ChunkValue::UInt32(0));
		let bad = Chunk::new("NumFaces", ChunkValue::Int32(0));
		let unknown = Chunk::new("EngineSecret", ChunkValue::Raw(vec![]));
		assert!(!schema_mismatch(&good));
		assert!(schema_mismatch(&bad));
		assert!(!schema_mismatch(&unknown));
	}
}
