use crate::{
	codec,
	NtfError
};

use crate::tree::{
	Chunk,
	ChunkValue,
	Entry,
	Tree
};

/// Serializes a copy of the tree with every mesh payload blanked: Vertexes and
/// Faces become zero-length buffers and both counts drop to zero. Everything
/// else, known or not, survives verbatim. The result is what carries shader
/// setups, locators and engine parameters across an external mesh edit.
pub fn emit(tree: &Tree) -> Result<Vec<u8>, NtfError> {
	let mut skeleton = tree.clone();
	blank_entries(&mut skeleton.entries);

	let mut out = vec![];
	codec::write(&skeleton, &mut out)?;
	Ok(out)
}

/// Parses a skeleton back into a tree, ready for
/// [`inject_mesh_groups`](crate::mesh::inject_mesh_groups)
pub fn restore(data: &[u8]) -> Result<Tree, NtfError> {
	codec::parse(data)
}

fn blank_entries(entries: &mut [Entry]) {
	for entry in entries.iter_mut() {
		match entry {
			Entry::Chunk(chunk) => blank_chunk(chunk),
			Entry::Child(node) => blank_entries(&mut node.entries),
		}
	}
}

fn blank_chunk(chunk: &mut Chunk) {
	match chunk.name.as_str() {
		"Vertexes" | "Faces" => {
			if let ChunkValue::Raw(data) = &mut chunk.value {
				data.clear();
			}
		},
		"NumVertexes" | "NumFaces" => match &mut chunk.value {
			ChunkValue::UInt32(v) => *v = 0,
			ChunkValue::Int32(v) => *v = 0,
			_ => {},
		},
		_ => {},
	}
}
