use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

use ntfkit_core::mesh::{
	MeshGroup,
	MeshVertex
};

use ntfkit_ntf::{
	build,
	codec,
	mesh,
	skeleton,
	NtfError
};

use ntfkit_ntf::tree::*;

fn triangle_group(name: &str) -> MeshGroup {
	let mut group = MeshGroup::default();
	group.name = name.to_string();
	group.material.name = name.to_string();

	for (p, uv) in [
		(Vec3::new(0.0, 0.0, 0.0), Vec2::new(0.0, 0.0)),
		(Vec3::new(1.0, 0.0, 0.0), Vec2::new(1.0, 0.0)),
		(Vec3::new(0.0, 1.0, 0.0), Vec2::new(0.0, 1.0)),
	] {
		let mut v = MeshVertex::new(p);
		v.uv0 = uv;
		v.uv1 = Vec2::new(0.5, 0.5);
		group.vertices.push(v);
	}
	group.triangles.push([0, 1, 2]);
	group
}

/// A tree exercising every chunk shape, nesting, unknown names and the
/// engine-private entries a real file carries
fn awkward_tree() -> Tree {
	let mut tree = build::build_model(&[triangle_group("a"), triangle_group("b")]).unwrap();

	let mut private = Node::new(-65535);
	private.push_chunk(Chunk::new("", ChunkValue::Raw(vec![0, 0, 0xFF])));
	private.push_chunk(Chunk::new("Billboard", ChunkValue::Float(0.5)));
	private.push_child(Node::new(-255));

	let mut m = [0.0f32; 16];
	m[0] = 1.0;
	m[5] = 1.0;
	m[10] = 1.0;
	m[15] = 1.0;

	let mut frame = Node::new(-1);
	frame.push_chunk(Chunk::new("Transform", ChunkValue::Mat4(m)));
	frame.push_chunk(Chunk::new("Frame", ChunkValue::UInt32(0xDEADBEEF)));
	frame.push_child(private);

	tree.push_child(frame);
	tree.push_chunk(Chunk::new("Tail", ChunkValue::Int32(-1)));
	tree
}

fn to_bytes(tree: &Tree) -> Vec<u8> {
	let mut out = vec![];
	codec::write(tree, &mut out).unwrap();
	out
}

#[test]
fn roundtrip_law() {
	let data = to_bytes(&awkward_tree());
	let parsed = codec::parse(&data).unwrap();
	assert_eq!(to_bytes(&parsed), data);
}

#[test]
fn node_size_law_holds_everywhere() {
	fn check(entries: &[Entry]) {
		for entry in entries.iter() {
			let mut out = vec![];
			codec::write_entry(entry, &mut out).unwrap();
			let size = u32::from_le_bytes([out[1], out[2], out[3], out[4]]);
			assert_eq!(out.len(), size as usize + 1);

			if let Entry::Child(node) = entry {
				check(&node.entries);
			}
		}
	}

	check(&awkward_tree().entries);
}

#[test]
fn skeleton_law_with_awkward_tree() {
	let tree = awkward_tree();
	let original = to_bytes(&tree);

	let groups = mesh::extract_mesh_groups(&tree).unwrap();
	let mut restored = skeleton::restore(&skeleton::emit(&tree).unwrap()).unwrap();
	mesh::inject_mesh_groups(&mut restored, &groups).unwrap();

	assert_eq!(to_bytes(&restored), original);
}

#[test]
fn second_uv_set_survives_pure_roundtrip() {
	let tree = build::build_model(&[triangle_group("a")]).unwrap();
	let groups = mesh::extract_mesh_groups(&tree).unwrap();
	assert_eq!(groups[0].vertices[0].uv1, Vec2::new(0.5, 0.5));
}

#[test]
fn parse_rejects_foreign_magic() {
	assert_eq!(codec::parse(b"RIFF\x00\x00\x00\x00"),
		Err(NtfError::NotAnNtfFile(u32::from_le_bytes(*b"RIFF"))));
}

#[test]
fn schema_check_is_advisory() {
	// an off-schema chunk parses fine and is only flagged
	let mut tree = Tree::default();
	tree.push_chunk(Chunk::new("Alpha", ChunkValue::Int32(1)));

	let parsed = codec::parse(&to_bytes(&tree)).unwrap();
	let chunk = parsed.get_chunk("Alpha").unwrap();
	assert!(schema_mismatch(chunk));
	assert_eq!(chunk.value, ChunkValue::Int32(1));
}

#[test]
fn locator_survives_skeleton() {
	let tree = awkward_tree();
	let skeleton_tree = skeleton::restore(&skeleton::emit(&tree).unwrap()).unwrap();

	assert_eq!(mesh::find_locator(&skeleton_tree), Some(mesh::Locator {
		is_locator: 1,
		l_pos: [0; 4],
		l_dir: Vec4::zero(),
	}));
}
