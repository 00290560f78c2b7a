use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io::{
	self,
	Write
};

use ntfkit_core::io_ext::{
	ReadBinExt,
	WriteBinExt
};

use crate::{
	MAGIC,
	NtfError
};

use crate::tree::*;

/// Parses a complete NTF byte stream into a tree
pub fn parse(data: &[u8]) -> Result<Tree, NtfError> {
	let mut buf = data;
	let magic = buf.read_u32::<LE>()?;
	if magic != MAGIC {
		return Err(NtfError::NotAnNtfFile(magic));
	}

	Ok(Tree {
		entries: entry_list(buf)?,
	})
}

/// Serializes a tree back to its byte stream. An unmodified parse/write cycle
/// reproduces the input byte for byte.
pub fn write<W>(tree: &Tree, buf: &mut W) -> io::Result<()>
where
	W: Write,
{
	buf.write_u32::<LE>(MAGIC)?;

	for entry in tree.entries.iter() {
		write_entry(entry, buf)?;
	}

	Ok(())
}

fn entry_list(mut data: &[u8]) -> Result<Vec<Entry>, NtfError> {
	let mut entries = vec![];

	while !data.is_empty() {
		let (entry, rest) = entry(data)?;
		entries.push(entry);
		data = rest;
	}

	Ok(entries)
}

/// Parses one entry, returning it along with the unconsumed remainder
fn entry(data: &[u8]) -> Result<(Entry, &[u8]), NtfError> {
	let mut buf = data;
	let flag = buf.read_u8()?;
	let size = buf.read_u32::<LE>()? as usize;

	// the size field counts itself plus everything after it
	if size < 4 {
		return Err(NtfError::CorruptNode("node size below minimum"));
	}
	let body_len = size - 4;
	if body_len > buf.len() {
		return Err(NtfError::UnexpectedEof);
	}
	let (body, rest) = buf.split_at(body_len);

	match flag {
		1 => Ok((Entry::Chunk(chunk(body)?), rest)),
		2 => {
			if body.len() < 4 {
				return Err(NtfError::CorruptNode("child node lacks a type"));
			}
			let mut body = body;
			let node_type = body.read_i32::<LE>()?;

			Ok((Entry::Child(Node {
				node_type: node_type,
				entries: entry_list(body)?,
			}), rest))
		},
		_ => Err(NtfError::CorruptNode("unknown entry flag")),
	}
}

fn chunk(body: &[u8]) -> Result<Chunk, NtfError> {
	let mut buf = body;
	let tag = buf.read_u8()?;
	let name_len = buf.read_u32::<LE>()? as usize;
	if name_len > buf.len() {
		return Err(NtfError::CorruptNode("chunk name runs past the node"));
	}

	let (name_raw, payload) = buf.split_at(name_len);
	let name: String = name_raw.iter().map(|b| *b as char).collect();
	let value = decode_value(tag, &name, payload)?;

	Ok(Chunk {
		name: name,
		value: value,
	})
}

fn decode_value(tag: u8, name: &str, payload: &[u8]) -> Result<ChunkValue, NtfError> {
	let mut buf = payload;

	let value = match tag {
		TAG_INT32 => ChunkValue::Int32(buf.read_i32::<LE>()?),
		TAG_UINT32 => ChunkValue::UInt32(buf.read_u32::<LE>()?),
		TAG_FLOAT => ChunkValue::Float(buf.read_f32::<LE>()?),
		// the vec4 tag is overloaded: "LPos" carries signed integers
		TAG_VEC4 if name == LPOS => {
			let mut v = [0; 4];
			for slot in v.iter_mut() {
				*slot = buf.read_i32::<LE>()?;
			}
			ChunkValue::Vec4Int(v)
		},
		TAG_VEC4 => ChunkValue::Vec4(buf.read_vec4_le()?),
		TAG_MAT4X4 => ChunkValue::Mat4(buf.read_mat16_le()?),
		TAG_STRING => {
			let text = buf.iter().map(|b| *b as char).collect();
			buf = &[];
			ChunkValue::Text(text)
		},
		TAG_RAW => {
			let raw = buf.to_vec();
			buf = &[];
			ChunkValue::Raw(raw)
		},
		_ => return Err(NtfError::UnknownChunkTag(tag)),
	};

	if !buf.is_empty() {
		return Err(NtfError::CorruptNode("payload longer than its fixed width"));
	}

	Ok(value)
}

/// Serializes one entry: flag byte, self-inclusive size, then the body
pub fn write_entry<W>(entry: &Entry, buf: &mut W) -> io::Result<()>
where
	W: Write,
{
	match entry {
		Entry::Chunk(chunk) => {
			let body = chunk_bytes(chunk)?;
			buf.write_u8(1)?;
			buf.write_u32::<LE>((body.len() + 4) as u32)?;
			buf.write_all(&body)
		},
		Entry::Child(node) => {
			let mut body = vec![];
			for child_entry in node.entries.iter() {
				write_entry(child_entry, &mut body)?;
			}

			buf.write_u8(2)?;
			buf.write_u32::<LE>((body.len() + 4 + 4) as u32)?;
			buf.write_i32::<LE>(node.node_type)?;
			buf.write_all(&body)
		},
	}
}

fn chunk_bytes(chunk: &Chunk) -> io::Result<Vec<u8>> {
	let mut out = vec![];
	out.write_u8(chunk.value.tag())?;
	out.write_dstr(&chunk.name)?;

	match &chunk.value {
		ChunkValue::Int32(v) => out.write_i32::<LE>(*v)?,
		ChunkValue::UInt32(v) => out.write_u32::<LE>(*v)?,
		ChunkValue::Float(v) => out.write_f32::<LE>(*v)?,
		ChunkValue::Vec4(v) => out.write_vec4_le(*v)?,
		ChunkValue::Vec4Int(v) => for i in v.iter() {
			out.write_i32::<LE>(*i)?;
		},
		ChunkValue::Mat4(m) => out.write_mat16_le(m)?,
		ChunkValue::Text(s) => {
			let raw: Vec<u8> = s.chars().map(|c| c as u8).collect();
			out.write_all(&raw)?;
		},
		ChunkValue::Raw(raw) => out.write_all(raw)?,
	}

	Ok(out)
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::Vec4;

	use super::*;

	fn locator_node() -> Node {
		let mut locator = Node::new(CHILD_LOCATOR);
		locator.push_chunk(Chunk::new("IsLocator", ChunkValue::Int32(1)));
		locator.push_chunk(Chunk::new("LPos", ChunkValue::Vec4Int([0; 4])));
		locator.push_chunk(Chunk::new("LDir", ChunkValue::Vec4(Vec4::zero())));
		locator
	}

	fn to_bytes(tree: &Tree) -> Vec<u8> {
		let mut out = vec![];
		write(tree, &mut out).unwrap();
		out
	}

	#[test]
	fn test_minimal_locator_file() {
		let mut tree = Tree::default();
		tree.push_child(locator_node());

		let data = to_bytes(&tree);
		// magic + child header + IsLocator + LPos + LDir
		assert_eq!(data.len(), 4 + (1 + 4 + 4) + (1 + 4 + 1 + 4 + 9 + 4) + 2 * (1 + 4 + 1 + 4 + 4 + 16));
		assert_eq!(data[..4], [0x9F, 0x99, 0x66, 0xF6]);

		let parsed = parse(&data).unwrap();
		assert_eq!(parsed, tree);
		assert_eq!(to_bytes(&parsed), data);
	}

	#[test]
	fn test_node_size_law() {
		let mut tree = Tree::default();
		tree.push_chunk(Chunk::new("Name", ChunkValue::Text("law".to_string())));
		tree.push_child(locator_node());

		for entry in tree.entries.iter() {
			let mut out = vec![];
			write_entry(entry, &mut out).unwrap();
			let size = u32::from_le_bytes([out[1], out[2], out[3], out[4]]);
			assert_eq!(out.len(), size as usize + 1);
		}
	}

	#[test]
	fn test_lpos_payload_is_signed_integer() {
		let payload: [u8; 16] = [
			0, 0, 0, 0,
			0, 0, 0, 0,
			0, 0, 0, 0,
			0x2A, 0, 0, 0,
		];

		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(1);
		data.extend_from_slice(&29u32.to_le_bytes());
		data.push(TAG_VEC4);
		data.extend_from_slice(&4u32.to_le_bytes());
		data.extend_from_slice(b"LPos");
		data.extend_from_slice(&payload);

		let tree = parse(&data).unwrap();
		assert_eq!(tree.get_chunk("LPos").unwrap().value, ChunkValue::Vec4Int([0, 0, 0, 42]));
		assert_eq!(to_bytes(&tree), data);

		// the same payload under any other name is a float vector
		let mut other = data.clone();
		other[14..18].copy_from_slice(b"LDir");
		let tree = parse(&other).unwrap();
		assert_eq!(tree.get_chunk("LDir").unwrap().value,
			ChunkValue::Vec4(Vec4::new(0.0, 0.0, 0.0, f32::from_le_bytes([0x2A, 0, 0, 0]))));
		assert_eq!(to_bytes(&tree), other);
	}

	#[test]
	fn test_empty_child_and_empty_name() {
		let mut tree = Tree::default();
		tree.push_child(Node::new(-1));
		tree.push_chunk(Chunk::new("", ChunkValue::UInt32(7)));

		let data = to_bytes(&tree);
		// empty child body is just its type: size field 8
		assert_eq!(data[5], 8);
		assert_eq!(parse(&data).unwrap(), tree);
	}

	#[test]
	fn test_bad_magic() {
		let data = [0x9F, 0x99, 0x66, 0xF7];
		assert_eq!(parse(&data), Err(NtfError::NotAnNtfFile(0xF766999F)));
	}

	#[test]
	fn test_truncated_file() {
		let mut tree = Tree::default();
		tree.push_child(locator_node());
		let data = to_bytes(&tree);

		assert_eq!(parse(&data[..data.len() - 1]), Err(NtfError::UnexpectedEof));
	}

	#[test]
	fn test_size_overruns_parent() {
		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(2);
		data.extend_from_slice(&100u32.to_le_bytes());
		data.extend_from_slice(&5i32.to_le_bytes());

		assert_eq!(parse(&data), Err(NtfError::UnexpectedEof));
	}

	#[test]
	fn test_undersized_node() {
		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(1);
		data.extend_from_slice(&3u32.to_le_bytes());

		assert_eq!(parse(&data), Err(NtfError::CorruptNode("node size below minimum")));
	}

	#[test]
	fn test_unknown_flag() {
		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(3);
		data.extend_from_slice(&4u32.to_le_bytes());

		assert_eq!(parse(&data), Err(NtfError::CorruptNode("unknown entry flag")));
	}

	#[test]
	fn test_unknown_chunk_tag() {
		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(1);
		data.extend_from_slice(&13u32.to_le_bytes());
		data.push(42);
		data.extend_from_slice(&0u32.to_le_bytes());
		data.extend_from_slice(&1u32.to_le_bytes());

		assert_eq!(parse(&data), Err(NtfError::UnknownChunkTag(42)));
	}

	#[test]
	fn test_trailing_payload_bytes() {
		// an int32 chunk with five payload bytes instead of four
		let mut data = vec![0x9F, 0x99, 0x66, 0xF6];
		data.push(1);
		data.extend_from_slice(&14u32.to_le_bytes());
		data.push(TAG_INT32);
		data.extend_from_slice(&0u32.to_le_bytes());
		data.extend_from_slice(&[1, 0, 0, 0, 0]);

		assert_eq!(parse(&data), Err(NtfError::CorruptNode("payload longer than its fixed width")));
	}

	#[test]
	fn test_entry_order_preserved() {
		let mut tree = Tree::default();
		tree.push_chunk(Chunk::new("B", ChunkValue::Int32(2)));
		tree.push_chunk(Chunk::new("A", ChunkValue::Int32(1)));
		tree.push_child(Node::new(-1));
		tree.push_chunk(Chunk::new("C", ChunkValue::Int32(3)));

		let parsed = parse(&to_bytes(&tree)).unwrap();
		assert_eq!(parsed, tree);
	}

	#[test]
	fn test_mat4_and_string_chunks() {
		let mut m = [0.0f32; 16];
		m[0] = 1.0;
		m[5] = 1.0;
		m[10] = 1.0;
		m[15] = 1.0;

		let mut tree = Tree::default();
		tree.push_chunk(Chunk::new("Transform", ChunkValue::Mat4(m)));
		tree.push_chunk(Chunk::new("ShaderName", ChunkValue::Text("buildings_lmap".to_string())));

		let data = to_bytes(&tree);
		let parsed = parse(&data).unwrap();
		assert_eq!(parsed, tree);
		assert_eq!(to_bytes(&parsed), data);
	}
}
