use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io::{
	self,
	Read,
	Write
};

use ultraviolet::vec::Vec3;

use ntfkit_core::{
	io_ext::{
		ReadBinExt,
		WriteBinExt
	},
	mesh::MeshVertex
};

use crate::NtfError;

/// The only vertex layout this codec decodes; other formats pass through as raw bytes
pub const VERTEX_FORMAT: i32 = 1;

/// Bytes per Format 1 vertex: position, packed normal, packed tangent, two UV sets
pub const VERTEX_STRIDE: usize = 36;

/// Decodes one UBYTE4N component. 128 is the neutral byte, so the scale is
/// asymmetric: dividing by 127 keeps the encoder's neutral value fixed.
#[inline]
pub fn ubyte4n_decode(b: u8) -> f32 {
	(b as f32 - 128.0) / 127.0
}

/// Encodes one UBYTE4N component
#[inline]
pub fn ubyte4n_encode(f: f32) -> u8 {
	(f * 127.0 + 128.0).round().clamp(0.0, 255.0) as u8
}

fn unpack(raw: [u8; 4]) -> (Vec3, u8) {
	(Vec3::new(ubyte4n_decode(raw[0]), ubyte4n_decode(raw[1]), ubyte4n_decode(raw[2])), raw[3])
}

/// Decodes a Format 1 vertex buffer
pub fn decode_vertices(raw: &[u8], count: u32) -> Result<Vec<MeshVertex>, NtfError> {
	let count = count as usize;
	if raw.len() < count * VERTEX_STRIDE {
		return Err(NtfError::UnexpectedEof);
	}

	let mut buf = raw;
	let mut vertices = Vec::with_capacity(count);

	for _ in 0..count {
		let position = buf.read_vec3_le()?;

		let mut packed = [0; 4];
		buf.read_exact(&mut packed)?;
		let (normal, normal_w) = unpack(packed);
		buf.read_exact(&mut packed)?;
		let (tangent, tangent_w) = unpack(packed);

		let uv0 = buf.read_vec2_le()?;
		let uv1 = buf.read_vec2_le()?;

		vertices.push(MeshVertex {
			position: position,
			normal: normal,
			tangent: tangent,
			normal_w: normal_w,
			tangent_w: tangent_w,
			uv0: uv0,
			uv1: uv1,
		});
	}

	Ok(vertices)
}

/// Encodes a Format 1 vertex buffer. Positions and UVs are written exactly;
/// normals and tangents requantize to the same bytes they decoded from.
pub fn encode_vertices<W>(vertices: &[MeshVertex], buf: &mut W) -> io::Result<()>
where
	W: Write,
{
	for v in vertices.iter() {
		buf.write_vec3_le(v.position)?;
		buf.write_all(&[
			ubyte4n_encode(v.normal.x),
			ubyte4n_encode(v.normal.y),
			ubyte4n_encode(v.normal.z),
			v.normal_w,
		])?;
		buf.write_all(&[
			ubyte4n_encode(v.tangent.x),
			ubyte4n_encode(v.tangent.y),
			ubyte4n_encode(v.tangent.z),
			v.tangent_w,
		])?;
		buf.write_vec2_le(v.uv0)?;
		buf.write_vec2_le(v.uv1)?;
	}

	Ok(())
}

/// Decodes an index buffer into triangles. `index_count` is the index count
/// stored in NumFaces, three per triangle.
pub fn decode_triangles(raw: &[u8], index_count: u32) -> Result<Vec<[u16; 3]>, NtfError> {
	if index_count % 3 != 0 {
		return Err(NtfError::IndexCountNotMultipleOfThree(index_count));
	}

	let count = index_count as usize;
	if raw.len() < count * 2 {
		return Err(NtfError::UnexpectedEof);
	}

	let mut buf = raw;
	let mut triangles = Vec::with_capacity(count / 3);
	for _ in 0..(count / 3) {
		triangles.push([buf.read_u16::<LE>()?, buf.read_u16::<LE>()?, buf.read_u16::<LE>()?]);
	}

	Ok(triangles)
}

/// Encodes triangles as a flat little endian u16 index buffer
pub fn encode_triangles<W>(triangles: &[[u16; 3]], buf: &mut W) -> io::Result<()>
where
	W: Write,
{
	for tri in triangles.iter() {
		for i in tri.iter() {
			buf.write_u16::<LE>(*i)?;
		}
	}

	Ok(())
}
