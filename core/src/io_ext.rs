use byteorder::{
	LE,
	ReadBytesExt,
	WriteBytesExt
};

use std::io::{
	Read,
	Result,
	Write
};

use ultraviolet::vec::{
	Vec2,
	Vec3,
	Vec4
};

pub trait ReadBinExt: Read {
	/// Reads a length-prefixed string (u32 length, no terminator).
	/// Bytes map 1:1 onto chars so that re-encoding reproduces the input exactly.
	#[inline]
	fn read_dstr(&mut self) -> Result<String> {
		let length = self.read_u32::<LE>()? as usize;
		let mut raw = vec![0; length];
		self.read_exact(&mut raw)?;

		Ok(raw.iter().map(|b| *b as char).collect())
	}

	/// Reads a little endian 2D vector
	#[inline]
	fn read_vec2_le(&mut self) -> Result<Vec2> {
		Ok(Vec2::new(self.read_f32::<LE>()?, self.read_f32::<LE>()?))
	}

	/// Reads a little endian 3D vector
	#[inline]
	fn read_vec3_le(&mut self) -> Result<Vec3> {
		Ok(Vec3::new(self.read_f32::<LE>()?, self.read_f32::<LE>()?, self.read_f32::<LE>()?))
	}

	/// Reads a little endian 4D vector
	#[inline]
	fn read_vec4_le(&mut self) -> Result<Vec4> {
		Ok(Vec4::new(self.read_f32::<LE>()?, self.read_f32::<LE>()?, self.read_f32::<LE>()?,
			self.read_f32::<LE>()?))
	}

	/// Reads 16 little endian floats (a 4x4 matrix in storage order)
	#[inline]
	fn read_mat16_le(&mut self) -> Result<[f32; 16]> {
		let mut m = [0.0; 16];
		for slot in m.iter_mut() {
			*slot = self.read_f32::<LE>()?;
		}

		Ok(m)
	}
}

impl<R> ReadBinExt for R
where
	R: Read + ?Sized,
{
}

pub trait WriteBinExt: Write {
	/// Writes a length-prefixed string (u32 length, no terminator).
	/// Only the low byte of each char is emitted; see [`ReadBinExt::read_dstr`].
	#[inline]
	fn write_dstr(&mut self, s: &str) -> Result<()> {
		let raw: Vec<u8> = s.chars().map(|c| c as u8).collect();
		self.write_u32::<LE>(raw.len() as u32)?;
		self.write_all(&raw)
	}

	/// Writes a little endian 2D vector
	#[inline]
	fn write_vec2_le(&mut self, v: Vec2) -> Result<()> {
		self.write_f32::<LE>(v.x)?;
		self.write_f32::<LE>(v.y)
	}

	/// Writes a little endian 3D vector
	#[inline]
	fn write_vec3_le(&mut self, v: Vec3) -> Result<()> {
		self.write_f32::<LE>(v.x)?;
		self.write_f32::<LE>(v.y)?;
		self.write_f32::<LE>(v.z)
	}

	/// Writes a little endian 4D vector
	#[inline]
	fn write_vec4_le(&mut self, v: Vec4) -> Result<()> {
		self.write_f32::<LE>(v.x)?;
		self.write_f32::<LE>(v.y)?;
		self.write_f32::<LE>(v.z)?;
		self.write_f32::<LE>(v.w)
	}

	/// Writes 16 little endian floats
	#[inline]
	fn write_mat16_le(&mut self, m: &[f32; 16]) -> Result<()> {
		for v in m.iter() {
			self.write_f32::<LE>(*v)?;
		}

		Ok(())
	}
}

impl<W> WriteBinExt for W
where
	W: Write + ?Sized,
{
}

#[cfg(test)]
mod tests {
	use ultraviolet::vec::{
		Vec2,
		Vec4
	};

	use super::*;

	#[test]
	fn test_dstr_roundtrip() {
		let mut out = vec![];
		out.write_dstr("Vertexes").unwrap();
		assert_eq!(out[..4], [8, 0, 0, 0]);
		assert_eq!(&out[4..], b"Vertexes");
		assert_eq!("Vertexes".to_string(), out.as_slice().read_dstr().unwrap());
	}

	#[test]
	fn test_dstr_empty() {
		let mut out = vec![];
		out.write_dstr("").unwrap();
		assert_eq!(out, [0, 0, 0, 0]);
		assert_eq!("".to_string(), out.as_slice().read_dstr().unwrap());
	}

	#[test]
	fn test_dstr_non_ascii_bytes() {
		// bytes above 0x7F survive a read/write cycle untouched
		let data: Vec<u8> = vec![3, 0, 0, 0, 0x41, 0xE9, 0xFF];
		let s = data.as_slice().read_dstr().unwrap();
		let mut out = vec![];
		out.write_dstr(&s).unwrap();
		assert_eq!(out, data);
	}

	#[test]
	fn test_read_vecs() {
		let mut vec2: &[u8] = &[0, 0, 0x80, 0x3F, 0, 0, 0, 0xC0][..];
		let mut vec4: &[u8] = &[0, 0, 0x80, 0x3F, 0, 0, 0, 0x40, 0, 0, 0x40, 0x40, 0, 0, 0x80, 0x40][..];
		assert_eq!(Vec2::new(1.0, -2.0), vec2.read_vec2_le().unwrap());
		assert_eq!(Vec4::new(1.0, 2.0, 3.0, 4.0), vec4.read_vec4_le().unwrap());
	}

	#[test]
	fn test_vec_roundtrip() {
		let v = Vec4::new(0.125, -42.0, 1e-6, 65535.0);
		let mut out = vec![];
		out.write_vec4_le(v).unwrap();
		assert_eq!(v, out.as_slice().read_vec4_le().unwrap());
	}

	#[test]
	fn test_mat16_roundtrip() {
		let mut m = [0.0f32; 16];
		for (i, slot) in m.iter_mut().enumerate() {
			*slot = i as f32 * 0.5;
		}

		let mut out = vec![];
		out.write_mat16_le(&m).unwrap();
		assert_eq!(out.len(), 64);
		assert_eq!(m, out.as_slice().read_mat16_le().unwrap());
	}
}
