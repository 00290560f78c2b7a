pub mod ast {
	use ultraviolet::vec::{
		Vec3,
		Vec4
	};

	use ntfkit_core::mesh::Material;

	use super::ensure_dds;

	/// Material record for the `.mtl` companion file
	#[derive(Clone, Debug, PartialEq)]
	pub struct MtlMaterial {
		pub name: String,
		pub kd: Vec3,
		pub ks: Vec3,
		pub ns: f32,
		pub d: f32,
		pub map_kd: String,
		pub map_bump: String,
		pub map_ka: String,
	}

	impl MtlMaterial {
		pub fn new(name: &str) -> MtlMaterial {
			MtlMaterial {
				name: name.to_string(),
				kd: Vec3::new(0.5, 0.5, 0.5),
				ks: Vec3::new(0.5, 0.5, 0.5),
				ns: 16.0,
				d: 1.0,
				map_kd: String::new(),
				map_bump: String::new(),
				map_ka: String::new(),
			}
		}

		/// Maps the interchange fields onto engine shader parameters.
		/// Texture names pick up a `.dds` extension on the way in.
		pub fn to_material(&self) -> Material {
			Material {
				name: self.name.clone(),
				tex_diffuse: ensure_dds(&self.map_kd),
				tex_bump: ensure_dds(&self.map_bump),
				tex_lightmap: ensure_dds(&self.map_ka),
				dest_color: Vec4::new(self.kd.x, self.kd.y, self.kd.z, 1.0),
				spec_color: Vec4::new(self.ks.x, self.ks.y, self.ks.z, self.ns),
				alpha: self.d,
				..Material::default()
			}
		}

		/// The reverse mapping, used when exporting a model's materials
		pub fn from_material(material: &Material) -> MtlMaterial {
			MtlMaterial {
				name: material.name.clone(),
				kd: Vec3::new(material.dest_color.x, material.dest_color.y, material.dest_color.z),
				ks: Vec3::new(material.spec_color.x, material.spec_color.y, material.spec_color.z),
				ns: material.spec_color.w,
				d: material.alpha,
				map_kd: material.tex_diffuse.clone(),
				map_bump: material.tex_bump.clone(),
				map_ka: material.tex_lightmap.clone(),
			}
		}
	}
}

/// Swaps any non-`.dds` extension for `.dds`; the engine loads nothing else
pub fn ensure_dds(name: &str) -> String {
	let name = name.trim();
	if name.is_empty() {
		return String::new();
	}

	match name.rsplit_once('.') {
		Some((_, ext)) if ext.eq_ignore_ascii_case("dds") => name.to_string(),
		Some((stem, _)) => format!("{}.dds", stem),
		None => format!("{}.dds", name),
	}
}

#[cfg(feature = "import")]
pub mod import {
	use indexmap::IndexMap;

	use nom::{
		character::complete::not_line_ending,
		combinator::map,
		IResult,
		number::complete::float
	};

	use thiserror::Error as ThisError;

	use ultraviolet::vec::Vec3;

	use ntfkit_core::nom_ext::{
		etc,
		vec3ws,
		ws
	};

	use crate::{
		identifier,
		line_rest
	};

	use super::ast::MtlMaterial;

	#[derive(Debug, PartialEq, ThisError)]
	pub enum MtlImportError {
		#[error("Malformed directive: {0}")]
		Syntax(String),
	}

	#[derive(Clone, Debug, PartialEq)]
	enum Statement {
		NewMtl(String),
		Kd(Vec3),
		Ks(Vec3),
		Ns(f32),
		D(f32),
		Tr(f32),
		MapKd(String),
		MapBump(String),
		MapKa(String),
		Ignored,
	}

	/// Strips texture options (`-bm 0.5` and friends) and any directory part
	fn texture_path(value: &str) -> String {
		let mut tokens = value.split_whitespace().peekable();
		while let Some(token) = tokens.peek() {
			if token.starts_with('-') {
				tokens.next();
				tokens.next();
			} else {
				break;
			}
		}

		let path = tokens.collect::<Vec<_>>().join(" ");
		match path.rsplit_once(['/', '\\']) {
			Some((_, file)) => file.to_string(),
			None => path,
		}
	}

	fn statement(input: &str) -> IResult<&str, Statement> {
		let (rest, key) = identifier(input)?;

		if key.eq_ignore_ascii_case("newmtl") {
			map(line_rest, |s: &str| Statement::NewMtl(s.to_string()))(rest)
		} else if key.eq_ignore_ascii_case("Kd") {
			map(vec3ws, Statement::Kd)(rest)
		} else if key.eq_ignore_ascii_case("Ks") {
			map(vec3ws, Statement::Ks)(rest)
		} else if key.eq_ignore_ascii_case("Ns") {
			map(ws(float), Statement::Ns)(rest)
		} else if key.eq_ignore_ascii_case("d") {
			map(ws(float), Statement::D)(rest)
		} else if key.eq_ignore_ascii_case("Tr") {
			map(ws(float), Statement::Tr)(rest)
		} else if key.eq_ignore_ascii_case("map_Kd") {
			map(line_rest, |s: &str| Statement::MapKd(texture_path(s)))(rest)
		} else if key.eq_ignore_ascii_case("map_bump") || key.eq_ignore_ascii_case("bump") {
			map(line_rest, |s: &str| Statement::MapBump(texture_path(s)))(rest)
		} else if key.eq_ignore_ascii_case("map_Ka") {
			map(line_rest, |s: &str| Statement::MapKa(texture_path(s)))(rest)
		} else {
			map(not_line_ending, |_| Statement::Ignored)(rest)
		}
	}

	fn skip_etc(input: &str) -> &str {
		match etc::<nom::error::Error<&str>>(input) {
			Ok((rest, _)) => rest,
			Err(_) => input,
		}
	}

	/// Parses a material library into an order-preserving name table.
	/// Directives before the first `newmtl` are ignored.
	pub fn parse_mtl(input: &str) -> Result<IndexMap<String, MtlMaterial>, MtlImportError> {
		let mut materials: IndexMap<String, MtlMaterial> = IndexMap::new();
		let mut current: Option<String> = None;

		let mut rest = skip_etc(input);
		while !rest.is_empty() {
			let (next, st) = statement(rest)
				.map_err(|_| MtlImportError::Syntax(rest.lines().next().unwrap_or_default().to_string()))?;
			rest = skip_etc(next);

			if let Statement::NewMtl(name) = &st {
				current = Some(name.clone());
				materials.insert(name.clone(), MtlMaterial::new(name));
				continue;
			}

			let material = match current.as_ref().and_then(|name| materials.get_mut(name)) {
				Some(material) => material,
				None => continue,
			};

			match st {
				Statement::Kd(v) => material.kd = v,
				Statement::Ks(v) => material.ks = v,
				Statement::Ns(v) => material.ns = v,
				Statement::D(v) => material.d = v,
				Statement::Tr(v) => material.d = 1.0 - v,
				Statement::MapKd(v) => material.map_kd = v,
				Statement::MapBump(v) => material.map_bump = v,
				Statement::MapKa(v) => material.map_ka = v,
				Statement::NewMtl(_) | Statement::Ignored => {},
			}
		}

		Ok(materials)
	}

}

#[cfg(feature = "export")]
pub mod export {
	use std::io::{
		self,
		Write
	};

	use ntfkit_core::mesh::Material;

	/// Writes the `.mtl` companion for a set of materials
	pub fn write_mtl<W>(buf: &mut W, materials: &[&Material]) -> io::Result<()>
	where
		W: Write,
	{
		for m in materials.iter() {
			writeln!(buf, "newmtl {}", m.name)?;
			writeln!(buf, "Ka 0.2 0.2 0.2")?;
			writeln!(buf, "Kd {:.4} {:.4} {:.4}", m.dest_color.x, m.dest_color.y, m.dest_color.z)?;
			writeln!(buf, "Ks {:.4} {:.4} {:.4}", m.spec_color.x, m.spec_color.y, m.spec_color.z)?;
			writeln!(buf, "Ns {:.1}", m.spec_color.w)?;
			writeln!(buf, "d {:.4}", m.alpha)?;
			writeln!(buf, "illum 2")?;

			if !m.tex_diffuse.is_empty() {
				writeln!(buf, "map_Kd {}", m.tex_diffuse)?;
			}
			if !m.tex_bump.is_empty() {
				writeln!(buf, "map_bump {}", m.tex_bump)?;
			}
			if !m.tex_lightmap.is_empty() {
				writeln!(buf, "map_Ka {}", m.tex_lightmap)?;
			}

			writeln!(buf)?;
		}

		Ok(())
	}

}
