pub mod ast {
	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	/// One corner of an `f` directive, indices still 1-based or negative as written
	#[derive(Clone, Copy, Debug, PartialEq)]
	pub struct Corner {
		pub position: i64,
		pub uv: Option<i64>,
		pub normal: Option<i64>,
	}

	/// A face corner resolved to zero-based list indices
	#[derive(Clone, Copy, Debug, PartialEq)]
	pub struct CornerRef {
		pub position: usize,
		pub uv: Option<usize>,
		pub normal: Option<usize>,
	}

	#[derive(Clone, Debug, PartialEq)]
	pub enum Statement {
		Position(Vec3),
		TexCoord(Vec2),
		Normal(Vec3),
		Face(Vec<Corner>),
		Group(String),
		UseMtl(String),
		MtlLib(String),
		Ignored,
	}

	/// Triangles collected under one `g`/`usemtl` run
	#[derive(Clone, Debug, Default, PartialEq)]
	pub struct Group {
		pub name: String,
		pub material: String,
		pub faces: Vec<[CornerRef; 3]>,
	}

	#[derive(Clone, Debug, Default, PartialEq)]
	pub struct ObjData {
		pub positions: Vec<Vec3>,
		pub uvs: Vec<Vec2>,
		pub normals: Vec<Vec3>,
		pub groups: Vec<Group>,
		pub mtl_libs: Vec<String>,
	}
}

#[cfg(feature = "import")]
pub mod import {
	use indexmap::IndexMap;

	use nom::{
		character::complete::{
			char,
			i64,
			not_line_ending,
			space0
		},
		combinator::{
			map,
			opt
		},
		error::Error,
		IResult,
		multi::many1,
		number::complete::float,
		sequence::{
			pair,
			preceded,
			tuple
		}
	};

	use std::collections::HashMap;

	use thiserror::Error as ThisError;

	use ultraviolet::vec::{
		Vec2,
		Vec3
	};

	use ntfkit_core::{
		mesh::{
			Material,
			MeshGroup,
			MeshVertex,
			MAX_GROUP_VERTICES
		},
		nom_ext::{
			etc,
			vec3ws,
			ws
		},
		tangent
	};

	use crate::{
		identifier,
		line_rest,
		mtl::ast::MtlMaterial
	};

	use super::ast::*;

	#[derive(Debug, PartialEq, ThisError)]
	pub enum ObjImportError {
		#[error("Malformed directive: {0}")]
		Syntax(String),
		#[error("Face index out of range: {0}")]
		Index(i64),
		#[error("Group holds {0} vertices, the index format allows 65535")]
		TooManyVertices(usize),
	}

	/// Parses a `vt` payload; a third coordinate is legal and dropped
	fn texcoord(input: &str) -> IResult<&str, Vec2> {
		map(tuple((ws(float), ws(float), opt(ws(float)))), |(u, v, _)| Vec2::new(u, v))(input)
	}

	/// Parses one face corner: `v`, `v/vt`, `v//vn` or `v/vt/vn`
	fn corner(input: &str) -> IResult<&str, Corner> {
		let (input, position) = i64(input)?;
		let (input, slashed) = opt(preceded(char('/'), pair(opt(i64), opt(preceded(char('/'), i64)))))(input)?;

		let (uv, normal) = match slashed {
			Some((uv, normal)) => (uv, normal),
			None => (None, None),
		};

		Ok((input, Corner {
			position: position,
			uv: uv,
			normal: normal,
		}))
	}

	/// Parses one directive, keyed off its leading keyword
	fn statement(input: &str) -> IResult<&str, Statement> {
		let (rest, key) = identifier(input)?;

		match key {
			"v" => map(vec3ws, Statement::Position)(rest),
			"vt" => map(texcoord, Statement::TexCoord)(rest),
			"vn" => map(vec3ws, Statement::Normal)(rest),
			"f" => map(many1(preceded(space0, corner)), Statement::Face)(rest),
			"g" | "o" => map(line_rest, |s: &str| Statement::Group(s.to_string()))(rest),
			"usemtl" => map(line_rest, |s: &str| Statement::UseMtl(s.to_string()))(rest),
			"mtllib" => map(line_rest, |s: &str| Statement::MtlLib(s.to_string()))(rest),
			_ => map(not_line_ending, |_| Statement::Ignored)(rest),
		}
	}

	fn skip_etc(input: &str) -> &str {
		match etc::<Error<&str>>(input) {
			Ok((rest, _)) => rest,
			Err(_) => input,
		}
	}

	fn first_line(input: &str) -> String {
		input.lines().next().unwrap_or_default().to_string()
	}

	// Relative indices refer to the list length at the directive, per the format
	fn resolve(index: i64, len: usize) -> Result<usize, ObjImportError> {
		if index > 0 && index as usize <= len {
			Ok(index as usize - 1)
		} else if index < 0 && index.unsigned_abs() as usize <= len {
			Ok(len - index.unsigned_abs() as usize)
		} else {
			Err(ObjImportError::Index(index))
		}
	}

	struct Builder {
		data: ObjData,
		group: Option<Group>,
		material: String,
	}

	impl Builder {
		fn flush(&mut self) {
			if let Some(group) = self.group.take() {
				self.data.groups.push(group);
			}
		}

		fn open(&mut self, name: String) {
			self.flush();
			self.group = Some(Group {
				name: if name.is_empty() { "default".to_string() } else { name },
				material: self.material.clone(),
				faces: vec![],
			});
		}

		fn apply(&mut self, statement: Statement) -> Result<(), ObjImportError> {
			match statement {
				Statement::Position(v) => self.data.positions.push(v),
				Statement::TexCoord(v) => self.data.uvs.push(v),
				Statement::Normal(v) => self.data.normals.push(v),
				Statement::Group(name) => self.open(name),
				Statement::UseMtl(name) => {
					let current = match &self.group {
						Some(group) => group.name.clone(),
						None => "default".to_string(),
					};
					self.material = name;
					self.open(current);
				},
				Statement::MtlLib(name) => self.data.mtl_libs.push(name),
				Statement::Face(corners) => self.face(corners)?,
				Statement::Ignored => {},
			}

			Ok(())
		}

		fn face(&mut self, corners: Vec<Corner>) -> Result<(), ObjImportError> {
			if corners.len() < 3 {
				return Ok(());
			}

			let mut resolved = Vec::with_capacity(corners.len());
			for corner in corners {
				resolved.push(CornerRef {
					position: resolve(corner.position, self.data.positions.len())?,
					uv: corner.uv.map(|i| resolve(i, self.data.uvs.len())).transpose()?,
					normal: corner.normal.map(|i| resolve(i, self.data.normals.len())).transpose()?,
				});
			}

			if self.group.is_none() {
				self.open("default".to_string());
			}

			if let Some(group) = self.group.as_mut() {
				// polygons triangulate as a fan from the first corner
				for i in 1..resolved.len() - 1 {
					group.faces.push([resolved[0], resolved[i], resolved[i + 1]]);
				}
			}

			Ok(())
		}
	}

	/// Parses a complete OBJ document. Referenced material libraries are
	/// reported in `mtl_libs`; reading them is the caller's concern.
	pub fn parse_obj(input: &str) -> Result<ObjData, ObjImportError> {
		let mut builder = Builder {
			data: ObjData::default(),
			group: None,
			material: String::new(),
		};

		let mut rest = skip_etc(input);
		while !rest.is_empty() {
			let (next, st) = statement(rest).map_err(|_| ObjImportError::Syntax(first_line(rest)))?;
			builder.apply(st)?;
			rest = skip_etc(next);
		}
		builder.flush();

		builder.data.groups.retain(|g| !g.faces.is_empty());
		builder.data.groups = merge_consecutive(std::mem::take(&mut builder.data.groups));

		Ok(builder.data)
	}

	// Adjacent groups sharing a material collapse into one; a mesh group is
	// material-contiguous on the engine side
	fn merge_consecutive(groups: Vec<Group>) -> Vec<Group> {
		let mut merged: Vec<Group> = vec![];

		for group in groups {
			match merged.last_mut() {
				Some(last) if !group.material.is_empty() && last.material == group.material => {
					last.faces.extend(group.faces);
				},
				_ => merged.push(group),
			}
		}

		merged
	}

	#[derive(Clone, Copy, Eq, Hash, PartialEq)]
	enum NormalRef {
		Index(usize),
		// corners without a `vn` take their face's normal and never share
		// a vertex across faces
		Face(usize),
	}

	#[derive(Clone, Copy, Eq, Hash, PartialEq)]
	struct VertexKey {
		position: usize,
		uv: Option<usize>,
		normal: NormalRef,
	}

	fn face_normal(p0: Vec3, p1: Vec3, p2: Vec3) -> Vec3 {
		let n = (p1 - p0).cross(p2 - p0);
		let mag = n.mag();
		if mag > 1e-8 {
			n / mag
		} else {
			Vec3::unit_y()
		}
	}

	/// Converts parsed groups into mesh groups: corners dedup into indexed
	/// vertices, the second UV set zero-fills, tangents are solved fresh
	pub fn mesh_groups(data: &ObjData, materials: &IndexMap<String, MtlMaterial>)
		-> Result<Vec<MeshGroup>, ObjImportError> {
		data.groups.iter().map(|g| build_group(data, g, materials)).collect()
	}

	fn build_group(data: &ObjData, group: &Group, materials: &IndexMap<String, MtlMaterial>)
		-> Result<MeshGroup, ObjImportError> {
		let mut keys: HashMap<VertexKey, u16> = HashMap::new();
		let mut vertices: Vec<MeshVertex> = vec![];
		let mut triangles = vec![];

		for (fi, face) in group.faces.iter().enumerate() {
			let normal = face_normal(
				data.positions[face[0].position],
				data.positions[face[1].position],
				data.positions[face[2].position],
			);

			let mut tri = [0u16; 3];
			for (slot, corner) in tri.iter_mut().zip(face.iter()) {
				let key = VertexKey {
					position: corner.position,
					uv: corner.uv,
					normal: match corner.normal {
						Some(i) => NormalRef::Index(i),
						None => NormalRef::Face(fi),
					},
				};

				*slot = match keys.get(&key) {
					Some(index) => *index,
					None => {
						if vertices.len() >= MAX_GROUP_VERTICES {
							return Err(ObjImportError::TooManyVertices(vertices.len() + 1));
						}

						let index = vertices.len() as u16;
						let mut vertex = MeshVertex::new(data.positions[corner.position]);
						vertex.normal = match corner.normal {
							Some(i) => data.normals[i],
							None => normal,
						};
						vertex.uv0 = match corner.uv {
							Some(i) => data.uvs[i],
							None => Vec2::zero(),
						};

						vertices.push(vertex);
						keys.insert(key, index);
						index
					},
				};
			}
			triangles.push(tri);
		}

		let positions: Vec<Vec3> = vertices.iter().map(|v| v.position).collect();
		let normals: Vec<Vec3> = vertices.iter().map(|v| v.normal).collect();
		let uvs: Vec<Vec2> = vertices.iter().map(|v| v.uv0).collect();
		for (vertex, tangent) in vertices.iter_mut()
			.zip(tangent::solve(&positions, &normals, &uvs, &triangles)) {
			vertex.tangent = tangent;
		}

		let material = match materials.get(group.material.as_str()) {
			Some(mtl) => mtl.to_material(),
			None => Material {
				name: if group.material.is_empty() {
					group.name.clone()
				} else {
					group.material.clone()
				},
				..Material::default()
			},
		};

		Ok(MeshGroup {
			name: group.name.clone(),
			vertex_format: 1,
			vertices: vertices,
			triangles: triangles,
			material: material,
		})
	}

}

#[cfg(feature = "export")]
pub mod export {
	use std::io::{
		self,
		Write
	};

	use ntfkit_core::mesh::MeshGroup;

	/// Writes mesh groups as an OBJ document. Only the first UV set is
	/// emitted; the engine regenerates lightmap UVs, and a skeleton carries
	/// the originals across a pure round-trip.
	pub fn write_obj<W>(buf: &mut W, groups: &[MeshGroup], mtl_name: &str) -> io::Result<()>
	where
		W: Write,
	{
		writeln!(buf, "mtllib {}", mtl_name)?;

		let mut offset = 1;
		for group in groups.iter() {
			writeln!(buf)?;
			writeln!(buf, "g {}", group.name)?;
			writeln!(buf, "usemtl {}", group.material.name)?;

			for v in group.vertices.iter() {
				writeln!(buf, "v {:.6} {:.6} {:.6}", v.position.x, v.position.y, v.position.z)?;
			}
			for v in group.vertices.iter() {
				writeln!(buf, "vt {:.6} {:.6}", v.uv0.x, v.uv0.y)?;
			}
			for v in group.vertices.iter() {
				writeln!(buf, "vn {:.6} {:.6} {:.6}", v.normal.x, v.normal.y, v.normal.z)?;
			}

			for tri in group.triangles.iter() {
				let a = tri[0] as usize + offset;
				let b = tri[1] as usize + offset;
				let c = tri[2] as usize + offset;
				writeln!(buf, "f {}/{}/{} {}/{}/{} {}/{}/{}", a, a, a, b, b, b, c, c, c)?;
			}

			offset += group.vertices.len();
		}

		Ok(())
	}

}
