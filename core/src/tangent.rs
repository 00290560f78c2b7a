use ultraviolet::vec::{
	Vec2,
	Vec3
};

const DEGENERATE_EPS: f32 = 1e-8;

/// Returns a unit vector perpendicular to `n`, built against the world axis
/// least aligned with it. Deterministic for any input, unit X for a zero vector.
pub fn perpendicular(n: Vec3) -> Vec3 {
	let ax = n.x.abs();
	let ay = n.y.abs();
	let az = n.z.abs();

	let up = if ax < ay && ax < az {
		Vec3::unit_x()
	} else if ay < az {
		Vec3::unit_y()
	} else {
		Vec3::unit_z()
	};

	let t = up.cross(n);
	let mag = t.mag();
	if mag > DEGENERATE_EPS {
		t / mag
	} else {
		Vec3::unit_x()
	}
}

fn face_normal(e1: Vec3, e2: Vec3) -> Vec3 {
	let n = e1.cross(e2);
	let mag = n.mag();
	if mag > DEGENERATE_EPS {
		n / mag
	} else {
		Vec3::unit_y()
	}
}

/// Computes per-vertex tangents for an indexed triangle list.
///
/// Each triangle contributes its raw UV-space tangent to its three vertices; the
/// accumulated sum is then Gram-Schmidt orthogonalized against the vertex normal.
/// Triangles with a degenerate UV determinant contribute a deterministic vector
/// perpendicular to the face normal instead, and vertices whose sum collapses to
/// zero fall back the same way against their own normal. Normals are expected to
/// be unit length.
pub fn solve(positions: &[Vec3], normals: &[Vec3], uvs: &[Vec2], triangles: &[[u16; 3]]) -> Vec<Vec3> {
	let mut acc = vec![Vec3::zero(); positions.len()];

	for tri in triangles.iter() {
		let i0 = tri[0] as usize;
		let i1 = tri[1] as usize;
		let i2 = tri[2] as usize;

		let e1 = positions[i1] - positions[i0];
		let e2 = positions[i2] - positions[i0];
		let d1 = uvs[i1] - uvs[i0];
		let d2 = uvs[i2] - uvs[i0];

		let det = d1.x * d2.y - d2.x * d1.y;
		let t = if det.abs() < DEGENERATE_EPS {
			perpendicular(face_normal(e1, e2))
		} else {
			(e1 * d2.y - e2 * d1.y) / det
		};

		acc[i0] += t;
		acc[i1] += t;
		acc[i2] += t;
	}

	positions.iter().enumerate().map(|(i, _)| {
		let n = normals[i];
		let t = acc[i] - n * n.dot(acc[i]);
		let mag = t.mag();

		if mag.is_finite() && mag > DEGENERATE_EPS {
			t / mag
		} else {
			perpendicular(n)
		}
	}).collect()
}
