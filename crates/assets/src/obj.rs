use crate::store::AssetError;
use serde::{Deserialize, Serialize};

/// A decoded mesh, unindexed per face corner (positions and normals are
/// expanded, indices are sequential). This matches what the instanced
/// pipeline uploads directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> u32 {
        self.positions.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    /// Built-in unit cube, the fallback when an OBJ fails to load.
    pub fn unit_cube() -> MeshData {
        let p = 0.5_f32;
        #[rustfmt::skip]
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0],  [[-p, -p,  p], [ p, -p,  p], [ p,  p,  p], [-p,  p,  p]]),
            ([0.0, 0.0, -1.0], [[ p, -p, -p], [-p, -p, -p], [-p,  p, -p], [ p,  p, -p]]),
            ([1.0, 0.0, 0.0],  [[ p, -p,  p], [ p, -p, -p], [ p,  p, -p], [ p,  p,  p]]),
            ([-1.0, 0.0, 0.0], [[-p, -p, -p], [-p, -p,  p], [-p,  p,  p], [-p,  p, -p]]),
            ([0.0, 1.0, 0.0],  [[-p,  p,  p], [ p,  p,  p], [ p,  p, -p], [-p,  p, -p]]),
            ([0.0, -1.0, 0.0], [[-p, -p, -p], [ p, -p, -p], [ p, -p,  p], [-p, -p,  p]]),
        ];
        let mut positions = Vec::with_capacity(24);
        let mut normals = Vec::with_capacity(24);
        let mut indices = Vec::with_capacity(36);
        for (normal, corners) in faces {
            let base = positions.len() as u32;
            for corner in corners {
                positions.push(corner);
                normals.push(normal);
            }
            indices.extend([base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        MeshData {
            name: "unit_cube".into(),
            positions,
            normals,
            indices,
        }
    }
}

/// Decode an OBJ document: `v` positions, `vn` normals, `f` faces.
///
/// Face corners may reference `v`, `v/vt`, `v//vn`, or `v/vt/vn` (1-based).
/// Corners are expanded to an unindexed stream with sequential indices;
/// faces with more than three corners are fan-triangulated. A corner with
/// no normal reference gets +Y.
pub fn decode_obj(name: &str, text: &str) -> Result<MeshData, AssetError> {
    let mut position_data: Vec<[f32; 3]> = Vec::new();
    let mut normal_data: Vec<[f32; 3]> = Vec::new();

    let mut positions: Vec<[f32; 3]> = Vec::new();
    let mut normals: Vec<[f32; 3]> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();

    for (line_no, line) in text.lines().enumerate() {
        let mut parts = line.split_whitespace();
        match parts.next() {
            Some("v") => {
                position_data.push(parse_vec3(&mut parts, line_no)?);
            }
            Some("vn") => {
                normal_data.push(parse_vec3(&mut parts, line_no)?);
            }
            Some("f") => {
                let corners: Vec<&str> = parts.collect();
                if corners.len() < 3 {
                    return Err(AssetError::ObjParse(format!(
                        "line {}: face with fewer than 3 vertices",
                        line_no + 1
                    )));
                }
                let mut resolved = Vec::with_capacity(corners.len());
                for corner in &corners {
                    resolved.push(resolve_corner(corner, &position_data, &normal_data, line_no)?);
                }
                // Fan triangulation around the first corner.
                for i in 1..resolved.len() - 1 {
                    for &(position, normal) in &[resolved[0], resolved[i], resolved[i + 1]] {
                        positions.push(position);
                        normals.push(normal);
                        indices.push(indices.len() as u32);
                    }
                }
            }
            // Comments, groups, materials, and texcoords are irrelevant here.
            _ => {}
        }
    }

    if positions.is_empty() {
        return Err(AssetError::ObjParse(format!("{name}: no faces found")));
    }

    Ok(MeshData {
        name: name.to_string(),
        positions,
        normals,
        indices,
    })
}

fn parse_vec3<'a>(
    parts: &mut impl Iterator<Item = &'a str>,
    line_no: usize,
) -> Result<[f32; 3], AssetError> {
    let mut out = [0.0f32; 3];
    for slot in &mut out {
        *slot = parts
            .next()
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| {
                AssetError::ObjParse(format!("line {}: expected 3 components", line_no + 1))
            })?;
    }
    Ok(out)
}

fn resolve_corner(
    corner: &str,
    position_data: &[[f32; 3]],
    normal_data: &[[f32; 3]],
    line_no: usize,
) -> Result<([f32; 3], [f32; 3]), AssetError> {
    let mut refs = corner.split('/');
    let v_index = parse_index(refs.next(), position_data.len(), line_no)?;
    let _vt = refs.next(); // texcoords unused
    let position = position_data[v_index];

    let normal = match refs.next() {
        Some(vn) if !vn.is_empty() => {
            let vn_index = parse_index(Some(vn), normal_data.len(), line_no)?;
            normal_data[vn_index]
        }
        _ => [0.0, 1.0, 0.0],
    };
    Ok((position, normal))
}

/// OBJ indices are 1-based; 0 and out-of-range references are malformed.
fn parse_index(raw: Option<&str>, len: usize, line_no: usize) -> Result<usize, AssetError> {
    let value: usize = raw
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AssetError::ObjParse(format!("line {}: bad index", line_no + 1)))?;
    if value == 0 || value > len {
        return Err(AssetError::ObjParse(format!(
            "line {}: index {} out of range (1..={})",
            line_no + 1,
            value,
            len
        )));
    }
    Ok(value - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1
";

    #[test]
    fn decodes_a_minimal_triangle() {
        let mesh = decode_obj("tri", TRIANGLE).unwrap();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals[0], [0.0, 0.0, 1.0]);
    }

    #[test]
    fn quad_faces_are_fan_triangulated() {
        let obj = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vn 0 0 1
f 1//1 2//1 3//1 4//1
";
        let mesh = decode_obj("quad", obj).unwrap();
        // One quad becomes two triangles, fully expanded.
        assert_eq!(mesh.vertex_count(), 6);
        assert_eq!(mesh.index_count(), 6);
    }

    #[test]
    fn missing_normal_defaults_to_up() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = decode_obj("flat", obj).unwrap();
        assert_eq!(mesh.normals[0], [0.0, 1.0, 0.0]);
    }

    #[test]
    fn slash_vt_slash_vn_form_decodes() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 1 0 0
f 1/9/1 2/9/1 3/9/1
";
        let mesh = decode_obj("vt", obj).unwrap();
        assert_eq!(mesh.normals[2], [1.0, 0.0, 0.0]);
    }

    #[test]
    fn out_of_range_index_is_an_error() {
        let obj = "\
v 0 0 0
f 1 2 3
";
        assert!(matches!(
            decode_obj("bad", obj),
            Err(AssetError::ObjParse(_))
        ));
    }

    #[test]
    fn empty_document_is_an_error() {
        assert!(decode_obj("empty", "# nothing here\n").is_err());
    }

    #[test]
    fn unit_cube_shape() {
        let cube = MeshData::unit_cube();
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.index_count(), 36);
    }
}
