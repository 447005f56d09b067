//! Local node transforms.

use glam::{Mat3, Mat4, Quat, Vec3};
use glint_core::Node;

/// Columns shorter than this count as collapsed.
const EPSILON: f32 = 1e-8;

/// Translation, rotation and scale of a node relative to its parent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Transform {
    pub const IDENTITY: Self = Self {
        translation: Vec3::ZERO,
        rotation: Quat::IDENTITY,
        scale: Vec3::ONE,
    };

    /// The node's local transform. A `matrix` is decomposed; missing TRS
    /// parts default to identity.
    pub fn from_node(node: &Node) -> Self {
        if let Some(matrix) = &node.matrix {
            return Self::from_matrix(Mat4::from_cols_array(matrix));
        }
        let rotation = node
            .rotation
            .map(Quat::from_array)
            .map_or(Quat::IDENTITY, |q| {
                if q.length_squared() > EPSILON {
                    q.normalize()
                } else {
                    Quat::IDENTITY
                }
            });
        Self {
            translation: node.translation.map_or(Vec3::ZERO, Vec3::from_array),
            rotation,
            scale: node.scale.map_or(Vec3::ONE, Vec3::from_array),
        }
    }

    /// Decompose an affine matrix.
    ///
    /// Scale is the length of each basis column. A mirrored basis (negative
    /// determinant) carries the reflection on the X scale. Collapsed columns
    /// are rebuilt from the remaining axes so the rotation stays orthonormal.
    /// The result is always finite.
    pub fn from_matrix(matrix: Mat4) -> Self {
        if !matrix.is_finite() {
            log::warn!("non-finite node matrix replaced by identity");
            return Self::IDENTITY;
        }

        let translation = matrix.w_axis.truncate();
        let columns = [
            matrix.x_axis.truncate(),
            matrix.y_axis.truncate(),
            matrix.z_axis.truncate(),
        ];
        let mut scale = Vec3::new(columns[0].length(), columns[1].length(), columns[2].length());
        let mirrored = Mat3::from_cols(columns[0], columns[1], columns[2]).determinant() < 0.0;
        if mirrored {
            scale.x = -scale.x;
        }

        let mut basis = rebuild_collapsed(columns);
        if mirrored {
            basis[0] = -basis[0];
        }
        let rotation = Quat::from_mat3(&orthonormalize(basis)).normalize();

        Self {
            translation,
            rotation,
            scale,
        }
    }

    /// Column-major matrix `T * R * S`.
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.translation)
    }
}

/// Unit basis vectors, with collapsed columns replaced.
fn rebuild_collapsed(columns: [Vec3; 3]) -> [Vec3; 3] {
    let live: Vec<usize> = (0..3).filter(|&i| columns[i].length() > EPSILON).collect();
    let unit = |i: usize| columns[i].normalize();
    match live.as_slice() {
        [_, _, _] => [unit(0), unit(1), unit(2)],
        [a, b] => {
            let mut basis = [Vec3::ZERO; 3];
            basis[*a] = unit(*a);
            basis[*b] = unit(*b);
            let missing = 3 - a - b;
            // x = y × z, y = z × x, z = x × y
            let rebuilt = basis[(missing + 1) % 3].cross(basis[(missing + 2) % 3]);
            basis[missing] = if rebuilt.length() > EPSILON {
                rebuilt.normalize()
            } else {
                basis[(missing + 1) % 3].any_orthonormal_vector()
            };
            basis
        }
        [a] => {
            let axis = unit(*a);
            let (u, v) = axis.any_orthonormal_pair();
            let mut basis = [Vec3::ZERO; 3];
            basis[*a] = axis;
            basis[(a + 1) % 3] = u;
            basis[(a + 2) % 3] = v;
            basis
        }
        _ => [Vec3::X, Vec3::Y, Vec3::Z],
    }
}

/// Gram–Schmidt on the first two axes; the third follows from them.
fn orthonormalize(basis: [Vec3; 3]) -> Mat3 {
    let x = basis[0].normalize_or_zero();
    let x = if x == Vec3::ZERO { Vec3::X } else { x };
    let y = (basis[1] - x * x.dot(basis[1])).normalize_or_zero();
    let y = if y == Vec3::ZERO {
        x.any_orthonormal_vector()
    } else {
        y
    };
    Mat3::from_cols(x, y, x.cross(y))
}
