//! Affine transformations with an identity fast path.
//!
//! A [`Transformation`] wraps a column-major `Matrix4<f64>` acting on
//! column vectors (`p' = M * p`). The identity flag is computed once so
//! no-op transforms can be skipped cheaply throughout the crate.

use nalgebra::{Matrix3, Matrix4, Point3, Rotation3, UnitQuaternion, Vector3};

use crate::geometry::is_equal;

/// Composes a TRS matrix: translation, then rotation, then scale, applied
/// to a point in scale-rotation-translation order.
pub fn compose_trs(
    translation: &Vector3<f64>,
    rotation: &UnitQuaternion<f64>,
    scale: &Vector3<f64>,
) -> Matrix4<f64> {
    Matrix4::new_translation(translation)
        * rotation.to_homogeneous()
        * Matrix4::new_nonuniform_scaling(scale)
}

/// Decomposes an affine matrix into translation, rotation and scale.
///
/// The inverse of [`compose_trs`] for matrices built from TRS components.
/// A negative determinant is folded into the x scale factor.
pub fn decompose_trs(matrix: &Matrix4<f64>) -> (Vector3<f64>, UnitQuaternion<f64>, Vector3<f64>) {
    let translation = Vector3::new(matrix[(0, 3)], matrix[(1, 3)], matrix[(2, 3)]);

    let linear: Matrix3<f64> = matrix.fixed_view::<3, 3>(0, 0).into_owned();
    let mut scale = Vector3::new(
        linear.column(0).norm(),
        linear.column(1).norm(),
        linear.column(2).norm(),
    );
    if linear.determinant() < 0.0 {
        scale.x = -scale.x;
    }

    let mut rotation_matrix = linear;
    for axis in 0..3 {
        let factor = scale[axis];
        if factor != 0.0 {
            for row in 0..3 {
                rotation_matrix[(row, axis)] /= factor;
            }
        }
    }

    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(
        rotation_matrix,
    ));
    (translation, rotation, scale)
}

/// An affine transformation owned by a node or applied to a mesh.
#[derive(Debug, Clone)]
pub struct Transformation {
    matrix: Matrix4<f64>,
    identity: bool,
}

impl Transformation {
    /// The identity transformation.
    pub fn identity() -> Self {
        Self {
            matrix: Matrix4::identity(),
            identity: true,
        }
    }

    pub fn new(matrix: Matrix4<f64>) -> Self {
        let identity = matrix_is_identity(&matrix);
        Self { matrix, identity }
    }

    pub fn from_translation(x: f64, y: f64, z: f64) -> Self {
        Self::new(Matrix4::new_translation(&Vector3::new(x, y, z)))
    }

    pub fn from_rotation(rotation: &UnitQuaternion<f64>) -> Self {
        Self::new(rotation.to_homogeneous())
    }

    pub fn from_scale(x: f64, y: f64, z: f64) -> Self {
        Self::new(Matrix4::new_nonuniform_scaling(&Vector3::new(x, y, z)))
    }

    #[inline]
    pub fn is_identity(&self) -> bool {
        self.identity
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn set_matrix(&mut self, matrix: Matrix4<f64>) {
        self.identity = matrix_is_identity(&matrix);
        self.matrix = matrix;
    }

    /// Appends `other` so that it applies after everything already here.
    pub fn append(&mut self, other: &Transformation) {
        self.append_matrix(&other.matrix);
    }

    /// Appends a matrix so that it applies after everything already here.
    pub fn append_matrix(&mut self, matrix: &Matrix4<f64>) {
        self.set_matrix(matrix * self.matrix);
    }

    /// Composes with a child transformation: the result applies `child`
    /// first, then `self`. Identity on either side short-circuits.
    pub fn child(&self, child: &Transformation) -> Transformation {
        if self.identity {
            return child.clone();
        }
        if child.identity {
            return self.clone();
        }
        Transformation::new(self.matrix * child.matrix)
    }

    pub fn transform_point(&self, point: &Point3<f64>) -> Point3<f64> {
        if self.identity {
            return *point;
        }
        self.matrix.transform_point(point)
    }

    pub fn transform_vector(&self, vector: &Vector3<f64>) -> Vector3<f64> {
        if self.identity {
            return *vector;
        }
        self.matrix.transform_vector(vector)
    }

    /// The rotation-only part of this transformation, for normals.
    pub fn rotation_only(&self) -> Transformation {
        if self.identity {
            return Transformation::identity();
        }
        let (_, rotation, _) = decompose_trs(&self.matrix);
        Transformation::from_rotation(&rotation)
    }
}

impl Default for Transformation {
    fn default() -> Self {
        Self::identity()
    }
}

fn matrix_is_identity(matrix: &Matrix4<f64>) -> bool {
    let identity = Matrix4::<f64>::identity();
    matrix
        .iter()
        .zip(identity.iter())
        .all(|(a, b)| is_equal(*a, *b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::is_equal_point3;
    use nalgebra::{Unit, Vector3};
    use std::f64::consts::PI;

    fn rotation_y_90() -> UnitQuaternion<f64> {
        UnitQuaternion::from_axis_angle(&Unit::new_normalize(Vector3::y()), PI / 2.0)
    }

    #[test]
    fn test_identity() {
        let tr = Transformation::identity();
        assert!(tr.is_identity());

        let coord = Point3::new(1.0, 2.0, 3.0);
        assert!(is_equal_point3(&tr.transform_point(&coord), &coord));
    }

    #[test]
    fn test_append_scale_rotation_translation() {
        let coord = Point3::new(1.0, 2.0, 3.0);
        let mut tr = Transformation::identity();

        tr.append(&Transformation::from_scale(3.0, 4.0, 5.0));
        assert!(!tr.is_identity());
        assert!(is_equal_point3(
            &tr.transform_point(&coord),
            &Point3::new(3.0, 8.0, 15.0)
        ));

        tr.append(&Transformation::from_rotation(&rotation_y_90()));
        assert!(is_equal_point3(
            &tr.transform_point(&coord),
            &Point3::new(15.0, 8.0, -3.0)
        ));

        tr.append(&Transformation::from_translation(4.0, 5.0, 6.0));
        assert!(is_equal_point3(
            &tr.transform_point(&coord),
            &Point3::new(19.0, 13.0, 3.0)
        ));
    }

    #[test]
    fn test_trs_compose() {
        let coord = Point3::new(1.0, 2.0, 3.0);
        let matrix = compose_trs(
            &Vector3::new(4.0, 5.0, 6.0),
            &rotation_y_90(),
            &Vector3::new(3.0, 4.0, 5.0),
        );
        let tr = Transformation::new(matrix);
        assert!(is_equal_point3(
            &tr.transform_point(&coord),
            &Point3::new(19.0, 13.0, 3.0)
        ));
    }

    #[test]
    fn test_trs_decompose_recompose() {
        let coord = Point3::new(1.0, 2.0, 3.0);
        let matrix = compose_trs(
            &Vector3::new(4.0, 5.0, 6.0),
            &rotation_y_90(),
            &Vector3::new(3.0, 4.0, 5.0),
        );

        let (translation, rotation, scale) = decompose_trs(&matrix);
        let recomposed = Transformation::new(compose_trs(&translation, &rotation, &scale));
        assert!(is_equal_point3(
            &recomposed.transform_point(&coord),
            &Point3::new(19.0, 13.0, 3.0)
        ));
    }

    #[test]
    fn test_default_quaternion() {
        let coord = Point3::new(1.0, 2.0, 3.0);
        let tr = Transformation::from_rotation(&UnitQuaternion::identity());
        assert!(tr.is_identity());
        assert!(is_equal_point3(&tr.transform_point(&coord), &coord));
    }

    #[test]
    fn test_child_composition() {
        let parent = Transformation::from_rotation(&UnitQuaternion::from_axis_angle(
            &Unit::new_normalize(Vector3::z()),
            PI / 2.0,
        ));
        let child = Transformation::from_translation(2.0, 0.0, 0.0);
        let world = parent.child(&child);

        // Translate first, then rotate about Z.
        assert!(is_equal_point3(
            &world.transform_point(&Point3::new(0.0, 0.0, 0.0)),
            &Point3::new(0.0, 2.0, 0.0)
        ));
    }

    #[test]
    fn test_child_identity_fast_path() {
        let identity = Transformation::identity();
        let translated = Transformation::from_translation(1.0, 2.0, 3.0);

        assert!(!identity.child(&translated).is_identity());
        assert!(!translated.child(&identity).is_identity());
        assert!(identity.child(&identity).is_identity());
    }
}
