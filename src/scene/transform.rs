use glam::{EulerRot, Mat4, Quat, Vec3};

/// Position, Euler rotation (XYZ order, radians) and scale of one node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
}

impl Transform {
    pub const IDENTITY: Transform = Transform {
        position: Vec3::ZERO,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
    };

    pub fn from_arrays(position: [f32; 3], rotation: [f32; 3], scale: [f32; 3]) -> Self {
        Self {
            position: Vec3::from_array(position),
            rotation: Vec3::from_array(rotation),
            scale: Vec3::from_array(scale),
        }
    }

    pub fn orientation(&self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.rotation.x, self.rotation.y, self.rotation.z)
    }

    /// Model matrix: scale, then rotate, then translate
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.orientation(), self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_identity_matrix() {
        assert_eq!(Transform::IDENTITY.to_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_translation_and_scale() {
        let t = Transform::from_arrays([1.0, 2.0, 3.0], [0.0; 3], [2.0, 2.0, 2.0]);
        let p = t.to_matrix().transform_point3(Vec3::new(0.5, 0.0, 0.0));
        assert!((p - Vec3::new(2.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_about_y() {
        let t = Transform::from_arrays([0.0; 3], [0.0, FRAC_PI_2, 0.0], [1.0; 3]);
        let p = t.to_matrix().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }
}
