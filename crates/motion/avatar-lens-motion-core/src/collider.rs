//! Runtime colliders that spring joints are pushed out of.

use avatar_lens_api_core::{ColliderDesc, ColliderShape};

use crate::math::{self, Vec3};

#[derive(Clone, Debug, PartialEq)]
pub struct Collider {
    pub name: String,
    pub shape: ColliderShape,
}

impl Collider {
    pub fn from_desc(desc: &ColliderDesc) -> Self {
        Self {
            name: desc.name.clone(),
            shape: desc.shape.clone(),
        }
    }

    /// If a sphere of `radius` at `point` overlaps this collider, return the
    /// nearest position where it just touches the surface.
    pub fn push_out(&self, point: Vec3, radius: f32) -> Option<Vec3> {
        let (core, core_radius) = match &self.shape {
            ColliderShape::Sphere { center, radius } => (*center, *radius),
            ColliderShape::Capsule {
                center,
                tail,
                radius,
            } => (math::closest_point_on_segment(point, *center, *tail), *radius),
        };
        let reach = core_radius + radius;
        let offset = math::sub(point, core);
        let dist = math::length(offset);
        if dist >= reach {
            return None;
        }
        let dir = math::normalize_or(offset, [0.0, 1.0, 0.0]);
        Some(math::add(core, math::scale(dir, reach)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sphere() -> Collider {
        Collider {
            name: "Head".into(),
            shape: ColliderShape::Sphere {
                center: [0.0, 0.0, 0.0],
                radius: 1.0,
            },
        }
    }

    #[test]
    fn points_outside_are_left_alone() {
        assert_eq!(sphere().push_out([0.0, 2.0, 0.0], 0.5), None);
    }

    #[test]
    fn sphere_pushes_to_surface_plus_hit_radius() {
        let out = sphere().push_out([0.0, 0.5, 0.0], 0.25).unwrap();
        assert!((out[1] - 1.25).abs() < 1e-6);
    }

    #[test]
    fn capsule_pushes_perpendicular_to_its_axis() {
        let capsule = Collider {
            name: "Hips".into(),
            shape: ColliderShape::Capsule {
                center: [0.0, 0.0, 0.0],
                tail: [0.0, 2.0, 0.0],
                radius: 0.5,
            },
        };
        let out = capsule.push_out([0.2, 1.0, 0.0], 0.0).unwrap();
        assert!((out[0] - 0.5).abs() < 1e-6);
        assert!((out[1] - 1.0).abs() < 1e-6);
    }
}
