//! Built-in spring bone chain.
//!
//! Each joint keeps its current and previous tail position. Per advance a joint
//! carries its inertia (damped by `drag`), is pulled toward its rest direction by
//! `stiffness` and along `gravity_dir` by `gravity_power`, is then re-attached to
//! its parent at bone length and finally pushed out of any overlapping collider.

use avatar_lens_api_core::SpringChainDesc;
use hashbrown::HashSet;

use crate::chain::{ChainPose, SecondaryMotionChain};
use crate::collider::Collider;
use crate::error::MotionError;
use crate::math::{self, Vec3};

#[derive(Clone, Debug)]
struct Joint {
    rest_offset: Vec3,
    length: f32,
    hit_radius: f32,
    current: Vec3,
    previous: Vec3,
}

#[derive(Clone, Debug)]
pub struct SpringBoneChain {
    name: String,
    root: Vec3,
    stiffness: f32,
    drag: f32,
    gravity_power: f32,
    gravity_dir: Vec3,
    /// Collider names to test against. `None` means every collider.
    collider_filter: Option<HashSet<String>>,
    joints: Vec<Joint>,
}

fn non_negative(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v.max(0.0)
    } else {
        fallback
    }
}

impl SpringBoneChain {
    pub fn from_desc(desc: &SpringChainDesc) -> Self {
        let mut tail = desc.root;
        let joints = desc
            .joints
            .iter()
            .map(|j| {
                tail = math::add(tail, j.rest_offset);
                Joint {
                    rest_offset: j.rest_offset,
                    length: math::length(j.rest_offset),
                    hit_radius: non_negative(j.hit_radius, 0.0),
                    current: tail,
                    previous: tail,
                }
            })
            .collect();
        let collider_filter =
            (!desc.colliders.is_empty()).then(|| desc.colliders.iter().cloned().collect());
        Self {
            name: desc.name.clone(),
            root: desc.root,
            stiffness: non_negative(desc.stiffness, 1.0),
            drag: non_negative(desc.drag, 0.4).min(1.0),
            gravity_power: non_negative(desc.gravity_power, 0.0),
            gravity_dir: math::normalize_or(desc.gravity_dir, [0.0, -1.0, 0.0]),
            collider_filter,
            joints,
        }
    }

    pub fn joint_count(&self) -> usize {
        self.joints.len()
    }

    pub fn tails(&self) -> Vec<Vec3> {
        self.joints.iter().map(|j| j.current).collect()
    }

    fn collides_with(&self, collider: &Collider) -> bool {
        self.collider_filter
            .as_ref()
            .map_or(true, |names| names.contains(&collider.name))
    }
}

impl SecondaryMotionChain for SpringBoneChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn advance(&mut self, dt: f32, colliders: &[Collider]) -> Result<(), MotionError> {
        if !dt.is_finite() || dt <= 0.0 {
            return Ok(());
        }
        let relevant: Vec<&Collider> = colliders
            .iter()
            .filter(|c| self.collides_with(c))
            .collect();
        let pull = (self.stiffness * dt).min(1.0);
        let gravity = math::scale(self.gravity_dir, self.gravity_power * dt);

        let mut parent = self.root;
        for joint in &mut self.joints {
            let inertia = math::scale(math::sub(joint.current, joint.previous), 1.0 - self.drag);
            let rest_target = math::add(parent, joint.rest_offset);
            let toward_rest = math::scale(math::sub(rest_target, joint.current), pull);

            let mut next = math::add(joint.current, inertia);
            next = math::add(next, toward_rest);
            next = math::add(next, gravity);
            next = reattach(parent, next, joint);

            for collider in &relevant {
                if let Some(pushed) = collider.push_out(next, joint.hit_radius) {
                    next = reattach(parent, pushed, joint);
                }
            }

            joint.previous = joint.current;
            joint.current = next;
            parent = next;
        }

        if self.joints.iter().all(|j| math::is_finite(j.current)) {
            Ok(())
        } else {
            self.reset_to_rest();
            Err(MotionError::Diverged {
                chain: self.name.clone(),
            })
        }
    }

    fn reset_to_rest(&mut self) {
        let mut tail = self.root;
        for joint in &mut self.joints {
            tail = math::add(tail, joint.rest_offset);
            joint.current = tail;
            joint.previous = tail;
        }
    }

    fn pose(&self) -> ChainPose {
        ChainPose {
            chain: self.name.clone(),
            joints: self.tails(),
        }
    }
}

/// Keep `joint` at bone length from `parent`, pointing toward `candidate`.
fn reattach(parent: Vec3, candidate: Vec3, joint: &Joint) -> Vec3 {
    let fallback = math::normalize_or(joint.rest_offset, [0.0, -1.0, 0.0]);
    let dir = math::normalize_or(math::sub(candidate, parent), fallback);
    math::add(parent, math::scale(dir, joint.length))
}

#[cfg(test)]
mod tests {
    use super::*;
    use avatar_lens_api_core::{ColliderShape, SpringJointDesc};

    fn desc() -> SpringChainDesc {
        SpringChainDesc {
            name: "Tail".into(),
            root: [0.0, 1.0, 0.0],
            joints: vec![
                SpringJointDesc {
                    name: "t1".into(),
                    rest_offset: [0.2, 0.0, 0.0],
                    hit_radius: 0.0,
                },
                SpringJointDesc {
                    name: "t2".into(),
                    rest_offset: [0.2, 0.0, 0.0],
                    hit_radius: 0.0,
                },
            ],
            stiffness: 0.5,
            drag: 0.4,
            gravity_power: 2.0,
            gravity_dir: [0.0, -1.0, 0.0],
            colliders: Vec::new(),
        }
    }

    #[test]
    fn starts_at_rest() {
        let chain = SpringBoneChain::from_desc(&desc());
        let tails = chain.tails();
        assert!((tails[0][0] - 0.2).abs() < 1e-6);
        assert!((tails[1][0] - 0.4).abs() < 1e-6);
    }

    #[test]
    fn gravity_sags_the_chain_but_keeps_bone_lengths() {
        let mut chain = SpringBoneChain::from_desc(&desc());
        for _ in 0..30 {
            chain.advance(1.0 / 60.0, &[]).unwrap();
        }
        let tails = chain.tails();
        assert!(tails[1][1] < 1.0, "tip should hang below the root");
        let first = math::distance([0.0, 1.0, 0.0], tails[0]);
        let second = math::distance(tails[0], tails[1]);
        assert!((first - 0.2).abs() < 1e-4);
        assert!((second - 0.2).abs() < 1e-4);
    }

    #[test]
    fn zero_or_bad_dt_is_a_no_op() {
        let mut chain = SpringBoneChain::from_desc(&desc());
        let before = chain.tails();
        chain.advance(0.0, &[]).unwrap();
        chain.advance(f32::NAN, &[]).unwrap();
        assert_eq!(chain.tails(), before);
    }

    #[test]
    fn reset_restores_rest_pose() {
        let mut chain = SpringBoneChain::from_desc(&desc());
        let rest = chain.tails();
        for _ in 0..10 {
            chain.advance(1.0 / 60.0, &[]).unwrap();
        }
        assert_ne!(chain.tails(), rest);
        chain.reset_to_rest();
        assert_eq!(chain.tails(), rest);
    }

    #[test]
    fn colliders_push_joints_out() {
        let d = SpringChainDesc {
            name: "Pendant".into(),
            root: [0.0, 1.0, 0.0],
            joints: vec![SpringJointDesc {
                name: "p1".into(),
                rest_offset: [0.0, -0.2, 0.0],
                hit_radius: 0.0,
            }],
            stiffness: 0.0,
            drag: 0.4,
            gravity_power: 0.0,
            gravity_dir: [0.0, -1.0, 0.0],
            colliders: Vec::new(),
        };
        let ball = Collider {
            name: "Ball".into(),
            shape: ColliderShape::Sphere {
                center: [0.05, 0.8, 0.0],
                radius: 0.1,
            },
        };
        let mut free = SpringBoneChain::from_desc(&d);
        free.advance(1.0 / 60.0, &[]).unwrap();
        assert!(free.tails()[0][0].abs() < 1e-6);

        let mut blocked = SpringBoneChain::from_desc(&d);
        blocked
            .advance(1.0 / 60.0, std::slice::from_ref(&ball))
            .unwrap();
        let tip = blocked.tails()[0];
        assert!(tip[0] < -0.04, "joint should be pushed away from the ball");
        assert!(math::distance(tip, [0.05, 0.8, 0.0]) > 0.09);
        assert!((math::distance(tip, [0.0, 1.0, 0.0]) - 0.2).abs() < 1e-5);
    }

    #[test]
    fn collider_filter_skips_unlisted_colliders() {
        let mut d = desc();
        d.colliders = vec!["Head".into()];
        let chain = SpringBoneChain::from_desc(&d);
        let other = Collider {
            name: "Hips".into(),
            shape: ColliderShape::Sphere {
                center: [0.0; 3],
                radius: 1.0,
            },
        };
        assert!(!chain.collides_with(&other));
    }

    #[test]
    fn divergence_resets_and_reports() {
        let mut chain = SpringBoneChain::from_desc(&desc());
        chain.joints[0].previous = [f32::INFINITY, 0.0, 0.0];
        let err = chain.advance(1.0 / 60.0, &[]).unwrap_err();
        assert_eq!(
            err,
            MotionError::Diverged {
                chain: "Tail".into()
            }
        );
        assert!(chain.tails().iter().all(|t| math::is_finite(*t)));
    }
}
