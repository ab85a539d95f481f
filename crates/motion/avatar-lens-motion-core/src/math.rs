//! Small `[f32; 3]` helpers.

pub type Vec3 = [f32; 3];

#[inline]
pub fn add(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

#[inline]
pub fn sub(a: Vec3, b: Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
pub fn scale(a: Vec3, s: f32) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

#[inline]
pub fn dot(a: Vec3, b: Vec3) -> f32 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[inline]
pub fn length(a: Vec3) -> f32 {
    dot(a, a).sqrt()
}

#[inline]
pub fn distance(a: Vec3, b: Vec3) -> f32 {
    length(sub(a, b))
}

/// Unit vector along `a`, or `fallback` when `a` is (near) zero.
pub fn normalize_or(a: Vec3, fallback: Vec3) -> Vec3 {
    let len = length(a);
    if len > 1.0e-6 {
        scale(a, 1.0 / len)
    } else {
        fallback
    }
}

pub fn is_finite(a: Vec3) -> bool {
    a.iter().all(|c| c.is_finite())
}

pub fn closest_point_on_segment(p: Vec3, a: Vec3, b: Vec3) -> Vec3 {
    let ab = sub(b, a);
    let denom = dot(ab, ab);
    if denom <= f32::EPSILON {
        return a;
    }
    let t = (dot(sub(p, a), ab) / denom).clamp(0.0, 1.0);
    add(a, scale(ab, t))
}
