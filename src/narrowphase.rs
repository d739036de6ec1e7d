use glam::Vec2;

use crate::types::Shape;

/// Squared-magnitude guard for degenerate axes, normals, and velocities.
pub(crate) const EPS_SQ: f32 = 1e-9;

/// Overlap result along the minimum translation axis.
#[derive(Copy, Clone, Debug)]
pub struct SatContact {
    /// Unit axis of minimum overlap, oriented from A toward B. Zero only for
    /// fully degenerate contacts (coincident circle centers).
    pub normal: Vec2,
    /// Penetration depth along `normal` (>= 0).
    pub depth: f32,
    /// Representative contact point (approximate for polygon pairs).
    pub point: Vec2,
}

/// Separating Axis Theorem tests over the supported shape pairs.
///
/// Candidate axes are every polygon edge normal plus, for circle
/// participants, the axis through the circle center and the nearest vertex.
/// If every axis shows overlap the shapes intersect, and the axis of minimum
/// overlap defines the minimum translation vector.
pub struct Sat;

impl Sat {
    /// Overlap test between two world-space shapes. `None` when separated or
    /// when either shape lacks valid geometry.
    pub fn test(
        center_a: Vec2,
        shape_a: &Shape,
        center_b: Vec2,
        shape_b: &Shape,
    ) -> Option<SatContact> {
        match (shape_a, shape_b) {
            (Shape::Circle { radius: ra }, Shape::Circle { radius: rb }) => {
                Self::circle_circle(center_a, *ra, center_b, *rb)
            }
            (Shape::Circle { radius }, Shape::Polygon { vertices }) => {
                Self::circle_polygon(center_a, *radius, center_b, vertices)
            }
            (Shape::Polygon { vertices }, Shape::Circle { radius }) => {
                let hit = Self::circle_polygon(center_b, *radius, center_a, vertices)?;
                Some(SatContact {
                    normal: -hit.normal,
                    ..hit
                })
            }
            (Shape::Polygon { vertices: va }, Shape::Polygon { vertices: vb }) => {
                Self::polygon_polygon(center_a, va, center_b, vb)
            }
        }
    }

    fn circle_circle(ca: Vec2, ra: f32, cb: Vec2, rb: f32) -> Option<SatContact> {
        let delta = cb - ca;
        let dist_sq = delta.length_squared();
        let rsum = ra + rb;
        if dist_sq > rsum * rsum {
            return None;
        }
        if dist_sq <= EPS_SQ {
            // Coincident centers: no axis to separate along. Zero normal
            // marks the contact as degenerate.
            return Some(SatContact {
                normal: Vec2::ZERO,
                depth: rsum,
                point: ca,
            });
        }
        let dist = dist_sq.sqrt();
        let normal = delta / dist;
        let depth = rsum - dist;
        Some(SatContact {
            normal,
            depth,
            point: ca + normal * (ra - depth * 0.5),
        })
    }

    fn circle_polygon(cc: Vec2, r: f32, pc: Vec2, verts: &[Vec2]) -> Option<SatContact> {
        if verts.len() < 3 {
            return None;
        }
        let mut best_depth = f32::INFINITY;
        let mut best_axis = Vec2::ZERO;

        let mut test_axis = |axis: Vec2| -> bool {
            let (pmin, pmax) = project(pc, verts, axis);
            let cd = cc.dot(axis);
            let (cmin, cmax) = (cd - r, cd + r);
            if pmax < cmin || cmax < pmin {
                return false;
            }
            let overlap = (pmax - cmin).min(cmax - pmin);
            if overlap < best_depth {
                best_depth = overlap;
                best_axis = axis;
            }
            true
        };

        let n = verts.len();
        for i in 0..n {
            let edge = verts[(i + 1) % n] - verts[i];
            let axis = Vec2::new(edge.y, -edge.x);
            if axis.length_squared() <= EPS_SQ {
                continue;
            }
            if !test_axis(axis.normalize()) {
                return None;
            }
        }

        // Axis through the circle center and the nearest vertex catches
        // corner contacts the edge normals miss.
        let mut nearest = pc + verts[0];
        let mut nearest_sq = (nearest - cc).length_squared();
        for v in &verts[1..] {
            let w = pc + *v;
            let d = (w - cc).length_squared();
            if d < nearest_sq {
                nearest_sq = d;
                nearest = w;
            }
        }
        if nearest_sq > EPS_SQ && !test_axis((nearest - cc) / nearest_sq.sqrt()) {
            return None;
        }

        if !best_depth.is_finite() {
            return None;
        }
        let mut normal = best_axis;
        if (centroid(pc, verts) - cc).dot(normal) < 0.0 {
            normal = -normal;
        }
        Some(SatContact {
            normal,
            depth: best_depth,
            point: cc + normal * (r - best_depth * 0.5),
        })
    }

    fn polygon_polygon(ca: Vec2, va: &[Vec2], cb: Vec2, vb: &[Vec2]) -> Option<SatContact> {
        if va.len() < 3 || vb.len() < 3 {
            return None;
        }
        let mut best_depth = f32::INFINITY;
        let mut best_axis = Vec2::ZERO;

        for verts in [va, vb] {
            let n = verts.len();
            for i in 0..n {
                let edge = verts[(i + 1) % n] - verts[i];
                let axis = Vec2::new(edge.y, -edge.x);
                if axis.length_squared() <= EPS_SQ {
                    continue;
                }
                let axis = axis.normalize();
                let (amin, amax) = project(ca, va, axis);
                let (bmin, bmax) = project(cb, vb, axis);
                if amax < bmin || bmax < amin {
                    return None;
                }
                let overlap = (amax - bmin).min(bmax - amin);
                if overlap < best_depth {
                    best_depth = overlap;
                    best_axis = axis;
                }
            }
        }

        if !best_depth.is_finite() {
            return None;
        }
        let mut normal = best_axis;
        if (centroid(cb, vb) - centroid(ca, va)).dot(normal) < 0.0 {
            normal = -normal;
        }
        // Midpoint between each hull's deepest support vertex.
        let deep_a = support(ca, va, normal);
        let deep_b = support(cb, vb, -normal);
        Some(SatContact {
            normal,
            depth: best_depth,
            point: (deep_a + deep_b) * 0.5,
        })
    }
}

/// Project world-space vertices onto a unit axis.
fn project(origin: Vec2, verts: &[Vec2], axis: Vec2) -> (f32, f32) {
    let mut min = f32::INFINITY;
    let mut max = f32::NEG_INFINITY;
    for v in verts {
        let d = (origin + *v).dot(axis);
        min = min.min(d);
        max = max.max(d);
    }
    (min, max)
}

/// Farthest world-space vertex along `dir`.
fn support(origin: Vec2, verts: &[Vec2], dir: Vec2) -> Vec2 {
    let mut best = origin + verts[0];
    let mut best_d = best.dot(dir);
    for v in &verts[1..] {
        let w = origin + *v;
        let d = w.dot(dir);
        if d > best_d {
            best_d = d;
            best = w;
        }
    }
    best
}

fn centroid(origin: Vec2, verts: &[Vec2]) -> Vec2 {
    origin + verts.iter().copied().sum::<Vec2>() / verts.len() as f32
}

/// World-space bounds used for broadphase binning.
pub(crate) fn shape_aabb(center: Vec2, shape: &Shape) -> (Vec2, Vec2) {
    match shape {
        Shape::Circle { radius } => {
            let r = Vec2::splat(radius.abs());
            (center - r, center + r)
        }
        Shape::Polygon { vertices } => {
            if vertices.is_empty() {
                return (center, center);
            }
            let mut min = Vec2::splat(f32::INFINITY);
            let mut max = Vec2::splat(f32::NEG_INFINITY);
            for v in vertices {
                let w = center + *v;
                min = min.min(w);
                max = max.max(w);
            }
            (min, max)
        }
    }
}
