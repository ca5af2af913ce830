/// Ray picking against the meshes of a frame tree

use glam::{Mat3, Mat4, Vec3};
use crate::math::{self, Ray};
use crate::resource::mesh::Mesh;
use crate::scene::{Frame, Visual};

/// One mesh hit by a pick ray
#[derive(Debug, Clone)]
pub struct PickHit {
    /// The mesh that was hit
    pub visual: Visual,
    /// Frames from the root down to the frame holding `visual`
    pub frames: Vec<Frame>,
    /// Distance from the camera along the ray
    pub distance: f32,
}

/// World-space ray through viewport pixel `(x, y)`.
///
/// # Arguments
///
/// * `x`, `y` - Pixel coordinates, origin top-left
/// * `width`, `height` - Viewport size in pixels
/// * `front`, `field` - Near distance and half-width of the view window at `front`
/// * `camera_world` - Camera frame's local-to-world matrix
pub fn build_pick_ray(
    x: f32,
    y: f32,
    width: u32,
    height: u32,
    front: f32,
    field: f32,
    camera_world: &Mat4,
) -> Ray {
    let (w, h) = (width.max(1) as f32, height.max(1) as f32);
    let aspect = w / h;
    let nx = 2.0 * x / w - 1.0;
    let ny = 1.0 - 2.0 * y / h;
    let f = front / field;

    let dir_view = Vec3::new(nx / f, ny / (f * aspect), 1.0).normalize();
    let dir_world = Mat3::from_mat4(*camera_world) * dir_view;
    Ray::new(math::translation(camera_world), dir_world)
}

/// Every mesh under `root` hit by `ray`, nearest first.
///
/// Frames attached as visuals are descended into for the hit path, but each
/// mesh is placed with the world matrix of the frame holding it, walked up
/// its parent chain.
pub fn pick(root: &Frame, ray: &Ray) -> Vec<PickHit> {
    let mut hits = Vec::new();
    let mut path = Vec::new();
    pick_frame(root, ray, &mut path, &mut hits);
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}

fn pick_frame(frame: &Frame, ray: &Ray, path: &mut Vec<Frame>, hits: &mut Vec<PickHit>) {
    let world = frame.world_matrix();
    path.push(frame.clone());

    for visual in frame.visuals() {
        match &visual {
            Visual::Frame(sub) => pick_frame(sub, ray, path, hits),
            Visual::Mesh(mesh) => {
                if let Some(distance) = intersect_mesh(ray, mesh, &world) {
                    hits.push(PickHit {
                        visual: visual.clone(),
                        frames: path.clone(),
                        distance,
                    });
                }
            }
        }
    }

    path.pop();
}

/// Closest triangle hit of `mesh` placed with `world`, after a bounding box
/// pre-test
fn intersect_mesh(ray: &Ray, mesh: &Mesh, world: &Mat4) -> Option<f32> {
    let bounds = mesh.bounding_box();
    if bounds.is_empty() {
        return None;
    }
    ray.intersect_aabb(&bounds.transform(world))?;

    let mut closest: Option<f32> = None;
    for group in mesh.groups().iter() {
        let vertices = group.vertices();
        for tri in group.indices().chunks_exact(3) {
            let fetch = |i: u32| vertices.get(i as usize).map(|v| world.transform_point3(v.position));
            let (Some(v0), Some(v1), Some(v2)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
                continue;
            };
            if let Some(t) = ray.intersect_triangle(v0, v1, v2) {
                closest = Some(closest.map_or(t, |c| c.min(t)));
            }
        }
    }
    closest
}

#[cfg(test)]
#[path = "picker_tests.rs"]
mod tests;
