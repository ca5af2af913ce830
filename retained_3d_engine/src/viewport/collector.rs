/// Scene collection: lights and visible geometry for one frame.
///
/// Both passes walk the frame tree from the root with an accumulated world
/// matrix (`local * parent_world` at every level, the glam form of the
/// legacy row-major `parent x local`). Lights are gathered through child
/// frames; geometry through the frames attached as visuals.
/// The resulting `FrameBatch` is ephemeral and consumed by the viewport.

use glam::{Mat3, Mat4, Vec4};
use crate::math::{self, Frustum};
use crate::renderer::{
    Appearance, DrawTransforms, PositionColorVertex, Renderer, SceneLight, NO_TEXTURE_ID,
};
use crate::resource::light::Light;
use crate::resource::mesh::Mesh;
use crate::resource::surface::FColor;
use crate::resource::texture::Texture;
use crate::scene::{Frame, Visual};

/// How collected geometry reaches the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryPath {
    /// View-space triangles through `push_vertices()`
    #[default]
    Immediate,
    /// Cached mesh groups through `get_mesh_id()` and `submit_draw()`
    Retained,
}

// ============================================================================
// LIGHTS
// ============================================================================

/// World-space description of one light attached to a frame with `world`
pub fn scene_light(light: &Light, world: &Mat4) -> SceneLight {
    let light_type = light.light_type();
    let mut extracted = SceneLight {
        color: FColor::from(light.color()),
        ..SceneLight::default()
    };
    if light_type.is_positional() {
        extracted.position = math::translation(world);
        extracted.positional = 1.0;
    }
    if light_type.is_directional() {
        extracted.direction = math::forward(world);
        extracted.directional = 1.0;
    }
    extracted
}

/// Every light under `root`, depth-first through child frames
pub fn collect_lights(root: &Frame) -> Vec<SceneLight> {
    let mut lights = Vec::new();
    collect_lights_from(root, &Mat4::IDENTITY, &mut lights);
    lights
}

fn collect_lights_from(frame: &Frame, parent_world: &Mat4, lights: &mut Vec<SceneLight>) {
    let world = frame.transform() * *parent_world;
    for light in frame.lights() {
        lights.push(scene_light(&light, &world));
    }
    for child in frame.children() {
        collect_lights_from(&child, &world, lights);
    }
}

// ============================================================================
// GEOMETRY
// ============================================================================

/// One unit of collected geometry
#[derive(Debug, Clone)]
pub enum DrawItem {
    Vertices(Vec<PositionColorVertex>),
    Mesh {
        mesh_id: u32,
        transforms: DrawTransforms,
        appearance: Appearance,
    },
}

/// A translucent item with its sort depth
#[derive(Debug, Clone)]
pub struct DeferredDraw {
    /// Projected depth of the owning frame's origin, in [0, 1] when visible
    pub depth: f32,
    pub item: DrawItem,
}

/// Geometry collected for one frame
#[derive(Debug)]
pub struct FrameBatch {
    /// Frustum the geometry was culled against
    pub frustum: Frustum,
    pub opaque: Vec<DrawItem>,
    pub translucent: Vec<DeferredDraw>,
    pub meshes_visited: u32,
    pub meshes_culled: u32,
}

impl FrameBatch {
    /// Sort translucent items far-to-near; equal depths keep submission order
    pub fn sort_translucent(&mut self) {
        self.translucent.sort_by(|a, b| b.depth.total_cmp(&a.depth));
    }
}

/// Sort depth of a frame: its origin through the view-projection, mapped
/// from [-1, 1] to [0, 1]
pub fn projected_depth(view_projection: &Mat4, world: &Mat4) -> f32 {
    let clip = *view_projection * world.w_axis.truncate().extend(1.0);
    (clip.z / clip.w + 1.0) * 0.5
}

/// Walks the scene and builds a `FrameBatch`
pub struct GeometryCollector<'a> {
    renderer: &'a mut dyn Renderer,
    view: Mat4,
    view_projection: Mat4,
    path: GeometryPath,
    batch: FrameBatch,
}

/// Group state read under a short mesh borrow
struct GroupSnapshot {
    color: crate::resource::surface::Color,
    shininess: f32,
    texture: Option<Texture>,
    flat: bool,
}

impl<'a> GeometryCollector<'a> {
    pub fn new(renderer: &'a mut dyn Renderer, view: Mat4, view_projection: Mat4, path: GeometryPath) -> Self {
        Self {
            renderer,
            view,
            view_projection,
            path,
            batch: FrameBatch {
                frustum: Frustum::from_view_projection(&view_projection),
                opaque: Vec::new(),
                translucent: Vec::new(),
                meshes_visited: 0,
                meshes_culled: 0,
            },
        }
    }

    /// Collect everything under `root` and return the sorted batch
    pub fn collect(mut self, root: &Frame) -> FrameBatch {
        self.collect_frame(root, &Mat4::IDENTITY);
        self.batch.sort_translucent();
        self.batch
    }

    fn collect_frame(&mut self, frame: &Frame, parent_world: &Mat4) {
        let world = frame.transform() * *parent_world;
        for visual in frame.visuals() {
            match visual {
                Visual::Frame(sub) => self.collect_frame(&sub, &world),
                Visual::Mesh(mesh) => self.collect_mesh(&mesh, &world),
            }
        }
    }

    fn collect_mesh(&mut self, mesh: &Mesh, world: &Mat4) {
        self.batch.meshes_visited += 1;
        let bounds = mesh.bounding_box();
        if bounds.is_empty() || !self.batch.frustum.intersects_aabb(&bounds, world) {
            self.batch.meshes_culled += 1;
            return;
        }

        let model_view = self.view * *world;
        let normal = math::normal_matrix(world);
        let depth = projected_depth(&self.view_projection, world);

        for group in 0..mesh.group_count() {
            let Some(snapshot) = snapshot_group(mesh, group) else {
                continue;
            };
            // Texture upload may register destroy callbacks: no mesh borrow here
            let texture_id = match &snapshot.texture {
                Some(texture) => self.renderer.get_texture_id(texture, false, 0.0, 0.0),
                None => NO_TEXTURE_ID,
            };
            let appearance = Appearance {
                color: snapshot.color,
                shininess: snapshot.shininess,
                texture_id,
                flat: snapshot.flat,
            };

            let item = match self.path {
                GeometryPath::Immediate => {
                    let vertices = emit_vertices(mesh, group, &model_view, &self.view, &normal, &appearance);
                    if vertices.is_empty() {
                        continue;
                    }
                    DrawItem::Vertices(vertices)
                }
                GeometryPath::Retained => DrawItem::Mesh {
                    mesh_id: self.renderer.get_mesh_id(mesh, group),
                    transforms: DrawTransforms {
                        model_view,
                        world: *world,
                        view: self.view,
                        normal,
                    },
                    appearance,
                },
            };

            if appearance.is_translucent() {
                self.batch.translucent.push(DeferredDraw { depth, item });
            } else {
                self.batch.opaque.push(item);
            }
        }
    }
}

fn snapshot_group(mesh: &Mesh, group: usize) -> Option<GroupSnapshot> {
    let g = mesh.group(group)?;
    Some(GroupSnapshot {
        color: g.color(),
        shininess: g.material().map_or(0.0, |m| m.power()),
        texture: g.texture().cloned(),
        flat: g.quality().is_flat(),
    })
}

/// View-space triangles of one group.
///
/// Triangles referencing a vertex that was never set are skipped. Flat
/// groups already carry the face normal on each of their vertices.
fn emit_vertices(
    mesh: &Mesh,
    group: usize,
    model_view: &Mat4,
    view: &Mat4,
    normal_matrix: &Mat3,
    appearance: &Appearance,
) -> Vec<PositionColorVertex> {
    let Some(g) = mesh.group(group) else {
        return Vec::new();
    };
    let (vertices, indices) = g.render_geometry();
    let view_rotation = Mat3::from_mat4(*view);
    let mut out = Vec::with_capacity(indices.len());

    for tri in indices.chunks_exact(3) {
        let fetch = |i: u32| vertices.get(i as usize);
        let (Some(a), Some(b), Some(c)) = (fetch(tri[0]), fetch(tri[1]), fetch(tri[2])) else {
            continue;
        };
        for v in [a, b, c] {
            let position = *model_view * Vec4::from((v.position, 1.0));
            let normal = (view_rotation * (*normal_matrix * v.normal)).normalize_or_zero();
            out.push(PositionColorVertex {
                position: position.truncate(),
                normal,
                color: appearance.color,
                shininess: appearance.shininess,
                tex_coord: v.tex_coord,
                texture_id: appearance.texture_id,
            });
        }
    }
    out
}

#[cfg(test)]
#[path = "collector_tests.rs"]
mod tests;
