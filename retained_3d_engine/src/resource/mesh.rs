//! Mesh: a reference-counted set of independently shaded groups.
//!
//! # Hierarchy
//!
//! ```text
//! Mesh
//! ├── bounding box (union of every group's vertex positions)
//! └── groups
//!     ├── [0] → MeshGroup
//!     │   ├── vertices (position, normal, tex coord)
//!     │   ├── faces (vertex_per_face-sized tuples, fan-triangulated)
//!     │   ├── color, texture, material, quality
//!     │   └── flattened vertices/indices (FLAT and UNLIT_FLAT only)
//!     └── [1] → MeshGroup
//! ```
//!
//! Every mutating call validates its arguments first and leaves the mesh
//! untouched on `Error::InvalidParams`.

use std::cell::{Ref, RefCell};
use std::fmt;
use std::rc::Rc;
use crate::error::Result;
use crate::math::{AABB, Vertex, flatten_surfaces};
use crate::object::{Object, ObjectBase};
use crate::resource::material::Material;
use crate::resource::surface::Color;
use crate::resource::texture::Texture;
use crate::{engine_invalid_params, engine_warn_once};

/// Perspective-correct texture mapping flag (the only mapping renderers honor)
pub const MAPPING_PERSPECTIVE_CORRECT: u32 = 4;

/// Returned by `group_color()` for an unknown group
pub const INVALID_GROUP_COLOR: u32 = 0xFFFF_FFFF;

// ============================================================================
// SHADING QUALITY
// ============================================================================

/// Per-group shading mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ShadingQuality {
    #[default]
    Gouraud,
    Phong,
    Flat,
    /// Not supported: rendered solid
    Wireframe,
    /// Rendered like `Flat`
    UnlitFlat,
}

impl ShadingQuality {
    /// Uses the per-face normal and the flattened vertex buffer
    pub fn is_flat(self) -> bool {
        matches!(self, ShadingQuality::Flat | ShadingQuality::UnlitFlat)
    }
}

// ============================================================================
// MESH GROUP
// ============================================================================

/// One independently shaded part of a mesh
#[derive(Debug, Clone)]
pub struct MeshGroup {
    vertices: Vec<Vertex>,
    /// Face indices as given to `add_group()`
    face_data: Vec<u32>,
    /// Triangle list derived from `face_data`
    indices: Vec<u32>,
    vertex_count: u32,
    vertex_per_face: u32,
    face_count: u32,
    color: Color,
    texture: Option<Texture>,
    material: Option<Material>,
    quality: ShadingQuality,
    mapping: u32,
    flat_vertices: Vec<Vertex>,
    flat_indices: Vec<u32>,
    version: u32,
}

impl MeshGroup {
    fn new(vertex_count: u32, vertex_per_face: u32, face_data: Vec<u32>) -> Self {
        let indices = triangulate_fans(&face_data, vertex_per_face);
        let face_count = face_data.len() as u32 / vertex_per_face;
        Self {
            vertices: Vec::with_capacity(vertex_count as usize),
            face_data,
            indices,
            vertex_count,
            vertex_per_face,
            face_count,
            color: Color::WHITE,
            texture: None,
            material: None,
            quality: ShadingQuality::default(),
            mapping: MAPPING_PERSPECTIVE_CORRECT,
            flat_vertices: Vec::new(),
            flat_indices: Vec::new(),
            version: 0,
        }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Triangle list (three indices per triangle)
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    /// Face indices exactly as supplied
    pub fn face_data(&self) -> &[u32] {
        &self.face_data
    }

    /// Vertex count declared by `add_group()`
    pub fn declared_vertex_count(&self) -> u32 {
        self.vertex_count
    }

    pub fn vertex_per_face(&self) -> u32 {
        self.vertex_per_face
    }

    pub fn face_count(&self) -> u32 {
        self.face_count
    }

    pub fn color(&self) -> Color {
        self.color
    }

    pub fn texture(&self) -> Option<&Texture> {
        self.texture.as_ref()
    }

    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    pub fn quality(&self) -> ShadingQuality {
        self.quality
    }

    pub fn mapping(&self) -> u32 {
        self.mapping
    }

    /// Bumped on every change to this group
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Flattened buffers (empty unless the quality is flat)
    pub fn flat_geometry(&self) -> (&[Vertex], &[u32]) {
        (&self.flat_vertices, &self.flat_indices)
    }

    /// Vertices and triangle indices to draw with the current quality
    pub fn render_geometry(&self) -> (&[Vertex], &[u32]) {
        if self.quality.is_flat() {
            (&self.flat_vertices, &self.flat_indices)
        } else {
            (&self.vertices, &self.indices)
        }
    }

    /// Rebuild the flat-shading buffers when the quality needs them
    fn update_derived(&mut self) {
        if self.quality.is_flat() {
            let (vertices, indices) = flatten_surfaces(&self.vertices, &self.indices, self.texture.is_some());
            self.flat_vertices = vertices;
            self.flat_indices = indices;
        } else {
            self.flat_vertices.clear();
            self.flat_indices.clear();
        }
    }

    fn touch(&mut self) {
        self.version = self.version.wrapping_add(1);
    }
}

/// Split `vertex_per_face`-sized polygons into triangle fans
fn triangulate_fans(face_data: &[u32], vertex_per_face: u32) -> Vec<u32> {
    if vertex_per_face == 3 {
        return face_data.to_vec();
    }
    let n = vertex_per_face as usize;
    let mut out = Vec::with_capacity(face_data.len() / n * (n - 2) * 3);
    for face in face_data.chunks_exact(n) {
        for k in 1..n - 1 {
            out.extend_from_slice(&[face[0], face[k], face[k + 1]]);
        }
    }
    out
}

/// Counts and faces reported by `Mesh::get_group()`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupInfo {
    pub vertex_count: u32,
    pub face_count: u32,
    pub vertex_per_face: u32,
    pub face_data: Vec<u32>,
}

// ============================================================================
// MESH
// ============================================================================

struct MeshData {
    object: ObjectBase,
    groups: Vec<MeshGroup>,
    bounding_box: AABB,
    version: u32,
}

impl MeshData {
    fn group_mut(&mut self, index: usize) -> Result<&mut MeshGroup> {
        let count = self.groups.len();
        self.groups
            .get_mut(index)
            .ok_or_else(|| engine_invalid_params!("retained3d::Mesh", "Group index {} out of range ({} groups)", index, count))
    }

    fn bump_version(&mut self) {
        self.version = self.version.wrapping_add(1);
    }

    fn update_box(&mut self) {
        self.bounding_box = AABB::from_points(
            self.groups.iter().flat_map(|g| g.vertices.iter().map(|v| v.position)),
        );
    }
}

/// Shared mesh handle
#[derive(Clone)]
pub struct Mesh(Rc<RefCell<MeshData>>);

impl Mesh {
    pub fn new() -> Self {
        Self(Rc::new(RefCell::new(MeshData {
            object: ObjectBase::new(),
            groups: Vec::new(),
            bounding_box: AABB::empty(),
            version: 0,
        })))
    }

    /// Append a group and return its index.
    ///
    /// `face_data` holds `face_count * vertex_per_face` indices, each below
    /// `vertex_count`. Polygons with more than 3 vertices are fan-triangulated.
    /// The vertex buffer starts empty and is filled by `set_vertices()`.
    pub fn add_group(&self, vertex_count: u32, face_count: u32, vertex_per_face: u32, face_data: &[u32]) -> Result<usize> {
        if vertex_count == 0 || face_count == 0 {
            return Err(engine_invalid_params!(
                "retained3d::Mesh", "AddGroup with {} vertices and {} faces", vertex_count, face_count
            ));
        }
        if vertex_per_face < 3 {
            return Err(engine_invalid_params!("retained3d::Mesh", "AddGroup with {} vertices per face", vertex_per_face));
        }
        let index_count = face_count as usize * vertex_per_face as usize;
        if face_data.len() < index_count {
            return Err(engine_invalid_params!(
                "retained3d::Mesh", "AddGroup needs {} face indices, got {}", index_count, face_data.len()
            ));
        }
        let face_data = &face_data[..index_count];
        if let Some(bad) = face_data.iter().find(|&&i| i >= vertex_count) {
            return Err(engine_invalid_params!(
                "retained3d::Mesh", "Face index {} out of range ({} vertices)", bad, vertex_count
            ));
        }

        let mut data = self.0.borrow_mut();
        data.groups.push(MeshGroup::new(vertex_count, vertex_per_face, face_data.to_vec()));
        data.bump_version();
        Ok(data.groups.len() - 1)
    }

    pub fn group_count(&self) -> usize {
        self.0.borrow().groups.len()
    }

    /// Write `vertices` starting at `offset`, growing the buffer if needed.
    ///
    /// `offset` may not start past both the stored and the declared vertex
    /// count. Recomputes the bounding box and, for flat groups, the flattened
    /// buffers.
    pub fn set_vertices(&self, group: usize, offset: usize, vertices: &[Vertex]) -> Result<()> {
        if vertices.is_empty() {
            return Err(engine_invalid_params!("retained3d::Mesh", "SetVertices with 0 vertices"));
        }
        let mut data = self.0.borrow_mut();
        let g = data.group_mut(group)?;

        let limit = g.vertices.len().max(g.vertex_count as usize);
        let end = match offset.checked_add(vertices.len()) {
            Some(end) if offset <= limit => end,
            _ => {
                return Err(engine_invalid_params!(
                    "retained3d::Mesh", "SetVertices at offset {} of {} vertices", offset, limit
                ));
            }
        };
        if end > g.vertices.len() {
            g.vertices.resize(end, Vertex::default());
        }
        g.vertices[offset..end].copy_from_slice(vertices);
        g.update_derived();
        g.touch();

        data.update_box();
        data.bump_version();
        Ok(())
    }

    /// Copy `count` vertices starting at `offset`
    pub fn get_vertices(&self, group: usize, offset: usize, count: usize) -> Result<Vec<Vertex>> {
        let data = self.0.borrow();
        let g = data
            .groups
            .get(group)
            .ok_or_else(|| engine_invalid_params!("retained3d::Mesh", "Group index {} out of range", group))?;
        match offset.checked_add(count) {
            Some(end) if count > 0 && end <= g.vertices.len() => Ok(g.vertices[offset..end].to_vec()),
            _ => Err(engine_invalid_params!(
                "retained3d::Mesh", "GetVertices of {} at offset {} ({} stored)", count, offset, g.vertices.len()
            )),
        }
    }

    pub fn get_group(&self, group: usize) -> Result<GroupInfo> {
        let data = self.0.borrow();
        let g = data
            .groups
            .get(group)
            .ok_or_else(|| engine_invalid_params!("retained3d::Mesh", "Group index {} out of range", group))?;
        Ok(GroupInfo {
            vertex_count: g.vertices.len() as u32,
            face_count: g.face_count,
            vertex_per_face: g.vertex_per_face,
            face_data: g.face_data.clone(),
        })
    }

    /// Vertices currently stored in a group (0 for an unknown group)
    pub fn group_vertex_count(&self, group: usize) -> u32 {
        self.0.borrow().groups.get(group).map_or(0, |g| g.vertices.len() as u32)
    }

    pub fn group_face_count(&self, group: usize) -> u32 {
        self.0.borrow().groups.get(group).map_or(0, |g| g.face_count)
    }

    pub fn vertex_per_face(&self, group: usize) -> u32 {
        self.0.borrow().groups.get(group).map_or(0, |g| g.vertex_per_face)
    }

    // ===== APPEARANCE =====

    /// Set the solid color from packed `0xAARRGGBB`
    pub fn set_group_color(&self, group: usize, argb: u32) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let g = data.group_mut(group)?;
        g.color = Color::from_argb(argb);
        g.touch();
        data.bump_version();
        Ok(())
    }

    /// Set the solid color from normalized components, alpha 255
    pub fn set_group_color_rgb(&self, group: usize, r: f32, g: f32, b: f32) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let grp = data.group_mut(group)?;
        // Truncating conversion, saturating outside [0, 1]
        grp.color = Color::rgba((r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8, 255);
        grp.touch();
        data.bump_version();
        Ok(())
    }

    /// Packed `0xAARRGGBB`, or `INVALID_GROUP_COLOR` for an unknown group
    pub fn group_color(&self, group: usize) -> u32 {
        self.0
            .borrow()
            .groups
            .get(group)
            .map_or(INVALID_GROUP_COLOR, |g| g.color.to_argb())
    }

    pub fn set_group_texture(&self, group: usize, texture: Option<Texture>) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let g = data.group_mut(group)?;
        g.texture = texture;
        // The flattened texture coordinates depend on whether a texture is bound
        g.update_derived();
        g.touch();
        data.bump_version();
        Ok(())
    }

    pub fn group_texture(&self, group: usize) -> Option<Texture> {
        self.0.borrow().groups.get(group).and_then(|g| g.texture.clone())
    }

    pub fn set_group_material(&self, group: usize, material: Option<Material>) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let g = data.group_mut(group)?;
        g.material = material;
        g.touch();
        data.bump_version();
        Ok(())
    }

    pub fn group_material(&self, group: usize) -> Option<Material> {
        self.0.borrow().groups.get(group).and_then(|g| g.material.clone())
    }

    /// Change the shading quality.
    ///
    /// `Wireframe` and `UnlitFlat` are accepted with a one-time diagnostic.
    pub fn set_group_quality(&self, group: usize, quality: ShadingQuality) -> Result<()> {
        let mut data = self.0.borrow_mut();
        let g = data.group_mut(group)?;
        match quality {
            ShadingQuality::Wireframe => {
                engine_warn_once!("retained3d::Mesh", "Wireframe quality is not supported, rendering solid");
            }
            ShadingQuality::UnlitFlat => {
                engine_warn_once!("retained3d::Mesh", "Unlit flat quality is not supported, rendering flat");
            }
            _ => {}
        }
        g.quality = quality;
        g.update_derived();
        g.touch();
        data.bump_version();
        Ok(())
    }

    /// Quality of a group, `Gouraud` for an unknown group
    pub fn group_quality(&self, group: usize) -> ShadingQuality {
        self.0.borrow().groups.get(group).map_or(ShadingQuality::Gouraud, |g| g.quality)
    }

    pub fn set_group_mapping(&self, group: usize, mapping: u32) -> Result<()> {
        let mut data = self.0.borrow_mut();
        data.group_mut(group)?.mapping = mapping;
        data.bump_version();
        Ok(())
    }

    pub fn group_mapping(&self, group: usize) -> u32 {
        self.0
            .borrow()
            .groups
            .get(group)
            .map_or(MAPPING_PERSPECTIVE_CORRECT, |g| g.mapping)
    }

    // ===== QUERIES =====

    /// Union of every group's vertex positions (empty when no vertex is set)
    pub fn bounding_box(&self) -> AABB {
        self.0.borrow().bounding_box
    }

    /// Bumped on every geometry or appearance change of any group
    pub fn version(&self) -> u32 {
        self.0.borrow().version
    }

    /// Version of one group, `None` for an unknown group
    pub fn group_version(&self, group: usize) -> Option<u32> {
        self.0.borrow().groups.get(group).map(|g| g.version)
    }

    /// Borrow one group
    pub fn group(&self, group: usize) -> Option<Ref<'_, MeshGroup>> {
        Ref::filter_map(self.0.borrow(), |d| d.groups.get(group)).ok()
    }

    /// Borrow all groups
    pub fn groups(&self) -> Ref<'_, [MeshGroup]> {
        Ref::map(self.0.borrow(), |d| d.groups.as_slice())
    }

    /// New mesh with copied geometry; textures and materials stay shared
    pub fn clone_mesh(&self) -> Mesh {
        let data = self.0.borrow();
        Mesh(Rc::new(RefCell::new(MeshData {
            object: ObjectBase::new(),
            groups: data.groups.clone(),
            bounding_box: data.bounding_box,
            version: 0,
        })))
    }

    pub fn ptr_eq(&self, other: &Mesh) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl Default for Mesh {
    fn default() -> Self {
        Self::new()
    }
}

impl Object for Mesh {
    fn with_object<R>(&self, f: impl FnOnce(&mut ObjectBase) -> R) -> R {
        f(&mut self.0.borrow_mut().object)
    }
}

impl PartialEq for Mesh {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Mesh {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let data = self.0.borrow();
        f.debug_struct("Mesh")
            .field("id", &data.object.id())
            .field("groups", &data.groups.len())
            .field("bounding_box", &data.bounding_box)
            .finish()
    }
}

#[cfg(test)]
#[path = "mesh_tests.rs"]
mod tests;
