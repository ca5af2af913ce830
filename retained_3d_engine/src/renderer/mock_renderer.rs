/// Recording renderer for unit tests
///
/// Every call is appended to a shared `MockLog` so a test can hand the
/// renderer to a `Viewport` and still inspect what it received.

use std::cell::RefCell;
use std::rc::Rc;
use glam::Mat4;
use crate::error::Result;
use crate::math::{Frustum, Rect};
use crate::object::Object;
use crate::renderer::{
    Appearance, DeviceCaps, DrawTransforms, PositionColorVertex, Renderer, RendererStats,
    SceneLight, ViewportTransform, NO_TEXTURE_ID,
};
use crate::resource::mesh::Mesh;
use crate::resource::surface::{FColor, Surface};
use crate::resource::texture::Texture;

/// Calls in the order they were made
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    PushLights(usize),
    PushVertices(usize),
    SubmitDraw(u32),
    SetProjection,
    SetFrustum,
    Resize(u32, u32),
    BeginFrame,
    EnableTransparency,
    Render,
    FinalizeFrame,
    Clear(f32, f32, f32),
    Flip,
    Draw2DImage(u32),
    Download,
}

#[derive(Debug, Default)]
pub struct MockLog {
    pub calls: Vec<MockCall>,
    /// Lights from the last `push_lights()`
    pub lights: Vec<SceneLight>,
    /// Vertices pushed since the last `begin_frame()`
    pub vertices: Vec<PositionColorVertex>,
    /// Index into `vertices` where translucent geometry starts
    pub transparency_start: Option<usize>,
    pub draws: Vec<(u32, DrawTransforms, Appearance)>,
    pub projection: Option<(Mat4, f32, f32)>,
    pub frustum: Option<Frustum>,
    pub dither: bool,
}

impl MockLog {
    pub fn count(&self, call: &MockCall) -> usize {
        self.calls.iter().filter(|c| *c == call).count()
    }

    /// Position of the first matching call
    pub fn position(&self, call: &MockCall) -> Option<usize> {
        self.calls.iter().position(|c| c == call)
    }
}

pub struct MockRenderer {
    log: Rc<RefCell<MockLog>>,
    width: u32,
    height: u32,
}

impl MockRenderer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            log: Rc::new(RefCell::new(MockLog::default())),
            width,
            height,
        }
    }

    /// Shared handle to the recorded calls
    pub fn log(&self) -> Rc<RefCell<MockLog>> {
        self.log.clone()
    }
}

impl Renderer for MockRenderer {
    fn push_lights(&mut self, lights: &[SceneLight]) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::PushLights(lights.len()));
        log.lights = lights.to_vec();
    }

    fn push_vertices(&mut self, vertices: &[PositionColorVertex]) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::PushVertices(vertices.len()));
        log.vertices.extend_from_slice(vertices);
    }

    fn submit_draw(&mut self, mesh_id: u32, transforms: &DrawTransforms, appearance: &Appearance) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::SubmitDraw(mesh_id));
        log.draws.push((mesh_id, *transforms, *appearance));
    }

    fn set_projection(&mut self, projection: &Mat4, front: f32, back: f32) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::SetProjection);
        log.projection = Some((*projection, front, back));
    }

    fn set_frustum(&mut self, frustum: &Frustum) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::SetFrustum);
        log.frustum = Some(*frustum);
    }

    fn resize(&mut self, width: u32, height: u32, _transform: ViewportTransform) -> Result<()> {
        self.width = width;
        self.height = height;
        self.log.borrow_mut().calls.push(MockCall::Resize(width, height));
        Ok(())
    }

    fn get_texture_id(&mut self, texture: &Texture, _is_ui: bool, _scale_x: f32, _scale_y: f32) -> u32 {
        if texture.has_surface() {
            texture.id() as u32
        } else {
            NO_TEXTURE_ID
        }
    }

    fn get_mesh_id(&mut self, _mesh: &Mesh, group: usize) -> u32 {
        group as u32
    }

    fn begin_frame(&mut self) -> Result<()> {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::BeginFrame);
        log.vertices.clear();
        log.draws.clear();
        log.transparency_start = None;
        Ok(())
    }

    fn enable_transparency(&mut self) {
        let mut log = self.log.borrow_mut();
        log.calls.push(MockCall::EnableTransparency);
        let start = log.vertices.len();
        log.transparency_start = Some(start);
    }

    fn render(&mut self) -> Result<()> {
        self.log.borrow_mut().calls.push(MockCall::Render);
        Ok(())
    }

    fn finalize_frame(&mut self) -> Result<()> {
        self.log.borrow_mut().calls.push(MockCall::FinalizeFrame);
        Ok(())
    }

    fn clear(&mut self, r: f32, g: f32, b: f32) {
        self.log.borrow_mut().calls.push(MockCall::Clear(r, g, b));
    }

    fn flip(&mut self) {
        self.log.borrow_mut().calls.push(MockCall::Flip);
    }

    fn draw_2d_image(&mut self, texture_id: u32, _src: &Rect, _dst: &Rect, _color: FColor) {
        self.log.borrow_mut().calls.push(MockCall::Draw2DImage(texture_id));
    }

    fn download(&mut self, _target: &mut Surface) -> Result<()> {
        self.log.borrow_mut().calls.push(MockCall::Download);
        Ok(())
    }

    fn set_dither(&mut self, dither: bool) {
        self.log.borrow_mut().dither = dither;
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn name(&self) -> &str {
        "Mock Renderer"
    }

    fn caps(&self) -> DeviceCaps {
        DeviceCaps::empty()
    }

    fn stats(&self) -> RendererStats {
        RendererStats::default()
    }
}
