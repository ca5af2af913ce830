/// Triangle rasterizer: near-plane clipping, projection, back-face culling
/// and scan conversion into a color surface plus a 32-bit float z-buffer.
///
/// Triangles are flat and unlit: the color of the first vertex fills the
/// whole triangle. Opaque fragments are depth tested and write the z-buffer.
/// Translucent fragments (alpha below 255) are blended over whatever is
/// already there, with no depth test and no z-buffer write.

use glam::Mat4;
use retained_3d_engine::retained3d::render::{PositionColorVertex, RendererStats};
use retained_3d_engine::retained3d::resource::{Color, Surface};

/// Projected vertex: pixel coordinates and NDC depth
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenVertex {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

/// Move `a` along the edge towards `b` until it lies on the plane `z = plane`.
///
/// Only the position is interpolated; every other attribute is kept from `a`.
pub fn split_edge(mut a: PositionColorVertex, b: &PositionColorVertex, plane: f32) -> PositionColorVertex {
    let t = (plane - a.position.z) / (b.position.z - a.position.z);
    a.position.x += t * (b.position.x - a.position.x);
    a.position.y += t * (b.position.y - a.position.y);
    a.position.z = plane;
    a
}

/// Clip a view-space triangle against `z = front` and hand the 0, 1 or 2
/// surviving triangles to `emit`, winding preserved.
pub fn clip_near(triangle: [PositionColorVertex; 3], front: f32, mut emit: impl FnMut([PositionColorVertex; 3])) {
    let [v0, v1, v2] = triangle;
    let inside = [v0.position.z >= front, v1.position.z >= front, v2.position.z >= front];
    match inside {
        [false, false, false] => {}
        [true, true, true] => emit(triangle),
        // Two in front: the visible quad becomes two triangles
        [false, true, true] => {
            let split = split_edge(v2, &v0, front);
            emit([v1, v2, split]);
            emit([v1, split, split_edge(v1, &v0, front)]);
        }
        [true, false, true] => {
            let split = split_edge(v0, &v1, front);
            emit([v2, v0, split]);
            emit([v2, split, split_edge(v2, &v1, front)]);
        }
        [true, true, false] => {
            let split = split_edge(v1, &v2, front);
            emit([v0, v1, split]);
            emit([v0, split, split_edge(v0, &v2, front)]);
        }
        // One in front: shrink towards it
        [true, false, false] => emit([v0, split_edge(v0, &v1, front), split_edge(v0, &v2, front)]),
        [false, true, false] => emit([split_edge(v1, &v0, front), v1, split_edge(v1, &v2, front)]),
        [false, false, true] => emit([split_edge(v2, &v0, front), split_edge(v2, &v1, front), v2]),
    }
}

/// Signed edge function; negative on the drawn side of a clockwise
/// (screen-space, y down) edge
#[inline]
fn edge(x0: f32, y0: f32, x1: f32, y1: f32, x: f32, y: f32) -> f32 {
    (x - x0) * (y1 - y0) - (y - y0) * (x1 - x0)
}

/// `src` over `dst` with straight (non-premultiplied) alpha
pub fn blend(src: Color, dst: Color) -> Color {
    let alpha = src.a as f32 / 255.0;
    let inv = 1.0 - alpha;
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * inv) as u8;
    Color::rgba(
        mix(src.r, dst.r),
        mix(src.g, dst.g),
        mix(src.b, dst.b),
        (src.a as f32 + dst.a as f32 * inv) as u8,
    )
}

/// Clip, project and scan-convert triangles with one projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rasterizer {
    projection: Mat4,
    front: f32,
}

impl Rasterizer {
    pub fn new(projection: Mat4, front: f32) -> Self {
        Self { projection, front }
    }

    pub fn projection(&self) -> &Mat4 {
        &self.projection
    }

    pub fn front(&self) -> f32 {
        self.front
    }

    /// View-space vertex to pixel coordinates of a `width x height` target
    pub fn project(&self, vertex: &PositionColorVertex, width: u32, height: u32) -> ScreenVertex {
        let clip = self.projection * vertex.position.extend(1.0);
        let ndc = if clip.w != 0.0 { clip.truncate() / clip.w } else { clip.truncate() };
        ScreenVertex {
            x: (ndc.x * 0.5 + 0.5) * width as f32,
            y: (1.0 - (ndc.y * 0.5 + 0.5)) * height as f32,
            z: ndc.z,
        }
    }

    /// Draw one view-space triangle.
    ///
    /// # Arguments
    ///
    /// * `triangle` - Vertices in view space; vertex 0 supplies the color
    /// * `target` - Color surface
    /// * `depth` - Z-buffer, `target.width() * target.height()` entries
    /// * `stats` - Counters updated for the triangle and its pixels
    pub fn draw_triangle(
        &self,
        triangle: [PositionColorVertex; 3],
        target: &mut Surface,
        depth: &mut [f32],
        stats: &mut RendererStats,
    ) {
        stats.triangles_submitted += 1;
        clip_near(triangle, self.front, |clipped| self.draw_projected(&clipped, target, depth, stats));
    }

    fn draw_projected(
        &self,
        triangle: &[PositionColorVertex; 3],
        target: &mut Surface,
        depth: &mut [f32],
        stats: &mut RendererStats,
    ) {
        stats.triangles_projected += 1;
        let (width, height) = (target.width(), target.height());
        let p0 = self.project(&triangle[0], width, height);
        let p1 = self.project(&triangle[1], width, height);
        let p2 = self.project(&triangle[2], width, height);

        // Entirely in front of the near or beyond the far depth
        if (p0.z < 0.0 && p1.z < 0.0 && p2.z < 0.0) || (p0.z > 1.0 && p1.z > 1.0 && p2.z > 1.0) {
            return;
        }

        let (w, h) = (width as f32, height as f32);
        if (p0.x < 0.0 && p1.x < 0.0 && p2.x < 0.0)
            || (p0.x >= w && p1.x >= w && p2.x >= w)
            || (p0.y < 0.0 && p1.y < 0.0 && p2.y < 0.0)
            || (p0.y >= h && p1.y >= h && p2.y >= h)
        {
            return;
        }

        let min_x = (p0.x.min(p1.x).min(p2.x).floor() as i32).max(0);
        let max_x = (p0.x.max(p1.x).max(p2.x).ceil() as i32).min(width as i32 - 1);
        let min_y = (p0.y.min(p1.y).min(p2.y).floor() as i32).max(0);
        let max_y = (p0.y.max(p1.y).max(p2.y).ceil() as i32).min(height as i32 - 1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        // Back-facing, degenerate or NaN
        let area = edge(p0.x, p0.y, p1.x, p1.y, p2.x, p2.y);
        if !(area < 0.0) {
            return;
        }
        let inv_area = 1.0 / area;
        stats.triangles_rasterized += 1;

        let color = triangle[0].color;
        let translucent = !color.is_opaque();
        let format = target.format();
        let raw = format.pack(color);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;
                let w0 = edge(p1.x, p1.y, p2.x, p2.y, px, py) * inv_area;
                if !(0.0..=1.0).contains(&w0) {
                    continue;
                }
                let w1 = edge(p2.x, p2.y, p0.x, p0.y, px, py) * inv_area;
                if w1 < 0.0 || w1 > 1.0 - w0 {
                    continue;
                }
                let w2 = 1.0 - w0 - w1;
                let z = w0 * p0.z + w1 * p1.z + w2 * p2.z;

                let (ux, uy) = (x as u32, y as u32);
                if translucent {
                    let dst = format.unpack(target.read_raw(ux, uy));
                    target.write_raw(ux, uy, format.pack(blend(color, dst)));
                } else {
                    let Some(stored) = depth.get_mut(y as usize * width as usize + x as usize) else {
                        continue;
                    };
                    if z >= *stored {
                        continue;
                    }
                    *stored = z;
                    target.write_raw(ux, uy, raw);
                }
                stats.pixels_written += 1;
            }
        }
    }
}

#[cfg(test)]
#[path = "rasterizer_tests.rs"]
mod tests;
