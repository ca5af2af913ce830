/// Tests for the render statistics report
use super::*;

#[test]
fn test_empty_report() {
    let report = format_render_stats_report(&RendererStats::default());
    assert!(report.contains("Nothing drawn"));
}

#[test]
fn test_report_lists_counters() {
    let stats = RendererStats {
        triangles_submitted: 4,
        triangles_projected: 5,
        triangles_rasterized: 3,
        pixels_written: 120,
        draw_calls: 2,
    };
    let report = format_render_stats_report(&stats);
    assert!(report.contains("Software Render Report"));
    assert!(report.contains("Culled or offscreen:"));
    assert!(report.contains("120"));
}
