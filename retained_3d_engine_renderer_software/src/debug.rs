/// Render statistics report with colored console output

use colored::*;
use retained_3d_engine::retained3d::render::RendererStats;

/// Build the report for one frame's counters
pub fn format_render_stats_report(stats: &RendererStats) -> String {
    if stats.triangles_submitted == 0 && stats.draw_calls == 0 && stats.pixels_written == 0 {
        return format!("{}", "✓ Nothing drawn".green().bold());
    }

    let mut lines = Vec::new();
    lines.push(format!("{}", "=== Software Render Report ===".bright_blue().bold()));
    lines.push(format!("  {} {}", "Draw calls:".white().bold(), stats.draw_calls));
    lines.push(format!("  {} {}", "Triangles submitted:".cyan(), stats.triangles_submitted));
    lines.push(format!("  {} {}", "Triangles projected:".cyan(), stats.triangles_projected));
    lines.push(format!("  {} {}", "Triangles rasterized:".green(), stats.triangles_rasterized));

    let rejected = stats.triangles_projected.saturating_sub(stats.triangles_rasterized);
    if rejected > 0 {
        lines.push(format!("  {} {}", "Culled or offscreen:".yellow(), rejected));
    }
    lines.push(format!("  {} {}", "Pixels written:".white().bold(), stats.pixels_written));
    lines.push(format!("{}", "==============================".bright_blue().bold()));
    lines.join("\n")
}

/// Print the report to stdout
pub fn print_render_stats_report(stats: &RendererStats) {
    println!("\n{}\n", format_render_stats_report(stats));
}

#[cfg(test)]
#[path = "debug_tests.rs"]
mod tests;
