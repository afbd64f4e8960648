use super::canvas::{Canvas, RadialGradient, Rgba, TextAlign, TextStyle};
use crate::models::HeatmapData;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 600;
pub const POINT_RADIUS: f64 = 30.0;

const BACKGROUND: &str = "#f8f9fa";
const MUTED_TEXT: &str = "#6b7280";
const FONT: &str = "16px -apple-system, BlinkMacSystemFont, sans-serif";

pub const NO_DATA: &str = "No click data available";
pub const NOT_LOADED: [&str; 2] = [
    "No click data available yet",
    "Start tracking to see heatmap visualization",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntensityBand {
    Hot,
    Warm,
    Cool,
}

impl IntensityBand {
    pub fn for_intensity(intensity: f64) -> Self {
        if intensity > 0.7 {
            IntensityBand::Hot
        } else if intensity > 0.4 {
            IntensityBand::Warm
        } else {
            IntensityBand::Cool
        }
    }

    pub fn color(self, alpha: f64) -> Rgba {
        match self {
            IntensityBand::Hot => Rgba::new(255, 51, 51, alpha),
            IntensityBand::Warm => Rgba::new(255, 187, 0, alpha),
            IntensityBand::Cool => Rgba::new(0, 102, 255, alpha),
        }
    }
}

/// Draws one radial blob per point, or a placeholder when there are none.
pub fn render_heatmap(canvas: &mut dyn Canvas, data: &HeatmapData) {
    prepare(canvas);

    if data.points.is_empty() {
        centered_text(canvas, &[NO_DATA]);
        return;
    }

    for point in &data.points {
        let alpha = point.intensity.clamp(0.0, 1.0);
        let band = IntensityBand::for_intensity(alpha);
        let gradient = RadialGradient::new(point.x, point.y, POINT_RADIUS)
            .add_color_stop(0.0, band.color(alpha))
            .add_color_stop(1.0, band.color(0.0));
        canvas.fill_circle(point.x, point.y, POINT_RADIUS, &gradient);
    }
}

/// Shown when the heatmap data could not be loaded at all.
pub fn render_empty_heatmap(canvas: &mut dyn Canvas) {
    prepare(canvas);
    centered_text(canvas, &NOT_LOADED);
}

fn prepare(canvas: &mut dyn Canvas) {
    canvas.set_size(CANVAS_WIDTH, CANVAS_HEIGHT);
    let (width, height) = (f64::from(CANVAS_WIDTH), f64::from(CANVAS_HEIGHT));
    canvas.clear_rect(0.0, 0.0, width, height);
    canvas.fill_rect(0.0, 0.0, width, height, BACKGROUND);
}

fn centered_text(canvas: &mut dyn Canvas, lines: &[&str]) {
    let (width, height) = canvas.size();
    let style = TextStyle {
        font: FONT.to_string(),
        color: MUTED_TEXT.to_string(),
        align: TextAlign::Center,
    };
    let (x, y) = (f64::from(width) / 2.0, f64::from(height) / 2.0);
    for (line, text) in lines.iter().enumerate() {
        canvas.fill_text(text, x, y + 30.0 * line as f64, &style);
    }
}
