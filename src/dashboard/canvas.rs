use std::fmt::{self, Write as _};

use super::escape_html;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }
}

impl fmt::Display for Rgba {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Start,
    Center,
    End,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub font: String,
    pub color: String,
    pub align: TextAlign,
}

/// Gradient between two concentric circles, the inner one of radius zero.
#[derive(Debug, Clone, PartialEq)]
pub struct RadialGradient {
    pub cx: f64,
    pub cy: f64,
    pub radius: f64,
    pub stops: Vec<(f64, Rgba)>,
}

impl RadialGradient {
    pub fn new(cx: f64, cy: f64, radius: f64) -> Self {
        Self {
            cx,
            cy,
            radius,
            stops: Vec::new(),
        }
    }

    pub fn add_color_stop(mut self, offset: f64, color: Rgba) -> Self {
        self.stops.push((offset, color));
        self
    }
}

pub trait Canvas {
    /// Resizing also wipes the surface.
    fn set_size(&mut self, width: u32, height: u32);
    fn size(&self) -> (u32, u32);
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);
    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str);
    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, fill: &RadialGradient);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    Clear {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    Rect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
    Circle {
        cx: f64,
        cy: f64,
        radius: f64,
        fill: RadialGradient,
    },
}

#[derive(Debug, Clone, Default)]
pub struct SvgCanvas {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl SvgCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn to_svg(&self, id_prefix: &str, label: &str) -> String {
        let mut defs = String::new();
        let mut body = String::new();

        for (index, op) in self.ops.iter().enumerate() {
            match op {
                DrawOp::Clear {
                    x,
                    y,
                    width,
                    height,
                } => {
                    let _ = write!(
                        body,
                        r##"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="#ffffff"/>"##
                    );
                }
                DrawOp::Rect {
                    x,
                    y,
                    width,
                    height,
                    color,
                } => {
                    let _ = write!(
                        body,
                        r#"<rect x="{x}" y="{y}" width="{width}" height="{height}" fill="{}"/>"#,
                        escape_html(color)
                    );
                }
                DrawOp::Text { text, x, y, style } => {
                    let anchor = match style.align {
                        TextAlign::Start => "start",
                        TextAlign::Center => "middle",
                        TextAlign::End => "end",
                    };
                    let _ = write!(
                        body,
                        r#"<text x="{x}" y="{y}" text-anchor="{anchor}" fill="{}" style="font: {}">{}</text>"#,
                        escape_html(&style.color),
                        escape_html(&style.font),
                        escape_html(text)
                    );
                }
                DrawOp::Circle {
                    cx,
                    cy,
                    radius,
                    fill,
                } => {
                    let gradient_id = format!("{id_prefix}-{index}");
                    let _ = write!(
                        defs,
                        r#"<radialGradient id="{gradient_id}" gradientUnits="userSpaceOnUse" cx="{}" cy="{}" r="{}" fx="{}" fy="{}">"#,
                        fill.cx, fill.cy, fill.radius, fill.cx, fill.cy
                    );
                    for (offset, color) in &fill.stops {
                        let _ = write!(
                            defs,
                            r#"<stop offset="{offset}" stop-color="rgb({}, {}, {})" stop-opacity="{}"/>"#,
                            color.r, color.g, color.b, color.a
                        );
                    }
                    defs.push_str("</radialGradient>");
                    let _ = write!(
                        body,
                        r#"<circle cx="{cx}" cy="{cy}" r="{radius}" fill="url(#{gradient_id})"/>"#
                    );
                }
            }
        }

        format!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w} {h}" width="{w}" height="{h}" role="img" aria-label="{label}"><defs>{defs}</defs>{body}</svg>"#,
            w = self.width,
            h = self.height,
            label = escape_html(label),
        )
    }
}

impl Canvas for SvgCanvas {
    fn set_size(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let covers_all =
            x <= 0.0 && y <= 0.0 && width >= f64::from(self.width) && height >= f64::from(self.height);
        if covers_all {
            self.ops.clear();
        }
        self.ops.push(DrawOp::Clear {
            x,
            y,
            width,
            height,
        });
    }

    fn fill_rect(&mut self, x: f64, y: f64, width: f64, height: f64, color: &str) {
        self.ops.push(DrawOp::Rect {
            x,
            y,
            width,
            height,
            color: color.to_string(),
        });
    }

    fn fill_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: style.clone(),
        });
    }

    fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64, fill: &RadialGradient) {
        self.ops.push(DrawOp::Circle {
            cx,
            cy,
            radius,
            fill: fill.clone(),
        });
    }
}
