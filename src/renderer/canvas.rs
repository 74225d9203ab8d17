//! Canvas 2D surface (browser)

use glam::Vec2;
use std::f64::consts::TAU;
use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use super::shapes::css_rgba;
use super::{Color, GradientStop, Surface};
use crate::error::{GameError, Result};

/// A `<canvas>` element and its 2D context
pub struct CanvasSurface {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    /// Look up the canvas by element id and grab its 2D context
    pub fn from_element_id(id: &str) -> Result<Self> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| GameError::SurfaceUnavailable("no document".to_string()))?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id(id)
            .ok_or_else(|| GameError::SurfaceUnavailable(format!("no element #{id}")))?
            .dyn_into()
            .map_err(|_| GameError::SurfaceUnavailable(format!("#{id} is not a canvas")))?;
        Self::new(canvas)
    }

    pub fn new(canvas: HtmlCanvasElement) -> Result<Self> {
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .map_err(|e| GameError::SurfaceUnavailable(format!("{e:?}")))?
            .ok_or_else(|| GameError::SurfaceUnavailable("2d context not supported".to_string()))?
            .dyn_into()
            .map_err(|_| GameError::SurfaceUnavailable("unexpected context type".to_string()))?;
        Ok(Self { canvas, ctx })
    }

    /// Match the backing store to the given size in CSS pixels
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
        log::debug!("Canvas resized to {}x{}", width, height);
    }

    pub fn canvas(&self) -> &HtmlCanvasElement {
        &self.canvas
    }
}

impl Surface for CanvasSurface {
    fn size(&self) -> Vec2 {
        Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32)
    }

    fn clear(&mut self) {
        let size = self.size();
        self.ctx.clear_rect(0.0, 0.0, size.x as f64, size.y as f64);
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Color) {
        self.ctx.set_fill_style_str(&css_rgba(color));
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .ok();
        self.ctx.fill();
    }

    fn stroke_arc(
        &mut self,
        center: Vec2,
        radius: f32,
        start: f32,
        end: f32,
        width: f32,
        color: Color,
    ) {
        self.ctx.set_stroke_style_str(&css_rgba(color));
        self.ctx.set_line_width(width as f64);
        self.ctx.begin_path();
        self.ctx
            .arc(
                center.x as f64,
                center.y as f64,
                radius.max(0.0) as f64,
                start as f64,
                end as f64,
            )
            .ok();
        self.ctx.stroke();
    }

    fn fill_radial_gradient(&mut self, center: Vec2, inner: f32, outer: f32, stops: &[GradientStop]) {
        let (x, y) = (center.x as f64, center.y as f64);
        let Ok(gradient) =
            self.ctx
                .create_radial_gradient(x, y, inner.max(0.0) as f64, x, y, outer.max(0.0) as f64)
        else {
            return;
        };
        for stop in stops {
            gradient.add_color_stop(stop.offset, &css_rgba(stop.color)).ok();
        }
        self.ctx.set_fill_style_canvas_gradient(&gradient);
        self.ctx.begin_path();
        self.ctx.arc(x, y, outer.max(0.0) as f64, 0.0, TAU).ok();
        self.ctx.fill();
    }

    fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        self.ctx.set_fill_style_str(&css_rgba(color));
        self.ctx
            .fill_rect(origin.x as f64, origin.y as f64, size.x as f64, size.y as f64);
    }
}
