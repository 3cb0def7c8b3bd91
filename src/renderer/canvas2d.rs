//! `CanvasRenderingContext2d` backend

use glam::Vec2;
use std::f64::consts::TAU;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};
use wasm_bindgen::JsCast;

use super::Canvas;
use crate::error::SetupError;

pub struct Canvas2d {
    ctx: CanvasRenderingContext2d,
}

fn css(color: u32) -> String {
    format!("#{:06x}", color & 0x00ff_ffff)
}

impl Canvas2d {
    pub fn new(canvas: &HtmlCanvasElement) -> Result<Self, SetupError> {
        let ctx = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
            .ok_or(SetupError::NoContext2d)?;
        Ok(Self { ctx })
    }

    fn trace(&self, points: &[Vec2], closed: bool) -> bool {
        let Some((first, rest)) = points.split_first() else {
            return false;
        };
        self.ctx.begin_path();
        self.ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            self.ctx.line_to(p.x as f64, p.y as f64);
        }
        if closed {
            self.ctx.close_path();
        }
        true
    }

    fn circle_path(&self, center: Vec2, radius: f32) -> bool {
        self.ctx.begin_path();
        self.ctx
            .arc(center.x as f64, center.y as f64, radius.max(0.0) as f64, 0.0, TAU)
            .is_ok()
    }
}

impl Canvas for Canvas2d {
    fn set_alpha(&mut self, alpha: f32) {
        self.ctx.set_global_alpha(alpha.clamp(0.0, 1.0) as f64);
    }

    fn fill_rect(&mut self, pos: Vec2, size: Vec2, color: u32) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx
            .fill_rect(pos.x as f64, pos.y as f64, size.x as f64, size.y as f64);
    }

    fn fill_polygon(&mut self, points: &[Vec2], color: u32) {
        if self.trace(points, true) {
            self.ctx.set_fill_style_str(&css(color));
            self.ctx.fill();
        }
    }

    fn stroke_path(&mut self, points: &[Vec2], closed: bool, color: u32, width: f32) {
        if self.trace(points, closed) {
            self.ctx.set_stroke_style_str(&css(color));
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: u32) {
        if self.circle_path(center, radius) {
            self.ctx.set_fill_style_str(&css(color));
            self.ctx.fill();
        }
    }

    fn stroke_circle(&mut self, center: Vec2, radius: f32, color: u32, width: f32) {
        if self.circle_path(center, radius) {
            self.ctx.set_stroke_style_str(&css(color));
            self.ctx.set_line_width(width as f64);
            self.ctx.stroke();
        }
    }

    fn text(&mut self, text: &str, pos: Vec2, color: u32, size_px: f32) {
        self.ctx.set_fill_style_str(&css(color));
        self.ctx.set_font(&format!("{}px monospace", size_px));
        let _ = self.ctx.fill_text(text, pos.x as f64, pos.y as f64);
    }
}
