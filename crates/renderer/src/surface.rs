//! Drawing surfaces for particle trails.
//!
//! [`Surface`] is the small set of canvas operations the wind overlay needs.
//! [`TrailCanvas`] implements it on a tiny-skia pixmap.

use tiny_skia::{BlendMode, Paint, PathBuilder, Pixmap, Rect, Stroke, Transform};

use crate::color::Color;

/// A 2D canvas the animation loop draws trails onto.
pub trait Surface {
    /// Create a transparent surface of the given size.
    fn create(width: u32, height: u32) -> Self
    where
        Self: Sized;

    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// Reset the pixel dimensions. Contents are discarded.
    fn resize(&mut self, width: u32, height: u32);

    /// Make every pixel fully transparent.
    fn clear(&mut self);

    /// Multiply the alpha of every pixel by `alpha` (a `destination-in` fill).
    fn fade(&mut self, alpha: f32);

    /// Stroke a straight segment between two container points.
    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f32);

    /// Translate the surface relative to its parent pane.
    fn set_translation(&mut self, x: i32, y: i32);

    fn translation(&self) -> (i32, i32);
}

/// A tiny-skia backed trail canvas.
#[derive(Debug, Clone)]
pub struct TrailCanvas {
    // None while the canvas has zero area
    pixmap: Option<Pixmap>,
    width: u32,
    height: u32,
    translation: (i32, i32),
}

impl TrailCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixmap: Pixmap::new(width, height),
            width,
            height,
            translation: (0, 0),
        }
    }

    /// Straight (non-premultiplied) RGBA bytes, row-major.
    pub fn to_rgba(&self) -> Vec<u8> {
        match &self.pixmap {
            Some(pixmap) => pixmap
                .pixels()
                .iter()
                .flat_map(|p| {
                    let c = p.demultiply();
                    [c.red(), c.green(), c.blue(), c.alpha()]
                })
                .collect(),
            None => Vec::new(),
        }
    }

    /// Straight RGBA of a single pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        let c = self.pixmap.as_ref()?.pixel(x, y)?.demultiply();
        Some([c.red(), c.green(), c.blue(), c.alpha()])
    }

    /// Number of pixels with any coverage.
    pub fn painted_pixels(&self) -> usize {
        self.pixmap
            .as_ref()
            .map(|p| p.pixels().iter().filter(|c| c.alpha() > 0).count())
            .unwrap_or(0)
    }

    /// Encode the current contents as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, String> {
        crate::png::create_png(&self.to_rgba(), self.width as usize, self.height as usize)
    }
}

impl Surface for TrailCanvas {
    fn create(width: u32, height: u32) -> Self {
        Self::new(width, height)
    }

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn resize(&mut self, width: u32, height: u32) {
        self.pixmap = Pixmap::new(width, height);
        self.width = width;
        self.height = height;
    }

    fn clear(&mut self) {
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(tiny_skia::Color::TRANSPARENT);
        }
    }

    fn fade(&mut self, alpha: f32) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let Some(rect) = Rect::from_xywh(0.0, 0.0, self.width as f32, self.height as f32) else {
            return;
        };
        let mut paint = Paint::default();
        paint.set_color(
            tiny_skia::Color::from_rgba(0.0, 0.0, 0.0, alpha.clamp(0.0, 1.0))
                .unwrap_or(tiny_skia::Color::BLACK),
        );
        paint.blend_mode = BlendMode::DestinationIn;
        paint.anti_alias = false;
        pixmap.fill_rect(rect, &paint, Transform::identity(), None);
    }

    fn stroke_segment(&mut self, from: (f64, f64), to: (f64, f64), color: Color, line_width: f32) {
        let Some(pixmap) = self.pixmap.as_mut() else {
            return;
        };
        let mut pb = PathBuilder::new();
        pb.move_to(from.0 as f32, from.1 as f32);
        pb.line_to(to.0 as f32, to.1 as f32);
        let Some(path) = pb.finish() else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color_rgba8(color.r, color.g, color.b, color.a);
        paint.anti_alias = true;

        let stroke = Stroke {
            width: line_width,
            ..Stroke::default()
        };
        pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
    }

    fn set_translation(&mut self, x: i32, y: i32) {
        self.translation = (x, y);
    }

    fn translation(&self) -> (i32, i32) {
        self.translation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = TrailCanvas::new(16, 8);
        assert_eq!(canvas.width(), 16);
        assert_eq!(canvas.height(), 8);
        assert_eq!(canvas.painted_pixels(), 0);
        assert_eq!(canvas.to_rgba().len(), 16 * 8 * 4);
    }

    #[test]
    fn test_stroke_paints_pixels() {
        let mut canvas = TrailCanvas::new(32, 32);
        canvas.stroke_segment((2.0, 16.5), (30.0, 16.5), Color::rgb(255, 0, 0), 1.2);
        assert!(canvas.painted_pixels() > 0);
        let px = canvas.pixel(16, 16).unwrap();
        assert!(px[0] > 200);
        assert_eq!(px[2], 0);
        assert!(px[3] > 0);
        assert!(canvas.pixel(16, 2).unwrap()[3] == 0);
    }

    #[test]
    fn test_fade_reduces_alpha() {
        let mut canvas = TrailCanvas::new(32, 32);
        canvas.stroke_segment((0.0, 10.5), (32.0, 10.5), Color::rgb(255, 255, 0), 3.0);
        let before = canvas.pixel(16, 10).unwrap()[3];
        canvas.fade(0.5);
        let after = canvas.pixel(16, 10).unwrap()[3];
        assert!(after < before);
        assert!(after > 0);
    }

    #[test]
    fn test_clear_and_resize() {
        let mut canvas = TrailCanvas::new(8, 8);
        canvas.stroke_segment((0.0, 4.0), (8.0, 4.0), Color::rgb(255, 255, 255), 2.0);
        canvas.clear();
        assert_eq!(canvas.painted_pixels(), 0);

        canvas.resize(20, 10);
        assert_eq!((canvas.width(), canvas.height()), (20, 10));
        assert_eq!(canvas.to_rgba().len(), 20 * 10 * 4);
    }

    #[test]
    fn test_zero_sized_canvas_is_inert() {
        let mut canvas = TrailCanvas::new(0, 0);
        canvas.fade(0.96);
        canvas.stroke_segment((0.0, 0.0), (1.0, 1.0), Color::rgb(255, 0, 0), 1.0);
        assert!(canvas.to_rgba().is_empty());
        assert!(canvas.pixel(0, 0).is_none());
    }

    #[test]
    fn test_translation() {
        let mut canvas = TrailCanvas::new(4, 4);
        canvas.set_translation(-12, 4);
        assert_eq!(canvas.translation(), (-12, 4));
    }
}
