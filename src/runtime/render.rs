//! Preview renderer
//!
//! Draws a published [`FrameState`] as flat rectangles into a softbuffer
//! surface. Each item is a colored tile; effects (fade, darken, lighten,
//! active indicator) are applied as color blends.

use std::num::NonZeroU32;
use std::rc::Rc;

use anyhow::Result;
use softbuffer::Surface;
use winit::window::Window;

use dockline::geometry::Rect;
use dockline::items::ItemId;
use dockline::layout::DockEdge;
use dockline::model::{FrameState, ItemDraw};

const DESKTOP: u32 = 0xFF20242C;
const DOCK_BACKGROUND: u32 = 0xFF3A404C;
const REVEAL_STRIP: u32 = 0xFF5A6270;
const HOVER_OUTLINE: u32 = 0xFFE8E8E8;
const INDICATOR: u32 = 0xFF7FB8FF;
const WHITE: u32 = 0xFFFFFFFF;
const BLACK: u32 = 0xFF000000;

/// Tile colors, picked by item id
const PALETTE: [u32; 6] = [
    0xFFE06C75, 0xFF98C379, 0xFFE5C07B, 0xFF61AFEF, 0xFFC678DD, 0xFF56B6C2,
];

/// Blend a foreground color onto a background color
///
/// Colors are 0xAARRGGBB; the result is fully opaque.
#[inline]
pub fn blend_colors(bg: u32, fg: u32, alpha: f32) -> u32 {
    let alpha = alpha.clamp(0.0, 1.0);
    let channel = |shift: u32| {
        let b = ((bg >> shift) & 0xFF) as f32;
        let f = ((fg >> shift) & 0xFF) as f32;
        ((b * (1.0 - alpha) + f * alpha) as u32) << shift
    };
    0xFF000000 | channel(16) | channel(8) | channel(0)
}

/// Pixel buffer with clipped rectangle primitives
pub struct Frame<'a> {
    buffer: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Frame<'a> {
    pub fn new(buffer: &'a mut [u32], width: usize, height: usize) -> Self {
        // Never index past a buffer that lags behind a resize
        let height = if width == 0 { 0 } else { height.min(buffer.len() / width) };
        Self {
            buffer,
            width,
            height,
        }
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// Pixel span covered by `rect`, clipped to the frame
    fn span(&self, rect: &Rect) -> Option<(usize, usize, usize, usize)> {
        let x0 = rect.x.max(0.0).floor() as usize;
        let y0 = rect.y.max(0.0).floor() as usize;
        let x1 = (rect.right().max(0.0).ceil() as usize).min(self.width);
        let y1 = (rect.bottom().max(0.0).ceil() as usize).min(self.height);
        (x0 < x1 && y0 < y1).then_some((x0, y0, x1, y1))
    }

    pub fn fill_rect(&mut self, rect: &Rect, color: u32) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        for y in y0..y1 {
            let row = y * self.width;
            self.buffer[row + x0..row + x1].fill(color);
        }
    }

    pub fn blend_rect(&mut self, rect: &Rect, color: u32, alpha: f32) {
        let Some((x0, y0, x1, y1)) = self.span(rect) else {
            return;
        };
        for y in y0..y1 {
            let row = y * self.width;
            for pixel in &mut self.buffer[row + x0..row + x1] {
                *pixel = blend_colors(*pixel, color, alpha);
            }
        }
    }

    pub fn outline_rect(&mut self, rect: &Rect, color: u32) {
        let edges = [
            Rect::new(rect.x, rect.y, rect.width, 1.0),
            Rect::new(rect.x, rect.bottom() - 1.0, rect.width, 1.0),
            Rect::new(rect.x, rect.y, 1.0, rect.height),
            Rect::new(rect.right() - 1.0, rect.y, 1.0, rect.height),
        ];
        for edge in &edges {
            self.fill_rect(edge, color);
        }
    }
}

/// Final tile color for an item after its effects
fn tile_color(id: ItemId, draw: &ItemDraw) -> u32 {
    let base = PALETTE[(id.0 as usize) % PALETTE.len()];
    let effects = &draw.value.effects;
    let mut color = blend_colors(base, BLACK, effects.darken);
    color = blend_colors(color, WHITE, effects.lighten);
    blend_colors(DOCK_BACKGROUND, color, effects.opacity)
}

/// Small bar between an item and the screen edge
fn indicator_rect(edge: DockEdge, bounds: &Rect) -> Rect {
    let size = (bounds.width.min(bounds.height) * 0.15).max(2.0);
    let center = bounds.center();
    match edge {
        DockEdge::Bottom => Rect::new(center.x - size, bounds.bottom() + 1.0, size * 2.0, size),
        DockEdge::Top => Rect::new(center.x - size, bounds.y - size - 1.0, size * 2.0, size),
        DockEdge::Left => Rect::new(bounds.x - size - 1.0, center.y - size, size, size * 2.0),
        DockEdge::Right => Rect::new(bounds.right() + 1.0, center.y - size, size, size * 2.0),
    }
}

/// Paint one frame into `frame`
pub fn paint(frame: &mut Frame<'_>, state: &FrameState, edge: DockEdge) {
    frame.clear(DESKTOP);

    if state.hidden && state.hide_progress >= 1.0 {
        frame.fill_rect(&state.footprint, REVEAL_STRIP);
        return;
    }

    frame.fill_rect(&state.background, DOCK_BACKGROUND);

    for draw in state.items.iter().chain(&state.removing) {
        let bounds = &draw.value.bounds;
        frame.fill_rect(bounds, tile_color(draw.id, draw));

        let indicator = draw.value.effects.indicator;
        if indicator > 0.0 {
            frame.blend_rect(&indicator_rect(edge, bounds), INDICATOR, indicator);
        }
    }

    if let Some(hovered) = state.hovered.and_then(|id| state.items.iter().find(|d| d.id == id)) {
        frame.outline_rect(&hovered.value.bounds, HOVER_OUTLINE);
    }
}

/// Owns the softbuffer surface of the preview window
pub struct Renderer {
    surface: Surface<Rc<Window>, Rc<Window>>,
    width: u32,
    height: u32,
}

impl Renderer {
    pub fn new(window: Rc<Window>, context: &softbuffer::Context<Rc<Window>>) -> Result<Self> {
        let size = window.inner_size();
        let mut surface = Surface::new(context, Rc::clone(&window))
            .map_err(|e| anyhow::anyhow!("Failed to create surface: {}", e))?;
        surface
            .resize(non_zero(size.width), non_zero(size.height))
            .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;

        Ok(Self {
            surface,
            width: size.width.max(1),
            height: size.height.max(1),
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<()> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        self.surface
            .resize(non_zero(width), non_zero(height))
            .map_err(|e| anyhow::anyhow!("Failed to resize surface: {}", e))?;
        self.width = width.max(1);
        self.height = height.max(1);
        Ok(())
    }

    pub fn render(&mut self, state: &FrameState, edge: DockEdge) -> Result<()> {
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| anyhow::anyhow!("Failed to get surface buffer: {}", e))?;
        {
            let mut frame = Frame::new(&mut buffer, self.width as usize, self.height as usize);
            paint(&mut frame, state, edge);
        }
        buffer
            .present()
            .map_err(|e| anyhow::anyhow!("Failed to present buffer: {}", e))?;
        Ok(())
    }
}

fn non_zero(value: u32) -> NonZeroU32 {
    NonZeroU32::new(value).unwrap_or(NonZeroU32::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blend_extremes() {
        assert_eq!(blend_colors(BLACK, WHITE, 0.0), BLACK);
        assert_eq!(blend_colors(BLACK, WHITE, 1.0), WHITE);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut pixels = vec![0u32; 10 * 10];
        let mut frame = Frame::new(&mut pixels, 10, 10);
        frame.fill_rect(&Rect::new(-5.0, 8.0, 100.0, 100.0), WHITE);
        assert_eq!(pixels[8 * 10], WHITE);
        assert_eq!(pixels[7 * 10 + 9], 0);
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let mut pixels = vec![0u32; 4];
        let mut frame = Frame::new(&mut pixels, 2, 2);
        frame.fill_rect(&Rect::new(1.0, 1.0, 0.0, 0.0), WHITE);
        assert!(pixels.iter().all(|&p| p == 0));
    }
}
