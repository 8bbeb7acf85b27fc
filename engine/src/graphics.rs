use crate::{surface::SurfaceSize, ui::Rect};

pub type Color = [u8; 4];

// 3x5 block font, uppercase only.
pub const DEFAULT_TEXT_SCALE: u32 = 2;
const GLYPH_W: u32 = 3;
const GLYPH_H: u32 = 5;

fn glyph_advance_x(scale: u32) -> u32 {
    (GLYPH_W + 1) * scale.max(1)
}

fn line_advance_y(scale: u32) -> u32 {
    (GLYPH_H + 1) * scale.max(1)
}

/// Pixel width of the widest line of `text` at `scale`.
pub fn text_width(text: &str, scale: u32) -> u32 {
    text.lines()
        .map(|line| line.chars().count() as u32 * glyph_advance_x(scale))
        .max()
        .unwrap_or(0)
        .saturating_sub(scale.max(1))
}

pub fn text_height(scale: u32) -> u32 {
    GLYPH_H * scale.max(1)
}

/// 2D drawing interface the game renders through.
///
/// Only `fill_rect`, `blend_rect` and `draw_text_scaled` are required; shapes are composed from
/// horizontal spans.
pub trait Renderer2d {
    fn begin_frame(&mut self, size: SurfaceSize);
    fn size(&self) -> SurfaceSize;

    /// Opaque fill.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Alpha-blended fill over existing content.
    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8);

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32);

    fn draw_text(&mut self, x: u32, y: u32, text: &str, color: Color) {
        self.draw_text_scaled(x, y, text, color, DEFAULT_TEXT_SCALE);
    }

    fn clear(&mut self, color: Color) {
        let s = self.size();
        self.fill_rect(Rect::from_size(s.width, s.height), color);
    }

    fn rect_outline(&mut self, rect: Rect, color: Color) {
        if rect.w == 0 || rect.h == 0 {
            return;
        }
        let right = rect.x + rect.w - 1;
        let bottom = rect.y + rect.h - 1;
        self.fill_rect(Rect::new(rect.x, rect.y, rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, bottom, rect.w, 1), color);
        self.fill_rect(Rect::new(rect.x, rect.y, 1, rect.h), color);
        self.fill_rect(Rect::new(right, rect.y, 1, rect.h), color);
    }

    fn fill_circle(&mut self, cx: u32, cy: u32, radius: u32, color: Color) {
        for (y, x0, x1) in circle_spans(cx, cy, radius) {
            self.fill_rect(Rect::new(x0, y, x1 - x0, 1), color);
        }
    }

    /// Circle outline `thickness` pixels wide, growing inward from `radius`.
    fn ring(&mut self, cx: u32, cy: u32, radius: u32, thickness: u32, color: Color) {
        let inner = radius.saturating_sub(thickness.max(1));
        let r2 = (radius as i64) * (radius as i64);
        let i2 = (inner as i64) * (inner as i64);
        let (cxi, cyi, r) = (cx as i64, cy as i64, radius as i64);
        for dy in -r..=r {
            let y = cyi + dy;
            if y < 0 {
                continue;
            }
            let mut run_start: Option<i64> = None;
            for dx in -r..=r + 1 {
                let d2 = dx * dx + dy * dy;
                let on = dx <= r && d2 <= r2 && d2 > i2 && cxi + dx >= 0;
                match (on, run_start) {
                    (true, None) => run_start = Some(cxi + dx),
                    (false, Some(start)) => {
                        let end = cxi + dx;
                        self.fill_rect(
                            Rect::new(start as u32, y as u32, (end - start) as u32, 1),
                            color,
                        );
                        run_start = None;
                    }
                    _ => {}
                }
            }
        }
    }

    fn draw_text_centered(&mut self, rect: Rect, text: &str, color: Color, scale: u32) {
        let w = text_width(text, scale);
        let h = text_height(scale);
        let x = rect.x.saturating_add(rect.w.saturating_sub(w) / 2);
        let y = rect.y.saturating_add(rect.h.saturating_sub(h) / 2);
        self.draw_text_scaled(x, y, text, color, scale);
    }
}

/// Horizontal spans `(y, x_start, x_end_exclusive)` covering a filled circle.
fn circle_spans(cx: u32, cy: u32, radius: u32) -> Vec<(u32, u32, u32)> {
    let r = radius as i64;
    let mut spans = Vec::with_capacity(radius as usize * 2 + 1);
    for dy in -r..=r {
        let y = cy as i64 + dy;
        if y < 0 {
            continue;
        }
        let half = ((r * r - dy * dy) as f64).sqrt() as i64;
        let x0 = (cx as i64 - half).max(0);
        let x1 = cx as i64 + half + 1;
        if x1 > x0 {
            spans.push((y as u32, x0 as u32, x1 as u32));
        }
    }
    spans
}

/// Renderer that writes straight into an RGBA8 frame buffer.
pub struct CpuRenderer<'a> {
    frame: &'a mut [u8],
    size: SurfaceSize,
}

impl<'a> CpuRenderer<'a> {
    pub fn new(frame: &'a mut [u8], size: SurfaceSize) -> Self {
        Self { frame, size }
    }

    /// Clips `rect` to the surface and yields the byte range of each covered row.
    fn rows(&self, rect: Rect) -> Option<Vec<std::ops::Range<usize>>> {
        if self.frame.len() < self.size.rgba_len() || self.size.is_empty() {
            return None;
        }
        let max_x = rect.x.saturating_add(rect.w).min(self.size.width);
        let max_y = rect.y.saturating_add(rect.h).min(self.size.height);
        if rect.x >= max_x || rect.y >= max_y {
            return None;
        }
        let stride = self.size.width as usize * 4;
        let start_col = rect.x as usize * 4;
        let end_col = max_x as usize * 4;
        let rows = (rect.y..max_y)
            .map(|y| {
                let base = y as usize * stride;
                base + start_col..base + end_col
            })
            .collect();
        Some(rows)
    }

    fn set_pixel(&mut self, x: u32, y: u32, color: Color) {
        if x >= self.size.width || y >= self.size.height {
            return;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        if let Some(px) = self.frame.get_mut(idx..idx + 4) {
            px.copy_from_slice(&color);
        }
    }

    fn draw_char(&mut self, x: u32, y: u32, ch: char, color: Color, scale: u32) {
        for (row, bits) in glyph_rows(ch).into_iter().enumerate() {
            let py0 = y.saturating_add(row as u32 * scale);
            for col in 0..GLYPH_W {
                if bits & (1u8 << (GLYPH_W - 1 - col)) == 0 {
                    continue;
                }
                let px0 = x.saturating_add(col * scale);
                for dy in 0..scale {
                    for dx in 0..scale {
                        self.set_pixel(px0 + dx, py0 + dy, color);
                    }
                }
            }
        }
    }
}

impl Renderer2d for CpuRenderer<'_> {
    fn begin_frame(&mut self, size: SurfaceSize) {
        self.size = size;
    }

    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        let Some(rows) = self.rows(rect) else {
            return;
        };
        for range in rows {
            for px in self.frame[range].chunks_exact_mut(4) {
                px.copy_from_slice(&color);
            }
        }
    }

    fn blend_rect(&mut self, rect: Rect, color: Color, alpha: u8) {
        match alpha {
            0 => return,
            255 => return self.fill_rect(rect, color),
            _ => {}
        }
        let Some(rows) = self.rows(rect) else {
            return;
        };
        let a = alpha as u32;
        let inv = 255 - a;
        for range in rows {
            for px in self.frame[range].chunks_exact_mut(4) {
                for c in 0..3 {
                    px[c] = ((px[c] as u32 * inv + color[c] as u32 * a + 127) / 255) as u8;
                }
                px[3] = 255;
            }
        }
    }

    fn draw_text_scaled(&mut self, x: u32, y: u32, text: &str, color: Color, scale: u32) {
        let scale = scale.max(1);
        let adv_x = glyph_advance_x(scale);
        let adv_y = line_advance_y(scale);
        let mut cursor_x = x;
        let mut cursor_y = y;

        for ch in text.chars() {
            if ch == '\n' {
                cursor_x = x;
                cursor_y = cursor_y.saturating_add(adv_y);
                continue;
            }
            if cursor_x >= self.size.width || cursor_y >= self.size.height {
                continue;
            }
            if ch != ' ' {
                self.draw_char(cursor_x, cursor_y, ch, color, scale);
            }
            cursor_x = cursor_x.saturating_add(adv_x);
        }
    }
}

fn glyph_rows(ch: char) -> [u8; GLYPH_H as usize] {
    match ch.to_ascii_uppercase() {
        '0' => [0b111, 0b101, 0b101, 0b101, 0b111],
        '1' => [0b010, 0b110, 0b010, 0b010, 0b111],
        '2' => [0b111, 0b001, 0b111, 0b100, 0b111],
        '3' => [0b111, 0b001, 0b111, 0b001, 0b111],
        '4' => [0b101, 0b101, 0b111, 0b001, 0b001],
        '5' => [0b111, 0b100, 0b111, 0b001, 0b111],
        '6' => [0b111, 0b100, 0b111, 0b101, 0b111],
        '7' => [0b111, 0b001, 0b001, 0b001, 0b001],
        '8' => [0b111, 0b101, 0b111, 0b101, 0b111],
        '9' => [0b111, 0b101, 0b111, 0b001, 0b111],
        'A' => [0b010, 0b101, 0b111, 0b101, 0b101],
        'B' => [0b110, 0b101, 0b110, 0b101, 0b110],
        'C' => [0b111, 0b100, 0b100, 0b100, 0b111],
        'D' => [0b110, 0b101, 0b101, 0b101, 0b110],
        'E' => [0b111, 0b100, 0b111, 0b100, 0b111],
        'F' => [0b111, 0b100, 0b111, 0b100, 0b100],
        'G' => [0b111, 0b100, 0b101, 0b101, 0b111],
        'H' => [0b101, 0b101, 0b111, 0b101, 0b101],
        'I' => [0b111, 0b010, 0b010, 0b010, 0b111],
        'J' => [0b111, 0b001, 0b001, 0b101, 0b010],
        'K' => [0b101, 0b110, 0b100, 0b110, 0b101],
        'L' => [0b100, 0b100, 0b100, 0b100, 0b111],
        'M' => [0b101, 0b111, 0b111, 0b101, 0b101],
        'N' => [0b101, 0b111, 0b111, 0b111, 0b101],
        'O' => [0b111, 0b101, 0b101, 0b101, 0b111],
        'P' => [0b111, 0b101, 0b111, 0b100, 0b100],
        'Q' => [0b111, 0b101, 0b101, 0b111, 0b001],
        'R' => [0b111, 0b101, 0b111, 0b110, 0b101],
        'S' => [0b111, 0b100, 0b111, 0b001, 0b111],
        'T' => [0b111, 0b010, 0b010, 0b010, 0b010],
        'U' => [0b101, 0b101, 0b101, 0b101, 0b111],
        'V' => [0b101, 0b101, 0b101, 0b101, 0b010],
        'W' => [0b101, 0b101, 0b111, 0b111, 0b101],
        'X' => [0b101, 0b101, 0b010, 0b101, 0b101],
        'Y' => [0b101, 0b101, 0b010, 0b010, 0b010],
        'Z' => [0b111, 0b001, 0b010, 0b100, 0b111],
        '.' => [0b000, 0b000, 0b000, 0b000, 0b010],
        ':' => [0b000, 0b010, 0b000, 0b010, 0b000],
        '-' => [0b000, 0b000, 0b111, 0b000, 0b000],
        '!' => [0b010, 0b010, 0b010, 0b000, 0b010],
        '/' => [0b001, 0b001, 0b010, 0b100, 0b100],
        '+' => [0b000, 0b010, 0b111, 0b010, 0b000],
        _ => [0b111, 0b001, 0b010, 0b000, 0b010],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(frame: &[u8], width: u32, x: u32, y: u32) -> [u8; 4] {
        let i = ((y * width + x) * 4) as usize;
        [frame[i], frame[i + 1], frame[i + 2], frame[i + 3]]
    }

    #[test]
    fn fill_rect_clips_to_surface() {
        let size = SurfaceSize::new(4, 4);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.fill_rect(Rect::new(2, 2, 10, 10), [255, 0, 0, 255]);
        assert_eq!(px(&frame, 4, 3, 3), [255, 0, 0, 255]);
        assert_eq!(px(&frame, 4, 1, 1), [0, 0, 0, 0]);
    }

    #[test]
    fn blend_rect_mixes_with_background() {
        let size = SurfaceSize::new(1, 1);
        let mut frame = vec![0, 0, 0, 255];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.blend_rect(Rect::new(0, 0, 1, 1), [255, 255, 255, 255], 128);
        assert_eq!(frame, vec![128, 128, 128, 255]);
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let size = SurfaceSize::new(80, 80);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.ring(40, 40, 30, 3, [255, 255, 255, 255]);
        assert_eq!(px(&frame, 80, 40, 40), [0, 0, 0, 0]);
        assert_eq!(px(&frame, 80, 40 + 29, 40), [255, 255, 255, 255]);
        assert_eq!(px(&frame, 80, 40, 40 - 30), [255, 255, 255, 255]);
        assert_eq!(px(&frame, 80, 40 + 25, 40), [0, 0, 0, 0]);
    }

    #[test]
    fn fill_circle_covers_center_and_radius() {
        let size = SurfaceSize::new(21, 21);
        let mut frame = vec![0u8; size.rgba_len()];
        let mut gfx = CpuRenderer::new(&mut frame, size);
        gfx.fill_circle(10, 10, 5, [1, 2, 3, 255]);
        assert_eq!(px(&frame, 21, 10, 10), [1, 2, 3, 255]);
        assert_eq!(px(&frame, 21, 15, 10), [1, 2, 3, 255]);
        assert_eq!(px(&frame, 21, 16, 10), [0, 0, 0, 0]);
        assert_eq!(px(&frame, 21, 15, 15), [0, 0, 0, 0]);
    }

    #[test]
    fn text_width_ignores_trailing_gap() {
        assert_eq!(text_width("A", 2), 6);
        assert_eq!(text_width("AB", 1), 7);
        assert_eq!(text_width("", 2), 0);
    }
}
