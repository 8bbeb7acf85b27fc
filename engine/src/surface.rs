use crate::graphics::CpuRenderer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn rgba_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }
}

/// An in-memory RGBA target for headless rendering and tests.
#[derive(Debug, Clone)]
pub struct RgbaBufferSurface {
    size: SurfaceSize,
    buf: Vec<u8>,
}

impl RgbaBufferSurface {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            buf: vec![0u8; size.rgba_len()],
        }
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn frame(&self) -> &[u8] {
        &self.buf
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + x as usize) * 4;
        let px = self.buf.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn resize(&mut self, size: SurfaceSize) {
        self.size = size;
        self.buf.resize(size.rgba_len(), 0u8);
    }

    /// Borrows the buffer as a renderer for one frame.
    pub fn renderer(&mut self) -> CpuRenderer<'_> {
        CpuRenderer::new(&mut self.buf, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::Renderer2d;
    use crate::ui::Rect;

    #[test]
    fn pixel_reads_back_what_renderer_wrote() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(8, 8));
        surface
            .renderer()
            .fill_rect(Rect::new(2, 3, 1, 1), [10, 20, 30, 255]);
        assert_eq!(surface.pixel(2, 3), Some([10, 20, 30, 255]));
        assert_eq!(surface.pixel(3, 3), Some([0, 0, 0, 0]));
        assert_eq!(surface.pixel(8, 0), None);
    }

    #[test]
    fn resize_tracks_rgba_len() {
        let mut surface = RgbaBufferSurface::new(SurfaceSize::new(2, 2));
        surface.resize(SurfaceSize::new(4, 3));
        assert_eq!(surface.frame().len(), 4 * 3 * 4);
    }
}
