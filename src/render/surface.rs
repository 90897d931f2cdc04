use crate::foundation::core::Canvas;
use crate::foundation::error::{ReelforgeError, ReelforgeResult};

/// Offscreen pixel buffer (premultiplied RGBA8, row-major).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl Surface {
    /// Allocate a transparent surface. Dimensions must be non-zero and fit in `u16`.
    pub fn new(width: u32, height: u32) -> ReelforgeResult<Self> {
        if width == 0 || height == 0 {
            return Err(ReelforgeError::render("surface dimensions must be > 0"));
        }
        if width > u32::from(u16::MAX) || height > u32::from(u16::MAX) {
            return Err(ReelforgeError::render(format!(
                "surface {width}x{height} exceeds the {} px limit",
                u16::MAX
            )));
        }
        let len = (width as usize) * (height as usize) * 4;
        Ok(Self {
            width,
            height,
            data: vec![0; len],
        })
    }

    pub fn for_canvas(canvas: Canvas) -> ReelforgeResult<Self> {
        Self::new(canvas.width, canvas.height)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn canvas(&self) -> Canvas {
        Canvas {
            width: self.width,
            height: self.height,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn clear(&mut self) {
        self.data.fill(0);
    }

    /// Premultiplied pixel at (`x`, `y`).
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        Some([
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ])
    }
}
