use eyre::Result;

use crate::error::DriverError;

/// Where finished images end up. Scaling is the surface's business.
pub trait DisplaySurface {
    fn blit(&mut self, image: &[u8], width: usize, height: usize) -> Result<()>;
}

/// Converts the engine's packed RGB frame into an opaque RGBA image.
pub struct Renderer {
    width: usize,
    height: usize,
    image: Vec<u8>,
}

impl Renderer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            image: vec![0; width * height * 4],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The scratch image is overwritten in full before it is handed out.
    pub fn render(&mut self, frame: &[u8]) -> Result<&[u8], DriverError> {
        let expected = self.width * self.height * 3;
        if frame.len() != expected {
            return Err(DriverError::FrameSize {
                expected,
                actual: frame.len(),
            });
        }

        for (rgb, rgba) in frame.chunks_exact(3).zip(self.image.chunks_exact_mut(4)) {
            rgba[..3].copy_from_slice(rgb);
            rgba[3] = 255;
        }

        Ok(&self.image)
    }
}
