//! Pixel payloads written into the shared buffer before each commit.

use clap::ValueEnum;

/// Mutates the mapped buffer in place ahead of an attach.
pub trait Painter {
    fn paint(&mut self, pixels: &mut [u8]);
}

/// Flips every bit, so consecutive frames alternate between two images.
#[derive(Debug, Default)]
pub struct Invert;

impl Painter for Invert {
    fn paint(&mut self, pixels: &mut [u8]) {
        pixels.iter_mut().for_each(|byte| *byte = !*byte);
    }
}

/// Adds one to every byte, wrapping, so the colour drifts each frame.
#[derive(Debug, Default)]
pub struct Increment;

impl Painter for Increment {
    fn paint(&mut self, pixels: &mut [u8]) {
        pixels
            .iter_mut()
            .for_each(|byte| *byte = byte.wrapping_add(1));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PaintMode {
    Invert,
    Increment,
}

impl PaintMode {
    pub fn painter(self) -> Box<dyn Painter> {
        match self {
            PaintMode::Invert => Box::new(Invert),
            PaintMode::Increment => Box::new(Increment),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invert_twice_restores() {
        let mut pixels = vec![0x00, 0x0F, 0xFF, 0x80];
        let mut painter = Invert;

        painter.paint(&mut pixels);
        assert_eq!(pixels, vec![0xFF, 0xF0, 0x00, 0x7F]);
        painter.paint(&mut pixels);
        assert_eq!(pixels, vec![0x00, 0x0F, 0xFF, 0x80]);
    }

    #[test]
    fn increment_wraps() {
        let mut pixels = vec![0x00, 0xFF];
        Increment.paint(&mut pixels);
        assert_eq!(pixels, vec![0x01, 0x00]);
    }
}
