use std::sync::atomic::{AtomicU32, Ordering};

use crate::hue::TRANSPARENT;

/// An RGBA8 frame shared between the render worker and the presentation side.
///
/// Each pixel is one `AtomicU32` holding its four bytes, so a reader can copy
/// out a frame that is still being written without tearing an individual
/// pixel. There is only ever one writer (the pass that owns the frame); the
/// hand-over of a finished frame is ordered by the worker's report channel,
/// so per-pixel accesses are `Relaxed`.
#[derive(Debug)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    pixels: Box<[AtomicU32]>,
}

#[inline]
fn pack(rgba: [u8; 4]) -> u32 {
    u32::from_ne_bytes(rgba)
}

#[inline]
fn unpack(v: u32) -> [u8; 4] {
    v.to_ne_bytes()
}

impl PixelBuffer {
    /// Create a fully transparent buffer.
    pub fn new(width: u32, height: u32) -> Self {
        let len = width as usize * height as usize;
        let pixels = (0..len).map(|_| AtomicU32::new(pack(TRANSPARENT))).collect();
        Self {
            width,
            height,
            pixels,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixel_count(&self) -> usize {
        self.pixels.len()
    }

    /// Reset every pixel to transparent.
    pub fn clear(&self) {
        let empty = pack(TRANSPARENT);
        for px in self.pixels.iter() {
            px.store(empty, Ordering::Relaxed);
        }
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn store(&self, x: u32, y: u32, rgba: [u8; 4]) {
        self.pixels[self.index(x, y)].store(pack(rgba), Ordering::Relaxed);
    }

    #[inline]
    pub fn load(&self, x: u32, y: u32) -> [u8; 4] {
        unpack(self.pixels[self.index(x, y)].load(Ordering::Relaxed))
    }

    /// Write a whole row at once. `row` must hold exactly `width` pixels.
    pub fn store_row(&self, y: u32, row: &[[u8; 4]]) {
        debug_assert_eq!(row.len(), self.width as usize);
        let start = self.index(0, y);
        for (slot, rgba) in self.pixels[start..start + row.len()].iter().zip(row) {
            slot.store(pack(*rgba), Ordering::Relaxed);
        }
    }

    /// Copy the current contents into `out` as tightly packed RGBA bytes,
    /// reusing its allocation.
    pub fn snapshot_into(&self, out: &mut Vec<u8>) {
        out.clear();
        out.reserve(self.pixels.len() * 4);
        for px in self.pixels.iter() {
            out.extend_from_slice(&unpack(px.load(Ordering::Relaxed)));
        }
    }

    /// Current contents as tightly packed RGBA bytes, row-major.
    pub fn to_rgba8(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.snapshot_into(&mut out);
        out
    }
}
