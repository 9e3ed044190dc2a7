//! Pixel windows and the band values read for them
//!
//! Pixel coordinates follow the usual image convention: (0, 0) is the
//! top-left pixel, columns grow to the right and rows grow downwards.

/// Rectangular block of pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelWindow {
    /// Column of the top-left pixel
    pub x: u32,
    /// Row of the top-left pixel
    pub y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl PixelWindow {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        PixelWindow { x, y, width, height }
    }

    /// Column after the rightmost pixel
    pub fn end_x(&self) -> u32 {
        self.x + self.width
    }

    /// Row after the bottom pixel
    pub fn end_y(&self) -> u32 {
        self.y + self.height
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn contains(&self, col: u32, row: u32) -> bool {
        col >= self.x && col < self.end_x() && row >= self.y && row < self.end_y()
    }

    /// Smallest window holding every listed pixel
    pub fn covering<I: IntoIterator<Item = (u32, u32)>>(pixels: I) -> Option<Self> {
        let mut bounds: Option<(u32, u32, u32, u32)> = None;
        for (col, row) in pixels {
            bounds = Some(match bounds {
                None => (col, row, col, row),
                Some((x0, y0, x1, y1)) => (x0.min(col), y0.min(row), x1.max(col), y1.max(row)),
            });
        }
        bounds.map(|(x0, y0, x1, y1)| PixelWindow::new(x0, y0, x1 - x0 + 1, y1 - y0 + 1))
    }

    /// Part of the window inside a raster of the given size
    pub fn clip(&self, width: u32, height: u32) -> Option<Self> {
        let end_x = self.end_x().min(width);
        let end_y = self.end_y().min(height);
        if self.x >= end_x || self.y >= end_y {
            return None;
        }
        Some(PixelWindow::new(self.x, self.y, end_x - self.x, end_y - self.y))
    }
}

/// Band values of a window, row-major, NaN where masked
#[derive(Debug, Clone, PartialEq)]
pub struct BandWindow {
    pub window: PixelWindow,
    /// One buffer per requested band, in request order
    pub values: Vec<Vec<f64>>,
}

impl BandWindow {
    /// A window with every value masked
    pub fn masked(window: PixelWindow, band_count: usize) -> Self {
        BandWindow {
            window,
            values: vec![vec![f64::NAN; window.pixel_count()]; band_count],
        }
    }

    /// Unmasked value of the `band`-th requested band at an absolute pixel
    pub fn get(&self, band: usize, col: u32, row: u32) -> Option<f64> {
        if !self.window.contains(col, row) {
            return None;
        }
        let idx = (row - self.window.y) as usize * self.window.width as usize + (col - self.window.x) as usize;
        self.values.get(band)?
            .get(idx)
            .copied()
            .filter(|v| !v.is_nan())
    }

    /// Replaces values equal to `nodata` with NaN
    pub fn mask_nodata(&mut self, nodata: Option<f64>) {
        let nodata = match nodata {
            Some(v) if !v.is_nan() => v,
            _ => return,
        };
        for band in &mut self.values {
            for v in band.iter_mut().filter(|v| **v == nodata) {
                *v = f64::NAN;
            }
        }
    }
}
