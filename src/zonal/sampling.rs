//! Pixel selection for a region
//!
//! Selects the image pixels whose values feed a region's statistics,
//! either on the image's own grid or through a resampling grid in a
//! chosen CRS.

use crate::collection::GeoGrid;
use crate::coordinate::geodesy::METERS_PER_DEGREE;
use crate::coordinate::{BoundingBox, CoordinateSystem, CoordinateTransformer, Point};
use crate::errors::{ZonalError, ZonalResult};
use crate::features::Geometry;
use crate::raster::PixelWindow;

/// Upper bound on the cells of one resampling grid
const MAX_CELLS: f64 = 25_000_000.0;

/// Edge samples when projecting region bounds
const BOUNDS_STEPS: usize = 8;

/// How regions are laid over an image
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SamplingGrid {
    /// The image's own pixels
    Native,
    /// Cells of `cell_size` CRS units aligned to the CRS origin
    Resampled { crs: CoordinateSystem, cell_size: f64 },
}

impl SamplingGrid {
    /// Grid for an image given the requested scale (metres) and CRS
    ///
    /// Without either, the native grid. Otherwise a missing CRS is the
    /// image's, a missing scale its nominal pixel size.
    pub fn for_image(grid: &GeoGrid, scale: Option<f64>, crs: Option<CoordinateSystem>) -> Self {
        if scale.is_none() && crs.is_none() {
            return SamplingGrid::Native;
        }
        let crs = crs.unwrap_or(grid.crs);
        let scale = scale.unwrap_or_else(|| grid.nominal_scale());
        let cell_size = if crs.is_geographic() {
            scale / METERS_PER_DEGREE
        } else {
            scale
        };
        SamplingGrid::Resampled { crs, cell_size }
    }

    /// Image pixels sampled for a region, one entry per grid cell inside it
    ///
    /// A pixel may repeat when several cells fall on it.
    pub fn sample(&self, grid: &GeoGrid, region: &Geometry) -> ZonalResult<Vec<(u32, u32)>> {
        match self {
            SamplingGrid::Native => Ok(native_pixels(grid, region)),
            SamplingGrid::Resampled { crs, cell_size } => resampled_pixels(grid, region, crs, *cell_size),
        }
    }
}

fn native_pixels(grid: &GeoGrid, region: &Geometry) -> Vec<(u32, u32)> {
    let window = match candidate_window(grid, &region.bounds()) {
        Some(w) => w,
        None => return Vec::new(),
    };

    let mut pixels = Vec::new();
    for row in window.y..window.end_y() {
        for col in window.x..window.end_x() {
            let lonlat = grid.crs.to_lonlat(grid.pixel_center(col, row));
            if region.contains(&lonlat) {
                pixels.push((col, row));
            }
        }
    }
    pixels
}

/// Pixels of the image that may hold the centre of a pixel inside `bounds`
fn candidate_window(grid: &GeoGrid, lonlat_bounds: &BoundingBox) -> Option<PixelWindow> {
    let map_bounds = CoordinateTransformer::transform_bbox(
        lonlat_bounds, &CoordinateSystem::WGS84, &grid.crs, BOUNDS_STEPS,
    )?;

    let mut cols = (f64::INFINITY, f64::NEG_INFINITY);
    let mut rows = (f64::INFINITY, f64::NEG_INFINITY);
    for corner in map_bounds.corners() {
        let (c, r) = grid.transform.invert(corner.x, corner.y)?;
        cols = (cols.0.min(c), cols.1.max(c));
        rows = (rows.0.min(r), rows.1.max(r));
    }

    let col0 = cols.0.floor().max(0.0);
    let row0 = rows.0.floor().max(0.0);
    let col1 = cols.1.ceil().min(grid.width as f64);
    let row1 = rows.1.ceil().min(grid.height as f64);
    if !(col0 < col1 && row0 < row1) {
        return None;
    }
    Some(PixelWindow::new(col0 as u32, row0 as u32, (col1 - col0) as u32, (row1 - row0) as u32))
}

fn resampled_pixels(
    grid: &GeoGrid,
    region: &Geometry,
    crs: &CoordinateSystem,
    cell_size: f64,
) -> ZonalResult<Vec<(u32, u32)>> {
    if cell_size <= 0.0 || !cell_size.is_finite() {
        return Err(ZonalError::ConfigError(format!("Invalid sampling cell size {}", cell_size)));
    }
    let bounds = match CoordinateTransformer::transform_bbox(&region.bounds(), &CoordinateSystem::WGS84, crs, BOUNDS_STEPS) {
        Some(b) => b,
        None => return Ok(Vec::new()),
    };

    let i0 = (bounds.min_x / cell_size).floor();
    let i1 = (bounds.max_x / cell_size).ceil();
    let j0 = (bounds.min_y / cell_size).floor();
    let j1 = (bounds.max_y / cell_size).ceil();
    if (i1 - i0) * (j1 - j0) > MAX_CELLS {
        return Err(ZonalError::ConfigError(format!(
            "Scale {} {} is too fine for a region of {:.1} x {:.1}",
            cell_size, crs, bounds.width(), bounds.height()
        )));
    }

    let mut pixels = Vec::new();
    let mut j = j0;
    while j < j1 {
        let mut i = i0;
        while i < i1 {
            let center = Point::new((i + 0.5) * cell_size, (j + 0.5) * cell_size);
            let lonlat = crs.to_lonlat(center);
            if region.contains(&lonlat) {
                let image_xy = CoordinateTransformer::transform_point(&center, crs, &grid.crs);
                if let Some(pixel) = grid.pixel_at(&image_xy) {
                    pixels.push(pixel);
                }
            }
            i += 1.0;
        }
        j += 1.0;
    }
    Ok(pixels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinate::CoordinateSystemFactory;
    use crate::tiff::GeoTransform;

    /// 10 x 10 grid of 0.01 degree pixels from (10.0, 51.1) to (10.1, 51.0)
    fn geographic_grid() -> GeoGrid {
        GeoGrid {
            width: 10,
            height: 10,
            transform: GeoTransform::north_up(10.0, 51.1, 0.01, 0.01),
            crs: CoordinateSystem::WGS84,
        }
    }

    #[test]
    fn native_grid_uses_pixel_centres() {
        let grid = geographic_grid();
        let center = grid.pixel_center(4, 6);
        let tight = Geometry::Disc { center, radius: 100.0 };
        assert_eq!(SamplingGrid::Native.sample(&grid, &tight).unwrap(), vec![(4, 6)]);

        let wide = Geometry::Disc { center, radius: 1_200.0 };
        let pixels = SamplingGrid::Native.sample(&grid, &wide).unwrap();
        assert!(pixels.contains(&(4, 5)) && pixels.contains(&(3, 6)));
        assert!(!pixels.contains(&(3, 5)));
    }

    #[test]
    fn outside_regions_sample_nothing() {
        let grid = geographic_grid();
        let far = Geometry::Disc { center: Point::new(13.75, 52.96), radius: 10_000.0 };
        assert!(SamplingGrid::Native.sample(&grid, &far).unwrap().is_empty());
    }

    #[test]
    fn grid_choice() {
        let grid = geographic_grid();
        assert_eq!(SamplingGrid::for_image(&grid, None, None), SamplingGrid::Native);

        match SamplingGrid::for_image(&grid, Some(1000.0), None) {
            SamplingGrid::Resampled { crs, cell_size } => {
                assert_eq!(crs, CoordinateSystem::WGS84);
                assert!((cell_size - 1000.0 / METERS_PER_DEGREE).abs() < 1e-12);
            },
            other => panic!("unexpected {:?}", other),
        }

        let lcc = CoordinateSystemFactory::from_epsg(5243).unwrap();
        assert_eq!(
            SamplingGrid::for_image(&grid, Some(1000.0), Some(lcc)),
            SamplingGrid::Resampled { crs: lcc, cell_size: 1000.0 }
        );
    }

    #[test]
    fn resampled_cells_pick_nearest_pixels() {
        let grid = geographic_grid();
        let lcc = CoordinateSystemFactory::from_epsg(5243).unwrap();
        let region = Geometry::Disc { center: grid.pixel_center(5, 5), radius: 2_000.0 };

        let sampling = SamplingGrid::Resampled { crs: lcc, cell_size: 1000.0 };
        let pixels = sampling.sample(&grid, &region).unwrap();
        // a 2 km disc holds roughly pi * 4 cells of 1 km
        assert!(pixels.len() >= 9 && pixels.len() <= 16, "{} cells", pixels.len());
        assert!(pixels.iter().all(|&(c, r)| (2..=8).contains(&c) && (3..=7).contains(&r)));

        let too_fine = SamplingGrid::Resampled { crs: lcc, cell_size: 0.1 };
        assert!(too_fine.sample(&grid, &region).is_err());
    }
}
