//! Dense storage of raw cell values.
//!
//! Cells are kept row-major in the sense that a flat buffer is read as
//! `data[row * width + col]`, with `col` along the grid x axis and `row` along
//! the grid y axis. Internally the values live in a `(height, width)` matrix
//! indexed as `(row, col)`.

use std::path::Path;

use image::{DynamicImage, GrayImage, Luma};
use log::{debug, error};
use na::DMatrix;

use crate::error::{OccupancyError, Result};
use crate::map_representation::grid_frame::GridFrame;
use crate::map_representation::value_model::{RawCell, ValueConvention};
use crate::Point;

/// Raw cell values, tagged by the convention they are read with.
#[derive(Clone, Debug, PartialEq)]
pub enum CellBuffer {
    UnsignedByte(DMatrix<u8>),
    SignedPercent(DMatrix<i8>),
}

impl CellBuffer {
    pub fn convention(&self) -> ValueConvention {
        match self {
            CellBuffer::UnsignedByte(_) => ValueConvention::UnsignedByte,
            CellBuffer::SignedPercent(_) => ValueConvention::SignedPercent,
        }
    }

    fn probability(&self, row: usize, col: usize) -> f64 {
        match self {
            CellBuffer::UnsignedByte(cells) => cells[(row, col)].probability(),
            CellBuffer::SignedPercent(cells) => cells[(row, col)].probability(),
        }
    }
}

/// A loaded grid: cell values plus the frame placing them in the world.
#[derive(Clone, Debug)]
pub struct GridStorage {
    cells: CellBuffer,
    width: usize,
    height: usize,
    frame: GridFrame,
}

impl GridStorage {
    /// Copies a caller buffer into a new grid.
    ///
    /// `u8` buffers are read as grayscale image bytes, `i8` buffers as
    /// percentages with a `-1` unknown sentinel.
    pub fn from_buffer<T: RawCell>(
        data: &[T],
        width: usize,
        height: usize,
        frame: GridFrame,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(OccupancyError::EmptyGrid { width, height });
        }
        let expected = width.saturating_mul(height);
        if data.len() != expected {
            return Err(OccupancyError::BufferSizeMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        if let Some((index, value)) = data.iter().enumerate().find(|(_, v)| !v.is_representable()) {
            return Err(OccupancyError::InvalidCellValue {
                index,
                value: (*value).into(),
            });
        }

        debug!(
            "Adopting {}x{} {} grid at resolution {}",
            width,
            height,
            T::CONVENTION,
            frame.resolution()
        );

        Ok(Self {
            cells: T::into_buffer(DMatrix::from_row_slice(height, width, data)),
            width,
            height,
            frame,
        })
    }

    /// Decodes a grayscale image file into a new grid.
    ///
    /// The top row of the image becomes row 0. See [`GridStorage::decode_gray`]
    /// for the accepted layouts.
    pub fn from_image<P: AsRef<Path>>(path: P, frame: GridFrame) -> Result<Self> {
        Self::from_gray_image(&Self::decode_gray(path)?, frame)
    }

    /// Decodes an image file into an 8 bit gray raster.
    ///
    /// 16 bit samples keep their high byte. A gray image whose alpha is only
    /// ever fully opaque or fully transparent, which is what a gray PNG with a
    /// `tRNS` chunk decodes to, keeps its gray channel. Anything else is
    /// rejected, including gray+alpha with partial transparency.
    pub fn decode_gray<P: AsRef<Path>>(path: P) -> Result<GrayImage> {
        let path = path.as_ref();
        let decoded = image::open(path)?;
        let color = decoded.color();
        let raster = match decoded {
            DynamicImage::ImageLuma8(gray) => Some(gray),
            DynamicImage::ImageLuma16(gray) => Some(GrayImage::from_fn(
                gray.width(),
                gray.height(),
                |x, y| Luma([(gray.get_pixel(x, y).0[0] >> 8) as u8]),
            )),
            DynamicImage::ImageLumaA8(gray) => gray
                .pixels()
                .all(|p| p.0[1] == 0 || p.0[1] == u8::MAX)
                .then(|| {
                    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                        Luma([gray.get_pixel(x, y).0[0]])
                    })
                }),
            DynamicImage::ImageLumaA16(gray) => gray
                .pixels()
                .all(|p| p.0[1] == 0 || p.0[1] == u16::MAX)
                .then(|| {
                    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
                        Luma([(gray.get_pixel(x, y).0[0] >> 8) as u8])
                    })
                }),
            _ => None,
        };

        raster.ok_or_else(|| {
            error!("{} is not a grayscale image!", path.display());
            OccupancyError::NotGrayscale {
                path: path.to_path_buf(),
                color: format!("{:?}", color),
            }
        })
    }

    /// Adopts an already decoded 8 bit grayscale raster.
    pub fn from_gray_image(raster: &GrayImage, frame: GridFrame) -> Result<Self> {
        Self::from_buffer(
            raster.as_raw(),
            raster.width() as usize,
            raster.height() as usize,
            frame,
        )
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frame(&self) -> &GridFrame {
        &self.frame
    }

    pub fn cells(&self) -> &CellBuffer {
        &self.cells
    }

    pub fn convention(&self) -> ValueConvention {
        self.cells.convention()
    }

    pub fn contains(&self, col: i64, row: i64) -> bool {
        col >= 0 && row >= 0 && (col as u64) < self.width as u64 && (row as u64) < self.height as u64
    }

    /// Occupancy probability of a cell, or `None` when it is off the grid
    pub fn cell_probability(&self, col: i64, row: i64) -> Option<f64> {
        if !self.contains(col, row) {
            return None;
        }
        Some(self.cells.probability(row as usize, col as usize))
    }

    /// Axis-aligned world bounding box of the corner cell centres: (min, max)
    pub fn world_bounds(&self) -> (Point, Point) {
        let last_col = self.width as i64 - 1;
        let last_row = self.height as i64 - 1;
        let corners = [
            self.frame.cell_to_world(0, 0),
            self.frame.cell_to_world(last_col, 0),
            self.frame.cell_to_world(0, last_row),
            self.frame.cell_to_world(last_col, last_row),
        ];
        let mut min = corners[0];
        let mut max = corners[0];
        for corner in &corners[1..] {
            min = min.inf(corner);
            max = max.sup(corner);
        }
        (min, max)
    }
}
