use std::marker::PhantomData;
use std::path::Path;

use image::imageops;

use crate::config::map_metadata::MapMetadata;
use crate::config::thresholds::OccupancyThresholds;
use crate::error::{OccupancyError, Result};
use crate::map_representation::grid_frame::GridFrame;
use crate::map_representation::grid_storage::GridStorage;
use crate::map_representation::map::Map;
use crate::map_representation::object_radius::ObjectRadius;
use crate::map_representation::value_model::{RawCell, ValueConvention, UNKNOWN_PROBABILITY};
use crate::sampling::sampler::SamplerConfig;
use crate::state::pose_2d::Pose2D;
use crate::state::state::State2D;
use crate::Point;

/// Fraction of a cell used as the step when walking a segment
pub const DEFAULT_SEGMENT_STEP_FRACTION: f64 = 0.5;

/// Collision oracle over a probabilistic occupancy grid.
///
/// A value of this type always holds a loaded grid. Loading again through
/// [`OccupancyGrid2D::load_from_image`] or [`OccupancyGrid2D::load_from_buffer`]
/// swaps the whole grid, or leaves it untouched if the new one is rejected.
#[derive(Clone, Debug)]
pub struct OccupancyGrid2D<S: State2D> {
    storage: GridStorage,
    object_radius: ObjectRadius,
    thresholds: OccupancyThresholds,
    sampler_config: SamplerConfig,
    segment_step_fraction: f64,
    _state: PhantomData<fn(&S)>,
}

impl<S: State2D> OccupancyGrid2D<S> {
    fn from_storage(storage: GridStorage) -> Self {
        Self {
            storage,
            object_radius: ObjectRadius::default(),
            thresholds: OccupancyThresholds::default(),
            sampler_config: SamplerConfig::default(),
            segment_step_fraction: DEFAULT_SEGMENT_STEP_FRACTION,
            _state: PhantomData,
        }
    }

    /// Loads a grayscale image as an unsigned-byte grid
    pub fn from_image<P: AsRef<Path>>(path: P, resolution: f64, origin: &S) -> Result<Self> {
        let frame = GridFrame::new(resolution, origin)?;
        Ok(Self::from_storage(GridStorage::from_image(path, frame)?))
    }

    /// Adopts a row-major buffer; the element type picks the value convention
    pub fn from_buffer<T: RawCell>(
        data: &[T],
        width: usize,
        height: usize,
        resolution: f64,
        origin: &S,
    ) -> Result<Self> {
        let frame = GridFrame::new(resolution, origin)?;
        Ok(Self::from_storage(GridStorage::from_buffer(
            data, width, height, frame,
        )?))
    }

    /// Loads a ROS `map_server` YAML description and the image it names.
    ///
    /// ROS images have y growing upward from the bottom-left corner, so the
    /// bottom image row becomes grid row 0 and the grid origin is the centre
    /// of the bottom-left pixel. With `negate` set, white reads as occupied.
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let metadata = MapMetadata::load(path)?;
        let mut raster = imageops::flip_vertical(&GridStorage::decode_gray(&metadata.image)?);
        if metadata.negate {
            imageops::invert(&mut raster);
        }

        let centre = metadata.first_cell_centre();
        let origin = S::from_components(centre.x, centre.y, centre.theta);
        let frame = GridFrame::new(metadata.resolution, &origin)?;
        let mut grid = Self::from_storage(GridStorage::from_gray_image(&raster, frame)?);
        grid.set_thresholds(metadata.thresholds);
        Ok(grid)
    }

    /// Replaces the grid with a decoded image. On error the current grid is kept.
    pub fn load_from_image<P: AsRef<Path>>(
        &mut self,
        path: P,
        resolution: f64,
        origin: &S,
    ) -> Result<()> {
        let frame = GridFrame::new(resolution, origin)?;
        self.replace_storage(GridStorage::from_image(path, frame)?);
        Ok(())
    }

    /// Replaces the grid with a caller buffer. On error the current grid is kept.
    pub fn load_from_buffer<T: RawCell>(
        &mut self,
        data: &[T],
        width: usize,
        height: usize,
        resolution: f64,
        origin: &S,
    ) -> Result<()> {
        let frame = GridFrame::new(resolution, origin)?;
        self.replace_storage(GridStorage::from_buffer(data, width, height, frame)?);
        Ok(())
    }

    fn replace_storage(&mut self, storage: GridStorage) {
        self.storage = storage;
    }

    pub fn set_object_radius(&mut self, radius: f64, epsilon: f64) -> Result<()> {
        self.object_radius = ObjectRadius::new(radius, epsilon)?;
        Ok(())
    }

    /// Thresholds are validated on construction, see [`OccupancyThresholds::new`]
    pub fn set_thresholds(&mut self, thresholds: OccupancyThresholds) {
        self.thresholds = thresholds;
    }

    pub fn set_sampler_config(&mut self, config: SamplerConfig) {
        self.sampler_config = config;
    }

    /// Step used to walk segments, as a fraction of the resolution in `(0, 1]`
    pub fn set_segment_step_fraction(&mut self, fraction: f64) -> Result<()> {
        if !(fraction > 0f64 && fraction <= 1f64) {
            return Err(OccupancyError::Config(format!(
                "segment step fraction must be in (0, 1], got {}",
                fraction
            )));
        }
        self.segment_step_fraction = fraction;
        Ok(())
    }

    pub fn width(&self) -> usize {
        self.storage.width()
    }

    pub fn height(&self) -> usize {
        self.storage.height()
    }

    pub fn resolution(&self) -> f64 {
        self.storage.frame().resolution()
    }

    pub fn origin(&self) -> Pose2D {
        self.storage.frame().origin()
    }

    pub fn frame(&self) -> &GridFrame {
        self.storage.frame()
    }

    pub fn convention(&self) -> ValueConvention {
        self.storage.convention()
    }

    pub fn object_radius(&self) -> ObjectRadius {
        self.object_radius
    }

    pub fn thresholds(&self) -> OccupancyThresholds {
        self.thresholds
    }

    pub fn sampler_config(&self) -> SamplerConfig {
        self.sampler_config
    }

    pub(crate) fn segment_step_fraction(&self) -> f64 {
        self.segment_step_fraction
    }

    /// World bounding box of the grid's cell centres: (min, max)
    pub fn world_bounds(&self) -> (Point, Point) {
        self.storage.world_bounds()
    }

    /// Probability of a single cell, `None` when it is off the grid
    pub fn cell_probability(&self, col: i64, row: i64) -> Option<f64> {
        self.storage.cell_probability(col, row)
    }

    fn probability_at(&self, point: Point) -> f64 {
        self.storage
            .frame()
            .world_to_cell(point)
            .and_then(|(col, row)| self.storage.cell_probability(col, row))
            .unwrap_or(UNKNOWN_PROBABILITY)
    }

    /// Occupancy probability of the cell nearest to the state, 0.5 off the grid
    pub fn occupancy_probability(&self, state: &S) -> f64 {
        self.probability_at(state.position())
    }

    pub fn is_occupied(&self, state: &S) -> bool {
        self.occupancy_probability(state) > self.thresholds.occupied()
    }

    /// True when every cell the inflated footprint touches is free.
    ///
    /// A footprint reaching past the grid edge touches unknown cells and is
    /// therefore not free.
    pub fn is_free(&self, state: &S) -> bool {
        let frame = self.storage.frame();
        let centre = match frame.world_to_grid(state.position()) {
            Some(centre) => centre,
            None => return false,
        };
        let resolution = frame.resolution();
        let (left, right, bottom, top) = self.object_radius.cell_bounds(centre, resolution);
        if !(self.storage.contains(left, bottom) && self.storage.contains(right, top)) {
            return false;
        }

        let free = self.thresholds.free();
        (bottom..=top).all(|row| {
            (left..=right).all(|col| {
                !self.object_radius.touches_cell(centre, resolution, col, row)
                    || self
                        .storage
                        .cell_probability(col, row)
                        .map_or(false, |p| p < free)
            })
        })
    }

    /// Probability exactly 0.5: off the grid, the `-1` sentinel, or a stored 50%.
    pub fn is_unknown(&self, state: &S) -> bool {
        self.occupancy_probability(state) == UNKNOWN_PROBABILITY
    }
}

impl<S: State2D> Map<S> for OccupancyGrid2D<S> {
    fn get_occupancy(&self, state: &S) -> Option<bool> {
        if self.is_occupied(state) {
            Some(true)
        } else if self.is_free(state) {
            Some(false)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn bytes_grid() -> OccupancyGrid2D<Pose2D> {
        let data: Vec<u8> = vec![0, 255, 0, 127, 63, 191];
        OccupancyGrid2D::from_buffer(&data, 3, 2, 1f64, &Pose2D::identity()).unwrap()
    }

    #[test]
    fn test_out_of_bounds_is_unknown() {
        let grid = bytes_grid();
        for query in [
            Pose2D::new(-1f64, 0f64, 0f64),
            Pose2D::new(3f64, 0f64, 0f64),
            Pose2D::new(0f64, 2f64, 0f64),
            Pose2D::new(1000f64, -1000f64, 0f64),
            Pose2D::new(f64::NAN, 0f64, 0f64),
        ] {
            assert_eq!(grid.occupancy_probability(&query), 0.5f64);
            assert!(grid.is_unknown(&query));
            assert!(!grid.is_free(&query));
            assert!(!grid.is_occupied(&query));
            assert_eq!(grid.get_occupancy(&query), None);
        }
    }

    #[test]
    fn test_rounds_to_nearest_cell() {
        let grid = bytes_grid();
        assert_eq!(grid.occupancy_probability(&Pose2D::new(1.4f64, 0.3f64, 0f64)), 0f64);
        assert_eq!(grid.occupancy_probability(&Pose2D::new(1.6f64, -0.4f64, 0f64)), 1f64);
        // Past the last cell centre by less than half a cell is still on the grid
        assert_eq!(grid.occupancy_probability(&Pose2D::new(2.4f64, 0f64, 0f64)), 1f64);
        assert!(grid.is_unknown(&Pose2D::new(2.5f64, 0f64, 0f64)));
    }

    #[test]
    fn test_classification_thresholds() {
        let grid = bytes_grid();
        let free = Pose2D::new(1f64, 0f64, 0f64);
        let occupied = Pose2D::new(0f64, 0f64, 0f64);
        assert!(grid.is_free(&free));
        assert!(!grid.is_occupied(&free));
        assert!(grid.is_occupied(&occupied));
        assert!(!grid.is_free(&occupied));
        assert_eq!(grid.get_occupancy(&free), Some(false));
        assert_eq!(grid.get_occupancy(&occupied), Some(true));

        // 127 decodes just above one half: occupied, not unknown
        let near_half = Pose2D::new(0f64, 1f64, 0f64);
        assert!(grid.is_occupied(&near_half));
        assert!(!grid.is_unknown(&near_half));
    }

    #[test]
    fn test_custom_thresholds() {
        let mut grid = bytes_grid();
        grid.set_thresholds(OccupancyThresholds::new(0.8f64, 0.3f64).unwrap());
        // 63 decodes to about 0.75: neither occupied nor free any more
        let query = Pose2D::new(1f64, 1f64, 0f64);
        assert!(!grid.is_occupied(&query));
        assert!(!grid.is_free(&query));
        // 191 decodes to about 0.25
        assert!(grid.is_free(&Pose2D::new(2f64, 1f64, 0f64)));
    }

    #[test]
    fn test_inflation_sees_neighbouring_obstacle() {
        // A single obstacle in the middle of a free 5x5 grid
        let mut data = vec![255u8; 25];
        data[2 * 5 + 2] = 0;
        let mut grid: OccupancyGrid2D<Pose2D> =
            OccupancyGrid2D::from_buffer(&data, 5, 5, 1f64, &Pose2D::identity()).unwrap();
        let beside = Pose2D::new(1f64, 2f64, 0f64);
        assert!(grid.is_free(&beside));

        grid.set_object_radius(1f64, 0.01f64).unwrap();
        assert!(!grid.is_free(&beside));
        // The point query is unaffected by inflation
        assert_eq!(grid.occupancy_probability(&beside), 0f64);
        assert!(!grid.is_occupied(&beside));
        assert_eq!(grid.get_occupancy(&beside), None);
    }

    #[test]
    fn test_inflated_disk_off_the_edge_is_not_free() {
        let mut grid: OccupancyGrid2D<Pose2D> =
            OccupancyGrid2D::from_buffer(&vec![255u8; 25], 5, 5, 1f64, &Pose2D::identity())
                .unwrap();
        let edge = Pose2D::new(0f64, 2f64, 0f64);
        assert!(grid.is_free(&edge));
        grid.set_object_radius(0.9f64, 0.05f64).unwrap();
        assert!(!grid.is_free(&edge));
        assert!(grid.is_free(&Pose2D::new(2f64, 2f64, 0f64)));
    }

    #[test]
    fn test_disk_clipping_a_diagonal_obstacle_is_not_free() {
        let mut data = vec![0i8; 9];
        // Cell (1, 1), the middle of the grid
        data[4] = 100;
        let mut grid: OccupancyGrid2D<Pose2D> =
            OccupancyGrid2D::from_buffer(&data, 3, 3, 1f64, &Pose2D::new(-1f64, -1f64, 0f64))
                .unwrap();
        grid.set_object_radius(0.44f64, 0.01f64).unwrap();

        // Nearest cell is free, but the disk reaches 0.2 into the obstacle's corner
        let query = Pose2D::new(-0.7f64, -0.7f64, 0f64);
        assert_eq!(grid.occupancy_probability(&query), 0f64);
        assert!(!grid.is_free(&query));
        assert_eq!(grid.get_occupancy(&query), None);

        // 0.57 from the corner, only the free side cells are reached
        assert!(grid.is_free(&Pose2D::new(-0.9f64, -0.9f64, 0f64)));
    }

    #[test]
    fn test_footprint_follows_grid_rotation() {
        // Obstacle in cell (1, 0), which sits along world +y once rotated
        let data: Vec<i8> = vec![0, 100, 0, 0, 0, 0, 0, 0, 0];
        let mut grid: OccupancyGrid2D<Pose2D> = OccupancyGrid2D::from_buffer(
            &data,
            3,
            3,
            1f64,
            &Pose2D::new(0f64, 0f64, std::f64::consts::FRAC_PI_2),
        )
        .unwrap();
        grid.set_object_radius(0.3f64, 0.01f64).unwrap();
        // World (-1, 0.3) is grid (0.3, 1): reaches column 1 but stays half a
        // cell clear of row 0
        assert!(grid.is_free(&Pose2D::new(-1f64, 0.3f64, 0f64)));
        // World (-0.3, 0.3) is grid (0.3, 0.3): the edge of (1, 0) is 0.2 away
        assert!(!grid.is_free(&Pose2D::new(-0.3f64, 0.3f64, 0f64)));
    }

    #[test]
    fn test_huge_footprint_is_not_free() {
        let mut grid = bytes_grid();
        grid.set_object_radius(1e12f64, 0f64).unwrap();
        assert!(!grid.is_free(&Pose2D::new(1f64, 0f64, 0f64)));
    }

    #[test]
    fn test_free_and_occupied_never_overlap() {
        let mut grid = bytes_grid();
        for (occupied, free) in [(0.5f64, 0.5f64), (0.9, 0.1), (0.25, 0.25), (1.0, 0.0)] {
            grid.set_thresholds(OccupancyThresholds::new(occupied, free).unwrap());
            for col in -1..4 {
                for row in -1..3 {
                    let query = Pose2D::new(col as f64, row as f64, 0f64);
                    assert!(!(grid.is_free(&query) && grid.is_occupied(&query)));
                }
            }
        }
        // An inverted pair cannot be built in the first place
        assert!(OccupancyThresholds::new(0.2f64, 0.9f64).is_err());
    }

    #[test]
    fn test_failed_reload_keeps_previous_grid() {
        let mut grid = bytes_grid();
        let result = grid.load_from_buffer(&[0u8; 5], 3, 2, 0.5f64, &Pose2D::new(4f64, 4f64, 1f64));
        assert!(matches!(result, Err(OccupancyError::BufferSizeMismatch { .. })));
        let result = grid.load_from_buffer(&[0i8; 4], 2, 2, -1f64, &Pose2D::identity());
        assert!(matches!(result, Err(OccupancyError::InvalidResolution(_))));

        assert_eq!(grid.width(), 3);
        assert_eq!(grid.resolution(), 1f64);
        assert_eq!(grid.origin(), Pose2D::identity());
        assert_eq!(grid.convention(), ValueConvention::UnsignedByte);
        assert_eq!(grid.occupancy_probability(&Pose2D::new(1f64, 0f64, 0f64)), 0f64);
    }

    #[test]
    fn test_reload_replaces_everything() {
        let mut grid = bytes_grid();
        grid.load_from_buffer(&[42i8, -1], 1, 2, 2f64, &Pose2D::new(10f64, 0f64, 0f64))
            .unwrap();
        assert_eq!(grid.width(), 1);
        assert_eq!(grid.height(), 2);
        assert_eq!(grid.resolution(), 2f64);
        assert_eq!(grid.convention(), ValueConvention::SignedPercent);
        assert_eq!(grid.occupancy_probability(&Pose2D::new(10f64, 0f64, 0f64)), 0.42f64);
        assert_eq!(grid.occupancy_probability(&Pose2D::new(10f64, 2f64, 0f64)), 0.5f64);
        // The old grid's cells are gone
        assert!(grid.is_unknown(&Pose2D::new(1f64, 0f64, 0f64)));
    }

    #[test]
    fn test_radius_survives_reload() {
        let mut grid = bytes_grid();
        grid.set_object_radius(0.44f64, 0.01f64).unwrap();
        grid.load_from_buffer(&vec![0i8; 100], 10, 10, 0.1f64, &Pose2D::identity())
            .unwrap();
        assert_abs_diff_eq!(grid.object_radius().inflated(), 0.45f64, epsilon = 1e-12);
        // Disk of 0.45 around the middle fits inside the 1x1 world extent
        assert!(grid.is_free(&Pose2D::new(0.45f64, 0.45f64, 0f64)));
        assert!(!grid.is_free(&Pose2D::new(0.1f64, 0.45f64, 0f64)));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut grid = bytes_grid();
        assert!(grid.set_object_radius(-1f64, 0f64).is_err());
        assert!(grid.set_segment_step_fraction(0f64).is_err());
        assert!(grid.set_segment_step_fraction(1.5f64).is_err());
        assert!(grid.set_segment_step_fraction(1f64).is_ok());
    }

    #[test]
    fn test_grid_is_shareable_between_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<OccupancyGrid2D<Pose2D>>();
    }
}
