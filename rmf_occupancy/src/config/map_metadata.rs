//! ROS `map_server` map descriptions.
//!
//! ```yaml
//! image: warehouse.png
//! resolution: 0.05
//! origin: [-20.0, 4.0, -1.1]
//! negate: 0
//! occupied_thresh: 0.65
//! free_thresh: 0.196
//! mode: trinary
//! ```
//!
//! `image` is resolved relative to the YAML file. `origin` is the pose of the
//! lower-left corner of the image. The thresholds are optional and default to
//! one half. `mode` may be `trinary` or `scale`, which read the same here since
//! queries work on the probability itself; `raw` is rejected.

use std::path::{Path, PathBuf};

use na::Rotation2;
use yaml_rust::{Yaml, YamlLoader};

use crate::config::thresholds::OccupancyThresholds;
use crate::error::{OccupancyError, Result};
use crate::state::pose_2d::Pose2D;
use crate::state::state::State2D;
use crate::Vec2f;

#[derive(Clone, Debug, PartialEq)]
pub struct MapMetadata {
    /// Grayscale map image
    pub image: PathBuf,
    /// World units per pixel
    pub resolution: f64,
    /// Pose of the image's lower-left corner
    pub origin: Pose2D,
    /// White is occupied instead of free
    pub negate: bool,
    pub thresholds: OccupancyThresholds,
}

fn as_number(value: &Yaml) -> Option<f64> {
    value.as_f64().or_else(|| value.as_i64().map(|v| v as f64))
}

fn required_number(doc: &Yaml, key: &str) -> Result<f64> {
    as_number(&doc[key])
        .ok_or_else(|| OccupancyError::MapMetadata(format!("missing or non-numeric `{}`", key)))
}

fn optional_number(doc: &Yaml, key: &str, default: f64) -> Result<f64> {
    match &doc[key] {
        Yaml::BadValue => Ok(default),
        value => as_number(value)
            .ok_or_else(|| OccupancyError::MapMetadata(format!("`{}` must be a number", key))),
    }
}

fn optional_flag(doc: &Yaml, key: &str) -> Result<bool> {
    match &doc[key] {
        Yaml::BadValue => Ok(false),
        Yaml::Boolean(flag) => Ok(*flag),
        Yaml::Integer(0) => Ok(false),
        Yaml::Integer(1) => Ok(true),
        _ => Err(OccupancyError::MapMetadata(format!("`{}` must be 0 or 1", key))),
    }
}

fn check_mode(doc: &Yaml) -> Result<()> {
    match &doc["mode"] {
        Yaml::BadValue => Ok(()),
        value => match value.as_str() {
            Some("trinary") | Some("scale") => Ok(()),
            _ => Err(OccupancyError::MapMetadata(format!(
                "unsupported `mode` {:?}, expected trinary or scale",
                value
            ))),
        },
    }
}

impl MapMetadata {
    /// Parses a description whose relative paths are taken from `base_dir`
    pub fn from_yaml_str(yaml_str: &str, base_dir: &Path) -> Result<Self> {
        let docs = YamlLoader::load_from_str(yaml_str)?;
        let doc = docs
            .first()
            .ok_or_else(|| OccupancyError::MapMetadata("empty document".to_string()))?;

        let image = doc["image"]
            .as_str()
            .ok_or_else(|| OccupancyError::MapMetadata("missing `image`".to_string()))?;

        let origin = doc["origin"]
            .as_vec()
            .filter(|v| v.len() == 3)
            .and_then(|v| Some(Pose2D::new(as_number(&v[0])?, as_number(&v[1])?, as_number(&v[2])?)))
            .ok_or_else(|| {
                OccupancyError::MapMetadata("`origin` must be [x, y, theta]".to_string())
            })?;

        check_mode(doc)?;

        let defaults = OccupancyThresholds::default();
        let thresholds = OccupancyThresholds::new(
            optional_number(doc, "occupied_thresh", defaults.occupied())?,
            optional_number(doc, "free_thresh", defaults.free())?,
        )?;

        Ok(Self {
            image: base_dir.join(image),
            resolution: required_number(doc, "resolution")?,
            origin,
            negate: optional_flag(doc, "negate")?,
            thresholds,
        })
    }

    /// Pose of the bottom-left pixel's centre, half a cell in from `origin`
    /// along both rotated axes.
    pub fn first_cell_centre(&self) -> Pose2D {
        let half_cell = Rotation2::new(self.origin.theta) * Vec2f::new(0.5f64, 0.5f64) * self.resolution;
        let centre = self.origin.position() + half_cell;
        Pose2D::new(centre.x, centre.y, self.origin.theta)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let yaml_str = std::fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Self::from_yaml_str(&yaml_str, base_dir)
    }
}
