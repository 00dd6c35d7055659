use std::fmt;

use serde::{Deserialize, Serialize};

use crate::counters::{EncodingDimension, USER_COUNTERS};

/// Maximum number of user encoding limits
pub const MAX_USER_LIMITS: usize = USER_COUNTERS;

/// k-space sampling pattern of an encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trajectory {
    /// Rectilinear line-by-line sampling
    Cartesian,
    /// Echo-planar
    Epi,
    /// Radial spokes
    Radial,
    /// Radial spokes at golden-angle increments
    GoldenAngle,
    /// Spiral interleaves
    Spiral,
    /// Anything else, see `trajectoryDescription`
    Other,
}

impl Trajectory {
    /// Name as written in the document
    pub fn as_str(&self) -> &'static str {
        match self {
            Trajectory::Cartesian => "cartesian",
            Trajectory::Epi => "epi",
            Trajectory::Radial => "radial",
            Trajectory::GoldenAngle => "goldenangle",
            Trajectory::Spiral => "spiral",
            Trajectory::Other => "other",
        }
    }
}

impl fmt::Display for Trajectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Matrix size in samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatrixSize {
    /// Readout
    pub x: u32,
    /// Phase encode
    pub y: u32,
    /// Partition / slice encode
    pub z: u32,
}

impl MatrixSize {
    /// Create a matrix size
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Field of view in millimeters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldOfView {
    /// Readout
    pub x: f32,
    /// Phase encode
    pub y: f32,
    /// Partition / slice encode
    pub z: f32,
}

impl FieldOfView {
    /// Create a field of view
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Matrix and field of view of an encoded or reconstructed space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncodingSpace {
    /// Matrix size
    pub matrix_size: MatrixSize,
    /// Field of view
    #[serde(rename = "fieldOfView_mm")]
    pub field_of_view_mm: FieldOfView,
}

impl EncodingSpace {
    /// Create an encoding space
    pub fn new(matrix_size: MatrixSize, field_of_view_mm: FieldOfView) -> Self {
        Self {
            matrix_size,
            field_of_view_mm,
        }
    }
}

/// Declared bounds of one encoding counter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Limit {
    /// Smallest counter value
    pub minimum: u32,
    /// Counter value at the center of k-space
    pub center: u32,
    /// Largest counter value
    pub maximum: u32,
}

impl Limit {
    /// Create a limit
    pub fn new(minimum: u32, center: u32, maximum: u32) -> Self {
        Self {
            minimum,
            center,
            maximum,
        }
    }

    /// Limit spanning `0..count` with the center at `count / 2`
    pub fn span(count: u32) -> Self {
        Self::new(0, count / 2, count.saturating_sub(1))
    }

    /// `minimum <= center <= maximum`
    pub fn is_ordered(&self) -> bool {
        self.minimum <= self.center && self.center <= self.maximum
    }

    /// Whether `value` lies within `[minimum, maximum]`
    pub fn contains(&self, value: u32) -> bool {
        (self.minimum..=self.maximum).contains(&value)
    }
}

/// Declared bounds for the encoding counters
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct EncodingLimits {
    /// Readout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kspace_encoding_step_0: Option<Limit>,
    /// Phase encode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kspace_encoding_step_1: Option<Limit>,
    /// Partition encode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kspace_encoding_step_2: Option<Limit>,
    /// Averages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average: Option<Limit>,
    /// Slices
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slice: Option<Limit>,
    /// Contrasts / echoes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contrast: Option<Limit>,
    /// Cardiac or other phases
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phase: Option<Limit>,
    /// Repetitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repetition: Option<Limit>,
    /// Sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub set: Option<Limit>,
    /// Segments
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segment: Option<Limit>,
    /// Limits of the user counters, in slot order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user: Vec<Limit>,
}

impl EncodingLimits {
    /// Limit declared for a dimension
    pub fn get(&self, dimension: EncodingDimension) -> Option<&Limit> {
        match dimension {
            EncodingDimension::KspaceEncodeStep0 => self.kspace_encoding_step_0.as_ref(),
            EncodingDimension::KspaceEncodeStep1 => self.kspace_encoding_step_1.as_ref(),
            EncodingDimension::KspaceEncodeStep2 => self.kspace_encoding_step_2.as_ref(),
            EncodingDimension::Average => self.average.as_ref(),
            EncodingDimension::Slice => self.slice.as_ref(),
            EncodingDimension::Contrast => self.contrast.as_ref(),
            EncodingDimension::Phase => self.phase.as_ref(),
            EncodingDimension::Repetition => self.repetition.as_ref(),
            EncodingDimension::Set => self.set.as_ref(),
            EncodingDimension::Segment => self.segment.as_ref(),
            EncodingDimension::User(slot) => self.user.get(slot as usize),
        }
    }

    /// Declared limits with their dimension, named dimensions first
    pub fn iter(&self) -> impl Iterator<Item = (EncodingDimension, &Limit)> {
        EncodingDimension::all().filter_map(move |dim| self.get(dim).map(|limit| (dim, limit)))
    }
}

/// One encoding description
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Encoding {
    /// Space the data is acquired in
    pub encoded_space: EncodingSpace,
    /// Space the data is reconstructed to
    pub recon_space: EncodingSpace,
    /// Counter bounds
    #[serde(default)]
    pub encoding_limits: EncodingLimits,
    /// Sampling pattern
    pub trajectory: Trajectory,
    /// Free-form description, typically for [`Trajectory::Other`]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trajectory_description: Option<String>,
}

impl Encoding {
    /// Encoding whose encoded and recon spaces are identical
    pub fn new(trajectory: Trajectory, space: EncodingSpace, limits: EncodingLimits) -> Self {
        Self {
            encoded_space: space.clone(),
            recon_space: space,
            encoding_limits: limits,
            trajectory,
            trajectory_description: None,
        }
    }
}
