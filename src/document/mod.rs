//! # Header Document
//!
//! Dataset-level description of a measurement: subject, study, system,
//! experimental conditions and one or more encoding descriptions. It is stored
//! once per dataset as UTF-8 JSON whose keys follow the ISMRMRD header schema.
//!
//! ## Sections
//!
//! | key | required |
//! |---|---|
//! | `version` | no |
//! | `subjectInformation` | no |
//! | `studyInformation` | no |
//! | `measurementInformation` | no |
//! | `acquisitionSystemInformation` | yes |
//! | `experimentalConditions` | yes |
//! | `encoding` | yes, one or more |
//! | `sequenceParameters` | no |
//! | `userParameters` | no |
//!
//! Parsing checks presence and types; [`HeaderDocument::validate`] checks the
//! value rules (ordered limits, positive matrix sizes and fields of view, ...).
//!
//! ```rust
//! use mrdstore::document::*;
//!
//! let space = EncodingSpace::new(MatrixSize::new(256, 256, 1), FieldOfView::new(256.0, 256.0, 5.0));
//! let limits = EncodingLimits {
//!     kspace_encoding_step_1: Some(Limit::span(256)),
//!     ..Default::default()
//! };
//!
//! let doc = HeaderDocument::new(
//!     AcquisitionSystemInformation { receiver_channels: Some(4), ..Default::default() },
//!     ExperimentalConditions::new(128_000_000),
//!     Encoding::new(Trajectory::Cartesian, space, limits),
//! );
//! doc.validate()?;
//!
//! let json = doc.to_json()?;
//! assert_eq!(HeaderDocument::from_json(&json)?, doc);
//! # Ok::<(), DocumentError>(())
//! ```

mod encoding;
mod error;
mod validation;


use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

pub use encoding::{
    Encoding, EncodingLimits, EncodingSpace, FieldOfView, Limit, MatrixSize, Trajectory,
    MAX_USER_LIMITS,
};
pub use error::DocumentError;

/// Complete header document of a dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeaderDocument {
    /// Document schema version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i64>,

    /// Patient / subject
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subject_information: Option<SubjectInformation>,

    /// Study
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_information: Option<StudyInformation>,

    /// Measurement / series
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurement_information: Option<MeasurementInformation>,

    /// Scanner hardware
    pub acquisition_system_information: AcquisitionSystemInformation,

    /// Field strength
    pub experimental_conditions: ExperimentalConditions,

    /// Encoding descriptions, referenced by `encoding_space_ref` in the acquisition headers
    pub encoding: Vec<Encoding>,

    /// Sequence timing
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sequence_parameters: Option<SequenceParameters>,

    /// Free named parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_parameters: Option<UserParameters>,
}

impl HeaderDocument {
    /// Create a document with the required sections and a single encoding
    pub fn new(
        system: AcquisitionSystemInformation,
        conditions: ExperimentalConditions,
        encoding: Encoding,
    ) -> Self {
        Self {
            version: None,
            subject_information: None,
            study_information: None,
            measurement_information: None,
            acquisition_system_information: system,
            experimental_conditions: conditions,
            encoding: vec![encoding],
            sequence_parameters: None,
            user_parameters: None,
        }
    }

    /// Serialize to compact JSON
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Serialize to indented JSON
    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse JSON text
    ///
    /// Only structure is checked here; call [`validate`](Self::validate) for the value rules.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Encoding referenced by an acquisition's `encoding_space_ref`
    pub fn encoding_for(&self, encoding_space_ref: u32) -> Option<&Encoding> {
        self.encoding.get(encoding_space_ref as usize)
    }
}

/// Subject information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectInformation {
    /// Patient name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    /// Weight in kilograms
    #[serde(rename = "patientWeight_kg", default, skip_serializing_if = "Option::is_none")]
    pub patient_weight_kg: Option<f32>,
    /// Patient identifier
    #[serde(rename = "patientID", default, skip_serializing_if = "Option::is_none")]
    pub patient_id: Option<String>,
    /// "M", "F" or "O"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_gender: Option<String>,
}

/// Study information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyInformation {
    /// Study date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_date: Option<NaiveDate>,
    /// Study time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_time: Option<NaiveTime>,
    /// Study identifier
    #[serde(rename = "studyID", default, skip_serializing_if = "Option::is_none")]
    pub study_id: Option<String>,
    /// Free description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub study_description: Option<String>,
}

/// Measurement (series) information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeasurementInformation {
    /// Measurement identifier
    #[serde(rename = "measurementID", default, skip_serializing_if = "Option::is_none")]
    pub measurement_id: Option<String>,
    /// Series date
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_date: Option<NaiveDate>,
    /// Series time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_time: Option<NaiveTime>,
    /// Patient position code, e.g. "HFS"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient_position: Option<String>,
    /// Protocol name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol_name: Option<String>,
    /// Series description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub series_description: Option<String>,
}

/// Acquisition system information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcquisitionSystemInformation {
    /// Vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_vendor: Option<String>,
    /// Model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_model: Option<String>,
    /// Main field strength in tesla
    #[serde(rename = "systemFieldStrength_T", default, skip_serializing_if = "Option::is_none")]
    pub system_field_strength_t: Option<f32>,
    /// Number of receiver channels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver_channels: Option<u32>,
    /// Institution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution_name: Option<String>,
}

/// Experimental conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExperimentalConditions {
    /// Proton resonance frequency in Hz
    #[serde(rename = "H1resonanceFrequency_Hz")]
    pub h1_resonance_frequency_hz: i64,
}

impl ExperimentalConditions {
    /// Create experimental conditions for a proton frequency
    pub fn new(h1_resonance_frequency_hz: i64) -> Self {
        Self {
            h1_resonance_frequency_hz,
        }
    }
}

/// Sequence timing parameters (ms / degrees)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SequenceParameters {
    /// Repetition times
    #[serde(rename = "TR", default, skip_serializing_if = "Vec::is_empty")]
    pub tr: Vec<f32>,
    /// Echo times
    #[serde(rename = "TE", default, skip_serializing_if = "Vec::is_empty")]
    pub te: Vec<f32>,
    /// Inversion times
    #[serde(rename = "TI", default, skip_serializing_if = "Vec::is_empty")]
    pub ti: Vec<f32>,
    /// Flip angles
    #[serde(rename = "flipAngle_deg", default, skip_serializing_if = "Vec::is_empty")]
    pub flip_angle_deg: Vec<f32>,
}

/// A named user parameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserParameter<T> {
    /// Parameter name
    pub name: String,
    /// Parameter value
    pub value: T,
}

impl<T> UserParameter<T> {
    /// Create a named parameter
    pub fn new(name: impl Into<String>, value: T) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// Free named parameters
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserParameters {
    /// Integer parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_parameter_long: Vec<UserParameter<i64>>,
    /// Floating point parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_parameter_double: Vec<UserParameter<f64>>,
    /// String parameters
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub user_parameter_string: Vec<UserParameter<String>>,
}
