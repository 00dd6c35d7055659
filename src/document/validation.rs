//! Value rules of the header document

use super::{DocumentError, EncodingSpace, HeaderDocument, Limit, MAX_USER_LIMITS};

impl HeaderDocument {
    /// Check every value rule, collecting all violations
    ///
    /// # Errors
    ///
    /// [`DocumentError::SchemaViolation`] listing each violated rule.
    pub fn validate(&self) -> Result<(), DocumentError> {
        let violations = self.violations();
        if violations.is_empty() {
            Ok(())
        } else {
            Err(DocumentError::SchemaViolation(violations))
        }
    }

    /// All violated value rules, empty if the document is valid
    pub fn violations(&self) -> Vec<String> {
        let mut out = Vec::new();

        if self.experimental_conditions.h1_resonance_frequency_hz <= 0 {
            out.push(format!(
                "experimentalConditions.H1resonanceFrequency_Hz must be positive, got {}",
                self.experimental_conditions.h1_resonance_frequency_hz
            ));
        }

        let system = &self.acquisition_system_information;
        if system.receiver_channels == Some(0) {
            out.push("acquisitionSystemInformation.receiverChannels must be at least 1".to_string());
        }
        if let Some(strength) = system.system_field_strength_t {
            check_finite("acquisitionSystemInformation.systemFieldStrength_T", strength, &mut out);
        }

        if let Some(weight) = self
            .subject_information
            .as_ref()
            .and_then(|s| s.patient_weight_kg)
        {
            check_finite("subjectInformation.patientWeight_kg", weight, &mut out);
        }

        if let Some(sequence) = &self.sequence_parameters {
            for (name, values) in [
                ("TR", &sequence.tr),
                ("TE", &sequence.te),
                ("TI", &sequence.ti),
                ("flipAngle_deg", &sequence.flip_angle_deg),
            ] {
                for (i, value) in values.iter().enumerate() {
                    check_finite(&format!("sequenceParameters.{}[{}]", name, i), *value, &mut out);
                }
            }
        }

        if let Some(user) = &self.user_parameters {
            for param in &user.user_parameter_double {
                check_finite(
                    &format!("userParameters.userParameterDouble '{}'", param.name),
                    param.value,
                    &mut out,
                );
            }
        }

        if self.encoding.is_empty() {
            out.push("encoding: at least one encoding is required".to_string());
        }

        for (i, encoding) in self.encoding.iter().enumerate() {
            check_space(&format!("encoding[{}].encodedSpace", i), &encoding.encoded_space, &mut out);
            check_space(&format!("encoding[{}].reconSpace", i), &encoding.recon_space, &mut out);

            let limits = &encoding.encoding_limits;
            if limits.user.len() > MAX_USER_LIMITS {
                out.push(format!(
                    "encoding[{}].encodingLimits.user: at most {} limits allowed, got {}",
                    i,
                    MAX_USER_LIMITS,
                    limits.user.len()
                ));
            }
            for (dim, limit) in limits.iter() {
                check_limit(&format!("encoding[{}].encodingLimits.{}", i, dim), limit, &mut out);
            }
        }

        out
    }
}

/// JSON has no representation for NaN or infinity
fn check_finite(path: &str, value: impl Into<f64>, out: &mut Vec<String>) {
    let value = value.into();
    if !value.is_finite() {
        out.push(format!("{} must be finite, got {}", path, value));
    }
}

fn check_space(path: &str, space: &EncodingSpace, out: &mut Vec<String>) {
    let m = &space.matrix_size;
    if m.x == 0 || m.y == 0 || m.z == 0 {
        out.push(format!(
            "{}.matrixSize must be at least 1 in every component, got ({}, {}, {})",
            path, m.x, m.y, m.z
        ));
    }

    let fov = &space.field_of_view_mm;
    if [fov.x, fov.y, fov.z]
        .iter()
        .any(|v| !v.is_finite() || *v <= 0.0)
    {
        out.push(format!(
            "{}.fieldOfView_mm must be finite and positive, got ({}, {}, {})",
            path, fov.x, fov.y, fov.z
        ));
    }
}

fn check_limit(path: &str, limit: &Limit, out: &mut Vec<String>) {
    if !limit.is_ordered() {
        out.push(format!(
            "{}: requires minimum <= center <= maximum, got ({}, {}, {})",
            path, limit.minimum, limit.center, limit.maximum
        ));
    }
}
