//! # Acquisition Flags
//!
//! Every acquisition carries a 64-bit status word. Each named flag owns exactly
//! one bit position; the positions form a closed enumeration that never changes
//! between format versions, so a raw word written by one version is read back
//! with the same meaning by every other.
//!
//! The bit pattern is identical to ISMRMRD's (whose flag numbers are 1-based):
//! [`AcquisitionFlag::FirstInEncodeStep1`] occupies bit 0.
//!
//! ```rust
//! use mrdstore::flags::{AcquisitionFlag, FlagSet};
//!
//! let flags = FlagSet::new()
//!     .with(AcquisitionFlag::FirstInSlice)
//!     .with(AcquisitionFlag::FirstInRepetition);
//!
//! assert!(flags.test(AcquisitionFlag::FirstInSlice));
//! assert!(!flags.test(AcquisitionFlag::LastInSlice));
//! assert_eq!(FlagSet::from_raw(flags.raw()), flags);
//! ```

use std::fmt;
use std::ops::{BitOr, BitOrAssign};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A named acquisition status bit.
///
/// The discriminant is the bit index inside [`FlagSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum AcquisitionFlag {
    /// First readout along encode step 1
    FirstInEncodeStep1 = 0,
    /// Last readout along encode step 1
    LastInEncodeStep1 = 1,
    /// First readout along encode step 2
    FirstInEncodeStep2 = 2,
    /// Last readout along encode step 2
    LastInEncodeStep2 = 3,
    /// First readout in an average
    FirstInAverage = 4,
    /// Last readout in an average
    LastInAverage = 5,
    /// First readout in a slice
    FirstInSlice = 6,
    /// Last readout in a slice
    LastInSlice = 7,
    /// First readout in a contrast
    FirstInContrast = 8,
    /// Last readout in a contrast
    LastInContrast = 9,
    /// First readout in a cardiac/respiratory phase
    FirstInPhase = 10,
    /// Last readout in a cardiac/respiratory phase
    LastInPhase = 11,
    /// First readout in a repetition
    FirstInRepetition = 12,
    /// Last readout in a repetition
    LastInRepetition = 13,
    /// First readout in a set
    FirstInSet = 14,
    /// Last readout in a set
    LastInSet = 15,
    /// First readout in a segment
    FirstInSegment = 16,
    /// Last readout in a segment
    LastInSegment = 17,
    /// Noise calibration readout
    IsNoiseMeasurement = 18,
    /// Parallel imaging calibration readout
    IsParallelCalibration = 19,
    /// Readout used for both calibration and imaging
    IsParallelCalibrationAndImaging = 20,
    /// Readout acquired in reverse direction
    IsReverse = 21,
    /// Navigator readout
    IsNavigationData = 22,
    /// Phase correction readout
    IsPhasecorrData = 23,
    /// Last readout of the measurement
    LastInMeasurement = 24,
    /// Hyperpolarization feedback data
    IsHpfeedbackData = 25,
    /// Dummy scan readout
    IsDummyscanData = 26,
    /// Real-time feedback data
    IsRtfeedbackData = 27,
    /// Surface coil correction scan
    IsSurfacecoilcorrectionscanData = 28,
    /// Phase stabilization reference readout
    IsPhaseStabilizationReference = 29,
    /// Phase stabilization readout
    IsPhaseStabilization = 30,
    /// Vendor compression marker 1
    Compression1 = 52,
    /// Vendor compression marker 2
    Compression2 = 53,
    /// Vendor compression marker 3
    Compression3 = 54,
    /// Vendor compression marker 4
    Compression4 = 55,
    /// User-defined flag 1
    User1 = 56,
    /// User-defined flag 2
    User2 = 57,
    /// User-defined flag 3
    User3 = 58,
    /// User-defined flag 4
    User4 = 59,
    /// User-defined flag 5
    User5 = 60,
    /// User-defined flag 6
    User6 = 61,
    /// User-defined flag 7
    User7 = 62,
    /// User-defined flag 8
    User8 = 63,
}

impl AcquisitionFlag {
    /// Every named flag, in bit order
    pub const ALL: [AcquisitionFlag; 43] = [
        AcquisitionFlag::FirstInEncodeStep1,
        AcquisitionFlag::LastInEncodeStep1,
        AcquisitionFlag::FirstInEncodeStep2,
        AcquisitionFlag::LastInEncodeStep2,
        AcquisitionFlag::FirstInAverage,
        AcquisitionFlag::LastInAverage,
        AcquisitionFlag::FirstInSlice,
        AcquisitionFlag::LastInSlice,
        AcquisitionFlag::FirstInContrast,
        AcquisitionFlag::LastInContrast,
        AcquisitionFlag::FirstInPhase,
        AcquisitionFlag::LastInPhase,
        AcquisitionFlag::FirstInRepetition,
        AcquisitionFlag::LastInRepetition,
        AcquisitionFlag::FirstInSet,
        AcquisitionFlag::LastInSet,
        AcquisitionFlag::FirstInSegment,
        AcquisitionFlag::LastInSegment,
        AcquisitionFlag::IsNoiseMeasurement,
        AcquisitionFlag::IsParallelCalibration,
        AcquisitionFlag::IsParallelCalibrationAndImaging,
        AcquisitionFlag::IsReverse,
        AcquisitionFlag::IsNavigationData,
        AcquisitionFlag::IsPhasecorrData,
        AcquisitionFlag::LastInMeasurement,
        AcquisitionFlag::IsHpfeedbackData,
        AcquisitionFlag::IsDummyscanData,
        AcquisitionFlag::IsRtfeedbackData,
        AcquisitionFlag::IsSurfacecoilcorrectionscanData,
        AcquisitionFlag::IsPhaseStabilizationReference,
        AcquisitionFlag::IsPhaseStabilization,
        AcquisitionFlag::Compression1,
        AcquisitionFlag::Compression2,
        AcquisitionFlag::Compression3,
        AcquisitionFlag::Compression4,
        AcquisitionFlag::User1,
        AcquisitionFlag::User2,
        AcquisitionFlag::User3,
        AcquisitionFlag::User4,
        AcquisitionFlag::User5,
        AcquisitionFlag::User6,
        AcquisitionFlag::User7,
        AcquisitionFlag::User8,
    ];

    /// Bit index of this flag inside the 64-bit status word
    #[inline]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Single-bit mask for this flag
    #[inline]
    pub const fn mask(self) -> u64 {
        1u64 << (self as u32)
    }

    /// Look up the flag stored at a bit index, if that index is named
    pub fn from_index(index: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|flag| flag.index() == index)
    }

    /// Canonical upper-case name, e.g. `FIRST_IN_SLICE`
    pub const fn name(self) -> &'static str {
        match self {
            AcquisitionFlag::FirstInEncodeStep1 => "FIRST_IN_ENCODE_STEP1",
            AcquisitionFlag::LastInEncodeStep1 => "LAST_IN_ENCODE_STEP1",
            AcquisitionFlag::FirstInEncodeStep2 => "FIRST_IN_ENCODE_STEP2",
            AcquisitionFlag::LastInEncodeStep2 => "LAST_IN_ENCODE_STEP2",
            AcquisitionFlag::FirstInAverage => "FIRST_IN_AVERAGE",
            AcquisitionFlag::LastInAverage => "LAST_IN_AVERAGE",
            AcquisitionFlag::FirstInSlice => "FIRST_IN_SLICE",
            AcquisitionFlag::LastInSlice => "LAST_IN_SLICE",
            AcquisitionFlag::FirstInContrast => "FIRST_IN_CONTRAST",
            AcquisitionFlag::LastInContrast => "LAST_IN_CONTRAST",
            AcquisitionFlag::FirstInPhase => "FIRST_IN_PHASE",
            AcquisitionFlag::LastInPhase => "LAST_IN_PHASE",
            AcquisitionFlag::FirstInRepetition => "FIRST_IN_REPETITION",
            AcquisitionFlag::LastInRepetition => "LAST_IN_REPETITION",
            AcquisitionFlag::FirstInSet => "FIRST_IN_SET",
            AcquisitionFlag::LastInSet => "LAST_IN_SET",
            AcquisitionFlag::FirstInSegment => "FIRST_IN_SEGMENT",
            AcquisitionFlag::LastInSegment => "LAST_IN_SEGMENT",
            AcquisitionFlag::IsNoiseMeasurement => "IS_NOISE_MEASUREMENT",
            AcquisitionFlag::IsParallelCalibration => "IS_PARALLEL_CALIBRATION",
            AcquisitionFlag::IsParallelCalibrationAndImaging => {
                "IS_PARALLEL_CALIBRATION_AND_IMAGING"
            }
            AcquisitionFlag::IsReverse => "IS_REVERSE",
            AcquisitionFlag::IsNavigationData => "IS_NAVIGATION_DATA",
            AcquisitionFlag::IsPhasecorrData => "IS_PHASECORR_DATA",
            AcquisitionFlag::LastInMeasurement => "LAST_IN_MEASUREMENT",
            AcquisitionFlag::IsHpfeedbackData => "IS_HPFEEDBACK_DATA",
            AcquisitionFlag::IsDummyscanData => "IS_DUMMYSCAN_DATA",
            AcquisitionFlag::IsRtfeedbackData => "IS_RTFEEDBACK_DATA",
            AcquisitionFlag::IsSurfacecoilcorrectionscanData => {
                "IS_SURFACECOILCORRECTIONSCAN_DATA"
            }
            AcquisitionFlag::IsPhaseStabilizationReference => "IS_PHASE_STABILIZATION_REFERENCE",
            AcquisitionFlag::IsPhaseStabilization => "IS_PHASE_STABILIZATION",
            AcquisitionFlag::Compression1 => "COMPRESSION1",
            AcquisitionFlag::Compression2 => "COMPRESSION2",
            AcquisitionFlag::Compression3 => "COMPRESSION3",
            AcquisitionFlag::Compression4 => "COMPRESSION4",
            AcquisitionFlag::User1 => "USER1",
            AcquisitionFlag::User2 => "USER2",
            AcquisitionFlag::User3 => "USER3",
            AcquisitionFlag::User4 => "USER4",
            AcquisitionFlag::User5 => "USER5",
            AcquisitionFlag::User6 => "USER6",
            AcquisitionFlag::User7 => "USER7",
            AcquisitionFlag::User8 => "USER8",
        }
    }
}

impl fmt::Display for AcquisitionFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Error returned when a flag name is not recognized
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown acquisition flag: {0}")]
pub struct UnknownFlag(pub String);

impl FromStr for AcquisitionFlag {
    type Err = UnknownFlag;

    /// Accepts canonical names, case-insensitively, with or without an `ACQ_` prefix
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let name = upper.strip_prefix("ACQ_").unwrap_or(&upper);
        Self::ALL
            .iter()
            .copied()
            .find(|flag| flag.name() == name)
            .ok_or_else(|| UnknownFlag(s.to_string()))
    }
}

/// Typed 64-bit status word of an acquisition
///
/// Any bit pattern is legal; bits without a named flag survive round-trips untouched.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FlagSet(u64);

impl FlagSet {
    /// Empty flag set
    pub const fn new() -> Self {
        Self(0)
    }

    /// Reinterpret a raw status word
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// Raw status word, for serialization
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// Return a copy with `flag` set
    pub const fn with(self, flag: AcquisitionFlag) -> Self {
        Self(self.0 | flag.mask())
    }

    /// Set `flag`
    pub fn set(&mut self, flag: AcquisitionFlag) {
        self.0 |= flag.mask();
    }

    /// Clear `flag`
    pub fn clear(&mut self, flag: AcquisitionFlag) {
        self.0 &= !flag.mask();
    }

    /// Test whether `flag` is set
    pub const fn test(self, flag: AcquisitionFlag) -> bool {
        (self.0 >> flag.index()) & 1 == 1
    }

    /// True if no bit is set
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Clear every bit
    pub fn clear_all(&mut self) {
        self.0 = 0;
    }

    /// Iterate over the named flags that are set, in bit order
    pub fn iter(self) -> impl Iterator<Item = AcquisitionFlag> {
        AcquisitionFlag::ALL
            .into_iter()
            .filter(move |flag| self.test(*flag))
    }

    /// Bits that are set but have no named flag
    pub fn unnamed_bits(self) -> u64 {
        let named = AcquisitionFlag::ALL
            .iter()
            .fold(0u64, |acc, flag| acc | flag.mask());
        self.0 & !named
    }
}

impl fmt::Debug for FlagSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut set = f.debug_set();
        for flag in self.iter() {
            set.entry(&format_args!("{}", flag.name()));
        }
        let unnamed = self.unnamed_bits();
        if unnamed != 0 {
            set.entry(&format_args!("{:#x}", unnamed));
        }
        set.finish()
    }
}

impl From<AcquisitionFlag> for FlagSet {
    fn from(flag: AcquisitionFlag) -> Self {
        Self(flag.mask())
    }
}

impl FromIterator<AcquisitionFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = AcquisitionFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::new(), FlagSet::with)
    }
}

impl BitOr for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: FlagSet) -> FlagSet {
        FlagSet(self.0 | rhs.0)
    }
}

impl BitOr<AcquisitionFlag> for FlagSet {
    type Output = FlagSet;

    fn bitor(self, rhs: AcquisitionFlag) -> FlagSet {
        self.with(rhs)
    }
}

impl BitOr for AcquisitionFlag {
    type Output = FlagSet;

    fn bitor(self, rhs: AcquisitionFlag) -> FlagSet {
        FlagSet::from(self).with(rhs)
    }
}

impl BitOrAssign<AcquisitionFlag> for FlagSet {
    fn bitor_assign(&mut self, rhs: AcquisitionFlag) {
        self.set(rhs);
    }
}
