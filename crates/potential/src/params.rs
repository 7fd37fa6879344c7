//! Parameters shared by the derivative and dipole kernels.

use mk_core::SedmVariant;

/// Parameters controlling kernel evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelParams {
    /// Formulation used for the squared distances. Default: `Dot`, which
    /// works from the exact coordinate offsets and keeps full precision far
    /// from the origin, where the `Vectorized` expansion cancels.
    pub variant: SedmVariant,
    /// Reject observation/source pairs at zero distance, or whose squared
    /// distance evaluated to 0, instead of letting them produce inf/NaN.
    /// Default: false.
    pub strict: bool,
}

impl Default for KernelParams {
    fn default() -> Self {
        Self {
            variant: SedmVariant::Dot,
            strict: false,
        }
    }
}

impl KernelParams {
    pub fn strict() -> Self {
        Self {
            strict: true,
            ..Default::default()
        }
    }

    pub fn with_variant(variant: SedmVariant) -> Self {
        Self {
            variant,
            ..Default::default()
        }
    }
}
