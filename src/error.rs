/// Errors returned by both pricers. Deadline expiry is not one of them:
/// an interrupted simulation still returns a (less precise) price.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PricingError {
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("unknown option type {0:?}, expected \"call\" or \"put\"")]
    UnknownOptionType(String),

    #[error("numerical instability: {0}")]
    NumericalInstability(String),

    #[error("invalid simulation config {name}: {reason}")]
    InvalidConfig { name: &'static str, reason: String },
}

impl PricingError {
    /// Discriminant-only comparison, used when two pricers must agree on the
    /// kind of failure but not on its message.
    pub fn same_kind(&self, other: &PricingError) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

pub type Result<T> = std::result::Result<T, PricingError>;
