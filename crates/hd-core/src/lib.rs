//! # hd-core
//!
//! Data model for HEPData submissions: values, uncertainties, variables and the
//! records they serialise to, plus the significant-digit rounding engine.
//!
//! ## Example
//!
//! ```
//! use hd_core::{Uncertainty, Variable};
//!
//! let mut x = Variable::new("pT").with_units("GeV").with_values([(0.0, 10.0), (10.0, 20.0)])?;
//! x.scale_values(1e-3)?;
//!
//! let mut y = Variable::new("Events").independent(false).binned(false).with_values([12, 7])?;
//! y.add_uncertainty(Uncertainty::new("stat").with_values([3.46, 2.65])?)?;
//!
//! let yaml = serde_yaml_ng::to_string(&y.make_record())?;
//! assert!(yaml.contains("symerror: 3.46"));
//! # Ok::<(), hd_core::Error>(())
//! ```

#![warn(clippy::all)]

pub mod error;
pub mod readout;
pub mod record;
pub mod rounding;
pub mod uncertainty;
pub mod value;
pub mod variable;

pub use error::{Error, Result};
pub use readout::{Readout, Series};
pub use record::{AsymError, ErrorRecord, Header, Qualifier, TableRecord, ValueRecord, VariableRecord};
pub use rounding::{
    NumberPrecision, RelativeRound, number_precision, relative_round,
    round_value_and_uncertainty, round_value_and_uncertainty_to_decimals,
    round_value_to_decimals, round_to_decimals, value_precision_wrt_reference,
};
pub use uncertainty::Uncertainty;
pub use value::{Entry, Scalar};
pub use variable::Variable;

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
