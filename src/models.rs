/// Architecture configuration shared by the FCN8s variants
pub mod config;
/// The FCN8s network
pub mod fcn8s;
/// Portrait segmentation networks built on FCN8s
pub mod portrait_fcn;
/// FCN8s returning intermediate activations
pub mod probe;

pub use config::*;
pub use fcn8s::*;
pub use portrait_fcn::*;
pub use probe::*;
