pub use crate::models::*;
