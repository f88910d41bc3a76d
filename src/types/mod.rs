//! Value types for light control parameters.

mod field;
mod power;

pub use field::ControlField;
pub use power::{Power, PowerMode};
