pub mod enums;
pub mod value;

pub use enums::EnumRegistry;
pub use value::{EnumValue, Value};
