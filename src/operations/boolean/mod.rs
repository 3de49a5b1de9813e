mod assemble;
mod bsp;
mod engine;
mod select;
mod solid_boolean;

pub use select::BooleanOp;
pub use solid_boolean::Boolean;
