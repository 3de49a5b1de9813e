pub mod boolean;
pub mod creation;
pub mod lid;
pub mod query;
pub mod shaping;
