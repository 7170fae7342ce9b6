pub mod names;
pub mod status;
pub mod translate;
