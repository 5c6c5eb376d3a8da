pub mod section;
pub mod shared;
