pub mod media;
pub mod reset;
pub mod section;
