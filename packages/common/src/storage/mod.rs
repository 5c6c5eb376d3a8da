mod error;
mod media_ref;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use media_ref::{IMAGE_EXTENSIONS, MediaRef};
pub use traits::{BoxReader, MediaStore};
