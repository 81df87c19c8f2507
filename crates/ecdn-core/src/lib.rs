pub mod config;
pub mod content_type;
pub mod error;
pub mod types;

pub use content_type::{resolve_content_type, ContentType};
pub use error::{EcdnError, EcdnResult};
pub use types::FileInfo;
