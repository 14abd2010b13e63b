pub mod formats;
pub mod media_info;

pub use formats::{FormatInfo, determine_ext};
pub use media_info::{ExtractionResult, MediaInfo, RedirectInfo};
