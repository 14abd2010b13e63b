//! A library for extracting the playable media source from Moodle
//! `mod_videostream` activity pages.
//!
//! Given a `.../mod/videostream/view.php?id=N` url, the extractor downloads
//! the page, classifies how the video is embedded (direct MP4 file, HLS
//! playlist, DASH manifest or Vimeo player) and resolves it into
//! downloadable formats, or into a redirect when a third-party extractor
//! should take over.
//!
//! ```no_run
//! use videostream_parser::extractor::default_factory;
//! use videostream_parser::extractor::platform_extractor::PlatformExtractor;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let factory = default_factory();
//! let extractor = factory.create_extractor(
//!     "https://lms.example.edu/mod/videostream/view.php?id=42",
//!     None,
//!     None,
//! )?;
//! let result = extractor.extract().await?;
//! println!("{result:?}");
//! # Ok(())
//! # }
//! ```

pub mod extractor;
pub mod media;
