mod builder;
mod matcher;

pub use builder::URL_REGEX;
pub use builder::VideoStream;
pub use matcher::{MatchError, StreamKind, StreamMatch, match_stream};
