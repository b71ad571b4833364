//! Built-in tool implementations.

mod news;
mod vision;
mod weather;
mod web_search;

pub use news::{News, NewsConfig, MAX_HEADLINES};
pub use vision::{ImageSource, InMemoryImageSource, StoredImage, Vision, VisionConfig, NO_IMAGE};
pub use weather::{extract_location, Weather, DEFAULT_LOCATION};
pub use web_search::WebSearch;
