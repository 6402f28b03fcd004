//! Seams between the pipeline and the outside world.
//!
//! Applications (and tests) plug in model backends, page scrapers, object
//! storage and the catalog database through these traits.

pub mod model;
pub mod scraper;
pub mod storage;
