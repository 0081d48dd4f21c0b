#[cfg(feature = "geo")]
pub mod frontend;
#[cfg(feature = "geo")]
pub mod geo;
#[cfg(feature = "image")]
pub mod image;

#[cfg(feature = "geo")]
pub use frontend::{FrontendService, frontend_routes};
#[cfg(feature = "geo")]
pub use geo::{GeoService, GeoSettings, geo_routes};
#[cfg(feature = "image")]
pub use image::{ImageService, image_routes};
