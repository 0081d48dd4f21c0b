//! Service layer
//!
//! Request-independent logic behind the HTTP handlers: the GeoIP reader,
//! the protected image directory and the session store.

#[cfg(feature = "geo")]
pub mod geoip;
#[cfg(feature = "image")]
pub mod image_store;
#[cfg(feature = "image")]
pub mod session;

#[cfg(feature = "geo")]
pub use geoip::{GeoLookup, GeoMatch, GeoRecord, MaxMindProvider, SharedGeoLookup};
#[cfg(feature = "image")]
pub use image_store::{ImageFile, ImageKind, ImageRejection, ImageStore};
#[cfg(feature = "image")]
pub use session::{AuthContext, SessionStore, SharedSessionStore, TokenSessionStore};
