//! TradeNet Geo - map markers and trade links
//!
//! Places the reporter and its ranked partners on a map using the static
//! coordinate registry and connects them with lines weighted by trade
//! value. The output is a plain list of descriptors; drawing it is up to
//! the caller.

mod composer;
mod format;

pub use composer::{
    GeoComposer, GeoError, GeoLink, GeoPoint, GeoView, MapMarker, MapStyle, MarkerRole,
};
pub use format::format_thousands;
