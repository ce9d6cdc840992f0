//! Composition of map markers and trade links.
//!
//! Countries are looked up independently: a reporter or partner missing
//! from the registry is left off the map and nothing else changes.

use crate::format::format_thousands;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use tradenet_core::{CoordinateRegistry, CountryCoordinate, PartnerRanking};

/// Errors raised while composing a map view.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Longitude offset {0} is outside [-180, 180]")]
    InvalidOffset(f64),
}

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl From<&CountryCoordinate> for GeoPoint {
    fn from(c: &CountryCoordinate) -> Self {
        Self {
            lat: c.lat,
            lon: c.lon,
        }
    }
}

/// Marker and line styling for the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MapStyle {
    pub reporter_color: String,
    pub reporter_radius: u32,
    pub partner_color: String,
    pub partner_radius: u32,
    /// Line weight of the heaviest link.
    pub max_line_weight: f64,
    pub zoom: u8,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            reporter_color: "red".to_string(),
            reporter_radius: 10,
            partner_color: "blue".to_string(),
            partner_radius: 8,
            max_line_weight: 5.0,
            zoom: 3,
        }
    }
}

/// Whose marker this is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerRole {
    Reporter,
    Partner,
}

/// A circle marker on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    pub name: String,
    pub role: MarkerRole,
    pub position: GeoPoint,
    pub radius: u32,
    pub color: String,
    pub tooltip: String,
    pub popup: String,
    /// Summed trade value; absent for the reporter.
    pub trade_value: Option<f64>,
}

/// A line from the reporter to one partner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoLink {
    pub partner: String,
    pub from: GeoPoint,
    pub to: GeoPoint,
    pub trade_value: f64,
    /// Value relative to the largest partner, in `[0, 1]`.
    pub normalized_weight: f64,
    /// Line weight, `normalized_weight * max_line_weight`.
    pub render_weight: f64,
    /// `round(normalized_weight * 255)`.
    pub color_intensity: u8,
    /// `rgb(intensity, 0, 255 - intensity)`.
    pub color: String,
    pub popup: String,
}

/// Everything needed to draw the trade map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoView {
    pub center: GeoPoint,
    pub zoom: u8,
    pub markers: Vec<MapMarker>,
    pub links: Vec<GeoLink>,
}

/// Builds map descriptors from a ranking.
#[derive(Debug, Clone, Default)]
pub struct GeoComposer {
    style: MapStyle,
}

impl GeoComposer {
    pub fn new(style: MapStyle) -> Self {
        Self { style }
    }

    /// Composes markers and links for `reporter`.
    ///
    /// The map centers on the reporter (or `(0, 0)` when it has no
    /// coordinate); `lon_offset` replaces the center longitude and must
    /// lie in `[-180, 180]`.
    pub fn compose(
        &self,
        reporter: &str,
        ranking: &PartnerRanking,
        registry: &CoordinateRegistry,
        lon_offset: Option<f64>,
    ) -> Result<GeoView, GeoError> {
        let origin = registry.get(reporter).map(GeoPoint::from);
        let center = center(origin.unwrap_or_default(), lon_offset)?;

        let mut markers = Vec::with_capacity(ranking.len() + 1);
        let mut links = Vec::with_capacity(ranking.len());

        if let Some(point) = origin {
            markers.push(MapMarker {
                name: reporter.to_string(),
                role: MarkerRole::Reporter,
                position: point,
                radius: self.style.reporter_radius,
                color: self.style.reporter_color.clone(),
                tooltip: reporter.to_string(),
                popup: coordinate_popup(reporter, point),
                trade_value: None,
            });
        }

        for entry in ranking.iter() {
            if entry.partner == reporter {
                continue;
            }
            let Some(point) = registry.get(&entry.partner).map(GeoPoint::from) else {
                debug!("No coordinate for {}, leaving it off the map", entry.partner);
                continue;
            };

            let value_text = format!("Trade Value: {} (1000 USD)", format_thousands(entry.total_value));

            markers.push(MapMarker {
                name: entry.partner.clone(),
                role: MarkerRole::Partner,
                position: point,
                radius: self.style.partner_radius,
                color: self.style.partner_color.clone(),
                tooltip: entry.partner.clone(),
                popup: format!("{}\n{}", coordinate_popup(&entry.partner, point), value_text),
                trade_value: Some(entry.total_value),
            });

            if let Some(from) = origin {
                let normalized = ranking.normalized(entry.total_value);
                let intensity = (normalized * 255.0).round() as u8;
                links.push(GeoLink {
                    partner: entry.partner.clone(),
                    from,
                    to: point,
                    trade_value: entry.total_value,
                    normalized_weight: normalized,
                    render_weight: normalized * self.style.max_line_weight,
                    color_intensity: intensity,
                    color: format!("rgb({},0,{})", intensity, 255 - intensity),
                    popup: value_text,
                });
            }
        }

        debug!(
            "Composed map for {}: {} markers, {} links",
            reporter,
            markers.len(),
            links.len()
        );

        Ok(GeoView {
            center,
            zoom: self.style.zoom,
            markers,
            links,
        })
    }
}

fn center(origin: GeoPoint, lon_offset: Option<f64>) -> Result<GeoPoint, GeoError> {
    let lon = match lon_offset {
        None => origin.lon,
        Some(offset) if offset.is_finite() && (-180.0..=180.0).contains(&offset) => offset,
        Some(offset) => return Err(GeoError::InvalidOffset(offset)),
    };
    Ok(GeoPoint {
        lat: origin.lat,
        lon,
    })
}

fn coordinate_popup(name: &str, point: GeoPoint) -> String {
    format!(
        "{}\nLatitude: {:.4}\nLongitude: {:.4}",
        name, point.lat, point.lon
    )
}
