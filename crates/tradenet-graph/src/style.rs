//! Visual attributes derived from trade values.
//!
//! The graph only carries numbers: sizes, widths and an intensity in
//! `[0, 1]` per edge. Turning intensities into colors is left to
//! whoever draws the graph; `ColorScale` is provided for convenience.

use serde::{Deserialize, Serialize};

/// Role of a node in the trade star.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeRole {
    /// The country whose trade is being analyzed.
    Reporter,
    /// One of its ranked partners.
    Partner,
}

impl std::fmt::Display for NodeRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Reporter => "reporter",
            Self::Partner => "partner",
        };
        write!(f, "{}", s)
    }
}

/// Node and edge styling for the trade graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GraphStyle {
    pub reporter_color: String,
    pub reporter_size: u32,
    pub partner_color: String,
    pub partner_size: u32,
    /// Width of the heaviest edge.
    pub max_edge_width: f64,
    /// Width of every edge when all weights are zero.
    pub fallback_edge_width: f64,
    /// Scale used when exporting edge colors.
    pub color_scale: ColorScale,
}

impl Default for GraphStyle {
    fn default() -> Self {
        Self {
            reporter_color: "#E74C3C".to_string(),
            reporter_size: 800,
            partner_color: "#3498DB".to_string(),
            partner_size: 600,
            max_edge_width: 5.0,
            fallback_edge_width: 1.0,
            color_scale: ColorScale::Viridis,
        }
    }
}

impl GraphStyle {
    /// Color and size for a node role.
    pub fn node_attributes(&self, role: NodeRole) -> (&str, u32) {
        match role {
            NodeRole::Reporter => (self.reporter_color.as_str(), self.reporter_size),
            NodeRole::Partner => (self.partner_color.as_str(), self.partner_size),
        }
    }

    /// Edge width for `weight` given the heaviest weight `max`.
    pub fn edge_width(&self, weight: f64, max: f64) -> f64 {
        edge_width(weight, max, self.max_edge_width, self.fallback_edge_width)
    }
}

/// Scales `weight / max` to `max_width`.
///
/// When `max` is zero or not finite every edge gets `fallback` instead.
pub fn edge_width(weight: f64, max: f64, max_width: f64, fallback: f64) -> f64 {
    if max > 0.0 && max.is_finite() {
        (weight / max).max(0.0).min(1.0) * max_width
    } else {
        fallback
    }
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// `#rrggbb` notation.
    pub fn to_hex(self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.0, self.1, self.2)
    }

    fn lerp(self, other: Rgb, t: f64) -> Rgb {
        let mix = |a: u8, b: u8| (a as f64 + (b as f64 - a as f64) * t).round() as u8;
        Rgb(mix(self.0, other.0), mix(self.1, other.1), mix(self.2, other.2))
    }
}

const VIRIDIS: [Rgb; 5] = [
    Rgb(68, 1, 84),
    Rgb(59, 82, 139),
    Rgb(33, 145, 140),
    Rgb(94, 201, 98),
    Rgb(253, 231, 37),
];

const COOLWARM: [Rgb; 3] = [Rgb(59, 76, 192), Rgb(221, 221, 221), Rgb(180, 4, 38)];

/// Continuous color scales for edge intensities.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColorScale {
    #[default]
    Viridis,
    Coolwarm,
}

impl ColorScale {
    /// Maps `t` (clamped to `[0, 1]`) onto the scale.
    pub fn color(self, t: f64) -> Rgb {
        let anchors: &[Rgb] = match self {
            Self::Viridis => &VIRIDIS,
            Self::Coolwarm => &COOLWARM,
        };

        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let scaled = t * (anchors.len() - 1) as f64;
        let lower = (scaled.floor() as usize).min(anchors.len() - 2);
        anchors[lower].lerp(anchors[lower + 1], scaled - lower as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edge_width_scales_to_max() {
        assert_eq!(edge_width(120000.0, 120000.0, 5.0, 1.0), 5.0);
        let w = edge_width(50000.0, 120000.0, 5.0, 1.0);
        assert!((w - 2.0833333).abs() < 1e-6);
    }

    #[test]
    fn test_edge_width_zero_max_falls_back() {
        assert_eq!(edge_width(0.0, 0.0, 5.0, 1.0), 1.0);
    }

    #[test]
    fn test_edge_width_stays_in_range() {
        assert_eq!(edge_width(f64::INFINITY, f64::INFINITY, 5.0, 1.0), 1.0);
        assert_eq!(edge_width(f64::NAN, 10.0, 5.0, 1.0), 0.0);
        assert_eq!(edge_width(f64::INFINITY, 10.0, 5.0, 1.0), 5.0);
    }

    #[test]
    fn test_node_attributes() {
        let style = GraphStyle::default();

        assert_eq!(style.node_attributes(NodeRole::Reporter), ("#E74C3C", 800));
        assert_eq!(style.node_attributes(NodeRole::Partner), ("#3498DB", 600));
    }

    #[test]
    fn test_color_scale_endpoints() {
        assert_eq!(ColorScale::Viridis.color(0.0).to_hex(), "#440154");
        assert_eq!(ColorScale::Viridis.color(1.0).to_hex(), "#fde725");
        assert_eq!(ColorScale::Coolwarm.color(0.5), Rgb(221, 221, 221));
        assert_eq!(ColorScale::Viridis.color(f64::NAN), ColorScale::Viridis.color(0.0));
    }

    #[test]
    fn test_style_deserializes_with_defaults() {
        let style: GraphStyle = serde_json::from_str(r#"{"partnerSize": 400}"#).unwrap();

        assert_eq!(style.partner_size, 400);
        assert_eq!(style.reporter_size, 800);
    }
}
