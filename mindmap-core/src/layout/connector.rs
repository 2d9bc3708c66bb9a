// SVG path data for connectors.

use serde::{Deserialize, Serialize};

use crate::layout::{Connector, LayoutConfig};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectorStyle {
    #[default]
    Elbow,
    Curved,
    Straight,
}

impl ConnectorStyle {
    /// Parse a style name. Unknown names fall back to elbow.
    pub fn from_name(name: &str) -> ConnectorStyle {
        match name {
            "curved" => ConnectorStyle::Curved,
            "straight" => ConnectorStyle::Straight,
            _ => ConnectorStyle::Elbow,
        }
    }
}

pub fn connector_path(connector: &Connector, style: ConnectorStyle, cfg: &LayoutConfig) -> String {
    let (sx, sy) = (connector.source.x, connector.source.y);
    let (tx, ty) = (connector.target.x, connector.target.y);
    match style {
        ConnectorStyle::Straight => format!("M {},{} L {},{}", sx, sy, tx, ty),
        ConnectorStyle::Curved => {
            // both control points on the vertical through the midpoint
            let cx = sx + (tx - sx) * 0.5;
            format!("M {},{} C {},{} {},{} {},{}", sx, sy, cx, sy, cx, ty, tx, ty)
        }
        ConnectorStyle::Elbow => {
            let mid_x = sx + cfg.elbow_offset;
            format!("M {},{} L {},{} L {},{} L {},{}", sx, sy, mid_x, sy, mid_x, ty, tx, ty)
        }
    }
}
