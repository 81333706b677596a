//! Draw operations emitted by the renderers.
//!
//! Renderers never touch a drawing surface directly. They return a
//! [`DrawList`] whose order is the paint order; a [`Surface`] replays it.

use serde::{Deserialize, Serialize};

/// Dash pattern used for "not owned on expiry" price segments.
pub const DASH_3_3: [f64; 2] = [3.0, 3.0];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: String,
    pub width: f64,
    pub dash: Option<[f64; 2]>,
}

impl Stroke {
    pub fn solid(color: &str, width: f64) -> Self {
        Self {
            color: color.to_string(),
            width,
            dash: None,
        }
    }

    pub fn dashed(mut self, pattern: [f64; 2]) -> Self {
        self.dash = Some(pattern);
        self
    }
}

/// What a straight segment represents in the option glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SegmentRole {
    /// Price line from the plot start up to the strike.
    BeforeStrike,
    /// Price line from the strike to the plot end.
    AfterStrike,
    /// Short vertical tick where the premium is recovered.
    PremiumMarker,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub role: SegmentRole,
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
    pub stroke: Stroke,
}

impl Segment {
    pub fn is_dashed(&self) -> bool {
        self.stroke.dash.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymbolShape {
    Triangle,
}

/// A filled marker symbol of the given area centred on `(x, y)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Symbol {
    pub shape: SymbolShape,
    pub area: f64,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AxisOrient {
    Bottom,
    Left,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisTick {
    /// Pixel offset along the axis.
    pub position: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Axis {
    pub orient: AxisOrient,
    /// Offset of the axis line within the enclosing group.
    pub translate: (f64, f64),
    /// Pixel extent of the axis line.
    pub range: (f64, f64),
    pub ticks: Vec<AxisTick>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Interpolation {
    Linear,
    /// Cubic B-spline through the points (endpoints interpolated).
    Basis,
}

/// A series line, one per strike group.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    pub key: String,
    pub points: Vec<(f64, f64)>,
    pub interpolation: Interpolation,
    pub stroke: Stroke,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextLabel {
    pub text: String,
    /// Anchor point.
    pub x: f64,
    pub y: f64,
    /// Horizontal nudge in pixels from the anchor.
    pub dx: f64,
    /// Vertical nudge in em units.
    pub dy_em: f64,
    pub font: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TooltipRow {
    pub label: String,
    pub value: String,
    pub color: Option<String>,
}

/// Hover overlay content. Shown on pointer over, follows the pointer,
/// hidden on pointer out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tooltip {
    pub rows: Vec<TooltipRow>,
}

impl Tooltip {
    pub fn value(&self, label: &str) -> Option<&str> {
        self.rows
            .iter()
            .find(|r| r.label == label)
            .map(|r| r.value.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DrawOp {
    Surface { width: f64, height: f64 },
    BeginGroup { translate: (f64, f64), class: String },
    EndGroup,
    Segment(Segment),
    Circle { cx: f64, cy: f64, r: f64, color: String },
    Symbol(Symbol),
    Axis(Axis),
    Curve(Curve),
    Text(TextLabel),
    Tooltip(Tooltip),
}

/// Ordered draw operations for one render.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DrawList {
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, op: DrawOp) {
        self.ops.push(op);
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawOp> {
        self.ops.iter()
    }

    pub fn len(&self) -> usize {
        self.ops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    pub fn segments(&self) -> impl Iterator<Item = &Segment> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Segment(s) => Some(s),
            _ => None,
        })
    }

    /// The first segment with the given role.
    pub fn segment(&self, role: SegmentRole) -> Option<&Segment> {
        self.segments().find(|s| s.role == role)
    }

    pub fn curves(&self) -> impl Iterator<Item = &Curve> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Curve(c) => Some(c),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &TextLabel> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Text(t) => Some(t),
            _ => None,
        })
    }

    pub fn axes(&self) -> impl Iterator<Item = &Axis> {
        self.ops.iter().filter_map(|op| match op {
            DrawOp::Axis(a) => Some(a),
            _ => None,
        })
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.ops.iter().find_map(|op| match op {
            DrawOp::Tooltip(t) => Some(t),
            _ => None,
        })
    }
}

impl<'a> IntoIterator for &'a DrawList {
    type Item = &'a DrawOp;
    type IntoIter = std::slice::Iter<'a, DrawOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.iter()
    }
}

/// A drawing backend that paints a [`DrawList`] in order.
pub trait Surface {
    type Output;

    fn replay(&mut self, list: &DrawList) -> Self::Output;
}
