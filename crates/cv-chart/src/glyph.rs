//! Spark glyph of one held option's state against a price range.
//!
//! The price line is split at the strike: the solid part is where the holder
//! owns the underlying on expiry, the dashed part where they do not. A red
//! tick marks where the premium is recovered, a black dot the underlying
//! price at purchase, and a green triangle the current price.

use tracing::debug;

use cv_types::{OptionKind, OptionPosition, PlotRange};

use crate::draw::{
    DrawList, DrawOp, Segment, SegmentRole, Stroke, Symbol, SymbolShape, Tooltip, TooltipRow,
    DASH_3_3,
};
use crate::format::format_currency;
use crate::scale::{price_scale, Extents};

/// Area of the current-price triangle, in square pixels.
pub const CURRENT_PRICE_MARKER_AREA: f64 = 25.0;

/// Draw list for the option state glyph.
///
/// `plot_range.start <= plot_range.end` is expected but not checked; an
/// inverted range simply draws mirrored.
pub fn render_option_state(option: &OptionPosition, current_price: f64, plot_range: PlotRange) -> DrawList {
    let extents = Extents::option_glyph();
    let area = extents.data_area;
    let x = price_scale(plot_range, area);
    let mid = area.y + area.h / 2.0;

    let solid = Stroke::solid("black", 1.0);
    let (before_stroke, after_stroke) = match option.kind {
        OptionKind::Call => (solid.clone(), solid.dashed(DASH_3_3)),
        OptionKind::Put => (solid.clone().dashed(DASH_3_3), solid),
    };

    let mut list = DrawList::new();
    list.push(DrawOp::Surface {
        width: extents.full.w,
        height: extents.full.h,
    });
    list.push(DrawOp::Segment(Segment {
        role: SegmentRole::BeforeStrike,
        x1: x.apply(plot_range.start),
        y1: mid,
        x2: x.apply(option.strike_price),
        y2: mid,
        stroke: before_stroke,
    }));
    list.push(DrawOp::Segment(Segment {
        role: SegmentRole::AfterStrike,
        x1: x.apply(option.strike_price),
        y1: mid,
        x2: x.apply(plot_range.end),
        y2: mid,
        stroke: after_stroke,
    }));

    let premium_x = x.apply(option.premium_delta());
    list.push(DrawOp::Segment(Segment {
        role: SegmentRole::PremiumMarker,
        x1: premium_x,
        y1: mid - 3.0,
        x2: premium_x,
        y2: mid + 3.0,
        stroke: Stroke::solid("red", 2.0),
    }));

    list.push(DrawOp::Circle {
        cx: x.apply(option.purchase_underlying_price),
        cy: mid,
        r: 2.0,
        color: "black".to_string(),
    });

    list.push(DrawOp::Symbol(Symbol {
        shape: SymbolShape::Triangle,
        area: CURRENT_PRICE_MARKER_AREA,
        x: x.apply(current_price),
        y: mid + triangle_drop(CURRENT_PRICE_MARKER_AREA),
        color: "green".to_string(),
    }));

    list.push(DrawOp::Tooltip(option_tooltip(option, current_price)));

    debug!(
        "Rendered {} option glyph: strike {}, current {}, range {}..{}",
        option.kind, option.strike_price, current_price, plot_range.start, plot_range.end
    );
    list
}

/// Vertical offset that sits a triangle of `area` just below the price line.
fn triangle_drop(area: f64) -> f64 {
    (area / (3f64.sqrt() * 3.0)).sqrt() * 2.0
}

/// Hover content: current, strike, premium delta and purchase price.
pub fn option_tooltip(option: &OptionPosition, current_price: f64) -> Tooltip {
    let row = |label: &str, value: f64, color: Option<&str>| TooltipRow {
        label: label.to_string(),
        value: format_currency(value),
        color: color.map(str::to_string),
    };
    Tooltip {
        rows: vec![
            row("current", current_price, Some("green")),
            row("strike", option.strike_price, Some("grey")),
            row("premium delta", option.premium_delta(), Some("red")),
            row("historical", option.purchase_underlying_price, None),
        ],
    }
}
