//! Chain graph: one curve per display strike showing a measure across expiries.

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use cv_types::{Chain, ChainSide, ChartError};

use crate::draw::{
    Axis, AxisOrient, AxisTick, Curve, DrawList, DrawOp, Interpolation, Stroke, TextLabel,
};
use crate::filter::filter_chain;
use crate::group::{group_by_strike, StrikeGroup};
use crate::measure::{Measure, ScaleKind};
use crate::scale::{measure_scale, time_scale, ColorScale, Extents};

/// Approximate tick count per axis.
pub const AXIS_TICK_COUNT: usize = 10;

/// Result of rendering one chain.
#[derive(Debug, Clone)]
pub struct ChainGraph {
    pub draw_list: DrawList,
    /// The grouped series that were drawn.
    pub groups: Vec<StrikeGroup>,
    /// Scale fallbacks taken because nothing survived filtering.
    pub degenerate: Vec<ChartError>,
}

impl ChainGraph {
    pub fn is_degenerate(&self) -> bool {
        !self.degenerate.is_empty()
    }
}

/// Filter, group and scale one side of `chain` by `measure`, then lay out
/// axes, a curve per strike and an end-of-line label per strike.
///
/// Fails only on a malformed expiry date inside the near-the-money band. An
/// empty selection draws axes over a `[0, 1]` domain and no curves.
pub fn render_chain_graph(
    chain: &Chain,
    side: ChainSide,
    measure: &dyn Measure,
    as_of: DateTime<Utc>,
) -> Result<ChainGraph, ChartError> {
    let extents = Extents::chain_graph();
    let area = extents.data_area;

    let quotes = filter_chain(chain, side, measure, as_of)?;
    let groups = group_by_strike(quotes);

    let x = time_scale(&groups, area);
    let y = measure_scale(&groups, measure, chain.last_price, area);
    let color = ColorScale::new(groups.iter().map(|g| g.key.as_str()));

    let degenerate: Vec<ChartError> = x
        .degenerate()
        .into_iter()
        .chain(y.degenerate())
        .cloned()
        .collect();
    if !degenerate.is_empty() {
        warn!(
            "No {} quotes left to plot for {} (last price {})",
            side,
            measure.name(),
            chain.last_price
        );
    }

    let mut list = DrawList::new();
    list.push(DrawOp::Surface {
        width: extents.full.w,
        height: extents.full.h,
    });
    list.push(DrawOp::BeginGroup {
        translate: (extents.margin.left, extents.margin.top),
        class: "chart".to_string(),
    });

    list.push(DrawOp::Axis(Axis {
        orient: AxisOrient::Bottom,
        translate: (0.0, area.h),
        range: x.range(),
        ticks: x
            .labelled_ticks(AXIS_TICK_COUNT)
            .into_iter()
            .map(|(date, label)| AxisTick {
                position: x.apply(date),
                label,
            })
            .collect(),
        title: None,
    }));
    list.push(DrawOp::Axis(Axis {
        orient: AxisOrient::Left,
        translate: (0.0, 0.0),
        range: y.range(),
        ticks: y
            .labelled_ticks(AXIS_TICK_COUNT)
            .into_iter()
            .map(|(value, label)| AxisTick {
                position: y.apply(value),
                label: match measure.scale_kind() {
                    ScaleKind::Price => label,
                    ScaleKind::Percent => format!("{label}%"),
                },
            })
            .collect(),
        title: Some(measure.label().to_string()),
    }));

    for group in &groups {
        let points: Vec<(f64, f64)> = group
            .series
            .iter()
            .map(|q| (x.apply(q.expiry_date), y.apply(measure.extract(q, chain.last_price))))
            .collect();
        let Some(&(end_x, end_y)) = points.last() else {
            continue;
        };

        list.push(DrawOp::BeginGroup {
            translate: (0.0, 0.0),
            class: "strike".to_string(),
        });
        list.push(DrawOp::Curve(Curve {
            key: group.key.clone(),
            points,
            interpolation: Interpolation::Basis,
            stroke: Stroke::solid(color.color(&group.key), 1.5),
        }));
        list.push(DrawOp::Text(TextLabel {
            text: group.key.clone(),
            x: end_x,
            y: end_y,
            dx: 3.0,
            dy_em: 0.35,
            font: "10px sans-serif".to_string(),
        }));
        list.push(DrawOp::EndGroup);
    }

    list.push(DrawOp::EndGroup);

    info!(
        "Rendered {} chain graph: {} strikes, {} quotes, measure {}",
        side,
        groups.len(),
        groups.iter().map(StrikeGroup::len).sum::<usize>(),
        measure.name()
    );

    Ok(ChainGraph {
        draw_list: list,
        groups,
        degenerate,
    })
}
