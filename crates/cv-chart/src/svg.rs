//! Reference [`Surface`] that writes a draw list out as SVG markup.

use std::fmt::Write;

use crate::draw::{Axis, AxisOrient, Curve, DrawList, DrawOp, Interpolation, Stroke, Surface, Symbol, SymbolShape, Tooltip};

/// Length of axis tick marks in pixels.
const TICK_SIZE: f64 = 6.0;

/// Writes SVG 1.1 markup. Tooltips become `<title>` children of the root so
/// the viewer shows them while the pointer is over the surface.
#[derive(Debug, Default)]
pub struct SvgSurface {
    out: String,
    open_groups: usize,
    open_svg: bool,
}

impl SvgSurface {
    pub fn new() -> Self {
        Self::default()
    }

    fn op(&mut self, op: &DrawOp) {
        match op {
            DrawOp::Surface { width, height } => {
                self.close_all();
                let _ = write!(
                    self.out,
                    r#"<svg xmlns="http://www.w3.org/2000/svg" width="{}" height="{}">"#,
                    num(*width),
                    num(*height)
                );
                self.open_svg = true;
            }
            DrawOp::BeginGroup { translate, class } => {
                let _ = write!(
                    self.out,
                    r#"<g class="{}" transform="translate({},{})">"#,
                    escape(class),
                    num(translate.0),
                    num(translate.1)
                );
                self.open_groups += 1;
            }
            DrawOp::EndGroup => {
                if self.open_groups > 0 {
                    self.out.push_str("</g>");
                    self.open_groups -= 1;
                }
            }
            DrawOp::Segment(s) => {
                let _ = write!(
                    self.out,
                    r#"<line x1="{}" y1="{}" x2="{}" y2="{}"{}/>"#,
                    num(s.x1),
                    num(s.y1),
                    num(s.x2),
                    num(s.y2),
                    stroke_attrs(&s.stroke)
                );
            }
            DrawOp::Circle { cx, cy, r, color } => {
                let _ = write!(
                    self.out,
                    r#"<circle cx="{}" cy="{}" r="{}" fill="{}"/>"#,
                    num(*cx),
                    num(*cy),
                    num(*r),
                    escape(color)
                );
            }
            DrawOp::Symbol(symbol) => self.symbol(symbol),
            DrawOp::Axis(axis) => self.axis(axis),
            DrawOp::Curve(curve) => self.curve(curve),
            DrawOp::Text(t) => {
                let _ = write!(
                    self.out,
                    r#"<text transform="translate({},{})" x="{}" dy="{}em" style="font: {}">{}</text>"#,
                    num(t.x),
                    num(t.y),
                    num(t.dx),
                    num(t.dy_em),
                    escape(&t.font),
                    escape(&t.text)
                );
            }
            DrawOp::Tooltip(tip) => self.tooltip(tip),
        }
    }

    fn symbol(&mut self, symbol: &Symbol) {
        let d = match symbol.shape {
            SymbolShape::Triangle => triangle_path(symbol.area),
        };
        let color = escape(&symbol.color);
        let _ = write!(
            self.out,
            r#"<path d="{d}" fill="{color}" stroke="{color}" transform="translate({},{})"/>"#,
            num(symbol.x),
            num(symbol.y)
        );
    }

    fn axis(&mut self, axis: &Axis) {
        let class = match axis.orient {
            AxisOrient::Bottom => "axis axis--x",
            AxisOrient::Left => "axis axis--y",
        };
        let _ = write!(
            self.out,
            r#"<g class="{class}" transform="translate({},{})" font-size="10" font-family="sans-serif">"#,
            num(axis.translate.0),
            num(axis.translate.1)
        );
        let (r0, r1) = axis.range;
        let domain = match axis.orient {
            AxisOrient::Bottom => format!("M{},{}V0H{}V{}", num(r0), num(TICK_SIZE), num(r1), num(TICK_SIZE)),
            AxisOrient::Left => format!("M{},{}H0V{}H{}", num(-TICK_SIZE), num(r0), num(r1), num(-TICK_SIZE)),
        };
        let _ = write!(self.out, r#"<path class="domain" stroke="black" fill="none" d="{domain}"/>"#);

        for tick in &axis.ticks {
            let _ = match axis.orient {
                AxisOrient::Bottom => write!(
                    self.out,
                    r#"<g class="tick" transform="translate({},0)"><line stroke="black" y2="{}"/><text fill="black" y="{}" dy="0.71em" text-anchor="middle">{}</text></g>"#,
                    num(tick.position),
                    num(TICK_SIZE),
                    num(TICK_SIZE + 3.0),
                    escape(&tick.label)
                ),
                AxisOrient::Left => write!(
                    self.out,
                    r#"<g class="tick" transform="translate(0,{})"><line stroke="black" x2="{}"/><text fill="black" x="{}" dy="0.32em" text-anchor="end">{}</text></g>"#,
                    num(tick.position),
                    num(-TICK_SIZE),
                    num(-(TICK_SIZE + 3.0)),
                    escape(&tick.label)
                ),
            };
        }

        if let Some(title) = &axis.title {
            let _ = write!(
                self.out,
                r##"<text transform="rotate(-90)" y="6" dy="0.71em" fill="#000" text-anchor="end">{}</text>"##,
                escape(title)
            );
        }
        self.out.push_str("</g>");
    }

    fn curve(&mut self, curve: &Curve) {
        let d = match curve.interpolation {
            Interpolation::Linear => linear_path(&curve.points),
            Interpolation::Basis => basis_path(&curve.points),
        };
        let _ = write!(
            self.out,
            r#"<path class="line" fill="none" d="{d}"{}/>"#,
            stroke_attrs(&curve.stroke)
        );
    }

    fn tooltip(&mut self, tip: &Tooltip) {
        self.out.push_str("<title>");
        for (i, row) in tip.rows.iter().enumerate() {
            if i > 0 {
                self.out.push('\n');
            }
            let _ = write!(self.out, "{}: {}", escape(&row.label), escape(&row.value));
        }
        self.out.push_str("</title>");
    }

    fn close_all(&mut self) {
        while self.open_groups > 0 {
            self.out.push_str("</g>");
            self.open_groups -= 1;
        }
        if self.open_svg {
            self.out.push_str("</svg>");
            self.open_svg = false;
        }
    }
}

impl Surface for SvgSurface {
    type Output = String;

    fn replay(&mut self, list: &DrawList) -> String {
        self.out.clear();
        self.open_groups = 0;
        self.open_svg = false;
        for op in list {
            self.op(op);
        }
        self.close_all();
        std::mem::take(&mut self.out)
    }
}

/// Render a draw list to an SVG document string.
pub fn to_svg(list: &DrawList) -> String {
    SvgSurface::new().replay(list)
}

fn stroke_attrs(stroke: &Stroke) -> String {
    let mut attrs = format!(
        r#" stroke="{}" stroke-width="{}""#,
        escape(&stroke.color),
        num(stroke.width)
    );
    if let Some([on, off]) = stroke.dash {
        let _ = write!(attrs, r#" stroke-dasharray="{}, {}""#, num(on), num(off));
    }
    attrs
}

fn linear_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    for (i, (x, y)) in points.iter().enumerate() {
        let cmd = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{cmd}{},{}", num(*x), num(*y));
    }
    d
}

/// Uniform cubic B-spline through `points`, pinned at both ends. Two points
/// give a straight line.
pub fn basis_path(points: &[(f64, f64)]) -> String {
    let mut d = String::new();
    match points {
        [] => return d,
        [(x, y)] => {
            let _ = write!(d, "M{},{}", num(*x), num(*y));
            return d;
        }
        [(x0, y0), (x1, y1)] => {
            let _ = write!(d, "M{},{}L{},{}", num(*x0), num(*y0), num(*x1), num(*y1));
            return d;
        }
        _ => {}
    }

    let (mut x0, mut y0) = points[0];
    let (mut x1, mut y1) = points[1];
    let _ = write!(d, "M{},{}", num(x0), num(y0));
    let _ = write!(d, "L{},{}", num((5.0 * x0 + x1) / 6.0), num((5.0 * y0 + y1) / 6.0));

    for &(x, y) in &points[2..] {
        bezier_to(&mut d, (x0, y0), (x1, y1), (x, y));
        (x0, y0, x1, y1) = (x1, y1, x, y);
    }
    // Close onto the last point.
    bezier_to(&mut d, (x0, y0), (x1, y1), (x1, y1));
    let _ = write!(d, "L{},{}", num(x1), num(y1));
    d
}

fn bezier_to(d: &mut String, (x0, y0): (f64, f64), (x1, y1): (f64, f64), (x, y): (f64, f64)) {
    let _ = write!(
        d,
        "C{},{},{},{},{},{}",
        num((2.0 * x0 + x1) / 3.0),
        num((2.0 * y0 + y1) / 3.0),
        num((x0 + 2.0 * x1) / 3.0),
        num((y0 + 2.0 * y1) / 3.0),
        num((x0 + 4.0 * x1 + x) / 6.0),
        num((y0 + 4.0 * y1 + y) / 6.0)
    );
}

/// Upward triangle of the given area centred on the origin.
pub fn triangle_path(area: f64) -> String {
    let sqrt3 = 3f64.sqrt();
    let y = -(area / (sqrt3 * 3.0)).sqrt();
    format!(
        "M0,{}L{},{}L{},{}Z",
        num(y * 2.0),
        num(-sqrt3 * y),
        num(-y),
        num(sqrt3 * y),
        num(-y)
    )
}

/// Shortest representation with at most three decimals.
fn num(v: f64) -> String {
    if !v.is_finite() {
        return "0".to_string();
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
