use chrono::Datelike;
use stockdash_core::{CorrelationMatrix, PriceMatrix};

use super::escape_html;

const WIDTH: f64 = 640.0;
const HEIGHT: f64 = 320.0;
const PADDING: f64 = 44.0;
const ROTATED_LABEL_PADDING: f64 = 90.0;
const GRID_TICKS: usize = 5;

/// Line colours, cycled per series.
const PALETTE: [&str; 10] = [
    "#636efa", "#ef553b", "#00cc96", "#ab63fa", "#ffa15a", "#19d3f3", "#ff6692", "#b6e880",
    "#ff97ff", "#fecb52",
];

/// Continuous colour scales used by the bar charts and the heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorScale {
    /// Red through yellow to green
    RdYlGn,
    /// Light to dark green
    Greens,
    /// Dark to light red
    RedsReversed,
    /// Blue through grey to red
    CoolWarm,
}

impl ColorScale {
    fn stops(self) -> &'static [(f64, f64, f64)] {
        match self {
            ColorScale::RdYlGn => &[
                (215.0, 48.0, 39.0),
                (252.0, 141.0, 89.0),
                (255.0, 255.0, 191.0),
                (145.0, 207.0, 96.0),
                (26.0, 152.0, 80.0),
            ],
            ColorScale::Greens => &[
                (199.0, 233.0, 192.0),
                (116.0, 196.0, 118.0),
                (35.0, 139.0, 69.0),
                (0.0, 68.0, 27.0),
            ],
            ColorScale::RedsReversed => &[
                (103.0, 0.0, 13.0),
                (203.0, 24.0, 29.0),
                (251.0, 106.0, 74.0),
                (252.0, 187.0, 161.0),
            ],
            ColorScale::CoolWarm => &[
                (59.0, 76.0, 192.0),
                (141.0, 176.0, 254.0),
                (221.0, 221.0, 221.0),
                (244.0, 154.0, 123.0),
                (180.0, 4.0, 38.0),
            ],
        }
    }

    /// Colour at position `t` in `[0, 1]`, as an `rgb(...)` string.
    pub fn color(self, t: f64) -> String {
        let stops = self.stops();
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.5 };
        let scaled = t * (stops.len() - 1) as f64;
        let idx = (scaled.floor() as usize).min(stops.len() - 2);
        let frac = scaled - idx as f64;

        let (r0, g0, b0) = stops[idx];
        let (r1, g1, b1) = stops[idx + 1];
        format!(
            "rgb({:.0},{:.0},{:.0})",
            r0 + (r1 - r0) * frac,
            g0 + (g1 - g0) * frac,
            b0 + (b1 - b0) * frac
        )
    }
}

/// How bars are filled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BarFill {
    /// Green for non-negative values, red for negative ones
    Sign,
    /// Colour by value along a continuous scale
    Scale(ColorScale),
}

pub struct BarChart<'a> {
    pub title: &'a str,
    pub labels: &'a [String],
    pub values: &'a [f64],
    pub fill: BarFill,
    pub y_label: &'a str,
    pub rotate_labels: bool,
    pub decimals: usize,
}

fn svg_header(width: f64, height: f64) -> String {
    format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {w:.0} {h:.0}" role="img"><style>text{{font-family:Arial,sans-serif;font-size:10px;fill:#555}}</style>"#,
        w = width,
        h = height
    )
}

fn svg_footer() -> &'static str {
    "</svg>"
}

fn wrap_plot(title: &str, svg_body: String) -> String {
    format!(
        r#"<figure class="chart"><figcaption>{title}</figcaption>{svg}</figure>"#,
        title = escape_html(title),
        svg = svg_body
    )
}

fn empty_plot(title: &str) -> String {
    wrap_plot(title, r#"<p class="empty">No data available.</p>"#.to_string())
}

/// Finite min/max of `values`, always including zero, never degenerate.
fn value_extent<'a, I>(values: I) -> Option<(f64, f64)>
where
    I: IntoIterator<Item = &'a f64>,
{
    let mut lo = f64::INFINITY;
    let mut hi = f64::NEG_INFINITY;
    for v in values.into_iter().filter(|v| v.is_finite()) {
        lo = lo.min(*v);
        hi = hi.max(*v);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return None;
    }

    lo = lo.min(0.0);
    hi = hi.max(0.0);
    if lo == hi {
        hi = lo + 1.0;
    }
    Some((lo, hi))
}

fn scale_value(value: f64, lo: f64, hi: f64, top: f64, bottom: f64) -> f64 {
    bottom - (value - lo) / (hi - lo) * (bottom - top)
}

fn draw_value_axis(
    svg: &mut String,
    lo: f64,
    hi: f64,
    top: f64,
    bottom: f64,
    width: f64,
    decimals: usize,
    y_label: &str,
) {
    for i in 0..=GRID_TICKS {
        let value = lo + (hi - lo) * i as f64 / GRID_TICKS as f64;
        let y = scale_value(value, lo, hi, top, bottom);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#e5e5e5" stroke-width="0.5" />"##,
            x1 = PADDING,
            x2 = width - PADDING / 2.0,
            y = y
        ));
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{value:.prec$}</text>"#,
            x = PADDING - 4.0,
            y = y + 3.0,
            value = value,
            prec = decimals
        ));
    }

    if lo < 0.0 && hi > 0.0 {
        let zero = scale_value(0.0, lo, hi, top, bottom);
        svg.push_str(&format!(
            r##"<line x1="{x1:.2}" y1="{y:.2}" x2="{x2:.2}" y2="{y:.2}" stroke="#888" stroke-width="1" />"##,
            x1 = PADDING,
            x2 = width - PADDING / 2.0,
            y = zero
        ));
    }

    if !y_label.is_empty() {
        let mid = (top + bottom) / 2.0;
        svg.push_str(&format!(
            r#"<text x="12" y="{mid:.2}" text-anchor="middle" transform="rotate(-90 12 {mid:.2})">{label}</text>"#,
            mid = mid,
            label = escape_html(y_label)
        ));
    }
}

/// Vertical bar chart with one bar per label.
pub fn bar_chart(chart: &BarChart<'_>) -> String {
    let Some((lo, hi)) = value_extent(chart.values) else {
        return empty_plot(chart.title);
    };
    let count = chart.values.len().min(chart.labels.len());

    let width = WIDTH;
    let bottom_pad = if chart.rotate_labels {
        ROTATED_LABEL_PADDING
    } else {
        PADDING
    };
    let height = HEIGHT + if chart.rotate_labels { bottom_pad - PADDING } else { 0.0 };
    let top = PADDING / 2.0;
    let bottom = height - bottom_pad;

    let mut svg = svg_header(width, height);
    draw_value_axis(&mut svg, lo, hi, top, bottom, width, chart.decimals, chart.y_label);

    let inner_width = width - PADDING - PADDING / 2.0;
    let slot = inner_width / count.max(1) as f64;
    let bar_width = slot * 0.7;

    let finite: Vec<f64> = chart.values.iter().copied().filter(|v| v.is_finite()).collect();
    let v_min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let v_max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let zero = scale_value(0.0, lo, hi, top, bottom);

    for i in 0..count {
        let value = chart.values[i];
        let x_center = PADDING + slot * (i as f64 + 0.5);

        if value.is_finite() {
            let y = scale_value(value, lo, hi, top, bottom);
            let (bar_top, bar_bottom) = if y < zero { (y, zero) } else { (zero, y) };
            let color = match chart.fill {
                BarFill::Sign => {
                    if value >= 0.0 {
                        "#4fa487".to_string()
                    } else {
                        "#af4b64".to_string()
                    }
                }
                BarFill::Scale(scale) => {
                    let t = if v_max > v_min {
                        (value - v_min) / (v_max - v_min)
                    } else {
                        0.5
                    };
                    scale.color(t)
                }
            };

            svg.push_str(&format!(
                r#"<rect x="{x:.2}" y="{y:.2}" width="{w:.2}" height="{h:.2}" fill="{color}"><title>{label}: {value:.prec$}</title></rect>"#,
                x = x_center - bar_width / 2.0,
                y = bar_top,
                w = bar_width,
                h = (bar_bottom - bar_top).max(0.5),
                color = color,
                label = escape_html(&chart.labels[i]),
                value = value,
                prec = chart.decimals
            ));
        }

        let label_y = bottom + 14.0;
        if chart.rotate_labels {
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end" transform="rotate(-45 {x:.2} {y:.2})">{label}</text>"#,
                x = x_center,
                y = label_y,
                label = escape_html(&chart.labels[i])
            ));
        } else {
            svg.push_str(&format!(
                r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
                x = x_center,
                y = label_y,
                label = escape_html(&chart.labels[i])
            ));
        }
    }

    svg.push_str(svg_footer());
    wrap_plot(chart.title, svg)
}

/// One line per matrix column, x positioned by row index. Gaps in a column
/// break its line.
pub fn line_chart(title: &str, matrix: &PriceMatrix, y_label: &str) -> String {
    if matrix.is_empty() {
        return empty_plot(title);
    }
    let Some((lo, hi)) = value_extent(matrix.values.iter().flatten().flatten()) else {
        return empty_plot(title);
    };

    let width = WIDTH;
    let height = HEIGHT;
    let top = PADDING / 2.0 + 14.0;
    let bottom = height - PADDING;
    let rows = matrix.dates.len();
    let inner_width = width - PADDING - PADDING / 2.0;
    let x_of = |i: usize| {
        if rows <= 1 {
            PADDING + inner_width / 2.0
        } else {
            PADDING + inner_width * i as f64 / (rows - 1) as f64
        }
    };

    let mut svg = svg_header(width, height);
    draw_value_axis(&mut svg, lo, hi, top, bottom, width, 2, y_label);

    // Month labels along the time axis, thinned to roughly a dozen
    let month_starts: Vec<usize> = (0..rows)
        .filter(|&i| {
            i == 0 || {
                let (a, b) = (matrix.dates[i - 1], matrix.dates[i]);
                (a.year(), a.month()) != (b.year(), b.month())
            }
        })
        .collect();
    let step = month_starts.len().div_ceil(12).max(1);
    for &i in month_starts.iter().step_by(step) {
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle">{label}</text>"#,
            x = x_of(i),
            y = bottom + 16.0,
            label = matrix.dates[i].format("%Y-%m")
        ));
    }

    for (col, ticker) in matrix.tickers.iter().enumerate() {
        let color = PALETTE[col % PALETTE.len()];
        let mut segment: Vec<String> = Vec::new();
        let mut segments: Vec<Vec<String>> = Vec::new();

        for (row, value) in matrix.column(col).into_iter().enumerate() {
            match value {
                Some(v) => segment.push(format!(
                    "{:.2},{:.2}",
                    x_of(row),
                    scale_value(v, lo, hi, top, bottom)
                )),
                None if !segment.is_empty() => segments.push(std::mem::take(&mut segment)),
                None => {}
            }
        }
        if !segment.is_empty() {
            segments.push(segment);
        }

        for points in segments {
            svg.push_str(&format!(
                r#"<polyline fill="none" stroke="{color}" stroke-width="1.5" points="{points}"><title>{ticker}</title></polyline>"#,
                color = color,
                points = points.join(" "),
                ticker = escape_html(ticker)
            ));
        }

        // Legend
        let lx = PADDING + 8.0 + (col as f64) * 96.0;
        svg.push_str(&format!(
            r#"<rect x="{x:.2}" y="{y:.2}" width="14" height="3" fill="{color}" /><text x="{tx:.2}" y="{ty:.2}">{ticker}</text>"#,
            x = lx,
            y = PADDING / 2.0 - 2.0,
            color = color,
            tx = lx + 18.0,
            ty = PADDING / 2.0 + 2.0,
            ticker = escape_html(ticker)
        ));
    }

    svg.push_str(svg_footer());
    wrap_plot(title, svg)
}

/// Annotated correlation heatmap on a cool-warm scale from -1 to 1.
pub fn heatmap(title: &str, matrix: &CorrelationMatrix) -> String {
    let n = matrix.tickers.len();
    if n == 0 {
        return empty_plot(title);
    }

    let cell = (560.0 / n as f64).clamp(14.0, 48.0);
    let left_pad = 90.0;
    let top_pad = 16.0;
    let bottom_pad = 90.0;
    let width = left_pad + cell * n as f64 + 16.0;
    let height = top_pad + cell * n as f64 + bottom_pad;
    let font_size = (cell * 0.28).clamp(5.0, 11.0);

    let mut svg = svg_header(width, height);

    for (row, row_ticker) in matrix.tickers.iter().enumerate() {
        let y = top_pad + row as f64 * cell;
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end">{label}</text>"#,
            x = left_pad - 4.0,
            y = y + cell / 2.0 + 3.0,
            label = escape_html(row_ticker)
        ));

        for col in 0..n {
            let x = left_pad + col as f64 * cell;
            match matrix.values[row][col] {
                Some(v) => {
                    let fill = ColorScale::CoolWarm.color((v + 1.0) / 2.0);
                    let text_color = if v.abs() > 0.6 { "#ffffff" } else { "#262626" };
                    svg.push_str(&format!(
                        r##"<rect x="{x:.2}" y="{y:.2}" width="{c:.2}" height="{c:.2}" fill="{fill}" stroke="#ffffff" stroke-width="0.5" />"##,
                        x = x,
                        y = y,
                        c = cell,
                        fill = fill
                    ));
                    svg.push_str(&format!(
                        r#"<text x="{x:.2}" y="{y:.2}" text-anchor="middle" font-size="{fs:.1}" style="fill:{color}">{v:.2}</text>"#,
                        x = x + cell / 2.0,
                        y = y + cell / 2.0 + font_size / 3.0,
                        fs = font_size,
                        color = text_color,
                        v = v
                    ));
                }
                None => {
                    svg.push_str(&format!(
                        r##"<rect x="{x:.2}" y="{y:.2}" width="{c:.2}" height="{c:.2}" fill="#f5f5f5" stroke="#ffffff" stroke-width="0.5" />"##,
                        x = x,
                        y = y,
                        c = cell
                    ));
                }
            }
        }
    }

    for (col, ticker) in matrix.tickers.iter().enumerate() {
        let x = left_pad + (col as f64 + 0.5) * cell;
        let y = top_pad + cell * n as f64 + 10.0;
        svg.push_str(&format!(
            r#"<text x="{x:.2}" y="{y:.2}" text-anchor="end" transform="rotate(-45 {x:.2} {y:.2})">{label}</text>"#,
            x = x,
            y = y,
            label = escape_html(ticker)
        ));
    }

    svg.push_str(svg_footer());
    wrap_plot(title, svg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use stockdash_core::matrix::correlation;

    #[test]
    fn test_color_scale_endpoints() {
        assert_eq!(ColorScale::RdYlGn.color(0.0), "rgb(215,48,39)");
        assert_eq!(ColorScale::RdYlGn.color(1.0), "rgb(26,152,80)");
        assert_eq!(ColorScale::RdYlGn.color(0.5), "rgb(255,255,191)");
        assert_eq!(ColorScale::CoolWarm.color(f64::NAN), "rgb(221,221,221)");
        assert_eq!(ColorScale::Greens.color(7.0), "rgb(0,68,27)");
    }

    #[test]
    fn test_bar_chart_escapes_labels_and_rotates() {
        let labels = vec!["Oil & Gas".to_string(), "IT".to_string()];
        let values = vec![12.5, -3.0];
        let svg = bar_chart(&BarChart {
            title: "Sector-wise Average Yearly Return",
            labels: &labels,
            values: &values,
            fill: BarFill::Scale(ColorScale::RdYlGn),
            y_label: "Avg Yearly Return (%)",
            rotate_labels: true,
            decimals: 2,
        });

        assert!(svg.contains("Oil &amp; Gas"));
        assert!(svg.contains("rotate(-45"));
        assert_eq!(svg.matches("<rect").count(), 2);
        assert!(svg.contains("rgb(26,152,80)"));
    }

    #[test]
    fn test_bar_chart_without_data() {
        let svg = bar_chart(&BarChart {
            title: "Empty",
            labels: &[],
            values: &[],
            fill: BarFill::Sign,
            y_label: "",
            rotate_labels: false,
            decimals: 2,
        });
        assert!(svg.contains("No data available."));
        assert!(!svg.contains("<svg"));
    }

    #[test]
    fn test_line_chart_breaks_on_gaps() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let matrix = PriceMatrix::pivot(vec![
            (day(1), "A".to_string(), 0.0),
            (day(2), "A".to_string(), 0.1),
            (day(4), "A".to_string(), 0.2),
            (day(5), "A".to_string(), 0.3),
            (day(3), "B".to_string(), 0.05),
        ]);

        let svg = line_chart("Cumulative Return", &matrix, "Cumulative return");
        // A has a gap on day 3: two segments; B is a single point
        assert_eq!(svg.matches("<polyline").count(), 3);
        assert!(svg.contains("2024-01"));
    }

    #[test]
    fn test_heatmap_annotations() {
        let day = |d: u32| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let matrix = PriceMatrix::pivot(vec![
            (day(1), "X".to_string(), 1.0),
            (day(2), "X".to_string(), 2.0),
            (day(3), "X".to_string(), 4.0),
            (day(1), "Y".to_string(), 3.0),
            (day(2), "Y".to_string(), 2.0),
            (day(3), "Y".to_string(), 0.0),
        ]);
        let svg = heatmap("Correlation", &correlation(&matrix));

        assert_eq!(svg.matches("<rect").count(), 4);
        assert!(svg.contains(">1.00<"));
        assert!(svg.contains(">-1.00<"));
    }
}
