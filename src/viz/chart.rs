use super::aggregate::{format_time_of_day, TimeOfDayStat, MINUTES_PER_DAY};
use super::VizError;
use plotters::coord::Shift;
use plotters::prelude::*;

pub const CHART_SIZE: (u32, u32) = (1280, 720);
pub const X_LABEL: &str = "Hour of the Day";
pub const Y_LABEL: &str = "Average Generated Rate (kg CO₂/MWh)";

/// One source's hour-of-day curve.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub label: String,
    pub stats: Vec<TimeOfDayStat>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub series: Vec<Series>,
}

impl Chart {
    pub fn render_svg(&self) -> Result<String, VizError> {
        render_svg(&self.series, &self.title)
    }
}

/// Renders every series on a shared 00:00-23:59 axis, each with a ±1 SD band
/// where its groups have more than one observation.
pub fn render_svg(series: &[Series], title: &str) -> Result<String, VizError> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, CHART_SIZE).into_drawing_area();
        draw_chart(&root, series, title).map_err(|e| VizError::Render(e.to_string()))?;
    }
    Ok(svg)
}

fn y_bounds(series: &[Series]) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for stat in series.iter().flat_map(|s| s.stats.iter()) {
        let (band_lo, band_hi) = stat.band();
        lo = lo.min(band_lo);
        hi = hi.max(band_hi);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}

/// Every third hour, plus the last minute of the day.
fn x_key_points() -> Vec<f64> {
    let mut points: Vec<f64> = (0..MINUTES_PER_DAY).step_by(180).map(f64::from).collect();
    points.push(f64::from(MINUTES_PER_DAY - 1));
    points
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    series: &[Series],
    title: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    root.fill(&WHITE)?;

    let (y_min, y_max) = y_bounds(series);
    let mut chart = ChartBuilder::on(root)
        .caption(title, ("sans-serif", 24))
        .margin(25)
        .set_label_area_size(LabelAreaPosition::Left, 70)
        .set_label_area_size(LabelAreaPosition::Bottom, 50)
        .build_cartesian_2d(
            (0.0..f64::from(MINUTES_PER_DAY - 1)).with_key_points(x_key_points()),
            y_min..y_max,
        )?;

    chart
        .configure_mesh()
        .x_desc(X_LABEL)
        .y_desc(Y_LABEL)
        .x_labels(x_key_points().len())
        .x_label_formatter(&|v| format_time_of_day(v.round() as u32))
        .y_label_formatter(&|v| format!("{:.0}", v))
        .draw()?;

    for (i, s) in series.iter().enumerate() {
        let color = Palette99::pick(i).to_rgba();

        if s.stats.iter().any(|stat| stat.std_dev.is_some()) {
            // Upper edge left to right, then lower edge back
            let mut outline: Vec<(f64, f64)> = s
                .stats
                .iter()
                .map(|stat| (stat.minute_of_day as f64, stat.band().1))
                .collect();
            outline.extend(
                s.stats
                    .iter()
                    .rev()
                    .map(|stat| (stat.minute_of_day as f64, stat.band().0)),
            );
            chart.draw_series(std::iter::once(Polygon::new(
                outline,
                color.mix(0.2).filled(),
            )))?;
        }

        chart
            .draw_series(LineSeries::new(
                s.stats
                    .iter()
                    .map(|stat| (stat.minute_of_day as f64, stat.mean)),
                color.stroke_width(2),
            ))?
            .label(s.label.as_str())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color.stroke_width(2)));
    }

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK.mix(0.3))
        .position(SeriesLabelPosition::UpperRight)
        .draw()?;

    root.present()?;
    Ok(())
}
