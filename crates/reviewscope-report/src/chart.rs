//! Two-panel SVG chart: rating distribution beside sentiment distribution.

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use reviewscope_core::{InsightReport, SentimentLabel};

const PANEL_WIDTH: u32 = 640;
const WIDTH: u32 = PANEL_WIDTH * 2;
const HEIGHT: u32 = 320;
const MARGIN_LEFT: u32 = 90;
const MARGIN_RIGHT: u32 = 60;
const TOP: u32 = 60;
const ROW_HEIGHT: u32 = 46;
const BAR_HEIGHT: u32 = 30;

const RATING_FILL: &str = "#4c72b0";
const SENTIMENT_FILL: &str = "#dd8452";

const SENTIMENT_ROWS: [SentimentLabel; 4] = [
    SentimentLabel::Positive,
    SentimentLabel::Neutral,
    SentimentLabel::Negative,
    SentimentLabel::Unknown,
];

type Attrs<'a> = [(&'a str, String)];

/// Render the report chart.
///
/// The left panel has one horizontal bar per star rating, 5 stars at the
/// top. The right panel has one bar per sentiment label. Every bucket is
/// drawn even when its count is zero; an empty run also gets a
/// "No reviews" note.
#[must_use]
pub fn render_report_chart(report: &InsightReport) -> String {
    let mut svg = Svg::new();
    svg.open(
        "svg",
        &[
            ("xmlns", "http://www.w3.org/2000/svg".to_owned()),
            ("width", WIDTH.to_string()),
            ("height", HEIGHT.to_string()),
            ("viewBox", format!("0 0 {WIDTH} {HEIGHT}")),
            ("font-family", "sans-serif".to_owned()),
        ],
    );
    svg.empty(
        "rect",
        &[
            ("width", WIDTH.to_string()),
            ("height", HEIGHT.to_string()),
            ("fill", "#ffffff".to_owned()),
        ],
    );

    let ratings: Vec<(String, u64)> = {
        let buckets: Vec<(u8, u64)> = report.rating_distribution.iter().collect();
        buckets
            .into_iter()
            .rev()
            .map(|(rating, count)| (format!("{rating} star"), count))
            .collect()
    };
    bar_panel(
        &mut svg,
        0,
        &format!("Rating Distribution for {}", report.app_info.title),
        &ratings,
        RATING_FILL,
    );

    let sentiments: Vec<(String, u64)> = SENTIMENT_ROWS
        .iter()
        .map(|label| {
            let count = report
                .sentiment_distribution
                .get(label)
                .copied()
                .unwrap_or(0);
            (label.as_str().to_owned(), count)
        })
        .collect();
    bar_panel(
        &mut svg,
        PANEL_WIDTH,
        "Sentiment Distribution",
        &sentiments,
        SENTIMENT_FILL,
    );

    if report.no_data {
        svg.text(
            &[
                ("x", (WIDTH / 2).to_string()),
                ("y", (HEIGHT - 12).to_string()),
                ("font-size", "14".to_owned()),
                ("text-anchor", "middle".to_owned()),
                ("fill", "#888888".to_owned()),
            ],
            "No reviews",
        );
    }

    svg.close("svg");
    svg.finish()
}

/// One titled panel of labeled horizontal bars, scaled to the largest count.
fn bar_panel(svg: &mut Svg, x_offset: u32, title: &str, rows: &[(String, u64)], fill: &str) {
    let plot_width = PANEL_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
    let max = rows.iter().map(|(_, c)| *c).max().unwrap_or(0);

    svg.text(
        &[
            ("x", (x_offset + PANEL_WIDTH / 2).to_string()),
            ("y", "32".to_owned()),
            ("font-size", "18".to_owned()),
            ("text-anchor", "middle".to_owned()),
        ],
        title,
    );

    let mut y = TOP;
    for (label, count) in rows {
        let bar = bar_width(*count, max, plot_width);
        let bar_x = x_offset + MARGIN_LEFT;
        let label_y = (y + BAR_HEIGHT / 2 + 5).to_string();
        svg.text(
            &[
                ("x", (bar_x - 10).to_string()),
                ("y", label_y.clone()),
                ("font-size", "14".to_owned()),
                ("text-anchor", "end".to_owned()),
            ],
            label,
        );
        svg.empty(
            "rect",
            &[
                ("x", bar_x.to_string()),
                ("y", y.to_string()),
                ("width", bar.to_string()),
                ("height", BAR_HEIGHT.to_string()),
                ("fill", fill.to_owned()),
            ],
        );
        svg.text(
            &[
                ("x", (bar_x + bar + 6).to_string()),
                ("y", label_y),
                ("font-size", "13".to_owned()),
            ],
            &count.to_string(),
        );
        y += ROW_HEIGHT;
    }
}

fn bar_width(count: u64, max: u64, plot_width: u32) -> u32 {
    if max == 0 {
        return 0;
    }
    let scaled = count.saturating_mul(u64::from(plot_width)) / max;
    u32::try_from(scaled).unwrap_or(plot_width)
}

/// Thin element-level wrapper over an in-memory `quick_xml::Writer`.
///
/// Text and attribute values are escaped by quick-xml. Writes go to a
/// `Vec<u8>`, which cannot fail, so write results are discarded.
struct Svg {
    writer: Writer<Vec<u8>>,
}

impl Svg {
    fn new() -> Self {
        Self {
            writer: Writer::new_with_indent(Vec::new(), b' ', 2),
        }
    }

    fn open(&mut self, name: &str, attrs: &Attrs<'_>) {
        let _ = self.writer.write_event(Event::Start(start(name, attrs)));
    }

    fn close(&mut self, name: &str) {
        let _ = self.writer.write_event(Event::End(BytesEnd::new(name)));
    }

    fn empty(&mut self, name: &str, attrs: &Attrs<'_>) {
        let _ = self.writer.write_event(Event::Empty(start(name, attrs)));
    }

    fn text(&mut self, attrs: &Attrs<'_>, content: &str) {
        self.open("text", attrs);
        let _ = self.writer.write_event(Event::Text(BytesText::new(content)));
        self.close("text");
    }

    fn finish(self) -> String {
        let mut out = String::from_utf8_lossy(&self.writer.into_inner()).into_owned();
        out.push('\n');
        out
    }
}

fn start<'a>(name: &'a str, attrs: &'a Attrs<'a>) -> BytesStart<'a> {
    BytesStart::new(name).with_attributes(attrs.iter().map(|(k, v)| (*k, v.as_str())))
}
