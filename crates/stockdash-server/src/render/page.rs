use stockdash_core::{
    CorrelationMatrix, MarketSummary, MonthlyMovers, PriceMatrix, SectorReturn, TickerReturn,
    TickerVolatility,
};

use super::charts::{bar_chart, heatmap, line_chart, BarChart, BarFill, ColorScale};
use super::{escape_html, format_number, format_price, format_thousands};

const PAGE_TITLE: &str = "Stock Market Dashboard";
const TEMPLATE: &str = include_str!("dashboard_template.html");

/// Each section carries either its data or the message of whatever stopped it
/// from loading; a failed section does not take the page down.
pub type Section<T> = Result<T, String>;

#[derive(Debug, Clone)]
pub struct Ranked {
    pub gainers: Vec<TickerReturn>,
    pub losers: Vec<TickerReturn>,
}

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub ranked: Section<Ranked>,
    pub summary: Section<MarketSummary>,
    pub volatility: Section<Vec<TickerVolatility>>,
    pub cumulative: Section<PriceMatrix>,
    pub sectors: Section<Vec<SectorReturn>>,
    pub correlation: Section<CorrelationMatrix>,
    pub movers: Section<Vec<MonthlyMovers>>,
    pub top_n: usize,
    pub cumulative_n: usize,
    pub movers_n: usize,
}

pub fn render_dashboard(view: &DashboardView) -> String {
    let mut body = String::new();

    body.push_str(r#"<h2 class="centered">👋 Welcome to the Stock Market Dashboard!</h2>"#);
    body.push_str(
        r#"<p class="centered">Stay updated with trends, performance, and insights 📊📈</p>"#,
    );
    body.push_str(&format!("<h1>📈 {}</h1>", PAGE_TITLE));

    render_ranked(&mut body, view);
    render_summary(&mut body, &view.summary);
    render_volatility(&mut body, view);
    render_cumulative(&mut body, view);
    render_sectors(&mut body, &view.sectors);
    render_correlation(&mut body, &view.correlation);
    render_movers(&mut body, view);

    body.push_str(
        r#"<footer><h4 class="centered">🙏 Thank you for exploring the Stock Market Dashboard! Happy Investing! 📊📈😊</h4></footer>"#,
    );

    TEMPLATE
        .replace("{{title}}", PAGE_TITLE)
        .replace("{{body}}", &body)
}

fn notice(message: &str) -> String {
    format!(
        r#"<div class="notice">Data unavailable: {}</div>"#,
        escape_html(message)
    )
}

fn table(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut html = String::from("<table><thead><tr>");
    for header in headers {
        html.push_str(&format!("<th>{}</th>", escape_html(header)));
    }
    html.push_str("</tr></thead><tbody>");
    for row in rows {
        html.push_str("<tr>");
        for cell in row {
            html.push_str(&format!("<td>{}</td>", escape_html(cell)));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

fn return_rows(returns: &[TickerReturn]) -> Vec<Vec<String>> {
    returns
        .iter()
        .map(|r| vec![r.ticker.clone(), format_number(r.yearly_return, 4)])
        .collect()
}

fn render_ranked(body: &mut String, view: &DashboardView) {
    match &view.ranked {
        Ok(ranked) => {
            body.push_str(&format!("<h2>🚀 Top {} Green Stocks</h2>", view.top_n));
            body.push_str(&table(&["Ticker", "yearly_return"], &return_rows(&ranked.gainers)));
            body.push_str(&format!("<h2>📉 Top {} Loss Stocks</h2>", view.top_n));
            body.push_str(&table(&["Ticker", "yearly_return"], &return_rows(&ranked.losers)));
        }
        Err(e) => {
            body.push_str(&format!("<h2>🚀 Top {} Green Stocks</h2>", view.top_n));
            body.push_str(&notice(e));
        }
    }
}

fn render_summary(body: &mut String, summary: &Section<MarketSummary>) {
    body.push_str("<h2>📊 Market Summary</h2>");
    let summary = match summary {
        Ok(summary) => summary,
        Err(e) => {
            body.push_str(&notice(e));
            return;
        }
    };

    let metrics = [
        ("Green Stocks", summary.green_count.to_string()),
        ("Red Stocks", summary.red_count.to_string()),
        ("Average Price", format_price(summary.average_price)),
        (
            "Average Volume",
            format_thousands(summary.average_volume.trunc() as i64),
        ),
    ];

    body.push_str(r#"<div class="metrics">"#);
    for (label, value) in metrics {
        body.push_str(&format!(
            r#"<div class="metric"><div class="label">{}</div><div class="value">{}</div></div>"#,
            label,
            escape_html(&value)
        ));
    }
    body.push_str("</div>");
}

fn render_volatility(body: &mut String, view: &DashboardView) {
    body.push_str("<h2>⚡ Most Volatile Stocks</h2>");
    let rows = match &view.volatility {
        Ok(rows) => rows,
        Err(e) => {
            body.push_str(&notice(e));
            return;
        }
    };

    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|r| vec![r.ticker.clone(), format_number(r.volatility, 6)])
        .collect();
    body.push_str(&table(&["Ticker", "volatility"], &cells));

    let labels: Vec<String> = rows.iter().map(|r| r.ticker.clone()).collect();
    let values: Vec<f64> = rows.iter().map(|r| r.volatility).collect();
    body.push_str(&bar_chart(&BarChart {
        title: "Volatility (std. dev. of daily returns)",
        labels: &labels,
        values: &values,
        fill: BarFill::Sign,
        y_label: "volatility",
        rotate_labels: false,
        decimals: 3,
    }));
}

fn render_cumulative(body: &mut String, view: &DashboardView) {
    body.push_str(&format!(
        "<h2>📈 Cumulative Return Over Time (Top {} Performing Stocks)</h2>",
        view.cumulative_n
    ));
    match &view.cumulative {
        Ok(matrix) => body.push_str(&line_chart("Cumulative return", matrix, "cumulative_return")),
        Err(e) => body.push_str(&notice(e)),
    }
}

fn render_sectors(body: &mut String, sectors: &Section<Vec<SectorReturn>>) {
    body.push_str("<h2>🏢 Sector-wise Average Yearly Return</h2>");
    let sectors = match sectors {
        Ok(sectors) => sectors,
        Err(e) => {
            body.push_str(&notice(e));
            return;
        }
    };

    let cells: Vec<Vec<String>> = sectors
        .iter()
        .map(|s| vec![s.sector.clone(), format_number(s.avg_yearly_return, 2)])
        .collect();
    body.push_str(&table(&["Sector", "AvgYearlyReturn"], &cells));

    let labels: Vec<String> = sectors.iter().map(|s| s.sector.clone()).collect();
    let values: Vec<f64> = sectors.iter().map(|s| s.avg_yearly_return).collect();
    body.push_str(&bar_chart(&BarChart {
        title: "📊 Sector-wise Average Yearly Return (from CSV)",
        labels: &labels,
        values: &values,
        fill: BarFill::Scale(ColorScale::RdYlGn),
        y_label: "Avg Yearly Return (%)",
        rotate_labels: true,
        decimals: 1,
    }));
}

fn render_correlation(body: &mut String, correlation: &Section<CorrelationMatrix>) {
    body.push_str("<h2>🔗 Stock Price Correlation Heatmap</h2>");
    match correlation {
        Ok(matrix) => {
            body.push_str("<p>Correlation between daily closing returns of different stocks:</p>");
            body.push_str(&heatmap("📊 Stock Price Correlation Heatmap", matrix));
        }
        Err(e) => body.push_str(&notice(e)),
    }
}

fn render_movers(body: &mut String, view: &DashboardView) {
    let months = match &view.movers {
        Ok(months) => months,
        Err(e) => {
            body.push_str("<h2>📅 Monthly Gainers &amp; Losers</h2>");
            body.push_str(&notice(e));
            return;
        }
    };

    for month in months {
        let label = escape_html(&month.label);
        body.push_str(&format!("<h3>📅 {} — Gainers &amp; Losers</h3>", label));
        body.push_str(r#"<div class="columns"><div>"#);

        body.push_str(&format!("<h4>🚀 Top {} Gainers</h4>", view.movers_n));
        let labels: Vec<String> = month.gainers.iter().map(|r| r.ticker.clone()).collect();
        let values: Vec<f64> = month.gainers.iter().map(|r| r.monthly_return).collect();
        body.push_str(&bar_chart(&BarChart {
            title: &format!("Gainers - {}", month.label),
            labels: &labels,
            values: &values,
            fill: BarFill::Scale(ColorScale::Greens),
            y_label: "% Return",
            rotate_labels: false,
            decimals: 1,
        }));

        body.push_str("</div><div>");

        body.push_str(&format!("<h4>📉 Top {} Losers</h4>", view.movers_n));
        let labels: Vec<String> = month.losers.iter().map(|r| r.ticker.clone()).collect();
        let values: Vec<f64> = month.losers.iter().map(|r| r.monthly_return).collect();
        body.push_str(&bar_chart(&BarChart {
            title: &format!("Losers - {}", month.label),
            labels: &labels,
            values: &values,
            fill: BarFill::Scale(ColorScale::RedsReversed),
            y_label: "% Return",
            rotate_labels: false,
            decimals: 1,
        }));

        body.push_str("</div></div>");
    }
}
