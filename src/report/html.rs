use std::fmt::Write;

use crate::persist::MasterRecord;
use crate::report::ReportMeta;

const MISSING: &str = "—";

const HEADERS: [&str; 12] = [
    "#",
    "Name",
    "Links",
    "Price",
    "Sales 7d",
    "24h avg",
    "7d avg",
    "30d avg",
    "24h/7d",
    "7d/30d",
    "Bullish",
    "Updated",
];

const STYLE: &str = r#"
:root { color-scheme: light dark; --bg:#0b0f14; --panel:#121823; --text:#e6edf3; --muted:#8b98a5; --border:#1f2a3a; --accent:#4aa3ff; --up:#22c55e; --down:#ff6b6b; }
@media (prefers-color-scheme: light) { :root { --bg:#f7f9fc; --panel:#fff; --text:#0b1a2a; --muted:#5b6b7b; --border:#dee5ef; --accent:#1f73ff; --up:#0f9d58; --down:#d7263d; } }
* { box-sizing: border-box; }
body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', Roboto, Helvetica, Arial, sans-serif; padding: 20px; }
h1 { margin: 4px 0 10px; font-weight: 650; }
.meta { display: flex; gap: 8px; flex-wrap: wrap; margin-bottom: 12px; }
.chip { background: var(--panel); border: 1px solid var(--border); color: var(--muted); padding: 4px 10px; border-radius: 999px; font-size: 12px; }
#filterInput { width: 100%; max-width: 420px; padding: 8px 10px; margin-bottom: 12px; background: var(--panel); color: var(--text); border: 1px solid var(--border); border-radius: 8px; }
.wrap { overflow: auto; background: var(--panel); border: 1px solid var(--border); border-radius: 10px; }
table { border-collapse: collapse; width: 100%; font-size: 12.5px; }
th { position: sticky; top: 0; background: var(--panel); color: var(--muted); text-transform: uppercase; font-weight: 600; cursor: pointer; user-select: none; }
th, td { padding: 8px; border-bottom: 1px solid var(--border); text-align: left; white-space: nowrap; }
td.num { text-align: right; font-variant-numeric: tabular-nums; }
td.up { color: var(--up); } td.down { color: var(--down); }
td a { color: var(--accent); text-decoration: none; margin-right: 8px; }
.empty { color: var(--muted); padding: 20px; text-align: center; }
"#;

const SCRIPT: &str = r#"
function filterRows() {
  const q = document.getElementById('filterInput').value.toLowerCase();
  document.querySelectorAll('#report tbody tr').forEach(tr => {
    tr.style.display = tr.cells[1].textContent.toLowerCase().includes(q) ? '' : 'none';
  });
}
function sortBy(col) {
  const body = document.querySelector('#report tbody');
  const rows = Array.from(body.rows);
  const dir = body.dataset.col == col && body.dataset.dir == 'desc' ? 1 : -1;
  const key = tr => { const n = parseFloat(tr.cells[col].dataset.v); return isNaN(n) ? tr.cells[col].textContent : n; };
  rows.sort((a, b) => { const x = key(a), y = key(b); return (x < y ? -1 : x > y ? 1 : 0) * dir; });
  body.dataset.col = col; body.dataset.dir = dir < 0 ? 'desc' : 'asc';
  rows.forEach(r => body.appendChild(r));
}
"#;

/// Self-contained HTML page: inline CSS, a name filter box and sortable columns.
pub fn render(rows: &[MasterRecord], meta: &ReportMeta) -> String {
    let mut out = String::with_capacity(4096 + rows.len() * 512);
    let title = format!("Skin momentum: {}", meta.game.display_name());

    // Writing into a String cannot fail.
    let _ = write!(
        out,
        "<!doctype html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width,initial-scale=1\">\n\
         <title>{}</title>\n<style>{STYLE}</style>\n<script>{SCRIPT}</script>\n</head>\n<body>\n\
         <h1>{}</h1>\n",
        escape(&title),
        escape(&title),
    );

    out.push_str("<div class=\"meta\">");
    let filters = if meta.filters.is_empty() {
        "none".to_string()
    } else {
        meta.filters.join(", ")
    };
    for chip in [
        format!("Game: {}", meta.game),
        format!("Currency: {}", meta.currency),
        format!("Mode: {}", meta.mode),
        format!("Filters: {filters}"),
        format!("Items: {}", rows.len()),
        format!("Generated: {}", meta.generated_at.format("%Y-%m-%d %H:%M:%S UTC")),
    ] {
        let _ = write!(out, "<span class=\"chip\">{}</span>", escape(&chip));
    }
    out.push_str("</div>\n");
    out.push_str(
        "<input id=\"filterInput\" placeholder=\"Filter by name\" oninput=\"filterRows()\">\n",
    );

    if rows.is_empty() {
        out.push_str("<div class=\"wrap\"><div class=\"empty\">No items matched.</div></div>\n");
        out.push_str("</body>\n</html>\n");
        return out;
    }

    out.push_str("<div class=\"wrap\"><table id=\"report\"><thead><tr>");
    for (i, h) in HEADERS.iter().enumerate() {
        let _ = write!(out, "<th onclick=\"sortBy({i})\">{h}</th>");
    }
    out.push_str("</tr></thead>\n<tbody>\n");
    for (i, row) in rows.iter().enumerate() {
        render_row(&mut out, i + 1, row);
    }
    out.push_str("</tbody></table></div>\n</body>\n</html>\n");
    out
}

fn render_row(out: &mut String, rank: usize, r: &MasterRecord) {
    out.push_str("<tr>");
    let _ = write!(out, "<td class=\"num\" data-v=\"{rank}\">{rank}</td>");
    let _ = write!(out, "<td>{}</td>", escape(&r.name));
    let _ = write!(
        out,
        "<td><a href=\"{}\" target=\"_blank\" rel=\"noopener\">Skinport</a>\
         <a href=\"{}\" target=\"_blank\" rel=\"noopener\">Steam</a></td>",
        escape(&r.skinport_url),
        escape(&r.steam_url),
    );
    let _ = write!(
        out,
        "<td class=\"num\" data-v=\"{p}\">{p} {}</td>",
        r.currency,
        p = r.price.round_dp(2),
    );
    num_cell(out, r.sales_this_week.map(|v| v as f64), 0, None);
    num_cell(out, r.avg_24h, 2, None);
    num_cell(out, r.avg_7d, 2, None);
    num_cell(out, r.avg_30d, 2, None);
    num_cell(out, r.growth_short, 3, Some(1.0));
    num_cell(out, r.growth_medium, 3, Some(1.0));
    num_cell(out, Some(r.bullish_score), 3, None);
    let _ = write!(
        out,
        "<td>{}</td>",
        r.last_updated.format("%Y-%m-%d %H:%M")
    );
    out.push_str("</tr>\n");
}

/// Numeric cell; `pivot` colours values above/below it.
fn num_cell(out: &mut String, value: Option<f64>, decimals: usize, pivot: Option<f64>) {
    match value {
        Some(v) => {
            let class = match pivot {
                Some(p) if v > p => "num up",
                Some(p) if v < p => "num down",
                _ => "num",
            };
            let _ = write!(out, "<td class=\"{class}\" data-v=\"{v}\">{v:.decimals$}</td>");
        }
        None => {
            let _ = write!(out, "<td class=\"num\">{MISSING}</td>");
        }
    }
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Currency, Game, PersistMode};
    use chrono::{DateTime, Utc};
    use rust_decimal::Decimal;

    fn meta() -> ReportMeta {
        ReportMeta {
            game: Game::Cs2,
            currency: Currency::Usd,
            mode: PersistMode::Merge,
            filters: vec!["knife".to_string()],
            generated_at: DateTime::parse_from_rfc3339("2026-10-19T09:15:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    fn row(name: &str) -> MasterRecord {
        MasterRecord {
            name: name.to_string(),
            skinport_url: "https://skinport.com/market?search=a&b".to_string(),
            steam_url: "https://steamcommunity.com/market/listings/730/x".to_string(),
            price: Decimal::new(123456, 2),
            currency: Currency::Usd,
            sales_this_week: Some(12),
            avg_7d: Some(1200.0),
            avg_24h: None,
            avg_30d: Some(1100.0),
            growth_medium: Some(1200.0 / 1100.0),
            growth_short: None,
            bullish_score: 2.5,
            last_updated: meta().generated_at,
        }
    }

    #[test]
    fn escapes_markup_in_names_and_urls() {
        let html = render(&[row("<script>alert('x')</script> & Co")], &meta());
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; Co"));
        assert!(html.contains("search=a&amp;b"));
    }

    #[test]
    fn missing_values_render_as_dash() {
        let html = render(&[row("★ Karambit | Fade")], &meta());
        assert!(html.contains(&format!("<td class=\"num\">{MISSING}</td>")));
        assert!(html.contains("1234.56 USD"));
        assert!(html.contains("★ Karambit | Fade"));
    }

    #[test]
    fn header_carries_run_metadata() {
        let html = render(&[row("A"), row("B")], &meta());
        for needle in [
            "Game: cs2",
            "Currency: USD",
            "Mode: merge",
            "Filters: knife",
            "Items: 2",
            "Generated: 2026-10-19 09:15:00 UTC",
            "id=\"filterInput\"",
        ] {
            assert!(html.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn empty_set_renders_a_notice() {
        let html = render(&[], &meta());
        assert!(html.contains("No items matched."));
        assert!(!html.contains("<tbody>"));
    }

    #[test]
    fn growth_cells_are_coloured_around_one() {
        let html = render(&[row("A")], &meta());
        assert!(html.contains("class=\"num up\""));
    }
}
