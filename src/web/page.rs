//! Server-rendered HTML view.

use std::fmt::Write;

use crate::catalog::{CatalogPage, CatalogStats, RecordFilter, StatusFilter};

const STYLE: &str = r#"
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; margin: 0; padding: 20px; background: #f5f5f5; }
.container { max-width: 1400px; margin: 0 auto; background: white; border-radius: 8px; box-shadow: 0 2px 10px rgba(0,0,0,0.1); overflow: hidden; }
.header { background: #2c3e50; color: white; padding: 20px; text-align: center; }
.stats { display: flex; justify-content: space-around; padding: 20px; background: #ecf0f1; border-bottom: 1px solid #bdc3c7; }
.stat-item { text-align: center; }
.stat-number { font-size: 24px; font-weight: bold; color: #2c3e50; }
.stat-label { color: #7f8c8d; font-size: 14px; }
.progress-bar { width: 100%; height: 8px; background: #dfe6e9; border-radius: 4px; overflow: hidden; margin-top: 10px; }
.progress-fill { height: 100%; background: #27ae60; }
.search-bar { padding: 20px; background: #f8f9fa; border-bottom: 1px solid #dee2e6; display: flex; gap: 10px; }
.search-input { flex: 1; padding: 10px; border: 1px solid #ddd; border-radius: 4px; font-size: 16px; }
table { width: 100%; border-collapse: collapse; }
th, td { padding: 12px; text-align: left; border-bottom: 1px solid #ecf0f1; vertical-align: top; }
th { background: #34495e; color: white; font-weight: 500; }
.mono { font-family: 'Monaco', 'Menlo', monospace; font-size: 13px; }
summary { cursor: pointer; color: #e74c3c; font-weight: 500; }
pre { background: #f8f9fa; border: 1px solid #dee2e6; border-radius: 4px; padding: 10px; white-space: pre-wrap; max-height: 300px; overflow-y: auto; font-size: 12px; }
tr.addressed { background-color: #d5f4e6; }
tr.addressed summary { color: #27ae60; text-decoration: line-through; }
.pagination { display: flex; justify-content: center; align-items: center; padding: 20px; gap: 10px; }
.pagination a, .pagination span { padding: 8px 12px; text-decoration: none; border: 1px solid #ddd; color: #333; border-radius: 4px; }
.pagination .disabled { color: #999; }
.pagination .current { background: #3498db; color: white; border-color: #3498db; }
.details-switch { display: flex; align-items: center; gap: 5px; white-space: nowrap; }
"#;

const PAGE_LINKS: usize = 7;

const SCRIPT: &str = r#"
function toggleAllDetails(open) {
  document.querySelectorAll('tbody details').forEach(function (d) { d.open = open; });
}

async function toggleError(box) {
  const row = box.closest('tr');
  box.disabled = true;
  try {
    const res = await fetch('/api/toggle/' + encodeURIComponent(row.dataset.identity), { method: 'POST' });
    const data = await res.json();
    if (!data.success) { throw new Error(data.error); }
    box.checked = data.addressed;
    row.classList.toggle('addressed', data.addressed);
    const stats = await (await fetch('/api/stats')).json();
    document.getElementById('stat-total').textContent = stats.total;
    document.getElementById('stat-addressed').textContent = stats.addressed;
    document.getElementById('stat-unaddressed').textContent = stats.unaddressed;
    document.getElementById('stat-progress').textContent = stats.progress_percent + '%';
    document.getElementById('progress-fill').style.width = stats.progress_percent + '%';
  } catch (err) {
    console.error('toggle failed', err);
    box.checked = !box.checked;
  } finally {
    box.disabled = false;
  }
}
"#;

pub fn render_index(listing: &CatalogPage, stats: &CatalogStats, filter: &RecordFilter) -> String {
    let mut html = String::with_capacity(16 * 1024);
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n");
    html.push_str("<title>Test Failure Tracker</title>\n<style>");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n<div class=\"container\">\n");
    html.push_str("<div class=\"header\"><h1>Test Failure Tracker</h1><p>Track and manage test failures from CSV exports</p></div>\n");

    render_stats(&mut html, stats);
    render_search(&mut html, filter);
    render_table(&mut html, listing);
    render_pagination(&mut html, listing, filter);

    html.push_str("</div>\n<script>");
    html.push_str(SCRIPT);
    html.push_str("</script>\n</body>\n</html>\n");
    html
}

fn render_stats(html: &mut String, stats: &CatalogStats) {
    let _ = write!(
        html,
        "<div class=\"stats\">\
         <div class=\"stat-item\"><div class=\"stat-number\" id=\"stat-total\">{}</div><div class=\"stat-label\">Total Errors</div></div>\
         <div class=\"stat-item\"><div class=\"stat-number\" id=\"stat-addressed\">{}</div><div class=\"stat-label\">Addressed</div></div>\
         <div class=\"stat-item\"><div class=\"stat-number\" id=\"stat-unaddressed\">{}</div><div class=\"stat-label\">Unaddressed</div></div>\
         <div class=\"stat-item\"><div class=\"stat-number\" id=\"stat-progress\">{}%</div><div class=\"stat-label\">Progress</div>\
         <div class=\"progress-bar\"><div class=\"progress-fill\" id=\"progress-fill\" style=\"width: {}%\"></div></div></div>\
         </div>\n",
        stats.total, stats.addressed, stats.unaddressed, stats.progress_percent, stats.progress_percent
    );
}

fn render_search(html: &mut String, filter: &RecordFilter) {
    let _ = write!(
        html,
        "<form class=\"search-bar\" method=\"get\" action=\"/\">\
         <input type=\"text\" class=\"search-input\" name=\"q\" value=\"{}\" \
         placeholder=\"Search errors by file, test name, or error message...\">\
         <select name=\"status\">",
        escape_html(filter.query().unwrap_or_default())
    );
    for status in [StatusFilter::All, StatusFilter::Addressed, StatusFilter::Unaddressed] {
        let label = match status {
            StatusFilter::All => "All Status",
            StatusFilter::Addressed => "Addressed Only",
            StatusFilter::Unaddressed => "Unaddressed Only",
        };
        let selected = if status == filter.status { " selected" } else { "" };
        let _ = write!(html, "<option value=\"{}\"{}>{}</option>", status.as_str(), selected, label);
    }
    html.push_str("</select>");
    html.push_str(
        "<label class=\"details-switch\"><input type=\"checkbox\" id=\"showDetails\" \
         onchange=\"toggleAllDetails(this.checked)\"> Show all error details</label>",
    );
    html.push_str("<button type=\"submit\">Search</button></form>\n");
}

fn render_table(html: &mut String, listing: &CatalogPage) {
    html.push_str(
        "<table>\n<thead><tr><th>Status</th><th>File</th><th>Test Name</th><th>Error Summary</th></tr></thead>\n<tbody>\n",
    );
    for record in &listing.records {
        let _ = write!(
            html,
            "<tr class=\"{}\" data-identity=\"{}\">\
             <td><input type=\"checkbox\" onchange=\"toggleError(this)\"{}></td>\
             <td class=\"mono\">{}</td><td class=\"mono\">{}</td>\
             <td><details><summary>{}</summary><pre>{}</pre></details></td></tr>\n",
            if record.addressed { "addressed" } else { "" },
            escape_html(&record.identity),
            if record.addressed { " checked" } else { "" },
            escape_html(&record.source_file),
            escape_html(&record.test_name),
            escape_html(&record.summary),
            escape_html(&record.full_message),
        );
    }
    html.push_str("</tbody>\n</table>\n");
}

fn render_pagination(html: &mut String, listing: &CatalogPage, filter: &RecordFilter) {
    let pagination = &listing.pagination;
    if pagination.total_pages <= 1 {
        return;
    }

    html.push_str("<div class=\"pagination\">");
    if pagination.has_prev {
        let _ = write!(
            html,
            "<a href=\"{}\">&laquo; Previous</a>",
            escape_html(&page_href(pagination.current_page - 1, filter))
        );
    } else {
        html.push_str("<span class=\"disabled\">&laquo; Previous</span>");
    }
    for page in pagination.page_window(PAGE_LINKS) {
        if page == pagination.current_page {
            let _ = write!(html, "<span class=\"current\">{}</span>", page);
        } else {
            let _ = write!(
                html,
                "<a href=\"{}\">{}</a>",
                escape_html(&page_href(page, filter)),
                page
            );
        }
    }
    if pagination.has_next {
        let _ = write!(
            html,
            "<a href=\"{}\">Next &raquo;</a>",
            escape_html(&page_href(pagination.current_page + 1, filter))
        );
    } else {
        html.push_str("<span class=\"disabled\">Next &raquo;</span>");
    }
    html.push_str("</div>\n");
}

fn page_href(page: usize, filter: &RecordFilter) -> String {
    let mut href = format!("/?page={}", page);
    if let Some(query) = filter.query() {
        href.push_str("&q=");
        href.push_str(&encode_query_value(query));
    }
    if filter.status != StatusFilter::All {
        href.push_str("&status=");
        href.push_str(filter.status.as_str());
    }
    href
}

fn encode_query_value(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{:02X}", byte);
            }
        }
    }
    out
}

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
