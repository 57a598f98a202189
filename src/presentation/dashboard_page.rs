// Dashboard page - Static HTML shell that calls /api/update on every date change
use crate::domain::calls::DateRange;
use crate::infrastructure::config::fill_template;
use std::collections::HashMap;

const PAGE_TEMPLATE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>${title}</title>
<style>
  body { font-family: sans-serif; margin: 2rem; }
  .table-wrap { overflow-x: auto; }
  table { border-collapse: collapse; width: 100%; }
  th, td { text-align: center; padding: 5px; white-space: normal; border: 1px solid #ddd; }
  .pager { margin: 0.5rem 0; }
  #chart-legend span { margin-right: 1rem; }
</style>
</head>
<body>
<h1>${title}</h1>

<div>
  <h2>Select Date Range</h2>
  <input type="date" id="start-date" value="${start_date}" min="${min_date}" max="${max_date}">
  <input type="date" id="end-date" value="${end_date}" min="${min_date}" max="${max_date}">
</div>

<h2>Data Table</h2>
<div class="table-wrap"><table id="data-table"><thead></thead><tbody></tbody></table></div>
<div class="pager">
  <button id="prev-page">&lsaquo;</button>
  <span id="page-label"></span>
  <button id="next-page">&rsaquo;</button>
</div>

<h2>Wait Time and Talk Time Over Time</h2>
<div id="chart-legend"></div>
<svg id="wait-talk-time-graph" width="900" height="360" role="img"></svg>

<script>
(function () {
  var pageSize = ${page_size};
  var state = { page: 1, pageCount: 1 };
  var startInput = document.getElementById("start-date");
  var endInput = document.getElementById("end-date");

  function el(name, attrs, text) {
    var isSvg = ["svg", "polyline", "line", "text"].indexOf(name) >= 0;
    var node = isSvg ? document.createElementNS("http://www.w3.org/2000/svg", name) : document.createElement(name);
    Object.keys(attrs || {}).forEach(function (k) { node.setAttribute(k, attrs[k]); });
    if (text !== undefined) { node.textContent = text; }
    return node;
  }

  function renderTable(table) {
    var thead = document.querySelector("#data-table thead");
    var tbody = document.querySelector("#data-table tbody");
    thead.innerHTML = "";
    tbody.innerHTML = "";
    var header = el("tr");
    table.columns.forEach(function (c) { header.appendChild(el("th", {}, c)); });
    thead.appendChild(header);
    table.rows.forEach(function (row) {
      var tr = el("tr");
      table.columns.forEach(function (c) {
        var v = row[c];
        tr.appendChild(el("td", {}, v === null || v === undefined ? "" : String(v)));
      });
      tbody.appendChild(tr);
    });
    state.page = table.page;
    state.pageCount = table.page_count;
    document.getElementById("page-label").textContent =
      table.page + " / " + table.page_count + " (" + table.total_rows + " rows, " + pageSize + " per page)";
  }

  function renderChart(chart) {
    var svg = document.getElementById("wait-talk-time-graph");
    var legend = document.getElementById("chart-legend");
    svg.innerHTML = "";
    legend.innerHTML = "";
    var w = 900, h = 360, pad = 50;
    var points = [];
    chart.series.forEach(function (s) { points = points.concat(s.points); });
    svg.appendChild(el("text", { x: w / 2, y: h - 5, "text-anchor": "middle" }, chart.x_label));
    svg.appendChild(el("text", { x: 12, y: h / 2, transform: "rotate(-90 12 " + h / 2 + ")", "text-anchor": "middle" }, chart.y_label));
    if (points.length === 0) { return; }

    var tMin = Math.min.apply(null, points.map(function (p) { return p.time_ms; }));
    var tMax = Math.max.apply(null, points.map(function (p) { return p.time_ms; }));
    var vMax = Math.max.apply(null, points.map(function (p) { return p.value; }));
    var x = function (t) { return pad + (tMax === tMin ? 0.5 : (t - tMin) / (tMax - tMin)) * (w - 2 * pad); };
    var y = function (v) { return h - pad - (vMax === 0 ? 0 : v / vMax) * (h - 2 * pad); };

    svg.appendChild(el("line", { x1: pad, y1: h - pad, x2: w - pad, y2: h - pad, stroke: "#333" }));
    svg.appendChild(el("line", { x1: pad, y1: pad, x2: pad, y2: h - pad, stroke: "#333" }));
    svg.appendChild(el("text", { x: pad - 5, y: pad, "text-anchor": "end" }, String(vMax)));

    legend.appendChild(el("strong", {}, chart.legend_title + ": "));
    chart.series.forEach(function (s) {
      var coords = s.points.map(function (p) { return x(p.time_ms) + "," + y(p.value); }).join(" ");
      svg.appendChild(el("polyline", { points: coords, fill: "none", stroke: s.color, "stroke-width": 1.5 }));
      legend.appendChild(el("span", { style: "color:" + s.color }, s.name));
    });
  }

  function update(page) {
    var params = new URLSearchParams({ start_date: startInput.value, end_date: endInput.value, page: page || 1 });
    fetch("/api/update?" + params.toString())
      .then(function (r) { return r.json(); })
      .then(function (view) {
        if (view.error) { throw new Error(view.error); }
        renderTable(view.table);
        renderChart(view.chart);
      })
      .catch(function (e) { console.error(e); });
  }

  startInput.addEventListener("change", function () { update(1); });
  endInput.addEventListener("change", function () { update(1); });
  document.getElementById("prev-page").addEventListener("click", function () {
    if (state.page > 1) { update(state.page - 1); }
  });
  document.getElementById("next-page").addEventListener("click", function () {
    if (state.page < state.pageCount) { update(state.page + 1); }
  });
  update(1);
})();
</script>
</body>
</html>
"##;

pub fn render_page(title: &str, bounds: Option<DateRange>, page_size: usize) -> String {
    let (start, end) = bounds
        .map(|b| (b.start.to_string(), b.end.to_string()))
        .unwrap_or_default();

    let mut vars = HashMap::new();
    vars.insert("title", escape_html(title));
    vars.insert("start_date", start.clone());
    vars.insert("end_date", end.clone());
    vars.insert("min_date", start);
    vars.insert("max_date", end);
    vars.insert("page_size", page_size.to_string());

    fill_template(PAGE_TEMPLATE, &vars)
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_render_page_presets_range() {
        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
            NaiveDate::from_ymd_opt(2024, 3, 9).unwrap(),
        );
        let html = render_page("Calls <311>", Some(range), 10);

        assert!(html.contains("<h1>Calls &lt;311&gt;</h1>"));
        assert!(html.contains("id=\"start-date\" value=\"2024-03-01\""));
        assert!(html.contains("id=\"end-date\" value=\"2024-03-09\""));
        assert!(html.contains("var pageSize = 10;"));
        assert!(!html.contains("${"));
    }

    #[test]
    fn test_render_page_without_data() {
        let html = render_page("Calls", None, 25);
        assert!(html.contains("id=\"start-date\" value=\"\""));
    }
}
