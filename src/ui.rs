use crate::dashboard::charts::ChartRegistry;
use crate::dashboard::heatmap::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::dashboard::{DashboardView, Metric};
use crate::summary::{format_number, AnalyticsSummary};
use serde_json::json;
use std::time::Duration;

pub fn render_index(
    view: &DashboardView,
    charts: &ChartRegistry,
    summary: Option<&AnalyticsSummary>,
    refresh: Duration,
) -> String {
    let default_summary = AnalyticsSummary::default();
    let summary = summary.unwrap_or(&default_summary);
    let metric = |metric: Metric| view.metric(metric).unwrap_or("0").to_string();

    let chart_configs: Vec<_> = charts
        .iter()
        .map(|chart| json!({ "element_id": chart.slot.element_id(), "config": chart.config }))
        .collect();
    // Keeps a stray "</script>" inside the JSON from closing the tag early.
    let charts_json = serde_json::Value::from(chart_configs)
        .to_string()
        .replace("</", "<\\/");

    fill_template(INDEX_HTML, |key| {
        let value = match key {
            "REFRESH_SECS" => refresh.as_secs().max(1).to_string(),
            "TOTAL_EVENTS" => format_number(summary.total_events),
            "UNIQUE_SESSIONS" => format_number(summary.unique_sessions),
            "EVENTS_PER_SESSION" => summary.events_per_session.to_string(),
            "TOTAL_CLICKS" => metric(Metric::TotalClicks),
            "CLICK_CLUSTERS" => metric(Metric::ClickClusters),
            "AVG_SCROLL_DEPTH" => metric(Metric::AvgScrollDepth),
            "MAX_SCROLL_DEPTH" => metric(Metric::MaxScrollDepth),
            "BOUNCE_RATE" => metric(Metric::BounceRate),
            "HEATMAP" => view.heatmap.to_svg("heat", "Click heatmap"),
            "SUGGESTIONS" => view.suggestions_html.clone(),
            "CHARTS" => charts_json.clone(),
            "CANVAS_WIDTH" => CANVAS_WIDTH.to_string(),
            "CANVAS_HEIGHT" => CANVAS_HEIGHT.to_string(),
            _ => return None,
        };
        Some(value)
    })
}

/// Single pass over `{{KEY}}` markers, so substituted text is never
/// scanned again. Unknown keys are left as they are.
fn fill_template(template: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find("}}") {
            Some(end) => {
                let key = &after[..end];
                match lookup(key) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push_str("{{");
                        out.push_str(key);
                        out.push_str("}}");
                    }
                }
                rest = &after[end + 2..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <meta http-equiv="refresh" content="{{REFRESH_SECS}}" />
  <title>UX Pulse Dashboard</title>
  <script src="https://cdn.jsdelivr.net/npm/chart.js@4"></script>
  <style>
    :root {
      --bg: #f3f4f6;
      --ink: #111827;
      --muted: #6b7280;
      --card: #ffffff;
      --primary: hsl(220, 100%, 50%);
      --high: hsl(0, 100%, 50%);
      --medium: hsl(35, 100%, 50%);
      --low: hsl(120, 100%, 35%);
      --shadow: 0 12px 32px rgba(17, 24, 39, 0.08);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      background: var(--bg);
      color: var(--ink);
      font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", sans-serif;
      display: grid;
      grid-template-columns: 220px 1fr;
      min-height: 100vh;
    }

    nav {
      background: #0f172a;
      padding: 28px 16px;
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    nav h1 {
      color: white;
      font-size: 1.2rem;
      margin: 0 0 18px 8px;
    }

    .nav-item {
      color: #cbd5e1;
      text-decoration: none;
      padding: 10px 12px;
      border-radius: 10px;
    }

    .nav-item.active {
      background: var(--primary);
      color: white;
    }

    main {
      padding: 32px;
      display: grid;
      gap: 24px;
      align-content: start;
    }

    .toolbar {
      display: flex;
      justify-content: space-between;
      align-items: center;
    }

    .toolbar a {
      background: var(--primary);
      color: white;
      text-decoration: none;
      padding: 10px 16px;
      border-radius: 999px;
      font-weight: 600;
    }

    .content-section {
      display: none;
      gap: 20px;
    }

    .content-section.active {
      display: grid;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
      gap: 16px;
    }

    .card {
      background: var(--card);
      border-radius: 16px;
      padding: 20px;
      box-shadow: var(--shadow);
    }

    .stat .label {
      display: block;
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.08em;
      color: var(--muted);
    }

    .stat .value {
      display: block;
      margin-top: 6px;
      font-size: 1.8rem;
      font-weight: 700;
    }

    .chart-box {
      position: relative;
      height: 300px;
    }

    .heatmap svg {
      width: 100%;
      height: auto;
      border-radius: 12px;
    }

    .loading-suggestions {
      color: var(--muted);
      padding: 24px;
      text-align: center;
    }

    .suggestion-card {
      background: var(--card);
      border-left: 4px solid var(--primary);
      border-radius: 12px;
      padding: 18px 20px;
      box-shadow: var(--shadow);
      margin-bottom: 14px;
    }

    .suggestion-card.high-priority {
      border-color: var(--high);
    }

    .suggestion-card.medium-priority {
      border-color: var(--medium);
    }

    .suggestion-card.low-priority {
      border-color: var(--low);
    }

    .suggestion-header {
      display: flex;
      justify-content: space-between;
      align-items: center;
      gap: 12px;
    }

    .suggestion-header h4 {
      margin: 0;
    }

    .priority-badge {
      font-size: 0.75rem;
      text-transform: uppercase;
      padding: 4px 10px;
      border-radius: 999px;
      background: #e5e7eb;
    }

    @media (max-width: 800px) {
      body {
        grid-template-columns: 1fr;
      }
    }
  </style>
</head>
<body>
  <nav>
    <h1>UX Pulse</h1>
    <a class="nav-item active" href="#" data-section="overview">Overview</a>
    <a class="nav-item" href="#" data-section="heatmap">Heatmap</a>
    <a class="nav-item" href="#" data-section="scroll">Scroll depth</a>
    <a class="nav-item" href="#" data-section="suggestions">Suggestions</a>
  </nav>

  <main>
    <div class="toolbar">
      <h2>Analytics</h2>
      <a href="/export" download>Export data</a>
    </div>

    <section id="overview-section" class="content-section active">
      <div class="stats">
        <div class="card stat"><span class="label">Total events</span><span class="value" id="total-events">{{TOTAL_EVENTS}}</span></div>
        <div class="card stat"><span class="label">Sessions</span><span class="value" id="unique-sessions">{{UNIQUE_SESSIONS}}</span></div>
        <div class="card stat"><span class="label">Events / session</span><span class="value" id="events-per-session">{{EVENTS_PER_SESSION}}</span></div>
      </div>
      <div class="card"><div class="chart-box"><canvas id="eventChart"></canvas></div></div>
      <div class="card"><div class="chart-box"><canvas id="timelineChart"></canvas></div></div>
    </section>

    <section id="heatmap-section" class="content-section">
      <div class="stats">
        <div class="card stat"><span class="label">Total clicks</span><span class="value" id="total-clicks">{{TOTAL_CLICKS}}</span></div>
        <div class="card stat"><span class="label">Click clusters</span><span class="value" id="click-clusters">{{CLICK_CLUSTERS}}</span></div>
      </div>
      <div class="card heatmap" data-width="{{CANVAS_WIDTH}}" data-height="{{CANVAS_HEIGHT}}">{{HEATMAP}}</div>
    </section>

    <section id="scroll-section" class="content-section">
      <div class="stats">
        <div class="card stat"><span class="label">Average depth</span><span class="value" id="avg-scroll-depth">{{AVG_SCROLL_DEPTH}}</span></div>
        <div class="card stat"><span class="label">Max depth</span><span class="value" id="max-scroll-depth">{{MAX_SCROLL_DEPTH}}</span></div>
        <div class="card stat"><span class="label">Bounce rate</span><span class="value" id="bounce-rate">{{BOUNCE_RATE}}</span></div>
      </div>
      <div class="card"><div class="chart-box"><canvas id="scrollChart"></canvas></div></div>
    </section>

    <section id="suggestions-section" class="content-section">
      <div id="suggestions-container">{{SUGGESTIONS}}</div>
    </section>
  </main>

  <script type="application/json" id="chart-configs">{{CHARTS}}</script>
  <script>
    const navItems = Array.from(document.querySelectorAll('.nav-item'));
    const sections = Array.from(document.querySelectorAll('.content-section'));

    navItems.forEach((item) => {
      item.addEventListener('click', (event) => {
        event.preventDefault();
        navItems.forEach((nav) => nav.classList.remove('active'));
        sections.forEach((section) => section.classList.remove('active'));
        item.classList.add('active');
        const target = document.getElementById(item.dataset.section + '-section');
        if (target) {
          target.classList.add('active');
        }
      });
    });

    if (window.Chart) {
      const configs = JSON.parse(document.getElementById('chart-configs').textContent);
      configs.forEach((chart) => {
        const el = document.getElementById(chart.element_id);
        if (el) {
          new Chart(el, chart.config);
        }
      });
    }
  </script>
</body>
</html>
"##;
