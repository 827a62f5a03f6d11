//! Router assembly: the JSON API, the event stream, the embedded dashboard
//! page, and built frontend assets when present. CORS is restricted to the
//! configured origin.

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::response::Html;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use crate::dashboard::METRIC_PALETTE;
use crate::data::dataset::Dataset;
use crate::server::events::ConnectionRegistry;
use crate::server::{api, events, ServerConfig, ServerError};

pub fn router(dataset: Arc<Dataset>, config: &ServerConfig) -> Result<Router, ServerError> {
    let cors = cors_layer(config.allowed_origin.as_deref())?;
    let state = Arc::new(api::AppState {
        dataset,
        events: ConnectionRegistry::new(),
    });

    Ok(Router::new()
        .route("/", get(index))
        .route("/api/health", get(api::health))
        .route("/api/companies", get(api::companies))
        .route("/api/metrics", get(api::metrics))
        .route("/api/data", get(api::data))
        .route("/api/dataset/info", get(api::dataset_info))
        .route("/api/events", get(events::events_handler))
        .nest_service("/assets", ServeDir::new("frontend/dist"))
        .layer(cors)
        .with_state(state))
}

fn cors_layer(allowed_origin: Option<&str>) -> Result<CorsLayer, ServerError> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match allowed_origin {
        Some(origin) => {
            let origin = origin
                .parse::<HeaderValue>()
                .map_err(|_| ServerError::InvalidOrigin(origin.to_string()))?;
            Ok(layer.allow_origin(origin))
        }
        None => Ok(layer.allow_origin(Any)),
    }
}

async fn index() -> Html<String> {
    Html(index_html())
}

/// Embedded dashboard page: company/metric pickers and an SVG area chart,
/// driven by the JSON API. The metric palette is injected from the Rust
/// constant so the page and `dashboard::metric_color` stay in step.
pub fn index_html() -> String {
    let palette =
        serde_json::to_string(&METRIC_PALETTE).unwrap_or_else(|_| "[]".to_string());
    PAGE_TEMPLATE.replace("__METRIC_PALETTE__", &palette)
}

const PAGE_TEMPLATE: &str = r##"<!doctype html>
<html lang="en">
<head>
  <meta charset="utf-8" />
  <meta name="viewport" content="width=device-width,initial-scale=1" />
  <title>Company Financial Dashboard</title>
  <style>
    body { font-family: Arial, sans-serif; max-width: 1100px; margin: 24px auto; padding: 0 12px; color: #1f2430; }
    h1 { margin-bottom: 4px; }
    .subtitle { color: #666; margin-top: 0; }
    .layout { display: flex; gap: 16px; align-items: flex-start; }
    .sidebar { width: 240px; flex-shrink: 0; }
    .card { border: 1px solid #ddd; border-radius: 8px; padding: 14px; margin-bottom: 14px; }
    .card strong { display: block; margin-bottom: 8px; }
    .btn { display: block; width: 100%; text-align: left; margin: 4px 0; padding: 8px 10px;
           border: 1px solid #ccc; border-radius: 6px; background: #fff; cursor: pointer; }
    .btn-active { background: #4f46e5; border-color: #4f46e5; color: #fff; }
    .chart-card { flex: 1; border: 1px solid #ddd; border-radius: 8px; padding: 14px; min-height: 420px; }
    .placeholder { color: #9ca3af; text-align: center; padding-top: 160px; }
    .legend { margin: 8px 0 0; }
    .legend span { margin-right: 16px; font-size: 0.9rem; }
    .legend i { display: inline-block; width: 10px; height: 10px; border-radius: 5px; margin-right: 5px; }
  </style>
</head>
<body>
  <h1>Company Financial Dashboard</h1>
  <p class="subtitle">Select a company and one or more metrics to view performance</p>

  <div class="layout">
    <aside class="sidebar">
      <div class="card">
        <strong>Company</strong>
        <div id="companies"></div>
      </div>
      <div class="card">
        <strong>Metric</strong>
        <div id="metrics"></div>
      </div>
    </aside>
    <main class="chart-card">
      <div id="chart-title"></div>
      <div id="chart"><p class="placeholder">Please select a company and at least one metric.</p></div>
      <div id="legend" class="legend"></div>
    </main>
  </div>

  <script>
    const PALETTE = __METRIC_PALETTE__;
    const state = { company: null, metrics: [], seq: 0 };

    const companiesEl = document.getElementById('companies');
    const metricsEl = document.getElementById('metrics');
    const chartEl = document.getElementById('chart');
    const titleEl = document.getElementById('chart-title');
    const legendEl = document.getElementById('legend');

    const compact = new Intl.NumberFormat('en-US', { notation: 'compact', compactDisplay: 'short' });

    fetch('/api/companies').then(r => r.json()).then(renderCompanies).catch(err => console.error(err));
    fetch('/api/metrics').then(r => r.json()).then(renderMetrics).catch(err => console.error(err));

    function renderCompanies(companies) {
      companiesEl.textContent = '';
      companies.forEach(company => {
        const btn = document.createElement('button');
        btn.className = 'btn';
        btn.textContent = company;
        btn.addEventListener('click', () => {
          state.company = company;
          [...companiesEl.children].forEach(b => b.classList.toggle('btn-active', b.textContent === company));
          refresh();
        });
        companiesEl.appendChild(btn);
      });
    }

    function renderMetrics(metrics) {
      metricsEl.textContent = '';
      metrics.forEach(metric => {
        const btn = document.createElement('button');
        btn.className = 'btn';
        btn.textContent = metric;
        btn.addEventListener('click', () => {
          const at = state.metrics.indexOf(metric);
          if (at >= 0) { state.metrics.splice(at, 1); } else { state.metrics.push(metric); }
          btn.classList.toggle('btn-active', at < 0);
          refresh();
        });
        metricsEl.appendChild(btn);
      });
    }

    function refresh() {
      if (!state.company || state.metrics.length === 0) {
        titleEl.textContent = '';
        legendEl.textContent = '';
        chartEl.innerHTML = '<p class="placeholder">Please select a company and at least one metric.</p>';
        return;
      }
      const seq = ++state.seq;
      chartEl.innerHTML = '<p class="placeholder">Loading…</p>';
      const params = new URLSearchParams();
      params.append('company', state.company);
      state.metrics.forEach(metric => params.append('metric', metric));
      fetch('/api/data?' + params.toString())
        .then(r => r.json())
        .then(data => { if (seq === state.seq) renderChart(data); })
        .catch(err => {
          console.error(err);
          if (seq === state.seq) chartEl.innerHTML = '<p class="placeholder">Failed to load data.</p>';
        });
    }

    function renderChart(data) {
      titleEl.innerHTML = '<h2>' + state.company + ' — ' + state.metrics.join(', ') + '</h2>';
      if (data.length === 0) {
        legendEl.textContent = '';
        chartEl.innerHTML = '<p class="placeholder">No data for this selection.</p>';
        return;
      }

      const W = 820, H = 400, pad = { l: 60, r: 16, t: 16, b: 30 };
      const years = data.map(d => d.year);
      let max = 0;
      data.forEach(d => state.metrics.forEach(m => { if (m in d && d[m] > max) max = d[m]; }));
      if (max <= 0) max = 1;
      max *= 1.05;

      const x = i => years.length === 1
        ? pad.l + (W - pad.l - pad.r) / 2
        : pad.l + (W - pad.l - pad.r) * i / (years.length - 1);
      const y = v => H - pad.b - (H - pad.t - pad.b) * v / max;

      let svg = '<svg viewBox="0 0 ' + W + ' ' + H + '" width="100%">';
      for (let g = 0; g <= 4; g++) {
        const v = max * g / 4, gy = y(v);
        svg += '<line x1="' + pad.l + '" y1="' + gy + '" x2="' + (W - pad.r) + '" y2="' + gy +
               '" stroke="#e0e0e0" stroke-dasharray="3 3"/>';
        svg += '<text x="' + (pad.l - 8) + '" y="' + (gy + 4) + '" text-anchor="end" font-size="11" fill="#666">' +
               compact.format(v) + '</text>';
      }
      years.forEach((year, i) => {
        svg += '<text x="' + x(i) + '" y="' + (H - 8) + '" text-anchor="middle" font-size="11" fill="#666">' +
               year + '</text>';
      });

      state.metrics.forEach((metric, idx) => {
        const color = PALETTE[idx % PALETTE.length];
        const points = [];
        data.forEach((d, i) => { if (metric in d) points.push([x(i), y(d[metric])]); });
        if (points.length === 0) return;
        const line = points.map(p => p.join(',')).join(' ');
        const area = line + ' ' + points[points.length - 1][0] + ',' + y(0) + ' ' + points[0][0] + ',' + y(0);
        svg += '<polygon points="' + area + '" fill="' + color + '" fill-opacity="0.18"/>';
        svg += '<polyline points="' + line + '" fill="none" stroke="' + color + '" stroke-width="2"/>';
        points.forEach(p => {
          svg += '<circle cx="' + p[0] + '" cy="' + p[1] + '" r="3" fill="#fff" stroke="' + color + '" stroke-width="2"/>';
        });
      });
      svg += '</svg>';

      chartEl.innerHTML = svg;
      legendEl.innerHTML = state.metrics.map((metric, idx) =>
        '<span><i style="background:' + PALETTE[idx % PALETTE.length] + '"></i>' + metric + '</span>').join('');
    }
  </script>
</body>
</html>
"##;

#[cfg(test)]
mod tests {
    use super::index_html;

    #[test]
    fn dashboard_page_embeds_the_metric_palette() {
        let page = index_html();
        assert!(page.contains("#4f46e5"));
        assert!(!page.contains("__METRIC_PALETTE__"));
    }
}
