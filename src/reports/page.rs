// HTML chart page
//
// A single Chart.js line chart over every series. The ISIN selector only
// toggles `hidden` on the client; it never calls back to the server.

use anyhow::{Context, Result};

use super::chart::ChartPayload;

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js";

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="uk">
<head>
  <meta charset="utf-8">
  <title>Облігації</title>
  <script src="%CHART_JS%"></script>
</head>
<body>
  <h2>Графік облігацій</h2>
  <label for="isinSelect">Оберіть ISIN:</label>
  <select id="isinSelect">
    <option value="all">Всі</option>
%OPTIONS%  </select>

  <canvas id="allChart" width="900" height="400"></canvas>

  <script>
    const payload = %PAYLOAD%;
    const ctx = document.getElementById('allChart').getContext('2d');
    const allChart = new Chart(ctx, {
      type: 'line',
      data: {
        labels: payload.labels,
        datasets: payload.datasets
      },
      options: {
        responsive: true,
        parsing: {
          xAxisKey: 'x',
          yAxisKey: 'y'
        },
        scales: {
          x: {
            type: 'category',
            title: { display: true, text: 'Дата' }
          },
          y: {
            title: { display: true, text: 'Ціна (UAH)' }
          }
        }
      }
    });

    document.getElementById('isinSelect').addEventListener('change', (e) => {
      const value = e.target.value;
      allChart.data.datasets.forEach(ds => {
        ds.hidden = (value !== 'all' && ds.label !== value);
      });
      allChart.update();
    });
  </script>
</body>
</html>
"#;

/// Render the full chart page for `payload`
pub fn render_page(payload: &ChartPayload) -> Result<String> {
    let options: String = payload
        .datasets
        .iter()
        .map(|series| {
            let isin = escape_html(&series.label);
            format!("    <option value=\"{0}\">{0}</option>\n", isin)
        })
        .collect();

    let json = serde_json::to_string(payload).context("Failed to serialize chart payload")?;

    Ok(PAGE_TEMPLATE
        .replace("%CHART_JS%", CHART_JS_CDN)
        .replace("%OPTIONS%", &options)
        .replace("%PAYLOAD%", &script_safe_json(&json)))
}

/// `<` never appears raw inside the inline script, so data cannot close it
fn script_safe_json(json: &str) -> String {
    json.replace('<', "\\u003c")
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::chart::{ChartPoint, Series};

    fn payload_with(label: &str) -> ChartPayload {
        ChartPayload {
            labels: vec!["2025-06-01".to_string()],
            datasets: vec![Series {
                label: label.to_string(),
                data: vec![ChartPoint {
                    x: "2025-06-01".to_string(),
                    y: 1234.56,
                }],
                border_color: "#12ab34".to_string(),
                hidden: false,
                tension: 0.1,
                fill: false,
            }],
        }
    }

    #[test]
    fn page_lists_each_series_in_the_selector() {
        let html = render_page(&payload_with("UA4000234223")).unwrap();
        assert!(html.contains(r#"<option value="all">Всі</option>"#));
        assert!(html.contains(r#"<option value="UA4000234223">UA4000234223</option>"#));
        assert!(html.contains(CHART_JS_CDN));
        assert!(html.contains("\"borderColor\":\"#12ab34\""));
        assert!(!html.contains("%PAYLOAD%"));
    }

    #[test]
    fn empty_payload_still_renders() {
        let html = render_page(&ChartPayload {
            labels: vec![],
            datasets: vec![],
        })
        .unwrap();
        assert!(html.contains(r#"const payload = {"labels":[],"datasets":[]};"#));
    }

    #[test]
    fn markup_in_labels_is_neutralized() {
        let html = render_page(&payload_with("</script><b>x")).unwrap();
        assert!(html.contains("&lt;/script&gt;&lt;b&gt;x"));
        assert!(html.contains("\\u003c/script>\\u003cb>x"));
        assert_eq!(html.matches("</script>").count(), 2);
    }
}
