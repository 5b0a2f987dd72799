//! Tera templates for alert messages.
use std::collections::HashMap;
use tera::{Context, Tera};

use super::AlertKind;

const PROBLEM_TEMPLATE: &str = "\
PROBLEM DETECTED

Site: {{ site_url }}
Time: {{ timestamp }}
Error: {{ details }}
Consecutive errors: {{ consecutive_errors }}

Watching the situation.";

const CRITICAL_TEMPLATE: &str = "\
CRITICAL: site is still down

Site: {{ site_url }}
Time: {{ timestamp }}
Consecutive errors: {{ consecutive_errors }}
Last error: {{ details }}

Immediate attention required.";

const RECOVERED_TEMPLATE: &str = "\
Site recovered

Site: {{ site_url }}
Recovered at: {{ timestamp }}
Downtime: {{ downtime }}
Response time: {{ response_time }}
Status code: {{ status_code }}

The site is reachable again.";

/// Renders the alert message for `kind` from the given context map.
pub fn render_alert(
    kind: AlertKind,
    context: &HashMap<String, String>,
) -> Result<String, tera::Error> {
    let template = match kind {
        AlertKind::Problem => PROBLEM_TEMPLATE,
        AlertKind::Critical => CRITICAL_TEMPLATE,
        AlertKind::Recovered => RECOVERED_TEMPLATE,
    };

    let mut tera_context = Context::new();
    for (key, value) in context {
        tera_context.insert(key, value);
    }
    Tera::one_off(template, &tera_context, false)
}

/// Formats a duration in seconds as `H:MM:SS`, the shape the stats replies
/// use for uptime and downtime.
pub fn format_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours}:{minutes:02}:{seconds:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_render_problem_alert() {
        let ctx = context(&[
            ("site_url", "https://example.com/"),
            ("timestamp", "2026-08-24 10:00:00"),
            ("details", "HTTP error 503"),
            ("consecutive_errors", "1"),
        ]);

        let message = render_alert(AlertKind::Problem, &ctx).unwrap();
        assert!(message.starts_with("PROBLEM DETECTED"));
        assert!(message.contains("https://example.com/"));
        assert!(message.contains("HTTP error 503"));
    }

    #[test]
    fn test_render_recovered_alert() {
        let ctx = context(&[
            ("site_url", "https://example.com/"),
            ("timestamp", "2026-08-24 10:05:00"),
            ("downtime", "0:05:00"),
            ("response_time", "0.12s"),
            ("status_code", "200"),
        ]);

        let message = render_alert(AlertKind::Recovered, &ctx).unwrap();
        assert!(message.contains("Downtime: 0:05:00"));
        assert!(message.contains("Status code: 200"));
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00:00");
        assert_eq!(format_duration(65), "0:01:05");
        assert_eq!(format_duration(3 * 3600 + 120 + 7), "3:02:07");
        assert_eq!(format_duration(-5), "0:00:00");
    }
}
