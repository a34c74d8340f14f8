//! Report Rendering
//!
//! Turns a `SimulationReport` into console text or JSON. Charting is left to
//! whoever consumes the JSON (paths plus the reference line are included when
//! requested).

use serde::{Deserialize, Serialize};

use crate::application::SimulationReport;

/// Output format for reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Text,
    Json,
}

/// Render a report in the requested format
pub fn render(report: &SimulationReport, format: ReportFormat) -> serde_json::Result<String> {
    match format {
        ReportFormat::Json => serde_json::to_string_pretty(report),
        ReportFormat::Text => Ok(render_text(report)),
    }
}

fn render_text(report: &SimulationReport) -> String {
    let req = &report.request;
    let s = &report.summary;
    let mut out = String::new();

    out.push_str(&format!("Monte Carlo Simulation - {}\n", report.symbol));
    out.push_str(&format!(
        "  Paths: {} | Horizon: {} steps | Seed: {}\n",
        req.path_count, req.horizon_steps, report.seed
    ));
    out.push_str(&format!(
        "  Drift: {:.6} | Volatility: {:.6} | Returns: {}\n",
        report.statistics.drift, report.statistics.volatility, report.statistics.sample_size
    ));
    out.push_str(&format!("  Current Price: ${:.2}\n", req.last_price));
    out.push_str("\nMonte Carlo Metrics\n");
    out.push_str(&format!("  Value at Risk (95% confidence level): ${:.2}\n", s.var_95));
    out.push_str(&format!("  Expected Price: ${:.2}\n", s.expected_price));
    out.push_str(&format!(
        "  Predicted Range (95% CI): ${:.2} to ${:.2}\n",
        s.ci_low_95, s.ci_high_95
    ));
    out.push_str(&format!(
        "  Downside at 95%: ${:.2}\n",
        s.downside_from(req.last_price)
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::MonteCarloService;
    use crate::engine::SimulationConfig;
    use crate::ports::StaticPriceSource;

    fn report(include_paths: bool) -> SimulationReport {
        let source = StaticPriceSource::new().with_closes("TEST", &[100.0, 102.0, 101.0, 105.0]);
        let config = SimulationConfig::default().with_paths(20).with_horizon(5).with_seed(1);
        MonteCarloService::new(source, config)
            .unwrap()
            .with_paths_in_report(include_paths)
            .run("TEST")
            .unwrap()
    }

    #[test]
    fn test_text_report_contains_metrics() {
        let text = render(&report(false), ReportFormat::Text).unwrap();
        assert!(text.contains("Monte Carlo Simulation - TEST"));
        assert!(text.contains("Value at Risk (95% confidence level)"));
        assert!(text.contains("Predicted Range (95% CI)"));
        assert!(text.contains("Current Price: $105.00"));
    }

    #[test]
    fn test_json_report_roundtrips_fields() {
        let json = render(&report(true), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["symbol"], "TEST");
        assert_eq!(value["seed"], 1);
        assert_eq!(value["request"]["path_count"], 20);
        assert_eq!(value["paths"].as_array().unwrap().len(), 20);
        assert_eq!(value["paths"][0].as_array().unwrap().len(), 6);
        assert_eq!(value["reference_line"]["start"][1], 105.0);
    }

    #[test]
    fn test_json_report_omits_paths_by_default() {
        let json = render(&report(false), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.get("paths").is_none());
    }
}
