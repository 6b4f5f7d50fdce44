use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("{context}: {source}")]
    Io {
        context: &'static str,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse telemetry JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Default, Serialize)]
pub struct TelemetrySummary {
    pub search: SearchTelemetrySummary,
    pub games_logged: usize,
}

#[derive(Debug, Default, Serialize)]
pub struct SearchTelemetrySummary {
    pub count: usize,
    pub avg_iterations: Option<f64>,
    pub avg_elapsed_ms: Option<f64>,
    pub avg_legal_moves: Option<f64>,
    pub avg_tree_nodes: Option<f64>,
    /// Share of searches whose target was extended.
    pub extended_rate: Option<f64>,
}

#[derive(Debug)]
struct Average {
    sum: f64,
    count: usize,
}

impl Average {
    fn new() -> Self {
        Self { sum: 0.0, count: 0 }
    }

    fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    fn mean(&self) -> Option<f64> {
        if self.count == 0 {
            None
        } else {
            Some(self.sum / self.count as f64)
        }
    }
}

/// Aggregate the search and game events of one run.
pub fn summarise_telemetry(path: &Path) -> Result<TelemetrySummary, TelemetryError> {
    if !path.exists() {
        return Ok(TelemetrySummary::default());
    }

    let file = File::open(path).map_err(|source| TelemetryError::Io {
        context: "opening telemetry log",
        source,
    })?;
    let reader = BufReader::new(file);

    let mut summary = TelemetrySummary::default();
    let mut iterations = Average::new();
    let mut elapsed = Average::new();
    let mut legal = Average::new();
    let mut nodes = Average::new();
    let mut extended = Average::new();

    for line in reader.lines() {
        let line = line.map_err(|source| TelemetryError::Io {
            context: "reading telemetry line",
            source,
        })?;
        if line.trim().is_empty() {
            continue;
        }

        let payload: Value = serde_json::from_str(&line)?;
        let target = payload
            .get("target")
            .and_then(Value::as_str)
            .unwrap_or_default();
        let Some(fields) = payload.get("fields").and_then(Value::as_object) else {
            continue;
        };

        match target {
            "fox_bot::search" => {
                // Warnings share the target but carry no counters.
                let Some(count) = fields.get("iterations").and_then(Value::as_f64) else {
                    continue;
                };
                summary.search.count += 1;
                iterations.add(count);
                if let Some(ms) = fields.get("elapsed_ms").and_then(Value::as_f64) {
                    elapsed.add(ms);
                }
                if let Some(count) = fields.get("legal_count").and_then(Value::as_f64) {
                    legal.add(count);
                }
                if let Some(count) = fields.get("nodes").and_then(Value::as_f64) {
                    nodes.add(count);
                }
                if let Some(flag) = fields.get("extended").and_then(Value::as_bool) {
                    extended.add(if flag { 1.0 } else { 0.0 });
                }
            }
            "fox_bench::game" if fields.contains_key("p0_points") => {
                summary.games_logged += 1;
            }
            _ => {}
        }
    }

    summary.search.avg_iterations = iterations.mean();
    summary.search.avg_elapsed_ms = elapsed.mean();
    summary.search.avg_legal_moves = legal.mean();
    summary.search.avg_tree_nodes = nodes.mean();
    summary.search.extended_rate = extended.mean();

    Ok(summary)
}

pub fn write_summary_outputs(
    telemetry_path: &Path,
    output_dir: &Path,
) -> Result<Option<TelemetryOutputs>, TelemetryError> {
    if !telemetry_path.exists() {
        return Ok(None);
    }

    let summary = summarise_telemetry(telemetry_path)?;
    let json_path = output_dir.join("telemetry_summary.json");

    std::fs::write(&json_path, serde_json::to_vec_pretty(&summary)?).map_err(|source| {
        TelemetryError::Io {
            context: "writing telemetry summary json",
            source,
        }
    })?;

    Ok(Some(TelemetryOutputs { summary, json_path }))
}

pub fn append_highlights_to_markdown(
    summary_path: &Path,
    outputs: &TelemetryOutputs,
) -> Result<(), TelemetryError> {
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(summary_path)
        .map_err(|source| TelemetryError::Io {
            context: "opening summary markdown for telemetry append",
            source,
        })?;

    let search = &outputs.summary.search;
    let mut section = String::new();
    section.push_str("\n## Search Telemetry\n");
    section.push_str(&format!("- Searches logged: {}\n", search.count));
    section.push_str(&format!("- Games logged: {}\n", outputs.summary.games_logged));
    if let Some(value) = search.avg_iterations {
        section.push_str(&format!("- Avg iterations: {value:.1}\n"));
    }
    if let Some(value) = search.avg_elapsed_ms {
        section.push_str(&format!("- Avg search time: {value:.1} ms\n"));
    }
    if let Some(value) = search.avg_legal_moves {
        section.push_str(&format!("- Avg legal moves: {value:.2}\n"));
    }
    if let Some(value) = search.avg_tree_nodes {
        section.push_str(&format!("- Avg tree nodes: {value:.0}\n"));
    }
    if let Some(value) = search.extended_rate {
        section.push_str(&format!("- Extended searches: {:.1}%\n", value * 100.0));
    }

    write!(file, "{section}").map_err(|source| TelemetryError::Io {
        context: "writing telemetry highlights",
        source,
    })?;

    Ok(())
}

#[derive(Debug)]
pub struct TelemetryOutputs {
    pub summary: TelemetrySummary,
    pub json_path: PathBuf,
}
