use std::fs;

use fox_bench::config::BenchConfig;
use fox_bench::tournament::TournamentRunner;
use tempfile::tempdir;

fn load_config(output_dir: &std::path::Path) -> BenchConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
games:
  seed: 4242
  count: 2
agents:
  - name: "random"
    kind: "random"
  - name: "ismcts"
    kind: "ismcts"
    params:
      iterations: 40
      seed: 7
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "random"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("games.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn normalized_rows(jsonl: &str) -> Vec<serde_json::Value> {
    jsonl
        .lines()
        .map(|line| {
            let mut value: serde_json::Value =
                serde_json::from_str(line).expect("row decodes to JSON");
            if let Some(obj) = value.as_object_mut() {
                obj.remove("speed_ms_turn");
            }
            value
        })
        .collect()
}

#[test]
fn match_smoke_test_is_reproducible() {
    let first_dir = tempdir().expect("temp dir");
    let config = load_config(first_dir.path());
    let outputs = config.resolved_outputs();
    let summary = TournamentRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("run completes");

    assert_eq!(summary.games_played, 4);
    assert_eq!(summary.rows_written, 8);

    let rows = normalized_rows(&fs::read_to_string(&summary.jsonl_path).expect("jsonl readable"));
    assert_eq!(rows.len(), 8);
    for pair in rows.chunks(2) {
        let tricks = pair[0]["tricks"].as_u64().unwrap() + pair[1]["tricks"].as_u64().unwrap();
        assert_eq!(tricks, 13);
        assert_eq!(pair[0]["points"], pair[1]["opponent_points"]);
        assert_ne!(pair[0]["agent"], pair[1]["agent"]);
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary markdown");
    assert!(markdown.starts_with("# Match Summary"));
    assert!(markdown.contains("| ismcts | Ismcts | 4 |"));
    assert!(markdown.contains("| random | Random | 4 |"));

    let second_dir = tempdir().expect("temp dir");
    let config = load_config(second_dir.path());
    let outputs = config.resolved_outputs();
    let again = TournamentRunner::new(config, outputs)
        .expect("runner created")
        .run()
        .expect("run completes");
    let rerun = normalized_rows(&fs::read_to_string(&again.jsonl_path).expect("jsonl readable"));
    assert_eq!(rows, rerun);
}
