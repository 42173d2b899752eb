use std::fs;
use std::path::Path;

use picker_bench::config::BenchmarkConfig;
use picker_bench::simulation::{RunSummary, SimulationRunner};
use sha2::{Digest, Sha256};
use tempfile::tempdir;

const ARMS: usize = 3;
const COMPARISONS: usize = 30;

fn load_config(output_dir: &Path) -> BenchmarkConfig {
    let yaml = format!(
        r#"
run_id: "test_smoke"
population:
  seed: 4242
  items: 8
evaluator:
  noise: 1.0
  draw_threshold: 0.25
  skip_rate: 0.1
arms:
  - name: "hybrid"
  - name: "edelta"
    policy:
      mode: "edelta"
  - name: "thompson"
    policy:
      mode: "thompson"
comparisons: {COMPARISONS}
outputs:
  jsonl: "{jsonl}"
  summary_md: "{summary}"
metrics:
  baseline: "edelta"
logging:
  enable_structured: false
"#,
        jsonl = output_dir.join("comparisons.jsonl").display(),
        summary = output_dir.join("summary.md").display(),
    );

    let mut cfg: BenchmarkConfig = serde_yaml::from_str(&yaml).expect("valid yaml");
    cfg.validate().expect("config validates");
    cfg
}

fn run_once(dir: &Path) -> (RunSummary, String) {
    let config = load_config(dir);
    let outputs = config.resolved_outputs();
    let runner = SimulationRunner::new(config, outputs).expect("runner created");
    let summary = runner.run().expect("simulation completes");

    let jsonl = fs::read(&summary.jsonl_path).expect("jsonl readable");
    let mut hasher = Sha256::new();
    hasher.update(&jsonl);
    (summary, hex::encode(hasher.finalize()))
}

#[test]
fn simulation_smoke_test_is_reproducible() {
    let first_dir = tempdir().expect("temp dir");
    let second_dir = tempdir().expect("temp dir");

    let (summary, first_hash) = run_once(first_dir.path());
    let (_, second_hash) = run_once(second_dir.path());
    assert_eq!(first_hash, second_hash, "JSONL output differs between identical runs");

    assert_eq!(summary.arms, ARMS);
    assert_eq!(summary.rows_written, ARMS * COMPARISONS);
    assert!(summary.best_arm.is_some());

    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");
    let rows: Vec<serde_json::Value> = jsonl
        .lines()
        .map(|line| serde_json::from_str(line).expect("row decodes to JSON"))
        .collect();
    assert_eq!(rows.len(), ARMS * COMPARISONS);
    assert_eq!(rows[0]["arm"], "hybrid");
    assert_eq!(rows[COMPARISONS]["arm"], "edelta");
    assert_eq!(rows[2 * COMPARISONS]["arm"], "thompson");
    for row in &rows {
        assert_eq!(row["run_id"], "test_smoke");
        assert_ne!(row["left"], row["right"]);
        assert!(row["edelta"].as_f64().expect("edelta is numeric") >= 0.0);
    }
    for row in &rows[COMPARISONS..2 * COMPARISONS] {
        assert_eq!(row["source"], "exhaustive");
    }
    for row in &rows[2 * COMPARISONS..] {
        assert_eq!(row["source"], "thompson");
    }

    let markdown = fs::read_to_string(&summary.summary_path).expect("summary readable");
    assert!(markdown.contains("| edelta | edelta |"));
    assert!(markdown.contains("## Leaderboard"));
}

#[test]
fn mean_sigma_never_grows_within_an_arm() {
    let dir = tempdir().expect("temp dir");
    let (summary, _) = run_once(dir.path());
    let jsonl = fs::read_to_string(&summary.jsonl_path).expect("jsonl readable");

    let mut previous: Option<(String, f64)> = None;
    for line in jsonl.lines() {
        let row: serde_json::Value = serde_json::from_str(line).expect("row decodes");
        let arm = row["arm"].as_str().expect("arm name").to_string();
        let sigma = row["mean_sigma"].as_f64().expect("mean sigma");
        if let Some((prev_arm, prev_sigma)) = previous.as_ref() {
            if *prev_arm == arm {
                assert!(sigma <= *prev_sigma + 1e-12, "{arm}: {sigma} > {prev_sigma}");
            }
        }
        previous = Some((arm, sigma));
    }
}
