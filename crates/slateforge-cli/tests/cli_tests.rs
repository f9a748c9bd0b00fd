use std::fs::File;
use std::io::Write;
use std::path::PathBuf;
use std::process::Command;
use tempfile::TempDir;

fn binary() -> &'static str {
    env!("CARGO_BIN_EXE_slateforge")
}

struct TestContext {
    _dir: TempDir,
    csv_path: PathBuf,
}

impl TestContext {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("temp dir");
        let csv_path = dir.path().join("pool.csv");

        let mut file = File::create(&csv_path).unwrap();
        writeln!(file, "player,pos,salary,proj").unwrap();
        let specs = [("QB", 8), ("RB", 12), ("WR", 14), ("TE", 8), ("DST", 6)];
        for (pos, n) in specs {
            for i in 0..n {
                let salary = 3000 + ((i * 457) % 4500) as u32;
                let points = salary as f32 / 400.0 + ((i * 7) % 5) as f32;
                writeln!(file, "{pos}{i},{pos},{salary},{points:.2}").unwrap();
            }
        }

        Self {
            _dir: dir,
            csv_path,
        }
    }

    fn csv(&self) -> &str {
        self.csv_path.to_str().unwrap()
    }
}

#[test]
fn optimize_succeeds_on_a_feasible_pool() {
    let ctx = TestContext::new();
    let output_path = ctx.csv_path.with_file_name("result.json");

    let output = Command::new(binary())
        .args([
            "optimize",
            "--csv",
            ctx.csv(),
            "--seed",
            "7",
            "--population-size",
            "200",
            "--n-generations",
            "5",
            "--posfilter",
            "",
            "--pool-thresh",
            "0",
            "--output",
            output_path.to_str().unwrap(),
        ])
        .output()
        .expect("run optimize");

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let result: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output_path).unwrap()).unwrap();
    assert!(result["best_score"].as_f64().unwrap() > 0.0);
    assert_eq!(result["best_lineup"].as_array().unwrap().len(), 9);
}

#[test]
fn identical_seeds_produce_identical_results() {
    let ctx = TestContext::new();
    let out_a = ctx.csv_path.with_file_name("a.json");
    let out_b = ctx.csv_path.with_file_name("b.json");

    for out in [&out_a, &out_b] {
        let status = Command::new(binary())
            .args([
                "optimize",
                "--csv",
                ctx.csv(),
                "--seed",
                "12345",
                "--population-size",
                "150",
                "--n-generations",
                "4",
                "--posfilter",
                "",
                "--pool-thresh",
                "0",
                "--output",
                out.to_str().unwrap(),
            ])
            .status()
            .expect("run optimize");
        assert!(status.success());
    }

    let a: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_a).unwrap()).unwrap();
    let b: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&out_b).unwrap()).unwrap();
    assert_eq!(a["best_lineup"], b["best_lineup"]);
    assert_eq!(a["fitness"], b["fitness"]);
}

#[test]
fn invalid_configuration_exits_nonzero() {
    let ctx = TestContext::new();

    let output = Command::new(binary())
        .args([
            "optimize",
            "--csv",
            ctx.csv(),
            "--elite-divisor",
            "0",
        ])
        .output()
        .expect("run optimize");

    assert!(!output.status.success());
}

#[test]
fn infeasible_cap_exits_nonzero() {
    let ctx = TestContext::new();

    let output = Command::new(binary())
        .args([
            "optimize",
            "--csv",
            ctx.csv(),
            "--salary-cap",
            "100",
            "--posfilter",
            "",
            "--pool-thresh",
            "0",
            "--population-size",
            "50",
            "--n-generations",
            "2",
        ])
        .output()
        .expect("run optimize");

    assert!(!output.status.success());
}

#[test]
fn validate_reports_feasibility() {
    let ctx = TestContext::new();

    let feasible = Command::new(binary())
        .args([
            "validate",
            "--csv",
            ctx.csv(),
            "--posfilter",
            "",
            "--pool-thresh",
            "0",
        ])
        .status()
        .expect("run validate");
    assert!(feasible.success());

    let infeasible = Command::new(binary())
        .args([
            "validate",
            "--csv",
            ctx.csv(),
            "--salary-cap",
            "100",
            "--posfilter",
            "",
            "--pool-thresh",
            "0",
        ])
        .status()
        .expect("run validate");
    assert!(!infeasible.success());
}

#[test]
fn missing_column_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let csv_path = dir.path().join("bad.csv");
    let mut file = File::create(&csv_path).unwrap();
    writeln!(file, "player,salary,proj").unwrap();
    writeln!(file, "a,5000,10.0").unwrap();

    let output = Command::new(binary())
        .args(["optimize", "--csv", csv_path.to_str().unwrap()])
        .output()
        .expect("run optimize");

    assert!(!output.status.success());
}
