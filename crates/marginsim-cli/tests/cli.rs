use std::fs;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

const QUOTE_TEXT: &str = "\
Name\tQuantity\tCost\tPrice\tMarkup\tTax\tDiscount\tTotal
Labour - Dave\t6.00\t$58.00\t$95.00\t63.79%\t15%\t0%\t$570.00
33006820 Wall cap 80mm PVC GY EWC80 Ezyduct\t1.00\t$9.68\t$18.17\t88.10%\t15%\t0%\t$18.17
FTXV50U\t1.00\t$1,352.00\t$1,690.00\t25.00%\t15%\t0%\t$1,690.00
Subtotal $2,278.17
";

fn marginsim() -> Command {
    Command::cargo_bin("marginsim").unwrap()
}

#[test]
fn parse_text_file_to_json() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("quote.txt");
    fs::write(&input, QUOTE_TEXT).unwrap();

    marginsim()
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"text\""))
        .stdout(predicate::str::contains("Labour - Dave"))
        .stdout(predicate::str::contains("33006820 Wall cap 80mm PVC GY EWC80 Ezyduct"))
        .stdout(predicate::str::contains("\"is_high_value\": true"));
}

#[test]
fn parse_stdin_to_csv() {
    marginsim()
        .args(["parse", "-", "--format", "csv"])
        .write_stdin(QUOTE_TEXT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("id,name,category"))
        .stdout(predicate::str::contains("1,Labour - Dave,labour,6.00,58.00,95.00,63.79"))
        .stdout(predicate::str::contains("FTXV50U"));
}

#[test]
fn parse_unreadable_text_fails() {
    marginsim()
        .args(["parse", "-", "--input-format", "text"])
        .write_stdin("see attached drawings\nthanks\n")
        .assert()
        .failure()
        .stderr(predicate::str::contains("could not parse any line items"));
}

#[test]
fn parse_unreadable_text_falls_back_to_sample() {
    marginsim()
        .args(["parse", "-", "--fallback-sample"])
        .write_stdin("see attached drawings\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"sample\""))
        .stdout(predicate::str::contains("FTXV50U"));
}

#[test]
fn parse_json_file() {
    let dir = tempdir().unwrap();
    let input = dir.path().join("quote.json");
    fs::write(
        &input,
        r#"{"lineItems": [{"id": "1", "name": "Labour - Dave", "type": "labour",
            "quantity": 6, "cost": 58, "price": 95}], "gstRate": 0.15}"#,
    )
    .unwrap();

    marginsim()
        .arg("parse")
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"source\": \"json\""))
        .stdout(predicate::str::contains("\"category\": \"labour\""));
}

#[test]
fn simulate_sample_text_report() {
    marginsim()
        .args(["simulate", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Breakdown:"))
        .stdout(predicate::str::contains("Big-ticket"))
        .stdout(predicate::str::contains("Gross profit:"));
}

#[test]
fn simulate_override_above_cap_warns() {
    marginsim()
        .args(["simulate", "--sample", "--override", "13=30", "--format", "json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"warnings\""))
        .stdout(predicate::str::contains("\"max_markup_percent\""));
}

#[test]
fn simulate_rejects_bad_override() {
    marginsim()
        .args(["simulate", "--sample", "--override", "13"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected ID=PCT"));
}

#[test]
fn batch_writes_summary() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("a.txt"), QUOTE_TEXT).unwrap();
    fs::write(dir.path().join("b.txt"), "nothing to see here\n").unwrap();
    let out = dir.path().join("out");
    let pattern = dir.path().join("*.txt");

    marginsim()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .arg("--output-dir")
        .arg(&out)
        .args(["--summary", "--continue-on-error"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1 successful, 1 failed"));

    assert!(out.join("a.json").exists());
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.starts_with("filename,status,items"));
    assert!(summary.contains("a.txt,success,3,1"));
    assert!(summary.contains("b.txt,error"));
}

#[test]
fn batch_stops_on_first_error() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.txt"), "nothing to see here\n").unwrap();
    let pattern = dir.path().join("*.txt");

    marginsim()
        .arg("batch")
        .arg(pattern.to_str().unwrap())
        .assert()
        .failure()
        .stderr(predicate::str::contains("Processing failed"));
}

#[test]
fn config_init_set_get() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");

    marginsim()
        .arg("-c")
        .arg(&config)
        .args(["config", "init"])
        .assert()
        .success();
    assert!(config.exists());

    marginsim()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "pricing.labour_margin_percent", "70"])
        .assert()
        .success();

    marginsim()
        .arg("-c")
        .arg(&config)
        .args(["config", "get", "pricing.labour_margin_percent"])
        .assert()
        .success()
        .stdout(predicate::str::contains("70"));

    marginsim()
        .arg("-c")
        .arg(&config)
        .args(["config", "set", "pricing.no_such_key", "1"])
        .assert()
        .failure();
}

#[test]
fn simulate_uses_config_margins() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(
        &config,
        r#"{"pricing": {"labour_margin_percent": "50", "material_margin_percent": "80"}}"#,
    )
    .unwrap();

    marginsim()
        .arg("-c")
        .arg(&config)
        .args(["simulate", "--sample"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Labour:    50%"))
        .stdout(predicate::str::contains("Materials: 80%"));
}

#[test]
fn simulate_needs_input_or_sample() {
    marginsim()
        .arg("simulate")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--sample"));

    marginsim()
        .args(["simulate", "-", "--sample"])
        .assert()
        .failure();
}

#[test]
fn simulate_stdin_quote() {
    marginsim()
        .args(["simulate", "-", "--labour", "50"])
        .write_stdin(QUOTE_TEXT)
        .assert()
        .success()
        .stdout(predicate::str::contains("Labour:    50.0%"))
        .stdout(predicate::str::contains("Wall cap"));
}

#[test]
fn simulate_clamps_huge_margin() {
    marginsim()
        .args(["simulate", "--sample", "--labour", "79228162514264337593543950335"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Labour:    150.0%"));
}

#[test]
fn simulate_rejects_gst_rate_above_one() {
    marginsim()
        .args(["simulate", "--sample", "--gst-rate", "15"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("between 0 and 1"));
}
