use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Helper function to create a temporary directory for CLI tests
fn create_cli_test_environment() -> TempDir {
    TempDir::new().expect("Failed to create temporary directory")
}

/// Helper function to create a Command with --no-color and a fixed date
fn glow_cmd(db_arg: &str) -> Command {
    let mut cmd = Command::cargo_bin("glow").expect("Failed to find glow binary");
    cmd.args(["--no-color", "--date", "2024-01-01", "--database-file", db_arg]);
    cmd
}

/// Adds a step and returns its ID as printed by the CLI.
fn add_step(db_arg: &str, extra: &[&str]) -> String {
    let output = glow_cmd(db_arg)
        .args(["step", "add"])
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let output_str = String::from_utf8(output).expect("Invalid UTF-8");
    extract_id_from_output(&output_str)
}

#[test]
fn test_cli_add_step() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    glow_cmd(db_path.to_str().unwrap())
        .args([
            "step",
            "add",
            "Cleanser",
            "--time",
            "morning",
            "--category",
            "cleanser",
            "--product",
            "Gentle foam",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("Created step with ID: 1"))
        .stdout(predicate::str::contains("### 1. Cleanser (☀ Morning)"))
        .stdout(predicate::str::contains("- Schedule: Every day"))
        .stdout(predicate::str::contains("- Product: Gentle foam"));
}

#[test]
fn test_cli_add_step_with_schedules() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    glow_cmd(db_arg)
        .args(["step", "add", "Exfoliant", "-t", "evening", "--days", "tue,fri"])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Schedule: Tue, Fri"));

    glow_cmd(db_arg)
        .args([
            "step",
            "add",
            "Retinoid",
            "-t",
            "evening",
            "--cycle",
            "4",
            "--cycle-days",
            "1,2",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- Schedule: Days 1, 2 of a 4-day cycle starting 2024-01-01",
        ));

    glow_cmd(db_arg)
        .args(["step", "add", "Peel", "-t", "evening", "--every", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "- Schedule: Every 3 days from 2024-01-01",
        ));
}

#[test]
fn test_cli_rejects_conflicting_schedules() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    glow_cmd(db_path.to_str().unwrap())
        .args([
            "step", "add", "Mask", "-t", "evening", "--days", "sun", "--every", "2",
        ])
        .assert()
        .failure();
}

#[test]
fn test_cli_empty_routine() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    glow_cmd(db_arg)
        .args(["step", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No steps in this routine."));

    // No subcommand shows today
    glow_cmd(db_arg)
        .assert()
        .success()
        .stdout(predicate::str::contains("# Mon 2024-01-01"))
        .stdout(predicate::str::contains("Nothing scheduled."));
}

#[test]
fn test_cli_today_done_and_skip() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let cleanser = add_step(db_arg, &["Cleanser", "-t", "morning", "-p", "Gel"]);
    let spf = add_step(db_arg, &["SPF", "-t", "morning"]);

    glow_cmd(db_arg)
        .args(["done", &cleanser])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "✓ Done 'Cleanser' on 2024-01-01 with Gel",
        ));

    glow_cmd(db_arg)
        .args(["skip", &spf])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipped 'SPF' on 2024-01-01"));

    glow_cmd(db_arg)
        .args(["today", "--time", "morning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("# Mon 2024-01-01 · ☀ Morning"))
        .stdout(predicate::str::contains(format!("- [x] {cleanser}. Cleanser (Gel)")))
        .stdout(predicate::str::contains(format!("- [-] {spf}. SPF")))
        .stdout(predicate::str::contains("Progress: 1/2 done (50%)"));

    // Toggling again clears the day
    glow_cmd(db_arg)
        .args(["done", &cleanser])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cleared 'Cleanser' on 2024-01-01"));

    glow_cmd(db_arg)
        .args(["progress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Progress on 2024-01-01: 0/2 done (0%)"));
}

#[test]
fn test_cli_finish_routine() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let cleanser = add_step(db_arg, &["Cleanser", "-t", "morning"]);
    add_step(db_arg, &["Toner", "-t", "morning"]);
    add_step(db_arg, &["Night cream", "-t", "evening"]);

    glow_cmd(db_arg).args(["done", &cleanser]).assert().success();

    glow_cmd(db_arg)
        .args(["finish", "--time", "morning"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Finished morning routine for 2024-01-01; skipped 1 step",
        ));

    // Finishing again writes nothing new
    glow_cmd(db_arg)
        .args(["finish", "--time", "morning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("nothing left to skip"));
}

#[test]
fn test_cli_upcoming() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    add_step(db_arg, &["Peel", "-t", "evening", "--every", "2"]);

    glow_cmd(db_arg)
        .args(["upcoming", "--days", "3"])
        .assert()
        .success()
        .stdout(predicate::str::contains("## Mon 2024-01-01\n\n- 1. Peel (evening)"))
        .stdout(predicate::str::contains("## Tue 2024-01-02\n\nRest day."))
        .stdout(predicate::str::contains("## Wed 2024-01-03\n\n- 1. Peel (evening)"));
}

#[test]
fn test_cli_update_and_remove_step() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let id = add_step(db_arg, &["Cleanser", "-t", "morning"]);

    glow_cmd(db_arg)
        .args(["step", "update", &id, "--name", "Oil cleanser", "-t", "both"])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Updated step with ID: {id}")))
        .stdout(predicate::str::contains("- Renamed to 'Oil cleanser'"))
        .stdout(predicate::str::contains("- Moved to both"));

    glow_cmd(db_arg)
        .args(["step", "update", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Nothing to update"));

    glow_cmd(db_arg)
        .args(["step", "remove", &id])
        .assert()
        .success()
        .stdout(predicate::str::contains(format!(
            "Deleted step 'Oil cleanser' (ID: {id})"
        )));

    glow_cmd(db_arg)
        .args(["step", "show", &id])
        .assert()
        .failure()
        .stderr(predicate::str::contains(format!(
            "Step with ID {id} not found"
        )));
}

#[test]
fn test_cli_show_next_due() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let daily = add_step(db_arg, &["Cleanser", "-t", "morning"]);
    let weekly = add_step(db_arg, &["Exfoliant", "-t", "evening", "--days", "tue,fri"]);

    glow_cmd(db_arg)
        .args(["step", "show", &daily])
        .assert()
        .success()
        .stdout(predicate::str::contains("Next due: 2024-01-01"));

    // 2024-01-01 is a Monday.
    glow_cmd(db_arg)
        .args(["step", "show", &weekly])
        .assert()
        .success()
        .stdout(predicate::str::contains("- Schedule: Tue, Fri"))
        .stdout(predicate::str::contains("Next due: 2024-01-02"));
}

#[test]
fn test_cli_reorder_keeps_other_bucket() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let cleanser = add_step(db_arg, &["Cleanser", "-t", "morning"]);
    let serum = add_step(db_arg, &["Serum", "-t", "morning"]);
    let oil = add_step(db_arg, &["Oil", "-t", "evening"]);
    let retinol = add_step(db_arg, &["Retinol", "-t", "evening"]);

    glow_cmd(db_arg)
        .args(["step", "reorder", &serum, &cleanser])
        .assert()
        .success();
    glow_cmd(db_arg)
        .args(["step", "reorder", &retinol, &oil])
        .assert()
        .success();

    let output = glow_cmd(db_arg)
        .args(["today", "--time", "morning"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let output_str = String::from_utf8(output).expect("Invalid UTF-8");

    let serum_at = output_str.find("Serum").expect("Serum listed");
    let cleanser_at = output_str.find("Cleanser").expect("Cleanser listed");
    assert!(serum_at < cleanser_at, "unexpected order:\n{output_str}");
}

#[test]
fn test_cli_reorder_persists() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let first = add_step(db_arg, &["Cleanser", "-t", "morning"]);
    let second = add_step(db_arg, &["Serum", "-t", "morning"]);

    glow_cmd(db_arg)
        .args(["step", "reorder", &second, &first])
        .assert()
        .success();

    let output = glow_cmd(db_arg)
        .args(["step", "list"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let output_str = String::from_utf8(output).expect("Invalid UTF-8");

    let serum = output_str.find("Serum").expect("Serum listed");
    let cleanser = output_str.find("Cleanser").expect("Cleanser listed");
    assert!(serum < cleanser, "unexpected order:\n{output_str}");
}

#[test]
fn test_cli_reorder_unknown_step() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    glow_cmd(db_path.to_str().unwrap())
        .args(["step", "reorder", "42"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Step with ID 42 not found"));
}

#[test]
fn test_cli_products_follow_steps() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    let output = glow_cmd(db_arg)
        .args(["product", "add", "Vitamin C serum"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Added product 'Vitamin C serum'"))
        .get_output()
        .stdout
        .clone();
    let output_str = String::from_utf8(output).expect("Invalid UTF-8");
    let product_id = extract_product_id(&output_str);

    glow_cmd(db_arg)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vitamin C serum (shelf)"));

    let step = add_step(
        db_arg,
        &["Serum", "-t", "morning", "--product-id", &product_id],
    );

    glow_cmd(db_arg)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vitamin C serum (active)"));

    glow_cmd(db_arg)
        .args(["step", "remove", &step])
        .assert()
        .success();

    glow_cmd(db_arg)
        .args(["product", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Vitamin C serum (shelf)"));
}

#[test]
fn test_cli_users_are_separate() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");
    let db_arg = db_path.to_str().unwrap();

    glow_cmd(db_arg)
        .args(["--user", "alice", "step", "add", "Cleanser", "-t", "morning"])
        .assert()
        .success();

    glow_cmd(db_arg)
        .args(["--user", "bob", "step", "list"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No steps in this routine."));
}

#[test]
fn test_cli_json_backend() {
    let temp_dir = create_cli_test_environment();
    let json_path = temp_dir.path().join("glowlog.json");
    let json_arg = json_path.to_str().unwrap();

    glow_cmd(json_arg)
        .args(["--backend", "json", "step", "add", "Toner", "-t", "morning"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Toner"));

    assert!(json_path.exists());

    glow_cmd(json_arg)
        .args(["--backend", "json", "today"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Toner"));
}

#[test]
fn test_cli_invalid_date() {
    let temp_dir = create_cli_test_environment();
    let db_path = temp_dir.path().join("cli_test.db");

    Command::cargo_bin("glow")
        .expect("Failed to find glow binary")
        .args([
            "--no-color",
            "--database-file",
            db_path.to_str().unwrap(),
            "--date",
            "2024-13-45",
            "today",
        ])
        .assert()
        .failure();
}

/// Helper function to extract the step ID from command output
fn extract_id_from_output(output: &str) -> String {
    if let Some(start) = output.find("ID: ") {
        let id_str = &output[start + 4..];
        if let Some(end) = id_str.find(|c: char| !c.is_numeric()) {
            return id_str[..end].to_string();
        }
    }

    panic!("Could not extract ID from output: {output}");
}

/// Helper function to extract a product ID from `product add` output
fn extract_product_id(output: &str) -> String {
    output
        .lines()
        .find_map(|line| line.trim().strip_prefix("- ID: "))
        .map(str::to_string)
        .unwrap_or_else(|| panic!("Could not extract product ID from output: {output}"))
}
