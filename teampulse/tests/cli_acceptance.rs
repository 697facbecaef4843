use std::ffi::OsString;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

struct CliTestEnv {
    _temp_dir: TempDir,
    home: PathBuf,
    xdg_config: PathBuf,
    xdg_state: PathBuf,
}

impl CliTestEnv {
    /// Isolated HOME and XDG dirs with no config file, so the sample team is used.
    fn new() -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let base = temp_dir.path().to_path_buf();
        let home = base.join("home");
        let xdg_config = base.join("xdg-config");
        let xdg_state = base.join("xdg-state");

        fs::create_dir_all(&home).expect("failed to create HOME");
        fs::create_dir_all(&xdg_config).expect("failed to create XDG_CONFIG_HOME");
        fs::create_dir_all(&xdg_state).expect("failed to create XDG_STATE_HOME");

        Self {
            _temp_dir: temp_dir,
            home,
            xdg_config,
            xdg_state,
        }
    }

    fn write_config(&self, content: &str) {
        let dir = self.xdg_config.join("teampulse");
        fs::create_dir_all(&dir).expect("failed to create config dir");
        fs::write(dir.join("config.toml"), content).expect("failed to write config");
    }
}

fn run(env: &CliTestEnv, args: &[&str]) -> Output {
    let mut command = Command::new(PathBuf::from(assert_cmd::cargo::cargo_bin!("teampulse")));

    command
        .args(args)
        .env("HOME", &env.home)
        .env("XDG_CONFIG_HOME", &env.xdg_config)
        .env("XDG_STATE_HOME", &env.xdg_state)
        .env_remove("RUST_LOG")
        .output()
        .unwrap_or_else(|e| panic!("failed to execute teampulse: {e}"))
}

fn assert_success(args: &[&str], output: &Output) {
    if output.status.success() {
        return;
    }

    let rendered_args = args
        .iter()
        .map(|arg| OsString::from(arg).to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ");
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    panic!(
        "teampulse {rendered_args} failed\nstatus: {}\nstdout:\n{}\nstderr:\n{}",
        output.status, stdout, stderr
    );
}

fn run_json(env: &CliTestEnv, args: &[&str]) -> serde_json::Value {
    let output = run(env, args);
    assert_success(args, &output);
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "expected JSON output, got error {e}:\n{}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn summary_text_reports_sample_team() {
    let env = CliTestEnv::new();
    let args = ["summary", "--period", "this_week"];

    let output = run(&env, &args);
    assert_success(&args, &output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Team Performance: This Week"), "got:\n{stdout}");
    assert!(stdout.contains("Revenue: $508,000"), "got:\n{stdout}");
    assert!(stdout.contains("TOP PERFORMERS"));
    assert!(stdout.contains("NEEDS ATTENTION"));
    assert!(stdout.contains("David Kim"));
}

#[test]
fn summary_json_honors_filters() {
    let env = CliTestEnv::new();
    let json = run_json(
        &env,
        &[
            "summary",
            "--employee",
            "emp-001",
            "--employee",
            "emp-004",
            "--format",
            "json",
        ],
    );

    let employees = json["employees"].as_array().expect("employees array");
    assert_eq!(employees.len(), 2);
    assert_eq!(json["totalTasksCompleted"], 15);
    assert_eq!(json["topPerformers"][0]["employeeId"], "emp-001");
    assert_eq!(json["needsAttention"][0]["employeeId"], "emp-004");
    assert_eq!(json["period"]["kind"], "this_month");

    let by_role = run_json(&env, &["summary", "--role", "Account Manager", "--format", "json"]);
    assert_eq!(by_role["employees"].as_array().map(Vec::len), Some(1));
    assert_eq!(by_role["employees"][0]["employeeName"], "Marcus Johnson");
}

#[test]
fn employee_lookup_and_unknown_id() {
    let env = CliTestEnv::new();
    let json = run_json(&env, &["employee", "emp-003", "--period", "last_month", "--format", "json"]);
    assert_eq!(json["employeeName"], "Priya Patel");
    assert_eq!(json["currentPeriod"]["tasksOverdue"], 1);
    assert_eq!(json["currentPeriod"]["trend"]["direction"], "down");

    let output = run(&env, &["employee", "emp-404"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("employee not found: emp-404"), "got:\n{stderr}");
}

#[test]
fn activity_respects_limit_and_order() {
    let env = CliTestEnv::new();
    let json = run_json(&env, &["activity", "--limit", "4", "--format", "json"]);

    let events = json.as_array().expect("events array");
    assert_eq!(events.len(), 4);
    let times: Vec<_> = events
        .iter()
        .map(|e| e["completedAt"].as_str().expect("completedAt").to_string())
        .collect();
    let mut sorted = times.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(times, sorted);

    let text = run(&env, &["activity", "--limit", "2"]);
    assert_success(&["activity", "--limit", "2"], &text);
    let stdout = String::from_utf8_lossy(&text.stdout);
    assert_eq!(stdout.lines().count(), 2);
    assert!(stdout.contains("Sarah Chen"));
}

#[test]
fn sync_acknowledges() {
    let env = CliTestEnv::new();
    let json = run_json(&env, &["sync", "--format", "json"]);
    assert_eq!(json["synced"], true);
    assert!(json["timestamp"].is_string());
}

#[test]
fn partial_credentials_fall_back_to_sample_team() {
    let env = CliTestEnv::new();
    env.write_config(
        r#"
[provider]
workspace_id = "1200000000000"

[logging]
level = "debug"
"#,
    );

    let json = run_json(&env, &["summary", "--format", "json"]);
    assert_eq!(json["employees"].as_array().map(Vec::len), Some(5));
    assert!(env.xdg_state.join("teampulse").exists());
}

#[test]
fn configured_but_unusable_tracker_is_reported() {
    let env = CliTestEnv::new();
    env.write_config(
        r#"
[provider]
access_token = "pat-123"
workspace_id = "1200000000000"
timeout_secs = 0
"#,
    );

    let output = run(&env, &["summary", "--format", "json"]);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty(), "sample data must not be printed");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to build team summary"), "got:\n{stderr}");
    assert!(stderr.contains("timeout_secs"), "got:\n{stderr}");
}

#[test]
fn unknown_log_level_is_rejected() {
    let env = CliTestEnv::new();
    env.write_config("[logging]\nlevel = \"verbose\"\n");

    let output = run(&env, &["sync"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to initialize logging"), "got:\n{stderr}");
    assert!(stderr.contains("logging.level"), "got:\n{stderr}");
}

#[test]
fn invalid_config_fails_with_context() {
    let env = CliTestEnv::new();
    env.write_config("[provider\naccess_token = ");

    let output = run(&env, &["sync"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to load configuration"), "got:\n{stderr}");
}
