use std::path::PathBuf;
use std::process::{Command, Output};

use rusqlite::Connection;
use serde_json::Value;
use tempfile::TempDir;

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_estimator"))
}

/// Isolated config and data homes plus a database path inside them.
struct Workspace {
    _dir: TempDir,
    config_home: PathBuf,
    data_home: PathBuf,
    db_path: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp dir");
        let config_home = dir.path().join("config");
        let data_home = dir.path().join("data");
        std::fs::create_dir_all(&config_home).expect("create config dir");
        std::fs::create_dir_all(&data_home).expect("create data dir");
        let db_path = dir.path().join("estimates.db");
        Self {
            _dir: dir,
            config_home,
            data_home,
            db_path,
        }
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", &self.config_home)
            .env("XDG_DATA_HOME", &self.data_home)
            .env_remove("ESTIMATOR_DB")
            .env_remove("ESTIMATOR_USER")
            .env_remove("ESTIMATOR_EMAIL")
            .env_remove("ESTIMATOR_CONFIG")
            .env_remove("OPENAI_API_KEY");
        cmd
    }

    fn run(&self, args: &[&str]) -> Output {
        self.command()
            .args(args)
            .arg("--format")
            .arg("plain")
            .output()
            .expect("run estimator")
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "estimator {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    fn run_json(&self, args: &[&str]) -> Value {
        let output = self
            .command()
            .args(args)
            .arg("--json")
            .output()
            .expect("run estimator");
        assert!(
            output.status.success(),
            "estimator {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
    }

    fn config_path(&self) -> PathBuf {
        self.config_home.join("estimator").join("config.toml")
    }

    /// Init the database with a local user and one project, P-0001.
    fn init_with_project(&self) {
        self.run_ok(&[
            "init",
            self.db_path.to_str().expect("utf-8 path"),
            "--email",
            "estimator@example.com",
        ]);
        self.run_ok(&["project", "add", "--name", "Hall bath", "--type", "bathroom"]);
    }

    fn create_estimate(&self) -> String {
        let stdout = self.run_ok(&["estimate", "create", "P-0001", "--name", "Base bid"]);
        field(&stdout, "id").expect("estimate id")
    }
}

/// Value of a `key=value` line in plain output.
fn field(stdout: &str, key: &str) -> Option<String> {
    let prefix = format!("{}=", key);
    stdout
        .lines()
        .find_map(|line| line.strip_prefix(&prefix).map(|v| v.to_string()))
}

fn descriptions(detail: &Value) -> Vec<String> {
    detail["line_items"]
        .as_array()
        .expect("line_items array")
        .iter()
        .map(|item| item["description"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[test]
fn test_cli_init_writes_config_and_database() {
    let ws = Workspace::new();
    let stdout = ws.run_ok(&["init", ws.db_path.to_str().expect("utf-8 path")]);

    assert!(stdout.starts_with("status=ok"));
    assert!(ws.db_path.exists());
    assert!(ws.config_path().exists());
    assert_eq!(field(&stdout, "format").as_deref(), Some("0.2"));

    let config = std::fs::read_to_string(ws.config_path()).expect("read config");
    assert!(config.contains("[database]"));
    assert!(config.contains("[user]"));

    let conn = Connection::open(&ws.db_path).expect("open database");
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'estimate_line_items'",
            [],
            |row| row.get(0),
        )
        .expect("query schema");
    assert_eq!(tables, 1);
}

#[test]
fn test_cli_init_refuses_existing_database() {
    let ws = Workspace::new();
    ws.run_ok(&["init", ws.db_path.to_str().expect("utf-8 path")]);

    let output = ws.run(&["init", ws.db_path.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(4));
    assert!(String::from_utf8_lossy(&output.stderr).contains("already exists"));
}

#[test]
fn test_cli_estimate_from_template_and_item_totals() {
    let ws = Workspace::new();
    ws.init_with_project();

    let stdout = ws.run_ok(&[
        "estimate",
        "create",
        "P-0001",
        "--name",
        "Base bid",
        "--template",
        "bathroom",
    ]);
    assert_eq!(field(&stdout, "version").as_deref(), Some("1"));
    assert_eq!(field(&stdout, "line_items").as_deref(), Some("10"));
    let estimate_id = field(&stdout, "id").expect("estimate id");

    let stdout = ws.run_ok(&["item", "add", &estimate_id, "Vanity upgrade", "--value", "1250.50"]);
    assert_eq!(field(&stdout, "estimate_total").as_deref(), Some("1250.50"));
    let item_id = field(&stdout, "id").expect("item id");

    let stdout = ws.run_ok(&["item", "edit", &estimate_id, &item_id, "--value", "2000"]);
    assert_eq!(field(&stdout, "estimate_total").as_deref(), Some("2000.00"));

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(detail["line_item_count"], 11);
    assert_eq!(detail["estimate"]["total_price"], 2000.0);
    assert_eq!(detail["line_items_total"], 2000.0);
    assert_eq!(descriptions(&detail)[0], "Demolition");
    assert_eq!(descriptions(&detail)[10], "Vanity upgrade");
}

#[test]
fn test_cli_second_estimate_gets_next_version() {
    let ws = Workspace::new();
    ws.init_with_project();

    ws.create_estimate();
    let stdout = ws.run_ok(&["estimate", "create", "P-0001", "--name", "Revised"]);
    assert_eq!(field(&stdout, "version").as_deref(), Some("2"));

    let list = ws.run_json(&["estimate", "list", "--project", "P-0001"]);
    assert_eq!(list.as_array().map(|a| a.len()), Some(2));
}

#[test]
fn test_cli_move_and_delete_items() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let first = field(
        &ws.run_ok(&["item", "add", &estimate_id, "Framing", "--value", "100"]),
        "id",
    )
    .expect("first id");
    let second = field(
        &ws.run_ok(&["item", "add", &estimate_id, "Drywall", "--value", "50"]),
        "id",
    )
    .expect("second id");

    let stdout = ws.run_ok(&["item", "move", &estimate_id, &second, "up"]);
    assert_eq!(field(&stdout, "moved").as_deref(), Some("true"));
    assert_eq!(field(&stdout, "position").as_deref(), Some("1"));

    let stdout = ws.run_ok(&["item", "move", &estimate_id, &second, "up"]);
    assert_eq!(field(&stdout, "moved").as_deref(), Some("false"));

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(descriptions(&detail), vec!["Drywall", "Framing"]);

    let stdout = ws.run_ok(&["item", "delete", &estimate_id, &first, "--force"]);
    assert_eq!(field(&stdout, "estimate_total").as_deref(), Some("50.00"));

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(descriptions(&detail), vec!["Drywall"]);
    assert_eq!(detail["estimate"]["total_price"], 50.0);
}

#[test]
fn test_cli_reorder_items() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let mut ids = Vec::new();
    for name in ["Demo", "Rough-in", "Finish"] {
        let stdout = ws.run_ok(&["item", "add", &estimate_id, name]);
        ids.push(field(&stdout, "id").expect("item id"));
    }

    let stdout = ws.run_ok(&["item", "reorder", &estimate_id, &ids[2], &ids[0], &ids[1]]);
    assert_eq!(field(&stdout, "updated").as_deref(), Some("3"));

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(descriptions(&detail), vec!["Finish", "Demo", "Rough-in"]);
}

#[test]
fn test_cli_item_ids_accept_unique_prefix() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();
    let item_id = field(&ws.run_ok(&["item", "add", &estimate_id, "Paint"]), "id").expect("item id");

    ws.run_ok(&["item", "edit", &estimate_id[..8], &item_id[..8], "--description", "Paint walls"]);

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(descriptions(&detail), vec!["Paint walls"]);
}

#[test]
fn test_cli_unknown_estimate_exit_code() {
    let ws = Workspace::new();
    ws.init_with_project();

    let output = ws.run(&["estimate", "show", "00000000-0000-0000-0000-000000000000"]);
    assert_eq!(output.status.code(), Some(3));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not found"));
}

#[test]
fn test_cli_blank_description_exit_code() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let output = ws.run(&["item", "add", &estimate_id, "   ", "--value", "10"]);
    assert_eq!(output.status.code(), Some(4));

    let detail = ws.run_json(&["estimate", "show", &estimate_id]);
    assert_eq!(detail["line_item_count"], 0);
}

#[test]
fn test_cli_anonymous_mutation_exit_code() {
    let ws = Workspace::new();
    ws.init_with_project();

    let anonymous_config = ws.config_home.join("anonymous.toml");
    std::fs::write(
        &anonymous_config,
        format!("[database]\npath = \"{}\"\n", ws.db_path.display()),
    )
    .expect("write config");

    let output = ws
        .command()
        .args(["project", "add", "--name", "Garage", "--format", "plain"])
        .env("ESTIMATOR_CONFIG", &anonymous_config)
        .output()
        .expect("run estimator");
    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Not authenticated"));

    // Reads stay available without a user.
    let output = ws
        .command()
        .args(["project", "list", "--format", "plain"])
        .env("ESTIMATOR_CONFIG", &anonymous_config)
        .output()
        .expect("run estimator");
    assert!(output.status.success());
}

#[test]
fn test_cli_missing_database_exit_code() {
    let ws = Workspace::new();
    let missing = ws.data_home.join("nope.db");

    let output = ws.run(&["estimate", "list", "--db", missing.to_str().expect("utf-8 path")]);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("estimator init"));
}

#[test]
fn test_cli_unknown_template_is_rejected() {
    let ws = Workspace::new();
    ws.init_with_project();

    let output = ws.run(&[
        "estimate",
        "create",
        "P-0001",
        "--name",
        "Base bid",
        "--template",
        "treehouse",
    ]);
    assert_eq!(output.status.code(), Some(4));

    let list = ws.run_json(&["estimate", "list"]);
    assert_eq!(list.as_array().map(|a| a.len()), Some(0));
}

#[test]
fn test_cli_templates_listing() {
    let ws = Workspace::new();

    let stdout = ws.run_ok(&["templates"]);
    let first = stdout.lines().next().expect("template row");
    assert!(first.starts_with("bathroom\t"));
    assert!(stdout.lines().any(|line| line.starts_with("kitchen\t")));

    let value = ws.run_json(&["templates", "bathroom"]);
    assert_eq!(value["key"], "bathroom");
    assert_eq!(value["items"].as_array().map(|a| a.len()), Some(10));

    let output = ws.run(&["templates", "treehouse"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_check_reports_ok() {
    let ws = Workspace::new();
    ws.init_with_project();

    let stdout = ws.run_ok(&["check"]);
    assert!(stdout.contains("check=integrity ok"));
    assert!(stdout.contains("status=ok"));

    let value = ws.run_json(&["check"]);
    assert_eq!(value["status"], "ok");
}

#[test]
fn test_cli_json_mutation_output() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let item = ws.run_json(&["item", "add", &estimate_id, "Cabinets", "--value", "18500"]);
    assert_eq!(item["description"], "Cabinets");
    assert_eq!(item["total_price"], 18500.0);
    assert_eq!(item["quantity"], 1.0);

    let item_id = item["id"].as_str().expect("item id").to_string();
    let receipt = ws.run_json(&["item", "edit", &estimate_id, &item_id, "--value", "19000"]);
    assert_eq!(receipt["status"], "ok");
    assert_eq!(receipt["id"], item_id.as_str());
    assert_eq!(receipt["estimate_total"], "19000.00");
}

#[test]
fn test_cli_no_command_prints_quickstart() {
    let ws = Workspace::new();
    let stdout = ws.run_ok(&[]);
    assert!(stdout.contains("Estimator v"));
    assert!(stdout.contains("Quickstart"));
}

#[test]
fn test_cli_invalid_args_exit_code() {
    let output = Command::new(bin()).arg("item").arg("add").output().expect("run add");
    assert_eq!(output.status.code(), Some(2));
}


#[test]
fn test_cli_attach_list_and_delete_files() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let photo = ws.db_path.with_file_name("front.jpg");
    std::fs::write(&photo, [0u8; 2048]).expect("write photo");
    let stdout = ws.run_ok(&[
        "file",
        "attach",
        &estimate_id,
        photo.to_str().expect("utf-8 path"),
    ]);
    let file_id = field(&stdout, "id").expect("file id");
    assert_eq!(field(&stdout, "type").as_deref(), Some("image/jpeg"));
    assert_eq!(field(&stdout, "size").as_deref(), Some("2048"));
    let storage_path = field(&stdout, "storage_path").expect("storage path");
    assert!(storage_path.contains(&estimate_id));
    assert!(storage_path.ends_with(".jpg"));

    let files = ws.run_json(&["file", "list", &estimate_id]);
    assert_eq!(files.as_array().map(|a| a.len()), Some(1));
    assert_eq!(files[0]["file_name"], "front.jpg");
    assert_eq!(files[0]["file_size"], 2048);

    let stdout = ws.run_ok(&["file", "delete", &estimate_id, &file_id[..8], "--force"]);
    assert_eq!(field(&stdout, "deleted").as_deref(), Some(file_id.as_str()));
    let files = ws.run_json(&["file", "list", &estimate_id]);
    assert_eq!(files.as_array().map(|a| a.len()), Some(0));
}

#[test]
fn test_cli_attach_missing_file_exit_code() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();

    let missing = ws.db_path.with_file_name("nope.png");
    let output = ws.run(&[
        "file",
        "attach",
        &estimate_id,
        missing.to_str().expect("utf-8 path"),
    ]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_cli_dashboard_counts() {
    let ws = Workspace::new();
    ws.init_with_project();
    let estimate_id = ws.create_estimate();
    ws.run_ok(&["item", "add", &estimate_id, "Tile", "--value", "4800"]);

    let stdout = ws.run_ok(&["dashboard"]);
    assert_eq!(field(&stdout, "active_projects").as_deref(), Some("1"));
    assert_eq!(field(&stdout, "open_estimates").as_deref(), Some("1"));
    assert_eq!(field(&stdout, "open_estimate_value").as_deref(), Some("4800.00"));
    assert_eq!(field(&stdout, "customers").as_deref(), Some("0"));

    let counts = ws.run_json(&["dashboard"]);
    assert_eq!(counts["open_estimates"], 1);
}
