//! Integration tests for appmake

mod cli_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use tempfile::TempDir;

    fn appmake() -> Command {
        let mut cmd = Command::cargo_bin("appmake").unwrap();
        cmd.env_remove("APPMAKE_CONFIG").env("CI", "1");
        cmd
    }

    #[test]
    fn help_displays() {
        appmake()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Build automation for web apps"));
    }

    #[test]
    fn version_displays() {
        appmake()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("appmake"));
    }

    #[test]
    fn optimize_without_files_is_configuration_error() {
        let project = TempDir::new().unwrap();
        appmake()
            .current_dir(project.path())
            .arg("optimize")
            .assert()
            .failure()
            .stderr(predicate::str::contains("`files` or `dir` for optimization is not set"));
    }

    #[test]
    fn build_without_steps_fails() {
        let project = TempDir::new().unwrap();
        appmake()
            .current_dir(project.path())
            .arg("build")
            .assert()
            .failure()
            .stderr(predicate::str::contains("nothing to build"));
    }

    #[test]
    fn init_then_config_path() {
        let project = TempDir::new().unwrap();
        appmake()
            .current_dir(project.path())
            .arg("init")
            .assert()
            .success();

        appmake()
            .current_dir(project.path())
            .args(["config", "path"])
            .assert()
            .success()
            .stdout(predicate::str::contains("appmake.toml"));

        appmake()
            .current_dir(project.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));
    }

    #[test]
    fn clean_removes_configured_paths() {
        let project = TempDir::new().unwrap();
        std::fs::create_dir_all(project.path().join("public/build")).unwrap();
        std::fs::write(project.path().join("public/build/app.js"), "").unwrap();
        std::fs::write(
            project.path().join("appmake.toml"),
            "[clean]\npaths = [\"public/build\"]\n",
        )
        .unwrap();

        appmake()
            .current_dir(project.path())
            .arg("clean")
            .assert()
            .success();

        assert!(!project.path().join("public/build").exists());
    }
}

#[cfg(unix)]
mod optimize_tests {
    use assert_cmd::Command;
    use predicates::prelude::*;
    use std::path::Path;
    use tempfile::TempDir;

    /// Project whose optimizer strips spaces and logs each run to `runs.log`
    fn project(optimizer_args: &str) -> TempDir {
        let project = TempDir::new().unwrap();
        std::fs::create_dir_all(project.path().join("build/vendor")).unwrap();
        std::fs::write(
            project.path().join("appmake.toml"),
            format!(
                r#"
[optimize]
dir = "build"
exclude = ["vendor/"]
parallel = 2
cache_dir = ".cache"
optimizer = "sh"
optimizer_args = {optimizer_args}
"#
            ),
        )
        .unwrap();
        write_sources(project.path());
        project
    }

    fn strip_spaces() -> &'static str {
        r#"["-c", "echo \"$0\" >> runs.log; tr -d ' ' < \"$0\" > \"$1\"", "{input}", "{output}"]"#
    }

    fn write_sources(root: &Path) {
        std::fs::write(root.join("build/a.js"), "var a = 1;").unwrap();
        std::fs::write(root.join("build/b.js"), "var b = 2;").unwrap();
        std::fs::write(root.join("build/vendor/c.js"), "var c = 3;").unwrap();
    }

    fn runs(root: &Path) -> usize {
        std::fs::read_to_string(root.join("runs.log"))
            .map(|s| s.lines().count())
            .unwrap_or(0)
    }

    fn appmake(root: &Path) -> Command {
        let mut cmd = Command::cargo_bin("appmake").unwrap();
        cmd.env_remove("APPMAKE_CONFIG")
            .env("CI", "1")
            .current_dir(root);
        cmd
    }

    #[test]
    fn optimizes_then_serves_from_cache() {
        let project = project(strip_spaces());
        let root = project.path();

        appmake(root)
            .arg("optimize")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"optimized\": 2"));

        assert_eq!(std::fs::read_to_string(root.join("build/a.js")).unwrap(), "vara=1;");
        assert_eq!(
            std::fs::read_to_string(root.join("build/vendor/c.js")).unwrap(),
            "var c = 3;"
        );
        assert!(root.join(".cache/cache.json").exists());
        assert_eq!(runs(root), 2);

        write_sources(root);
        appmake(root)
            .arg("optimize")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"from_cache\": 2"));

        assert_eq!(runs(root), 2);
        assert_eq!(std::fs::read_to_string(root.join("build/b.js")).unwrap(), "varb=2;");
    }

    #[test]
    fn command_line_files_resolve_from_working_directory() {
        let project = project(strip_spaces());
        let root = project.path();

        appmake(&root.join("build"))
            .args(["optimize", "--no-cache", "a.js"])
            .assert()
            .success()
            .stdout(predicate::str::contains("\"optimized\": 1"));

        assert_eq!(std::fs::read_to_string(root.join("build/a.js")).unwrap(), "vara=1;");
        assert_eq!(std::fs::read_to_string(root.join("build/b.js")).unwrap(), "var b = 2;");
    }

    #[test]
    fn no_cache_flag_always_runs_optimizer() {
        let project = project(strip_spaces());
        let root = project.path();

        appmake(root).args(["optimize", "--no-cache"]).assert().success();
        write_sources(root);
        appmake(root).args(["optimize", "--no-cache"]).assert().success();

        assert_eq!(runs(root), 4);
        assert!(!root.join(".cache").exists());
    }

    #[test]
    fn failing_optimizer_exits_nonzero_without_index() {
        let project = project(r#"["-c", "echo boom >&2; exit 2", "{input}", "{output}"]"#);
        let root = project.path();

        appmake(root)
            .arg("optimize")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Optimizer failed"));

        assert!(!root.join(".cache/cache.json").exists());
    }

    #[test]
    fn corrupt_index_is_not_fatal() {
        let project = project(strip_spaces());
        let root = project.path();
        std::fs::create_dir_all(root.join(".cache")).unwrap();
        std::fs::write(root.join(".cache/cache.json"), "not json").unwrap();

        appmake(root)
            .arg("optimize")
            .assert()
            .success()
            .stdout(predicate::str::contains("\"optimized\": 2"));

        let index = std::fs::read_to_string(root.join(".cache/cache.json")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&index).unwrap();
        assert_eq!(parsed.as_object().unwrap().len(), 2);
        assert!(parsed.get("../build/a.js").is_some());
    }
}
