//! Integration tests for CLI commands

use std::path::Path;
use std::process::{Command, Output};
use std::sync::Arc;

use kshelf_registry::{MemoryStore, RegistryService, serve};
use tempfile::TempDir;

/// Helper to run kshelf against `host` with `home` as cache
fn kshelf(host: &str, home: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_kshelf"))
        .env_remove("KSHELF_URL")
        .env_remove("KSHELF_HOME")
        .env_remove("RUST_LOG")
        .arg("--host")
        .arg(host)
        .arg("--homedir")
        .arg(home)
        .args(args)
        .output()
        .expect("Failed to execute kshelf")
}

/// Start a memory-backed registry on a background runtime
fn start_registry() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    std_listener.set_nonblocking(true).unwrap();
    let addr = std_listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            let service = Arc::new(RegistryService::new(Arc::new(MemoryStore::new())));
            serve(listener, service).await.unwrap();
        });
    });

    format!("http://{}", addr)
}

/// An address nothing listens on
fn unreachable_host() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

mod usage {
    use super::*;

    #[test]
    fn test_no_subcommand_exits_1() {
        let tmp = TempDir::new().unwrap();
        let output = kshelf("http://localhost:8080", tmp.path(), &[]);
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_missing_argument_exits_1() {
        let tmp = TempDir::new().unwrap();
        let output = kshelf("http://localhost:8080", tmp.path(), &["push", "app"]);
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_unknown_verb_exits_1() {
        let tmp = TempDir::new().unwrap();
        let output = kshelf(
            "http://localhost:8080",
            tmp.path(),
            &["install", "app", "--verb", "delete"],
        );
        assert_eq!(output.status.code(), Some(1));
    }

    #[test]
    fn test_help_exits_0() {
        let tmp = TempDir::new().unwrap();
        let output = kshelf("http://localhost:8080", tmp.path(), &["--help"]);
        assert_eq!(output.status.code(), Some(0));
        let stdout = String::from_utf8_lossy(&output.stdout);
        assert!(stdout.contains("install"));
    }
}

mod errors {
    use super::*;

    #[test]
    fn test_install_unreachable_registry_fails() {
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");
        let output = kshelf(&unreachable_host(), &home, &["install", "app"]);

        assert_eq!(output.status.code(), Some(1));
        assert!(!home.join("app").exists());
    }

    #[test]
    fn test_create_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let output = kshelf(
            &unreachable_host(),
            tmp.path(),
            &["create", "/nonexistent/package.json"],
        );

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("Failed to open"));
    }

    #[test]
    fn test_get_unknown_package_fails() {
        let host = start_registry();
        let tmp = TempDir::new().unwrap();
        let output = kshelf(&host, tmp.path(), &["get", "ghost"]);

        assert_eq!(output.status.code(), Some(1));
        let stderr = String::from_utf8_lossy(&output.stderr);
        assert!(stderr.contains("404"));
    }
}

mod lifecycle {
    use super::*;

    #[test]
    fn test_create_push_get() {
        let host = start_registry();
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");

        let definition = tmp.path().join("widgets.json");
        std::fs::write(
            &definition,
            r#"{"name": "team:widgets", "description": "Widget service", "author": "ops"}"#,
        )
        .unwrap();
        let output = kshelf(&host, &home, &["create", definition.to_str().unwrap()]);
        assert!(output.status.success(), "create failed: {:?}", output);

        let output = kshelf(&host, &home, &["list", "--json"]);
        assert!(output.status.success());
        let listed: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
        assert_eq!(listed["results"][0]["name"], "team:widgets");
        assert_eq!(listed["results"][0]["releases"], serde_json::json!([]));

        let dir = home.join("team:widgets");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("deploy.yaml"), "kind: Deployment\n").unwrap();
        let output = kshelf(&host, &home, &["push", "team:widgets", "1.0.0"]);
        assert!(output.status.success(), "push failed: {:?}", output);

        // A fresh cache receives the pushed bytes
        let other_home = tmp.path().join("other");
        let output = kshelf(&host, &other_home, &["get", "team:widgets"]);
        assert!(output.status.success());
        assert!(String::from_utf8_lossy(&output.stdout).contains("1.0.0"));
        assert_eq!(
            std::fs::read_to_string(other_home.join("team:widgets").join("deploy.yaml")).unwrap(),
            "kind: Deployment\n"
        );
    }

    #[test]
    fn test_push_empty_dir_fails() {
        let host = start_registry();
        let tmp = TempDir::new().unwrap();
        let home = tmp.path().join("home");

        let definition = tmp.path().join("app.json");
        std::fs::write(&definition, r#"{"name": "app"}"#).unwrap();
        assert!(kshelf(&host, &home, &["create", definition.to_str().unwrap()]).status.success());

        std::fs::create_dir_all(home.join("app")).unwrap();
        let output = kshelf(&host, &home, &["push", "app", "1.0.0"]);
        assert_eq!(output.status.code(), Some(1));
    }
}
