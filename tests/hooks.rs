// ABOUTME: Integration tests for lifecycle hook discovery and execution.
// ABOUTME: Verifies context env vars and success/failure reporting.

#![cfg(unix)]

use renova::hooks::{HookContext, HookPoint, HookRunner};
use renova::types::ServiceName;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

fn write_hook(project_dir: &Path, name: &str, body: &str) {
    let hooks_dir = project_dir.join(".renova/hooks");
    fs::create_dir_all(&hooks_dir).unwrap();
    let path = hooks_dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn context(target: &Path) -> HookContext {
    HookContext {
        service: ServiceName::new("myapp").unwrap(),
        target: target.to_path_buf(),
        branch: "main".to_string(),
        backup: Some(PathBuf::from("/var/www/backups/myapp-20250101-120000")),
    }
}

#[tokio::test]
async fn hook_receives_context_environment() {
    let project = tempfile::tempdir().unwrap();
    let out_file = project.path().join("out.txt");
    write_hook(
        project.path(),
        "post-update",
        &format!(
            "echo \"$RENOVA_SERVICE $RENOVA_BRANCH $RENOVA_BACKUP\" > {}",
            out_file.display()
        ),
    );

    let runner = HookRunner::new(project.path());
    let result = runner
        .run(HookPoint::PostUpdate, &context(project.path()))
        .await
        .expect("hook should run");

    assert!(result.success);
    let recorded = fs::read_to_string(&out_file).unwrap();
    assert_eq!(
        recorded.trim(),
        "myapp main /var/www/backups/myapp-20250101-120000"
    );
}

#[tokio::test]
async fn missing_hook_returns_none() {
    let project = tempfile::tempdir().unwrap();
    let runner = HookRunner::new(project.path());

    assert!(
        runner
            .run(HookPoint::PreUpdate, &context(project.path()))
            .await
            .is_none()
    );
}

#[tokio::test]
async fn failing_hook_reports_exit_code_and_stderr() {
    let project = tempfile::tempdir().unwrap();
    write_hook(project.path(), "on-error", "echo broke >&2\nexit 3");

    let runner = HookRunner::new(project.path());
    let result = runner
        .run(HookPoint::OnError, &context(project.path()))
        .await
        .expect("hook should run");

    assert!(!result.success);
    assert_eq!(result.exit_code, Some(3));
    assert!(result.stderr.contains("broke"));
}
