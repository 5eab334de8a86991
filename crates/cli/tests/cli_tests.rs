//! CLI integration tests

use std::path::Path;
use std::process::{Command, Output};

fn cli() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_pve-storage-info"));
    for var in ["PVESI_WORKERS", "PVESI_PVESH_PATH", "PVESI_COROSYNC_CONF", "PVESI_OUTPUT"] {
        cmd.env_remove(var);
    }
    cmd
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = cli()
        .arg("--help")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(
        stdout.contains("disk usage and storage info"),
        "Should show app description"
    );
    for flag in [
        "--vmid",
        "--node",
        "--no-header",
        "--total-per-vm",
        "--total-per-node",
        "--vm-per-storage",
        "--list-nodes",
        "--list-vmids",
        "--list-storages",
        "--cluster-info",
        "--output",
        "--human",
        "--workers",
    ] {
        assert!(stdout.contains(flag), "Should show {flag} flag");
    }
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = cli()
        .arg("--version")
        .output()
        .expect("Failed to execute command");

    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("pve-storage-info"), "Should show binary name");
}

/// Test that an unknown output format is rejected
#[test]
fn test_invalid_output_format() {
    let output = cli()
        .args(["--output", "xml"])
        .output()
        .expect("Failed to execute command");

    assert!(!output.status.success(), "Unknown format should fail");
}

/// Test that a missing pvesh binary is reported as an error
#[test]
fn test_missing_pvesh_fails() {
    let dir = tempfile::tempdir().expect("tempdir");

    let output = cli()
        .env("XDG_CONFIG_HOME", dir.path())
        .env("HOME", dir.path())
        .args(["--pvesh", "/nonexistent/pvesh"])
        .output()
        .expect("Failed to execute command");

    let stderr = String::from_utf8_lossy(&output.stderr);

    assert_eq!(output.status.code(), Some(1));
    assert!(
        stderr.contains("/cluster/status"),
        "Should name the failing query: {stderr}"
    );
}

#[cfg(unix)]
const CLUSTER_SCRIPT: &str = r#"#!/bin/sh
case "$2" in
  /cluster/status)
    echo '[{"type":"cluster","name":"prod"},{"type":"node","name":"pve1"}]' ;;
  /cluster/resources)
    echo '[{"vmid":100,"node":"pve1","name":"web","type":"qemu"},{"vmid":200,"node":"pve2","name":"ct","type":"lxc"}]' ;;
  /nodes/pve1/qemu/100/config)
    echo '{"name":"web","scsi0":"local-lvm:vm-100-disk-0,size=32G","ide2":"local:iso/debian.iso,media=cdrom"}' ;;
  /nodes/pve2/lxc/200/config)
    echo '{"hostname":"ct","rootfs":"local-lvm:subvol-200-disk-0,size=8G"}' ;;
  /nodes)
    echo '[{"node":"pve1"},{"node":"pve2"}]' ;;
  /nodes/pve1/storage)
    echo '[{"storage":"local-lvm","type":"lvmthin"}]' ;;
  /nodes/pve2/storage)
    echo '[]' ;;
  /nodes/pve1/storage/local-lvm/status)
    echo '{"total":107374182400,"used":26843545600,"avail":80530636800}' ;;
  *)
    echo "no such path: $2" >&2
    exit 2 ;;
esac
"#;

#[cfg(unix)]
const EMPTY_SCRIPT: &str = "#!/bin/sh\necho '[]'\n";

#[cfg(unix)]
fn write_script(dir: &Path, name: &str, body: &str) -> std::path::PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join(name);
    std::fs::write(&path, body).expect("write script");
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))
        .expect("chmod script");
    path
}

#[cfg(unix)]
fn run_with(pvesh: &Path, home: &Path, args: &[&str]) -> Output {
    cli()
        .env("XDG_CONFIG_HOME", home)
        .env("HOME", home)
        .arg("--pvesh")
        .arg(pvesh)
        .arg("--corosync-conf")
        .arg(home.join("missing-corosync.conf"))
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// End-to-end reports against a scripted pvesh
#[cfg(unix)]
#[test]
fn test_reports_with_fake_pvesh() {
    let dir = tempfile::tempdir().expect("tempdir");
    let cluster = write_script(dir.path(), "pvesh-cluster", CLUSTER_SCRIPT);
    let empty = write_script(dir.path(), "pvesh-empty", EMPTY_SCRIPT);

    // Per-disk table
    let output = run_with(&cluster, dir.path(), &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 4, "header, rule and two disks: {stdout}");
    assert_eq!(
        lines[0].split_whitespace().collect::<Vec<_>>(),
        ["cluster", "node", "vmid", "vmname", "storage", "vmdisk", "size", "size_mb"]
    );
    assert!(lines[1].starts_with("-------"));
    assert_eq!(
        lines[2].split_whitespace().collect::<Vec<_>>(),
        ["prod", "pve1", "100", "web", "local-lvm", "vm-100-disk-0", "32G", "32768"]
    );
    assert_eq!(
        lines[3].split_whitespace().collect::<Vec<_>>(),
        ["prod", "pve2", "200", "ct", "local-lvm", "subvol-200-disk-0", "8G", "8192"]
    );

    // JSON per node totals
    let output = run_with(&cluster, dir.path(), &["--total-per-node", "--output", "json"]);
    assert!(output.status.success());
    let doc: serde_json::Value = serde_json::from_slice(&output.stdout).expect("valid json");
    let rows = doc.as_array().expect("array");
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["node"], "pve1");
    assert_eq!(rows[0]["total_size_MB"], 32768);
    assert_eq!(rows[1]["node"], "pve2");

    // Delimited without header, filtered by vmid
    let output = run_with(
        &cluster,
        dir.path(),
        &["--vmid", "200", "--output", "csv", "--no-header"],
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "prod;pve2;200;ct;local-lvm;subvol-200-disk-0;8G;8192\n"
    );

    // Node listing
    let output = run_with(&cluster, dir.path(), &["--list-nodes", "--output", "csv"]);
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "pve1\npve2\n");

    // Storage usage
    let output = run_with(&cluster, dir.path(), &["--list-storages", "--output", "csv"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "header and one storage: {stdout}");
    assert_eq!(
        lines[1],
        "prod;pve1;local-lvm;lvmthin;102400;25600;76800;25.00;75.00"
    );

    // Empty inventory still prints the header and succeeds
    let output = run_with(&empty, dir.path(), &[]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines.len(), 2, "header and rule only: {stdout}");
    assert!(lines[0].starts_with("cluster"));

    // A cluster without nodes has no storages
    let output = run_with(&empty, dir.path(), &["--list-storages", "--no-header"]);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}
