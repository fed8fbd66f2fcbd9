//! The `doorway` binary exits promptly on a signal even while a line driver
//! is blocked reading an idle FIFO.

#![cfg(unix)]

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

const EXIT_DEADLINE: Duration = Duration::from_secs(5);

fn mkfifo(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    let status = Command::new("mkfifo").arg(&path).status().unwrap();
    assert!(status.success(), "mkfifo {}", path.display());
    path
}

/// Opens the write end in the background; it completes once the binary
/// opens the read end. The returned file keeps the FIFO idle but open.
fn hold_open(path: PathBuf) -> thread::JoinHandle<File> {
    thread::spawn(move || std::fs::OpenOptions::new().write(true).open(path).unwrap())
}

fn write_config(dir: &Path, tags: &Path, camera: Option<&Path>) -> PathBuf {
    let camera = match camera {
        Some(path) => format!("{{ kind = \"line\", path = '{}' }}", path.display()),
        None => "{ kind = \"mock\" }".to_string(),
    };
    let text = format!(
        "[authority]\nbase_url = \"http://127.0.0.1:9/\"\n\n\
         [drivers]\ntag_reader = {{ kind = \"line\", path = '{}' }}\ncamera = {camera}\n",
        tags.display()
    );
    let path = dir.join("doorway.toml");
    std::fs::write(&path, text).unwrap();
    path
}

fn spawn(dir: &Path, config: &Path, command: &str) -> (Child, Receiver<String>) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_doorway"))
        .arg("--config")
        .arg(config)
        .arg(command)
        .current_dir(dir)
        .env("RUST_LOG", "info")
        .env_remove("DOORWAY_CONFIG")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let stderr = child.stderr.take().unwrap();
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        for line in BufReader::new(stderr).lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    (child, rx)
}

fn wait_for_log(child: &mut Child, logs: &Receiver<String>, needle: &str) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while Instant::now() < deadline {
        match logs.recv_timeout(Duration::from_millis(100)) {
            Ok(line) if line.contains(needle) => return,
            Ok(_) | Err(mpsc::RecvTimeoutError::Timeout) => {}
            Err(mpsc::RecvTimeoutError::Disconnected) => break,
        }
    }
    let _ = child.kill();
    panic!("binary never logged {needle:?}");
}

fn signal(child: &Child, name: &str) {
    let status = Command::new("kill")
        .arg(format!("-{name}"))
        .arg(child.id().to_string())
        .status()
        .unwrap();
    assert!(status.success());
}

fn wait_for_exit(child: &mut Child) -> ExitStatus {
    let deadline = Instant::now() + EXIT_DEADLINE;
    while Instant::now() < deadline {
        if let Some(status) = child.try_wait().unwrap() {
            return status;
        }
        thread::sleep(Duration::from_millis(50));
    }
    let _ = child.kill();
    panic!("binary still running {EXIT_DEADLINE:?} after the signal");
}

#[test]
fn test_run_exits_on_sigterm_with_idle_fifos() {
    let dir = tempfile::tempdir().unwrap();
    let tags = mkfifo(dir.path(), "tags");
    let camera = mkfifo(dir.path(), "camera");
    let config = write_config(dir.path(), &tags, Some(&camera));

    let (mut child, logs) = spawn(dir.path(), &config, "run");
    let _tag_writer = hold_open(tags).join().unwrap();
    let _camera_writer = hold_open(camera).join().unwrap();

    wait_for_log(&mut child, &logs, "Starting credential sources");
    signal(&child, "TERM");

    let status = wait_for_exit(&mut child);
    assert!(status.success(), "exit status {status:?}");
}

#[test]
fn test_run_exits_on_sigint_with_idle_fifos() {
    let dir = tempfile::tempdir().unwrap();
    let tags = mkfifo(dir.path(), "tags");
    let config = write_config(dir.path(), &tags, None);

    let (mut child, logs) = spawn(dir.path(), &config, "run");
    let _tag_writer = hold_open(tags).join().unwrap();

    wait_for_log(&mut child, &logs, "Starting credential sources");
    // Ctrl-C is registered when the supervisor first polls its shutdown future.
    thread::sleep(Duration::from_millis(500));
    signal(&child, "INT");

    let status = wait_for_exit(&mut child);
    assert!(status.success(), "exit status {status:?}");
}

#[test]
fn test_read_one_exits_on_sigint_with_idle_fifo() {
    let dir = tempfile::tempdir().unwrap();
    let tags = mkfifo(dir.path(), "tags");
    let config = write_config(dir.path(), &tags, None);

    let (mut child, logs) = spawn(dir.path(), &config, "read-one");
    let _tag_writer = hold_open(tags).join().unwrap();

    wait_for_log(&mut child, &logs, "Waiting for a tag");
    thread::sleep(Duration::from_millis(500));
    signal(&child, "INT");

    let status = wait_for_exit(&mut child);
    assert!(status.success(), "exit status {status:?}");
}

#[test]
fn test_read_one_prints_id_and_text() {
    use std::io::Write;

    let dir = tempfile::tempdir().unwrap();
    let tags = mkfifo(dir.path(), "tags");
    let config = write_config(dir.path(), &tags, None);

    let (mut child, _logs) = spawn(dir.path(), &config, "read-one");
    let mut writer = hold_open(tags).join().unwrap();
    writeln!(writer, "584190912345\talice").unwrap();

    let status = wait_for_exit(&mut child);
    assert!(status.success(), "exit status {status:?}");

    let mut stdout = String::new();
    std::io::Read::read_to_string(&mut child.stdout.take().unwrap(), &mut stdout).unwrap();
    assert_eq!(stdout, "584190912345\nalice\n");
}
