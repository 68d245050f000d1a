use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;
use std::process::ExitStatus;

use assert_cmd::Command;
use tempfile::TempDir;

/// Isolated working directory with its own HOME and config dirs.
pub struct FixdWorkspace {
    _dir: TempDir,
    pub root: PathBuf,
}

impl FixdWorkspace {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let root = dir.path().to_path_buf();
        Self { _dir: dir, root }
    }

    /// Write a script file under the workspace and return its path.
    pub fn script(&self, name: &str, lines: &[&str]) -> PathBuf {
        let path = self.root.join(name);
        fs::write(&path, lines.join("\n") + "\n").expect("write script");
        path
    }

    /// Write the project config file.
    pub fn project_config(&self, yaml: &str) {
        let dir = self.root.join(".fixdelhi");
        fs::create_dir_all(&dir).expect("create config dir");
        fs::write(dir.join("config.yaml"), yaml).expect("write config");
    }
}

pub struct RunOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

impl RunOutput {
    /// Stdout lines parsed as JSON.
    pub fn json_lines(&self) -> Vec<serde_json::Value> {
        self.stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| serde_json::from_str(line).expect("stdout line is JSON"))
            .collect()
    }
}

pub fn fixd_command(workspace: &FixdWorkspace) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_fixd"));
    cmd.current_dir(&workspace.root)
        .env("HOME", &workspace.root)
        .env("XDG_CONFIG_HOME", workspace.root.join("xdg"))
        .env_remove("RUST_LOG")
        .env_remove("FIXD_IDENTITY")
        .env_remove("FIXD_ADMIN")
        .env_remove("FIXD_SEED")
        .env_remove("FIXD_PLACEHOLDER_IMAGE")
        .env_remove("FIXD_LOG_FILE");
    cmd
}

pub fn run_fixd<I, S>(workspace: &FixdWorkspace, args: I, label: &str) -> RunOutput
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let output = fixd_command(workspace)
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("{label}: failed to spawn fixd: {e}"));
    RunOutput {
        status: output.status,
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    }
}
