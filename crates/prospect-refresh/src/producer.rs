//! Producer invocation — running an external scraper as a subprocess.
//!
//! A producer is `program script --company <name> --days <n>`, run in a
//! working directory, expected to leave a JSON file behind. Arguments go
//! straight to `execve`; there is no shell and nothing to escape.

use std::{
  path::{Path, PathBuf},
  process::{ExitStatus, Stdio},
  time::{Duration, Instant},
};

use prospect_core::record::DataType;
use serde::{Deserialize, Deserializer};
use thiserror::Error;
use tokio::{
  io::{AsyncRead, AsyncReadExt},
  process::Command,
};

/// Default wall-clock bound on one producer run.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;
/// Default cap on each of stdout and stderr.
pub const DEFAULT_MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

const STDERR_TAIL_CHARS: usize = 2000;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Where the producers live and how they are run.
#[derive(Debug, Clone, Deserialize)]
pub struct ProducerConfig {
  /// Directory the producers run in; relative `script` and `output` paths
  /// resolve against it.
  #[serde(default = "default_working_dir")]
  pub working_dir:      PathBuf,
  /// Interpreter the scripts are handed to.
  #[serde(default = "default_program")]
  pub program:          PathBuf,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs:     u64,
  #[serde(default = "default_max_output_bytes")]
  pub max_output_bytes: usize,
  #[serde(default = "ProducerScript::news", deserialize_with = "news_script")]
  pub news:             ProducerScript,
  #[serde(
    default = "ProducerScript::interviews",
    deserialize_with = "interviews_script"
  )]
  pub interviews:       ProducerScript,
}

/// One data type's producer script and the file it writes.
#[derive(Debug, Clone)]
pub struct ProducerScript {
  pub script: PathBuf,
  pub output: PathBuf,
}

/// A `[producer.<type>]` section; missing keys keep that type's default.
#[derive(Deserialize)]
struct ScriptSection {
  script: Option<PathBuf>,
  output: Option<PathBuf>,
}

impl ScriptSection {
  fn over(self, default: ProducerScript) -> ProducerScript {
    ProducerScript {
      script: self.script.unwrap_or(default.script),
      output: self.output.unwrap_or(default.output),
    }
  }
}

fn news_script<'de, D: Deserializer<'de>>(d: D) -> Result<ProducerScript, D::Error> {
  ScriptSection::deserialize(d).map(|s| s.over(ProducerScript::news()))
}

fn interviews_script<'de, D: Deserializer<'de>>(d: D) -> Result<ProducerScript, D::Error> {
  ScriptSection::deserialize(d).map(|s| s.over(ProducerScript::interviews()))
}

impl ProducerScript {
  fn news() -> Self {
    Self {
      script: "scrape_company_news_async.py".into(),
      output: "company_news_test.json".into(),
    }
  }

  fn interviews() -> Self {
    Self {
      script: "scrape_management_interviews.py".into(),
      output: "management_interviews_test.json".into(),
    }
  }
}

fn default_working_dir() -> PathBuf { PathBuf::from("database") }
fn default_program() -> PathBuf { PathBuf::from("python3") }
fn default_timeout_secs() -> u64 { DEFAULT_TIMEOUT_SECS }
fn default_max_output_bytes() -> usize { DEFAULT_MAX_OUTPUT_BYTES }

impl Default for ProducerConfig {
  fn default() -> Self {
    Self {
      working_dir:      default_working_dir(),
      program:          default_program(),
      timeout_secs:     DEFAULT_TIMEOUT_SECS,
      max_output_bytes: DEFAULT_MAX_OUTPUT_BYTES,
      news:             ProducerScript::news(),
      interviews:       ProducerScript::interviews(),
    }
  }
}

impl ProducerConfig {
  pub fn script(&self, data_type: DataType) -> &ProducerScript {
    match data_type {
      DataType::News => &self.news,
      DataType::Interviews => &self.interviews,
    }
  }

  /// Absolute-or-cwd-relative path of the script for `data_type`.
  pub fn script_path(&self, data_type: DataType) -> PathBuf {
    self.working_dir.join(&self.script(data_type).script)
  }

  /// Path of the file the producer for `data_type` writes.
  pub fn output_path(&self, data_type: DataType) -> PathBuf {
    self.working_dir.join(&self.script(data_type).output)
  }

  pub fn timeout(&self) -> Duration { Duration::from_secs(self.timeout_secs) }

  /// The interpreter to launch. A bare name is looked up on `PATH`; a
  /// relative path is anchored to the current directory, since the child
  /// runs in `working_dir`.
  pub fn program_path(&self) -> std::io::Result<PathBuf> {
    if self.program.is_relative() && self.program.components().count() > 1 {
      std::path::absolute(&self.program)
    } else {
      Ok(self.program.clone())
    }
  }
}

// ─── Running ──────────────────────────────────────────────────────────────────

/// Why a producer run did not complete successfully.
#[derive(Debug, Error)]
pub enum ProducerError {
  #[error("failed to start producer: {0}")]
  Spawn(#[source] std::io::Error),

  #[error("producer timed out after {}s", .0.as_secs())]
  TimedOut(Duration),

  #[error("producer output exceeded {0} bytes")]
  OutputTooLarge(usize),

  #[error("producer exited with {status}: {stderr_tail}")]
  Failed {
    status:      ExitStatus,
    stderr_tail: String,
  },

  #[error("failed to collect producer output: {0}")]
  Io(#[source] std::io::Error),
}

/// Captured output of a successful run.
#[derive(Debug)]
pub struct ProducerRun {
  pub stdout:  String,
  pub stderr:  String,
  pub elapsed: Duration,
}

/// A fully-resolved producer invocation.
#[derive(Debug, Clone)]
pub struct Invocation<'a> {
  pub program:          &'a Path,
  pub script:           &'a Path,
  pub working_dir:      &'a Path,
  pub company:          &'a str,
  pub days:             u32,
  pub timeout:          Duration,
  pub max_output_bytes: usize,
}

impl Invocation<'_> {
  /// Run the producer to completion.
  ///
  /// The child is killed if the timeout elapses or either output stream
  /// outgrows `max_output_bytes`.
  pub async fn run(&self) -> Result<ProducerRun, ProducerError> {
    let started = Instant::now();
    let mut child = Command::new(self.program)
      .arg(self.script)
      .arg("--company")
      .arg(self.company)
      .arg("--days")
      .arg(self.days.to_string())
      .current_dir(self.working_dir)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      .kill_on_drop(true)
      .spawn()
      .map_err(ProducerError::Spawn)?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();
    let limit = self.max_output_bytes;

    let completion = async {
      let (out, err) =
        tokio::try_join!(read_capped(stdout, limit), read_capped(stderr, limit))?;
      let status = child.wait().await.map_err(ProducerError::Io)?;
      Ok::<_, ProducerError>((status, out, err))
    };

    let (status, out, err) = match tokio::time::timeout(self.timeout, completion).await {
      Ok(result) => result?,
      Err(_) => return Err(ProducerError::TimedOut(self.timeout)),
    };

    let stdout = String::from_utf8_lossy(&out).into_owned();
    let stderr = String::from_utf8_lossy(&err).into_owned();
    if !status.success() {
      return Err(ProducerError::Failed {
        status,
        stderr_tail: tail(&stderr, STDERR_TAIL_CHARS),
      });
    }

    Ok(ProducerRun { stdout, stderr, elapsed: started.elapsed() })
  }
}

async fn read_capped<R>(pipe: Option<R>, limit: usize) -> Result<Vec<u8>, ProducerError>
where
  R: AsyncRead + Unpin,
{
  let Some(pipe) = pipe else { return Ok(Vec::new()) };
  let mut buf = Vec::new();
  pipe
    .take(limit as u64 + 1)
    .read_to_end(&mut buf)
    .await
    .map_err(ProducerError::Io)?;
  if buf.len() > limit {
    return Err(ProducerError::OutputTooLarge(limit));
  }
  Ok(buf)
}

/// Whether stderr carries anything beyond interpreter deprecation chatter.
pub fn stderr_is_noise(stderr: &str) -> bool {
  stderr.trim().is_empty() || stderr.contains("DeprecationWarning")
}

fn tail(s: &str, max_chars: usize) -> String {
  let s = s.trim_end();
  let count = s.chars().count();
  if count <= max_chars {
    return s.to_string();
  }
  s.chars().skip(count - max_chars).collect()
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn sh_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("producer.sh");
    std::fs::write(&path, body).unwrap();
    path
  }

  fn invocation<'a>(dir: &'a Path, script: &'a Path) -> Invocation<'a> {
    Invocation {
      program:          Path::new("sh"),
      script,
      working_dir:      dir,
      company:          "Acme Co",
      days:             30,
      timeout:          Duration::from_secs(10),
      max_output_bytes: 1024,
    }
  }

  #[tokio::test]
  async fn passes_company_and_days_as_argv() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(dir.path(), "printf '%s|%s|%s|%s' \"$1\" \"$2\" \"$3\" \"$4\"\n");
    let run = invocation(dir.path(), &script).run().await.unwrap();
    assert_eq!(run.stdout, "--company|Acme Co|--days|30");
  }

  #[tokio::test]
  async fn runs_in_working_dir() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(dir.path(), "echo hi > marker.txt\n");
    invocation(dir.path(), &script).run().await.unwrap();
    assert!(dir.path().join("marker.txt").exists());
  }

  #[tokio::test]
  async fn non_zero_exit_reports_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(dir.path(), "echo 'quota exhausted' >&2\nexit 3\n");
    let err = invocation(dir.path(), &script).run().await.unwrap_err();
    match err {
      ProducerError::Failed { status, stderr_tail } => {
        assert_eq!(status.code(), Some(3));
        assert_eq!(stderr_tail, "quota exhausted");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }

  #[tokio::test]
  async fn slow_producer_times_out() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(dir.path(), "sleep 5\n");
    let mut inv = invocation(dir.path(), &script);
    inv.timeout = Duration::from_millis(200);
    let started = Instant::now();
    let err = inv.run().await.unwrap_err();
    assert!(matches!(err, ProducerError::TimedOut(_)), "{err:?}");
    assert!(started.elapsed() < Duration::from_secs(4));
  }

  #[tokio::test]
  async fn chatty_producer_hits_output_cap() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(
      dir.path(),
      "i=0\nwhile [ $i -lt 200 ]; do echo 'xxxxxxxxxxxxxxxxxxxx'; i=$((i+1)); done\n",
    );
    let err = invocation(dir.path(), &script).run().await.unwrap_err();
    assert!(matches!(err, ProducerError::OutputTooLarge(1024)), "{err:?}");
  }

  #[tokio::test]
  async fn missing_program_fails_to_spawn() {
    let dir = tempfile::tempdir().unwrap();
    let script = sh_script(dir.path(), "true\n");
    let mut inv = invocation(dir.path(), &script);
    inv.program = Path::new("/nonexistent/interpreter");
    assert!(matches!(inv.run().await, Err(ProducerError::Spawn(_))));
  }

  #[test]
  fn deprecation_noise_is_recognised() {
    assert!(stderr_is_noise(""));
    assert!(stderr_is_noise("foo.py:3: DeprecationWarning: datetime.utcnow()"));
    assert!(!stderr_is_noise("Traceback (most recent call last):"));
  }

  #[test]
  fn tail_keeps_the_end() {
    assert_eq!(tail("abcdef\n", 3), "def");
    assert_eq!(tail("ab", 3), "ab");
  }

  #[test]
  fn partial_script_section_keeps_type_defaults() {
    let cfg: ProducerConfig = serde_json::from_value(serde_json::json!({
      "news": { "script": "news.py" },
      "interviews": { "output": "interviews.json" }
    }))
    .unwrap();
    assert_eq!(cfg.news.script, Path::new("news.py"));
    assert_eq!(cfg.news.output, Path::new("company_news_test.json"));
    assert_eq!(cfg.interviews.script, Path::new("scrape_management_interviews.py"));
    assert_eq!(cfg.interviews.output, Path::new("interviews.json"));
  }

  #[test]
  fn default_paths_resolve_against_working_dir() {
    let cfg = ProducerConfig::default();
    assert_eq!(
      cfg.script_path(DataType::News),
      Path::new("database/scrape_company_news_async.py")
    );
    assert_eq!(
      cfg.output_path(DataType::Interviews),
      Path::new("database/management_interviews_test.json")
    );
    assert_eq!(cfg.program_path().unwrap(), Path::new("python3"));
    assert_eq!(cfg.timeout(), Duration::from_secs(120));
    assert_eq!(cfg.max_output_bytes, 10 * 1024 * 1024);
  }
}
