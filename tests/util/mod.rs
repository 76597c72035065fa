pub mod fixtures;

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

type SharedBuf = Arc<Mutex<Vec<u8>>>;

/// Collects the pipeline's debug-level log lines while installed.
#[allow(dead_code)]
pub struct LogCapture {
    buf: SharedBuf,
    _guard: tracing::subscriber::DefaultGuard,
}

#[allow(dead_code)]
impl LogCapture {
    /// Install a thread-local subscriber; dropped with the capture.
    pub fn start() -> Self {
        let buf: SharedBuf = Arc::default();
        let sink = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .without_time()
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || BufWriter(sink.clone()))
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);
        Self { buf, _guard }
    }

    pub fn lines(&self) -> Vec<String> {
        let buf = self.buf.lock().unwrap();
        String::from_utf8_lossy(&buf).lines().map(str::to_string).collect()
    }

    /// Each event name must appear, in this order, on its own log line.
    pub fn assert_stages(&self, stages: &[&str]) {
        let lines = self.lines();
        let mut from = 0;
        for stage in stages {
            let hit = lines[from..].iter().position(|l| l.contains(stage));
            match hit {
                Some(offset) => from += offset + 1,
                None => panic!("stage `{stage}` missing or out of order in:\n{}", lines.join("\n")),
            }
        }
    }
}

struct BufWriter(SharedBuf);

impl Write for BufWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Sets or clears `COMPANY_SEARCH_*` variables and restores them, last
/// change first, on drop. Pair with `#[serial]`.
#[allow(dead_code)]
#[derive(Default)]
pub struct ScopedEnv {
    saved: Vec<(String, Option<String>)>,
}

#[allow(dead_code)]
impl ScopedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, key: &str, value: &str) -> Self {
        self.remember(key);
        unsafe { std::env::set_var(key, value) };
        self
    }

    pub fn unset(mut self, key: &str) -> Self {
        self.remember(key);
        unsafe { std::env::remove_var(key) };
        self
    }

    fn remember(&mut self, key: &str) {
        self.saved.push((key.to_string(), std::env::var(key).ok()));
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (key, prev) in self.saved.drain(..).rev() {
            match prev {
                Some(v) => unsafe { std::env::set_var(&key, v) },
                None => unsafe { std::env::remove_var(&key) },
            }
        }
    }
}

/// A temp dir holding a seeded `companies.db`.
#[allow(dead_code)]
pub struct SeededDb {
    pub dir: TempDir,
    pub path: PathBuf,
}

#[allow(dead_code)]
impl SeededDb {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("companies.db");
        fixtures::seed_file(&path).expect("seed companies");
        Self { dir, path }
    }
}
