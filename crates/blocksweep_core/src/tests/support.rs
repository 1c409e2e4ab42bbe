//! Fake worker and fixtures shared by the driver tests

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::cache::QuestionCache;
use crate::error::Result;
use crate::grid::ParameterGrid;
use crate::invocation::{HEADER_FLAG, Invocation, InvocationBuilder};
use crate::sink::ResultsSink;
use crate::sweep::Sweep;
use crate::worker::{Worker, WorkerStatus};

pub const HEADER_LINE: &str = "limit,threshold,precision,recall";

/// Behaves like the real worker: prints a header or one row, and leaves a
/// question pickle behind whenever it was not handed a cached one.
pub struct FakeWorker {
    pub calls: Vec<Invocation>,
    artifact: PathBuf,
    /// Zero-based call index (the header is call 0) that exits non-zero
    fail_on_call: Option<usize>,
    /// Call index that exits successfully without printing anything
    silent_on_call: Option<usize>,
    leave_artifact: bool,
}

impl FakeWorker {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            calls: Vec::new(),
            artifact: artifact.into(),
            fail_on_call: None,
            silent_on_call: None,
            leave_artifact: true,
        }
    }

    pub fn failing_on(mut self, call: usize) -> Self {
        self.fail_on_call = Some(call);
        self
    }

    pub fn silent_on(mut self, call: usize) -> Self {
        self.silent_on_call = Some(call);
        self
    }

    pub fn without_artifact(mut self) -> Self {
        self.leave_artifact = false;
        self
    }
}

impl Worker for FakeWorker {
    fn run(&mut self, invocation: &Invocation, mut stdout: File) -> Result<WorkerStatus> {
        let call = self.calls.len();
        self.calls.push(invocation.clone());

        if self.silent_on_call == Some(call) {
            return Ok(WorkerStatus::Success);
        }

        let is_header = invocation.args().iter().any(|a| a == HEADER_FLAG);
        if is_header {
            writeln!(stdout, "{HEADER_LINE}").unwrap();
            return Ok(WorkerStatus::Success);
        }

        if self.fail_on_call == Some(call) {
            write!(stdout, "partial").unwrap();
            return Ok(WorkerStatus::Failed { code: Some(1) });
        }

        writeln!(stdout, "{}", row_for(invocation)).unwrap();
        if self.leave_artifact && !invocation.uses_stored_questions() {
            fs::write(&self.artifact, format!("pickle for {}", row_for(invocation))).unwrap();
        }
        Ok(WorkerStatus::Success)
    }
}

/// The row the fake worker prints: every generated flag, in order
pub fn row_for(invocation: &Invocation) -> String {
    invocation
        .args()
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

pub fn small_grid() -> ParameterGrid {
    ParameterGrid::new(vec![10, 40], strings(&["INVERSE", "INVERSESQRT"]))
}

pub fn cache_in(root: &Path) -> QuestionCache {
    let data = root.join("Data");
    fs::create_dir_all(&data).unwrap();
    QuestionCache::new(&data, "q{limit}.pickle", data.join("questions.pickle")).unwrap()
}

pub fn sink_in(root: &Path) -> ResultsSink {
    ResultsSink::new(root.join("Results").join("canopies.csv"))
}

pub fn builder() -> InvocationBuilder {
    InvocationBuilder::new(&strings(&["python", "main.py"]), 0, "canopies").unwrap()
}

pub fn sweep_in(root: &Path, grid: ParameterGrid, worker: FakeWorker) -> Sweep<FakeWorker> {
    Sweep::new(grid, cache_in(root), builder(), sink_in(root), worker).unwrap()
}

pub fn artifact_in(root: &Path) -> PathBuf {
    root.join("Data").join("questions.pickle")
}
