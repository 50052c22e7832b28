//! In-memory doubles for the host, the command runner and the prompt.

use anyhow::{Result, anyhow};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};

use crate::common::exec::{Cmd, CommandRunner};
use crate::common::host::Host;
use crate::common::prompt::ConfirmationGate;

#[derive(Debug, Default)]
pub struct FakeHost {
    files: BTreeMap<PathBuf, String>,
    programs: HashSet<String>,
    env: HashMap<String, String>,
    machine: Option<String>,
    root: bool,
    home: Option<PathBuf>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(mut self, path: impl Into<PathBuf>, content: &str) -> Self {
        self.files.insert(path.into(), content.to_string());
        self
    }

    pub fn with_programs(mut self, programs: &[&str]) -> Self {
        self.programs.extend(programs.iter().map(|p| p.to_string()));
        self
    }

    pub fn with_env(mut self, key: &str, value: &str) -> Self {
        self.env.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_machine(mut self, machine: &str) -> Self {
        self.machine = Some(machine.to_string());
        self
    }

    pub fn as_root(mut self) -> Self {
        self.root = true;
        self
    }

    pub fn with_home(mut self, home: &str) -> Self {
        self.home = Some(PathBuf::from(home));
        self
    }
}

impl Host for FakeHost {
    fn read_file(&self, path: &Path) -> Option<String> {
        self.files.get(path).cloned()
    }

    fn file_exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }

    fn has_program(&self, program: &str) -> bool {
        self.programs.contains(program)
    }

    fn env_var(&self, key: &str) -> Option<String> {
        self.env.get(key).cloned()
    }

    fn machine(&self) -> Option<String> {
        self.machine.clone()
    }

    fn is_root(&self) -> bool {
        self.root
    }

    fn home_dir(&self) -> Option<PathBuf> {
        self.home.clone()
    }

    fn glob(&self, pattern: &str) -> Vec<PathBuf> {
        let Ok(pattern) = glob::Pattern::new(pattern) else {
            return Vec::new();
        };
        self.files
            .keys()
            .filter(|path| pattern.matches_path(path))
            .cloned()
            .collect()
    }
}

/// Program and arguments joined by single spaces, without shell quoting.
pub fn argv(cmd: &Cmd) -> String {
    std::iter::once(cmd.program())
        .chain(cmd.get_args().iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Records every operation; commands fail or produce output by prefix.
#[derive(Debug, Default)]
pub struct RecordingRunner {
    commands: RefCell<Vec<String>>,
    reads: RefCell<Vec<String>>,
    writes: RefCell<Vec<(PathBuf, String, Option<u32>)>>,
    removed: RefCell<Vec<PathBuf>>,
    outputs: Vec<(String, String)>,
    failing: Vec<String>,
    fail_at: Option<usize>,
    fail_writes: bool,
    fail_removals: bool,
    runs: Cell<usize>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// `read` of a command starting with `prefix` returns `output`.
    pub fn with_output(mut self, prefix: &str, output: &str) -> Self {
        self.outputs.push((prefix.to_string(), output.to_string()));
        self
    }

    /// `run` of a command starting with `prefix` fails.
    pub fn failing_on(mut self, prefix: &str) -> Self {
        self.failing.push(prefix.to_string());
        self
    }

    /// The `index`-th (0-based) `run` call fails.
    pub fn failing_at(mut self, index: usize) -> Self {
        self.fail_at = Some(index);
        self
    }

    pub fn failing_writes(mut self) -> Self {
        self.fail_writes = true;
        self
    }

    pub fn failing_removals(mut self) -> Self {
        self.fail_removals = true;
        self
    }

    pub fn commands(&self) -> Vec<String> {
        self.commands.borrow().clone()
    }

    pub fn reads(&self) -> Vec<String> {
        self.reads.borrow().clone()
    }

    pub fn writes(&self) -> Vec<(PathBuf, String, Option<u32>)> {
        self.writes.borrow().clone()
    }

    pub fn removed(&self) -> Vec<PathBuf> {
        self.removed.borrow().clone()
    }

    pub fn ran(&self, prefix: &str) -> bool {
        self.commands.borrow().iter().any(|c| c.starts_with(prefix))
    }

    fn record_run(&self, cmd: &Cmd) -> Result<()> {
        let line = argv(cmd);
        let index = self.runs.get();
        self.runs.set(index + 1);
        self.commands.borrow_mut().push(line.clone());

        if self.fail_at == Some(index) || self.failing.iter().any(|p| line.starts_with(p)) {
            return Err(anyhow!("Command failed: {}", line));
        }
        Ok(())
    }
}

impl CommandRunner for RecordingRunner {
    fn run(&self, cmd: &Cmd) -> Result<()> {
        self.record_run(cmd)
    }

    fn run_with_input(&self, cmd: &Cmd, _input: &str) -> Result<()> {
        self.record_run(cmd)
    }

    fn read(&self, cmd: &Cmd) -> Result<String> {
        let line = argv(cmd);
        self.reads.borrow_mut().push(line.clone());
        self.outputs
            .iter()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .ok_or_else(|| anyhow!("Command failed: {}", line))
    }

    fn write_file(&self, path: &Path, contents: &str, mode: Option<u32>) -> Result<()> {
        if self.fail_writes {
            return Err(anyhow!("writing {}", path.display()));
        }
        self.writes
            .borrow_mut()
            .push((path.to_path_buf(), contents.to_string(), mode));
        Ok(())
    }

    fn remove_path(&self, path: &Path) -> Result<()> {
        if self.fail_removals {
            return Err(anyhow!("removing {}", path.display()));
        }
        self.removed.borrow_mut().push(path.to_path_buf());
        Ok(())
    }
}

/// Answers prompts from a script and remembers what was asked.
#[derive(Debug, Default)]
pub struct ScriptedGate {
    answers: RefCell<VecDeque<bool>>,
    asked: RefCell<Vec<String>>,
}

impl ScriptedGate {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: RefCell::new(answers.iter().copied().collect()),
            asked: RefCell::new(Vec::new()),
        }
    }

    pub fn asked(&self) -> Vec<String> {
        self.asked.borrow().clone()
    }
}

impl ConfirmationGate for ScriptedGate {
    fn confirm_with_default(&self, prompt: &str, default: bool) -> bool {
        self.asked.borrow_mut().push(prompt.to_string());
        self.answers.borrow_mut().pop_front().unwrap_or(default)
    }
}

/// A gate that must never be reached.
#[derive(Debug, Default)]
pub struct ForbiddenGate;

impl ConfirmationGate for ForbiddenGate {
    fn confirm_with_default(&self, prompt: &str, _default: bool) -> bool {
        panic!("unattended run asked for confirmation: {prompt}");
    }
}
