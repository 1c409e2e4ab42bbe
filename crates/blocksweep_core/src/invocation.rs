//! Worker invocations as program + argument tokens
//!
//! Arguments are handed to the OS as-is; nothing here is ever re-parsed by
//! a shell. `Display` quotes tokens only so logged commands can be pasted
//! back into a terminal.

use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::Path;

use crate::error::{Result, SweepError};
use crate::grid::{Combination, FlagValue};

/// Flag that makes the worker print its CSV column names and exit
pub const HEADER_FLAG: &str = "--write-csv-column-names";

/// Output format requested from the worker for every combination
pub const OUTPUT_FORMAT: &str = "csv";

/// A single process execution: program and arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    program: OsString,
    args: Vec<OsString>,
}

impl Invocation {
    pub fn program(&self) -> &OsStr {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// Whether the invocation hands the worker a cached question pickle
    pub fn uses_stored_questions(&self) -> bool {
        self.args
            .iter()
            .any(|a| a.to_string_lossy().starts_with("--stored-questions="))
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

fn quote(token: &OsStr) -> String {
    let s = token.to_string_lossy();
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_=./:,+@%".contains(c));
    if plain {
        s.into_owned()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Builds worker invocations from the settings shared by every combination
#[derive(Debug, Clone)]
pub struct InvocationBuilder {
    program: OsString,
    leading_args: Vec<OsString>,
    debug_level: i32,
    blocking_method: String,
    extra_args: Vec<OsString>,
}

impl InvocationBuilder {
    /// `command` is the worker program followed by any leading arguments,
    /// e.g. `["python", "main.py"]`.
    pub fn new(
        command: &[String],
        debug_level: i32,
        blocking_method: impl Into<String>,
    ) -> Result<Self> {
        let (program, leading) = command
            .split_first()
            .ok_or_else(|| SweepError::Config("worker command is empty".to_string()))?;
        if program.trim().is_empty() {
            return Err(SweepError::Config("worker program is blank".to_string()));
        }

        Ok(Self {
            program: OsString::from(program),
            leading_args: leading.iter().map(OsString::from).collect(),
            debug_level,
            blocking_method: blocking_method.into(),
            extra_args: Vec::new(),
        })
    }

    /// Arguments appended verbatim after the generated flags
    #[must_use]
    pub fn with_extra_args(mut self, args: &[String]) -> Self {
        self.extra_args = args.iter().map(OsString::from).collect();
        self
    }

    fn base(&self) -> Vec<OsString> {
        self.leading_args.clone()
    }

    /// Invocation that writes the CSV column names
    pub fn header(&self) -> Invocation {
        let mut args = self.base();
        args.push(HEADER_FLAG.into());
        Invocation {
            program: self.program.clone(),
            args,
        }
    }

    /// Invocation for one combination. `stored_questions` is the cache entry
    /// to load, present only when the entry exists.
    pub fn for_combination(
        &self,
        combination: &Combination,
        stored_questions: Option<&Path>,
    ) -> Invocation {
        let mut args = self.base();
        args.push(format!("--limit={}", combination.limit).into());
        if let Some(path) = stored_questions {
            let mut arg = OsString::from("--stored-questions=");
            arg.push(path.as_os_str());
            args.push(arg);
        }
        args.push(format!("--debug-level={}", self.debug_level).into());
        args.push(format!("--blocking-method={}", self.blocking_method).into());
        args.push(format!("--tight-threshold={}", combination.tight_threshold).into());
        args.push(format!("--output-format={OUTPUT_FORMAT}").into());
        for FlagValue { flag, value } in &combination.extra {
            args.push(format!("--{flag}={value}").into());
        }
        args.extend(self.extra_args.iter().cloned());

        Invocation {
            program: self.program.clone(),
            args,
        }
    }
}
