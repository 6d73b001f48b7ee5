//! Converter command construction
//!
//! Building a command is pure: the same template, input, and output always
//! produce the same argument vector. Nothing is spawned here.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::config::ConverterConfig;
use crate::error::Result;
use crate::shared::glob::expand_file_patterns;

/// Fixed part of a converter invocation.
///
/// Argument order: program, flags, auxiliary inputs, include directories,
/// primary input, output flag and output path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    program: String,
    flags: Vec<String>,
    aux_inputs: Vec<PathBuf>,
    include_dirs: Vec<PathBuf>,
    include_flag: String,
    output_flag: String,
}

impl CommandTemplate {
    /// Template for the parallel batch: shared flags plus the package and
    /// include context every module needs.
    ///
    /// `packages` come first, as found by the catalog, followed by the
    /// configured auxiliary inputs with globs expanded now. A path listed
    /// both ways is passed once.
    pub fn bulk(config: &ConverterConfig, packages: &[PathBuf]) -> Result<Self> {
        let mut aux_inputs = packages.to_vec();
        for path in expand_file_patterns(&config.aux_inputs)? {
            if !aux_inputs.contains(&path) {
                aux_inputs.push(path);
            }
        }

        Ok(Self {
            aux_inputs,
            include_dirs: config.include_dirs.clone(),
            ..Self::special_case(config)
        })
    }

    /// Template for the one-off conversion: shared flags only.
    pub fn special_case(config: &ConverterConfig) -> Self {
        Self {
            program: config.program.clone(),
            flags: config.flags.clone(),
            aux_inputs: Vec::new(),
            include_dirs: Vec::new(),
            include_flag: config.include_flag.clone(),
            output_flag: config.output_flag.clone(),
        }
    }

    pub fn build(&self, input: &Path, output: &Path) -> ConverterCommand {
        let mut args: Vec<OsString> = self.flags.iter().map(OsString::from).collect();
        args.extend(self.aux_inputs.iter().map(|p| p.as_os_str().to_owned()));
        for dir in &self.include_dirs {
            args.push(OsString::from(&self.include_flag));
            args.push(dir.as_os_str().to_owned());
        }
        args.push(input.as_os_str().to_owned());
        args.push(OsString::from(&self.output_flag));
        args.push(output.as_os_str().to_owned());

        ConverterCommand {
            program: self.program.clone(),
            args,
        }
    }
}

/// A fully resolved converter invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConverterCommand {
    program: String,
    args: Vec<OsString>,
}

impl ConverterCommand {
    pub fn program(&self) -> &str {
        &self.program
    }

    /// Process builder for this invocation; no shell is involved.
    pub fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for ConverterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", shell_quote(&self.program))?;
        for arg in &self.args {
            write!(f, " {}", shell_quote(&arg.to_string_lossy()))?;
        }
        Ok(())
    }
}

fn shell_quote(arg: &str) -> String {
    let plain = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./=:+,@%".contains(c));
    if plain {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
