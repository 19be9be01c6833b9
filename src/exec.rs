use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// A single external process to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub cwd: Option<PathBuf>,
    /// Added on top of the inherited environment.
    pub envs: Vec<(OsString, OsString)>,
}

impl Invocation {
    pub fn new(program: impl AsRef<OsStr>) -> Self {
        Self {
            program: program.as_ref().to_os_string(),
            args: Vec::new(),
            cwd: None,
            envs: Vec::new(),
        }
    }

    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_os_string());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_os_string()));
        self
    }

    pub fn current_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    pub fn env(mut self, key: impl AsRef<OsStr>, value: impl AsRef<OsStr>) -> Self {
        self.envs
            .push((key.as_ref().to_os_string(), value.as_ref().to_os_string()));
        self
    }

    pub fn args_lossy(&self) -> Vec<String> {
        self.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .envs(self.envs.iter().map(|(k, v)| (k, v)));
        if let Some(cwd) = &self.cwd {
            cmd.current_dir(cwd);
        }
        cmd
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program.to_string_lossy())?;
        for arg in &self.args {
            write!(f, " {}", arg.to_string_lossy())?;
        }
        Ok(())
    }
}

/// What a finished process left behind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Captured {
    /// `None` when terminated by a signal.
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl Captured {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Stdout followed by stderr, as text.
    pub fn combined(&self) -> String {
        let mut text = String::from_utf8_lossy(&self.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&self.stderr));
        text
    }

    pub fn stderr_lossy(&self) -> String {
        String::from_utf8_lossy(&self.stderr).trim().to_string()
    }
}

/// Runs external processes.
pub trait Exec {
    /// Runs to completion with stdout and stderr buffered and nothing printed.
    fn capture(&mut self, invocation: &Invocation) -> io::Result<Captured>;

    /// Runs to completion with output going to the terminal as it arrives.
    /// Stderr is also recorded so failures can be reported.
    fn stream(&mut self, invocation: &Invocation) -> io::Result<Captured>;
}

/// [`Exec`] backed by `std::process`.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExec;

impl Exec for SystemExec {
    fn capture(&mut self, invocation: &Invocation) -> io::Result<Captured> {
        let output = invocation.command().stdin(Stdio::null()).output()?;
        Ok(Captured {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }

    fn stream(&mut self, invocation: &Invocation) -> io::Result<Captured> {
        let mut child = invocation
            .command()
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .spawn()?;

        let recorded = match child.stderr.take() {
            Some(stderr) => match tee_lines(stderr, &mut io::stderr()) {
                Ok(recorded) => recorded,
                Err(e) => {
                    // Don't leave the build running unobserved.
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(e);
                }
            },
            None => Vec::new(),
        };

        let status = child.wait()?;
        Ok(Captured {
            code: status.code(),
            stdout: Vec::new(),
            stderr: recorded,
        })
    }
}

/// Copies `input` to `sink` line by line, returning everything copied.
fn tee_lines(input: impl Read, sink: &mut impl Write) -> io::Result<Vec<u8>> {
    let mut reader = BufReader::new(input);
    let mut recorded = Vec::new();
    let mut line = Vec::new();
    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        sink.write_all(&line)?;
        recorded.extend_from_slice(&line);
    }
    Ok(recorded)
}

/// Outcome of checking whether a tool can be run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// Ran and exited successfully.
    Ready(Captured),
    /// The program does not exist.
    Missing,
    /// Spawned but failed, or could not be spawned for another reason.
    ProbeFailed(String),
}

/// Runs `invocation` silently and classifies the result.
pub fn probe<E: Exec + ?Sized>(exec: &mut E, invocation: &Invocation) -> Probe {
    match exec.capture(invocation) {
        Ok(out) if out.success() => Probe::Ready(out),
        Ok(out) => Probe::ProbeFailed(out.combined().trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Probe::Missing,
        Err(e) => Probe::ProbeFailed(e.to_string()),
    }
}
