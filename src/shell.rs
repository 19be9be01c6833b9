use std::fmt;
use std::io::{self, Write};

use is_terminal::IsTerminal;
use termcolor::Color::{Cyan, Green, Red, Yellow};
use termcolor::{self, BufferWriter, Color, ColorSpec, StandardStream, WriteColor};

/// The requested verbosity of output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    VeryVerbose,
    Verbose,
    Normal,
    Quiet,
}

/// An abstraction around console output that remembers preferences for output
/// verbosity and color.
pub struct Shell {
    output: ShellOut,
    verbosity: Verbosity,
}

impl fmt::Debug for Shell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.output {
            ShellOut::Write(_) => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .finish(),
            ShellOut::Stream { color_choice, .. } => f
                .debug_struct("Shell")
                .field("verbosity", &self.verbosity)
                .field("color_choice", color_choice)
                .finish(),
        }
    }
}

enum ShellOut {
    /// A plain write object without color support.
    Write(Box<dyn Write>),
    /// Color-enabled stdio, with information on whether color should be used.
    Stream {
        stdout: StandardStream,
        stderr: StandardStream,
        color_choice: ColorChoice,
    },
}

impl Default for Shell {
    fn default() -> Self {
        Self::new()
    }
}

impl Shell {
    /// Creates a new shell (color choice and verbosity), defaulting to 'auto' color and verbose
    /// output.
    pub fn new() -> Shell {
        Shell {
            output: ShellOut::Stream {
                stdout: StandardStream::stdout(
                    ColorChoice::Auto.to_termcolor_color_choice(Stream::Stdout),
                ),
                stderr: StandardStream::stderr(
                    ColorChoice::Auto.to_termcolor_color_choice(Stream::Stderr),
                ),
                color_choice: ColorChoice::Auto,
            },
            verbosity: Verbosity::Normal,
        }
    }

    /// Creates a shell from a plain writable object, with no color, and max verbosity.
    pub fn from_write(out: Box<dyn Write>) -> Shell {
        Shell {
            output: ShellOut::Write(out),
            verbosity: Verbosity::Verbose,
        }
    }

    /// Prints a message, where the status will have `color` color, and can be justified. The
    /// messages follows without color.
    fn print(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        color: Color,
        justified: bool,
    ) -> io::Result<()> {
        match self.verbosity {
            Verbosity::Quiet => Ok(()),
            _ => self.output.message_stderr(status, message, color, justified),
        }
    }

    /// Gets a reference to the underlying stdout writer.
    pub fn out(&mut self) -> &mut dyn Write {
        self.output.stdout()
    }

    /// Shortcut to right-align and color green a status message.
    pub fn status<T, U>(&mut self, status: T, message: U) -> io::Result<()>
    where
        T: fmt::Display,
        U: fmt::Display,
    {
        self.print(&status, Some(&message), Green, true)
    }

    /// Shortcut to right-align a status message.
    pub fn status_with_color<T, U>(&mut self, status: T, message: U, color: Color) -> io::Result<()>
    where
        T: fmt::Display,
        U: fmt::Display,
    {
        self.print(&status, Some(&message), color, true)
    }

    /// Runs the callback only if we are in verbose mode.
    pub fn verbose<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(&mut Shell) -> io::Result<()>,
    {
        match self.verbosity {
            Verbosity::Verbose | Verbosity::VeryVerbose => callback(self),
            _ => Ok(()),
        }
    }

    /// Runs the callback only if we are in very verbose mode.
    pub fn very_verbose<F>(&mut self, mut callback: F) -> io::Result<()>
    where
        F: FnMut(&mut Shell) -> io::Result<()>,
    {
        match self.verbosity {
            Verbosity::VeryVerbose => callback(self),
            _ => Ok(()),
        }
    }

    /// Prints a red 'error' message. Errors are printed even in quiet mode.
    pub fn error<T: fmt::Display>(&mut self, message: T) -> io::Result<()> {
        self.output
            .message_stderr(&"error", Some(&message), Red, false)
    }

    /// Prints an amber 'warning' message.
    pub fn warn<T: fmt::Display>(&mut self, message: T) -> io::Result<()> {
        self.print(&"warning", Some(&message), Yellow, false)
    }

    /// Prints a cyan 'note' message.
    pub fn note<T: fmt::Display>(&mut self, message: T) -> io::Result<()> {
        self.print(&"note", Some(&message), Cyan, false)
    }

    /// Updates the verbosity of the shell.
    pub fn set_verbosity(&mut self, verbosity: Verbosity) {
        self.verbosity = verbosity;
    }

    /// Updates the color choice (always, never, or auto) from a string.
    pub fn set_color_choice(&mut self, color: Option<&str>) -> anyhow::Result<()> {
        if let ShellOut::Stream {
            stdout,
            stderr,
            color_choice,
            ..
        } = &mut self.output
        {
            let cfg = match color {
                Some("always") => ColorChoice::Always,
                Some("never") => ColorChoice::Never,
                Some("auto") | None => ColorChoice::Auto,
                Some(arg) => anyhow::bail!(
                    "argument for --color must be auto, always, or never, but found `{}`",
                    arg
                ),
            };
            *color_choice = cfg;
            *stdout = StandardStream::stdout(cfg.to_termcolor_color_choice(Stream::Stdout));
            *stderr = StandardStream::stderr(cfg.to_termcolor_color_choice(Stream::Stderr));
        }
        Ok(())
    }
}

impl ShellOut {
    /// Prints out a message with a status. The status comes first, and is bold plus the given
    /// color. The status can be justified, in which case the max width that will right align is
    /// 12 chars.
    fn message_stderr(
        &mut self,
        status: &dyn fmt::Display,
        message: Option<&dyn fmt::Display>,
        color: Color,
        justified: bool,
    ) -> io::Result<()> {
        match self {
            ShellOut::Stream { stderr, .. } => {
                let mut buffer = BufferWriter::stderr(termcolor::ColorChoice::Never).buffer();
                if stderr.supports_color() {
                    buffer = BufferWriter::stderr(termcolor::ColorChoice::Always).buffer();
                }
                buffer.reset()?;
                buffer.set_color(ColorSpec::new().set_bold(true).set_fg(Some(color)))?;
                if justified {
                    write!(buffer, "{status:>12}")?;
                } else {
                    write!(buffer, "{status}")?;
                    buffer.set_color(ColorSpec::new().set_bold(true))?;
                    write!(buffer, ":")?;
                }
                buffer.reset()?;
                match message {
                    Some(message) => writeln!(buffer, " {message}")?,
                    None => write!(buffer, " ")?,
                }
                stderr.write_all(buffer.as_slice())?;
            }
            ShellOut::Write(w) => {
                if justified {
                    write!(w, "{status:>12}")?;
                } else {
                    write!(w, "{status}:")?;
                }
                match message {
                    Some(message) => writeln!(w, " {message}")?,
                    None => write!(w, " ")?,
                }
            }
        }
        Ok(())
    }

    /// Gets stdout as a `io::Write`.
    fn stdout(&mut self) -> &mut dyn Write {
        match self {
            ShellOut::Stream { stdout, .. } => stdout,
            ShellOut::Write(w) => w,
        }
    }
}

/// Whether messages should use color output
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum ColorChoice {
    /// Force color output
    Always,
    /// Force disable color output
    Never,
    /// Intelligently guess whether to use color output
    Auto,
}

enum Stream {
    Stdout,
    Stderr,
}

impl ColorChoice {
    /// Converts our color choice to termcolor's version.
    fn to_termcolor_color_choice(self, stream: Stream) -> termcolor::ColorChoice {
        match self {
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
            ColorChoice::Auto => {
                let is_tty = match stream {
                    Stream::Stdout => io::stdout().is_terminal(),
                    Stream::Stderr => io::stderr().is_terminal(),
                };
                if is_tty {
                    termcolor::ColorChoice::Auto
                } else {
                    termcolor::ColorChoice::Never
                }
            }
        }
    }
}
