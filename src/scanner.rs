//! Runs an external command through a process pipe and streams its stdout, line by line, to a writer.
//!
//! Acquisition of the child process and the line buffer are both scoped: the [`Launcher::Pipe`] closes stdout and reaps the child when dropped and the [`BufferAllocator::Buffer`] is freed when dropped, so every exit path of [`Scanner::run_to`] releases whatever was acquired exactly once.
//!
//! Lines are staged in a fixed capacity buffer like `fgets`. A line longer than the capacity is split across reads and each chunk written verbatim, so output remains byte-identical but the buffer is never grown.
//!
//! A failed read ends the copy like end of stream does. The read error is logged rather than returned.
use std::fmt;
use std::io::{self, Read, Write};
use std::process::{Child, ChildStdout, Command, Stdio};

use crate::error::{Error, ErrorKind, Result};

/// Program run when none is configured
pub const DEFAULT_COMMAND: &str = "lsusb";
/// Capacity in bytes of the line buffer
pub const DEFAULT_BUFFER_SIZE: usize = 1024;

/// The external command to spawn; program is resolved using the `PATH` search of the platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    /// Program name or path
    pub program: String,
    /// Arguments passed to program
    pub args: Vec<String>,
}

impl Default for ExternalCommand {
    fn default() -> Self {
        ExternalCommand::new(DEFAULT_COMMAND)
    }
}

impl fmt::Display for ExternalCommand {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in self.args.iter() {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

impl ExternalCommand {
    /// New command running `program` with no arguments
    pub fn new(program: &str) -> Self {
        ExternalCommand {
            program: program.to_string(),
            args: Vec::new(),
        }
    }

    /// Add arguments to the command
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.args
            .extend(args.into_iter().map(|a| a.as_ref().to_string()));
        self
    }
}

/// Starts an [`ExternalCommand`] and hands back its stdout as a readable pipe
///
/// The returned pipe owns the process; dropping it must release the process.
pub trait Launcher {
    /// Readable stdout of the running command
    type Pipe: Read;

    /// Spawn `command`; the [`io::Error`] is what the OS reported
    fn launch(&self, command: &ExternalCommand) -> io::Result<Self::Pipe>;
}

/// [`Launcher`] using [`std::process::Command`]. stdout is piped, stdin and stderr are inherited.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    type Pipe = ChildPipe;

    fn launch(&self, command: &ExternalCommand) -> io::Result<ChildPipe> {
        let mut child = Command::new(&command.program)
            .args(&command.args)
            .stdout(Stdio::piped())
            .spawn()?;
        let stdout = child.stdout.take();
        log::debug!("Spawned '{}' pid {}", command, child.id());

        Ok(ChildPipe {
            program: command.program.to_owned(),
            child,
            stdout,
        })
    }
}

/// Child process with its piped stdout. Drop closes the pipe then waits for the child to exit.
#[derive(Debug)]
pub struct ChildPipe {
    program: String,
    child: Child,
    stdout: Option<ChildStdout>,
}

impl ChildPipe {
    /// OS process id of the child
    pub fn id(&self) -> u32 {
        self.child.id()
    }
}

impl Read for ChildPipe {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.stdout.as_mut() {
            Some(stdout) => stdout.read(buf),
            None => Ok(0),
        }
    }
}

impl Drop for ChildPipe {
    fn drop(&mut self) {
        // close first so a child blocked writing a full pipe gets EPIPE rather than deadlock the wait
        drop(self.stdout.take());
        match self.child.wait() {
            Ok(status) => log::debug!("'{}' exited with {}", self.program, status),
            Err(e) => log::warn!("Failed to reap '{}': {}", self.program, e),
        }
    }
}

/// Provides the fixed capacity buffer lines are staged in
pub trait BufferAllocator {
    /// The buffer; freed when dropped
    type Buffer: AsMut<[u8]>;

    /// Allocate a buffer of exactly `capacity` bytes or fail with [`ErrorKind::Allocation`]
    fn allocate(&self, capacity: usize) -> Result<Self::Buffer>;
}

/// [`BufferAllocator`] on the global allocator which reports failure rather than aborting
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemAllocator;

impl BufferAllocator for SystemAllocator {
    type Buffer = Vec<u8>;

    fn allocate(&self, capacity: usize) -> Result<Vec<u8>> {
        let mut buffer: Vec<u8> = Vec::new();
        buffer.try_reserve_exact(capacity).map_err(|e| {
            log::error!("Line buffer allocation failed: {}", e);
            Error::new_allocation(capacity)
        })?;
        buffer.resize(capacity, 0);
        Ok(buffer)
    }
}

/// Reads `fgets` style chunks from `reader` using only the borrowed buffer for staging
///
/// Each chunk ends with a newline, or is a full buffer, or is the remainder at end of stream.
pub struct LineReader<'b, R> {
    reader: R,
    buf: &'b mut [u8],
    pos: usize,
    filled: usize,
    error: Option<io::Error>,
}

impl<'b, R: Read> LineReader<'b, R> {
    /// New reader staging into `buf`; `buf` must not be empty
    pub fn new(reader: R, buf: &'b mut [u8]) -> Self {
        LineReader {
            reader,
            buf,
            pos: 0,
            filled: 0,
            error: None,
        }
    }

    /// Next chunk or `None` at end of stream.
    ///
    /// If a read fails with data still staged, that data is returned first and the error on the following call.
    pub fn next_line(&mut self) -> io::Result<Option<&[u8]>> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }

        loop {
            if let Some(i) = self.buf[self.pos..self.filled]
                .iter()
                .position(|&b| b == b'\n')
            {
                let start = self.pos;
                self.pos += i + 1;
                return Ok(Some(&self.buf[start..self.pos]));
            }

            if self.pos == 0 && self.filled == self.buf.len() {
                self.pos = self.filled;
                return Ok(Some(&self.buf[..self.filled]));
            }

            if self.pos > 0 {
                self.buf.copy_within(self.pos..self.filled, 0);
                self.filled -= self.pos;
                self.pos = 0;
            }

            match self.reader.read(&mut self.buf[self.filled..]) {
                Ok(0) => return Ok(self.take_remaining()),
                Ok(n) => self.filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    if self.filled == 0 {
                        return Err(e);
                    }
                    self.error = Some(e);
                    return Ok(self.take_remaining());
                }
            }
        }
    }

    fn take_remaining(&mut self) -> Option<&[u8]> {
        if self.pos == self.filled {
            return None;
        }
        let start = self.pos;
        self.pos = self.filled;
        Some(&self.buf[start..self.filled])
    }
}

/// Streams the stdout of an [`ExternalCommand`] to a writer
///
/// ```no_run
/// use usbscan::scanner::{ExternalCommand, Scanner};
///
/// let scanner = Scanner::new(ExternalCommand::new("lsusb").args(["-t"]));
/// scanner.run_and_print().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct Scanner<L = SystemLauncher, A = SystemAllocator> {
    command: ExternalCommand,
    buffer_size: usize,
    launcher: L,
    allocator: A,
}

impl Default for Scanner {
    fn default() -> Self {
        Scanner::new(ExternalCommand::default())
    }
}

impl Scanner {
    /// New [`Scanner`] for `command` using the system launcher and allocator
    pub fn new(command: ExternalCommand) -> Self {
        Scanner {
            command,
            buffer_size: DEFAULT_BUFFER_SIZE,
            launcher: SystemLauncher,
            allocator: SystemAllocator,
        }
    }
}

impl<L: Launcher, A: BufferAllocator> Scanner<L, A> {
    /// Replace the [`Launcher`]
    pub fn with_launcher<M: Launcher>(self, launcher: M) -> Scanner<M, A> {
        Scanner {
            command: self.command,
            buffer_size: self.buffer_size,
            launcher,
            allocator: self.allocator,
        }
    }

    /// Replace the [`BufferAllocator`]
    pub fn with_allocator<B: BufferAllocator>(self, allocator: B) -> Scanner<L, B> {
        Scanner {
            command: self.command,
            buffer_size: self.buffer_size,
            launcher: self.launcher,
            allocator,
        }
    }

    /// Set line buffer capacity in bytes
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    /// The command that will be run
    pub fn command(&self) -> &ExternalCommand {
        &self.command
    }

    /// Line buffer capacity in bytes
    pub fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    /// Run the command, copying its output to process stdout followed by a blank line
    pub fn run_and_print(&self) -> Result<()> {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        self.run_to(&mut handle)
    }

    /// Run the command, copying its output to `out` followed by a blank line
    ///
    /// Nothing is written if the command fails to start or the buffer cannot be allocated.
    pub fn run_to<W: Write>(&self, out: &mut W) -> Result<()> {
        if self.buffer_size == 0 {
            return Err(Error::new(
                ErrorKind::InvalidArg,
                "Line buffer size must be at least 1 byte",
            ));
        }

        let pipe = self.launcher.launch(&self.command).map_err(|e| {
            log::error!("Failed to spawn '{}': {}", self.command, e);
            Error::new_spawn(&self.command.program, &e)
        })?;

        // pipe dropped (and so reaped) on any return from here
        let mut buffer = self.allocator.allocate(self.buffer_size)?;
        let mut reader = LineReader::new(pipe, buffer.as_mut());
        let mut count = 0usize;

        loop {
            match reader.next_line() {
                Ok(Some(line)) => {
                    out.write_all(line)?;
                    count += 1;
                }
                Ok(None) => break,
                Err(e) => {
                    log::warn!(
                        "Reading '{}' output failed, treating as end of output: {}",
                        self.command,
                        e
                    );
                    break;
                }
            }
        }

        out.write_all(b"\n")?;
        out.flush()?;
        log::info!("Copied {} chunks from '{}'", count, self.command);

        Ok(())
    }
}

/// Run `lsusb` and print its output followed by a blank line
pub fn run_and_print() -> Result<()> {
    Scanner::new(ExternalCommand::default()).run_and_print()
}
