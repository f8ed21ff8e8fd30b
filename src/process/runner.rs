//! Generator process execution
//!
//! [`SystemRunner`] launches the generator, funnels stdout and stderr into one
//! buffer in the order the chunks arrive, and mirrors every chunk to the
//! caller's console while the process is still running.

use std::ffi::{OsStr, OsString};
use std::io::{self, Read, Write};
use std::path::PathBuf;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use thiserror::Error;

use super::tee::TeeWriter;

/// Why a generator run did not succeed
#[derive(Error, Debug)]
pub enum ProcessError {
    /// The program could not be started at all
    #[error("failed to launch '{program}': {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The program ran and reported failure
    #[error("{}", describe_exit(.code))]
    Exit { code: Option<i32> },

    /// The program outlived its timeout and was killed
    #[error("generator timed out after {}s", .after.as_secs())]
    TimedOut { after: Duration },

    /// The run was interrupted (Ctrl+C) and the program was killed
    #[error("generator was cancelled")]
    Cancelled,

    /// Reading the program's output or waiting on it failed
    #[error("failed to capture generator output: {0}")]
    Capture(#[source] io::Error),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("generator exited with code {}", code),
        None => "generator was terminated by a signal".to_string(),
    }
}

/// A failed run together with whatever the program printed before failing
#[derive(Debug)]
pub struct ProcessFailure {
    pub error: ProcessError,
    pub output: String,
}

impl ProcessFailure {
    pub fn new(error: ProcessError, output: impl Into<String>) -> Self {
        Self {
            error,
            output: output.into(),
        }
    }
}

/// Output of a successful run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Combined stdout and stderr, interleaved as produced
    pub output: String,
}

/// A fully specified program invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: OsString,
    pub args: Vec<OsString>,
    pub current_dir: Option<PathBuf>,
    pub timeout: Option<Duration>,
}

impl Invocation {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            current_dir: None,
            timeout: None,
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Render as a single shell-pasteable line
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(shell_quote)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Quote an argument for a POSIX shell, leaving plain words untouched
pub fn shell_quote(arg: &OsStr) -> String {
    let s = arg.to_string_lossy();
    let plain = !s.is_empty()
        && s.chars()
            .all(|c| c.is_ascii_alphanumeric() || "-_./:=+,@%".contains(c));
    if plain {
        s.into_owned()
    } else {
        format!("'{}'", s.replace('\'', "'\\''"))
    }
}

/// Something that can run a generator invocation
pub trait ProcessRunner {
    /// Run to completion, mirroring output into `mirror` as it arrives
    fn run(
        &self,
        invocation: &Invocation,
        mirror: &mut dyn Write,
    ) -> Result<ProcessOutput, ProcessFailure>;
}

/// Runs invocations as real child processes
#[derive(Debug, Clone)]
pub struct SystemRunner {
    cancel: Arc<AtomicBool>,
    poll_interval: Duration,
    /// How long to keep reading output after the child is gone
    drain_grace: Duration,
}

impl Default for SystemRunner {
    fn default() -> Self {
        Self::new()
    }
}

type Chunk = io::Result<Vec<u8>>;

enum Finish {
    Exited(ExitStatus),
    TimedOut(Duration),
    Cancelled,
}

impl SystemRunner {
    pub fn new() -> Self {
        Self::with_cancel_flag(Arc::new(AtomicBool::new(false)))
    }

    /// Use a shared flag; setting it to `true` kills the running generator
    pub fn with_cancel_flag(cancel: Arc<AtomicBool>) -> Self {
        Self {
            cancel,
            poll_interval: Duration::from_millis(20),
            drain_grace: Duration::from_millis(500),
        }
    }

    fn spawn_reader<R>(mut stream: R, tx: Sender<Chunk>) -> JoinHandle<()>
    where
        R: Read + Send + 'static,
    {
        thread::spawn(move || {
            let mut buf = [0u8; 8192];
            loop {
                match stream.read(&mut buf) {
                    Ok(0) => break,
                    Ok(n) => {
                        if tx.send(Ok(buf[..n].to_vec())).is_err() {
                            break;
                        }
                    }
                    Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                    Err(e) => {
                        let _ = tx.send(Err(e));
                        break;
                    }
                }
            }
        })
    }

    fn supervise(
        &self,
        child: &mut Child,
        rx: &Receiver<Chunk>,
        tee: &mut impl Write,
        timeout: Option<Duration>,
        capture_error: &mut Option<io::Error>,
    ) -> io::Result<Finish> {
        let started = Instant::now();
        loop {
            match rx.recv_timeout(self.poll_interval) {
                Ok(chunk) => forward(chunk, tee, capture_error),
                Err(RecvTimeoutError::Timeout) => {}
                // Both pipes closed; the child is about to exit.
                Err(RecvTimeoutError::Disconnected) => thread::sleep(self.poll_interval),
            }

            if let Some(status) = child.try_wait()? {
                return Ok(Finish::Exited(status));
            }
            if self.cancel.load(Ordering::SeqCst) {
                kill(child)?;
                return Ok(Finish::Cancelled);
            }
            if let Some(limit) = timeout {
                if started.elapsed() >= limit {
                    kill(child)?;
                    return Ok(Finish::TimedOut(limit));
                }
            }
        }
    }
}

fn forward(chunk: Chunk, tee: &mut impl Write, capture_error: &mut Option<io::Error>) {
    let result = chunk.and_then(|bytes| tee.write_all(&bytes));
    if let Err(e) = result {
        capture_error.get_or_insert(e);
    }
}

/// Kill the child and everything it started
fn kill(child: &mut Child) -> io::Result<()> {
    #[cfg(unix)]
    kill_process_group(child.id());

    match child.kill() {
        Ok(()) => {}
        // Already exited between try_wait and kill.
        Err(e) if e.kind() == io::ErrorKind::InvalidInput => {}
        Err(e) => return Err(e),
    }
    child.wait().map(|_| ())
}

/// The child leads its own process group (see `run`), so wrapper scripts that
/// start the real generator without `exec` are killed along with it.
#[cfg(unix)]
fn kill_process_group(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Ok(pid) = i32::try_from(pid) {
        // ESRCH: the group is already gone.
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

/// Console side of the tee. A failing console stops being written to but
/// never fails the run; the capture buffer is the source of truth.
struct Mirror<'a> {
    inner: &'a mut dyn Write,
    broken: bool,
}

impl Write for Mirror<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.broken && self.inner.write_all(buf).is_err() {
            self.broken = true;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.broken && self.inner.flush().is_err() {
            self.broken = true;
        }
        Ok(())
    }
}

/// Collect what the readers still have, for at most `grace`.
///
/// Readers are joined only once both pipes are closed. A descendant that
/// escaped the kill may hold them open; its threads are left detached.
fn drain(
    readers: Vec<JoinHandle<()>>,
    rx: &Receiver<Chunk>,
    tee: &mut impl Write,
    capture_error: &mut Option<io::Error>,
    grace: Duration,
) {
    let deadline = Instant::now() + grace;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match rx.recv_timeout(remaining) {
            Ok(chunk) => forward(chunk, tee, capture_error),
            Err(RecvTimeoutError::Disconnected) => {
                for reader in readers {
                    let _ = reader.join();
                }
                return;
            }
            Err(RecvTimeoutError::Timeout) => return,
        }
    }
}

impl ProcessRunner for SystemRunner {
    fn run(
        &self,
        invocation: &Invocation,
        mirror: &mut dyn Write,
    ) -> Result<ProcessOutput, ProcessFailure> {
        let mut cmd = Command::new(&invocation.program);
        cmd.args(&invocation.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = &invocation.current_dir {
            cmd.current_dir(dir);
        }
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            cmd.process_group(0);
        }

        let mut child = cmd.spawn().map_err(|source| {
            ProcessFailure::new(
                ProcessError::Launch {
                    program: invocation.program.to_string_lossy().into_owned(),
                    source,
                },
                String::new(),
            )
        })?;

        let (tx, rx) = mpsc::channel();
        let mut readers = Vec::with_capacity(2);
        if let Some(stdout) = child.stdout.take() {
            readers.push(Self::spawn_reader(stdout, tx.clone()));
        }
        if let Some(stderr) = child.stderr.take() {
            readers.push(Self::spawn_reader(stderr, tx.clone()));
        }
        drop(tx);

        let mut buffer = Vec::new();
        let mut capture_error = None;
        let finish = {
            let console = Mirror {
                inner: &mut *mirror,
                broken: false,
            };
            let mut tee = TeeWriter::new(console, &mut buffer);
            let finish = self.supervise(
                &mut child,
                &rx,
                &mut tee,
                invocation.timeout,
                &mut capture_error,
            );
            if finish.is_err() {
                let _ = kill(&mut child);
            }

            drain(readers, &rx, &mut tee, &mut capture_error, self.drain_grace);
            let _ = tee.flush();
            finish
        };

        let output = String::from_utf8_lossy(&buffer).into_owned();
        let error = match finish {
            Err(e) => ProcessError::Capture(e),
            Ok(Finish::Cancelled) => ProcessError::Cancelled,
            Ok(Finish::TimedOut(after)) => ProcessError::TimedOut { after },
            Ok(Finish::Exited(status)) if !status.success() => ProcessError::Exit {
                code: status.code(),
            },
            Ok(Finish::Exited(_)) => match capture_error {
                Some(e) => ProcessError::Capture(e),
                None => return Ok(ProcessOutput { output }),
            },
        };

        Err(ProcessFailure::new(error, output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_line_quotes_only_when_needed() {
        let invocation = Invocation::new("java")
            .args(["-jar", "tools/jflex 1.9.jar", "-d"])
            .arg("it's here");
        assert_eq!(
            invocation.command_line(),
            "java -jar 'tools/jflex 1.9.jar' -d 'it'\\''s here'"
        );
    }

    #[test]
    fn shell_quote_empty_argument() {
        assert_eq!(shell_quote(OsStr::new("")), "''");
    }

    #[test]
    fn describe_exit_without_code() {
        assert_eq!(
            ProcessError::Exit { code: None }.to_string(),
            "generator was terminated by a signal"
        );
    }

    #[test]
    fn launch_failure_reports_program() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("flexgen-definitely-not-a-real-program");
        let mut console = Vec::new();

        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(matches!(failure.error, ProcessError::Launch { .. }));
        assert!(failure
            .error
            .to_string()
            .contains("flexgen-definitely-not-a-real-program"));
        assert!(failure.output.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn captures_stdout_and_stderr_and_mirrors_them() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo out; sleep 0.1; echo err 1>&2");
        let mut console = Vec::new();

        let output = runner.run(&invocation, &mut console).unwrap();
        assert_eq!(output.output, "out\nerr\n");
        assert_eq!(String::from_utf8(console).unwrap(), "out\nerr\n");
    }

    #[cfg(unix)]
    #[test]
    fn nonzero_exit_keeps_captured_output() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo 'ERROR: bad rule at line 4' 1>&2; exit 3");
        let mut console = Vec::new();

        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(matches!(failure.error, ProcessError::Exit { code: Some(3) }));
        assert_eq!(failure.output.trim(), "ERROR: bad rule at line 4");
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_hanging_process() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo starting; exec sleep 30")
            .timeout(Some(Duration::from_millis(200)));
        let mut console = Vec::new();

        let started = Instant::now();
        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(10));
        assert!(matches!(failure.error, ProcessError::TimedOut { .. }));
        assert_eq!(failure.output, "starting\n");
    }

    #[cfg(unix)]
    #[test]
    fn cancel_flag_kills_process() {
        let flag = Arc::new(AtomicBool::new(true));
        let runner = SystemRunner::with_cancel_flag(flag);
        let invocation = Invocation::new("sh").arg("-c").arg("exec sleep 30");
        let mut console = Vec::new();

        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(matches!(failure.error, ProcessError::Cancelled));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_processes_started_by_the_child() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo starting; sleep 6; echo done")
            .timeout(Some(Duration::from_millis(200)));
        let mut console = Vec::new();

        let started = Instant::now();
        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "run took {:?}",
            started.elapsed()
        );
        assert!(matches!(failure.error, ProcessError::TimedOut { .. }));
        assert_eq!(failure.output, "starting\n");
    }

    #[cfg(unix)]
    #[test]
    fn cancel_kills_processes_started_by_the_child() {
        let flag = Arc::new(AtomicBool::new(true));
        let runner = SystemRunner::with_cancel_flag(flag);
        let invocation = Invocation::new("sh").arg("-c").arg("sleep 6; echo done");
        let mut console = Vec::new();

        let started = Instant::now();
        let failure = runner.run(&invocation, &mut console).unwrap_err();
        assert!(started.elapsed() < Duration::from_secs(2));
        assert!(matches!(failure.error, ProcessError::Cancelled));
    }

    struct BrokenConsole;

    impl Write for BrokenConsole {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "console closed"))
        }
    }

    #[cfg(unix)]
    #[test]
    fn broken_console_does_not_fail_a_successful_run() {
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("echo out; echo err 1>&2");

        let output = runner.run(&invocation, &mut BrokenConsole).unwrap();
        assert!(output.output.contains("out\n"));
        assert!(output.output.contains("err\n"));
    }

    #[test]
    fn mirror_swallows_console_errors() {
        let mut console = BrokenConsole;
        let mut mirror = Mirror {
            inner: &mut console,
            broken: false,
        };
        assert_eq!(mirror.write(b"abc").unwrap(), 3);
        assert!(mirror.broken);
        assert!(mirror.flush().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn runs_in_requested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let runner = SystemRunner::new();
        let invocation = Invocation::new("sh")
            .arg("-c")
            .arg("touch marker")
            .current_dir(dir.path());
        let mut console = Vec::new();

        runner.run(&invocation, &mut console).unwrap();
        assert!(dir.path().join("marker").exists());
    }
}
