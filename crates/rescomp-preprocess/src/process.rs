use std::io::{self, Read, Write};
use std::process::{Child, ChildStdin, ChildStdout, ExitStatus, Stdio};

use crate::error::PreprocessError;
use crate::registry::Preprocessor;

/// Owns a spawned preprocessor until its exit status has been observed.
///
/// Dropping the guard without calling [`ChildGuard::wait`] kills and reaps
/// the child, so no exit path leaks a process.
struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    fn take_pipes(&mut self) -> (Option<ChildStdin>, Option<ChildStdout>) {
        match self.child.as_mut() {
            Some(child) => (child.stdin.take(), child.stdout.take()),
            None => (None, None),
        }
    }

    fn wait(mut self) -> io::Result<ExitStatus> {
        match self.child.take() {
            Some(mut child) => child.wait(),
            None => Err(io::Error::other("preprocessor already reaped")),
        }
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

/// Run `preprocessor` with `input` on its stdin and collect all of its stdout.
///
/// Stdin is written from a scoped thread while stdout is drained, so neither
/// side can block on a full pipe. The child's stderr is inherited.
pub fn run(preprocessor: &Preprocessor, input: &[u8]) -> Result<Vec<u8>, PreprocessError> {
    let program = preprocessor.name();
    let io_err = |source| PreprocessError::Io {
        program: program.clone(),
        source,
    };

    let mut command = preprocessor.launcher.command(&preprocessor.program);
    command
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::inherit());

    let child = command.spawn().map_err(|source| PreprocessError::Spawn {
        program: program.clone(),
        source,
    })?;
    let mut guard = ChildGuard::new(child);

    let (stdin, stdout) = guard.take_pipes();
    let (Some(mut stdin), Some(mut stdout)) = (stdin, stdout) else {
        return Err(io_err(io::Error::other("preprocessor pipes unavailable")));
    };

    let (read, written) = std::thread::scope(|scope| {
        let writer = scope.spawn(move || {
            let result = stdin.write_all(input);
            // Closing stdin signals end of input.
            drop(stdin);
            result
        });

        let mut output = Vec::new();
        let read = stdout.read_to_end(&mut output).map(|_| output);
        let written = writer
            .join()
            .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
        (read, written)
    });

    let status = guard.wait().map_err(io_err)?;
    if !status.success() {
        return Err(PreprocessError::Failed {
            program: program.clone(),
            status,
        });
    }

    let output = read.map_err(io_err)?;
    match written {
        Ok(()) => {}
        // The preprocessor is free to stop reading once it has what it needs.
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            log::debug!("{} closed its input early", program);
        }
        Err(e) => return Err(io_err(e)),
    }

    Ok(output)
}
