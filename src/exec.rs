//! External tool invocation.
//!
//! The packaging tools are chatty and slow; both of their output streams
//! are drained concurrently so the child can never block on a full pipe,
//! and every line is logged as it arrives.

use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use tracing::{error, info};

use crate::PackError;

/// Run `program` with `arguments`, logging the full argument list up front
/// and every output line as it is produced. Fails if the tool cannot be
/// spawned or exits with a non-zero status.
pub fn run_logged(tool: &str, program: &Path, arguments: &[String]) -> Result<(), PackError> {
    info!("{}[0]: {}", tool, program.display());
    for (index, argument) in arguments.iter().enumerate() {
        info!("{}[{}]: {}", tool, index + 1, argument);
    }

    let mut child = Command::new(program)
        .args(arguments)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| PackError::Io {
            source: e,
            path: program.to_path_buf(),
        })?;

    // Both pipes are always present given the Stdio::piped settings above.
    let stdout = child.stdout.take().ok_or_else(|| PackError::Io {
        source: io::Error::new(io::ErrorKind::Other, "child stdout was not captured"),
        path: program.to_path_buf(),
    })?;
    let stderr = child.stderr.take().ok_or_else(|| PackError::Io {
        source: io::Error::new(io::ErrorKind::Other, "child stderr was not captured"),
        path: program.to_path_buf(),
    })?;

    let stdout_tool = tool.to_string();
    let stdout_thread = thread::spawn(move || {
        drain_lines(stdout, |line| info!("{}: stdout: {}", stdout_tool, line));
    });

    let stderr_tool = tool.to_string();
    let stderr_thread = thread::spawn(move || {
        drain_lines(stderr, |line| error!("{}: stderr: {}", stderr_tool, line));
    });

    let status = child.wait().map_err(|e| PackError::Io {
        source: e,
        path: program.to_path_buf(),
    })?;
    let _ = stdout_thread.join();
    let _ = stderr_thread.join();

    if !status.success() {
        return Err(PackError::ToolFailed {
            tool: tool.to_string(),
            status,
        });
    }
    Ok(())
}

fn drain_lines<R: Read>(stream: R, mut log: impl FnMut(&str)) {
    let reader = BufReader::new(stream);
    for line in reader.lines() {
        match line {
            Ok(line) => log(&line),
            Err(e) => {
                error!("output stream read failed: {}", e);
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[cfg(unix)]
    #[test]
    fn succeeding_tool_is_ok() {
        run_logged("true", &PathBuf::from("/bin/true"), &[]).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn failing_tool_surfaces_its_status() {
        let err = run_logged("false", &PathBuf::from("/bin/false"), &[]).unwrap_err();
        assert!(matches!(err, PackError::ToolFailed { ref tool, .. } if tool == "false"));
    }

    #[test]
    fn missing_tool_is_an_io_error() {
        let err = run_logged(
            "nope",
            &PathBuf::from("/definitely/not/a/real/tool"),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, PackError::Io { .. }));
    }
}
