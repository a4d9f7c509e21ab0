use std::io::{self, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::domain::{EmulatorConfig, ProbeError};
use crate::ports::{CancellationToken, ParameterProbe, ProbeQuery};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// Runs `<binary> <flag> <token>,?` as a child process with a bounded wait.
#[derive(Debug, Clone)]
pub struct EmulatorProbe {
    binary: PathBuf,
    timeout: Duration,
}

impl EmulatorProbe {
    pub fn new(binary: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { binary: binary.into(), timeout }
    }

    pub fn from_config(config: &EmulatorConfig) -> Self {
        Self::new(&config.binary, config.probe_timeout())
    }

    fn spawn(&self, query: &ProbeQuery) -> Result<Child, ProbeError> {
        let mut command = Command::new(&self.binary);
        command.args(query.args()).stdin(Stdio::null()).stdout(Stdio::piped()).stderr(Stdio::piped());
        // Own process group, so a wrapper script's children die with it.
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }
        command
            .spawn()
            .map_err(|e| ProbeError::Spawn {
                binary: self.binary.display().to_string(),
                token: query.token.clone(),
                details: e.to_string(),
            })
    }
}

impl ParameterProbe for EmulatorProbe {
    fn probe(&self, query: &ProbeQuery, cancel: &CancellationToken) -> Result<String, ProbeError> {
        if cancel.is_cancelled() {
            return Err(ProbeError::Cancelled { token: query.token.clone() });
        }

        debug!(binary = %self.binary.display(), flag = %query.flag, token = %query.token, "probing");
        let mut child = self.spawn(query)?;
        // Pipes drain on their own threads while the child is polled.
        let stdout = child.stdout.take().map(drain);
        let stderr = child.stderr.take().map(drain);

        let deadline = Instant::now() + self.timeout;
        let status = loop {
            match child.try_wait() {
                Ok(Some(status)) => break status,
                Ok(None) => {}
                Err(e) => {
                    terminate(&mut child);
                    return Err(ProbeError::Spawn {
                        binary: self.binary.display().to_string(),
                        token: query.token.clone(),
                        details: e.to_string(),
                    });
                }
            }
            if cancel.is_cancelled() {
                terminate(&mut child);
                warn!(token = %query.token, "probe cancelled");
                return Err(ProbeError::Cancelled { token: query.token.clone() });
            }
            if Instant::now() >= deadline {
                terminate(&mut child);
                warn!(token = %query.token, timeout = ?self.timeout, "probe timed out");
                return Err(ProbeError::TimedOut {
                    token: query.token.clone(),
                    secs: self.timeout.as_secs(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stdout = collect(stdout).map_err(|e| ProbeError::InvalidOutput {
            token: query.token.clone(),
            reason: format!("failed to read output: {}", e),
        })?;
        let stderr = collect(stderr).unwrap_or_else(|e| {
            debug!(token = %query.token, error = %e, "stderr unreadable");
            Vec::new()
        });
        debug!(token = %query.token, status = ?status.code(), bytes = stdout.len(), "probe finished");

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr).trim().to_string();
            warn!(token = %query.token, status = ?status.code(), "probe failed");
            return Err(ProbeError::Exit {
                token: query.token.clone(),
                status: status.code(),
                stderr: if stderr.is_empty() { "no error output".to_string() } else { stderr },
            });
        }

        String::from_utf8(stdout).map_err(|_| ProbeError::InvalidOutput {
            token: query.token.clone(),
            reason: "not valid UTF-8".to_string(),
        })
    }
}

fn drain<R: Read + Send + 'static>(mut pipe: R) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buffer = Vec::new();
        pipe.read_to_end(&mut buffer)?;
        Ok(buffer)
    })
}

fn collect(handle: Option<JoinHandle<io::Result<Vec<u8>>>>) -> io::Result<Vec<u8>> {
    match handle {
        Some(handle) => handle
            .join()
            .map_err(|_| io::Error::other("pipe reader thread panicked"))?,
        None => Ok(Vec::new()),
    }
}

fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Ok(pgid) = libc::pid_t::try_from(child.id()) {
        // SAFETY: signals only the process group created for this child.
        unsafe {
            libc::kill(-pgid, libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}
