// Subprocess agent invoker
// reason: async-trait, tokio for async process management
use async_trait::async_trait;
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, warn};

use ripley_core::domain::ProbeDefinition;
use ripley_core::port::agent_invoker::{AgentInvoker, CompletedRun, InvocationError};

/// Grace period for reading buffered output after the process has exited
const OUTPUT_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Flag carrying the probe's token budget to the agent
pub const MAX_TOKENS_FLAG: &str = "--max-tokens";

type SharedBuffer = Arc<Mutex<Vec<u8>>>;

/// How to launch the external agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentCommand {
    pub program: String,
    /// Fixed arguments placed before the token limit flag
    pub args: Vec<String>,
    /// Environment variables passed through. Empty means inherit everything.
    pub env_allowlist: Vec<String>,
}

impl AgentCommand {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            env_allowlist: Vec::new(),
        }
    }

    pub fn with_env_allowlist(mut self, env_allowlist: Vec<String>) -> Self {
        self.env_allowlist = env_allowlist;
        self
    }
}

/// Subprocess invoker
/// Runs the agent non-interactively: prompt on stdin, stdout and stderr merged,
/// raced against the probe deadline.
pub struct SubprocessAgentInvoker {
    command: AgentCommand,
}

impl SubprocessAgentInvoker {
    /// Create a new subprocess invoker
    ///
    /// # Example
    /// ```ignore
    /// let invoker = SubprocessAgentInvoker::new(AgentCommand::new(
    ///     "claude",
    ///     vec!["--model".into(), "Sonnet".into(), "--fresh".into()],
    /// ));
    /// ```
    pub fn new(command: AgentCommand) -> Self {
        Self { command }
    }

    /// Fixed args followed by the probe's token budget
    fn build_args(&self, probe: &ProbeDefinition) -> Vec<String> {
        let mut args = self.command.args.clone();
        args.push(MAX_TOKENS_FLAG.to_string());
        args.push(probe.max_tokens.to_string());
        args
    }

    /// Filter environment variables to allowlist only
    fn filter_env(&self, env: impl IntoIterator<Item = (String, String)>) -> HashMap<String, String> {
        env.into_iter()
            .filter(|(k, _)| self.command.env_allowlist.contains(k))
            .collect()
    }

    fn spawn(&self, probe: &ProbeDefinition) -> std::io::Result<Child> {
        let mut command = Command::new(&self.command.program);
        command
            .args(self.build_args(probe))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if !self.command.env_allowlist.is_empty() {
            command.env_clear().envs(self.filter_env(std::env::vars()));
        }

        // Own process group so a timeout can take down the agent's children too
        #[cfg(unix)]
        command.process_group(0);

        command.spawn()
    }

    /// Write the prompt and close stdin so the agent sees EOF
    fn feed_prompt(child: &mut Child, prompt: &str) {
        if let Some(mut stdin) = child.stdin.take() {
            let prompt = prompt.to_string();
            tokio::spawn(async move {
                if let Err(e) = stdin.write_all(prompt.as_bytes()).await {
                    debug!(error = %e, "Agent closed stdin before reading the full prompt");
                }
            });
        }
    }

    /// Copy stdout and stderr into one buffer as chunks arrive
    fn capture_output(child: &mut Child) -> (SharedBuffer, Vec<JoinHandle<()>>) {
        let buffer: SharedBuffer = Arc::new(Mutex::new(Vec::new()));
        let mut pumps = Vec::with_capacity(2);

        if let Some(stdout) = child.stdout.take() {
            pumps.push(tokio::spawn(pump(stdout, Arc::clone(&buffer))));
        }
        if let Some(stderr) = child.stderr.take() {
            pumps.push(tokio::spawn(pump(stderr, Arc::clone(&buffer))));
        }

        (buffer, pumps)
    }

    /// Wait for the pumps to hit EOF; abandon any stream a grandchild keeps open
    async fn drain(pumps: Vec<JoinHandle<()>>) {
        for mut pump in pumps {
            if timeout(OUTPUT_DRAIN_TIMEOUT, &mut pump).await.is_err() {
                warn!("Agent output stream still open after exit, truncating");
                pump.abort();
            }
        }
    }

    /// Race natural completion against the probe deadline
    async fn race(
        &self,
        mut child: Child,
        probe: &ProbeDefinition,
        started: Instant,
    ) -> Result<CompletedRun, InvocationError> {
        Self::feed_prompt(&mut child, &probe.prompt);
        let (buffer, pumps) = Self::capture_output(&mut child);

        tokio::select! {
            status = child.wait() => {
                let elapsed = started.elapsed();
                Self::drain(pumps).await;

                let exit_error = match status {
                    Ok(status) if status.success() => None,
                    Ok(status) => Some(status.to_string()),
                    Err(e) => Some(e.to_string()),
                };

                let output = match buffer.lock() {
                    Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                    Err(poisoned) => String::from_utf8_lossy(&poisoned.into_inner()).into_owned(),
                };

                info!(
                    probe = %probe.name,
                    duration_ms = elapsed.as_millis() as u64,
                    exit_error = ?exit_error,
                    output_bytes = output.len(),
                    "Agent process completed"
                );

                Ok(CompletedRun { output, elapsed, exit_error })
            }
            _ = sleep(probe.timeout()) => {
                terminate(&mut child).await;
                let elapsed = started.elapsed();
                for pump in pumps {
                    pump.abort();
                }

                warn!(
                    probe = %probe.name,
                    duration_ms = elapsed.as_millis() as u64,
                    timeout_secs = probe.max_duration_secs,
                    "Agent process killed after deadline"
                );

                Err(InvocationError::TimedOut { elapsed })
            }
        }
    }
}

async fn pump<R: AsyncRead + Unpin>(mut reader: R, buffer: SharedBuffer) {
    let mut chunk = [0u8; 4096];
    loop {
        match reader.read(&mut chunk).await {
            Ok(0) => break,
            Ok(n) => {
                if let Ok(mut bytes) = buffer.lock() {
                    bytes.extend_from_slice(&chunk[..n]);
                }
            }
            Err(e) => {
                debug!(error = %e, "Agent output stream read failed");
                break;
            }
        }
    }
}

/// Force-kill the agent. Safe to call on a process that already exited.
async fn terminate(child: &mut Child) {
    #[cfg(unix)]
    if let Some(pid) = child.id() {
        use nix::sys::signal::{killpg, Signal};
        use nix::unistd::Pid;

        if let Err(e) = killpg(Pid::from_raw(pid as i32), Signal::SIGKILL) {
            debug!(pid = %pid, error = %e, "killpg failed, falling back to direct kill");
        }
    }

    if let Err(e) = child.kill().await {
        debug!(error = %e, "Agent process already gone");
    }
}

#[async_trait]
impl AgentInvoker for SubprocessAgentInvoker {
    async fn invoke(&self, probe: &ProbeDefinition) -> Result<CompletedRun, InvocationError> {
        info!(
            program = %self.command.program,
            args = ?self.build_args(probe),
            probe = %probe.name,
            timeout_secs = probe.max_duration_secs,
            "Starting agent process"
        );

        let started = Instant::now();
        let child = self.spawn(probe).map_err(|e| {
            warn!(program = %self.command.program, error = %e, "Agent process failed to start");
            InvocationError::LaunchFailed(e.to_string())
        })?;

        self.race(child, probe, started).await
    }
}
