/// External process monitor
///
/// Runs one command to completion while turning the percentage tokens it
/// prints on stderr into job-scale progress updates. Runs on a blocking
/// worker thread; the caller relays updates through the callback.
use crate::modules::separation::domain::ProgressWindow;
use crate::shared::errors::ToolError;
use crate::shared::utils::LogContext;
use crate::{log_debug, log_warn};
use regex::Regex;
use std::io::{self, BufRead, BufReader};
use std::process::{Command, Stdio};
use std::sync::{Arc, LazyLock};

/// Callback receiving `(job_percent, message)`; cloneable across stages
pub type ProgressCallback = Arc<dyn Fn(u8, String) + Send + Sync>;

/// Default token: an integer immediately followed by `%`
pub static PERCENT_PATTERN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)%").unwrap());

/// Filters a stream of lines down to strictly increasing percentages
#[derive(Debug, Clone)]
pub struct ProgressTracker<'a> {
    pattern: &'a Regex,
    window: ProgressWindow,
    last_percent: u32,
}

impl<'a> ProgressTracker<'a> {
    pub fn new(pattern: &'a Regex, window: ProgressWindow) -> Self {
        Self {
            pattern,
            window,
            last_percent: 0,
        }
    }

    /// Returns `(external_percent, job_percent)` when the line advances progress
    ///
    /// Lines without a token, tokens that do not parse, and tokens not greater
    /// than the last accepted one are ignored.
    pub fn observe(&mut self, line: &str) -> Option<(u32, u8)> {
        let token = self.pattern.captures(line)?.get(1)?.as_str();
        let percent: u32 = token.parse().ok()?;
        if percent <= self.last_percent {
            return None;
        }
        self.last_percent = percent;
        Some((percent, self.window.scale(percent)))
    }

    pub fn last_percent(&self) -> u32 {
        self.last_percent
    }
}

/// Feed every line of `reader` to `on_line`
///
/// Both `\n` and `\r` terminate a line: progress bars redraw themselves with a
/// bare carriage return and would otherwise only surface once the process
/// exits. Empty lines are skipped.
pub fn for_each_line<R, F>(mut reader: R, mut on_line: F) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(&str),
{
    let mut pending: Vec<u8> = Vec::new();

    loop {
        let buf = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if buf.is_empty() {
            if !pending.is_empty() {
                on_line(&String::from_utf8_lossy(&pending));
            }
            return Ok(());
        }

        let consumed = match buf.iter().position(|b| *b == b'\n' || *b == b'\r') {
            Some(pos) => {
                pending.extend_from_slice(&buf[..pos]);
                if !pending.is_empty() {
                    on_line(&String::from_utf8_lossy(&pending));
                    pending.clear();
                }
                pos + 1
            }
            None => {
                pending.extend_from_slice(buf);
                buf.len()
            }
        };
        reader.consume(consumed);
    }
}

/// Scan `reader` and invoke `on_progress` for every accepted update
pub fn scan_progress<R, F>(
    reader: R,
    tracker: &mut ProgressTracker<'_>,
    message_prefix: &str,
    mut on_progress: F,
) -> io::Result<()>
where
    R: BufRead,
    F: FnMut(u8, String),
{
    for_each_line(reader, |line| {
        if let Some((external, mapped)) = tracker.observe(line) {
            on_progress(mapped, format!("{} {}%", message_prefix, external));
        }
    })
}

pub struct ExternalProcessMonitor {
    tool: String,
    program: String,
    args: Vec<String>,
    pattern: &'static Regex,
    window: ProgressWindow,
    message_prefix: String,
}

impl ExternalProcessMonitor {
    pub fn new(tool: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        let tool = tool.into();
        Self {
            message_prefix: format!("Running {}...", tool),
            tool,
            program: program.into(),
            args,
            pattern: &PERCENT_PATTERN,
            window: ProgressWindow::new(0, 100),
        }
    }

    pub fn with_window(mut self, window: ProgressWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_message_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.message_prefix = prefix.into();
        self
    }

    /// Run the command, blocking until it exits
    pub fn run(&self, on_progress: ProgressCallback) -> Result<(), ToolError> {
        LogContext::tool_invocation(&self.program, &self.args);

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| ToolError::from_io(&self.tool, e))?;

        let stderr = match child.stderr.take() {
            Some(stderr) => stderr,
            None => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(ToolError::Io {
                    tool: self.tool.clone(),
                    source: io::Error::other("stderr was not captured"),
                });
            }
        };

        let mut tracker = ProgressTracker::new(self.pattern, self.window);
        let scanned = scan_progress(
            BufReader::new(stderr),
            &mut tracker,
            &self.message_prefix,
            |percent, message| on_progress(percent, message),
        );

        if let Err(e) = scanned {
            log_warn!("Lost {} output stream: {}", self.tool, e);
            let _ = child.kill();
            let _ = child.wait();
            return Err(ToolError::Io {
                tool: self.tool.clone(),
                source: e,
            });
        }

        let status = child.wait().map_err(|e| ToolError::Io {
            tool: self.tool.clone(),
            source: e,
        })?;

        log_debug!(
            "{} exited with {:?} after reporting {}%",
            self.tool,
            status.code(),
            tracker.last_percent()
        );

        if !status.success() {
            return Err(ToolError::Failure {
                tool: self.tool.clone(),
                exit_code: status.code(),
            });
        }

        Ok(())
    }
}
