//! Bot backed by an external program.
//!
//! The configured program is started once per run with its configured
//! arguments followed by `follow` or `unfollow`.  The [`BotRequest`] is
//! written to its stdin as a single JSON object, then stdin is closed.
//!
//! The program reports on stdout, one line per event:
//!
//! ```text
//! {"event":"log","message":"Logged in as me"}
//! {"event":"processed","account":"alice"}
//! {"event":"done","accounts":["alice","bob"]}
//! ```
//!
//! Any other line is forwarded as a progress message.  Bytes that are not
//! valid UTF-8 are replaced, never fatal.  A `done` line sets
//! the run result; without one the result is the list of `processed`
//! accounts.  A non-zero exit status fails the run with the tail of stderr.

use std::io::{BufRead, BufReader, ErrorKind, Read, Write};
use std::process::{Child, Command, Stdio};
use std::thread;

use igauto_core::ActionKind;
use serde::Deserialize;
use tracing::{debug, info};

use crate::application::bot::{AutomationBot, BotError, BotFactory, BotRequest, ProgressSink};

/// How much of stderr is kept for the error message.
const STDERR_TAIL_BYTES: usize = 2048;

/// One parsed stdout line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum BotLine {
    Log { message: String },
    Processed { account: String },
    Done { accounts: Vec<String> },
}

/// Interprets one stdout line.  Blank lines yield `None`; lines that are not
/// protocol JSON become [`BotLine::Log`].
pub fn parse_bot_line(line: &str) -> Option<BotLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with('{') {
        if let Ok(parsed) = serde_json::from_str::<BotLine>(trimmed) {
            return Some(parsed);
        }
    }
    Some(BotLine::Log {
        message: trimmed.to_string(),
    })
}

/// Creates [`ProcessBot`]s for the configured program.
#[derive(Debug, Clone, Default)]
pub struct ProcessBotFactory {
    program: Option<String>,
    args: Vec<String>,
}

impl ProcessBotFactory {
    /// `program` of `None` makes every `create` fail with
    /// [`BotError::NotConfigured`].
    pub fn new(program: Option<String>, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

impl BotFactory for ProcessBotFactory {
    fn create(&self, request: &BotRequest) -> Result<Box<dyn AutomationBot>, BotError> {
        let program = self.program.clone().ok_or(BotError::NotConfigured)?;
        Ok(Box::new(ProcessBot {
            program,
            args: self.args.clone(),
            request: request.clone(),
        }))
    }
}

/// One run of the external bot program.
pub struct ProcessBot {
    program: String,
    args: Vec<String>,
    request: BotRequest,
}

impl ProcessBot {
    fn run(&mut self, kind: ActionKind, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        let mut child = Command::new(&self.program)
            .args(&self.args)
            .arg(kind.as_str())
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| BotError::Spawn {
                program: self.program.clone(),
                source,
            })?;
        info!(program = %self.program, %kind, pid = child.id(), "bot program started");

        match self.drive(&mut child, sink) {
            Ok(result) => Ok(result),
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                Err(err)
            }
        }
    }

    fn drive(&self, child: &mut Child, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        let mut payload = serde_json::to_vec(&self.request).map_err(std::io::Error::from)?;
        payload.push(b'\n');

        // Write the request and drain stderr on their own threads so a
        // program that logs before reading stdin cannot leave both sides
        // blocked on full pipes.
        let stdin_writer = child.stdin.take().map(|mut stdin| {
            thread::spawn(move || match stdin.write_all(&payload) {
                // The program may exit without reading its request.
                Err(e) if e.kind() == ErrorKind::BrokenPipe => {
                    debug!("bot program closed stdin early");
                    Ok(())
                }
                other => other,
            })
        });
        let stderr_reader = child.stderr.take().map(|mut stderr| {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = stderr.read_to_end(&mut buf);
                String::from_utf8_lossy(&buf).into_owned()
            })
        });

        let mut done: Option<Vec<String>> = None;
        if let Some(stdout) = child.stdout.take() {
            let mut reader = BufReader::new(stdout);
            let mut raw = Vec::new();
            loop {
                raw.clear();
                if reader.read_until(b'\n', &mut raw)? == 0 {
                    break;
                }
                // Bot output in a legacy encoding still reaches the log.
                let line = String::from_utf8_lossy(&raw);
                match parse_bot_line(&line) {
                    Some(BotLine::Log { message }) => sink.message(message),
                    Some(BotLine::Processed { account }) => sink.processed(account),
                    Some(BotLine::Done { accounts }) => done = Some(accounts),
                    None => {}
                }
            }
        }

        let status = child.wait()?;
        let stderr = stderr_reader
            .and_then(|handle| handle.join().ok())
            .unwrap_or_default();

        if !status.success() {
            return Err(BotError::Exited {
                status: status.to_string(),
                stderr: tail(&stderr, STDERR_TAIL_BYTES),
            });
        }
        if let Some(handle) = stdin_writer {
            handle
                .join()
                .map_err(|_| std::io::Error::other("stdin writer panicked"))??;
        }

        Ok(done.unwrap_or_else(|| sink.processed_accounts().to_vec()))
    }
}

impl AutomationBot for ProcessBot {
    fn run_follow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        self.run(ActionKind::Follow, sink)
    }

    fn run_unfollow(&mut self, sink: &mut ProgressSink) -> Result<Vec<String>, BotError> {
        self.run(ActionKind::Unfollow, sink)
    }
}

/// Last `max` bytes of `text`, trimmed, cut on a char boundary.
fn tail(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    let mut start = trimmed.len().saturating_sub(max);
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}
