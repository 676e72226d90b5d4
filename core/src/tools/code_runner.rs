use crate::traits::CodeRunner;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;

const TRIGGER: &str = "run code:";
const NO_OUTPUT: &str = "(no output)";

/// Strips the `run code:` trigger and any surrounding markdown fence.
pub fn extract_code(payload: &str) -> String {
    let mut code = payload.trim();
    if code
        .get(..TRIGGER.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(TRIGGER))
    {
        code = code[TRIGGER.len()..].trim();
    }

    if let Some(fenced) = code.strip_prefix("```") {
        let body = fenced.split_once('\n').map_or(fenced, |(_, rest)| rest);
        code = body.trim_end().strip_suffix("```").unwrap_or(body).trim_end();
    }
    code.to_string()
}

#[derive(Debug, Serialize)]
struct PistonRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<PistonFile<'a>>,
}

#[derive(Debug, Serialize)]
struct PistonFile<'a> {
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct PistonResponse {
    run: PistonRun,
}

#[derive(Debug, Deserialize)]
struct PistonRun {
    #[serde(default)]
    output: String,
    #[serde(default)]
    stderr: String,
    #[serde(default)]
    code: Option<i64>,
}

/// Remote sandbox speaking the Piston execute API.
pub struct PistonRunner {
    client: reqwest::Client,
    base_url: String,
    language: String,
}

impl PistonRunner {
    pub fn new(base_url: &str, language: impl Into<String>, timeout: Duration) -> Self {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.into(),
        }
    }
}

fn render_run(run: PistonRun) -> String {
    let output = run.output.trim_end();
    match run.code {
        Some(code) if code != 0 && output.is_empty() => {
            format!("Exited with status {code}: {}", run.stderr.trim_end())
        }
        _ if output.is_empty() => NO_OUTPUT.to_string(),
        _ => output.to_string(),
    }
}

#[async_trait]
impl CodeRunner for PistonRunner {
    async fn run(&self, payload: &str) -> Result<String> {
        let code = extract_code(payload);
        let request = PistonRequest {
            language: &self.language,
            version: "*",
            files: vec![PistonFile { content: &code }],
        };

        let response = self
            .client
            .post(format!("{}/execute", self.base_url))
            .json(&request)
            .send()
            .await
            .context("Code sandbox request failed")?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Code sandbox error {status}: {body}");
        }

        let body: PistonResponse = response.json().await?;
        Ok(render_run(body.run))
    }
}

/// Runs code with a local interpreter, fed on stdin. Not sandboxed.
pub struct LocalProcessRunner {
    interpreter: String,
    timeout: Duration,
}

impl LocalProcessRunner {
    pub fn new(interpreter: impl Into<String>, timeout: Duration) -> Self {
        Self {
            interpreter: interpreter.into(),
            timeout,
        }
    }
}

#[async_trait]
impl CodeRunner for LocalProcessRunner {
    async fn run(&self, payload: &str) -> Result<String> {
        use tokio::io::AsyncWriteExt;

        let code = extract_code(payload);
        let mut child = Command::new(&self.interpreter)
            .arg("-")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .with_context(|| format!("Failed to start {}", self.interpreter))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(code.as_bytes()).await?;
        }

        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .with_context(|| format!("Code run timed out after {:?}", self.timeout))??;

        let stdout = String::from_utf8_lossy(&output.stdout).trim_end().to_string();
        let stderr = String::from_utf8_lossy(&output.stderr).trim_end().to_string();

        if output.status.success() {
            let result = if stdout.is_empty() { stderr } else { stdout };
            Ok(if result.is_empty() {
                NO_OUTPUT.to_string()
            } else {
                result
            })
        } else if stderr.is_empty() {
            Ok(format!("Command failed with status: {}", output.status))
        } else {
            Ok(stderr)
        }
    }
}
