#![allow(dead_code)]

use anyhow::{Context, Result, anyhow};
use serde_json::Value;
use std::fs;
use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpListener;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::thread::{self, JoinHandle};
use uuid::Uuid;

const STEP_ENV: [&str; 4] = ["REEVE_API", "FILES", "REVISION_VAR", "NON_REGULAR_FILES"];

pub struct TestDir {
    pub path: PathBuf,
}

impl TestDir {
    pub fn new(name: &str) -> Result<Self> {
        let path = temp_dir("filerev_tests", name);
        fs::create_dir_all(&path)?;
        Ok(Self { path })
    }

    /// Write a file with mode 0644.
    pub fn write(&self, path: &str, content: impl AsRef<[u8]>) -> Result<()> {
        self.write_with_mode(path, content, 0o644)
    }

    pub fn write_with_mode(&self, path: &str, content: impl AsRef<[u8]>, mode: u32) -> Result<()> {
        let p = self.path.join(path);
        if let Some(parent) = p.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&p, content)?;
        fs::set_permissions(&p, fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    pub fn append(&self, path: &str, content: impl AsRef<[u8]>) -> Result<()> {
        let mut file = fs::OpenOptions::new()
            .append(true)
            .open(self.path.join(path))?;
        file.write_all(content.as_ref())?;
        Ok(())
    }

    pub fn chmod(&self, path: &str, mode: u32) -> Result<()> {
        fs::set_permissions(self.path.join(path), fs::Permissions::from_mode(mode))?;
        Ok(())
    }

    pub fn mkdir(&self, path: &str) -> Result<()> {
        fs::create_dir_all(self.path.join(path))?;
        Ok(())
    }

    pub fn run(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
        let output = self.run_raw(args, envs)?;
        if !output.status.success() {
            anyhow::bail!(
                "filerev failed ({:?}): {}",
                output.status.code(),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        Ok(String::from_utf8(output.stdout)?)
    }

    pub fn run_err(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
        let output = self.run_raw(args, envs)?;
        if output.status.success() {
            anyhow::bail!(
                "filerev succeeded but expected failure: {}",
                String::from_utf8_lossy(&output.stdout)
            );
        }
        Ok(output)
    }

    pub fn run_raw(&self, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
        Ok(build_cmd(&self.path, args, envs).output()?)
    }

    /// Dry-run revision for `patterns`, as printed by `KEY=VALUE`.
    pub fn revision(&self, patterns: &str) -> Result<String> {
        self.revision_with(patterns, &[])
    }

    pub fn revision_with(&self, patterns: &str, args: &[&str]) -> Result<String> {
        let mut argv = vec!["--dry-run"];
        argv.extend_from_slice(args);
        let output = self.run(&argv, &[("FILES", patterns)])?;
        parse_assignment(&output).map(|(_, value)| value)
    }
}

/// Split a `KEY=VALUE` (or `Set KEY=VALUE`) line; the value keeps its padding.
pub fn parse_assignment(output: &str) -> Result<(String, String)> {
    let line = output
        .lines()
        .last()
        .context("Expected output line")?
        .trim();
    let line = line.strip_prefix("Set ").unwrap_or(line);
    let (key, value) = line
        .split_once('=')
        .with_context(|| format!("Expected KEY=VALUE, got '{line}'"))?;
    Ok((key.to_string(), value.to_string()))
}

pub fn json(output: &str) -> Result<Value> {
    serde_json::from_str(output).with_context(|| format!("Invalid JSON: {}", truncate(output, 200)))
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}

fn temp_dir(base: &str, name: &str) -> PathBuf {
    std::env::temp_dir()
        .join(base)
        .join(name)
        .join(Uuid::new_v4().to_string())
}

fn build_cmd(dir: &Path, args: &[&str], envs: &[(&str, &str)]) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_filerev"));
    for key in STEP_ENV {
        cmd.env_remove(key);
    }
    cmd.env("NO_PROXY", "127.0.0.1,localhost")
        .env("no_proxy", "127.0.0.1,localhost")
        .args(args)
        .envs(envs.iter().copied())
        .current_dir(dir);
    cmd
}

#[derive(Debug)]
pub struct CapturedRequest {
    pub request_line: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl CapturedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// Single-request HTTP stub answering with a fixed status.
pub struct StubServer {
    pub url: String,
    handle: Option<JoinHandle<Result<CapturedRequest>>>,
}

impl StubServer {
    pub fn start(status: u16) -> Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let addr = listener.local_addr()?;
        let handle = thread::spawn(move || serve_once(listener, status));
        Ok(Self {
            url: format!("http://{addr}"),
            handle: Some(handle),
        })
    }

    /// Wait for the request the stub received.
    pub fn request(mut self) -> Result<CapturedRequest> {
        let handle = self.handle.take().context("Stub already joined")?;
        handle
            .join()
            .map_err(|_| anyhow!("Stub server panicked"))?
    }
}

fn serve_once(listener: TcpListener, status: u16) -> Result<CapturedRequest> {
    let (mut stream, _) = listener.accept()?;
    let mut reader = BufReader::new(stream.try_clone()?);

    let mut request_line = String::new();
    reader.read_line(&mut request_line)?;

    let mut headers = Vec::new();
    loop {
        let mut line = String::new();
        reader.read_line(&mut line)?;
        let line = line.trim_end();
        if line.is_empty() {
            break;
        }
        if let Some((key, value)) = line.split_once(':') {
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }
    }

    let length = headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("content-length"))
        .and_then(|(_, value)| value.parse::<usize>().ok())
        .unwrap_or(0);
    let mut body = vec![0; length];
    reader.read_exact(&mut body)?;

    write!(
        stream,
        "HTTP/1.1 {status} Stub\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    )?;
    stream.flush()?;

    Ok(CapturedRequest {
        request_line: request_line.trim_end().to_string(),
        headers,
        body: String::from_utf8(body)?,
    })
}

/// A URL nothing is listening on.
pub fn closed_url() -> Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(format!("http://{addr}"))
}
