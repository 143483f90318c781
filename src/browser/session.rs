use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::browser::element::{CandidateElement, ElementAttributes, ElementHandle, ElementSession};
use crate::browser::error::SessionError;
use crate::mapping::strategy::StrategyKind;

/// Request sent to locator_server.js over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum SessionRequest {
    Navigate {
        cmd: &'static str,
        url: String,
    },
    Locate {
        cmd: &'static str,
        strategy: String,
        value: String,
    },
    Snapshot {
        cmd: &'static str,
    },
    Describe {
        cmd: &'static str,
        handle: String,
    },
    Action {
        cmd: &'static str,
        action: String,
        handle: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        checked: Option<bool>,
    },
    Query {
        cmd: &'static str,
        handle: String,
    },
    Screenshot {
        cmd: &'static str,
        path: String,
    },
    CurrentUrl {
        cmd: &'static str,
    },
    Wait {
        cmd: &'static str,
        duration_ms: u64,
    },
    Quit {
        cmd: &'static str,
    },
}

impl SessionRequest {
    pub fn navigate(url: &str) -> Self {
        SessionRequest::Navigate {
            cmd: "navigate",
            url: url.to_string(),
        }
    }

    pub fn locate(strategy: StrategyKind, value: &str) -> Self {
        SessionRequest::Locate {
            cmd: "locate",
            strategy: strategy.wire_name().to_string(),
            value: value.to_string(),
        }
    }

    pub fn snapshot() -> Self {
        SessionRequest::Snapshot { cmd: "snapshot" }
    }

    pub fn describe(handle: &ElementHandle) -> Self {
        SessionRequest::Describe {
            cmd: "describe",
            handle: handle.token().to_string(),
        }
    }

    pub fn click(handle: &ElementHandle) -> Self {
        SessionRequest::Action {
            cmd: "action",
            action: "click".into(),
            handle: handle.token().to_string(),
            value: None,
            checked: None,
        }
    }

    pub fn fill(handle: &ElementHandle, value: &str) -> Self {
        SessionRequest::Action {
            cmd: "action",
            action: "fill".into(),
            handle: handle.token().to_string(),
            value: Some(value.to_string()),
            checked: None,
        }
    }

    pub fn select_option(handle: &ElementHandle, option: &str) -> Self {
        SessionRequest::Action {
            cmd: "action",
            action: "select".into(),
            handle: handle.token().to_string(),
            value: Some(option.to_string()),
            checked: None,
        }
    }

    pub fn set_checked(handle: &ElementHandle, checked: bool) -> Self {
        SessionRequest::Action {
            cmd: "action",
            action: "set_checked".into(),
            handle: handle.token().to_string(),
            value: None,
            checked: Some(checked),
        }
    }

    pub fn is_displayed(handle: &ElementHandle) -> Self {
        SessionRequest::Query {
            cmd: "is_displayed",
            handle: handle.token().to_string(),
        }
    }

    pub fn is_selected(handle: &ElementHandle) -> Self {
        SessionRequest::Query {
            cmd: "is_selected",
            handle: handle.token().to_string(),
        }
    }

    pub fn screenshot(path: &str) -> Self {
        SessionRequest::Screenshot {
            cmd: "screenshot",
            path: path.to_string(),
        }
    }

    pub fn current_url() -> Self {
        SessionRequest::CurrentUrl { cmd: "current_url" }
    }

    pub fn wait(duration_ms: u64) -> Self {
        SessionRequest::Wait {
            cmd: "wait",
            duration_ms,
        }
    }

    pub fn quit() -> Self {
        SessionRequest::Quit { cmd: "quit" }
    }
}

/// Response received from locator_server.js over stdout (one JSON line).
#[derive(Debug, Deserialize)]
pub struct SessionResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
    #[serde(default)]
    pub found: Option<bool>,
    #[serde(default)]
    pub handle: Option<String>,
    #[serde(default)]
    pub elements: Option<Vec<SnapshotElement>>,
    #[serde(default)]
    pub attributes: Option<ElementAttributes>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub result: Option<bool>,
}

/// Wire form of one snapshot entry.
#[derive(Debug, Deserialize)]
pub struct SnapshotElement {
    pub handle: String,
    #[serde(flatten)]
    pub attributes: ElementAttributes,
}

/// A persistent browser session backed by locator_server.js.
///
/// Launches a long-lived Node.js process that keeps a Chromium browser open
/// and holds element handles for the lifetime of the page. Commands are sent
/// as NDJSON over stdin, responses read from stdout. The command channel is
/// strictly one-request-one-response; callers must not assume it tolerates
/// concurrent dispatch.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    current_url: Option<String>,
}

impl BrowserSession {
    /// Launch a new browser session by spawning locator_server.js.
    pub fn launch() -> Result<Self, SessionError> {
        Self::launch_script("node/locator_server.js")
    }

    pub fn launch_script(script: &str) -> Result<Self, SessionError> {
        let mut child = Command::new("node")
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| SessionError::SubprocessSpawn {
                script: script.into(),
                source: e,
            })?;

        let stdin = child.stdin.take().ok_or_else(|| {
            SessionError::SessionIo("Failed to capture stdin of locator server".into())
        })?;

        let stdout = child.stdout.take().ok_or_else(|| {
            SessionError::SessionIo("Failed to capture stdout of locator server".into())
        })?;

        let mut reader = BufReader::new(stdout);

        // Wait for the ready signal
        let mut line = String::new();
        reader
            .read_line(&mut line)
            .map_err(|e| SessionError::SessionIo(format!("Failed to read ready signal: {}", e)))?;

        let response: SessionResponse =
            serde_json::from_str(line.trim()).map_err(|e| SessionError::JsonParse {
                context: "locator server ready signal".into(),
                source: e,
            })?;

        if !response.ok || response.ready != Some(true) {
            return Err(SessionError::Protocol {
                command: "launch".into(),
                error: "Did not receive ready signal from locator server".into(),
            });
        }

        Ok(BrowserSession {
            child,
            stdin,
            reader,
            current_url: None,
        })
    }

    /// Send a request and read the response.
    fn send(&mut self, request: &SessionRequest) -> Result<SessionResponse, SessionError> {
        let json = serde_json::to_string(request).map_err(|e| SessionError::JsonSerialize {
            context: "SessionRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json).map_err(|e| {
            SessionError::SessionIo(format!("Failed to write to locator server stdin: {}", e))
        })?;

        self.stdin.flush().map_err(|e| {
            SessionError::SessionIo(format!("Failed to flush locator server stdin: {}", e))
        })?;

        let mut line = String::new();
        self.reader.read_line(&mut line).map_err(|e| {
            SessionError::SessionIo(format!("Failed to read from locator server stdout: {}", e))
        })?;

        if line.trim().is_empty() {
            return Err(SessionError::SessionIo(
                "Empty response from locator server (process may have died)".into(),
            ));
        }

        let response: SessionResponse =
            serde_json::from_str(line.trim()).map_err(|e| SessionError::JsonParse {
                context: "locator server response".into(),
                source: e,
            })?;

        Ok(response)
    }

    /// Send a request and verify it succeeded.
    fn send_ok(
        &mut self,
        request: &SessionRequest,
        command_name: &str,
    ) -> Result<SessionResponse, SessionError> {
        let response = self.send(request)?;
        if !response.ok {
            return Err(SessionError::Protocol {
                command: command_name.into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            });
        }
        Ok(response)
    }

    fn query_bool(&mut self, request: &SessionRequest, name: &str) -> Result<bool, SessionError> {
        let response = self.send_ok(request, name)?;
        Ok(response.result.unwrap_or(false))
    }

    /// Quit the browser session.
    pub fn quit(&mut self) -> Result<(), SessionError> {
        let request = SessionRequest::quit();
        // Best-effort quit — don't fail hard if process is already gone
        let _ = self.send(&request);
        let _ = self.child.wait();
        Ok(())
    }
}

impl ElementSession for BrowserSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        let request = SessionRequest::navigate(url);
        self.send_ok(&request, "navigate")?;
        self.current_url = Some(url.to_string());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, SessionError> {
        let request = SessionRequest::current_url();
        let response = self.send_ok(&request, "current_url")?;
        let url = response.url.ok_or_else(|| SessionError::Protocol {
            command: "current_url".into(),
            error: "No URL in current_url response".into(),
        })?;
        self.current_url = Some(url.clone());
        Ok(url)
    }

    fn last_url(&self) -> Option<&str> {
        self.current_url.as_deref()
    }

    fn try_locate(
        &mut self,
        strategy: StrategyKind,
        value: &str,
    ) -> Result<Option<ElementHandle>, SessionError> {
        let request = SessionRequest::locate(strategy, value);
        let response = self.send_ok(&request, "locate")?;

        if response.found == Some(true) {
            let token = response.handle.ok_or_else(|| SessionError::Protocol {
                command: "locate".into(),
                error: "Element reported found but no handle returned".into(),
            })?;
            Ok(Some(ElementHandle::new(token)))
        } else {
            Ok(None)
        }
    }

    fn snapshot(&mut self) -> Result<Vec<CandidateElement>, SessionError> {
        let request = SessionRequest::snapshot();
        let response = self.send_ok(&request, "snapshot")?;
        let elements = response.elements.ok_or_else(|| SessionError::Protocol {
            command: "snapshot".into(),
            error: "No elements in snapshot response".into(),
        })?;

        Ok(elements
            .into_iter()
            .map(|el| CandidateElement {
                handle: ElementHandle::new(el.handle),
                attributes: el.attributes,
            })
            .collect())
    }

    fn describe(&mut self, handle: &ElementHandle) -> Result<ElementAttributes, SessionError> {
        let request = SessionRequest::describe(handle);
        let response = self.send_ok(&request, "describe")?;
        response.attributes.ok_or_else(|| SessionError::Protocol {
            command: "describe".into(),
            error: "No attributes in describe response".into(),
        })
    }

    fn screenshot(&mut self, path: &str) -> Result<(), SessionError> {
        let request = SessionRequest::screenshot(path);
        self.send_ok(&request, "screenshot")?;
        Ok(())
    }

    fn click(&mut self, handle: &ElementHandle) -> Result<(), SessionError> {
        let request = SessionRequest::click(handle);
        self.send_ok(&request, "click")?;
        Ok(())
    }

    fn fill(&mut self, handle: &ElementHandle, value: &str) -> Result<(), SessionError> {
        let request = SessionRequest::fill(handle, value);
        self.send_ok(&request, "fill")?;
        Ok(())
    }

    fn select_option(
        &mut self,
        handle: &ElementHandle,
        option: &str,
    ) -> Result<(), SessionError> {
        let request = SessionRequest::select_option(handle, option);
        self.send_ok(&request, "select")?;
        Ok(())
    }

    fn set_checked(&mut self, handle: &ElementHandle, checked: bool) -> Result<(), SessionError> {
        let request = SessionRequest::set_checked(handle, checked);
        self.send_ok(&request, "set_checked")?;
        Ok(())
    }

    fn is_displayed(&mut self, handle: &ElementHandle) -> Result<bool, SessionError> {
        let request = SessionRequest::is_displayed(handle);
        self.query_bool(&request, "is_displayed")
    }

    fn is_selected(&mut self, handle: &ElementHandle) -> Result<bool, SessionError> {
        let request = SessionRequest::is_selected(handle);
        self.query_bool(&request, "is_selected")
    }

    fn wait_idle(&mut self, ms: u64) -> Result<(), SessionError> {
        let request = SessionRequest::wait(ms);
        self.send_ok(&request, "wait")?;
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Best-effort cleanup
        let _ = self.quit();
    }
}
