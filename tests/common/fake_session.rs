use std::collections::HashMap;

use locator_healing::browser::element::{
    CandidateElement, ElementAttributes, ElementHandle, ElementSession,
};
use locator_healing::browser::error::SessionError;
use locator_healing::mapping::strategy::StrategyKind;

/// A scripted in-memory session: tests declare which (strategy, value)
/// probes find an element, what a snapshot returns, and what each handle
/// looks like, then assert on the recorded traffic.
pub struct FakeSession {
    pub url: Option<String>,
    present: HashMap<(StrategyKind, String), ElementHandle>,
    erroring: Vec<(StrategyKind, String)>,
    pub snapshot_elements: Vec<CandidateElement>,
    pub attributes: HashMap<ElementHandle, ElementAttributes>,
    pub selected: HashMap<ElementHandle, bool>,
    pub displayed: bool,

    pub locate_calls: usize,
    pub snapshot_calls: usize,
    pub navigations: Vec<String>,
    pub screenshots: Vec<String>,
    pub clicks: Vec<ElementHandle>,
    pub fills: Vec<(ElementHandle, String)>,
    pub selections: Vec<(ElementHandle, String)>,
    pub checked: Vec<(ElementHandle, bool)>,
}

impl Default for FakeSession {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSession {
    pub fn new() -> Self {
        Self {
            url: None,
            present: HashMap::new(),
            erroring: Vec::new(),
            snapshot_elements: Vec::new(),
            attributes: HashMap::new(),
            selected: HashMap::new(),
            displayed: true,
            locate_calls: 0,
            snapshot_calls: 0,
            navigations: Vec::new(),
            screenshots: Vec::new(),
            clicks: Vec::new(),
            fills: Vec::new(),
            selections: Vec::new(),
            checked: Vec::new(),
        }
    }

    pub fn at(url: &str) -> Self {
        let mut session = Self::new();
        session.url = Some(url.to_string());
        session
    }

    /// Declare that a (strategy, value) probe finds the given handle.
    pub fn add_present(&mut self, strategy: StrategyKind, value: &str, token: &str) {
        self.present
            .insert((strategy, value.to_string()), ElementHandle::new(token));
    }

    /// Declare that a (strategy, value) probe fails at the session level.
    pub fn add_erroring(&mut self, strategy: StrategyKind, value: &str) {
        self.erroring.push((strategy, value.to_string()));
    }

    /// Stage a candidate element returned by `snapshot`, and make its
    /// handle describable.
    pub fn stage_candidate(&mut self, token: &str, attributes: ElementAttributes) {
        let handle = ElementHandle::new(token);
        self.attributes.insert(handle.clone(), attributes.clone());
        self.snapshot_elements.push(CandidateElement { handle, attributes });
    }

    fn protocol_error(command: &str) -> SessionError {
        SessionError::Protocol {
            command: command.to_string(),
            error: "scripted failure".to_string(),
        }
    }
}

impl ElementSession for FakeSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError> {
        self.navigations.push(url.to_string());
        self.url = Some(url.to_string());
        Ok(())
    }

    fn current_url(&mut self) -> Result<String, SessionError> {
        self.url
            .clone()
            .ok_or_else(|| Self::protocol_error("current_url"))
    }

    fn last_url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    fn try_locate(
        &mut self,
        strategy: StrategyKind,
        value: &str,
    ) -> Result<Option<ElementHandle>, SessionError> {
        self.locate_calls += 1;
        if self
            .erroring
            .iter()
            .any(|(k, v)| *k == strategy && v == value)
        {
            return Err(Self::protocol_error("locate"));
        }
        Ok(self.present.get(&(strategy, value.to_string())).cloned())
    }

    fn snapshot(&mut self) -> Result<Vec<CandidateElement>, SessionError> {
        self.snapshot_calls += 1;
        Ok(self.snapshot_elements.clone())
    }

    fn describe(&mut self, handle: &ElementHandle) -> Result<ElementAttributes, SessionError> {
        self.attributes
            .get(handle)
            .cloned()
            .ok_or_else(|| Self::protocol_error("describe"))
    }

    fn screenshot(&mut self, path: &str) -> Result<(), SessionError> {
        self.screenshots.push(path.to_string());
        Ok(())
    }

    fn click(&mut self, handle: &ElementHandle) -> Result<(), SessionError> {
        self.clicks.push(handle.clone());
        Ok(())
    }

    fn fill(&mut self, handle: &ElementHandle, value: &str) -> Result<(), SessionError> {
        self.fills.push((handle.clone(), value.to_string()));
        Ok(())
    }

    fn select_option(
        &mut self,
        handle: &ElementHandle,
        option: &str,
    ) -> Result<(), SessionError> {
        self.selections.push((handle.clone(), option.to_string()));
        Ok(())
    }

    fn set_checked(&mut self, handle: &ElementHandle, checked: bool) -> Result<(), SessionError> {
        self.selected.insert(handle.clone(), checked);
        self.checked.push((handle.clone(), checked));
        Ok(())
    }

    fn is_displayed(&mut self, _handle: &ElementHandle) -> Result<bool, SessionError> {
        Ok(self.displayed)
    }

    fn is_selected(&mut self, handle: &ElementHandle) -> Result<bool, SessionError> {
        Ok(*self.selected.get(handle).unwrap_or(&false))
    }

    fn wait_idle(&mut self, _ms: u64) -> Result<(), SessionError> {
        Ok(())
    }
}
