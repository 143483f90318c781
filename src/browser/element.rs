use serde::{Deserialize, Serialize};

use crate::browser::error::SessionError;
use crate::mapping::strategy::StrategyKind;

// ============================================================================
// Element handles and attributes
// ============================================================================

/// An opaque, session-scoped reference to a resolved element.
///
/// The token is minted by the browser session and is only meaningful to the
/// session that produced it; validity across navigation is never assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(String);

impl ElementHandle {
    pub fn new(token: impl Into<String>) -> Self {
        ElementHandle(token.into())
    }

    pub fn token(&self) -> &str {
        &self.0
    }
}

/// Descriptive attributes of a UI element.
///
/// Fixed field set with explicit absence; missing attributes deserialize
/// to `None` rather than empty strings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,

    #[serde(default, rename = "class", skip_serializing_if = "Option::is_none")]
    pub class_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpath: Option<String>,
}

impl ElementAttributes {
    /// Build the similarity text projection: non-empty attribute values,
    /// space-joined in fixed field order (id, tag, class, text, type, name,
    /// xpath). The projection feeds an embedding model and must be
    /// reproducible across runs.
    pub fn text_projection(&self) -> String {
        let fields = [
            &self.id,
            &self.tag,
            &self.class_name,
            &self.text,
            &self.input_type,
            &self.name,
            &self.xpath,
        ];

        fields
            .iter()
            .filter_map(|f| f.as_deref())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// One visible element in a page snapshot: a live handle plus the
/// attributes captured at snapshot time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateElement {
    pub handle: ElementHandle,
    pub attributes: ElementAttributes,
}

// ============================================================================
// Session trait — the seam between the engine and a live browser
// ============================================================================

/// Commands the engine issues against a browser session.
///
/// `BrowserSession` implements this over the Node.js locator server; tests
/// substitute a scripted fake. A `try_locate` probe returns immediately;
/// waiting and retrying is the caller's concern.
pub trait ElementSession {
    fn navigate(&mut self, url: &str) -> Result<(), SessionError>;

    fn current_url(&mut self) -> Result<String, SessionError>;

    /// Last URL observed by this session, without a browser round-trip.
    fn last_url(&self) -> Option<&str>;

    /// Probe once for an element matching (strategy, value).
    /// `Ok(None)` means not currently present.
    fn try_locate(
        &mut self,
        strategy: StrategyKind,
        value: &str,
    ) -> Result<Option<ElementHandle>, SessionError>;

    /// Capture every candidate element currently present, with attributes.
    fn snapshot(&mut self) -> Result<Vec<CandidateElement>, SessionError>;

    /// Fetch the current attributes of a resolved element.
    fn describe(&mut self, handle: &ElementHandle) -> Result<ElementAttributes, SessionError>;

    fn screenshot(&mut self, path: &str) -> Result<(), SessionError>;

    fn click(&mut self, handle: &ElementHandle) -> Result<(), SessionError>;

    fn fill(&mut self, handle: &ElementHandle, value: &str) -> Result<(), SessionError>;

    fn select_option(&mut self, handle: &ElementHandle, option: &str)
    -> Result<(), SessionError>;

    fn set_checked(&mut self, handle: &ElementHandle, checked: bool) -> Result<(), SessionError>;

    fn is_displayed(&mut self, handle: &ElementHandle) -> Result<bool, SessionError>;

    fn is_selected(&mut self, handle: &ElementHandle) -> Result<bool, SessionError>;

    fn wait_idle(&mut self, ms: u64) -> Result<(), SessionError>;
}
