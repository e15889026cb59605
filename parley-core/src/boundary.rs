//! Boundary messages sent on a creator's behalf (capacity reached, FAQ
//! redirect, slow reply). Templates use `{{variable}}` placeholders.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{ParleyError, Result};

/// Fallback text for a placeholder with no value.
pub fn default_value(name: &str) -> String {
    match name {
        "creatorName" => "[Creator]".to_string(),
        "fanName" => "[Fan]".to_string(),
        "responseTime" => "a few days".to_string(),
        "link" => "[Link]".to_string(),
        other => format!("[{}]", other),
    }
}

/// Replace every `{{name}}` in `template`.
///
/// ```rust
/// use std::collections::HashMap;
/// use parley_core::boundary::render_template;
///
/// assert_eq!(render_template("Hi {{creatorName}}!", &HashMap::new()), "Hi [Creator]!");
/// ```
pub fn render_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find("{{") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        out.push_str(&rest[..open]);
        let name = after_open[..close].trim();
        match vars.get(name) {
            Some(value) => out.push_str(value),
            None => out.push_str(&default_value(name)),
        }
        rest = &after_open[close + 2..];
    }
    out.push_str(rest);
    out
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    CapacityReached,
    FaqRedirect,
    DelayedResponse,
}

impl BoundaryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryKind::CapacityReached => "capacity_reached",
            BoundaryKind::FaqRedirect => "faq_redirect",
            BoundaryKind::DelayedResponse => "delayed_response",
        }
    }

    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "capacity_reached" => Ok(BoundaryKind::CapacityReached),
            "faq_redirect" => Ok(BoundaryKind::FaqRedirect),
            "delayed_response" => Ok(BoundaryKind::DelayedResponse),
            other => Err(ParleyError::validation(format!("unknown boundary template {}", other))),
        }
    }
}

/// Named templates, starting from the built-ins. A creator may override any of them.
#[derive(Debug, Clone)]
pub struct BoundaryTemplates {
    templates: HashMap<BoundaryKind, String>,
}

impl Default for BoundaryTemplates {
    fn default() -> Self {
        let mut templates = HashMap::new();
        templates.insert(
            BoundaryKind::CapacityReached,
            "Hi {{fanName}}! {{creatorName}} has reached today's reply limit and will get back to you within {{responseTime}}.".to_string(),
        );
        templates.insert(
            BoundaryKind::FaqRedirect,
            "Hi {{fanName}}! {{creatorName}} answered this one already: {{link}}".to_string(),
        );
        templates.insert(
            BoundaryKind::DelayedResponse,
            "Thanks for your message, {{fanName}}. {{creatorName}} usually replies within {{responseTime}}.".to_string(),
        );
        Self { templates }
    }
}

impl BoundaryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, kind: BoundaryKind, template: impl Into<String>) -> Self {
        self.templates.insert(kind, template.into());
        self
    }

    pub fn template(&self, kind: BoundaryKind) -> Option<&str> {
        self.templates.get(&kind).map(String::as_str)
    }

    pub fn render(&self, kind: BoundaryKind, vars: &HashMap<String, String>) -> Result<String> {
        let template = self
            .template(kind)
            .ok_or_else(|| ParleyError::not_found(format!("boundary template {}", kind.as_str())))?;
        Ok(render_template(template, vars))
    }
}
