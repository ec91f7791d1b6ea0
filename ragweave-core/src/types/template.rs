//! Minimal prompt template rendering.
//!
//! Templates are plain strings with `{placeholder}` markers. The core only
//! substitutes placeholders; it never interprets any template syntax beyond
//! that, so richer template engines can be layered on by collaborators.

/// Placeholder name for the retrieved document context in an augmentation
/// template.
pub const CONTEXT_PLACEHOLDER: &str = "context";

/// Placeholder name for the query text in an augmentation template.
pub const QUERY_PLACEHOLDER: &str = "query";

/// A prompt template with named `{placeholder}` markers.
///
/// # Examples
///
/// ```rust
/// use ragweave_core::types::PromptTemplate;
///
/// let template = PromptTemplate::new("Answer {query} using {context}.");
/// let rendered = template.render(&[("query", "Q"), ("context", "C")]);
/// assert_eq!(rendered, "Answer Q using C.");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl PromptTemplate {
    /// Create a template from its source text.
    pub fn new<S: Into<String>>(template: S) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// The raw template text.
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Render the template, substituting each `{key}` marker with its bound
    /// value. Unbound markers are left in place.
    pub fn render(&self, variables: &[(&str, &str)]) -> String {
        let mut rendered = self.template.clone();
        for (key, value) in variables {
            rendered = rendered.replace(&format!("{{{key}}}"), value);
        }
        rendered
    }

    /// Check whether the template contains the given placeholder.
    pub fn has_placeholder(&self, key: &str) -> bool {
        self.template.contains(&format!("{{{key}}}"))
    }
}
