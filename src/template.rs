//! Minimal URL templates with `{{.Tag}}` and `{{.Version}}` placeholders.

use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unclosed action at offset {0} in template '{1}'")]
    Unclosed(usize, String),
    #[error("invalid action '{0}' in template '{1}'")]
    InvalidAction(String, String),
    #[error("field '{0}' is not defined for template '{1}'")]
    UnknownField(String, String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TemplateData {
    pub tag: String,
    pub version: String,
}

impl TemplateData {
    /// `version` is the tag with a single leading `v` removed.
    pub fn from_tag(tag: &str) -> Self {
        Self {
            tag: tag.to_string(),
            version: tag.strip_prefix('v').unwrap_or(tag).to_string(),
        }
    }

    fn field(&self, name: &str) -> Option<&str> {
        match name {
            "Tag" => Some(&self.tag),
            "Version" => Some(&self.version),
            _ => None,
        }
    }
}

pub fn render(template: &str, data: &TemplateData) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let action_start = start + 2;
        let end = rest[action_start..]
            .find("}}")
            .ok_or_else(|| TemplateError::Unclosed(offset + start, template.to_string()))?;

        let action = rest[action_start..action_start + end].trim();
        let field = action
            .strip_prefix('.')
            .filter(|f| !f.is_empty() && f.chars().all(|c| c.is_ascii_alphanumeric() || c == '_'))
            .ok_or_else(|| TemplateError::InvalidAction(action.to_string(), template.to_string()))?;
        let value = data
            .field(field)
            .ok_or_else(|| TemplateError::UnknownField(field.to_string(), template.to_string()))?;
        out.push_str(value);

        let consumed = action_start + end + 2;
        offset += consumed;
        rest = &rest[consumed..];
    }

    out.push_str(rest);
    Ok(out)
}
