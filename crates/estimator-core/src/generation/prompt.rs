//! Prompt construction for draft and scope generation.

use serde::Serialize;
use serde_json::{json, Value};

use super::types::{DraftRequest, ScopeRequest};

const DRAFT_SYSTEM_PROMPT: &str = "\
You are an experienced residential construction estimator. Given a project \
description, its type and optional photos or drawings, list every line item \
needed to complete the work.

Rules:
- Cover all trades the described work requires, in construction order: \
demolition, structure, rough-ins, insulation, drywall, finishes, fixtures, cleanup.
- Include permits, plans, protection, hauling and final cleaning when they apply.
- description: a short item name such as \"Framing\" or \"Electrical Rough-In\".
- proposal_description: 4 to 8 lines, each starting with \"• \", written as \
proposal scope language and specific to this project.
- total_price: a ballpark amount in dollars for the estimator to refine.
- Never put prices inside proposal_description. Do not add a summary item.

Reply with JSON only, shaped as:
{\"lineItems\": [{\"description\": \"...\", \"proposal_description\": \"• ...\\n• ...\", \"total_price\": 0}]}";

const SCOPE_SYSTEM_PROMPT: &str = "\
You are an experienced residential construction estimator writing the scope \
of work for one proposal line item.

Rules:
- Write 4 to 8 lines, each starting with \"• \".
- Make the scope specific to the project type and context given.
- Include the standard sub-tasks a general contractor would list for this trade.
- When the estimator's own description is provided, keep every detail from it \
and fill in what is missing.
- Write definitive proposal language with no prices, headings or item name.";

/// A single chat completion message. `content` is either a string or an array
/// of typed parts.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Value,
}

impl ChatMessage {
    fn system(text: &str) -> Self {
        Self {
            role: "system",
            content: Value::String(text.to_string()),
        }
    }
}

/// URLs that can be forwarded as image parts.
pub fn image_urls(urls: &[String]) -> impl Iterator<Item = &str> {
    urls.iter()
        .map(|url| url.trim())
        .filter(|url| url.starts_with("http"))
}

fn push_context(parts: &mut Vec<String>, label: &str, value: Option<&str>) {
    if let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) {
        parts.push(format!("{}: {}", label, value));
    }
}

pub fn draft_messages(request: &DraftRequest) -> Vec<ChatMessage> {
    let mut context = Vec::new();
    push_context(&mut context, "Project type", Some(&request.project_type));
    push_context(&mut context, "Project name", Some(&request.project_name));
    push_context(&mut context, "Location", request.project_address.as_deref());

    let text = format!(
        "Draft a complete estimate for this residential construction project:\n\n{}\n\nProject description:\n{}",
        context.join("\n"),
        request.project_description.trim()
    );

    let mut content = vec![json!({ "type": "text", "text": text })];
    for url in image_urls(&request.file_urls) {
        content.push(json!({
            "type": "image_url",
            "image_url": { "url": url, "detail": "high" },
        }));
    }

    vec![
        ChatMessage::system(DRAFT_SYSTEM_PROMPT),
        ChatMessage {
            role: "user",
            content: Value::Array(content),
        },
    ]
}

pub fn scope_messages(request: &ScopeRequest) -> Vec<ChatMessage> {
    let mut text = format!(
        "Write the scope of work for the line item \"{}\".",
        request.item_name.trim()
    );

    if let Some(dictation) = request
        .dictation
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    {
        text.push_str(&format!(
            "\n\nThe estimator described the work as:\n\"{}\"\n\nBase the scope on this description.",
            dictation
        ));
    }

    let mut context = Vec::new();
    push_context(&mut context, "Project type", request.project_type.as_deref());
    push_context(&mut context, "Project name", request.project_name.as_deref());
    push_context(&mut context, "Location", request.project_address.as_deref());
    push_context(
        &mut context,
        "Project overview",
        request.project_overview.as_deref(),
    );
    if !context.is_empty() {
        text.push_str("\n\nProject context:\n");
        text.push_str(&context.join("\n"));
    }

    vec![
        ChatMessage::system(SCOPE_SYSTEM_PROMPT),
        ChatMessage {
            role: "user",
            content: Value::String(text),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft_request(urls: &[&str]) -> DraftRequest {
        DraftRequest {
            project_type: "bathroom".to_string(),
            project_name: "Lee Bath".to_string(),
            project_address: Some("12 Elm St, Salem".to_string()),
            project_description: "Gut and redo the hall bath".to_string(),
            file_urls: urls.iter().map(|u| u.to_string()).collect(),
        }
    }

    #[test]
    fn test_only_http_urls_become_image_parts() {
        let request = draft_request(&[
            "https://files.example.com/a.jpg",
            "file:///tmp/b.jpg",
            "data:image/png;base64,AAAA",
            "http://files.example.com/c.jpg",
        ]);
        let messages = draft_messages(&request);
        let parts = messages[1].content.as_array().unwrap();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[1]["image_url"]["url"], "https://files.example.com/a.jpg");
        assert_eq!(parts[2]["image_url"]["url"], "http://files.example.com/c.jpg");
    }

    #[test]
    fn test_draft_text_includes_context() {
        let messages = draft_messages(&draft_request(&[]));
        let text = messages[1].content[0]["text"].as_str().unwrap();
        assert!(text.contains("Project type: bathroom"));
        assert!(text.contains("Location: 12 Elm St, Salem"));
        assert!(text.contains("Gut and redo the hall bath"));
    }

    #[test]
    fn test_scope_without_context_or_dictation() {
        let request = ScopeRequest {
            item_name: "Tile".to_string(),
            dictation: Some("  ".to_string()),
            ..Default::default()
        };
        let messages = scope_messages(&request);
        let text = messages[1].content.as_str().unwrap();
        assert!(!text.contains("Project context"));
        assert!(!text.contains("estimator described"));
    }

    #[test]
    fn test_scope_with_dictation() {
        let request = ScopeRequest {
            item_name: "Demolition".to_string(),
            dictation: Some("rip out the vanity and tub".to_string()),
            project_type: Some("bathroom".to_string()),
            ..Default::default()
        };
        let text = scope_messages(&request)[1].content.as_str().unwrap().to_string();
        assert!(text.contains("rip out the vanity and tub"));
        assert!(text.contains("Project type: bathroom"));
    }
}
