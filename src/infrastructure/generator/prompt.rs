//! Default prompts for draft generation and revision.

use std::fmt::Write;

use crate::domain::models::{ContentFocus, DraftRequest, RevisionHints};

/// Topics listed in a prompt
const MAX_PROMPT_TOPICS: usize = 10;

/// Suggestions listed in a revision prompt
const MAX_PROMPT_SUGGESTIONS: usize = 10;

pub const SYSTEM_PROMPT: &str = "You are a professional SEO copywriter with expertise in \
content marketing and search engine optimization. Write in the language of the keyword.";

/// User prompt for `request`: a first draft, or a revision when hints are present
pub fn build(request: &DraftRequest) -> String {
    match &request.hints {
        Some(hints) => revision(request, hints),
        None => first_draft(request),
    }
}

fn first_draft(request: &DraftRequest) -> String {
    let mut prompt = String::new();
    let _ = writeln!(prompt, "Write a high-quality, SEO-optimized text.\n");
    let _ = writeln!(prompt, "Main keyword: {}", request.keyword);
    let _ = writeln!(prompt, "Content type: {}", request.content_type.description());
    let _ = writeln!(prompt, "Target length: {} words\n", request.target_word_count);

    prompt.push_str(
        "SEO requirements:\n\
         - Keyword density of 1-3%\n\
         - Keyword in the first paragraph, the H1 and several H2 headings\n\
         - One H1, at least five H2 and several H3 headings\n\
         - Short sentences (20 words or fewer on average)\n\
         - Paragraphs of at most 100 words\n\
         - Bullet or numbered lists, bold key terms, concrete numbers and facts\n\n",
    );

    if !request.topics.is_empty() {
        let topics: Vec<&str> = request
            .topics
            .iter()
            .take(MAX_PROMPT_TOPICS)
            .map(String::as_str)
            .collect();
        let _ = writeln!(prompt, "Topics competitors cover: {}\n", topics.join(", "));
    }

    let _ = writeln!(prompt, "Guidelines:\n- {}", focus_guideline(request.content_type.focus()));
    if request.content_type.requires_cta() {
        prompt.push_str("- Include calls to action\n");
    }

    prompt.push('\n');
    prompt.push_str(FORMAT_RULES);
    prompt.push_str("\nWrite the complete text now.");
    prompt
}

fn revision(request: &DraftRequest, hints: &RevisionHints) -> String {
    let mut prompt = String::new();
    let _ = writeln!(
        prompt,
        "Revise the following text for the keyword \"{}\" ({}, about {} words).\n",
        request.keyword,
        request.content_type.description(),
        request.target_word_count
    );

    if !hints.weak_categories.is_empty() {
        let weakest: Vec<&str> = hints.weak_categories.iter().map(|c| c.label()).collect();
        let _ = writeln!(prompt, "Weakest areas, weakest first: {}\n", weakest.join(", "));
    }

    if !hints.suggestions.is_empty() {
        prompt.push_str("Improvements to make:\n");
        for suggestion in hints.suggestions.iter().take(MAX_PROMPT_SUGGESTIONS) {
            let _ = writeln!(prompt, "- {suggestion}");
        }
        prompt.push('\n');
    }

    prompt.push_str(
        "Keep the structure and substance, apply the improvements and add missing \
         elements such as headings or lists.\n\n",
    );
    prompt.push_str(FORMAT_RULES);
    let _ = write!(prompt, "\nText:\n{}\n\nWrite the revised text now.", hints.previous_draft.text);
    prompt
}

const FORMAT_RULES: &str = "Format:\n\
- Markdown, no HTML\n\
- Start with YAML front matter holding `title` (50-60 characters) and `description` (140-160 characters), both containing the keyword\n\
- # for H1, ## for H2, ### for H3, **bold** for key terms\n";

const fn focus_guideline(focus: ContentFocus) -> &'static str {
    match focus {
        ContentFocus::Information => "Explain thoroughly and provide real value",
        ContentFocus::Conversion => "Highlight benefits and motivate the reader to act",
        ContentFocus::Education => "Explain step by step with practical tips",
        ContentFocus::Comparison => "Compare objectively and show pros and cons",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Category, ContentType, Draft};

    fn request(content_type: ContentType) -> DraftRequest {
        DraftRequest {
            keyword: "gartenmöbel holz".to_string(),
            content_type,
            target_word_count: 1200,
            topics: vec!["teak".to_string(), "pflege".to_string()],
            hints: None,
        }
    }

    #[test]
    fn test_first_draft_prompt() {
        let prompt = build(&request(ContentType::Product));

        assert!(prompt.contains("Main keyword: gartenmöbel holz"));
        assert!(prompt.contains("1200 words"));
        assert!(prompt.contains("teak, pflege"));
        assert!(prompt.contains("calls to action"));
        assert!(prompt.contains("front matter"));
    }

    #[test]
    fn test_blog_prompt_has_no_cta_requirement() {
        let prompt = build(&request(ContentType::Blog));
        assert!(!prompt.contains("calls to action"));
        assert!(prompt.contains("real value"));
    }

    #[test]
    fn test_revision_prompt_carries_hints() {
        let mut request = request(ContentType::Guide);
        request.hints = Some(RevisionHints {
            weak_categories: vec![Category::Engagement, Category::TechnicalSeo],
            suggestions: vec!["Add calls to action (0 found, aim for 3+)".to_string()],
            previous_draft: Draft::new("# Alter Text"),
        });

        let prompt = build(&request);
        assert!(prompt.starts_with("Revise"));
        assert!(prompt.contains(Category::Engagement.label()));
        assert!(prompt.contains("- Add calls to action"));
        assert!(prompt.ends_with("# Alter Text\n\nWrite the revised text now."));
    }
}
