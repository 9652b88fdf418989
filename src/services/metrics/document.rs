//! Parsing of drafts into the structural signals the extractors read.
//!
//! Drafts are Markdown (optionally with YAML front matter) or HTML. Both are
//! parsed with regular expressions into a [`DraftDocument`]; Markdown drafts
//! may embed HTML tags, which are counted as well.

use regex::Regex;
use serde::Deserialize;

/// Markup format of a draft.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftFormat {
    /// Markdown, the default generator output.
    Markdown,
    /// Anything whose trimmed text starts with `<`.
    Html,
}

impl DraftFormat {
    /// Detect the format of `text`.
    pub fn detect(text: &str) -> Self {
        if text.trim_start().starts_with('<') {
            Self::Html
        } else {
            Self::Markdown
        }
    }
}

/// An image reference found in the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    /// Alt text, `None` when missing or blank.
    pub alt: Option<String>,
}

impl Image {
    /// Whether the image carries a non-blank alt text.
    pub const fn has_alt(&self) -> bool {
        self.alt.is_some()
    }
}

/// Heading texts by level.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headings {
    /// Level 1 headings.
    pub h1: Vec<String>,
    /// Level 2 headings.
    pub h2: Vec<String>,
    /// Level 3 headings.
    pub h3: Vec<String>,
}

/// Structural view of one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftDocument {
    /// Detected markup format.
    pub format: DraftFormat,
    /// Text with markup removed.
    pub plain_text: String,
    /// Meta title (`<title>` or front matter `title`).
    pub title: Option<String>,
    /// Meta description (`<meta name="description">` or front matter `description`).
    pub meta_description: Option<String>,
    /// Headings H1 to H3.
    pub headings: Headings,
    /// Plain text of every paragraph.
    pub paragraphs: Vec<String>,
    /// Number of lists (bullet or numbered).
    pub list_count: usize,
    /// Number of bold/strong spans.
    pub emphasis_count: usize,
    /// Images in document order.
    pub images: Vec<Image>,
    /// Number of hyperlinks.
    pub link_count: usize,
    /// Number of embedded videos or iframes.
    pub video_count: usize,
    /// Number of buttons and forms.
    pub interactive_count: usize,
    /// Semantic sections: HTML5 sectioning tags, plus H2 sections for Markdown.
    pub semantic_section_count: usize,
    /// Standalone numbers in the plain text.
    pub number_count: usize,
}

impl DraftDocument {
    /// Number of whitespace-separated words in the plain text.
    pub fn word_count(&self) -> usize {
        self.plain_text.split_whitespace().count()
    }
}

#[derive(Debug, Default, Deserialize)]
struct FrontMatter {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

/// Compiled patterns for turning draft text into a [`DraftDocument`].
#[derive(Debug, Clone)]
pub struct DocumentParser {
    md_heading: Regex,
    md_list_item: Regex,
    md_rule: Regex,
    md_quote: Regex,
    md_image: Regex,
    md_link: Regex,
    md_emphasis: Regex,
    md_markers: Regex,
    /// Elements dropped with their content. Script and style come before head.
    html_blocks: Vec<Regex>,
    html_tag: Regex,
    html_heading: Regex,
    html_paragraph: Regex,
    html_list: Regex,
    html_emphasis: Regex,
    html_image: Regex,
    html_alt: Regex,
    html_link: Regex,
    html_video: Regex,
    html_interactive: Regex,
    html_semantic: Regex,
    html_title: Regex,
    html_meta: Regex,
    html_meta_description: Regex,
    html_content: Regex,
    number: Regex,
    whitespace: Regex,
}

impl DocumentParser {
    /// Compile all patterns.
    pub fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            md_heading: Regex::new(r"^ {0,3}(#{1,6})[ \t]+(.*?)[ \t#]*$")?,
            md_list_item: Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+")?,
            md_rule: Regex::new(r"^\s*(?:-{3,}|\*{3,}|_{3,})\s*$")?,
            md_quote: Regex::new(r"^\s*>\s?")?,
            md_image: Regex::new(r"!\[([^\]]*)\]\([^)]*\)")?,
            md_link: Regex::new(r"\[([^\]]*)\]\([^)]*\)")?,
            md_emphasis: Regex::new(r"\*\*[^*\n]+?\*\*|__[^_\n]+?__")?,
            md_markers: Regex::new(r"\*\*|__|[*`]")?,
            html_blocks: ["script", "style", "head"]
                .iter()
                .map(|element| Regex::new(&format!(r"(?is)<{element}\b[^>]*>.*?</{element}\s*>")))
                .collect::<Result<_, _>>()?,
            html_tag: Regex::new(r"(?s)<[^>]+>")?,
            html_heading: Regex::new(r"(?is)<h([1-3])\b[^>]*>(.*?)</h[1-3]\s*>")?,
            html_paragraph: Regex::new(r"(?is)<p\b[^>]*>(.*?)</p\s*>")?,
            html_list: Regex::new(r"(?i)<(?:ul|ol)\b")?,
            html_emphasis: Regex::new(r"(?i)<(?:strong|b)\b[^>]*>")?,
            html_image: Regex::new(r"(?is)<img\b[^>]*>")?,
            html_alt: Regex::new(r#"(?is)\balt\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            html_link: Regex::new(r"(?is)<a\b[^>]*\bhref\s*=")?,
            html_video: Regex::new(r"(?i)<(?:video|iframe)\b")?,
            html_interactive: Regex::new(r"(?i)<(?:button|form)\b")?,
            html_semantic: Regex::new(r"(?i)<(?:article|section|header|footer|nav)\b")?,
            html_title: Regex::new(r"(?is)<title\b[^>]*>(.*?)</title\s*>")?,
            html_meta: Regex::new(r"(?is)<meta\b[^>]*>")?,
            html_meta_description: Regex::new(r#"(?i)\bname\s*=\s*["']description["']"#)?,
            html_content: Regex::new(r#"(?is)\bcontent\s*=\s*(?:"([^"]*)"|'([^']*)')"#)?,
            number: Regex::new(r"\b\d+\b")?,
            whitespace: Regex::new(r"\s+")?,
        })
    }

    /// Parse `text` into a [`DraftDocument`].
    pub fn parse(&self, text: &str) -> DraftDocument {
        match DraftFormat::detect(text) {
            DraftFormat::Html => self.parse_html(text),
            DraftFormat::Markdown => self.parse_markdown(text),
        }
    }

    // -----------------------------------------------------------------------
    // Markdown
    // -----------------------------------------------------------------------

    fn parse_markdown(&self, text: &str) -> DraftDocument {
        let (front_matter, body) = split_front_matter(text);

        let mut headings = Headings::default();
        let mut plain_lines = Vec::new();
        let mut list_count = 0;
        let mut in_list = false;
        let mut in_fence = false;

        for line in body.lines() {
            if line.trim_start().starts_with("```") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                plain_lines.push(line.to_string());
                continue;
            }

            if line.trim().is_empty() {
                plain_lines.push(String::new());
                continue;
            }

            if let Some(caps) = self.md_heading.captures(line) {
                in_list = false;
                let heading = self.inline_to_plain(&caps[2]);
                match caps[1].len() {
                    1 => headings.h1.push(heading.clone()),
                    2 => headings.h2.push(heading.clone()),
                    3 => headings.h3.push(heading.clone()),
                    _ => {}
                }
                plain_lines.push(heading);
                continue;
            }

            if self.md_rule.is_match(line) {
                in_list = false;
                continue;
            }

            if self.md_list_item.is_match(line) {
                if !in_list {
                    list_count += 1;
                    in_list = true;
                }
                let item = self.md_list_item.replace(line, "");
                plain_lines.push(self.inline_to_plain(&item));
                continue;
            }

            // Indented lines continue an open list item.
            if !line.starts_with([' ', '\t']) {
                in_list = false;
            }
            let line = self.md_quote.replace(line, "");
            plain_lines.push(self.inline_to_plain(&line));
        }

        let paragraphs = self.markdown_paragraphs(body);
        let plain_text = plain_lines.join("\n").trim().to_string();

        let mut images: Vec<Image> = self
            .md_image
            .captures_iter(body)
            .map(|caps| Image {
                alt: non_blank(&caps[1]),
            })
            .collect();
        images.extend(self.html_images(body));

        let md_links = self.md_link.find_iter(body).count();
        let md_images = self.md_image.find_iter(body).count();

        let FrontMatter { title, description } = front_matter.unwrap_or_default();
        let number_count = self.number.find_iter(&plain_text).count();

        DraftDocument {
            format: DraftFormat::Markdown,
            title: title.and_then(|t| non_blank(&t)),
            meta_description: description.and_then(|d| non_blank(&d)),
            list_count: list_count + self.html_list.find_iter(body).count(),
            emphasis_count: self.md_emphasis.find_iter(body).count()
                + self.html_emphasis.find_iter(body).count(),
            images,
            link_count: md_links.saturating_sub(md_images) + self.html_link.find_iter(body).count(),
            video_count: self.html_video.find_iter(body).count(),
            interactive_count: self.html_interactive.find_iter(body).count(),
            semantic_section_count: headings.h2.len() + self.html_semantic.find_iter(body).count(),
            headings,
            paragraphs,
            number_count,
            plain_text,
        }
    }

    /// Blank-line separated blocks that are prose, not headings, lists,
    /// rules, fences or raw HTML.
    fn markdown_paragraphs(&self, body: &str) -> Vec<String> {
        let mut paragraphs = Vec::new();
        let mut block: Vec<&str> = Vec::new();

        let mut flush = |block: &mut Vec<&str>| {
            if let Some(first) = block.first() {
                let is_prose = !self.md_heading.is_match(first)
                    && !self.md_list_item.is_match(first)
                    && !self.md_rule.is_match(first)
                    && !first.trim_start().starts_with("```")
                    && !first.trim_start().starts_with('<');
                if is_prose {
                    let joined = block
                        .iter()
                        .map(|l| self.md_quote.replace(l, "").into_owned())
                        .collect::<Vec<_>>()
                        .join(" ");
                    let plain = self.inline_to_plain(&joined);
                    if !plain.is_empty() {
                        paragraphs.push(plain);
                    }
                }
            }
            block.clear();
        };

        for line in body.lines() {
            if line.trim().is_empty() {
                flush(&mut block);
            } else if self.md_heading.is_match(line) {
                // A heading always forms its own block.
                flush(&mut block);
                block.push(line);
                flush(&mut block);
            } else {
                block.push(line);
            }
        }
        flush(&mut block);

        paragraphs
    }

    /// Strip inline Markdown and HTML from a single line or block.
    fn inline_to_plain(&self, text: &str) -> String {
        let text = self.md_image.replace_all(text, "");
        let text = self.md_link.replace_all(&text, "$1");
        let text = self.md_markers.replace_all(&text, "");
        let text = self.html_tag.replace_all(&text, " ");
        let text = decode_entities(&text);
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }

    // -----------------------------------------------------------------------
    // HTML
    // -----------------------------------------------------------------------

    fn parse_html(&self, text: &str) -> DraftDocument {
        let title = self
            .html_title
            .captures(text)
            .and_then(|caps| non_blank(&self.html_fragment_to_plain(&caps[1])));

        let meta_description = self
            .html_meta
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|tag| self.html_meta_description.is_match(tag))
            .and_then(|tag| self.html_content.captures(tag))
            .and_then(|caps| {
                caps.get(1)
                    .or_else(|| caps.get(2))
                    .and_then(|m| non_blank(&decode_entities(m.as_str())))
            });

        let body = self
            .html_blocks
            .iter()
            .fold(text.to_string(), |body, block| block.replace_all(&body, " ").into_owned());

        let mut headings = Headings::default();
        for caps in self.html_heading.captures_iter(&body) {
            let heading = self.html_fragment_to_plain(&caps[2]);
            match &caps[1] {
                "1" => headings.h1.push(heading),
                "2" => headings.h2.push(heading),
                _ => headings.h3.push(heading),
            }
        }

        let paragraphs: Vec<String> = self
            .html_paragraph
            .captures_iter(&body)
            .map(|caps| self.html_fragment_to_plain(&caps[1]))
            .filter(|p| !p.is_empty())
            .collect();

        let plain_text = self.html_fragment_to_plain(&body);
        let number_count = self.number.find_iter(&plain_text).count();

        DraftDocument {
            format: DraftFormat::Html,
            title,
            meta_description,
            headings,
            paragraphs,
            list_count: self.html_list.find_iter(&body).count(),
            emphasis_count: self.html_emphasis.find_iter(&body).count(),
            images: self.html_images(&body),
            link_count: self.html_link.find_iter(&body).count(),
            video_count: self.html_video.find_iter(&body).count(),
            interactive_count: self.html_interactive.find_iter(&body).count(),
            semantic_section_count: self.html_semantic.find_iter(&body).count(),
            number_count,
            plain_text,
        }
    }

    fn html_images(&self, text: &str) -> Vec<Image> {
        self.html_image
            .find_iter(text)
            .map(|tag| {
                let alt = self.html_alt.captures(tag.as_str()).and_then(|caps| {
                    caps.get(1)
                        .or_else(|| caps.get(2))
                        .and_then(|m| non_blank(&decode_entities(m.as_str())))
                });
                Image { alt }
            })
            .collect()
    }

    fn html_fragment_to_plain(&self, fragment: &str) -> String {
        let text = self.html_tag.replace_all(fragment, " ");
        let text = decode_entities(&text);
        self.whitespace.replace_all(&text, " ").trim().to_string()
    }
}

/// Split YAML front matter off a Markdown draft.
///
/// Front matter that does not parse is treated as body text.
fn split_front_matter(text: &str) -> (Option<FrontMatter>, &str) {
    let trimmed = text.trim_start();
    let Some(rest) = trimmed
        .strip_prefix("---\n")
        .or_else(|| trimmed.strip_prefix("---\r\n"))
    else {
        return (None, text);
    };
    let Some(end) = rest.find("\n---") else {
        return (None, text);
    };

    let yaml = &rest[..end];
    let after = &rest[end + "\n---".len()..];
    let body = after
        .strip_prefix("\r\n")
        .or_else(|| after.strip_prefix('\n'))
        .unwrap_or(after);

    match serde_yaml::from_str::<FrontMatter>(yaml) {
        Ok(front_matter) => (Some(front_matter), body),
        Err(_) => (None, text),
    }
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}
