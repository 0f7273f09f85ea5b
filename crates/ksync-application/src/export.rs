//! Article rendering and export.
//!
//! Rendering is a pure function of the article. HTML output is
//! auto-escaped by minijinja (the template name ends in `.html`); the
//! Markdown and text templates are emitted as-is.

use ksync_core::article::KnowledgeArticle;
use ksync_core::{KsyncError, Result};
use minijinja::Environment;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::LazyLock;

/// Maximum characters taken from the title for an export file name.
pub const FILE_NAME_MAX_CHARS: usize = 30;

static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w]+").expect("static pattern is valid"));

const HTML_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{{ title }}</title>
<style>
  body { font-family: -apple-system, "Segoe UI", "Helvetica Neue", sans-serif; color: #1f2937; line-height: 1.7; max-width: 820px; margin: 2.5rem auto; padding: 0 1.5rem; }
  h1 { font-size: 1.9rem; border-bottom: 3px solid #4f46e5; padding-bottom: .5rem; }
  h2 { font-size: 1.2rem; color: #4338ca; margin-top: 2rem; }
  .meta { color: #6b7280; font-size: .9rem; }
  .tags span { display: inline-block; background: #eef2ff; color: #4338ca; border-radius: 999px; padding: .1rem .7rem; margin: 0 .3rem .3rem 0; font-size: .8rem; }
  .turn { margin: .6rem 0; padding: .6rem .9rem; border-radius: 8px; background: #f9fafb; }
  .turn.respondent { background: #eef2ff; }
  .speaker { font-weight: 600; font-size: .8rem; color: #6b7280; }
  @media print { body { margin: 0; max-width: none; } section { page-break-inside: avoid; } }
</style>
</head>
<body>
<h1>{{ title }}</h1>
<p class="meta">Expert: {{ author }} | Category: {{ category }} | Date: {{ date }}</p>
{% if tags %}
<p class="tags">{% for tag in tags %}<span>{{ tag }}</span>{% endfor %}</p>
{% endif %}
{% if overview %}
<section>
<h2>Overview</h2>
<p>{{ overview }}</p>
</section>
{% endif %}
{% if key_insights %}
<section>
<h2>Key Insights</h2>
<ol>
{% for item in key_insights %}
<li>{{ item }}</li>
{% endfor %}
</ol>
</section>
{% endif %}
{% if planning_notes %}
<section>
<h2>Planning Notes</h2>
<ul>
{% for item in planning_notes %}
<li>{{ item }}</li>
{% endfor %}
</ul>
</section>
{% endif %}
{% if execution_notes %}
<section>
<h2>Execution Notes</h2>
<ul>
{% for item in execution_notes %}
<li>{{ item }}</li>
{% endfor %}
</ul>
</section>
{% endif %}
{% if transcript %}
<section>
<h2>Interview Transcript</h2>
{% for turn in transcript %}
<div class="turn{% if turn.respondent %} respondent{% endif %}">
<div class="speaker">{{ turn.speaker }}</div>
<div>{{ turn.content }}</div>
</div>
{% endfor %}
</section>
{% endif %}
</body>
</html>
"#;

const MARKDOWN_TEMPLATE: &str = r#"# {{ title }}

*Expert: {{ author }} | Category: {{ category }} | Date: {{ date }}*
{% if tags %}

Tags: {% for tag in tags %}`{{ tag }}`{% if not loop.last %} {% endif %}{% endfor %}
{% endif %}
{% if overview %}

## Overview

{{ overview }}
{% endif %}
{% if key_insights %}

## Key Insights

{% for item in key_insights %}
{{ loop.index }}. {{ item }}
{% endfor %}
{% endif %}
{% if planning_notes %}

## Planning Notes

{% for item in planning_notes %}
- {{ item }}
{% endfor %}
{% endif %}
{% if execution_notes %}

## Execution Notes

{% for item in execution_notes %}
- {{ item }}
{% endfor %}
{% endif %}
{% if transcript %}

## Interview Transcript

{% for turn in transcript %}
**{{ turn.speaker }}:** {{ turn.content }}

{% endfor %}
{% endif %}
"#;

const TEXT_TEMPLATE: &str = r#"{{ title }}
Expert: {{ author }} | Category: {{ category }} | Date: {{ date }}
{% for turn in transcript %}

{{ turn.speaker }}: {{ turn.content }}
{% endfor %}
"#;

/// Output formats for [`ArticleExporter::render`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Html,
    Markdown,
    /// Plain-text transcript only.
    Text,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Html => "html",
            Self::Markdown => "md",
            Self::Text => "txt",
        }
    }

    fn template_name(&self) -> &'static str {
        match self {
            Self::Html => "article.html",
            Self::Markdown => "article.md",
            Self::Text => "article.txt",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ExportFormat {
    type Err = KsyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Ok(Self::Html),
            "md" | "markdown" => Ok(Self::Markdown),
            "txt" | "text" => Ok(Self::Text),
            other => Err(KsyncError::validation(format!(
                "unknown export format '{other}' (expected html, md or txt)"
            ))),
        }
    }
}

#[derive(Serialize)]
struct TurnView<'a> {
    speaker: &'static str,
    respondent: bool,
    content: &'a str,
}

/// Template context. Blank list entries are dropped so empty sections vanish.
#[derive(Serialize)]
struct ArticleView<'a> {
    title: &'a str,
    author: &'a str,
    category: &'a str,
    date: String,
    overview: &'a str,
    key_insights: Vec<&'a str>,
    planning_notes: Vec<&'a str>,
    execution_notes: Vec<&'a str>,
    tags: Vec<&'a str>,
    transcript: Vec<TurnView<'a>>,
}

impl<'a> ArticleView<'a> {
    fn new(article: &'a KnowledgeArticle) -> Self {
        fn non_blank(items: &[String]) -> Vec<&str> {
            items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect()
        }

        let overview = if article.overview.trim().is_empty() {
            article.summary.trim()
        } else {
            article.overview.trim()
        };

        Self {
            title: &article.title,
            author: &article.author,
            category: &article.category,
            date: article.created_at.format("%Y-%m-%d").to_string(),
            overview,
            key_insights: non_blank(&article.key_insights),
            planning_notes: non_blank(&article.planning_notes),
            execution_notes: non_blank(&article.execution_notes),
            tags: non_blank(&article.tags),
            transcript: article
                .conversation()
                .map(|m| TurnView {
                    speaker: m.role.speaker_label(),
                    respondent: m.role == ksync_core::session::MessageRole::Respondent,
                    content: m.content.trim(),
                })
                .collect(),
        }
    }
}

/// Renders articles into shareable documents.
pub struct ArticleExporter {
    env: Environment<'static>,
}

impl ArticleExporter {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        for format in [ExportFormat::Html, ExportFormat::Markdown, ExportFormat::Text] {
            let source = match format {
                ExportFormat::Html => HTML_TEMPLATE,
                ExportFormat::Markdown => MARKDOWN_TEMPLATE,
                ExportFormat::Text => TEXT_TEMPLATE,
            };
            env.add_template(format.template_name(), source)
                .map_err(|e| KsyncError::internal(format!("invalid {format} template: {e}")))?;
        }
        Ok(Self { env })
    }

    /// Self-contained, print-ready HTML document.
    pub fn render_html(&self, article: &KnowledgeArticle) -> Result<String> {
        self.render(article, ExportFormat::Html)
    }

    pub fn render_markdown(&self, article: &KnowledgeArticle) -> Result<String> {
        self.render(article, ExportFormat::Markdown)
    }

    /// Plain-text interviewer/respondent transcript.
    pub fn render_transcript(&self, article: &KnowledgeArticle) -> Result<String> {
        self.render(article, ExportFormat::Text)
    }

    pub fn render(&self, article: &KnowledgeArticle, format: ExportFormat) -> Result<String> {
        let template = self
            .env
            .get_template(format.template_name())
            .map_err(|e| KsyncError::internal(e.to_string()))?;
        template
            .render(ArticleView::new(article))
            .map_err(|e| {
                KsyncError::internal(format!(
                    "failed to render article {} as {format}: {e}",
                    article.id
                ))
            })
    }

    /// Renders `article` and writes it into `dir`, returning the file path.
    ///
    /// An existing file with the same name is overwritten.
    pub async fn write_export(
        &self,
        article: &KnowledgeArticle,
        format: ExportFormat,
        dir: &Path,
    ) -> Result<PathBuf> {
        let rendered = self.render(article, format)?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(export_file_name(article, format.extension()));
        tokio::fs::write(&path, rendered).await?;
        tracing::info!(article_id = %article.id, path = %path.display(), "Article exported");
        Ok(path)
    }
}

/// File name derived from the article title.
///
/// Runs of non-word characters become a single `_` and the result is cut to
/// [`FILE_NAME_MAX_CHARS`] characters. Letters from any script are kept.
pub fn export_file_name(article: &KnowledgeArticle, ext: &str) -> String {
    let sanitized = NON_WORD.replace_all(article.title.trim(), "_");
    let stem: String = sanitized.chars().take(FILE_NAME_MAX_CHARS).collect();
    let stem = if stem.trim_matches('_').is_empty() {
        "article".to_string()
    } else {
        stem
    };
    format!("{stem}.{ext}")
}
