use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use similar::TextDiff;
use tracing::{debug, info};

use crate::config::PagekitConfig;
use crate::extract::{DroppedField, Extraction, extract_fields, merge_config};
use crate::fields::FieldMatchers;
use crate::filesystem::{PageFile, ScanOptions, scan_page_files};
use crate::runtime::{ResolvedPaths, normalize_for_display};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FileStatus {
    Written,
    Skipped,
}

impl FileStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Written => "written",
            Self::Skipped => "skipped",
        }
    }
}

/// What injecting into one page's content would do.
#[derive(Debug, Clone, PartialEq)]
pub enum InjectionPlan {
    /// The marker is already present.
    Skip,
    Write {
        content: String,
        merged: Map<String, Value>,
        extraction: Extraction,
    },
}

/// Everything needed to rewrite pages, built once per run.
#[derive(Debug, Clone)]
pub struct Injector {
    matchers: FieldMatchers,
    defaults: Map<String, Value>,
    marker: String,
    binding: String,
}

impl Injector {
    pub fn new(matchers: FieldMatchers, defaults: Map<String, Value>, marker: &str, binding: &str) -> Self {
        Self {
            matchers,
            defaults,
            marker: marker.to_string(),
            binding: binding.to_string(),
        }
    }

    pub fn from_config(config: &PagekitConfig) -> Result<Self> {
        Ok(Self::new(
            FieldMatchers::compile()?,
            config.style.to_config(),
            &config.inject.marker,
            &config.inject.binding,
        ))
    }

    pub fn is_processed(&self, content: &str) -> bool {
        content.contains(&self.marker)
    }

    /// Merged configuration for `content`, regardless of the marker.
    pub fn merged_config(&self, content: &str) -> (Map<String, Value>, Extraction) {
        let extraction = extract_fields(content, &self.matchers);
        let merged = merge_config(&self.defaults, &extraction.data);
        (merged, extraction)
    }

    pub fn plan(&self, content: &str) -> Result<InjectionPlan> {
        if self.is_processed(content) {
            return Ok(InjectionPlan::Skip);
        }
        let (merged, extraction) = self.merged_config(content);
        let block = render_block(&merged, &self.marker, &self.binding)?;
        Ok(InjectionPlan::Write {
            content: insert_block(content, &block),
            merged,
            extraction,
        })
    }

    /// Plan and, unless `dry_run`, rewrite one page in place.
    pub fn process_file(&self, file: &PageFile, options: &InjectOptions) -> Result<FileReport> {
        let original = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;

        let plan = self.plan(&original)?;
        let InjectionPlan::Write {
            content,
            extraction,
            ..
        } = plan
        else {
            debug!(path = %file.relative_path, "marker present; skipping");
            return Ok(FileReport {
                relative_path: file.relative_path.clone(),
                status: FileStatus::Skipped,
                extracted: Vec::new(),
                dropped: Vec::new(),
                diff: None,
            });
        };

        let diff = options
            .include_diff
            .then(|| render_diff(&file.relative_path, &original, &content));
        if !options.dry_run {
            fs::write(&file.path, &content)
                .with_context(|| format!("failed to write {}", file.path.display()))?;
            info!(path = %file.relative_path, fields = extraction.data.len(), "injected page configuration");
        }

        Ok(FileReport {
            relative_path: file.relative_path.clone(),
            status: FileStatus::Written,
            extracted: extraction.extracted_fields(),
            dropped: extraction.dropped,
            diff,
        })
    }
}

#[derive(Debug, Clone, Default)]
pub struct InjectOptions {
    pub dry_run: bool,
    pub include_diff: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub relative_path: String,
    pub status: FileStatus,
    pub extracted: Vec<String>,
    pub dropped: Vec<DroppedField>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub content_dir: String,
    pub dry_run: bool,
    pub written: usize,
    pub skipped: usize,
    pub files: Vec<FileReport>,
}

/// Walk the content directory and inject into every unprocessed page, one at a
/// time. A read or write failure aborts the run; pages already written stay
/// written.
pub fn run_injection(
    paths: &ResolvedPaths,
    config: &PagekitConfig,
    options: &InjectOptions,
) -> Result<RunReport> {
    let injector = Injector::from_config(config)?;
    let files = scan_page_files(&paths.content_dir, &ScanOptions::from_config(&config.scan));

    let mut report = RunReport {
        content_dir: normalize_for_display(&paths.content_dir),
        dry_run: options.dry_run,
        written: 0,
        skipped: 0,
        files: Vec::with_capacity(files.len()),
    };
    for file in &files {
        let file_report = injector.process_file(file, options)?;
        match file_report.status {
            FileStatus::Written => report.written += 1,
            FileStatus::Skipped => report.skipped += 1,
        }
        report.files.push(file_report);
    }
    Ok(report)
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub content_dir: String,
    pub total: usize,
    pub processed: usize,
    pub pending: Vec<String>,
}

/// Count pages carrying the marker; the rest are what the next run would touch.
pub fn injection_status(paths: &ResolvedPaths, config: &PagekitConfig) -> Result<StatusReport> {
    let files = scan_page_files(&paths.content_dir, &ScanOptions::from_config(&config.scan));
    let mut processed = 0usize;
    let mut pending = Vec::new();
    for file in &files {
        let content = fs::read_to_string(&file.path)
            .with_context(|| format!("failed to read {}", file.path.display()))?;
        if content.contains(&config.inject.marker) {
            processed += 1;
        } else {
            pending.push(file.relative_path.clone());
        }
    }
    Ok(StatusReport {
        content_dir: normalize_for_display(&paths.content_dir),
        total: files.len(),
        processed,
        pending,
    })
}

/// Merged configuration a page would receive, without touching the file.
pub fn inspect_page(path: &Path, config: &PagekitConfig) -> Result<(Map<String, Value>, Extraction)> {
    let content =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let injector = Injector::from_config(config)?;
    Ok(injector.merged_config(&content))
}

/// Render the generated declaration, fenced by marker comments.
pub fn render_block(merged: &Map<String, Value>, marker: &str, binding: &str) -> Result<String> {
    let body = serde_json::to_string_pretty(merged).context("failed to serialize page configuration")?;
    Ok(format!(
        "// ========== {marker} ==========\nconst {binding} = {body};\n// ========== END {marker} ==========\n"
    ))
}

/// Insert `block` at the top of `content`, after any BOM, shebang line and
/// directive prologue (`"use client";`), which must stay first.
pub fn insert_block(content: &str, block: &str) -> String {
    let offset = insertion_offset(content);
    let (head, tail) = content.split_at(offset);

    let mut out = String::with_capacity(content.len() + block.len() + 2);
    out.push_str(head);
    if !head.trim_start_matches('\u{feff}').is_empty() {
        if !head.ends_with('\n') {
            out.push('\n');
        }
        out.push('\n');
    }
    out.push_str(block);
    out.push('\n');
    out.push_str(tail);
    out
}

fn insertion_offset(content: &str) -> usize {
    let mut offset = 0;
    if content.starts_with('\u{feff}') {
        offset = '\u{feff}'.len_utf8();
    }
    if content[offset..].starts_with("#!") {
        offset = line_end(content, offset);
    }

    // Directives may be preceded by comments; only commit past those comments
    // when a directive actually follows.
    let mut cursor = offset;
    loop {
        cursor = skip_whitespace_and_comments(content, cursor);
        match directive_end(content, cursor) {
            Some(end) => {
                cursor = end;
                offset = end;
            }
            None => break,
        }
    }
    offset
}

fn line_end(content: &str, from: usize) -> usize {
    content[from..]
        .find('\n')
        .map_or(content.len(), |index| from + index + 1)
}

fn skip_whitespace_and_comments(content: &str, mut pos: usize) -> usize {
    loop {
        let rest = &content[pos..];
        let trimmed = rest.trim_start();
        pos += rest.len() - trimmed.len();
        if trimmed.starts_with("//") {
            pos = line_end(content, pos);
        } else if trimmed.starts_with("/*") {
            match trimmed[2..].find("*/") {
                Some(index) => pos += 2 + index + 2,
                None => return pos,
            }
        } else {
            return pos;
        }
    }
}

/// End of a `'use strict';`-style statement starting at `pos`, through its line.
///
/// The semicolon is optional and trailing comments may follow it.
fn directive_end(content: &str, pos: usize) -> Option<usize> {
    let rest = &content[pos..];
    let quote = rest.chars().next().filter(|ch| *ch == '"' || *ch == '\'')?;
    let close = rest[1..].find(|ch: char| ch == quote || ch == '\n')?;
    if rest[1..].as_bytes()[close] == b'\n' {
        return None;
    }

    let mut cursor = pos + 1 + close + 1;
    let mut seen_semicolon = false;
    loop {
        let rest = &content[cursor..];
        let trimmed = rest.trim_start_matches([' ', '\t']);
        cursor += rest.len() - trimmed.len();
        if trimmed.is_empty() || trimmed.starts_with('\n') || trimmed.starts_with("\r\n") {
            return Some(line_end(content, cursor));
        }
        if trimmed.starts_with("//") {
            return Some(line_end(content, cursor));
        }
        if trimmed.starts_with("/*") {
            let close = trimmed[2..].find("*/")?;
            cursor += 2 + close + 2;
            continue;
        }
        if trimmed.starts_with(';') && !seen_semicolon {
            seen_semicolon = true;
            cursor += 1;
            continue;
        }
        return None;
    }
}

pub fn render_diff(relative_path: &str, before: &str, after: &str) -> String {
    TextDiff::from_lines(before, after)
        .unified_diff()
        .context_radius(3)
        .header(&format!("a/{relative_path}"), &format!("b/{relative_path}"))
        .to_string()
}
