//! CLI output formatting for every command.
//!
//! # Information-First Display
//!
//! Output leads with what a visitor or admin would recognise: folder display
//! names, slide captions, positional indices. Storage keys and raw URLs are
//! secondary context on indented lines.
//!
//! # Output Format
//!
//! ## List
//!
//! ```text
//! Photos
//! 001 Ugadi 2025 (12 items)
//!     Preview: https://cdn.example/ugadi/thumb.jpg
//!
//! Videos
//! 001 Dance Recital (2 items)
//!     https://www.youtube.com/embed/abc123XYZ
//! ```
//!
//! ## Hero
//!
//! ```text
//! Hero (2 slides, every 4.5s)
//! 001 Opening Night
//!     Source: https://cdn.example/hero/1.jpg
//!     About: Our first show of the season
//! ```
//!
//! ## Check
//!
//! ```text
//! Folders
//! 001 Dance Recital (video, 2 items)
//!     Key: Dance_Recital
//!
//! Inconsistent folders
//!     Dance_Recital: items disagree with the first item's kind
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions are pure: no I/O, no side effects.

use crate::admin::{AdminEvent, BatchReport};
use crate::types::{GalleryState, HeroSlide};
use crate::view::{self, FolderSummary, FolderView, GalleryView};
use crate::youtube;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn items(n: usize) -> String {
    match n {
        1 => "1 item".to_string(),
        n => format!("{n} items"),
    }
}

/// Truncate text to `max` characters, appending `...` if truncated.
fn truncate_desc(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        None => text.to_string(),
        Some((cut, _)) => format!("{}...", &text[..cut]),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{}", line);
    }
}

// ============================================================================
// list
// ============================================================================

fn folder_lines(index: usize, folder: &FolderView) -> Vec<String> {
    let mut lines = vec![format!(
        "{} {} ({})",
        format_index(index),
        folder.display_name,
        items(folder.count())
    )];
    if let Some(preview) = &folder.preview {
        lines.push(format!("{}Preview: {}", indent(1), preview));
    }
    for embed in &folder.embeds {
        lines.push(format!("{}{}", indent(1), embed));
    }
    lines
}

/// Format the public gallery: photo folders, then video folders.
pub fn format_gallery_view(view: &GalleryView) -> Vec<String> {
    let mut lines = Vec::new();
    for (title, folders) in [("Photos", &view.photo_folders), ("Videos", &view.video_folders)] {
        if folders.is_empty() {
            continue;
        }
        if !lines.is_empty() {
            lines.push(String::new());
        }
        lines.push(title.to_string());
        for (i, folder) in folders.iter().enumerate() {
            lines.extend(folder_lines(i + 1, folder));
        }
    }
    if lines.is_empty() {
        lines.push("No folders".to_string());
    }
    lines
}

pub fn print_gallery_view(view: &GalleryView) {
    print_lines(format_gallery_view(view));
}

// ============================================================================
// hero
// ============================================================================

/// Format the carousel sequence.
pub fn format_hero(slides: &[HeroSlide], interval_ms: u64) -> Vec<String> {
    let header = match slides.len() {
        0 => return vec!["Hero (no slides)".to_string()],
        1 => "Hero (1 slide)".to_string(),
        n => format!("Hero ({n} slides, every {:.1}s)", interval_ms as f64 / 1000.0),
    };
    let mut lines = vec![header];
    for (i, slide) in slides.iter().enumerate() {
        let title = if slide.name.is_empty() {
            format!("({})", slide.src.rsplit('/').next().unwrap_or(&slide.src))
        } else {
            slide.name.clone()
        };
        lines.push(format!("{} {}", format_index(i + 1), title));
        lines.push(format!("{}Source: {}", indent(1), slide.src));
        if !slide.about.is_empty() {
            lines.push(format!("{}About: {}", indent(1), truncate_desc(&slide.about, 60)));
        }
    }
    lines
}

pub fn print_hero(slides: &[HeroSlide], interval_ms: u64) {
    print_lines(format_hero(slides, interval_ms));
}

// ============================================================================
// check
// ============================================================================

/// Format the admin folder listing: every folder, empty ones included.
pub fn format_folder_summaries(folders: &[FolderSummary]) -> Vec<String> {
    let mut lines = vec!["Folders".to_string()];
    if folders.is_empty() {
        lines.push(format!("{}(none)", indent(1)));
    }
    for (i, folder) in folders.iter().enumerate() {
        lines.push(format!(
            "{} {} ({}, {})",
            format_index(i + 1),
            folder.display_name,
            folder.kind,
            items(folder.count)
        ));
        lines.push(format!("{}Key: {}", indent(1), folder.key));
    }
    lines
}

/// Format the admin listing plus any folders that mix kinds.
pub fn format_check(state: &GalleryState) -> Vec<String> {
    let mut lines = format_folder_summaries(&view::admin_folders(state));
    lines.push(String::new());
    let inconsistent = view::folder_inconsistencies(state);
    if inconsistent.is_empty() {
        lines.push("No inconsistent folders".to_string());
    } else {
        lines.push("Inconsistent folders".to_string());
        for key in inconsistent {
            lines.push(format!(
                "{}{}: items disagree with the first item's kind",
                indent(1),
                key
            ));
        }
    }
    lines
}

pub fn print_check(state: &GalleryState) {
    print_lines(format_check(state));
}

// ============================================================================
// youtube
// ============================================================================

/// Format the derived links for a YouTube URL, or `None` if it has no id.
pub fn format_youtube(url: &str) -> Option<Vec<String>> {
    let id = youtube::parse_youtube_id(url)?;
    Some(vec![
        format!("Id: {id}"),
        format!("Embed: {}", youtube::embed_url(url)?),
        format!("Thumbnail: {}", youtube::thumbnail_url(url)?),
    ])
}

// ============================================================================
// Admin progress
// ============================================================================

/// Format a single admin progress event as display lines.
pub fn format_admin_event(event: &AdminEvent) -> Vec<String> {
    match event {
        AdminEvent::Status(message) => vec![format!("==> {}", message)],
        AdminEvent::Progress {
            action,
            item,
            done,
            total,
        } => vec![format!("{}{} {}/{} {}", indent(1), action, done, total, item)],
    }
}

/// Format the per-link failures of a video batch.
pub fn format_batch_failures(report: &BatchReport) -> Vec<String> {
    report
        .failures
        .iter()
        .map(|f| format!("{}Failed: {} ({})", indent(1), f.url, f.message))
        .collect()
}
