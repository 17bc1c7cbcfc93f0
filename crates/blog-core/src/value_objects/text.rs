//! Text helpers for post content - slugs, reading time, excerpts

/// Default reading speed used for reading-time estimates
pub const DEFAULT_WORDS_PER_MINUTE: usize = 200;

/// Derive a URL slug from a title
///
/// Lowercases, drops everything outside `[a-z0-9]`, whitespace and `-`,
/// then collapses runs of whitespace/hyphens into a single `-`.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut pending_sep = false;

    for c in title.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_sep && !slug.is_empty() {
                slug.push('-');
            }
            pending_sep = false;
            slug.push(c);
        } else if c.is_whitespace() || c == '-' {
            pending_sep = true;
        }
    }

    slug
}

/// Check that a caller-supplied slug is already in canonical form
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty() && slugify(slug) == slug
}

/// Remove HTML tags, leaving a space where each tag was
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;

    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => {
                in_tag = false;
                out.push(' ');
            }
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }

    out
}

/// Count whitespace-separated, non-empty tokens
#[inline]
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Estimated reading time in whole minutes, never below 1
pub fn reading_time_minutes(content: &str, words_per_minute: usize) -> i32 {
    let words = word_count(&strip_tags(content));
    let minutes = words.div_ceil(words_per_minute.max(1)).max(1);
    i32::try_from(minutes).unwrap_or(i32::MAX)
}

/// Plain-text excerpt of at most `max_chars` characters
///
/// Cuts at the last word boundary and appends `...` when truncated.
pub fn excerpt(content: &str, max_chars: usize) -> String {
    let plain = strip_tags(content)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    if plain.chars().count() <= max_chars {
        return plain;
    }

    let cut: String = plain.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(' ') {
        Some(idx) if idx > 0 => &cut[..idx],
        _ => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end())
}
