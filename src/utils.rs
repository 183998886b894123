//! Utility functions for download names and response headers

/// Longest download name stem kept, in characters
const MAX_STEM_CHARS: usize = 180;

/// Turn a resolved title into a safe download file name
///
/// Path separators, quotes, control characters and characters reserved on
/// Windows are replaced with `_`, surrounding dots and whitespace are trimmed,
/// and overly long titles are cut. An empty result falls back to `"audio"`.
///
/// # Examples
///
/// ```
/// use yt_fetch::utils::download_file_name;
///
/// assert_eq!(download_file_name("AC/DC - Thunderstruck", ".mp3"), "AC_DC - Thunderstruck.mp3");
/// assert_eq!(download_file_name("   ", ".mp3"), "audio.mp3");
/// ```
pub fn download_file_name(title: &str, extension: &str) -> String {
    let cleaned: String = title
        .chars()
        .map(|c| match c {
            '/' | '\\' | '"' | ':' | '*' | '?' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let trimmed = cleaned.trim_matches(|c: char| c.is_whitespace() || c == '.');
    let stem: String = trimmed.chars().take(MAX_STEM_CHARS).collect();
    let stem = stem.trim_end();

    if stem.is_empty() {
        format!("audio{extension}")
    } else {
        format!("{stem}{extension}")
    }
}

/// Build a `Content-Disposition: attachment` value for a download name
///
/// Carries an ASCII-only `filename` for old clients and an RFC 5987
/// `filename*` with the full UTF-8 name.
///
/// # Examples
///
/// ```
/// use yt_fetch::utils::content_disposition;
///
/// assert_eq!(
///     content_disposition("Song.mp3"),
///     "attachment; filename=\"Song.mp3\"; filename*=UTF-8''Song.mp3"
/// );
/// ```
pub fn content_disposition(file_name: &str) -> String {
    let ascii: String = file_name
        .chars()
        .map(|c| {
            if c.is_ascii() && !c.is_ascii_control() && c != '"' && c != '\\' {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        ascii,
        urlencoding::encode(file_name)
    )
}
