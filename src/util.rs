/// Name used when nothing survives sanitizing.
const FALLBACK_NAME: &str = "Unknown";

/// Reduces `text` to characters that are safe in file names on every
/// platform.
///
/// Keeps ASCII letters, digits, `-`, `_` and `.`, plus spaces if
/// `allow_spaces` is set. Runs of spaces collapse into one.
///
/// # Examples
///
/// ```rust
/// # use sunnify::util::sanitize_filename;
/// assert_eq!(sanitize_filename("Café ☕ Music", true), "Caf Music");
/// assert_eq!(sanitize_filename("@#$", true), "Unknown");
/// ```
#[must_use]
pub fn sanitize_filename(text: &str, allow_spaces: bool) -> String {
    let kept: String = text
        .chars()
        .filter(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') || (allow_spaces && *c == ' ')
        })
        .collect();

    let collapsed = kept.split(' ').filter(|word| !word.is_empty()).collect::<Vec<_>>().join(" ");

    if collapsed.is_empty() {
        FALLBACK_NAME.to_owned()
    } else {
        collapsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_allowed_characters() {
        assert_eq!(sanitize_filename("Hello World", true), "Hello World");
        assert_eq!(sanitize_filename("file-name_123.mp3", true), "file-name_123.mp3");
        assert_eq!(sanitize_filename("A".repeat(300).as_str(), true), "A".repeat(300));
    }

    #[test]
    fn removes_special_characters() {
        assert_eq!(sanitize_filename("Hello@World#123!", true), "HelloWorld123");
        assert_eq!(sanitize_filename("Café ☕ Music", true), "Caf Music");
    }

    #[test]
    fn collapses_and_trims_spaces() {
        assert_eq!(sanitize_filename("  Hello    World ", true), "Hello World");
    }

    #[test]
    fn without_spaces() {
        assert_eq!(sanitize_filename("Hello World", false), "HelloWorld");
    }

    #[test]
    fn empty_result_falls_back() {
        assert_eq!(sanitize_filename("@#$%^&*", true), "Unknown");
        assert_eq!(sanitize_filename("", true), "Unknown");
    }
}
