//! `:shortcode:` emoji replacement.

use std::borrow::Cow;

/// Shortcodes recognised in prose, sorted by name for binary search.
const SHORTCODES: &[(&str, &str)] = &[
    ("+1", "👍"),
    ("-1", "👎"),
    ("bug", "🐛"),
    ("bulb", "💡"),
    ("check", "✔️"),
    ("clap", "👏"),
    ("construction", "🚧"),
    ("cry", "😢"),
    ("eyes", "👀"),
    ("fire", "🔥"),
    ("grin", "😁"),
    ("heart", "❤️"),
    ("information_source", "ℹ️"),
    ("joy", "😂"),
    ("laughing", "😆"),
    ("lock", "🔒"),
    ("memo", "📝"),
    ("no_entry", "⛔"),
    ("ok_hand", "👌"),
    ("question", "❓"),
    ("rocket", "🚀"),
    ("smile", "😄"),
    ("smiley", "😃"),
    ("sparkles", "✨"),
    ("star", "⭐"),
    ("tada", "🎉"),
    ("thinking", "🤔"),
    ("thumbsdown", "👎"),
    ("thumbsup", "👍"),
    ("warning", "⚠️"),
    ("wave", "👋"),
    ("white_check_mark", "✅"),
    ("wink", "😉"),
    ("x", "❌"),
    ("zap", "⚡"),
];

fn lookup(name: &str) -> Option<&'static str> {
    SHORTCODES
        .binary_search_by(|(code, _)| (*code).cmp(name))
        .ok()
        .map(|i| SHORTCODES[i].1)
}

fn is_shortcode_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || matches!(c, '_' | '+' | '-')
}

/// Replace known `:shortcode:` sequences in `text`.
///
/// Unknown shortcodes are left untouched. Returns the input unchanged (and
/// unallocated) when nothing was replaced.
pub(crate) fn replace_shortcodes(text: &str) -> Cow<'_, str> {
    if !text.contains(':') {
        return Cow::Borrowed(text);
    }

    let mut result = String::new();
    let mut copied = 0;
    let mut search_from = 0;

    while let Some(open) = text[search_from..].find(':').map(|i| i + search_from) {
        let name_start = open + 1;
        let Some(close) = text[name_start..].find(':').map(|i| i + name_start) else {
            break;
        };
        let name = &text[name_start..close];

        if !name.is_empty()
            && name.chars().all(is_shortcode_char)
            && let Some(emoji) = lookup(name)
        {
            result.push_str(&text[copied..open]);
            result.push_str(emoji);
            copied = close + 1;
            search_from = close + 1;
        } else {
            // The closing colon may open the next shortcode.
            search_from = close;
        }
    }

    if copied == 0 {
        return Cow::Borrowed(text);
    }
    result.push_str(&text[copied..]);
    Cow::Owned(result)
}
