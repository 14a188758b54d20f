use std::time::{SystemTime, UNIX_EPOCH};

/// Returns at most `max_chars` characters of `text`, never splitting a UTF-8 sequence.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}

pub fn now_epoch_seconds() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("", 5), "");
        assert_eq!(truncate_chars("hello", 10), "hello");
        assert_eq!(truncate_chars("hello", 5), "hello");
        assert_eq!(truncate_chars("hello world", 5), "hello");
        assert_eq!(truncate_chars("vídeo", 2), "ví");
    }

    #[test]
    fn test_now_epoch_seconds() {
        // 2020-01-01T00:00:00Z
        assert!(now_epoch_seconds() > 1_577_836_800);
    }
}
