//! Masking of secrets for logs and config dumps

/// Number of trailing characters left visible by default
pub const DEFAULT_KEEP_LAST: usize = 6;

const MASK: &str = "******";

/// Hide all but the last `keep_last` characters of a secret.
///
/// Values no longer than `keep_last` are returned unchanged.
pub fn mask_sensitive_info(info: &str, keep_last: usize) -> String {
    let len = info.chars().count();
    if len <= keep_last {
        return info.to_string();
    }
    let tail: String = info.chars().skip(len - keep_last).collect();
    format!("{}{}", MASK, tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_keeps_tail() {
        assert_eq!(
            mask_sensitive_info("ragflow-abcdef123456", DEFAULT_KEEP_LAST),
            "******123456"
        );
    }

    #[test]
    fn test_mask_short_values_unchanged() {
        assert_eq!(mask_sensitive_info("abc", DEFAULT_KEEP_LAST), "abc");
        assert_eq!(mask_sensitive_info("abcdef", DEFAULT_KEEP_LAST), "abcdef");
        assert_eq!(mask_sensitive_info("", DEFAULT_KEEP_LAST), "");
    }

    #[test]
    fn test_mask_multibyte() {
        assert_eq!(mask_sensitive_info("知识库标识符一二三", 3), "******一二三");
    }
}
