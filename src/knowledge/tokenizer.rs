//! Tokenizer - 텍스트를 검색 토큰으로 분리
//!
//! 소문자 변환 후 영숫자 연속 구간만 토큰으로 취합니다.
//! 스테밍, 불용어 제거는 하지 않습니다.

use std::collections::HashSet;
use std::sync::OnceLock;

use regex::Regex;

/// 영숫자 연속 구간 (`char::is_alphanumeric`과 동일한 문자 집합)
fn word_regex() -> &'static Regex {
    static WORD_RE: OnceLock<Regex> = OnceLock::new();
    WORD_RE.get_or_init(|| {
        Regex::new(r"[\p{Alphabetic}\p{N}]+").expect("word pattern is a valid regex")
    })
}

/// 텍스트를 순서가 유지된 토큰 목록으로 변환
///
/// 빈 문자열이나 구두점만 있는 입력은 빈 목록을 반환합니다.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    word_regex()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// 중복 제거된 토큰 집합
pub fn distinct_tokens(text: &str) -> HashSet<String> {
    tokenize(text).into_iter().collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenize_basic() {
        assert_eq!(
            tokenize("Refund policy, explains REFUND timeline!"),
            vec!["refund", "policy", "explains", "refund", "timeline"]
        );
    }

    #[test]
    fn test_tokenize_empty_and_punctuation() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("   ").is_empty());
        assert!(tokenize("?!... --- ***").is_empty());
    }

    #[test]
    fn test_tokenize_splits_on_symbols() {
        assert_eq!(
            tokenize("billing@ourdomain.com 1-800-SUPPORT"),
            vec!["billing", "ourdomain", "com", "1", "800", "support"]
        );
        // 밑줄도 구분자로 취급
        assert_eq!(tokenize("snake_case"), vec!["snake", "case"]);
    }

    #[test]
    fn test_tokenize_unicode_alphanumeric() {
        assert_eq!(tokenize("Café 안녕하세요"), vec!["café", "안녕하세요"]);
    }

    #[test]
    fn test_tokenize_is_deterministic() {
        let text = "Reset password instructions: reset, then log in.";
        assert_eq!(tokenize(text), tokenize(text));
    }

    #[test]
    fn test_distinct_tokens() {
        let tokens = distinct_tokens("refund refund REFUND policy");
        assert_eq!(tokens.len(), 2);
        assert!(tokens.contains("refund"));
        assert!(tokens.contains("policy"));
    }
}
