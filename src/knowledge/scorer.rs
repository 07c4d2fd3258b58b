//! Scorer - 빈도 기반 (TF-IDF 유사) 관련도 계산
//!
//! score = Σ tf(t, doc) × idf(t)
//! - tf(t, doc) = count(t) / len(tokens(doc))
//! - idf(t) = ln(1 + N / (df(t) + 1))  (Smoothed, 기본값)
//! - idf(t) = ln(N / (df(t) + 1))      (Classic)

use std::collections::HashMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::index::InvertedIndex;
use super::tokenizer::tokenize;

/// 점수 상한 (표시용 범위 제한)
pub const MAX_SCORE: f64 = 1.0;

/// IDF 가중 방식
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfWeighting {
    /// ln(1 + N / (df + 1)) - 항상 양수
    #[default]
    Smoothed,
    /// ln(N / (df + 1)) - 문서 절반 이상에 등장하면 0 이하
    Classic,
}

impl FromStr for IdfWeighting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "smoothed" => Ok(Self::Smoothed),
            "classic" => Ok(Self::Classic),
            other => Err(format!("unknown idf weighting: {}", other)),
        }
    }
}

/// 문서 하나의 토큰 빈도표
#[derive(Debug, Clone)]
pub struct TermFrequencies {
    counts: HashMap<String, usize>,
    total: usize,
}

impl TermFrequencies {
    pub fn from_content(content: &str) -> Self {
        let tokens = tokenize(content);
        let total = tokens.len();
        let mut counts = HashMap::new();
        for token in tokens {
            *counts.entry(token).or_insert(0) += 1;
        }
        Self { counts, total }
    }

    /// 정규화된 단어 빈도 (빈 문서는 0)
    pub fn tf(&self, token: &str) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.counts.get(token).copied().unwrap_or(0) as f64 / self.total as f64
    }
}

/// 인덱스 통계를 참조하는 점수 계산기
pub struct Scorer<'a> {
    index: &'a InvertedIndex,
    total_documents: usize,
    weighting: IdfWeighting,
}

impl<'a> Scorer<'a> {
    pub fn new(index: &'a InvertedIndex, total_documents: usize, weighting: IdfWeighting) -> Self {
        Self {
            index,
            total_documents,
            weighting,
        }
    }

    /// 역문서 빈도
    pub fn idf(&self, token: &str) -> f64 {
        if self.total_documents == 0 {
            return 0.0;
        }
        let df = self.index.document_frequency(token);
        let ratio = self.total_documents as f64 / (df as f64 + 1.0);
        match self.weighting {
            IdfWeighting::Smoothed => ratio.ln_1p(),
            IdfWeighting::Classic => ratio.ln(),
        }
    }

    /// 원시 점수 (상한 적용 전)
    ///
    /// 질의 토큰이 반복되면 그만큼 여러 번 합산됩니다.
    pub fn raw_score<S: AsRef<str>>(&self, query_tokens: &[S], content: &str) -> f64 {
        let freqs = TermFrequencies::from_content(content);
        query_tokens
            .iter()
            .map(|t| {
                let tf = freqs.tf(t.as_ref());
                if tf > 0.0 {
                    tf * self.idf(t.as_ref())
                } else {
                    0.0
                }
            })
            .sum()
    }
}

/// 상한 1.0 적용 후 소수점 4자리 반올림
pub fn normalize_score(raw: f64) -> f64 {
    (raw.min(MAX_SCORE) * 10_000.0).round() / 10_000.0
}

// ============================================================================
// Tests
// ============================================================================
