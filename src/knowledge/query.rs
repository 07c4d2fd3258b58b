//! Query Engine - 후보 선택, 점수 계산, 정렬, 절단
//!
//! 1. 질의 토큰화 (비면 빈 결과)
//! 2. 인덱스에서 후보 문서 선택 (없으면 빈 결과)
//! 3. 후보별 점수 계산, 0 이하 제거
//! 4. 상한 1.0 + 소수점 4자리 반올림
//! 5. 점수 내림차순, 동점은 생성 순서
//! 6. top_k 절단

use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use super::document::{Document, DocumentId};
use super::index::InvertedIndex;
use super::scorer::{normalize_score, IdfWeighting, Scorer};
use super::tokenizer::tokenize;

// ============================================================================
// Types
// ============================================================================

/// 검색 결과 항목
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    pub document_id: DocumentId,
    pub title: String,
    pub content: String,
    pub relevance_score: f64,
    pub category: String,
}

/// 검색 응답 (질의 + 결과)
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHit>,
    pub total_results: usize,
}

impl SearchResponse {
    pub fn new(query: &str, results: Vec<SearchHit>) -> Self {
        Self {
            query: query.to_string(),
            total_results: results.len(),
            results,
        }
    }
}

// ============================================================================
// QueryEngine
// ============================================================================

/// 읽기 잠금 아래에서 문서/인덱스 스냅샷을 빌려 검색을 수행
pub struct QueryEngine<'a> {
    documents: &'a HashMap<DocumentId, Document>,
    index: &'a InvertedIndex,
    weighting: IdfWeighting,
}

impl<'a> QueryEngine<'a> {
    pub fn new(
        documents: &'a HashMap<DocumentId, Document>,
        index: &'a InvertedIndex,
        weighting: IdfWeighting,
    ) -> Self {
        Self {
            documents,
            index,
            weighting,
        }
    }

    /// 관련도 순 검색
    ///
    /// `top_k`가 1 미만이면 1로 취급합니다.
    pub fn search(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let top_k = top_k.max(1);

        let query_tokens = tokenize(query);
        if query_tokens.is_empty() || self.documents.is_empty() {
            return Vec::new();
        }

        let candidates = self.index.candidates(&query_tokens);
        if candidates.is_empty() {
            return Vec::new();
        }

        let scorer = Scorer::new(self.index, self.documents.len(), self.weighting);

        let mut scored: Vec<(&Document, f64)> = candidates
            .iter()
            .filter_map(|id| {
                // 인덱스에만 있는 ID는 불변식 위반
                let doc = self.documents.get(id);
                debug_assert!(doc.is_some(), "index references unknown document {}", id);
                doc
            })
            .map(|doc| (doc, scorer.raw_score(&query_tokens, &doc.content)))
            .filter(|(_, score)| *score > 0.0)
            .map(|(doc, score)| (doc, normalize_score(score)))
            .collect();

        scored.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then_with(|| a.0.creation_key().cmp(&b.0.creation_key()))
        });
        scored.truncate(top_k);

        tracing::debug!(
            "Query '{}' -> {} candidates, {} hits",
            query,
            candidates.len(),
            scored.len()
        );

        scored
            .into_iter()
            .map(|(doc, relevance_score)| SearchHit {
                document_id: doc.id,
                title: doc.title.clone(),
                content: doc.content.clone(),
                relevance_score,
                category: doc.category.clone(),
            })
            .collect()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::NewDocument;
    use chrono::Duration;

    struct Corpus {
        documents: HashMap<DocumentId, Document>,
        index: InvertedIndex,
    }

    impl Corpus {
        fn new(items: &[(&str, &str)]) -> (Self, Vec<DocumentId>) {
            let mut documents = HashMap::new();
            let mut ids = Vec::new();
            let base = chrono::Utc::now();
            for (i, (title, content)) in items.iter().enumerate() {
                let mut doc = Document::create(NewDocument {
                    title: title.to_string(),
                    content: content.to_string(),
                    ..Default::default()
                });
                // 생성 순서를 명확히
                doc.created_at = base + Duration::milliseconds(i as i64);
                ids.push(doc.id);
                documents.insert(doc.id, doc);
            }
            let index = InvertedIndex::build(documents.values());
            (Self { documents, index }, ids)
        }

        fn engine(&self) -> QueryEngine<'_> {
            QueryEngine::new(&self.documents, &self.index, IdfWeighting::Smoothed)
        }
    }

    #[test]
    fn test_empty_query_and_store() {
        let (corpus, _) = Corpus::new(&[]);
        assert!(corpus.engine().search("refund", 3).is_empty());

        let (corpus, _) = Corpus::new(&[("A", "refund policy")]);
        assert!(corpus.engine().search("", 3).is_empty());
        assert!(corpus.engine().search("?!? ...", 3).is_empty());
        assert!(corpus.engine().search("xyz", 3).is_empty());
    }

    #[test]
    fn test_ranking_by_term_frequency() {
        let (corpus, ids) = Corpus::new(&[
            ("Once", "refund requested yesterday by customer"),
            ("Thrice", "refund refund refund"),
            ("Other", "password reset"),
        ]);

        let hits = corpus.engine().search("refund", 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].document_id, ids[1]);
        assert_eq!(hits[1].document_id, ids[0]);
        assert!(hits[0].relevance_score > hits[1].relevance_score);
    }

    #[test]
    fn test_ties_follow_creation_order() {
        let (corpus, ids) = Corpus::new(&[
            ("First", "shipping delay"),
            ("Second", "shipping delay"),
            ("Third", "shipping delay"),
            ("Filler", "unrelated words"),
        ]);

        let hits = corpus.engine().search("shipping", 10);
        let order: Vec<_> = hits.iter().map(|h| h.document_id).collect();
        assert_eq!(order, vec![ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_top_k_truncation() {
        let (corpus, _) = Corpus::new(&[
            ("A", "invoice one"),
            ("B", "invoice two"),
            ("C", "invoice three"),
        ]);

        assert_eq!(corpus.engine().search("invoice", 2).len(), 2);
        assert_eq!(corpus.engine().search("invoice", 10).len(), 3);
        // 0은 1로 취급
        assert_eq!(corpus.engine().search("invoice", 0).len(), 1);
    }

    #[test]
    fn test_scores_clamped_and_rounded() {
        let (corpus, _) = Corpus::new(&[("A", "x"), ("B", "y"), ("C", "z"), ("D", "w")]);

        // tf = 1, 반복 질의로 원시 점수가 1을 넘음
        let hits = corpus.engine().search("x x x x", 1);
        assert_eq!(hits[0].relevance_score, 1.0);

        let (corpus, _) = Corpus::new(&[("A", "alpha beta gamma delta"), ("B", "other")]);
        let score = corpus.engine().search("alpha", 1)[0].relevance_score;
        assert_eq!(score, (score * 10_000.0).round() / 10_000.0);
        assert!(score > 0.0 && score <= 1.0);
    }

    #[test]
    fn test_classic_weighting_discards_common_terms() {
        let (corpus, _) = Corpus::new(&[("A", "refund policy"), ("B", "reset password")]);
        let engine = QueryEngine::new(&corpus.documents, &corpus.index, IdfWeighting::Classic);

        // ln(2 / 2) = 0 -> 제거
        assert!(engine.search("refund", 3).is_empty());
    }

    #[test]
    fn test_search_is_idempotent() {
        let (corpus, _) = Corpus::new(&[
            ("A", "billing cycle monthly"),
            ("B", "billing annual discount"),
            ("C", "billing support email"),
        ]);
        let first = corpus.engine().search("billing annual", 3);
        let second = corpus.engine().search("billing annual", 3);
        assert_eq!(first, second);
    }

    #[test]
    fn test_search_response() {
        let response = SearchResponse::new("q", vec![]);
        assert_eq!(response.total_results, 0);
        assert_eq!(response.query, "q");
    }
}
