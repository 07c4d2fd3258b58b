//! Inverted Index - 토큰 → 문서 ID 집합
//!
//! 문서 저장소에서 파생된 데이터이며 단독으로 영속화되지 않습니다.
//! 불변식: 모든 문서 d, 토큰 t에 대해
//! `t ∈ tokenize(d.content)` ⟺ `d.id ∈ index[t]`

use std::collections::{HashMap, HashSet};

use super::document::{Document, DocumentId};
use super::tokenizer::distinct_tokens;

/// 토큰별 문서 ID 집합
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    entries: HashMap<String, HashSet<DocumentId>>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// 문서 목록으로 인덱스 생성
    pub fn build<'a>(documents: impl IntoIterator<Item = &'a Document>) -> Self {
        let mut index = Self::new();
        for doc in documents {
            index.add(doc.id, &doc.content);
        }
        index
    }

    /// 콘텐츠의 고유 토큰마다 ID 등록
    pub fn add(&mut self, id: DocumentId, content: &str) {
        for token in distinct_tokens(content) {
            self.entries.entry(token).or_default().insert(id);
        }
    }

    /// 콘텐츠의 고유 토큰마다 ID 제거 (비게 된 항목은 삭제)
    pub fn remove(&mut self, id: DocumentId, content: &str) {
        for token in distinct_tokens(content) {
            if let Some(ids) = self.entries.get_mut(&token) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.entries.remove(&token);
                }
            }
        }
    }

    /// 기존 콘텐츠 제거 후 새 콘텐츠 등록
    ///
    /// 호출자는 쓰기 잠금 안에서 호출해야 합니다.
    pub fn replace(&mut self, id: DocumentId, old_content: &str, new_content: &str) {
        self.remove(id, old_content);
        self.add(id, new_content);
    }

    /// 질의 토큰들의 후보 문서 ID 합집합
    pub fn candidates<S: AsRef<str>>(&self, query_tokens: &[S]) -> HashSet<DocumentId> {
        let mut ids = HashSet::new();
        for token in query_tokens {
            if let Some(set) = self.entries.get(token.as_ref()) {
                ids.extend(set.iter().copied());
            }
        }
        ids
    }

    /// 토큰을 포함하는 문서 수 (없으면 0)
    pub fn document_frequency(&self, token: &str) -> usize {
        self.entries.get(token).map_or(0, HashSet::len)
    }

    pub fn contains(&self, token: &str, id: &DocumentId) -> bool {
        self.entries.get(token).is_some_and(|ids| ids.contains(id))
    }

    /// 고유 토큰 수
    pub fn token_count(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// 문서 집합에 대한 불변식 검사
    ///
    /// 위반 내용을 설명하는 메시지를 반환합니다.
    pub fn check_consistency(&self, documents: &HashMap<DocumentId, Document>) -> Result<(), String> {
        let mut expected: HashMap<&str, HashSet<DocumentId>> = HashMap::new();
        let token_sets: Vec<(DocumentId, HashSet<String>)> = documents
            .values()
            .map(|d| (d.id, distinct_tokens(&d.content)))
            .collect();

        for (id, tokens) in &token_sets {
            for token in tokens {
                expected.entry(token.as_str()).or_default().insert(*id);
            }
        }

        for (token, ids) in &expected {
            match self.entries.get(*token) {
                Some(actual) if actual == ids => {}
                Some(actual) => {
                    return Err(format!(
                        "token '{}' maps to {} ids, expected {}",
                        token,
                        actual.len(),
                        ids.len()
                    ));
                }
                None => return Err(format!("token '{}' missing from index", token)),
            }
        }

        if let Some(stale) = self.entries.keys().find(|t| !expected.contains_key(t.as_str())) {
            return Err(format!("stale token '{}' has no backing document", stale));
        }

        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
