//! Knowledge 모듈 - 상담 응답 근거용 지식 저장소
//!
//! - Tokenizer: 소문자 영숫자 토큰화
//! - Document: 원본 문서 (저장소가 단독 소유)
//! - InvertedIndex: 토큰 → 문서 ID 집합 (파생 데이터)
//! - Scorer / QueryEngine: TF-IDF 유사 점수로 순위 검색
//! - Snapshot: 문서 맵 전체 JSON 스냅샷 (인덱스는 저장하지 않음)
//! - Samples: 기본 지식베이스 문서

mod document;
mod index;
mod query;
mod samples;
mod scorer;
mod snapshot;
mod store;
mod tokenizer;

// Re-exports
pub use document::{
    preview, AddedDocument, Document, DocumentId, DocumentList, DocumentSummary,
    MetadataUpdate, NewDocument, DEFAULT_CATEGORY, PREVIEW_CHARS,
};
pub use index::InvertedIndex;
pub use query::{QueryEngine, SearchHit, SearchResponse};
pub use samples::{sample_documents, seed_samples};
pub use scorer::{normalize_score, IdfWeighting, Scorer, TermFrequencies, MAX_SCORE};
pub use snapshot::SnapshotFile;
pub use store::{KnowledgeStore, StoreStats};
pub use tokenizer::{distinct_tokens, tokenize};
