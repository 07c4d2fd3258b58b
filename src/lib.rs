//! ivr-knowledge - 상담 응답 근거용 지식 검색 엔진
//!
//! 소규모 문서 컬렉션에 대한 역색인 + TF-IDF 유사 점수 검색.
//! 문서 맵은 변경마다 JSON 스냅샷으로 저장되고, 인덱스는 시작 시 재구성됩니다.

pub mod cli;
pub mod collector;
pub mod config;
pub mod error;
pub mod knowledge;

// Re-exports
pub use config::{get_data_dir, KnowledgeConfig};
pub use error::{KnowledgeError, KnowledgeResult};
pub use knowledge::{
    distinct_tokens, sample_documents, seed_samples, tokenize, AddedDocument, Document,
    DocumentId, DocumentList, DocumentSummary, IdfWeighting, InvertedIndex, KnowledgeStore,
    MetadataUpdate, NewDocument, QueryEngine, Scorer, SearchHit, SearchResponse, SnapshotFile,
    StoreStats,
};
