//! 지식 저장소 에러 타입

use std::path::PathBuf;

use thiserror::Error;

use crate::knowledge::DocumentId;

/// 지식 저장소 에러
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// 존재하지 않는 문서 ID
    #[error("document not found: {0}")]
    NotFound(DocumentId),

    /// 잘못된 입력 (빈 제목 등)
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// 스냅샷 파일 I/O 실패
    #[error("snapshot I/O failed at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// 스냅샷 직렬화/역직렬화 실패
    #[error("snapshot format error at {path:?}: {source}")]
    Format {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// 인덱스와 문서 저장소 불일치 (프로그래밍 오류)
    #[error("index out of sync: {0}")]
    IndexDesync(String),

    #[error("store lock poisoned")]
    LockPoisoned,
}

impl KnowledgeError {
    /// 영속화 계층 실패 여부
    pub fn is_persistence(&self) -> bool {
        matches!(self, Self::Io { .. } | Self::Format { .. })
    }
}

pub type KnowledgeResult<T> = std::result::Result<T, KnowledgeError>;
