//! Knowledge Store - 문서 저장소 + 역색인 + 스냅샷을 하나의 잠금 뒤에 소유
//!
//! 저장 위치: `get_data_dir()`/documents.json (예: ~/.local/share/.ivr-knowledge/documents.json)
//!
//! - 쓰기 (add/update/delete): 쓰기 잠금 안에서 문서 변경 → 인덱스 갱신 → 스냅샷 저장
//! - 읽기 (get/list/search/stats): 읽기 잠금 공유
//!
//! 스냅샷 저장 실패는 경고만 남기고 메모리 상태는 되돌리지 않습니다.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::Serialize;

use super::document::{
    AddedDocument, Document, DocumentId, DocumentList, MetadataUpdate, NewDocument,
};
use super::index::InvertedIndex;
use super::query::{QueryEngine, SearchHit, SearchResponse};
use super::snapshot::SnapshotFile;
use crate::config::KnowledgeConfig;
use crate::error::{KnowledgeError, KnowledgeResult};

// ============================================================================
// Types
// ============================================================================

/// 저장소 통계
#[derive(Debug, Clone, Serialize)]
pub struct StoreStats {
    pub document_count: usize,
    pub token_count: usize,
    pub total_content_bytes: usize,
    pub categories: Vec<String>,
    pub snapshot_path: PathBuf,
}

/// 잠금으로 보호되는 상태
#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<DocumentId, Document>,
    index: InvertedIndex,
}

impl Inner {
    fn from_documents(documents: HashMap<DocumentId, Document>) -> Self {
        let index = InvertedIndex::build(documents.values());
        Self { documents, index }
    }
}

// ============================================================================
// KnowledgeStore
// ============================================================================

/// 지식 저장소
///
/// `Arc<KnowledgeStore>`로 여러 스레드에서 공유할 수 있습니다.
pub struct KnowledgeStore {
    inner: RwLock<Inner>,
    snapshot: SnapshotFile,
    config: KnowledgeConfig,
}

impl KnowledgeStore {
    /// 저장소 열기
    ///
    /// 스냅샷이 없거나 읽을 수 없으면 빈 저장소로 시작합니다.
    pub fn open(config: KnowledgeConfig) -> Self {
        let snapshot = SnapshotFile::new(config.snapshot_path());

        let documents = match snapshot.load() {
            Ok(documents) => {
                if snapshot.exists() {
                    tracing::info!(
                        "Loaded {} documents from {:?}",
                        documents.len(),
                        snapshot.path()
                    );
                } else {
                    tracing::info!("No snapshot at {:?}, starting empty", snapshot.path());
                }
                documents
            }
            Err(e) => {
                tracing::warn!("Could not load documents from disk: {}", e);
                if matches!(e, KnowledgeError::Format { .. }) {
                    match snapshot.quarantine() {
                        Ok(moved) => tracing::warn!("Moved unreadable snapshot to {:?}", moved),
                        Err(e) => tracing::warn!("Could not move unreadable snapshot: {}", e),
                    }
                }
                HashMap::new()
            }
        };

        let inner = Inner::from_documents(documents);
        tracing::debug!(
            "Rebuilt index: {} documents, {} tokens",
            inner.documents.len(),
            inner.index.token_count()
        );

        Self {
            inner: RwLock::new(inner),
            snapshot,
            config,
        }
    }

    /// 환경변수 설정으로 열기
    pub fn open_default() -> Self {
        Self::open(KnowledgeConfig::from_env())
    }

    /// 데이터 디렉토리로 열기
    pub fn open_in(data_dir: &Path) -> Self {
        Self::open(KnowledgeConfig::with_data_dir(data_dir))
    }

    pub fn config(&self) -> &KnowledgeConfig {
        &self.config
    }

    pub fn snapshot_path(&self) -> &Path {
        self.snapshot.path()
    }

    fn read(&self) -> KnowledgeResult<RwLockReadGuard<'_, Inner>> {
        self.inner.read().map_err(|_| KnowledgeError::LockPoisoned)
    }

    fn write(&self) -> KnowledgeResult<RwLockWriteGuard<'_, Inner>> {
        self.inner.write().map_err(|_| KnowledgeError::LockPoisoned)
    }

    /// 스냅샷 저장 (쓰기 잠금 보유 중 호출)
    fn persist(&self, inner: &Inner) {
        if let Err(e) = self.snapshot.save(&inner.documents) {
            tracing::warn!("Could not save documents to disk: {}", e);
        }
    }

    // ------------------------------------------------------------------------
    // Mutations
    // ------------------------------------------------------------------------

    /// 문서 추가
    ///
    /// 제목이 비어 있으면 `InvalidInput`을 반환합니다.
    pub fn add_document(&self, new: NewDocument) -> KnowledgeResult<AddedDocument> {
        if new.title.trim().is_empty() {
            return Err(KnowledgeError::InvalidInput(
                "title must not be empty".to_string(),
            ));
        }

        let doc = Document::create(new);
        let added = AddedDocument::from(&doc);

        let mut inner = self.write()?;
        inner.index.add(doc.id, &doc.content);
        inner.documents.insert(doc.id, doc);
        self.persist(&inner);

        tracing::info!("Added document: {} (id={})", added.title, added.document_id);
        Ok(added)
    }

    /// 문서 내용 교체 + 메타데이터 병합
    pub fn try_update_document(
        &self,
        id: &DocumentId,
        content: String,
        metadata: Option<MetadataUpdate>,
    ) -> KnowledgeResult<()> {
        let mut guard = self.write()?;
        let inner = &mut *guard;

        let doc = inner
            .documents
            .get_mut(id)
            .ok_or(KnowledgeError::NotFound(*id))?;

        inner.index.replace(*id, &doc.content, &content);
        doc.content = content;
        if let Some(update) = metadata {
            doc.merge_metadata(update);
        }

        self.persist(inner);
        tracing::info!("Updated document {}", id);
        Ok(())
    }

    /// 문서 업데이트 (없으면 false)
    pub fn update_document(
        &self,
        id: &DocumentId,
        content: impl Into<String>,
        metadata: Option<MetadataUpdate>,
    ) -> bool {
        match self.try_update_document(id, content.into(), metadata) {
            Ok(()) => true,
            Err(KnowledgeError::NotFound(_)) => false,
            Err(e) => {
                tracing::error!("Error updating document {}: {}", id, e);
                false
            }
        }
    }

    /// 문서 삭제, 삭제된 문서 반환
    pub fn try_delete_document(&self, id: &DocumentId) -> KnowledgeResult<Document> {
        let mut inner = self.write()?;

        let doc = inner
            .documents
            .remove(id)
            .ok_or(KnowledgeError::NotFound(*id))?;
        inner.index.remove(doc.id, &doc.content);

        self.persist(&inner);
        tracing::info!("Deleted document: {} (id={})", doc.title, doc.id);
        Ok(doc)
    }

    /// 문서 삭제 (없으면 false)
    pub fn delete_document(&self, id: &DocumentId) -> bool {
        match self.try_delete_document(id) {
            Ok(_) => true,
            Err(KnowledgeError::NotFound(_)) => false,
            Err(e) => {
                tracing::error!("Error deleting document {}: {}", id, e);
                false
            }
        }
    }

    // ------------------------------------------------------------------------
    // Reads
    // ------------------------------------------------------------------------

    /// ID로 문서 조회
    pub fn get_document(&self, id: &DocumentId) -> Option<Document> {
        match self.read() {
            Ok(inner) => inner.documents.get(id).cloned(),
            Err(e) => {
                tracing::error!("Error reading document {}: {}", id, e);
                None
            }
        }
    }

    /// 전체 문서 목록 (생성 순서)
    pub fn list_documents(&self) -> DocumentList {
        let inner = match self.read() {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!("Error listing documents: {}", e);
                return DocumentList::default();
            }
        };

        let mut docs: Vec<&Document> = inner.documents.values().collect();
        docs.sort_by_key(|d| d.creation_key());

        let categories: BTreeSet<&str> = docs.iter().map(|d| d.category.as_str()).collect();

        DocumentList {
            total: docs.len(),
            documents: docs
                .iter()
                .map(|d| d.summary(self.config.preview_chars))
                .collect(),
            categories: categories.into_iter().map(str::to_string).collect(),
        }
    }

    /// 관련도 순 검색
    pub fn search_documents(&self, query: &str, top_k: usize) -> Vec<SearchHit> {
        let inner = match self.read() {
            Ok(inner) => inner,
            Err(e) => {
                tracing::error!("Error searching documents: {}", e);
                return Vec::new();
            }
        };

        let engine = QueryEngine::new(&inner.documents, &inner.index, self.config.idf);
        engine.search(query, top_k)
    }

    /// 검색 응답 (질의 + 결과 + 개수)
    pub fn search(&self, query: &str, top_k: usize) -> SearchResponse {
        SearchResponse::new(query, self.search_documents(query, top_k))
    }

    /// 저장소 통계
    pub fn stats(&self) -> KnowledgeResult<StoreStats> {
        let inner = self.read()?;

        let categories: BTreeSet<&str> = inner
            .documents
            .values()
            .map(|d| d.category.as_str())
            .collect();

        Ok(StoreStats {
            document_count: inner.documents.len(),
            token_count: inner.index.token_count(),
            total_content_bytes: inner.documents.values().map(|d| d.content.len()).sum(),
            categories: categories.into_iter().map(str::to_string).collect(),
            snapshot_path: self.snapshot.path().to_path_buf(),
        })
    }

    pub fn len(&self) -> usize {
        self.read().map(|inner| inner.documents.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 인덱스에서 토큰이 문서를 가리키는지 확인
    pub fn index_contains(&self, token: &str, id: &DocumentId) -> bool {
        self.read()
            .map(|inner| inner.index.contains(token, id))
            .unwrap_or(false)
    }

    /// 인덱스 불변식 검사
    pub fn verify_index(&self) -> KnowledgeResult<()> {
        let inner = self.read()?;
        inner
            .index
            .check_consistency(&inner.documents)
            .map_err(KnowledgeError::IndexDesync)
    }
}

// ============================================================================
// Tests
// ============================================================================
