//! 문서 모델 - 저장소가 소유하는 원본 문서와 입출력 구조체

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 문서 식별자 (UUID v4, 생성 시 한 번만 할당)
pub type DocumentId = Uuid;

/// 기본 카테고리
pub const DEFAULT_CATEGORY: &str = "general";

/// 목록 미리보기 최대 길이 (문자 수)
pub const PREVIEW_CHARS: usize = 200;

// ============================================================================
// Types
// ============================================================================

/// 저장된 문서
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: DocumentId,
    pub title: String,
    pub content: String,
    pub category: String,
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Document {
    /// 새 문서 생성 (ID, 생성 시각 할당)
    pub(crate) fn create(new: NewDocument) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: new.title.trim().to_string(),
            content: new.content,
            category: normalize_category(new.category.as_deref()),
            tags: normalize_tags(new.tags),
            created_at: Utc::now(),
        }
    }

    /// 메타데이터 병합 (지정된 필드만 교체)
    ///
    /// `id`와 `created_at`은 변경되지 않습니다.
    pub(crate) fn merge_metadata(&mut self, update: MetadataUpdate) {
        if let Some(title) = update.title {
            let title = title.trim();
            if title.is_empty() {
                tracing::warn!("Ignoring empty title update for document {}", self.id);
            } else {
                self.title = title.to_string();
            }
        }
        if let Some(category) = update.category {
            self.category = normalize_category(Some(&category));
        }
        if let Some(tags) = update.tags {
            self.tags = normalize_tags(tags);
        }
    }

    /// 생성 순서 정렬 키 (생성 시각, 동률이면 ID)
    pub fn creation_key(&self) -> (DateTime<Utc>, DocumentId) {
        (self.created_at, self.id)
    }

    /// 목록용 요약
    pub fn summary(&self, preview_chars: usize) -> DocumentSummary {
        DocumentSummary {
            document_id: self.id,
            title: self.title.clone(),
            category: self.category.clone(),
            created_at: self.created_at,
            preview: preview(&self.content, preview_chars),
        }
    }
}

/// 새 문서 입력용 구조체
#[derive(Debug, Clone, Default)]
pub struct NewDocument {
    pub title: String,
    pub content: String,
    /// 없으면 "general"
    pub category: Option<String>,
    pub tags: Vec<String>,
}

/// 문서 메타데이터 부분 업데이트
#[derive(Debug, Clone, Default)]
pub struct MetadataUpdate {
    pub title: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl MetadataUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.category.is_none() && self.tags.is_none()
    }
}

/// 문서 추가 결과
#[derive(Debug, Clone, Serialize)]
pub struct AddedDocument {
    pub document_id: DocumentId,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub message: String,
}

impl From<&Document> for AddedDocument {
    fn from(doc: &Document) -> Self {
        Self {
            document_id: doc.id,
            title: doc.title.clone(),
            category: doc.category.clone(),
            created_at: doc.created_at,
            message: format!("Document '{}' added successfully", doc.title),
        }
    }
}

/// 문서 목록 항목
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub document_id: DocumentId,
    pub title: String,
    pub category: String,
    pub created_at: DateTime<Utc>,
    pub preview: String,
}

/// 문서 목록 (전체 개수, 카테고리 포함)
#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentList {
    pub documents: Vec<DocumentSummary>,
    pub total: usize,
    pub categories: Vec<String>,
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 본문 미리보기 (UTF-8 안전, 잘리면 "..." 추가)
pub fn preview(content: &str, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &content[..byte_idx]),
        None => content.to_string(),
    }
}

fn normalize_category(category: Option<&str>) -> String {
    match category.map(str::trim) {
        Some(c) if !c.is_empty() => c.to_string(),
        _ => DEFAULT_CATEGORY.to_string(),
    }
}

/// 태그 정규화: 공백 제거, 빈 태그/중복 제거 (처음 순서 유지)
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(tags.len());
    for tag in tags {
        let tag = tag.trim();
        if !tag.is_empty() && !seen.iter().any(|t: &String| t == tag) {
            seen.push(tag.to_string());
        }
    }
    seen
}

// ============================================================================
// Tests
// ============================================================================
