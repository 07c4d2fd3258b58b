//! Snapshot Persistence - 문서 맵 전체를 JSON 파일 하나로 저장
//!
//! 저장 형식: `{ "<id>": { id, title, content, metadata: { title, category, created_at, tags } } }`
//!
//! 인덱스는 저장하지 않습니다. 로드 후 항상 문서에서 재구성합니다.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::document::{Document, DocumentId};
use crate::error::{KnowledgeError, KnowledgeResult};

// ============================================================================
// On-disk Record
// ============================================================================

/// 저장 레코드
#[derive(Debug, Clone, Serialize, Deserialize)]
struct DocumentRecord {
    id: DocumentId,
    title: String,
    content: String,
    metadata: RecordMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct RecordMetadata {
    title: String,
    category: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    tags: Vec<String>,
}

/// 오프셋 없는 시각 형식 (UTC로 간주)
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// RFC 3339 우선, 실패하면 오프셋 없는 ISO 8601을 UTC로 해석
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(raw.trim())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {:?}", raw)))
}

impl From<&Document> for DocumentRecord {
    fn from(doc: &Document) -> Self {
        Self {
            id: doc.id,
            title: doc.title.clone(),
            content: doc.content.clone(),
            metadata: RecordMetadata {
                title: doc.title.clone(),
                category: doc.category.clone(),
                created_at: doc.created_at,
                tags: doc.tags.clone(),
            },
        }
    }
}

impl From<DocumentRecord> for Document {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id,
            title: record.title,
            content: record.content,
            category: record.metadata.category,
            tags: record.metadata.tags,
            created_at: record.metadata.created_at,
        }
    }
}

// ============================================================================
// SnapshotFile
// ============================================================================

/// 스냅샷 파일 게이트웨이
#[derive(Debug, Clone)]
pub struct SnapshotFile {
    path: PathBuf,
}

impl SnapshotFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// 스냅샷 로드 (파일이 없으면 빈 맵)
    pub fn load(&self) -> KnowledgeResult<HashMap<DocumentId, Document>> {
        if !self.exists() {
            return Ok(HashMap::new());
        }

        let raw = fs::read_to_string(&self.path).map_err(|source| KnowledgeError::Io {
            path: self.path.clone(),
            source,
        })?;

        let records: HashMap<String, DocumentRecord> =
            serde_json::from_str(&raw).map_err(|source| KnowledgeError::Format {
                path: self.path.clone(),
                source,
            })?;

        let mut documents = HashMap::with_capacity(records.len());
        for (key, record) in records {
            if key != record.id.to_string() {
                tracing::warn!("Snapshot key {} does not match record id {}", key, record.id);
            }
            let doc = Document::from(record);
            documents.insert(doc.id, doc);
        }

        Ok(documents)
    }

    /// 문서 맵 전체를 저장 (이전 스냅샷 교체)
    ///
    /// 같은 디렉토리의 임시 파일에 쓴 뒤 rename 합니다.
    pub fn save(&self, documents: &HashMap<DocumentId, Document>) -> KnowledgeResult<()> {
        let io_err = |source: std::io::Error| KnowledgeError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(io_err)?;
            }
        }

        // 키 순서 고정 (diff 가능한 출력)
        let records: BTreeMap<String, DocumentRecord> = documents
            .values()
            .map(|doc| (doc.id.to_string(), DocumentRecord::from(doc)))
            .collect();

        let json = serde_json::to_vec_pretty(&records).map_err(|source| KnowledgeError::Format {
            path: self.path.clone(),
            source,
        })?;

        let tmp_path = self.tmp_path();
        {
            let mut file = fs::File::create(&tmp_path).map_err(io_err)?;
            file.write_all(&json).map_err(io_err)?;
            file.flush().map_err(io_err)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(io_err)?;

        tracing::debug!("Saved {} documents to {:?}", documents.len(), self.path);
        Ok(())
    }

    /// 읽을 수 없는 스냅샷을 `<file>.corrupt`로 옮겨 다음 저장이 덮어쓰지 않게 함
    pub fn quarantine(&self) -> KnowledgeResult<PathBuf> {
        let target = self.sibling_path(".corrupt");
        fs::rename(&self.path, &target).map_err(|source| KnowledgeError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(target)
    }

    fn tmp_path(&self) -> PathBuf {
        self.sibling_path(".tmp")
    }

    fn sibling_path(&self, suffix: &str) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "snapshot".into());
        name.push(suffix);
        self.path.with_file_name(name)
    }
}

// ============================================================================
// Tests
// ============================================================================
