//! 파일 수집 모듈
//!
//! 로컬 텍스트 파일 및 폴더를 지식베이스 문서로 업로드합니다.
//! .gitignore 패턴을 존중하고, 지원하는 확장자만 수집합니다.
//! 문서 제목은 파일 이름, 카테고리 기본값은 "uploaded" 입니다.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ignore::WalkBuilder;
use serde::Serialize;

use crate::knowledge::{DocumentId, KnowledgeStore, NewDocument};

/// 업로드 문서 기본 카테고리
pub const UPLOAD_CATEGORY: &str = "uploaded";

/// 수집 대상 텍스트 확장자
const TEXT_EXTENSIONS: &[&str] = &["md", "markdown", "txt", "text", "rst", "csv", "html", "htm"];

// ============================================================================
// Collected File
// ============================================================================

/// 수집된 파일 정보
#[derive(Debug, Clone)]
pub struct CollectedFile {
    /// 파일 절대 경로
    pub path: PathBuf,
    /// 파일 크기 (바이트)
    pub size: u64,
}

impl CollectedFile {
    /// 파일에서 CollectedFile 생성 (지원하지 않는 확장자는 None)
    pub fn from_path(path: PathBuf) -> Result<Option<Self>> {
        if !is_text_file(&path) {
            return Ok(None);
        }

        let metadata = std::fs::metadata(&path)
            .with_context(|| format!("Failed to read metadata: {:?}", path))?;

        if !metadata.is_file() {
            return Ok(None);
        }

        Ok(Some(Self {
            path,
            size: metadata.len(),
        }))
    }

    /// 문서 제목 (파일 이름)
    pub fn title(&self) -> String {
        self.path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("Uploaded Document")
            .to_string()
    }

    /// UTF-8 텍스트로 읽어 새 문서 생성
    pub async fn read_document(&self, category: &str) -> Result<NewDocument> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read text file: {:?}", self.path))?;

        Ok(NewDocument {
            title: self.title(),
            content,
            category: Some(category.to_string()),
            tags: vec![],
        })
    }
}

/// 확장자로 텍스트 파일 여부 판단
pub fn is_text_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| TEXT_EXTENSIONS.iter().any(|t| t.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

// ============================================================================
// File Collector
// ============================================================================

/// 파일 수집기 설정
#[derive(Debug, Clone)]
pub struct CollectorConfig {
    /// .gitignore 패턴 존중 여부
    pub respect_gitignore: bool,
    /// 숨김 파일 포함 여부
    pub include_hidden: bool,
    /// 최대 파일 크기 (바이트, 0이면 제한 없음)
    pub max_file_size: u64,
}

impl Default for CollectorConfig {
    fn default() -> Self {
        Self {
            respect_gitignore: true,
            include_hidden: false,
            max_file_size: 10 * 1024 * 1024, // 10MB
        }
    }
}

/// 파일 수집기
pub struct FileCollector {
    config: CollectorConfig,
}

impl FileCollector {
    pub fn new(config: CollectorConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(CollectorConfig::default())
    }

    /// 단일 파일 수집
    pub fn collect_file(&self, path: &Path) -> Result<Option<CollectedFile>> {
        let abs_path = absolute(path)?;

        if !abs_path.is_file() {
            anyhow::bail!("File not found: {:?}", abs_path);
        }

        Ok(CollectedFile::from_path(abs_path)?.filter(|f| self.should_include(f)))
    }

    /// 폴더 재귀 수집
    pub fn collect_directory(&self, path: &Path) -> Result<Vec<CollectedFile>> {
        let abs_path = absolute(path)?;

        if !abs_path.is_dir() {
            anyhow::bail!("Directory not found: {:?}", abs_path);
        }

        let mut files = Vec::new();

        let walker = WalkBuilder::new(&abs_path)
            .hidden(!self.config.include_hidden)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore)
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!("Failed to read entry: {}", e);
                    continue;
                }
            };

            if !entry.file_type().map(|ft| ft.is_file()).unwrap_or(false) {
                continue;
            }

            match CollectedFile::from_path(entry.path().to_path_buf()) {
                Ok(Some(file)) if self.should_include(&file) => files.push(file),
                Ok(_) => {}
                Err(e) => tracing::warn!("Failed to collect file: {}", e),
            }
        }

        // 결정적 업로드 순서
        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::info!("Collected {} files from {:?}", files.len(), abs_path);
        Ok(files)
    }

    fn should_include(&self, file: &CollectedFile) -> bool {
        if self.config.max_file_size > 0 && file.size > self.config.max_file_size {
            tracing::debug!("Skipping large file: {:?} ({} bytes)", file.path, file.size);
            return false;
        }
        true
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

// ============================================================================
// Ingestion
// ============================================================================

/// 업로드 결과
#[derive(Debug, Default, Serialize)]
pub struct IngestReport {
    pub added: Vec<(DocumentId, PathBuf)>,
    /// 빈 파일
    pub skipped: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, String)>,
}

/// 수집된 파일들을 저장소에 추가
///
/// 파일별 실패는 보고서에 기록하고 계속 진행합니다.
pub async fn ingest_files(
    store: &KnowledgeStore,
    files: &[CollectedFile],
    category: &str,
) -> IngestReport {
    let mut report = IngestReport::default();

    for file in files {
        let doc = match file.read_document(category).await {
            Ok(doc) => doc,
            Err(e) => {
                tracing::warn!("{:#}", e);
                report.failed.push((file.path.clone(), format!("{:#}", e)));
                continue;
            }
        };

        if doc.content.trim().is_empty() {
            tracing::debug!("Skipping empty file: {:?}", file.path);
            report.skipped.push(file.path.clone());
            continue;
        }

        match store.add_document(doc) {
            Ok(added) => report.added.push((added.document_id, file.path.clone())),
            Err(e) => report.failed.push((file.path.clone(), e.to_string())),
        }
    }

    report
}

// ============================================================================
// Tests
// ============================================================================
