//! 설정 - 데이터 디렉토리, 스냅샷 파일, 검색 기본값
//!
//! 환경변수:
//! - `IVR_KB_PATH`: 데이터 디렉토리
//! - `RETRIEVAL_TOP_K`: 기본 검색 결과 수
//! - `RETRIEVAL_IDF`: `smoothed` | `classic`

use std::path::{Path, PathBuf};

use crate::knowledge::{IdfWeighting, PREVIEW_CHARS};

pub const ENV_DATA_DIR: &str = "IVR_KB_PATH";
pub const ENV_TOP_K: &str = "RETRIEVAL_TOP_K";
pub const ENV_IDF: &str = "RETRIEVAL_IDF";

/// 기본 스냅샷 파일 이름
pub const SNAPSHOT_FILE: &str = "documents.json";

/// 데이터 디렉토리 경로 (`dirs::data_local_dir()`/.ivr-knowledge, 예: ~/.local/share/.ivr-knowledge)
///
/// 로컬 데이터 디렉토리가 없으면 홈 디렉토리, 그것도 없으면 현재 디렉토리 아래에 둡니다.
pub fn get_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ivr-knowledge")
}

/// 지식 저장소 설정
#[derive(Debug, Clone)]
pub struct KnowledgeConfig {
    pub data_dir: PathBuf,
    pub snapshot_file: String,
    /// 검색 기본 결과 수
    pub default_top_k: usize,
    /// 검색 결과 수 상한 (CLI 입력 검증용)
    pub max_top_k: usize,
    pub preview_chars: usize,
    pub idf: IdfWeighting,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        Self {
            data_dir: get_data_dir(),
            snapshot_file: SNAPSHOT_FILE.to_string(),
            default_top_k: 3,
            max_top_k: 10,
            preview_chars: PREVIEW_CHARS,
            idf: IdfWeighting::default(),
        }
    }
}

impl KnowledgeConfig {
    /// 지정된 데이터 디렉토리로 생성
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }

    /// 환경변수에서 설정 로드
    ///
    /// 잘못된 값은 경고 후 기본값을 사용합니다.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(dir) = lookup(ENV_DATA_DIR).filter(|d| !d.trim().is_empty()) {
            config.data_dir = PathBuf::from(dir);
        }

        if let Some(raw) = lookup(ENV_TOP_K) {
            match raw.trim().parse::<usize>() {
                Ok(k) if k >= 1 => config.default_top_k = k.min(config.max_top_k),
                _ => tracing::warn!("Invalid {}={:?}, using {}", ENV_TOP_K, raw, config.default_top_k),
            }
        }

        if let Some(raw) = lookup(ENV_IDF) {
            match raw.parse::<IdfWeighting>() {
                Ok(idf) => config.idf = idf,
                Err(e) => tracing::warn!("{}, using {:?}", e, config.idf),
            }
        }

        config
    }

    /// 스냅샷 파일 경로
    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(&self.snapshot_file)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// 요청된 결과 수를 1..=max_top_k 범위로 제한 (없으면 기본값)
    pub fn resolve_top_k(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.default_top_k)
            .clamp(1, self.max_top_k.max(1))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = KnowledgeConfig::default();
        assert_eq!(config.default_top_k, 3);
        assert_eq!(config.max_top_k, 10);
        assert_eq!(config.preview_chars, 200);
        assert_eq!(config.idf, IdfWeighting::Smoothed);
        assert!(config.snapshot_path().ends_with("documents.json"));
    }

    #[test]
    fn test_from_env_overrides() {
        let config = KnowledgeConfig::from_lookup(lookup(&[
            (ENV_DATA_DIR, "/tmp/kb"),
            (ENV_TOP_K, "5"),
            (ENV_IDF, "classic"),
        ]));
        assert_eq!(config.data_dir, PathBuf::from("/tmp/kb"));
        assert_eq!(config.snapshot_path(), PathBuf::from("/tmp/kb/documents.json"));
        assert_eq!(config.default_top_k, 5);
        assert_eq!(config.idf, IdfWeighting::Classic);
    }

    #[test]
    fn test_from_env_invalid_values() {
        let config = KnowledgeConfig::from_lookup(lookup(&[
            (ENV_TOP_K, "zero"),
            (ENV_IDF, "bm25"),
        ]));
        assert_eq!(config.default_top_k, 3);
        assert_eq!(config.idf, IdfWeighting::Smoothed);

        let config = KnowledgeConfig::from_lookup(lookup(&[(ENV_TOP_K, "0")]));
        assert_eq!(config.default_top_k, 3);
    }

    #[test]
    fn test_data_dir_under_local_data_dir() {
        let dir = get_data_dir();
        assert!(dir.ends_with(".ivr-knowledge"));
        if let Some(local) = dirs::data_local_dir() {
            assert_eq!(dir, local.join(".ivr-knowledge"));
        }
    }

    #[test]
    fn test_resolve_top_k() {
        let config = KnowledgeConfig::with_data_dir("/tmp/kb");
        assert_eq!(config.resolve_top_k(None), 3);
        assert_eq!(config.resolve_top_k(Some(0)), 1);
        assert_eq!(config.resolve_top_k(Some(7)), 7);
        assert_eq!(config.resolve_top_k(Some(50)), 10);
    }
}
