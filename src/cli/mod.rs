//! CLI 모듈
//!
//! ivr-kb CLI 명령어 정의 및 구현

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use crate::collector::{
    ingest_files, CollectorConfig, FileCollector, IngestReport, UPLOAD_CATEGORY,
};
use crate::config::KnowledgeConfig;
use crate::knowledge::{
    seed_samples, DocumentId, IdfWeighting, KnowledgeStore, MetadataUpdate, NewDocument,
    SearchResponse, StoreStats,
};

// ============================================================================
// CLI Definition
// ============================================================================

#[derive(Parser)]
#[command(name = "ivr-kb")]
#[command(version, about = "상담 응답 근거용 지식베이스", long_about = None)]
pub struct Cli {
    /// 데이터 디렉토리 (기본: $IVR_KB_PATH 또는 <로컬 데이터 디렉토리>/.ivr-knowledge)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// JSON으로 출력
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 문서 추가
    Add {
        #[arg(short, long)]
        title: String,

        #[arg(short, long)]
        content: String,

        /// 카테고리 (기본: general)
        #[arg(long)]
        category: Option<String>,

        /// 태그 (여러 번 지정 가능)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// 문서 조회
    Get {
        id: DocumentId,
    },

    /// 문서 내용 교체 및 메타데이터 병합
    Update {
        id: DocumentId,

        #[arg(short, long)]
        content: String,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(long)]
        category: Option<String>,

        /// 태그 교체 (지정 시 기존 태그 대체)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },

    /// 문서 삭제
    Delete {
        id: DocumentId,
    },

    /// 저장된 문서 목록
    List,

    /// 지식베이스 검색
    Search {
        query: String,

        /// 결과 개수 (1..=max, 기본: $RETRIEVAL_TOP_K 또는 3)
        #[arg(short = 'k', long)]
        top_k: Option<usize>,
    },

    /// 파일 또는 폴더를 문서로 업로드
    Ingest {
        #[arg(long)]
        file: Option<PathBuf>,

        /// 폴더 경로 (재귀)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        #[arg(long, default_value = UPLOAD_CATEGORY)]
        category: String,

        /// 숨김 파일 포함
        #[arg(long)]
        include_hidden: bool,
    },

    /// 샘플 문서 적재
    Seed {
        /// 문서가 있어도 추가
        #[arg(long)]
        force: bool,
    },

    /// 상태 확인
    Status,
}

// ============================================================================
// CLI Runner
// ============================================================================

/// CLI 명령어 실행
pub async fn run(cli: Cli) -> Result<()> {
    let config = match cli.data_dir {
        Some(ref dir) => KnowledgeConfig {
            data_dir: dir.clone(),
            ..KnowledgeConfig::from_env()
        },
        None => KnowledgeConfig::from_env(),
    };
    let store = KnowledgeStore::open(config);
    let json = cli.json;

    match cli.command {
        Commands::Add {
            title,
            content,
            category,
            tags,
        } => cmd_add(&store, json, title, content, category, tags),
        Commands::Get { id } => cmd_get(&store, json, &id),
        Commands::Update {
            id,
            content,
            title,
            category,
            tags,
        } => cmd_update(&store, json, &id, content, title, category, tags),
        Commands::Delete { id } => cmd_delete(&store, json, &id),
        Commands::List => cmd_list(&store, json),
        Commands::Search { query, top_k } => cmd_search(&store, json, &query, top_k),
        Commands::Ingest {
            file,
            dir,
            category,
            include_hidden,
        } => cmd_ingest(&store, json, file, dir, &category, include_hidden).await,
        Commands::Seed { force } => cmd_seed(&store, json, force),
        Commands::Status => cmd_status(&store, json),
    }
}

// ============================================================================
// JSON Outputs
// ============================================================================

/// update/delete 결과
#[derive(Debug, Serialize)]
struct MutationOutput {
    document_id: DocumentId,
    action: &'static str,
}

/// seed 결과
#[derive(Debug, Serialize)]
struct SeedOutput {
    added: usize,
    total: usize,
}

/// status 결과
#[derive(Debug, Serialize)]
struct StatusOutput {
    data_dir: PathBuf,
    #[serde(flatten)]
    stats: StoreStats,
    idf: IdfWeighting,
    index_consistent: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    index_error: Option<String>,
}

impl StatusOutput {
    fn collect(store: &KnowledgeStore) -> Result<Self> {
        let stats = store.stats().context("통계 조회 실패")?;
        let consistency = store.verify_index();

        Ok(Self {
            data_dir: store.config().data_dir().to_path_buf(),
            stats,
            idf: store.config().idf,
            index_consistent: consistency.is_ok(),
            index_error: consistency.err().map(|e| e.to_string()),
        })
    }
}

// ============================================================================
// Command Implementations
// ============================================================================

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 문서 추가 명령어 (add)
fn cmd_add(
    store: &KnowledgeStore,
    json: bool,
    title: String,
    content: String,
    category: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let added = store
        .add_document(NewDocument {
            title,
            content,
            category,
            tags,
        })
        .context("문서 추가 실패")?;

    if json {
        return print_json(&added);
    }

    println!("[OK] {}", added.message);
    println!("     ID: {}", added.document_id);
    println!("     카테고리: {}", added.category);
    Ok(())
}

/// 문서 조회 명령어 (get)
fn cmd_get(store: &KnowledgeStore, json: bool, id: &DocumentId) -> Result<()> {
    let Some(doc) = store.get_document(id) else {
        bail!("ID {}인 문서를 찾을 수 없습니다", id);
    };

    if json {
        return print_json(&doc);
    }

    println!("{}", doc.title);
    println!("  ID: {}", doc.id);
    println!("  카테고리: {}", doc.category);
    if !doc.tags.is_empty() {
        println!("  태그: {}", doc.tags.join(", "));
    }
    println!("  생성: {}", doc.created_at.format("%Y-%m-%d %H:%M"));
    println!();
    println!("{}", doc.content);
    Ok(())
}

/// 문서 업데이트 명령어 (update)
fn cmd_update(
    store: &KnowledgeStore,
    json: bool,
    id: &DocumentId,
    content: String,
    title: Option<String>,
    category: Option<String>,
    tags: Vec<String>,
) -> Result<()> {
    let update = MetadataUpdate {
        title,
        category,
        tags: (!tags.is_empty()).then_some(tags),
    };
    let metadata = (!update.is_empty()).then_some(update);

    if !store.update_document(id, content, metadata) {
        bail!("ID {}인 문서를 찾을 수 없습니다", id);
    }

    if json {
        return print_json(&MutationOutput {
            document_id: *id,
            action: "updated",
        });
    }

    println!("[OK] 문서 {} 업데이트됨", id);
    Ok(())
}

/// 삭제 명령어 (delete)
fn cmd_delete(store: &KnowledgeStore, json: bool, id: &DocumentId) -> Result<()> {
    if !store.delete_document(id) {
        bail!("ID {}인 문서를 찾을 수 없습니다", id);
    }

    if json {
        return print_json(&MutationOutput {
            document_id: *id,
            action: "deleted",
        });
    }

    println!("[OK] 문서 {} 삭제됨", id);
    Ok(())
}

/// 목록 명령어 (list)
fn cmd_list(store: &KnowledgeStore, json: bool) -> Result<()> {
    let list = store.list_documents();

    if json {
        return print_json(&list);
    }

    if list.documents.is_empty() {
        println!("[!] 저장된 문서가 없습니다.");
        return Ok(());
    }

    println!(
        "[OK] 저장된 문서 ({} 건, 카테고리: {}):\n",
        list.total,
        list.categories.join(", ")
    );

    for doc in &list.documents {
        println!("  [{}] {}", doc.category, truncate_text(&doc.title, 60));
        println!("        ID: {}", doc.document_id);
        println!("        {}", doc.created_at.format("%Y-%m-%d %H:%M"));
        println!("        {}", truncate_text(&doc.preview, 120));
        println!();
    }

    Ok(())
}

/// 검색 명령어 (search)
fn cmd_search(
    store: &KnowledgeStore,
    json: bool,
    query: &str,
    top_k: Option<usize>,
) -> Result<()> {
    let response = search(store, query, top_k)?;

    if json {
        return print_json(&response);
    }

    if response.results.is_empty() {
        println!("[!] 검색 결과가 없습니다.");
        return Ok(());
    }

    println!("[OK] 검색 결과 ({} 건):\n", response.total_results);

    for (i, hit) in response.results.iter().enumerate() {
        println!(
            "{}. [점수: {:.4}] [{}] {}",
            i + 1,
            hit.relevance_score,
            hit.category,
            hit.title
        );
        println!("   ID: {}", hit.document_id);
        println!("   내용: {}", truncate_text(&hit.content, 200));
        println!();
    }

    Ok(())
}

/// top-k 검증 후 검색 (토큰 없는 검색어는 빈 결과)
fn search(store: &KnowledgeStore, query: &str, top_k: Option<usize>) -> Result<SearchResponse> {
    let config = store.config();
    if let Some(k) = top_k {
        if k == 0 || k > config.max_top_k {
            bail!("top-k는 1 이상 {} 이하여야 합니다", config.max_top_k);
        }
    }

    Ok(store.search(query, config.resolve_top_k(top_k)))
}

/// 파일/폴더 업로드 명령어 (ingest)
async fn cmd_ingest(
    store: &KnowledgeStore,
    json: bool,
    file: Option<PathBuf>,
    dir: Option<PathBuf>,
    category: &str,
    include_hidden: bool,
) -> Result<()> {
    let collector = FileCollector::new(CollectorConfig {
        include_hidden,
        ..Default::default()
    });

    let files = if let Some(ref file_path) = file {
        match collector.collect_file(file_path)? {
            Some(f) => vec![f],
            None if json => return print_json(&IngestReport::default()),
            None => {
                println!("[!] 지원하지 않는 파일 형식: {:?}", file_path);
                return Ok(());
            }
        }
    } else if let Some(ref dir_path) = dir {
        collector.collect_directory(dir_path)?
    } else {
        bail!("--file 또는 --dir를 지정해야 합니다");
    };

    if files.is_empty() {
        if json {
            return print_json(&IngestReport::default());
        }
        println!("[!] 수집할 파일이 없습니다.");
        return Ok(());
    }

    if json {
        return print_json(&ingest_files(store, &files, category).await);
    }

    let total_size: u64 = files.iter().map(|f| f.size).sum();
    println!(
        "[*] 수집 대상: {} 파일 ({})",
        files.len(),
        format_bytes(total_size as usize)
    );

    let report = ingest_files(store, &files, category).await;

    for (id, path) in &report.added {
        println!("  [OK] {} ({})", path.display(), id);
    }
    for path in &report.skipped {
        println!("  [-] 빈 파일: {}", path.display());
    }
    for (path, err) in &report.failed {
        println!("  [!] {}: {}", path.display(), err);
    }

    println!();
    println!(
        "[OK] 완료: 성공 {}, 건너뜀 {}, 실패 {}",
        report.added.len(),
        report.skipped.len(),
        report.failed.len()
    );

    Ok(())
}

/// 샘플 적재 명령어 (seed)
fn cmd_seed(store: &KnowledgeStore, json: bool, force: bool) -> Result<()> {
    let added = seed_samples(store, force).context("샘플 문서 적재 실패")?;

    if json {
        return print_json(&SeedOutput {
            added,
            total: store.len(),
        });
    }

    if added == 0 {
        println!("[!] 이미 문서가 있습니다 ({} 건). --force로 추가할 수 있습니다.", store.len());
    } else {
        println!("[OK] 샘플 문서 {} 건 추가됨", added);
    }
    Ok(())
}

/// 상태 명령어 (status)
fn cmd_status(store: &KnowledgeStore, json: bool) -> Result<()> {
    let status = StatusOutput::collect(store)?;

    if json {
        return print_json(&status);
    }

    let stats = &status.stats;
    println!("ivr-kb v{}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("[*] 데이터 디렉토리: {}", status.data_dir.display());
    println!("[*] 스냅샷: {}", stats.snapshot_path.display());
    println!("[OK] 저장된 문서: {} 건", stats.document_count);
    println!("     총 콘텐츠: {}", format_bytes(stats.total_content_bytes));
    println!("     고유 토큰: {} 개", stats.token_count);
    if !stats.categories.is_empty() {
        println!("     카테고리: {}", stats.categories.join(", "));
    }
    println!("     IDF: {:?}", status.idf);

    match status.index_error {
        None => println!("[OK] 인덱스 일관성 확인"),
        Some(ref e) => println!("[!] 인덱스 불일치: {}", e),
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

/// 텍스트 자르기 (UTF-8 안전)
fn truncate_text(text: &str, max_chars: usize) -> String {
    let cleaned = text.replace('\n', " ").replace('\r', "");
    let cleaned = cleaned.trim();

    if cleaned.chars().count() <= max_chars {
        cleaned.to_string()
    } else {
        let truncated: String = cleaned.chars().take(max_chars).collect();
        format!("{}...", truncated)
    }
}

/// 바이트 크기 포맷팅
fn format_bytes(bytes: usize) -> String {
    const KB: usize = 1024;
    const MB: usize = KB * 1024;

    if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::parse_from(["ivr-kb", "--json", "search", "refund policy", "-k", "5"]);
        assert!(cli.json);
        match cli.command {
            Commands::Search { query, top_k } => {
                assert_eq!(query, "refund policy");
                assert_eq!(top_k, Some(5));
            }
            _ => panic!("expected search"),
        }
    }

    #[test]
    fn test_parse_add_with_tags() {
        let cli = Cli::parse_from([
            "ivr-kb", "add", "-t", "Billing FAQ", "-c", "refund policy", "--tag", "faq", "--tag",
            "billing",
        ]);
        match cli.command {
            Commands::Add { title, tags, category, .. } => {
                assert_eq!(title, "Billing FAQ");
                assert_eq!(tags, vec!["faq", "billing"]);
                assert!(category.is_none());
            }
            _ => panic!("expected add"),
        }
    }

    #[test]
    fn test_parse_rejects_bad_id() {
        assert!(Cli::try_parse_from(["ivr-kb", "get", "not-a-uuid"]).is_err());
    }

    fn temp_store() -> (tempfile::TempDir, KnowledgeStore) {
        let dir = tempfile::TempDir::new().unwrap();
        let store = KnowledgeStore::open_in(dir.path());
        (dir, store)
    }

    #[test]
    fn test_search_without_tokens_is_empty() {
        let (_dir, store) = temp_store();
        seed_samples(&store, false).unwrap();

        for query in ["", "   ", "?!..."] {
            let response = search(&store, query, None).unwrap();
            assert!(response.results.is_empty());
            assert_eq!(response.total_results, 0);
        }
    }

    #[test]
    fn test_search_rejects_out_of_range_top_k() {
        let (_dir, store) = temp_store();
        assert!(search(&store, "refund", Some(0)).is_err());
        assert!(search(&store, "refund", Some(11)).is_err());
        assert!(search(&store, "refund", Some(10)).is_ok());
    }

    #[test]
    fn test_status_json_reports_index_consistency() {
        let (dir, store) = temp_store();
        seed_samples(&store, false).unwrap();

        let value = serde_json::to_value(StatusOutput::collect(&store).unwrap()).unwrap();
        assert_eq!(value["index_consistent"], true);
        assert!(value.get("index_error").is_none());
        assert_eq!(value["document_count"], 5);
        assert_eq!(value["idf"], "smoothed");
        assert_eq!(value["data_dir"], dir.path().to_str().unwrap());
    }

    #[test]
    fn test_mutation_output_json() {
        let id = DocumentId::new_v4();
        let value = serde_json::to_value(MutationOutput {
            document_id: id,
            action: "deleted",
        })
        .unwrap();
        assert_eq!(value["document_id"], id.to_string());
        assert_eq!(value["action"], "deleted");
    }

    #[tokio::test]
    async fn test_run_json_for_every_mutation() {
        let dir = tempfile::TempDir::new().unwrap();
        let data_dir = dir.path().to_str().unwrap().to_string();
        let cli = |args: &[&str]| {
            let mut argv: Vec<String> = ["ivr-kb", "--json", "--data-dir", data_dir.as_str()]
                .iter()
                .map(|a| a.to_string())
                .collect();
            argv.extend(args.iter().map(|a| a.to_string()));
            Cli::parse_from(argv)
        };

        run(cli(&["seed"])).await.unwrap();
        let store = KnowledgeStore::open_in(dir.path());
        assert_eq!(store.len(), 5);

        let id = store.list_documents().documents[0].document_id.to_string();
        drop(store);

        run(cli(&["update", id.as_str(), "-c", "refund refund"])).await.unwrap();
        run(cli(&["search", "   "])).await.unwrap();
        run(cli(&["status"])).await.unwrap();
        run(cli(&["delete", id.as_str()])).await.unwrap();
        assert!(run(cli(&["delete", id.as_str()])).await.is_err());

        assert_eq!(KnowledgeStore::open_in(dir.path()).len(), 4);
    }

    #[test]
    fn test_truncate_text() {
        assert_eq!(truncate_text("hello", 10), "hello");
        assert_eq!(truncate_text("hello world", 5), "hello...");
        assert_eq!(truncate_text("hello\nworld", 20), "hello world");
    }

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(500), "500 B");
        assert_eq!(format_bytes(1024), "1.00 KB");
        assert_eq!(format_bytes(1536), "1.50 KB");
        assert_eq!(format_bytes(1048576), "1.00 MB");
    }
}
