//! Tests for `JsonFileStore` against scratch directories.

use chrono::NaiveDate;
use prospect_core::{
  merge::{MergeStats, merge_company_record},
  record::{CompanyRecord, DataType, NewsItem},
  store::ContentStore,
};
use serde_json::{Value, json};
use tempfile::TempDir;

use crate::{INTERVIEWS_FILE, JsonFileStore, NEWS_FILE};

const ACME: &str = "Acme Co";

fn store() -> (TempDir, JsonFileStore) {
  let dir = tempfile::tempdir().expect("temp dir");
  let store = JsonFileStore::in_dir(dir.path());
  (dir, store)
}

fn today() -> NaiveDate { NaiveDate::from_ymd_opt(2024, 6, 15).unwrap() }

fn incoming(urls: &[(&str, &str)]) -> CompanyRecord {
  CompanyRecord {
    company_name: Some(ACME.into()),
    news_items:   Some(
      urls
        .iter()
        .map(|(url, date)| NewsItem {
          url:            Some((*url).into()),
          published_date: Some((*date).into()),
          ..Default::default()
        })
        .collect(),
    ),
    ..Default::default()
  }
}

async fn merge_news(
  store: &JsonFileStore,
  company: &str,
  run: CompanyRecord,
) -> MergeStats {
  store
    .update_record(DataType::News, company, move |existing| {
      let out =
        merge_company_record(existing.as_ref(), &run, DataType::News, company, today());
      (out.record, out.stats)
    })
    .await
    .unwrap()
}

fn read_json(path: &std::path::Path) -> Value {
  serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap()
}

// ─── Loading ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn missing_file_loads_empty() {
  let (_dir, s) = store();
  let doc = s.load(DataType::News).await.unwrap();
  assert!(doc.is_empty());
}

#[tokio::test]
async fn malformed_file_loads_empty() {
  let (dir, s) = store();
  std::fs::write(dir.path().join(NEWS_FILE), "{ this is not json").unwrap();
  let doc = s.load(DataType::News).await.unwrap();
  assert!(doc.is_empty());
}

// ─── Updates ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_update_creates_pretty_file() {
  let (dir, s) = store();
  let stats = merge_news(&s, ACME, incoming(&[("u1", "2024-05-01")])).await;
  assert_eq!(stats, MergeStats {
    new_items_count:      1,
    existing_items_count: 0,
    total_items_count:    1,
  });

  let text = std::fs::read_to_string(dir.path().join(NEWS_FILE)).unwrap();
  assert!(text.starts_with("{\n  \"Acme Co\": {"), "{text}");
  // Only the targeted store is touched.
  assert!(!dir.path().join(INTERVIEWS_FILE).exists());
}

#[tokio::test]
async fn malformed_store_behaves_as_first_refresh() {
  let (dir, s) = store();
  let path = dir.path().join(NEWS_FILE);
  std::fs::write(&path, "[1, 2, 3]").unwrap();

  let stats = merge_news(&s, ACME, incoming(&[("u1", "2024-05-01")])).await;
  assert_eq!(stats.existing_items_count, 0);
  assert_eq!(stats.new_items_count, 1);

  let written = read_json(&path);
  assert_eq!(written[ACME]["news_items"][0]["url"], json!("u1"));
}

#[tokio::test]
async fn other_companies_are_untouched() {
  let (dir, s) = store();
  let path = dir.path().join(NEWS_FILE);
  let beta = json!({
    "company_name": "Beta",
    "news_items": [{ "url": "b1", "published_date": "2023-01-01" }],
    "overall_assessment": { "presti_fit_score": 4 },
    "owner_notes": "hand-edited"
  });
  std::fs::write(&path, json!({ "Beta": beta }).to_string()).unwrap();

  merge_news(&s, ACME, incoming(&[("u1", "2024-05-01")])).await;

  let written = read_json(&path);
  assert_eq!(written["Beta"], beta);
  let doc = s.load(DataType::News).await.unwrap();
  let order: Vec<&str> = doc.companies().collect();
  assert_eq!(order, ["Beta", ACME]);
}

#[tokio::test]
async fn repeated_refresh_is_idempotent() {
  let (dir, s) = store();
  let run = incoming(&[("u1", "2024-05-01"), ("u2", "2024-06-01")]);

  merge_news(&s, ACME, run.clone()).await;
  let first = read_json(&dir.path().join(NEWS_FILE));
  let stats = merge_news(&s, ACME, run).await;
  let second = read_json(&dir.path().join(NEWS_FILE));

  assert_eq!(first, second);
  assert_eq!(stats.new_items_count, 0);
  assert_eq!(stats.existing_items_count, 2);
}

#[tokio::test]
async fn failed_update_leaves_file_alone() {
  let (dir, s) = store();
  let path = dir.path().join(NEWS_FILE);
  let original = json!({ "Acme Co": { "news_items": "corrupt" } }).to_string();
  std::fs::write(&path, &original).unwrap();

  let result = s
    .update_record(DataType::News, ACME, |_| (CompanyRecord::default(), ()))
    .await;
  assert!(result.is_err());
  assert_eq!(std::fs::read_to_string(&path).unwrap(), original);
}

#[tokio::test]
async fn concurrent_updates_lose_nothing() {
  let (dir, s) = store();

  let mut tasks = Vec::new();
  for n in 0..16 {
    let s = s.clone();
    tasks.push(tokio::spawn(async move {
      let company = format!("Company {}", n % 4);
      let url = format!("https://news.test/{n}");
      let run = CompanyRecord {
        news_items: Some(vec![NewsItem {
          url:            Some(url),
          published_date: Some("2024-05-01".into()),
          ..Default::default()
        }]),
        ..Default::default()
      };
      let key = company.clone();
      s.update_record(DataType::News, &company, move |existing| {
        let out =
          merge_company_record(existing.as_ref(), &run, DataType::News, &key, today());
        (out.record, ())
      })
      .await
      .unwrap();
    }));
  }
  for t in tasks {
    t.await.unwrap();
  }

  let written = read_json(&dir.path().join(NEWS_FILE));
  let map = written.as_object().unwrap();
  assert_eq!(map.len(), 4);
  let total: usize = map
    .values()
    .map(|r| r["news_items"].as_array().unwrap().len())
    .sum();
  assert_eq!(total, 16);
}

#[tokio::test]
async fn stores_are_independent_files() {
  let (dir, s) = store();
  assert_eq!(s.path(DataType::News), dir.path().join(NEWS_FILE));
  assert_eq!(s.path(DataType::Interviews), dir.path().join(INTERVIEWS_FILE));

  merge_news(&s, ACME, incoming(&[("u1", "2024-05-01")])).await;
  assert!(s.load(DataType::Interviews).await.unwrap().is_empty());
}
