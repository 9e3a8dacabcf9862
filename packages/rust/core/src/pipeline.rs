//! Resumable enrichment run: pending → searched → scraped → completed.
//!
//! Articles are processed one after another. Each stage's output is written
//! together with the new stage in a single store update before the next
//! stage starts, so an interrupted run resumes every article where it
//! stopped. The record returned by the store decides which stage runs next.
//!
//! Errors inside an article are logged and recorded in its [`ItemReport`];
//! they never abort the run.

use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use articleflow_crawler::ReferenceFetch;
use articleflow_discovery::{REFERENCE_COUNT, ReferenceSearch};
use articleflow_shared::{Article, ArticleId, ArticleUpdate, ArticleflowError, Result, Stage};
use articleflow_storage::ArticleStore;

use crate::references::append_references;
use crate::rewrite::TextRewriter;

// ---------------------------------------------------------------------------
// Run results
// ---------------------------------------------------------------------------

/// How a single article ended up after this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemOutcome {
    /// Reached `completed` during this run.
    Completed,
    /// Already `completed`; nothing to do.
    Skipped,
    /// Discovery found fewer than two usable links; left at `pending`.
    InsufficientReferences { found: usize },
    /// Stopped by an error; resumes from `reached` on the next run.
    Interrupted { error: String },
}

impl ItemOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Skipped => "skipped",
            Self::InsufficientReferences { .. } => "insufficient references",
            Self::Interrupted { .. } => "interrupted",
        }
    }
}

/// Per-article record of a run.
#[derive(Debug, Clone)]
pub struct ItemReport {
    pub id: ArticleId,
    pub title: String,
    /// Stored stage when the run picked the article up.
    pub entered: Stage,
    /// Stored stage when the run left it.
    pub reached: Stage,
    pub outcome: ItemOutcome,
}

/// Result of [`Pipeline::run`].
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
    pub items: Vec<ItemReport>,
}

impl RunSummary {
    pub fn completed(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Completed))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Skipped))
    }

    pub fn insufficient(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::InsufficientReferences { .. }))
    }

    pub fn interrupted(&self) -> usize {
        self.count(|o| matches!(o, ItemOutcome::Interrupted { .. }))
    }

    fn count(&self, pred: impl Fn(&ItemOutcome) -> bool) -> usize {
        self.items.iter().filter(|item| pred(&item.outcome)).count()
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Progress callback for a pipeline run.
pub trait ProgressReporter: Send + Sync {
    /// Called once the article list is loaded.
    fn run_started(&self, total: usize);
    /// Called before an article is processed (`current` is 1-based).
    fn item_started(&self, article: &Article, current: usize, total: usize);
    /// Called after each persisted stage transition.
    fn stage_persisted(&self, article: &Article);
    /// Called when an article is done for this run.
    fn item_finished(&self, report: &ItemReport);
    /// Called when the run completes.
    fn done(&self, summary: &RunSummary);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn run_started(&self, _total: usize) {}
    fn item_started(&self, _article: &Article, _current: usize, _total: usize) {}
    fn stage_persisted(&self, _article: &Article) {}
    fn item_finished(&self, _report: &ItemReport) {}
    fn done(&self, _summary: &RunSummary) {}
}

// ---------------------------------------------------------------------------
// Pipeline
// ---------------------------------------------------------------------------

/// The orchestrator, wired to its store and stage workers.
pub struct Pipeline<'a> {
    store: &'a dyn ArticleStore,
    search: &'a dyn ReferenceSearch,
    fetch: &'a dyn ReferenceFetch,
    rewriter: &'a dyn TextRewriter,
    force_reprocess: bool,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        store: &'a dyn ArticleStore,
        search: &'a dyn ReferenceSearch,
        fetch: &'a dyn ReferenceFetch,
        rewriter: &'a dyn TextRewriter,
    ) -> Self {
        Self {
            store,
            search,
            fetch,
            rewriter,
            force_reprocess: false,
        }
    }

    /// Re-run every stage, completed articles included.
    pub fn force_reprocess(mut self, force: bool) -> Self {
        self.force_reprocess = force;
        self
    }

    /// Process every article in the store, in listing order.
    ///
    /// Only a failure to list articles is returned as an error.
    #[instrument(skip_all, fields(force = self.force_reprocess))]
    pub async fn run(&self, progress: &dyn ProgressReporter) -> Result<RunSummary> {
        let run_id = Uuid::now_v7();
        let started_at = Utc::now();
        let start = Instant::now();

        info!(%run_id, "fetching articles");
        let articles = self.store.list().await?;
        let total = articles.len();
        progress.run_started(total);

        let mut items = Vec::with_capacity(total);
        for (i, article) in articles.into_iter().enumerate() {
            progress.item_started(&article, i + 1, total);
            let report = self.process(article, progress).await;
            progress.item_finished(&report);
            items.push(report);
        }

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            elapsed: start.elapsed(),
            items,
        };

        info!(
            %run_id,
            total,
            completed = summary.completed(),
            skipped = summary.skipped(),
            insufficient = summary.insufficient(),
            interrupted = summary.interrupted(),
            elapsed_ms = summary.elapsed.as_millis() as u64,
            "run finished"
        );

        progress.done(&summary);
        Ok(summary)
    }

    #[instrument(skip_all, fields(article_id = %article.id, title = %article.title))]
    async fn process(&self, article: Article, progress: &dyn ProgressReporter) -> ItemReport {
        let id = article.id;
        let title = article.title.clone();
        let entered = article.stage;

        let mut current = article;
        let outcome = match self.advance(&mut current, progress).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(
                    stage = %current.stage,
                    error = %e,
                    "article interrupted, will resume on next run"
                );
                ItemOutcome::Interrupted {
                    error: e.to_string(),
                }
            }
        };

        ItemReport {
            id,
            title,
            entered,
            reached: current.stage,
            outcome,
        }
    }

    /// Walk `current` forward until it completes or a stage cannot proceed.
    ///
    /// `current` always holds the last record returned by the store.
    async fn advance(
        &self,
        current: &mut Article,
        progress: &dyn ProgressReporter,
    ) -> Result<ItemOutcome> {
        if current.stage.is_terminal() && !self.force_reprocess {
            info!("already completed, skipping");
            return Ok(ItemOutcome::Skipped);
        }

        let mut stage = if self.force_reprocess {
            Stage::Pending
        } else {
            current.stage
        };
        info!(%stage, "processing article");

        for _ in 0..Stage::ALL.len() {
            let update = match stage {
                Stage::Pending => {
                    let links = self.search.find_references(&current.title).await;
                    if links.len() < REFERENCE_COUNT {
                        warn!(found = links.len(), "not enough reference articles, leaving pending");
                        return Ok(ItemOutcome::InsufficientReferences { found: links.len() });
                    }
                    let update = ArticleUpdate::searched(links);
                    if current.is_updated || current.updated_content.is_some() {
                        update.clearing_rewrite()
                    } else {
                        update
                    }
                }
                Stage::Searched => {
                    let [first, second] = citation_pair(current)?;
                    let first = self.fetch.scrape(first).await;
                    let second = self.fetch.scrape(second).await;
                    ArticleUpdate::scraped(first, second)
                }
                Stage::Scraped => {
                    citation_pair(current)?;
                    let rewritten = self
                        .rewriter
                        .rewrite(&current.original_content, current.excerpts())
                        .await?;
                    ArticleUpdate::completed(append_references(&rewritten, &current.citation_links))
                }
                Stage::Completed => return Ok(ItemOutcome::Completed),
            };

            *current = self.persist(current.id, stage, &update).await?;
            progress.stage_persisted(current);
            stage = current.stage;
        }

        Err(ArticleflowError::validation(format!(
            "article {} did not complete within {} stages",
            current.id,
            Stage::ALL.len()
        )))
    }

    /// Write one stage transition and check the store actually advanced.
    async fn persist(&self, id: ArticleId, from: Stage, update: &ArticleUpdate) -> Result<Article> {
        let stored = self.store.update(id, update).await?;
        if Some(stored.stage) != update.stage {
            return Err(ArticleflowError::Storage(format!(
                "article {id}: store reports stage '{}' after moving from '{from}'",
                stored.stage
            )));
        }
        info!(%from, to = %stored.stage, "stage persisted");
        Ok(stored)
    }
}

/// The two citation links a searched article must carry.
fn citation_pair(article: &Article) -> Result<[&str; 2]> {
    match article.citation_links.as_slice() {
        [first, second, ..] => Ok([first.as_str(), second.as_str()]),
        links => Err(ArticleflowError::validation(format!(
            "article {} is '{}' but has {} citation link(s)",
            article.id,
            article.stage,
            links.len()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;

    // --- fakes -------------------------------------------------------------

    #[derive(Default)]
    struct MemoryStore {
        articles: Mutex<Vec<Article>>,
        writes: Mutex<Vec<(ArticleId, ArticleUpdate)>>,
        fail_list: bool,
        ignore_writes: bool,
    }

    impl MemoryStore {
        fn with(articles: Vec<Article>) -> Self {
            Self {
                articles: Mutex::new(articles),
                ..Default::default()
            }
        }

        fn get(&self, id: i64) -> Article {
            self.articles
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == ArticleId(id))
                .cloned()
                .unwrap()
        }

        fn written_stages(&self) -> Vec<Stage> {
            self.writes
                .lock()
                .unwrap()
                .iter()
                .filter_map(|(_, update)| update.stage)
                .collect()
        }
    }

    #[async_trait]
    impl ArticleStore for MemoryStore {
        async fn list(&self) -> Result<Vec<Article>> {
            if self.fail_list {
                return Err(ArticleflowError::Network("connection refused".into()));
            }
            Ok(self.articles.lock().unwrap().clone())
        }

        async fn update(&self, id: ArticleId, update: &ArticleUpdate) -> Result<Article> {
            self.writes.lock().unwrap().push((id, update.clone()));
            let mut articles = self.articles.lock().unwrap();
            let article = articles
                .iter_mut()
                .find(|a| a.id == id)
                .ok_or_else(|| ArticleflowError::Storage(format!("article {id} not found")))?;
            if !self.ignore_writes {
                update.apply_to(article);
            }
            Ok(article.clone())
        }
    }

    #[derive(Default)]
    struct FakeSearch {
        results: HashMap<String, Vec<String>>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn with(title: &str, links: &[&str]) -> Self {
            let mut search = Self::default();
            search.add(title, links);
            search
        }

        fn add(&mut self, title: &str, links: &[&str]) {
            self.results
                .insert(title.into(), links.iter().map(|l| l.to_string()).collect());
        }
    }

    #[async_trait]
    impl ReferenceSearch for FakeSearch {
        async fn find_references(&self, title: &str) -> Vec<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.results.get(title).cloned().unwrap_or_default()
        }
    }

    #[derive(Default)]
    struct FakeFetch {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReferenceFetch for FakeFetch {
        async fn scrape(&self, url: &str) -> String {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if url.contains("broken") {
                String::new()
            } else {
                format!("excerpt of {url}")
            }
        }
    }

    #[derive(Default)]
    struct FakeRewriter {
        fail_for: Vec<String>,
        calls: AtomicUsize,
    }

    impl FakeRewriter {
        fn failing_for(original: &str) -> Self {
            Self {
                fail_for: vec![original.into()],
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl TextRewriter for FakeRewriter {
        async fn rewrite(&self, original: &str, references: [&str; 2]) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_for.iter().any(|o| o == original) {
                return Err(ArticleflowError::Rewrite("provider returned HTTP 503".into()));
            }
            Ok(format!("REWRITTEN[{original}|{}|{}]", references[0], references[1]))
        }
    }

    #[derive(Default)]
    struct RecordingProgress {
        events: Mutex<Vec<String>>,
    }

    impl ProgressReporter for RecordingProgress {
        fn run_started(&self, total: usize) {
            self.events.lock().unwrap().push(format!("start {total}"));
        }
        fn item_started(&self, article: &Article, current: usize, total: usize) {
            self.events
                .lock()
                .unwrap()
                .push(format!("item {} {current}/{total}", article.id));
        }
        fn stage_persisted(&self, article: &Article) {
            self.events.lock().unwrap().push(format!("stage {}", article.stage));
        }
        fn item_finished(&self, report: &ItemReport) {
            self.events
                .lock()
                .unwrap()
                .push(format!("finish {}", report.outcome.label()));
        }
        fn done(&self, _summary: &RunSummary) {
            self.events.lock().unwrap().push("done".into());
        }
    }

    fn article(id: i64, title: &str, body: &str) -> Article {
        Article::new(ArticleId(id), title, body)
    }

    fn scraped_article(id: i64, title: &str, body: &str) -> Article {
        let mut a = article(id, title, body);
        ArticleUpdate::searched(vec!["https://a.com/x".into(), "https://b.com/y".into()])
            .apply_to(&mut a);
        ArticleUpdate::scraped("stored one".into(), "stored two".into()).apply_to(&mut a);
        a
    }

    // --- tests -------------------------------------------------------------

    #[tokio::test]
    async fn fresh_article_runs_to_completion() {
        let store = MemoryStore::with(vec![article(1, "Chatbots", "Body")]);
        let search = FakeSearch::with("Chatbots", &["https://a.com/x", "https://b.com/y"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();
        let progress = RecordingProgress::default();

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&progress)
            .await
            .unwrap();

        let stored = store.get(1);
        assert_eq!(stored.stage, Stage::Completed);
        assert!(stored.is_updated);
        assert_eq!(
            stored.updated_content.as_deref(),
            Some(
                "REWRITTEN[Body|excerpt of https://a.com/x|excerpt of https://b.com/y]\n\n\
                 ## References\n- https://a.com/x\n- https://b.com/y"
            )
        );
        assert_eq!(
            store.written_stages(),
            vec![Stage::Searched, Stage::Scraped, Stage::Completed]
        );
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.items[0].entered, Stage::Pending);
        assert_eq!(summary.items[0].reached, Stage::Completed);
        assert_eq!(
            *progress.events.lock().unwrap(),
            vec![
                "start 1",
                "item 1 1/1",
                "stage searched",
                "stage scraped",
                "stage completed",
                "finish completed",
                "done",
            ]
        );
    }

    #[tokio::test]
    async fn insufficient_references_leave_article_pending() {
        let store = MemoryStore::with(vec![article(1, "Obscure", "Body")]);
        let search = FakeSearch::with("Obscure", &["https://only.com/one"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(store.get(1).stage, Stage::Pending);
        assert!(store.written_stages().is_empty());
        assert_eq!(
            summary.items[0].outcome,
            ItemOutcome::InsufficientReferences { found: 1 }
        );
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 0);
        assert_eq!(rewriter.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn scraped_article_goes_straight_to_rewrite() {
        let store = MemoryStore::with(vec![scraped_article(4, "Resumed", "Old body")]);
        let search = FakeSearch::default();
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 0);
        assert_eq!(rewriter.calls.load(Ordering::SeqCst), 1);
        let stored = store.get(4);
        assert_eq!(stored.stage, Stage::Completed);
        assert!(
            stored
                .updated_content
                .unwrap()
                .starts_with("REWRITTEN[Old body|stored one|stored two]")
        );
    }

    #[tokio::test]
    async fn failed_scrapes_are_stored_as_empty_excerpts() {
        let store = MemoryStore::with(vec![article(1, "Mixed", "Body")]);
        let search = FakeSearch::with("Mixed", &["https://broken.com/x", "https://b.com/y"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::failing_for("Body");

        Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        let stored = store.get(1);
        assert_eq!(stored.stage, Stage::Scraped);
        assert_eq!(stored.excerpts(), ["", "excerpt of https://b.com/y"]);
    }

    #[tokio::test]
    async fn rewrite_failure_does_not_stop_the_run() {
        let store = MemoryStore::with(vec![
            article(1, "First", "Fails"),
            article(2, "Second", "Works"),
        ]);
        let mut search = FakeSearch::with("First", &["https://a.com/1", "https://b.com/1"]);
        search.add("Second", &["https://a.com/2", "https://b.com/2"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::failing_for("Fails");

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        let first = store.get(1);
        assert_eq!(first.stage, Stage::Scraped);
        assert!(first.updated_content.is_none());
        assert!(!first.is_updated);
        assert_eq!(store.get(2).stage, Stage::Completed);

        assert_eq!(summary.interrupted(), 1);
        assert_eq!(summary.completed(), 1);
        assert_eq!(summary.items[0].reached, Stage::Scraped);
        assert!(matches!(
            &summary.items[0].outcome,
            ItemOutcome::Interrupted { error } if error.contains("503")
        ));
    }

    #[tokio::test]
    async fn second_run_resumes_without_repeating_stages() {
        let store = MemoryStore::with(vec![article(1, "Chatbots", "Body")]);
        let search = FakeSearch::with("Chatbots", &["https://a.com/x", "https://b.com/y"]);
        let fetch = FakeFetch::default();

        let failing = FakeRewriter::failing_for("Body");
        Pipeline::new(&store, &search, &fetch, &failing)
            .run(&SilentProgress)
            .await
            .unwrap();
        assert_eq!(store.get(1).stage, Stage::Scraped);

        let working = FakeRewriter::default();
        Pipeline::new(&store, &search, &fetch, &working)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(store.get(1).stage, Stage::Completed);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 2);
        assert_eq!(
            store.written_stages(),
            vec![Stage::Searched, Stage::Scraped, Stage::Completed]
        );

        // A third run leaves the completed article alone.
        let summary = Pipeline::new(&store, &search, &fetch, &working)
            .run(&SilentProgress)
            .await
            .unwrap();
        assert_eq!(summary.skipped(), 1);
        assert_eq!(store.writes.lock().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn force_reprocess_reruns_completed_articles() {
        let mut done = scraped_article(1, "Chatbots", "Body");
        ArticleUpdate::completed("old".into()).apply_to(&mut done);
        let store = MemoryStore::with(vec![done]);
        let search = FakeSearch::with("Chatbots", &["https://c.com/new", "https://d.com/new"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .force_reprocess(true)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.completed(), 1);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        let stored = store.get(1);
        assert_eq!(stored.citation_links, vec!["https://c.com/new", "https://d.com/new"]);
        assert!(
            stored
                .updated_content
                .unwrap()
                .ends_with("## References\n- https://c.com/new\n- https://d.com/new")
        );
    }

    #[tokio::test]
    async fn forced_rerun_that_stops_early_drops_the_old_rewrite() {
        let mut done = scraped_article(1, "Chatbots", "Body");
        ArticleUpdate::completed("old".into()).apply_to(&mut done);
        let store = MemoryStore::with(vec![done]);
        let search = FakeSearch::with("Chatbots", &["https://c.com/new", "https://d.com/new"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::failing_for("Body");

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .force_reprocess(true)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.interrupted(), 1);
        let stored = store.get(1);
        assert_eq!(stored.stage, Stage::Scraped);
        assert_eq!(stored.citation_links, vec!["https://c.com/new", "https://d.com/new"]);
        assert!(!stored.is_updated);
        assert!(stored.updated_content.is_none());
        let writes = store.writes.lock().unwrap();
        assert_eq!(writes[0].1.updated_content, Some(None));
    }

    #[tokio::test]
    async fn store_that_does_not_advance_interrupts_the_article() {
        let store = MemoryStore {
            ignore_writes: true,
            ..MemoryStore::with(vec![article(1, "Chatbots", "Body")])
        };
        let search = FakeSearch::with("Chatbots", &["https://a.com/x", "https://b.com/y"]);
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.interrupted(), 1);
        assert_eq!(summary.items[0].reached, Stage::Pending);
        assert_eq!(store.writes.lock().unwrap().len(), 1);
        assert_eq!(fetch.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn searched_article_without_links_is_interrupted() {
        let mut broken = article(1, "Broken", "Body");
        broken.stage = Stage::Searched;
        let store = MemoryStore::with(vec![broken]);
        let search = FakeSearch::default();
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        let summary = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap();

        assert_eq!(summary.interrupted(), 1);
        assert_eq!(store.get(1).stage, Stage::Searched);
    }

    #[tokio::test]
    async fn list_failure_is_a_run_error() {
        let store = MemoryStore {
            fail_list: true,
            ..Default::default()
        };
        let search = FakeSearch::default();
        let fetch = FakeFetch::default();
        let rewriter = FakeRewriter::default();

        let err = Pipeline::new(&store, &search, &fetch, &rewriter)
            .run(&SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, ArticleflowError::Network(_)));
    }
}
