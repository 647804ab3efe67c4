//! Background search sessions and single-article reads.
//!
//! A [`Searcher`] runs at most one search at a time on a spawned tokio task.
//! The caller gets a channel of [`SessionEvent`]s: progress notices while
//! sources are fetched, then exactly one [`SessionEvent::Complete`] carrying
//! the whole ranked result set. Partial results are never exposed.
//!
//! The session's buffers are owned by the worker until that final hand-off,
//! so nothing is shared and no lock is needed.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument};

use crate::config::{ContentSettings, SessionSettings, Settings};
use crate::content::fetch_content;
use crate::dates::DateNormalizer;
use crate::error::SessionError;
use crate::fetch::{Dispatcher, Progress, SourceOutcome, SourceReport};
use crate::models::{ContentExtractionResult, SourceDescriptor};
use crate::rank::{RankedResults, SortKey};

/// Entry-point gate: a second caller is rejected, not queued.
#[derive(Debug, Clone, Default)]
pub struct Gate(Arc<AtomicBool>);

/// Holds a [`Gate`] closed until dropped.
#[derive(Debug)]
pub struct GateGuard(Arc<AtomicBool>);

impl Gate {
    pub fn try_acquire(&self) -> Option<GateGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GateGuard(Arc::clone(&self.0)))
    }

    #[cfg(test)]
    fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Drop for GateGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Everything one search produced.
#[derive(Debug)]
pub struct SearchSession {
    pub query: String,
    pub started_at: DateTime<Utc>,
    pub elapsed: Duration,
    /// One report per attempted source, in configuration order.
    pub reports: Vec<SourceReport>,
    pub results: RankedResults,
}

impl SearchSession {
    /// Reorder the collected results. Nothing is fetched again.
    pub fn resort(&mut self, key: SortKey) {
        self.results.resort(key);
    }

    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, SourceOutcome::Failed(_)))
    }
}

#[derive(Debug)]
pub enum SessionEvent {
    SourceStarted { source: String },
    SourceFinished { source: String, count: usize },
    Complete(SearchSession),
}

/// Runs search sessions and article reads in the background.
#[derive(Debug, Clone)]
pub struct Searcher {
    dispatcher: Arc<Dispatcher>,
    session: SessionSettings,
    content: ContentSettings,
    search_gate: Gate,
    read_gate: Gate,
}

impl Searcher {
    pub fn new(settings: &Settings) -> Result<Self, SessionError> {
        let dispatcher = Dispatcher::new(
            settings.http.clone(),
            settings.extraction.clone(),
            DateNormalizer::with_fallback_days(settings.dates.fallback_days),
        )
        .map_err(|e| SessionError::Client(e.to_string()))?;
        Ok(Self {
            dispatcher: Arc::new(dispatcher),
            session: settings.session.clone(),
            content: settings.content.clone(),
            search_gate: Gate::default(),
            read_gate: Gate::default(),
        })
    }

    #[cfg(test)]
    fn is_searching(&self) -> bool {
        self.search_gate.is_busy()
    }

    /// Start a search over `sources` on a background task.
    ///
    /// Fails with [`SessionError::Busy`] while an earlier search has not yet
    /// delivered its `Complete` event. Cancelling `cancel` (or reaching the
    /// configured deadline) makes unfinished sources report
    /// `Failed(Cancelled)`; the session still completes.
    #[instrument(level = "info", skip(self, sources, cancel), fields(sources = sources.len()))]
    pub fn start(
        &self,
        query: &str,
        sources: Vec<SourceDescriptor>,
        cancel: CancellationToken,
    ) -> Result<mpsc::UnboundedReceiver<SessionEvent>, SessionError> {
        let query = query.trim().to_string();
        if query.is_empty() {
            return Err(SessionError::EmptyQuery);
        }
        if sources.is_empty() {
            return Err(SessionError::NoSources);
        }
        let guard = self.search_gate.try_acquire().ok_or(SessionError::Busy)?;

        let (tx, rx) = mpsc::unbounded_channel();
        let dispatcher = Arc::clone(&self.dispatcher);
        let concurrency = self.session.concurrency;
        let deadline = self.session.deadline_secs.map(Duration::from_secs);

        tokio::spawn(async move {
            let started_at = Utc::now();
            let t0 = Instant::now();
            info!(%query, "Search started");

            let token = cancel.child_token();
            let timer = deadline.map(|limit| {
                let token = token.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(limit).await;
                    info!(secs = limit.as_secs(), "Search deadline reached; cancelling");
                    token.cancel();
                })
            });

            let reports = dispatcher
                .dispatch(&sources, &query, concurrency, &token, |p| {
                    let event = match p {
                        Progress::Started(s) => SessionEvent::SourceStarted {
                            source: s.name.clone(),
                        },
                        Progress::Finished(r) => SessionEvent::SourceFinished {
                            source: r.source.clone(),
                            count: r.candidate_count(),
                        },
                    };
                    let _ = tx.send(event);
                })
                .await;
            if let Some(timer) = timer {
                timer.abort();
            }

            let candidates = reports
                .iter()
                .filter_map(|r| match &r.outcome {
                    SourceOutcome::Extracted { candidates, .. } => Some(candidates),
                    _ => None,
                })
                .flatten()
                .cloned()
                .collect();
            let session = SearchSession {
                query,
                started_at,
                elapsed: t0.elapsed(),
                reports,
                results: RankedResults::new(candidates),
            };
            info!(
                results = session.results.len(),
                failed = session.failed_sources().count(),
                elapsed_ms = session.elapsed.as_millis() as u64,
                "Search complete"
            );

            drop(guard);
            if tx.send(SessionEvent::Complete(session)).is_err() {
                debug!("Search receiver dropped before completion");
            }
        });

        Ok(rx)
    }

    /// Run a search and wait for its result.
    pub async fn search(
        &self,
        query: &str,
        sources: Vec<SourceDescriptor>,
        cancel: CancellationToken,
    ) -> Result<SearchSession, SessionError> {
        let mut rx = self.start(query, sources, cancel)?;
        while let Some(event) = rx.recv().await {
            match event {
                SessionEvent::SourceStarted { source } => debug!(%source, "Fetching source"),
                SessionEvent::SourceFinished { source, count } => {
                    debug!(%source, count, "Source done")
                }
                SessionEvent::Complete(session) => return Ok(session),
            }
        }
        Err(SessionError::WorkerGone)
    }

    /// Start reading one article on a background task. Only one read may be
    /// outstanding at a time.
    pub fn start_read(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> Result<oneshot::Receiver<ContentExtractionResult>, SessionError> {
        let guard = self.read_gate.try_acquire().ok_or(SessionError::Busy)?;
        let (tx, rx) = oneshot::channel();
        let dispatcher = Arc::clone(&self.dispatcher);
        let content = self.content.clone();
        let url = url.to_string();
        let title = title.map(str::to_string);

        tokio::spawn(async move {
            let result = fetch_content(&dispatcher, &url, title.as_deref(), &content).await;
            drop(guard);
            let _ = tx.send(result);
        });
        Ok(rx)
    }

    /// Read one article and wait for the result.
    pub async fn read(
        &self,
        url: &str,
        title: Option<&str>,
    ) -> Result<ContentExtractionResult, SessionError> {
        self.start_read(url, title)?
            .await
            .map_err(|_| SessionError::WorkerGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::fetch::test_server;
    use tokio::net::TcpListener;

    fn searcher(deadline_secs: Option<u64>) -> Searcher {
        let mut settings = Settings::default();
        settings.http.timeout_secs = 5;
        settings.http.content_timeout_secs = 5;
        settings.session.deadline_secs = deadline_secs;
        Searcher::new(&settings).unwrap()
    }

    /// Accepts connections but never answers them.
    async fn silent_origin() -> (TcpListener, String) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let origin = format!("http://{}", listener.local_addr().unwrap());
        (listener, origin)
    }

    fn results_page(items: &[(&str, &str, &str)]) -> String {
        let body: String = items
            .iter()
            .map(|(href, title, date)| {
                format!(r#"<div class="item"><a href="{href}">{title}</a><span class="date">{date}</span></div>"#)
            })
            .collect();
        format!("<html><body>{body}</body></html>")
    }

    #[test]
    fn test_gate() {
        let gate = Gate::default();
        let guard = gate.try_acquire().unwrap();
        assert!(gate.is_busy());
        assert!(gate.try_acquire().is_none());
        drop(guard);
        assert!(!gate.is_busy());
        assert!(gate.try_acquire().is_some());
    }

    #[tokio::test]
    async fn test_rejects_empty_query_and_no_sources() {
        let s = searcher(None);
        let sources = vec![SourceDescriptor::new("A", "http://127.0.0.1:1/?q={query}")];
        assert!(matches!(
            s.start("   ", sources, CancellationToken::new()),
            Err(SessionError::EmptyQuery)
        ));
        assert!(matches!(
            s.start("storm", vec![], CancellationToken::new()),
            Err(SessionError::NoSources)
        ));
        assert!(!s.is_searching());
    }

    #[tokio::test]
    async fn test_end_to_end_ranking_and_isolation() {
        let wire = results_page(&[
            ("/news/2025/05/01/weather", "Weekend weather looks mild", "2025-05-01"),
            ("/news/2025/05/06/policy", "New climate policy unveiled", "2 hours ago"),
        ]);
        let daily = results_page(&[(
            "/news/2025/05/05/talks",
            "Climate talks resume in Bonn",
            "1 day ago",
        )]);
        let origin = test_server::serve(vec![("/wire", 200, wire), ("/daily", 200, daily)]).await;
        let sources = vec![
            SourceDescriptor::new("Wire", format!("{origin}/wire?q={{query}}")),
            SourceDescriptor::new("Down", "http://127.0.0.1:1/search?q={query}"),
            SourceDescriptor::new("Daily", format!("{origin}/daily?q={{query}}")),
        ];

        let s = searcher(None);
        let mut rx = s.start("climate policy", sources, CancellationToken::new()).unwrap();
        let mut progress = Vec::new();
        let mut session = loop {
            match rx.recv().await.unwrap() {
                SessionEvent::SourceStarted { source } => progress.push(format!("start {source}")),
                SessionEvent::SourceFinished { source, count } => {
                    progress.push(format!("done {source} {count}"))
                }
                SessionEvent::Complete(session) => break session,
            }
        };

        assert_eq!(
            progress,
            vec![
                "start Wire",
                "done Wire 2",
                "start Down",
                "done Down 0",
                "start Daily",
                "done Daily 1",
            ]
        );
        assert!(!s.is_searching());
        assert_eq!(session.failed_sources().count(), 1);

        let titles: Vec<_> = session.results.items().iter().map(|c| c.title()).collect();
        assert_eq!(
            titles,
            vec![
                "New climate policy unveiled",
                "Climate talks resume in Bonn",
                "Weekend weather looks mild",
            ]
        );

        session.resort(SortKey::Source);
        let sources: Vec<_> = session.results.items().iter().map(|c| c.source()).collect();
        assert_eq!(sources, vec!["Daily", "Wire", "Wire"]);
    }

    #[tokio::test]
    async fn test_same_article_from_two_sources_is_kept_twice() {
        let page = results_page(&[(
            "https://shared.example.com/news/2025/05/06/budget",
            "Budget deal reached in Congress",
            "3 hours ago",
        )]);
        let origin = test_server::serve(vec![("/a", 200, page.clone()), ("/b", 200, page)]).await;
        let sources = vec![
            SourceDescriptor::new("First", format!("{origin}/a?q={{query}}")),
            SourceDescriptor::new("Second", format!("{origin}/b?q={{query}}")),
        ];
        let session = searcher(None)
            .search("budget", sources, CancellationToken::new())
            .await
            .unwrap();
        let items = session.results.items();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].url(), items[1].url());
        assert_eq!(items[0].source(), "First");
        assert_eq!(items[1].source(), "Second");
    }

    #[tokio::test]
    async fn test_second_search_is_rejected_while_busy() {
        let (_listener, origin) = silent_origin().await;
        let sources = vec![SourceDescriptor::new("Slow", format!("{origin}/?q={{query}}"))];
        let s = searcher(None);
        let cancel = CancellationToken::new();
        let mut rx = s.start("storm", sources.clone(), cancel.clone()).unwrap();

        assert!(s.is_searching());
        assert!(matches!(
            s.start("storm", sources, CancellationToken::new()),
            Err(SessionError::Busy)
        ));

        cancel.cancel();
        let session = loop {
            if let SessionEvent::Complete(session) = rx.recv().await.unwrap() {
                break session;
            }
        };
        assert!(matches!(
            session.reports[0].outcome,
            SourceOutcome::Failed(FetchError::Cancelled)
        ));
        assert!(session.results.is_empty());
        assert!(!s.is_searching());
    }

    #[tokio::test]
    async fn test_deadline_cancels_outstanding_sources() {
        let (_listener, origin) = silent_origin().await;
        let sources = vec![SourceDescriptor::new("Slow", format!("{origin}/?q={{query}}"))];
        let session = searcher(Some(1))
            .search("storm", sources, CancellationToken::new())
            .await
            .unwrap();
        assert!(matches!(
            session.reports[0].outcome,
            SourceOutcome::Failed(FetchError::Cancelled)
        ));
    }

    #[tokio::test]
    async fn test_one_read_at_a_time() {
        let (_listener, origin) = silent_origin().await;
        let s = searcher(None);
        let pending = s.start_read(&format!("{origin}/story"), None).unwrap();
        assert!(matches!(s.start_read("http://127.0.0.1:1/", None), Err(SessionError::Busy)));
        drop(pending);

        let page = "<article><p>Crews restored power to most homes overnight.</p></article>";
        let served = test_server::serve(vec![("/power", 200, page.to_string())]).await;
        let other = searcher(None);
        let result = other
            .read(&format!("{served}/power"), Some("Power restored"))
            .await
            .unwrap();
        assert!(!result.is_error());
        assert_eq!(result.title, "Power restored");
    }
}
