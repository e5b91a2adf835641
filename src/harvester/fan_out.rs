//! Concurrent extraction over a known set of URLs
//!
//! One task per URL, bounded by a semaphore. A failing URL is logged and
//! recorded in the report; it never stops its siblings. Results are put
//! back together in input order, whatever order the tasks finish in.

use crate::model::StaffMember;
use crate::Result;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

/// Merged outcome of a batch of extractions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchReport {
    /// Records from every successful URL, in input-URL order
    pub members: Vec<StaffMember>,

    /// `(url, error)` for every URL that failed, in input-URL order
    pub failures: Vec<(String, String)>,
}

impl BatchReport {
    pub fn succeeded(&self, total: usize) -> usize {
        total.saturating_sub(self.failures.len())
    }
}

/// Runs `extract` over every URL concurrently
///
/// # Arguments
///
/// * `urls` - URLs to extract, in the order results should be merged
/// * `concurrency` - Maximum number of extractions in flight
/// * `cancel` - Abandons the extractions still running when triggered
/// * `extract` - Builds the extraction future for one URL
///
/// # Returns
///
/// The merged report. The batch itself cannot fail: if every URL fails,
/// the report has no members and one failure per URL.
pub async fn fan_out<F, Fut>(
    urls: Vec<String>,
    concurrency: usize,
    cancel: &CancellationToken,
    extract: F,
) -> BatchReport
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<Vec<StaffMember>>> + Send + 'static,
{
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut handles = Vec::with_capacity(urls.len());

    for url in urls {
        let semaphore = Arc::clone(&semaphore);
        let cancel = cancel.clone();
        let job = extract(url.clone());

        let handle = tokio::spawn(async move {
            let Ok(_permit) = semaphore.acquire_owned().await else {
                return Err("concurrency limiter closed".to_string());
            };
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err("cancelled".to_string()),
                result = job => result.map_err(|e| e.to_string()),
            }
        });
        handles.push((url, handle));
    }

    let mut report = BatchReport::default();
    for (url, handle) in handles {
        let outcome = match handle.await {
            Ok(outcome) => outcome,
            Err(e) => Err(format!("extraction task failed: {}", e)),
        };

        match outcome {
            Ok(members) => {
                tracing::debug!("Extracted {} member(s) from {}", members.len(), url);
                report.members.extend(members);
            }
            Err(e) => {
                tracing::warn!("Error extracting {}: {}", url, e);
                report.failures.push((url, e));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::HarvestError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn member(email: &str) -> StaffMember {
        StaffMember::new("Test Person", None, Some(email)).unwrap()
    }

    fn urls(list: &[&str]) -> Vec<String> {
        list.iter().map(|u| u.to_string()).collect()
    }

    #[tokio::test]
    async fn test_failure_is_isolated_and_order_kept() {
        let report = fan_out(
            urls(&["https://a.org", "https://b.org", "https://c.org"]),
            4,
            &CancellationToken::new(),
            |url| async move {
                match url.as_str() {
                    // Slowest first, so completion order differs from input order
                    "https://a.org" => {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                        Ok(vec![member("a1@a.org"), member("a2@a.org")])
                    }
                    "https://b.org" => Err(HarvestError::Fetch {
                        url: url.clone(),
                        message: "HTTP 500".to_string(),
                    }),
                    _ => Ok(vec![member("c1@c.org")]),
                }
            },
        )
        .await;

        let emails: Vec<_> = report
            .members
            .iter()
            .filter_map(|m| m.email.as_deref())
            .collect();
        assert_eq!(emails, vec!["a1@a.org", "a2@a.org", "c1@c.org"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].0, "https://b.org");
        assert!(report.failures[0].1.contains("HTTP 500"));
        assert_eq!(report.succeeded(3), 2);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_report() {
        let report = fan_out(
            urls(&["https://a.org", "https://b.org"]),
            2,
            &CancellationToken::new(),
            |_| async { Err::<Vec<StaffMember>, _>(HarvestError::Parse("bad json".to_string())) },
        )
        .await;

        assert!(report.members.is_empty());
        assert_eq!(report.failures.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let list: Vec<String> = (0..8).map(|i| format!("https://{}.org", i)).collect();
        let report = fan_out(list, 2, &CancellationToken::new(), |_| {
            let in_flight = Arc::clone(&in_flight);
            let peak = Arc::clone(&peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(Duration::from_millis(10)).await;
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, HarvestError>(Vec::new())
            }
        })
        .await;

        assert!(report.failures.is_empty());
        assert!(peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_cancelled_batch_reports_each_url() {
        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = fan_out(urls(&["https://a.org"]), 1, &cancel, |_| async {
            std::future::pending::<Result<Vec<StaffMember>>>().await
        })
        .await;

        assert_eq!(
            report.failures,
            vec![("https://a.org".to_string(), "cancelled".to_string())]
        );
    }
}
