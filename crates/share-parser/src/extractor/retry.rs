// Domain-validity retry: re-resolve until the media host is one end users can reach.
//
// Some CDN edges handed out by a platform are unreachable from outside its network.
// The guard repeats a whole resolution, serially, until the returned URL passes a
// host check or the attempt ceiling is hit, sleeping a random backoff in between.

use futures::future::BoxFuture;
use rand::RngExt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ParseError;
use crate::media::VideoInfo;

/// Sleep used between attempts. Injected so tests run without wall-clock delay.
pub type SleepFn = Arc<dyn Fn(Duration) -> BoxFuture<'static, ()> + Send + Sync>;

pub fn tokio_sleep() -> SleepFn {
    Arc::new(|delay| Box::pin(tokio::time::sleep(delay)))
}

pub fn no_sleep() -> SleepFn {
    Arc::new(|_| Box::pin(async {}))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total resolutions tried, including the first. Zero is treated as one.
    pub max_attempts: u32,
    pub min_backoff: Duration,
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            min_backoff: Duration::from_millis(100),
            max_backoff: Duration::from_millis(300),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, min_backoff: Duration, max_backoff: Duration) -> Self {
        Self {
            max_attempts,
            min_backoff,
            max_backoff,
        }
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Uniform delay in `[min_backoff, max_backoff]`.
    fn backoff(&self) -> Duration {
        let min = u64::try_from(self.min_backoff.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        if max <= min {
            return self.min_backoff;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

#[derive(Clone)]
pub struct RetryGuard {
    policy: RetryPolicy,
    sleep: SleepFn,
}

impl std::fmt::Debug for RetryGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryGuard")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl RetryGuard {
    pub fn new(policy: RetryPolicy) -> Self {
        Self::with_sleep(policy, tokio_sleep())
    }

    pub fn with_sleep(policy: RetryPolicy, sleep: SleepFn) -> Self {
        Self { policy, sleep }
    }

    /// Runs `resolve` until `is_valid` accepts its video URL.
    ///
    /// Galleries and results without a video URL are returned straight away.
    /// Resolution errors are returned immediately and never retried. When every
    /// attempt yields a rejected host, the last result travels inside
    /// [`ParseError::RetryExhausted`].
    pub async fn run<F, Fut, V>(&self, mut resolve: F, is_valid: V) -> Result<VideoInfo, ParseError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<VideoInfo, ParseError>>,
        V: Fn(&str) -> bool,
    {
        let attempts = self.policy.attempts();
        let mut attempt = 1;

        loop {
            let info = resolve(attempt).await?;

            if info.is_gallery() || info.video_url.is_empty() || is_valid(&info.video_url) {
                debug!(attempt, "Resolved media host accepted");
                return Ok(info);
            }

            if attempt >= attempts {
                return Err(ParseError::RetryExhausted {
                    attempts,
                    last: Box::new(info),
                });
            }

            let delay = self.policy.backoff();
            warn!(
                attempt,
                max = attempts,
                delay_ms = delay.as_millis() as u64,
                video_url = %info.video_url,
                "Media host not in allow-list, resolving again"
            );
            (self.sleep)(delay).await;
            attempt += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn video(url: &str) -> VideoInfo {
        VideoInfo::builder("t").video_url(url).build()
    }

    fn on_good_cdn(url: &str) -> bool {
        url.contains("good.cdn")
    }

    fn guard(max_attempts: u32) -> RetryGuard {
        RetryGuard::with_sleep(
            RetryPolicy::new(max_attempts, Duration::from_millis(100), Duration::from_millis(300)),
            no_sleep(),
        )
    }

    #[tokio::test]
    async fn returns_first_valid_attempt() {
        let calls = AtomicU32::new(0);

        let info = guard(10)
            .run(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move {
                        if attempt < 3 {
                            Ok(video("https://bad.cdn/v.mp4"))
                        } else {
                            Ok(video("https://good.cdn/v.mp4"))
                        }
                    }
                },
                on_good_cdn,
            )
            .await
            .unwrap();

        assert_eq!(info.video_url, "https://good.cdn/v.mp4");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_keeps_last_result() {
        let calls = AtomicU32::new(0);

        let err = guard(4)
            .run(
                |attempt| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async move { Ok(video(&format!("https://bad.cdn/{attempt}.mp4"))) }
                },
                on_good_cdn,
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        match &err {
            ParseError::RetryExhausted { attempts, last } => {
                assert_eq!(*attempts, 4);
                assert_eq!(last.video_url, "https://bad.cdn/4.mp4");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.partial_result().is_some());
    }

    #[tokio::test]
    async fn galleries_and_empty_urls_bypass_the_check() {
        let calls = AtomicU32::new(0);
        let gallery = guard(5)
            .run(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async {
                        Ok(VideoInfo::builder("g")
                            .images(vec!["https://img/1.webp".into()])
                            .build())
                    }
                },
                on_good_cdn,
            )
            .await
            .unwrap();
        assert!(gallery.is_gallery());

        let empty = guard(5)
            .run(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(VideoInfo::default()) }
                },
                on_good_cdn,
            )
            .await
            .unwrap();
        assert!(empty.video_url.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn resolution_errors_are_not_retried() {
        let calls = AtomicU32::new(0);

        let err = guard(5)
            .run(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(ParseError::ContentUnavailable("removed".into())) }
                },
                on_good_cdn,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, ParseError::ContentUnavailable(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn sleeps_between_attempts_within_bounds() {
        let delays = Arc::new(Mutex::new(Vec::new()));
        let recorded = delays.clone();
        let sleep: SleepFn = Arc::new(move |d| {
            recorded.lock().unwrap().push(d);
            Box::pin(async {})
        });
        let guard = RetryGuard::with_sleep(
            RetryPolicy::new(3, Duration::from_millis(100), Duration::from_millis(300)),
            sleep,
        );

        let _ = guard
            .run(|_| async { Ok(video("https://bad.cdn/v.mp4")) }, on_good_cdn)
            .await;

        let delays = delays.lock().unwrap();
        assert_eq!(delays.len(), 2);
        for d in delays.iter() {
            assert!(*d >= Duration::from_millis(100) && *d <= Duration::from_millis(300));
        }
    }

    #[tokio::test]
    async fn zero_ceiling_still_resolves_once() {
        let calls = AtomicU32::new(0);

        let err = guard(0)
            .run(
                |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Ok(video("https://bad.cdn/v.mp4")) }
                },
                on_good_cdn,
            )
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(err, ParseError::RetryExhausted { attempts: 1, .. }));
    }
}
