use crate::{
    error::{AnalysisError, Result},
    report::ColorRatioReport,
    ColorAnalyzer,
};
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex, PoisonError,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Identifies one submission to an [`AnalysisSession`]. Later submissions have larger tickets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Completed(ColorRatioReport),
    /// A newer image was submitted before this analysis finished, so its result was discarded.
    Superseded,
}

impl AnalysisOutcome {
    pub fn report(self) -> Option<ColorRatioReport> {
        match self {
            AnalysisOutcome::Completed(report) => Some(report),
            AnalysisOutcome::Superseded => None,
        }
    }
}

/// Runs analyses in the background where only the latest submitted image counts.
///
/// Every [`AnalysisSession::submit`] cancels the analysis before it. The session belongs to its caller, typically one
/// per upload form; separate sessions don't affect each other.
#[derive(Debug, Default)]
pub struct AnalysisSession {
    generation: Arc<AtomicU64>,
    current: Mutex<Option<CancellationToken>>,
}

/// A pending background analysis.
#[derive(Debug)]
pub struct AnalysisHandle {
    ticket: Ticket,
    token: CancellationToken,
    generation: Arc<AtomicU64>,
    task: JoinHandle<Result<ColorRatioReport>>,
}

impl AnalysisSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start analysing an image on Tokio's blocking thread pool, superseding any analysis still running.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn submit<P>(&self, analyzer: ColorAnalyzer<P>) -> AnalysisHandle
    where
        P: image::Pixel<Subpixel = u8> + Send + 'static,
    {
        let token = CancellationToken::new();

        let ticket = {
            let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

            if let Some(previous) = current.replace(token.clone()) {
                previous.cancel();
            }

            Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
        };

        if ticket.0 > 1 {
            log::debug!("analysis {} supersedes analysis {}", ticket.0, ticket.0 - 1);
        }

        let task_token = token.clone();
        let task = tokio::task::spawn_blocking(move || analyzer.analyze_cancellable(&task_token));

        AnalysisHandle {
            ticket,
            token,
            generation: Arc::clone(&self.generation),
            task,
        }
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }

    /// Cancel the running analysis, if any. Its handle resolves to [`AnalysisOutcome::Superseded`].
    pub fn cancel(&self) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(token) = current.take() {
            token.cancel();
            // nothing submitted so far may complete anymore
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
    }
}

impl AnalysisHandle {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    /// Whether this is still the latest analysis of its session.
    pub fn is_current(&self) -> bool {
        self.generation.load(Ordering::SeqCst) == self.ticket.0
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the analysis to finish. Resolves to [`AnalysisOutcome::Superseded`] if a newer image was submitted to
    /// the session in the meantime, even if this analysis got to complete.
    pub async fn outcome(self) -> Result<AnalysisOutcome> {
        let AnalysisHandle {
            ticket,
            token,
            generation,
            task,
        } = self;

        let current = || !token.is_cancelled() && generation.load(Ordering::SeqCst) == ticket.0;

        match task.await? {
            Ok(report) if current() => Ok(AnalysisOutcome::Completed(report)),
            Ok(_) | Err(AnalysisError::Cancelled) => Ok(AnalysisOutcome::Superseded),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::ColorCategory;
    use image::{Rgb, RgbImage};

    fn solid(rgb: [u8; 3]) -> ColorAnalyzer<Rgb<u8>> {
        ColorAnalyzer::from_image(RgbImage::from_pixel(64, 64, Rgb(rgb)))
    }

    #[tokio::test]
    async fn single_submission_completes() {
        let session = AnalysisSession::new();
        let handle = session.submit(solid([0, 0, 255]));

        assert!(handle.is_current());
        assert!(session.is_current(handle.ticket()));

        let report = handle.outcome().await.unwrap().report().unwrap();
        assert_eq!(report.dominant_category(), Some(ColorCategory::Blue));
    }

    #[tokio::test]
    async fn last_image_wins() {
        let session = AnalysisSession::new();

        let first = session.submit(solid([255, 0, 0]));
        let second = session.submit(solid([0, 255, 0]));

        assert!(first.ticket() < second.ticket());
        assert!(!first.is_current());
        assert!(!session.is_current(first.ticket()));

        assert_eq!(first.outcome().await.unwrap(), AnalysisOutcome::Superseded);

        let report = second.outcome().await.unwrap().report().unwrap();
        assert_eq!(report.dominant_category(), Some(ColorCategory::Green));
    }

    #[tokio::test]
    async fn cancelled_session_discards_the_result() {
        let session = AnalysisSession::new();
        let handle = session.submit(solid([255, 255, 255]));

        session.cancel();

        assert_eq!(handle.outcome().await.unwrap(), AnalysisOutcome::Superseded);
    }

    #[tokio::test]
    async fn invalid_input_is_reported() {
        let session = AnalysisSession::new();
        let handle = session.submit(ColorAnalyzer::from_image(RgbImage::new(0, 0)));

        assert!(matches!(
            handle.outcome().await,
            Err(crate::AnalysisError::InvalidInput { .. })
        ));
    }
}
