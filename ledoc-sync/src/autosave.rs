use std::time::Duration;

use tokio::time::Instant;

/// Reset-on-change timer: fires once `delay` after the last `touch`.
///
/// Also used as a plain one-shot timer by touching it once.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Debouncer {
        Debouncer {
            delay,
            deadline: None,
        }
    }

    /// (Re-)arms the timer
    pub fn touch(&mut self) {
        self.deadline = Some(Instant::now() + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Resolves when the timer fires, and disarms it. Never resolves while
    /// disarmed. Cancel-safe.
    pub async fn fired(&mut self) {
        match self.deadline {
            None => futures::future::pending().await,
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                self.deadline = None;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn fires_once_after_the_quiet_period() {
        let mut d = Debouncer::new(Duration::from_secs(2));
        let start = Instant::now();
        d.touch();
        tokio::time::advance(Duration::from_secs(1)).await;
        d.touch();
        tokio::time::advance(Duration::from_millis(1500)).await;
        d.touch();
        d.fired().await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(4500), "{elapsed:?}");
        assert!(elapsed < Duration::from_millis(4600), "{elapsed:?}");
        assert!(!d.is_armed());
        assert!(tokio::time::timeout(Duration::from_secs(60), d.fired())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_timer_never_fires() {
        let mut d = Debouncer::new(Duration::from_secs(2));
        d.touch();
        d.cancel();
        assert!(tokio::time::timeout(Duration::from_secs(10), d.fired())
            .await
            .is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn interrupted_wait_keeps_the_deadline() {
        let mut d = Debouncer::new(Duration::from_secs(2));
        d.touch();
        assert!(tokio::time::timeout(Duration::from_secs(1), d.fired())
            .await
            .is_err());
        assert!(d.is_armed());
        assert!(tokio::time::timeout(Duration::from_millis(1100), d.fired())
            .await
            .is_ok());
    }
}
