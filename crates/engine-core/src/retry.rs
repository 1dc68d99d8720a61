use connectors::sql::base::error::DbError;
use mysql_async::Error as MySqlError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Indicates whether an error should be retried or treated as fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

/// Result of running an operation under the retry policy.
#[derive(Debug)]
pub enum RetryError<E> {
    /// The error was considered fatal and should bubble up immediately.
    Fatal(E),
    /// The error was retryable, but the configured attempts were exhausted.
    AttemptsExceeded(E),
}

impl<E> RetryError<E> {
    pub fn into_inner(self) -> E {
        match self {
            RetryError::Fatal(e) | RetryError::AttemptsExceeded(e) => e,
        }
    }
}

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    /// A single attempt: failures surface immediately.
    fn default() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: if max_delay.is_zero() {
                base_delay
            } else {
                max_delay
            },
        }
    }

    /// Default delays with `max_attempts` attempts.
    pub fn with_attempts(max_attempts: usize) -> Self {
        let default = Self::default();
        Self::new(max_attempts, default.base_delay, default.max_delay)
    }

    /// Executes the operation with the configured retry policy.
    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            match op().await {
                Ok(result) => return Ok(result),
                Err(err) => match classify(&err) {
                    RetryDisposition::Stop => return Err(RetryError::Fatal(err)),
                    RetryDisposition::Retry => {
                        if attempt + 1 >= self.max_attempts {
                            return Err(RetryError::AttemptsExceeded(err));
                        }

                        let delay = self.backoff_delay(attempt);
                        warn!(
                            attempt = attempt + 1,
                            max_attempts = self.max_attempts,
                            delay_ms = delay.as_millis() as u64,
                            error = %err,
                            "Transient failure, retrying"
                        );
                        sleep(delay).await;
                        attempt += 1;
                    }
                },
            }
        }
    }

    fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::from_millis(0);
        }

        let factor = 1u128 << attempt.min(6);
        let base_ms = self.base_delay.as_millis();
        let delay_ms = base_ms.saturating_mul(factor);
        let capped = delay_ms.min(self.max_delay.as_millis());
        Duration::from_millis(capped as u64)
    }
}

pub fn classify_db_error(err: &DbError) -> RetryDisposition {
    match err {
        DbError::MySqlError(mysql_err) => classify_mysql_error(mysql_err),
        DbError::Write(_) => RetryDisposition::Stop,
        DbError::QueryBuildError(_) => RetryDisposition::Stop,
        DbError::Decode(_) => RetryDisposition::Stop,
        DbError::Unknown(_) => RetryDisposition::Stop,
    }
}

pub fn classify_mysql_error(err: &MySqlError) -> RetryDisposition {
    match err {
        MySqlError::Io(_) | MySqlError::Other(_) => RetryDisposition::Retry,
        MySqlError::Driver(_) => RetryDisposition::Retry,
        MySqlError::Server(server_err) => {
            if is_retryable_mysql_server_error(server_err.code, server_err.state.as_str()) {
                RetryDisposition::Retry
            } else {
                RetryDisposition::Stop
            }
        }
        _ => RetryDisposition::Stop,
    }
}

fn is_retryable_mysql_server_error(code: u16, state: &str) -> bool {
    // Lock wait timeout, deadlock, lost/refused connections, too many connections.
    const RETRYABLE_CODES: [u16; 8] = [1205, 1213, 2002, 2003, 2006, 2013, 1040, 1042];
    if RETRYABLE_CODES.contains(&code) {
        return true;
    }

    matches!(state, "40001" | "HYT00" | "08S01")
}
