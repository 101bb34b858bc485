use crate::error::{ForwarderError, RedditApiError, TelegramApiError};
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, error, info};

/// Configuration for retry behavior
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of attempts (first try included)
    pub max_attempts: u32,
    /// Base delay for exponential backoff (in milliseconds)
    pub base_delay_ms: u64,
    /// Maximum delay between retries (in milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub backoff_multiplier: f64,
    /// Maximum jitter factor (0.0 to 1.0)
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 30000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

impl RetryConfig {
    /// Retry config tuned for the Reddit listing API
    pub fn reddit() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 2000,
            max_delay_ms: 60000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }

    /// Retry config tuned for the Telegram Bot API, which hands out
    /// explicit retry-after hints on 429
    pub fn telegram() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 60000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

/// Retry strategy based on error type
#[derive(Debug, Clone, PartialEq)]
pub enum RetryStrategy {
    /// Retry with exponential backoff
    Retry,
    /// Retry after a server-specified delay (rate limits)
    RetryWithDelay(Duration),
    /// Don't retry (permanent failures)
    NoRetry,
}

/// Determine retry strategy based on error type
pub fn get_retry_strategy(error: &ForwarderError) -> RetryStrategy {
    match error {
        ForwarderError::RedditApi(reddit_error) => match reddit_error {
            RedditApiError::RateLimitExceeded { retry_after } => {
                RetryStrategy::RetryWithDelay(Duration::from_secs(*retry_after))
            }
            RedditApiError::ServerError { .. } => RetryStrategy::Retry,
            RedditApiError::RequestTimeout => RetryStrategy::Retry,
            RedditApiError::InvalidResponse { .. } => RetryStrategy::Retry,
            // Authentication and permission errors are permanent
            RedditApiError::AuthenticationFailed { .. } => RetryStrategy::NoRetry,
            RedditApiError::InvalidToken => RetryStrategy::NoRetry,
            RedditApiError::Forbidden { .. } => RetryStrategy::NoRetry,
        },
        ForwarderError::TelegramApi(telegram_error) => match telegram_error {
            TelegramApiError::RateLimitExceeded { retry_after } => {
                RetryStrategy::RetryWithDelay(Duration::from_secs(*retry_after))
            }
            TelegramApiError::ServerError { .. } => RetryStrategy::Retry,
            TelegramApiError::RequestTimeout => RetryStrategy::Retry,
            TelegramApiError::InvalidResponse { .. } => RetryStrategy::Retry,
            // A rejected token or malformed payload will not fix itself
            TelegramApiError::Unauthorized => RetryStrategy::NoRetry,
            TelegramApiError::BadRequest { .. } => RetryStrategy::NoRetry,
        },
        ForwarderError::Network(reqwest_error) => {
            if reqwest_error.is_timeout() || reqwest_error.is_connect() {
                RetryStrategy::Retry
            } else {
                RetryStrategy::NoRetry
            }
        }
        _ => RetryStrategy::NoRetry,
    }
}

/// Calculate delay with exponential backoff and jitter
pub fn calculate_delay(attempt: u32, config: &RetryConfig) -> Duration {
    let base_delay = Duration::from_millis(config.base_delay_ms);
    let max_delay = Duration::from_millis(config.max_delay_ms);

    let exponential_delay = if attempt == 0 {
        base_delay
    } else {
        let multiplier = config.backoff_multiplier.powi(attempt as i32);
        let delay_ms = (config.base_delay_ms as f64 * multiplier) as u64;
        Duration::from_millis(delay_ms.min(config.max_delay_ms))
    };

    // Jitter prevents synchronized retries across invocations
    let jitter_range = (exponential_delay.as_millis() as f64 * config.jitter_factor) as u64;
    let jitter = if jitter_range == 0 {
        0
    } else {
        fastrand::u64(0..=jitter_range)
    };
    let final_delay = exponential_delay + Duration::from_millis(jitter);

    final_delay.min(max_delay)
}

/// Retry executor that wraps operations with retry logic
#[derive(Debug)]
pub struct RetryExecutor {
    config: RetryConfig,
}

impl RetryExecutor {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    /// Execute an operation, retrying transient failures up to the
    /// configured attempt cap. The last error is returned on exhaustion.
    pub async fn execute<F, Fut, T>(
        &self,
        operation_name: &str,
        operation: F,
    ) -> Result<T, ForwarderError>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<T, ForwarderError>>,
    {
        let mut last_error: Option<ForwarderError> = None;

        for attempt in 0..self.config.max_attempts {
            if attempt > 0 {
                debug!("Retry attempt {} for {}", attempt, operation_name);
            }

            match operation().await {
                Ok(result) => {
                    if attempt > 0 {
                        info!("Operation {} succeeded after {} retries", operation_name, attempt);
                    }
                    return Ok(result);
                }
                Err(err) => {
                    let strategy = get_retry_strategy(&err);
                    let attempts_left = attempt + 1 < self.config.max_attempts;

                    match strategy {
                        RetryStrategy::NoRetry => {
                            debug!("Not retrying {} due to error type: {}", operation_name, err);
                            last_error = Some(err);
                            break;
                        }
                        RetryStrategy::Retry if attempts_left => {
                            let delay = calculate_delay(attempt, &self.config);
                            info!("Retrying {} in {:?} due to: {}", operation_name, delay, err);
                            last_error = Some(err);
                            sleep(delay).await;
                        }
                        RetryStrategy::RetryWithDelay(delay) if attempts_left => {
                            info!(
                                "Retrying {} after specified delay of {:?} due to: {}",
                                operation_name, delay, err
                            );
                            last_error = Some(err);
                            sleep(delay).await;
                        }
                        _ => {
                            debug!("Max retry attempts reached for {}", operation_name);
                            last_error = Some(err);
                            break;
                        }
                    }
                }
            }
        }

        let err = last_error.unwrap_or(ForwarderError::Internal {
            message: format!("retry loop for {} produced no result", operation_name),
        });
        error!("Operation {} failed after retries: {}", operation_name, err);
        Err(err)
    }
}
