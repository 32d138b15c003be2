//! 按优先级依次尝试多个服务器，第一个成功的结果即返回
//!
//! 每个服务器只尝试一次，不做单服务器重试，也不并发请求。

use crate::error::{Result, TripError};
use std::fmt::Display;
use std::future::Future;

pub async fn first_success<'a, P, T, F, Fut>(providers: &'a [P], mut attempt: F) -> Result<T>
where
    P: Display,
    F: FnMut(&'a P) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut last_error: Option<TripError> = None;

    for (idx, provider) in providers.iter().enumerate() {
        log::debug!("尝试服务器 {}/{}: {}", idx + 1, providers.len(), provider);
        match attempt(provider).await {
            Ok(value) => {
                if idx > 0 {
                    log::info!("服务器 {} 响应成功 (前 {} 个失败)", provider, idx);
                }
                return Ok(value);
            }
            Err(e) => {
                log::error!("服务器 {} 失败: {}", provider, e);
                last_error = Some(e);
            }
        }
    }

    let message = last_error
        .map(|e| e.to_string())
        .unwrap_or_else(|| "未配置任何服务器".to_string());
    Err(TripError::ServiceUnavailable(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[tokio::test]
    async fn test_first_success_stops_at_first_ok() {
        let calls = RefCell::new(Vec::new());
        let providers = ["a", "b", "c"];

        let result = first_success(&providers, |p| {
            calls.borrow_mut().push(*p);
            let outcome = if *p == "a" {
                Err(TripError::TransportFailure("HTTP 500".into()))
            } else {
                Ok(p.to_uppercase())
            };
            async move { outcome }
        })
        .await;

        assert_eq!(result.unwrap(), "B");
        assert_eq!(*calls.borrow(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_exhausted_reports_last_error() {
        let providers = ["a", "b"];
        let result: Result<()> = first_success(&providers, |p| {
            let msg = format!("{} down", p);
            async move { Err(TripError::TransportFailure(msg)) }
        })
        .await;

        match result {
            Err(TripError::ServiceUnavailable(msg)) => {
                assert!(msg.contains("b down"));
                assert!(!msg.contains("a down"));
            }
            other => panic!("unexpected: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_provider_list() {
        let providers: [&str; 0] = [];
        let result: Result<()> = first_success(&providers, |_| async { Ok(()) }).await;
        assert!(matches!(result, Err(TripError::ServiceUnavailable(_))));
    }
}
