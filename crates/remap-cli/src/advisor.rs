//! Advisor binding for the command line.
//!
//! The CLI does not talk to an AI service itself. The user sends the value
//! list to the service of their choice and saves the reply to a file, which
//! [`ResponseFileAdvisor`] hands back as the advisor's answer.

use std::future::Future;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use remap_map::{AdvisorContext, AdvisorError, MappingAdvisor, MappingRequest};

/// Advisor whose reply is read from a file captured earlier.
#[derive(Debug, Clone)]
pub struct ResponseFileAdvisor {
    path: PathBuf,
}

impl ResponseFileAdvisor {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MappingAdvisor for ResponseFileAdvisor {
    async fn query(
        &self,
        context: &AdvisorContext,
        request: &MappingRequest,
    ) -> Result<String, AdvisorError> {
        debug!(
            model = %context.model,
            credential = context.credential.is_some(),
            values = request.unique_values.len(),
            reply = %self.path.display(),
            "reading advisor reply"
        );
        match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => Ok(text),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(AdvisorError::Unavailable {
                reason: format!("reply file {} not found", self.path.display()),
            }),
            Err(e) => Err(AdvisorError::Transport {
                source: Box::new(e),
            }),
        }
    }
}

/// Drive an async advisor call to completion on a current-thread runtime.
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("start async runtime")?;
    Ok(runtime.block_on(future))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context() -> AdvisorContext {
        AdvisorContext {
            model: "gemini-2.5-flash".to_string(),
            credential: None,
        }
    }

    fn request() -> MappingRequest {
        MappingRequest {
            unique_values: vec!["HR".to_string()],
            goal: "expand".to_string(),
        }
    }

    #[tokio::test]
    async fn reads_reply_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("reply.txt");
        std::fs::write(&path, r#"{"mappings": []}"#).expect("write reply");

        let reply = ResponseFileAdvisor::new(&path)
            .query(&context(), &request())
            .await
            .expect("reply");
        assert_eq!(reply, r#"{"mappings": []}"#);
    }

    #[tokio::test]
    async fn missing_reply_is_unavailable() {
        let dir = tempfile::tempdir().expect("temp dir");
        let err = ResponseFileAdvisor::new(dir.path().join("absent.txt"))
            .query(&context(), &request())
            .await
            .expect_err("no file");
        assert!(matches!(err, AdvisorError::Unavailable { .. }));
    }

    #[test]
    fn block_on_runs_future() {
        assert_eq!(block_on(async { 7 }).expect("runtime"), 7);
    }
}
