//! HTTP client for the job board's job store
//!
//! Talks to the REST API that owns job postings: `POST /jobs` to create and
//! `DELETE /jobs/{id}` to remove.

use super::error::{check_status, ServiceError, JOB_STORE};
use super::traits::JobStore;
use crate::job::{Job, JobId, JobRequest};
use async_trait::async_trait;
use serde::Deserialize;

/// Only the id is read back; the rest of the record is what we sent
#[derive(Debug, Deserialize)]
struct CreatedJob {
    id: JobId,
}

/// Client for the job store REST API
#[derive(Debug, Clone)]
pub struct HttpJobStore {
    client: reqwest::Client,
    /// Base URL, without trailing slash
    base_url: String,
    token: Option<String>,
}

impl HttpJobStore {
    pub fn new(client: reqwest::Client, base_url: &str, token: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn jobs_url(&self) -> String {
        format!("{}/jobs", self.base_url)
    }

    fn job_url(&self, job_id: &JobId) -> String {
        format!("{}/jobs/{}", self.base_url, job_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

#[async_trait]
impl JobStore for HttpJobStore {
    async fn create(&self, job: &JobRequest) -> Result<Job, ServiceError> {
        let response = self
            .authorize(self.client.post(self.jobs_url()))
            .json(job)
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(JOB_STORE, e))?;

        let response = check_status(JOB_STORE, response).await?;
        let created = response
            .json::<CreatedJob>()
            .await
            .map_err(|e| ServiceError::Decode {
                service: JOB_STORE,
                message: e.to_string(),
            })?;

        Ok(Job {
            id: created.id,
            details: job.clone(),
        })
    }

    async fn delete(&self, job_id: &JobId) -> Result<(), ServiceError> {
        let response = self
            .authorize(self.client.delete(self.job_url(job_id)))
            .send()
            .await
            .map_err(|e| ServiceError::from_reqwest(JOB_STORE, e))?;

        check_status(JOB_STORE, response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::job::tests::sample_job;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Serve one HTTP exchange with a canned reply; yields the request line
    async fn serve_once(
        status: &'static str,
        body: &'static str,
    ) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        let (seen_tx, seen_rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut chunk = [0u8; 4096];
            loop {
                let read = socket.read(&mut chunk).await.unwrap();
                if read == 0 {
                    break;
                }
                request.extend_from_slice(&chunk[..read]);
                if request_complete(&request) {
                    break;
                }
            }

            let text = String::from_utf8_lossy(&request);
            let _ = seen_tx.send(text.lines().next().unwrap_or_default().to_string());

            let reply = format!(
                "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                body.len()
            );
            socket.write_all(reply.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
        });

        (address, seen_rx)
    }

    fn request_complete(request: &[u8]) -> bool {
        let text = String::from_utf8_lossy(request);
        let Some(header_end) = text.find("\r\n\r\n") else {
            return false;
        };
        let length = text[..header_end]
            .lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse::<usize>().ok())
            .unwrap_or(0);
        request.len() >= header_end + 4 + length
    }

    #[tokio::test]
    async fn test_create_reads_only_the_id() {
        let (address, seen) = serve_once("201 Created", r#"{"id":"job-7"}"#).await;
        let store = HttpJobStore::new(reqwest::Client::new(), &address, None);

        let job = store.create(&sample_job()).await.unwrap();

        assert_eq!(job.id, JobId::from("job-7"));
        assert_eq!(job.details, sample_job());
        assert_eq!(seen.await.unwrap(), "POST /jobs HTTP/1.1");
    }

    #[tokio::test]
    async fn test_create_without_id_is_decode_error() {
        let (address, _seen) = serve_once("201 Created", r#"{"ok":true}"#).await;
        let store = HttpJobStore::new(reqwest::Client::new(), &address, None);

        let err = store.create(&sample_job()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Decode { service: JOB_STORE, .. }));
    }

    #[tokio::test]
    async fn test_delete_rejection_keeps_status() {
        let (address, seen) = serve_once("404 Not Found", r#"{"error":"missing"}"#).await;
        let store = HttpJobStore::new(reqwest::Client::new(), &address, None);

        let err = store.delete(&JobId::from("job-7")).await.unwrap_err();
        assert_eq!(
            err,
            ServiceError::Rejected {
                service: JOB_STORE,
                status: 404,
                body: r#"{"error":"missing"}"#.to_string(),
            }
        );
        assert_eq!(seen.await.unwrap(), "DELETE /jobs/job-7 HTTP/1.1");
    }

    #[test]
    fn test_urls_strip_trailing_slash() {
        let store = HttpJobStore::new(reqwest::Client::new(), "http://localhost:3000/", None);
        assert_eq!(store.jobs_url(), "http://localhost:3000/jobs");
        assert_eq!(
            store.job_url(&JobId::from("abc123")),
            "http://localhost:3000/jobs/abc123"
        );
    }
}
