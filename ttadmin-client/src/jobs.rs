//! Job-related API endpoints

use async_trait::async_trait;
use tracing::{debug, info};
use ttadmin_core::domain::job::{JobHandle, JobKind, JobRequest, JobStatus};
use ttadmin_core::dto::job::{JobStatusResponse, SubmitJobResponse};

use crate::AdminClient;
use crate::error::{ClientError, Result};
use crate::poller::JobBackend;

impl AdminClient {
    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Start a job
    ///
    /// Posts the request as a form to the action's endpoint.
    ///
    /// # Returns
    /// The handle of the started job
    ///
    /// # Errors
    /// - `ApiError` on a non-2xx reply (no job was created)
    /// - `MissingJobId` when the reply carries no usable `id`
    ///
    /// # Example
    /// ```no_run
    /// # use ttadmin_client::AdminClient;
    /// # use ttadmin_core::domain::job::JobRequest;
    /// # async fn example() -> ttadmin_client::Result<()> {
    /// let client = AdminClient::new("http://localhost:8000");
    /// let handle = client.submit_job(&JobRequest::update_timetable()).await?;
    /// println!("started job {}", handle);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn submit_job(&self, request: &JobRequest) -> Result<JobHandle> {
        request.validate()?;

        let url = self.admin_url(request.kind().path());
        let response = self
            .authorize(self.client.post(&url), true)
            .form(&request.form_fields())
            .send()
            .await?;

        let reply: SubmitJobResponse = self.handle_response(response).await?;
        let handle = reply.id.ok_or(ClientError::MissingJobId)?;

        info!(
            "Submitted {} job {} ({})",
            request.kind().label(),
            handle,
            request.action()
        );
        Ok(handle)
    }

    /// Query the status of a job
    ///
    /// Has no side effects on the backend; calling it repeatedly for the
    /// same handle is safe.
    ///
    /// # Arguments
    /// * `kind` - Endpoint the job was submitted to
    /// * `handle` - Handle returned by [`AdminClient::submit_job`]
    pub async fn job_status(&self, kind: JobKind, handle: &JobHandle) -> Result<JobStatus> {
        let url = self.admin_url(kind.path());
        let request = self
            .client
            .get(&url)
            .query(&[("process_id", handle.as_str())]);

        // The timetable endpoint checks the token on reads too
        let response = self
            .authorize(request, kind == JobKind::UpdateTimetable)
            .send()
            .await?;

        let reply: JobStatusResponse = self.handle_response(response).await?;
        let status = JobStatus::from(reply);

        debug!("Job {} on {} is {}", handle, kind, status);
        Ok(status)
    }
}

#[async_trait]
impl JobBackend for AdminClient {
    async fn submit(&self, request: &JobRequest) -> Result<JobHandle> {
        self.submit_job(request).await
    }

    async fn status(&self, kind: JobKind, handle: &JobHandle) -> Result<JobStatus> {
        self.job_status(kind, handle).await
    }
}
