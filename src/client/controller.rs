use reqwest::Method;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use super::records::{AssignmentFilter, StudentSummary};
use super::transport::{Transport, decode, decode_field};
use super::view::{CollectionView, Record};
use super::ClientError;
use crate::forms::AssignmentForm;
use crate::models::{Assignment, Student};
use crate::validation::Checked;

#[derive(Debug, Deserialize)]
struct Acknowledgement {
    #[serde(default)]
    message: Option<String>,
}

/// Runs the shared validation rules before anything is sent.
pub fn precheck(form: &impl Checked) -> Result<(), ClientError> {
    match form.report().message() {
        Some(message) => {
            warn!(message = %message, "Form rejected before sending");
            Err(ClientError::Validation(message))
        }
        None => Ok(()),
    }
}

/// Fetches one full collection, e.g. `/students` or `/students/class/3`.
pub async fn fetch_collection<R: Record>(
    transport: &impl Transport,
    path: &str,
) -> Result<Vec<R>, ClientError> {
    let reply = transport.send(Method::GET, path, None).await?;
    decode_field(reply, R::COLLECTION)
}

/// Owns the in-memory collection of one resource and keeps it in step with the server.
///
/// Every successful mutation is followed by a fresh fetch of the whole collection.
pub struct Controller<R: Record, T: Transport> {
    transport: T,
    view: CollectionView<R>,
    source: String,
}

impl<R: Record, T: Transport> Controller<R, T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            view: CollectionView::new(),
            source: R::PATH.to_string(),
        }
    }

    pub fn with_view(transport: T, view: CollectionView<R>) -> Self {
        Self {
            transport,
            view,
            source: R::PATH.to_string(),
        }
    }

    pub fn view(&self) -> &CollectionView<R> {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CollectionView<R> {
        &mut self.view
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn load(&mut self) -> Result<usize, ClientError> {
        self.source = R::PATH.to_string();
        self.reload().await
    }

    /// Loads a narrower listing such as `/class/3`; later refreshes reuse it.
    pub async fn load_from(&mut self, sub_path: &str) -> Result<usize, ClientError> {
        self.source = format!("{}{}", R::PATH, sub_path);
        self.reload().await
    }

    pub async fn reload(&mut self) -> Result<usize, ClientError> {
        let items = fetch_collection::<R>(&self.transport, &self.source)
            .await
            .inspect_err(|err| error!(error = %err, source = %self.source, "Failed to load"))?;

        info!(count = items.len(), source = %self.source, "Loaded collection");
        let count = items.len();
        self.view.replace(items);
        Ok(count)
    }

    pub async fn create(&mut self, form: &R::Form) -> Result<Option<String>, ClientError> {
        precheck(form)?;
        let message = self.mutate(Method::POST, R::PATH.to_string(), Some(form)).await?;
        self.reload().await?;
        Ok(message)
    }

    pub async fn update(
        &mut self,
        id: i64,
        form: &R::UpdateForm,
    ) -> Result<Option<String>, ClientError> {
        precheck(form)?;
        let path = format!("{}/{}", R::PATH, id);
        let message = self.mutate(Method::PUT, path, Some(form)).await?;
        self.reload().await?;
        Ok(message)
    }

    pub async fn delete(&mut self, id: i64) -> Result<Option<String>, ClientError> {
        let path = format!("{}/{}", R::PATH, id);
        let message = self.mutate::<()>(Method::DELETE, path, None).await?;
        self.reload().await?;
        Ok(message)
    }

    async fn mutate<B: Serialize>(
        &self,
        method: Method,
        path: String,
        body: Option<&B>,
    ) -> Result<Option<String>, ClientError> {
        let body = body.map(serde_json::to_value).transpose()?;
        let reply = self
            .transport
            .send(method.clone(), &path, body)
            .await
            .and_then(decode::<Acknowledgement>)
            .inspect_err(|err| error!(error = %err, %method, %path, "Request failed"))?;

        Ok(reply.message)
    }
}

impl<T: Transport> Controller<Student, T> {
    pub fn summary(&self) -> StudentSummary {
        StudentSummary::of(self.view.filtered())
    }
}

impl<T: Transport> Controller<Assignment, T> {
    /// Assigns several subjects of one class to a teacher, skipping pairs that already
    /// exist. Returns how many assignments were created.
    pub async fn assign_subjects(
        &mut self,
        teacher_id: i64,
        class_number: i64,
        subject_ids: &[i64],
    ) -> Result<usize, ClientError> {
        if subject_ids.is_empty() {
            return Err(ClientError::Validation(
                "Please select at least one subject to assign.".to_string(),
            ));
        }

        let existing = AssignmentFilter {
            teacher_id: Some(teacher_id),
            class_number: Some(class_number),
            ..AssignmentFilter::default()
        };
        let missing: Vec<i64> = subject_ids
            .iter()
            .copied()
            .filter(|subject_id| {
                !self
                    .view
                    .items()
                    .iter()
                    .any(|a| a.matches(&existing) && a.subject_id == *subject_id)
            })
            .collect();

        if missing.is_empty() {
            return Err(ClientError::Validation(
                "Teacher is already assigned to all selected subjects for this class."
                    .to_string(),
            ));
        }

        for subject_id in &missing {
            let form = AssignmentForm {
                teacher_id: Some(teacher_id.into()),
                class_number: Some(class_number.into()),
                subject_id: Some((*subject_id).into()),
            };
            precheck(&form)?;
            self.mutate(Method::POST, Assignment::PATH.to_string(), Some(&form))
                .await?;
        }

        self.reload().await?;
        Ok(missing.len())
    }
}
