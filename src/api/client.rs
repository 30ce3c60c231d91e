use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::cache::PageKey;
use crate::config::Config;

use super::api_types::{ApiErrorBody, ApiPage};
use super::error::{ApiError, ApiResult};
use super::types::{Employee, EmployeeCreateRequest, EmployeeId, EmployeeUpdateRequest, PageWindow};

/// Typed operations against the `/employees` resource.
///
/// Implementations never retry: a failed attempt surfaces immediately.
#[async_trait]
pub trait EmployeeApi: Send + Sync {
  async fn list_page(&self, key: PageKey) -> ApiResult<PageWindow<Employee>>;

  async fn get_by_id(&self, id: EmployeeId) -> ApiResult<Employee>;

  async fn create(&self, payload: &EmployeeCreateRequest) -> ApiResult<Employee>;

  async fn update(&self, id: EmployeeId, payload: &EmployeeUpdateRequest) -> ApiResult<Employee>;

  async fn delete(&self, id: EmployeeId) -> ApiResult<()>;
}

/// Which call produced a failing response; decides how statuses map to errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  List,
  Get(EmployeeId),
  Create,
  Update(EmployeeId),
  Delete(EmployeeId),
}

impl Operation {
  fn target(&self) -> Option<EmployeeId> {
    match self {
      Operation::Get(id) | Operation::Update(id) | Operation::Delete(id) => Some(*id),
      Operation::List | Operation::Create => None,
    }
  }

  fn accepts_payload(&self) -> bool {
    matches!(self, Operation::Create | Operation::Update(_))
  }
}

/// Map a non-success response to an `ApiError`.
///
/// - 404/410 on id-addressed calls is `NotFound`
/// - 4xx with a structured body on create/update is `Validation`
/// - everything else is `Transport`
pub fn classify_failure(op: Operation, status: StatusCode, body: &str) -> ApiError {
  if let Some(id) = op.target() {
    if status == StatusCode::NOT_FOUND || status == StatusCode::GONE {
      return ApiError::NotFound(id);
    }
  }

  if op.accepts_payload() && status.is_client_error() {
    if let Some(parsed) = ApiErrorBody::parse(body) {
      return ApiError::Validation(parsed.into_failure(status.as_u16()));
    }
  }

  let detail = ApiErrorBody::parse(body)
    .and_then(|b| b.message)
    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown status").to_string());
  ApiError::Transport(format!("{} {}", status.as_u16(), detail))
}

fn join_path(base: &Url, path: &str) -> ApiResult<Url> {
  base
    .join(path)
    .map_err(|e| ApiError::Transport(format!("invalid request path {}: {}", path, e)))
}

/// HTTP implementation of `EmployeeApi` backed by reqwest
#[derive(Debug, Clone)]
pub struct HttpEmployeeClient {
  client: Client,
  base_url: Url,
}

impl HttpEmployeeClient {
  pub fn new(config: &Config) -> color_eyre::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(config.api.timeout_secs))
      .build()
      .map_err(|e| color_eyre::eyre::eyre!("Failed to build HTTP client: {}", e))?;

    Ok(Self::with_client(client, config.api.base_url()?))
  }

  /// Use an already configured reqwest client
  pub fn with_client(client: Client, base_url: Url) -> Self {
    Self { client, base_url }
  }

  fn url(&self, path: &str) -> ApiResult<Url> {
    join_path(&self.base_url, path)
  }

  fn request(&self, method: Method, path: &str) -> ApiResult<RequestBuilder> {
    Ok(self.client.request(method, self.url(path)?))
  }

  /// Send a request and hand back the response only if it succeeded
  async fn send(&self, op: Operation, request: RequestBuilder) -> ApiResult<Response> {
    let response = request.send().await?;
    let status = response.status();
    debug!(?op, status = status.as_u16(), url = %response.url(), "employee api response");

    if status.is_success() {
      return Ok(response);
    }

    // Body is best-effort; an unreadable body still yields a classified error
    let body = response.text().await.unwrap_or_default();
    Err(classify_failure(op, status, &body))
  }

  async fn json<T: DeserializeOwned>(response: Response) -> ApiResult<T> {
    response
      .json()
      .await
      .map_err(|e| ApiError::Transport(format!("failed to decode response: {}", e)))
  }
}

#[async_trait]
impl EmployeeApi for HttpEmployeeClient {
  async fn list_page(&self, key: PageKey) -> ApiResult<PageWindow<Employee>> {
    let request = self
      .request(Method::GET, "employees")?
      .query(&[("page", key.page()), ("size", key.size())]);

    let response = self.send(Operation::List, request).await?;
    let page: ApiPage<Employee> = Self::json(response).await?;

    if page.content.len() > key.size() as usize {
      return Err(ApiError::Transport(format!(
        "backend returned {} records for page size {}",
        page.content.len(),
        key.size()
      )));
    }

    Ok(page.into_window(key.page(), key.size()))
  }

  async fn get_by_id(&self, id: EmployeeId) -> ApiResult<Employee> {
    let request = self.request(Method::GET, &format!("employees/{}", id))?;
    let response = self.send(Operation::Get(id), request).await?;
    Self::json(response).await
  }

  async fn create(&self, payload: &EmployeeCreateRequest) -> ApiResult<Employee> {
    let request = self.request(Method::POST, "employees")?.json(payload);
    let response = self.send(Operation::Create, request).await?;
    Self::json(response).await
  }

  async fn update(&self, id: EmployeeId, payload: &EmployeeUpdateRequest) -> ApiResult<Employee> {
    let request = self
      .request(Method::PUT, &format!("employees/{}", id))?
      .json(payload);
    let response = self.send(Operation::Update(id), request).await?;
    Self::json(response).await
  }

  async fn delete(&self, id: EmployeeId) -> ApiResult<()> {
    let request = self.request(Method::DELETE, &format!("employees/{}", id))?;
    self.send(Operation::Delete(id), request).await?;
    Ok(())
  }
}
