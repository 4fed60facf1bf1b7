use reqwest::{header::CONTENT_TYPE, Client, Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

pub(crate) struct BaseClient {
    address: String,
    api_key: Option<String>,
    user_token: Option<String>,
}

#[derive(Debug)]
pub enum APIError {
    Network,
    MalformedResponse,
    UnexpectedStatusCode(StatusCode),
}
pub type APIResponse<T> = Result<T, APIError>;

impl BaseClient {
    pub fn new(address: String) -> Self {
        Self {
            address,
            api_key: None,
            user_token: None,
        }
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_user_token(&mut self, token: String) {
        self.user_token = Some(token);
    }

    fn get_client(&self, method: Method, path: String) -> RequestBuilder {
        let url = format!("{}/api/v1/{}", self.address, path);
        let mut builder = Client::new().request(method, &url);

        if let Some(api_key) = &self.api_key {
            builder = builder.header("x-api-key", api_key.clone());
        }
        if let Some(token) = &self.user_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }

    fn check_status_code(
        &self,
        res: &Response,
        expected_status_code: StatusCode,
    ) -> Result<(), APIError> {
        let status = res.status();
        if status != expected_status_code {
            return Err(APIError::UnexpectedStatusCode(status));
        }
        Ok(())
    }

    async fn handle_api_response<T: for<'de> Deserialize<'de>>(
        &self,
        res: Result<Response, reqwest::Error>,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = res.map_err(|_| APIError::Network)?;
        self.check_status_code(&res, expected_status_code)?;
        res.json::<T>()
            .await
            .map_err(|_| APIError::MalformedResponse)
    }

    pub async fn get<T: for<'de> Deserialize<'de>>(
        &self,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self.get_client(Method::GET, path).send().await;
        self.handle_api_response(res, expected_status_code).await
    }

    pub async fn post<T: for<'de> Deserialize<'de>, S: Serialize>(
        &self,
        body: S,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self.get_client(Method::POST, path).json(&body).send().await;
        self.handle_api_response(res, expected_status_code).await
    }

    /// Posts a raw payload with the given content type
    pub async fn post_bytes<T: for<'de> Deserialize<'de>>(
        &self,
        body: Vec<u8>,
        content_type: &str,
        path: String,
        expected_status_code: StatusCode,
    ) -> APIResponse<T> {
        let res = self
            .get_client(Method::POST, path)
            .header(CONTENT_TYPE, content_type)
            .body(body)
            .send()
            .await;
        self.handle_api_response(res, expected_status_code).await
    }
}
