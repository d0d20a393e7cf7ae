//! Data exposed to body templates.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::serve::{LoggedRequest, Parameters, ResponseDefinition};

/// Root of the template data.
#[derive(Debug, Serialize)]
pub(super) struct TemplateContext<'a> {
    request: RequestData<'a>,
    response: ResponseData,
    parameters: serde_json::Value,
}

/// Fields of the original inbound request.
#[derive(Debug, Serialize)]
struct RequestData<'a> {
    url: &'a str,
    path: &'a str,
    method: &'a str,
    body: String,
    headers: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
}

/// Fields of the served response.
#[derive(Debug, Serialize)]
struct ResponseData {
    status: u16,
}

impl<'a> TemplateContext<'a> {
    pub(super) fn new(
        response_view: &ResponseDefinition,
        request: &'a LoggedRequest,
        parameters: &Parameters,
    ) -> Self {
        Self {
            request: RequestData::from(request),
            response: ResponseData {
                status: response_view.status.as_u16(),
            },
            parameters: parameters.to_json(),
        }
    }
}

impl<'a> From<&'a LoggedRequest> for RequestData<'a> {
    fn from(request: &'a LoggedRequest) -> Self {
        let mut headers = BTreeMap::new();
        for (name, value) in &request.headers {
            // Non-visible-ASCII values are skipped; templates see text only
            if let Ok(text) = value.to_str() {
                headers
                    .entry(name.as_str().to_string())
                    .or_insert_with(|| text.to_string());
            }
        }

        let mut query = BTreeMap::new();
        for (key, value) in request.query_params() {
            query.entry(key).or_insert(value);
        }

        Self {
            url: &request.url,
            path: request.path(),
            method: request.method.as_str(),
            body: request.body_text(),
            headers,
            query,
        }
    }
}
