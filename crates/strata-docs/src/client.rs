use http::{Method, Response, StatusCode};
use serde_json::{Map, Value, json};

use strata_client::{ApiContext, Envelope, Transport};

use crate::error::DocError;

/// Verb preference for multi-key writes: the semantically correct
/// partial-update verb first, then the fallbacks some deployments expose
/// instead. Order matters and is asserted in tests.
pub const WRITE_VERBS: [Method; 3] = [Method::PATCH, Method::PUT, Method::POST];

/// Terminal state of one verb attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptState {
    Acknowledged,
    Rejected,
    MethodUnsupported,
}

#[derive(Debug, Clone)]
pub struct Attempt {
    pub verb: Method,
    pub state: AttemptState,
    pub message: Option<String>,
}

/// Result of a negotiated write: the stored document as the server returned
/// it, the verb that succeeded, and the full attempt trail for diagnostics.
#[derive(Debug, Clone)]
pub struct WriteReceipt {
    pub data: Value,
    pub verb: Method,
    pub attempts: Vec<Attempt>,
}

/// Client for the JSON-column document service. All writes are
/// merge/replace-at-path operations, so repeating a call yields the same
/// stored state.
pub struct DocumentClient<T: Transport> {
    transport: T,
    ctx: ApiContext,
}

impl<T: Transport> DocumentClient<T> {
    pub fn new(transport: T, ctx: ApiContext) -> Self {
        Self { transport, ctx }
    }

    pub fn context(&self) -> &ApiContext {
        &self.ctx
    }

    fn column_path(entity: &str, id: &str, column: &str) -> String {
        format!("/json/{entity}/{id}/{column}")
    }

    fn dispatch(
        &self,
        method: Method,
        path: &str,
        params: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Response<Vec<u8>>, DocError> {
        let req = self.ctx.request(method, path, params, body)?;
        Ok(self.transport.send(req)?)
    }

    /// Unwrap a single (non-negotiated) response.
    fn expect_data(res: Response<Vec<u8>>) -> Result<Value, DocError> {
        let status = res.status();
        let envelope =
            Envelope::parse(res.body()).map_err(|e| DocError::Envelope(e.to_string()))?;
        match envelope.into_data() {
            Ok(data) if status.is_success() => Ok(data),
            Ok(_) => Err(DocError::Service {
                status,
                message: "unexpected status with ok envelope".to_string(),
            }),
            Err(message) => Err(DocError::Service { status, message }),
        }
    }

    // ── Reads ───────────────────────────────────────────────────

    /// Whole JSON column for one record.
    pub fn read(&self, entity: &str, id: &str, column: &str) -> Result<Value, DocError> {
        let res = self.dispatch(
            Method::GET,
            &Self::column_path(entity, id, column),
            &[],
            None,
        )?;
        Self::expect_data(res)
    }

    /// One key out of the JSON column.
    pub fn read_key(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        key: &str,
    ) -> Result<Value, DocError> {
        let res = self.dispatch(
            Method::GET,
            &Self::column_path(entity, id, column),
            &[("path", key)],
            None,
        )?;
        Self::expect_data(res)
    }

    // ── Writes ──────────────────────────────────────────────────

    /// Set a single key. The server validates the value against the live
    /// schema when `validate` is on.
    pub fn write_one(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        key: &str,
        value: Value,
        validate: bool,
    ) -> Result<Value, DocError> {
        let res = self.dispatch(
            Method::PATCH,
            &Self::column_path(entity, id, column),
            &[("validate", bool_str(validate))],
            Some(&json!({ "path": key, "value": value })),
        )?;
        Self::expect_data(res)
    }

    /// Merge-patch several keys at once, negotiating the HTTP verb. Keys not
    /// present in `values` are left untouched server-side. A 405 moves on to
    /// the next verb; any other failure is recorded and the next verb is
    /// still tried; when every verb fails the last failure is surfaced along
    /// with the attempted verbs.
    pub fn write_many(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        values: &Map<String, Value>,
        validate: bool,
    ) -> Result<WriteReceipt, DocError> {
        let path = Self::column_path(entity, id, column);
        let body = json!({ "value": values });
        let params = [("validate", bool_str(validate))];

        let mut attempts: Vec<Attempt> = Vec::with_capacity(WRITE_VERBS.len());
        let mut last_message = String::new();

        for verb in WRITE_VERBS {
            let outcome = self.dispatch(verb.clone(), &path, &params, Some(&body));
            let res = match outcome {
                Ok(res) => res,
                Err(e) => {
                    // Request never completed; record it and try the next verb.
                    last_message = e.to_string();
                    attempts.push(Attempt {
                        verb,
                        state: AttemptState::Rejected,
                        message: Some(last_message.clone()),
                    });
                    continue;
                }
            };

            if res.status() == StatusCode::METHOD_NOT_ALLOWED {
                tracing::debug!(entity, column, verb = %verb, "verb not allowed, falling back");
                last_message = format!("{verb} not allowed");
                attempts.push(Attempt {
                    verb,
                    state: AttemptState::MethodUnsupported,
                    message: None,
                });
                continue;
            }

            match Self::expect_data(res) {
                Ok(data) => {
                    attempts.push(Attempt {
                        verb: verb.clone(),
                        state: AttemptState::Acknowledged,
                        message: None,
                    });
                    return Ok(WriteReceipt {
                        data,
                        verb,
                        attempts,
                    });
                }
                Err(e) => {
                    last_message = e.to_string();
                    attempts.push(Attempt {
                        verb,
                        state: AttemptState::Rejected,
                        message: Some(last_message.clone()),
                    });
                }
            }
        }

        tracing::warn!(entity, column, "all write verbs exhausted");
        Err(DocError::VerbsExhausted {
            attempted: attempts.iter().map(|a| a.verb.clone()).collect(),
            message: last_message,
        })
    }

    /// Remove one key from the stored document.
    pub fn delete_key(
        &self,
        entity: &str,
        id: &str,
        column: &str,
        key: &str,
    ) -> Result<Value, DocError> {
        let res = self.dispatch(
            Method::DELETE,
            &Self::column_path(entity, id, column),
            &[("path", key)],
            None,
        )?;
        Self::expect_data(res)
    }

    // ── Base records ────────────────────────────────────────────

    /// Create the entity's base record from its fixed-field payload; returns
    /// the created document, id included.
    pub fn create_record(
        &self,
        entity: &str,
        payload: &Map<String, Value>,
    ) -> Result<Value, DocError> {
        let res = self.dispatch(
            Method::POST,
            &format!("/{entity}/"),
            &[],
            Some(&Value::Object(payload.clone())),
        )?;
        Self::expect_data(res)
    }
}

fn bool_str(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
