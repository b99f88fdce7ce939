//! Airtable client
//!
//! [`AirtableClient`] ties the pieces together: it builds URLs, encodes
//! uploads, drives pagination, and sends everything through a [`Transport`]
//! with the authorization headers attached.

use crate::codec::{self, UploadData, UploadEnvelope};
use crate::config::ClientConfig;
use crate::endpoint;
use crate::error::Result;
use crate::http::{
    HttpTransport, RateLimiter, RequestConfig, Session, ThrottledTransport, Timeout, Transport,
    TransportResponse,
};
use crate::ids::{self, IdKind};
use crate::pagination::{self, ListParams};
use crate::types::{JsonValue, Method, BATCH_LIMIT};
use std::sync::Arc;
use tracing::{debug, info};

/// Client for one Airtable account
///
/// Cheap to clone; clones share the transport and rate limiter.
#[derive(Clone)]
pub struct AirtableClient {
    api_root: String,
    defaults: RequestConfig,
    timeout: Timeout,
    user_agent: String,
    limiter: Option<RateLimiter>,
    transport: Arc<dyn Transport>,
}

impl AirtableClient {
    /// Create a client using a one-shot [`HttpTransport`]
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let transport =
            HttpTransport::one_shot(config.timeout()?).user_agent(config.user_agent.clone());
        Self::with_transport(config, transport)
    }

    /// Create a client that sends through `transport`
    ///
    /// The token is resolved and validated here, so a client that exists can
    /// always authenticate.
    pub fn with_transport<T>(config: &ClientConfig, transport: T) -> Result<Self>
    where
        T: Transport + 'static,
    {
        let token = config.resolve_token()?;
        let api_root = config.api_root()?;

        let defaults = RequestConfig::new()
            .header("Authorization", format!("Bearer {token}"))
            .header("Content-Type", "application/json");

        let limiter = config.rate_limit.as_ref().map(RateLimiter::new);
        let transport = throttle(transport, limiter.clone());

        Ok(Self {
            api_root,
            defaults,
            timeout: config.timeout()?,
            user_agent: config.user_agent.clone(),
            limiter,
            transport,
        })
    }

    /// Return a copy of this client that dispatches through `session`
    ///
    /// The copy keeps sharing this client's rate limiter.
    #[must_use]
    pub fn with_session(&self, session: Session) -> Self {
        let transport = HttpTransport::with_session(session, self.timeout)
            .user_agent(self.user_agent.clone());
        Self {
            transport: throttle(transport, self.limiter.clone()),
            ..self.clone()
        }
    }

    /// Versioned API root, e.g. `https://api.airtable.com/v0`
    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// The transport requests go through
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// URL of a table, or of one record in it
    pub fn construct_url(
        &self,
        base_id: &str,
        table_id: &str,
        record_id: Option<&str>,
    ) -> Result<String> {
        endpoint::build_url(&self.api_root, base_id, table_id, record_id)
    }

    /// Fetch a single page of a table, or a single record
    pub async fn fetch(&self, url: &str, params: &ListParams) -> Result<TransportResponse> {
        let mut config = self.defaults.clone();
        config.query.extend(params.to_query(None));
        self.transport.get(url, config).await
    }

    /// Fetch every record of a table, following pagination to the end
    ///
    /// One session is opened for the whole listing when the transport supports
    /// it. Any failure discards the records gathered so far.
    pub async fn get(&self, url: &str, params: &ListParams) -> Result<Vec<JsonValue>> {
        let session = self.transport.open_session()?;
        let records = match &session {
            Some(session) => {
                pagination::list_all(&**session, url, params, &self.defaults).await?
            }
            None => {
                pagination::list_all(&*self.transport, url, params, &self.defaults).await?
            }
        };

        info!("Fetched {} record(s) from {}", records.len(), url);
        Ok(records)
    }

    /// Create records
    ///
    /// Tabular data is split into batches and sent as one POST per batch, in
    /// order. Serialized and prebuilt envelopes are sent as they are. Stops at
    /// the first failed request; earlier batches stay created.
    pub async fn push(
        &self,
        url: &str,
        data: impl Into<UploadData>,
        typecast: bool,
    ) -> Result<Vec<TransportResponse>> {
        let envelopes = match data.into() {
            UploadData::Tabular(input) => codec::encode(&input, typecast)?,
            other => vec![codec::decode_existing(&other, typecast)?],
        };

        let mut responses = Vec::with_capacity(envelopes.len());
        for (i, envelope) in envelopes.iter().enumerate() {
            let config = self.defaults.clone().json(envelope.to_json()?);
            let response = self.transport.post(url, config).await?;
            debug!(
                "Batch {}/{}: {} record(s) -> {}",
                i + 1,
                envelopes.len(),
                envelope.len(),
                response.status_code()
            );
            responses.push(response);
        }

        info!("Pushed {} batch(es) to {}", responses.len(), url);
        Ok(responses)
    }

    /// Partially update existing records (PATCH)
    ///
    /// When `record_id` is given it is set on the first record of the
    /// envelope.
    pub async fn update(
        &self,
        url: &str,
        data: impl Into<UploadData>,
        record_id: Option<&str>,
        typecast: bool,
    ) -> Result<TransportResponse> {
        let envelope = prepare_existing(data.into(), record_id, typecast)?;
        self.send_envelope(Method::PATCH, url, &envelope).await
    }

    /// Overwrite existing records (PUT)
    ///
    /// Fields absent from the envelope are cleared by the API.
    pub async fn replace(
        &self,
        url: &str,
        data: impl Into<UploadData>,
        record_id: Option<&str>,
        typecast: bool,
    ) -> Result<TransportResponse> {
        let envelope = prepare_existing(data.into(), record_id, typecast)?;
        self.send_envelope(Method::PUT, url, &envelope).await
    }

    /// Delete a record
    ///
    /// With `record_id`, the ID is appended to `url`; without it, `url` must
    /// already address a record.
    pub async fn delete(&self, url: &str, record_id: Option<&str>) -> Result<TransportResponse> {
        let url = match record_id {
            Some(record_id) => endpoint::record_url(url, record_id)?,
            None => url.to_string(),
        };
        self.transport.delete(&url, self.defaults.clone()).await
    }

    /// Delete many records from a table, one request per batch
    ///
    /// Every ID is validated before anything is sent.
    pub async fn delete_batch<S: AsRef<str>>(
        &self,
        url: &str,
        record_ids: &[S],
    ) -> Result<Vec<TransportResponse>> {
        for id in record_ids {
            ids::validate(id.as_ref(), IdKind::RecordId)?;
        }

        let mut responses = Vec::new();
        for chunk in record_ids.chunks(BATCH_LIMIT) {
            let chunk: Vec<&str> = chunk.iter().map(|id| id.as_ref()).collect();
            let config = self.defaults.clone().query_all("records", chunk);
            responses.push(self.transport.delete(url, config).await?);
        }

        info!(
            "Deleted {} record(s) from {} in {} request(s)",
            record_ids.len(),
            url,
            responses.len()
        );
        Ok(responses)
    }

    async fn send_envelope(
        &self,
        method: Method,
        url: &str,
        envelope: &UploadEnvelope,
    ) -> Result<TransportResponse> {
        let config = self.defaults.clone().json(envelope.to_json()?);
        self.transport.send(method, url, config).await
    }
}

impl std::fmt::Debug for AirtableClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AirtableClient")
            .field("api_root", &self.api_root)
            .field("token", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("rate_limited", &self.limiter.is_some())
            .finish()
    }
}

fn throttle<T>(transport: T, limiter: Option<RateLimiter>) -> Arc<dyn Transport>
where
    T: Transport + 'static,
{
    match limiter {
        Some(limiter) => Arc::new(ThrottledTransport::with_limiter(transport, limiter)),
        None => Arc::new(transport),
    }
}

fn prepare_existing(
    data: UploadData,
    record_id: Option<&str>,
    typecast: bool,
) -> Result<UploadEnvelope> {
    let mut envelope = codec::decode_existing(&data, typecast)?;
    if let Some(record_id) = record_id {
        codec::inject_record_id(&mut envelope, record_id, 0)?;
    }
    Ok(envelope)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::http::RateLimiterConfig;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    const KEY: &str = "keyXXXXXXXXXXXXXX";
    const BASE: &str = "appXXXXXXXXXXXXXX";
    const RECORD: &str = "recXXXXXXXXXXXXXX";

    /// Answers every request with `{"records": []}` and records what was sent
    #[derive(Default)]
    struct RecordingTransport {
        calls: Mutex<Vec<(Method, String, RequestConfig)>>,
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn send(
            &self,
            method: Method,
            url: &str,
            config: RequestConfig,
        ) -> Result<TransportResponse> {
            self.calls
                .lock()
                .unwrap()
                .push((method, url.to_string(), config));
            Ok(TransportResponse::new(200, r#"{"records": []}"#))
        }
    }

    fn config() -> ClientConfig {
        ClientConfig::builder()
            .token(KEY)
            .token_env_var("AIRTABLE_CLIENT_TEST_UNSET_TOKEN")
            .build()
    }

    fn client() -> (AirtableClient, Arc<RecordingTransport>) {
        let transport = Arc::new(RecordingTransport::default());
        let client = AirtableClient::with_transport(&config(), transport.clone()).unwrap();
        (client, transport)
    }

    #[test]
    fn test_construct_url() {
        let (client, _) = client();
        assert_eq!(
            client.construct_url(BASE, "Table", None).unwrap(),
            "https://api.airtable.com/v0/appXXXXXXXXXXXXXX/Table"
        );
        assert_eq!(
            client.construct_url(BASE, "Table", Some(RECORD)).unwrap(),
            "https://api.airtable.com/v0/appXXXXXXXXXXXXXX/Table/recXXXXXXXXXXXXXX"
        );
        assert!(client.construct_url("appShort", "Table", None).is_err());
    }

    #[test]
    fn test_new_requires_token() {
        let config = ClientConfig::builder()
            .token_env_var("AIRTABLE_CLIENT_TEST_UNSET_TOKEN")
            .build();
        assert!(matches!(
            AirtableClient::new(&config),
            Err(Error::MissingConfigField { .. })
        ));
    }

    #[test]
    fn test_debug_redacts_token() {
        let (client, _) = client();
        let debug = format!("{client:?}");
        assert!(!debug.contains(KEY));
        assert!(debug.contains("https://api.airtable.com/v0"));
    }

    #[tokio::test]
    async fn test_requests_carry_auth_headers() {
        let (client, transport) = client();
        let url = client.construct_url(BASE, "Table", None).unwrap();
        client.fetch(&url, &ListParams::new()).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        let (method, _, config) = &calls[0];
        assert_eq!(*method, Method::GET);
        assert_eq!(
            config.headers.get("Authorization").map(String::as_str),
            Some("Bearer keyXXXXXXXXXXXXXX")
        );
        assert_eq!(
            config.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_update_injects_record_id() {
        let (client, transport) = client();
        let row = json!({"Name": "Ada"}).as_object().cloned().unwrap();

        client.update("u", row, Some(RECORD), true).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        let (method, _, config) = &calls[0];
        assert_eq!(*method, Method::PATCH);
        assert_eq!(
            config.body,
            Some(json!({
                "records": [{"id": RECORD, "fields": {"Name": "Ada"}}],
                "typecast": true
            }))
        );
    }

    #[tokio::test]
    async fn test_replace_uses_put_and_keeps_serialized_envelope() {
        let (client, transport) = client();
        let raw = r#"{"records": [{"fields": {"Name": "Ada"}}], "typecast": false}"#;

        client.replace("u", raw, None, true).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        let (method, _, config) = &calls[0];
        assert_eq!(*method, Method::PUT);
        assert_eq!(
            config.body,
            Some(json!({"records": [{"fields": {"Name": "Ada"}}], "typecast": false}))
        );
    }

    #[tokio::test]
    async fn test_serialized_envelope_sent_as_given() {
        let (client, transport) = client();
        let document = json!({
            "records": [{"fields": {"Name": "Ada"}}],
            "performUpsert": {"fieldsToMergeOn": ["Name"]}
        });
        let raw = document.to_string();

        client.push("u", raw.as_str(), true).await.unwrap();
        client.update("u", raw.as_str(), None, true).await.unwrap();
        client.replace("u", raw, Some(RECORD), true).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].2.body.as_ref(), Some(&document));
        assert_eq!(calls[1].2.body.as_ref(), Some(&document));

        let mut expected = document.clone();
        expected["records"][0]["id"] = json!(RECORD);
        assert_eq!(calls[2].2.body.as_ref(), Some(&expected));
    }

    #[tokio::test]
    async fn test_update_rejects_bad_data_without_sending() {
        let (client, transport) = client();

        let err = client
            .update("u", "not json", Some(RECORD), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedDataFormat { .. }));

        let row = json!({"Name": "Ada"}).as_object().cloned().unwrap();
        let err = client
            .update("u", row, Some("recShort"), true)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));

        assert!(transport.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_push_sends_one_post_per_batch() {
        let (client, transport) = client();
        let rows: Vec<_> = (0..25)
            .map(|i| json!({"n": i}).as_object().cloned().unwrap())
            .collect();

        let responses = client.push("u", rows, false).await.unwrap();
        assert_eq!(responses.len(), 3);

        let calls = transport.calls.lock().unwrap();
        let sizes: Vec<usize> = calls
            .iter()
            .map(|(method, _, config)| {
                assert_eq!(*method, Method::POST);
                config.body.as_ref().unwrap()["records"]
                    .as_array()
                    .unwrap()
                    .len()
            })
            .collect();
        assert_eq!(sizes, vec![10, 10, 5]);
        assert_eq!(calls[2].2.body.as_ref().unwrap()["records"][0]["fields"]["n"], 20);
    }

    #[tokio::test]
    async fn test_delete_appends_record_id() {
        let (client, transport) = client();
        client.delete("https://h/v0/app/T/", Some(RECORD)).await.unwrap();
        client.delete("https://h/v0/app/T/rec1", None).await.unwrap();

        let calls = transport.calls.lock().unwrap();
        assert_eq!(calls[0].0, Method::DELETE);
        assert_eq!(calls[0].1, format!("https://h/v0/app/T/{RECORD}"));
        assert_eq!(calls[1].1, "https://h/v0/app/T/rec1");
    }

    #[tokio::test]
    async fn test_delete_batch_chunks_and_validates() {
        let (client, transport) = client();
        let ids: Vec<String> = (0..12).map(|i| format!("rec{i:014}")).collect();

        let responses = client.delete_batch("u", &ids).await.unwrap();
        assert_eq!(responses.len(), 2);
        {
            let calls = transport.calls.lock().unwrap();
            assert_eq!(calls[0].2.query_values("records").len(), 10);
            assert_eq!(
                calls[1].2.query_values("records"),
                vec![ids[10].as_str(), ids[11].as_str()]
            );
        }

        let err = client
            .delete_batch("u", &[RECORD, "appXXXXXXXXXXXXXX"])
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidIdentifier { .. }));
        assert_eq!(transport.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_rate_limited_client_still_sends() {
        let transport = Arc::new(RecordingTransport::default());
        let config = ClientConfig::builder()
            .token(KEY)
            .rate_limit(RateLimiterConfig::new(100, 10))
            .build();
        let client = AirtableClient::with_transport(&config, transport.clone()).unwrap();

        client.get("u", &ListParams::new()).await.unwrap();
        assert_eq!(transport.calls.lock().unwrap().len(), 1);
        assert!(format!("{client:?}").contains("rate_limited: true"));
    }
}
