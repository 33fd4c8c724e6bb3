//! The dispatch client: job construction and the call shapes over it.

use std::path::Path;

use serde_json::{Map, Value};
use tokio_stream::StreamExt;
use tracing::{info, warn};

use hostrun_core::{BaseConfig, ConfigSource, JobId, JobSpec, ReturnSet, TargetSelection};

use crate::args::condition_input;
use crate::engine::{ExecutionEngine, ReturnStream};
use crate::error::ClientError;
use crate::request::CommandRequest;
use crate::sanitize::sanitize_overrides;

/// Descriptor-map fields that describe the call shape rather than
/// configuration overrides.
const CALL_FIELDS: [&str; 7] = ["tgt", "fun", "arg", "timeout", "expr_form", "kwarg", "jid"];

/// Client for dispatching commands to remote hosts through an execution
/// engine.
///
/// Holds the base configuration loaded at construction and an engine
/// implementation. The configuration is never mutated after construction:
/// every job works on its own deep copy, so one client may serve concurrent
/// calls.
#[derive(Debug)]
pub struct SshClient<E> {
    config: BaseConfig,
    engine: E,
}

impl<E: ExecutionEngine> SshClient<E> {
    /// Create a client from an already-parsed configuration.
    pub fn new(config: BaseConfig, engine: E) -> Self {
        Self { config, engine }
    }

    /// Create a client by loading configuration from `path` via `source`.
    ///
    /// `disable_custom_roster` must be set by API-facing callers so that
    /// override maps cannot point jobs at a caller-controlled roster.
    pub fn from_source(
        source: &impl ConfigSource,
        path: &Path,
        engine: E,
        disable_custom_roster: bool,
    ) -> Result<Self, ClientError> {
        if path.is_dir() {
            warn!(
                path = %path.display(),
                "Configuration path is a directory, expected a file"
            );
        }
        let settings = source.load(path)?;
        let config = BaseConfig::new(settings).with_custom_roster_disabled(disable_custom_roster);
        Ok(Self::new(config, engine))
    }

    /// The base configuration this client was constructed with.
    pub fn config(&self) -> &BaseConfig {
        &self.config
    }

    /// Build the job descriptor for one call and bind it to the engine.
    ///
    /// Overrides are sanitized, the base configuration is deep-copied, and
    /// the sanitized entries are laid over the copy with later keys winning.
    /// A non-zero timeout replaces the configured one. This never fails:
    /// a request whose overrides are entirely invalid still dispatches on
    /// base configuration alone.
    pub fn prepare(&self, request: &CommandRequest) -> PreparedJob<'_, E> {
        let sane = sanitize_overrides(&request.overrides);

        let mut opts = self.config.job_opts();
        opts.extend(sane);
        if let Some(timeout) = request.timeout_secs.filter(|t| *t > 0) {
            opts.insert("timeout".to_owned(), Value::from(timeout));
        }

        let mut argv = vec![Value::String(request.function.clone())];
        argv.extend(condition_input(&request.args, &request.kwargs));

        let spec = JobSpec {
            jid: request.jid.clone(),
            target: request.target.clone(),
            selection: request.selection,
            function: request.function.clone(),
            argv,
            opts,
        };
        PreparedJob {
            engine: &self.engine,
            spec,
        }
    }

    /// Dispatch a command and stream per-target returns as they arrive.
    ///
    /// The stream is finite and single-pass; call again to rebuild a fresh
    /// job. Engine failures surface through the stream unchanged.
    pub async fn run_iter(&self, request: &CommandRequest) -> Result<ReturnStream, ClientError> {
        if request.function.is_empty() {
            return Err(ClientError::InvalidInput(
                "function name must not be empty".to_owned(),
            ));
        }
        let job = self.prepare(request);
        info!(
            target = %job.spec.target,
            function = %job.spec.function,
            "Dispatching command"
        );
        job.stream().await
    }

    /// Dispatch a command and collect all per-target returns at once.
    ///
    /// Blocks until the engine's sequence is exhausted. Records are folded
    /// by shallow merge, so a duplicate target id keeps the later record.
    /// Callers that want partial results as they arrive should use
    /// [`SshClient::run_iter`] instead.
    pub async fn run(&self, request: &CommandRequest) -> Result<ReturnSet, ClientError> {
        let mut stream = self.run_iter(request).await?;
        let mut collected = ReturnSet::new();
        while let Some(record) = stream.next().await {
            collected.extend(record?);
        }
        Ok(collected)
    }

    /// Dispatch from one flattened descriptor map.
    ///
    /// The map mixes call-shape fields with override keys; the known call
    /// fields are stripped out and everything that remains is treated as the
    /// override map for [`SshClient::run`].
    ///
    /// WARNING: caller authorization is **NOT** enforced here. Anything with
    /// access to this entry point dispatches with the client's full
    /// configuration; enforce authorization before invoking it.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let returns = client
    ///     .run_from_map(&serde_json::from_value(serde_json::json!({
    ///         "tgt": "silver",
    ///         "fun": "test.ping",
    ///         "ssh_user": "root",
    ///     }))?)
    ///     .await?;
    /// // {"silver": {"return": true, "retcode": 0, "success": true, ...}}
    /// ```
    pub async fn run_from_map(&self, low: &Map<String, Value>) -> Result<ReturnSet, ClientError> {
        let request = request_from_map(low)?;
        self.run(&request).await
    }

    /// Asynchronous dispatch is declared but not implemented.
    ///
    /// Always fails with [`ClientError::AsyncUnsupported`]; it never
    /// fabricates a result mapping.
    pub async fn run_async(
        &self,
        _low: &Map<String, Value>,
        _timeout_secs: Option<u64>,
    ) -> Result<ReturnSet, ClientError> {
        Err(ClientError::AsyncUnsupported)
    }
}

/// A job descriptor bound to its engine, ready to run exactly once.
pub struct PreparedJob<'c, E> {
    engine: &'c E,
    spec: JobSpec,
}

impl<'c, E: ExecutionEngine> PreparedJob<'c, E> {
    /// The descriptor this job will hand to the engine.
    pub fn spec(&self) -> &JobSpec {
        &self.spec
    }

    /// Consume the job and start the engine's return sequence.
    pub async fn stream(self) -> Result<ReturnStream, ClientError> {
        Ok(self.engine.run_iter(self.spec).await?)
    }
}

/// Split a flattened descriptor map into typed call parameters and the
/// residual override map.
fn request_from_map(low: &Map<String, Value>) -> Result<CommandRequest, ClientError> {
    let target = require_str(low, "tgt")?;
    let function = require_str(low, "fun")?;

    let args = match low.get("arg") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.clone(),
        Some(_) => {
            return Err(ClientError::InvalidInput(
                "'arg' must be an array".to_owned(),
            ))
        }
    };
    let kwargs = match low.get("kwarg") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(map)) => map.clone(),
        Some(_) => {
            return Err(ClientError::InvalidInput(
                "'kwarg' must be an object".to_owned(),
            ))
        }
    };
    let timeout_secs = match low.get("timeout") {
        None | Some(Value::Null) => None,
        Some(value) => Some(value.as_u64().ok_or_else(|| {
            ClientError::InvalidInput("'timeout' must be a non-negative integer".to_owned())
        })?),
    };
    let selection = match low.get("expr_form") {
        None | Some(Value::Null) => TargetSelection::default(),
        Some(Value::String(s)) => s.parse()?,
        Some(_) => {
            return Err(ClientError::InvalidInput(
                "'expr_form' must be a string".to_owned(),
            ))
        }
    };
    let jid = match low.get("jid") {
        Some(Value::String(s)) => Some(JobId::new(s.clone())),
        _ => None,
    };

    let overrides: Map<String, Value> = low
        .iter()
        .filter(|(key, _)| !CALL_FIELDS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Ok(CommandRequest {
        target,
        function,
        args,
        kwargs,
        timeout_secs,
        selection,
        overrides,
        jid,
    })
}

fn require_str(low: &Map<String, Value>, field: &'static str) -> Result<String, ClientError> {
    match low.get(field) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(ClientError::InvalidInput(format!(
            "'{field}' must be a string"
        ))),
        None => Err(ClientError::MissingField(field)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    use crate::engine::EngineError;
    use hostrun_core::config::DISABLE_CUSTOM_ROSTER_KEY;
    use hostrun_core::CoreError;

    /// Engine double: records every job it receives and replays a scripted
    /// sequence of return batches, optionally ending in a failure.
    struct MockEngine {
        batches: Vec<ReturnSet>,
        fail_with: Option<String>,
        seen: Mutex<Vec<JobSpec>>,
    }

    impl MockEngine {
        fn new(batches: Vec<ReturnSet>) -> Self {
            Self {
                batches,
                fail_with: None,
                seen: Mutex::new(Vec::new()),
            }
        }

        fn failing_after(batches: Vec<ReturnSet>, message: &str) -> Self {
            Self {
                fail_with: Some(message.to_owned()),
                ..Self::new(batches)
            }
        }

        fn seen_specs(&self) -> Vec<JobSpec> {
            self.seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExecutionEngine for MockEngine {
        async fn run_iter(&self, job: JobSpec) -> Result<ReturnStream, EngineError> {
            self.seen.lock().unwrap().push(job);
            let mut items: Vec<Result<ReturnSet, EngineError>> =
                self.batches.iter().cloned().map(Ok).collect();
            if let Some(message) = &self.fail_with {
                items.push(Err(EngineError::Execution(message.clone())));
            }
            Ok(Box::pin(tokio_stream::iter(items)))
        }
    }

    fn record(host: &str, value: Value) -> ReturnSet {
        let mut set = ReturnSet::new();
        set.insert(
            host.to_owned(),
            json!({"return": value, "retcode": 0, "success": true}),
        );
        set
    }

    fn base_config() -> BaseConfig {
        let mut settings = Map::new();
        settings.insert("timeout".into(), json!(5));
        settings.insert("ssh_user".into(), json!("deploy"));
        settings.insert(
            "file_roots".into(),
            json!({"base": ["/srv/hostrun", "/srv/spm"]}),
        );
        BaseConfig::new(settings).with_custom_roster_disabled(true)
    }

    fn client(engine: MockEngine) -> SshClient<MockEngine> {
        SshClient::new(base_config(), engine)
    }

    #[test]
    fn test_prepare_merges_overrides_and_call_fields() {
        let client = client(MockEngine::new(vec![]));
        let request = CommandRequest::new("web*", "cmd.run")
            .with_args(vec![json!("uptime")])
            .with_timeout(30)
            .with_override("ssh_user", json!("root"))
            .with_override("ssh_port", json!("2222"))
            .with_override("evil_key", json!("x"));

        let job = client.prepare(&request);
        let spec = job.spec();

        assert_eq!(spec.target, "web*");
        assert_eq!(spec.selection, TargetSelection::Glob);
        assert_eq!(spec.function, "cmd.run");
        assert_eq!(spec.argv, vec![json!("cmd.run"), json!("uptime")]);
        assert_eq!(spec.opts.get("ssh_user"), Some(&json!("root")));
        assert_eq!(spec.opts.get("ssh_port"), Some(&json!(2222)));
        assert_eq!(spec.opts.get("timeout"), Some(&json!(30)));
        assert_eq!(spec.opts.get(DISABLE_CUSTOM_ROSTER_KEY), Some(&json!(true)));
        assert!(!spec.opts.contains_key("evil_key"));
    }

    #[test]
    fn test_prepare_zero_timeout_keeps_configured_default() {
        let client = client(MockEngine::new(vec![]));
        let request = CommandRequest::new("web1", "test.ping").with_timeout(0);
        let job = client.prepare(&request);
        assert_eq!(job.spec().opts.get("timeout"), Some(&json!(5)));
    }

    #[test]
    fn test_prepare_never_mutates_base_config() {
        let client = client(MockEngine::new(vec![]));
        let before = client.config().clone();

        let request = CommandRequest::new("web*", "test.ping")
            .with_override("ssh_user", json!("root"))
            .with_override("file_roots", json!({"base": ["/tmp/evil"]}))
            .with_override("timeout", json!(999));
        let _ = client.prepare(&request);

        assert_eq!(client.config(), &before);
        assert_eq!(
            client.config().get("file_roots"),
            Some(&json!({"base": ["/srv/hostrun", "/srv/spm"]}))
        );
    }

    #[tokio::test]
    async fn test_run_iter_streams_records_unmodified() {
        let batches = vec![record("web1", json!(true)), record("web2", json!(true))];
        let client = client(MockEngine::new(batches.clone()));

        let mut stream = client
            .run_iter(&CommandRequest::new("web*", "test.ping"))
            .await
            .unwrap();
        let mut streamed = Vec::new();
        while let Some(record) = stream.next().await {
            streamed.push(record.unwrap());
        }
        assert_eq!(streamed, batches);
    }

    #[tokio::test]
    async fn test_run_aggregates_one_entry_per_target() {
        let client = client(MockEngine::new(vec![
            record("web1", json!(true)),
            record("web2", json!(true)),
            record("db1", json!(true)),
        ]));

        let returns = client
            .run(&CommandRequest::new("*", "test.ping"))
            .await
            .unwrap();
        assert_eq!(returns.len(), 3);
        assert!(returns.contains_key("web1"));
        assert!(returns.contains_key("db1"));
    }

    #[tokio::test]
    async fn test_run_duplicate_target_keeps_later_record() {
        let client = client(MockEngine::new(vec![
            record("web1", json!("first")),
            record("web1", json!("second")),
        ]));

        let returns = client
            .run(&CommandRequest::new("web1", "test.ping"))
            .await
            .unwrap();
        assert_eq!(returns.len(), 1);
        assert_eq!(returns["web1"]["return"], json!("second"));
    }

    #[tokio::test]
    async fn test_run_rejects_empty_function() {
        let client = client(MockEngine::new(vec![]));
        let err = client.run(&CommandRequest::new("web1", "")).await;
        assert!(matches!(err, Err(ClientError::InvalidInput(_))));
        assert!(client.engine.seen_specs().is_empty());
    }

    #[tokio::test]
    async fn test_engine_failure_propagates_unchanged() {
        let client = client(MockEngine::failing_after(
            vec![record("web1", json!(true))],
            "host unreachable",
        ));

        let err = client
            .run(&CommandRequest::new("web*", "test.ping"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ClientError::Engine(EngineError::Execution(ref m)) if m == "host unreachable"
        ));
    }

    #[tokio::test]
    async fn test_run_with_invalid_overrides_still_executes() {
        let client = client(MockEngine::new(vec![record("web1", json!(true))]));
        let request = CommandRequest::new("web1", "test.ping")
            .with_override("ssh_port", json!("not-a-port"))
            .with_override("unknown", json!(1));

        let returns = client.run(&request).await.unwrap();
        assert_eq!(returns.len(), 1);

        let specs = client.engine.seen_specs();
        assert!(!specs[0].opts.contains_key("unknown"));
        assert_eq!(
            specs[0].opts.get("ssh_port"),
            client.config().get("ssh_port")
        );
    }

    #[tokio::test]
    async fn test_run_from_map_matches_direct_call() {
        let client = client(MockEngine::new(vec![record("web1", json!(true))]));

        let mut low = Map::new();
        low.insert("tgt".into(), json!("web1"));
        low.insert("fun".into(), json!("test.ping"));
        low.insert("ssh_user".into(), json!("root"));
        client.run_from_map(&low).await.unwrap();

        let direct = CommandRequest::new("web1", "test.ping")
            .with_override("ssh_user", json!("root"));
        client.run(&direct).await.unwrap();

        let specs = client.engine.seen_specs();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0], specs[1]);
        assert_eq!(specs[0].opts.get("ssh_user"), Some(&json!("root")));
    }

    #[tokio::test]
    async fn test_run_from_map_strips_call_fields_from_overrides() {
        let client = client(MockEngine::new(vec![record("web1", json!(true))]));

        let mut low = Map::new();
        low.insert("tgt".into(), json!("web1"));
        low.insert("fun".into(), json!("test.ping"));
        low.insert("expr_form".into(), json!("list"));
        low.insert("timeout".into(), json!(60));
        low.insert("jid".into(), json!("20141202152721523072"));
        client.run_from_map(&low).await.unwrap();

        let specs = client.engine.seen_specs();
        assert_eq!(specs[0].selection, TargetSelection::List);
        assert_eq!(specs[0].opts.get("timeout"), Some(&json!(60)));
        assert_eq!(specs[0].jid, Some(JobId::new("20141202152721523072")));
        assert!(!specs[0].opts.contains_key("expr_form"));
        assert!(!specs[0].opts.contains_key("jid"));
    }

    #[tokio::test]
    async fn test_run_from_map_missing_fields() {
        let client = client(MockEngine::new(vec![]));

        let err = client.run_from_map(&Map::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField("tgt")));

        let mut low = Map::new();
        low.insert("tgt".into(), json!("web1"));
        let err = client.run_from_map(&low).await.unwrap_err();
        assert!(matches!(err, ClientError::MissingField("fun")));
    }

    #[tokio::test]
    async fn test_run_from_map_unknown_selection_mode() {
        let client = client(MockEngine::new(vec![]));
        let mut low = Map::new();
        low.insert("tgt".into(), json!("web1"));
        low.insert("fun".into(), json!("test.ping"));
        low.insert("expr_form".into(), json!("telepathy"));

        let err = client.run_from_map(&low).await.unwrap_err();
        assert!(matches!(
            err,
            ClientError::Core(CoreError::InvalidSelection(_))
        ));
    }

    #[tokio::test]
    async fn test_run_async_is_unsupported() {
        let client = client(MockEngine::new(vec![record("web1", json!(true))]));
        let mut low = Map::new();
        low.insert("tgt".into(), json!("web1"));
        low.insert("fun".into(), json!("test.ping"));

        let err = client.run_async(&low, None).await.unwrap_err();
        assert!(matches!(err, ClientError::AsyncUnsupported));
        assert!(client.engine.seen_specs().is_empty());
    }

    #[test]
    fn test_from_source_loads_settings() {
        struct StaticSource;
        impl ConfigSource for StaticSource {
            fn load(&self, _path: &Path) -> Result<Map<String, Value>, CoreError> {
                let mut settings = Map::new();
                settings.insert("ssh_user".into(), json!("deploy"));
                Ok(settings)
            }
        }

        let client = SshClient::from_source(
            &StaticSource,
            Path::new("/etc/hostrun/master"),
            MockEngine::new(vec![]),
            true,
        )
        .unwrap();
        assert_eq!(client.config().get("ssh_user"), Some(&json!("deploy")));
        assert!(client.config().custom_roster_disabled());
    }
}
