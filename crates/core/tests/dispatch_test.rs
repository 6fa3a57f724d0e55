//! End-to-end tests of the dispatch pipeline over in-memory stores.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use photofolio_core::config::DispatchConfig;
use photofolio_core::dispatch::{
    DispatchEngine, DispatchRouter, HttpCallExecutor, PluginExecutor, PluginInvocation,
};
use photofolio_core::errors::{Error, Result};
use photofolio_core::events::{DomainEvent, DomainEventSink};
use photofolio_core::integrations::{
    ExclusionRule, ExclusionStoreTrait, HttpCallSpec, HttpMethod, Integration,
    IntegrationSpec, IntegrationStoreTrait, PhotoParameterStoreTrait, PhotoParameters,
    PluginSpec,
};
use photofolio_core::photos::{PhotoReadStoreTrait, PhotoSnapshot};
use photofolio_core::plugins::{
    PhotoPlugin, PluginContext, PluginError, PluginKvStoreTrait, PluginLoader, PluginRegistry,
};
use photofolio_core::runs::{
    RunCaller, RunHistoryService, RunHistoryStoreTrait, RunResult,
};

// ---------------------------------------------------------------------------
// In-memory store doubles
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryIntegrationStore {
    rows: Mutex<Vec<Integration>>,
}

#[async_trait]
impl IntegrationStoreTrait for MemoryIntegrationStore {
    fn get_all(&self) -> Result<Vec<Integration>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    fn get_active(&self) -> Result<Vec<Integration>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|i| i.active)
            .cloned()
            .collect())
    }

    fn get_by_id(&self, id: &str) -> Result<Option<Integration>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|i| i.id == id)
            .cloned())
    }

    fn get_plugin_modules(&self) -> Result<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter_map(|i| i.plugin_module().map(str::to_string))
            .collect())
    }

    async fn insert(&self, integration: Integration) -> Result<Integration> {
        self.rows.lock().unwrap().push(integration.clone());
        Ok(integration)
    }

    async fn update(&self, integration: Integration) -> Result<Integration> {
        let mut rows = self.rows.lock().unwrap();
        if let Some(existing) = rows.iter_mut().find(|i| i.id == integration.id) {
            *existing = integration.clone();
        }
        Ok(integration)
    }

    async fn delete(&self, id: &str) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|i| i.id != id);
        Ok(before - rows.len())
    }
}

#[derive(Default)]
struct MemoryExclusionStore {
    rows: Mutex<Vec<ExclusionRule>>,
}

#[async_trait]
impl ExclusionStoreTrait for MemoryExclusionStore {
    fn excluded_integration_ids(&self, photo_id: &str) -> Result<Vec<String>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.photo_id == photo_id)
            .map(|r| r.integration_id.clone())
            .collect())
    }

    fn get_all(&self) -> Result<Vec<ExclusionRule>> {
        Ok(self.rows.lock().unwrap().clone())
    }

    async fn insert(&self, rule: ExclusionRule) -> Result<ExclusionRule> {
        self.rows.lock().unwrap().push(rule.clone());
        Ok(rule)
    }

    async fn delete(&self, photo_id: &str, integration_id: &str) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| !(r.photo_id == photo_id && r.integration_id == integration_id));
        Ok(before - rows.len())
    }
}

#[derive(Default)]
struct MemoryParameterStore {
    rows: Mutex<Vec<PhotoParameters>>,
}

#[async_trait]
impl PhotoParameterStoreTrait for MemoryParameterStore {
    fn get(&self, integration_id: &str, photo_id: &str) -> Result<Option<PhotoParameters>> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.integration_id == integration_id && p.photo_id == photo_id)
            .cloned())
    }

    async fn upsert(&self, parameters: PhotoParameters) -> Result<PhotoParameters> {
        let mut rows = self.rows.lock().unwrap();
        rows.retain(|p| {
            !(p.integration_id == parameters.integration_id && p.photo_id == parameters.photo_id)
        });
        rows.push(parameters.clone());
        Ok(parameters)
    }

    async fn delete(&self, integration_id: &str, photo_id: &str) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|p| !(p.integration_id == integration_id && p.photo_id == photo_id));
        Ok(before - rows.len())
    }
}

#[derive(Default)]
struct MemoryRunStore {
    rows: Mutex<Vec<RunResult>>,
}

#[async_trait]
impl RunHistoryStoreTrait for MemoryRunStore {
    async fn insert(&self, run: RunResult) -> Result<RunResult> {
        self.rows.lock().unwrap().push(run.clone());
        Ok(run)
    }

    async fn finalize(
        &self,
        id: &str,
        successful: bool,
        log: String,
        finished_at: DateTime<Utc>,
    ) -> Result<RunResult> {
        let mut rows = self.rows.lock().unwrap();
        let run = rows
            .iter_mut()
            .find(|r| r.id == id && r.finished_at.is_none())
            .ok_or_else(|| Error::Unexpected(format!("No open run {}", id)))?;
        run.successful = successful;
        run.log = log;
        run.finished_at = Some(finished_at);
        Ok(run.clone())
    }

    fn history(&self, integration_id: &str) -> Result<Vec<RunResult>> {
        let mut runs: Vec<RunResult> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.integration_id == integration_id)
            .cloned()
            .collect();
        runs.sort_by(|a, b| b.started_at.cmp(&a.started_at));
        Ok(runs)
    }

    async fn purge_started_before(&self, cutoff: DateTime<Utc>) -> Result<usize> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|r| r.started_at >= cutoff || r.finished_at.is_none());
        Ok(before - rows.len())
    }
}

#[derive(Default)]
struct MemoryKvStore {
    rows: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl PluginKvStoreTrait for MemoryKvStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.rows.lock().unwrap().get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        self.rows
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

struct EmptyPhotoStore;

impl PhotoReadStoreTrait for EmptyPhotoStore {
    fn photo_count(&self) -> Result<i64> {
        Ok(0)
    }

    fn size_count(&self) -> Result<i64> {
        Ok(0)
    }

    fn photo_size_counts(&self) -> Result<HashMap<String, i64>> {
        Ok(HashMap::new())
    }

    fn photo_asset(&self, _photo_uuid: &str, _size_slug: &str) -> Result<Option<Vec<u8>>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Test plugins
// ---------------------------------------------------------------------------

/// Records every invocation into its scoped kv storage.
fn recorder(ctx: PluginContext) -> std::result::Result<Box<dyn PhotoPlugin>, PluginError> {
    Ok(Box::new(Recorder {
        services: ctx.services,
        config: ctx.config,
    }))
}

struct Recorder {
    services: photofolio_core::plugins::PluginServices,
    config: BTreeMap<String, String>,
}

impl Recorder {
    async fn bump(&self, key: &str) -> std::result::Result<u64, PluginError> {
        let next = self
            .services
            .kv()
            .get(key)?
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0)
            + 1;
        self.services.kv().set(key, &next.to_string()).await?;
        Ok(next)
    }
}

#[async_trait]
impl PhotoPlugin for Recorder {
    async fn on_global_change(&mut self) -> std::result::Result<(), PluginError> {
        self.bump("global_count").await?;
        if let Some(greeting) = self.config.get("greeting") {
            self.services.kv().set("greeting", greeting).await?;
        }
        Ok(())
    }

    async fn on_photo_publish(
        &mut self,
        photo: &PhotoSnapshot,
        params: &BTreeMap<String, String>,
    ) -> std::result::Result<(), PluginError> {
        self.bump("publish_count").await?;
        self.services.kv().set("last_photo", &photo.uuid).await?;
        if let Some(caption) = params.get("caption") {
            self.services.kv().set("last_caption", caption).await?;
        }
        Ok(())
    }

    async fn on_photo_unpublish(
        &mut self,
        photo: &PhotoSnapshot,
        _params: &BTreeMap<String, String>,
    ) -> std::result::Result<(), PluginError> {
        self.bump("unpublish_count").await?;
        self.services.kv().set("last_photo", &photo.uuid).await?;
        Ok(())
    }
}

/// Fails every handler with a plugin error.
fn failing(_ctx: PluginContext) -> std::result::Result<Box<dyn PhotoPlugin>, PluginError> {
    struct Failing;

    #[async_trait]
    impl PhotoPlugin for Failing {
        async fn on_global_change(&mut self) -> std::result::Result<(), PluginError> {
            Err(PluginError::new("refusing on principle"))
        }

        async fn on_photo_publish(
            &mut self,
            _photo: &PhotoSnapshot,
            _params: &BTreeMap<String, String>,
        ) -> std::result::Result<(), PluginError> {
            Err(PluginError::new("refusing on principle"))
        }
    }

    Ok(Box::new(Failing))
}

/// Panics in its publish handler.
fn panicking(_ctx: PluginContext) -> std::result::Result<Box<dyn PhotoPlugin>, PluginError> {
    struct Panicking;

    #[async_trait]
    impl PhotoPlugin for Panicking {
        async fn on_photo_publish(
            &mut self,
            _photo: &PhotoSnapshot,
            _params: &BTreeMap<String, String>,
        ) -> std::result::Result<(), PluginError> {
            panic!("plugin bug")
        }
    }

    Ok(Box::new(Panicking))
}

/// Never returns within any reasonable budget.
fn sleepy(_ctx: PluginContext) -> std::result::Result<Box<dyn PhotoPlugin>, PluginError> {
    struct Sleepy;

    #[async_trait]
    impl PhotoPlugin for Sleepy {
        async fn on_global_change(&mut self) -> std::result::Result<(), PluginError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(())
        }
    }

    Ok(Box::new(Sleepy))
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

struct Harness {
    integrations: Arc<MemoryIntegrationStore>,
    kv: Arc<MemoryKvStore>,
    exclusions: Arc<MemoryExclusionStore>,
    parameters: Arc<MemoryParameterStore>,
    history: Arc<RunHistoryService>,
    router: Arc<DispatchRouter>,
    _plugin_dir: tempfile::TempDir,
}

fn write_manifest(dir: &Path, module: &str, uuid: &str, entry: &str) {
    let manifest = serde_json::json!({
        "name": module,
        "uuid": uuid,
        "version": "0.1.0",
        "configSchema": {},
        "entry": entry,
    });
    std::fs::write(dir.join(format!("{}.json", module)), manifest.to_string()).unwrap();
}

impl Harness {
    fn new() -> Self {
        Self::with_budget(Duration::from_secs(5))
    }

    fn with_budget(budget: Duration) -> Self {
        let plugin_dir = tempfile::tempdir().unwrap();
        write_manifest(plugin_dir.path(), "plugin-a", "uuid-a", "recorder");
        write_manifest(plugin_dir.path(), "plugin-b", "uuid-b", "recorder");
        write_manifest(plugin_dir.path(), "plugin-boom", "uuid-boom", "failing");
        write_manifest(plugin_dir.path(), "plugin-panic", "uuid-panic", "panicking");
        write_manifest(plugin_dir.path(), "plugin-sleepy", "uuid-sleepy", "sleepy");

        let mut registry = PluginRegistry::new();
        registry.register("recorder", recorder).unwrap();
        registry.register("failing", failing).unwrap();
        registry.register("panicking", panicking).unwrap();
        registry.register("sleepy", sleepy).unwrap();

        let integrations = Arc::new(MemoryIntegrationStore::default());
        let exclusions = Arc::new(MemoryExclusionStore::default());
        let parameters = Arc::new(MemoryParameterStore::default());
        let kv = Arc::new(MemoryKvStore::default());
        let history = Arc::new(RunHistoryService::new(Arc::new(MemoryRunStore::default())));
        let loader = Arc::new(PluginLoader::new(
            plugin_dir.path(),
            Arc::new(registry),
        ));

        let http = HttpCallExecutor::new(Arc::clone(&history), Duration::from_secs(2)).unwrap();
        let plugins = PluginExecutor::new(
            Arc::clone(&loader),
            kv.clone() as Arc<dyn PluginKvStoreTrait>,
            Arc::new(EmptyPhotoStore),
            Arc::clone(&history),
            budget,
        );

        let router = Arc::new(DispatchRouter::new(
            integrations.clone() as Arc<dyn IntegrationStoreTrait>,
            exclusions.clone() as Arc<dyn ExclusionStoreTrait>,
            parameters.clone() as Arc<dyn PhotoParameterStoreTrait>,
            loader,
            http,
            plugins,
        ));

        Harness {
            integrations,
            kv,
            exclusions,
            parameters,
            history,
            router,
            _plugin_dir: plugin_dir,
        }
    }

    async fn add_plugin(&self, id: &str, module: &str, active: bool) -> Integration {
        self.add_plugin_with_config(id, module, active, "").await
    }

    async fn add_plugin_with_config(
        &self,
        id: &str,
        module: &str,
        active: bool,
        config: &str,
    ) -> Integration {
        let now = Utc::now().to_rfc3339();
        self.integrations
            .insert(Integration {
                id: id.to_string(),
                nickname: module.to_string(),
                active,
                spec: IntegrationSpec::Plugin(PluginSpec {
                    module: module.to_string(),
                    config: config.to_string(),
                }),
                created_at: now.clone(),
                updated_at: now,
            })
            .await
            .unwrap()
    }

    fn kv_value(&self, key: &str) -> Option<String> {
        self.kv.get(key).unwrap()
    }
}

// ---------------------------------------------------------------------------
// Router behavior
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_exclusion_rule_skips_only_the_excluded_plugin() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;
    harness.add_plugin("int-b", "plugin-b", true).await;
    harness
        .exclusions
        .insert(ExclusionRule {
            id: "x-1".to_string(),
            photo_id: "photo-1".to_string(),
            integration_id: "int-a".to_string(),
        })
        .await
        .unwrap();

    let runs = harness
        .router
        .dispatch_photo_published(PhotoSnapshot::sample("photo-1", "Sunset"))
        .await
        .unwrap();

    assert_eq!(runs.len(), 1, "Only plugin B is included");
    assert_eq!(runs[0].integration_id, "int-b");
    assert!(runs[0].successful);

    // B was invoked exactly once, A never
    assert_eq!(harness.kv_value("uuid-b_publish_count").as_deref(), Some("1"));
    assert_eq!(harness.kv_value("uuid-b_last_photo").as_deref(), Some("photo-1"));
    assert_eq!(harness.kv_value("uuid-a_publish_count"), None);
}

#[tokio::test]
async fn test_photo_parameters_reach_the_handler() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;
    harness
        .parameters
        .upsert(PhotoParameters {
            id: "p-1".to_string(),
            integration_id: "int-a".to_string(),
            photo_id: "photo-9".to_string(),
            parameters: "caption: Golden hour".to_string(),
        })
        .await
        .unwrap();

    harness
        .router
        .dispatch_photo_published(PhotoSnapshot::sample("photo-9", "Dunes"))
        .await
        .unwrap();

    assert_eq!(
        harness.kv_value("uuid-a_last_caption").as_deref(),
        Some("Golden hour")
    );
}

#[tokio::test]
async fn test_inactive_and_invalid_plugins_are_skipped() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", false).await; // inactive
    harness.add_plugin("int-ghost", "no-such-module", true).await; // invalid
    harness.add_plugin("int-b", "plugin-b", true).await;

    let runs = harness
        .router
        .dispatch_photo_published(PhotoSnapshot::sample("photo-2", "Pier"))
        .await
        .unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].integration_id, "int-b");
    assert_eq!(harness.kv_value("uuid-a_publish_count"), None);
}

#[tokio::test]
async fn test_global_dispatch_invokes_valid_plugins_and_skips_broken_module() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;
    harness.add_plugin("int-ghost", "no-such-module", true).await;

    // Skipping the invalid module must not raise
    let runs = harness.router.dispatch_global().await.unwrap();

    assert_eq!(runs.len(), 1);
    assert_eq!(harness.kv_value("uuid-a_global_count").as_deref(), Some("1"));
    assert!(harness.history.history("int-ghost").unwrap().is_empty());
}

#[tokio::test]
async fn test_failing_plugin_does_not_affect_siblings() {
    let harness = Harness::new();
    harness.add_plugin("int-boom", "plugin-boom", true).await;
    harness.add_plugin("int-b", "plugin-b", true).await;

    let runs = harness
        .router
        .dispatch_photo_published(PhotoSnapshot::sample("photo-3", "Storm"))
        .await
        .unwrap();

    assert_eq!(runs.len(), 2, "Both integrations produced a run record");
    assert_eq!(harness.kv_value("uuid-b_publish_count").as_deref(), Some("1"));

    let boom_runs = harness.history.history("int-boom").unwrap();
    assert_eq!(boom_runs.len(), 1);
    assert!(!boom_runs[0].successful);
    assert!(boom_runs[0].log.contains("refusing on principle"));
    assert!(boom_runs[0].is_finished());

    let b_runs = harness.history.history("int-b").unwrap();
    assert_eq!(b_runs.len(), 1);
    assert!(b_runs[0].successful);
}

#[tokio::test]
async fn test_panicking_plugin_becomes_a_failed_run() {
    let harness = Harness::new();
    harness.add_plugin("int-panic", "plugin-panic", true).await;
    harness.add_plugin("int-b", "plugin-b", true).await;

    let runs = harness
        .router
        .dispatch_photo_published(PhotoSnapshot::sample("photo-4", "Cliff"))
        .await
        .unwrap();

    assert_eq!(runs.len(), 2);
    let panic_runs = harness.history.history("int-panic").unwrap();
    assert_eq!(panic_runs.len(), 1);
    assert!(!panic_runs[0].successful);
    assert!(panic_runs[0].is_finished());

    // The sibling still ran
    assert_eq!(harness.kv_value("uuid-b_publish_count").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_hung_plugin_is_cut_off_at_its_budget() {
    let harness = Harness::with_budget(Duration::from_millis(200));
    harness.add_plugin("int-sleepy", "plugin-sleepy", true).await;

    let runs = harness.router.dispatch_global().await.unwrap();

    assert_eq!(runs.len(), 1);
    assert!(!runs[0].successful);
    assert!(runs[0].log.contains("wall-clock budget"));
}

#[tokio::test]
async fn test_config_is_parsed_and_passed_to_the_plugin() {
    let harness = Harness::new();
    harness
        .add_plugin_with_config("int-a", "plugin-a", true, "greeting: hello there")
        .await;

    harness.router.dispatch_global().await.unwrap();

    assert_eq!(
        harness.kv_value("uuid-a_greeting").as_deref(),
        Some("hello there")
    );
}

// ---------------------------------------------------------------------------
// Manual runs
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_manual_run_returns_finalized_record_with_transcript() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;

    let run = harness.router.run_manual("int-a", None).await.unwrap();

    assert!(run.successful);
    assert!(run.is_finished());
    assert_eq!(run.caller, RunCaller::Manual);
    assert!(run.log.contains("Handler: on_global_change"));
}

#[tokio::test]
async fn test_manual_run_surfaces_specific_validity_failure() {
    let harness = Harness::new();
    harness.add_plugin("int-ghost", "no-such-module", true).await;

    let err = harness.router.run_manual("int-ghost", None).await.unwrap_err();

    match err {
        Error::PluginInvalid(cause) => {
            assert!(cause.to_string().contains("no-such-module"));
        }
        other => panic!("Expected PluginInvalid, got {:?}", other),
    }
    // No run record for a refused manual trigger
    assert!(harness.history.history("int-ghost").unwrap().is_empty());
}

#[tokio::test]
async fn test_manual_run_of_unknown_integration_is_an_error() {
    let harness = Harness::new();
    assert!(harness.router.run_manual("nope", None).await.is_err());
}

#[tokio::test]
async fn test_manual_run_with_explicit_handler() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;

    let run = harness
        .router
        .run_manual(
            "int-a",
            Some(PluginInvocation::PhotoPublish {
                photo: PhotoSnapshot::sample("photo-7", "Harbor"),
                params: BTreeMap::new(),
            }),
        )
        .await
        .unwrap();

    assert!(run.successful);
    assert_eq!(harness.kv_value("uuid-a_last_photo").as_deref(), Some("photo-7"));
}

// ---------------------------------------------------------------------------
// HTTP executor validation path
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_duplicate_headers_fail_before_any_network_activity() {
    let harness = Harness::new();
    let now = Utc::now().to_rfc3339();
    harness
        .integrations
        .insert(Integration {
            id: "int-http".to_string(),
            nickname: "hook".to_string(),
            active: true,
            spec: IntegrationSpec::HttpCall(HttpCallSpec {
                method: HttpMethod::Get,
                url: "https://example.invalid/hook".to_string(),
                headers: "Authorization: Bearer x\nAuthorization: Bearer y".to_string(),
                body: String::new(),
            }),
            created_at: now.clone(),
            updated_at: now,
        })
        .await
        .unwrap();

    let run = harness.router.run_manual("int-http", None).await.unwrap();

    assert!(!run.successful);
    assert!(run.log.contains("Duplicate header found: 'Authorization'"));
    // The transcript never reached the request stage
    assert!(!run.log.contains("Request:"));
}

// ---------------------------------------------------------------------------
// Engine: debounced global dispatch
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn test_burst_of_global_events_dispatches_once() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;

    let config = DispatchConfig {
        debounce_delay_secs: 10,
        ..DispatchConfig::default()
    };
    let engine = DispatchEngine::start(
        &config,
        Arc::clone(&harness.router),
        Arc::clone(&harness.history),
    );
    let sink = engine.sink();

    for _ in 0..8 {
        sink.emit(DomainEvent::GlobalChange);
    }
    // Let the consumer drain the queue, then ride past the quiet period
    tokio::time::sleep(Duration::from_secs(12)).await;

    assert_eq!(
        harness.kv_value("uuid-a_global_count").as_deref(),
        Some("1"),
        "8 bursty events collapse into one dispatch"
    );
    assert_eq!(harness.history.history("int-a").unwrap().len(), 1);

    drop(sink);
    engine.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_photo_events_are_not_debounced() {
    let harness = Harness::new();
    harness.add_plugin("int-a", "plugin-a", true).await;

    let engine = DispatchEngine::start(
        &DispatchConfig::default(),
        Arc::clone(&harness.router),
        Arc::clone(&harness.history),
    );
    let sink = engine.sink();

    sink.emit(DomainEvent::photo_published(PhotoSnapshot::sample("p-1", "One")));
    sink.emit(DomainEvent::photo_published(PhotoSnapshot::sample("p-2", "Two")));
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(harness.kv_value("uuid-a_publish_count").as_deref(), Some("2"));

    drop(sink);
    engine.shutdown().await;
}
