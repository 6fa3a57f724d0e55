//! Engine runtime: the single consumer of the domain event queue.

use std::sync::Arc;

use tokio::task::JoinHandle;

use crate::config::DispatchConfig;
use crate::constants::GLOBAL_CHANGE_EVENT_KEY;
use crate::dispatch::debounce::DebounceCoalescer;
use crate::dispatch::router::DispatchRouter;
use crate::events::{ChannelEventSink, DomainEvent};
use crate::runs::RunHistoryService;

/// Wires the event queue to the router.
///
/// Global changes go through the debounce coalescer; photo events dispatch
/// directly on their own task. A retention sweep runs alongside as a
/// best-effort housekeeping job whose failures never affect dispatch.
pub struct DispatchEngine;

/// Handles to a running engine.
pub struct EngineHandle {
    sink: ChannelEventSink,
    consumer: JoinHandle<()>,
    sweeper: JoinHandle<()>,
}

impl DispatchEngine {
    pub fn start(
        config: &DispatchConfig,
        router: Arc<DispatchRouter>,
        history: Arc<RunHistoryService>,
    ) -> EngineHandle {
        let (sink, mut rx) = ChannelEventSink::new();
        let debounce = DebounceCoalescer::new(
            config.debounce_delay(),
            config.debounce_safety_margin(),
        );

        let consumer = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                match event {
                    DomainEvent::GlobalChange => {
                        let router = Arc::clone(&router);
                        debounce.trigger(GLOBAL_CHANGE_EVENT_KEY, move || async move {
                            if let Err(e) = router.dispatch_global().await {
                                log::error!("Global dispatch failed: {}", e);
                            }
                        });
                    }
                    DomainEvent::PhotoPublished { photo } => {
                        let router = Arc::clone(&router);
                        tokio::spawn(async move {
                            if let Err(e) = router.dispatch_photo_published(photo).await {
                                log::error!("Photo-published dispatch failed: {}", e);
                            }
                        });
                    }
                    DomainEvent::PhotoUnpublished { photo } => {
                        let router = Arc::clone(&router);
                        tokio::spawn(async move {
                            if let Err(e) = router.dispatch_photo_unpublished(photo).await {
                                log::error!("Photo-unpublished dispatch failed: {}", e);
                            }
                        });
                    }
                }
            }
            log::info!("Domain event channel closed; dispatch engine stopping");
        });

        let retention_days = config.run_retention_days;
        let sweep_interval = config.retention_sweep_interval();
        let sweeper = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            // interval's first tick completes immediately; skip it
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match history.purge_older_than_days(retention_days).await {
                    Ok(0) => {}
                    Ok(removed) => {
                        log::info!("Retention sweep removed {} run records", removed)
                    }
                    Err(e) => log::warn!("Retention sweep failed, will retry: {}", e),
                }
            }
        });

        EngineHandle {
            sink,
            consumer,
            sweeper,
        }
    }
}

impl EngineHandle {
    /// A sink producers can clone freely.
    pub fn sink(&self) -> ChannelEventSink {
        self.sink.clone()
    }

    /// Stops the engine once all outstanding sink clones are dropped.
    pub async fn shutdown(self) {
        self.sweeper.abort();
        drop(self.sink);
        if let Err(e) = self.consumer.await {
            if !e.is_cancelled() {
                log::error!("Dispatch consumer ended abnormally: {}", e);
            }
        }
    }
}
