use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use pebble_core::{Effect, Msg};
use pebble_engine::{
    AlphaVantageProvider, EngineEvent, EngineHandle, EngineStopped, ProviderSettings, QuoteSource,
};
use pebble_logging::{pebble_debug, pebble_warn};

/// Executes core effects on the engine and turns engine events back into messages.
pub struct EffectRunner {
    engine: EngineHandle,
}

impl EffectRunner {
    pub fn new(settings: ProviderSettings) -> anyhow::Result<Self> {
        let search_limit = settings.search_limit;
        let provider = AlphaVantageProvider::new(settings)?;
        let source = QuoteSource::new(Arc::new(provider)).with_search_limit(search_limit);
        Ok(Self {
            engine: EngineHandle::new(source),
        })
    }

    /// Hands each effect to the engine. Effects the engine can no longer
    /// accept come back as failed results for their generation.
    pub fn enqueue(&self, effects: Vec<Effect>) -> Vec<Msg> {
        effects
            .into_iter()
            .filter_map(|effect| self.run(effect))
            .collect()
    }

    fn run(&self, effect: Effect) -> Option<Msg> {
        match effect {
            Effect::FetchQuotes {
                generation,
                symbols,
            } => {
                pebble_logging::set_generation(generation);
                pebble_debug!("FetchQuotes generation={} symbols={}", generation, symbols.len());
                let err = self.engine.fetch(generation, symbols).err()?;
                pebble_warn!("refresh {} not started: {}", generation, err);
                Some(Msg::QuotesFetched {
                    generation,
                    result: Err(format!("Could not start refresh: {err}")),
                    received_at: None,
                })
            }
            Effect::SearchQuotes { generation, text } => {
                pebble_logging::set_generation(generation);
                pebble_debug!("SearchQuotes generation={} text_len={}", generation, text.len());
                let err = self.engine.search(generation, text).err()?;
                pebble_warn!("search {} not started: {}", generation, err);
                Some(Msg::SearchCompleted {
                    generation,
                    result: Err(err.to_string()),
                })
            }
        }
    }

    pub fn start_timer(&self, period: Duration) -> Result<(), EngineStopped> {
        self.engine.start_timer(period)
    }

    /// Stops the engine; later effects are answered with failures.
    pub fn shutdown(&mut self) {
        self.engine.shutdown();
    }

    /// Drains every event the engine has posted so far.
    pub fn poll(&self) -> Vec<Msg> {
        std::iter::from_fn(|| self.engine.try_recv())
            .map(map_event)
            .collect()
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::QuotesFetched { generation, result } => Msg::QuotesFetched {
            generation,
            result: result.map_err(|err| err.to_string()),
            received_at: Some(Local::now().format("%H:%M:%S").to_string()),
        },
        EngineEvent::SearchCompleted { generation, quotes } => Msg::SearchCompleted {
            generation,
            result: Ok(quotes),
        },
        EngineEvent::TimerFired => Msg::TimerTick,
    }
}
