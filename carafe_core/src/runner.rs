//! Wiring of the producer threads around the single station queue.
use crate::config::SamplerCfg;
use crate::event::Stamped;
use crate::inputs::InputPoller;
use crate::pipeline::WeightPipeline;
use crate::sampler::Sampler;
use carafe_traits::clock::Clock;
use carafe_traits::{InputDevice, Scale};
use crossbeam_channel as xch;
use std::time::Duration;

/// How long an input poller blocks in one `poll` call.
pub const INPUT_POLL_TIMEOUT: Duration = Duration::from_millis(50);

/// A named input collaborator to be polled on its own thread.
pub type NamedInput = (&'static str, Box<dyn InputDevice + Send>);

/// Running producers. Dropping the station stops and joins every worker.
pub struct Station {
    events: xch::Receiver<Stamped>,
    pollers: Vec<InputPoller>,
    sampler: Sampler,
}

impl Station {
    pub fn start<S, C>(
        scale: S,
        pipeline: WeightPipeline,
        sampler_cfg: SamplerCfg,
        inputs: Vec<NamedInput>,
        clock: C,
    ) -> Self
    where
        S: Scale + Send + 'static,
        C: Clock + Clone + Send + Sync + 'static,
    {
        // Unbounded: every press and weight event must reach the dispatcher
        let (tx, events) = xch::unbounded();
        let pollers = inputs
            .into_iter()
            .map(|(name, dev)| {
                InputPoller::spawn(name, dev, INPUT_POLL_TIMEOUT, clock.clone(), tx.clone())
            })
            .collect::<Vec<_>>();
        // The queue closes once every producer has exited
        let sampler = Sampler::spawn(scale, pipeline, sampler_cfg, clock, tx);
        tracing::info!(inputs = pollers.len(), "station started");
        Self {
            events,
            pollers,
            sampler,
        }
    }

    pub fn events(&self) -> &xch::Receiver<Stamped> {
        &self.events
    }

    pub fn sampler_stalled_ms(&self) -> u64 {
        self.sampler.stalled_ms()
    }

    pub fn input_names(&self) -> Vec<&'static str> {
        self.pollers.iter().map(InputPoller::name).collect()
    }
}

impl Drop for Station {
    fn drop(&mut self) {
        tracing::info!("station stopping");
        // Workers join in their own Drop impls (pollers first, then the sampler)
        self.pollers.clear();
    }
}
