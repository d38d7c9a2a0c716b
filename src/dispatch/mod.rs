// dispatch/mod.rs

pub mod sequence;

use std::future::Future;
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, error, info_span};
use uuid::Uuid;

use crate::{
    devices::{CommandRunner, DeviceHandle},
    error::AppError,
    models::Device,
};

/// Result of one device's share of a dispatch.
#[derive(Debug)]
pub struct Outcome {
    /// 1-based position of the device in the dispatched list.
    pub index: usize,
    pub device: String,
    pub result: Result<(), AppError>,
}

impl Outcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Owns the device list discovered at startup and the runner used to
/// control it. Cheap to clone.
#[derive(Clone)]
pub struct Dispatcher {
    devices: Arc<[Arc<Device>]>,
    runner: Arc<dyn CommandRunner>,
}

impl Dispatcher {
    pub fn new(devices: Vec<Device>, runner: Arc<dyn CommandRunner>) -> Self {
        Self {
            devices: devices.into_iter().map(Arc::new).collect(),
            runner,
        }
    }

    pub fn devices(&self) -> impl Iterator<Item = &Device> {
        self.devices.iter().map(|device| device.as_ref())
    }

    pub fn handles(&self) -> Vec<DeviceHandle> {
        self.devices
            .iter()
            .map(|device| DeviceHandle::new(device.clone(), self.runner.clone()))
            .collect()
    }

    pub fn bulbs(&self) -> Vec<DeviceHandle> {
        only_bulbs(self.handles())
    }

    pub async fn dispatch_bulbs<F, Fut>(&self, cancel: &CancellationToken, action: F) -> Vec<Outcome>
    where
        F: Fn(usize, DeviceHandle) -> Fut,
        Fut: Future<Output = Result<(), AppError>> + Send + 'static,
    {
        dispatch_all(self.bulbs(), cancel, action).await
    }
}

/// Keeps handles in order, dropping everything that is not a color bulb.
pub fn only_bulbs(handles: Vec<DeviceHandle>) -> Vec<DeviceHandle> {
    handles
        .into_iter()
        .filter(|handle| handle.device().is_bulb())
        .collect()
}

/// Runs `action` for every target concurrently and waits for all of them.
/// A failing target is logged and returned in its [`Outcome`], it never
/// stops the others.
///
/// `action` receives the 1-based position of the target. Cancelling `cancel`
/// drops the in-flight actions, which then report [`AppError::Cancelled`].
pub async fn dispatch_all<F, Fut>(
    targets: Vec<DeviceHandle>,
    cancel: &CancellationToken,
    action: F,
) -> Vec<Outcome>
where
    F: Fn(usize, DeviceHandle) -> Fut,
    Fut: Future<Output = Result<(), AppError>> + Send + 'static,
{
    let span = info_span!("dispatch", batch = %Uuid::new_v4(), devices = targets.len());
    let started = Instant::now();

    let mut units = Vec::with_capacity(targets.len());
    let mut tasks = Vec::with_capacity(targets.len());

    for (position, handle) in targets.into_iter().enumerate() {
        let index = position + 1;
        let device = handle.name().to_string();
        let work = action(index, handle);
        let cancel = cancel.clone();
        let name = device.clone();

        let task = tokio::spawn(
            async move {
                let result = tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(AppError::Cancelled),
                    result = work => result,
                };

                if let Err(err) = &result {
                    error!(device = %name, error = %err, "control bulb");
                }
                result
            }
            .instrument(span.clone()),
        );

        units.push((index, device));
        tasks.push(task);
    }

    let joined = join_all(tasks).await;

    let outcomes: Vec<Outcome> = units
        .into_iter()
        .zip(joined)
        .map(|((index, device), joined)| {
            let result = joined.unwrap_or_else(|e| {
                let err = AppError::Internal(anyhow::anyhow!("dispatch unit failed: {e}"));
                error!(parent: &span, device = %device, error = %err, "control bulb");
                Err(err)
            });

            let label = if result.is_ok() { "ok" } else { "error" };
            metrics::counter!("mihome_device_commands_total", "outcome" => label).increment(1);

            Outcome {
                index,
                device,
                result,
            }
        })
        .collect();

    metrics::histogram!("mihome_dispatch_seconds").record(started.elapsed().as_secs_f64());
    debug!(
        parent: &span,
        failed = outcomes.iter().filter(|outcome| !outcome.is_ok()).count(),
        "dispatch finished"
    );

    outcomes
}
