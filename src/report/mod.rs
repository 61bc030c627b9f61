pub mod sink;

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProbeError, ProbeResult};
use crate::format::{format_bytes, format_rate, format_uptime};
use crate::runtime::Uptime;
use crate::system::collector::SysinfoProvider;
use crate::system::provider::{HardwareProvider, OsProvider, RuntimeProvider, TaskProvider};
use crate::system::snapshot::{CapacityInfo, CounterSnapshot};
use crate::system::utilization::compute_delta;

pub const NOT_AVAILABLE: &str = "n/a";
pub const ANOMALOUS: &str = "anomalous";
pub const UNTRACKED: &str = "untracked";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MetricFamily {
    Processor,
    Memory,
    Os,
    Runtime,
    Tasks,
    Filesystems,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 6] = [
        MetricFamily::Processor,
        MetricFamily::Memory,
        MetricFamily::Os,
        MetricFamily::Runtime,
        MetricFamily::Tasks,
        MetricFamily::Filesystems,
    ];

    pub fn title(self) -> &'static str {
        match self {
            MetricFamily::Processor => "Processor",
            MetricFamily::Memory => "Memory",
            MetricFamily::Os => "Operating system",
            MetricFamily::Runtime => "Runtime",
            MetricFamily::Tasks => "Tasks",
            MetricFamily::Filesystems => "Filesystems",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: &'static str,
    pub value: String,
}

/// One repeated record inside a family, e.g. a task or a mounted store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Row {
    pub kind: &'static str,
    pub fields: Vec<Field>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Section {
    pub fields: Vec<Field>,
    pub rows: Vec<Row>,
}

impl Section {
    fn field(mut self, label: &'static str, value: impl Into<String>) -> Self {
        self.fields.push(Field {
            label,
            value: value.into(),
        });
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FamilyReport {
    pub family: MetricFamily,
    pub outcome: ProbeResult<Section>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Report {
    pub families: Vec<FamilyReport>,
}

impl Report {
    pub fn failures(&self) -> impl Iterator<Item = (&MetricFamily, &ProbeError)> {
        self.families
            .iter()
            .filter_map(|f| f.outcome.as_ref().err().map(|e| (&f.family, e)))
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// The query objects a report reads from.
#[derive(Clone)]
pub struct Providers {
    pub hardware: Arc<dyn HardwareProvider>,
    pub os: Arc<dyn OsProvider>,
    pub runtime: Arc<dyn RuntimeProvider>,
    pub tasks: Arc<dyn TaskProvider>,
}

impl Providers {
    pub fn system() -> Self {
        let provider = Arc::new(SysinfoProvider::new());
        Providers {
            hardware: provider.clone(),
            os: provider.clone(),
            runtime: provider.clone(),
            tasks: provider,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SamplingPolicy {
    /// Wait between the two tick snapshots.
    pub interval: Duration,
    /// Budget for the two tick reads. The sample as a whole must finish
    /// within `interval + timeout`.
    pub timeout: Duration,
}

impl SamplingPolicy {
    pub fn deadline(&self) -> Duration {
        self.interval.saturating_add(self.timeout)
    }
}

impl Default for SamplingPolicy {
    fn default() -> Self {
        SamplingPolicy {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(5),
        }
    }
}

/// Cancellation source that re-arms itself: once a listener fires, `arm`
/// builds the next one.
struct CancelSignal<C, F> {
    arm: C,
    listener: Pin<Box<F>>,
}

impl<C, F> CancelSignal<C, F>
where
    C: FnMut() -> F,
    F: Future<Output = ()>,
{
    fn new(mut arm: C) -> Self {
        let listener = Box::pin(arm());
        CancelSignal { arm, listener }
    }

    async fn fired(&mut self) {
        self.listener.as_mut().await;
        self.listener = Box::pin((self.arm)());
    }
}

/// What a blocking family reads from.
#[derive(Clone)]
struct Sources {
    providers: Providers,
    clock: fn() -> SystemTime,
}

type ReadFamily = fn(&Sources) -> ProbeResult<Section>;

pub struct Reporter {
    sources: Sources,
    sampling: SamplingPolicy,
    families: Vec<MetricFamily>,
}

impl Reporter {
    pub fn new(providers: Providers, sampling: SamplingPolicy) -> Self {
        Reporter {
            sources: Sources {
                providers,
                clock: SystemTime::now,
            },
            sampling,
            families: MetricFamily::ALL.to_vec(),
        }
    }

    /// Report only these families, in this order. Repeats are dropped and
    /// an empty list means every family.
    pub fn with_families(mut self, families: &[MetricFamily]) -> Self {
        if families.is_empty() {
            self.families = MetricFamily::ALL.to_vec();
            return self;
        }
        self.families.clear();
        for &family in families {
            if !self.families.contains(&family) {
                self.families.push(family);
            }
        }
        self
    }

    pub fn with_clock(mut self, clock: fn() -> SystemTime) -> Self {
        self.sources.clock = clock;
        self
    }

    pub fn families(&self) -> &[MetricFamily] {
        &self.families
    }

    /// Run every family once.
    ///
    /// `cancel` is called to build a listener, and again each time one
    /// fires. A firing during the processor sampling wait interrupts only
    /// that family. A firing while any other family is being collected
    /// ends the run: that family and every one after it are recorded as
    /// interrupted.
    pub async fn run<C, F>(&self, cancel: C) -> Report
    where
        C: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let mut cancel = CancelSignal::new(cancel);
        let mut report = Report::default();
        let mut stopped = false;

        for &family in &self.families {
            let outcome = if stopped {
                Err(cancelled())
            } else {
                debug!(family = family.title(), "collecting");
                match self.collect(family, &mut cancel).await {
                    Some(outcome) => outcome,
                    None => {
                        warn!(family = family.title(), "report cancelled");
                        stopped = true;
                        Err(cancelled())
                    }
                }
            };
            if let Err(err) = &outcome {
                warn!(family = family.title(), error = %err, "metric family failed");
            }
            report.families.push(FamilyReport { family, outcome });
        }

        report
    }

    /// Run a report on a fresh current-thread runtime and shut it down
    /// without waiting on provider reads that are still blocked.
    pub fn run_blocking<C, F>(&self, cancel: C) -> io::Result<Report>
    where
        C: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let report = runtime.block_on(self.run(cancel));
        runtime.shutdown_background();
        Ok(report)
    }

    async fn collect<C, F>(
        &self,
        family: MetricFamily,
        cancel: &mut CancelSignal<C, F>,
    ) -> Option<ProbeResult<Section>>
    where
        C: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let read: ReadFamily = match family {
            MetricFamily::Processor => return Some(self.processor(cancel).await),
            MetricFamily::Memory => Sources::memory,
            MetricFamily::Os => Sources::os,
            MetricFamily::Runtime => Sources::runtime,
            MetricFamily::Tasks => Sources::tasks,
            MetricFamily::Filesystems => Sources::filesystems,
        };
        self.blocking(read, cancel).await
    }

    async fn processor<C, F>(&self, cancel: &mut CancelSignal<C, F>) -> ProbeResult<Section>
    where
        C: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let interval = self.sampling.interval;
        let deadline = self.sampling.deadline();

        let sample = async {
            let prev = self.read_ticks().await?;
            let interrupted = tokio::select! {
                biased;
                _ = cancel.fired() => true,
                _ = tokio::time::sleep(interval) => false,
            };
            if interrupted {
                return Err(ProbeError::InterruptedWait("cancelled".to_string()));
            }
            let curr = self.read_ticks().await?;
            Ok::<_, ProbeError>((prev, curr))
        };
        let (prev, curr) = tokio::time::timeout(deadline, sample).await.map_err(|_| {
            ProbeError::InterruptedWait(format!(
                "processor sample exceeded {} ms",
                deadline.as_millis()
            ))
        })??;

        let cores = match self.sources.providers.hardware.logical_processor_count() {
            Ok(count) => count.to_string(),
            Err(err) => {
                warn!(error = %err, "logical processor count unavailable");
                NOT_AVAILABLE.to_string()
            }
        };
        let [system, user, total] = match compute_delta(&prev, &curr) {
            Ok(u) => [u.system_fraction, u.user_fraction, u.total_fraction].map(format_rate),
            Err(err) => {
                let marker = marker_for(MetricFamily::Processor, &err);
                [marker.clone(), marker.clone(), marker]
            }
        };

        Ok(Section::default()
            .field("Logical processors", cores)
            .field("System utilization", system)
            .field("User utilization", user)
            .field("Total utilization", total))
    }

    async fn read_ticks(&self) -> ProbeResult<CounterSnapshot> {
        let hardware = Arc::clone(&self.sources.providers.hardware);
        tokio::task::spawn_blocking(move || hardware.processor_ticks())
            .await
            .map_err(|e| ProbeError::unavailable("hardware", format!("tick reader failed: {e}")))?
    }

    /// `None` when `cancel` fired before the read finished. The read itself
    /// is left to run out on its blocking thread.
    async fn blocking<C, F>(
        &self,
        read: ReadFamily,
        cancel: &mut CancelSignal<C, F>,
    ) -> Option<ProbeResult<Section>>
    where
        C: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let sources = self.sources.clone();
        let work = tokio::task::spawn_blocking(move || read(&sources));
        tokio::select! {
            biased;
            joined = work => Some(joined.unwrap_or_else(|e| {
                Err(ProbeError::unavailable("collector", format!("collection task failed: {e}")))
            })),
            _ = cancel.fired() => None,
        }
    }
}

fn cancelled() -> ProbeError {
    ProbeError::InterruptedWait("report cancelled".to_string())
}

impl Sources {
    fn memory(&self) -> ProbeResult<Section> {
        let memory = self.providers.hardware.memory_capacity()?;
        let [used, available, usage] = capacity_values(MetricFamily::Memory, &memory);
        Ok(Section::default()
            .field("Total", format_bytes(memory.total))
            .field("Used", used)
            .field("Available", available)
            .field("Usage", usage))
    }

    fn os(&self) -> ProbeResult<Section> {
        let identity = self.providers.os.identity()?;
        Ok(Section::default()
            .field("Name", identity.name)
            .field("Architecture", identity.architecture)
            .field("Descriptor", identity.descriptor)
            .field(
                "Host",
                identity.host_name.unwrap_or_else(|| "unknown".to_string()),
            ))
    }

    fn runtime(&self) -> ProbeResult<Section> {
        let stats = self.providers.runtime.runtime_stats()?;
        let heap = |value: Option<u64>| value.map_or_else(|| UNTRACKED.to_string(), format_bytes);
        let uptime = match Uptime::between(stats.started_at, (self.clock)()) {
            Ok(up) => format_uptime(up.days, up.hours, up.minutes),
            Err(err) => marker_for(MetricFamily::Runtime, &err),
        };

        Ok(Section::default()
            .field("Version", env!("CARGO_PKG_VERSION"))
            .field("Resident memory", format_bytes(stats.resident))
            .field("Virtual memory", format_bytes(stats.virtual_size))
            .field("Heap in use", heap(stats.heap_in_use))
            .field("Heap peak", heap(stats.heap_peak))
            .field("Uptime", uptime))
    }

    fn tasks(&self) -> ProbeResult<Section> {
        let tasks = self.providers.tasks.active_tasks()?;
        let mut section = Section::default().field("Active tasks", tasks.len().to_string());
        section.rows = tasks
            .into_iter()
            .map(|task| {
                let values = [
                    ("id", task.id.to_string()),
                    ("name", task.name),
                    ("state", task.state.to_string()),
                ];
                Row {
                    kind: "Task",
                    fields: labelled(values),
                }
            })
            .collect();
        Ok(section)
    }

    fn filesystems(&self) -> ProbeResult<Section> {
        let stores = self.providers.os.filesystems()?;
        let mut section = Section::default().field("Mounted stores", stores.len().to_string());
        for store in stores {
            let [used, available, usage] =
                capacity_values(MetricFamily::Filesystems, &store.capacity);
            let values = [
                ("name", store.name),
                ("mount", store.mount_point),
                ("type", store.kind),
                ("total", format_bytes(store.capacity.total)),
                ("used", used),
                ("available", available),
                ("usage", usage),
            ];
            section.rows.push(Row {
                kind: "Filesystem",
                fields: labelled(values),
            });
        }
        Ok(section)
    }
}

fn labelled<const N: usize>(values: [(&'static str, String); N]) -> Vec<Field> {
    values
        .into_iter()
        .map(|(label, value)| Field { label, value })
        .collect()
}

/// Used, available and usage columns for a capacity.
fn capacity_values(family: MetricFamily, capacity: &CapacityInfo) -> [String; 3] {
    let used = match capacity.used_bytes() {
        Ok(bytes) => format_bytes(bytes),
        Err(err) => marker_for(family, &err),
    };
    let usage = match capacity.used_fraction() {
        Ok(fraction) => format_rate(fraction),
        Err(err) => marker_for(family, &err),
    };
    [used, format_bytes(capacity.available), usage]
}

/// Placeholder for a value that could not be derived. Anomalies are also
/// logged at warn.
fn marker_for(family: MetricFamily, err: &ProbeError) -> String {
    if err.is_anomaly() {
        warn!(family = family.title(), error = %err, "anomalous reading");
        ANOMALOUS.to_string()
    } else {
        NOT_AVAILABLE.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeated_families_collapse() {
        let reporter = Reporter::new(Providers::system(), SamplingPolicy::default()).with_families(
            &[
                MetricFamily::Memory,
                MetricFamily::Processor,
                MetricFamily::Memory,
            ],
        );
        assert_eq!(
            reporter.families(),
            &[MetricFamily::Memory, MetricFamily::Processor]
        );
    }

    #[test]
    fn empty_family_list_means_all() {
        let reporter =
            Reporter::new(Providers::system(), SamplingPolicy::default()).with_families(&[]);
        assert_eq!(reporter.families(), &MetricFamily::ALL);
    }

    #[test]
    fn deadline_covers_the_wait() {
        let policy = SamplingPolicy {
            interval: Duration::from_millis(6000),
            timeout: Duration::from_millis(5000),
        };
        assert_eq!(policy.deadline(), Duration::from_millis(11_000));

        let unbounded = SamplingPolicy {
            interval: Duration::MAX,
            timeout: Duration::from_secs(1),
        };
        assert_eq!(unbounded.deadline(), Duration::MAX);
    }

    #[test]
    fn capacity_markers() {
        let zero = capacity_values(MetricFamily::Filesystems, &CapacityInfo::new(0, 0));
        assert_eq!(zero, ["0 B".to_string(), "0 B".into(), NOT_AVAILABLE.into()]);

        let odd = capacity_values(MetricFamily::Memory, &CapacityInfo::new(1024, 2048));
        assert_eq!(odd, [ANOMALOUS.to_string(), "2.0 KB".into(), ANOMALOUS.into()]);
    }

    #[test]
    fn report_tracks_failures() {
        let report = Report {
            families: vec![
                FamilyReport {
                    family: MetricFamily::Memory,
                    outcome: Ok(Section::default()),
                },
                FamilyReport {
                    family: MetricFamily::Tasks,
                    outcome: Err(ProbeError::unavailable("task", "denied")),
                },
            ],
        };
        assert!(!report.is_complete());
        let failed: Vec<_> = report.failures().map(|(f, _)| *f).collect();
        assert_eq!(failed, vec![MetricFamily::Tasks]);
    }
}
