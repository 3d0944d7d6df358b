use crate::adapters::{BrasilApiClient, ViaCepClient};
use crate::config::toml_config::DEFAULT_CANCEL_GRACE_MS;
use crate::config::LookupConfig;
use crate::domain::model::{Deadline, LookupResult};
use crate::domain::ports::AddressProvider;
use crate::utils::error::{LookupError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::task::{AbortHandle, JoinHandle};
use tokio::time::Instant;

pub const TIMEOUT_NOTICE: &str = "Timeout ao consultar o CEP";
pub const ERROR_PREFIX: &str = "Erro ao consultar o CEP:";

/// 兩個供應商的結果都放得下，送出永遠不會阻塞
const OUTCOME_CHANNEL_CAPACITY: usize = 2;

#[derive(Debug)]
pub enum RaceOutcome {
    Found { result: LookupResult, elapsed: Duration },
    Failed { error: LookupError, elapsed: Duration },
    TimedOut { elapsed: Duration },
}

impl RaceOutcome {
    pub fn elapsed(&self) -> Duration {
        match self {
            RaceOutcome::Found { elapsed, .. }
            | RaceOutcome::Failed { elapsed, .. }
            | RaceOutcome::TimedOut { elapsed } => *elapsed,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RaceOutcome::TimedOut { .. })
    }

    /// 終端輸出：結果區塊、一行錯誤或逾時提示
    pub fn render(&self) -> String {
        match self {
            RaceOutcome::Found { result, .. } => result.to_string(),
            RaceOutcome::Failed { error, .. } => format!("{} {}", ERROR_PREFIX, error),
            RaceOutcome::TimedOut { .. } => TIMEOUT_NOTICE.to_string(),
        }
    }
}

impl fmt::Display for RaceOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

/// Runs both providers concurrently under one deadline and keeps the first
/// outcome, success or failure. The losing lookup is cancelled and joined
/// for at most `cancel_grace` before `run` returns.
pub struct RaceOrchestrator {
    providers: [Arc<dyn AddressProvider>; 2],
    timeout: Duration,
    cancel_grace: Duration,
}

impl RaceOrchestrator {
    pub fn new(
        first: Arc<dyn AddressProvider>,
        second: Arc<dyn AddressProvider>,
        timeout: Duration,
    ) -> Self {
        Self {
            providers: [first, second],
            timeout,
            cancel_grace: Duration::from_millis(DEFAULT_CANCEL_GRACE_MS),
        }
    }

    pub fn with_cancel_grace(mut self, cancel_grace: Duration) -> Self {
        self.cancel_grace = cancel_grace;
        self
    }

    pub fn from_config(config: &LookupConfig) -> Result<Self> {
        let brasil_api = BrasilApiClient::new(&config.providers.brasil_api, &config.lookup)?;
        let via_cep = ViaCepClient::new(&config.providers.via_cep, &config.lookup)?;

        Ok(Self::new(Arc::new(brasil_api), Arc::new(via_cep), config.timeout())
            .with_cancel_grace(config.cancel_grace()))
    }

    pub async fn run(&self, postal_code: &str) -> RaceOutcome {
        let started = Instant::now();
        let deadline = Deadline::after(self.timeout);

        let (result_tx, mut result_rx) = mpsc::channel::<LookupResult>(OUTCOME_CHANNEL_CAPACITY);
        let (error_tx, mut error_rx) = mpsc::channel::<LookupError>(OUTCOME_CHANNEL_CAPACITY);
        let (cancel_tx, _) = broadcast::channel::<()>(1);

        tracing::debug!(
            "🏁 Racing {} and {} for CEP {} (deadline {:?})",
            self.providers[0].kind(),
            self.providers[1].kind(),
            postal_code,
            self.timeout
        );

        let workers: Vec<JoinHandle<()>> = self
            .providers
            .iter()
            .map(|provider| {
                spawn_lookup(
                    Arc::clone(provider),
                    deadline,
                    postal_code.to_string(),
                    result_tx.clone(),
                    error_tx.clone(),
                    cancel_tx.subscribe(),
                )
            })
            .collect();
        let mut abort_handles: Vec<AbortHandle> =
            workers.iter().map(JoinHandle::abort_handle).collect();

        // 兩個查詢都結束後才關閉通道
        let coordinator = tokio::spawn(async move {
            for worker in workers {
                if let Err(e) = worker.await {
                    if e.is_panic() {
                        tracing::error!("❌ Lookup task panicked: {}", e);
                    }
                }
            }
            drop(result_tx);
            drop(error_tx);
        });
        abort_handles.push(coordinator.abort_handle());

        // 已關閉的通道會停用該分支，只有截止時間一定會觸發
        let outcome = tokio::select! {
            Some(result) = result_rx.recv() => RaceOutcome::Found {
                result,
                elapsed: started.elapsed(),
            },
            Some(error) = error_rx.recv() => RaceOutcome::Failed {
                error,
                elapsed: started.elapsed(),
            },
            _ = tokio::time::sleep_until(deadline.instant()) => RaceOutcome::TimedOut {
                elapsed: started.elapsed(),
            },
        };
        let outcome = settle_at_deadline(outcome, deadline);

        match &outcome {
            RaceOutcome::Found { result, elapsed } => {
                tracing::info!("✅ {} answered first in {:?}", result.provider(), elapsed)
            }
            RaceOutcome::Failed { error, elapsed } => {
                tracing::warn!("❌ {} failed first in {:?}", error.provider, elapsed)
            }
            RaceOutcome::TimedOut { elapsed } => {
                tracing::warn!("⏱️ No provider answered within {:?}", elapsed)
            }
        }

        self.shutdown(cancel_tx, coordinator, abort_handles).await;
        outcome
    }

    /// 通知落後的查詢取消，最多等待 `cancel_grace`，逾時則強制中止
    async fn shutdown(
        &self,
        cancel_tx: broadcast::Sender<()>,
        coordinator: JoinHandle<()>,
        abort_handles: Vec<AbortHandle>,
    ) {
        // 沒有接收者代表查詢都已結束
        let _ = cancel_tx.send(());

        match tokio::time::timeout(self.cancel_grace, coordinator).await {
            Ok(_) => tracing::debug!("All lookup tasks finished"),
            Err(_) => {
                tracing::warn!(
                    "⚠️ Lookup tasks still running after {:?}, aborting",
                    self.cancel_grace
                );
                for handle in abort_handles {
                    handle.abort();
                }
            }
        }
    }
}

/// 請求逾時與截止時間在同一個 timer tick 觸發時，一律回報整體逾時
fn settle_at_deadline(outcome: RaceOutcome, deadline: Deadline) -> RaceOutcome {
    match outcome {
        RaceOutcome::Failed { error, elapsed } if error.is_timeout() && deadline.has_expired() => {
            tracing::debug!("{} timed out at the deadline", error.provider);
            RaceOutcome::TimedOut { elapsed }
        }
        other => other,
    }
}

fn spawn_lookup(
    provider: Arc<dyn AddressProvider>,
    deadline: Deadline,
    postal_code: String,
    result_tx: mpsc::Sender<LookupResult>,
    error_tx: mpsc::Sender<LookupError>,
    mut cancel_rx: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let kind = provider.kind();
        let outcome = tokio::select! {
            outcome = provider.lookup(deadline, &postal_code) => outcome,
            _ = cancel_rx.recv() => {
                tracing::debug!("{} lookup cancelled", kind);
                return;
            }
        };

        // 接收端已經離開時結果直接丟棄
        match outcome {
            Ok(result) => {
                tracing::debug!("{} returned CEP {}", kind, result.cep());
                let _ = result_tx.send(result).await;
            }
            Err(error) => {
                tracing::debug!("{} failed: {}", kind, error);
                let _ = error_tx.send(error).await;
            }
        }
    })
}
