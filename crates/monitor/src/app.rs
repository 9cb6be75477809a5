//! Dono da agregação: registro, vitalidade e janela de período.
//!
//! Um único dono lógico muta os três componentes — as amostras chegam
//! serializadas pelo channel do leitor, na ordem de decodificação, e
//! os tiques de relógio acontecem entre recepções. Nenhum acesso
//! concorrente ao estado.

use crate::reader::SampleMessage;
use crate::session::{ReaderSession, SessionError};
use crossbeam_channel::{Receiver, RecvTimeoutError};
use sonda_core::config::MonitorConfig;
use sonda_core::events::{EventBus, MonitorEvent};
use sonda_core::liveness::{LivenessMonitor, LivenessSnapshot};
use sonda_core::period::PeriodAggregator;
use sonda_core::registry::{DeviceRegistry, UpdateOutcome};
use sonda_core::types::{DeviceSample, DeviceType};
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Cadência de avaliação dos indicadores de vitalidade.
const LIVENESS_TICK: Duration = Duration::from_secs(1);

/// Estado agregado da sessão de monitoramento.
pub struct MonitorApp {
    registry: DeviceRegistry,
    liveness: LivenessMonitor,
    period: PeriodAggregator,
    bus: EventBus,
    last_liveness: Option<LivenessSnapshot>,
}

impl MonitorApp {
    pub fn new(config: &MonitorConfig, now: Instant) -> Self {
        Self {
            registry: DeviceRegistry::new(),
            liveness: LivenessMonitor::new(config.liveness_thresholds()),
            period: PeriodAggregator::new(now),
            bus: EventBus::new(),
            last_liveness: None,
        }
    }

    /// Registra um assinante de eventos (console, log, futuro painel).
    pub fn subscribe(&mut self, handler: impl FnMut(&MonitorEvent) + Send + 'static) {
        self.bus.subscribe(handler);
    }

    pub fn registry(&self) -> &DeviceRegistry {
        &self.registry
    }

    /// Aplica uma amostra decodificada e emite o evento correspondente.
    ///
    /// Todo pacote conta na janela de período (inclusive desconhecidos,
    /// que o registro ignora); só sondas inéditas contam como
    /// dispositivo novo na janela.
    pub fn handle_sample(&mut self, seq: u64, sample: DeviceSample, now: Instant) -> UpdateOutcome {
        let outcome = self.registry.apply(&sample, now);
        self.period.on_sample();

        match outcome {
            UpdateOutcome::NewDevice => {
                self.liveness.mark(sample.device_type, now);
                if sample.device_type == DeviceType::Sensor {
                    self.period.on_new_device();
                }
            }
            UpdateOutcome::UpdatedDevice => {
                self.liveness.mark(sample.device_type, now);
            }
            UpdateOutcome::Ignored => {}
        }

        self.bus
            .emit(&MonitorEvent::Sample { seq, sample, outcome });
        outcome
    }

    /// Reavalia a vitalidade; emite evento apenas quando algum indicador
    /// muda de estado.
    pub fn tick_liveness(&mut self, now: Instant, connected: bool) {
        let snapshot = self.liveness.tick(now, connected);
        if self.last_liveness != Some(snapshot) {
            self.last_liveness = Some(snapshot);
            self.bus.emit(&MonitorEvent::Liveness(snapshot));
        }
    }

    /// Fecha a janela de período e emite a sumarização.
    pub fn close_period(&mut self, now: Instant) {
        let summary = self.period.close_window(now);
        self.bus.emit(&MonitorEvent::Summary(summary));
    }

    /// Reinício completo dos registros, contadores e janela.
    ///
    /// Recusado enquanto o leitor estiver ativo: uma amostra em trânsito
    /// aplicada depois do reset corromperia os contadores. O chamador
    /// deve parar e aguardar (`stop`/`join`) antes.
    pub fn reset(&mut self, session: &ReaderSession, now: Instant) -> Result<(), SessionError> {
        if !session.can_reset() {
            return Err(SessionError::ResetWhileActive(session.state()));
        }

        self.registry.reset();
        self.liveness.reset();
        self.period.reset(now);
        self.last_liveness = None;
        info!("Dados e estatísticas reiniciados");
        Ok(())
    }
}

/// Loop do dono da agregação: consome o channel do leitor e dispara os
/// tiques de relógio nos prazos. Retorna quando o leitor encerra o
/// channel (parada ou erro de fonte).
pub fn run_loop(app: &mut MonitorApp, rx: &Receiver<SampleMessage>, summary_interval: Duration) {
    let mut next_liveness = Instant::now() + LIVENESS_TICK;
    let mut next_summary = Instant::now() + summary_interval;

    loop {
        let deadline = next_liveness.min(next_summary);

        match rx.recv_deadline(deadline) {
            Ok(msg) => {
                app.handle_sample(msg.seq, msg.sample, Instant::now());
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                warn!("Leitor encerrou; saindo do loop de agregação");
                return;
            }
        }

        let now = Instant::now();
        if now >= next_liveness {
            app.tick_liveness(now, true);
            next_liveness = now + LIVENESS_TICK;
        }
        if now >= next_summary {
            app.close_period(now);
            next_summary = now + summary_interval;
        }
    }
}
