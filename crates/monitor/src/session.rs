//! Máquina de estados da sessão de ingestão.
//!
//! `Disconnected → Connected → StopRequested → Stopped → Disconnected`.
//! A parada é cooperativa: um token atômico por sessão (nada de flag
//! global) que o leitor observa a cada tentativa de leitura. `Stopped`
//! só é alcançado por `join` — esperar por sleep deixaria um quadro em
//! trânsito mutar o estado depois de um reset lógico.

use crate::reader::{ReaderExit, ReaderOptions, SampleMessage, spawn_reader_thread};
use crossbeam_channel::Receiver;
use sonda_core::source::ByteSource;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use tracing::{info, warn};

/// Estado da sessão de leitura.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Disconnected,
    Connected,
    StopRequested,
    Stopped,
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Sessão já conectada")]
    AlreadyConnected,
    #[error("Reset exige sessão parada (estado atual: {0:?})")]
    ResetWhileActive(SessionState),
}

/// Sessão de leitura: dona do token de parada e do handle da thread.
pub struct ReaderSession {
    state: SessionState,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<ReaderExit>>,
}

impl ReaderSession {
    pub fn new() -> Self {
        Self {
            state: SessionState::Disconnected,
            cancel: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Conecta: inicia a thread de leitura sobre a fonte dada.
    pub fn connect(
        &mut self,
        source: Box<dyn ByteSource + Send>,
        options: ReaderOptions,
    ) -> Result<Receiver<SampleMessage>, SessionError> {
        if matches!(
            self.state,
            SessionState::Connected | SessionState::StopRequested
        ) {
            return Err(SessionError::AlreadyConnected);
        }

        // Token novo por sessão: um stop antigo não pode vazar
        self.cancel = Arc::new(AtomicBool::new(false));
        let (rx, handle) = spawn_reader_thread(source, options, self.cancel.clone());
        self.handle = Some(handle);
        self.state = SessionState::Connected;
        info!("Sessão de leitura iniciada");
        Ok(rx)
    }

    /// Sinaliza a parada cooperativa. O leitor observa o token na
    /// próxima tentativa de leitura (limitado pelo poll, não imediato).
    pub fn request_stop(&mut self) {
        if self.state == SessionState::Connected {
            self.cancel.store(true, Ordering::Relaxed);
            self.state = SessionState::StopRequested;
        }
    }

    /// Aguarda o término da thread de leitura e transiciona a `Stopped`.
    ///
    /// É o único caminho para `Stopped`: garante que nenhuma amostra em
    /// trânsito será produzida depois daqui.
    pub fn join(&mut self) -> Option<ReaderExit> {
        let handle = self.handle.take()?;
        let exit = match handle.join() {
            Ok(exit) => exit,
            Err(_) => {
                warn!("Thread de leitura terminou em pânico");
                ReaderExit::Cancelled
            }
        };
        self.state = SessionState::Stopped;
        info!("Sessão de leitura parada ({exit:?})");
        Some(exit)
    }

    /// Parada completa: sinaliza e aguarda.
    pub fn stop(&mut self) -> Option<ReaderExit> {
        self.request_stop();
        self.join()
    }

    /// Um reset de estado só é permitido sem leitor ativo.
    pub fn can_reset(&self) -> bool {
        matches!(
            self.state,
            SessionState::Disconnected | SessionState::Stopped
        )
    }

    /// Encerra o ciclo: `Stopped → Disconnected`, pronta para reconectar.
    pub fn disconnect(&mut self) {
        if self.state == SessionState::Stopped {
            self.state = SessionState::Disconnected;
        }
    }
}

impl Default for ReaderSession {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::ScriptedSource;
    use sonda_core::decode::FwOffset;
    use std::time::Duration;

    fn options() -> ReaderOptions {
        ReaderOptions {
            poll_timeout: Duration::from_millis(1),
            fw_offset: FwOffset::Byte19,
            resync_after_unknown: 0,
        }
    }

    #[test]
    fn full_lifecycle_reaches_stopped_by_join() {
        let mut session = ReaderSession::new();
        assert_eq!(session.state(), SessionState::Disconnected);
        assert!(session.can_reset());

        let _rx = session
            .connect(Box::new(ScriptedSource::new(vec![])), options())
            .unwrap();
        assert_eq!(session.state(), SessionState::Connected);
        assert!(!session.can_reset());

        session.request_stop();
        assert_eq!(session.state(), SessionState::StopRequested);
        assert!(!session.can_reset());

        let exit = session.join().expect("thread deve existir");
        assert!(matches!(exit, ReaderExit::Cancelled));
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(session.can_reset());

        session.disconnect();
        assert_eq!(session.state(), SessionState::Disconnected);
    }

    #[test]
    fn double_connect_is_rejected() {
        let mut session = ReaderSession::new();
        let _rx = session
            .connect(Box::new(ScriptedSource::new(vec![])), options())
            .unwrap();

        let again = session.connect(Box::new(ScriptedSource::new(vec![])), options());
        assert!(matches!(again, Err(SessionError::AlreadyConnected)));

        session.stop();
    }

    #[test]
    fn source_failure_surfaces_in_join() {
        let mut session = ReaderSession::new();
        let source = ScriptedSource::new(vec![]).fail_after_exhausted();
        let rx = session.connect(Box::new(source), options()).unwrap();

        // O leitor morre sozinho; o channel desconecta
        assert!(rx.recv_timeout(Duration::from_secs(5)).is_err());
        let exit = session.join().unwrap();
        assert!(matches!(exit, ReaderExit::Source(_)));
        assert_eq!(session.state(), SessionState::Stopped);
    }

    #[test]
    fn reconnect_after_stop_uses_fresh_token() {
        let mut session = ReaderSession::new();
        let _rx = session
            .connect(Box::new(ScriptedSource::new(vec![])), options())
            .unwrap();
        session.stop();
        session.disconnect();

        // O token da sessão anterior ficou em true; a nova não herda
        let rx = session
            .connect(Box::new(ScriptedSource::new(vec![0x01])), options())
            .unwrap();
        assert_eq!(session.state(), SessionState::Connected);

        // Leitor vivo: ainda não desconectou o channel
        assert!(matches!(
            rx.recv_timeout(Duration::from_millis(200)),
            Err(crossbeam_channel::RecvTimeoutError::Timeout)
        ));
        session.stop();
    }
}
