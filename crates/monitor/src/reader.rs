//! Thread de leitura: bytes da porta → quadros → amostras no channel.
//!
//! A thread roda o sincronizador de quadros e a decodificação em linha
//! (ambos baratos) e entrega cada amostra pronta a quem agrega, via
//! channel limitado que preserva a ordem de chegada. O cancelamento é
//! cooperativo e observado a cada tentativa de leitura.

use crossbeam_channel::{Receiver, Sender, bounded};
use sonda_core::decode::{FwOffset, decode};
use sonda_core::frame::FrameSync;
use sonda_core::source::{ByteSource, SourceError};
use sonda_core::types::{DeviceSample, DeviceType};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{error, info, warn};

/// Capacidade do channel leitor → agregador.
const CHANNEL_CAPACITY: usize = 64;

/// Mensagem entregue ao lado de agregação.
#[derive(Debug, Clone)]
pub struct SampleMessage {
    /// Número sequencial do pacote na sessão (1-based)
    pub seq: u64,
    pub sample: DeviceSample,
}

/// Motivo de término da thread de leitura.
#[derive(Debug)]
pub enum ReaderExit {
    /// Sinal de parada observado
    Cancelled,
    /// Falha de E/S na fonte; fatal para a sessão
    Source(SourceError),
}

/// Parâmetros da thread de leitura.
#[derive(Debug, Clone, Copy)]
pub struct ReaderOptions {
    pub poll_timeout: Duration,
    pub fw_offset: FwOffset,
    /// Desliza 1 byte após N quadros desconhecidos seguidos; 0 = nunca
    pub resync_after_unknown: u32,
}

/// Inicia a thread de leitura. Retorna o receiver do channel e o handle
/// para aguardar o término (nunca espere por sleep: faça join).
pub fn spawn_reader_thread(
    source: Box<dyn ByteSource + Send>,
    options: ReaderOptions,
    cancel: Arc<AtomicBool>,
) -> (Receiver<SampleMessage>, JoinHandle<ReaderExit>) {
    let (tx, rx) = bounded::<SampleMessage>(CHANNEL_CAPACITY);

    let handle = std::thread::Builder::new()
        .name("leitor-serial".into())
        .spawn(move || reader_loop(source, options, cancel, &tx))
        .expect("Falha ao criar thread de leitura");

    (rx, handle)
}

fn reader_loop(
    mut source: Box<dyn ByteSource + Send>,
    options: ReaderOptions,
    cancel: Arc<AtomicBool>,
    tx: &Sender<SampleMessage>,
) -> ReaderExit {
    let mut sync = FrameSync::new();
    let mut seq: u64 = 0;
    let mut consecutive_unknown: u32 = 0;

    loop {
        // Cancelamento observado a cada tentativa de leitura; o quadro
        // parcial acumulado é descartado em silêncio.
        if cancel.load(Ordering::Relaxed) {
            source.close();
            info!("Leitura encerrada por sinal de parada ({} bytes parciais descartados)",
                sync.pending());
            return ReaderExit::Cancelled;
        }

        match source.read_byte(options.poll_timeout) {
            Ok(Some(byte)) => {
                let Some(frame) = sync.push(byte) else {
                    continue;
                };

                seq += 1;
                let sample = decode(&frame, options.fw_offset);

                if options.resync_after_unknown > 0 {
                    if sample.device_type == DeviceType::Unknown {
                        consecutive_unknown += 1;
                        if consecutive_unknown >= options.resync_after_unknown {
                            warn!(
                                "{consecutive_unknown} quadros desconhecidos seguidos; \
                                 deslizando alinhamento em 1 byte"
                            );
                            sync.resync_from(&frame[1..]);
                            consecutive_unknown = 0;
                        }
                    } else {
                        consecutive_unknown = 0;
                    }
                }

                // Send bloqueante: preserva a ordem de chegada e aplica
                // contrapressão em vez de descartar amostras.
                if tx.send(SampleMessage { seq, sample }).is_err() {
                    source.close();
                    info!("Agregador encerrou o channel; parando leitura");
                    return ReaderExit::Cancelled;
                }
            }
            Ok(None) => {
                // Timeout sem dados; volta e observa o cancelamento
            }
            Err(e) => {
                error!("Erro de leitura na porta: {e}");
                source.close();
                return ReaderExit::Source(e);
            }
        }
    }
}
