//! Backend de porta serial para o [`ByteSource`] do núcleo.
//!
//! Abertura em 8N1 sem controle de fluxo, como os dispositivos de campo
//! esperam. A enumeração prefere portas USB/ACM, que é onde o conversor
//! das sondas aparece.

use sonda_core::source::{ByteSource, SourceError};
use std::io::Read;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Porta serial aberta, exclusiva do leitor enquanto ativa.
pub struct SerialSource {
    port: Box<dyn serialport::SerialPort>,
    current_timeout: Duration,
    closed: bool,
}

impl SerialSource {
    /// Abre a porta em 8N1, sem paridade nem controle de fluxo.
    pub fn open(path: &str, baud_rate: u32) -> Result<Self, serialport::Error> {
        let port = serialport::new(path, baud_rate)
            .data_bits(serialport::DataBits::Eight)
            .parity(serialport::Parity::None)
            .stop_bits(serialport::StopBits::One)
            .flow_control(serialport::FlowControl::None)
            .timeout(Duration::from_millis(1))
            .open()?;

        info!("Porta {path} aberta a {baud_rate} baud");
        Ok(Self {
            port,
            current_timeout: Duration::from_millis(1),
            closed: false,
        })
    }
}

impl ByteSource for SerialSource {
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>, SourceError> {
        if timeout != self.current_timeout {
            self.port
                .set_timeout(timeout)
                .map_err(std::io::Error::from)?;
            self.current_timeout = timeout;
        }

        let mut byte = [0u8; 1];
        match self.port.read(&mut byte) {
            Ok(0) => Ok(None),
            Ok(_) => Ok(Some(byte[0])),
            Err(e)
                if e.kind() == std::io::ErrorKind::TimedOut
                    || e.kind() == std::io::ErrorKind::WouldBlock =>
            {
                // Timeout normal, sem dados
                Ok(None)
            }
            Err(e) => Err(SourceError::Io(e)),
        }
    }

    fn close(&mut self) {
        // O handle é liberado no Drop; aqui só registramos o fechamento.
        if !self.closed {
            self.closed = true;
            debug!("Porta serial liberada");
        }
    }
}

/// Resolve a porta a usar: a configurada, ou a primeira candidata
/// encontrada na enumeração do sistema.
pub fn pick_port(configured: &str) -> Result<String, String> {
    if !configured.is_empty() {
        return Ok(configured.to_string());
    }

    let ports = serialport::available_ports().map_err(|e| e.to_string())?;
    if ports.is_empty() {
        return Err("Nenhuma porta serial encontrada".into());
    }

    for p in &ports {
        debug!("Porta disponível: {}", p.port_name);
    }

    // Prefere conversores USB (ttyACM/ttyUSB/COM de adaptador)
    let chosen = ports
        .iter()
        .find(|p| matches!(p.port_type, serialport::SerialPortType::UsbPort(_)))
        .unwrap_or(&ports[0]);

    info!("Porta autodetectada: {}", chosen.port_name);
    Ok(chosen.port_name.clone())
}

/// Lista as portas seriais visíveis no sistema.
pub fn list_ports() {
    match serialport::available_ports() {
        Ok(ports) if !ports.is_empty() => {
            for p in ports {
                let kind = match p.port_type {
                    serialport::SerialPortType::UsbPort(info) => {
                        format!("USB {:04x}:{:04x}", info.vid, info.pid)
                    }
                    serialport::SerialPortType::BluetoothPort => "Bluetooth".to_string(),
                    serialport::SerialPortType::PciPort => "PCI".to_string(),
                    serialport::SerialPortType::Unknown => "?".to_string(),
                };
                println!("  {} ({kind})", p.port_name);
            }
        }
        Ok(_) => println!("  Nenhuma porta encontrada"),
        Err(e) => warn!("Falha ao enumerar portas: {e}"),
    }
}
