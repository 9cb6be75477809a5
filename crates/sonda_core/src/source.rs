//! Contrato com a fonte de bytes.
//!
//! O núcleo nunca abre nem configura a porta serial: só consome bytes
//! de um [`ByteSource`] e pede o fechamento ao encerrar. Os backends
//! concretos (porta serial real, fonte roteirizada em testes) vivem nas
//! crates executáveis.

use std::time::Duration;

/// Falha de leitura da fonte de bytes.
///
/// Sempre fatal para a sessão de leitura corrente: o núcleo não tenta
/// de novo; reconexão é política de quem orquestra sessões.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("Erro de E/S na leitura: {0}")]
    Io(#[from] std::io::Error),
}

/// Fonte de bytes com leitura bloqueante limitada por timeout.
pub trait ByteSource {
    /// Lê o próximo byte, aguardando no máximo `timeout`.
    ///
    /// `Ok(None)` significa timeout sem dados — não é erro e o chamador
    /// deve simplesmente tentar de novo (é aí que o cancelamento é
    /// observado).
    fn read_byte(&mut self, timeout: Duration) -> Result<Option<u8>, SourceError>;

    /// Libera o recurso subjacente. Idempotente.
    fn close(&mut self);
}
