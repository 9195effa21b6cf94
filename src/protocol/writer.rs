use super::error::LinkError;

/// Outbound byte stream for GET replies. No escaping or framing is added;
/// bytes leave in the order they are emitted.
#[allow(async_fn_in_trait)]
pub trait ResponseWriter {
    async fn emit(&mut self, bytes: &[u8]) -> Result<(), LinkError>;

    /// Push out anything the transport is holding back. Called once at the
    /// end of every reply.
    async fn flush(&mut self) -> Result<(), LinkError> {
        Ok(())
    }
}
