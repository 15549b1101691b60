use redis_protocol::resp2::types::OwnedFrame as Frame;

pub trait ConnectionOperations {
    /// Responds to a PING command with an optional message.
    fn ping(&self, message: Option<&[u8]>) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns `message` unchanged.
    fn echo(&self, message: &[u8]) -> impl std::future::Future<Output = Frame> + Send;

    /// Switches the connection to the logical database `index`.
    fn select(&self, index: &[u8]) -> impl std::future::Future<Output = Frame> + Send;

    /// Acknowledges and marks the connection for closing.
    fn quit(&self) -> impl std::future::Future<Output = Frame> + Send;
}
