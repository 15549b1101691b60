use redis_protocol::resp2::types::OwnedFrame as Frame;

pub trait SetOperations {
    /// Adds the specified members to the set stored at key.
    fn sadd(&self, key: &[u8], members: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;

    /// Removes the specified members from the set stored at key.
    fn srem(&self, key: &[u8], members: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns all the members of the set value stored at key.
    fn smembers(&self, key: &[u8]) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns the number of members of the set stored at key.
    fn scard(&self, key: &[u8]) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns if member is a member of the set stored at key.
    fn sismember(&self, key: &[u8], member: &[u8]) -> impl std::future::Future<Output = Frame> + Send;

    /// Removes and returns members of the set stored at key; one bulk string when `count` is absent.
    fn spop(&self, key: &[u8], count: Option<usize>) -> impl std::future::Future<Output = Frame> + Send;

    /// Moves member from the set at source to the set at destination.
    fn smove(
        &self,
        source: &[u8],
        destination: &[u8],
        member: &[u8],
    ) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns the members of the set resulting from the union of all the given sets.
    fn sunion(&self, keys: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns the members of the set resulting from the intersection of all the given sets.
    fn sinter(&self, keys: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;

    /// Returns the members of the set resulting from the difference between the first set and all the successive sets.
    fn sdiff(&self, keys: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;

    /// Deletes the sets stored at the given keys.
    fn del(&self, keys: &[Vec<u8>]) -> impl std::future::Future<Output = Frame> + Send;
}
