use super::util::{bulk, int};
use redis_protocol::resp2::types::OwnedFrame as Frame;

#[tokio::test]
async fn test_e2e_add_and_query() {
    with_e2e_server!(srv, client);

    assert_eq!(client.call(&["SADD", "k", "a", "b", "c"]).await, int(3));
    assert_eq!(client.call(&["SCARD", "k"]).await, int(3));
    assert_eq!(client.call(&["SISMEMBER", "k", "b"]).await, int(1));
    assert_eq!(client.call(&["SISMEMBER", "k", "z"]).await, int(0));
    assert_eq!(client.call(&["SADD", "k", "a", "a", "d"]).await, int(1));
    assert_eq!(client.call_set(&["SMEMBERS", "k"]).await, ["a", "b", "c", "d"]);

    srv.abort();
}

#[tokio::test]
async fn test_e2e_algebra() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k1", "a", "b", "c"]).await;
    client.call(&["SADD", "k2", "b", "c", "d"]).await;

    assert_eq!(client.call_set(&["SINTER", "k1", "k2"]).await, ["b", "c"]);
    assert_eq!(client.call_set(&["SUNION", "k1", "k2"]).await, ["a", "b", "c", "d"]);
    assert_eq!(client.call_set(&["SDIFF", "k1", "k2"]).await, ["a"]);
    assert_eq!(client.call(&["SINTER", "k1", "nothing"]).await, Frame::Null);
    assert_eq!(client.call_set(&["SDIFF", "nothing", "k1"]).await, Vec::<String>::new());

    srv.abort();
}

#[tokio::test]
async fn test_e2e_move() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k1", "a", "b"]).await;
    assert_eq!(client.call(&["SMOVE", "k1", "k2", "a"]).await, int(1));
    assert_eq!(client.call(&["SISMEMBER", "k1", "a"]).await, int(0));
    assert_eq!(client.call(&["SISMEMBER", "k2", "a"]).await, int(1));
    assert_eq!(client.call(&["SMOVE", "k1", "k2", "zzz"]).await, int(0));
    assert_eq!(client.call(&["SCARD", "k1"]).await, int(1));
    assert_eq!(client.call(&["SCARD", "k2"]).await, int(1));

    srv.abort();
}

#[tokio::test]
async fn test_e2e_pop() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k", "a", "b", "c"]).await;
    let popped = client.call_set(&["SPOP", "k", "2"]).await;
    assert_eq!(popped.len(), 2);
    assert_ne!(popped[0], popped[1]);
    for member in &popped {
        assert!(["a", "b", "c"].contains(&member.as_str()));
        assert_eq!(client.call(&["SISMEMBER", "k", member.as_str()]).await, int(0));
    }
    assert_eq!(client.call(&["SCARD", "k"]).await, int(1));

    match client.call(&["SPOP", "k"]).await {
        Frame::BulkString(_) => {}
        other => panic!("expected bulk string, got {:?}", other),
    }
    assert_eq!(client.call(&["SPOP", "k"]).await, Frame::Null);
    assert_eq!(client.call(&["SPOP", "k", "0"]).await, Frame::Array(Vec::new()));
    assert_eq!(
        client.call(&["SPOP", "k", "-1"]).await,
        Frame::Error("ERR value is out of range, must be positive".into())
    );

    srv.abort();
}

#[tokio::test]
async fn test_e2e_remove_duplicates() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k", "a", "b"]).await;
    assert_eq!(client.call(&["SREM", "k", "a", "a"]).await, int(1));
    assert_eq!(client.call(&["SREM", "k", "nope"]).await, int(0));
    assert_eq!(client.call(&["SCARD", "k"]).await, int(1));
    assert_eq!(client.call(&["SREM", "k", "b"]).await, int(1));
    assert_eq!(client.call_set(&["SMEMBERS", "k"]).await, Vec::<String>::new());

    srv.abort();
}

#[tokio::test]
async fn test_e2e_del_and_recreate() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k", "old"]).await;
    assert_eq!(client.call(&["DEL", "k", "missing"]).await, int(1));
    assert_eq!(client.call(&["SCARD", "k"]).await, int(0));
    client.call(&["SADD", "k", "new"]).await;
    assert_eq!(client.call_set(&["SMEMBERS", "k"]).await, ["new"]);

    srv.abort();
}

#[tokio::test]
async fn test_e2e_pipelined_commands() {
    with_e2e_server!(srv, client);

    client.send(&["SADD", "k", "a"]).await;
    client.send(&["SADD", "k", "b"]).await;
    client.send(&["SCARD", "k"]).await;
    assert_eq!(client.read().await, Some(int(1)));
    assert_eq!(client.read().await, Some(int(1)));
    assert_eq!(client.read().await, Some(int(2)));

    assert_eq!(client.call(&["ECHO", "still here"]).await, bulk("still here"));

    srv.abort();
}
