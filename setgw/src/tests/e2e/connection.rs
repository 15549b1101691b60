use super::util::{bulk, int, spawn_server_with};
use redis_protocol::resp2::types::OwnedFrame as Frame;

#[tokio::test]
async fn test_e2e_ping() {
    with_e2e_server!(srv, client);

    assert_eq!(client.call(&["PING"]).await, Frame::SimpleString(b"PONG".to_vec()));
    assert_eq!(client.call(&["ping", "hello"]).await, bulk("hello"));

    srv.abort();
}

#[tokio::test]
async fn test_e2e_select_isolates_databases() {
    with_e2e_server!(srv, client);

    client.call(&["SADD", "k", "zero"]).await;
    assert_eq!(client.call(&["SELECT", "1"]).await, Frame::SimpleString(b"OK".to_vec()));
    assert_eq!(client.call(&["SCARD", "k"]).await, int(0));
    client.call(&["SADD", "k", "one"]).await;
    assert_eq!(client.call(&["SELECT", "0"]).await, Frame::SimpleString(b"OK".to_vec()));
    assert_eq!(client.call_set(&["SMEMBERS", "k"]).await, ["zero"]);

    srv.abort();
}

#[tokio::test]
async fn test_e2e_quit() {
    with_e2e_server!(srv, client);

    assert_eq!(client.call(&["QUIT"]).await, Frame::SimpleString(b"OK".to_vec()));
    // After the reply the server closes the connection.
    assert_eq!(client.read().await, None);

    srv.abort();
}

#[tokio::test]
async fn test_e2e_unknown_command() {
    with_e2e_server!(srv, client);

    assert_eq!(
        client.call(&["FLY", "away"]).await,
        Frame::Error("ERR unknown command 'FLY', with args beginning with: 'away'".into())
    );

    srv.abort();
}

#[tokio::test]
async fn test_e2e_unfinished_request_is_bounded() {
    let (srv, mut client) = spawn_server_with(|server| server.with_max_pending(64)).await;

    assert_eq!(client.call(&["PING"]).await, Frame::SimpleString(b"PONG".to_vec()));
    // Announces a 1000 byte argument but never finishes it. The 21 byte header plus 44
    // bytes of payload goes one byte over the cap.
    client.send_raw(b"*2\r\n$4\r\nECHO\r\n$1000\r\n").await;
    client.send_raw(&[b'x'; 44]).await;
    assert_eq!(client.read().await, Some(Frame::Error("ERR Protocol error".into())));
    assert_eq!(client.read().await, None);

    srv.abort();
}

#[tokio::test]
async fn test_e2e_integer_argument_is_rejected() {
    with_e2e_server!(srv, client);

    client.send_raw(b"*3\r\n$4\r\nSADD\r\n$1\r\nk\r\n:7\r\n").await;
    assert_eq!(client.read().await, Some(Frame::Error("ERR Protocol error".into())));
    assert_eq!(client.read().await, None);

    srv.abort();
}
