use crate::command::CmdMap;
use crate::connection::operations::ConnectionOperations;
use redis_protocol::resp2::types::OwnedFrame as Frame;

crate::command_handler_static!(PING, |gw, args| async move {
    if args.len() > 1 {
        return Frame::Error("ERR wrong number of arguments for 'PING' command".into());
    }
    gw.ping(args.first().map(|v| v.as_slice())).await
});

crate::command_handler_static!(ECHO, |gw, args| async move {
    if args.len() != 1 {
        return Frame::Error("ERR wrong number of arguments for 'ECHO' command".into());
    }
    gw.echo(&args[0]).await
});

crate::command_handler_static!(SELECT, |gw, args| async move {
    if args.len() != 1 {
        return Frame::Error("ERR wrong number of arguments for 'SELECT' command".into());
    }
    gw.select(&args[0]).await
});

crate::command_handler_static_with_signal!(QUIT, |gw, _args| async move {
    // the reply is written before the connection closes
    (gw.quit().await, true)
});

/// Return a map of command name -> handler for connection-related commands.
pub fn commands() -> CmdMap {
    let mut m: CmdMap = CmdMap::new();
    m.insert("PING".to_string(), PING.clone());
    m.insert("ECHO".to_string(), ECHO.clone());
    m.insert("SELECT".to_string(), SELECT.clone());
    m.insert("QUIT".to_string(), QUIT.clone());
    m
}
