use crate::gateway::RedisGateway;
use redis_protocol::resp2::types::OwnedFrame as Frame;
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Clone)]
pub struct CommandHandler {
    gateway: RedisGateway,
    map: Arc<CmdMap>,
}

pub type CmdHandler = dyn Fn(RedisGateway, Vec<Vec<u8>>) -> BoxFuture + Send + Sync + 'static;

pub type CmdMap = HashMap<String, Arc<CmdHandler>>;

/// Boxed future returning the reply and whether the connection should close after it.
pub type BoxFuture = futures::future::BoxFuture<'static, (Frame, bool)>;

/// Sized handler type used when constructing handlers.
pub type BoxedCmdHandler = Box<dyn Fn(RedisGateway, Vec<Vec<u8>>) -> BoxFuture + Send + Sync + 'static>;

/// Macro helper to create a boxed, pinned, Arc-wrapped command handler from an
/// async block or expression that returns a `Frame`. The helper will wrap the
/// result into `(Frame, false)` so the server knows not to close the
/// connection.
#[macro_export]
macro_rules! command_handler {
    (|$gw:ident, $args:ident| $body:expr) => {{
        ::std::sync::Arc::from(::std::boxed::Box::new(move |$gw: $crate::gateway::RedisGateway, $args: Vec<Vec<u8>>| {
            ::std::boxed::Box::pin(async move {
                let __res = $body.await;
                (__res, false)
            }) as $crate::command::BoxFuture
        }) as $crate::command::BoxedCmdHandler)
    }};
}

/// Define a `static` lazily built, Arc-wrapped command handler.
/// Usage: `crate::command_handler_static!(NAME, |gw, args| async move { ... });`
#[macro_export]
macro_rules! command_handler_static {
    ($name:ident, |$gw:ident, $args:ident| $body:expr) => {
        static $name: ::std::sync::LazyLock<::std::sync::Arc<$crate::command::CmdHandler>> =
            ::std::sync::LazyLock::new(|| { $crate::command_handler!(|$gw, $args| $body) });
    };
}

/// Create a handler from an async block that returns `(Frame, bool)` so the
/// handler itself can signal the server to close the connection.
#[macro_export]
macro_rules! command_handler_signal {
    (|$gw:ident, $args:ident| $body:expr) => {{
        ::std::sync::Arc::from(::std::boxed::Box::new(move |$gw: $crate::gateway::RedisGateway, $args: Vec<Vec<u8>>| {
            ::std::boxed::Box::pin($body) as $crate::command::BoxFuture
        }) as $crate::command::BoxedCmdHandler)
    }};
}

/// Define a static lazily built handler that can return a close signal.
#[macro_export]
macro_rules! command_handler_static_with_signal {
    ($name:ident, |$gw:ident, $args:ident| $body:expr) => {
        static $name: ::std::sync::LazyLock<::std::sync::Arc<$crate::command::CmdHandler>> =
            ::std::sync::LazyLock::new(|| { $crate::command_handler_signal!(|$gw, $args| $body) });
    };
}

fn build_command_map() -> CmdMap {
    let mut map: CmdMap = HashMap::new();

    for (name, handler) in crate::connection::commands::commands() {
        map.insert(name.to_ascii_uppercase(), handler);
    }
    for (name, handler) in crate::set::commands::commands() {
        map.insert(name.to_ascii_uppercase(), handler);
    }

    map
}

impl CommandHandler {
    pub fn new(gateway: RedisGateway) -> Self {
        let map = build_command_map();
        Self { gateway, map: Arc::new(map) }
    }

    /// Gateway this handler dispatches to.
    pub fn gateway(&self) -> &RedisGateway {
        &self.gateway
    }

    /// Same command table, bound to another gateway (e.g. one per connection).
    pub fn with_gateway(&self, gateway: RedisGateway) -> Self {
        Self {
            gateway,
            map: self.map.clone(),
        }
    }

    pub async fn handle(&self, cmd_str: &str, args: Vec<Vec<u8>>) -> (Frame, bool) {
        let key = cmd_str.to_ascii_uppercase();
        if let Some(h) = self.map.get(&key) {
            log::debug!("{} with {} argument(s)", key, args.len());
            (h)(self.gateway.clone(), args).await
        } else {
            let args_str: String = args
                .iter()
                .filter_map(|s| std::str::from_utf8(s).ok())
                .collect::<Vec<&str>>()
                .join(" ");
            (Frame::Error(format!(
                "ERR unknown command '{}', with args beginning with: '{}'",
                cmd_str, args_str
            )), false)
        }
    }
}
