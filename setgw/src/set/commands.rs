use crate::command::CmdMap;
use crate::set::operations::SetOperations;
use redis_protocol::resp2::types::OwnedFrame as Frame;

fn wrong_arity(name: &str) -> Frame {
    Frame::Error(format!("ERR wrong number of arguments for '{}' command", name))
}

/// Parses the optional SPOP count.
pub(crate) fn parse_count(raw: &[u8]) -> Result<usize, Frame> {
    let count = std::str::from_utf8(raw)
        .ok()
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| Frame::Error("ERR value is not an integer or out of range".into()))?;
    usize::try_from(count)
        .map_err(|_| Frame::Error("ERR value is out of range, must be positive".into()))
}

crate::command_handler_static!(SADD, |gw, args| async move {
    if args.len() < 2 {
        return wrong_arity("SADD");
    }
    gw.sadd(&args[0], &args[1..]).await
});

crate::command_handler_static!(SREM, |gw, args| async move {
    if args.len() < 2 {
        return wrong_arity("SREM");
    }
    gw.srem(&args[0], &args[1..]).await
});

crate::command_handler_static!(SMEMBERS, |gw, args| async move {
    if args.len() != 1 {
        return wrong_arity("SMEMBERS");
    }
    gw.smembers(&args[0]).await
});

crate::command_handler_static!(SCARD, |gw, args| async move {
    if args.len() != 1 {
        return wrong_arity("SCARD");
    }
    gw.scard(&args[0]).await
});

crate::command_handler_static!(SISMEMBER, |gw, args| async move {
    if args.len() != 2 {
        return wrong_arity("SISMEMBER");
    }
    gw.sismember(&args[0], &args[1]).await
});

crate::command_handler_static!(SPOP, |gw, args| async move {
    let count = match args.len() {
        1 => None,
        2 => match parse_count(&args[1]) {
            Ok(count) => Some(count),
            Err(e) => return e,
        },
        _ => return wrong_arity("SPOP"),
    };
    gw.spop(&args[0], count).await
});

crate::command_handler_static!(SMOVE, |gw, args| async move {
    if args.len() != 3 {
        return wrong_arity("SMOVE");
    }
    gw.smove(&args[0], &args[1], &args[2]).await
});

crate::command_handler_static!(SUNION, |gw, args| async move {
    if args.is_empty() {
        return wrong_arity("SUNION");
    }
    gw.sunion(&args).await
});

crate::command_handler_static!(SINTER, |gw, args| async move {
    if args.is_empty() {
        return wrong_arity("SINTER");
    }
    gw.sinter(&args).await
});

crate::command_handler_static!(SDIFF, |gw, args| async move {
    if args.is_empty() {
        return wrong_arity("SDIFF");
    }
    gw.sdiff(&args).await
});

crate::command_handler_static!(DEL, |gw, args| async move {
    if args.is_empty() {
        return wrong_arity("DEL");
    }
    gw.del(&args).await
});

/// Return handlers for set-related commands.
pub fn commands() -> CmdMap {
    let mut m: CmdMap = CmdMap::new();
    m.insert("SADD".to_string(), SADD.clone());
    m.insert("SREM".to_string(), SREM.clone());
    m.insert("SMEMBERS".to_string(), SMEMBERS.clone());
    m.insert("SCARD".to_string(), SCARD.clone());
    m.insert("SISMEMBER".to_string(), SISMEMBER.clone());
    m.insert("SPOP".to_string(), SPOP.clone());
    m.insert("SMOVE".to_string(), SMOVE.clone());
    m.insert("SUNION".to_string(), SUNION.clone());
    m.insert("SINTER".to_string(), SINTER.clone());
    m.insert("SDIFF".to_string(), SDIFF.clone());
    m.insert("DEL".to_string(), DEL.clone());
    m
}
