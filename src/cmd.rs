//! # Command (Request) Handlers
//!
//! [Commands](https://redis.io/docs/latest/commands/)
//!
//! [COMMAND](https://redis.io/docs/latest/commands/command/): Redis command names are case-insensitive.
//!
//! Turns a decoded [`Value::Array`] of argument frames into a single reply [`Value`]. This
//! layer never returns a Rust `Err`: every failure mode it knows about (wrong arity, wrong
//! type, unparsable integer, unknown command) is a RESP `Error` frame, because that's what
//! keeps the connection open and lets the client parse the failure the way a real Redis
//! client expects to.

use crate::errors::StoreError;
use crate::resp::Value;
use crate::store::DataStore;
use bytes::Bytes;

/// Parses and executes one request frame against `store`, returning the reply frame.
pub(crate) fn dispatch(store: &DataStore, frame: Value) -> Value {
    let Some(args) = frame_to_args(frame) else {
        return Value::Error(Bytes::from_static(
            b"ERR protocol error: expected an array of bulk strings",
        ));
    };

    match args[0].to_ascii_uppercase().as_slice() {
        b"PING" => cmd_ping(&args),
        b"ECHO" => cmd_echo(&args),
        b"GET" => cmd_get(store, &args),
        b"SET" => cmd_set(store, &args),
        b"DEL" => cmd_del(store, &args),
        b"EXISTS" => cmd_exists(store, &args),
        b"INCR" => cmd_incr(store, &args),
        b"DECR" => cmd_decr(store, &args),
        b"LPUSH" => cmd_push(store, &args, true),
        b"RPUSH" => cmd_push(store, &args, false),
        b"LRANGE" => cmd_lrange(store, &args),
        _ => unknown_command(&args),
    }
}

/// A request frame is always a non-empty Array of BulkStrings in practice; SimpleStrings
/// are accepted too, since both are just binary byte carriers at this layer.
fn frame_to_args(frame: Value) -> Option<Vec<Bytes>> {
    match frame {
        Value::Array(items) if !items.is_empty() => items
            .into_iter()
            .map(|item| match item {
                Value::BulkString(bytes) | Value::SimpleString(bytes) => Some(bytes),
                _ => None,
            })
            .collect(),
        _ => None,
    }
}

fn arity_error(cmd_lower: &str) -> Value {
    Value::Error(Bytes::from(format!(
        "ERR wrong number of arguments for '{cmd_lower}' command"
    )))
}

fn store_error(err: StoreError) -> Value {
    Value::Error(Bytes::from(err.to_string()))
}

fn unknown_command(args: &[Bytes]) -> Value {
    let name = String::from_utf8_lossy(&args[0]).to_lowercase();
    let first = match args.get(1) {
        Some(arg) => format!("'{}'", String::from_utf8_lossy(arg)),
        None => String::new(),
    };
    Value::Error(Bytes::from(format!(
        "ERR unknown command '{name}', with args beginning with: {first}"
    )))
}

fn parse_i64(bytes: &[u8]) -> Option<i64> {
    std::str::from_utf8(bytes).ok()?.parse::<i64>().ok()
}

/// `PING [message]`
fn cmd_ping(args: &[Bytes]) -> Value {
    match args.len() {
        1 => Value::SimpleString(Bytes::from_static(b"PONG")),
        2 => Value::BulkString(args[1].clone()),
        _ => arity_error("ping"),
    }
}

/// `ECHO message`
fn cmd_echo(args: &[Bytes]) -> Value {
    if args.len() != 2 {
        return arity_error("echo");
    }
    Value::BulkString(args[1].clone())
}

/// `GET key`
fn cmd_get(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() != 2 {
        return arity_error("get");
    }
    match store.get(&args[1]) {
        Ok(Some(value)) => Value::BulkString(Bytes::from(value)),
        Ok(None) => Value::NullBulkString,
        Err(e) => store_error(e),
    }
}

/// `SET key value [EX seconds | PX milliseconds]`
fn cmd_set(store: &DataStore, args: &[Bytes]) -> Value {
    match args.len() {
        3 => {
            store.set(args[1].to_vec(), args[2].to_vec());
            Value::SimpleString(Bytes::from_static(b"OK"))
        }
        5 => {
            let ns_per_unit: u128 = match args[3].to_ascii_uppercase().as_slice() {
                b"EX" => 1_000_000_000,
                b"PX" => 1_000_000,
                _ => return Value::Error(Bytes::from_static(b"ERR syntax error")),
            };
            let Some(amount) = parse_i64(&args[4]).filter(|n| *n >= 0) else {
                return Value::Error(Bytes::from_static(b"ERR value is not an integer or out of range"));
            };
            let ttl_ns = amount as u128 * ns_per_unit;
            match store.set_with_expiry(args[1].to_vec(), args[2].to_vec(), ttl_ns) {
                Ok(()) => Value::SimpleString(Bytes::from_static(b"OK")),
                Err(e) => store_error(e),
            }
        }
        _ => arity_error("set"),
    }
}

/// `DEL key [key ...]`
fn cmd_del(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() < 2 {
        return arity_error("del");
    }
    let deleted = args[1..].iter().filter(|key| store.delete(key)).count();
    Value::Integer(deleted as i64)
}

/// `EXISTS key [key ...]`
fn cmd_exists(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() < 2 {
        return arity_error("exists");
    }
    let mut present = 0i64;
    for key in &args[1..] {
        match store.exists(key) {
            Ok(true) => present += 1,
            Ok(false) => {}
            Err(e) => return store_error(e),
        }
    }
    Value::Integer(present)
}

/// `INCR key`
fn cmd_incr(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() != 2 {
        return arity_error("incr");
    }
    match store.incr(&args[1]) {
        Ok(value) => Value::Integer(value),
        Err(e) => store_error(e),
    }
}

/// `DECR key`
fn cmd_decr(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() != 2 {
        return arity_error("decr");
    }
    match store.decr(&args[1]) {
        Ok(value) => Value::Integer(value),
        Err(e) => store_error(e),
    }
}

/// `LPUSH key value [value ...]` / `RPUSH key value [value ...]`
///
/// Each value is pushed one at a time, in the order given, same as Redis: `LPUSH k a b c`
/// leaves `c` at the head, then `b`, then `a`.
fn cmd_push(store: &DataStore, args: &[Bytes], front: bool) -> Value {
    let name = if front { "lpush" } else { "rpush" };
    if args.len() < 3 {
        return arity_error(name);
    }
    let mut length = 0;
    for value in &args[2..] {
        let pushed = if front {
            store.lpush(&args[1], value.to_vec())
        } else {
            store.rpush(&args[1], value.to_vec())
        };
        match pushed {
            Ok(n) => length = n,
            Err(e) => return store_error(e),
        }
    }
    Value::Integer(length as i64)
}

/// `LRANGE key start stop`
fn cmd_lrange(store: &DataStore, args: &[Bytes]) -> Value {
    if args.len() != 4 {
        return arity_error("lrange");
    }
    let (Some(start), Some(stop)) = (parse_i64(&args[2]), parse_i64(&args[3])) else {
        return Value::Error(Bytes::from_static(b"ERR value is not an integer or out of range"));
    };
    match store.lrange(&args[1], start, stop) {
        Ok(items) => Value::Array(items.into_iter().map(|v| Value::BulkString(Bytes::from(v))).collect()),
        Err(e) => store_error(e),
    }
}
