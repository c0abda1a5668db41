//! Knowledge base of blocking calls, deprecated asyncio APIs, and
//! coroutine naming hints.
//!
//! Everything here is static data. Adding a new detectable pattern is a
//! new table entry, never a new code path; the visitor and rules stay
//! untouched.

use phf::phf_ordered_map;

/// Replacement info for a deprecated asyncio API.
#[derive(Debug)]
pub struct DeprecatedApi {
    pub replacement: &'static str,
    pub reason: &'static str,
}

/// Known blocking operations mapped to their async replacements.
///
/// Keys are fully- or partially-qualified call names. Matching is by
/// substring or by trailing-segment equality (see [`find_blocking`]),
/// which trades occasional over-matching for recall.
pub static BLOCKING_CALLS: phf::OrderedMap<&'static str, &'static str> = phf_ordered_map! {
    // Timers
    "time.sleep" => "asyncio.sleep",
    // HTTP clients
    "requests.get" => "aiohttp.ClientSession.get or httpx.AsyncClient.get",
    "requests.post" => "aiohttp.ClientSession.post or httpx.AsyncClient.post",
    "requests.put" => "aiohttp.ClientSession.put or httpx.AsyncClient.put",
    "requests.delete" => "aiohttp.ClientSession.delete or httpx.AsyncClient.delete",
    "requests.request" => "aiohttp or httpx",
    // File I/O
    "open" => "aiofiles.open",
    "file.read" => "await f.read()",
    "file.write" => "await f.write()",
    // Synchronous database drivers
    "sqlite3.connect" => "aiosqlite.connect",
    "psycopg2.connect" => "asyncpg.connect or psycopg (v3 async)",
    "pymongo.MongoClient" => "motor.motor_asyncio.AsyncIOMotorClient",
    "redis.Redis" => "redis.asyncio.Redis",
    // Subprocesses
    "subprocess.run" => "asyncio.create_subprocess_exec",
    "subprocess.call" => "asyncio.create_subprocess_exec",
    "subprocess.check_output" => "asyncio.create_subprocess_exec",
    "os.system" => "asyncio.create_subprocess_exec",
    // SMTP
    "smtplib.SMTP" => "aiosmtplib.SMTP",
    // DNS resolution
    "socket.getaddrinfo" => "asyncio.getaddrinfo",
    "socket.gethostbyname" => "asyncio.getaddrinfo",
};

/// Deprecated asyncio APIs and what superseded them.
pub static DEPRECATED_APIS: phf::OrderedMap<&'static str, DeprecatedApi> = phf_ordered_map! {
    "asyncio.get_event_loop" => DeprecatedApi {
        replacement: "asyncio.get_running_loop() or asyncio.run()",
        reason: "deprecated since Python 3.10",
    },
    "asyncio.coroutine" => DeprecatedApi {
        replacement: "async def",
        reason: "async/await syntax since Python 3.5",
    },
    "asyncio.ensure_future" => DeprecatedApi {
        replacement: "asyncio.create_task",
        reason: "create_task is clearer and type-safe",
    },
};

/// Keywords that mark a call name as probably returning a coroutine.
///
/// Intentionally coarse. This exact set is load-bearing for detection
/// behavior; do not tune it without updating the tests that pin it down.
pub const COROUTINE_HINTS: &[&str] = &[
    "async", "fetch", "get", "post", "request", "query", "find", "load", "read", "write", "send",
    "recv", "connect", "close",
];

fn last_segment(name: &str) -> &str {
    name.rsplit('.').next().unwrap_or(name)
}

/// Find the first blocking-call entry matching `call_name`.
///
/// A call name matches when the table key appears anywhere in it, or when
/// its trailing dotted segment equals the key's trailing segment (so a
/// short member name reached through any alias chain still matches).
pub fn find_blocking(call_name: &str) -> Option<(&'static str, &'static str)> {
    let tail = last_segment(call_name);
    BLOCKING_CALLS
        .entries()
        .find(|(pattern, _)| call_name.contains(*pattern) || tail == last_segment(pattern))
        .map(|(pattern, replacement)| (*pattern, *replacement))
}

/// Exact-key lookup into the blocking-call table.
pub fn lookup_blocking(call_name: &str) -> Option<&'static str> {
    BLOCKING_CALLS.get(call_name).copied()
}

/// Find the first deprecated-API entry whose key appears in `call_name`.
pub fn find_deprecated(call_name: &str) -> Option<&'static DeprecatedApi> {
    DEPRECATED_APIS
        .entries()
        .find(|(pattern, _)| call_name.contains(*pattern))
        .map(|(_, api)| api)
}

/// Heuristic: does this call name look like it returns a coroutine?
///
/// Case-insensitive substring match against [`COROUTINE_HINTS`]. False
/// positives are expected; the tool surfaces candidates for review, it
/// does not assert ground truth.
pub fn is_coroutine_like(call_name: &str) -> bool {
    let lowered = call_name.to_lowercase();
    COROUTINE_HINTS.iter().any(|hint| lowered.contains(hint))
}
