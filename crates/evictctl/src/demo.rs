//! Built-in walkthrough of both eviction policies

use std::io::{self, Write};

use evictcache::{Cache, Policy, PolicyKind};
use tracing::info;

fn show<W: Write>(out: &mut W, cache: &Cache<String, String>, key: &str) -> io::Result<()> {
    match cache.get(key) {
        Some(value) => writeln!(out, "get({}) -> {} true", key, value),
        None => writeln!(out, "get({}) -> \"\" false", key),
    }
}

fn put(cache: &Cache<String, String>, key: &str, value: &str) {
    cache.put(key.to_string(), value.to_string());
}

/// Capacity-2 walkthrough for one policy
pub fn scenario<W: Write>(kind: PolicyKind, out: &mut W) -> io::Result<()> {
    let cache = Cache::new(2, Policy::from_kind(kind));
    writeln!(out, "Using {} cache (capacity 2)", kind.to_string().to_uppercase())?;

    put(&cache, "a", "1");
    put(&cache, "b", "2");
    show(out, &cache, "a")?;

    put(&cache, "c", "3");
    show(out, &cache, "b")?;

    put(&cache, "d", "4");
    for key in ["a", "c", "d"] {
        show(out, &cache, key)?;
    }

    let stats = cache.stats();
    info!(
        policy = %kind,
        hits = stats.hits(),
        misses = stats.misses(),
        evictions = stats.evictions(),
        "Demo finished"
    );
    Ok(())
}

/// Run the walkthrough for every policy
pub fn run<W: Write>(out: &mut W) -> io::Result<()> {
    scenario(PolicyKind::Lfu, out)?;
    writeln!(out)?;
    scenario(PolicyKind::Lru, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(kind: PolicyKind) -> String {
        let mut out = Vec::new();
        scenario(kind, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_lfu_walkthrough() {
        // d evicts c: a was read once more, so c has the lower frequency
        assert_eq!(
            output(PolicyKind::Lfu),
            "Using LFU cache (capacity 2)\n\
             get(a) -> 1 true\n\
             get(b) -> \"\" false\n\
             get(a) -> 1 true\n\
             get(c) -> \"\" false\n\
             get(d) -> 4 true\n"
        );
    }

    #[test]
    fn test_lru_walkthrough() {
        assert_eq!(
            output(PolicyKind::Lru),
            "Using LRU cache (capacity 2)\n\
             get(a) -> 1 true\n\
             get(b) -> \"\" false\n\
             get(a) -> \"\" false\n\
             get(c) -> 3 true\n\
             get(d) -> 4 true\n"
        );
    }

    #[test]
    fn test_run_covers_both() {
        let mut out = Vec::new();
        run(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Using LFU cache"));
        assert!(text.contains("Using LRU cache"));
    }
}
