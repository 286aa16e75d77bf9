//! Replay scripts: one cache command per line
//!
//! ```text
//! # comment
//! put user:1 alice
//! get user:1
//! remove user:1
//! ```

use std::io::{self, Write};

use anyhow::{bail, Result};
use evictcache::Cache;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Get(String),
    Put(String, String),
    Remove(String),
}

/// Split off the first whitespace-delimited word
fn next_word(s: &str) -> Option<(&str, &str)> {
    let s = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(char::is_whitespace) {
        Some(end) => Some((&s[..end], s[end..].trim_start())),
        None => Some((s, "")),
    }
}

/// Parse one line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let Some((verb, rest)) = next_word(line) else {
        return Ok(None);
    };

    match verb.to_uppercase().as_str() {
        "GET" => match next_word(rest) {
            Some((key, "")) => Ok(Some(Command::Get(key.to_string()))),
            _ => Err("wrong number of arguments for 'get' command".to_string()),
        },
        "PUT" => match next_word(rest) {
            Some((key, value)) if !value.is_empty() => {
                Ok(Some(Command::Put(key.to_string(), value.to_string())))
            }
            _ => Err("wrong number of arguments for 'put' command".to_string()),
        },
        "REMOVE" | "DEL" => match next_word(rest) {
            Some((key, "")) => Ok(Some(Command::Remove(key.to_string()))),
            _ => Err("wrong number of arguments for 'remove' command".to_string()),
        },
        _ => Err(format!("unknown command '{}'", verb)),
    }
}

/// Parse a whole script, failing on the first bad line
pub fn parse_script(text: &str) -> Result<Vec<Command>> {
    let mut commands = Vec::new();
    for (idx, line) in text.lines().enumerate() {
        match parse_line(line) {
            Ok(Some(cmd)) => commands.push(cmd),
            Ok(None) => {}
            Err(msg) => bail!("line {}: {}", idx + 1, msg),
        }
    }
    Ok(commands)
}

/// Apply commands to the cache, writing one line per get and remove
pub fn run<W: Write>(cache: &Cache<String, String>, commands: &[Command], out: &mut W) -> io::Result<()> {
    for cmd in commands {
        match cmd {
            Command::Get(key) => match cache.get(key.as_str()) {
                Some(value) => writeln!(out, "{} -> {}", key, value)?,
                None => writeln!(out, "{} -> (miss)", key)?,
            },
            Command::Put(key, value) => cache.put(key.clone(), value.clone()),
            Command::Remove(key) => match cache.remove(key.as_str()) {
                Some(_) => writeln!(out, "removed {}", key)?,
                None => writeln!(out, "{} not present", key)?,
            },
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use evictcache::Policy;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse_line("get a"), Ok(Some(Command::Get("a".to_string()))));
        assert_eq!(
            parse_line("  PUT a  hello world "),
            Ok(Some(Command::Put("a".to_string(), "hello world".to_string())))
        );
        assert_eq!(parse_line("del a"), Ok(Some(Command::Remove("a".to_string()))));
        assert_eq!(parse_line("# note"), Ok(None));
        assert_eq!(parse_line("   "), Ok(None));
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_line("get").is_err());
        assert!(parse_line("get a b").is_err());
        assert!(parse_line("put a").is_err());
        assert_eq!(parse_line("flush"), Err("unknown command 'flush'".to_string()));
    }

    #[test]
    fn test_parse_script_reports_line() {
        let err = parse_script("put a 1\n\nbogus\n").unwrap_err();
        assert_eq!(err.to_string(), "line 3: unknown command 'bogus'");
    }

    #[test]
    fn test_run_lfu_scenario() {
        let script = "put a 1\nput b 2\nget a\nput c 3\nget b\nget a\nget c\nremove c\nremove c\n";
        let commands = parse_script(script).unwrap();
        let cache = Cache::new(2, Policy::lfu());
        let mut out = Vec::new();

        run(&cache, &commands, &mut out).unwrap();

        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            "a -> 1\nb -> (miss)\na -> 1\nc -> 3\nremoved c\nc not present\n"
        );
    }
}
