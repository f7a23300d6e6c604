use serde::{Deserialize, Serialize};

/// Location
///
/// A raw navigation target split the way a history router sees it:
/// `/listener/https?tab=2#top` → path `/listener/https`, query `tab=2`, hash `#top`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub hash: String,
    /// Path plus the original query string and hash.
    pub full_path: String,
}

impl Location {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        let (before_hash, hash) = match raw.find('#') {
            Some(idx) => (&raw[..idx], &raw[idx..]),
            None => (raw, ""),
        };
        let (path, query_str) = match before_hash.find('?') {
            Some(idx) => (&before_hash[..idx], &before_hash[idx + 1..]),
            None => (before_hash, ""),
        };

        let path = normalize_path(path);
        let query = parse_query(query_str);
        let mut full_path = path.clone();
        if !query_str.is_empty() {
            full_path.push('?');
            full_path.push_str(query_str);
        }
        full_path.push_str(hash);

        Self {
            path,
            query,
            hash: hash.to_string(),
            full_path,
        }
    }

    /// First value of `key`, already percent-decoded.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Leading slash, no trailing slash (except the root), no empty segments.
pub fn normalize_path(path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    format!("/{}", segments.join("/"))
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((k, v)) => (decode_component(k), decode_component(v)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Percent-encodes everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )`,
/// matching the browser's `encodeURIComponent`.
pub fn encode_component(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

/// Inverse of [`encode_component`]. Malformed escapes are kept verbatim and
/// invalid UTF-8 is replaced rather than rejected.
pub fn decode_component(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(byte: u8) -> Option<u8> {
    (byte as char).to_digit(16).map(|d| d as u8)
}
