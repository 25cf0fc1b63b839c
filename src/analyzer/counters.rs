//! Parser for the simulator's global counter dumps.
//!
//! Two textual forms appear depending on the simulator variant:
//!
//! ```text
//! braced:    {read:1204, write:88, epoll_wait:17}
//! key=value: event_new=5301 payload_new=88 packet_new=4410
//! ```
//!
//! Grammar (whitespace `ws` is optional wherever it appears):
//!
//! ```text
//! dump    := braced | pairs
//! braced  := '{' ws [ entry ( ws ',' ws entry )* ] ws '}'
//! entry   := name ws ':' ws number
//! pairs   := pair ( ws pair )*
//! pair    := name '=' number
//! ```

use super::types::{CounterMap, CounterValue};

/// Parse either counter dump form. Returns `None` if the text is malformed.
pub fn parse_counter_dump(text: &str) -> Option<CounterMap> {
    let text = text.trim();
    if text.starts_with('{') {
        parse_braced(text)
    } else {
        parse_pairs(text)
    }
}

struct Cursor<'a> {
    text: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self { text, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    fn skip_ws(&mut self) {
        let rest = self.rest();
        self.pos += rest.len() - rest.trim_start().len();
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn take_while(&mut self, pred: impl Fn(char) -> bool) -> &'a str {
        let rest = self.rest();
        let end = rest.find(|c: char| !pred(c)).unwrap_or(rest.len());
        self.pos += end;
        &rest[..end]
    }

    fn name(&mut self, terminator: char) -> Option<&'a str> {
        let name = self.take_while(|c| c != terminator && c != ',' && c != '{' && c != '}' && !c.is_whitespace());
        (!name.is_empty()).then_some(name)
    }

    fn number(&mut self) -> Option<CounterValue> {
        let token = self.take_while(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '+');
        CounterValue::parse(token)
    }

    fn at_end(&self) -> bool {
        self.pos >= self.text.len()
    }
}

fn parse_braced(text: &str) -> Option<CounterMap> {
    let mut cursor = Cursor::new(text);
    let mut counters = CounterMap::new();

    if !cursor.eat('{') {
        return None;
    }
    cursor.skip_ws();
    if cursor.eat('}') {
        cursor.skip_ws();
        return cursor.at_end().then_some(counters);
    }

    loop {
        cursor.skip_ws();
        let name = cursor.name(':')?;
        cursor.skip_ws();
        if !cursor.eat(':') {
            return None;
        }
        cursor.skip_ws();
        let value = cursor.number()?;
        counters.insert(name.to_string(), value);

        cursor.skip_ws();
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat('}') {
            break;
        }
        return None;
    }

    cursor.skip_ws();
    cursor.at_end().then_some(counters)
}

fn parse_pairs(text: &str) -> Option<CounterMap> {
    let mut counters = CounterMap::new();
    for pair in text.split_whitespace() {
        let (name, value) = pair.split_once('=')?;
        if name.is_empty() {
            return None;
        }
        counters.insert(name.to_string(), CounterValue::parse(value)?);
    }
    (!counters.is_empty()).then_some(counters)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn braced_form() {
        let counters = parse_counter_dump("{read:1204, write:88, epoll_wait:17}").unwrap();
        assert_eq!(counters.len(), 3);
        assert_eq!(counters["read"], CounterValue::Int(1204));
        assert_eq!(counters["epoll_wait"], CounterValue::Int(17));
    }

    #[test]
    fn braced_form_with_loose_spacing() {
        let counters = parse_counter_dump("{ Event : 12 ,Payload:3 }").unwrap();
        assert_eq!(counters["Event"], CounterValue::Int(12));
        assert_eq!(counters["Payload"], CounterValue::Int(3));
    }

    #[test]
    fn empty_braces() {
        assert_eq!(parse_counter_dump("{}"), Some(CounterMap::new()));
    }

    #[test]
    fn key_value_form() {
        let counters = parse_counter_dump("event_new=5301 payload_new=88 packet_new=4410").unwrap();
        assert_eq!(counters.len(), 3);
        assert_eq!(counters["payload_new"], CounterValue::Int(88));
    }

    #[test]
    fn malformed_dumps_are_rejected() {
        assert_eq!(parse_counter_dump("{read:12, write}"), None);
        assert_eq!(parse_counter_dump("{read:12"), None);
        assert_eq!(parse_counter_dump("{read:abc}"), None);
        assert_eq!(parse_counter_dump("event_new=5 dangling"), None);
        assert_eq!(parse_counter_dump(""), None);
    }
}
