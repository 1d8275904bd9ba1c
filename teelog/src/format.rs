use crate::*;

use clocksource::datetime::DateTime;
use clocksource::precise::UnixInstant;
use log::kv::{self, Key, Value, VisitSource};

pub type FormatFunction = fn(
    write: &mut dyn std::io::Write,
    now: UnixInstant,
    record: &Record,
) -> Result<(), std::io::Error>;

/// Renders a record for humans: timestamp, colorized level token, module,
/// message, then any structured fields as trailing `key=value` pairs.
pub fn console_format(
    w: &mut dyn std::io::Write,
    now: UnixInstant,
    record: &Record,
) -> Result<(), std::io::Error> {
    write!(
        w,
        "{} {} [{}] {}",
        DateTime::from(now),
        colorized(record.level()),
        record.module_path().unwrap_or("<unnamed>"),
        record.args()
    )?;

    let mut visitor = PairVisitor {
        w: &mut *w,
        result: Ok(()),
    };
    let _ = record.key_values().visit(&mut visitor);
    visitor.result?;

    writeln!(w)
}

/// Renders a record as a single JSON object per line with a canonical
/// ISO-8601 `timestamp` field. Structured fields keep their original key
/// names and types; a value that does not serialize is coerced to its
/// string form, so encoding never fails for a well-formed record.
pub fn json_format(
    w: &mut dyn std::io::Write,
    now: UnixInstant,
    record: &Record,
) -> Result<(), std::io::Error> {
    let mut object = serde_json::Map::new();

    object.insert(
        "timestamp".to_string(),
        DateTime::from(now).to_string().into(),
    );
    object.insert("level".to_string(), record.level().to_string().into());
    if let Some(module) = record.module_path() {
        object.insert("module".to_string(), module.into());
    }
    object.insert("message".to_string(), record.args().to_string().into());

    let mut visitor = JsonVisitor {
        object: &mut object,
    };
    let _ = record.key_values().visit(&mut visitor);

    serde_json::to_writer(&mut *w, &object)?;
    writeln!(w)
}

fn colorized(level: Level) -> &'static str {
    match level {
        Level::Error => "\u{1b}[31mERROR\u{1b}[0m",
        Level::Warn => "\u{1b}[33mWARN\u{1b}[0m",
        Level::Info => "\u{1b}[34mINFO\u{1b}[0m",
        Level::Debug => "\u{1b}[35mDEBUG\u{1b}[0m",
        Level::Trace => "\u{1b}[36mTRACE\u{1b}[0m",
    }
}

struct PairVisitor<'a, 'w> {
    w: &'w mut (dyn std::io::Write + 'a),
    result: Result<(), std::io::Error>,
}

impl<'a, 'w, 'kvs> VisitSource<'kvs> for PairVisitor<'a, 'w> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        if self.result.is_ok() {
            self.result = write!(self.w, " {key}={value}");
        }
        Ok(())
    }
}

struct JsonVisitor<'a> {
    object: &'a mut serde_json::Map<String, serde_json::Value>,
}

impl<'a, 'kvs> VisitSource<'kvs> for JsonVisitor<'a> {
    fn visit_pair(&mut self, key: Key<'kvs>, value: Value<'kvs>) -> Result<(), kv::Error> {
        let value = serde_json::to_value(&value)
            .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
        self.object.insert(key.to_string(), value);
        Ok(())
    }
}
