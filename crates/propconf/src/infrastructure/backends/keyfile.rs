//! TOML key files.
//!
//! Each page is a table; properties without a page are top-level keys:
//!
//! ```toml
//! verbose = true          # unnamed page
//!
//! [network]
//! host = "example.org"
//! port = 8080
//! search_path = ["/usr/share", "/opt/share"]
//!
//! [display]
//! accent = "orange"
//! ```
//!
//! Booleans, integers, floats and strings use the native TOML types, string
//! lists are arrays of strings, colours are strings. `UInt64` values above
//! `i64::MAX` are written as strings since TOML integers are signed 64-bit.
//! Opaque values cannot be stored.
//!
//! A save rewrites the set's keys in the target file and keeps every other
//! key untouched.

use std::fs::{self, OpenOptions};

use propconf_core::{
    decide, AccessMask, ConfigBackend, ConfigBuffer, ConfigError, ConfigFile, ConfigSet,
    ErrorSink, FileFlags, ParseOptions, SetView, Value, ValueKind, UNNAMED_PAGE,
};
use toml::Table;
use tracing::{debug, trace};

use crate::infrastructure::discovery::prepare_files;

/// Parsed content of an open key file.
#[derive(Debug, Default)]
struct KeyfileHandle {
    table: Table,
}

/// Backend for TOML key files found by glob discovery.
#[derive(Debug, Default)]
pub struct KeyfileBackend;

impl KeyfileBackend {
    pub const NAME: &'static str = "keyfile";

    pub fn new() -> Self {
        Self
    }
}

fn handle(file: &ConfigFile) -> Result<&KeyfileHandle, ConfigError> {
    file.handle::<KeyfileHandle>()
        .ok_or_else(|| ConfigError::BackendNotReady(file.path().display().to_string()))
}

/// Looks up a raw item by page and key.
fn lookup<'a>(table: &'a Table, page: &str, key: &str) -> Option<&'a toml::Value> {
    if page == UNNAMED_PAGE {
        table.get(key).filter(|v| !v.is_table())
    } else {
        table.get(page)?.as_table()?.get(key)
    }
}

/// Converts a raw TOML item into a value of `kind`.
fn item_to_value(
    item: &toml::Value,
    kind: ValueKind,
    key: &str,
    options: &ParseOptions,
) -> Result<Value, ConfigError> {
    let invalid = |e: propconf_core::ValueError| ConfigError::invalid_value(key, &e);
    match (item, kind) {
        (_, ValueKind::Opaque) => Err(ConfigError::UnsupportedType(kind)),
        (toml::Value::String(text), _) => Value::parse(kind, text, options).map_err(invalid),
        (toml::Value::Boolean(b), ValueKind::Boolean) => Ok(Value::Boolean(*b)),
        (toml::Value::Integer(n), k) if k.is_integer() => {
            Value::from_integer(k, i128::from(*n)).map_err(invalid)
        }
        (toml::Value::Integer(n), ValueKind::Float | ValueKind::Double) => {
            Value::Double(*n as f64).convert_to(kind).map_err(invalid)
        }
        (toml::Value::Float(f), ValueKind::Float | ValueKind::Double) => {
            Value::Double(*f).convert_to(kind).map_err(invalid)
        }
        (toml::Value::Array(items), ValueKind::StringList) => items
            .iter()
            .map(|item| match item {
                toml::Value::String(s) => Ok(s.clone()),
                other => Err(ConfigError::InvalidValue {
                    key: key.to_string(),
                    message: format!("list element must be a string, found {}", other.type_str()),
                }),
            })
            .collect::<Result<Vec<_>, _>>()
            .map(Value::StringList),
        (other, _) => Err(ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("expected {kind}, found {}", other.type_str()),
        }),
    }
}

/// Converts a value into its TOML representation.
fn value_to_item(value: &Value) -> Result<toml::Value, ConfigError> {
    let item = match value {
        Value::Boolean(b) => toml::Value::Boolean(*b),
        Value::Int16(n) => toml::Value::Integer(i64::from(*n)),
        Value::UInt16(n) => toml::Value::Integer(i64::from(*n)),
        Value::Int32(n) => toml::Value::Integer(i64::from(*n)),
        Value::UInt32(n) => toml::Value::Integer(i64::from(*n)),
        Value::Int64(n) => toml::Value::Integer(*n),
        Value::UInt64(n) => match i64::try_from(*n) {
            Ok(n) => toml::Value::Integer(n),
            Err(_) => toml::Value::String(n.to_string()),
        },
        // Go through the shortest decimal form so 0.1f32 is stored as 0.1.
        Value::Float(f) => toml::Value::Float(f.to_string().parse().unwrap_or(f64::from(*f))),
        Value::Double(f) => toml::Value::Float(*f),
        Value::String(s) => toml::Value::String(s.clone()),
        Value::StringList(items) => {
            toml::Value::Array(items.iter().cloned().map(toml::Value::String).collect())
        }
        Value::Color(c) => toml::Value::String(c.to_string()),
        Value::Opaque(_) => return Err(ConfigError::UnsupportedType(ValueKind::Opaque)),
    };
    Ok(item)
}

/// Stores `item` under `page`/`key`, creating the page table if needed.
fn insert_item(table: &mut Table, page: &str, key: &str, item: toml::Value) {
    if page == UNNAMED_PAGE {
        table.insert(key.to_string(), item);
        return;
    }
    let mut page_table = match table.remove(page) {
        Some(toml::Value::Table(t)) => t,
        _ => Table::new(),
    };
    page_table.insert(key.to_string(), item);
    table.insert(page.to_string(), toml::Value::Table(page_table));
}

fn remove_key(table: &mut Table, page: &str, key: &str) {
    if page == UNNAMED_PAGE {
        if table.get(key).is_some_and(|v| !v.is_table()) {
            table.remove(key);
        }
        return;
    }
    let now_empty = match table.get_mut(page).and_then(toml::Value::as_table_mut) {
        Some(t) => {
            t.remove(key);
            t.is_empty()
        }
        None => false,
    };
    if now_empty {
        table.remove(page);
    }
}

impl ConfigBackend for KeyfileBackend {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn init_set(&self, set: &mut ConfigSet) -> Result<(), ConfigError> {
        set.clear_files();
        prepare_files(set, self)
    }

    fn can_access(&self, file: &ConfigFile, mask: AccessMask) -> bool {
        let readable = !mask.contains(AccessMask::READ) || fs::File::open(file.path()).is_ok();
        let writable = !mask.contains(AccessMask::WRITE)
            || OpenOptions::new().append(true).open(file.path()).is_ok();
        readable && writable
    }

    fn create(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(file.path())
            .map_err(|e| ConfigError::from_io(file.path(), e))?;
        debug!(path = %file.path().display(), "created key file");
        Ok(())
    }

    fn open(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        let content =
            fs::read_to_string(file.path()).map_err(|e| ConfigError::from_io(file.path(), e))?;
        let table: Table = toml::from_str(&content).map_err(|e| ConfigError::InvalidFormat {
            path: file.path().to_path_buf(),
            message: e.message().to_string(),
        })?;
        let has_content = !table.is_empty();
        file.attach(KeyfileHandle { table });
        file.set_flag(FileFlags::HAS_CONTENT, has_content);
        Ok(())
    }

    fn close(&self, file: &mut ConfigFile) -> Result<(), ConfigError> {
        file.detach();
        Ok(())
    }

    fn preload(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &mut ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<(), ConfigError> {
        let table = &handle(file)?.table;
        let policy = set.error_policy();

        let mut entries: Vec<(&str, &str, &toml::Value)> = Vec::new();
        for (name, item) in table {
            match item.as_table() {
                Some(page) => entries.extend(page.iter().map(|(k, v)| (name.as_str(), k.as_str(), v))),
                None => entries.push((UNNAMED_PAGE, name.as_str(), item)),
            }
        }

        for (page, key, item) in entries {
            if set.scope.is_some_and(|scope| scope != page) {
                continue;
            }
            let ctx = match set.property(key) {
                Some(ctx) if ctx.spec().page_or_unnamed() == page => ctx,
                _ => {
                    sink.report(ConfigError::InvalidKey(format!("{page}/{key}")), policy)?;
                    continue;
                }
            };
            let spec = ctx.spec();
            match item_to_value(item, spec.kind(), key, spec.parse_options()) {
                Ok(value) => {
                    trace!(path = %file.path().display(), page, key, "staged value");
                    buffer.insert(key, page, value);
                }
                Err(e) => sink.report(e, policy)?,
            }
        }
        Ok(())
    }

    fn save(
        &self,
        set: &SetView<'_>,
        file: &mut ConfigFile,
        buffer: &ConfigBuffer,
        sink: &mut ErrorSink,
    ) -> Result<Vec<String>, ConfigError> {
        let path = file.path().to_path_buf();
        let policy = set.error_policy();
        let handle = file
            .handle_mut::<KeyfileHandle>()
            .ok_or_else(|| ConfigError::BackendNotReady(path.display().to_string()))?;

        // Edits go to a copy; the handle only changes once the file is written.
        let mut table = handle.table.clone();
        let mut written = Vec::new();
        for ctx in set.scoped_properties() {
            let page = ctx.spec().page_or_unnamed();
            let decision = decide(set.flags, ctx, buffer);
            if !decision.is_write() {
                debug!(key = %ctx.key(), ?decision, "not writing property");
                remove_key(&mut table, page, ctx.key());
                continue;
            }
            match value_to_item(ctx.value()) {
                Ok(item) => {
                    insert_item(&mut table, page, ctx.key(), item);
                    written.push(ctx.key().to_string());
                }
                Err(e) => sink.report(e, policy)?,
            }
        }

        let text = toml::to_string_pretty(&table)
            .map_err(|e| ConfigError::Backend(format!("cannot serialise {}: {e}", path.display())))?;
        fs::write(&path, text).map_err(|e| ConfigError::from_io(&path, e))?;
        let has_content = !table.is_empty();
        handle.table = table;
        file.set_flag(FileFlags::HAS_CONTENT, has_content);
        debug!(path = %path.display(), written = written.len(), "wrote key file");
        Ok(written)
    }

    fn list_pages(&self, file: &ConfigFile) -> Result<Vec<String>, ConfigError> {
        let table = &handle(file)?.table;
        let mut pages = Vec::new();
        if table.values().any(|v| !v.is_table()) {
            pages.push(UNNAMED_PAGE.to_string());
        }
        pages.extend(
            table
                .iter()
                .filter(|(_, v)| v.is_table())
                .map(|(name, _)| name.clone()),
        );
        Ok(pages)
    }

    fn list_keys(&self, file: &ConfigFile, page: &str) -> Result<Vec<String>, ConfigError> {
        let table = &handle(file)?.table;
        if page == UNNAMED_PAGE {
            return Ok(table
                .iter()
                .filter(|(_, v)| !v.is_table())
                .map(|(k, _)| k.clone())
                .collect());
        }
        table
            .get(page)
            .and_then(toml::Value::as_table)
            .map(|t| t.keys().cloned().collect())
            .ok_or_else(|| ConfigError::InvalidPage(page.to_string()))
    }

    fn get_value(
        &self,
        file: &ConfigFile,
        page: &str,
        key: &str,
        kind: ValueKind,
        options: &ParseOptions,
    ) -> Result<Value, ConfigError> {
        let table = &handle(file)?.table;
        let item = lookup(table, page, key).ok_or_else(|| ConfigError::InvalidKey(key.to_string()))?;
        item_to_value(item, kind, key, options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use propconf_core::{Color, ErrorPolicy, PropertyContext, PropertySpec, PropertyTable, SetFlags};
    use std::path::PathBuf;
    use uuid::Uuid;

    fn temp_file(content: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("propconf_keyfile_{}", Uuid::new_v4()));
        fs::create_dir_all(&dir).unwrap();
        let path = dir.join("app.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn open(path: &PathBuf) -> ConfigFile {
        let mut file = ConfigFile::new(path);
        KeyfileBackend::new().open(&mut file).unwrap();
        file
    }

    fn table() -> PropertyTable {
        let mut table = PropertyTable::new();
        for spec in [
            PropertySpec::builder("verbose", ValueKind::Boolean).build(),
            PropertySpec::builder("port", ValueKind::UInt16).page("network").default_text("80").build(),
            PropertySpec::builder("ratio", ValueKind::Float).page("network").build(),
            PropertySpec::builder("paths", ValueKind::StringList).page("network").build(),
            PropertySpec::builder("accent", ValueKind::Color).page("display").build(),
            PropertySpec::builder("big", ValueKind::UInt64).page("display").build(),
        ] {
            table.insert(PropertyContext::from_spec(spec)).unwrap();
        }
        table
    }

    fn view(properties: &PropertyTable, flags: u16) -> SetView<'_> {
        SetView {
            name: "app",
            flags: SetFlags(flags),
            properties,
            scope: None,
        }
    }

    #[test]
    fn test_preload_reads_native_toml_types() {
        // Arrange
        let path = temp_file(
            "verbose = true\n\n[network]\nport = 8080\nratio = 0.5\npaths = [\"a\", \"b;c\"]\n\n[display]\naccent = \"#FF8000\"\nbig = \"18446744073709551615\"\n",
        );
        let mut file = open(&path);
        let properties = table();
        let mut buffer = ConfigBuffer::new();
        let mut sink = ErrorSink::new();

        // Act
        KeyfileBackend::new()
            .preload(&view(&properties, 0), &mut file, &mut buffer, &mut sink)
            .unwrap();

        // Assert
        assert!(sink.is_clean());
        assert_eq!(buffer.get("verbose"), Some(&Value::Boolean(true)));
        assert_eq!(buffer.get("port"), Some(&Value::UInt16(8080)));
        assert_eq!(buffer.get("ratio"), Some(&Value::Float(0.5)));
        assert_eq!(
            buffer.get("paths").and_then(Value::as_list).map(<[String]>::to_vec),
            Some(vec!["a".to_string(), "b;c".to_string()])
        );
        assert_eq!(buffer.get("accent"), Some(&Value::Color(Color::rgb(0xFF, 0x80, 0x00))));
        assert_eq!(buffer.get("big"), Some(&Value::UInt64(u64::MAX)));
        assert_eq!(buffer.entry("port").unwrap().page, "network");
    }

    #[test]
    fn test_preload_reports_unknown_and_misplaced_keys() {
        let path = temp_file("port = 1\n\n[network]\nghost = 2\n");
        let mut file = open(&path);
        let properties = table();
        let mut buffer = ConfigBuffer::new();
        let mut sink = ErrorSink::new();

        KeyfileBackend::new()
            .preload(&view(&properties, 0), &mut file, &mut buffer, &mut sink)
            .unwrap();

        assert_eq!(sink.reported(), 2);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_preload_out_of_range_integer_is_invalid_value() {
        let path = temp_file("[network]\nport = 70000\n");
        let mut file = open(&path);
        let properties = table();
        let mut buffer = ConfigBuffer::new();
        let mut sink = ErrorSink::new();

        let result = KeyfileBackend::new().preload(
            &view(&properties, SetFlags::STOP_ON_ERROR),
            &mut file,
            &mut buffer,
            &mut sink,
        );

        assert!(matches!(result, Err(ConfigError::InvalidValue { key, .. }) if key == "port"));
    }

    #[test]
    fn test_preload_unopened_file_is_not_ready() {
        let mut file = ConfigFile::new("/nonexistent/app.toml");
        let properties = table();
        let result = KeyfileBackend::new().preload(
            &view(&properties, 0),
            &mut file,
            &mut ConfigBuffer::new(),
            &mut ErrorSink::new(),
        );
        assert!(matches!(result, Err(ConfigError::BackendNotReady(_))));
    }

    #[test]
    fn test_open_malformed_file_is_invalid_format() {
        let path = temp_file("[[[ not toml");
        let mut file = ConfigFile::new(&path);
        let result = KeyfileBackend::new().open(&mut file);
        assert!(matches!(result, Err(ConfigError::InvalidFormat { .. })));
        assert!(!file.is_open());
    }

    #[test]
    fn test_open_missing_file_is_file_not_found() {
        let mut file = ConfigFile::new("/nonexistent/propconf/app.toml");
        assert!(matches!(
            KeyfileBackend::new().open(&mut file),
            Err(ConfigError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_save_keeps_foreign_keys_and_drops_skipped_ones() {
        // Arrange
        let path = temp_file("foreign = \"keep me\"\n\n[network]\nport = 9\n");
        let mut file = open(&path);
        let mut properties = table();
        properties.get_mut("verbose").unwrap().set_value(&Value::Boolean(true)).unwrap();

        // Act
        let written = KeyfileBackend::new()
            .save(
                &view(&properties, SetFlags::HIDE_DEFAULT),
                &mut file,
                &ConfigBuffer::new(),
                &mut ErrorSink::new(),
            )
            .unwrap();

        // Assert
        assert_eq!(written, vec!["verbose"]);
        let saved: Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(saved.get("foreign").and_then(toml::Value::as_str), Some("keep me"));
        assert_eq!(saved.get("verbose").and_then(toml::Value::as_bool), Some(true));
        // `port` equals its default and is removed together with its now empty page.
        assert!(saved.get("network").is_none());
    }

    #[test]
    fn test_save_writes_each_kind_in_native_form() {
        let path = temp_file("");
        let mut file = open(&path);
        let mut properties = table();
        properties.get_mut("ratio").unwrap().set_value(&Value::Float(0.1)).unwrap();
        properties
            .get_mut("paths")
            .unwrap()
            .set_value(&Value::StringList(vec!["x".into(), "y".into()]))
            .unwrap();
        properties.get_mut("big").unwrap().set_value(&Value::UInt64(u64::MAX)).unwrap();

        KeyfileBackend::new()
            .save(&view(&properties, 0), &mut file, &ConfigBuffer::new(), &mut ErrorSink::new())
            .unwrap();

        let saved: Table = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        let network = saved["network"].as_table().unwrap();
        assert_eq!(network["port"].as_integer(), Some(80));
        assert_eq!(network["ratio"].as_float(), Some(0.1));
        assert_eq!(network["paths"].as_array().map(Vec::len), Some(2));
        assert_eq!(saved["display"]["big"].as_str(), Some("18446744073709551615"));
        assert_eq!(saved["display"]["accent"].as_str(), Some("black"));
    }

    #[test]
    fn test_list_pages_and_keys() {
        let path = temp_file("top = 1\n\n[network]\nport = 1\nhost = \"h\"\n");
        let file = open(&path);
        let backend = KeyfileBackend::new();

        assert_eq!(backend.list_pages(&file).unwrap(), vec![UNNAMED_PAGE, "network"]);
        assert_eq!(backend.list_keys(&file, UNNAMED_PAGE).unwrap(), vec!["top"]);
        assert_eq!(backend.list_keys(&file, "network").unwrap(), vec!["host", "port"]);
        assert!(matches!(backend.list_keys(&file, "nope"), Err(ConfigError::InvalidPage(_))));
    }

    #[test]
    fn test_get_value_parses_raw_entry() {
        let path = temp_file("[network]\nport = 8080\n");
        let file = open(&path);
        let backend = KeyfileBackend::new();
        let options = ParseOptions::default();

        assert_eq!(
            backend.get_value(&file, "network", "port", ValueKind::Int64, &options).unwrap(),
            Value::Int64(8080)
        );
        assert!(matches!(
            backend.get_value(&file, "network", "port", ValueKind::Opaque, &options),
            Err(ConfigError::UnsupportedType(ValueKind::Opaque))
        ));
        assert!(matches!(
            backend.get_value(&file, "network", "missing", ValueKind::Int64, &options),
            Err(ConfigError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_sink_policy_follows_set_flags() {
        let properties = table();
        assert_eq!(view(&properties, SetFlags::STOP_ON_ERROR).error_policy(), ErrorPolicy::Stop);
    }
}
