//! Streaming JSON text writer
//!
//! The grammar document is written front to back without building a value
//! tree. Separators are driven by a stack holding one "nothing written yet"
//! flag per open object or array: the first field or element of a container
//! goes out bare, every later one is prefixed with a comma.

use crate::regex::Sink;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    Object,
    Array,
}

#[derive(Debug)]
struct Frame {
    container: Container,
    empty: bool,
}

/// Incremental JSON writer over an owned buffer
#[derive(Debug, Default)]
pub struct JsonWriter {
    out: String,
    frames: Vec<Frame>,
    /// A key was written and its value has not started yet
    after_key: bool,
}

impl JsonWriter {
    /// Create an empty writer
    pub fn new() -> Self {
        JsonWriter::default()
    }

    /// Open an object as the next value
    pub fn begin_object(&mut self) {
        self.open(Container::Object, '{');
    }

    /// Close the innermost object
    pub fn end_object(&mut self) {
        self.close(Container::Object, '}');
    }

    /// Open an array as the next value
    pub fn begin_array(&mut self) {
        self.open(Container::Array, '[');
    }

    /// Close the innermost array
    pub fn end_array(&mut self) {
        self.close(Container::Array, ']');
    }

    /// Write the key of the next object field
    pub fn key(&mut self, key: &str) {
        debug_assert!(
            matches!(self.frames.last(), Some(frame) if frame.container == Container::Object),
            "keys are only written inside objects"
        );
        self.separate();
        self.quoted(key);
        self.out.push(':');
        self.after_key = true;
    }

    /// Write a string as the next value
    pub fn string(&mut self, value: &str) {
        self.string_with(|sink| sink.push_str(value));
    }

    /// Write a string value whose contents are streamed by `write`
    pub fn string_with(&mut self, write: impl FnOnce(&mut JsonString<'_>)) {
        self.begin_value();
        self.out.push('"');
        write(&mut JsonString { out: &mut self.out });
        self.out.push('"');
    }

    /// Write a `"key":"value"` field
    pub fn field(&mut self, key: &str, value: &str) {
        self.key(key);
        self.string(value);
    }

    /// Depth of currently open containers
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Take the finished text
    pub fn finish(self) -> String {
        debug_assert!(self.frames.is_empty(), "unclosed JSON container");
        self.out
    }

    fn open(&mut self, container: Container, bracket: char) {
        self.begin_value();
        self.out.push(bracket);
        self.frames.push(Frame {
            container,
            empty: true,
        });
    }

    fn close(&mut self, container: Container, bracket: char) {
        let frame = self.frames.pop();
        debug_assert!(
            matches!(frame, Some(ref frame) if frame.container == container),
            "mismatched JSON container"
        );
        self.out.push(bracket);
    }

    fn begin_value(&mut self) {
        if self.after_key {
            self.after_key = false;
        } else {
            self.separate();
        }
    }

    fn separate(&mut self) {
        if let Some(frame) = self.frames.last_mut() {
            if frame.empty {
                frame.empty = false;
            } else {
                self.out.push(',');
            }
        }
    }

    fn quoted(&mut self, text: &str) {
        self.out.push('"');
        JsonString { out: &mut self.out }.push_str(text);
        self.out.push('"');
    }
}

/// Sink that escapes characters for the inside of a JSON string
pub struct JsonString<'a> {
    out: &'a mut String,
}

impl Sink for JsonString<'_> {
    fn push(&mut self, c: char) {
        match c {
            '\\' | '"' => {
                self.out.push('\\');
                self.out.push(c);
            }
            c if (c as u32) < 0x20 => {
                self.out.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => self.out.push(c),
        }
    }
}
