// ABOUTME: Capability-rooted file registry backing the Logo file primitives

use crate::error::{Error, ErrorKind};
use cap_std::ambient_authority;
use cap_std::fs::Dir;
use std::collections::HashMap;
use std::io::{BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

/// Lazily opened handles for one named file. A file registered with
/// [`Files::open`] gets a read or write handle the first time it is
/// selected as reader or writer.
#[derive(Default)]
struct OpenFile {
    read: Option<BufReader<cap_std::fs::File>>,
    write: Option<cap_std::fs::File>,
}

/// The named-file registry. All paths resolve inside the capability
/// `Dir` rooted at the workspace prefix; re-rooting via
/// [`Files::set_prefix`] is the only use of ambient authority after
/// construction.
pub struct Files {
    prefix: PathBuf,
    root: Dir,
    open: HashMap<String, OpenFile>,
    reader: Option<String>,
    writer: Option<String>,
    capture: Option<String>,
}

impl Files {
    /// Open (creating if necessary) the prefix directory.
    pub fn new(prefix: &Path) -> Result<Self, Error> {
        std::fs::create_dir_all(prefix).map_err(Error::io)?;
        let meta = std::fs::metadata(prefix).map_err(Error::io)?;
        if !meta.is_dir() {
            return Err(Error::new(ErrorKind::NotDir(
                prefix.display().to_string(),
            )));
        }
        let root = Dir::open_ambient_dir(prefix, ambient_authority()).map_err(Error::io)?;
        Ok(Files {
            prefix: prefix.to_path_buf(),
            root,
            open: HashMap::new(),
            reader: None,
            writer: None,
            capture: None,
        })
    }

    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Re-root the registry. Relative paths resolve against the current
    /// prefix; the target must exist and be a directory.
    pub fn set_prefix(&mut self, path: &str) -> Result<(), Error> {
        let target = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            self.prefix.join(path)
        };
        let meta = std::fs::metadata(&target).map_err(Error::io)?;
        if !meta.is_dir() {
            return Err(Error::new(ErrorKind::NotDir(target.display().to_string())));
        }
        self.root = Dir::open_ambient_dir(&target, ambient_authority()).map_err(Error::io)?;
        self.prefix = target;
        Ok(())
    }

    // ========================================================================
    // Named files
    // ========================================================================

    /// Register a file for use as reader or writer.
    pub fn open(&mut self, name: &str) -> Result<(), Error> {
        self.open.entry(name.to_string()).or_default();
        Ok(())
    }

    pub fn close(&mut self, name: &str) -> Result<(), Error> {
        if self.open.remove(name).is_none() {
            return Err(Error::new(ErrorKind::FileNotOpen(name.to_string())));
        }
        if self.reader.as_deref() == Some(name) {
            self.reader = None;
        }
        if self.writer.as_deref() == Some(name) {
            self.writer = None;
        }
        Ok(())
    }

    /// Select the current reader; `None` restores the console.
    pub fn set_reader(&mut self, name: Option<&str>) -> Result<(), Error> {
        let Some(name) = name else {
            self.reader = None;
            return Ok(());
        };
        let entry = self
            .open
            .get_mut(name)
            .ok_or_else(|| Error::new(ErrorKind::FileNotOpen(name.to_string())))?;
        if entry.read.is_none() {
            let file = self.root.open(name).map_err(Error::io)?;
            entry.read = Some(BufReader::new(file));
        }
        self.reader = Some(name.to_string());
        Ok(())
    }

    /// Select the current writer; `None` restores the console. The file
    /// is created or truncated.
    pub fn set_writer(&mut self, name: Option<&str>) -> Result<(), Error> {
        let Some(name) = name else {
            self.writer = None;
            return Ok(());
        };
        let entry = self
            .open
            .get_mut(name)
            .ok_or_else(|| Error::new(ErrorKind::FileNotOpen(name.to_string())))?;
        if entry.write.is_none() {
            let file = self.root.create(name).map_err(Error::io)?;
            entry.write = Some(file);
        }
        self.writer = Some(name.to_string());
        Ok(())
    }

    pub fn reading_console(&self) -> bool {
        self.reader.is_none()
    }

    /// Read one line from the current reader; `None` at end of input.
    pub fn read_line(&mut self) -> Result<Option<String>, Error> {
        let mut line = String::new();
        let n = match self.current_reader() {
            Some(r) => r.read_line(&mut line).map_err(Error::io)?,
            None => std::io::stdin().read_line(&mut line).map_err(Error::io)?,
        };
        if n == 0 {
            return Ok(None);
        }
        while line.ends_with('\n') || line.ends_with('\r') {
            line.pop();
        }
        Ok(Some(line))
    }

    /// Read one character from the current reader; `None` at end of
    /// input. Multi-byte sequences are consumed whole.
    pub fn read_char(&mut self) -> Result<Option<char>, Error> {
        let mut buf = [0u8; 4];
        let mut len = 0;
        loop {
            let n = match self.current_reader() {
                Some(r) => r.read(&mut buf[len..len + 1]).map_err(Error::io)?,
                None => std::io::stdin()
                    .read(&mut buf[len..len + 1])
                    .map_err(Error::io)?,
            };
            if n == 0 {
                return Ok(None);
            }
            len += 1;
            if let Ok(s) = std::str::from_utf8(&buf[..len]) {
                return Ok(s.chars().next());
            }
            if len == 4 {
                return Ok(Some(char::REPLACEMENT_CHARACTER));
            }
        }
    }

    fn current_reader(&mut self) -> Option<&mut BufReader<cap_std::fs::File>> {
        let name = self.reader.as_deref()?;
        self.open.get_mut(name)?.read.as_mut()
    }

    /// Write to the current writer: the selected file when one is
    /// active, else the capture buffer, else stdout.
    pub fn write(&mut self, text: &str) -> Result<(), Error> {
        if let Some(name) = self.writer.as_deref() {
            if let Some(file) = self.open.get_mut(name).and_then(|e| e.write.as_mut()) {
                return file.write_all(text.as_bytes()).map_err(Error::io);
            }
        }
        if let Some(buf) = self.capture.as_mut() {
            buf.push_str(text);
            return Ok(());
        }
        let mut out = std::io::stdout();
        out.write_all(text.as_bytes()).map_err(Error::io)?;
        out.flush().map_err(Error::io)
    }

    /// Redirect output into an in-memory buffer.
    pub fn begin_capture(&mut self) {
        self.capture = Some(String::new());
    }

    /// End capture, returning everything written since it began.
    pub fn take_capture(&mut self) -> String {
        self.capture.take().unwrap_or_default()
    }

    // ========================================================================
    // Directory operations
    // ========================================================================

    /// Directory listing, directories marked with a trailing slash.
    pub fn catalog(&self) -> Result<Vec<String>, Error> {
        let mut names = Vec::new();
        for entry in self.root.entries().map_err(Error::io)? {
            let entry = entry.map_err(Error::io)?;
            let mut name = entry.file_name().to_string_lossy().into_owned();
            if entry.file_type().map_err(Error::io)?.is_dir() {
                name.push('/');
            }
            names.push(name);
        }
        names.sort();
        Ok(names)
    }

    pub fn read_to_string(&self, name: &str) -> Result<String, Error> {
        self.root.read_to_string(name).map_err(Error::io)
    }

    pub fn create_dir(&self, name: &str) -> Result<(), Error> {
        self.root.create_dir(name).map_err(Error::io)
    }

    pub fn erase_file(&self, name: &str) -> Result<(), Error> {
        self.root.remove_file(name).map_err(Error::io)
    }

    pub fn rename(&self, from: &str, to: &str) -> Result<(), Error> {
        self.root.rename(from, &self.root, to).map_err(Error::io)
    }

    pub fn is_file(&self, name: &str) -> bool {
        self.root
            .metadata(name)
            .map(|m| m.is_file())
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn scratch() -> (TempDir, Files) {
        let dir = TempDir::new().unwrap();
        let files = Files::new(dir.path()).unwrap();
        (dir, files)
    }

    #[test]
    fn test_write_read_round_trip() {
        let (_dir, mut files) = scratch();
        files.open("notes").unwrap();
        files.set_writer(Some("notes")).unwrap();
        files.write("PRINT 1\nPRINT 2\n").unwrap();
        files.set_writer(None).unwrap();
        files.close("notes").unwrap();

        files.open("notes").unwrap();
        files.set_reader(Some("notes")).unwrap();
        assert_eq!(files.read_line().unwrap().unwrap(), "PRINT 1");
        assert_eq!(files.read_line().unwrap().unwrap(), "PRINT 2");
        assert_eq!(files.read_line().unwrap(), None);
        files.close("notes").unwrap();
        assert!(files.reading_console());
    }

    #[test]
    fn test_reader_requires_open() {
        let (_dir, mut files) = scratch();
        let err = files.set_reader(Some("missing")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::FileNotOpen("missing".to_string()));
    }

    #[test]
    fn test_close_unopened_fails() {
        let (_dir, mut files) = scratch();
        assert!(files.close("nothing").is_err());
    }

    #[test]
    fn test_capture_buffers_console_output() {
        let (_dir, mut files) = scratch();
        files.begin_capture();
        files.write("hello").unwrap();
        assert_eq!(files.take_capture(), "hello");
    }

    #[test]
    fn test_catalog_marks_directories() {
        let (_dir, mut files) = scratch();
        files.create_dir("sub").unwrap();
        files.open("plain").unwrap();
        files.set_writer(Some("plain")).unwrap();
        files.write("x").unwrap();
        files.set_writer(None).unwrap();
        files.close("plain").unwrap();

        let names = files.catalog().unwrap();
        assert_eq!(names, ["plain", "sub/"]);
    }

    #[test]
    fn test_erase_and_exists() {
        let (_dir, mut files) = scratch();
        files.open("temp").unwrap();
        files.set_writer(Some("temp")).unwrap();
        files.write("x").unwrap();
        files.set_writer(None).unwrap();
        files.close("temp").unwrap();

        assert!(files.is_file("temp"));
        files.erase_file("temp").unwrap();
        assert!(!files.is_file("temp"));
    }
}
