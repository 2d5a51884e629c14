//! Size-rotated log file
//!
//! `<dir>/<name>.log` is the active file. On rotation it becomes
//! `<name>.log.1`, the previous `.1` becomes `.2`, and so on up to
//! `max_files`; anything older is removed.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::buffer::LineBuffer;

#[derive(Debug)]
pub struct RollingFile {
    path: PathBuf,
    file: File,
    size: u64,
    max_size: u64,
    max_files: usize,
}

impl RollingFile {
    pub fn open(dir: &Path, name: &str, max_size: u64, max_files: usize) -> io::Result<Self> {
        let path = dir.join(format!("{}.log", name));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        let mut rolling = Self {
            path,
            file,
            size,
            max_size,
            max_files,
        };
        rolling.write_banner()?;
        Ok(rolling)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn rotated_path(&self, index: usize) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".{}", index));
        PathBuf::from(name)
    }

    fn write_banner(&mut self) -> io::Result<()> {
        let banner = format!(
            "=== log opened at {} ===\n",
            chrono::Local::now().to_rfc3339()
        );
        self.file.write_all(banner.as_bytes())?;
        self.size += banner.len() as u64;
        Ok(())
    }

    fn rotate(&mut self) -> io::Result<()> {
        self.file.flush()?;

        if self.max_files == 0 {
            fs::remove_file(&self.path)?;
        } else {
            let oldest = self.rotated_path(self.max_files);
            if oldest.exists() {
                fs::remove_file(&oldest)?;
            }
            for index in (1..self.max_files).rev() {
                let from = self.rotated_path(index);
                if from.exists() {
                    fs::rename(&from, self.rotated_path(index + 1))?;
                }
            }
            fs::rename(&self.path, self.rotated_path(1))?;
        }

        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;
        self.write_banner()
    }
}

impl Write for RollingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size > 0 && self.size + buf.len() as u64 > self.max_size {
            self.rotate()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Cloneable writer handed to the fmt layer; tees into the line buffer
#[derive(Clone)]
pub(crate) struct SharedWriter {
    file: Arc<Mutex<RollingFile>>,
    recent: Arc<Mutex<LineBuffer>>,
}

impl SharedWriter {
    pub(crate) fn new(file: RollingFile, recent: Arc<Mutex<LineBuffer>>) -> Self {
        Self {
            file: Arc::new(Mutex::new(file)),
            recent,
        }
    }
}

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if let Ok(mut recent) = self.recent.lock() {
            recent.push_bytes(buf);
        }
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut file = self
            .file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        file.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_creates_active_file() {
        let dir = tempdir().unwrap();
        let file = RollingFile::open(dir.path(), "kanban", 1024, 2).unwrap();
        assert!(file.path().exists());
        assert_eq!(file.path().file_name().unwrap(), "kanban.log");
    }

    #[test]
    fn test_rotates_when_full() {
        let dir = tempdir().unwrap();
        let mut file = RollingFile::open(dir.path(), "kanban", 128, 2).unwrap();

        for _ in 0..20 {
            file.write_all(b"0123456789abcdef0123456789abcdef\n").unwrap();
        }
        file.flush().unwrap();

        assert!(dir.path().join("kanban.log.1").exists());
        assert!(dir.path().join("kanban.log.2").exists());
        assert!(!dir.path().join("kanban.log.3").exists());
        assert!(fs::metadata(dir.path().join("kanban.log")).unwrap().len() <= 128);
    }

    #[test]
    fn test_shared_writer_fills_buffer() {
        let dir = tempdir().unwrap();
        let file = RollingFile::open(dir.path(), "kanban", 4096, 1).unwrap();
        let recent = Arc::new(Mutex::new(LineBuffer::new(8)));
        let mut writer = SharedWriter::new(file, recent.clone());

        writer.write_all(b"first line\nsecond line\n").unwrap();

        let lines = recent.lock().unwrap().lines();
        assert_eq!(lines, vec!["first line".to_string(), "second line".to_string()]);
        let on_disk = fs::read_to_string(dir.path().join("kanban.log")).unwrap();
        assert!(on_disk.contains("second line"));
    }
}
