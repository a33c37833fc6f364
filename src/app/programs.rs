use super::error::{ScanError, ShaderError};
use super::file_io;
use crate::PROGRAM_CAP;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// A shader source file together with its compiled form.
///
/// `H` is the compiled handle; the app uses a GL renderer, tests use plain values.
#[derive(Debug)]
pub struct Program<H> {
    pub name: String,
    pub path: PathBuf,
    /// `None` until the file compiles at least once.
    pub handle: Option<H>,
    pub last_modified: Option<SystemTime>,
    /// The file could not be found on the last reload.
    pub missing: bool,
    pub last_error: Option<String>,
}

impl<H> Program<H> {
    pub fn is_valid(&self) -> bool {
        self.handle.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReloadEvent {
    Updated { index: usize },
    Failed { index: usize, error: String },
    Added { index: usize },
    Missing { index: usize },
}

/// Append-only list of the programs found in one directory.
///
/// Programs are never removed, so indices stay valid for the list's lifetime.
#[derive(Debug)]
pub struct ProgramList<H> {
    dir: PathBuf,
    extension: String,
    programs: Vec<Program<H>>,
}

impl<H> ProgramList<H> {
    pub fn empty(dir: &Path, extension: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            extension: extension.to_string(),
            programs: Vec::new(),
        }
    }

    /// Scans `dir` and compiles every matching file. Files that fail to
    /// compile are still tracked, without a handle.
    pub fn load<C>(dir: &Path, extension: &str, mut compile: C) -> Result<Self, ScanError>
    where
        C: FnMut(&Path) -> Result<H, ShaderError>,
    {
        let mut list = Self::empty(dir, extension);
        for path in file_io::scan_shader_dir(dir, extension)? {
            list.track(path, &mut compile);
        }

        log::info!("Loaded {} shader(s) from {:?}", list.len(), dir);
        Ok(list)
    }

    /// Appends `path` and compiles it. Returns the new index and, when the
    /// compile failed, a summary of the error.
    fn track<C>(&mut self, path: PathBuf, compile: &mut C) -> Option<(usize, Option<String>)>
    where
        C: FnMut(&Path) -> Result<H, ShaderError>,
    {
        if self.programs.len() >= PROGRAM_CAP {
            log::warn!("Program list is full ({} entries), ignoring {:?}", PROGRAM_CAP, path);
            return None;
        }

        let last_modified = file_io::modified_time(&path);
        let (handle, error) = match compile(&path) {
            Ok(handle) => (Some(handle), None),
            Err(e) => {
                log::error!("error in shader `{}`: {}", path.display(), e);
                (None, Some(e))
            }
        };

        self.programs.push(Program {
            name: file_io::program_name(&self.dir, &path),
            path,
            handle,
            last_modified,
            missing: false,
            last_error: error.as_ref().map(ToString::to_string),
        });
        Some((self.programs.len() - 1, error.map(|e| e.summary())))
    }

    /// Recompiles every program whose file changed since the last look and
    /// picks up files that appeared in the directory.
    ///
    /// A failed recompile keeps the previous handle. A successful one hands the
    /// previous handle to `release`.
    pub fn reload<C, R>(&mut self, mut compile: C, mut release: R) -> Vec<ReloadEvent>
    where
        C: FnMut(&Path) -> Result<H, ShaderError>,
        R: FnMut(H),
    {
        let mut events = Vec::new();

        for (index, program) in self.programs.iter_mut().enumerate() {
            let Some(modified) = file_io::modified_time(&program.path) else {
                if !program.missing {
                    program.missing = true;
                    log::warn!("shader `{}` is missing", program.path.display());
                    events.push(ReloadEvent::Missing { index });
                }
                continue;
            };

            if program.missing {
                program.missing = false;
                log::info!("shader `{}` is back", program.path.display());
            }

            if program.last_modified == Some(modified) {
                continue;
            }
            program.last_modified = Some(modified);

            match compile(&program.path) {
                Ok(handle) => {
                    if let Some(old) = program.handle.replace(handle) {
                        release(old);
                    }
                    program.last_error = None;
                    log::info!("update in shader `{}`", program.path.display());
                    events.push(ReloadEvent::Updated { index });
                }
                Err(e) => {
                    log::error!("error in shader `{}`: {}", program.path.display(), e);
                    program.last_error = Some(e.to_string());
                    events.push(ReloadEvent::Failed { index, error: e.summary() });
                }
            }
        }

        match file_io::scan_shader_dir(&self.dir, &self.extension) {
            Ok(paths) => {
                for path in paths {
                    if self.position(&path).is_some() {
                        continue;
                    }
                    let Some((index, error)) = self.track(path, &mut compile) else {
                        continue;
                    };
                    log::info!("new shader `{}`", self.programs[index].path.display());
                    events.push(ReloadEvent::Added { index });
                    if let Some(error) = error {
                        events.push(ReloadEvent::Failed { index, error });
                    }
                }
            }
            Err(e) => log::warn!("{}", e),
        }

        events
    }

    /// Hands every compiled handle to `release`, leaving the programs tracked.
    pub fn release_all<R>(&mut self, mut release: R)
    where
        R: FnMut(H),
    {
        for program in &mut self.programs {
            if let Some(handle) = program.handle.take() {
                release(handle);
            }
        }
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.programs.iter().position(|p| p.path == path)
    }

    pub fn get(&self, index: usize) -> Option<&Program<H>> {
        self.programs.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Program<H>> {
        self.programs.iter()
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    /// Writes `source` and pins the mtime so consecutive writes always differ.
    fn write_at(path: &Path, source: &str, secs: u64) {
        fs::write(path, source).unwrap();
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs)).unwrap();
    }

    /// Compiles by reading the file; any source containing "broken" fails.
    fn compile(path: &Path) -> Result<String, ShaderError> {
        let source = file_io::read_shader_source(path)?;
        if source.contains("broken") {
            Err(ShaderError::Compile("0:1(1): error: syntax error".to_string()))
        } else {
            Ok(source)
        }
    }

    fn handle(list: &ProgramList<String>, index: usize) -> Option<&str> {
        list.get(index).and_then(|p| p.handle.as_deref())
    }

    #[test]
    fn load_tracks_files_that_fail_to_compile() {
        let temp_dir = TempDir::new().unwrap();
        write_at(&temp_dir.path().join("a.fs"), "good", 1);
        write_at(&temp_dir.path().join("b.fs"), "broken", 1);

        let list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(handle(&list, 0), Some("good"));

        let failed = list.get(1).unwrap();
        assert_eq!(failed.name, "b.fs");
        assert!(!failed.is_valid());
        assert!(failed.last_error.as_deref().unwrap().contains("syntax error"));
    }

    #[test]
    fn reload_skips_unchanged_files() {
        let temp_dir = TempDir::new().unwrap();
        write_at(&temp_dir.path().join("a.fs"), "good", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        let mut compiled = 0;
        let events = list.reload(
            |path| {
                compiled += 1;
                compile(path)
            },
            |_| panic!("nothing should be released"),
        );
        assert!(events.is_empty());
        assert_eq!(compiled, 0);
    }

    #[test]
    fn changed_file_replaces_and_releases_old_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.fs");
        write_at(&path, "v1", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        write_at(&path, "v2", 2);
        let mut released = Vec::new();
        let events = list.reload(compile, |old| released.push(old));

        assert_eq!(events, [ReloadEvent::Updated { index: 0 }]);
        assert_eq!(handle(&list, 0), Some("v2"));
        assert_eq!(released, ["v1"]);
    }

    #[test]
    fn failed_recompile_keeps_previous_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.fs");
        write_at(&path, "v1", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        write_at(&path, "broken", 2);
        let events = list.reload(compile, |_| panic!("kept handle must not be released"));

        assert!(matches!(&events[..], [ReloadEvent::Failed { index: 0, .. }]));
        assert_eq!(handle(&list, 0), Some("v1"));
        assert!(list.get(0).unwrap().last_error.is_some());

        // The failed mtime is remembered, so the broken file is not retried.
        let events = list.reload(compile, |_| {});
        assert!(events.is_empty());
    }

    #[test]
    fn fixing_a_file_that_never_compiled_gives_it_a_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.fs");
        write_at(&path, "broken", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();
        assert!(!list.get(0).unwrap().is_valid());

        write_at(&path, "fixed", 2);
        let mut released = 0;
        list.reload(compile, |_| released += 1);

        assert_eq!(handle(&list, 0), Some("fixed"));
        assert!(list.get(0).unwrap().last_error.is_none());
        assert_eq!(released, 0);
    }

    #[test]
    fn new_files_are_appended() {
        let temp_dir = TempDir::new().unwrap();
        write_at(&temp_dir.path().join("b.fs"), "b", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        write_at(&temp_dir.path().join("a.fs"), "a", 1);
        write_at(&temp_dir.path().join("c.fs"), "broken", 1);
        let events = list.reload(compile, |_| {});

        assert_eq!(list.len(), 3);
        assert_eq!(list.get(0).unwrap().name, "b.fs");
        assert_eq!(list.get(1).unwrap().name, "a.fs");
        assert_eq!(events[0], ReloadEvent::Added { index: 1 });
        assert_eq!(events[1], ReloadEvent::Added { index: 2 });
        assert!(matches!(events[2], ReloadEvent::Failed { index: 2, .. }));
    }

    #[test]
    fn deleted_file_is_marked_missing_and_keeps_its_handle() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a.fs");
        write_at(&path, "v1", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        fs::remove_file(&path).unwrap();
        let events = list.reload(compile, |_| {});
        assert_eq!(events, [ReloadEvent::Missing { index: 0 }]);
        assert!(list.get(0).unwrap().missing);
        assert_eq!(handle(&list, 0), Some("v1"));

        // Reported once.
        assert!(list.reload(compile, |_| {}).is_empty());

        write_at(&path, "v2", 5);
        let events = list.reload(compile, |_| {});
        assert_eq!(events, [ReloadEvent::Updated { index: 0 }]);
        assert!(!list.get(0).unwrap().missing);
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn list_never_grows_past_capacity() {
        let temp_dir = TempDir::new().unwrap();
        for i in 0..PROGRAM_CAP + 2 {
            write_at(&temp_dir.path().join(format!("{i:03}.fs")), "ok", 1);
        }

        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();
        assert_eq!(list.len(), PROGRAM_CAP);

        list.reload(compile, |_| {});
        assert_eq!(list.len(), PROGRAM_CAP);
    }

    #[test]
    fn release_all_releases_each_handle_once() {
        let temp_dir = TempDir::new().unwrap();
        write_at(&temp_dir.path().join("a.fs"), "a", 1);
        write_at(&temp_dir.path().join("b.fs"), "broken", 1);
        write_at(&temp_dir.path().join("c.fs"), "c", 1);
        let mut list = ProgramList::load(temp_dir.path(), "fs", compile).unwrap();

        let mut released = Vec::new();
        list.release_all(|h| released.push(h));
        list.release_all(|h| released.push(h));

        assert_eq!(released, ["a", "c"]);
        assert!(list.iter().all(|p| !p.is_valid()));
    }
}
