//! JIT modules: compile emitted C to a shared object and load it.
//!
//! A [`Module`] owns three resources: the temp source file, the temp shared
//! object, and the loaded library handle. Dropping the module unloads the
//! library first and then unlinks the files, which invalidates every function
//! pointer the module handed out; callers must not outlive it with one.
//! Files from failed compilations stay on disk for inspection.

use std::env;
use std::ffi::c_void;
use std::fs;
use std::path::PathBuf;
use std::process::Command;

use rand::Rng;

/// Library stems avoid `i`, `l`, and `o` to prevent confusion with `1` and `0`.
const STEM_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz0123456789";
const STEM_LEN: usize = 12;

/// Errors from compiling or loading a module.
#[derive(Debug, thiserror::Error)]
pub enum JitError {
    /// Could not create or write a temp file.
    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The C compiler exited with a non-zero status.
    #[error("compilation command failed: {command} (exit status {status}): {stderr}")]
    CompilerFailed {
        command: String,
        status: i32,
        stderr: String,
    },

    /// The shared object could not be loaded.
    #[error("failed to load {path}: {source}")]
    LoadFailed {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// A symbol was not found in the loaded library.
    #[error("function '{name}' not found in module {path}: {source}")]
    SymbolNotFound {
        name: String,
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    /// `get_func` was called before a successful `compile`.
    #[error("module is not compiled; call compile() first")]
    NotCompiled,
}

/// A runtime bundle of emitted source, compiled shared object, and loaded
/// library handle.
pub struct Module {
    source: String,
    tmpdir: PathBuf,
    stem: String,
    lib: Option<libloading::Library>,
}

fn random_stem() -> String {
    let mut rng = rand::thread_rng();
    (0..STEM_LEN)
        .map(|_| STEM_ALPHABET[rng.gen_range(0..STEM_ALPHABET.len())] as char)
        .collect()
}

impl Module {
    /// Wraps emitted C source, prepending the include the emitted calls need.
    ///
    /// The temp directory is `TMPDIR`, read once here, defaulting to `/tmp/`.
    pub fn new(source: impl Into<String>) -> Self {
        let source = format!("#include <stdio.h>\n{}", source.into());
        let tmpdir = env::var_os("TMPDIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("/tmp/"));
        Self {
            source,
            tmpdir,
            stem: random_stem(),
            lib: None,
        }
    }

    /// The full source text, including the prepended include.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Path of the temp C file.
    pub fn source_path(&self) -> PathBuf {
        self.tmpdir.join(format!("{}.c", self.stem))
    }

    /// Path of the temp shared object.
    pub fn object_path(&self) -> PathBuf {
        self.tmpdir.join(format!("{}.so", self.stem))
    }

    /// Writes the source, runs `cc -std=c99 -shared`, and loads the result
    /// with immediate binding and local scope. Returns the object path.
    pub fn compile(&mut self) -> Result<PathBuf, JitError> {
        let c_path = self.source_path();
        let so_path = self.object_path();

        fs::write(&c_path, &self.source).map_err(|source| JitError::Io {
            path: c_path.clone(),
            source,
        })?;

        let command = format!(
            "cc -std=c99 -shared {} -o {}",
            c_path.display(),
            so_path.display()
        );
        log::debug!("executing {command}");
        let output = Command::new("cc")
            .args(["-std=c99", "-shared"])
            .arg(&c_path)
            .arg("-o")
            .arg(&so_path)
            .output()
            .map_err(|source| JitError::Io {
                path: c_path.clone(),
                source,
            })?;
        if !output.status.success() {
            return Err(JitError::CompilerFailed {
                command,
                status: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
            });
        }

        let lib = load_library(&so_path).map_err(|source| JitError::LoadFailed {
            path: so_path.clone(),
            source,
        })?;
        self.lib = Some(lib);
        Ok(so_path)
    }

    /// Resolves a function symbol to a raw pointer.
    ///
    /// The pointer stays valid only while this module is alive.
    pub fn get_func(&self, name: &str) -> Result<*const c_void, JitError> {
        let lib = self.lib.as_ref().ok_or(JitError::NotCompiled)?;
        unsafe {
            lib.get::<*const c_void>(name.as_bytes())
                .map(|sym| *sym)
                .map_err(|source| JitError::SymbolNotFound {
                    name: name.to_owned(),
                    path: self.object_path(),
                    source,
                })
        }
    }
}

#[cfg(unix)]
fn load_library(path: &std::path::Path) -> Result<libloading::Library, libloading::Error> {
    use libloading::os::unix::{Library, RTLD_LOCAL, RTLD_NOW};
    unsafe { Library::open(Some(path), RTLD_NOW | RTLD_LOCAL).map(Into::into) }
}

#[cfg(not(unix))]
fn load_library(path: &std::path::Path) -> Result<libloading::Library, libloading::Error> {
    unsafe { libloading::Library::new(path) }
}

impl Drop for Module {
    fn drop(&mut self) {
        // Unload before unlinking. Cleanup is best-effort, and the files of a
        // module that never compiled stay on disk for inspection.
        if let Some(lib) = self.lib.take() {
            drop(lib);
            for path in [self.source_path(), self.object_path()] {
                if let Err(e) = fs::remove_file(&path) {
                    log::warn!("failed to remove {}: {e}", path.display());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stem_is_twelve_chars_from_safe_alphabet() {
        for _ in 0..64 {
            let stem = random_stem();
            assert_eq!(stem.len(), STEM_LEN);
            for c in stem.chars() {
                assert!(STEM_ALPHABET.contains(&(c as u8)), "bad stem char {c}");
                assert!(!"ilo".contains(c));
            }
        }
    }

    #[test]
    fn source_is_prefixed_with_stdio() {
        let module = Module::new("int f() { return 0; }\n");
        assert!(module.source().starts_with("#include <stdio.h>\n"));
    }

    #[test]
    fn compile_load_and_resolve() {
        let mut module = Module::new("int f(int* out) { out[0] = 7; return 0; }\n");
        module.compile().expect("cc should accept the source");

        let f = module.get_func("f").expect("symbol 'f' should resolve");
        assert!(!f.is_null());

        let f: unsafe extern "C" fn(*mut i32) -> i32 = unsafe { std::mem::transmute(f) };
        let mut out = 0i32;
        let rc = unsafe { f(&mut out) };
        assert_eq!(rc, 0);
        assert_eq!(out, 7);
    }

    #[test]
    fn missing_symbol_is_a_recognizable_error() {
        let mut module = Module::new("int f() { return 0; }\n");
        module.compile().unwrap();
        let err = module.get_func("missing").unwrap_err();
        let text = err.to_string();
        assert!(text.contains("'missing'"));
        assert!(text.contains("not found"));
    }

    #[test]
    fn get_func_before_compile_is_an_error() {
        let module = Module::new("int f() { return 0; }\n");
        assert!(matches!(
            module.get_func("f"),
            Err(JitError::NotCompiled)
        ));
    }

    #[test]
    fn compiler_failure_reports_command_and_status() {
        let mut module = Module::new("this is not C\n");
        let c_path = module.source_path();
        let err = module.compile().unwrap_err();
        match &err {
            JitError::CompilerFailed {
                command, status, ..
            } => {
                assert!(command.starts_with("cc -std=c99 -shared"));
                assert_ne!(*status, 0);
            }
            other => panic!("expected CompilerFailed, got {other:?}"),
        }
        // The broken source stays on disk for inspection.
        assert!(c_path.exists());
        let _ = fs::remove_file(&c_path);
    }

    #[test]
    fn drop_removes_temp_files() {
        let mut module = Module::new("int f() { return 0; }\n");
        module.compile().unwrap();
        let c_path = module.source_path();
        let so_path = module.object_path();
        assert!(c_path.exists());
        assert!(so_path.exists());
        drop(module);
        assert!(!c_path.exists());
        assert!(!so_path.exists());
    }
}
