//! Named shader programs with a fallback program
//!
//! Shader compilation failures are recoverable: when a program fails to
//! link and a fallback is registered, the fallback is stored under the
//! requested name and a warning is logged. Any other error propagates.

use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::{engine_bail, engine_debug, engine_warn};
use crate::error::{Error, Result};
use crate::graphics_device::{GpuResource, GraphicsDevice, Shader, ShaderDesc};

const LOG_SOURCE: &str = "galaxy3d::resource";

/// Shader programs by name
pub struct ShaderLibrary {
    programs: FxHashMap<String, Arc<dyn Shader>>,
    /// Names currently resolved to the fallback program
    fallbacks: FxHashSet<String>,
    fallback: Option<Arc<dyn Shader>>,
}

impl ShaderLibrary {
    pub fn new() -> Self {
        Self {
            programs: FxHashMap::default(),
            fallbacks: FxHashSet::default(),
            fallback: None,
        }
    }

    /// Compile the program used in place of programs that fail to compile
    ///
    /// The fallback itself must compile. A previous fallback is disposed
    /// unless some name still resolves to it.
    pub fn set_fallback(&mut self, device: &mut dyn GraphicsDevice, desc: &ShaderDesc) -> Result<()> {
        let program = device.create_shader(desc)?;
        if let Some(previous) = self.fallback.replace(program) {
            if !self.is_shared(&previous) {
                previous.dispose();
            }
        }
        engine_debug!(LOG_SOURCE, "Fallback shader set to '{}'", desc.label);
        Ok(())
    }

    pub fn fallback(&self) -> Option<&Arc<dyn Shader>> {
        self.fallback.as_ref()
    }

    /// Compile a program and store it under `name`
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `name` is already taken
    /// - Compilation fails and no fallback is registered
    /// - The device fails for a reason other than compilation
    pub fn compile(&mut self, device: &mut dyn GraphicsDevice, name: &str, desc: &ShaderDesc) -> Result<Arc<dyn Shader>> {
        if self.programs.contains_key(name) {
            engine_bail!(LOG_SOURCE, "Shader '{}' already exists", name);
        }

        let program = match device.create_shader(desc) {
            Ok(program) => program,
            Err(Error::ShaderCompilation(reason)) => {
                let Some(fallback) = &self.fallback else {
                    return Err(Error::ShaderCompilation(reason));
                };
                engine_warn!(LOG_SOURCE, "Shader '{}' failed to compile, using fallback '{}': {}",
                    name, fallback.label(), reason);
                self.fallbacks.insert(name.to_string());
                Arc::clone(fallback)
            }
            Err(error) => return Err(error),
        };

        self.programs.insert(name.to_string(), Arc::clone(&program));
        Ok(program)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Shader>> {
        self.programs.get(name)
    }

    /// Returns true if `name` resolved to the fallback program
    pub fn is_fallback(&self, name: &str) -> bool {
        self.fallbacks.contains(name)
    }

    /// Stored names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.programs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.programs.is_empty()
    }

    /// True if the fallback or a stored name still refers to `program`
    fn is_shared(&self, program: &Arc<dyn Shader>) -> bool {
        self.fallback.iter().chain(self.programs.values()).any(|other| Arc::ptr_eq(other, program))
    }

    /// Remove a program and dispose it unless it is still in use
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let Some(program) = self.programs.remove(name) else {
            engine_bail!(LOG_SOURCE, "Shader '{}' not found", name);
        };
        self.fallbacks.remove(name);
        if !self.is_shared(&program) {
            program.dispose();
        }
        Ok(())
    }

    /// Dispose every program and the fallback, each exactly once
    pub fn unload_all(&mut self) {
        let mut unique: Vec<Arc<dyn Shader>> = Vec::new();
        for program in self.programs.drain().map(|(_, program)| program).chain(self.fallback.take()) {
            if !unique.iter().any(|other| Arc::ptr_eq(other, &program)) {
                unique.push(program);
            }
        }
        self.fallbacks.clear();
        for program in &unique {
            program.dispose();
        }
        engine_debug!(LOG_SOURCE, "Shader library unloaded ({} programs)", unique.len());
    }
}

impl Default for ShaderLibrary {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[path = "shader_library_tests.rs"]
mod tests;
