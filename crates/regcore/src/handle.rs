//! Opaque handles to compiled patterns.
//!
//! The [`HandleManager`] owns every compiled [`Regex`] it hands out and
//! gives callers a plain [`Handle`] in exchange. Handles are never reused,
//! so using a handle after it has been released (or releasing it twice) is
//! detected and reported as [`RegexError::InvalidHandle`] instead of
//! reaching another pattern.
//!
//! The table is guarded by an `RwLock`. Compiling and releasing take the
//! write lock; lookups clone an `Arc<Regex>` under the read lock, and
//! matching then runs without holding any lock.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use crate::config::EngineConfig;
use crate::error::{RegexError, Result};
use crate::flags::{CompileFlags, MatchFlags, MatchOptions};
use crate::regex::{Regex, RegexBuilder};
use crate::span::MatchResult;

/// Counter for handle values. Starts at 1 so 0 is never issued.
static NEXT_HANDLE: AtomicU64 = AtomicU64::new(1);

/// An opaque reference to a compiled pattern held by a [`HandleManager`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// Allocate a handle value that has never been issued before.
    fn next() -> Self {
        Self(NEXT_HANDLE.fetch_add(1, Ordering::Relaxed))
    }

    /// Rebuild a handle from its raw value, e.g. one passed across an FFI
    /// boundary. The result is only valid if a manager issued it.
    #[must_use]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw value.
    #[must_use]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A table of compiled patterns keyed by [`Handle`].
pub struct HandleManager {
    table: RwLock<HashMap<Handle, Arc<Regex>>>,
    config: EngineConfig,
    /// Total handles issued.
    total_compiled: AtomicUsize,
    /// Total handles released.
    total_released: AtomicUsize,
    /// Total operations refused because of a bad handle.
    total_invalid: AtomicUsize,
}

impl HandleManager {
    /// Create a manager with default limits.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create a manager whose patterns use `config`.
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            table: RwLock::new(HashMap::new()),
            config,
            total_compiled: AtomicUsize::new(0),
            total_released: AtomicUsize::new(0),
            total_invalid: AtomicUsize::new(0),
        }
    }

    /// Limits applied to patterns compiled by this manager.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Compile a pattern and register it.
    ///
    /// Compilation happens before the table lock is taken.
    ///
    /// # Errors
    ///
    /// Returns the compile error; nothing is registered in that case.
    pub fn compile(&self, pattern: &[u8], flags: CompileFlags) -> Result<Handle> {
        let regex = RegexBuilder::new(pattern)
            .flags(flags)
            .config(self.config)
            .build()?;
        Ok(self.insert(regex))
    }

    /// Compile a pattern and wrap the handle in a guard that releases it.
    ///
    /// # Errors
    ///
    /// As [`HandleManager::compile`].
    pub fn compile_guarded(&self, pattern: &[u8], flags: CompileFlags) -> Result<HandleGuard<'_>> {
        let handle = self.compile(pattern, flags)?;
        Ok(HandleGuard::new(self, handle))
    }

    /// Register an already compiled regex.
    pub fn insert(&self, regex: Regex) -> Handle {
        let handle = Handle::next();
        let groups = regex.subexpression_count();
        {
            let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
            table.insert(handle, Arc::new(regex));
        }
        self.total_compiled.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%handle, groups, "registered handle");
        handle
    }

    /// Look up the regex behind `handle`.
    ///
    /// # Errors
    ///
    /// Returns [`RegexError::InvalidHandle`] if the handle was released or
    /// never issued.
    pub fn get(&self, handle: Handle) -> Result<Arc<Regex>> {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        match table.get(&handle) {
            Some(regex) => Ok(Arc::clone(regex)),
            None => {
                drop(table);
                Err(self.refuse(handle, "lookup"))
            }
        }
    }

    /// Number of subexpressions of the pattern behind `handle`.
    ///
    /// # Errors
    ///
    /// As [`HandleManager::get`].
    pub fn subexpression_count(&self, handle: Handle) -> Result<usize> {
        Ok(self.get(handle)?.subexpression_count())
    }

    /// Search `text` with `regexec`-style flags.
    ///
    /// # Errors
    ///
    /// Returns [`RegexError::InvalidHandle`] for a bad handle, or a resource
    /// limit error from the search.
    pub fn exec(
        &self,
        handle: Handle,
        text: &[u8],
        flags: MatchFlags,
    ) -> Result<Option<MatchResult>> {
        self.exec_with(handle, text, &MatchOptions::from(flags))
    }

    /// Search `text` with full matching options.
    ///
    /// # Errors
    ///
    /// As [`HandleManager::exec`].
    pub fn exec_with(
        &self,
        handle: Handle,
        text: &[u8],
        options: &MatchOptions,
    ) -> Result<Option<MatchResult>> {
        let regex = self.get(handle)?;
        regex.exec(text, options)
    }

    /// Release `handle`, dropping the pattern once no search still uses it.
    ///
    /// # Errors
    ///
    /// Returns [`RegexError::InvalidHandle`] if the handle was already
    /// released or never issued. Other handles are unaffected either way.
    pub fn release(&self, handle: Handle) -> Result<()> {
        let removed = {
            let mut table = self.table.write().unwrap_or_else(PoisonError::into_inner);
            table.remove(&handle)
        };
        match removed {
            Some(_) => {
                self.total_released.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(%handle, "released handle");
                Ok(())
            }
            None => Err(self.refuse(handle, "release")),
        }
    }

    fn refuse(&self, handle: Handle, operation: &'static str) -> RegexError {
        self.total_invalid.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(%handle, operation, "invalid handle");
        RegexError::invalid_handle(handle)
    }

    /// Check if `handle` is live.
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.contains_key(&handle)
    }

    /// Number of live handles.
    #[must_use]
    pub fn len(&self) -> usize {
        let table = self.table.read().unwrap_or_else(PoisonError::into_inner);
        table.len()
    }

    /// Check if no handles are live.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get manager statistics.
    #[must_use]
    pub fn stats(&self) -> HandleStats {
        HandleStats {
            live: self.len(),
            total_compiled: self.total_compiled.load(Ordering::Relaxed),
            total_released: self.total_released.load(Ordering::Relaxed),
            total_invalid: self.total_invalid.load(Ordering::Relaxed),
        }
    }
}

impl Default for HandleManager {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for HandleManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleManager")
            .field("config", &self.config)
            .field("stats", &self.stats())
            .finish_non_exhaustive()
    }
}

/// Statistics about a handle manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleStats {
    /// Handles currently live.
    pub live: usize,
    /// Handles issued over the manager's lifetime.
    pub total_compiled: usize,
    /// Handles released over the manager's lifetime.
    pub total_released: usize,
    /// Operations refused because the handle was not live.
    pub total_invalid: usize,
}

/// Releases its handle when dropped.
///
/// ```
/// use regcore::{CompileFlags, HandleManager};
///
/// let manager = HandleManager::new();
/// {
///     let guard = manager.compile_guarded(b"a(b)", CompileFlags::EXTENDED).unwrap();
///     assert_eq!(manager.subexpression_count(guard.handle()).unwrap(), 1);
/// }
/// assert!(manager.is_empty());
/// ```
#[derive(Debug)]
pub struct HandleGuard<'m> {
    manager: &'m HandleManager,
    handle: Option<Handle>,
}

impl<'m> HandleGuard<'m> {
    /// Guard an existing handle of `manager`.
    #[must_use]
    pub const fn new(manager: &'m HandleManager, handle: Handle) -> Self {
        Self {
            manager,
            handle: Some(handle),
        }
    }

    /// The guarded handle.
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle.unwrap_or(Handle(0))
    }

    /// Detach the handle; the caller becomes responsible for releasing it.
    #[must_use]
    pub fn into_handle(mut self) -> Handle {
        self.handle.take().unwrap_or(Handle(0))
    }

    /// Release now, reporting any error instead of ignoring it on drop.
    ///
    /// # Errors
    ///
    /// As [`HandleManager::release`].
    pub fn release(mut self) -> Result<()> {
        match self.handle.take() {
            Some(handle) => self.manager.release(handle),
            None => Ok(()),
        }
    }
}

impl Drop for HandleGuard<'_> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            if let Err(err) = self.manager.release(handle) {
                tracing::warn!(%handle, error = %err, "guarded handle was already released");
            }
        }
    }
}

static GLOBAL_MANAGER: OnceLock<HandleManager> = OnceLock::new();

/// The process-wide manager used by [`crate::api`].
///
/// Unless [`crate::api::init`] or [`crate::api::init_from_env`] ran first,
/// the first call configures it from `REGCORE_*` environment variables. A
/// variable that does not parse or validate is logged at `warn` level and
/// the defaults apply; call [`crate::api::init_from_env`] at startup to get
/// that error instead.
pub fn global_manager() -> &'static HandleManager {
    GLOBAL_MANAGER.get_or_init(|| {
        let config = EngineConfig::from_env().unwrap_or_else(|err| {
            tracing::warn!(error = %err, "ignoring invalid environment configuration");
            EngineConfig::default()
        });
        HandleManager::with_config(config)
    })
}

/// Configure the process-wide manager.
pub(crate) fn init_global(config: EngineConfig) -> Result<&'static HandleManager> {
    install(&GLOBAL_MANAGER, config)
}

/// Put a manager with `config` into `cell`, failing if one is already there.
fn install(cell: &OnceLock<HandleManager>, config: EngineConfig) -> Result<&HandleManager> {
    config.validate()?;
    let mut installed = false;
    let manager = cell.get_or_init(|| {
        installed = true;
        HandleManager::with_config(config)
    });
    if !installed {
        return Err(RegexError::config(
            "global handle manager is already initialized",
        ));
    }
    tracing::debug!(?config, "initialized global handle manager");
    Ok(manager)
}
