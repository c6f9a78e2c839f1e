use super::*;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Builds an exception of a registered type from the message received on the wire.
pub type Constructor = Arc<dyn Fn(Option<String>) -> Result<AppException> + Send + Sync>;

static BUILTIN: Lazy<Arc<ExceptionRegistry>> = Lazy::new(|| {
    let mut registry = ExceptionRegistry::empty();
    for kind in ExceptionKind::ALL {
        registry.register(kind.type_name(), move |message| {
            Ok(AppException::with_kind(kind, message))
        });
    }
    Arc::new(registry)
});

/// Mapping from exception type names to their constructors.
///
/// A state machine error is rebuilt into a typed exception only if the
/// type name recorded by the server is registered here.
#[derive(Clone)]
pub struct ExceptionRegistry {
    constructors: HashMap<String, Constructor>,
}

impl ExceptionRegistry {
    pub fn empty() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// The registry knowing every `ExceptionKind`.
    pub fn builtin() -> Arc<Self> {
        BUILTIN.clone()
    }

    /// Register a constructor for `type_name`, replacing any previous one.
    pub fn register<F>(&mut self, type_name: impl Into<String>, ctor: F) -> &mut Self
    where
        F: Fn(Option<String>) -> Result<AppException> + Send + Sync + 'static,
    {
        self.constructors.insert(type_name.into(), Arc::new(ctor));
        self
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.constructors.contains_key(type_name)
    }

    /// Instantiate a registered exception type.
    /// A constructor that fails or panics is reported as an error.
    pub fn instantiate(&self, type_name: &str, message: Option<String>) -> Result<AppException> {
        let ctor = self
            .constructors
            .get(type_name)
            .ok_or_else(|| Error::UnknownExceptionType(type_name.to_owned()))?;

        let res = catch_unwind(AssertUnwindSafe(|| ctor(message)));
        match res {
            Ok(Ok(e)) => Ok(e),
            Ok(Err(e)) => Err(Error::ExceptionInstantiation {
                type_name: type_name.to_owned(),
                reason: e.to_string(),
            }
            .into()),
            Err(_) => Err(Error::ExceptionInstantiation {
                type_name: type_name.to_owned(),
                reason: "constructor panicked".to_owned(),
            }
            .into()),
        }
    }
}

impl Default for ExceptionRegistry {
    fn default() -> Self {
        (*Self::builtin()).clone()
    }
}

impl std::fmt::Debug for ExceptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.constructors.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("ExceptionRegistry")
            .field("types", &names)
            .finish()
    }
}
