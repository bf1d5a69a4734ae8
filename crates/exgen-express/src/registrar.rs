use exgen_core::transform::ResourceName;
use thiserror::Error;

/// Marker line in `src/routes/index.js` above which route imports are added.
pub const IMPORT_HOOK: &str = "// exgen:route-imports";
/// Marker line above which `router.use(...)` mounts are added.
pub const MOUNT_HOOK: &str = "// exgen:route-mounts";

/// Why a registration left the router untouched. Neither case is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegisterError {
    #[error("{0} routes are already registered")]
    AlreadyRegistered(String),

    #[error("router file has no `{hook}` line; add these lines by hand:\n{instructions}")]
    HookMissing {
        hook: &'static str,
        instructions: String,
    },
}

/// The two lines that thread one route module into the central router.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub import_line: String,
    pub mount_line: String,
}

impl Registration {
    pub fn new(name: &ResourceName, route_module: &str, mount: &str) -> Self {
        let var = name.routes_var();
        Self {
            import_line: format!("const {var} = require('./{route_module}');"),
            mount_line: format!("router.use('{mount}', {var});"),
        }
    }

    /// Manual-edit instructions printed when the router cannot be updated.
    pub fn instructions(&self) -> String {
        format!("  {}\n  {}", self.import_line, self.mount_line)
    }
}

/// Add `name`'s route module to the router source. A resource whose import
/// line is already present is reported and never inserted twice; a router
/// without both hooks is left unchanged.
pub fn register(
    name: &ResourceName,
    route_module: &str,
    mount: &str,
    router_source: &str,
) -> Result<String, RegisterError> {
    let registration = Registration::new(name, route_module, mount);
    if router_source
        .lines()
        .any(|line| line.trim() == registration.import_line)
    {
        return Err(RegisterError::AlreadyRegistered(name.pascal.clone()));
    }

    let missing = |hook| RegisterError::HookMissing {
        hook,
        instructions: registration.instructions(),
    };
    let with_import = insert_before(router_source, IMPORT_HOOK, &registration.import_line)
        .ok_or_else(|| missing(IMPORT_HOOK))?;
    insert_before(&with_import, MOUNT_HOOK, &registration.mount_line).ok_or_else(|| missing(MOUNT_HOOK))
}

/// Insert `line` above the first line equal to `hook`, matching its
/// indentation and line ending.
fn insert_before(source: &str, hook: &str, line: &str) -> Option<String> {
    let mut out = String::with_capacity(source.len() + line.len() + 2);
    let mut found = false;
    for piece in source.split_inclusive('\n') {
        if !found && piece.trim() == hook {
            let indent = &piece[..piece.len() - piece.trim_start().len()];
            let eol = if piece.ends_with("\r\n") { "\r\n" } else { "\n" };
            out.push_str(indent);
            out.push_str(line);
            out.push_str(eol);
            found = true;
        }
        out.push_str(piece);
    }
    found.then_some(out)
}
