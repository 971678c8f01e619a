/// The error type returned by a plugin hook.
///
/// Plugin hooks are ordinary user code and may fail for any reason, so this
/// is a type-erased, owned error — the same shape the source system's hooks
/// use (an arbitrary thrown value reduced to a message string). The manager
/// never inspects the concrete type; it only ever logs `{err}` or forwards it
/// to `on_error`.
pub type HookError = Box<dyn std::error::Error + Send + Sync + 'static>;
