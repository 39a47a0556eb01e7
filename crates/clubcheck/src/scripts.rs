//! Scripts injected through [`Session::execute_script`](crate::Session::execute_script).
//!
//! Each is a function body; arguments arrive as `arguments[i]`. Browser
//! key-value storage is only ever touched through these.

/// `arguments[0]` = key; returns the stored string or `null`
pub const LOCAL_STORAGE_GET: &str = "return localStorage.getItem(arguments[0]);";

/// `arguments[0]` = key, `arguments[1]` = value
pub const LOCAL_STORAGE_SET: &str = "localStorage.setItem(arguments[0], arguments[1]);";

/// `arguments[0]` = key
pub const LOCAL_STORAGE_REMOVE: &str = "localStorage.removeItem(arguments[0]);";

/// Drop every `localStorage` entry
pub const LOCAL_STORAGE_CLEAR: &str = "localStorage.clear();";

/// Drop every `sessionStorage` entry
pub const SESSION_STORAGE_CLEAR: &str = "sessionStorage.clear();";

/// `arguments[0]` = CSS selector, `arguments[1]` = match index
pub const SCROLL_INTO_VIEW: &str = "var el = document.querySelectorAll(arguments[0])[arguments[1]]; \
     if (el) { el.scrollIntoView({behavior: 'instant', block: 'center'}); return true; } \
     return false;";
