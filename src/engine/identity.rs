/// Numeric id of the invoking user.
pub fn current_uid() -> u32 {
    #[cfg(unix)]
    {
        // SAFETY: getuid() is a simple POSIX getter that always succeeds and has no side effects.
        unsafe { libc::getuid() }
    }

    #[cfg(not(unix))]
    {
        0
    }
}

/// Login name of the invoking user.
///
/// Looks up the password database first, then `$USER`, then falls back to the
/// numeric id.
pub fn current_user() -> String {
    #[cfg(unix)]
    {
        if let Some(name) = passwd_name(current_uid()) {
            return name;
        }
    }

    std::env::var("USER")
        .ok()
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| current_uid().to_string())
}

#[cfg(unix)]
fn passwd_name(uid: u32) -> Option<String> {
    use std::ffi::CStr;

    let mut buf = vec![0 as libc::c_char; 4096];
    let mut pwd = std::mem::MaybeUninit::<libc::passwd>::uninit();
    let mut result: *mut libc::passwd = std::ptr::null_mut();

    // SAFETY: every pointer refers to a live local buffer of the stated size;
    // getpwuid_r writes into them and sets `result` to `pwd` on success.
    let rc = unsafe {
        libc::getpwuid_r(
            uid,
            pwd.as_mut_ptr(),
            buf.as_mut_ptr(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() {
        return None;
    }

    // SAFETY: `result` is non-null, so `pwd` was initialised and `pw_name`
    // points to a NUL-terminated string inside `buf`.
    let name = unsafe { CStr::from_ptr((*result).pw_name) };
    name.to_str().ok().map(str::to_owned)
}
