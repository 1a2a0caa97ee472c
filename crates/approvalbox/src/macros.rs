#[cfg(feature = "color")]
#[doc(hidden)]
pub use anstream::eprintln;
#[cfg(not(feature = "color"))]
#[doc(hidden)]
pub use std::eprintln;

/// Feature-flag controlled additional test debug information
#[cfg(feature = "debug")]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => ({
        $crate::macros::eprintln!("[{:>w$}] \t{}", module_path!(), format_args!($($arg)*), w = 28);
    })
}

/// Feature-flag controlled additional test debug information
#[cfg(not(feature = "debug"))]
#[doc(hidden)]
#[macro_export]
macro_rules! debug {
    ($($arg:tt)*) => {};
}

/// Capture the [`TestIdentity`][crate::TestIdentity] of the enclosing test function
///
/// Approved files are placed next to the source file under `approved/`, in a
/// directory per module, named after the function.
///
/// ```rust,no_run
/// use approvalbox::{assert_that, same_json_as_approved, test_identity};
///
/// #[test]
/// fn renders_report() {
///     let report = vec![1, 2, 3];
///     assert_that(&report, same_json_as_approved().identity(test_identity!()));
/// }
/// ```
#[macro_export]
macro_rules! test_identity {
    () => {{
        let fn_path = $crate::fn_path!();
        let (module_path, function_name) = match fn_path.rsplit_once("::") {
            Some((module_path, function_name)) => (module_path, function_name),
            None => ("", fn_path),
        };
        // Drop the crate name, matching the test harness' naming
        let module_path = match module_path.split_once("::") {
            Some((_krate, rest)) => rest,
            None => "",
        };
        let mut source_file = $crate::current_dir!();
        if let Some(name) = ::std::path::Path::new(::std::file!()).file_name() {
            source_file.push(name);
        }
        $crate::TestIdentity::new(module_path, function_name).with_source_file(source_file)
    }};
}

/// Path of the enclosing function, including the crate name
#[doc(hidden)]
#[macro_export]
macro_rules! fn_path {
    () => {{
        fn f() {}
        fn type_name_of_val<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let mut name = type_name_of_val(f).strip_suffix("::f").unwrap_or("");
        while let Some(rest) = name.strip_suffix("::{{closure}}") {
            name = rest;
        }
        name
    }};
}

/// Find the directory for your source file
#[doc(hidden)] // forced to be visible in intended location
#[macro_export]
macro_rules! current_dir {
    () => {{
        let root = if let Some(rustc_root) = ::std::option_env!("CARGO_RUSTC_CURRENT_DIR") {
            ::std::path::Path::new(rustc_root)
        } else {
            let manifest_dir = ::std::path::Path::new(::std::env!("CARGO_MANIFEST_DIR"));
            manifest_dir
                .ancestors()
                .filter(|it| it.join("Cargo.toml").exists())
                .last()
                .unwrap_or(manifest_dir)
        };
        let file = ::std::file!();
        let rel_path = ::std::path::Path::new(file)
            .parent()
            .unwrap_or_else(|| ::std::path::Path::new(""));
        root.join(rel_path)
    }};
}
