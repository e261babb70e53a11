//! Subcommand implementations.

pub mod cache;
pub mod catalog;
pub mod clean;
pub mod paths;
pub mod project;
pub mod storage;

use anyhow::Result;
use serde::Serialize;

/// Print `value` as pretty JSON on stdout.
pub(crate) fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `s` when `count` is not one.
pub(crate) fn plural(count: usize) -> &'static str {
    if count == 1 {
        ""
    } else {
        "s"
    }
}

/// Shorten `text` from the left so it fits in `width` columns.
pub(crate) fn truncate_left(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len <= width || width < 4 {
        return text.to_string();
    }
    let tail: String = text.chars().skip(len - (width - 3)).collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_left() {
        assert_eq!(truncate_left("short", 10), "short");
        assert_eq!(truncate_left("/home/user/projects/app/build", 12), ".../app/build");
        assert_eq!(truncate_left("/home/user/projects/app/build", 12).chars().count(), 12);
    }

    #[test]
    fn test_plural() {
        assert_eq!(plural(1), "");
        assert_eq!(plural(0), "s");
        assert_eq!(plural(3), "s");
    }
}
