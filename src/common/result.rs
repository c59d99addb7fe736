use crate::common::error::ProvisionError;
use std::path::Path;

/// クレート全体で使用するResult型のエイリアス
///
/// # Examples
///
/// ```
/// use scm_provision::common::result::ProvisionResult;
/// use scm_provision::common::error::ProvisionError;
///
/// fn example_with_error() -> ProvisionResult<()> {
///     Err(ProvisionError::internal_error("Something went wrong"))
/// }
/// assert!(example_with_error().is_err());
/// ```
pub type ProvisionResult<T> = Result<T, ProvisionError>;

/// I/Oエラーにパス情報を付与するヘルパー
///
/// 失敗したファイル操作のパスをエラーのコンテキストとして保持する。
pub trait IoResultExt<T> {
    /// I/OエラーをFileSystemエラーに変換する
    ///
    /// # Examples
    ///
    /// ```
    /// use scm_provision::common::result::IoResultExt;
    /// use std::path::Path;
    ///
    /// let result: Result<(), std::io::Error> = Err(std::io::Error::new(
    ///     std::io::ErrorKind::NotFound, "file not found"
    /// ));
    /// let error = result.with_path("read failed", Path::new("/tmp/x")).unwrap_err();
    /// assert_eq!(error.context()[0].1, "/tmp/x");
    /// ```
    fn with_path(self, message: impl Into<String>, path: &Path) -> ProvisionResult<T>;
}

impl<T> IoResultExt<T> for Result<T, std::io::Error> {
    fn with_path(self, message: impl Into<String>, path: &Path) -> ProvisionResult<T> {
        self.map_err(|e| {
            ProvisionError::filesystem_error_with_source(message, Some(path.to_path_buf()), e)
        })
    }
}

/// Optionのエラー変換ヘルパー
pub trait OptionExt<T> {
    /// Noneの場合にユーザー向けエラーを返す
    fn ok_or_soft(self, reason: impl Into<String>) -> ProvisionResult<T>;

    /// Noneの場合にレジストリエラーを返す
    fn ok_or_registry_error(self, message: impl Into<String>) -> ProvisionResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_soft(self, reason: impl Into<String>) -> ProvisionResult<T> {
        self.ok_or_else(|| ProvisionError::soft(reason))
    }

    fn ok_or_registry_error(self, message: impl Into<String>) -> ProvisionResult<T> {
        self.ok_or_else(|| ProvisionError::registry_error(message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_path_keeps_path_context() {
        let result: Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        let error = result
            .with_path("write failed", Path::new("/home/u/.gitconfig"))
            .unwrap_err();
        assert!(!error.is_soft());
        assert_eq!(
            error.context(),
            vec![("path", "/home/u/.gitconfig".to_string())]
        );
    }

    #[test]
    fn test_option_ext() {
        let none: Option<u32> = None;
        assert!(none.ok_or_soft("missing").unwrap_err().is_soft());

        let none: Option<u32> = None;
        assert!(matches!(
            none.ok_or_registry_error("missing"),
            Err(ProvisionError::Registry { .. })
        ));

        assert_eq!(Some(3).ok_or_soft("missing").unwrap(), 3);
    }
}
