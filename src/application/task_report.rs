use crate::common::error::ProvisionError;
use serde::Serialize;
use std::collections::BTreeMap;

/// タスクの実行結果
///
/// CLIはこれをJSONとして標準出力に書き出す。
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskReport {
    pub succeeded: bool,

    /// 失敗理由
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// ユーザー向けのエラーかどうか（診断情報を出さない）
    pub soft: bool,

    /// ラップされたエラーの診断情報（`path`、`command`など）
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub context: BTreeMap<String, String>,

    /// アクティビティログ
    pub activity: Vec<String>,

    /// 操作ごとの結果
    pub detail: serde_json::Value,
}

impl TaskReport {
    pub fn success(detail: serde_json::Value, activity: Vec<String>) -> Self {
        Self {
            succeeded: true,
            error: None,
            soft: false,
            context: BTreeMap::new(),
            activity,
            detail,
        }
    }

    pub fn failure(error: &ProvisionError, activity: Vec<String>) -> Self {
        let soft = error.is_soft();
        let context = if soft {
            BTreeMap::new()
        } else {
            error
                .context()
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect()
        };

        Self {
            succeeded: false,
            error: Some(error.to_string()),
            soft,
            context,
            activity,
            detail: serde_json::Value::Null,
        }
    }

    /// エラーを1行で表現する。ソフトエラーは理由のみ
    pub fn error_line(&self) -> Option<String> {
        let error = self.error.as_deref()?;
        if self.context.is_empty() {
            return Some(error.to_string());
        }

        let pairs: Vec<String> = self
            .context
            .iter()
            .map(|(key, value)| format!("{}={}", key, value))
            .collect();
        Some(format!("{} ({})", error, pairs.join(", ")))
    }
}
